use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Server-assigned record identifier. Never interpreted by the client.
///
/// Numeric ids are accepted and kept in their decimal text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CountryId(pub String);

impl<'de> Deserialize<'de> for CountryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(Number),
        }

        match RawId::deserialize(deserializer) {
            Ok(RawId::Text(text)) => Ok(Self(text)),
            Ok(RawId::Number(number)) => Ok(Self(number.to_string())),
            Err(_) => Err(serde::de::Error::custom(
                "invalid id: expected a string or a number",
            )),
        }
    }
}

/// A (longitude, latitude) pair, stored on the wire as `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Coordinate>);

/// Top-level polygon array of a country.
///
/// Elements are kept as decoded JSON so that whatever the user typed (and the
/// server accepted) survives untouched. Use [`PolygonList::polygon`] for a
/// typed view of a single element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolygonList(pub Vec<Value>);

impl PolygonList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Typed view of the polygon at `index`, if it is a list of coordinate pairs.
    pub fn polygon(&self, index: usize) -> Option<Polygon> {
        let raw = self.0.get(index)?;
        Polygon::deserialize(raw).ok()
    }
}

impl From<Vec<Polygon>> for PolygonList {
    fn from(polygons: Vec<Polygon>) -> Self {
        let values = polygons
            .into_iter()
            .map(|p| {
                Value::Array(
                    p.0.into_iter()
                        .map(|c| Value::from(vec![c.lon, c.lat]))
                        .collect(),
                )
            })
            .collect();
        Self(values)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCountryRecord")]
pub struct CountryRecord {
    pub id: CountryId,
    pub name: String,
    pub code: String,
    pub polygons: PolygonList,
}

/// Wire shape of a record. Servers send `_id`, `id` or both; `_id` wins.
#[derive(Deserialize)]
struct RawCountryRecord {
    #[serde(rename = "_id", default)]
    mongo_id: Option<CountryId>,
    #[serde(default)]
    id: Option<CountryId>,
    name: String,
    code: String,
    polygons: PolygonList,
}

impl TryFrom<RawCountryRecord> for CountryRecord {
    type Error = String;

    fn try_from(raw: RawCountryRecord) -> Result<Self, Self::Error> {
        let id = raw
            .mongo_id
            .or(raw.id)
            .ok_or_else(|| "missing field `id`".to_string())?;
        Ok(Self {
            id,
            name: raw.name,
            code: raw.code,
            polygons: raw.polygons,
        })
    }
}

/// Body of a create call. The server answers with the canonical record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCountry {
    pub name: String,
    pub code: String,
    pub polygons: PolygonList,
}
