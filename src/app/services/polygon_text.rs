//! Conversion between user-edited text and polygon data.
//!
//! Validation stops at the top level: the text must be a JSON array, and
//! whatever it contains is passed through untouched. Coordinate arity, numeric
//! types and ring closure are left to the server.

use serde_json::Value;

use crate::app::domain::PolygonList;
use crate::app::infrastructure::error::{AppError, Result};

pub const INVALID_POLYGONS: &str = "polygons must be a valid array";

/// Parse edited text into a polygon list.
pub fn parse(text: &str) -> Result<PolygonList> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(PolygonList(items)),
        _ => Err(AppError::Validation(INVALID_POLYGONS.to_string())),
    }
}

/// Render polygons as indented JSON suitable for an edit buffer.
/// `parse(&to_edit_text(p))` yields a list equal to `p`.
pub fn to_edit_text(polygons: &PolygonList) -> String {
    // Serializing a Value tree cannot fail: all map keys are strings.
    serde_json::to_string_pretty(polygons).unwrap_or_default()
}

/// One display line per polygon: `Polygon 1: [(-140, 60), (-120, 60)]`.
pub fn describe(polygons: &PolygonList) -> Vec<String> {
    polygons
        .0
        .iter()
        .enumerate()
        .map(|(i, raw)| match polygons.polygon(i) {
            Some(polygon) => {
                let coords: Vec<String> = polygon
                    .0
                    .iter()
                    .map(|c| format!("({}, {})", c.lon, c.lat))
                    .collect();
                format!("Polygon {}: [{}]", i + 1, coords.join(", "))
            }
            None => format!("Polygon {}: {}", i + 1, raw),
        })
        .collect()
}
