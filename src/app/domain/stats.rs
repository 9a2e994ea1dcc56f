use serde::{Deserialize, Serialize};

/// Per-country query counters as reported by the server.
///
/// Purely informational: `true_responses + false_responses <= total_requests`
/// is expected but not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawStatEntry")]
pub struct StatEntry {
    pub code: String,
    pub total_requests: u64,
    pub true_responses: u64,
    pub false_responses: u64,
}

/// Aggregation output keys the country under `_id`; some servers also add
/// `code`. `code` wins when both are present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatEntry {
    #[serde(rename = "_id", default)]
    group_id: Option<String>,
    #[serde(default)]
    code: Option<String>,
    total_requests: u64,
    true_responses: u64,
    false_responses: u64,
}

impl TryFrom<RawStatEntry> for StatEntry {
    type Error = String;

    fn try_from(raw: RawStatEntry) -> Result<Self, Self::Error> {
        let code = raw
            .code
            .or(raw.group_id)
            .ok_or_else(|| "missing field `code`".to_string())?;
        Ok(Self {
            code,
            total_requests: raw.total_requests,
            true_responses: raw.true_responses,
            false_responses: raw.false_responses,
        })
    }
}

/// Envelope of the stats endpoint.
#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    pub data: Vec<StatEntry>,
}
