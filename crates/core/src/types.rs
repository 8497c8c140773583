/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Raw `"YYYY-MM-DD" -> value` mapping as delivered by the stats endpoints.
pub type RawSeries = serde_json::Map<String, serde_json::Value>;
