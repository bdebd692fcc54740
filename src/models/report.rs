use serde::Serialize;
use serde_json::{Map, Value};

/// A parsed model response: whatever JSON object the model produced, or the
/// one-key `{"error": ...}` sentinel. Shapes are conventional, never enforced.
pub type NormalizedRecord = Map<String, Value>;

/// Key used by sentinel error records
pub const ERROR_KEY: &str = "error";

/// Build the one-key `{"error": reason}` sentinel record
pub fn error_record(reason: impl Into<String>) -> NormalizedRecord {
    let mut record = Map::new();
    record.insert(ERROR_KEY.to_string(), Value::String(reason.into()));
    record
}

/// Final output of a run. Always carries all three sections, in this order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedReport {
    #[serde(rename = "Medical_Summary")]
    pub medical_summary: NormalizedRecord,
    #[serde(rename = "Sentiment_Intent")]
    pub sentiment_intent: NormalizedRecord,
    #[serde(rename = "SOAP_Note")]
    pub soap_note: NormalizedRecord,
}

impl CombinedReport {
    /// Sections that degraded to an error record
    pub fn failed_sections(&self) -> Vec<&'static str> {
        [
            ("Medical_Summary", &self.medical_summary),
            ("Sentiment_Intent", &self.sentiment_intent),
            ("SOAP_Note", &self.soap_note),
        ]
        .into_iter()
        .filter(|(_, record)| is_error_record(record))
        .map(|(name, _)| name)
        .collect()
    }
}

/// True for the single-key sentinel shape
pub fn is_error_record(record: &NormalizedRecord) -> bool {
    record.len() == 1 && record.contains_key(ERROR_KEY)
}
