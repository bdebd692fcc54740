use async_trait::async_trait;
use tracing::debug;

use crate::error::CompletionError;
use crate::llm::CompletionClient;

pub const CANNED_MEDICAL_SUMMARY: &str = r#"{"Patient_Name": "John Doe", "Symptoms": ["headache", "nausea", "dizziness"], "Diagnosis": "Migraine", "Treatment": "Pain relievers and rest", "Current_Status": "Stable", "Prognosis": "Good with treatment"}"#;

pub const CANNED_SENTIMENT_INTENT: &str =
    r#"{"Sentiment": "Anxious", "Intent": "Reporting symptoms"}"#;

pub const CANNED_SOAP_NOTE: &str = r#"{"Subjective": "Patient reports headache, nausea, and dizziness for 2 days.", "Objective": "Vital signs normal.", "Assessment": "Possible migraine.", "Plan": "Prescribe medication and follow up."}"#;

pub const CANNED_UNKNOWN: &str = r#"{"error": "Unknown prompt type"}"#;

/// Offline client answering from fixed responses picked by keywords in the
/// prompt. For demos and tests; the answers ignore the transcript.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedClient;

impl CannedClient {
    /// First matching rule wins. Matching runs over the whole prompt,
    /// transcript included.
    pub fn respond(prompt: &str) -> &'static str {
        let prompt = prompt.to_lowercase();

        if prompt.contains("medical details") {
            CANNED_MEDICAL_SUMMARY
        } else if prompt.contains("sentiment") && prompt.contains("intent") {
            CANNED_SENTIMENT_INTENT
        } else if prompt.contains("soap note") {
            CANNED_SOAP_NOTE
        } else {
            CANNED_UNKNOWN
        }
    }
}

#[async_trait]
impl CompletionClient for CannedClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let response = Self::respond(prompt);
        debug!("Canned response: {} chars", response.len());
        Ok(response.to_string())
    }
}
