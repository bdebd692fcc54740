use tracing::{info, warn};

use crate::llm::{normalize, CompletionClient, Task};
use crate::models::{error_record, is_error_record, CombinedReport, NormalizedRecord};
use crate::stages::combine_outputs;

/// Run one task: build its prompt, complete it, normalize the answer.
///
/// Never fails. A backend error becomes `{"error": "Completion failed: ..."}`
/// and unparseable output becomes the invalid-JSON sentinel, so one bad
/// section never takes the others down with it.
pub async fn run_task(
    client: &dyn CompletionClient,
    task: Task,
    transcript: &str,
) -> NormalizedRecord {
    let prompt = task.prompt(transcript);

    let raw = match client.complete(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("{}: completion failed: {}", task.report_key(), e);
            return error_record(format!("Completion failed: {}", e));
        }
    };

    let record = normalize(&raw);
    if is_error_record(&record) {
        warn!("{}: response degraded to an error record", task.report_key());
    } else {
        info!("{}: {} fields", task.report_key(), record.len());
    }
    record
}

/// Extract the six medical summary fields
pub async fn medical_summarize(client: &dyn CompletionClient, transcript: &str) -> NormalizedRecord {
    run_task(client, Task::MedicalSummary, transcript).await
}

/// Classify the patient's sentiment and intent
pub async fn analyze_sentiment_intent(
    client: &dyn CompletionClient,
    transcript: &str,
) -> NormalizedRecord {
    run_task(client, Task::SentimentIntent, transcript).await
}

/// Draft a SOAP note
pub async fn generate_soap_note(client: &dyn CompletionClient, transcript: &str) -> NormalizedRecord {
    run_task(client, Task::SoapNote, transcript).await
}

/// Run all three tasks one after another and combine the results
pub async fn run_all(client: &dyn CompletionClient, transcript: &str) -> CombinedReport {
    info!("Analyzing transcript ({} chars)", transcript.len());

    let medical_summary = medical_summarize(client, transcript).await;
    let sentiment_intent = analyze_sentiment_intent(client, transcript).await;
    let soap_note = generate_soap_note(client, transcript).await;

    combine_outputs(medical_summary, sentiment_intent, soap_note)
}
