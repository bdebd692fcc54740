use crate::models::{CombinedReport, NormalizedRecord};

/// Merge the three section records into the final report. Inputs are taken
/// as-is; sentinel error records are kept in place.
pub fn combine_outputs(
    medical_summary: NormalizedRecord,
    sentiment_intent: NormalizedRecord,
    soap_note: NormalizedRecord,
) -> CombinedReport {
    CombinedReport {
        medical_summary,
        sentiment_intent,
        soap_note,
    }
}
