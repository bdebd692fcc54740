/// Fields extracted into the medical summary
pub const MEDICAL_SUMMARY_FIELDS: [&str; 6] = [
    "Patient_Name",
    "Symptoms (list)",
    "Diagnosis",
    "Treatment",
    "Current_Status",
    "Prognosis",
];

/// Sections of a SOAP note
pub const SOAP_NOTE_FIELDS: [&str; 4] = ["Subjective", "Objective", "Assessment", "Plan"];

/// Sentiment labels suggested to the model (not validated)
pub const SENTIMENT_LABELS: [&str; 3] = ["Anxious", "Neutral", "Reassured"];

/// Intent labels suggested to the model (not validated)
pub const INTENT_LABELS: [&str; 4] = [
    "Seeking reassurance",
    "Reporting symptoms",
    "Expressing concern",
    "Other",
];

/// Value the model is told to use for anything the transcript does not mention
pub const NOT_SPECIFIED: &str = "Not specified";

/// The three independent analyses run over a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    MedicalSummary,
    SentimentIntent,
    SoapNote,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::MedicalSummary, Task::SentimentIntent, Task::SoapNote];

    /// Key of this task's section in the combined report
    pub fn report_key(self) -> &'static str {
        match self {
            Task::MedicalSummary => "Medical_Summary",
            Task::SentimentIntent => "Sentiment_Intent",
            Task::SoapNote => "SOAP_Note",
        }
    }

    /// Build the completion prompt for this task
    pub fn prompt(self, transcript: &str) -> String {
        match self {
            Task::MedicalSummary => build_medical_summary_prompt(transcript),
            Task::SentimentIntent => build_sentiment_intent_prompt(transcript),
            Task::SoapNote => build_soap_note_prompt(transcript),
        }
    }
}

pub fn build_medical_summary_prompt(transcript: &str) -> String {
    let mut prompt = String::from(
        "Extract key medical details from this physician-patient conversation and output JSON with:\n",
    );
    push_field_list(&mut prompt, &MEDICAL_SUMMARY_FIELDS);
    prompt.push_str(&format!("Set missing fields to '{}'.\n\n", NOT_SPECIFIED));
    push_transcript(&mut prompt, transcript);
    prompt
}

pub fn build_sentiment_intent_prompt(transcript: &str) -> String {
    let mut prompt = format!(
        "Analyze the patient's sentiment ({}) and intent ({}). Return JSON with keys: Sentiment, Intent.\n\n",
        SENTIMENT_LABELS.join(", "),
        INTENT_LABELS.join(", ")
    );
    push_transcript(&mut prompt, transcript);
    prompt
}

pub fn build_soap_note_prompt(transcript: &str) -> String {
    let mut prompt = String::from("Generate a SOAP note with:\n");
    push_field_list(&mut prompt, &SOAP_NOTE_FIELDS);
    prompt.push_str(&format!(
        "Set missing fields to '{}'. Return JSON.\n\n",
        NOT_SPECIFIED
    ));
    push_transcript(&mut prompt, transcript);
    prompt
}

fn push_field_list(prompt: &mut String, fields: &[&str]) {
    for field in fields {
        prompt.push_str("- ");
        prompt.push_str(field);
        prompt.push('\n');
    }
}

fn push_transcript(prompt: &mut String, transcript: &str) {
    prompt.push_str("Transcript:\n");
    prompt.push_str(transcript);
}
