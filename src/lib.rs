pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;

pub use error::{CompletionError, DocumentError, InputError};
pub use io::{allowed_file, load_transcript, read_file, render_error, render_report};
pub use llm::{
    build_client, clean_json, normalize, parse_json, AnthropicClient, AnthropicConfig,
    CannedClient, CompletionClient, ProviderKind, PROVIDER_ENV,
};
pub use models::{CombinedReport, NormalizedRecord};
pub use stages::{
    analyze_sentiment_intent, combine_outputs, generate_soap_note, medical_summarize, run_all,
};
