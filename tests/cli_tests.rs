use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::thread::JoinHandle;

use serde_json::{json, Value};
use tempfile::TempDir;

/// Run the binary from inside `dir` with a clean provider environment
fn run_medscribe(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_medscribe"))
        .args(args)
        .current_dir(dir)
        .env_remove("MEDSCRIBE_PROVIDER")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("ANTHROPIC_MODEL")
        .env_remove("ANTHROPIC_BASE_URL")
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("HTTPS_PROXY")
        .env_remove("ALL_PROXY")
        .env_remove("http_proxy")
        .env_remove("https_proxy")
        .env_remove("all_proxy")
        .output()
        .expect("failed to execute medscribe")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({})\nstdout:\n{}\nstderr:\n{}",
            e,
            stdout,
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
        body
    );

    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[test]
fn medical_summary_from_text_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("visit.txt"),
        "Patient reports headache, nausea, and dizziness... medical details...",
    )
    .unwrap();

    let output = run_medscribe(dir.path(), &["--file", "visit.txt"]);
    assert!(
        output.status.success(),
        "run should succeed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = stdout_json(&output);
    assert_eq!(
        report["Medical_Summary"],
        json!({
            "Patient_Name": "John Doe",
            "Symptoms": ["headache", "nausea", "dizziness"],
            "Diagnosis": "Migraine",
            "Treatment": "Pain relievers and rest",
            "Current_Status": "Stable",
            "Prognosis": "Good with treatment"
        })
    );

    let keys: Vec<&str> = report
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["Medical_Summary", "Sentiment_Intent", "SOAP_Note"]);
}

#[test]
fn report_is_indented_with_four_spaces() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: How is the pain?").unwrap();

    let output = run_medscribe(dir.path(), &["--file", "visit.txt"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("{\n    \"Medical_Summary\": {\n        \""));

    let report = stdout_json(&output);
    assert_eq!(
        report["Sentiment_Intent"],
        json!({"Sentiment": "Anxious", "Intent": "Reporting symptoms"})
    );
    assert_eq!(report["SOAP_Note"]["Assessment"], "Possible migraine.");
}

#[test]
fn docx_transcript_is_processed() {
    let dir = TempDir::new().unwrap();
    write_docx(
        &dir.path().join("Visit.DOCX"),
        &["Doctor: What brings you in?", "Patient: Headaches all week."],
    );

    let output = run_medscribe(dir.path(), &["--file", "Visit.DOCX"]);
    assert!(
        output.status.success(),
        "docx run should succeed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let report = stdout_json(&output);
    assert_eq!(report["Medical_Summary"]["Diagnosis"], "Migraine");
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();

    let output = run_medscribe(dir.path(), &["--file", "nope.txt"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        r#"{"error": "File does not exist"}"#
    );
}

#[test]
fn unsupported_extension_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.pdf"), "%PDF-1.4").unwrap();

    let output = run_medscribe(dir.path(), &["--file", "visit.pdf"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        r#"{"error": "Unsupported file type. Only .txt and .docx are allowed"}"#
    );
}

#[test]
fn empty_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("empty.txt"), "").unwrap();

    let output = run_medscribe(dir.path(), &["--file", "empty.txt"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        r#"{"error": "Failed to read file"}"#
    );
}

#[test]
fn corrupt_docx_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.docx"), "not a zip archive").unwrap();

    let output = run_medscribe(dir.path(), &["--file", "visit.docx"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output), json!({"error": "Failed to read file"}));
}

#[test]
fn anthropic_provider_without_key_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: Hello").unwrap();

    let output = run_medscribe(
        dir.path(),
        &["--file", "visit.txt", "--provider", "anthropic"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_json(&output),
        json!({"error": "ANTHROPIC_API_KEY environment variable not set"})
    );
}

#[test]
fn file_flag_is_required() {
    let dir = TempDir::new().unwrap();

    let output = run_medscribe(dir.path(), &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--file"));
}

/// Serve `count` Messages API calls with the same text completion and hand
/// back the raw requests.
fn serve_completions(count: usize, text: &'static str) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    let handle = std::thread::spawn(move || {
        let body = json!({"content": [{"type": "text", "text": text}]}).to_string();
        let mut requests = Vec::new();
        for _ in 0..count {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        requests
    });

    (endpoint, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);

        if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&request).into_owned()
}

#[test]
fn provider_from_dotenv_is_used() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: Hello").unwrap();
    std::fs::write(dir.path().join(".env"), "MEDSCRIBE_PROVIDER=anthropic\n").unwrap();

    let output = run_medscribe(dir.path(), &["--file", "visit.txt"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_json(&output),
        json!({"error": "ANTHROPIC_API_KEY environment variable not set"})
    );
}

#[test]
fn provider_from_env_file_is_used() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: Hello").unwrap();
    std::fs::write(dir.path().join("prod.env"), "MEDSCRIBE_PROVIDER=anthropic\n").unwrap();

    let output = run_medscribe(
        dir.path(),
        &["--file", "visit.txt", "--env-file", "prod.env"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_json(&output),
        json!({"error": "ANTHROPIC_API_KEY environment variable not set"})
    );
}

#[test]
fn provider_flag_beats_dotenv() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: Hello").unwrap();
    std::fs::write(dir.path().join(".env"), "MEDSCRIBE_PROVIDER=anthropic\n").unwrap();

    let output = run_medscribe(
        dir.path(),
        &["--file", "visit.txt", "--provider", "canned"],
    );

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["Medical_Summary"]["Diagnosis"], "Migraine");
}

#[test]
fn unknown_provider_in_env_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: Hello").unwrap();
    std::fs::write(dir.path().join(".env"), "MEDSCRIBE_PROVIDER=openai\n").unwrap();

    let output = run_medscribe(dir.path(), &["--file", "visit.txt"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_json(&output),
        json!({"error": "Unsupported provider 'openai'. Supported providers: canned, anthropic"})
    );
}

#[test]
fn missing_env_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: Hello").unwrap();

    let output = run_medscribe(
        dir.path(),
        &["--file", "visit.txt", "--env-file", "absent.env"],
    );

    assert_eq!(output.status.code(), Some(1));
    let error = stdout_json(&output);
    let message = error["error"].as_str().unwrap();
    assert!(
        message.starts_with("Failed to load env file"),
        "unexpected error: {}",
        message
    );
    assert_eq!(error.as_object().unwrap().len(), 1);
}

#[test]
fn unreachable_provider_degrades_every_section() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: Hello").unwrap();
    std::fs::write(
        dir.path().join("test.env"),
        "ANTHROPIC_API_KEY=x\nANTHROPIC_BASE_URL=http://127.0.0.1:1\n",
    )
    .unwrap();

    let output = run_medscribe(
        dir.path(),
        &[
            "--file",
            "visit.txt",
            "--env-file",
            "test.env",
            "--provider",
            "anthropic",
        ],
    );

    assert!(
        output.status.success(),
        "provider failures should not abort the run\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = stdout_json(&output);
    for section in ["Medical_Summary", "Sentiment_Intent", "SOAP_Note"] {
        let record = report[section].as_object().unwrap();
        assert_eq!(record.len(), 1, "{} should be an error record", section);
        let message = record["error"].as_str().unwrap();
        assert!(
            message.starts_with("Completion failed: "),
            "{}: unexpected error {}",
            section,
            message
        );
    }
}

#[test]
fn anthropic_provider_uses_model_override() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("visit.txt"), "Doctor: Any dizziness?").unwrap();

    let (endpoint, server) = serve_completions(3, "```json\n{\"Finding\": \"Vertigo\"}\n```");
    std::fs::write(
        dir.path().join(".env"),
        format!(
            "ANTHROPIC_API_KEY=test-key\nANTHROPIC_MODEL=env-model\nANTHROPIC_BASE_URL={}/\n",
            endpoint
        ),
    )
    .unwrap();

    let output = run_medscribe(
        dir.path(),
        &[
            "--file",
            "visit.txt",
            "--provider",
            "anthropic",
            "--model",
            "flag-model",
        ],
    );
    assert!(
        output.status.success(),
        "run should succeed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = stdout_json(&output);
    for section in ["Medical_Summary", "Sentiment_Intent", "SOAP_Note"] {
        assert_eq!(report[section], json!({"Finding": "Vertigo"}));
    }

    let requests = server.join().unwrap();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert!(request.starts_with("POST /v1/messages "));
        assert!(request.contains(r#""model":"flag-model""#));
        assert!(request.contains("Doctor: Any dizziness?"));
    }
    assert!(requests[0].contains("Extract key medical details"));
    assert!(requests[1].contains("Analyze the patient's sentiment"));
    assert!(requests[2].contains("Generate a SOAP note"));
}
