use std::future::Future;
use std::path::Path;
use std::time::Duration;

use author_rows::{AuthorRow, PaperEntry, flatten_authors, validate_entries};
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::backend::ExtractionBackend;
use crate::error::ClientError;
use crate::models::{FALLBACK_DEFAULT_MODEL, PDF_MEDIA_TYPE, RawResponse};

pub const CHOOSE_PDF_MESSAGE: &str = "Choose a PDF before submitting.";
pub const NOT_PDF_MESSAGE: &str = "Please upload a PDF file.";
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the server.";
pub const UNEXPECTED_FORMAT_MESSAGE: &str = "Unexpected response format from the backend.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process PDF.";
pub const NO_AUTHORS_MESSAGE: &str = "No authors found in the uploaded PDF.";

const TICK: Duration = Duration::from_secs(1);

/// A document staged for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Loads a file from disk. The media type comes from the `%PDF-` magic
    /// bytes when present, otherwise from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::Validation(format!("'{}' is not a file path", path.display()))
            })?;

        let media_type = if bytes.starts_with(b"%PDF-") {
            PDF_MEDIA_TYPE.to_string()
        } else {
            mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        };

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE || self.name.to_lowercase().ends_with(".pdf")
    }
}

/// A response body after the lenient JSON pass.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyPayload {
    Empty,
    Json(Value),
    Text(String),
}

pub fn parse_body(body: &str) -> BodyPayload {
    if body.is_empty() {
        return BodyPayload::Empty;
    }
    serde_json::from_str::<Value>(body)
        .map_or_else(|_| BodyPayload::Text(body.to_string()), BodyPayload::Json)
}

/// Picks the message shown for a non-2xx extraction response.
pub fn error_detail(payload: &BodyPayload, raw_body: &str) -> String {
    match payload {
        BodyPayload::Json(value) if value.is_object() || value.is_array() => {
            match value.get("detail") {
                Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
                Some(detail) if !detail.is_null() && !detail.is_string() => detail.to_string(),
                _ => value.to_string(),
            }
        }
        _ if !raw_body.is_empty() => raw_body.to_string(),
        _ => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

/// Validates an extraction response. `Err` carries the user-facing message.
pub fn interpret_extraction_response(response: &RawResponse) -> Result<Vec<PaperEntry>, String> {
    let payload = parse_body(&response.body);
    if !response.is_success() {
        return Err(error_detail(&payload, &response.body));
    }

    match payload {
        BodyPayload::Json(value) => validate_entries(value).map_err(|error| {
            tracing::warn!(%error, "extraction response violates the backend contract");
            UNEXPECTED_FORMAT_MESSAGE.to_string()
        }),
        BodyPayload::Empty | BodyPayload::Text(_) => Err(UNEXPECTED_FORMAT_MESSAGE.to_string()),
    }
}

pub fn found_message(row_count: usize) -> String {
    if row_count == 0 {
        NO_AUTHORS_MESSAGE.to_string()
    } else {
        format!("Found {row_count} author records.")
    }
}

/// Where the upload form stands. A terminal phase stays in place until the
/// next selection or submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    AwaitingResponse,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Blocked before any request was made.
    Rejected(String),
    Succeeded { rows: usize, message: String },
    Failed(String),
}

impl UploadOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected(message) | Self::Failed(message) => message,
            Self::Succeeded { message, .. } => message,
        }
    }
}

/// Owns the upload form state: the staged file, the current rows, and the
/// status line.
///
/// `submit` takes `&mut self`, so one orchestrator can never have two
/// extraction requests outstanding.
pub struct UploadOrchestrator {
    staged: Option<SelectedFile>,
    file_error: Option<String>,
    status_message: Option<String>,
    rows: Vec<AuthorRow>,
    phase: watch::Sender<UploadPhase>,
    elapsed: watch::Sender<u64>,
}

impl Default for UploadOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadOrchestrator {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(UploadPhase::Idle);
        let (elapsed, _) = watch::channel(0);
        Self {
            staged: None,
            file_error: None,
            status_message: None,
            rows: Vec::new(),
            phase,
            elapsed,
        }
    }

    /// Stages a file. Any selection clears the current rows and status and
    /// returns the phase to idle; a non-PDF selection also unstages the
    /// previous file.
    pub fn select_file(&mut self, file: Option<SelectedFile>) -> Result<(), ClientError> {
        self.rows.clear();
        self.status_message = None;
        self.phase.send_replace(UploadPhase::Idle);

        let Some(file) = file else {
            self.staged = None;
            self.file_error = None;
            return Ok(());
        };

        if !file.is_pdf() {
            tracing::debug!(name = %file.name, media_type = %file.media_type, "rejected non-pdf selection");
            self.staged = None;
            self.file_error = Some(NOT_PDF_MESSAGE.to_string());
            return Err(ClientError::Validation(NOT_PDF_MESSAGE.to_string()));
        }

        self.file_error = None;
        self.staged = Some(file);
        Ok(())
    }

    /// Uploads the staged file with `model_id` (the fallback default when
    /// blank) and replaces the rows on success.
    pub async fn submit<B>(&mut self, backend: &B, model_id: &str) -> UploadOutcome
    where
        B: ExtractionBackend,
    {
        self.status_message = None;

        let Some(file) = self.staged.as_ref() else {
            self.file_error = Some(CHOOSE_PDF_MESSAGE.to_string());
            self.phase.send_replace(UploadPhase::Idle);
            return UploadOutcome::Rejected(CHOOSE_PDF_MESSAGE.to_string());
        };

        self.rows.clear();
        let model_id = if model_id.trim().is_empty() {
            FALLBACK_DEFAULT_MODEL
        } else {
            model_id
        };
        tracing::info!(file = %file.name, model_id, "submitting document for extraction");

        let in_flight = InFlight::start(&self.elapsed, &self.phase);
        let settled = tick_while_pending(&self.elapsed, backend.process_pdf(file, model_id)).await;

        let outcome = match settled {
            Err(ClientError::Validation(message)) => {
                tracing::warn!(%message, "extraction request could not be built");
                UploadOutcome::Failed(message)
            }
            Err(error) => {
                tracing::warn!(%error, "extraction request failed in transport");
                UploadOutcome::Failed(UNREACHABLE_MESSAGE.to_string())
            }
            Ok(response) => match interpret_extraction_response(&response) {
                Ok(entries) => {
                    self.rows = flatten_authors(&entries);
                    tracing::info!(
                        entries = entries.len(),
                        rows = self.rows.len(),
                        "extraction completed"
                    );
                    UploadOutcome::Succeeded {
                        rows: self.rows.len(),
                        message: found_message(self.rows.len()),
                    }
                }
                Err(message) => {
                    tracing::warn!(status = response.status, %message, "extraction rejected");
                    UploadOutcome::Failed(message)
                }
            },
        };

        in_flight.settle(match outcome {
            UploadOutcome::Succeeded { .. } => UploadPhase::Succeeded,
            UploadOutcome::Rejected(_) | UploadOutcome::Failed(_) => UploadPhase::Failed,
        });
        self.status_message = Some(outcome.message().to_string());
        outcome
    }

    pub fn rows(&self) -> &[AuthorRow] {
        &self.rows
    }

    pub fn staged_file(&self) -> Option<&SelectedFile> {
        self.staged.as_ref()
    }

    pub fn file_error(&self) -> Option<&str> {
        self.file_error.as_deref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn phase(&self) -> UploadPhase {
        *self.phase.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.phase() == UploadPhase::AwaitingResponse
    }

    pub fn elapsed_seconds(&self) -> u64 {
        *self.elapsed.borrow()
    }

    pub fn subscribe_elapsed(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<UploadPhase> {
        self.phase.subscribe()
    }
}

/// Marks a request as outstanding. Dropping it always zeroes the elapsed
/// counter; unless `settle` published a terminal phase first, the phase
/// also returns to idle.
struct InFlight<'a> {
    elapsed: &'a watch::Sender<u64>,
    phase: &'a watch::Sender<UploadPhase>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn start(elapsed: &'a watch::Sender<u64>, phase: &'a watch::Sender<UploadPhase>) -> Self {
        reset_counter(elapsed);
        phase.send_replace(UploadPhase::AwaitingResponse);
        Self {
            elapsed,
            phase,
            settled: false,
        }
    }

    fn settle(mut self, phase: UploadPhase) {
        reset_counter(self.elapsed);
        self.phase.send_replace(phase);
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        reset_counter(self.elapsed);
        if !self.settled {
            self.phase.send_replace(UploadPhase::Idle);
        }
    }
}

fn reset_counter(elapsed: &watch::Sender<u64>) {
    elapsed.send_if_modified(|seconds| {
        let changed = *seconds != 0;
        *seconds = 0;
        changed
    });
}

/// Drives `request` to completion, bumping `elapsed` once per second while
/// it is pending. The request wins any tie with the ticker.
async fn tick_while_pending<F>(elapsed: &watch::Sender<u64>, request: F) -> F::Output
where
    F: Future,
{
    let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(request);

    loop {
        tokio::select! {
            biased;
            settled = &mut request => return settled,
            _ = ticker.tick() => {
                elapsed.send_modify(|seconds| *seconds += 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        BodyPayload, GENERIC_FAILURE_MESSAGE, NO_AUTHORS_MESSAGE, NOT_PDF_MESSAGE, SelectedFile,
        UNEXPECTED_FORMAT_MESSAGE, UploadOrchestrator, error_detail, found_message,
        interpret_extraction_response, parse_body,
    };
    use crate::models::RawResponse;

    fn failure(status: u16, body: &str) -> String {
        interpret_extraction_response(&RawResponse::new(status, body))
            .expect_err("response should be rejected")
    }

    #[test]
    fn detail_field_wins_for_error_objects() {
        assert_eq!(failure(400, r#"{"detail":"bad file"}"#), "bad file");
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        assert_eq!(
            failure(422, r#"{"detail":[{"loc":["body","file"],"msg":"field required"}]}"#),
            r#"[{"loc":["body","file"],"msg":"field required"}]"#
        );
    }

    #[test]
    fn objects_without_detail_are_stringified() {
        assert_eq!(failure(500, r#"{"error": "boom"}"#), r#"{"error":"boom"}"#);
        assert_eq!(failure(500, r#"{"detail": ""}"#), r#"{"detail":""}"#);
    }

    #[test]
    fn text_and_scalar_bodies_fall_back_to_raw_text() {
        assert_eq!(failure(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(failure(500, "42"), "42");
        assert_eq!(failure(500, ""), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn success_with_wrong_shape_is_a_contract_violation() {
        assert_eq!(failure(200, r#"{"papers": []}"#), UNEXPECTED_FORMAT_MESSAGE);
        assert_eq!(failure(200, "not json"), UNEXPECTED_FORMAT_MESSAGE);
        assert_eq!(failure(200, ""), UNEXPECTED_FORMAT_MESSAGE);
    }

    #[test]
    fn success_with_array_yields_entries() {
        let entries = interpret_extraction_response(&RawResponse::new(
            200,
            r#"[{"title":"T","authors":[{"name":"A"}]}]"#,
        ))
        .expect("array should be accepted");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].author_count(), 1);
    }

    #[test]
    fn unparsable_body_is_kept_as_text() {
        assert_eq!(parse_body(""), BodyPayload::Empty);
        assert_eq!(parse_body("{oops"), BodyPayload::Text("{oops".to_string()));
        assert_eq!(
            error_detail(&parse_body("{oops"), "{oops"),
            "{oops".to_string()
        );
    }

    #[test]
    fn status_message_counts_rows() {
        assert_eq!(found_message(0), NO_AUTHORS_MESSAGE);
        assert_eq!(found_message(1), "Found 1 author records.");
        assert_eq!(found_message(12), "Found 12 author records.");
    }

    #[test]
    fn pdf_detection_accepts_media_type_or_extension() {
        assert!(SelectedFile::new("paper.bin", "application/pdf", Vec::new()).is_pdf());
        assert!(SelectedFile::new("PAPER.PDF", "application/octet-stream", Vec::new()).is_pdf());
        assert!(!SelectedFile::new("paper.txt", "text/plain", Vec::new()).is_pdf());
    }

    #[test]
    fn invalid_selection_unstages_previous_file() {
        let mut orchestrator = UploadOrchestrator::new();
        orchestrator
            .select_file(Some(SelectedFile::new("a.pdf", "application/pdf", b"%PDF-1.4".to_vec())))
            .expect("pdf should be accepted");
        assert!(orchestrator.staged_file().is_some());

        let error = orchestrator
            .select_file(Some(SelectedFile::new("notes.txt", "text/plain", Vec::new())))
            .expect_err("text file should be rejected");

        assert_eq!(error.message(), NOT_PDF_MESSAGE);
        assert_eq!(orchestrator.file_error(), Some(NOT_PDF_MESSAGE));
        assert!(orchestrator.staged_file().is_none());
    }

    #[test]
    fn clearing_selection_clears_file_error() {
        let mut orchestrator = UploadOrchestrator::new();
        let _ = orchestrator.select_file(Some(SelectedFile::new("x.doc", "application/msword", Vec::new())));
        orchestrator.select_file(None).expect("clearing never fails");

        assert_eq!(orchestrator.file_error(), None);
        assert!(orchestrator.staged_file().is_none());
    }

    #[test]
    fn sniffs_pdf_magic_when_extension_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("download");
        std::fs::write(&path, b"%PDF-1.7\n%rest").expect("fixture should be written");

        let file = SelectedFile::from_path(&path).expect("file should load");
        assert_eq!(file.name, "download");
        assert_eq!(file.media_type, "application/pdf");
        assert!(file.is_pdf());
    }
}
