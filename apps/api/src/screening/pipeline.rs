//! Batch orchestrator: Extractor → Skill Detector → (fallback) → Scorer → persist,
//! once per uploaded CV, with per-document failure isolation.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::cv_match::{MatchStatus, NewCvMatch};
use crate::screening::extractor::{extract_text, extractor_for};
use crate::screening::fallback::fallback_for;
use crate::screening::scoring::score_and_status;
use crate::screening::skills::detect_skills;
use crate::screening::store::{MatchStore, StoreError};
use crate::screening::vocabulary::SkillVocabulary;

const STORED_TEXT_CHARS: usize = 1000;
const PREVIEW_CHARS: usize = 200;

/// A CV as uploaded. Lives only for the duration of one batch call.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

/// What to do when (job, file_name) already has a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Report the document as failed; the existing record is kept.
    Reject,
    /// Replace the existing record.
    Overwrite,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            other => Err(format!("expected 'reject' or 'overwrite', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_batch_size: usize,
    /// Score cutoff for `filtered_count` only; never excludes results.
    pub shortlist_threshold: u8,
    pub fallback_on_empty_skills: bool,
    /// Documents in flight at once within one batch.
    pub concurrency: usize,
    pub duplicate_policy: DuplicatePolicy,
    /// Documents not started within this window are reported `not_attempted`.
    pub deadline: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            shortlist_threshold: 60,
            fallback_on_empty_skills: false,
            concurrency: 1,
            duplicate_policy: DuplicatePolicy::Reject,
            deadline: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("A CV named '{file_name}' was already processed for this job")]
    PersistenceConflict { file_name: String },

    #[error("Failed to save match record: {0}")]
    Persistence(String),

    #[error("Unexpected processing error: {0}")]
    Unexpected(String),
}

impl From<StoreError> for DocumentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { file_name, .. } => DocumentError::PersistenceConflict { file_name },
            StoreError::Database(e) => DocumentError::Persistence(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOutcome {
    Processed,
    Failed,
    NotAttempted,
}

/// Per-document entry of the batch response.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedCv {
    /// Persisted record id; `None` when nothing was saved.
    pub id: Option<i64>,
    pub file_name: String,
    pub skills: Vec<String>,
    pub match_score: u8,
    pub match_status: MatchStatus,
    pub extracted_text_preview: String,
    pub uploaded_at: DateTime<Utc>,
    /// Skills came from the demo fallback rotation, not the document.
    pub fallback_applied: bool,
    pub outcome: DocumentOutcome,
    pub error: Option<String>,
}

impl ProcessedCv {
    fn failed(file_name: String, err: &DocumentError) -> Self {
        Self {
            id: None,
            extracted_text_preview: preview(&format!("Error processing {file_name}: {err}")),
            file_name,
            skills: vec![],
            match_score: 0,
            match_status: MatchStatus::NotMatched,
            uploaded_at: Utc::now(),
            fallback_applied: false,
            outcome: DocumentOutcome::Failed,
            error: Some(err.to_string()),
        }
    }

    fn not_attempted(file_name: String) -> Self {
        Self {
            id: None,
            file_name,
            skills: vec![],
            match_score: 0,
            match_status: MatchStatus::NotMatched,
            extracted_text_preview: String::new(),
            uploaded_at: Utc::now(),
            fallback_applied: false,
            outcome: DocumentOutcome::NotAttempted,
            error: Some("Not attempted: batch deadline exceeded".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub total_processed: usize,
    pub filtered_count: usize,
    /// Every submitted document, highest score first, ties in upload order.
    pub results: Vec<ProcessedCv>,
}

/// Rejects empty or oversized batches before any work is done.
pub fn validate_batch_size(count: usize, max_batch_size: usize) -> Result<(), AppError> {
    if count == 0 {
        return Err(AppError::BatchSize("No CV files provided".to_string()));
    }
    if count > max_batch_size {
        return Err(AppError::BatchSize(format!(
            "Maximum {max_batch_size} CV files allowed, got {count}"
        )));
    }
    Ok(())
}

/// Screens a batch of CVs against a job's requirements and persists one match record per CV.
pub async fn screen_batch(
    store: &dyn MatchStore,
    vocabulary: &Arc<SkillVocabulary>,
    job_id: &str,
    documents: Vec<UploadedDocument>,
    config: &BatchConfig,
) -> Result<BatchResponse, AppError> {
    validate_batch_size(documents.len(), config.max_batch_size)?;

    let job = store
        .get_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    info!(
        job_id,
        documents = documents.len(),
        vocabulary = vocabulary.version(),
        "Screening CV batch"
    );

    let ctx = DocumentContext {
        store,
        vocabulary,
        job_id,
        requirements: &job.requirements,
        config,
        deadline: config.deadline.map(|d| Instant::now() + d),
    };

    // Only the first upload of a file name is screened; repeats would race on
    // the same (job_id, file_name) record.
    let mut seen = HashSet::new();

    // `buffered` yields in input order regardless of completion order.
    let mut results: Vec<ProcessedCv> = stream::iter(documents.into_iter().enumerate())
        .map(|(position, doc)| {
            let repeated = !seen.insert(doc.file_name.clone());
            ctx.process(position, doc, repeated)
        })
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    // Stable: equal scores keep upload order.
    results.sort_by(|a, b| b.match_score.cmp(&a.match_score));

    let total_processed = results
        .iter()
        .filter(|r| r.outcome != DocumentOutcome::NotAttempted)
        .count();
    let filtered_count = results
        .iter()
        .filter(|r| r.match_score >= config.shortlist_threshold)
        .count();

    info!(job_id, total_processed, filtered_count, "CV batch screened");

    Ok(BatchResponse {
        total_processed,
        filtered_count,
        results,
    })
}

struct DocumentContext<'a> {
    store: &'a dyn MatchStore,
    vocabulary: &'a Arc<SkillVocabulary>,
    job_id: &'a str,
    requirements: &'a str,
    config: &'a BatchConfig,
    deadline: Option<Instant>,
}

/// Text and skills pulled out of one document.
struct Analysis {
    text: String,
    skills: Vec<String>,
    extraction_error: Option<String>,
}

impl DocumentContext<'_> {
    async fn process(&self, position: usize, doc: UploadedDocument, repeated: bool) -> ProcessedCv {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(file_name = %doc.file_name, "Batch deadline passed; document not attempted");
            return ProcessedCv::not_attempted(doc.file_name);
        }

        let file_name = doc.file_name.clone();
        let outcome = if repeated {
            Err(DocumentError::PersistenceConflict {
                file_name: file_name.clone(),
            })
        } else {
            self.run(position, doc).await
        };
        match outcome {
            Ok(cv) => cv,
            Err(e) => {
                match &e {
                    DocumentError::PersistenceConflict { .. } => {
                        warn!(file_name = %file_name, job_id = self.job_id, "{e}")
                    }
                    _ => error!(file_name = %file_name, job_id = self.job_id, "Error processing CV: {e}"),
                }
                ProcessedCv::failed(file_name, &e)
            }
        }
    }

    async fn run(&self, position: usize, doc: UploadedDocument) -> Result<ProcessedCv, DocumentError> {
        let file_name = doc.file_name.clone();

        // PDF parsing and pattern matching are CPU-bound.
        let vocabulary = Arc::clone(self.vocabulary);
        let analysis = tokio::task::spawn_blocking(move || analyze(&doc, &vocabulary))
            .await
            .map_err(|e| DocumentError::Unexpected(e.to_string()))?;

        let Analysis {
            mut text,
            mut skills,
            extraction_error,
        } = analysis;

        let mut fallback_applied = false;
        if skills.is_empty() && self.config.fallback_on_empty_skills {
            let fallback = fallback_for(position, &file_name);
            warn!(file_name = %file_name, "No skills detected; substituting fallback skill set");
            skills = fallback.skills;
            text = fallback.summary_text;
            fallback_applied = true;
        }

        let (match_score, match_status) = score_and_status(&skills, self.requirements);

        let record = NewCvMatch {
            job_id: self.job_id.to_string(),
            file_name: file_name.clone(),
            extracted_skills: skills.clone(),
            match_score,
            match_status,
            extracted_text: truncate_chars(&text, STORED_TEXT_CHARS).to_string(),
        };
        let row = match self.config.duplicate_policy {
            DuplicatePolicy::Reject => self.store.create_match_record(&record).await?,
            DuplicatePolicy::Overwrite => self.store.replace_match_record(&record).await?,
        };

        Ok(ProcessedCv {
            id: Some(row.id),
            file_name,
            skills,
            match_score,
            match_status,
            extracted_text_preview: preview(&text),
            uploaded_at: row.uploaded_at,
            fallback_applied,
            outcome: DocumentOutcome::Processed,
            error: extraction_error,
        })
    }
}

fn analyze(doc: &UploadedDocument, vocabulary: &SkillVocabulary) -> Analysis {
    let extractor = extractor_for(&doc.file_name, doc.content_type.as_deref());
    let (text, failure) = extract_text(extractor, &doc.file_name, &doc.content);
    let skills = detect_skills(&text, vocabulary);
    Analysis {
        text,
        skills,
        extraction_error: failure.map(|e| e.to_string()),
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn preview(text: &str) -> String {
    let head = truncate_chars(text, PREVIEW_CHARS);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        text.to_string()
    }
}
