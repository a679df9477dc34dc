use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Key prefix for job records in the key-value store.
pub const JOB_KEY_PREFIX: &str = "job:";

/// Wire format of `Job::date_published`.
pub const DATE_PUBLISHED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata key holding the source document id.
pub const METADATA_DOCUMENT_ID: &str = "document_id";

/// Metadata key holding the object store key of the uploaded file.
pub const METADATA_FILE_KEY: &str = "file_key";

/// Flat string map carried across pipeline stages.
pub type JobMetadata = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    NotStarted,
    Uploading,
    Embedding,
    Completed,
    Failed,
}

impl ProcessState {
    pub const ALL: [ProcessState; 5] = [
        ProcessState::NotStarted,
        ProcessState::Uploading,
        ProcessState::Embedding,
        ProcessState::Completed,
        ProcessState::Failed,
    ];

    /// `Completed` and `Failed` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Completed | ProcessState::Failed)
    }

    pub fn can_transition_to(&self, next: ProcessState) -> bool {
        use ProcessState::*;
        match (self, next) {
            (NotStarted, Uploading) | (NotStarted, Embedding) => true,
            (Uploading, Embedding) => true,
            (Embedding, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProcessState::NotStarted => write!(f, "not_started"),
            ProcessState::Uploading => write!(f, "uploading"),
            ProcessState::Embedding => write!(f, "embedding"),
            ProcessState::Completed => write!(f, "completed"),
            ProcessState::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ProcessState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ProcessState::NotStarted),
            "uploading" => Ok(ProcessState::Uploading),
            "embedding" => Ok(ProcessState::Embedding),
            "completed" => Ok(ProcessState::Completed),
            "failed" => Ok(ProcessState::Failed),
            _ => Err(anyhow::anyhow!("Invalid process state: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid job transition from {from} to {to}")]
pub struct TransitionError {
    pub from: ProcessState,
    pub to: ProcessState,
}

/// One asynchronous document-processing request.
///
/// A `Job` is a snapshot: `advance` consumes it and returns the next snapshot, so only
/// the owner of the value (the pipeline) can move it forward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub job_id: Uuid,
    pub process_state: ProcessState,
    pub metadata: Option<JobMetadata>,
    pub is_complete: bool,
    #[serde(with = "date_published_format")]
    pub date_published: NaiveDateTime,
}

impl Job {
    pub fn new(metadata: Option<JobMetadata>) -> Self {
        Job {
            job_id: Uuid::new_v4(),
            process_state: ProcessState::NotStarted,
            metadata,
            is_complete: false,
            date_published: Utc::now().naive_utc().trunc_subsecs(0),
        }
    }

    /// Job for processing an uploaded document stored under `file_key`.
    pub fn for_document(document_id: Uuid, file_key: impl Into<String>) -> Self {
        let mut metadata = JobMetadata::new();
        metadata.insert(METADATA_DOCUMENT_ID.to_string(), document_id.to_string());
        metadata.insert(METADATA_FILE_KEY.to_string(), file_key.into());
        Job::new(Some(metadata))
    }

    pub fn key(&self) -> String {
        Self::key_for(self.job_id)
    }

    pub fn key_for(job_id: Uuid) -> String {
        format!("{}{}", JOB_KEY_PREFIX, job_id)
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    /// Returns None when the entry is missing or is not a UUID.
    pub fn document_id(&self) -> Option<Uuid> {
        self.metadata_value(METADATA_DOCUMENT_ID)
            .and_then(|v| Uuid::parse_str(v).ok())
    }

    pub fn file_key(&self) -> Option<&str> {
        self.metadata_value(METADATA_FILE_KEY)
    }

    pub fn is_terminal(&self) -> bool {
        self.process_state.is_terminal()
    }

    pub fn advance(self, next: ProcessState) -> Result<Job, TransitionError> {
        if !self.process_state.can_transition_to(next) {
            return Err(TransitionError {
                from: self.process_state,
                to: next,
            });
        }
        Ok(Job {
            process_state: next,
            is_complete: next == ProcessState::Completed,
            ..self
        })
    }
}

mod date_published_format {
    use super::DATE_PUBLISHED_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(DATE_PUBLISHED_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_PUBLISHED_FORMAT).map_err(serde::de::Error::custom)
    }
}
