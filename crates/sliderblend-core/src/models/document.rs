use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

const BYTES_PER_KB: i64 = 1024;
const BYTES_PER_MB: i64 = 1024 * 1024;

/// Display unit for a document's size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileUnit {
    Kb,
    Mb,
}

impl FileUnit {
    /// Megabytes from 1 MiB upwards, kilobytes below.
    pub fn for_size(size_bytes: i64) -> Self {
        if size_bytes >= BYTES_PER_MB {
            FileUnit::Mb
        } else {
            FileUnit::Kb
        }
    }

    pub fn scale(&self, size_bytes: i64) -> f64 {
        match self {
            FileUnit::Kb => size_bytes as f64 / BYTES_PER_KB as f64,
            FileUnit::Mb => size_bytes as f64 / BYTES_PER_MB as f64,
        }
    }
}

impl Display for FileUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileUnit::Kb => write!(f, "KB"),
            FileUnit::Mb => write!(f, "MB"),
        }
    }
}

impl FromStr for FileUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "KB" => Ok(FileUnit::Kb),
            "MB" => Ok(FileUnit::Mb),
            _ => Err(anyhow::anyhow!("Invalid file unit: {}", s)),
        }
    }
}

/// A stored PDF owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Object store key of the uploaded file.
    pub document_name: String,
    pub number_of_pages: i32,
    pub size: i64,
    pub unit: FileUnit,
    pub is_embedded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "sqlx")]
impl sqlx::FromRow<'_, sqlx::postgres::PgRow> for Document {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Document {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            document_name: row.try_get("document_name")?,
            number_of_pages: row.try_get("number_of_pages")?,
            size: row.try_get("size")?,
            unit: row.try_get::<String, _>("unit")?.parse().map_err(|e| {
                sqlx::Error::Decode(format!("Failed to parse unit: {}", e).into())
            })?,
            is_embedded: row.try_get("is_embedded")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Input for creating a document row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub user_id: Uuid,
    pub document_name: String,
    pub number_of_pages: i32,
    pub size: i64,
}

impl CreateDocument {
    pub fn unit(&self) -> FileUnit {
        FileUnit::for_size(self.size)
    }
}

/// One chunk ready to be written: its text, vector and 1-based page number.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocumentEmbedding {
    pub page_number: i32,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A persisted chunk embedding (vector omitted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DocumentEmbedding {
    pub id: Uuid,
    pub document_id: Uuid,
    pub text: String,
    pub page_number: i32,
    pub created_at: DateTime<Utc>,
}
