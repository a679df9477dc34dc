use sliderblend_core::models::{CreateDocument, Document};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::error::PersistenceError;

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a document with `is_embedded = false`.
    #[tracing::instrument(skip(self, document), fields(db.table = "documents", db.operation = "insert", user_id = %document.user_id))]
    pub async fn create(&self, document: CreateDocument) -> Result<Document, PersistenceError> {
        let document = sqlx::query_as::<Postgres, Document>(
            r#"
            INSERT INTO documents (user_id, document_name, number_of_pages, size, unit, is_embedded)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING *
            "#,
        )
        .bind(document.user_id)
        .bind(&document.document_name)
        .bind(document.number_of_pages)
        .bind(document.size)
        .bind(document.unit().to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, PersistenceError> {
        let document = sqlx::query_as::<Postgres, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", user_id = %user_id))]
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Document>, PersistenceError> {
        let documents = sqlx::query_as::<Postgres, Document>(
            "SELECT * FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }
}
