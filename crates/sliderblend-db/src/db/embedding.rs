use async_trait::async_trait;
use pgvector::Vector;
use sliderblend_core::models::{DocumentEmbedding, NewDocumentEmbedding};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::error::PersistenceError;

/// Destination for a document's finished embeddings.
#[async_trait]
pub trait EmbeddingSink: Send + Sync {
    /// Persist every row and mark the document embedded, all or nothing.
    /// Returns the number of rows written.
    async fn store_document_embeddings(
        &self,
        document_id: Uuid,
        rows: Vec<NewDocumentEmbedding>,
    ) -> Result<u64, PersistenceError>;
}

#[derive(Clone)]
pub struct EmbeddingRepository {
    pool: PgPool,
    dimension: usize,
}

impl EmbeddingRepository {
    pub fn new(pool: PgPool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    fn check_rows(&self, rows: &[NewDocumentEmbedding]) -> Result<(), PersistenceError> {
        if rows.is_empty() {
            return Err(PersistenceError::Constraint(
                "a document needs at least one embedding row".to_string(),
            ));
        }
        if let Some(row) = rows.iter().find(|r| r.embedding.len() != self.dimension) {
            return Err(PersistenceError::Dimension {
                expected: self.dimension,
                actual: row.embedding.len(),
            });
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "document_embeddings", db.operation = "select", document_id = %document_id))]
    pub async fn list_for_document(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<DocumentEmbedding>, PersistenceError> {
        let rows = sqlx::query_as::<Postgres, DocumentEmbedding>(
            r#"
            SELECT id, document_id, text, page_number, created_at
            FROM document_embeddings
            WHERE document_id = $1
            ORDER BY page_number, created_at
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "document_embeddings", db.operation = "count", document_id = %document_id))]
    pub async fn count_for_document(&self, document_id: Uuid) -> Result<i64, PersistenceError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_embeddings WHERE document_id = $1")
                .bind(document_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl EmbeddingSink for EmbeddingRepository {
    #[tracing::instrument(skip(self, rows), fields(db.table = "document_embeddings", db.operation = "insert", document_id = %document_id, rows = rows.len()))]
    async fn store_document_embeddings(
        &self,
        document_id: Uuid,
        rows: Vec<NewDocumentEmbedding>,
    ) -> Result<u64, PersistenceError> {
        self.check_rows(&rows)?;

        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM documents WHERE id = $1 FOR UPDATE")
                .bind(document_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(PersistenceError::NotFound {
                entity: "Document",
                id: document_id.to_string(),
            });
        }

        let mut written = 0u64;
        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO document_embeddings (document_id, text, embedding, page_number)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(document_id)
            .bind(&row.text)
            .bind(Vector::from(row.embedding))
            .bind(row.page_number)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        sqlx::query("UPDATE documents SET is_embedded = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(document_id = %document_id, rows = written, "Stored document embeddings");
        Ok(written)
    }
}
