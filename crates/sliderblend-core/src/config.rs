//! Configuration module
//!
//! Environment-driven configuration for the API, the job store, object storage, the
//! embedding provider and the ingestion pipeline.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JOB_TTL_SECONDS: u64 = 36_000;
const PRESIGNED_URL_EXPIRY_SECS: u64 = 3600;
const MAX_DOCUMENT_SIZE_MB: usize = 15;
const EMBEDDING_DIMENSION: usize = 1024;
const EMBEDDING_BATCH_SIZE: usize = 96;
const CHUNK_SIZE: usize = 1000;
const CHUNK_OVERLAP: usize = 200;
const STORAGE_FETCH_TIMEOUT_SECS: u64 = 60;
const EMBEDDING_TIMEOUT_SECS: u64 = 120;

/// Which embedding API the embedder talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProviderKind {
    Cohere,
    Voyage,
}

impl FromStr for EmbeddingProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cohere" => Ok(EmbeddingProviderKind::Cohere),
            "voyage" => Ok(EmbeddingProviderKind::Voyage),
            _ => Err(anyhow::anyhow!("Invalid embedding provider: {}", s)),
        }
    }
}

impl Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EmbeddingProviderKind::Cohere => write!(f, "cohere"),
            EmbeddingProviderKind::Voyage => write!(f, "voyage"),
        }
    }
}

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_format: String,
}

/// Ingestion service configuration
#[derive(Clone, Debug)]
pub struct IngestionConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Job store
    pub redis_url: String,
    pub job_ttl_seconds: u64,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (Filebase, MinIO, ...)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub upload_folder: String,
    pub presigned_url_expiry_secs: u64,
    pub max_document_size_bytes: usize,
    // Embedding configuration
    pub embedding_provider: EmbeddingProviderKind,
    pub cohere_api_key: Option<String>,
    pub voyage_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_input_type: String,
    pub embedding_dimension: usize,
    pub embedding_batch_size: usize,
    // Pipeline configuration
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub storage_fetch_timeout_secs: u64,
    pub embedding_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IngestionConfig>);

impl Config {
    fn as_ingestion(&self) -> &IngestionConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_ingestion().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = IngestionConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_ingestion().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_ingestion().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_ingestion().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_ingestion().base.log_format
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_ingestion().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_ingestion().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.as_ingestion().database_url
    }

    pub fn redis_url(&self) -> &str {
        &self.as_ingestion().redis_url
    }

    pub fn job_ttl(&self) -> Duration {
        Duration::from_secs(self.as_ingestion().job_ttl_seconds)
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_ingestion().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_ingestion().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_ingestion().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_ingestion().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_ingestion().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_ingestion().local_storage_base_url.as_deref()
    }

    pub fn upload_folder(&self) -> &str {
        &self.as_ingestion().upload_folder
    }

    pub fn presigned_url_expiry(&self) -> Duration {
        Duration::from_secs(self.as_ingestion().presigned_url_expiry_secs)
    }

    pub fn max_document_size_bytes(&self) -> usize {
        self.as_ingestion().max_document_size_bytes
    }

    pub fn embedding_provider(&self) -> EmbeddingProviderKind {
        self.as_ingestion().embedding_provider
    }

    pub fn cohere_api_key(&self) -> Option<&str> {
        self.as_ingestion().cohere_api_key.as_deref()
    }

    pub fn voyage_api_key(&self) -> Option<&str> {
        self.as_ingestion().voyage_api_key.as_deref()
    }

    pub fn embedding_model(&self) -> &str {
        &self.as_ingestion().embedding_model
    }

    pub fn embedding_input_type(&self) -> &str {
        &self.as_ingestion().embedding_input_type
    }

    pub fn embedding_dimension(&self) -> usize {
        self.as_ingestion().embedding_dimension
    }

    pub fn embedding_batch_size(&self) -> usize {
        self.as_ingestion().embedding_batch_size
    }

    pub fn chunk_size(&self) -> usize {
        self.as_ingestion().chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.as_ingestion().chunk_overlap
    }

    pub fn storage_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.as_ingestion().storage_fetch_timeout_secs)
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.as_ingestion().embedding_timeout_secs)
    }
}

impl IngestionConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let base = BaseConfig {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .unwrap_or(SERVER_PORT),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?;

        let embedding_provider = env::var("EMBEDDING_PROVIDER")
            .unwrap_or_else(|_| "cohere".to_string())
            .parse::<EmbeddingProviderKind>()?;

        let config = IngestionConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            job_ttl_seconds: env::var("JOB_TTL_SECONDS")
                .unwrap_or_else(|_| JOB_TTL_SECONDS.to_string())
                .parse()
                .unwrap_or(JOB_TTL_SECONDS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            upload_folder: env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "documents".to_string()),
            presigned_url_expiry_secs: env::var("PRESIGNED_URL_EXPIRY_SECS")
                .unwrap_or_else(|_| PRESIGNED_URL_EXPIRY_SECS.to_string())
                .parse()
                .unwrap_or(PRESIGNED_URL_EXPIRY_SECS),
            max_document_size_bytes: env::var("MAX_DOCUMENT_SIZE_MB")
                .unwrap_or_else(|_| MAX_DOCUMENT_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_DOCUMENT_SIZE_MB)
                * 1024
                * 1024,
            embedding_provider,
            cohere_api_key: env::var("COHERE_API_KEY").ok(),
            voyage_api_key: env::var("VOYAGE_API_KEY").ok(),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "embed-english-v3.0".to_string()),
            embedding_input_type: env::var("EMBEDDING_INPUT_TYPE")
                .unwrap_or_else(|_| "search_document".to_string()),
            embedding_dimension: env::var("EMBEDDING_DIMENSION")
                .unwrap_or_else(|_| EMBEDDING_DIMENSION.to_string())
                .parse()
                .unwrap_or(EMBEDDING_DIMENSION),
            embedding_batch_size: env::var("EMBEDDING_BATCH_SIZE")
                .unwrap_or_else(|_| EMBEDDING_BATCH_SIZE.to_string())
                .parse()
                .unwrap_or(EMBEDDING_BATCH_SIZE),
            chunk_size: env::var("CHUNK_SIZE")
                .unwrap_or_else(|_| CHUNK_SIZE.to_string())
                .parse()
                .unwrap_or(CHUNK_SIZE),
            chunk_overlap: env::var("CHUNK_OVERLAP")
                .unwrap_or_else(|_| CHUNK_OVERLAP.to_string())
                .parse()
                .unwrap_or(CHUNK_OVERLAP),
            storage_fetch_timeout_secs: env::var("STORAGE_FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| STORAGE_FETCH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(STORAGE_FETCH_TIMEOUT_SECS),
            embedding_timeout_secs: env::var("EMBEDDING_TIMEOUT_SECS")
                .unwrap_or_else(|_| EMBEDDING_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(EMBEDDING_TIMEOUT_SECS),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.job_ttl_seconds == 0 {
            return Err(anyhow::anyhow!("JOB_TTL_SECONDS must be greater than 0"));
        }

        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        match self.embedding_provider {
            EmbeddingProviderKind::Cohere if self.cohere_api_key.is_none() => {
                return Err(anyhow::anyhow!(
                    "COHERE_API_KEY must be set when EMBEDDING_PROVIDER=cohere"
                ));
            }
            EmbeddingProviderKind::Voyage if self.voyage_api_key.is_none() => {
                return Err(anyhow::anyhow!(
                    "VOYAGE_API_KEY must be set when EMBEDDING_PROVIDER=voyage"
                ));
            }
            _ => {}
        }

        if self.embedding_dimension == 0 {
            return Err(anyhow::anyhow!("EMBEDDING_DIMENSION must be greater than 0"));
        }

        if self.embedding_batch_size == 0 {
            return Err(anyhow::anyhow!("EMBEDDING_BATCH_SIZE must be greater than 0"));
        }

        if self.chunk_size == 0 {
            return Err(anyhow::anyhow!("CHUNK_SIZE must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(anyhow::anyhow!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap,
                self.chunk_size
            ));
        }

        if self.base.log_format != "compact" && self.base.log_format != "json" {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'compact' or 'json'"));
        }

        Ok(())
    }
}
