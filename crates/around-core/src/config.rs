//! Configuration module
//!
//! Process-wide settings are read once at startup into a [`Config`] value and
//! passed by reference into every component. Nothing here is global.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const SERVER_PORT: u16 = 8080;
const INDEX_NAME: &str = "around";
const INDEX_DOCUMENT_TYPE: &str = "_doc";
const INDEX_PAGE_SIZE: usize = 1_000;
const INDEX_TIMEOUT_SECS: u64 = 30;
const SEARCH_DEFAULT_RADIUS_KM: f64 = 200.0;
const CLUSTER_THRESHOLD: f64 = 0.75;
const ANNOTATION_URL: &str = "https://vision.googleapis.com/v1/images:annotate";
const ANNOTATION_SUFFIX: &str = ".jpeg";
const ANNOTATION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 32;

/// Blob storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Document index backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    Elasticsearch,
    Memory,
}

impl FromStr for IndexBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elasticsearch" | "es" => Ok(IndexBackend::Elasticsearch),
            "memory" => Ok(IndexBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid index backend: {}", s)),
        }
    }
}

impl Display for IndexBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            IndexBackend::Elasticsearch => write!(f, "elasticsearch"),
            IndexBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Search index settings
#[derive(Clone, Debug)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    pub url: String,
    pub name: String,
    pub document_type: String,
    /// Hits fetched per request while paging through a result set.
    pub page_size: usize,
    pub timeout_secs: u64,
}

/// Blob storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_path: Option<String>,
    pub local_base_url: Option<String>,
}

/// Face annotation backend settings
#[derive(Clone, Debug)]
pub struct AnnotationConfig {
    pub enabled: bool,
    pub url: String,
    pub api_key: Option<String>,
    /// Only attachments with exactly this suffix are sent for annotation.
    pub suffix: String,
    pub timeout_secs: u64,
}

/// Read-side query settings
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub default_radius_km: f64,
    pub cluster_threshold: f64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub max_upload_size_bytes: usize,
    pub index: IndexConfig,
    pub storage: StorageConfig,
    pub annotation: AnnotationConfig,
    pub search: SearchConfig,
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?;

        let index_backend = match lookup("INDEX_BACKEND") {
            Some(s) => s.parse()?,
            None => IndexBackend::Elasticsearch,
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(s) => s.parse()?,
            None => StorageBackend::S3,
        };

        let config = Config {
            server_port,
            environment,
            cors_origins,
            jwt_secret,
            max_upload_size_bytes: parse_or(lookup("MAX_UPLOAD_SIZE_MB"), MAX_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
            index: IndexConfig {
                backend: index_backend,
                url: lookup("ELASTICSEARCH_URL")
                    .unwrap_or_else(|| "http://localhost:9200".to_string()),
                name: lookup("INDEX_NAME").unwrap_or_else(|| INDEX_NAME.to_string()),
                document_type: lookup("INDEX_DOCUMENT_TYPE")
                    .unwrap_or_else(|| INDEX_DOCUMENT_TYPE.to_string()),
                page_size: parse_or(lookup("INDEX_PAGE_SIZE"), INDEX_PAGE_SIZE),
                timeout_secs: parse_or(lookup("INDEX_TIMEOUT_SECS"), INDEX_TIMEOUT_SECS),
            },
            storage: StorageConfig {
                backend: storage_backend,
                bucket: lookup("MEDIA_BUCKET").unwrap_or_default(),
                s3_region: non_empty(lookup("S3_REGION")).or_else(|| non_empty(lookup("AWS_REGION"))),
                s3_endpoint: non_empty(lookup("S3_ENDPOINT")),
                local_path: non_empty(lookup("LOCAL_STORAGE_PATH")),
                local_base_url: non_empty(lookup("LOCAL_STORAGE_BASE_URL")),
            },
            annotation: AnnotationConfig {
                enabled: parse_or(lookup("ANNOTATION_ENABLED").map(|s| s.to_lowercase()), true),
                url: lookup("ANNOTATION_URL").unwrap_or_else(|| ANNOTATION_URL.to_string()),
                api_key: non_empty(lookup("ANNOTATION_API_KEY")),
                suffix: lookup("ANNOTATION_SUFFIX").unwrap_or_else(|| ANNOTATION_SUFFIX.to_string()),
                timeout_secs: parse_or(lookup("ANNOTATION_TIMEOUT_SECS"), ANNOTATION_TIMEOUT_SECS),
            },
            search: SearchConfig {
                default_radius_km: parse_or(
                    lookup("SEARCH_DEFAULT_RADIUS_KM"),
                    SEARCH_DEFAULT_RADIUS_KM,
                ),
                cluster_threshold: parse_or(lookup("CLUSTER_THRESHOLD"), CLUSTER_THRESHOLD),
            },
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Fail fast on settings that would only surface as request failures later.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("PORT cannot be 0"));
        }

        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("JWT_SECRET cannot be empty"));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.index.name.trim().is_empty() {
            return Err(anyhow::anyhow!("INDEX_NAME cannot be empty"));
        }

        if self.index.page_size == 0 {
            return Err(anyhow::anyhow!("INDEX_PAGE_SIZE must be greater than 0"));
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("MEDIA_BUCKET must be set"));
        }

        if self.storage.backend == StorageBackend::S3 && self.storage.s3_region.is_none() {
            return Err(anyhow::anyhow!(
                "S3_REGION or AWS_REGION must be set for the s3 storage backend"
            ));
        }

        if self.storage.backend == StorageBackend::Local
            && (self.storage.local_path.is_none() || self.storage.local_base_url.is_none())
        {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set for the local storage backend"
            ));
        }

        if self.annotation.enabled && self.annotation.api_key.is_none() {
            return Err(anyhow::anyhow!(
                "ANNOTATION_API_KEY must be set when ANNOTATION_ENABLED is true"
            ));
        }

        if !(0.0..=1.0).contains(&self.search.cluster_threshold) {
            return Err(anyhow::anyhow!("CLUSTER_THRESHOLD must be within [0, 1]"));
        }

        if self.search.default_radius_km.is_nan() || self.search.default_radius_km <= 0.0 {
            return Err(anyhow::anyhow!(
                "SEARCH_DEFAULT_RADIUS_KM must be greater than 0"
            ));
        }

        Ok(())
    }
}
