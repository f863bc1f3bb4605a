use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_STORAGE_DIR: &str = "storage";
const DEFAULT_MAX_UPLOAD_KB: usize = 2048;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Base URL the service is reachable at, used to build links to local uploads.
    pub public_url: String,
    pub max_upload_bytes: usize,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local { root: PathBuf },
    S3(S3Config),
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket_name: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let database_url = required("DATABASE_URL")?;

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let public_url = var("PUBLIC_URL")
            .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&public_url).map_err(|e| ConfigError::Invalid {
            key: "PUBLIC_URL",
            reason: e.to_string(),
        })?;

        let max_upload_kb = match var("MAX_UPLOAD_KB") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| ConfigError::Invalid {
                key: "MAX_UPLOAD_KB",
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_UPLOAD_KB,
        };
        let max_upload_bytes = max_upload_kb
            .checked_mul(1024)
            .ok_or_else(|| ConfigError::Invalid {
                key: "MAX_UPLOAD_KB",
                reason: format!("{} kilobytes is too large", max_upload_kb),
            })?;

        let cors_origins = var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let storage = match var("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageConfig::Local {
                root: PathBuf::from(var("STORAGE_DIR").unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string())),
            },
            "s3" => StorageConfig::S3(S3Config {
                bucket_name: required("S3_BUCKET_NAME")?,
                region: required("AWS_REGION")?,
                access_key_id: required("AWS_ACCESS_KEY_ID")?,
                secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
                endpoint: var("S3_ENDPOINT").map(|endpoint| endpoint.trim_end_matches('/').to_string()),
            }),
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    reason: format!("expected `local` or `s3`, got `{}`", other),
                })
            }
        };

        Ok(Self {
            database_url,
            bind_addr,
            public_url,
            max_upload_bytes,
            cors_origins,
            storage,
        })
    }
}
