use axum::http::{HeaderName, HeaderValue};
use std::{path::PathBuf, sync::Arc};

use crate::{
    error::{AppError, Result},
    site::SiteService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub site_service: SiteService,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory {
        seed: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: RepositoryBackend,
    pub remote_user_header: HeaderName,
    pub dedup_sites: bool,
    pub cors_allowed_origins: Vec<HeaderValue>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3000")
            .parse()
            .map_err(|_| AppError::Config("PORT must be a number".to_string()))?;

        let backend = match var("REPOSITORY_BACKEND", "postgres").as_str() {
            "postgres" => RepositoryBackend::Postgres {
                database_url: lookup("DATABASE_URL").ok_or_else(|| {
                    AppError::Config("DATABASE_URL must be set for the postgres backend".to_string())
                })?,
                max_connections: var("DATABASE_MAX_CONNECTIONS", "5").parse().map_err(|_| {
                    AppError::Config("DATABASE_MAX_CONNECTIONS must be a number".to_string())
                })?,
            },
            "memory" => RepositoryBackend::Memory {
                seed: lookup("REPOSITORY_SEED").map(PathBuf::from),
            },
            other => {
                return Err(AppError::Config(format!(
                    "Unknown REPOSITORY_BACKEND '{}', expected 'postgres' or 'memory'",
                    other
                )))
            }
        };

        let remote_user_header = HeaderName::from_bytes(
            var("REMOTE_USER_HEADER", "x-remote-user").to_ascii_lowercase().as_bytes(),
        )
        .map_err(|_| AppError::Config("REMOTE_USER_HEADER is not a valid header name".to_string()))?;

        let dedup_sites = var("SITE_MEMBERSHIP_DEDUP", "false")
            .parse()
            .map_err(|_| AppError::Config("SITE_MEMBERSHIP_DEDUP must be true or false".to_string()))?;

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS", "")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                if origin == "*" {
                    return Err(AppError::Config(
                        "CORS_ALLOWED_ORIGINS must list origins explicitly".to_string(),
                    ));
                }
                origin
                    .parse()
                    .map_err(|_| AppError::Config(format!("Invalid CORS origin '{}'", origin)))
            })
            .collect::<Result<Vec<HeaderValue>>>()?;

        Ok(Self {
            host: var("HOST", "127.0.0.1"),
            port,
            backend,
            remote_user_header,
            dedup_sites,
            cors_allowed_origins,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
