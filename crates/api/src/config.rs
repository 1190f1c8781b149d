use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use atelier_provider::promotion::PromotionPolicy;
use atelier_provider::TrackerConfig;

/// Where durable artifacts (inputs, promoted outputs, gallery index) live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Files under `dir`, served by this process at `/artifacts`.
    Local {
        dir: PathBuf,
        public_base_url: String,
    },
    /// An S3 bucket, served from `public_base_url`.
    S3 {
        bucket: String,
        prefix: Option<String>,
        public_base_url: String,
    },
    /// Process memory. Lost on restart; intended for development and tests.
    Memory { public_base_url: String },
}

impl StorageConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::S3 { .. } => "s3",
            Self::Memory { .. } => "memory",
        }
    }
}

/// Connection settings for the generation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_url: String,
    /// Bearer token. `None` sends unauthenticated requests.
    pub api_key: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `360`). Generation requests
    /// block while the batch is tracked, so this must exceed the tracker bound.
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes (default: 64 MiB).
    pub max_body_bytes: usize,
    pub provider: ProviderConfig,
    pub tracker: TrackerConfig,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                              |
    /// |----------------------------|--------------------------------------|
    /// | `HOST`                     | `0.0.0.0`                            |
    /// | `PORT`                     | `3000`                               |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`              |
    /// | `REQUEST_TIMEOUT_SECS`     | `360`                                |
    /// | `MAX_BODY_BYTES`           | `67108864`                           |
    /// | `PROVIDER_API_URL`         | `https://api.example-imagegen.com`   |
    /// | `PROVIDER_API_KEY`         | (none)                               |
    /// | `TRACKER_MAX_ATTEMPTS`     | `60`                                 |
    /// | `TRACKER_POLL_INTERVAL_MS` | `5000`                               |
    /// | `PROMOTE_ARTIFACTS`        | `first` (`none`, `first`, `all`)     |
    /// | `STORAGE_BACKEND`          | `local` (`local`, `s3`, `memory`)    |
    /// | `LOCAL_STORAGE_DIR`        | `./data/artifacts`                   |
    /// | `PUBLIC_BASE_URL`          | `http://localhost:3000/artifacts`    |
    /// | `S3_BUCKET`                | required when backend is `s3`        |
    /// | `S3_PREFIX`                | (none)                               |
    /// | `S3_PUBLIC_BASE_URL`       | `https://<bucket>.s3.amazonaws.com`  |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let optional = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = var("HOST", "0.0.0.0");
        let port: u16 = parse("PORT", &var("PORT", "3000"));

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 =
            parse("REQUEST_TIMEOUT_SECS", &var("REQUEST_TIMEOUT_SECS", "360"));
        let max_body_bytes: usize = parse("MAX_BODY_BYTES", &var("MAX_BODY_BYTES", "67108864"));

        let provider = ProviderConfig {
            api_url: var("PROVIDER_API_URL", "https://api.example-imagegen.com"),
            api_key: optional("PROVIDER_API_KEY"),
        };

        let tracker = TrackerConfig {
            max_attempts: parse("TRACKER_MAX_ATTEMPTS", &var("TRACKER_MAX_ATTEMPTS", "60")),
            poll_interval: Duration::from_millis(parse(
                "TRACKER_POLL_INTERVAL_MS",
                &var("TRACKER_POLL_INTERVAL_MS", "5000"),
            )),
            promotion: parse::<PromotionPolicy>(
                "PROMOTE_ARTIFACTS",
                &var("PROMOTE_ARTIFACTS", "first"),
            ),
        };

        let storage = match var("STORAGE_BACKEND", "local").to_ascii_lowercase().as_str() {
            "local" => StorageConfig::Local {
                dir: PathBuf::from(var("LOCAL_STORAGE_DIR", "./data/artifacts")),
                public_base_url: var("PUBLIC_BASE_URL", "http://localhost:3000/artifacts"),
            },
            "memory" => StorageConfig::Memory {
                public_base_url: var("PUBLIC_BASE_URL", "http://localhost:3000/artifacts"),
            },
            "s3" => {
                let bucket =
                    optional("S3_BUCKET").expect("S3_BUCKET must be set when STORAGE_BACKEND=s3");
                let public_base_url = optional("S3_PUBLIC_BASE_URL")
                    .unwrap_or_else(|| format!("https://{bucket}.s3.amazonaws.com"));
                StorageConfig::S3 {
                    bucket,
                    prefix: optional("S3_PREFIX"),
                    public_base_url,
                }
            }
            other => panic!("STORAGE_BACKEND must be one of local, s3, memory (got '{other}')"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_body_bytes,
            provider,
            tracker,
            storage,
        }
    }

    /// `true` when a full tracking run fits inside the request timeout.
    pub fn timeout_covers_tracker(&self) -> bool {
        Duration::from_secs(self.request_timeout_secs) > self.tracker.max_wait()
    }
}

fn parse<T>(key: &str, raw: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}"))
}
