use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 4310;
const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_MAX_NEW_TOKENS: u32 = 1024;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".spikescout")
}

// ─── DraftConfig ──────────────────────────────────────────────────────────────

/// External text-generation endpoint (`[draft]` in config.toml).
///
/// An empty endpoint disables drafting; every other feature keeps working.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// Full URL of the generation endpoint. Empty = drafting disabled.
    pub endpoint: String,
    /// Bearer token. Falls back to the GENERATION_API_TOKEN env var.
    pub api_token: Option<String>,
    /// Token budget forwarded to the model.
    pub max_new_tokens: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_token: None,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            timeout_secs: 60,
        }
    }
}

// ─── File config ──────────────────────────────────────────────────────────────

/// On-disk `config.toml` shape. Every field is optional; CLI flags and env
/// vars win over the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    port: Option<u16>,
    bind_address: Option<String>,
    log: Option<String>,
    refresh_interval_secs: Option<u64>,
    slow_query_ms: Option<u64>,
    draft: Option<DraftConfig>,
}

// ─── ServerConfig ─────────────────────────────────────────────────────────────

/// Resolved daemon configuration: CLI flags layered over `config.toml`
/// layered over defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub bind_address: String,
    pub data_dir: PathBuf,
    /// tracing filter directive, e.g. "info" or "spikescout=debug".
    pub log_level: String,
    /// Interval of the periodic thread-snapshot refresh task.
    pub refresh_interval_secs: u64,
    /// Slow-query WARN threshold in milliseconds; 0 disables.
    pub slow_query_ms: u64,
    pub draft: DraftConfig,
}

impl ServerConfig {
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let file = load_file(&data_dir.join("config.toml"));

        let mut draft = file.draft.unwrap_or_default();
        if draft.api_token.is_none() {
            draft.api_token = std::env::var("GENERATION_API_TOKEN").ok();
        }

        Self {
            port: port.or(file.port).unwrap_or(DEFAULT_PORT),
            bind_address: bind_address
                .or(file.bind_address)
                .unwrap_or_else(default_bind_address),
            log_level: log.or(file.log).unwrap_or_else(|| "info".to_string()),
            refresh_interval_secs: file.refresh_interval_secs.unwrap_or(DEFAULT_REFRESH_SECS),
            slow_query_ms: file.slow_query_ms.unwrap_or(0),
            data_dir,
            draft,
        }
    }
}

/// Read and parse `config.toml`. A missing file is normal; a malformed one
/// is logged and ignored so the daemon still starts.
fn load_file(path: &Path) -> FileConfig {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return FileConfig::default();
    };
    match toml::from_str::<FileConfig>(&raw) {
        Ok(cfg) => {
            info!(path = %path.display(), "loaded config file");
            cfg
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            FileConfig::default()
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
