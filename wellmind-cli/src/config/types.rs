use serde::{Deserialize, Serialize};

/// Default host for the wellmind server
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for the wellmind server
pub const DEFAULT_PORT: u16 = 5000;

/// Default database location (local file next to the working directory)
pub const DEFAULT_DATABASE_URL: &str = "wellmind.db";

/// Default bound on each external call, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Placeholder printed instead of secrets
pub const REDACTED: &str = "********";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWellmindConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub database: RawDatabaseConfig,

    #[serde(default)]
    pub scorer: ScorerConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub pipeline: RawPipelineConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDatabaseConfig {
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPipelineConfig {
    pub timeout_secs: Option<u64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WellmindConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub scorer: ScorerConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl WellmindConfig {
    /// Copy with every secret replaced by [`REDACTED`]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        redact(&mut config.database.auth_token);
        redact(&mut config.scorer.api_key);
        redact(&mut config.ledger.private_key);
        redact(&mut config.workflow.api_key);
        config
    }
}

fn redact(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some(REDACTED.to_string());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port for the wellmind server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `:memory:`, a local file path, or a `libsql://` / `https://` URL
    pub url: String,

    /// Token for remote databases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            auth_token: None,
        }
    }
}

/// Remote scoring service. Without a URL the local heuristic scorer is used.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScorerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Ledger gateway. Anchoring is simulated unless all three are set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// Gateway credentials when every field is present and non-blank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCredentials<'a> {
    pub url: &'a str,
    pub account_id: &'a str,
    pub private_key: &'a str,
}

impl LedgerConfig {
    pub fn credentials(&self) -> Option<LedgerCredentials<'_>> {
        Some(LedgerCredentials {
            url: non_blank(&self.url)?,
            account_id: non_blank(&self.account_id)?,
            private_key: non_blank(&self.private_key)?,
        })
    }
}

/// Workflow engine. Without a URL every trigger is recorded as failed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkflowConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Bound on each scorer, ledger and workflow call
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
