use super::types::{
    DEFAULT_DATABASE_URL, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, DatabaseConfig,
    LedgerConfig, PipelineConfig, RawDatabaseConfig, RawPipelineConfig, RawServerConfig,
    RawWellmindConfig, ScorerConfig, ServerConfig, WellmindConfig, WorkflowConfig,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Overrides the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "WELLMIND_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + explicit file + environment)
    pub fn load(explicit: Option<&Path>) -> Result<WellmindConfig> {
        Self::load_with_env(explicit, |key| std::env::var(key).ok())
    }

    /// Load with a custom environment lookup
    pub fn load_with_env<F>(explicit: Option<&Path>, env: F) -> Result<WellmindConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawWellmindConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_layer(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path_with(&env);
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_layer(&project_path)?);
        }

        // Layer 3: Explicit --config file, which must exist
        if let Some(path) = explicit {
            raw = Self::merge_raw(raw, Self::read_layer(path)?);
        }

        // Layer 4: Environment
        raw = Self::merge_raw(raw, Self::env_layer(&env)?);

        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "wellmind").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with WELLMIND_PROJECT_CONFIG_DIR
    pub fn project_config_path() -> PathBuf {
        Self::project_config_path_with(|key| std::env::var(key).ok())
    }

    fn project_config_path_with<F>(env: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        match env(PROJECT_CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir).join("config.toml"),
            None => PathBuf::from(".wellmind/config.toml"),
        }
    }

    fn read_layer(path: &Path) -> Result<RawWellmindConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Values taken from the process environment
    fn env_layer<F>(env: F) -> Result<RawWellmindConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match env("WELLMIND_TIMEOUT_SECS") {
            Some(value) => Some(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("WELLMIND_TIMEOUT_SECS is not a number: {}", value))?,
            ),
            None => None,
        };

        Ok(RawWellmindConfig {
            server: RawServerConfig::default(),
            database: RawDatabaseConfig {
                url: env("DATABASE_URL"),
                auth_token: env("DATABASE_AUTH_TOKEN"),
            },
            scorer: ScorerConfig {
                url: env("SCORER_URL"),
                api_key: env("SCORER_API_KEY"),
            },
            ledger: LedgerConfig {
                url: env("LEDGER_URL"),
                account_id: env("LEDGER_ACCOUNT_ID"),
                private_key: env("LEDGER_PRIVATE_KEY"),
            },
            workflow: WorkflowConfig {
                url: env("WORKFLOW_URL"),
                api_key: env("WORKFLOW_API_KEY"),
            },
            pipeline: RawPipelineConfig { timeout_secs },
        })
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawWellmindConfig, overlay: RawWellmindConfig) -> RawWellmindConfig {
        RawWellmindConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            database: RawDatabaseConfig {
                url: overlay.database.url.or(base.database.url),
                auth_token: overlay.database.auth_token.or(base.database.auth_token),
            },
            scorer: ScorerConfig {
                url: overlay.scorer.url.or(base.scorer.url),
                api_key: overlay.scorer.api_key.or(base.scorer.api_key),
            },
            ledger: LedgerConfig {
                url: overlay.ledger.url.or(base.ledger.url),
                account_id: overlay.ledger.account_id.or(base.ledger.account_id),
                private_key: overlay.ledger.private_key.or(base.ledger.private_key),
            },
            workflow: WorkflowConfig {
                url: overlay.workflow.url.or(base.workflow.url),
                api_key: overlay.workflow.api_key.or(base.workflow.api_key),
            },
            pipeline: RawPipelineConfig {
                timeout_secs: overlay.pipeline.timeout_secs.or(base.pipeline.timeout_secs),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawWellmindConfig) -> WellmindConfig {
        WellmindConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            database: DatabaseConfig {
                url: raw
                    .database
                    .url
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
                auth_token: raw.database.auth_token,
            },
            scorer: raw.scorer,
            ledger: raw.ledger,
            workflow: raw.workflow,
            pipeline: PipelineConfig {
                timeout_secs: raw.pipeline.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
        }
    }
}
