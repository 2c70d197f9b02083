//! Wellmind serve command
//!
//! Loads configuration, picks the scorer, ledger and workflow adapters once at
//! startup, and runs the HTTP API until interrupted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};
use wellmind_core::ledger::HttpLedgerClient;
use wellmind_core::scoring::{HeuristicScorer, HttpRiskScorer};
use wellmind_core::workflow::{HttpWorkflowTrigger, UnconfiguredTrigger};
use wellmind_core::{
    AssessmentPipeline, LedgerAnchor, PipelineConfig, RiskScorer, TursoRecordStore,
    WorkflowTrigger,
};
use wellmind_server::{AppState, ServerConfig, WellmindServer};

use crate::config::{ConfigLoader, WellmindConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Extra config file layered over user and project config
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = ConfigLoader::load(args.config.as_deref())?;
    apply_flags(&mut config, &args);

    let pipeline = build_pipeline(&config).await?;
    let server_config = ServerConfig::new(config.server.host.clone(), config.server.port);

    info!(
        "Starting wellmind server on {}:{}",
        server_config.host, server_config.port
    );

    WellmindServer::new(server_config, AppState::new(pipeline))
        .run()
        .await
        .map_err(Into::into)
}

/// CLI flags are the last configuration layer
fn apply_flags(config: &mut WellmindConfig, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}

/// Open the store and select an adapter for each external service
pub async fn build_pipeline(config: &WellmindConfig) -> Result<AssessmentPipeline> {
    let timeout = Duration::from_secs(config.pipeline.timeout_secs);

    let store = TursoRecordStore::open(&config.database.url, config.database.auth_token.as_deref())
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;
    info!(url = %config.database.url, "record store ready");

    Ok(AssessmentPipeline::new(
        Arc::new(store),
        select_scorer(config, timeout)?,
        select_anchor(config, timeout)?,
        select_trigger(config, timeout)?,
        PipelineConfig {
            call_timeout: timeout,
        },
    ))
}

fn select_scorer(config: &WellmindConfig, timeout: Duration) -> Result<Arc<dyn RiskScorer>> {
    match config.scorer.url.as_deref() {
        Some(url) => {
            let scorer = HttpRiskScorer::new(url, config.scorer.api_key.clone(), timeout)?;
            info!(endpoint = scorer.endpoint(), "using remote scoring service");
            Ok(Arc::new(scorer))
        }
        None => {
            info!("no scoring service configured, using heuristic scorer");
            Ok(Arc::new(HeuristicScorer::new()))
        }
    }
}

fn select_anchor(config: &WellmindConfig, timeout: Duration) -> Result<LedgerAnchor> {
    match config.ledger.credentials() {
        Some(credentials) => {
            let client = HttpLedgerClient::new(
                credentials.url,
                credentials.account_id,
                credentials.private_key,
                timeout,
            )?;
            info!(account = client.account_id(), "anchoring on ledger gateway");
            Ok(LedgerAnchor::with_client(Arc::new(client), timeout))
        }
        None => {
            if config.ledger.account_id.is_some() || config.ledger.private_key.is_some() {
                warn!("ledger configuration incomplete, falling back to simulated anchoring");
            } else {
                info!("no ledger credentials, using simulated anchoring");
            }
            Ok(LedgerAnchor::simulated())
        }
    }
}

fn select_trigger(config: &WellmindConfig, timeout: Duration) -> Result<Arc<dyn WorkflowTrigger>> {
    match config.workflow.url.as_deref() {
        Some(url) => {
            info!(url, "using workflow engine");
            Ok(Arc::new(HttpWorkflowTrigger::new(
                url,
                config.workflow.api_key.clone(),
                timeout,
            )?))
        }
        None => {
            warn!("no workflow engine configured, assessments will be marked failed");
            Ok(Arc::new(UnconfiguredTrigger))
        }
    }
}
