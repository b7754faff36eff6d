//! Collab Server
//!
//! axum server in front of the agent team: single-shot generation, team
//! runs with a live event stream, and browsing of stored sessions. The
//! `run` command drives one pipeline run from the terminal.

mod api;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use clap::{Parser, Subcommand};
use collab_core::backend::GenerationBackend;
use collab_core::models::{BackendKind, ModelConfig};
use collab_core::skills::Team;
use collab_core::state::{db::DEFAULT_DB_PATH, CollabDb, SessionManager, SessionStore};
use collab_core::team::{Coordinator, CoordinatorConfig, StageOptions, TeamEvent};
use collab_core::tools::{SearchConfig, SearchProvider};
use collab_core::BackendError;
use serde_json::{json, Value};
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc},
};
use tracing_subscriber::EnvFilter;

/// Application state
pub struct AppState {
    /// Shared generation backend, or why it could not be built
    pub backend: Result<Arc<dyn GenerationBackend>, BackendError>,
    pub backend_kind: BackendKind,
    pub search_provider: &'static str,
    /// `None` when the team failed to assemble
    pub coordinator: Option<Arc<Coordinator>>,
    pub store: Arc<dyn SessionStore>,
    pub event_tx: broadcast::Sender<TeamEvent>,
}

pub type SharedState = Arc<AppState>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Collab - Four-agent writing team")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Start the Collab server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        /// Session database file
        #[arg(long, env = "COLLAB_DB_PATH", default_value = DEFAULT_DB_PATH)]
        db: PathBuf,
    },
    /// Run the team on a task (CLI mode, no server)
    Run {
        /// The task to work on
        task: String,
        #[arg(long)]
        skip_planning: bool,
        #[arg(long)]
        skip_research: bool,
        #[arg(long)]
        skip_writing: bool,
        #[arg(long)]
        skip_review: bool,
        /// Print the whole run result as JSON
        #[arg(long)]
        json: bool,
        /// Session database file
        #[arg(long, env = "COLLAB_DB_PATH", default_value = DEFAULT_DB_PATH)]
        db: PathBuf,
    },
}

fn default_db_path() -> PathBuf {
    std::env::var("COLLAB_DB_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

fn open_store(path: &Path) -> anyhow::Result<Arc<dyn SessionStore>> {
    let db = CollabDb::open_at(path)
        .with_context(|| format!("Failed to open session database {}", path.display()))?;
    Ok(Arc::new(SessionManager::new(&db)))
}

/// Build and initialize the team. Logs and returns `None` on failure.
async fn assemble_team(
    backend: &Result<Arc<dyn GenerationBackend>, BackendError>,
    search: Arc<dyn SearchProvider>,
) -> Option<Team> {
    let backend = match backend {
        Ok(backend) => backend.clone(),
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "Generation backend not configured");
            return None;
        }
    };

    match Team::assemble(backend, search).await {
        Ok(team) => Some(team),
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "Failed to initialize agent team");
            None
        }
    }
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    let model = state.backend.as_ref().ok().map(|b| b.model().to_string());
    Json(json!({
        "status": "ok",
        "provider": state.backend_kind.as_str(),
        "model": model,
        "features": {
            "team": state.coordinator.is_some(),
            "search": state.search_provider,
            "persistence": true,
        },
        "timestamp": Utc::now(),
    }))
}

// === Server Entry ===

async fn run_server(host: IpAddr, port: u16, db_path: PathBuf) -> anyhow::Result<()> {
    let model_config = ModelConfig::from_env();
    let search_config = SearchConfig::from_env();
    tracing::info!(
        provider = model_config.kind.display_name(),
        model = %model_config.model,
        search = search_config.provider_name(),
        "Configuration loaded"
    );

    let backend = model_config.create_backend();
    let search = search_config.create_provider();
    let store = open_store(&db_path)?;
    let (event_tx, _) = broadcast::channel::<TeamEvent>(100);

    let coordinator = match assemble_team(&backend, search).await {
        Some(team) => {
            let (event_mpsc_tx, mut event_mpsc_rx) = mpsc::channel::<TeamEvent>(100);

            // Bridge coordinator events to every SSE subscriber
            let broadcast_tx = event_tx.clone();
            tokio::spawn(async move {
                while let Some(event) = event_mpsc_rx.recv().await {
                    let _ = broadcast_tx.send(event);
                }
            });

            let coordinator = Coordinator::new(team, store.clone(), CoordinatorConfig::default())
                .with_event_channel(event_mpsc_tx);
            Some(Arc::new(coordinator))
        }
        None => None,
    };

    let state: SharedState = Arc::new(AppState {
        backend,
        backend_kind: model_config.kind,
        search_provider: search_config.provider_name(),
        coordinator,
        store,
        event_tx,
    });

    let app = Router::new()
        .merge(api::team::team_routes())
        .merge(api::sessions::session_routes())
        .route("/health", get(health))
        .with_state(state.clone());

    let addr = SocketAddr::new(host, port);
    tracing::info!(
        %addr,
        team = state.coordinator.is_some(),
        db = %db_path.display(),
        "Collab server listening"
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_once(
    task: &str,
    options: StageOptions,
    json: bool,
    db_path: PathBuf,
) -> anyhow::Result<()> {
    let backend = ModelConfig::from_env().create_backend()?;
    let search = SearchConfig::from_env().create_provider();
    let team = Team::assemble(backend, search)
        .await
        .context("Failed to initialize agent team")?;
    let store = open_store(&db_path)?;

    let coordinator = Coordinator::new(team, store, CoordinatorConfig::default());
    let result = coordinator.run(task, options).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.final_output.summary());
    if let Some(title) = result.final_output.title() {
        println!("\n# {}\n", title);
    }
    if let Some(content) = result.final_output.content() {
        println!("{}", content);
    }
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before argument parsing so `COLLAB_DB_PATH` from .env is honored
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    match args.command {
        Some(CliCommand::Serve { port, host, db }) => run_server(host, port, db).await,
        None => run_server(IpAddr::from([127, 0, 0, 1]), 5000, default_db_path()).await,
        Some(CliCommand::Run {
            task,
            skip_planning,
            skip_research,
            skip_writing,
            skip_review,
            json,
            db,
        }) => {
            let options = StageOptions {
                skip_planning,
                skip_research,
                skip_writing,
                skip_review,
            };
            run_once(&task, options, json, db).await
        }
    }
}
