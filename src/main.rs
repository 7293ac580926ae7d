use badge_leaderboard::{
    build_router,
    config::AppConfig,
    cycle::{start_cycle_scheduler, start_keep_alive, CycleCoordinator},
    fetch::CloudProfileFetcher,
    snapshot::{FileReplicaStore, ReplicaSet, SnapshotReconciler},
    AppState, BadgeClassifier, ScoreCalculator,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "badge_leaderboard")]
#[command(about = "Scrapes public profiles and serves the arcade badge leaderboard")]
#[command(version)]
struct Cli {
    /// TOML configuration file; built-in defaults when absent
    #[arg(short, long, env = "LEADERBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides server.port from the configuration file
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "badge_leaderboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    info!(
        profiles = config.profiles.0.len(),
        replicas = config.replicas.0.len(),
        "Starting badge leaderboard server"
    );

    let replicas = ReplicaSet::new(config.replicas.0.clone())?;
    let reconciler = Arc::new(SnapshotReconciler::new(
        replicas,
        Arc::new(FileReplicaStore::new()),
    ));

    let fetcher = CloudProfileFetcher::new(&config.fetch.user_agent, config.fetch.timeout())?;
    let coordinator = Arc::new(
        CycleCoordinator::builder(Arc::new(fetcher), Arc::clone(&reconciler))
            .with_classifier(BadgeClassifier::new(&config.catalog.lab_free_courses))
            .with_calculator(ScoreCalculator::new(config.catalog.milestones.clone()))
            .with_profiles(config.profiles.0.clone())
            .with_fetch_config(&config.fetch)
            .build(),
    );

    tokio::spawn(start_cycle_scheduler(
        Arc::clone(&coordinator),
        config.schedule.clone(),
    ));
    if let Some(url) = config.schedule.keep_alive_url.clone() {
        tokio::spawn(start_keep_alive(url, config.schedule.keep_alive_interval()));
    }

    let app = build_router(AppState::new(reconciler, coordinator));

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
