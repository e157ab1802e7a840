//! Feedlens: event feedback aggregation server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("FEEDLENS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "report" => {
                return cli::run_report(&resolve_data_dir(), &args[2..]);
            }
            "check-catalog" => {
                let config = feedlens_core::FeedlensConfig::from_env(resolve_data_dir())?;
                let catalog_path = args
                    .get(2)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| config.data_paths.catalog_file.clone());
                let check = cli::check_catalog(&catalog_path, &config.data_paths.records_file);
                cli::print_catalog_check(&check);
                std::process::exit(if check.valid { 0 } else { 1 });
            }
            "--help" | "-h" | "help" => {
                println!("Feedlens: event feedback aggregation server");
                println!();
                println!("Usage: feedlens [command]");
                println!();
                println!("Commands:");
                println!("  (none)                          Start the server");
                println!("  report [--event E]... [--type T]... [--year Y]... [records-file]");
                println!("                                  Print the aggregate table as JSON");
                println!("  check-catalog [catalog-file]    Validate a question catalog");
                println!("  help                            Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'feedlens help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = feedlens_core::FeedlensConfig::from_env(&data_dir)?;
    let port = config.port;

    let catalog = feedlens_aggregate::QuestionCatalog::load(&config.data_paths.catalog_file)
        .map_err(|e| anyhow::anyhow!("Failed to load catalog: {}", e))?;

    // The hosted analyzer owns a blocking HTTP client, which must be built
    // outside the async runtime.
    let analyzer_config = feedlens_analyze::AnalyzerConfig::load(&config.data_paths.llm_config_file);
    let analyzer = feedlens_analyze::create_analyzer(
        &analyzer_config,
        Duration::from_secs(config.analyzer_timeout_secs),
    );
    let status = analyzer_config.to_status();

    let state = Arc::new(AppState::new(config, catalog, analyzer, status));
    if let Err(e) = state.reload_records() {
        warn!("Starting without records: {}", e);
    }

    let app = routes::build_router(state);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let addr = format!("0.0.0.0:{}", port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Feedlens server listening on {}", addr);

        axum::serve(listener, app).await?;
        Ok::<(), anyhow::Error>(())
    })
}
