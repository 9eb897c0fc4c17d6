//! Docket — research paper and FDA document server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use docket_core::config::{FDA_FILE, PAPERS_FILE};
use docket_core::DocketConfig;
use docket_store::TopicStore;
use docket_server::{build_router, AppState};

fn print_topics(config: &DocketConfig) {
    let stores = [
        ("papers", TopicStore::new(&config.paths.papers, PAPERS_FILE)),
        ("fda", TopicStore::new(&config.paths.fda, FDA_FILE)),
    ];
    for (label, store) in stores {
        println!("{} ({}):", label, store.base_dir().display());
        let topics = store.list_topics();
        if topics.is_empty() {
            println!("  (none)");
        }
        for topic in topics {
            println!("  {}", topic);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DocketConfig::from_env()?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "serve" => {}
            "topics" => {
                print_topics(&config);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("Docket — research paper and FDA document server");
                println!();
                println!("Usage: docket [command]");
                println!();
                println!("Commands:");
                println!("  (none) | serve           Start the server");
                println!("  topics                   List stored topics");
                println!("  help                     Show this help message");
                println!();
                println!("Environment:");
                println!("  DOCKET_PAPER_DIR, DOCKET_FDA_DIR, HOST, PORT, DOCKET_FDA_SOURCE,");
                println!("  DOCKET_FDA_TIMEOUT_SECS, DOCKET_FIRECRAWL_TIMEOUT_SECS,");
                println!("  DOCKET_ARXIV_TIMEOUT_SECS,");
                println!("  FIRECRAWL_API_URL, FIRECRAWL_API_KEY, DOCKET_CORRUPT_STORE");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'docket help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    config.paths.ensure_dirs()?;
    info!("Paper stores: {}", config.paths.papers.display());
    info!("FDA stores: {}", config.paths.fda.display());
    info!("FDA source: {:?}", config.fda_source);

    let addr = config.bind_addr();
    let state = Arc::new(AppState::from_config(config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Docket server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
