//! RepSage: exercise name resolution server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("REPSAGE_DATA_DIR")
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

fn print_help() {
    println!("RepSage: exercise name resolution server");
    println!();
    println!("Usage: repsage [command]");
    println!();
    println!("Commands:");
    println!("  (none) | serve           Start the server");
    println!("  resolve <name>...        Resolve exercise names and print JSON");
    println!("  help                     Show this help message");
    println!();
    println!("Environment:");
    println!("  REPSAGE_DATA_DIR         Data directory (default: data/)");
    println!("  PORT                     HTTP port (default: 3010)");
    println!("  ANTHROPIC_API_KEY, GROQ_API_KEY, OPENAI_API_KEY");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "serve" => {}
            "resolve" => {
                if args.len() < 3 {
                    eprintln!("Usage: repsage resolve <name>...");
                    std::process::exit(1);
                }
                return resolve_once(&args[2..]).await;
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'repsage help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    serve().await
}

fn open_state() -> anyhow::Result<AppState> {
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = repsage_core::RepSageConfig::from_env(&data_dir)?;
    AppState::open(config)
}

/// `repsage resolve <name>...`: one JSON result per line.
async fn resolve_once(names: &[String]) -> anyhow::Result<()> {
    let state = open_state()?;
    for name in names {
        let result = state.engine.resolve_exercise(name).await;
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}

async fn serve() -> anyhow::Result<()> {
    let state = Arc::new(open_state()?);
    let port = state.config.port;

    // Build router
    let app = routes::build_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("RepSage server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
