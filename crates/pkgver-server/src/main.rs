use pkgver_server::{ServerConfig, ToolCatalog};
use std::env;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    eprintln!("pkgver-server {VERSION} - package version tool server");
    eprintln!();
    eprintln!("Usage: pkgver-server [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --stdio     Use stdio transport (default)");
    eprintln!("  --version   Print version information");
    eprintln!("  --help      Print this help message");
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    for arg in &args {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("pkgver-server {VERSION}");
                return;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            "--stdio" => {
                // Default mode, continue
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {arg}");
                eprintln!("Run 'pkgver-server --help' for usage information.");
                std::process::exit(1);
            }
            _ => {}
        }
    }

    // Logs go to stderr: stdout carries protocol frames
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting pkgver-server v{VERSION}");

    let config = ServerConfig::from_env();
    let catalog = ToolCatalog::standard(&config);

    if let Err(e) = catalog.verify_schemas() {
        tracing::error!("tool catalogue failed schema self-check: {e}");
        std::process::exit(1);
    }

    if let Err(e) = pkgver_server::stdio::serve(&catalog).await {
        tracing::error!("stdio transport failed: {e}");
        std::process::exit(1);
    }
}
