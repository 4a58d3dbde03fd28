//! Gitpad - browser-based editor for JSON, YAML, and XML files.
//!
//! Every save is committed to a git repository inside the data directory,
//! so documents carry their own edit history.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

#[derive(Parser)]
#[command(name = "gitpad")]
#[command(author, version, about = "Edit JSON, YAML, and XML files in the browser with versioned saves", long_about = None)]
struct Cli {
    /// File to open in the editor
    filename: Option<String>,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1:3004")]
    address: SocketAddr,

    /// Directory the documents and their history live in
    #[arg(long, default_value = "./data")]
    data_dir: std::path::PathBuf,

    /// Do not open a browser
    #[arg(long)]
    no_open: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server without opening a browser
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = "127.0.0.1:3004")]
        address: SocketAddr,

        /// Directory the documents and their history live in
        #[arg(long, default_value = "./data")]
        data_dir: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Serve { address, data_dir }) => run_server(address, &data_dir).await,
        None => {
            let Some(filename) = cli.filename else {
                anyhow::bail!("usage: gitpad <filename>, or `gitpad serve` for the bare server");
            };
            check_extension(&filename)?;
            run_editor(cli.address, &cli.data_dir, &filename, !cli.no_open).await
        }
    }
}

/// Only formats the editor can validate may be opened from the command line.
fn check_extension(filename: &str) -> anyhow::Result<()> {
    if gitpad_store::Format::from_path(filename).is_none() {
        anyhow::bail!(
            "unsupported file format: {filename} (supported: .json, .yaml, .yml, .xml)"
        );
    }
    Ok(())
}

/// Initialize logging to stdout.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        "gitpad=debug,gitpad_server=debug,gitpad_store=debug,tower_http=debug"
    } else {
        "gitpad=info,gitpad_server=info,gitpad_store=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();
}

/// Run the HTTP server without a browser.
async fn run_server(address: SocketAddr, data_dir: &Path) -> anyhow::Result<()> {
    info!("Starting gitpad server on {}", address);

    let app = build_app(data_dir).await?;

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the server and open the editor for `filename` in a browser.
async fn run_editor(
    address: SocketAddr,
    data_dir: &Path,
    filename: &str,
    open_browser: bool,
) -> anyhow::Result<()> {
    println!();
    println!("  ╭─────────────────────────────────────╮");
    println!("  │           Gitpad Editor             │");
    println!("  ╰─────────────────────────────────────╯");
    println!();

    let app = build_app(data_dir).await?;

    let display_host = if address.ip().is_unspecified() {
        format!("localhost:{}", address.port())
    } else {
        address.to_string()
    };
    let url = format!("http://{display_host}/?file={filename}");

    println!("  Editing:           {}", filename);
    println!("  Web interface:     {}", url);
    println!();
    println!("  Press Ctrl+C to stop the server");
    println!();

    if open_browser {
        let url_clone = url.clone();
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            let _ = open::that(url_clone);
        });
    }

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the store and assemble the router.
async fn build_app(data_dir: &Path) -> anyhow::Result<axum::Router> {
    let store = gitpad_store::FileStore::open(data_dir).await?;
    let state = gitpad_server::AppState::new(store);
    Ok(gitpad_server::create_router(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn supported_extensions_are_accepted() {
        for name in ["a.json", "b.yaml", "c.yml", "d.xml", "UPPER.JSON"] {
            assert!(check_extension(name).is_ok(), "{name} should be editable");
        }
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        for name in ["notes.txt", "archive.tar.gz", "README", "page.html"] {
            assert!(check_extension(name).is_err(), "{name} should be rejected");
        }
    }
}
