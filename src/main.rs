//! CLI entry point for postview

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "postview")]
#[command(version)]
#[command(about = "A markdown blog post viewer with a live preview server", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a post to HTML
    #[command(alias = "r")]
    Render {
        /// Post identifier
        id: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored posts
    List,

    /// Copy a post's code block to the clipboard
    Copy {
        /// Post identifier
        id: String,

        /// Zero-based code block index
        #[arg(short, long, default_value = "0")]
        block: usize,
    },

    /// Create a new post document
    New {
        /// Title of the new post
        title: String,
    },

    /// Start the preview server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Disable content watching and live reload
        #[arg(long)]
        no_watch: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postview=debug,info"
    } else {
        "postview=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command {
        Commands::Render { id, output } => {
            let viewer = postview::Viewer::new(&base_dir)?;
            postview::commands::render::run(&viewer, &id, output.as_deref()).await?;
        }

        Commands::List => {
            let viewer = postview::Viewer::new(&base_dir)?;
            postview::commands::list::run(&viewer).await?;
        }

        Commands::Copy { id, block } => {
            let viewer = postview::Viewer::new(&base_dir)?;
            postview::commands::copy::run(&viewer, &id, block).await?;
        }

        Commands::New { title } => {
            let viewer = postview::Viewer::new(&base_dir)?;
            postview::commands::new::run(&viewer, &title)?;
        }

        Commands::Serve {
            port,
            ip,
            open,
            no_watch,
        } => {
            let viewer = postview::Viewer::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| viewer.config.server.ip.clone());
            let port = port.unwrap_or(viewer.config.server.port);

            tracing::info!("Starting preview server at http://{}:{}", ip, port);
            postview::server::start(&viewer, &ip, port, !no_watch, open).await?;
        }

        Commands::Version => {
            println!("postview version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
