//! CLI entry point for anomia

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anomia::commands::new::NewPostArgs;

#[derive(Parser)]
#[command(name = "anomia")]
#[command(version)]
#[command(about = "A small philosophy blog with pluggable content storage", long_about = None)]
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
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Subtitle shown under the title
        #[arg(short, long)]
        subtitle: String,

        /// Post body
        #[arg(short = 'b', long)]
        content: String,

        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,

        /// Cover image URL (a placeholder is used when absent)
        #[arg(long)]
        image_url: Option<String>,

        /// Description of the cover image
        #[arg(long)]
        image_hint: Option<String>,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag, comment)
        #[arg(default_value = "post")]
        r#type: String,

        /// Search text for posts, or the post id for comments
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show a post with its comments
    Show {
        /// Post id
        id: String,
    },

    /// Comment on a post
    Comment {
        /// Post id
        post_id: String,

        /// Commenter name
        #[arg(short, long)]
        author: String,

        /// Comment text
        content: String,
    },

    /// Delete a post and its comments
    Delete {
        /// Post id
        id: String,
    },

    /// Start the API server
    #[command(alias = "s")]
    Server {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "anomia=debug,info"
    } else {
        "anomia=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            let password = anomia::commands::init::init_site(&target_dir).await?;
            println!("Initialized site in {:?}", target_dir);
            println!("Admin password: {}", password);
        }

        Commands::New {
            title,
            subtitle,
            content,
            tags,
            image_url,
            image_hint,
        } => {
            let site = anomia::Anomia::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            anomia::commands::new::create_post(
                &site,
                NewPostArgs {
                    title,
                    subtitle,
                    content,
                    tags,
                    image_url,
                    image_hint,
                },
            )
            .await?;
        }

        Commands::List { r#type, query } => {
            let site = anomia::Anomia::new(&base_dir)?;
            anomia::commands::list::run(&site, &r#type, query.as_deref()).await?;
        }

        Commands::Show { id } => {
            let site = anomia::Anomia::new(&base_dir)?;
            anomia::commands::show::run(&site, &id).await?;
        }

        Commands::Comment {
            post_id,
            author,
            content,
        } => {
            let site = anomia::Anomia::new(&base_dir)?;
            anomia::commands::comment::add_comment(&site, &post_id, &author, &content).await?;
        }

        Commands::Delete { id } => {
            let site = anomia::Anomia::new(&base_dir)?;
            anomia::commands::delete::run(&site, &id).await?;
        }

        Commands::Server { port, ip } => {
            let site = anomia::Anomia::new(&base_dir)?;
            let port = port.unwrap_or(site.config.server.port);
            let ip = ip.unwrap_or_else(|| site.config.server.ip.clone());

            tracing::info!("Starting server at http://{}:{}", ip, port);
            anomia::server::start(&site, &ip, port).await?;
        }

        Commands::Version => {
            println!("anomia version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
