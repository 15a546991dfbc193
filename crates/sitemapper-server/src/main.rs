//! Sitemapper demo server entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use sitemapper_server::{demo, serve, ConfigOverrides, ServerConfig};

#[derive(Parser)]
#[command(
    name = "sitemapper-server",
    about = "Demo web site serving a generated sitemap and sitemap index",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Host (and optional port) written into sitemap URLs.
    /// Also reads from SITEMAPPER_SERVER_NAME.
    #[arg(long, global = true)]
    server_name: Option<String>,

    /// Write http:// URLs instead of https://.
    #[arg(long, global = true)]
    http: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default).
    Serve {
        /// Listen address (host:port).
        /// Also reads from SITEMAPPER_ADDR.
        #[arg(long)]
        addr: Option<String>,

        /// Gzip sitemap responses for clients that accept it.
        #[arg(long)]
        gzip: bool,

        /// Cache the first rendered sitemap.
        #[arg(long)]
        cache: bool,
    },

    /// Print the demo sitemap to stdout.
    Render {
        /// Print the sitemap index instead.
        #[arg(long)]
        index: bool,

        /// Print resolved entries as JSON instead of XML.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   sitemapper-server completions bash > ~/.local/share/bash-completion/completions/sitemapper-server
    ///   sitemapper-server completions zsh > ~/.zfunc/_sitemapper-server
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut overrides = ConfigOverrides {
        server_name: cli.server_name,
        // Flags only override when given.
        https: cli.http.then_some(false),
        ..Default::default()
    };

    match cli.command.unwrap_or(Commands::Serve {
        addr: None,
        gzip: false,
        cache: false,
    }) {
        Commands::Serve { addr, gzip, cache } => {
            overrides.addr = addr;
            overrides.gzip = gzip.then_some(true);
            overrides.cache = cache.then_some(true);
            let config = ServerConfig::resolve(overrides)?;

            let site = demo::build(&config)?;
            tracing::info!("Sitemapper demo server");
            tracing::info!(
                "Sitemap: {}://{}/sitemap.xml",
                site.state.sitemap.scheme(),
                config.server_name
            );
            serve(&config.addr, site.router).await?;
        }

        Commands::Render { index, json } => {
            let config = ServerConfig::resolve(overrides)?;
            let site = demo::build(&config)?;
            let sitemap = site.sitemap(index);

            if json {
                let entries = sitemap.resolved_entries()?;
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                let xml = sitemap.render()?;
                println!("{}", String::from_utf8_lossy(&xml));
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                shell,
                &mut cmd,
                "sitemapper-server",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
