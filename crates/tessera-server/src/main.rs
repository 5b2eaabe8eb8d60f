use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_CONFIG: &str = "tessera.yaml";

#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Schema-per-tenant auth service")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Configuration file. Missing file means built-in defaults.
        #[arg(long, short, default_value = DEFAULT_CONFIG, env = "TESSERA_CONFIG")]
        config: PathBuf,

        /// Override `server.listen_addr:server.listen_port`, e.g. 127.0.0.1:9000.
        #[arg(long)]
        listen: Option<String>,
    },

    /// Create a tenant's partition ahead of first use.
    Provision {
        /// Raw tenant identifier, normalized the same way as request headers.
        tenant: String,

        #[arg(long, short, default_value = DEFAULT_CONFIG, env = "TESSERA_CONFIG")]
        config: PathBuf,
    },

    /// Promote a user to ADMIN.
    GrantAdmin {
        tenant: String,
        email: String,

        #[arg(long, short, default_value = DEFAULT_CONFIG, env = "TESSERA_CONFIG")]
        config: PathBuf,
    },

    /// Parse and validate the configuration file.
    CheckConfig {
        #[arg(long, short, default_value = DEFAULT_CONFIG, env = "TESSERA_CONFIG")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve { config, listen } => {
            let config = commands::load_config(&config)?;
            init_tracing(&config.observability.log_filter);
            commands::serve::run(config, listen).await
        }
        Command::Provision { tenant, config } => {
            let config = commands::load_config(&config)?;
            init_tracing(&config.observability.log_filter);
            commands::provision::run(&config, &tenant).await
        }
        Command::GrantAdmin {
            tenant,
            email,
            config,
        } => {
            let config = commands::load_config(&config)?;
            init_tracing(&config.observability.log_filter);
            commands::grant_admin::run(&config, &tenant, &email).await
        }
        Command::CheckConfig { config } => commands::check::run(&config),
    }
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
