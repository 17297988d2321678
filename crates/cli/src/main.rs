use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    banter_completion::{FallbackDispatcher, HttpCompletionClient},
    banter_config::BanterConfig,
};

#[derive(Parser)]
#[command(name = "banter", about = "Banter — chat gateway with model fallback")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Explicit config file path (skips discovery).
    #[arg(long, global = true, env = "BANTER_CONFIG")]
    config: Option<std::path::PathBuf>,

    // Gateway arguments (used when no subcommand is provided, or with `gateway`)
    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// Dispatch a single message and print the reply, without a server.
    Send {
        #[arg(short, long)]
        message: String,
    },
    /// List the configured candidate models in fallback order.
    Models,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load configuration, honoring an explicit `--config` path.
fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<BanterConfig> {
    match path {
        Some(path) => Ok(banter_config::load_config(path)?),
        None => Ok(banter_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "banter starting");

    let mut config = load_configuration(cli.config.as_deref())?;

    // CLI args override config values.
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        // Default: start the gateway when no subcommand is provided.
        None | Some(Commands::Gateway) => banter_gateway::server::start_gateway(&config).await,
        Some(Commands::Send { message }) => {
            let backend = Arc::new(HttpCompletionClient::from_config(&config.provider));
            let dispatcher = FallbackDispatcher::from_config(&config, backend);
            let reply = dispatcher.dispatch(&message).await;
            println!("{reply}");
            Ok(())
        },
        Some(Commands::Models) => {
            for (position, model) in config.models.candidates.iter().enumerate() {
                println!("{}. {model}", position + 1);
            }
            Ok(())
        },
    }
}
