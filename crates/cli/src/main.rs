use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "slotgrab", about = "Slotgrab — booking automation gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Config file path (overrides discovery).
    #[arg(long, global = true, env = "SLOTGRAB_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Serve,
    /// Report which browser engines are installed and driveable.
    Detect,
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

fn detect_engines() {
    use slotgrab_browser::{Engine, detect};

    for engine in Engine::ALL {
        if !engine.cdp_capable() {
            println!("{engine}: not driveable over CDP");
            continue;
        }
        let result = detect::detect_engine(engine, None);
        match result.path {
            Some(path) => println!("{engine}: {}", path.display()),
            None => println!("{engine}: not found. {}", result.install_hint),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "slotgrab starting");

    match cli.command {
        None | Some(Commands::Serve) => {
            let config = match cli.config {
                Some(ref path) => slotgrab_config::load_config(path)?,
                None => slotgrab_config::discover_and_load(),
            };

            // CLI args override config values.
            let bind = cli.bind.unwrap_or(config.server.bind.clone());
            let port = cli.port.unwrap_or(config.server.port);

            slotgrab_gateway::run(&bind, port, &config).await
        },
        Some(Commands::Detect) => {
            detect_engines();
            Ok(())
        },
    }
}
