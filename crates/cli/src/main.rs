//! petrel CLI: gateway startup plus a one-shot `send` command that drives
//! the same delivery pipeline from the terminal.

use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    secrecy::Secret,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    petrel_chat::{DmDelivery, XrpcChatClient, deliver},
    petrel_config::PetrelConfig,
    petrel_gateway::{
        AppState, GatewayServices, run_gateway,
        wire::{DmResponse, MAX_MESSAGE_CHARS, MESSAGE_TOO_LONG_ERROR},
    },
};

#[derive(Parser)]
#[command(
    name = "petrel",
    about = "petrel — direct-message delivery for the AT Protocol"
)]
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
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// Send a single direct message and exit.
    Send {
        /// Sender handle.
        #[arg(long)]
        from: String,
        /// Environment variable holding the sender's app password.
        #[arg(long, default_value = "PETREL_APP_PASSWORD")]
        password_env: String,
        /// Recipient handle.
        #[arg(long)]
        to: String,
        /// Message text; bare URLs become link facets automatically.
        #[arg(short, long)]
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = petrel_config::discover_and_load();

    match cli.command {
        None | Some(Commands::Gateway) => gateway_command(&cli, config).await,
        Some(Commands::Send {
            from,
            password_env,
            to,
            message,
        }) => send_command(&config, from, &password_env, to, message).await,
    }
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

async fn gateway_command(cli: &Cli, mut config: PetrelConfig) -> anyhow::Result<()> {
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let state = AppState {
        services: GatewayServices::live(config.chat.clone()),
        config: Arc::new(config),
    };
    run_gateway(state).await
}

async fn send_command(
    config: &PetrelConfig,
    from: String,
    password_env: &str,
    to: String,
    message: String,
) -> anyhow::Result<()> {
    let password = std::env::var(password_env)
        .map_err(|_| anyhow::anyhow!("environment variable {password_env} is not set"))?;

    if message.chars().count() > MAX_MESSAGE_CHARS {
        print_and_fail(&DmResponse::validation_error(MESSAGE_TOO_LONG_ERROR))?;
    }

    let client = XrpcChatClient::new(
        &config.chat.service_url,
        &config.chat.chat_service,
        config.chat.request_timeout(),
    )?;
    let request = DmDelivery {
        user_handle: from,
        password: Secret::new(password),
        target_handle: to,
        message,
        links: None,
    };
    let outcome = deliver(&client, &client, &client, &request).await;
    let response = DmResponse::from_outcome(outcome);
    if matches!(response, DmResponse::Failure { .. }) {
        print_and_fail(&response)?;
    }
    info!("direct message delivered");
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Print the wire-shaped response and exit non-zero, mirroring what an HTTP
/// caller would have received in the body.
fn print_and_fail(response: &DmResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    std::process::exit(1)
}
