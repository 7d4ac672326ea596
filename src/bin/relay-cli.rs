use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use relay_sample::config::{load_config, LoadOptions, RelayConfig};
use relay_sample::handler::Trigger;
use relay_sample::model::{BlobRecord, TableEntityRecord};
use relay_sample::observability::logging::init_logging;
use relay_sample::resilience::PollExecutor;
use relay_sample::scenario::{ScenarioOptions, ScenarioRunner, Target};
use relay_sample::vault::{VaultClient, VaultCredential};
use relay_sample::GatewayClient;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the sample messaging relay", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to $RELAY_CONFIG).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subscription key to use instead of resolving it from the vault.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a message and print its id
    Publish { message: String },
    /// Wait for the table entity with this id
    Entity { id: String },
    /// Wait for the blob with this id
    Blob { id: String },
    /// Resolve a vault secret
    Secret {
        name: String,
        /// Print the value instead of its length
        #[arg(long)]
        reveal: bool,
    },
    /// Run the trigger handler on a message read from stdin
    Handle {
        #[arg(long, value_enum, default_value_t = TriggerKind::ServiceBus)]
        trigger: TriggerKind,
    },
    /// Run the full scenario
    Run { message: Option<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum TriggerKind {
    ServiceBus,
    EventHub,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Handling is offline; everything else needs the deployment settings.
    if let Commands::Handle { trigger } = cli.command {
        let trigger = match trigger {
            TriggerKind::ServiceBus => Trigger::service_bus(),
            TriggerKind::EventHub => Trigger::event_hub(),
        };
        let mut payload = Vec::new();
        std::io::stdin().read_to_end(&mut payload)?;
        let record = trigger.handle_payload(&payload)?;
        return print_json(&record);
    }

    let mut options = LoadOptions::from_process();
    if cli.config.is_some() {
        options.config_path = cli.config.clone();
    }
    let config = load_config(&options)?;
    let _ = init_logging(&config.observability);

    let http = reqwest::Client::new();

    match cli.command {
        Commands::Secret { name, reveal } => {
            let value = vault_client(&http, &config)?.resolve(&name).await?;
            if reveal {
                println!("{value}");
            } else {
                println!("secret '{name}' resolved ({} characters)", value.chars().count());
            }
        }
        Commands::Publish { message } => {
            let gateway = gateway_client(&http, &config, cli.key.as_deref()).await?;
            print_json(&gateway.publish_message(&message).await?)?;
        }
        Commands::Entity { id } => {
            let gateway = gateway_client(&http, &config, cli.key.as_deref()).await?;
            let record: TableEntityRecord = poll(&gateway, &config, Target::TableEntity, &id).await?;
            print_json(&record)?;
        }
        Commands::Blob { id } => {
            let gateway = gateway_client(&http, &config, cli.key.as_deref()).await?;
            let record: BlobRecord = poll(&gateway, &config, Target::Blob, &id).await?;
            print_json(&record)?;
        }
        Commands::Run { message } => {
            let gateway = gateway_client(&http, &config, cli.key.as_deref()).await?;
            let message = message.unwrap_or_else(|| config.scenario.message.clone());
            let runner = ScenarioRunner::new(gateway, ScenarioOptions::from_config(&config));
            match runner.run(&message).await {
                Ok(report) => println!("{report}"),
                Err(e) => {
                    eprintln!("Scenario failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Handle { .. } => {}
    }

    Ok(())
}

fn vault_client(
    http: &reqwest::Client,
    config: &RelayConfig,
) -> Result<VaultClient, Box<dyn std::error::Error>> {
    let credential = VaultCredential::from_env(&config.vault)?;
    Ok(VaultClient::with_http_client(http.clone(), &config.vault.uri, credential)?)
}

async fn gateway_client(
    http: &reqwest::Client,
    config: &RelayConfig,
    key: Option<&str>,
) -> Result<GatewayClient, Box<dyn std::error::Error>> {
    let key = match key {
        Some(key) => key.to_string(),
        None => {
            vault_client(http, config)?
                .resolve(&config.vault.subscription_key_secret)
                .await?
        }
    };
    Ok(GatewayClient::with_http_client(http.clone(), &config.gateway, &key)?)
}

async fn poll<T: serde::de::DeserializeOwned>(
    gateway: &GatewayClient,
    config: &RelayConfig,
    target: Target,
    id: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let path = target.path(id);
    let executor = PollExecutor::new(config.polling.to_policy())
        .with_label(target.collection())
        .on_retry(|event| eprintln!("attempt {} pending: {} (retrying in {:?})", event.attempt, event.reason, event.delay));
    Ok(executor.run(|_| gateway.poll_json::<T>(&path)).await?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
