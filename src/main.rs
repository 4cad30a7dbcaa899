use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use carik_runtime::application::messaging::{HookChain, OwnerOnly, RequiredPermissions};
use carik_runtime::domain::entities::{Channel, Guild, Interaction, InteractionKind, Member, Message, User};
use carik_runtime::extensions::{core_extension, StaticLoader, CORE_EXTENSION};
use carik_runtime::infrastructure::adapters::ConsoleAdapter;
use carik_runtime::infrastructure::cache::CachedLookup;
use carik_runtime::{Config, Container, Runtime, RuntimeError};

const CONSOLE_GUILD: &str = "1000";
const CONSOLE_CHANNEL: &str = "1001";
const CONSOLE_USER: &str = "1";

#[derive(Parser)]
#[command(name = "carik-runtime")]
#[command(about = "Extension runtime for chat bots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the console REPL
    Run,
    /// Generate default config
    InitConfig,
    /// Validate the config file
    CheckConfig,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (config, load_error) = load_config(&cli.config);
    init_tracing(&config.logging.level);
    if let Some(e) = load_error {
        warn!("Failed to load config: {}, using defaults", e);
    }

    match cli.command {
        Commands::Run => {
            if let Err(e) = run(config).await {
                error!("Runtime error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::InitConfig => init_config(&cli.config),
        Commands::CheckConfig => check_config(&cli.config),
        Commands::Version => {
            println!("carik-runtime v{}", env!("CARGO_PKG_VERSION"));
        }
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_target(false).with_env_filter(filter).init();
}

fn load_config(path: &str) -> (Config, Option<String>) {
    if !Path::new(path).exists() {
        return (Config::load_env(), None);
    }
    match Config::load(path) {
        Ok(mut config) => {
            config.apply_env();
            (config, None)
        }
        Err(e) => (Config::load_env(), Some(e.to_string())),
    }
}

async fn run(config: Config) -> Result<(), RuntimeError> {
    info!("Starting {}", config.bot.name);

    let adapter = Arc::new(ConsoleAdapter::new().with_echo());
    let owner = User::new(CONSOLE_USER).with_username("console");
    let member = Member::new(CONSOLE_GUILD, owner.clone()).with_permission("administrator");
    let guild = Guild::new(CONSOLE_GUILD, "Console");
    let channel = Channel::text(CONSOLE_CHANNEL, CONSOLE_GUILD).with_name("console");
    adapter.add_member(member.clone());
    adapter.add_channel(channel.clone());

    let hooks = HookChain::new()
        .add(OwnerOnly::from_config(&config))
        .add(RequiredPermissions);
    let container = Container::builder(
        adapter.clone(),
        Arc::new(CachedLookup::new(adapter.clone())),
        adapter.clone(),
    )
    .config(config)
    .before_run(hooks)
    .build();

    let runtime = Runtime::new(container);
    let loader = StaticLoader::new().with(CORE_EXTENSION, core_extension);
    let report = runtime.start(&loader).await?;
    for outcome in report.loaded.iter().filter(|o| o.result.is_err()) {
        warn!("Extension {} was not loaded", outcome.name);
    }

    println!("Type a command (e.g. !help), `/slash <name>` for a slash command, `/quit` to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        let outcome = match line.strip_prefix("/slash ") {
            Some(name) => {
                let interaction = Interaction::command(InteractionKind::ChatInput, name.trim(), owner.clone())
                    .with_guild(guild.clone())
                    .with_member(member.clone())
                    .with_channel(channel.clone());
                runtime.dispatcher().dispatch_interaction(interaction).await
            }
            None => {
                let message = Message::new(channel.clone(), owner.clone(), line)
                    .with_guild(guild.clone())
                    .with_member(member.clone());
                runtime.dispatcher().dispatch_message(message).await
            }
        };

        match outcome {
            Ok(outcome) => debug!(?outcome, "Dispatched"),
            Err(e) => error!("Command failed: {}", e),
        }
    }

    runtime.shutdown()?;
    Ok(())
}

fn init_config(path: &str) {
    if Path::new(path).exists() {
        eprintln!("{} already exists, not overwriting", path);
        std::process::exit(1);
    }

    let yaml = match Config::default().to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("Failed to render config: {}", e);
            std::process::exit(1);
        }
    };
    match std::fs::write(path, yaml) {
        Ok(()) => println!("Config written to {}", path),
        Err(e) => {
            eprintln!("Failed to write {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn check_config(path: &str) {
    match Config::load(path) {
        Ok(config) => {
            println!("Config OK: {}", path);
            println!("  prefixes: {}", config.bot.prefixes.join(" "));
            println!("  owners: {}", config.bot.owners.len());
            println!("  auto-register: {}", config.commands.auto_register);
            println!("  auto-activate: {}", config.extensions.auto_activate);
        }
        Err(e) => {
            eprintln!("Invalid config {}: {}", path, e);
            std::process::exit(1);
        }
    }
}
