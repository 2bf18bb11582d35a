use anyhow::Result;
use clap::{Parser, Subcommand};
use contacts::config::ContactsConfig;
use contacts::{ContactsModule, InMemoryBackends};
use runtime::{AppConfig, CliArgs};
use std::path::PathBuf;

mod shell;

/// Contacts - personal address book backed by a realtime document store
#[derive(Parser)]
#[command(name = "contacts-app")]
#[command(about = "Contacts - personal address book backed by a realtime document store")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session over stdin
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // home_dir is normalized and created while loading
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, config.home_dir());
    tracing::info!("Contacts app starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_shell(config).await,
        Commands::Check => check_config(config),
    }
}

async fn run_shell(config: AppConfig) -> Result<()> {
    let contacts_config = ContactsConfig::from_module_value(config.module_value("contacts"))?;
    let backends = InMemoryBackends::new();
    let module = ContactsModule::new(contacts_config.clone(), backends.backends(&contacts_config));
    module.account().watch_auth_state();
    module.account().restore_session().await;

    let shell = shell::Shell::new(module, backends);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell.run(stdin, std::io::stdout()).await?;

    tracing::info!("Contacts app stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let contacts = ContactsConfig::from_module_value(config.module_value("contacts"))?;
    tracing::info!(locale = ?contacts.locale, "Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
