//! autokeystore - inspect and manage the wallet's auto-unlock cache
//!
//! Reads and writes the same `.keystore.dat` store the desktop app uses, so an
//! operator can check or wipe a remembered keystore password/address, and
//! preview how relay settings will be normalized.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use keystore_core::{
    ensure_relay_defaults, AutoKeystore, DesktopHost, HeadlessHost, Host, HostConfig,
    SettingsManager,
};

/// Manage the cached keystore password and address
#[derive(Parser, Debug)]
#[command(name = "autokeystore")]
#[command(author = "Symbia Labs")]
#[command(version)]
#[command(about = "Manage the wallet's auto-unlock keystore cache and relay settings")]
struct Args {
    /// Directory holding .keystore.dat and settings.json
    #[arg(long, global = true, env = "AUTOKEYSTORE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Run without a UI context (no backend is used)
    #[arg(long, global = true)]
    headless: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cached keystore password
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
    /// Cached keystore address
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Network relay settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum PasswordAction {
    /// Report whether a password is cached
    Get {
        /// Print the password itself
        #[arg(long)]
        reveal: bool,
    },
    /// Cache a password (prompts when --value is not given)
    Set {
        #[arg(long, env = "AUTOKEYSTORE_PASSWORD", hide_env_values = true)]
        value: Option<String>,
    },
    /// Forget the cached password
    Clear,
}

#[derive(Subcommand, Debug)]
enum AddressAction {
    /// Print the cached address
    Get,
    /// Cache an address
    Set { address: String },
    /// Forget the cached address
    Clear,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print settings with relay defaults applied
    Show {
        /// Settings JSON file (defaults to settings.json in the data directory)
        file: Option<PathBuf>,
    },
    /// Restore default settings and delete the settings file
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so command output stays pipeable
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match args.command {
        Command::Password { action } => {
            let keystore = keystore(args.data_dir, args.headless)?;
            run_password(keystore, action).await?;
        }
        Command::Address { action } => {
            let keystore = keystore(args.data_dir, args.headless)?;
            run_address(keystore, action).await;
        }
        Command::Settings { action } => run_settings(args.data_dir, action).await?,
    }

    Ok(())
}

/// Explicit data directory, or the platform default
fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => HostConfig::default_data_dir()?,
    };
    debug!("Using data directory {:?}", data_dir);
    Ok(data_dir)
}

/// Headless mode never touches the filesystem, so no data directory is needed
fn keystore(
    data_dir: Option<PathBuf>,
    headless: bool,
) -> Result<&'static AutoKeystore, Box<dyn std::error::Error>> {
    let host: Arc<dyn Host> = if headless {
        Arc::new(HeadlessHost)
    } else {
        Arc::new(DesktopHost::new(HostConfig::new(resolve_data_dir(data_dir)?)))
    };

    AutoKeystore::install_shared(host);
    Ok(AutoKeystore::shared())
}

async fn run_password(
    keystore: &AutoKeystore,
    action: PasswordAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PasswordAction::Get { reveal } => match keystore.get_password().await {
            Some(password) if reveal => println!("{}", password.expose()),
            Some(_) => println!("Password cached"),
            None => println!("No password cached"),
        },
        PasswordAction::Set { value } => {
            let password = match value {
                Some(value) => value,
                None => rpassword::prompt_password("Keystore password: ")?,
            };
            if password.is_empty() {
                return Err("Password must not be empty".into());
            }
            keystore.set_password(&password).await;
            info!("Password cached");
        }
        PasswordAction::Clear => {
            keystore.clear_password().await;
            info!("Password cleared");
        }
    }

    Ok(())
}

async fn run_address(keystore: &AutoKeystore, action: AddressAction) {
    match action {
        AddressAction::Get => match keystore.get_address().await {
            Some(address) => println!("{}", address),
            None => println!("No address cached"),
        },
        AddressAction::Set { address } => {
            keystore.set_address(&address).await;
            info!("Address cached");
        }
        AddressAction::Clear => {
            keystore.clear_address().await;
            info!("Address cleared");
        }
    }
}

async fn run_settings(
    data_dir: Option<PathBuf>,
    action: SettingsAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::Show { file: Some(file) } => {
            let contents = tokio::fs::read_to_string(&file).await?;
            let value: serde_json::Value = serde_json::from_str(&contents)?;
            println!("{}", serde_json::to_string_pretty(&ensure_relay_defaults(value))?);
        }
        SettingsAction::Show { file: None } => {
            let manager = SettingsManager::new(&resolve_data_dir(data_dir)?);
            println!("{}", serde_json::to_string_pretty(manager.get())?);
        }
        SettingsAction::Reset => {
            let mut manager = SettingsManager::new(&resolve_data_dir(data_dir)?);
            manager.reset().await?;
            info!("Settings reset to defaults");
        }
    }

    Ok(())
}
