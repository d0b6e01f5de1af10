//! Provision users and API keys into the user record store.
//!
//! Reads `VALKEY_URL` and `USER_DATA_TABLE` the same way the authorizer does.
//! Key values are printed once and never logged.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use api_authorizer::app::init_tracing;
use api_authorizer::config::StoreConfig;
use api_authorizer::repos::error::RepoError;
use api_authorizer::repos::user_repo::{AccountRecord, StoredSecretKey, UserRepo};
use api_authorizer::services::api_key::generate_api_key;
use api_authorizer::services::cache::ValkeyClient;

#[derive(Parser, Debug)]
#[command(name = "user-admin", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a user with one API key.
    Create {
        username: String,
        /// Initial credit balance
        #[arg(long, default_value_t = 0)]
        credits: i64,
        /// Use this key instead of generating one
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Register an additional enabled key for an existing user.
    AddKey {
        username: String,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Disable a key; it stays stored but no longer authorizes.
    DisableKey { username: String, key_id: String },
    /// Overwrite the credit balance.
    SetCredits { username: String, credits: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = StoreConfig::from_env().context("store configuration")?;
    let client = ValkeyClient::new(&config.valkey_url)?;
    let repo = UserRepo::new(client, config.user_table);

    match args.command {
        Command::Create {
            username,
            credits,
            api_key,
        } => {
            let key = new_key(api_key)?;
            let mut record = AccountRecord::new(username.as_str());
            record.credits = Some(credits);
            record.push_key(&key)?;
            repo.create(&record).await?;

            tracing::info!(username = %username, credits, "user created");
            print_key(&key);
        }
        Command::AddKey { username, api_key } => {
            let key = new_key(api_key)?;
            let pushed = key.clone();
            repo.update(&username, move |record| record.push_key(&pushed))
                .await?;

            tracing::info!(username = %username, key_id = ?key.id, "key added");
            print_key(&key);
        }
        Command::DisableKey { username, key_id } => {
            repo.update(&username, |record| disable_key(record, &key_id))
                .await?;
            tracing::info!(username = %username, key_id = %key_id, "key disabled");
        }
        Command::SetCredits { username, credits } => {
            repo.update(&username, |record| {
                record.credits = Some(credits);
                Ok(())
            })
            .await?;
            tracing::info!(username = %username, credits, "credits updated");
        }
    }

    Ok(())
}

fn new_key(api_key: Option<String>) -> Result<StoredSecretKey> {
    let value = match api_key {
        Some(v) if v.trim().is_empty() => bail!("api key must not be empty"),
        Some(v) => v,
        None => generate_api_key()?,
    };

    Ok(StoredSecretKey {
        id: Some(Uuid::new_v4().to_string()),
        value,
        disabled: false,
    })
}

fn disable_key(record: &mut AccountRecord, key_id: &str) -> Result<(), RepoError> {
    let username = record.id.clone();
    let not_found = || RepoError::KeyNotFound {
        username: username.clone(),
        key_id: key_id.to_string(),
    };

    let keys = record.secret_keys.as_mut().ok_or_else(not_found)?;
    let mut found = false;
    for raw in keys.iter_mut() {
        // Entries that do not decode cannot be addressed by id.
        let Ok(mut key) = StoredSecretKey::decode(raw) else {
            continue;
        };
        if key.id.as_deref() == Some(key_id) {
            key.disabled = true;
            *raw = key.encode()?;
            found = true;
        }
    }

    if found { Ok(()) } else { Err(not_found()) }
}

fn print_key(key: &StoredSecretKey) {
    println!("key_id:  {}", key.id.as_deref().unwrap_or("-"));
    println!("api_key: {}", key.value);
}
