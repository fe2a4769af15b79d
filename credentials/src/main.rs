use std::{error::Error, path::PathBuf};

use mailvia_utils::{
    derive_smtp_password, FileSecretStore, LifecycleKind, LifecycleRequest, SecretLifecycle,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_SECRETS_DIR: &str = "secrets";

const USAGE: &str = "\
Usage:
  mailvia-credentials derive <secret-access-key> [region]
  mailvia-credentials create|update|delete <secret-name>

Lifecycle subcommands read the request from the environment:
  SMTP_ACCESS_KEY_ID, SMTP_SECRET_ACCESS_KEY, SMTP_REGION,
  SMTP_ENDPOINT (optional), SMTP_PORT (optional),
  SMTP_SECRETS_DIR (secret store directory, default \"secrets\")";

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn lifecycle_request(kind: LifecycleKind, name: &str) -> Result<LifecycleRequest, Box<dyn Error>> {
    Ok(LifecycleRequest {
        kind,
        resource_name: name.to_string(),
        access_key_id: env_var("SMTP_ACCESS_KEY_ID").unwrap_or_default(),
        secret_access_key: env_var("SMTP_SECRET_ACCESS_KEY").unwrap_or_default(),
        region: env_var("SMTP_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
        endpoint: env_var("SMTP_ENDPOINT"),
        port: env_var("SMTP_PORT").map(|port| port.parse()).transpose()?,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("derive") => {
            let Some(secret_key) = args.get(2) else {
                eprintln!("{USAGE}");
                std::process::exit(1);
            };
            let region = args.get(3).map(String::as_str).unwrap_or(DEFAULT_REGION);
            println!("{}", derive_smtp_password(secret_key, region));
        }
        Some(command @ ("create" | "update" | "delete")) => {
            let Some(name) = args.get(2) else {
                eprintln!("{USAGE}");
                std::process::exit(1);
            };
            let kind = match command {
                "create" => LifecycleKind::Create,
                "update" => LifecycleKind::Update,
                _ => LifecycleKind::Delete,
            };
            let request = lifecycle_request(kind, name)?;
            let secrets_dir =
                env_var("SMTP_SECRETS_DIR").unwrap_or_else(|| DEFAULT_SECRETS_DIR.to_string());
            let lifecycle = SecretLifecycle::new(FileSecretStore::new(PathBuf::from(secrets_dir)));
            let response = lifecycle.apply(&request).await?;
            println!("{}", serde_json::to_string(&response)?);
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
    Ok(())
}
