use std::{
    error::Error,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use lettre::{
    address::Envelope,
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use mailvia_utils::{
    load_config, ForwardingTable, InboundEvent, OutboundSender, RelayDispatcher, RelayError,
    SendFuture, SmtpConfig, SmtpCredentials, SpoolStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "mailvia.toml";

/// Outbound sender submitting rewritten messages over SMTP.
///
/// With stored credentials configured, submission is authenticated over
/// STARTTLS against the credential record's endpoint; otherwise the
/// configured host/port is used as a plain relay.
struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpSender {
    fn plain(host: &str, port: u16) -> Self {
        info!(host = %host, port = port, "Using plain SMTP relay");
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();
        Self { transport }
    }

    fn authenticated(credentials: &SmtpCredentials) -> Result<Self, Box<dyn Error>> {
        info!(
            endpoint = %credentials.smtp_endpoint,
            port = credentials.smtp_port,
            username = %credentials.smtp_username,
            "Using authenticated SMTP submission"
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
            &credentials.smtp_endpoint,
        )?
        .port(credentials.smtp_port)
        .credentials(Credentials::new(
            credentials.smtp_username.clone(),
            credentials.smtp_password.clone(),
        ))
        .build();
        Ok(Self { transport })
    }

    fn from_config(config: &SmtpConfig) -> Result<Self, Box<dyn Error>> {
        match &config.credentials_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let credentials: SmtpCredentials = serde_json::from_str(&content)?;
                Self::authenticated(&credentials)
            }
            None => Ok(Self::plain(&config.host, config.port)),
        }
    }
}

impl OutboundSender for SmtpSender {
    fn send<'a>(
        &'a self,
        source: &'a str,
        destinations: &'a [String],
        raw: &'a str,
    ) -> SendFuture<'a> {
        Box::pin(async move {
            let from: Address = source
                .parse()
                .map_err(|e| RelayError::Send(format!("invalid source {source}: {e}")))?;
            let to = destinations
                .iter()
                .map(|destination| {
                    destination.parse::<Address>().map_err(|e| {
                        RelayError::Send(format!("invalid destination {destination}: {e}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let envelope =
                Envelope::new(Some(from), to).map_err(|e| RelayError::Send(e.to_string()))?;
            self.transport
                .send_raw(&envelope, raw.as_bytes())
                .await
                .map_err(|e| RelayError::Send(e.to_string()))?;
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

/// Reads the inbound event from the file named in argv, or from stdin.
fn read_event() -> Result<InboundEvent, Box<dyn Error>> {
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("MAILVIA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(Path::new(&config_path))?;

    let event = read_event()?;
    info!(records = event.records.len(), "Processing inbound event");

    let store = Arc::new(SpoolStore::new(PathBuf::from(&config.relay.spool.path)));
    let sender = Arc::new(SmtpSender::from_config(&config.relay.smtp)?);
    let dispatcher = RelayDispatcher::new(
        ForwardingTable::new(config.relay.forwarding),
        config.relay.domain,
        config.relay.spool.prefix,
        store,
        sender,
    );

    dispatcher.process(&event).await?;
    Ok(())
}
