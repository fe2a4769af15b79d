//! SMTP credential derivation.
//!
//! SES SMTP authentication does not accept the raw secret access key; it
//! expects a password derived through the SigV4 signing-key chain with a
//! fixed date, scoped to the region, the `ses` service and the
//! `SendRawEmail` action. The derivation is pure and deterministic: the
//! same key and region always produce the same password.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SIGNING_DATE: &str = "11111111";
const SIGNING_SERVICE: &str = "ses";
const SIGNING_TERMINAL: &str = "aws4_request";
const SIGNING_MESSAGE: &str = "SendRawEmail";
const SIGNING_VERSION: u8 = 0x04;

/// Default SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Derives the SMTP submission password from a secret access key.
///
/// Walks the HMAC-SHA256 signing chain
/// `AWS4{key}` → date → region → service → terminal → message, then
/// base64-encodes the version byte followed by the final 32-byte digest.
/// All intermediate values stay raw binary; only the result is encoded.
pub fn derive_smtp_password(secret_access_key: &str, region: &str) -> String {
    let k_date = hmac_sha256(
        format!("AWS4{secret_access_key}").as_bytes(),
        SIGNING_DATE.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, SIGNING_SERVICE.as_bytes());
    let k_terminal = hmac_sha256(&k_service, SIGNING_TERMINAL.as_bytes());
    let k_message = hmac_sha256(&k_terminal, SIGNING_MESSAGE.as_bytes());

    let mut keyed = Vec::with_capacity(1 + k_message.len());
    keyed.push(SIGNING_VERSION);
    keyed.extend_from_slice(&k_message);
    general_purpose::STANDARD.encode(keyed)
}

/// Returns the default SMTP endpoint for a region.
pub fn default_endpoint(region: &str) -> String {
    format!("email-smtp.{region}.amazonaws.com")
}

/// The derived credential record stored in the secret store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpCredentials {
    pub smtp_endpoint: String,
    pub smtp_port: u16,
    /// The access key id; SMTP authentication uses it as the username.
    pub smtp_username: String,
    pub smtp_password: String,
}

impl SmtpCredentials {
    /// Assembles the stored record, deriving the password from the secret
    /// access key. `endpoint` and `port` fall back to the region default
    /// and [`DEFAULT_SMTP_PORT`] when absent.
    pub fn derive(
        access_key_id: &str,
        secret_access_key: &str,
        region: &str,
        endpoint: Option<&str>,
        port: Option<u16>,
    ) -> Self {
        Self {
            smtp_endpoint: endpoint
                .map(str::to_string)
                .unwrap_or_else(|| default_endpoint(region)),
            smtp_port: port.unwrap_or(DEFAULT_SMTP_PORT),
            smtp_username: access_key_id.to_string(),
            smtp_password: derive_smtp_password(secret_access_key, region),
        }
    }
}
