//! Idempotent lifecycle management of the stored credential record.
//!
//! Provisioning platforms deliver Create/Update/Delete requests with
//! at-least-once semantics, so every transition must be safe to repeat:
//! Create and Update both converge on "the secret holds the derived
//! record", and Delete on an absent secret is a success, not an error.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::credentials::SmtpCredentials;
use crate::secrets::{SecretError, SecretResult, SecretStore};

/// Kind of a lifecycle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleKind {
    Create,
    Update,
    Delete,
}

/// A lifecycle request for the named credential secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRequest {
    pub kind: LifecycleKind,

    /// Name of the secret the request acts on.
    pub resource_name: String,

    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,

    /// SMTP endpoint override; defaults to the region endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// SMTP port override; defaults to the submission port.
    #[serde(default)]
    pub port: Option<u16>,
}

/// The response to a lifecycle request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleResponse {
    /// Stable identity token for the logical resource, derived from the
    /// secret name only, identical across kinds and invocations.
    pub physical_identity: String,
}

/// Returns the stable identity token for a secret name.
pub fn physical_identity(name: &str) -> String {
    format!("secret:{name}")
}

/// Applies lifecycle requests against a [`SecretStore`].
#[derive(Debug)]
pub struct SecretLifecycle<S: SecretStore> {
    store: S,
}

impl<S: SecretStore> SecretLifecycle<S> {
    /// Creates a new [`SecretLifecycle`] over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies one lifecycle request.
    ///
    /// `Delete` tolerates an absent secret. `Create` and `Update` both
    /// derive the credential record from the request and store it,
    /// creating the secret when it does not exist yet, so either kind may
    /// be invoked repeatedly. Any other store failure propagates.
    pub async fn apply(&self, request: &LifecycleRequest) -> SecretResult<LifecycleResponse> {
        let name = &request.resource_name;
        match request.kind {
            LifecycleKind::Delete => match self.store.delete(name).await {
                Ok(()) => {
                    info!(name = %name, "Deleted secret");
                }
                Err(SecretError::NotFound) => {
                    info!(name = %name, "Secret already absent, delete is a no-op");
                }
                Err(e) => return Err(e),
            },
            LifecycleKind::Create | LifecycleKind::Update => {
                let credentials = SmtpCredentials::derive(
                    &request.access_key_id,
                    &request.secret_access_key,
                    &request.region,
                    request.endpoint.as_deref(),
                    request.port,
                );
                let value = serde_json::to_string(&credentials)
                    .map_err(|e| SecretError::Store(e.to_string()))?;
                match self.store.put(name, &value).await {
                    Ok(()) => {
                        info!(name = %name, "Updated secret value");
                    }
                    Err(SecretError::NotFound) => {
                        self.store.create(name, &value).await?;
                        info!(name = %name, "Created secret");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(LifecycleResponse {
            physical_identity: physical_identity(name),
        })
    }
}
