use std::collections::HashMap;
use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

use tokio::fs;

/// Result type for secret store operations.
pub type SecretResult<T> = Result<T, SecretError>;

/// Errors that can occur during secret store operations.
#[derive(Debug)]
pub enum SecretError {
    /// The named secret does not exist.
    NotFound,
    /// An I/O error occurred.
    Io(io::Error),
    /// A store backend error occurred.
    Store(String),
}

impl Display for SecretError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretError::NotFound => write!(f, "Secret not found"),
            SecretError::Io(e) => write!(f, "I/O error: {e}"),
            SecretError::Store(msg) => write!(f, "Secret store error: {msg}"),
        }
    }
}

impl std::error::Error for SecretError {}

impl From<io::Error> for SecretError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            SecretError::NotFound
        } else {
            SecretError::Io(e)
        }
    }
}

/// Trait for secret store backends.
///
/// A secret is a named value that is either absent or present. `get`,
/// `put` and `delete` report [`SecretError::NotFound`] for absent names;
/// `create` establishes the first version of an absent secret.
pub trait SecretStore: Send + Sync {
    /// Returns the current value of a secret.
    fn get(&self, name: &str) -> impl std::future::Future<Output = SecretResult<String>> + Send;

    /// Creates an absent secret with an initial value.
    fn create(
        &self,
        name: &str,
        value: &str,
    ) -> impl std::future::Future<Output = SecretResult<()>> + Send;

    /// Replaces the value of an existing secret.
    fn put(
        &self,
        name: &str,
        value: &str,
    ) -> impl std::future::Future<Output = SecretResult<()>> + Send;

    /// Deletes an existing secret.
    fn delete(&self, name: &str) -> impl std::future::Future<Output = SecretResult<()>> + Send;
}

/// In-memory secret store.
///
/// Keeps every stored value as a version vector so tests can assert how
/// many writes a lifecycle sequence produced. Useful for testing and
/// development.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    /// Storage for secrets: name -> ordered versions, newest last.
    secrets: RwLock<HashMap<String, Vec<String>>>,
}

impl MemorySecretStore {
    /// Creates a new empty [`MemorySecretStore`].
    pub fn new() -> Self {
        Self {
            secrets: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the number of versions stored for a secret, 0 when absent.
    pub fn version_count(&self, name: &str) -> usize {
        self.secrets
            .read()
            .unwrap()
            .get(name)
            .map(|versions| versions.len())
            .unwrap_or(0)
    }

    /// Returns whether a secret is present.
    pub fn contains(&self, name: &str) -> bool {
        self.secrets.read().unwrap().contains_key(name)
    }
}

impl SecretStore for MemorySecretStore {
    async fn get(&self, name: &str) -> SecretResult<String> {
        let secrets = self.secrets.read().unwrap();
        let versions = secrets.get(name).ok_or(SecretError::NotFound)?;
        versions.last().cloned().ok_or(SecretError::NotFound)
    }

    async fn create(&self, name: &str, value: &str) -> SecretResult<()> {
        let mut secrets = self.secrets.write().unwrap();
        if secrets.contains_key(name) {
            return Err(SecretError::Store(format!("secret {name} already exists")));
        }
        secrets.insert(name.to_string(), vec![value.to_string()]);
        Ok(())
    }

    async fn put(&self, name: &str, value: &str) -> SecretResult<()> {
        let mut secrets = self.secrets.write().unwrap();
        let versions = secrets.get_mut(name).ok_or(SecretError::NotFound)?;
        versions.push(value.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> SecretResult<()> {
        let mut secrets = self.secrets.write().unwrap();
        secrets.remove(name).ok_or(SecretError::NotFound)?;
        Ok(())
    }
}

/// Filesystem-based secret store.
///
/// Stores each secret as a JSON file named after the sanitized secret name
/// under a base directory: `{base_path}/{name}.json`.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    /// Base path for stored secrets.
    base_path: PathBuf,
}

impl FileSecretStore {
    /// Creates a new [`FileSecretStore`] rooted at the given base path.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Returns the path of the file holding a secret.
    fn secret_path(&self, name: &str) -> PathBuf {
        let safe_name = name.replace(
            |c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_',
            "_",
        );
        self.base_path.join(format!("{safe_name}.json"))
    }
}

impl SecretStore for FileSecretStore {
    async fn get(&self, name: &str) -> SecretResult<String> {
        let content = fs::read_to_string(self.secret_path(name)).await?;
        Ok(content)
    }

    async fn create(&self, name: &str, value: &str) -> SecretResult<()> {
        let path = self.secret_path(name);
        if fs::try_exists(&path).await? {
            return Err(SecretError::Store(format!("secret {name} already exists")));
        }
        fs::create_dir_all(&self.base_path).await?;
        fs::write(&path, value).await?;
        Ok(())
    }

    async fn put(&self, name: &str, value: &str) -> SecretResult<()> {
        let path = self.secret_path(name);
        if !fs::try_exists(&path).await? {
            return Err(SecretError::NotFound);
        }
        fs::write(&path, value).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> SecretResult<()> {
        fs::remove_file(self.secret_path(name)).await?;
        Ok(())
    }
}
