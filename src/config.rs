use std::env;
use std::path::PathBuf;
use anyhow::Result;
use zeroize::Zeroizing;

/// Built-in development passphrase. Public in source, provides no real
/// confidentiality — production deployments MUST set `SESSION_SECRET_KEY`.
pub const DEV_PASSPHRASE: &str = "vaultgate-dev-passphrase-change-me";

/// Default directory for the file-backed session storage.
pub const DEFAULT_STORE_PATH: &str = ".session-store";

/// The session vault's configuration.
#[derive(Clone)]
pub struct Config {
    /// The passphrase the symmetric session key is derived from.
    pub passphrase: Zeroizing<String>,
    /// The directory the file backend persists records under.
    pub store_path: PathBuf,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let passphrase = match env::var("SESSION_SECRET_KEY") {
            Ok(secret) if !secret.is_empty() => Zeroizing::new(secret),
            _ => {
                tracing::warn!(
                    "⚠️  SESSION_SECRET_KEY not set, falling back to the built-in development passphrase"
                );
                Zeroizing::new(DEV_PASSPHRASE.to_string())
            }
        };

        let store_path = env::var("SESSION_STORE_PATH")
            .unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string())
            .into();

        Ok(Self {
            passphrase,
            store_path,
        })
    }
}
