pub mod storage;

pub use storage::{AuthStorage, KeySource};

use anyhow::{Context, Result, bail};

/// Providers that accept a stored API key.
const SUPPORTED_PROVIDERS: &[&str] = &[crate::consts::PROVIDER];

/// Save an API key for a provider.
///
/// Returns an error if the provider is not supported, the key is blank,
/// or the key cannot be saved.
pub fn login(db_path: &str, provider: &str, api_key: &str) -> Result<()> {
    if !SUPPORTED_PROVIDERS.contains(&provider) {
        bail!("unsupported provider: {provider}");
    }
    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("no API key provided");
    }
    let storage = AuthStorage::open(db_path).context("failed to open auth storage")?;
    storage
        .set(provider, api_key)
        .context("failed to save API key")?;
    Ok(())
}

/// Remove the stored key for a provider.
pub fn logout(db_path: &str, provider: &str) -> Result<()> {
    let storage = AuthStorage::open(db_path).context("failed to open auth storage")?;
    storage
        .remove(provider)
        .context("failed to remove API key")?;
    Ok(())
}
