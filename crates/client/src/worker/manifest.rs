//! Asset manifest: the files precached on install.

use reqwest::Url;

use crate::fetch::resolve;
use momentum_core::{AppConfig, Error};

/// Ordered list of asset paths plus the shell page served when offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    assets: Vec<String>,
    shell: String,
}

impl AssetManifest {
    /// The shell page must be one of the assets, otherwise it would never be cached.
    pub fn new(assets: Vec<String>, shell: impl Into<String>) -> Result<Self, Error> {
        let shell = shell.into();
        if assets.is_empty() {
            return Err(Error::InvalidInput("asset manifest is empty".into()));
        }
        if !assets.contains(&shell) {
            return Err(Error::InvalidInput(format!("shell page {shell} is not in the asset manifest")));
        }
        Ok(Self { assets, shell })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(config.assets.clone(), config.shell.clone())
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Every asset resolved against `scope`, in manifest order.
    pub fn resolve(&self, scope: &Url) -> Result<Vec<Url>, Error> {
        self.assets
            .iter()
            .map(|asset| resolve(scope, asset).map_err(Error::from))
            .collect()
    }

    pub fn shell_url(&self, scope: &Url) -> Result<Url, Error> {
        Ok(resolve(scope, &self.shell)?)
    }
}
