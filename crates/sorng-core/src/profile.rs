//! Named connection profiles.
//!
//! A profile supplies the defaults for a connection name; call-site
//! [`ConnectOptions`](crate::options::ConnectOptions) override them.

use crate::config::TransferConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the `ftp` configuration section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Private key file used for SFTP public-key auth.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub passphrase: Option<String>,
}

/// Connection name → profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, ConnectionProfile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every profile of the config's `ftp` section.
    pub fn from_config(config: &TransferConfig) -> Self {
        let mut registry = Self::new();
        for (name, profile) in &config.ftp {
            registry.register(name.clone(), profile.clone());
        }
        registry
    }

    /// Insert or replace a profile.
    pub fn register(&mut self, name: impl Into<String>, profile: ConnectionProfile) {
        self.profiles.insert(name.into(), profile);
    }

    pub fn get(&self, name: &str) -> Option<&ConnectionProfile> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
