use airdrop_csvs::{find_duplicate_addresses, read_allowlist_csv, CsvError};
use airdrop_merkle::{hash_to_hex, Address, AllowListTree, Hash, HashAlgorithm, Hasher, MerkleError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::AirdropError;
use crate::ledger::TokenLedger;
use crate::serde_helpers::{option_hex_hash, u128_string};
use crate::service::{AirdropService, ServiceConfig, DEFAULT_AMOUNT_PER_CLAIM, DEFAULT_EVENT_CAPACITY};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Allow-list error: {0}")]
    Csv(#[from] CsvError),

    #[error("Merkle error: {0}")]
    Merkle(#[from] MerkleError),

    #[error("Campaign error: {0}")]
    Airdrop(#[from] AirdropError),

    #[error("Merkle root mismatch: config expects {expected}, allow-list builds {computed}")]
    RootMismatch { expected: String, computed: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Campaign configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Human-readable campaign name (for organization)
    pub campaign_name: String,

    /// Account allowed to publish the root
    pub admin: Address,

    /// Account claims are paid from
    pub pool: Address,

    /// Base units per claim, as a decimal string
    #[serde(with = "u128_string", default = "default_amount_per_claim")]
    pub amount_per_claim: u128,

    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Allow-list CSV. Relative paths are resolved against the config file's directory.
    pub allowlist_file: PathBuf,

    /// Optional: root the allow-list must produce
    #[serde(
        default,
        with = "option_hex_hash",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_root: Option<Hash>,

    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl CampaignConfig {
    /// Load a config file, choosing the parser by extension (`.yaml`, `.yml`, `.json`).
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let mut config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents)?,
            Some("json") => Self::from_json_str(&contents)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        if config.allowlist_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.allowlist_file = dir.join(&config.allowlist_file);
            }
        }

        debug!("Loaded campaign config {} from {}", config.campaign_name, path.display());
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.campaign_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "campaign_name must not be empty".to_string(),
            ));
        }
        if self.amount_per_claim == 0 {
            return Err(ConfigError::InvalidConfig(
                "amount_per_claim must be positive".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "event_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Read the allow-list in file order. Duplicates are kept and reported.
    pub fn read_allowlist(&self) -> ConfigResult<Vec<Address>> {
        let addresses = read_allowlist_csv(&self.allowlist_file)?;

        let duplicates = find_duplicate_addresses(&addresses);
        if !duplicates.is_empty() {
            warn!(
                "Allow-list {} repeats {} addresses; each occurrence becomes a leaf",
                self.allowlist_file.display(),
                duplicates.len()
            );
        }

        Ok(addresses)
    }

    /// Build the allow-list tree with `H`, which must match `hash_algorithm`.
    pub fn build_tree<H: Hasher<Hash = Hash>>(&self) -> ConfigResult<AllowListTree<H>> {
        // Hashers agree on the empty input only if they are the same function
        if H::hash(&[]) != self.hash_algorithm.empty_root() {
            return Err(ConfigError::InvalidConfig(format!(
                "tree hasher does not match hash_algorithm {}",
                self.hash_algorithm
            )));
        }

        let tree = AllowListTree::<H>::from_addresses(&self.read_allowlist()?);
        self.check_root(&tree.root())?;
        Ok(tree)
    }

    /// The root this campaign publishes, checked against `expected_root`.
    pub fn compute_root(&self) -> ConfigResult<Hash> {
        let leaves = self.hash_algorithm.leaves(&self.read_allowlist()?);
        let root = self.hash_algorithm.build_root(&leaves);
        self.check_root(&root)?;
        Ok(root)
    }

    fn check_root(&self, computed: &Hash) -> ConfigResult<()> {
        match self.expected_root {
            Some(expected) if expected != *computed => Err(ConfigError::RootMismatch {
                expected: hash_to_hex(&expected),
                computed: hash_to_hex(computed),
            }),
            _ => Ok(()),
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::new(self.pool)
            .with_amount_per_claim(self.amount_per_claim)
            .with_hash_algorithm(self.hash_algorithm)
            .with_event_capacity(self.event_capacity)
    }

    /// Build the root and return a service already initialized with it.
    pub fn launch(&self, ledger: Arc<dyn TokenLedger>) -> ConfigResult<AirdropService> {
        let root = self.compute_root()?;

        let service = AirdropService::new(self.service_config());
        service.initialize(self.admin, ledger, root)?;

        info!("Launched campaign {} with root {}", self.campaign_name, hash_to_hex(&root));
        Ok(service)
    }
}

fn default_amount_per_claim() -> u128 {
    DEFAULT_AMOUNT_PER_CLAIM
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}
