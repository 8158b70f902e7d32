use airdrop_csvs::{write_claims_csv, write_claims_csv_to, ClaimsRow, CsvError};
use airdrop_merkle::{Address, Hash, HashAlgorithm};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::error::{AirdropError, AirdropResult};
use crate::registry::ClaimRecord;
use crate::serde_helpers::{hex_hash, u128_string};
use crate::service::{ServiceConfig, DEFAULT_EVENT_CAPACITY};

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Unsupported snapshot format: {0}")]
    UnsupportedFormat(String),
}

/// Everything needed to resume a campaign: the published parameters plus
/// every claim made so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    #[serde(with = "hex_hash")]
    pub root: Hash,

    pub admin: Address,

    pub pool: Address,

    #[serde(with = "u128_string")]
    pub amount_per_claim: u128,

    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Claims in sequence order
    #[serde(default)]
    pub claims: Vec<ClaimRecord>,
}

impl CampaignSnapshot {
    /// Reject snapshots no running campaign could have produced.
    pub fn validate(&self) -> AirdropResult<()> {
        if self.amount_per_claim == 0 {
            return Err(AirdropError::InvalidSnapshot(
                "amount_per_claim must be positive".to_string(),
            ));
        }

        let mut addresses = HashSet::with_capacity(self.claims.len());
        let mut sequences = HashSet::with_capacity(self.claims.len());
        for claim in &self.claims {
            if !addresses.insert(claim.address) {
                return Err(AirdropError::InvalidSnapshot(format!(
                    "{} is recorded more than once",
                    claim.address
                )));
            }
            let in_range = claim.sequence != 0 && claim.sequence != u64::MAX;
            if !in_range || !sequences.insert(claim.sequence) {
                return Err(AirdropError::InvalidSnapshot(format!(
                    "invalid or repeated claim sequence {}",
                    claim.sequence
                )));
            }
        }

        Ok(())
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            pool: self.pool,
            amount_per_claim: self.amount_per_claim,
            hash_algorithm: self.hash_algorithm,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Total base units paid out across all recorded claims
    pub fn total_claimed(&self) -> u128 {
        self.claims
            .iter()
            .fold(0u128, |total, claim| total.saturating_add(claim.amount))
    }

    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_yaml(&self) -> SnapshotResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> SnapshotResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Write as JSON or YAML according to the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SnapshotResult<()> {
        let path = path.as_ref();
        let contents = match SnapshotFormat::from_path(path)? {
            SnapshotFormat::Json => self.to_json()?,
            SnapshotFormat::Yaml => self.to_yaml()?,
        };
        fs::write(path, contents)?;
        Ok(())
    }

    /// Read JSON or YAML according to the file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> SnapshotResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match SnapshotFormat::from_path(path)? {
            SnapshotFormat::Json => Self::from_json(&contents),
            SnapshotFormat::Yaml => Self::from_yaml(&contents),
        }
    }

    pub fn claims_rows(&self) -> Vec<ClaimsRow> {
        self.claims
            .iter()
            .map(|claim| ClaimsRow {
                address: claim.address,
                amount: claim.amount,
                sequence: claim.sequence,
            })
            .collect()
    }

    /// Export the claims as a versioned CSV report.
    pub fn write_claims_csv<P: AsRef<Path>>(&self, path: P) -> SnapshotResult<()> {
        write_claims_csv(path, &self.claims_rows())?;
        Ok(())
    }

    pub fn write_claims_csv_to<W: Write>(&self, writer: W) -> SnapshotResult<()> {
        write_claims_csv_to(writer, &self.claims_rows())?;
        Ok(())
    }
}

enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    fn from_path(path: &Path) -> SnapshotResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(SnapshotFormat::Json),
            Some("yaml") | Some("yml") => Ok(SnapshotFormat::Yaml),
            _ => Err(SnapshotError::UnsupportedFormat(path.display().to_string())),
        }
    }
}
