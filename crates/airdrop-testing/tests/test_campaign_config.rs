use airdrop_engine::{CampaignConfig, ConfigError, InMemoryTokenLedger, TokenLedger};
use airdrop_merkle::{hash_to_hex, AllowListTree, Keccak256Hasher};
use airdrop_testing::{deterministic_address, whitelist, WHITELIST};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const WHITELIST_ROOT: &str = "0x9243a73f24467ae4c63c33f3ded1f04fa9e455d61ad9ab5316e72a400c7ee7f1";

fn write_campaign_files(dir: &TempDir, config: &str) -> PathBuf {
    let csv = format!("# airdrop-csv-version: 1.0\naddress\n{}\n", WHITELIST.join("\n"));
    fs::create_dir_all(dir.path().join("lists")).unwrap();
    fs::write(dir.path().join("lists/whitelist.csv"), csv).unwrap();

    let path = dir.path().join("campaign.yaml");
    fs::write(&path, config).unwrap();
    path
}

fn campaign_yaml(extra: &str) -> String {
    format!(
        "campaign_name: whitelist-drop\nadmin: \"{}\"\npool: \"{}\"\nallowlist_file: lists/whitelist.csv\n{extra}",
        deterministic_address("admin"),
        deterministic_address("pool"),
    )
}

/// A campaign launched from a config file pays whitelisted claimants.
#[test]
fn test_launch_from_config() {
    let dir = TempDir::new().unwrap();
    let path = write_campaign_files(
        &dir,
        &campaign_yaml(&format!("expected_root: \"{WHITELIST_ROOT}\"\n")),
    );

    let config = CampaignConfig::load(&path).unwrap();
    assert_eq!(config.read_allowlist().unwrap(), whitelist());

    let ledger = Arc::new(InMemoryTokenLedger::new());
    ledger.mint(&config.pool, 10 * config.amount_per_claim).unwrap();
    let service = config.launch(ledger.clone()).unwrap();
    assert_eq!(service.root().map(|root| hash_to_hex(&root)).as_deref(), Some(WHITELIST_ROOT));

    let tree = AllowListTree::<Keccak256Hasher>::from_addresses(&whitelist());
    let claimant = whitelist()[0];
    service
        .claim(&claimant, &tree.proof_for_address(&claimant).unwrap())
        .unwrap();
    assert_eq!(ledger.balance_of(&claimant), 1_000_000_000_000_000_000);
}

/// An allow-list that drifted from the published root is caught at launch.
#[test]
fn test_launch_root_mismatch() {
    let dir = TempDir::new().unwrap();
    let wrong_root = hash_to_hex(&[0x01; 32]);
    let path = write_campaign_files(
        &dir,
        &campaign_yaml(&format!("expected_root: \"{wrong_root}\"\n")),
    );

    let config = CampaignConfig::load(&path).unwrap();
    let ledger = Arc::new(InMemoryTokenLedger::new());
    match config.launch(ledger) {
        Err(ConfigError::RootMismatch { expected, computed }) => {
            assert_eq!(expected, wrong_root);
            assert_eq!(computed, WHITELIST_ROOT);
        }
        other => panic!("Expected root mismatch, got {:?}", other.map(|_| ())),
    }
}

/// A missing allow-list file is reported, not panicked on.
#[test]
fn test_missing_allowlist_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("campaign.yaml");
    fs::write(&path, campaign_yaml("")).unwrap();

    let config = CampaignConfig::load(&path).unwrap();
    assert!(matches!(config.compute_root(), Err(ConfigError::Csv(_))));
}
