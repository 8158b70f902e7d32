/*!
# CSV Schema Definitions

Authoritative row layouts for airdrop CSV files.
*/

use airdrop_merkle::Address;
use serde::{Deserialize, Serialize};

use crate::serde_helpers::u128_string;

/// Current schema version for all CSV formats
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// Schema version header that may appear as the first comment line
pub const VERSION_HEADER: &str = "# airdrop-csv-version";

// ================================================================================================
// Allow-list CSV Schema
// ================================================================================================

/// Expected headers for allowlist.csv in exact order
pub const ALLOWLIST_CSV_HEADERS: &[&str] = &["address"];

/// Row structure for allowlist.csv
///
/// **File**: `allowlist.csv`
/// **Purpose**: Ordered allow-list; row N becomes leaf N
/// **Producer**: external allow-list tooling
/// **Consumers**: campaign config loading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllowListRow {
    /// Allow-listed address, hex with optional `0x` prefix
    pub address: Address,
}

// ================================================================================================
// Claims CSV Schema
// ================================================================================================

/// Expected headers for claims.csv in exact order
pub const CLAIMS_CSV_HEADERS: &[&str] = &["address", "amount", "sequence"];

/// Row structure for claims.csv
///
/// **File**: `claims.csv`
/// **Purpose**: Report of successful claims
/// **Producer**: campaign snapshot export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimsRow {
    pub address: Address,

    /// Base units transferred. Kept as a decimal string on disk so u128 values survive.
    #[serde(with = "u128_string")]
    pub amount: u128,

    pub sequence: u64,
}

// ================================================================================================
// Tests
// ================================================================================================
