/*!
# Airdrop CSV Schema Definitions

The CSV data contracts between the engine and the tooling around it:

- **Allow-list tooling** (producer) → `allowlist.csv`
- **Campaign config loading** (consumer) → reads `allowlist.csv` in order
- **Claim reporting** (producer) → `claims.csv` from a campaign snapshot

## Schema Files

### Allow-list CSV (`allowlist.csv`)
One column, row order is leaf order:
- `address`: 20-byte address as 40 hex chars, `0x` prefix optional

### Claims CSV (`claims.csv`)
- `address`: claimant address
- `amount`: base units transferred (u128, decimal)
- `sequence`: order in which the claim succeeded (u64)

## Versioning

Files may start with a comment line carrying the schema version:
`# airdrop-csv-version: 1.0`. Other `#` lines are ignored.

## Usage

```rust,no_run
use airdrop_csvs::{find_duplicate_addresses, read_allowlist_csv, CsvResult};

fn example() -> CsvResult<()> {
    let addresses = read_allowlist_csv("allowlist.csv")?;
    for duplicate in find_duplicate_addresses(&addresses) {
        println!("listed more than once: {duplicate}");
    }
    Ok(())
}
```
*/

pub mod errors;
pub mod schemas;
pub mod serde_helpers;
pub mod validation;

// Re-export main types for convenience
pub use errors::{CsvError, CsvResult};
pub use schemas::{AllowListRow, ClaimsRow, CURRENT_SCHEMA_VERSION};
pub use validation::{
    find_duplicate_addresses, parse_allowlist_csv, parse_claims_csv, read_allowlist_csv,
    read_claims_csv, write_claims_csv, write_claims_csv_to,
};
