//! Entitlement list loaders.
//!
//! Accepted inputs:
//! - JSON array of `{index, account, amount}`
//! - JSON array of `{account, amount}` (indices assigned from list position)
//! - CSV with header `index,account,amount`
//!
//! A JSON list either carries an index on every row or on none. Mixed lists
//! are rejected rather than renumbered.

use std::fs;
use std::path::Path;

use dropcraft_core::{parse_address, parse_amount, serde_address, serde_amount, Address, Amount, Balance, Entitlement};
use serde::Deserialize;
use tracing::debug;

use crate::{Result, TreeError};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EntitlementRow {
    #[serde(default)]
    index: Option<u64>,
    #[serde(with = "serde_address")]
    account: Address,
    #[serde(with = "serde_amount")]
    amount: Amount,
}

/// Load entitlements from a `.csv` or `.json` file.
pub fn load_entitlements(path: &Path) -> Result<Vec<Entitlement>> {
    let content = fs::read_to_string(path)?;
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let entries = if is_csv {
        parse_entitlements_csv(&content)?
    } else {
        parse_entitlements_json(&content)?
    };

    debug!("Loaded {} entitlements from {:?}", entries.len(), path);
    Ok(entries)
}

/// Parse a JSON entitlement list.
pub fn parse_entitlements_json(content: &str) -> Result<Vec<Entitlement>> {
    let rows: Vec<EntitlementRow> = serde_json::from_str(content)?;
    let indexed = match rows.first() {
        Some(row) => row.index.is_some(),
        None => return Err(TreeError::EmptyInput),
    };
    if let Some(position) = rows.iter().position(|row| row.index.is_some() != indexed) {
        return Err(TreeError::MixedIndices { entry: position + 1 });
    }

    let entries: Vec<Entitlement> = if indexed {
        rows.iter()
            .filter_map(|row| row.index.map(|index| Entitlement::new(index, row.account, row.amount)))
            .collect()
    } else {
        let balances: Vec<Balance> = rows
            .iter()
            .map(|row| Balance {
                account: row.account,
                amount: row.amount,
            })
            .collect();
        Balance::into_entitlements(&balances)
    };
    Ok(entries)
}

/// Parse a CSV entitlement list. Blank lines and `#` comments are skipped.
pub fn parse_entitlements_csv(content: &str) -> Result<Vec<Entitlement>> {
    let mut entries = Vec::new();
    let mut header_seen = false;

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if !header_seen {
            header_seen = true;
            let is_header = parts.len() == 3
                && parts
                    .iter()
                    .zip(["index", "account", "amount"])
                    .all(|(part, name)| part.eq_ignore_ascii_case(name));
            if is_header {
                continue;
            }
        }
        if parts.len() != 3 {
            return Err(TreeError::InvalidInput {
                line: line_num,
                reason: format!("expected 'index,account,amount', got '{}'", trimmed),
            });
        }

        let index: u64 = parts[0].parse().map_err(|_| TreeError::InvalidInput {
            line: line_num,
            reason: format!("invalid index '{}'", parts[0]),
        })?;
        let account = parse_address(parts[1]).map_err(|e| TreeError::InvalidInput {
            line: line_num,
            reason: e.to_string(),
        })?;
        let amount = parse_amount(parts[2]).map_err(|e| TreeError::InvalidInput {
            line: line_num,
            reason: e.to_string(),
        })?;

        entries.push(Entitlement::new(index, account, amount));
    }

    if entries.is_empty() {
        return Err(TreeError::EmptyInput);
    }
    Ok(entries)
}
