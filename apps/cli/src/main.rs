//! DropCraft CLI
//!
//! Off-line tooling for Merkle distributions: build the tree from an
//! entitlement list, hand out proofs, verify them, and dry-run every claim
//! against an in-memory distributor.

mod paths;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use dropcraft_core::{hex_encode, leaf_hash, parse_address, parse_amount, parse_hash, Address, Amount, Hash, TokenId};
use dropcraft_logging::LogLevel;
use dropcraft_settlement::{Distributor, DistributorConfig, EventLog, InMemoryLedger, SettlementError};
use dropcraft_tree::{load_entitlements, ClaimEntry, Distribution, MerkleTree};

use crate::paths::expand_path;

/// DropCraft - Merkle airdrop tooling
#[derive(Parser)]
#[command(name = "dropcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a distribution (root + proofs) from an entitlement list
    BuildTree {
        /// Entitlements: JSON array or CSV with `index,account,amount`
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the distribution JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Token address recorded in the distribution
        #[arg(long, value_parser = parse_address)]
        token: Option<Address>,
    },

    /// Print one recipient's claim from a distribution file
    Proof {
        #[arg(short, long)]
        distribution: PathBuf,

        /// Entitlement index
        #[arg(long, conflicts_with = "account", required_unless_present = "account")]
        index: Option<u64>,

        /// Recipient address (first matching claim)
        #[arg(long, value_parser = parse_address)]
        account: Option<Address>,
    },

    /// Check a proof against a root without any ledger state
    Verify {
        #[arg(long, value_parser = parse_hash)]
        root: Hash,

        #[arg(long)]
        index: u64,

        #[arg(long, value_parser = parse_address)]
        account: Address,

        /// Decimal, or hex with `0x`
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,

        /// Sibling hashes, leaf to root (repeat the flag)
        #[arg(long, value_parser = parse_hash)]
        proof: Vec<Hash>,
    },

    /// Publish a distribution on an in-memory distributor and claim everything
    Simulate {
        #[arg(short, long)]
        distribution: PathBuf,

        /// Distributor config (owner, initial roots)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Distributor token holdings (default: the distribution total)
        #[arg(long, value_parser = parse_amount)]
        fund: Option<Amount>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dropcraft_logging::try_init(LogLevel::from_verbose(cli.verbose))?;

    match cli.command {
        Commands::BuildTree { input, output, token } => {
            let distribution = build_tree(&expand_path(&input), &expand_path(&output), token)?;
            println!("Merkle root:  {}", hex_encode(distribution.merkle_root));
            println!("Claims:       {}", distribution.claims.len());
            println!("Total amount: {}", distribution.total_amount);
            println!("Written to:   {}", output.display());
        }
        Commands::Proof {
            distribution,
            index,
            account,
        } => {
            let distribution = read_distribution(&expand_path(&distribution))?;
            let claim = find_claim(&distribution, index, account)?;
            println!("{}", serde_json::to_string_pretty(claim)?);
        }
        Commands::Verify {
            root,
            index,
            account,
            amount,
            proof,
        } => {
            if !verify(&root, index, &account, amount, &proof) {
                bail!("Proof does not verify against root {}", hex_encode(root));
            }
            println!("Proof is valid");
        }
        Commands::Simulate {
            distribution,
            config,
            fund,
        } => {
            let distribution = read_distribution(&expand_path(&distribution))?;
            let config = match config {
                Some(path) => DistributorConfig::load(&expand_path(&path))?,
                None => DistributorConfig::default(),
            };
            let report = simulate(&distribution, &config, fund)?;
            print_report(&report);
        }
    }

    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn build_tree(input: &Path, output: &Path, token: Option<TokenId>) -> Result<Distribution> {
    let entries = load_entitlements(input).with_context(|| format!("Failed to load {}", input.display()))?;
    info!("Loaded {} entitlements from {}", entries.len(), input.display());

    let distribution = Distribution::from_entitlements(token, &entries)?;
    distribution.verify_all()?;
    distribution
        .write_to(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(distribution)
}

fn read_distribution(path: &Path) -> Result<Distribution> {
    Distribution::read_from(path).with_context(|| format!("Failed to read distribution {}", path.display()))
}

fn find_claim(distribution: &Distribution, index: Option<u64>, account: Option<Address>) -> Result<&ClaimEntry> {
    match (index, account) {
        (Some(index), _) => distribution
            .claim_for_index(index)
            .with_context(|| format!("No claim with index {}", index)),
        (None, Some(account)) => distribution
            .claim_for_account(&account)
            .with_context(|| format!("No claim for account {}", hex_encode(account))),
        (None, None) => bail!("Either --index or --account is required"),
    }
}

fn verify(root: &Hash, index: u64, account: &Address, amount: Amount, proof: &[Hash]) -> bool {
    let leaf = leaf_hash(index, account, amount);
    MerkleTree::verify(root, &leaf, proof)
}

/// Outcome of a simulated claim run.
#[derive(Debug)]
struct SimulationReport {
    token: TokenId,
    root: Hash,
    claimed: usize,
    failed: Vec<(u64, SettlementError)>,
    replayed: usize,
    replays_rejected: usize,
    paid: Amount,
    remaining: Amount,
}

fn simulate(distribution: &Distribution, config: &DistributorConfig, fund: Option<Amount>) -> Result<SimulationReport> {
    let token = distribution.token.unwrap_or_default();
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.set_balance(token, fund.unwrap_or(distribution.total_amount));

    let events = Arc::new(EventLog::new());
    let distributor = Distributor::from_config(config, ledger.clone(), events.clone())?;

    if let Some(existing) = distributor.merkle_root(&token) {
        if existing != distribution.merkle_root {
            warn!(
                "Configured root {} replaced by distribution root {}",
                hex_encode(&existing[..8]),
                hex_encode(&distribution.merkle_root[..8]),
            );
        }
    }
    distributor.set_root(&config.owner, token, distribution.merkle_root)?;

    let mut failed = Vec::new();
    let mut succeeded = Vec::new();
    for claim in &distribution.claims {
        match distributor.claim(&token, claim.index, &claim.account, claim.amount, &claim.proof) {
            Ok(_) => succeeded.push(claim),
            Err(e) => failed.push((claim.index, e)),
        }
    }

    // Second pass over paid claims only: each must now be rejected
    let replays_rejected = succeeded
        .iter()
        .filter(|claim| {
            matches!(
                distributor.claim(&token, claim.index, &claim.account, claim.amount, &claim.proof),
                Err(SettlementError::AlreadyClaimed { .. })
            )
        })
        .count();

    let paid = events
        .claimed_events()
        .iter()
        .fold(Amount::zero(), |acc, e| acc.saturating_add(e.amount));

    Ok(SimulationReport {
        token,
        root: distribution.merkle_root,
        claimed: events.len(),
        failed,
        replayed: succeeded.len(),
        replays_rejected,
        paid,
        remaining: ledger.reserve_of(&token),
    })
}

fn print_report(report: &SimulationReport) {
    println!("DropCraft Simulation");
    println!("====================");
    println!("Token:            {}", hex_encode(report.token));
    println!("Root:             {}", hex_encode(report.root));
    println!("Claimed:          {}", report.claimed);
    println!("Failed:           {}", report.failed.len());
    println!("Replays rejected: {}/{}", report.replays_rejected, report.replayed);
    println!("Paid out:         {}", report.paid);
    println!("Remaining:        {}", report.remaining);

    for (index, error) in &report.failed {
        eprintln!("  index {}: {}", index, error);
    }
}
