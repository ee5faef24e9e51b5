// fundpool CLI - drives a sled-backed funding ledger from the command line
//
// Local identities stand in for the authenticating transport: `--from` takes
// either a stored account name or a raw 0x address.

use clap::{Parser, Subcommand};
use fundpool::identity::{Address, Keypair};
use fundpool::ledger::{FundingLedger, LedgerState};
use fundpool::oracle::{PriceQuote, StaticPriceFeed, SCALING_FACTOR};
use fundpool::payout::LogTransfer;
use fundpool::storage::LedgerStore;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fundpool")]
#[command(about = "Crowdfunding ledger with oracle-priced USD minimums")]
struct Cli {
    /// Data directory for the sled store
    #[arg(long, default_value = "fundpool-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the ledger: generates the owner account and pins the oracle quote
    Init {
        /// USD price of one native coin served by the static feed
        #[arg(long, default_value_t = 2000)]
        price_usd: u64,
    },
    /// Generate a named contributor account
    NewAccount { name: String },
    /// List local accounts
    Accounts,
    /// Contribute native value to the pool
    Fund {
        #[arg(long)]
        from: String,
        /// Amount in smallest native units
        #[arg(long)]
        amount: u128,
    },
    /// Refund the caller's entire funded balance
    Refund {
        #[arg(long)]
        from: String,
    },
    /// Refund a chosen partial amount
    CustomRefund {
        #[arg(long)]
        from: String,
        #[arg(long)]
        amount: u128,
    },
    /// Unconditional full refund, ignoring goal state
    RefundAll {
        #[arg(long)]
        from: String,
    },
    /// Sweep the treasury to the owner (owner only)
    Withdraw {
        #[arg(long)]
        from: String,
    },
    /// Set the funding goal in whole USD (owner only)
    SetGoal {
        #[arg(long)]
        from: String,
        #[arg(long)]
        goal_usd: u64,
    },
    /// Evaluate the funding goal at the current price
    CheckGoal,
    /// Update the stored oracle quote
    SetPrice {
        #[arg(long)]
        price: i128,
        #[arg(long, default_value_t = 8)]
        decimals: u8,
    },
    /// Transfer ledger ownership (owner only)
    TransferOwnership {
        #[arg(long)]
        from: String,
        #[arg(long)]
        new_owner: String,
    },
    /// Show ledger status
    Status,
    /// List funders in funding order
    Funders,
    /// List emitted events
    Events,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let store = LedgerStore::open(&cli.data_dir)?;

    match cli.command {
        Command::Init { price_usd } => {
            if store.load_state()?.is_some() {
                return Err("ledger already initialized".into());
            }
            let owner = Keypair::generate();
            store.save_keypair("owner", &owner)?;
            store.save_state(&LedgerState::new(owner.address()))?;
            store.save_quote(&PriceQuote::from_usd(price_usd))?;
            store.flush()?;
            println!("ledger initialized");
            println!("owner account: {}", owner.address());
            println!("oracle quote: {} USD per coin", price_usd);
        }
        Command::NewAccount { name } => {
            if store.load_keypair(&name)?.is_some() {
                return Err(format!("account '{}' already exists", name).into());
            }
            let keypair = Keypair::generate();
            store.save_keypair(&name, &keypair)?;
            store.flush()?;
            println!("{}: {}", name, keypair.address());
        }
        Command::Accounts => {
            for name in store.list_keypairs()? {
                if let Some(keypair) = store.load_keypair(&name)? {
                    println!("{}: {}", name, keypair.address());
                }
            }
        }
        Command::Fund { from, amount } => {
            let caller = resolve_address(&store, &from)?;
            let mut ledger = open_ledger(&store)?;
            let event = ledger.fund(caller, amount)?;
            persist(&store, &ledger)?;
            println!("{}", event);
        }
        Command::Refund { from } => {
            let caller = resolve_address(&store, &from)?;
            let mut ledger = open_ledger(&store)?;
            let event = ledger.refund(caller)?;
            persist(&store, &ledger)?;
            println!("{}", event);
        }
        Command::CustomRefund { from, amount } => {
            let caller = resolve_address(&store, &from)?;
            let mut ledger = open_ledger(&store)?;
            let event = ledger.custom_refund(caller, amount)?;
            persist(&store, &ledger)?;
            println!("{}", event);
        }
        Command::RefundAll { from } => {
            let caller = resolve_address(&store, &from)?;
            let mut ledger = open_ledger(&store)?;
            let event = ledger.refund_all(caller)?;
            persist(&store, &ledger)?;
            println!("{}", event);
        }
        Command::Withdraw { from } => {
            let caller = resolve_address(&store, &from)?;
            let mut ledger = open_ledger(&store)?;
            let swept = ledger.withdraw(caller)?;
            persist(&store, &ledger)?;
            println!("withdrew {} native units to {}", swept, caller);
        }
        Command::SetGoal { from, goal_usd } => {
            let caller = resolve_address(&store, &from)?;
            let mut ledger = open_ledger(&store)?;
            ledger.update_goal(caller, goal_usd)?;
            persist(&store, &ledger)?;
            println!("funding goal set to {} USD", goal_usd);
        }
        Command::CheckGoal => {
            let mut ledger = open_ledger(&store)?;
            let reached = ledger.check_goal_reached()?;
            persist(&store, &ledger)?;
            println!("goal reached: {}", reached);
        }
        Command::SetPrice { price, decimals } => {
            store.save_quote(&PriceQuote::new(price, decimals))?;
            store.flush()?;
            println!("oracle quote set to {} at {} decimals", price, decimals);
        }
        Command::TransferOwnership { from, new_owner } => {
            let caller = resolve_address(&store, &from)?;
            let target = resolve_address(&store, &new_owner)?;
            let mut ledger = open_ledger(&store)?;
            let event = ledger.change_ownership(caller, target)?;
            persist(&store, &ledger)?;
            println!("{}", event);
        }
        Command::Status => {
            let ledger = open_ledger(&store)?;
            println!("owner:          {}", ledger.owner());
            println!("funding goal:   {} USD", ledger.funding_goal() / SCALING_FACTOR);
            println!("goal reached:   {}", ledger.goal_reached());
            println!("treasury:       {} native units", ledger.treasury_balance());
            println!("total funded:   {} native units", ledger.total_funded());
            println!("funding calls:  {}", ledger.funder_count());
        }
        Command::Funders => {
            let ledger = open_ledger(&store)?;
            for (index, funder) in ledger.state().funders().iter().enumerate() {
                println!("{}: {}", index, funder);
            }
        }
        Command::Events => {
            let ledger = open_ledger(&store)?;
            for record in ledger.state().events() {
                let when = chrono::DateTime::from_timestamp(record.timestamp(), 0)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| record.timestamp().to_string());
                println!("{} {}", when, record.event());
            }
        }
    }

    Ok(())
}

/// Rehydrate the ledger with the stored quote and a log-only transfer sink
fn open_ledger(store: &LedgerStore) -> Result<FundingLedger, Box<dyn Error>> {
    let state = store
        .load_state()?
        .ok_or("ledger not initialized; run `fundpool init` first")?;
    let quote = store
        .load_quote()?
        .ok_or("oracle quote missing; run `fundpool init` first")?;

    Ok(FundingLedger::from_state(
        state,
        Arc::new(StaticPriceFeed::new(quote)),
        Arc::new(LogTransfer::new()),
    ))
}

fn persist(store: &LedgerStore, ledger: &FundingLedger) -> Result<(), Box<dyn Error>> {
    store.save_state(ledger.state())?;
    store.flush()?;
    Ok(())
}

/// Resolve `--from` input: a raw 0x address or a stored account name
fn resolve_address(store: &LedgerStore, who: &str) -> Result<Address, Box<dyn Error>> {
    if let Ok(address) = Address::from_str(who) {
        return Ok(address);
    }
    match store.load_keypair(who)? {
        Some(keypair) => Ok(keypair.address()),
        None => Err(format!("unknown account '{}'", who).into()),
    }
}
