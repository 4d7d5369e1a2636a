//! chip_ledger - operator tool for the chip ledger
//!
//! Works directly on the configured JSON store:
//!
//!   chip_ledger mint <amount>
//!   chip_ledger codes
//!   chip_ledger scoreboard [n]
//!   chip_ledger account <identifier>

use anyhow::{anyhow, bail, Context};

use chip_ledger::projection::DEFAULT_TOP;
use chip_ledger::telemetry::init_tracing;
use chip_ledger::{Config, JsonFileStore, LedgerService};

const USAGE: &str = "usage: chip_ledger <mint <amount> | codes | scoreboard [n] | account <identifier>>";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Mint(u64),
    Codes,
    Scoreboard(usize),
    Account(String),
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut args = args.iter().map(String::as_str);

        let command = match (args.next(), args.next()) {
            (Some("mint"), Some(amount)) => Command::Mint(
                amount
                    .parse()
                    .with_context(|| format!("invalid chip amount: {amount}"))?,
            ),
            (Some("codes"), None) => Command::Codes,
            (Some("scoreboard"), None) => Command::Scoreboard(DEFAULT_TOP),
            (Some("scoreboard"), Some(n)) => {
                Command::Scoreboard(n.parse().with_context(|| format!("invalid row count: {n}"))?)
            }
            (Some("account"), Some(identifier)) => Command::Account(identifier.to_string()),
            _ => bail!(USAGE),
        };

        if args.next().is_some() {
            bail!(USAGE);
        }
        Ok(command)
    }
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing("chip_ledger=info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config = Config::from_env()?;
    tracing::debug!(store = %config.store_path.display(), prefix = %config.key_prefix, "Opening ledger");

    let store = JsonFileStore::open(&config.store_path)?;
    let mut ledger = LedgerService::from_config(store, &config)?;

    match command {
        Command::Mint(amount) => {
            let admin = ledger.login(&config.admin_identifier, &config.admin_secret)?;
            let minted = ledger.mint_code(&admin, amount)?;
            println!("{}  {} chips  expires {}", minted.code, minted.grant, minted.expires_at);
        }
        Command::Codes => {
            let admin = ledger.login(&config.admin_identifier, &config.admin_secret)?;
            let codes = ledger.list_codes(&admin)?;
            if codes.is_empty() {
                println!("No codes minted yet");
            }
            for listing in codes {
                let code = &listing.code;
                println!(
                    "{}  {:>8} chips  {:<8}  expires {}  {}",
                    code.code,
                    code.grant,
                    listing.status.to_string(),
                    code.expires_at,
                    code.redeemed_by.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Scoreboard(n) => {
            for entry in ledger.scoreboard_top(n)? {
                println!("{:>3}. {:<20} {}", entry.rank, entry.display_name, entry.balance);
            }
        }
        Command::Account(identifier) => {
            let account = ledger.get_account(&identifier)?;
            let rank = ledger
                .rank_of(&identifier)?
                .ok_or_else(|| anyhow!("account vanished while ranking: {identifier}"))?;
            println!(
                "{} ({})  {} chips  rank {}",
                account.display_name(),
                account.identifier(),
                account.balance(),
                rank
            );
        }
    }

    Ok(())
}
