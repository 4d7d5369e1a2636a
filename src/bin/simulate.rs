//! Odds simulator
//!
//! Runs seeded roulette spins and item purchases against an in-memory
//! ledger and reports the empirical rates.
//!
//! Run with: cargo run --bin simulate --release -- --rounds 5000 --seed 7

use std::time::Instant;

use rand::{rngs::StdRng, SeedableRng};

use chip_ledger::domain::Session;
use chip_ledger::rewards::{Item, RngSource};
use chip_ledger::telemetry::init_tracing;
use chip_ledger::{AdminCredentials, LedgerService, MemoryStore, Namespaces, SignupCommand};

// Enough chips that no round runs out of funds
const BANKROLL: u64 = 1_000_000_000;

fn flag(args: &[String], name: &str, default: u64) -> u64 {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("chip_ledger=warn");

    let args: Vec<String> = std::env::args().collect();
    let rounds = flag(&args, "--rounds", 2_000);
    let seed = flag(&args, "--seed", 42);

    let mut ledger = LedgerService::new(
        MemoryStore::new(),
        Namespaces::new("simulate"),
        AdminCredentials::new("sim-admin@localhost.test", "sim-admin"),
    )?
    .with_random(RngSource(StdRng::seed_from_u64(seed)));

    let player = ledger
        .signup(SignupCommand::new("player", "player@localhost.test", "player-secret"))?
        .session;
    let admin = Session::admin();

    println!("Simulating {rounds} rounds per game (seed {seed})");
    let start = Instant::now();

    let mut jackpots = 0u64;
    let mut wins = [0u64; 3];

    for _ in 0..rounds {
        top_up(&mut ledger, &admin, &player)?;

        if ledger.spin_roulette(&player)?.jackpot {
            jackpots += 1;
        }
        for (slot, item) in [Item::DoOrDie1, Item::DoOrDie2, Item::AllOrNothing]
            .into_iter()
            .enumerate()
        {
            if ledger.purchase(&player, item.number())?.outcome.won {
                wins[slot] += 1;
            }
            top_up(&mut ledger, &admin, &player)?;
        }
    }

    let elapsed = start.elapsed();
    let rate = |hits: u64| hits as f64 / rounds.max(1) as f64;

    println!("\n=== Simulation Results ===");
    println!("Roulette jackpot rate: {:.4} (expected {:.4})", rate(jackpots), 1.0 / 36.0);
    for (item, hits) in [Item::DoOrDie1, Item::DoOrDie2, Item::AllOrNothing]
        .iter()
        .zip(wins)
    {
        println!("{:<16} win rate: {:.4} (expected 0.5000)", item.name(), rate(hits));
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

// Keep the player's balance high by redeeming a fresh code when it dips.
fn top_up(
    ledger: &mut LedgerService<MemoryStore>,
    admin: &Session,
    player: &Session,
) -> anyhow::Result<()> {
    let identifier = player.identifier().unwrap_or_default();
    if ledger.get_account(identifier)?.balance().value() >= BANKROLL / 2 {
        return Ok(());
    }
    let code = ledger.mint_code(admin, BANKROLL)?;
    ledger.redeem_code(player, &code.code)?;
    Ok(())
}
