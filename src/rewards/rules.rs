//! Reward rules
//!
//! Pure functions from (actor, all accounts, randomness) to an ordered list
//! of balance instructions. Nothing here touches storage; the ledger applies
//! the instructions in order through `AccountRepository::set_balance`.

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::model::Account;

use super::random::RandomSource;

/// Roulette reel symbols
pub const ROULETTE_SYMBOLS: [char; 6] = ['♚', '♛', '♜', '♝', '♞', '♟'];

/// Cost of one roulette spin
pub const SPIN_COST: u64 = 5;

/// Extra chips on three matching symbols
pub const JACKPOT_BONUS: u64 = 100;

/// Shop catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    /// Pay 2; win the 2 back, or lose 3 more
    DoOrDie1,
    /// Pay 5; win the 5 back, or lose 6 more
    DoOrDie2,
    /// Pay 20; a random account is doubled or halved
    RussianRoulette,
    /// Bet everything; double or nothing
    AllOrNothing,
}

impl Item {
    pub const ALL: [Item; 4] = [
        Item::DoOrDie1,
        Item::DoOrDie2,
        Item::RussianRoulette,
        Item::AllOrNothing,
    ];

    pub fn from_number(number: u8) -> Result<Self, DomainError> {
        match number {
            1 => Ok(Item::DoOrDie1),
            2 => Ok(Item::DoOrDie2),
            3 => Ok(Item::RussianRoulette),
            4 => Ok(Item::AllOrNothing),
            other => Err(DomainError::UnknownItem(other)),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Item::DoOrDie1 => 1,
            Item::DoOrDie2 => 2,
            Item::RussianRoulette => 3,
            Item::AllOrNothing => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Item::DoOrDie1 => "DO OR DIE 1",
            Item::DoOrDie2 => "DO OR DIE 2",
            Item::RussianRoulette => "RUSSIAN ROULETTE",
            Item::AllOrNothing => "ALL OR NOTHING",
        }
    }

    /// Price for an account holding `balance`; the all-in item costs everything
    pub fn price(&self, balance: u64) -> u64 {
        match self {
            Item::DoOrDie1 => 2,
            Item::DoOrDie2 => 5,
            Item::RussianRoulette => 20,
            Item::AllOrNothing => balance,
        }
    }

    /// Smallest balance that may buy the item
    pub fn minimum_balance(&self) -> u64 {
        match self {
            Item::AllOrNothing => 1,
            other => other.price(0),
        }
    }
}

/// Set `identifier`'s balance to `new_balance` (clamped at zero on apply)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceInstruction {
    pub identifier: String,
    pub new_balance: i64,
}

impl BalanceInstruction {
    fn new(identifier: &str, new_balance: i64) -> Self {
        Self {
            identifier: identifier.to_string(),
            new_balance,
        }
    }
}

/// Result of evaluating one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOutcome {
    /// Whether the coin (or the reels) came up in the actor's favour
    pub won: bool,
    /// Account hit by a random-target rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Reels shown by a roulette spin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<[char; 3]>,
    /// Applied in order
    pub instructions: Vec<BalanceInstruction>,
}

impl RewardOutcome {
    /// Final balance the instructions leave for `identifier`, if touched
    pub fn final_balance_of(&self, identifier: &str) -> Option<i64> {
        self.instructions
            .iter()
            .rev()
            .find(|i| i.identifier == identifier)
            .map(|i| i.new_balance)
    }
}

/// Stateless rule set
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardEngine;

impl RewardEngine {
    /// Evaluate a shop purchase.
    ///
    /// `accounts` is the full account set as currently persisted, used by
    /// the random-target item; it may or may not contain the actor.
    pub fn purchase(
        &self,
        item: Item,
        actor: &Account,
        accounts: &[Account],
        rng: &mut dyn RandomSource,
    ) -> Result<RewardOutcome, DomainError> {
        let balance = actor.balance();
        if !balance.covers(item.minimum_balance()) {
            return Err(DomainError::insufficient_funds(
                item.minimum_balance(),
                balance.value(),
            ));
        }

        match item {
            Item::DoOrDie1 => Ok(double_or_penalty(actor, 2, 3, rng)),
            Item::DoOrDie2 => Ok(double_or_penalty(actor, 5, 6, rng)),
            Item::RussianRoulette => Ok(random_target(actor, accounts, rng)),
            Item::AllOrNothing => Ok(all_in(actor, rng)),
        }
    }

    /// Evaluate a roulette spin
    pub fn spin(&self, actor: &Account, rng: &mut dyn RandomSource) -> Result<RewardOutcome, DomainError> {
        let balance = actor.balance();
        if !balance.covers(SPIN_COST) {
            return Err(DomainError::insufficient_funds(SPIN_COST, balance.value()));
        }

        let after_bet = balance.signed() - signed(SPIN_COST);
        let mut instructions = vec![BalanceInstruction::new(actor.identifier(), after_bet)];

        let symbols = [
            ROULETTE_SYMBOLS[rng.pick(ROULETTE_SYMBOLS.len())],
            ROULETTE_SYMBOLS[rng.pick(ROULETTE_SYMBOLS.len())],
            ROULETTE_SYMBOLS[rng.pick(ROULETTE_SYMBOLS.len())],
        ];
        let jackpot = symbols[0] == symbols[1] && symbols[1] == symbols[2];

        if jackpot {
            instructions.push(BalanceInstruction::new(
                actor.identifier(),
                after_bet.saturating_add(signed(JACKPOT_BONUS)),
            ));
        }

        Ok(RewardOutcome {
            won: jackpot,
            target: None,
            symbols: Some(symbols),
            instructions,
        })
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// Items 1 and 2: pay `cost`, then get it back or lose `penalty` more.
fn double_or_penalty(actor: &Account, cost: u64, penalty: u64, rng: &mut dyn RandomSource) -> RewardOutcome {
    let after_bet = actor.balance().signed() - signed(cost);
    let won = rng.coin_flip();
    let settled = if won {
        after_bet + signed(cost)
    } else {
        after_bet - signed(penalty)
    };

    RewardOutcome {
        won,
        target: None,
        symbols: None,
        instructions: vec![
            BalanceInstruction::new(actor.identifier(), after_bet),
            BalanceInstruction::new(actor.identifier(), settled),
        ],
    }
}

// Item 3: pay 20, then double or halve one uniformly chosen account.
fn random_target(actor: &Account, accounts: &[Account], rng: &mut dyn RandomSource) -> RewardOutcome {
    let cost = Item::RussianRoulette.price(0);
    let after_bet = actor.balance().signed() - signed(cost);
    let mut instructions = vec![BalanceInstruction::new(actor.identifier(), after_bet)];

    if accounts.is_empty() {
        return RewardOutcome {
            won: false,
            target: None,
            symbols: None,
            instructions,
        };
    }

    let target = &accounts[rng.pick(accounts.len())];
    let won = rng.coin_flip();

    // The actor's stored balance is stale by the bet just taken.
    let current = if target.identifier() == actor.identifier() {
        after_bet
    } else {
        target.balance().signed()
    };
    let settled = if won {
        current.saturating_mul(2)
    } else {
        current.div_euclid(2)
    };

    instructions.push(BalanceInstruction::new(target.identifier(), settled));

    RewardOutcome {
        won,
        target: Some(target.identifier().to_string()),
        symbols: None,
        instructions,
    }
}

// Item 4: double the whole balance or lose it all.
fn all_in(actor: &Account, rng: &mut dyn RandomSource) -> RewardOutcome {
    let won = rng.coin_flip();
    let settled = if won {
        actor.balance().signed().saturating_mul(2)
    } else {
        0
    };

    RewardOutcome {
        won,
        target: None,
        symbols: None,
        instructions: vec![BalanceInstruction::new(actor.identifier(), settled)],
    }
}
