//! Ledger Service
//!
//! Composes the repositories, the reward rules and the store transaction
//! into the operations a caller issues. Each mutation runs in exactly one
//! `StoreTransaction`; events are published only after it commits.

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::{verifier_for, CredentialVerifier, PlaintextVerifier};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::domain::{
    validation::{looks_like_email, MIN_SECRET_LEN},
    BalanceReason, Capability, Chips, DomainError, LedgerEvent, Session, ValidationErrors,
};
use crate::error::{AppError, AppResult};
use crate::eventbus::EventBus;
use crate::model::Account;
use crate::projection::{ScoreboardEntry, ScoreboardView};
use crate::repository::{AccountRepository, CodeRegistry};
use crate::rewards::{BalanceInstruction, Item, RandomSource, RewardEngine, RngSource};
use crate::store::{recover, KeyValueStore, Namespaces, StoreTransaction};

use super::commands::{
    CodeListing, MintResult, PurchaseResult, RedeemResult, SignupCommand, SignupResult, SpinResult,
};

/// Value written to the admin namespace while an admin session is persisted
const ADMIN_FLAG: &str = "true";

/// The fixed privileged login pair
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    identifier: String,
    secret: String,
}

impl AdminCredentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    fn matches(&self, identifier: &str, secret: &str) -> bool {
        self.identifier == identifier && self.secret == secret
    }
}

impl From<&Config> for AdminCredentials {
    fn from(config: &Config) -> Self {
        Self::new(&config.admin_identifier, &config.admin_secret)
    }
}

/// Chip ledger over an injected key-value store
pub struct LedgerService<S: KeyValueStore> {
    store: S,
    namespaces: Namespaces,
    accounts: AccountRepository,
    codes: CodeRegistry,
    scoreboard: ScoreboardView,
    rewards: RewardEngine,
    random: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
    verifier: Box<dyn CredentialVerifier>,
    admin: AdminCredentials,
    bus: EventBus,
}

impl<S: KeyValueStore> LedgerService<S> {
    /// Open a ledger over `store`, replaying any interrupted transaction
    /// first.
    pub fn new(mut store: S, namespaces: Namespaces, admin: AdminCredentials) -> AppResult<Self> {
        let replayed = recover(&mut store, &namespaces.journal)?;
        if replayed > 0 {
            tracing::info!(replayed, "Store recovered before start");
        }

        let accounts = AccountRepository::new(&namespaces.accounts);

        Ok(Self {
            codes: CodeRegistry::new(&namespaces.codes),
            scoreboard: ScoreboardView::new(accounts.clone()),
            accounts,
            store,
            namespaces,
            rewards: RewardEngine,
            random: Box::new(RngSource::thread()),
            clock: Box::new(SystemClock),
            verifier: Box::new(PlaintextVerifier),
            admin,
            bus: EventBus::new(),
        })
    }

    /// Ledger wired from configuration: namespaces, admin pair, verifier
    pub fn from_config(store: S, config: &Config) -> AppResult<Self> {
        let ledger = Self::new(store, Namespaces::new(&config.key_prefix), config.into())?;
        Ok(ledger.with_verifier(verifier_for(config.credentials)))
    }

    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_verifier(mut self, verifier: impl CredentialVerifier + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Receive every event published from now on
    pub fn subscribe(&mut self) -> Receiver<LedgerEvent> {
        self.bus.subscribe()
    }

    // =========================================================================
    // signup / login / logout
    // =========================================================================

    /// Register an account with the signup balance and log it in.
    ///
    /// Every rejected field is reported together in one `Validation` error.
    pub fn signup(&mut self, command: SignupCommand) -> AppResult<SignupResult> {
        let correlation_id = Uuid::new_v4();
        let _span = operation_span("signup", correlation_id).entered();

        let display_name = command.display_name.trim().to_string();
        if let Err(errors) = self.validate_signup(&command, &display_name)?.into_result() {
            tracing::debug!(%errors, "Signup rejected");
            return Err(errors.into());
        }

        let now = self.clock.now();
        let account = Account::create(
            command.identifier.clone(),
            display_name,
            self.verifier.seal(&command.secret),
        );

        let mut tx = StoreTransaction::begin(&mut self.store, &self.namespaces.journal)?;
        let account = self.accounts.create(&mut tx, account)?;
        tx.commit()?;

        self.bus.publish(LedgerEvent::AccountCreated {
            identifier: account.identifier().to_string(),
            display_name: account.display_name().to_string(),
            balance: account.balance().value(),
            created_at: now,
        });

        tracing::info!(identifier = %account.identifier(), "Account created");

        let session = Session::account_holder(account.identifier()).with_correlation_id(correlation_id);
        Ok(SignupResult { account, session })
    }

    fn validate_signup(&self, command: &SignupCommand, display_name: &str) -> AppResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if display_name.is_empty() {
            errors.push("display_name", "Please enter a name");
        } else if self
            .accounts
            .find_by_display_name(&self.store, display_name)?
            .is_some()
        {
            errors.push("display_name", "This name is already taken");
        }

        if command.identifier.trim().is_empty() {
            errors.push("identifier", "Please enter an email address");
        } else if !looks_like_email(&command.identifier) {
            errors.push("identifier", "Please enter a valid email address");
        } else if self.accounts.get(&self.store, &command.identifier)?.is_some() {
            errors.push("identifier", "This email is already registered");
        }

        if command.secret.is_empty() {
            errors.push("secret", "Please enter a password");
        } else if command.secret.chars().count() < MIN_SECRET_LEN {
            errors.push("secret", format!("Password must be at least {MIN_SECRET_LEN} characters"));
        }

        if command.secret != command.confirm_secret {
            errors.push("confirm_secret", "Passwords do not match");
        }

        Ok(errors)
    }

    /// Exchange credentials for a session. The configured admin pair is
    /// checked first and never touches the accounts namespace.
    pub fn login(&self, identifier: &str, secret: &str) -> AppResult<Session> {
        let correlation_id = Uuid::new_v4();
        let _span = operation_span("login", correlation_id).entered();

        if self.admin.matches(identifier, secret) {
            tracing::info!("Admin logged in");
            return Ok(Session::admin().with_correlation_id(correlation_id));
        }

        match self.accounts.get(&self.store, identifier)? {
            Some(account) if self.verifier.verify(secret, account.secret()) => {
                tracing::info!(identifier, "Account logged in");
                Ok(Session::account_holder(identifier).with_correlation_id(correlation_id))
            }
            _ => {
                tracing::debug!(identifier, "Login rejected");
                Err(DomainError::InvalidCredentials.into())
            }
        }
    }

    /// Forget any persisted session
    pub fn logout(&mut self, session: &Session) -> AppResult<()> {
        let _span = operation_span("logout", session_correlation(session)).entered();

        let mut tx = StoreTransaction::begin(&mut self.store, &self.namespaces.journal)?;
        tx.set(&self.namespaces.current_user, Value::Null)?;
        tx.set(&self.namespaces.admin, Value::Null)?;
        tx.commit()?;

        tracing::debug!(capability = ?session.capability, "Logged out");
        Ok(())
    }

    // =========================================================================
    // session persistence
    // =========================================================================

    /// Write `session` to the session namespaces so `restore_session` can
    /// pick it up after a restart
    pub fn persist_session(&mut self, session: &Session) -> AppResult<()> {
        let (current_user, admin) = match &session.capability {
            Capability::Anonymous => (Value::Null, Value::Null),
            Capability::Admin => (Value::Null, Value::String(ADMIN_FLAG.to_string())),
            Capability::AccountHolder { identifier } => (Value::String(identifier.clone()), Value::Null),
        };

        let mut tx = StoreTransaction::begin(&mut self.store, &self.namespaces.journal)?;
        tx.set(&self.namespaces.current_user, current_user)?;
        tx.set(&self.namespaces.admin, admin)?;
        tx.commit()?;
        Ok(())
    }

    /// Session left by `persist_session`. An account-holder session whose
    /// account no longer exists comes back anonymous.
    pub fn restore_session(&self) -> AppResult<Session> {
        let admin_flag = self.store.get(&self.namespaces.admin)?;
        if matches!(&admin_flag, Some(Value::String(flag)) if flag == ADMIN_FLAG)
            || matches!(admin_flag, Some(Value::Bool(true)))
        {
            return Ok(Session::admin());
        }

        if let Some(Value::String(identifier)) = self.store.get(&self.namespaces.current_user)? {
            if self.accounts.get(&self.store, &identifier)?.is_some() {
                return Ok(Session::account_holder(identifier));
            }
            tracing::debug!(identifier = %identifier, "Persisted session names a missing account");
        }

        Ok(Session::anonymous())
    }

    // =========================================================================
    // purchase / spin
    // =========================================================================

    /// Buy shop item `item_number` (1 to 4) for the session's account
    pub fn purchase(&mut self, session: &Session, item_number: u8) -> AppResult<PurchaseResult> {
        let identifier = require_account_holder(session)?.to_string();
        let correlation_id = session_correlation(session);
        let _span = operation_span("purchase", correlation_id).entered();

        let item = Item::from_number(item_number)?;
        let now = self.clock.now();

        let mut tx = StoreTransaction::begin(&mut self.store, &self.namespaces.journal)?;
        let actor = load_account(&self.accounts, &tx, &identifier)?;
        let universe = self.accounts.list_all(&tx)?;

        let outcome = match self
            .rewards
            .purchase(item, &actor, &universe, self.random.as_mut())
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(item = item.number(), error = %e, "Purchase rejected");
                return Err(e.into());
            }
        };

        let events = apply_instructions(
            &self.accounts,
            &mut tx,
            &identifier,
            BalanceReason::Purchase,
            &outcome.instructions,
            correlation_id,
            now,
        )?;
        let account = load_account(&self.accounts, &tx, &identifier)?;
        let target = match &outcome.target {
            Some(target) => self.accounts.get(&tx, target)?,
            None => None,
        };
        tx.commit()?;

        self.bus.publish_all(events);

        tracing::info!(
            identifier = %identifier,
            item = item.name(),
            won = outcome.won,
            balance = account.balance().value(),
            "Purchase settled"
        );

        Ok(PurchaseResult {
            item,
            outcome,
            account,
            target,
        })
    }

    /// Spin the roulette for the session's account
    pub fn spin_roulette(&mut self, session: &Session) -> AppResult<SpinResult> {
        let identifier = require_account_holder(session)?.to_string();
        let correlation_id = session_correlation(session);
        let _span = operation_span("spin_roulette", correlation_id).entered();

        let now = self.clock.now();

        let mut tx = StoreTransaction::begin(&mut self.store, &self.namespaces.journal)?;
        let actor = load_account(&self.accounts, &tx, &identifier)?;

        let outcome = match self.rewards.spin(&actor, self.random.as_mut()) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(error = %e, "Spin rejected");
                return Err(e.into());
            }
        };

        let events = apply_instructions(
            &self.accounts,
            &mut tx,
            &identifier,
            BalanceReason::Roulette,
            &outcome.instructions,
            correlation_id,
            now,
        )?;
        let account = load_account(&self.accounts, &tx, &identifier)?;
        tx.commit()?;

        self.bus.publish_all(events);

        let symbols = outcome.symbols.unwrap_or([' '; 3]);
        let reels: String = symbols.iter().collect();
        tracing::info!(
            identifier = %identifier,
            reels = %reels,
            jackpot = outcome.won,
            "Roulette settled"
        );

        Ok(SpinResult {
            symbols,
            jackpot: outcome.won,
            account,
        })
    }

    // =========================================================================
    // codes
    // =========================================================================

    /// Redeem `code` into the session's account. The balance credit and the
    /// code's used mark commit together.
    pub fn redeem_code(&mut self, session: &Session, code: &str) -> AppResult<RedeemResult> {
        let identifier = require_account_holder(session)?.to_string();
        let correlation_id = session_correlation(session);
        let _span = operation_span("redeem_code", correlation_id).entered();

        let now = self.clock.now();

        let mut tx = StoreTransaction::begin(&mut self.store, &self.namespaces.journal)?;
        let redemption = match self.codes.redeem(&mut tx, &self.accounts, code, &identifier, now) {
            Ok(redemption) => redemption,
            Err(e) => {
                tracing::debug!(code, error = %e, "Redemption rejected");
                return Err(e);
            }
        };
        tx.commit()?;

        let grant = redemption.code.grant;
        let balance = redemption.account.balance().value();

        self.bus.publish_all([
            LedgerEvent::BalanceChanged {
                identifier: identifier.clone(),
                previous: redemption.previous_balance,
                current: balance,
                reason: BalanceReason::Redemption,
                correlation_id: Some(correlation_id),
                changed_at: now,
            },
            LedgerEvent::CodeRedeemed {
                code: redemption.code.code.clone(),
                identifier: identifier.clone(),
                grant,
                redeemed_at: now,
            },
        ]);

        tracing::info!(identifier = %identifier, code = %redemption.code.code, grant, "Code redeemed");

        Ok(RedeemResult {
            code: redemption.code.code,
            grant,
            balance,
        })
    }

    /// Mint a code worth `grant` chips. Admin only.
    pub fn mint_code(&mut self, session: &Session, grant: u64) -> AppResult<MintResult> {
        require_admin(session)?;
        let _span = operation_span("mint_code", session_correlation(session)).entered();

        let grant = Chips::new(grant).map_err(|e| DomainError::InvalidAmount(e.to_string()))?;
        let now = self.clock.now();

        let mut tx = StoreTransaction::begin(&mut self.store, &self.namespaces.journal)?;
        let code = self.codes.mint(&mut tx, grant, self.random.as_mut(), now)?;
        tx.commit()?;

        self.bus.publish(LedgerEvent::CodeMinted {
            code: code.code.clone(),
            grant: grant.value(),
            expires_at: code.expires_at,
        });

        tracing::info!(code = %code.code, grant = %grant, expires_at = %code.expires_at, "Code minted");
        Ok(MintResult::from(&code))
    }

    /// Every stored code with its status as of now, oldest first. Admin only.
    pub fn list_codes(&self, session: &Session) -> AppResult<Vec<CodeListing>> {
        require_admin(session)?;

        let now = self.clock.now();
        let mut codes = self.codes.list_all(&self.store)?;
        codes.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(codes
            .into_iter()
            .map(|code| CodeListing {
                status: code.status(now),
                code,
            })
            .collect())
    }

    // =========================================================================
    // reads
    // =========================================================================

    pub fn get_account(&self, identifier: &str) -> AppResult<Account> {
        load_account(&self.accounts, &self.store, identifier)
    }

    /// All accounts, richest first
    pub fn scoreboard_snapshot(&self) -> AppResult<Vec<Account>> {
        self.scoreboard.snapshot(&self.store)
    }

    pub fn scoreboard_top(&self, n: usize) -> AppResult<Vec<ScoreboardEntry>> {
        self.scoreboard.top(&self.store, n)
    }

    pub fn rank_of(&self, identifier: &str) -> AppResult<Option<usize>> {
        self.scoreboard.rank_of(&self.store, identifier)
    }
}

fn operation_span(operation: &'static str, correlation_id: Uuid) -> tracing::Span {
    tracing::info_span!("ledger", operation, correlation_id = %correlation_id)
}

fn session_correlation(session: &Session) -> Uuid {
    session.correlation_id.unwrap_or_else(Uuid::new_v4)
}

fn require_account_holder(session: &Session) -> AppResult<&str> {
    session
        .identifier()
        .ok_or(AppError::PermissionDenied("account holder session required"))
}

fn require_admin(session: &Session) -> AppResult<()> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied("admin capability required"))
    }
}

fn load_account<T: KeyValueStore + ?Sized>(
    accounts: &AccountRepository,
    store: &T,
    identifier: &str,
) -> AppResult<Account> {
    accounts
        .get(store, identifier)?
        .ok_or_else(|| DomainError::AccountNotFound(identifier.to_string()).into())
}

// Applies instructions in order and records one event per write. Accounts
// other than the actor can only be touched by the random-target item.
fn apply_instructions<T: KeyValueStore + ?Sized>(
    accounts: &AccountRepository,
    store: &mut T,
    actor: &str,
    reason: BalanceReason,
    instructions: &[BalanceInstruction],
    correlation_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Vec<LedgerEvent>> {
    let mut events = Vec::with_capacity(instructions.len());

    for instruction in instructions {
        let previous = load_account(accounts, &*store, &instruction.identifier)?
            .balance()
            .value();
        let updated = accounts.set_balance(&mut *store, &instruction.identifier, instruction.new_balance)?;

        events.push(LedgerEvent::BalanceChanged {
            identifier: instruction.identifier.clone(),
            previous,
            current: updated.balance().value(),
            reason: if instruction.identifier == actor {
                reason
            } else {
                BalanceReason::RandomTarget
            },
            correlation_id: Some(correlation_id),
            changed_at: now,
        });
    }

    Ok(events)
}
