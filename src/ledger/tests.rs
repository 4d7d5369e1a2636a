//! Ledger service tests
//!
//! Drive the full service over a `MemoryStore` with scripted randomness and
//! a hand-driven clock.

use chrono::{Duration, TimeZone, Utc};

use crate::auth::Sha256Verifier;
use crate::clock::ManualClock;
use crate::domain::{BalanceReason, Capability, DomainError, LedgerEvent, Session};
use crate::error::AppError;
use crate::model::CodeStatus;
use crate::rewards::{Draw, ScriptedRandom};
use crate::store::{KeyValueStore, MemoryStore, Namespaces};

use super::{AdminCredentials, LedgerService, SignupCommand};

const ADMIN_ID: &str = "admin@bandtest.com";
const ADMIN_SECRET: &str = "admin123";

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 4, 2, 10, 0, 0).unwrap())
}

fn ledger(random: ScriptedRandom) -> LedgerService<MemoryStore> {
    LedgerService::new(
        MemoryStore::new(),
        Namespaces::new("test"),
        AdminCredentials::new(ADMIN_ID, ADMIN_SECRET),
    )
    .unwrap()
    .with_random(random)
    .with_clock(clock())
}

fn signup(ledger: &mut LedgerService<MemoryStore>, name: &str, id: &str) -> Session {
    ledger
        .signup(SignupCommand::new(name, id, "secret1"))
        .unwrap()
        .session
}

fn validation_fields(err: AppError) -> Vec<&'static str> {
    match err {
        AppError::Domain(DomainError::Validation(errors)) => errors.fields().map(|f| f.field).collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

// =========================================================================
// signup / login
// =========================================================================

#[test]
fn test_signup_creates_account_and_session() {
    let mut ledger = ledger(ScriptedRandom::losing());

    let result = ledger
        .signup(SignupCommand::new("  ann  ", "ann@example.com", "secret1"))
        .unwrap();

    assert_eq!(result.account.display_name(), "ann");
    assert_eq!(result.account.balance().value(), 10);
    assert_eq!(result.session.identifier(), Some("ann@example.com"));
    assert!(result.session.correlation_id.is_some());
}

#[test]
fn test_signup_collects_every_field_error() {
    let mut ledger = ledger(ScriptedRandom::losing());

    let err = ledger
        .signup(SignupCommand::new(" ", "not-an-email", "abc").with_confirmation("abd"))
        .unwrap_err();

    assert_eq!(
        validation_fields(err),
        vec!["display_name", "identifier", "secret", "confirm_secret"]
    );
    assert!(ledger.scoreboard_snapshot().unwrap().is_empty());
}

#[test]
fn test_signup_rejects_taken_name_and_identifier() {
    let mut ledger = ledger(ScriptedRandom::losing());
    signup(&mut ledger, "ann", "ann@example.com");

    let err = ledger
        .signup(SignupCommand::new("ann", "ann@example.com", "secret1"))
        .unwrap_err();
    assert_eq!(validation_fields(err), vec!["display_name", "identifier"]);

    // Name check is case-sensitive
    ledger
        .signup(SignupCommand::new("Ann", "ann2@example.com", "secret1"))
        .unwrap();
}

#[test]
fn test_login() {
    let mut ledger = ledger(ScriptedRandom::losing());
    signup(&mut ledger, "ann", "ann@example.com");

    let session = ledger.login("ann@example.com", "secret1").unwrap();
    assert_eq!(session.identifier(), Some("ann@example.com"));

    let err = ledger.login("ann@example.com", "Secret1").unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::InvalidCredentials)));

    let err = ledger.login("nobody@example.com", "secret1").unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::InvalidCredentials)));
}

#[test]
fn test_admin_login_bypasses_accounts() {
    let ledger = ledger(ScriptedRandom::losing());

    let session = ledger.login(ADMIN_ID, ADMIN_SECRET).unwrap();

    assert!(session.is_admin());
    assert!(ledger.get_account(ADMIN_ID).is_err());
}

#[test]
fn test_hashed_credentials() {
    let mut ledger = ledger(ScriptedRandom::losing()).with_verifier(Sha256Verifier);
    signup(&mut ledger, "ann", "ann@example.com");

    let stored = ledger.get_account("ann@example.com").unwrap();
    assert_ne!(stored.secret(), "secret1");

    assert!(ledger.login("ann@example.com", "secret1").is_ok());
    assert!(ledger.login("ann@example.com", "secret2").is_err());
}

// =========================================================================
// session persistence
// =========================================================================

#[test]
fn test_persist_and_restore_session() {
    let mut ledger = ledger(ScriptedRandom::losing());
    let session = signup(&mut ledger, "ann", "ann@example.com");

    ledger.persist_session(&session).unwrap();
    let restored = ledger.restore_session().unwrap();
    assert_eq!(
        restored.capability,
        Capability::AccountHolder {
            identifier: "ann@example.com".into()
        }
    );

    ledger.persist_session(&Session::admin()).unwrap();
    assert!(ledger.restore_session().unwrap().is_admin());

    ledger.logout(&Session::admin()).unwrap();
    assert_eq!(ledger.restore_session().unwrap().capability, Capability::Anonymous);
}

#[test]
fn test_restore_ignores_missing_account() {
    let mut ledger = ledger(ScriptedRandom::losing());
    ledger
        .persist_session(&Session::account_holder("ghost@example.com"))
        .unwrap();

    assert_eq!(ledger.restore_session().unwrap().capability, Capability::Anonymous);
}

#[test]
fn test_session_wire_values() {
    let mut ledger = ledger(ScriptedRandom::losing());
    ledger.persist_session(&Session::admin()).unwrap();

    let ns = ledger.namespaces().clone();
    assert_eq!(
        ledger.store().get(&ns.admin).unwrap(),
        Some(serde_json::Value::String("true".into()))
    );
    assert!(ledger.store().get(&ns.current_user).unwrap().is_none());
}

// =========================================================================
// capability checks
// =========================================================================

#[test]
fn test_capability_checks() {
    let mut ledger = ledger(ScriptedRandom::losing());
    let ann = signup(&mut ledger, "ann", "ann@example.com");

    let err = ledger.mint_code(&ann, 50).unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
    assert!(matches!(ledger.list_codes(&ann), Err(AppError::PermissionDenied(_))));

    let anon = Session::anonymous();
    assert!(matches!(ledger.purchase(&anon, 1), Err(AppError::PermissionDenied(_))));
    assert!(matches!(ledger.spin_roulette(&Session::admin()), Err(AppError::PermissionDenied(_))));
    assert!(matches!(
        ledger.redeem_code(&anon, "AAAAAA"),
        Err(AppError::PermissionDenied(_))
    ));
}

// =========================================================================
// purchase / spin
// =========================================================================

#[test]
fn test_item1_forced_outcomes() {
    let mut ledger = ledger(ScriptedRandom::new([Draw::Coin(true), Draw::Coin(false)]));
    let ann = signup(&mut ledger, "ann", "ann@example.com");

    let win = ledger.purchase(&ann, 1).unwrap();
    assert_eq!(win.account.balance().value(), 10);

    let loss = ledger.purchase(&ann, 1).unwrap();
    assert_eq!(loss.account.balance().value(), 5);
}

#[test]
fn test_loss_clamps_at_zero() {
    let mut ledger = ledger(ScriptedRandom::losing());
    let ann = signup(&mut ledger, "ann", "ann@example.com");

    let result = ledger.purchase(&ann, 2).unwrap();

    // 10 - 5 - 6
    assert_eq!(result.account.balance().value(), 0);
}

#[test]
fn test_insufficient_funds_changes_nothing() {
    let mut ledger = ledger(ScriptedRandom::winning());
    let ann = signup(&mut ledger, "ann", "ann@example.com");
    let events = ledger.subscribe();

    let err = ledger.purchase(&ann, 3).unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::InsufficientFunds {
            required: 20,
            available: 10
        })
    ));
    assert_eq!(ledger.get_account("ann@example.com").unwrap().balance().value(), 10);
    assert!(events.try_recv().is_err());
}

#[test]
fn test_unknown_item() {
    let mut ledger = ledger(ScriptedRandom::losing());
    let ann = signup(&mut ledger, "ann", "ann@example.com");

    let err = ledger.purchase(&ann, 9).unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::UnknownItem(9))));
}

#[test]
fn test_item3_single_account_doubles_post_bet_balance() {
    let mut ledger = ledger(ScriptedRandom::new([Draw::Coin(true)]));
    let ann = signup(&mut ledger, "ann", "ann@example.com");

    // The mint's picks fall back to 0 while a coin is queued
    let code = ledger.mint_code(&Session::admin(), 20).unwrap().code;
    assert_eq!(code, "AAAAAA");
    ledger.redeem_code(&ann, &code).unwrap();
    let events = ledger.subscribe();

    let result = ledger.purchase(&ann, 3).unwrap();

    assert!(result.outcome.won);
    assert_eq!(result.outcome.target.as_deref(), Some("ann@example.com"));
    assert_eq!(result.account.balance().value(), 20);

    let moves: Vec<(u64, u64, BalanceReason)> = events
        .try_iter()
        .filter_map(|e| match e {
            LedgerEvent::BalanceChanged {
                previous,
                current,
                reason,
                ..
            } => Some((previous, current, reason)),
            _ => None,
        })
        .collect();
    assert_eq!(
        moves,
        vec![
            (30, 10, BalanceReason::Purchase),
            (10, 20, BalanceReason::Purchase),
        ]
    );
}

#[test]
fn test_item3_random_target_event() {
    let mut ledger = ledger(ScriptedRandom::new([
        Draw::Coin(true),
        Draw::Pick(1),
        Draw::Coin(true),
    ]));
    let ann = signup(&mut ledger, "ann", "ann@example.com");
    signup(&mut ledger, "bob", "bob@example.com");
    ledger.purchase(&ann, 4).unwrap();
    let events = ledger.subscribe();

    let result = ledger.purchase(&ann, 3).unwrap();

    assert_eq!(result.account.balance().value(), 0);
    let bob = result.target.unwrap();
    assert_eq!(bob.identifier(), "bob@example.com");
    assert_eq!(bob.balance().value(), 20);

    let last = events.try_iter().last().unwrap();
    assert!(matches!(
        last,
        LedgerEvent::BalanceChanged {
            reason: BalanceReason::RandomTarget,
            previous: 10,
            current: 20,
            ..
        }
    ));
}

#[test]
fn test_spin_jackpot_and_miss() {
    let mut ledger = ledger(ScriptedRandom::new([
        Draw::Pick(4),
        Draw::Pick(4),
        Draw::Pick(4),
        Draw::Pick(0),
        Draw::Pick(1),
        Draw::Pick(2),
    ]));
    let ann = signup(&mut ledger, "ann", "ann@example.com");

    let hit = ledger.spin_roulette(&ann).unwrap();
    assert!(hit.jackpot);
    assert_eq!(hit.symbols, ['♞', '♞', '♞']);
    assert_eq!(hit.account.balance().value(), 105);

    let miss = ledger.spin_roulette(&ann).unwrap();
    assert!(!miss.jackpot);
    assert_eq!(miss.account.balance().value(), 100);
}

// =========================================================================
// codes
// =========================================================================

#[test]
fn test_mint_and_redeem() {
    let mut ledger = ledger(ScriptedRandom::losing());
    let ann = signup(&mut ledger, "ann", "ann@example.com");
    let admin = ledger.login(ADMIN_ID, ADMIN_SECRET).unwrap();
    let events = ledger.subscribe();

    let minted = ledger.mint_code(&admin, 50).unwrap();
    assert_eq!(minted.code.len(), 6);

    let redeemed = ledger.redeem_code(&ann, &minted.code.to_lowercase()).unwrap();
    assert_eq!(redeemed.grant, 50);
    assert_eq!(redeemed.balance, 60);

    let kinds: Vec<&'static str> = events.try_iter().map(|e| e.event_type()).collect();
    assert_eq!(kinds, vec!["CodeMinted", "BalanceChanged", "CodeRedeemed"]);

    let listing = ledger.list_codes(&admin).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].status, CodeStatus::Redeemed);
    assert_eq!(listing[0].code.redeemed_by.as_deref(), Some("ann@example.com"));
}

#[test]
fn test_second_redeem_fails_without_change() {
    let mut ledger = ledger(ScriptedRandom::losing());
    let ann = signup(&mut ledger, "ann", "ann@example.com");
    let admin = Session::admin();
    let code = ledger.mint_code(&admin, 5).unwrap().code;

    ledger.redeem_code(&ann, &code).unwrap();
    let err = ledger.redeem_code(&ann, &code).unwrap_err();

    assert!(matches!(err, AppError::Domain(DomainError::CodeAlreadyUsed(_))));
    assert_eq!(ledger.get_account("ann@example.com").unwrap().balance().value(), 15);
}

#[test]
fn test_code_expiry_boundary() {
    let clock = clock();
    let mut ledger = ledger(ScriptedRandom::losing()).with_clock(clock.clone());
    let ann = signup(&mut ledger, "ann", "ann@example.com");
    let minted = ledger.mint_code(&Session::admin(), 5).unwrap();

    clock.set(minted.expires_at);
    let err = ledger.redeem_code(&ann, &minted.code).unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::CodeExpired(_))));
    assert_eq!(
        ledger.list_codes(&Session::admin()).unwrap()[0].status,
        CodeStatus::Expired
    );

    clock.advance(-Duration::milliseconds(1));
    assert_eq!(ledger.redeem_code(&ann, &minted.code).unwrap().balance, 15);
}

#[test]
fn test_mint_rejects_bad_amount() {
    let mut ledger = ledger(ScriptedRandom::losing());

    let err = ledger.mint_code(&Session::admin(), 0).unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::InvalidAmount(_))));

    let err = ledger.mint_code(&Session::admin(), 1_000_000_001).unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::InvalidAmount(_))));
}

#[test]
fn test_redeem_into_deleted_session_account() {
    let mut ledger = ledger(ScriptedRandom::losing());
    let code = ledger.mint_code(&Session::admin(), 5).unwrap().code;

    let err = ledger
        .redeem_code(&Session::account_holder("ghost@example.com"), &code)
        .unwrap_err();

    assert!(matches!(err, AppError::Domain(DomainError::AccountNotFound(_))));
    assert_eq!(
        ledger.list_codes(&Session::admin()).unwrap()[0].status,
        CodeStatus::Active
    );
}

// =========================================================================
// scoreboard
// =========================================================================

#[test]
fn test_scoreboard_reflects_latest_state() {
    let mut ledger = ledger(ScriptedRandom::winning());
    signup(&mut ledger, "ann", "ann@example.com");
    let bob = signup(&mut ledger, "bob", "bob@example.com");

    ledger.purchase(&bob, 4).unwrap();

    let top = ledger.scoreboard_top(10).unwrap();
    assert_eq!(top[0].display_name, "bob");
    assert_eq!(top[0].balance, 20);
    assert_eq!(ledger.rank_of("ann@example.com").unwrap(), Some(2));
}
