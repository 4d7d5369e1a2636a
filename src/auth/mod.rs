//! Credential verification
//!
//! Signup stores `seal(secret)`; login accepts a secret when
//! `verify(secret, stored)` holds. The ledger never compares secrets itself.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::config::CredentialScheme;

pub trait CredentialVerifier {
    /// Value to persist for a freshly chosen secret
    fn seal(&self, secret: &str) -> String;

    /// Whether `secret` matches a previously sealed value
    fn verify(&self, secret: &str, stored: &str) -> bool;
}

impl<V: CredentialVerifier + ?Sized> CredentialVerifier for Box<V> {
    fn seal(&self, secret: &str) -> String {
        (**self).seal(secret)
    }

    fn verify(&self, secret: &str, stored: &str) -> bool {
        (**self).verify(secret, stored)
    }
}

/// Stores and compares secrets verbatim. Matches records written by the
/// original program.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn seal(&self, secret: &str) -> String {
        secret.to_string()
    }

    fn verify(&self, secret: &str, stored: &str) -> bool {
        secret == stored
    }
}

const SALT_LEN: usize = 16;

/// Salted SHA-256, stored as `salt$digest` in lowercase hex
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Verifier;

impl Sha256Verifier {
    fn digest(salt: &[u8], secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl CredentialVerifier for Sha256Verifier {
    fn seal(&self, secret: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        format!("{}${}", hex::encode(salt), Self::digest(&salt, secret))
    }

    fn verify(&self, secret: &str, stored: &str) -> bool {
        let Some((salt_hex, digest)) = stored.split_once('$') else {
            return false;
        };
        match hex::decode(salt_hex) {
            Ok(salt) => Self::digest(&salt, secret) == digest,
            Err(_) => false,
        }
    }
}

/// Verifier for a configured scheme
pub fn verifier_for(scheme: CredentialScheme) -> Box<dyn CredentialVerifier> {
    match scheme {
        CredentialScheme::Plaintext => Box::new(PlaintextVerifier),
        CredentialScheme::Sha256 => Box::new(Sha256Verifier),
    }
}
