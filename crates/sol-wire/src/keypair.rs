//! Ed25519 signing keys.
//!
//! A keypair is held as an `ed25519_dalek::SigningKey`, which wipes its
//! secret on drop. Intermediate seed copies are zeroized by hand.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;
use zeroize::Zeroize;

use crate::error::SolError;
use crate::pubkey::PublicKey;

/// Length of an ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Length of the seed-then-public-key secret key encoding.
pub const SECRET_KEY_LENGTH: usize = 64;

/// An account keypair used to sign transactions.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// A fresh keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Rebuild a keypair from its 64-byte secret key (seed followed by the
    /// public key). The public half must match the seed.
    pub fn from_secret_key(secret_key: &[u8]) -> Result<Self, SolError> {
        if secret_key.len() != SECRET_KEY_LENGTH {
            return Err(SolError::InvalidPrivateKey(format!(
                "expected {SECRET_KEY_LENGTH} bytes, got {}",
                secret_key.len()
            )));
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&secret_key[..32]);
        let keypair = Self::from_seed(&seed);
        seed.zeroize();

        if keypair.pubkey().as_ref() != &secret_key[32..] {
            return Err(SolError::InvalidPrivateKey(
                "public key does not match seed".into(),
            ));
        }

        Ok(keypair)
    }

    pub fn pubkey(&self) -> PublicKey {
        PublicKey::new(self.signing_key.verifying_key().to_bytes())
    }

    /// The 32-byte secret seed.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Seed followed by the public key.
    pub fn secret_key(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

/// Check an ed25519 signature over `message`. Keys that are not valid curve
/// points never verify.
pub fn verify_signature(
    pubkey: &PublicKey,
    message: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&pubkey.to_bytes()) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(signature);
    verifying_key.verify(message, &signature).is_ok()
}
