//! Program derived addresses and seeded keys.
//!
//! A program derived address (PDA) is
//! `SHA-256(seed_0 || ... || seed_n || program_id || "ProgramDerivedAddress")`
//! with the extra rule that the result must NOT be a valid ed25519 point, so
//! nobody holds a private key for it. Seed sets that hash onto the curve are
//! rejected; [`find_program_address`] appends a one-byte bump seed and walks it
//! down from 255 until the hash falls off the curve.
//!
//! Seeds are concatenated without separators, so `["abcdef"]`,
//! `["abc", "def"]` and `["ab", "cd", "ef"]` all derive the same address for a
//! given program id.

use log::{debug, trace};
use sha2::{Digest, Sha256};

use crate::curve;
use crate::error::SolError;
use crate::pubkey::PublicKey;

/// Maximum length of a single derivation seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds in one derivation, bump seed included.
pub const MAX_SEEDS: usize = 16;

/// Appended to every PDA preimage.
pub const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// Derive a program address from `seeds` and `program_id`.
///
/// Fails with [`SolError::InvalidSeeds`] if the hash lands on the curve; the
/// caller is expected to retry with a different bump. Fails with
/// [`SolError::MaxSeedLengthExceeded`] if any seed exceeds [`MAX_SEED_LEN`]
/// bytes or there are more than [`MAX_SEEDS`] seeds.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &PublicKey,
) -> Result<PublicKey, SolError> {
    if seeds.len() > MAX_SEEDS {
        return Err(SolError::MaxSeedLengthExceeded);
    }
    if seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(SolError::MaxSeedLengthExceeded);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if curve::is_on_curve(&hash) {
        return Err(SolError::InvalidSeeds);
    }

    Ok(PublicKey::new(hash))
}

/// Find the first bump seed, from 255 down to 1, that yields a valid program
/// address for `seeds` and `program_id`.
///
/// Returns the address together with the bump. The search order is fixed, so
/// the result is deterministic.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &PublicKey,
) -> Result<(PublicKey, u8), SolError> {
    for bump in (1u8..=255).rev() {
        let bump_seed = [bump];
        let mut seeds_with_bump = seeds.to_vec();
        seeds_with_bump.push(&bump_seed);

        match create_program_address(&seeds_with_bump, program_id) {
            Ok(address) => {
                debug!("derived program address {address} with bump {bump}");
                return Ok((address, bump));
            }
            Err(SolError::InvalidSeeds) => trace!("bump {bump} lands on curve"),
            Err(err) => return Err(err),
        }
    }

    Err(SolError::NoViableBump)
}

/// Derive a key from a base key, a text seed and an owner program:
/// `SHA-256(base || seed || owner)`.
///
/// Unlike a PDA the result may lie on the curve.
pub fn create_with_seed(
    base: &PublicKey,
    seed: &str,
    owner: &PublicKey,
) -> Result<PublicKey, SolError> {
    if seed.len() > MAX_SEED_LEN {
        return Err(SolError::MaxSeedLengthExceeded);
    }

    let mut hasher = Sha256::new();
    hasher.update(base);
    hasher.update(seed.as_bytes());
    hasher.update(owner);

    Ok(PublicKey::new(hasher.finalize().into()))
}
