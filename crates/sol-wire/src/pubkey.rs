//! 32-byte account addresses.
//!
//! A Solana address is the raw 32 bytes of an ed25519 public key (or of a
//! program derived address, which is deliberately *not* a valid key). Its
//! text form is the Base58 encoding of those bytes with the Bitcoin
//! alphabet, which is what the `bs58` crate uses by default.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::curve;
use crate::error::SolError;
use crate::pda;

/// An account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Length of the canonical byte form.
    pub const LENGTH: usize = 32;

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build a key from up to 32 big-endian bytes.
    ///
    /// Shorter input is right-aligned, so `[3]` and
    /// `[0, .., 0, 3]` are the same key. More than 32 bytes is an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        if bytes.len() > Self::LENGTH {
            return Err(SolError::InvalidPublicKey(format!(
                "expected at most {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }

        let mut key = [0u8; 32];
        key[Self::LENGTH - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Decode a Base58 address. It must decode to exactly 32 bytes.
    pub fn from_base58(address: &str) -> Result<Self, SolError> {
        let bytes = bs58::decode(address)
            .into_vec()
            .map_err(|e| SolError::InvalidPublicKey(format!("base58 decode failed: {e}")))?;

        let key: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            SolError::InvalidPublicKey(format!("expected 32 bytes, got {}", v.len()))
        })?;

        Ok(Self(key))
    }

    /// The key whose last byte is `value` and all other bytes are zero.
    pub const fn from_small_integer(value: u8) -> Self {
        let mut key = [0u8; 32];
        key[31] = value;
        Self(key)
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Whether these bytes decode to an ed25519 point.
    pub fn is_on_curve(&self) -> bool {
        curve::is_on_curve(&self.0)
    }

    /// See [`pda::create_with_seed`].
    pub fn create_with_seed(
        base: &PublicKey,
        seed: &str,
        owner: &PublicKey,
    ) -> Result<PublicKey, SolError> {
        pda::create_with_seed(base, seed, owner)
    }

    /// See [`pda::create_program_address`].
    pub fn create_program_address(
        seeds: &[&[u8]],
        program_id: &PublicKey,
    ) -> Result<PublicKey, SolError> {
        pda::create_program_address(seeds, program_id)
    }

    /// See [`pda::find_program_address`].
    pub fn find_program_address(
        seeds: &[&[u8]],
        program_id: &PublicKey,
    ) -> Result<(PublicKey, u8), SolError> {
        pda::find_program_address(seeds, program_id)
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<PublicKey> for [u8; 32] {
    fn from(key: PublicKey) -> Self {
        key.0
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = SolError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl FromStr for PublicKey {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl TryFrom<&str> for PublicKey {
    type Error = SolError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::from_base58(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base58())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- construction -------------------------------------------------------

    #[test]
    fn small_integer_is_right_aligned() {
        let key = PublicKey::from_small_integer(1);
        assert_eq!(key.to_string(), "11111111111111111111111111111112");

        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(key.to_bytes(), expected);
    }

    #[test]
    fn zero_is_the_default_key() {
        let key = PublicKey::from_small_integer(0);
        assert_eq!(key, PublicKey::default());
        assert_eq!(key.to_bytes(), [0u8; 32]);
        assert_eq!(key.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn short_bytes_are_left_padded() {
        let one = PublicKey::from_bytes(&[1]).unwrap();
        let again = PublicKey::from_bytes(&one.to_bytes()).unwrap();
        assert_eq!(one, again);
        assert_eq!(one, PublicKey::from_small_integer(1));
    }

    #[test]
    fn empty_bytes_is_zero_key() {
        assert_eq!(PublicKey::from_bytes(&[]).unwrap(), PublicKey::default());
    }

    #[test]
    fn more_than_32_bytes_fails() {
        let mut bytes = vec![0u8; 33];
        bytes[0] = 3;
        let err = PublicKey::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, SolError::InvalidPublicKey(_)));
    }

    #[test]
    fn array_and_base58_forms_agree() {
        let mut bytes = [0u8; 32];
        bytes[0] = 3;
        let array_key = PublicKey::new(bytes);
        let base58_key: PublicKey = "CiDwVBFgWV9E5MvXWoLgnEgn2hK7rJikbvfWavzAQz3".parse().unwrap();
        assert_eq!(array_key, base58_key);
    }

    // -- base58 -------------------------------------------------------------

    #[test]
    fn base58_roundtrip() {
        for address in [
            "CiDwVBFgWV9E5MvXWoLgnEgn2hK7rJikbvfWavzAQz3",
            "1111111111111111111111111111BukQL",
            "11111111111111111111111111111111",
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
        ] {
            let key = PublicKey::from_base58(address).unwrap();
            assert_eq!(key.to_base58(), address);
            assert_eq!(key.to_string(), address);
        }
    }

    #[test]
    fn base58_to_bytes() {
        let key = PublicKey::from_base58("CiDwVBFgWV9E5MvXWoLgnEgn2hK7rJikbvfWavzAQz3").unwrap();
        let mut expected = [0u8; 32];
        expected[0] = 3;
        assert_eq!(key.to_bytes(), expected);
    }

    #[test]
    fn invalid_base58_inputs_fail() {
        for input in [
            "0x300000000000000000000000000000000000000000000000000000000000000000000",
            "0x300000000000000000000000000000000000000000000000000000000000000",
            "135693854574979916511997248057056142015550763280047535983739356259273198796800000",
            "12345",
            "1",
            "###invalid###",
        ] {
            assert!(
                PublicKey::from_base58(input).is_err(),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn random_bytes_roundtrip() {
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            let key = PublicKey::new(bytes);
            assert_eq!(PublicKey::from_bytes(&bytes).unwrap().to_bytes(), bytes);
            assert_eq!(PublicKey::from_base58(&key.to_base58()).unwrap(), key);
        }
    }

    // -- formatting & serde -------------------------------------------------

    #[test]
    fn debug_shows_base58() {
        let key = PublicKey::from_small_integer(1);
        assert_eq!(
            format!("{key:?}"),
            "PublicKey(11111111111111111111111111111112)"
        );
    }

    #[test]
    fn serde_uses_base58_string() {
        let key = PublicKey::from_small_integer(2);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"11111111111111111111111111111113\"");
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn serde_rejects_short_key() {
        let result: Result<PublicKey, _> = serde_json::from_str("\"12345\"");
        assert!(result.is_err());
    }

    #[test]
    fn is_on_curve_delegates() {
        let on = PublicKey::from_base58("4fwsi7ei2vDcUByZWXV3YmMEyLwBnLamiuDzUrEKADnm").unwrap();
        let off = PublicKey::from_base58("12rqwuEgBYiGhBrDJStCiqEtzQpTTiZbh7teNVLuYcFA").unwrap();
        assert!(on.is_on_curve());
        assert!(!off.is_on_curve());
    }
}
