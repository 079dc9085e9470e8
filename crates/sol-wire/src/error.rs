use thiserror::Error;

/// Errors produced while building, encoding or decoding Solana wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid blockhash: {0}")]
    InvalidBlockhash(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A seed is longer than 32 bytes, or more than 16 seeds were given.
    #[error("seed is too long for address derivation")]
    MaxSeedLengthExceeded,

    /// The derived address lands on the ed25519 curve. Retry with another bump.
    #[error("provided seeds do not result in a valid program address")]
    InvalidSeeds,

    /// Every bump from 255 down to 1 produced an on-curve address.
    #[error("unable to find a viable program address bump seed")]
    NoViableBump,

    #[error("invalid message header: {0}")]
    InvalidHeader(String),

    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("unknown cluster: {0}")]
    UnknownCluster(String),
}

impl SolError {
    /// True when the caller may retry derivation with different seeds.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SolError::InvalidSeeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_public_key() {
        let err = SolError::InvalidPublicKey("expected 32 bytes, got 33".into());
        assert_eq!(
            err.to_string(),
            "invalid public key: expected 32 bytes, got 33"
        );
    }

    #[test]
    fn display_invalid_seeds() {
        assert_eq!(
            SolError::InvalidSeeds.to_string(),
            "provided seeds do not result in a valid program address"
        );
    }

    #[test]
    fn display_no_viable_bump() {
        assert_eq!(
            SolError::NoViableBump.to_string(),
            "unable to find a viable program address bump seed"
        );
    }

    #[test]
    fn display_serialization_error() {
        let err = SolError::SerializationError("message header too short".into());
        assert_eq!(
            err.to_string(),
            "serialization error: message header too short"
        );
    }

    #[test]
    fn display_invalid_header() {
        let err = SolError::InvalidHeader("2 readonly signers > 1 signer".into());
        assert_eq!(
            err.to_string(),
            "invalid message header: 2 readonly signers > 1 signer"
        );
    }

    #[test]
    fn only_invalid_seeds_is_retryable() {
        assert!(SolError::InvalidSeeds.is_retryable());
        assert!(!SolError::NoViableBump.is_retryable());
        assert!(!SolError::MaxSeedLengthExceeded.is_retryable());
        assert!(!SolError::SerializationError("x".into()).is_retryable());
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(SolError::SigningError("unknown signer".into()));
        assert!(err.to_string().contains("unknown signer"));
    }

    #[test]
    fn debug_format_works() {
        let err = SolError::MaxSeedLengthExceeded;
        let debug = format!("{:?}", err);
        assert!(debug.contains("MaxSeedLengthExceeded"));
    }
}
