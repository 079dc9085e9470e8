//! Solana wire-format client core.
//!
//! Addresses, program derived addresses, the legacy message and transaction
//! wire formats, and ed25519 signing, implemented by hand on top of
//! `ed25519-dalek`, `sha2` and `bs58` instead of `solana-sdk`.

pub mod blockhash;
pub mod cluster;
pub mod curve;
pub mod error;
pub mod instruction;
pub mod keypair;
pub mod message;
pub mod pda;
pub mod pubkey;
pub mod shortvec;
pub mod system_program;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use blockhash::Blockhash;
pub use cluster::{cluster_api_url, Cluster, ClusterConfig};
pub use error::SolError;
pub use instruction::{AccountMeta, Instruction, InstructionLayout};
pub use keypair::Keypair;
pub use message::{CompiledInstruction, Message, MessageHeader};
pub use pubkey::PublicKey;
pub use system_program::SYS_PROGRAM_ID;
pub use transaction::{NonceInformation, SigPubkeyPair, Signer, Transaction, PACKET_DATA_SIZE};
