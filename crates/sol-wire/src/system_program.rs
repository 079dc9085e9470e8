//! System Program instructions: transfer and nonce advance.

use crate::error::SolError;
use crate::instruction::{validate_instruction_keys, AccountMeta, Instruction, InstructionLayout};
use crate::pubkey::PublicKey;

/// The System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYS_PROGRAM_ID: PublicKey = PublicKey::new([0u8; 32]);

/// `Transfer` is instruction 2, with a little-endian `u64` lamport amount.
pub const TRANSFER_LAYOUT: InstructionLayout = InstructionLayout::new(2, 8);

/// `AdvanceNonceAccount` is instruction 4 and takes no parameters.
pub const ADVANCE_NONCE_LAYOUT: InstructionLayout = InstructionLayout::new(4, 0);

/// `SysvarRecentB1ockHashes11111111111111111111`
pub const SYSVAR_RECENT_BLOCKHASHES: PublicKey = PublicKey::new([
    6, 167, 213, 23, 25, 44, 86, 142, 224, 138, 132, 95, 115, 210, 151, 136, 207, 3, 92, 49, 69,
    178, 26, 179, 68, 216, 6, 46, 169, 64, 0, 0,
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferParams {
    pub from_pubkey: PublicKey,
    pub to_pubkey: PublicKey,
    pub lamports: u64,
}

/// Build a `Transfer` moving `lamports` from `from` (signer) to `to`.
pub fn transfer(from: PublicKey, to: PublicKey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(TRANSFER_LAYOUT.data_len());
    data.extend_from_slice(&TRANSFER_LAYOUT.index.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction::new(
        SYS_PROGRAM_ID,
        vec![AccountMeta::new(from, true), AccountMeta::new(to, false)],
        data,
    )
}

/// Build an `AdvanceNonceAccount` for a durable-nonce transaction.
/// `authority` must sign.
pub fn advance_nonce_account(nonce_pubkey: PublicKey, authority: PublicKey) -> Instruction {
    Instruction::new(
        SYS_PROGRAM_ID,
        vec![
            AccountMeta::new(nonce_pubkey, false),
            AccountMeta::new_readonly(SYSVAR_RECENT_BLOCKHASHES, false),
            AccountMeta::new(authority, true),
        ],
        ADVANCE_NONCE_LAYOUT.index.to_le_bytes().to_vec(),
    )
}

/// Recover the parameters of a `Transfer` instruction.
pub fn decode_transfer(instruction: &Instruction) -> Result<TransferParams, SolError> {
    if instruction.program_id != SYS_PROGRAM_ID {
        return Err(SolError::InvalidInstruction(format!(
            "invalid instruction; program id {} is not the system program",
            instruction.program_id
        )));
    }
    validate_instruction_keys(instruction, 2)?;

    let params = TRANSFER_LAYOUT.decode(&instruction.data)?;
    let mut lamports = [0u8; 8];
    lamports.copy_from_slice(params);

    Ok(TransferParams {
        from_pubkey: instruction.accounts[0].pubkey,
        to_pubkey: instruction.accounts[1].pubkey,
        lamports: u64::from_le_bytes(lamports),
    })
}
