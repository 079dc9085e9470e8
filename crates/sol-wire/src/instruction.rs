//! Uncompiled instructions and their data layouts.

use crate::error::SolError;
use crate::pubkey::PublicKey;

/// An account an instruction touches, with its permission bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountMeta {
    pub pubkey: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: PublicKey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: PublicKey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A program invocation with full account keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: PublicKey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program_id: PublicKey, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        Self {
            program_id,
            accounts,
            data,
        }
    }
}

/// Instruction data framed as a little-endian `u32` index followed by a
/// fixed-size parameter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionLayout {
    pub index: u32,
    pub params_len: usize,
}

impl InstructionLayout {
    pub const INDEX_LENGTH: usize = 4;

    pub const fn new(index: u32, params_len: usize) -> Self {
        Self { index, params_len }
    }

    pub const fn data_len(&self) -> usize {
        Self::INDEX_LENGTH + self.params_len
    }

    pub fn encode(&self, params: &[u8]) -> Result<Vec<u8>, SolError> {
        if params.len() != self.params_len {
            return Err(SolError::InvalidInstruction(format!(
                "expected {} parameter bytes, got {}",
                self.params_len,
                params.len()
            )));
        }

        let mut data = Vec::with_capacity(self.data_len());
        data.extend_from_slice(&self.index.to_le_bytes());
        data.extend_from_slice(params);
        Ok(data)
    }

    /// Check the framing of `raw` and return its parameter block.
    pub fn decode<'a>(&self, raw: &'a [u8]) -> Result<&'a [u8], SolError> {
        if raw.len() != self.data_len() {
            return Err(SolError::InvalidInstruction(format!(
                "expected {} data bytes, got {}",
                self.data_len(),
                raw.len()
            )));
        }

        let (index, params) = raw.split_at(Self::INDEX_LENGTH);
        let index = u32::from_le_bytes([index[0], index[1], index[2], index[3]]);
        if index != self.index {
            return Err(SolError::InvalidInstruction(format!(
                "instruction index mismatch {index} != {}",
                self.index
            )));
        }

        Ok(params)
    }
}

/// Fail unless `instruction` carries at least `expected` account keys.
pub fn validate_instruction_keys(instruction: &Instruction, expected: usize) -> Result<(), SolError> {
    if instruction.accounts.len() < expected {
        return Err(SolError::InvalidInstruction(format!(
            "found {} keys, expected at least {expected}",
            instruction.accounts.len()
        )));
    }
    Ok(())
}
