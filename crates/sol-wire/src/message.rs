//! Legacy message wire format.
//!
//! ```text
//! Message:
//!   num_required_sigs     u8
//!   num_readonly_signed   u8
//!   num_readonly_unsigned u8
//!   num_accounts          shortvec
//!   account_keys          32 bytes * num_accounts
//!   recent_blockhash      32 bytes
//!   num_instructions      shortvec
//!   instructions[]
//!
//! Instruction:
//!   program_id_index      u8
//!   num_accounts          shortvec
//!   account_indices       u8 * num_accounts
//!   data_len              shortvec
//!   data                  u8 * data_len
//! ```
//!
//! The key table is ordered writable signers, readonly signers, writable
//! non-signers, readonly non-signers. The header counts are therefore enough
//! to recover each account's signer and writable flags from its index.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::blockhash::Blockhash;
use crate::error::SolError;
use crate::pubkey::PublicKey;
use crate::shortvec;

/// Size of the fixed header at the start of every message.
pub const MESSAGE_HEADER_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHeader {
    /// The first `num_required_signatures` keys must sign.
    pub num_required_signatures: u8,
    /// How many of the signing keys are read-only.
    pub num_readonly_signed_accounts: u8,
    /// How many of the non-signing keys are read-only.
    pub num_readonly_unsigned_accounts: u8,
}

impl MessageHeader {
    pub const fn new(
        num_required_signatures: u8,
        num_readonly_signed_accounts: u8,
        num_readonly_unsigned_accounts: u8,
    ) -> Self {
        Self {
            num_required_signatures,
            num_readonly_signed_accounts,
            num_readonly_unsigned_accounts,
        }
    }

    /// Check the counts against a key table of `num_keys` entries.
    pub fn validate(&self, num_keys: usize) -> Result<(), SolError> {
        let required = self.num_required_signatures as usize;
        let readonly_signed = self.num_readonly_signed_accounts as usize;
        let readonly_unsigned = self.num_readonly_unsigned_accounts as usize;

        if readonly_signed > required {
            return Err(SolError::InvalidHeader(format!(
                "{readonly_signed} readonly signers exceeds {required} required signatures"
            )));
        }
        if required > num_keys {
            return Err(SolError::InvalidHeader(format!(
                "{required} required signatures exceeds {num_keys} account keys"
            )));
        }
        if readonly_unsigned > num_keys - required {
            return Err(SolError::InvalidHeader(format!(
                "{readonly_unsigned} readonly non-signers exceeds {} non-signing keys",
                num_keys - required
            )));
        }
        Ok(())
    }
}

/// An instruction whose accounts and program are indices into the key table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

impl CompiledInstruction {
    pub fn new(program_id_index: u8, accounts: Vec<u8>, data: Vec<u8>) -> Self {
        Self {
            program_id_index,
            accounts,
            data,
        }
    }

    fn serialize_into(&self, buf: &mut Vec<u8>) {
        buf.push(self.program_id_index);

        buf.extend_from_slice(&shortvec::encode_length(self.accounts.len()));
        buf.extend_from_slice(&self.accounts);

        buf.extend_from_slice(&shortvec::encode_length(self.data.len()));
        buf.extend_from_slice(&self.data);
    }
}

/// The signed part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: MessageHeader,
    account_keys: Vec<PublicKey>,
    recent_blockhash: Blockhash,
    instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Assemble a message, rejecting headers that do not fit the key table.
    pub fn new(
        header: MessageHeader,
        account_keys: Vec<PublicKey>,
        recent_blockhash: Blockhash,
        instructions: Vec<CompiledInstruction>,
    ) -> Result<Self, SolError> {
        header.validate(account_keys.len())?;
        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn account_keys(&self) -> &[PublicKey] {
        &self.account_keys
    }

    pub fn recent_blockhash(&self) -> &Blockhash {
        &self.recent_blockhash
    }

    pub fn instructions(&self) -> &[CompiledInstruction] {
        &self.instructions
    }

    /// Whether the key at `index` may be written by this message.
    ///
    /// Derived from the header alone; an index past the key table is
    /// reported as read-only rather than checked.
    pub fn is_account_writable(&self, index: usize) -> bool {
        let required = self.header.num_required_signatures as usize;
        let readonly_signed = self.header.num_readonly_signed_accounts as usize;
        let readonly_unsigned = self.header.num_readonly_unsigned_accounts as usize;

        index < required.saturating_sub(readonly_signed)
            || (index >= required
                && index < self.account_keys.len().saturating_sub(readonly_unsigned))
    }

    /// Whether the key at `index` must sign.
    pub fn is_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    /// The keys whose signatures this message requires, in order.
    pub fn signer_keys(&self) -> &[PublicKey] {
        let required = (self.header.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..required]
    }

    /// Encode to wire bytes. These are the bytes that get signed.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            MESSAGE_HEADER_LENGTH + 1 + self.account_keys.len() * PublicKey::LENGTH + 64,
        );

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        buf.extend_from_slice(&shortvec::encode_length(self.account_keys.len()));
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_ref());
        }

        buf.extend_from_slice(self.recent_blockhash.as_ref());

        buf.extend_from_slice(&shortvec::encode_length(self.instructions.len()));
        for ix in &self.instructions {
            ix.serialize_into(&mut buf);
        }

        buf
    }

    /// Decode wire bytes produced by [`Message::serialize`].
    ///
    /// Every length prefix is checked against the bytes that remain and the
    /// whole input must be consumed: trailing bytes after the last
    /// instruction are an error rather than ignored, so a padded
    /// transaction buffer does not decode either.
    pub fn deserialize(raw: &[u8]) -> Result<Self, SolError> {
        if raw.len() < MESSAGE_HEADER_LENGTH {
            return Err(SolError::SerializationError(
                "message header too short".into(),
            ));
        }

        let mut reader = WireReader::new(raw);
        let header = MessageHeader::new(
            reader.read_byte()?,
            reader.read_byte()?,
            reader.read_byte()?,
        );

        let num_keys = reader.read_length()?;
        let key_bytes = reader.read_array(num_keys, PublicKey::LENGTH)?;
        let account_keys = key_bytes
            .chunks_exact(PublicKey::LENGTH)
            .map(PublicKey::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        trace!("message header {header:?}, {num_keys} account keys");

        let recent_blockhash = reader.read_blockhash()?;

        let num_instructions = reader.read_length()?;
        // Each instruction is at least three bytes, which bounds the allocation.
        let mut instructions = Vec::with_capacity(num_instructions.min(reader.remaining() / 3));
        for i in 0..num_instructions {
            let program_id_index = reader.read_byte()?;
            let num_accounts = reader.read_length()?;
            let accounts = reader.read_bytes(num_accounts)?.to_vec();
            let data_len = reader.read_length()?;
            let data = reader.read_bytes(data_len)?.to_vec();
            trace!(
                "instruction {i}: program index {program_id_index}, {num_accounts} accounts, {data_len} data bytes"
            );
            instructions.push(CompiledInstruction {
                program_id_index,
                accounts,
                data,
            });
        }

        if reader.remaining() != 0 {
            return Err(SolError::SerializationError(format!(
                "{} trailing bytes after message",
                reader.remaining()
            )));
        }

        Message::new(header, account_keys, recent_blockhash, instructions)
    }
}

/// Bounds-checked cursor over wire bytes.
pub(crate) struct WireReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }

    pub(crate) fn read_byte(&mut self) -> Result<u8, SolError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SolError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                SolError::SerializationError(format!(
                    "truncated: need {len} bytes at offset {}, {} remain",
                    self.offset,
                    self.remaining()
                ))
            })?;
        let out = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(out)
    }

    /// `count` fixed-size items laid out back to back.
    pub(crate) fn read_array(&mut self, count: usize, item_len: usize) -> Result<&'a [u8], SolError> {
        let len = count.checked_mul(item_len).ok_or_else(|| {
            SolError::SerializationError(format!("length prefix {count} overflows"))
        })?;
        self.read_bytes(len)
    }

    /// A shortvec length prefix. A prefix cut off mid-encoding is an error.
    pub(crate) fn read_length(&mut self) -> Result<usize, SolError> {
        let (value, size) = shortvec::decode_length(self.rest());
        if size == 0 {
            return Err(SolError::SerializationError(format!(
                "truncated: missing length prefix at offset {}",
                self.offset
            )));
        }
        if self.bytes[self.offset + size - 1] & 0x80 != 0 {
            return Err(SolError::SerializationError(format!(
                "malformed length prefix at offset {}",
                self.offset
            )));
        }
        self.offset += size;
        Ok(value)
    }

    fn read_blockhash(&mut self) -> Result<Blockhash, SolError> {
        let bytes = self.read_bytes(Blockhash::LENGTH)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(bytes);
        Ok(Blockhash::new(hash))
    }
}
