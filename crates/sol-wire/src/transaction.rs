//! Transactions: instructions, a fee payer, a blockhash and signatures.
//!
//! ```text
//! Transaction:
//!   num_signatures          shortvec
//!   signatures              64 bytes * num_signatures
//!   message                 see `message`
//! ```
//!
//! Signature `i` belongs to account key `i` of the message, so the first
//! signature is always the fee payer's.

use std::borrow::Cow;

use log::{debug, trace};

use crate::blockhash::Blockhash;
use crate::error::SolError;
use crate::instruction::{AccountMeta, Instruction};
use crate::keypair::{verify_signature, Keypair, SIGNATURE_LENGTH};
use crate::message::{CompiledInstruction, Message, MessageHeader, WireReader};
use crate::pubkey::PublicKey;
use crate::shortvec;

/// Maximum over-the-wire size of a transaction: an IPv6 MTU minus headers.
pub const PACKET_DATA_SIZE: usize = 1280 - 40 - 8;

const EMPTY_SIGNATURE: [u8; SIGNATURE_LENGTH] = [0u8; SIGNATURE_LENGTH];

/// A signer slot. `signature` stays `None` until the key signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigPubkeyPair {
    pub pubkey: PublicKey,
    pub signature: Option<[u8; SIGNATURE_LENGTH]>,
}

impl SigPubkeyPair {
    pub fn new(pubkey: PublicKey) -> Self {
        Self {
            pubkey,
            signature: None,
        }
    }
}

/// Who takes part in [`Transaction::sign_partial`]. Keypairs sign right away;
/// bare public keys reserve a slot for [`Transaction::add_signer`] or
/// [`Transaction::add_signature`] later.
#[derive(Debug, Clone, Copy)]
pub enum Signer<'a> {
    Keypair(&'a Keypair),
    PublicKey(PublicKey),
}

impl Signer<'_> {
    pub fn pubkey(&self) -> PublicKey {
        match self {
            Signer::Keypair(keypair) => keypair.pubkey(),
            Signer::PublicKey(pubkey) => *pubkey,
        }
    }
}

impl<'a> From<&'a Keypair> for Signer<'a> {
    fn from(keypair: &'a Keypair) -> Self {
        Signer::Keypair(keypair)
    }
}

impl From<PublicKey> for Signer<'_> {
    fn from(pubkey: PublicKey) -> Self {
        Signer::PublicKey(pubkey)
    }
}

/// A durable nonce used in place of a recent blockhash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceInformation {
    /// Blockhash currently stored in the nonce account.
    pub nonce: Blockhash,
    /// The `AdvanceNonceAccount` instruction consuming it.
    pub nonce_instruction: Instruction,
}

/// An atomic sequence of instructions.
///
/// Equality ignores `fee_payer`, which is not carried on the wire.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    /// Explicit fee payer. Falls back to the first signature's key.
    pub fee_payer: Option<PublicKey>,
    pub recent_blockhash: Option<Blockhash>,
    /// When set, compiled messages use the nonce as their blockhash and
    /// start with the nonce instruction.
    pub nonce_info: Option<NonceInformation>,
    pub instructions: Vec<Instruction>,
    pub signatures: Vec<SigPubkeyPair>,
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.recent_blockhash == other.recent_blockhash
            && self.nonce_info == other.nonce_info
            && self.signatures == other.signatures
            && self.instructions == other.instructions
    }
}

impl Eq for Transaction {}

impl Transaction {
    pub fn new(recent_blockhash: Option<Blockhash>, fee_payer: Option<PublicKey>) -> Self {
        Self {
            fee_payer,
            recent_blockhash,
            ..Self::default()
        }
    }

    pub fn add(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    pub fn add_all<I>(&mut self, instructions: I) -> &mut Self
    where
        I: IntoIterator<Item = Instruction>,
    {
        self.instructions.extend(instructions);
        self
    }

    /// The fee payer's signature, if present.
    pub fn signature(&self) -> Option<&[u8; SIGNATURE_LENGTH]> {
        self.signatures.first().and_then(|pair| pair.signature.as_ref())
    }

    /// Compile the instructions into a [`Message`].
    ///
    /// Accounts are merged per key (signer and writable flags are OR-ed),
    /// the fee payer goes first, and the rest are sorted by lowercase Base58
    /// then grouped as writable signers, readonly signers, writable
    /// non-signers and readonly non-signers.
    ///
    /// With [`NonceInformation`] set, the nonce replaces the recent
    /// blockhash and the nonce instruction is put first unless it already
    /// is.
    pub fn compile_message(&self) -> Result<Message, SolError> {
        self.compile_with(self.signatures.first().map(|pair| pair.pubkey))
    }

    fn compile_with(&self, fee_payer_hint: Option<PublicKey>) -> Result<Message, SolError> {
        let (recent_blockhash, instructions): (Blockhash, Cow<'_, [Instruction]>) =
            match &self.nonce_info {
                Some(nonce_info) => {
                    let mut instructions = Vec::with_capacity(self.instructions.len() + 1);
                    if self.instructions.first() != Some(&nonce_info.nonce_instruction) {
                        instructions.push(nonce_info.nonce_instruction.clone());
                    }
                    instructions.extend(self.instructions.iter().cloned());
                    (nonce_info.nonce, Cow::Owned(instructions))
                }
                None => {
                    let recent_blockhash = self.recent_blockhash.ok_or_else(|| {
                        SolError::TransactionBuildError(
                            "transaction recent blockhash required".into(),
                        )
                    })?;
                    (recent_blockhash, Cow::Borrowed(self.instructions.as_slice()))
                }
            };

        if instructions.is_empty() {
            return Err(SolError::TransactionBuildError(
                "no instructions provided".into(),
            ));
        }

        let fee_payer = self
            .fee_payer
            .or(fee_payer_hint)
            .ok_or_else(|| {
                SolError::TransactionBuildError("transaction fee payer required".into())
            })?;

        let mut metas: Vec<AccountMeta> = Vec::new();
        let mut upsert = |meta: AccountMeta| {
            if let Some(entry) = metas.iter_mut().find(|m| m.pubkey == meta.pubkey) {
                entry.is_signer |= meta.is_signer;
                entry.is_writable |= meta.is_writable;
            } else {
                metas.push(meta);
            }
        };

        for ix in instructions.iter() {
            for meta in &ix.accounts {
                upsert(*meta);
            }
            upsert(AccountMeta::new_readonly(ix.program_id, false));
        }

        metas.retain(|m| m.pubkey != fee_payer);
        metas.sort_by_cached_key(|m| m.pubkey.to_base58().to_lowercase());

        let mut ordered = Vec::with_capacity(metas.len() + 1);
        ordered.push(AccountMeta::new(fee_payer, true));
        ordered.extend(metas.iter().filter(|m| m.is_signer && m.is_writable));
        ordered.extend(metas.iter().filter(|m| m.is_signer && !m.is_writable));
        ordered.extend(metas.iter().filter(|m| !m.is_signer && m.is_writable));
        ordered.extend(metas.iter().filter(|m| !m.is_signer && !m.is_writable));

        if ordered.len() > u8::MAX as usize + 1 {
            return Err(SolError::TransactionBuildError(format!(
                "{} account keys cannot be indexed by a byte",
                ordered.len()
            )));
        }

        let header = MessageHeader::new(
            count_u8(ordered.iter().filter(|m| m.is_signer))?,
            count_u8(ordered.iter().filter(|m| m.is_signer && !m.is_writable))?,
            count_u8(ordered.iter().filter(|m| !m.is_signer && !m.is_writable))?,
        );

        let account_keys: Vec<PublicKey> = ordered.iter().map(|m| m.pubkey).collect();
        let index_of = |key: &PublicKey| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .and_then(|i| u8::try_from(i).ok())
                .ok_or_else(|| {
                    SolError::TransactionBuildError(format!("account {key} not in account keys"))
                })
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions.iter() {
            let accounts = ix
                .accounts
                .iter()
                .map(|meta| index_of(&meta.pubkey))
                .collect::<Result<Vec<_>, _>>()?;
            compiled.push(CompiledInstruction::new(
                index_of(&ix.program_id)?,
                accounts,
                ix.data.clone(),
            ));
        }

        debug!(
            "compiled message: {} keys, {} required signatures, {} instructions",
            account_keys.len(),
            header.num_required_signatures,
            compiled.len()
        );

        Message::new(header, account_keys, recent_blockhash, compiled)
    }

    /// The bytes every signature covers.
    pub fn serialize_message(&self) -> Result<Vec<u8>, SolError> {
        Ok(self.compile_message()?.serialize())
    }

    /// Sign with every required key.
    pub fn sign(&mut self, signers: &[&Keypair]) -> Result<(), SolError> {
        let signers: Vec<Signer<'_>> = signers.iter().map(|keypair| Signer::Keypair(*keypair)).collect();
        self.sign_partial(&signers)
    }

    /// Replace the signer set with `signers` and sign with the keypairs
    /// among them.
    ///
    /// Signature slots end up in key-table order. Required signers missing
    /// from `signers` get an empty slot. On error the existing signatures
    /// are left as they were.
    pub fn sign_partial(&mut self, signers: &[Signer<'_>]) -> Result<(), SolError> {
        let message = self.compile_with(signers.first().map(Signer::pubkey))?;

        let slots: Vec<SigPubkeyPair> = signers
            .iter()
            .map(|signer| SigPubkeyPair::new(signer.pubkey()))
            .collect();
        let mut slots = arrange_signatures(slots, &message);

        let sign_data = message.serialize();
        for signer in signers {
            if let Signer::Keypair(keypair) = signer {
                let pubkey = keypair.pubkey();
                if let Some(slot) = slots.iter_mut().find(|pair| pair.pubkey == pubkey) {
                    slot.signature = Some(keypair.sign(&sign_data));
                }
            }
        }

        self.signatures = slots;
        Ok(())
    }

    /// Attach an externally produced signature to an existing slot.
    pub fn add_signature(&mut self, pubkey: PublicKey, signature: &[u8]) -> Result<(), SolError> {
        let signature: [u8; SIGNATURE_LENGTH] = signature.try_into().map_err(|_| {
            SolError::SigningError(format!(
                "signature has invalid length {}, expected {SIGNATURE_LENGTH}",
                signature.len()
            ))
        })?;

        let slot = self
            .signatures
            .iter_mut()
            .find(|pair| pair.pubkey == pubkey)
            .ok_or_else(|| SolError::SigningError(format!("unknown signer: {pubkey}")))?;
        slot.signature = Some(signature);
        Ok(())
    }

    /// Fill the slot reserved for `keypair` by [`Transaction::sign_partial`].
    pub fn add_signer(&mut self, keypair: &Keypair) -> Result<(), SolError> {
        let signature = keypair.sign(&self.serialize_message()?);
        self.add_signature(keypair.pubkey(), &signature)
    }

    /// True when every slot holds a signature that verifies over the
    /// compiled message.
    pub fn verify_signatures(&self) -> Result<bool, SolError> {
        let sign_data = self.serialize_message()?;
        Ok(self.signatures_verify(&sign_data))
    }

    /// Encode to wire bytes. Every signature must be present and valid.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        if self.signatures.is_empty() {
            return Err(SolError::SigningError(
                "transaction has not been signed".into(),
            ));
        }

        let sign_data = self.serialize_message()?;
        if !self.signatures_verify(&sign_data) {
            return Err(SolError::SigningError(
                "transaction has not been signed correctly".into(),
            ));
        }

        self.encode_wire(&sign_data)
    }

    /// Encode to wire bytes without checking signatures. Empty slots are
    /// written as 64 zero bytes, for handing a partially signed
    /// transaction to the remaining signers.
    pub fn serialize_partial(&self) -> Result<Vec<u8>, SolError> {
        let sign_data = self.serialize_message()?;
        self.encode_wire(&sign_data)
    }

    /// Decode wire bytes into a transaction.
    pub fn deserialize(raw: &[u8]) -> Result<Self, SolError> {
        let mut reader = WireReader::new(raw);
        let count = reader.read_length()?;
        let signature_bytes = reader.read_array(count, SIGNATURE_LENGTH)?;
        trace!("transaction carries {count} signatures");

        let signatures: Vec<[u8; SIGNATURE_LENGTH]> = signature_bytes
            .chunks_exact(SIGNATURE_LENGTH)
            .map(|chunk| {
                let mut signature = EMPTY_SIGNATURE;
                signature.copy_from_slice(chunk);
                signature
            })
            .collect();

        let message = Message::deserialize(reader.rest())?;
        Self::populate(&message, &signatures)
    }

    /// Rebuild a transaction from a decoded message and its signatures.
    ///
    /// Signature `i` pairs with account key `i`; all-zero signatures become
    /// empty slots. An account is marked as a signer when it owns a slot.
    pub fn populate(
        message: &Message,
        signatures: &[[u8; SIGNATURE_LENGTH]],
    ) -> Result<Self, SolError> {
        let keys = message.account_keys();
        if signatures.len() > keys.len() {
            return Err(SolError::SerializationError(format!(
                "{} signatures for {} account keys",
                signatures.len(),
                keys.len()
            )));
        }

        let signatures: Vec<SigPubkeyPair> = signatures
            .iter()
            .zip(keys)
            .map(|(signature, pubkey)| SigPubkeyPair {
                pubkey: *pubkey,
                signature: (*signature != EMPTY_SIGNATURE).then_some(*signature),
            })
            .collect();

        let key_at = |index: u8| -> Result<PublicKey, SolError> {
            keys.get(index as usize).copied().ok_or_else(|| {
                SolError::SerializationError(format!(
                    "account index {index} out of range for {} keys",
                    keys.len()
                ))
            })
        };

        let mut instructions = Vec::with_capacity(message.instructions().len());
        for ix in message.instructions() {
            let mut accounts = Vec::with_capacity(ix.accounts.len());
            for &index in &ix.accounts {
                let pubkey = key_at(index)?;
                accounts.push(AccountMeta {
                    pubkey,
                    is_signer: signatures.iter().any(|pair| pair.pubkey == pubkey),
                    is_writable: message.is_account_writable(index as usize),
                });
            }
            instructions.push(Instruction {
                program_id: key_at(ix.program_id_index)?,
                accounts,
                data: ix.data.clone(),
            });
        }

        Ok(Self {
            fee_payer: None,
            recent_blockhash: Some(*message.recent_blockhash()),
            nonce_info: None,
            instructions,
            signatures,
        })
    }

    fn signatures_verify(&self, sign_data: &[u8]) -> bool {
        self.signatures.iter().all(|pair| {
            pair.signature
                .as_ref()
                .is_some_and(|signature| verify_signature(&pair.pubkey, sign_data, signature))
        })
    }

    fn encode_wire(&self, sign_data: &[u8]) -> Result<Vec<u8>, SolError> {
        if self.signatures.len() > u8::MAX as usize {
            return Err(SolError::SerializationError(
                "too many signatures to encode".into(),
            ));
        }

        let mut wire =
            Vec::with_capacity(1 + self.signatures.len() * SIGNATURE_LENGTH + sign_data.len());
        wire.extend_from_slice(&shortvec::encode_length(self.signatures.len()));
        for pair in &self.signatures {
            wire.extend_from_slice(pair.signature.as_ref().unwrap_or(&EMPTY_SIGNATURE));
        }
        wire.extend_from_slice(sign_data);

        if wire.len() > PACKET_DATA_SIZE {
            return Err(SolError::SerializationError(format!(
                "transaction too large: {} > {PACKET_DATA_SIZE}",
                wire.len()
            )));
        }

        Ok(wire)
    }
}

/// Put signature slots in the order of the message's signer keys, adding
/// empty slots for required signers that have none. Slots for keys the
/// message does not require are kept at the end.
fn arrange_signatures(slots: Vec<SigPubkeyPair>, message: &Message) -> Vec<SigPubkeyPair> {
    let required = message.signer_keys();
    let mut arranged: Vec<SigPubkeyPair> = required
        .iter()
        .map(|key| {
            slots
                .iter()
                .find(|pair| pair.pubkey == *key)
                .copied()
                .unwrap_or_else(|| SigPubkeyPair::new(*key))
        })
        .collect();
    arranged.extend(slots.iter().filter(|pair| !required.contains(&pair.pubkey)));
    arranged
}

fn count_u8<'a>(metas: impl Iterator<Item = &'a AccountMeta>) -> Result<u8, SolError> {
    let count = metas.count();
    u8::try_from(count).map_err(|_| {
        SolError::TransactionBuildError(format!("{count} accounts exceed a header count"))
    })
}
