//! Solana domain primitives: public keys, lamport conversion and the
//! transaction-assembly types the transaction node family builds up.

use crate::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lamports per SOL, the fixed divisor between base units and the
/// human-facing unit.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// System program id (native SOL transfers).
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// SPL Token program id.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// A validated base58 public key (32 bytes decoded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pubkey(String);

impl Pubkey {
    /// Parse and validate a base58-encoded key. Malformed keys are a
    /// dispatch-time `InvalidValue`, mirroring how a bad key string fails
    /// inside a node rather than at graph-build time.
    pub fn parse(s: &str) -> Result<Self, NodeError> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|_| NodeError::InvalidValue(format!("invalid public key: {s}")))?;
        if decoded.len() != 32 {
            return Err(NodeError::InvalidValue(format!(
                "invalid public key length for {s}: {} bytes",
                decoded.len()
            )));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Result<[u8; 32], NodeError> {
        let decoded = bs58::decode(&self.0)
            .into_vec()
            .map_err(|_| NodeError::InvalidValue(format!("invalid public key: {}", self.0)))?;
        decoded
            .try_into()
            .map_err(|_| NodeError::InvalidValue(format!("invalid public key: {}", self.0)))
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One account reference inside an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// A program invocation: program id, account list and opaque data bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Build a native SOL transfer instruction (system program `Transfer`,
/// u32 LE tag 2 followed by u64 LE lamports).
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    Instruction {
        program_id: Pubkey(SYSTEM_PROGRAM_ID.to_string()),
        accounts: vec![
            AccountMeta {
                pubkey: from.clone(),
                is_signer: true,
                is_writable: true,
            },
            AccountMeta {
                pubkey: to.clone(),
                is_signer: false,
                is_writable: true,
            },
        ],
        data,
    }
}

/// Build an SPL token transfer instruction (`Transfer` tag 3 followed by
/// u64 LE amount in the token's base units).
pub fn spl_token_transfer(
    source: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(3u8);
    data.extend_from_slice(&amount.to_le_bytes());
    Instruction {
        program_id: Pubkey(TOKEN_PROGRAM_ID.to_string()),
        accounts: vec![
            AccountMeta {
                pubkey: source.clone(),
                is_signer: false,
                is_writable: true,
            },
            AccountMeta {
                pubkey: destination.clone(),
                is_signer: false,
                is_writable: true,
            },
            AccountMeta {
                pubkey: owner.clone(),
                is_signer: true,
                is_writable: false,
            },
        ],
        data,
    }
}

/// An unsigned-or-signed transaction under assembly. Pure data until the
/// send node serializes it to the binary wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub fee_payer: Pubkey,
    pub recent_blockhash: String,
    pub instructions: Vec<Instruction>,
    /// Base58 signatures, in required-signer order. Empty until signed.
    pub signatures: Vec<String>,
}

impl Transaction {
    pub fn new(fee_payer: Pubkey, recent_blockhash: impl Into<String>) -> Self {
        Self {
            fee_payer,
            recent_blockhash: recent_blockhash.into(),
            instructions: Vec::new(),
            signatures: Vec::new(),
        }
    }

    pub fn add(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Serialize to the binary wire format and base64-encode for
    /// `sendTransaction`. Missing signatures are zero-filled placeholders,
    /// so an unsigned submission fails on-chain rather than here.
    pub fn encode_base64(&self) -> Result<String, NodeError> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        Ok(STANDARD.encode(self.serialize()?))
    }

    pub fn serialize(&self) -> Result<Vec<u8>, NodeError> {
        let keys = self.compile_account_keys();
        let num_required = keys.iter().filter(|k| k.is_signer).count();

        let mut out = Vec::new();
        append_compact_u16(&mut out, num_required as u16);
        for i in 0..num_required {
            match self.signatures.get(i) {
                Some(sig) => {
                    let bytes = bs58::decode(sig)
                        .into_vec()
                        .map_err(|_| NodeError::InvalidValue(format!("invalid signature: {sig}")))?;
                    if bytes.len() != 64 {
                        return Err(NodeError::InvalidValue(format!(
                            "invalid signature length: {} bytes",
                            bytes.len()
                        )));
                    }
                    out.extend_from_slice(&bytes);
                }
                None => out.extend_from_slice(&[0u8; 64]),
            }
        }
        out.extend(self.serialize_message(&keys)?);
        Ok(out)
    }

    /// The message half of the wire format: header, account keys,
    /// blockhash, compiled instructions.
    fn serialize_message(&self, keys: &[CompiledKey]) -> Result<Vec<u8>, NodeError> {
        let num_required = keys.iter().filter(|k| k.is_signer).count() as u8;
        let num_readonly_signed =
            keys.iter().filter(|k| k.is_signer && !k.is_writable).count() as u8;
        let num_readonly_unsigned =
            keys.iter().filter(|k| !k.is_signer && !k.is_writable).count() as u8;

        let mut out = vec![num_required, num_readonly_signed, num_readonly_unsigned];

        append_compact_u16(&mut out, keys.len() as u16);
        for key in keys {
            out.extend_from_slice(&key.pubkey.to_bytes()?);
        }

        let blockhash = bs58::decode(&self.recent_blockhash)
            .into_vec()
            .map_err(|_| {
                NodeError::InvalidValue(format!("invalid blockhash: {}", self.recent_blockhash))
            })?;
        if blockhash.len() != 32 {
            return Err(NodeError::InvalidValue(format!(
                "invalid blockhash: {}",
                self.recent_blockhash
            )));
        }
        out.extend_from_slice(&blockhash);

        let index_of = |pubkey: &Pubkey| -> u8 {
            keys.iter().position(|k| &k.pubkey == pubkey).unwrap_or(0) as u8
        };

        append_compact_u16(&mut out, self.instructions.len() as u16);
        for ix in &self.instructions {
            out.push(index_of(&ix.program_id));
            append_compact_u16(&mut out, ix.accounts.len() as u16);
            for meta in &ix.accounts {
                out.push(index_of(&meta.pubkey));
            }
            append_compact_u16(&mut out, ix.data.len() as u16);
            out.extend_from_slice(&ix.data);
        }
        Ok(out)
    }

    /// Deduplicated account list in the required order: fee payer first,
    /// then writable signers, readonly signers, writable non-signers,
    /// readonly non-signers. Program ids join as readonly non-signers.
    fn compile_account_keys(&self) -> Vec<CompiledKey> {
        let mut keys: Vec<CompiledKey> = vec![CompiledKey {
            pubkey: self.fee_payer.clone(),
            is_signer: true,
            is_writable: true,
        }];

        let mut upsert = |pubkey: &Pubkey, is_signer: bool, is_writable: bool| {
            if let Some(existing) = keys.iter_mut().find(|k| &k.pubkey == pubkey) {
                existing.is_signer |= is_signer;
                existing.is_writable |= is_writable;
            } else {
                keys.push(CompiledKey {
                    pubkey: pubkey.clone(),
                    is_signer,
                    is_writable,
                });
            }
        };

        for ix in &self.instructions {
            for meta in &ix.accounts {
                upsert(&meta.pubkey, meta.is_signer, meta.is_writable);
            }
        }
        for ix in &self.instructions {
            upsert(&ix.program_id, false, false);
        }

        let fee_payer = keys.remove(0);
        let rank = |k: &CompiledKey| match (k.is_signer, k.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        };
        keys.sort_by_key(rank);
        keys.insert(0, fee_payer);
        keys
    }
}

#[derive(Debug, Clone)]
struct CompiledKey {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

/// Solana's compact-u16 (shortvec) length prefix.
fn append_compact_u16(out: &mut Vec<u8>, mut value: u16) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// SOL → lamports, flooring fractional lamports away.
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(seed: u8) -> Pubkey {
        Pubkey(bs58::encode([seed; 32]).into_string())
    }

    #[test]
    fn pubkey_parse_rejects_garbage() {
        assert!(Pubkey::parse("not-base58-0OIl").is_err());
        assert!(Pubkey::parse("abc").is_err());
        assert!(Pubkey::parse(SYSTEM_PROGRAM_ID).is_ok());
        assert!(Pubkey::parse(TOKEN_PROGRAM_ID).is_ok());
    }

    #[test]
    fn sol_conversion_uses_fixed_divisor() {
        assert_eq!(sol_to_lamports(1.5), 1_500_000_000);
        assert_eq!(sol_to_lamports(0.000000001), 1);
        // fractional lamports floor away
        assert_eq!(sol_to_lamports(0.0000000015), 1);
        assert_eq!(lamports_to_sol(2_000_000_000), 2.0);
    }

    #[test]
    fn system_transfer_packs_tag_and_lamports() {
        let ix = system_transfer(&key(1), &key(2), 42);
        assert_eq!(ix.program_id.as_str(), SYSTEM_PROGRAM_ID);
        assert_eq!(&ix.data[..4], &2u32.to_le_bytes());
        assert_eq!(&ix.data[4..], &42u64.to_le_bytes());
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    #[test]
    fn token_transfer_packs_tag_and_amount() {
        let ix = spl_token_transfer(&key(1), &key(2), &key(3), 7);
        assert_eq!(ix.program_id.as_str(), TOKEN_PROGRAM_ID);
        assert_eq!(ix.data[0], 3);
        assert_eq!(&ix.data[1..], &7u64.to_le_bytes());
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
    }

    #[test]
    fn transaction_serializes_with_placeholder_signature() {
        let payer = key(9);
        let mut tx = Transaction::new(payer.clone(), bs58::encode([7u8; 32]).into_string());
        tx.add(system_transfer(&payer, &key(2), 1));

        let bytes = tx.serialize().expect("serializable");
        // one required signer, zero-filled placeholder signature
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..65], &[0u8; 64]);
        // header: 1 required signature, 0 readonly signed, 1 readonly
        // unsigned (the system program id)
        assert_eq!(&bytes[65..68], &[1, 0, 1]);
        // three distinct account keys: payer, recipient, system program
        assert_eq!(bytes[68], 3);
    }

    #[test]
    fn compiled_keys_merge_flags_and_keep_fee_payer_first() {
        let payer = key(1);
        let mut tx = Transaction::new(payer.clone(), bs58::encode([7u8; 32]).into_string());
        // payer also appears as a plain writable account inside the ix
        tx.add(system_transfer(&payer, &key(2), 5));
        let keys = tx.compile_account_keys();
        assert_eq!(keys[0].pubkey, payer);
        assert_eq!(keys.iter().filter(|k| k.pubkey == payer).count(), 1);
    }

    #[test]
    fn compact_u16_encoding() {
        let mut buf = Vec::new();
        append_compact_u16(&mut buf, 0);
        append_compact_u16(&mut buf, 5);
        append_compact_u16(&mut buf, 0x7f);
        append_compact_u16(&mut buf, 0x80);
        assert_eq!(buf, vec![0, 5, 0x7f, 0x80, 0x01]);
    }
}
