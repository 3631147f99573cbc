//! Decode failure taxonomy and bounded diagnostic rendering.
//!
//! Every malformed-input condition maps to one [`DecodeError`] value that
//! is returned to the caller of the failing decode; nothing is retried and
//! no global scratch state is involved. The rendered message is advisory
//! only: the host displays or logs it, nothing parses it.

use numtoa::NumToA;

/// Longest key a document can carry (the key scratch buffer minus its
/// terminator byte).
pub const MAX_KEY_LEN: usize = 31;

/// Fixed capacity of a rendered diagnostic message.
pub const ERR_MSG_LEN: usize = 64;

/// A map key captured at the point of failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldKey {
    buf: [u8; MAX_KEY_LEN],
    len: u8,
}

impl FieldKey {
    pub(crate) fn new(key: &[u8]) -> Self {
        let mut buf = [0u8; MAX_KEY_LEN];
        let len = key.len().min(MAX_KEY_LEN);
        buf[..len].copy_from_slice(&key[..len]);
        Self {
            buf,
            len: len as u8,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

/// Which allow-list table rejected a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTable {
    /// Top-level transaction field table.
    Txn,
    /// Nested asset-parameters field table.
    AssetParams,
    /// The five `"type"` literals.
    TxType,
}

/// Tag family the decoder was expecting when it found something else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    /// An inclusive fixed-size tag range, e.g. the fixmap family.
    Range { first: u8, last: u8 },
    Str,
    Bin,
    Uint,
    Bool,
}

/// What kind of destination a declared length failed to fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowKind {
    /// String destination; any length up to the capacity is fine.
    Str,
    /// Variable-length binary destination.
    Bin,
    /// Fixed binary destination demanding one exact length.
    BinExact,
}

/// Terminal decode failures. Each aborts the whole decode at the point it
/// occurs; the partially written record is never handed downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Cursor reached the end of the input before an expected byte.
    Truncated,
    /// Tag byte outside the family expected for the current field.
    WrongType { found: u8, expected: Expected },
    /// Declared length does not fit the destination.
    Overflow { len: u16, cap: u16, kind: OverflowKind },
    /// Key not present in the fixed field table.
    UnknownField { key: FieldKey, table: KeyTable },
}

/// Destination buffer too small to hold a canonical encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeError;

/// Bounded, human-readable rendering of a [`DecodeError`].
#[derive(Clone, Copy)]
pub struct ErrMsg {
    buf: [u8; ERR_MSG_LEN],
    len: usize,
}

impl ErrMsg {
    fn new() -> Self {
        Self {
            buf: [0u8; ERR_MSG_LEN],
            len: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        // Safe because every push below emits printable ASCII only
        unsafe { core::str::from_utf8_unchecked(&self.buf[..self.len]) }
    }

    fn push_byte(&mut self, b: u8) {
        if self.len < ERR_MSG_LEN {
            self.buf[self.len] = b;
            self.len += 1;
        }
    }

    fn push_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.push_byte(b);
        }
    }

    fn push_u64(&mut self, v: u64) {
        let mut scratch = [0u8; 20];
        let digits = v.numtoa_str(10, &mut scratch);
        self.push_str(digits);
    }

    fn push_key(&mut self, key: &FieldKey) {
        for &b in key.as_bytes() {
            // Keys come straight from hostile input; keep the message ASCII
            self.push_byte(if (0x20..0x7f).contains(&b) { b } else { b'?' });
        }
    }
}

impl DecodeError {
    /// Renders the diagnostic the host surfaces in place of a result.
    pub fn render(&self) -> ErrMsg {
        let mut msg = ErrMsg::new();
        match *self {
            DecodeError::Truncated => msg.push_str("decode past end"),
            DecodeError::WrongType { found, expected } => match expected {
                Expected::Range { first, last } => {
                    msg.push_str("decode ");
                    msg.push_u64(found.into());
                    msg.push_str(" wrong type (");
                    msg.push_u64(first.into());
                    msg.push_byte(b'-');
                    msg.push_u64(last.into());
                    msg.push_byte(b')');
                }
                Expected::Str => {
                    msg.push_str("expected string, found ");
                    msg.push_u64(found.into());
                }
                Expected::Bin => {
                    msg.push_str("expected bin, found ");
                    msg.push_u64(found.into());
                }
                Expected::Uint => {
                    msg.push_str("expected u64, found ");
                    msg.push_u64(found.into());
                }
                Expected::Bool => {
                    msg.push_str("expected bool, found ");
                    msg.push_u64(found.into());
                }
            },
            DecodeError::Overflow { len, cap, kind } => match kind {
                OverflowKind::Str => {
                    msg.push_u64(len.into());
                    msg.push_str("-byte string too big for ");
                    msg.push_u64(cap.into());
                    msg.push_str("-byte buf");
                }
                OverflowKind::Bin => {
                    msg.push_str("expected <= ");
                    msg.push_u64(cap.into());
                    msg.push_str(" bin bytes, found ");
                    msg.push_u64(len.into());
                }
                OverflowKind::BinExact => {
                    msg.push_str("expected ");
                    msg.push_u64(cap.into());
                    msg.push_str(" bin bytes, found ");
                    msg.push_u64(len.into());
                }
            },
            DecodeError::UnknownField { key, table } => {
                match table {
                    KeyTable::Txn => msg.push_str("unknown field "),
                    KeyTable::AssetParams => msg.push_str("unknown params field "),
                    KeyTable::TxType => msg.push_str("unknown tx type "),
                }
                msg.push_key(&key);
            }
        }
        msg
    }
}
