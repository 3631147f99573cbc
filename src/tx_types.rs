//! The fixed-layout transaction record the decoder populates.
//!
//! During decode every shape's field group exists side by side as plain
//! storage; which one is meaningful is selected by [`TxType`] after the
//! decode has succeeded. A document mixing fields from several shapes
//! still decodes (each field lands in its own group), the non-selected
//! groups are simply meaningless to downstream consumers.

pub const MAX_NOTE_LEN: usize = 1024;
pub const MAX_GENESIS_ID_LEN: usize = 32;
pub const MAX_UNIT_NAME_LEN: usize = 8;
pub const MAX_ASSET_NAME_LEN: usize = 32;
pub const MAX_URL_LEN: usize = 32;

/// Transaction shape discriminant, set by the `"type"` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TxType {
    /// No `"type"` field decoded.
    #[default]
    Unknown,
    Payment,
    Keyreg,
    AssetXfer,
    AssetFreeze,
    AssetConfig,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaymentFields {
    pub receiver: [u8; 32],
    pub amount: u64,
    pub close: [u8; 32],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyregFields {
    pub votepk: [u8; 32],
    pub vrfpk: [u8; 32],
    pub vote_first: u64,
    pub vote_last: u64,
    pub key_dilution: u64,
    pub nonpart: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetXferFields {
    pub id: u64,
    pub amount: u64,
    pub sender: [u8; 32],
    pub receiver: [u8; 32],
    pub close: [u8; 32],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetFreezeFields {
    pub id: u64,
    pub account: [u8; 32],
    pub frozen: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetConfigFields {
    pub id: u64,
    pub params: AssetParams,
}

/// Asset creation/reconfiguration parameters, decoded from the nested
/// `"apar"` map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetParams {
    pub total: u64,
    pub decimals: u64,
    pub default_frozen: bool,
    pub unit_name: [u8; MAX_UNIT_NAME_LEN],
    pub asset_name: [u8; MAX_ASSET_NAME_LEN],
    pub url: [u8; MAX_URL_LEN],
    pub metadata_hash: [u8; 32],
    pub manager: [u8; 32],
    pub reserve: [u8; 32],
    pub freeze: [u8; 32],
    pub clawback: [u8; 32],
}

/// One decoded transaction. Caller-owned; zeroed at the start of every
/// decode except for `account_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Txn {
    /// Caller-set key index. Never written by decode: it is saved before
    /// the record is zeroed and restored right after.
    pub account_id: u32,
    pub tx_type: TxType,
    pub sender: [u8; 32],
    pub rekey: [u8; 32],
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: [u8; MAX_GENESIS_ID_LEN],
    pub genesis_hash: [u8; 32],
    pub note: [u8; MAX_NOTE_LEN],
    pub note_len: usize,
    pub payment: PaymentFields,
    pub keyreg: KeyregFields,
    pub asset_xfer: AssetXferFields,
    pub asset_freeze: AssetFreezeFields,
    pub asset_config: AssetConfigFields,
}

impl Default for Txn {
    fn default() -> Self {
        Self {
            account_id: 0,
            tx_type: TxType::Unknown,
            sender: [0u8; 32],
            rekey: [0u8; 32],
            fee: 0,
            first_valid: 0,
            last_valid: 0,
            genesis_id: [0u8; MAX_GENESIS_ID_LEN],
            genesis_hash: [0u8; 32],
            note: [0u8; MAX_NOTE_LEN],
            note_len: 0,
            payment: PaymentFields::default(),
            keyreg: KeyregFields::default(),
            asset_xfer: AssetXferFields::default(),
            asset_freeze: AssetFreezeFields::default(),
            asset_config: AssetConfigFields::default(),
        }
    }
}

/// Borrowing view of the one field group selected by the discriminant,
/// for consumers that only care about the meaningful payload.
#[derive(Clone, Copy, Debug)]
pub enum Payload<'a> {
    Payment(&'a PaymentFields),
    Keyreg(&'a KeyregFields),
    AssetXfer(&'a AssetXferFields),
    AssetFreeze(&'a AssetFreezeFields),
    AssetConfig(&'a AssetConfigFields),
}

impl Txn {
    /// Zeroes every field except `account_id`, readying the record for a
    /// fresh decode pass.
    pub fn clear_for_decode(&mut self) {
        let account_id = self.account_id;
        *self = Txn::default();
        self.account_id = account_id;
    }

    /// The payload selected by `tx_type`, or `None` for an untyped record.
    pub fn payload(&self) -> Option<Payload<'_>> {
        match self.tx_type {
            TxType::Unknown => None,
            TxType::Payment => Some(Payload::Payment(&self.payment)),
            TxType::Keyreg => Some(Payload::Keyreg(&self.keyreg)),
            TxType::AssetXfer => Some(Payload::AssetXfer(&self.asset_xfer)),
            TxType::AssetFreeze => Some(Payload::AssetFreeze(&self.asset_freeze)),
            TxType::AssetConfig => Some(Payload::AssetConfig(&self.asset_config)),
        }
    }

    /// Display literal for the transaction shape.
    pub fn type_name(&self) -> &'static str {
        match self.tx_type {
            TxType::Payment => "Payment",
            TxType::Keyreg => "Key reg",
            TxType::AssetXfer => "Asset xfer",
            TxType::AssetFreeze => "Asset freeze",
            TxType::AssetConfig => "Asset config",
            TxType::Unknown => "Unknown",
        }
    }
}

/// The occupied prefix of a zero-padded fixed string buffer: everything
/// up to the first NUL, or the whole buffer when fully occupied.
pub fn str_bytes(buf: &[u8]) -> &[u8] {
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..len]
}
