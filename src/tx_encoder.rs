//! Canonical re-encoding of a decoded record, as handed to the signer.
//!
//! The canonical form is what the host network expects under a
//! signature: a fixmap whose keys appear in ascending byte order, with
//! every zero-valued field omitted and every integer in its smallest
//! width. Re-decoding an encoding therefore reproduces the exact field
//! values of the record it came from.

use crate::error::EncodeError;
use crate::msgpack::{self, Writer};
use crate::tx_types::{str_bytes, AssetParams, TxType, Txn};

/// Domain tag prepended to the canonical encoding before signing.
pub const SIGN_PREFIX: [u8; 2] = *b"TX";

/// One encodable field value, borrowed from the record.
enum Field<'a> {
    Uint(u64),
    Bool(bool),
    /// Zero-padded fixed string buffer.
    Str(&'a [u8]),
    /// Fixed blob.
    Bin(&'a [u8]),
    /// Already sliced to its decoded length.
    VarBin(&'a [u8]),
    Params(&'a AssetParams),
}

impl Field<'_> {
    // The canonical form omits fields holding their zero value.
    fn is_present(&self) -> bool {
        match self {
            Field::Uint(v) => *v != 0,
            Field::Bool(v) => *v,
            Field::Str(s) => !str_bytes(s).is_empty(),
            Field::Bin(b) => b.iter().any(|&x| x != 0),
            Field::VarBin(b) => !b.is_empty(),
            Field::Params(p) => **p != AssetParams::default(),
        }
    }
}

/// Encodes `t` into `out`, returning the number of bytes written.
///
/// An untyped record (no `"type"` decoded) encodes its common fields
/// only, which round-trips back to the same untyped record.
pub fn tx_encode(t: &Txn, out: &mut [u8]) -> Result<usize, EncodeError> {
    let mut count: u8 = 0;
    for_each_field(t, &mut |_, field: Field<'_>| {
        if field.is_present() {
            count += 1;
        }
        Ok(())
    })?;

    let mut w = Writer::new(out);
    msgpack::encode_map_head(&mut w, count)?;
    for_each_field(t, &mut |key, field: Field<'_>| {
        if !field.is_present() {
            return Ok(());
        }
        msgpack::encode_str(&mut w, key)?;
        encode_field(&mut w, &field)
    })?;
    Ok(w.len())
}

/// Writes the 2-byte signing domain tag followed by the canonical
/// encoding, returning the total payload length.
pub fn encode_for_signing(t: &Txn, out: &mut [u8]) -> Result<usize, EncodeError> {
    let tagged = out.get_mut(..SIGN_PREFIX.len()).ok_or(EncodeError)?;
    tagged.copy_from_slice(&SIGN_PREFIX);
    let n = tx_encode(t, &mut out[SIGN_PREFIX.len()..])?;
    Ok(SIGN_PREFIX.len() + n)
}

fn encode_field(w: &mut Writer, field: &Field<'_>) -> Result<(), EncodeError> {
    match field {
        Field::Uint(v) => msgpack::encode_uint64(w, *v),
        Field::Bool(v) => msgpack::encode_bool(w, *v),
        Field::Str(s) => msgpack::encode_str(w, str_bytes(s)),
        Field::Bin(b) | Field::VarBin(b) => msgpack::encode_bin(w, b),
        Field::Params(p) => encode_asset_params(w, p),
    }
}

fn encode_asset_params(w: &mut Writer, p: &AssetParams) -> Result<(), EncodeError> {
    let mut count: u8 = 0;
    for_each_param(p, &mut |_, field: Field<'_>| {
        if field.is_present() {
            count += 1;
        }
        Ok(())
    })?;

    msgpack::encode_map_head(w, count)?;
    for_each_param(p, &mut |key, field: Field<'_>| {
        if !field.is_present() {
            return Ok(());
        }
        msgpack::encode_str(w, key)?;
        encode_field(w, &field)
    })
}

/// Walks the candidate fields of `t` in canonical (ascending) key order.
/// The per-shape sequences are spelled out in full; the orders interleave
/// common and shape-specific keys so there is nothing useful to factor.
fn for_each_field<'a>(
    t: &'a Txn,
    f: &mut dyn FnMut(&'static [u8], Field<'a>) -> Result<(), EncodeError>,
) -> Result<(), EncodeError> {
    let note = &t.note[..t.note_len.min(t.note.len())];
    match t.tx_type {
        TxType::Payment => {
            f(b"amt", Field::Uint(t.payment.amount))?;
            f(b"close", Field::Bin(&t.payment.close))?;
            f(b"fee", Field::Uint(t.fee))?;
            f(b"fv", Field::Uint(t.first_valid))?;
            f(b"gen", Field::Str(&t.genesis_id))?;
            f(b"gh", Field::Bin(&t.genesis_hash))?;
            f(b"lv", Field::Uint(t.last_valid))?;
            f(b"note", Field::VarBin(note))?;
            f(b"rcv", Field::Bin(&t.payment.receiver))?;
            f(b"rekey", Field::Bin(&t.rekey))?;
            f(b"snd", Field::Bin(&t.sender))?;
            f(b"type", Field::Str(b"pay"))?;
        }
        TxType::Keyreg => {
            f(b"fee", Field::Uint(t.fee))?;
            f(b"fv", Field::Uint(t.first_valid))?;
            f(b"gen", Field::Str(&t.genesis_id))?;
            f(b"gh", Field::Bin(&t.genesis_hash))?;
            f(b"lv", Field::Uint(t.last_valid))?;
            f(b"nonpart", Field::Bool(t.keyreg.nonpart))?;
            f(b"note", Field::VarBin(note))?;
            f(b"rekey", Field::Bin(&t.rekey))?;
            f(b"selkey", Field::Bin(&t.keyreg.vrfpk))?;
            f(b"snd", Field::Bin(&t.sender))?;
            f(b"type", Field::Str(b"keyreg"))?;
            f(b"votefst", Field::Uint(t.keyreg.vote_first))?;
            f(b"votekd", Field::Uint(t.keyreg.key_dilution))?;
            f(b"votekey", Field::Bin(&t.keyreg.votepk))?;
            f(b"votelst", Field::Uint(t.keyreg.vote_last))?;
        }
        TxType::AssetXfer => {
            f(b"aamt", Field::Uint(t.asset_xfer.amount))?;
            f(b"aclose", Field::Bin(&t.asset_xfer.close))?;
            f(b"arcv", Field::Bin(&t.asset_xfer.receiver))?;
            f(b"asnd", Field::Bin(&t.asset_xfer.sender))?;
            f(b"fee", Field::Uint(t.fee))?;
            f(b"fv", Field::Uint(t.first_valid))?;
            f(b"gen", Field::Str(&t.genesis_id))?;
            f(b"gh", Field::Bin(&t.genesis_hash))?;
            f(b"lv", Field::Uint(t.last_valid))?;
            f(b"note", Field::VarBin(note))?;
            f(b"rekey", Field::Bin(&t.rekey))?;
            f(b"snd", Field::Bin(&t.sender))?;
            f(b"type", Field::Str(b"axfer"))?;
            f(b"xaid", Field::Uint(t.asset_xfer.id))?;
        }
        TxType::AssetFreeze => {
            f(b"afrz", Field::Bool(t.asset_freeze.frozen))?;
            f(b"fadd", Field::Bin(&t.asset_freeze.account))?;
            f(b"faid", Field::Uint(t.asset_freeze.id))?;
            f(b"fee", Field::Uint(t.fee))?;
            f(b"fv", Field::Uint(t.first_valid))?;
            f(b"gen", Field::Str(&t.genesis_id))?;
            f(b"gh", Field::Bin(&t.genesis_hash))?;
            f(b"lv", Field::Uint(t.last_valid))?;
            f(b"note", Field::VarBin(note))?;
            f(b"rekey", Field::Bin(&t.rekey))?;
            f(b"snd", Field::Bin(&t.sender))?;
            f(b"type", Field::Str(b"afrz"))?;
        }
        TxType::AssetConfig => {
            f(b"apar", Field::Params(&t.asset_config.params))?;
            f(b"caid", Field::Uint(t.asset_config.id))?;
            f(b"fee", Field::Uint(t.fee))?;
            f(b"fv", Field::Uint(t.first_valid))?;
            f(b"gen", Field::Str(&t.genesis_id))?;
            f(b"gh", Field::Bin(&t.genesis_hash))?;
            f(b"lv", Field::Uint(t.last_valid))?;
            f(b"note", Field::VarBin(note))?;
            f(b"rekey", Field::Bin(&t.rekey))?;
            f(b"snd", Field::Bin(&t.sender))?;
            f(b"type", Field::Str(b"acfg"))?;
        }
        TxType::Unknown => {
            f(b"fee", Field::Uint(t.fee))?;
            f(b"fv", Field::Uint(t.first_valid))?;
            f(b"gen", Field::Str(&t.genesis_id))?;
            f(b"gh", Field::Bin(&t.genesis_hash))?;
            f(b"lv", Field::Uint(t.last_valid))?;
            f(b"note", Field::VarBin(note))?;
            f(b"rekey", Field::Bin(&t.rekey))?;
            f(b"snd", Field::Bin(&t.sender))?;
        }
    }
    Ok(())
}

fn for_each_param<'a>(
    p: &'a AssetParams,
    f: &mut dyn FnMut(&'static [u8], Field<'a>) -> Result<(), EncodeError>,
) -> Result<(), EncodeError> {
    f(b"am", Field::Bin(&p.metadata_hash))?;
    f(b"an", Field::Str(&p.asset_name))?;
    f(b"au", Field::Str(&p.url))?;
    f(b"c", Field::Bin(&p.clawback))?;
    f(b"dc", Field::Uint(p.decimals))?;
    f(b"df", Field::Bool(p.default_frozen))?;
    f(b"f", Field::Bin(&p.freeze))?;
    f(b"m", Field::Bin(&p.manager))?;
    f(b"r", Field::Bin(&p.reserve))?;
    f(b"t", Field::Uint(p.total))?;
    f(b"un", Field::Str(&p.unit_name))?;
    Ok(())
}
