//! Strict allow-list decoding of one msgpack transaction document into a
//! caller-owned [`Txn`] record.
//!
//! One shared path decodes all five transaction shapes: the top-level map
//! decoder dispatches each key to exactly one field, and the nested
//! `"apar"` map recurses into the asset-parameters decoder. Any key
//! outside the fixed tables is a hard failure, as is any tag or length
//! violation below; the first failure anywhere aborts the whole decode.

use crate::error::{DecodeError, FieldKey, KeyTable};
use crate::msgpack::{self, Cursor, FIXMAP_0, FIXMAP_15};
use crate::tx_types::{str_bytes, AssetParams, TxType, Txn};

// Key and type-literal scratch sizes, terminator byte included.
const KEY_BUF_LEN: usize = 32;
const TYPE_BUF_LEN: usize = 16;

/// Decodes `buf` into `txn`.
///
/// The record is zeroed on entry (`account_id` excepted) and populated
/// field by field. On error the record holds whatever fields decoded
/// before the failure; callers must not hand it downstream.
pub fn tx_decode(buf: &[u8], txn: &mut Txn) -> Result<(), DecodeError> {
    txn.clear_for_decode();

    let mut cur = Cursor::new(buf);
    let count = msgpack::decode_fixsz(&mut cur, FIXMAP_0, FIXMAP_15)?;
    for _ in 0..count {
        let mut key = [0u8; KEY_BUF_LEN];
        msgpack::decode_string_nullterm(&mut cur, &mut key)?;
        decode_txn_field(&mut cur, str_bytes(&key), txn)?;
    }
    Ok(())
}

fn decode_txn_field(cur: &mut Cursor, key: &[u8], t: &mut Txn) -> Result<(), DecodeError> {
    // Type-specific fields land in their own field group no matter what
    // `"type"` says. A document mixing shapes still decodes; the extra
    // groups hold values no consumer will look at.
    match key {
        b"type" => decode_tx_type(cur, t)?,
        b"snd" => msgpack::decode_bin_fixed(cur, &mut t.sender)?,
        b"rekey" => msgpack::decode_bin_fixed(cur, &mut t.rekey)?,
        b"fee" => t.fee = msgpack::decode_uint64(cur)?,
        b"fv" => t.first_valid = msgpack::decode_uint64(cur)?,
        b"lv" => t.last_valid = msgpack::decode_uint64(cur)?,
        b"gen" => msgpack::decode_string(cur, &mut t.genesis_id)?,
        b"gh" => msgpack::decode_bin_fixed(cur, &mut t.genesis_hash)?,
        b"note" => t.note_len = msgpack::decode_bin_var(cur, &mut t.note)?,
        b"amt" => t.payment.amount = msgpack::decode_uint64(cur)?,
        b"rcv" => msgpack::decode_bin_fixed(cur, &mut t.payment.receiver)?,
        b"close" => msgpack::decode_bin_fixed(cur, &mut t.payment.close)?,
        b"selkey" => msgpack::decode_bin_fixed(cur, &mut t.keyreg.vrfpk)?,
        b"votekey" => msgpack::decode_bin_fixed(cur, &mut t.keyreg.votepk)?,
        b"votefst" => t.keyreg.vote_first = msgpack::decode_uint64(cur)?,
        b"votelst" => t.keyreg.vote_last = msgpack::decode_uint64(cur)?,
        b"votekd" => t.keyreg.key_dilution = msgpack::decode_uint64(cur)?,
        b"nonpart" => t.keyreg.nonpart = msgpack::decode_bool(cur)?,
        b"aamt" => t.asset_xfer.amount = msgpack::decode_uint64(cur)?,
        b"aclose" => msgpack::decode_bin_fixed(cur, &mut t.asset_xfer.close)?,
        b"arcv" => msgpack::decode_bin_fixed(cur, &mut t.asset_xfer.receiver)?,
        b"asnd" => msgpack::decode_bin_fixed(cur, &mut t.asset_xfer.sender)?,
        b"xaid" => t.asset_xfer.id = msgpack::decode_uint64(cur)?,
        b"faid" => t.asset_freeze.id = msgpack::decode_uint64(cur)?,
        b"fadd" => msgpack::decode_bin_fixed(cur, &mut t.asset_freeze.account)?,
        b"afrz" => t.asset_freeze.frozen = msgpack::decode_bool(cur)?,
        b"caid" => t.asset_config.id = msgpack::decode_uint64(cur)?,
        b"apar" => decode_asset_params(cur, &mut t.asset_config.params)?,
        other => {
            return Err(DecodeError::UnknownField {
                key: FieldKey::new(other),
                table: KeyTable::Txn,
            })
        }
    }
    Ok(())
}

fn decode_tx_type(cur: &mut Cursor, t: &mut Txn) -> Result<(), DecodeError> {
    let mut literal = [0u8; TYPE_BUF_LEN];
    msgpack::decode_string_nullterm(cur, &mut literal)?;
    t.tx_type = match str_bytes(&literal) {
        b"pay" => TxType::Payment,
        b"keyreg" => TxType::Keyreg,
        b"axfer" => TxType::AssetXfer,
        b"afrz" => TxType::AssetFreeze,
        b"acfg" => TxType::AssetConfig,
        other => {
            return Err(DecodeError::UnknownField {
                key: FieldKey::new(other),
                table: KeyTable::TxType,
            })
        }
    };
    Ok(())
}

fn decode_asset_params(cur: &mut Cursor, p: &mut AssetParams) -> Result<(), DecodeError> {
    let count = msgpack::decode_fixsz(cur, FIXMAP_0, FIXMAP_15)?;
    for _ in 0..count {
        let mut key = [0u8; KEY_BUF_LEN];
        msgpack::decode_string_nullterm(cur, &mut key)?;
        match str_bytes(&key) {
            b"t" => p.total = msgpack::decode_uint64(cur)?,
            b"dc" => p.decimals = msgpack::decode_uint64(cur)?,
            b"df" => p.default_frozen = msgpack::decode_bool(cur)?,
            b"un" => msgpack::decode_string(cur, &mut p.unit_name)?,
            b"an" => msgpack::decode_string(cur, &mut p.asset_name)?,
            b"au" => msgpack::decode_string(cur, &mut p.url)?,
            b"am" => msgpack::decode_bin_fixed(cur, &mut p.metadata_hash)?,
            b"m" => msgpack::decode_bin_fixed(cur, &mut p.manager)?,
            b"r" => msgpack::decode_bin_fixed(cur, &mut p.reserve)?,
            b"f" => msgpack::decode_bin_fixed(cur, &mut p.freeze)?,
            b"c" => msgpack::decode_bin_fixed(cur, &mut p.clawback)?,
            other => {
                return Err(DecodeError::UnknownField {
                    key: FieldKey::new(other),
                    table: KeyTable::AssetParams,
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{KeyTable, OverflowKind};
    use crate::msgpack::{BIN8, BOOL_TRUE, FIXSTR_0, UINT16, UINT32};
    use crate::tx_types::Payload;

    // Document builders. Values are written in their canonical widths,
    // matching what a host would send.
    fn push_str(doc: &mut Vec<u8>, s: &str) {
        assert!(s.len() <= 31);
        doc.push(FIXSTR_0 + s.len() as u8);
        doc.extend_from_slice(s.as_bytes());
    }

    fn push_bin(doc: &mut Vec<u8>, bytes: &[u8]) {
        assert!(bytes.len() <= 255);
        doc.push(BIN8);
        doc.push(bytes.len() as u8);
        doc.extend_from_slice(bytes);
    }

    fn push_uint(doc: &mut Vec<u8>, v: u64) {
        if v <= 127 {
            doc.push(v as u8);
        } else if v <= 0xffff {
            doc.push(UINT16);
            doc.extend_from_slice(&(v as u16).to_be_bytes());
        } else {
            doc.push(UINT32);
            doc.extend_from_slice(&(v as u32).to_be_bytes());
        }
    }

    fn payment_doc() -> Vec<u8> {
        let mut doc = vec![FIXMAP_0 + 9];
        push_str(&mut doc, "type");
        push_str(&mut doc, "pay");
        push_str(&mut doc, "snd");
        push_bin(&mut doc, &[0x11; 32]);
        push_str(&mut doc, "fee");
        push_uint(&mut doc, 1000);
        push_str(&mut doc, "fv");
        push_uint(&mut doc, 100);
        push_str(&mut doc, "lv");
        push_uint(&mut doc, 200);
        push_str(&mut doc, "gen");
        push_str(&mut doc, "mainnet-v1.0");
        push_str(&mut doc, "gh");
        push_bin(&mut doc, &[0x22; 32]);
        push_str(&mut doc, "rcv");
        push_bin(&mut doc, &[0x33; 32]);
        push_str(&mut doc, "amt");
        push_uint(&mut doc, 5_000_000);
        doc
    }

    #[test]
    fn payment_decodes_exactly() {
        let mut txn = Txn::default();
        tx_decode(&payment_doc(), &mut txn).unwrap();

        assert_eq!(txn.tx_type, TxType::Payment);
        assert_eq!(txn.sender, [0x11; 32]);
        assert_eq!(txn.fee, 1000);
        assert_eq!(txn.first_valid, 100);
        assert_eq!(txn.last_valid, 200);
        assert_eq!(str_bytes(&txn.genesis_id), b"mainnet-v1.0");
        assert_eq!(txn.genesis_hash, [0x22; 32]);
        assert_eq!(txn.payment.receiver, [0x33; 32]);
        assert_eq!(txn.payment.amount, 5_000_000);
        // Untouched fields stay zeroed
        assert_eq!(txn.payment.close, [0u8; 32]);
        assert_eq!(txn.note_len, 0);
    }

    #[test]
    fn unknown_key_fails_naming_it() {
        let mut doc = payment_doc();
        doc[0] = FIXMAP_0 + 10;
        push_str(&mut doc, "xyz");
        push_uint(&mut doc, 1);

        let mut txn = Txn::default();
        let err = tx_decode(&doc, &mut txn).unwrap_err();
        match err {
            DecodeError::UnknownField { key, table } => {
                assert_eq!(key.as_bytes(), b"xyz");
                assert_eq!(table, KeyTable::Txn);
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
        assert_eq!(err.render().as_str(), "unknown field xyz");
    }

    #[test]
    fn truncated_uint_payload_fails() {
        // "fee" declared as uint16 but only one data byte follows
        let mut doc = vec![FIXMAP_0 + 1];
        push_str(&mut doc, "fee");
        doc.push(UINT16);
        doc.push(0x03);

        let mut txn = Txn::default();
        assert_eq!(tx_decode(&doc, &mut txn), Err(DecodeError::Truncated));
    }

    #[test]
    fn oversize_unit_name_fails_with_overflow() {
        let mut doc = vec![FIXMAP_0 + 1];
        push_str(&mut doc, "apar");
        doc.push(FIXMAP_0 + 1);
        push_str(&mut doc, "un");
        push_str(&mut doc, "TOOLONGXY"); // 9 > 8

        let mut txn = Txn::default();
        assert_eq!(
            tx_decode(&doc, &mut txn),
            Err(DecodeError::Overflow {
                len: 9,
                cap: 8,
                kind: OverflowKind::Str
            })
        );
    }

    #[test]
    fn missing_type_yields_untyped_record() {
        let mut doc = vec![FIXMAP_0 + 2];
        push_str(&mut doc, "fee");
        push_uint(&mut doc, 1000);
        push_str(&mut doc, "snd");
        push_bin(&mut doc, &[0x11; 32]);

        let mut txn = Txn::default();
        tx_decode(&doc, &mut txn).unwrap();
        assert_eq!(txn.tx_type, TxType::Unknown);
        assert!(txn.payload().is_none());
        assert_eq!(txn.type_name(), "Unknown");
    }

    #[test]
    fn unknown_type_literal_fails() {
        let mut doc = vec![FIXMAP_0 + 1];
        push_str(&mut doc, "type");
        push_str(&mut doc, "stake");

        let mut txn = Txn::default();
        let err = tx_decode(&doc, &mut txn).unwrap_err();
        match err {
            DecodeError::UnknownField { key, table } => {
                assert_eq!(key.as_bytes(), b"stake");
                assert_eq!(table, KeyTable::TxType);
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn all_type_literals_map() {
        for (literal, expect) in [
            ("pay", TxType::Payment),
            ("keyreg", TxType::Keyreg),
            ("axfer", TxType::AssetXfer),
            ("afrz", TxType::AssetFreeze),
            ("acfg", TxType::AssetConfig),
        ] {
            let mut doc = vec![FIXMAP_0 + 1];
            push_str(&mut doc, "type");
            push_str(&mut doc, literal);
            let mut txn = Txn::default();
            tx_decode(&doc, &mut txn).unwrap();
            assert_eq!(txn.tx_type, expect);
        }
    }

    #[test]
    fn decode_is_idempotent() {
        let doc = payment_doc();
        let mut a = Txn::default();
        let mut b = Txn::default();
        tx_decode(&doc, &mut a).unwrap();
        tx_decode(&doc, &mut b).unwrap();
        assert_eq!(a, b);

        // Re-decoding into an already populated record gives the same
        // result: the record is fully zeroed first.
        tx_decode(&doc, &mut a).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn account_id_survives_decode() {
        let mut txn = Txn::default();
        txn.account_id = 42;
        tx_decode(&payment_doc(), &mut txn).unwrap();
        assert_eq!(txn.account_id, 42);
    }

    #[test]
    fn mixed_shape_fields_are_accepted() {
        // The field groups are plain storage, not a real union: a payment
        // carrying a keyreg field decodes fine and the keyreg group just
        // holds a value nothing will read. Intentional relaxation.
        let mut doc = payment_doc();
        doc[0] = FIXMAP_0 + 10;
        push_str(&mut doc, "votekey");
        push_bin(&mut doc, &[0x44; 32]);

        let mut txn = Txn::default();
        tx_decode(&doc, &mut txn).unwrap();
        assert_eq!(txn.tx_type, TxType::Payment);
        assert_eq!(txn.keyreg.votepk, [0x44; 32]);
        assert!(matches!(txn.payload(), Some(Payload::Payment(_))));
    }

    #[test]
    fn keyreg_fields_decode() {
        let mut doc = vec![FIXMAP_0 + 7];
        push_str(&mut doc, "type");
        push_str(&mut doc, "keyreg");
        push_str(&mut doc, "votekey");
        push_bin(&mut doc, &[0x01; 32]);
        push_str(&mut doc, "selkey");
        push_bin(&mut doc, &[0x02; 32]);
        push_str(&mut doc, "votefst");
        push_uint(&mut doc, 1000);
        push_str(&mut doc, "votelst");
        push_uint(&mut doc, 3_000_000);
        push_str(&mut doc, "votekd");
        push_uint(&mut doc, 10_000);
        push_str(&mut doc, "nonpart");
        doc.push(BOOL_TRUE);

        let mut txn = Txn::default();
        tx_decode(&doc, &mut txn).unwrap();
        assert_eq!(txn.tx_type, TxType::Keyreg);
        assert_eq!(txn.keyreg.votepk, [0x01; 32]);
        assert_eq!(txn.keyreg.vrfpk, [0x02; 32]);
        assert_eq!(txn.keyreg.vote_first, 1000);
        assert_eq!(txn.keyreg.vote_last, 3_000_000);
        assert_eq!(txn.keyreg.key_dilution, 10_000);
        assert!(txn.keyreg.nonpart);
    }

    #[test]
    fn asset_config_with_full_params() {
        let mut doc = vec![FIXMAP_0 + 3];
        push_str(&mut doc, "type");
        push_str(&mut doc, "acfg");
        push_str(&mut doc, "caid");
        push_uint(&mut doc, 1234);
        push_str(&mut doc, "apar");
        doc.push(FIXMAP_0 + 11);
        push_str(&mut doc, "t");
        push_uint(&mut doc, 1_000_000);
        push_str(&mut doc, "dc");
        push_uint(&mut doc, 6);
        push_str(&mut doc, "df");
        doc.push(BOOL_TRUE);
        push_str(&mut doc, "un");
        push_str(&mut doc, "USDT");
        push_str(&mut doc, "an");
        push_str(&mut doc, "Tether");
        push_str(&mut doc, "au");
        push_str(&mut doc, "https://tether.to");
        push_str(&mut doc, "am");
        push_bin(&mut doc, &[0x0a; 32]);
        push_str(&mut doc, "m");
        push_bin(&mut doc, &[0x0b; 32]);
        push_str(&mut doc, "r");
        push_bin(&mut doc, &[0x0c; 32]);
        push_str(&mut doc, "f");
        push_bin(&mut doc, &[0x0d; 32]);
        push_str(&mut doc, "c");
        push_bin(&mut doc, &[0x0e; 32]);

        let mut txn = Txn::default();
        tx_decode(&doc, &mut txn).unwrap();
        assert_eq!(txn.tx_type, TxType::AssetConfig);
        assert_eq!(txn.asset_config.id, 1234);
        let p = &txn.asset_config.params;
        assert_eq!(p.total, 1_000_000);
        assert_eq!(p.decimals, 6);
        assert!(p.default_frozen);
        assert_eq!(str_bytes(&p.unit_name), b"USDT");
        assert_eq!(str_bytes(&p.asset_name), b"Tether");
        assert_eq!(str_bytes(&p.url), b"https://tether.to");
        assert_eq!(p.metadata_hash, [0x0a; 32]);
        assert_eq!(p.manager, [0x0b; 32]);
        assert_eq!(p.reserve, [0x0c; 32]);
        assert_eq!(p.freeze, [0x0d; 32]);
        assert_eq!(p.clawback, [0x0e; 32]);
    }

    #[test]
    fn unknown_params_key_fails() {
        let mut doc = vec![FIXMAP_0 + 1];
        push_str(&mut doc, "apar");
        doc.push(FIXMAP_0 + 1);
        push_str(&mut doc, "zz");
        push_uint(&mut doc, 1);

        let mut txn = Txn::default();
        let err = tx_decode(&doc, &mut txn).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownField {
                table: KeyTable::AssetParams,
                ..
            }
        ));
        assert_eq!(err.render().as_str(), "unknown params field zz");
    }

    #[test]
    fn nested_failure_aborts_whole_decode() {
        // Params map truncated mid-value
        let mut doc = vec![FIXMAP_0 + 1];
        push_str(&mut doc, "apar");
        doc.push(FIXMAP_0 + 1);
        push_str(&mut doc, "t");
        doc.push(UINT32);
        doc.push(0x00); // three bytes short

        let mut txn = Txn::default();
        assert_eq!(tx_decode(&doc, &mut txn), Err(DecodeError::Truncated));
    }

    #[test]
    fn wrong_top_level_tag_fails() {
        // An array tag where a map is required
        let mut txn = Txn::default();
        let err = tx_decode(&[0x92], &mut txn).unwrap_err();
        assert!(matches!(err, DecodeError::WrongType { found: 0x92, .. }));
    }

    #[test]
    fn empty_input_is_truncated() {
        let mut txn = Txn::default();
        assert_eq!(tx_decode(&[], &mut txn), Err(DecodeError::Truncated));
    }

    #[test]
    fn wrong_value_type_for_field_fails() {
        // "fee" carrying a string
        let mut doc = vec![FIXMAP_0 + 1];
        push_str(&mut doc, "fee");
        push_str(&mut doc, "1000");

        let mut txn = Txn::default();
        let err = tx_decode(&doc, &mut txn).unwrap_err();
        assert!(matches!(err, DecodeError::WrongType { found: 0xa4, .. }));
    }

    #[test]
    fn note_at_max_capacity_decodes() {
        let mut doc = vec![FIXMAP_0 + 1];
        push_str(&mut doc, "note");
        doc.push(crate::msgpack::BIN16);
        doc.extend_from_slice(&1024u16.to_be_bytes());
        doc.extend_from_slice(&[0x77; 1024]);

        let mut txn = Txn::default();
        tx_decode(&doc, &mut txn).unwrap();
        assert_eq!(txn.note_len, 1024);
        assert_eq!(txn.note[1023], 0x77);
    }

    #[test]
    fn duplicate_key_last_wins() {
        let mut doc = vec![FIXMAP_0 + 2];
        push_str(&mut doc, "fee");
        push_uint(&mut doc, 1000);
        push_str(&mut doc, "fee");
        push_uint(&mut doc, 2000);

        let mut txn = Txn::default();
        tx_decode(&doc, &mut txn).unwrap();
        assert_eq!(txn.fee, 2000);
    }
}
