/*****************************************************************************
 *   Ledger App Boilerplate Rust.
 *   (c) 2023 Ledger SAS.
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 *****************************************************************************/

//! Transaction decoding and canonical re-encoding for an Algorand signing
//! device.
//!
//! The host streams a msgpack-encoded transaction to the device; this
//! crate turns that hostile byte slice into a fixed-layout [`Txn`] record
//! (or a bounded diagnostic) without touching a heap, and re-serializes
//! an approved record under the `"TX"` domain tag for signing. Transport
//! reassembly, display pagination and the signature itself live with the
//! device shell, not here.

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod msgpack;
pub mod tx_decoder;
pub mod tx_encoder;
pub mod tx_types;

pub use error::{DecodeError, EncodeError, ErrMsg, Expected, FieldKey, KeyTable, OverflowKind};
pub use tx_decoder::tx_decode;
pub use tx_encoder::{encode_for_signing, tx_encode, SIGN_PREFIX};
pub use tx_types::{
    AssetConfigFields, AssetFreezeFields, AssetParams, AssetXferFields, KeyregFields, Payload,
    PaymentFields, TxType, Txn,
};

/// Largest msgpack document the transport layer will assemble for one
/// decode.
pub const MAX_MSGPACK_LEN: usize = 2048;
