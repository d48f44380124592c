//! Builds, unpacks, and decompiles Kobo e-reader dictionary archives
//! (dictzips): a ZIP container of gzip-compressed (optionally
//! AES-128/192/256-ECB-encrypted) per-prefix HTML shards, flat raw resource
//! files, and a MARISA trie word index.
//!
//! A typical build goes: parse a dictfile ([`dictfile::parse_dict_file`]),
//! hand it to [`pipeline::build_dictzip`] (which validates, shards by word
//! prefix, renders each shard's HTML, and writes the container). Reading
//! one back goes through [`container::Reader`]; [`decompile::decompile`]
//! recovers an approximate dictfile from a reader's decompressed shards.

pub mod container;
pub mod crypt;
pub mod decompile;
pub mod dictfile;
pub mod emitter;
pub mod error;
pub mod fs;
pub mod image;
pub mod pipeline;
pub mod prefix;
pub mod shard;
pub mod trie;
pub mod validate;

pub use error::{DictzipError, Result};
