//! SSZ shapes of the Ethereum consensus containers, sized by a `Preset`.
//!
//! The shapes are plain `ssz_codec::SszType` values, so any container can be encoded, decoded
//! and merkleized without a dedicated Rust struct.

pub mod phase0;
pub mod preset;

pub use phase0::type_by_name;
pub use preset::{Preset, PresetName, DEPOSIT_CONTRACT_TREE_DEPTH, JUSTIFICATION_BITS_LENGTH};
