//! Merkleization ("hash tree root") of SSZ values.
//!
//! Every value is split into 32-byte chunks which form the leaves of a binary Merkle tree. The
//! tree is padded with zero chunks to a power of two (or to the capacity implied by a list limit)
//! and hashed with SHA-256. Lists and bitlists mix their length into the root.

#[macro_use]
extern crate lazy_static;

mod impls;
mod merkle_hasher;
mod merkleize_padded;

pub use impls::{chunk_count, hash_tree_root, packed_encoding, packing_factor, tree_hash_type};
pub use merkle_hasher::{Error as MerkleHasherError, MerkleHasher};
pub use merkleize_padded::merkleize_padded;

use ethereum_hashing::{hash32_concat, hash_fixed};
use ssz_codec::{EncodeError, ValueError};

pub const BYTES_PER_CHUNK: usize = 32;
pub const HASHSIZE: usize = 32;
pub const MERKLE_HASH_CHUNK: usize = 2 * BYTES_PER_CHUNK;
/// The deepest tree (counted in levels of hashing) that can be built over `usize` leaf indices.
pub const MAX_TREE_DEPTH: usize = usize::BITS as usize - 1;
/// The largest number of leaves a tree may hold.
pub const MAX_LEAVES: usize = 1 << MAX_TREE_DEPTH;

/// The tallest zero subtree: `2^64` leaves, the padded size of a `usize::MAX` chunk limit.
const MAX_ZERO_HASH_HEIGHT: usize = usize::BITS as usize;

pub type Hash256 = ethereum_types::H256;

lazy_static! {
    /// Cached zero hashes where `ZERO_HASHES[i]` is the root of a Merkle tree with `2^i` zero
    /// leaves.
    static ref ZERO_HASHES: Vec<[u8; HASHSIZE]> = {
        let mut hashes = vec![[0; HASHSIZE]; MAX_ZERO_HASH_HEIGHT + 1];

        for i in 0..MAX_ZERO_HASH_HEIGHT {
            hashes[i + 1] = hash32_concat(&hashes[i], &hashes[i]);
        }

        hashes
    };
}

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// The value does not conform to its shape, or exceeds a list limit.
    Value(ValueError),
    /// A basic value could not be serialized for packing.
    Encode(EncodeError),
    MerkleHasher(MerkleHasherError),
}

impl From<ValueError> for Error {
    fn from(e: ValueError) -> Self {
        Error::Value(e)
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        match e {
            EncodeError::Value(e) => Error::Value(e),
            e => Error::Encode(e),
        }
    }
}

impl From<MerkleHasherError> for Error {
    fn from(e: MerkleHasherError) -> Self {
        Error::MerkleHasher(e)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TreeHashType {
    Basic,
    Vector,
    List,
    Container,
}

/// Convenience method for `MerkleHasher` which also provides some fast-paths for small trees.
///
/// `minimum_leaf_count` will only be used if it is greater than or equal to the minimum number of
/// leaves that can be created from `bytes`.
pub fn merkle_root(bytes: &[u8], minimum_leaf_count: usize) -> Result<Hash256, Error> {
    let leaves = std::cmp::max(
        (bytes.len() + (HASHSIZE - 1)) / HASHSIZE,
        minimum_leaf_count,
    );

    if leaves == 0 {
        // If there are no bytes then the hash is always zero.
        Ok(Hash256::zero())
    } else if leaves == 1 {
        // If there is only one leaf, the hash is always those leaf bytes padded out to 32-bytes.
        let mut hash = [0; HASHSIZE];
        hash[0..bytes.len()].copy_from_slice(bytes);
        Ok(Hash256::from_slice(&hash))
    } else if leaves == 2 {
        // Two leaves are common (e.g. BLS pubkeys), so skip the `MerkleHasher` overhead.
        let mut leaves = [0; MERKLE_HASH_CHUNK];
        leaves[0..bytes.len()].copy_from_slice(bytes);

        Ok(Hash256::from_slice(&hash_fixed(&leaves)))
    } else {
        let mut hasher = MerkleHasher::with_leaves(leaves)?;
        hasher.write(bytes)?;
        Ok(hasher.finish()?)
    }
}

/// Returns the node created by hashing `root` and `length`.
///
/// Used for inserting the length of a list or bitlist above its root.
pub fn mix_in_length(root: &Hash256, length: usize) -> Hash256 {
    let usize_len = std::mem::size_of::<usize>();

    let mut length_bytes = [0; BYTES_PER_CHUNK];
    length_bytes[0..usize_len].copy_from_slice(&length.to_le_bytes());

    Hash256::from_slice(&hash32_concat(root.as_bytes(), &length_bytes)[..])
}

/// Returns the number of hashing levels above `chunks` leaves once they are padded to a power of
/// two. Zero or one chunk has a depth of zero.
pub fn tree_depth_for_chunks(chunks: usize) -> usize {
    match chunks.checked_next_power_of_two() {
        Some(leaves) => leaves.trailing_zeros() as usize,
        None => usize::BITS as usize,
    }
}

/// Returns the root of a tree of `2^height` zero chunks.
///
/// Every height returned by `tree_depth_for_chunks` is covered; taller heights are clamped.
pub fn get_zero_hash(height: usize) -> &'static [u8] {
    &ZERO_HASHES[std::cmp::min(height, MAX_ZERO_HASH_HEIGHT)]
}
