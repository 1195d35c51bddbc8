use crate::{get_zero_hash, tree_depth_for_chunks, Hash256, BYTES_PER_CHUNK, MERKLE_HASH_CHUNK};
use ethereum_hashing::hash32_concat;

/// One level of the tree. Only nodes that have a non-padding descendant are stored; everything
/// to their right is implied by the zero-hash table.
struct Level(Vec<u8>);

impl Level {
    fn from_bytes(bytes: &[u8]) -> Self {
        let chunks = (bytes.len() + BYTES_PER_CHUNK - 1) / BYTES_PER_CHUNK;
        let mut buf = bytes.to_vec();
        buf.resize(chunks * BYTES_PER_CHUNK, 0);
        Self(buf)
    }

    /// Hashes each pair of nodes, pairing a trailing left node with the zero hash at `height`.
    fn parents(&self, height: usize) -> Self {
        let nodes = self
            .0
            .chunks(MERKLE_HASH_CHUNK)
            .flat_map(|pair| {
                if pair.len() == MERKLE_HASH_CHUNK {
                    hash32_concat(&pair[..BYTES_PER_CHUNK], &pair[BYTES_PER_CHUNK..])
                } else {
                    hash32_concat(pair, get_zero_hash(height))
                }
            })
            .collect();

        Self(nodes)
    }
}

/// Merkleizes `bytes` into a tree of at least `min_leaves` leaves, hashing one level at a time.
///
/// This is the straightforward construction: it is slower and uses more memory than
/// `MerkleHasher`, which makes it useful as a reference when testing the streaming hasher.
pub fn merkleize_padded(bytes: &[u8], min_leaves: usize) -> Hash256 {
    let leaves_with_values = (bytes.len() + (BYTES_PER_CHUNK - 1)) / BYTES_PER_CHUNK;
    let height = tree_depth_for_chunks(std::cmp::max(leaves_with_values, min_leaves));

    if leaves_with_values == 0 {
        return Hash256::from_slice(get_zero_hash(height));
    }

    let mut level = Level::from_bytes(bytes);
    for h in 0..height {
        level = level.parents(h);
    }

    Hash256::from_slice(&level.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use ethereum_hashing::hash;

    #[test]
    fn single_chunk_is_padded() {
        let mut expected = [0; 32];
        expected[..3].copy_from_slice(&[1, 2, 3]);
        assert_eq!(merkleize_padded(&[1, 2, 3], 0), Hash256::from(expected));
        assert_eq!(merkleize_padded(&[1, 2, 3], 1), Hash256::from(expected));
    }

    #[test]
    fn empty_input_is_zero_subtree() {
        assert_eq!(merkleize_padded(&[], 0), Hash256::zero());
        for leaves in [2usize, 3, 4, 1024] {
            let height = leaves.next_power_of_two().trailing_zeros() as usize;
            assert_eq!(
                merkleize_padded(&[], leaves).as_bytes(),
                get_zero_hash(height)
            );
        }
    }

    #[test]
    fn three_chunks() {
        let bytes = (0..96).map(|i| i as u8).collect::<Vec<_>>();
        let left = hash(&bytes[0..64]);
        let right = hash32_concat(&bytes[64..96], &[0; 32]);
        let root = hash32_concat(&left, &right);

        assert_eq!(merkleize_padded(&bytes, 0), Hash256::from(root));
        assert_eq!(merkleize_padded(&bytes, 3), Hash256::from(root));

        let wider = hash32_concat(&root, get_zero_hash(2));
        assert_eq!(merkleize_padded(&bytes, 5), Hash256::from(wider));
    }

    #[test]
    fn widest_tree() {
        let widest = usize::MAX;
        assert_eq!(
            merkleize_padded(&[], widest).as_bytes(),
            get_zero_hash(usize::BITS as usize)
        );

        let mut expected = [0; 32];
        expected[0] = 5;
        for height in 0..usize::BITS as usize {
            expected = hash32_concat(&expected, get_zero_hash(height));
        }
        assert_eq!(merkleize_padded(&[5], widest), Hash256::from(expected));
    }

    #[test]
    fn min_leaves_below_chunk_count_is_ignored() {
        let bytes = [9; 200];
        assert_eq!(merkleize_padded(&bytes, 1), merkleize_padded(&bytes, 8));
        assert_ne!(merkleize_padded(&bytes, 8), merkleize_padded(&bytes, 9));
    }
}
