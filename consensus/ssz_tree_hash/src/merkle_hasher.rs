use crate::{get_zero_hash, Hash256, HASHSIZE, MAX_LEAVES};
use ethereum_hashing::{Context, Sha256Context, HASH_LEN};
use smallvec::SmallVec;

type SmallVec8<T> = SmallVec<[T; 8]>;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// More leaves were written than the tree can hold.
    MaximumLeavesExceeded { max_leaves: usize },
    /// The requested number of leaves is larger than `MAX_LEAVES`.
    TreeTooDeep { num_leaves: usize },
}

/// The value of a node: either a digest we computed or a 32-byte slice borrowed from the input
/// (a leaf, or a zero hash).
enum Preimage<'a> {
    Digest([u8; HASH_LEN]),
    Slice(&'a [u8]),
}

impl<'a> Preimage<'a> {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Preimage::Digest(digest) => digest.as_ref(),
            Preimage::Slice(slice) => slice,
        }
    }
}

/// A parent whose left child is known (and already fed to the hasher) but whose right child is
/// not.
struct HalfNode {
    context: Context,
    /// Generalized index: the root is `1` and the children of `i` are `2i` and `2i + 1`.
    id: usize,
}

impl HalfNode {
    fn new(id: usize, left: Preimage) -> Self {
        let mut context = Context::new();
        context.update(left.as_bytes());

        Self { context, id }
    }

    fn finish(mut self, right: Preimage) -> [u8; HASH_LEN] {
        self.context.update(right.as_bytes());
        self.context.finalize()
    }
}

/// Streams bytes into a fixed-capacity binary Merkle tree and returns its root.
///
/// Leaves that are never written are treated as `[0; 32]`. The tree is folded as soon as both
/// children of a node are known, so memory use is one `HalfNode` per level rather than one chunk
/// per leaf. Consider a tree of depth three after the first three leaves have been written:
///
/// ```ignore
///           1
///          / \
///         X   3
///        / \ / \
///       L  L L  -
/// ```
///
/// `L` leaves were hashed and dropped, node `X` was completed and absorbed into node `1`, and
/// nodes `1` and `3` are the half nodes still waiting for their right child. `finish` supplies
/// the missing right children from the zero-hash table.
pub struct MerkleHasher {
    /// Half nodes ordered from the top of the tree downward.
    ///
    /// Eight inline slots cover trees of up to 256 leaves without allocating.
    half_nodes: SmallVec8<HalfNode>,
    /// The number of levels, counting the leaves. A tree with one leaf has a depth of one.
    depth: usize,
    /// The generalized index of the next leaf to be written.
    next_leaf: usize,
    /// Bytes written that do not yet fill a whole leaf.
    buffer: SmallVec<[u8; HASHSIZE]>,
    /// Set once the root of the tree is known.
    root: Option<Hash256>,
}

fn get_parent(i: usize) -> usize {
    i / 2
}

/// The level of the node with generalized index `i`, where the root is at level zero.
///
/// It is a logic error to provide `i == 0`.
fn get_depth(i: usize) -> usize {
    usize::BITS as usize - i.leading_zeros() as usize - 1
}

impl MerkleHasher {
    /// Instantiate a hasher for a tree with at least `num_leaves` leaves.
    ///
    /// `num_leaves` is rounded up to the next power of two. A `num_leaves` of zero creates a tree
    /// with a single leaf, which has a root of `[0; 32]` if nothing is written.
    pub fn with_leaves(num_leaves: usize) -> Result<Self, Error> {
        if num_leaves > MAX_LEAVES {
            return Err(Error::TreeTooDeep { num_leaves });
        }

        let depth = get_depth(num_leaves.next_power_of_two()) + 1;
        Ok(Self::with_depth(depth))
    }

    /// Instantiates a hasher for a tree with `depth` levels, i.e. `1 << (depth - 1)` leaves.
    ///
    /// `depth` must be in `1..=MAX_TREE_DEPTH + 1`.
    fn with_depth(depth: usize) -> Self {
        Self {
            half_nodes: SmallVec::with_capacity(depth - 1),
            depth,
            next_leaf: 1 << (depth - 1),
            buffer: SmallVec::new(),
            root: None,
        }
    }

    /// The number of leaves the tree can hold.
    pub fn max_leaves(&self) -> usize {
        1 << (self.depth - 1)
    }

    /// Write some bytes to the hasher. The bytes need not be aligned to leaf boundaries.
    ///
    /// ## Errors
    ///
    /// Returns an error if the bytes would overflow the leaves of the tree.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let mut remaining = bytes;

        // Top up a partially filled leaf first.
        if !self.buffer.is_empty() {
            let required = HASHSIZE - self.buffer.len();
            if remaining.len() < required {
                self.buffer.extend_from_slice(remaining);
                return Ok(());
            }

            let (head, tail) = remaining.split_at(required);
            let mut leaf = [0; HASHSIZE];
            leaf[..self.buffer.len()].copy_from_slice(&self.buffer);
            leaf[self.buffer.len()..].copy_from_slice(head);
            self.buffer.clear();
            self.process_leaf(&leaf)?;

            remaining = tail;
        }

        let mut chunks = remaining.chunks_exact(HASHSIZE);
        for leaf in &mut chunks {
            self.process_leaf(leaf)?;
        }
        self.buffer.extend_from_slice(chunks.remainder());

        Ok(())
    }

    /// Process the next leaf, which must be exactly `HASHSIZE` bytes.
    fn process_leaf(&mut self, leaf: &[u8]) -> Result<(), Error> {
        if self.next_leaf >= 1 << self.depth {
            return Err(Error::MaximumLeavesExceeded {
                max_leaves: self.max_leaves(),
            });
        } else if self.next_leaf == 1 {
            // A tree of depth one has a root that is equal to the first given leaf.
            self.root = Some(Hash256::from_slice(leaf))
        } else if self.next_leaf % 2 == 0 {
            self.process_left_node(self.next_leaf, Preimage::Slice(leaf))
        } else {
            self.process_right_node(self.next_leaf, Preimage::Slice(leaf))
        }

        self.next_leaf += 1;

        Ok(())
    }

    /// Returns the root of the Merkle tree, completing it with zero leaves.
    ///
    /// ## Errors
    ///
    /// Returns an error if the buffered bytes would overflow the leaves of the tree.
    pub fn finish(mut self) -> Result<Hash256, Error> {
        if !self.buffer.is_empty() {
            let mut leaf = [0; HASHSIZE];
            leaf[..self.buffer.len()].copy_from_slice(&self.buffer);
            self.process_leaf(&leaf)?
        }

        loop {
            if let Some(root) = self.root {
                break Ok(root);
            } else if let Some(node) = self.half_nodes.last() {
                let right_child = node.id * 2 + 1;
                self.process_right_node(right_child, self.zero_hash(right_child));
            } else if self.next_leaf == 1 {
                // Only a depth-one tree starts at leaf 1; nothing was written.
                break Ok(Hash256::zero());
            } else {
                // Nothing was written to a deeper tree. Seed it with one zero leaf and let the
                // half-node branch above fold the rest.
                self.process_left_node(self.next_leaf, self.zero_hash(self.next_leaf))
            }
        }
    }

    /// Starts a new half node whose left child is the node `id`.
    fn process_left_node(&mut self, id: usize, preimage: Preimage) {
        self.half_nodes.push(HalfNode::new(get_parent(id), preimage))
    }

    /// Supplies `preimage` as the right child of the parent of `id`, then keeps folding upward
    /// while the newly completed node is itself the right child of a waiting half node.
    ///
    /// ```ignore
    ///           1 <-- completed
    ///          / \
    ///         2   3  <-- completed
    ///        / \ / \
    ///       4  5 6  7 <-- supplied right node
    /// ```
    fn process_right_node(&mut self, id: usize, mut preimage: Preimage) {
        let mut parent = get_parent(id);

        loop {
            match self.half_nodes.pop() {
                Some(node) if node.id == parent => {
                    preimage = Preimage::Digest(node.finish(preimage));
                    if parent == 1 {
                        self.root = Some(Hash256::from_slice(preimage.as_bytes()));
                        break;
                    }
                    parent = get_parent(parent);
                }
                other => {
                    self.half_nodes.extend(other);
                    self.half_nodes.push(HalfNode::new(parent, preimage));
                    break;
                }
            }
        }
    }

    /// The root of an all-zero subtree rooted at node `id`.
    fn zero_hash(&self, id: usize) -> Preimage<'static> {
        Preimage::Slice(get_zero_hash(self.depth - (get_depth(id) + 1)))
    }
}
