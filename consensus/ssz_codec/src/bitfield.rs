use crate::{DecodeError, BITS_PER_BYTE};
use smallvec::{smallvec, SmallVec};

/// Most bitfields in consensus objects (aggregation bits, justification bits) fit in 32 bytes.
type SmallVec32<T> = SmallVec<[T; 32]>;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// The bit at index `i` does not exist in a bitfield of length `len`.
    OutOfBounds { i: usize, len: usize },
}

/// A length-tagged sequence of bits, stored least-significant-bit first.
///
/// The same type backs both `Bitvector` and `Bitlist` values; the shape decides whether a
/// delimiter bit is written. All bits at index `>= len` are kept at zero, so two bitfields with
/// the same bits always compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitfield {
    bytes: SmallVec32<u8>,
    len: usize,
}

fn bytes_for_bit_len(bit_len: usize) -> usize {
    (bit_len + BITS_PER_BYTE - 1) / BITS_PER_BYTE
}

impl Bitfield {
    /// Instantiate a bitfield of `len` bits, all set to `false`.
    pub fn with_len(len: usize) -> Self {
        Self {
            bytes: smallvec![0; bytes_for_bit_len(len)],
            len,
        }
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        bits.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the value of the `i`'th bit, or an error if `i` is out of bounds.
    pub fn get(&self, i: usize) -> Result<bool, Error> {
        if i < self.len {
            let byte = self.bytes[i / BITS_PER_BYTE];
            Ok(byte & (1 << (i % BITS_PER_BYTE)) != 0)
        } else {
            Err(Error::OutOfBounds { i, len: self.len })
        }
    }

    /// Sets the `i`'th bit to `value`, or returns an error if `i` is out of bounds.
    pub fn set(&mut self, i: usize, value: bool) -> Result<(), Error> {
        if i >= self.len {
            return Err(Error::OutOfBounds { i, len: self.len });
        }

        let byte = &mut self.bytes[i / BITS_PER_BYTE];
        let mask = 1 << (i % BITS_PER_BYTE);
        if value {
            *byte |= mask
        } else {
            *byte &= !mask
        }

        Ok(())
    }

    pub fn iter(&self) -> BitIter<'_> {
        BitIter {
            bitfield: self,
            i: 0,
        }
    }

    pub fn num_set_bits(&self) -> usize {
        self.bytes
            .iter()
            .map(|byte| byte.count_ones() as usize)
            .sum()
    }

    /// Returns the index of the highest set bit, or `None` if no bits are set.
    pub fn highest_set_bit(&self) -> Option<usize> {
        self.bytes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, byte)| **byte > 0)
            .map(|(i, byte)| i * BITS_PER_BYTE + 7 - byte.leading_zeros() as usize)
    }

    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|byte| *byte == 0)
    }

    /// The data bits packed into `ceil(len / 8)` bytes, with no delimiter.
    ///
    /// This is the `Bitvector` encoding and the input to Merkleization for both bitfield kinds.
    pub fn as_raw_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the `Bitlist` encoding: the data bits followed by a single delimiter bit at index
    /// `len`.
    pub fn to_bitlist_bytes(&self) -> Vec<u8> {
        let mut bytes = self.bytes.to_vec();
        bytes.resize(self.len / BITS_PER_BYTE + 1, 0);
        if let Some(last) = bytes.last_mut() {
            *last |= 1 << (self.len % BITS_PER_BYTE);
        }
        bytes
    }

    /// Decodes a `Bitlist` whose length may not exceed `max_len`.
    ///
    /// The length is given by the highest set bit of the last byte, which is the delimiter.
    pub fn from_bitlist_bytes(bytes: &[u8], max_len: usize) -> Result<Self, DecodeError> {
        let last_byte = *bytes.last().ok_or(DecodeError::EmptyBitlist)?;

        // A zero final byte means the delimiter is either absent or in an earlier byte, which
        // would make this byte pure padding.
        if last_byte == 0 {
            return Err(DecodeError::InvalidPadding);
        }

        let delimiter = 7 - last_byte.leading_zeros() as usize;
        let len = (bytes.len() - 1) * BITS_PER_BYTE + delimiter;

        if len > max_len {
            return Err(DecodeError::LimitExceeded { len, max_len });
        }

        let mut bytes: SmallVec32<u8> = SmallVec::from_slice(bytes);
        if let Some(last) = bytes.last_mut() {
            *last &= !(1 << delimiter);
        }
        bytes.truncate(bytes_for_bit_len(len));

        Ok(Self { bytes, len })
    }

    /// Decodes a `Bitvector` of exactly `len` bits.
    pub fn from_bitvector_bytes(bytes: &[u8], len: usize) -> Result<Self, DecodeError> {
        let expected = bytes_for_bit_len(len);
        if bytes.len() != expected {
            return Err(DecodeError::WrongLength {
                len: bytes.len(),
                expected,
            });
        }

        let bitfield = Self {
            bytes: SmallVec::from_slice(bytes),
            len,
        };

        if bitfield.has_excess_bits() {
            Err(DecodeError::InvalidPadding)
        } else {
            Ok(bitfield)
        }
    }

    fn has_excess_bits(&self) -> bool {
        match (self.bytes.last(), self.len % BITS_PER_BYTE) {
            (Some(last), used) if used > 0 => last >> used != 0,
            _ => false,
        }
    }
}

impl FromIterator<bool> for Bitfield {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bytes = SmallVec32::new();
        let mut len = 0;
        for bit in iter {
            if len % BITS_PER_BYTE == 0 {
                bytes.push(0);
            }
            if bit {
                if let Some(last) = bytes.last_mut() {
                    *last |= 1 << (len % BITS_PER_BYTE);
                }
            }
            len += 1;
        }
        Self { bytes, len }
    }
}

/// Iterator over the bits of a `Bitfield`, lowest index first.
pub struct BitIter<'a> {
    bitfield: &'a Bitfield,
    i: usize,
}

impl<'a> Iterator for BitIter<'a> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        let res = self.bitfield.get(self.i).ok()?;
        self.i += 1;
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bitfield.len().saturating_sub(self.i);
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for BitIter<'a> {}
