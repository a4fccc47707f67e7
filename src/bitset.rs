//! Parent / child document mapping for nested fields.
//!
//! Nested fields are stored as individual documents with their own doc
//! IDs, and the parent document always comes right after its children:
//!
//! ```text
//! 0, 1, 2, 3 (parent of 0, 1, 2), 4, 5, 6, 7 (parent of 4, 5, 6)
//! ```
//!
//! Setting the bits of the parent documents (here `10001000` read from
//! the right) allows to find the parent of any document with
//! [`FixedBitSet::next_set_bit`].

use log::debug;
use simple_error::SimpleError;

use crate::base::{BoxResult, DocId, Len, NO_MORE_DOCS};

/// Number of bits in a word of the bitmap
const WORD_BITS: DocId = u64::BITS as DocId;

/// A bitset of fixed length, backed by 64 bits words
/// (follows Lucene's `FixedBitSet`)
///
/// With 8 bits words, the IDs 3, 7 and 10 would be stored as
///
/// ```text
///          [0]      [1]
/// bitmap: 10001000 00000100
/// ```
///
/// and `next_set_bit(4)` shifts `bitmap[0]` by 4, counts the trailing
/// zeros of the result (3) and returns 4 + 3.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedBitSet {
    /// Number of addressable bits (a multiple of the word size)
    num_bits: usize,
    words: Vec<u64>,
}

impl FixedBitSet {
    /// Builds the bitset from a list of document IDs
    ///
    /// The IDs need not be sorted, and duplicates are ignored. Fails if
    /// an ID cannot be told apart from [`NO_MORE_DOCS`].
    pub fn new(ids: &[DocId]) -> BoxResult<Self> {
        let max_id = match ids.iter().max() {
            Some(&max_id) => max_id,
            None => {
                return Ok(Self {
                    num_bits: 0,
                    words: Vec::new(),
                })
            }
        };

        if max_id >= NO_MORE_DOCS {
            return Err(Box::new(SimpleError::new(format!(
                "Document ID {} is out of range (should be less than {})",
                max_id, NO_MORE_DOCS
            ))));
        }

        let num_words = (max_id / WORD_BITS) as usize + 1;
        let mut words = vec![0u64; num_words];
        for &id in ids {
            words[(id / WORD_BITS) as usize] |= 1u64 << (id % WORD_BITS);
        }

        debug!(
            "Built a bitset of {} words for {} document IDs (max. {})",
            num_words,
            ids.len(),
            max_id
        );

        Ok(Self {
            num_bits: num_words * (WORD_BITS as usize),
            words,
        })
    }

    /// Returns the index of the first set bit starting at `index`, or
    /// [`NO_MORE_DOCS`] if there are no more set bits
    pub fn next_set_bit(&self, index: DocId) -> DocId {
        let mut word_ix = (index / WORD_BITS) as usize;
        if word_ix >= self.words.len() {
            return NO_MORE_DOCS;
        }

        // Drops the bits before index
        let word = self.words[word_ix] >> (index % WORD_BITS);
        if word != 0 {
            return index + word.trailing_zeros() as DocId;
        }

        word_ix += 1;
        while word_ix < self.words.len() {
            let word = self.words[word_ix];
            if word != 0 {
                return (word_ix as DocId) * WORD_BITS + word.trailing_zeros() as DocId;
            }
            word_ix += 1;
        }

        NO_MORE_DOCS
    }

    /// Returns the parent of a (child) document, i.e. the first parent
    /// at or after its position
    #[inline]
    pub fn parent_of(&self, doc_id: DocId) -> Option<DocId> {
        match self.next_set_bit(doc_id) {
            NO_MORE_DOCS => None,
            parent => Some(parent),
        }
    }

    /// Returns true if the bit is set (false if out of range)
    pub fn get(&self, index: DocId) -> bool {
        match self.words.get((index / WORD_BITS) as usize) {
            Some(word) => (word >> (index % WORD_BITS)) & 1 == 1,
            None => false,
        }
    }

    /// Number of set bits
    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the set bits in increasing order
    pub fn iter(&self) -> BitSetIterator<'_> {
        BitSetIterator {
            bitset: self,
            doc_id: None,
        }
    }
}

impl Len for FixedBitSet {
    fn len(&self) -> usize {
        self.num_bits
    }
}

impl<'a> IntoIterator for &'a FixedBitSet {
    type Item = DocId;
    type IntoIter = BitSetIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Cursor over the set bits of a [`FixedBitSet`]
/// (follows Lucene's `BitSetIterator`)
pub struct BitSetIterator<'a> {
    bitset: &'a FixedBitSet,
    /// Current position (None before the first move)
    doc_id: Option<DocId>,
}

impl BitSetIterator<'_> {
    /// Current document, or None if the iterator has not been moved yet
    pub fn doc_id(&self) -> Option<DocId> {
        self.doc_id
    }

    /// Moves to the first set bit greater or equal to `target`,
    /// returning [`NO_MORE_DOCS`] when exhausted
    pub fn advance(&mut self, target: DocId) -> DocId {
        let doc_id = if target >= NO_MORE_DOCS {
            NO_MORE_DOCS
        } else {
            self.bitset.next_set_bit(target)
        };
        self.doc_id = Some(doc_id);
        doc_id
    }
}

impl Iterator for BitSetIterator<'_> {
    type Item = DocId;

    fn next(&mut self) -> Option<Self::Item> {
        let target = match self.doc_id {
            None => 0,
            Some(NO_MORE_DOCS) => return None,
            Some(doc_id) => doc_id + 1,
        };

        match self.advance(target) {
            NO_MORE_DOCS => None,
            doc_id => Some(doc_id),
        }
    }
}
