pub type DocId = u64;
pub type Distance = f32;
pub type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Returned by iteration methods when there are no more documents
/// (same value as Lucene's `DocIdSetIterator.NO_MORE_DOCS`)
pub const NO_MORE_DOCS: DocId = i32::MAX as DocId;

/// Marks object that have a length
pub trait Len {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
