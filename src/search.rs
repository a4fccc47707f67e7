//! Collectors for top-k results, with optional diversification
//! (at most one document per group, e.g. per parent document)

use std::fmt::Debug;
use std::hash::Hash;

use derivative::Derivative;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    base::{DocId, Distance, Len},
    bitset::FixedBitSet,
    heap::{GroupedMaxHeap, HeapEntry},
};

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredDocument {
    pub docid: DocId,
    pub score: Distance,
}

impl std::fmt::Display for ScoredDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.docid, self.score)
    }
}

#[derive(Derivative, Clone, Debug, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default)]
pub struct CollectorOptions {
    /// Number of documents to retrieve
    #[derivative(Default(value = "10"))]
    pub top_k: usize,

    /// Scores are similarities (the larger, the better) rather
    /// than distances
    #[derivative(Default(value = "false"))]
    pub larger_is_better: bool,
}

impl CollectorOptions {
    /// Maps a score to a heap key, where the worst document has the
    /// largest key
    #[inline]
    fn key(&self, score: Distance) -> Distance {
        if self.larger_is_better {
            -score
        } else {
            score
        }
    }

    /// Inverse of [`Self::key`]
    #[inline]
    fn score(&self, key: Distance) -> Distance {
        self.key(key)
    }

    fn worst_score(&self) -> Distance {
        if self.larger_is_better {
            Distance::NEG_INFINITY
        } else {
            Distance::INFINITY
        }
    }

    fn to_document<G>(&self, entry: &HeapEntry<G>) -> ScoredDocument {
        ScoredDocument {
            docid: entry.id,
            score: self.score(entry.score),
        }
    }
}

/// Keeps the top-k documents
pub struct TopScoredDocuments {
    heap: GroupedMaxHeap<DocId>,
    options: CollectorOptions,
}

impl TopScoredDocuments {
    pub fn new(options: &CollectorOptions) -> Self {
        Self {
            heap: GroupedMaxHeap::new(options.top_k),
            options: options.clone(),
        }
    }

    /// Add a new candidate, and returns the score a candidate should
    /// beat to enter the top-k
    pub fn add(&mut self, candidate: DocId, score: Distance) -> Distance {
        if score.is_nan() {
            debug!("Ignoring document {} with a NaN score", candidate);
            return self.threshold();
        }

        let key = self.options.key(score);
        if !self.heap.is_full() {
            self.heap.push(key, candidate, None);
        } else if self.heap.top().map_or(false, |top| key < top.score) {
            self.heap.replace_top(key, candidate, None);
        }

        self.threshold()
    }

    /// The worst retained score if the top-k is complete,
    /// otherwise the worst possible score
    pub fn threshold(&self) -> Distance {
        match self.heap.top() {
            Some(top) if self.heap.is_full() => self.options.score(top.score),
            _ => self.options.worst_score(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the documents, best first
    pub fn into_sorted_vec(self) -> Vec<ScoredDocument> {
        let options = self.options;
        self.heap
            .into_sorted_vec()
            .iter()
            .map(|entry| options.to_document(entry))
            .collect()
    }
}

/// Keeps the top-k documents, with at most one document per group
pub struct TopGroupedDocuments<G = DocId> {
    heap: GroupedMaxHeap<G>,
    options: CollectorOptions,
}

impl<G: Hash + Eq + Clone + Debug> TopGroupedDocuments<G> {
    pub fn new(options: &CollectorOptions) -> Self {
        Self {
            heap: GroupedMaxHeap::new(options.top_k),
            options: options.clone(),
        }
    }

    /// Add a new candidate belonging to `group`, and returns the score
    /// a candidate from a new group should beat to enter the top-k
    pub fn add(&mut self, candidate: DocId, score: Distance, group: G) -> Distance {
        if score.is_nan() {
            debug!("Ignoring document {} with a NaN score", candidate);
            return self.threshold();
        }

        let key = self.options.key(score);

        match self.heap.group_score(&group) {
            Some(current) => {
                if key < current {
                    debug!("Document {} replaces its group {:?} entry", candidate, group);
                    self.heap.update(key, candidate, group);
                }
            }
            None => {
                if !self.heap.is_full() {
                    self.heap.push(key, candidate, Some(group));
                } else if self.heap.top().map_or(false, |top| key < top.score) {
                    self.heap.replace_top(key, candidate, Some(group));
                }
            }
        }

        self.threshold()
    }

    /// The worst retained score if the top-k is complete,
    /// otherwise the worst possible score
    pub fn threshold(&self) -> Distance {
        match self.heap.top() {
            Some(top) if self.heap.is_full() => self.options.score(top.score),
            _ => self.options.worst_score(),
        }
    }

    /// Document currently retained for the group
    pub fn get(&self, group: &G) -> Option<ScoredDocument> {
        let docid = self.heap.group_id(group)?;
        let key = self.heap.group_score(group)?;
        Some(ScoredDocument {
            docid,
            score: self.options.score(key),
        })
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the documents, best first
    pub fn into_sorted_vec(self) -> Vec<ScoredDocument> {
        self.into_sorted_groups()
            .into_iter()
            .map(|(_, document)| document)
            .collect()
    }

    /// Returns the documents together with their group, best first
    pub fn into_sorted_groups(self) -> Vec<(G, ScoredDocument)> {
        let options = self.options;
        self.heap
            .into_sorted_vec()
            .into_iter()
            .filter_map(|entry| {
                let document = options.to_document(&entry);
                entry.group.map(|group| (group, document))
            })
            .collect()
    }
}

/// Group of a document: its parent, or itself when it has no parent
#[inline]
fn parent_group(parents: &FixedBitSet, doc_id: DocId) -> DocId {
    match parents.parent_of(doc_id) {
        Some(parent) => parent,
        None => {
            debug!("Document {} has no parent, using it as its own group", doc_id);
            doc_id
        }
    }
}

/// Returns the best child document of the top-k parent documents
///
/// Candidates are (child document, score) pairs, and their parent is
/// found with the parent bitset.
pub fn search_nested<I>(
    parents: &FixedBitSet,
    candidates: I,
    options: &CollectorOptions,
) -> Vec<ScoredDocument>
where
    I: IntoIterator<Item = (DocId, Distance)>,
{
    let mut results = TopGroupedDocuments::<DocId>::new(options);
    for (doc_id, score) in candidates {
        results.add(doc_id, score, parent_group(parents, doc_id));
    }
    results.into_sorted_vec()
}

/// Exact search restricted to the documents of `filter`, returning
/// the best child document of the top-k parent documents
pub fn search_nested_filtered<F>(
    parents: &FixedBitSet,
    filter: &FixedBitSet,
    mut score_fn: F,
    options: &CollectorOptions,
) -> Vec<ScoredDocument>
where
    F: FnMut(DocId) -> Distance,
{
    debug!(
        "Exact nested search over {} filtered documents ({} parents)",
        filter.cardinality(),
        parents.cardinality()
    );
    search_nested(
        parents,
        filter.iter().map(|doc_id| (doc_id, score_fn(doc_id))),
        options,
    )
}
