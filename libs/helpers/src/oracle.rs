//! Brute-force results used to check the collectors

use std::collections::HashMap;

use knn_extension::{
    base::{DocId, Distance},
    search::ScoredDocument,
};

use crate::documents::NestedSegment;

/// Best child of the top-k parents, computed by sorting
pub fn expected_nested(
    segment: &NestedSegment,
    candidates: &[(DocId, Distance)],
    top_k: usize,
    larger_is_better: bool,
) -> Vec<ScoredDocument> {
    let is_better = |a: Distance, b: Distance| if larger_is_better { a > b } else { a < b };

    let mut best = HashMap::<DocId, ScoredDocument>::new();
    for &(docid, score) in candidates {
        let parent = segment.parent_of[docid as usize];
        match best.get(&parent) {
            Some(current) if !is_better(score, current.score) => {}
            _ => {
                best.insert(parent, ScoredDocument { docid, score });
            }
        }
    }

    let mut documents: Vec<ScoredDocument> = best.into_values().collect();
    documents.sort_by(|a, b| {
        if larger_is_better {
            b.score.total_cmp(&a.score)
        } else {
            a.score.total_cmp(&b.score)
        }
    });
    documents.truncate(top_k);
    documents
}
