use log::debug;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, LogNormal, Poisson};

use knn_extension::base::{DocId, Distance};

/// A segment of nested documents, where each parent document
/// comes right after its children
pub struct NestedSegment {
    /// Parent document IDs (increasing)
    pub parents: Vec<DocId>,
    /// Parent of each document (a parent is its own parent)
    pub parent_of: Vec<DocId>,
}

impl NestedSegment {
    pub fn num_docs(&self) -> usize {
        self.parent_of.len()
    }

    /// Child documents (all the documents but the parents)
    pub fn children(&self) -> Vec<DocId> {
        (0..self.num_docs() as DocId)
            .filter(|&doc_id| self.parent_of[doc_id as usize] != doc_id)
            .collect()
    }
}

pub fn create_segment(
    num_parents: usize,
    lambda_children: f32,
    rng: &mut dyn RngCore,
) -> NestedSegment {
    let poi = Poisson::new(lambda_children).unwrap();

    let mut segment = NestedSegment {
        parents: Vec::new(),
        parent_of: Vec::new(),
    };

    for _ in 0..num_parents {
        let num_children = 1 + poi.sample(rng) as usize;
        let parent = (segment.parent_of.len() + num_children) as DocId;
        for _ in 0..=num_children {
            segment.parent_of.push(parent);
        }
        segment.parents.push(parent);
    }

    debug!(
        "Created a segment with {} documents and {} parents",
        segment.num_docs(),
        num_parents
    );
    segment
}

/// Samples scored child documents (a child can appear several times)
pub fn create_candidates(
    segment: &NestedSegment,
    count: usize,
    rng: &mut dyn RngCore,
) -> Vec<(DocId, Distance)> {
    let children = segment.children();
    let log_normal = LogNormal::new(0., 1.).unwrap();

    let mut candidates = Vec::with_capacity(count);
    for _ in 0..count {
        let doc_id = children[rng.gen_range(0..children.len())];
        candidates.push((doc_id, log_normal.sample(rng)));
    }
    candidates
}
