use std::fmt::Display;

use helpers::{
    documents::{create_candidates, create_segment},
    oracle::expected_nested,
};
use knn_extension::{
    base::{DocId, Distance},
    bitset::FixedBitSet,
    search::{
        search_nested, search_nested_filtered, CollectorOptions, ScoredDocument,
        TopGroupedDocuments,
    },
};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use rstest::rstest;

/// Initialize the logger
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

trait ApproxEq {
    fn approx_eq(&self, other: &Self, delta: f64) -> bool;
}

impl ApproxEq for ScoredDocument {
    fn approx_eq(&self, other: &Self, delta: f64) -> bool {
        (self.docid == other.docid) && ((self.score - other.score).abs() < (delta as f32))
    }
}

fn vec_compare<T>(observed: &Vec<T>, expected: &Vec<T>)
where
    T: ApproxEq + Display,
{
    assert!(
        observed.len() == expected.len(),
        "Size differ {} vs {}",
        observed.len(),
        expected.len()
    );
    for i in 0..expected.len() {
        assert!(
            observed[i].approx_eq(&expected[i], 1e-6),
            "{}th element differ: {} vs {}",
            i,
            observed[i],
            expected[i]
        );
    }
}

#[rstest]
#[case(100, 3., 1000, 10, 1)]
#[case(100, 3., 1000, 1, 2)]
// More results than parents
#[case(20, 2., 500, 50, 3)]
// Many children per parent
#[case(50, 30., 2000, 10, 4)]
// Fewer candidates than parents
#[case(1000, 1., 100, 10, 5)]
fn test_search_nested(
    #[case] num_parents: usize,
    #[case] lambda_children: f32,
    #[case] num_candidates: usize,
    #[case] top_k: usize,
    #[case] seed: u64,
    #[values(false, true)] larger_is_better: bool,
) {
    init_logger();
    let mut rng = StdRng::seed_from_u64(seed);

    let segment = create_segment(num_parents, lambda_children, &mut rng);
    let candidates = create_candidates(&segment, num_candidates, &mut rng);
    let parents = FixedBitSet::new(&segment.parents).expect("Could not build the parent bitset");

    let options = CollectorOptions {
        top_k,
        larger_is_better,
    };
    let observed = search_nested(&parents, candidates.iter().copied(), &options);
    let expected = expected_nested(&segment, &candidates, top_k, larger_is_better);

    for (ix, result) in observed.iter().enumerate() {
        info!(" [{}] document {}, score {}", ix, result.docid, result.score);
    }
    vec_compare(&observed, &expected);
}

#[test]
fn test_filtered() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(10);
    let segment = create_segment(200, 4., &mut rng);
    let parents = FixedBitSet::new(&segment.parents).unwrap();

    // Keeps one child out of three
    let children: Vec<DocId> = segment.children().into_iter().step_by(3).collect();
    let filter = FixedBitSet::new(&children).unwrap();

    // Distinct scores (100003 is prime)
    let score_fn = |doc_id: DocId| ((doc_id * 7919) % 100_003) as Distance;
    let options = CollectorOptions {
        top_k: 15,
        ..Default::default()
    };
    let observed = search_nested_filtered(&parents, &filter, score_fn, &options);

    let candidates: Vec<(DocId, Distance)> = children.iter().map(|&d| (d, score_fn(d))).collect();
    let expected = expected_nested(&segment, &candidates, 15, false);
    vec_compare(&observed, &expected);
    assert!(observed.iter().all(|d| filter.get(d.docid)));
}

#[test]
fn test_options() {
    let options: CollectorOptions = serde_json::from_str(r#"{"larger_is_better": true}"#)
        .expect("Could not parse the options");
    assert_eq!(options.top_k, 10);
    assert!(options.larger_is_better);

    let options: CollectorOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options.top_k, 10);
    assert!(!options.larger_is_better);

    let mut top = TopGroupedDocuments::<DocId>::new(&CollectorOptions {
        top_k: 3,
        larger_is_better: true,
    });
    for (doc_id, score) in [(1, 0.3), (2, 0.9), (3, 0.5), (4, 0.1)] {
        top.add(doc_id, score, doc_id / 2);
    }
    let ids: Vec<DocId> = top.into_sorted_vec().iter().map(|d| d.docid).collect();
    assert_eq!(ids, vec![2, 1, 4]);
}
