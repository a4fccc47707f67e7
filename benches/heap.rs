use criterion::{criterion_group, criterion_main, Criterion};

use helpers::documents::{create_candidates, create_segment};
use knn_extension::{
    base::{DocId, Distance},
    bitset::FixedBitSet,
    heap::GroupedMaxHeap,
    search::{search_nested, CollectorOptions},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);

    // Create the segment
    const NUM_PARENTS: usize = 10_000;
    let segment = create_segment(NUM_PARENTS, 5., &mut rng);
    let parents = FixedBitSet::new(&segment.parents).expect("Could not build the parent bitset");
    let candidates = create_candidates(&segment, 50_000, &mut rng);

    c.bench_function("next_set_bit", |b| {
        b.iter(|| {
            let mut sum = 0;
            for doc_id in (0..segment.num_docs() as DocId).step_by(7) {
                sum += parents.next_set_bit(doc_id);
            }
            sum
        })
    });

    let scores: Vec<Distance> = (0..10_000).map(|_| rng.gen()).collect();
    c.bench_function("grouped_heap", |b| {
        b.iter(|| {
            let mut heap = GroupedMaxHeap::<DocId>::new(100);
            for (ix, &score) in scores.iter().enumerate() {
                let group = (ix % 500) as DocId;
                match heap.group_score(&group) {
                    Some(current) if score < current => heap.update(score, ix as DocId, group),
                    Some(_) => {}
                    None if !heap.is_full() => heap.push(score, ix as DocId, Some(group)),
                    None if score < heap.top().unwrap().score => {
                        heap.replace_top(score, ix as DocId, Some(group))
                    }
                    None => {}
                }
            }
            heap.into_sorted_vec()
        })
    });

    let options = CollectorOptions {
        top_k: 100,
        ..Default::default()
    };
    c.bench_function("search_nested", |b| {
        b.iter(|| search_nested(&parents, candidates.iter().copied(), &options))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(100);
    targets = criterion_benchmark
}
criterion_main!(benches);
