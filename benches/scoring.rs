//! Benchmarks for the scoring pipeline and the recommendation cache.

use std::collections::BTreeSet;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use recomendar::prelude::*;

fn synthetic_candidates(count: u64) -> Vec<Candidate> {
    (1..=count)
        .map(|id| Candidate {
            book_id: BookId(id),
            title: format!("Book {id}"),
            author: format!("Author {id}"),
            genres: [GenreId(id % 7 + 1), GenreId(id % 3 + 1)]
                .into_iter()
                .collect::<BTreeSet<_>>(),
            average_rating: (id % 9) as f32 / 2.0 + 0.5,
            review_count: (id % 40) as usize,
            favorite_count: (id % 15) as usize,
        })
        .collect()
}

fn bench_popularity_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("popularity_rank");
    let scorer = PopularityScorer::new();

    for size in [10u64, 100, 1_000, 10_000].iter() {
        let candidates = synthetic_candidates(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| scorer.rank(black_box(&candidates)));
        });
    }

    group.finish();
}

fn bench_content_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_rank");
    let scorer = ContentScorer::new();
    let favorites: Vec<GenreId> = (1..=5).map(GenreId).collect();
    let high_rated: Vec<GenreId> = (2..=4).map(GenreId).collect();
    let profile = GenreProfile::build(&favorites, &high_rated);

    for size in [10u64, 100, 1_000, 10_000].iter() {
        let candidates = synthetic_candidates(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| scorer.rank(black_box(&profile), black_box(&candidates)));
        });
    }

    group.finish();
}

fn seeded_catalog(books: u64, users: u64) -> Arc<MemoryCatalog> {
    let catalog = Arc::new(MemoryCatalog::new());
    for id in 1..=8 {
        catalog
            .add_genre(Genre::new(GenreId(id), format!("Genre {id}")))
            .unwrap();
    }
    for id in 1..=users {
        catalog
            .add_user(User::new(UserId(id), format!("user-{id}")))
            .unwrap();
    }
    for id in 1..=books {
        catalog
            .add_book(
                Book::new(BookId(id), format!("Book {id}"), format!("Author {id}"))
                    .with_genre(GenreId(id % 7 + 1)),
            )
            .unwrap();
    }
    for user in 1..=users {
        for offset in 0..5 {
            let book = (user * 13 + offset * 7) % books + 1;
            let rating = (offset % 5) as f32 + 1.0;
            let _ = catalog.create_review(Review::new(UserId(user), BookId(book), rating));
        }
        let _ = catalog.add_favorite(UserId(user), BookId(user % books + 1));
    }
    catalog
}

fn bench_recommend_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend_end_to_end");
    let params = RecommendationParams::new();

    for size in [100u64, 1_000].iter() {
        let catalog = seeded_catalog(*size, 50);

        let uncached = Recommender::new(catalog.clone()).without_cache();
        group.bench_with_input(BenchmarkId::new("uncached", size), size, |b, _| {
            b.iter(|| uncached.content_based(black_box(UserId(1)), black_box(&params)));
        });

        let cached = Recommender::new(catalog.clone());
        cached.content_based(UserId(1), &params).unwrap();
        group.bench_with_input(BenchmarkId::new("cached", size), size, |b, _| {
            b.iter(|| cached.content_based(black_box(UserId(1)), black_box(&params)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_popularity_rank,
    bench_content_rank,
    bench_recommend_end_to_end
);
criterion_main!(benches);
