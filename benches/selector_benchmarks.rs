use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use artikel_meister::catalog::{Article, VocabularyWord, dedupe_words};
use artikel_meister::engine::history::WordHistory;
use artikel_meister::engine::selector::{pool_counts, select_next};
use artikel_meister::lists::consolidate::consolidate;
use artikel_meister::lists::custom::CustomListCollection;
use artikel_meister::settings::{ListSelectionSettings, ProgressSettings};

fn make_words(count: usize) -> Vec<VocabularyWord> {
    (0..count)
        .map(|i| {
            let article = Article::ALL[i % Article::ALL.len()];
            VocabularyWord::noun(&format!("Wort{i}"), article, &[format!("word {i}").as_str()])
        })
        .collect()
}

/// History covering every pool: a slice of missed, recently shown, stale and
/// mastered words, the rest never seen.
fn make_history(words: &[VocabularyWord]) -> WordHistory {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut history = WordHistory::default();
    for (i, word) in words.iter().enumerate() {
        match i % 5 {
            0 => {
                history.record_answer(&word.german, false, 3, now - Duration::hours(2));
            }
            1 => {
                history.record_answer(&word.german, true, 3, now - Duration::minutes(10));
            }
            2 => {
                history.record_answer(&word.german, true, 3, now - Duration::days(3));
            }
            3 => {
                for _ in 0..3 {
                    history.record_answer(&word.german, true, 3, now - Duration::days(10));
                }
            }
            _ => {}
        }
    }
    history
}

fn bench_select_next(c: &mut Criterion) {
    let words = make_words(500);
    let history = make_history(&words);
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let settings = ProgressSettings {
        mastered_words_enabled: true,
        ..ProgressSettings::default()
    };
    let mut rng = SmallRng::seed_from_u64(7);

    c.bench_function("select_next (500 words)", |b| {
        b.iter(|| {
            select_next(
                black_box(&words),
                black_box(&history),
                &settings,
                now,
                &mut rng,
            )
        })
    });
}

fn bench_pool_counts(c: &mut Criterion) {
    let words = make_words(500);
    let history = make_history(&words);
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    c.bench_function("pool_counts (500 words)", |b| {
        b.iter(|| pool_counts(black_box(&words), black_box(&history), now))
    });
}

fn bench_consolidate(c: &mut Criterion) {
    let built_in = make_words(500);
    let lists = CustomListCollection::default();
    let settings = ListSelectionSettings::default();

    c.bench_function("consolidate (500 built-in words)", |b| {
        b.iter(|| consolidate(black_box(&built_in), &lists, &settings))
    });

    let mut doubled = built_in.clone();
    doubled.extend(built_in.iter().cloned());
    c.bench_function("dedupe_words (1000 words, half duplicate)", |b| {
        b.iter(|| dedupe_words(black_box(doubled.clone())))
    });
}

criterion_group!(
    benches,
    bench_select_next,
    bench_pool_counts,
    bench_consolidate
);
criterion_main!(benches);
