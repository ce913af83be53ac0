use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use artikel_meister::catalog::{Article, VocabularyWord};
use artikel_meister::engine::clock::FixedClock;
use artikel_meister::engine::history::StreakMastery;
use artikel_meister::session::game::{GameSession, SessionOptions};
use artikel_meister::store::json_store::JsonStore;
use artikel_meister::store::repository::ProgressRepository;
use artikel_meister::store::schema::{GAME_STATS_KEY, PROGRESS_KEY, WORD_HISTORY_KEY};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

fn open_session(dir: &Path, now: DateTime<Utc>, words: Vec<VocabularyWord>) -> GameSession {
    let store = JsonStore::with_base_dir(dir.to_path_buf()).unwrap();
    GameSession::with_built_in(
        ProgressRepository::new(Box::new(store)),
        Box::new(FixedClock::new(now)),
        SmallRng::seed_from_u64(2024),
        SessionOptions::default(),
        words,
    )
}

fn haus() -> VocabularyWord {
    VocabularyWord::noun("Haus", Article::Das, &["house", "home"])
}

fn tisch() -> VocabularyWord {
    VocabularyWord::noun("Tisch", Article::Der, &["table"])
}

fn play_round(session: &mut GameSession, correct: bool) {
    let round = session.next_round().unwrap().clone();
    let article = if correct { round.word.article } else { Article::Die };
    session
        .answer(Some(article), round.word.primary_translation())
        .unwrap();
}

#[test]
fn answers_are_written_to_disk_after_every_round() {
    let dir = TempDir::new().unwrap();
    let mut session = open_session(dir.path(), start(), vec![haus()]);
    play_round(&mut session, true);

    for key in [WORD_HISTORY_KEY, PROGRESS_KEY, GAME_STATS_KEY] {
        let path = dir.path().join(format!("{key}.json"));
        assert!(path.exists(), "{} missing", path.display());
    }
    let history = fs::read_to_string(dir.path().join(format!("{WORD_HISTORY_KEY}.json"))).unwrap();
    assert!(history.contains("\"consecutiveCorrect\":1"));
    assert!(history.contains("\"lastShown\":"));
}

#[test]
fn progress_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut session = open_session(dir.path(), start(), vec![haus()]);
        for _ in 0..3 {
            play_round(&mut session, true);
        }
        assert_eq!(session.streak(), 3);
    }

    let session = open_session(dir.path(), start() + Duration::days(1), vec![haus()]);
    assert_eq!(session.history().mastery("Haus"), StreakMastery::Mastered);
    assert_eq!(session.progress().get("Haus").unwrap().correct_count, 3);
    assert_eq!(session.stats().total_questions, 3);
    assert_eq!(session.stats().best_streak, 3);
    // The running streak belongs to the play session, not the saved stats.
    assert_eq!(session.streak(), 0);
}

#[test]
fn a_miss_revokes_streak_mastery_but_not_lifetime_mastery() {
    let dir = TempDir::new().unwrap();
    let mut session = open_session(dir.path(), start(), vec![haus()]);
    for _ in 0..3 {
        play_round(&mut session, true);
    }
    assert!(session.mastered_words().contains("Haus"));
    assert_eq!(session.history().mastery("Haus"), StreakMastery::Mastered);

    play_round(&mut session, false);
    assert_eq!(session.history().mastery("Haus"), StreakMastery::Learning);
    assert!(session.history().get("Haus").unwrap().recently_incorrect);
    assert!(session.mastered_words().contains("Haus"));
    assert_eq!(session.overview().mastered.len(), 1);
}

#[test]
fn resting_mastered_words_are_skipped_unless_enabled() {
    let dir = TempDir::new().unwrap();
    let now = start();
    let shown = (now - Duration::days(2)).timestamp_millis();
    fs::write(
        dir.path().join(format!("{WORD_HISTORY_KEY}.json")),
        format!(
            r#"{{"Haus": {{"lastShown": {shown}, "timesShown": 3, "recentlyIncorrect": false,
                "consecutiveCorrect": 3, "isMastered": true}}}}"#
        ),
    )
    .unwrap();

    let mut session = open_session(dir.path(), now, vec![haus(), tisch()]);
    for _ in 0..20 {
        assert_eq!(session.next_round().unwrap().word.german, "Tisch");
    }
    assert_eq!(session.pool_counts().mastered, 1);
}

#[test]
fn corrupt_files_start_fresh() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(format!("{PROGRESS_KEY}.json")), "{{{").unwrap();
    fs::write(dir.path().join(format!("{GAME_STATS_KEY}.json")), "[]").unwrap();

    let mut session = open_session(dir.path(), start(), vec![haus()]);
    assert!(session.progress().is_empty());
    assert_eq!(session.stats().total_questions, 0);

    play_round(&mut session, true);
    let reopened = open_session(dir.path(), start(), vec![haus()]);
    assert_eq!(reopened.progress().total_questions(), 1);
}
