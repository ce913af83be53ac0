use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::catalog::Article;
use crate::catalog::validate::{TopicVocabularyResponse, validate_response};
use crate::config::Config;
use crate::engine::clock::SystemClock;
use crate::engine::progress::percent;
use crate::lists::custom::CustomWordList;
use crate::session::game::{GameSession, SessionOptions};
use crate::session::matching::{MatchResult, MatchScore};
use crate::store::json_store::JsonStore;
use crate::store::repository::ProgressRepository;
use crate::store::schema::ExportData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResetTarget {
    /// Word progress, progress settings and word history
    Progress,
    History,
    Mastered,
    Lists,
    Stats,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub rounds: u32,
    pub correct: u32,
    pub best_streak: u32,
}

pub struct App {
    pub config: Config,
    pub session: GameSession,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let store = JsonStore::with_base_dir(config.data_dir())?;
        if store.clean_interrupted_writes() {
            tracing::warn!("removed leftover temp files in {}", store.base_dir().display());
        }
        let session = GameSession::new(
            ProgressRepository::new(Box::new(store)),
            Box::new(SystemClock),
            SmallRng::from_entropy(),
            SessionOptions {
                choice_count: config.choice_count,
                guess_articles: config.guess_articles,
            },
        );
        Ok(Self { config, session })
    }

    pub fn with_session(config: Config, session: GameSession) -> Self {
        Self { config, session }
    }

    /// Interactive quiz over line-based input. Stops on `q`, end of input,
    /// or after `max_rounds`.
    pub fn play(
        &mut self,
        input: impl BufRead,
        mut out: impl Write,
        max_rounds: Option<u32>,
    ) -> Result<PlaySummary> {
        let mut lines = input.lines();
        let mut summary = PlaySummary::default();

        writeln!(out, "{}", self.lists_banner())?;
        writeln!(out, "Type q to stop.")?;

        while max_rounds.is_none_or(|max| summary.rounds < max) {
            let Some(round) = self.session.next_round().cloned() else {
                writeln!(out, "No words available.")?;
                break;
            };

            writeln!(out)?;
            writeln!(out, "  {}", round.word.german)?;

            let article = if round.requires_article {
                match prompt(&mut lines, &mut out, "Article (der/die/das): ")? {
                    Some(answer) => Some(Article::parse(&answer)),
                    None => break,
                }
            } else {
                None
            };

            for (i, choice) in round.choices.iter().enumerate() {
                writeln!(out, "  {}) {choice}", i + 1)?;
            }
            let Some(answer) = prompt(&mut lines, &mut out, "Translation: ")? else {
                break;
            };
            let translation = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| round.choices.get(i))
                .cloned()
                .unwrap_or(answer);

            let outcome = self.session.answer(article, &translation)?;
            summary.rounds += 1;
            summary.best_streak = summary.best_streak.max(outcome.streak);

            if outcome.evaluation.is_correct {
                summary.correct += 1;
                writeln!(out, "Correct! Streak: {}", outcome.streak)?;
            } else {
                writeln!(
                    out,
                    "Not quite: {} means \"{}\"",
                    outcome.word.display_with_article(),
                    outcome.word.primary_translation()
                )?;
            }
            if outcome.newly_mastered {
                writeln!(out, "Mastered {}!", outcome.word.german)?;
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "Session: {}/{} correct, best streak {}",
            summary.correct, summary.rounds, summary.best_streak
        )?;
        Ok(summary)
    }

    /// Pair-matching over line-based input. Each line names a German entry
    /// by number and an English entry by letter, e.g. `3 b`.
    pub fn play_matching(
        &mut self,
        input: impl BufRead,
        mut out: impl Write,
        max_matches: Option<u32>,
    ) -> Result<MatchScore> {
        let mut game = self.session.matching_game();
        let mut lines = input.lines();

        writeln!(out, "Match each German word to its translation, e.g. \"3 b\". Type q to stop.")?;

        while !game.is_finished()
            && max_matches.is_none_or(|max| game.score().completed_pairs < max)
        {
            let german: Vec<(u64, String)> = game
                .german_column()
                .iter()
                .map(|p| (p.id, p.word.display_with_article()))
                .collect();
            let english: Vec<(u64, String)> = game
                .english_column()
                .iter()
                .map(|p| (p.id, p.english().to_string()))
                .collect();

            writeln!(out)?;
            for (i, ((_, left), (_, right))) in german.iter().zip(&english).enumerate() {
                let letter = char::from(b'a' + i as u8);
                writeln!(out, "  {}) {left:<24} {letter}) {right}", i + 1)?;
            }

            let Some(answer) = prompt(&mut lines, &mut out, "Pair: ")? else {
                break;
            };
            let Some((g, e)) = parse_pair(&answer) else {
                writeln!(out, "Enter a number and a letter, e.g. 1 a")?;
                continue;
            };
            let picked = german.get(g).zip(english.get(e));
            match picked.and_then(|((g, _), (e, _))| game.try_match(*g, *e)) {
                Some(MatchResult::Matched { word, points }) => writeln!(
                    out,
                    "+{points}: {} = {} (score {}, streak {})",
                    word.display_with_article(),
                    word.primary_translation(),
                    game.score().score,
                    game.score().streak
                )?,
                Some(MatchResult::Mismatch) => writeln!(out, "No match. Streak reset.")?,
                None => writeln!(out, "No such entry.")?,
            }
        }

        let score = game.score();
        writeln!(out)?;
        writeln!(
            out,
            "Matched {} pairs for {} points",
            score.completed_pairs, score.score
        )?;
        Ok(score)
    }

    fn lists_banner(&self) -> String {
        let info = self.session.active_lists_info();
        if info.active_list_names.is_empty() {
            format!("Practising {} built-in words", self.session.words().len())
        } else {
            format!(
                "Practising {} words from {}",
                info.total_words,
                info.active_list_names.join(", ")
            )
        }
    }

    pub fn write_stats(&self, mut out: impl Write) -> Result<()> {
        let stats = self.session.stats();
        writeln!(out, "Questions answered: {}", stats.total_questions)?;
        writeln!(
            out,
            "Correct:            {} ({:.0}%)",
            stats.correct_answers,
            stats.accuracy()
        )?;
        writeln!(
            out,
            "Articles:           {}/{} ({:.0}%)",
            stats.articles_correct,
            stats.articles_attempted,
            stats.article_accuracy()
        )?;
        writeln!(
            out,
            "Translations:       {}/{} ({:.0}%)",
            stats.translations_correct,
            stats.translations_attempted,
            stats.translation_accuracy()
        )?;
        writeln!(out, "Best streak:        {}", stats.best_streak)?;
        writeln!(
            out,
            "Playing since:      {}",
            stats.start_date.format("%Y-%m-%d")
        )?;

        let counts = self.session.pool_counts();
        writeln!(out)?;
        writeln!(
            out,
            "Review queue: {} missed, {} recent, {} due, {} new, {} mastered",
            counts.incorrect, counts.recent, counts.fresh, counts.never_seen, counts.mastered
        )?;
        Ok(())
    }

    pub fn write_progress(&self, mut out: impl Write, verbose: bool) -> Result<()> {
        let overview = self.session.overview();
        let progress = self.session.progress();
        writeln!(
            out,
            "{}% complete: {} mastered, {} in progress, {} not started",
            overview.completion_percent(),
            overview.mastered.len(),
            overview.in_progress.len(),
            overview.not_started.len()
        )?;
        writeln!(
            out,
            "{} questions over {} days",
            progress.total_questions(),
            progress.days_studied()
        )?;

        if verbose {
            for (heading, group) in [
                ("Mastered", &overview.mastered),
                ("In progress", &overview.in_progress),
            ] {
                if group.is_empty() {
                    continue;
                }
                writeln!(out)?;
                writeln!(out, "{heading}:")?;
                for (word, entry) in group {
                    writeln!(
                        out,
                        "  {:<24} {}/{} ({:.0}%)",
                        word.display_with_article(),
                        entry.correct_count,
                        entry.total_seen,
                        entry.accuracy()
                    )?;
                }
            }
        }
        Ok(())
    }

    pub fn write_lists(&self, mut out: impl Write) -> Result<()> {
        let lists = self.session.custom_lists();
        let selection = self.session.repository().load_list_settings();
        let mark = |active: bool| if active { "x" } else { " " };

        writeln!(
            out,
            "[{}] built-in    Common Words",
            mark(selection.include_built_in)
        )?;
        for list in lists.iter() {
            writeln!(
                out,
                "[{}] {}  {} ({} words, {})",
                mark(selection.is_active(&list.id)),
                list.id,
                list.name,
                list.word_count,
                list.difficulty
            )?;
        }
        writeln!(out)?;
        writeln!(out, "{}", self.lists_banner())?;
        Ok(())
    }

    /// Validate a generated vocabulary file and save it as a new list.
    pub fn add_list_from_file(
        &mut self,
        path: &Path,
        requested: Option<usize>,
    ) -> Result<(CustomWordList, Option<String>)> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let response: TopicVocabularyResponse = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        let requested = requested.unwrap_or(response.words.len());
        let validated = validate_response(response, requested);
        if validated.words.is_empty() {
            bail!("No valid words in {}", path.display());
        }
        if validated.topic.trim().is_empty() {
            bail!("Word list in {} has no topic", path.display());
        }
        let list = self.session.add_custom_list(
            &validated.topic,
            &validated.difficulty,
            validated.words,
        )?;
        Ok((list, validated.warning))
    }

    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        let mut settings = self.session.settings().clone();
        match key {
            "mastery-threshold" => settings.mastery_threshold = parse_value(key, value)?,
            "repetition" => settings.repetition_preference = parse_value(key, value)?,
            "mastered-words" => settings.mastered_words_enabled = parse_value(key, value)?,
            "reset-days" => settings.mastered_words_reset_days = parse_value(key, value)?,
            "choice-count" => {
                self.config.choice_count = parse_value(key, value)?;
                self.config.validate();
                return self.config.save();
            }
            "guess-articles" => {
                self.config.guess_articles = parse_value(key, value)?;
                return self.config.save();
            }
            _ => bail!("Unknown setting: {key}"),
        }
        self.session.update_settings(settings)
    }

    pub fn write_settings(&self, mut out: impl Write) -> Result<()> {
        let settings = self.session.settings();
        writeln!(out, "mastery-threshold = {}", settings.mastery_threshold)?;
        writeln!(out, "repetition        = {}", settings.repetition_preference)?;
        writeln!(out, "mastered-words    = {}", settings.mastered_words_enabled)?;
        writeln!(out, "reset-days        = {}", settings.mastered_words_reset_days)?;
        writeln!(out, "choice-count      = {}", self.config.choice_count)?;
        writeln!(out, "guess-articles    = {}", self.config.guess_articles)?;
        Ok(())
    }

    /// Write an export file. A directory target gets the dated default name.
    pub fn export_to(&self, target: &Path) -> Result<PathBuf> {
        let data = self.session.repository().export(self.session.now());
        let path = if target.is_dir() {
            target.join(data.file_name())
        } else {
            target.to_path_buf()
        };
        let json = serde_json::to_string_pretty(&data)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("exported progress to {}", path.display());
        Ok(path)
    }

    pub fn import_from(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let data: ExportData = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        self.session.repository_mut().import(&data)?;
        self.session.reload();
        Ok(())
    }

    pub fn reset(&mut self, target: ResetTarget) -> Result<()> {
        let repo = self.session.repository_mut();
        match target {
            ResetTarget::Progress => repo.reset_all_progress()?,
            ResetTarget::History => repo.reset_word_history()?,
            ResetTarget::Mastered => repo.reset_mastered()?,
            ResetTarget::Lists => repo.reset_custom_lists()?,
            ResetTarget::Stats => repo.reset_game_stats()?,
        }
        self.session.reload();
        tracing::info!("reset {target:?}");
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value for {key}: {value}"))
}

/// `"3 b"` or `"3b"` to zero-based German and English indices.
fn parse_pair(answer: &str) -> Option<(usize, usize)> {
    let answer = answer.trim().to_ascii_lowercase();
    let split = answer.find(|c: char| !c.is_ascii_digit())?;
    let german: usize = answer[..split].parse().ok()?;
    let mut rest = answer[split..].trim().chars();
    let letter = rest.next().filter(|c| c.is_ascii_lowercase())?;
    if rest.next().is_some() {
        return None;
    }
    Some((german.checked_sub(1)?, (letter as u8 - b'a') as usize))
}

/// Print `text` and read one trimmed line. `None` on end of input or `q`.
fn prompt(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    out: &mut impl Write,
    text: &str,
) -> Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;
    let Some(line) = lines.next().transpose()? else {
        return Ok(None);
    };
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Ok(None);
    }
    Ok(Some(line.to_string()))
}

/// Percent of a play session's rounds answered correctly.
pub fn session_accuracy(summary: &PlaySummary) -> f64 {
    percent(summary.correct, summary.rounds)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::catalog::VocabularyWord;
    use crate::engine::clock::FixedClock;
    use crate::store::MemoryStore;

    fn app_with(words: Vec<VocabularyWord>) -> App {
        let session = GameSession::with_built_in(
            ProgressRepository::new(Box::new(MemoryStore::new())),
            Box::new(FixedClock::new(
                Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap(),
            )),
            SmallRng::seed_from_u64(3),
            SessionOptions::default(),
            words,
        );
        App::with_session(Config::default(), session)
    }

    fn haus_only() -> App {
        app_with(vec![VocabularyWord::noun("Haus", Article::Das, &["house", "home"])])
    }

    #[test]
    fn play_grades_typed_answers() {
        let mut app = haus_only();
        let input = Cursor::new("das\nhouse\ndie\n1\nq\n");
        let mut out = Vec::new();
        let summary = app.play(input, &mut out, None).unwrap();
        assert_eq!(
            summary,
            PlaySummary {
                rounds: 2,
                correct: 1,
                best_streak: 1
            }
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Correct! Streak: 1"));
        assert!(text.contains("Not quite: das Haus means \"house\""));
        assert_eq!(session_accuracy(&summary), 50.0);
    }

    #[test]
    fn play_stops_at_round_limit_and_end_of_input() {
        let mut app = haus_only();
        let summary = app
            .play(Cursor::new("das\nhouse\ndas\nhouse\n"), Vec::new(), Some(1))
            .unwrap();
        assert_eq!(summary.rounds, 1);

        let summary = app.play(Cursor::new("das\n"), Vec::new(), None).unwrap();
        assert_eq!(summary.rounds, 0);
        assert_eq!(app.session.stats().total_questions, 1);
    }

    #[test]
    fn pair_input_parses_number_and_letter() {
        assert_eq!(parse_pair("3 b"), Some((2, 1)));
        assert_eq!(parse_pair("1A"), Some((0, 0)));
        assert_eq!(parse_pair("0 a"), None);
        assert_eq!(parse_pair("a 1"), None);
        assert_eq!(parse_pair("2 ab"), None);
    }

    #[test]
    fn matching_single_word_scores_streak_bonus() {
        let mut app = haus_only();
        let mut out = Vec::new();
        let score = app
            .play_matching(Cursor::new("1 a\n1 a\nfoo\n1 a\n"), &mut out, Some(3))
            .unwrap();
        assert_eq!(
            score,
            MatchScore {
                score: 10 + 12 + 14,
                streak: 3,
                completed_pairs: 3
            }
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("+10: das Haus = house"));
        assert!(text.contains("Enter a number and a letter"));
        assert!(app.session.history().is_empty());
    }

    #[test]
    fn matching_rejects_entries_off_the_board() {
        let mut app = app_with(vec![
            VocabularyWord::noun("Haus", Article::Das, &["house"]),
            VocabularyWord::noun("Tisch", Article::Der, &["table"]),
        ]);
        let mut out = Vec::new();
        let score = app
            .play_matching(Cursor::new("9 a\n1 z\nq\n"), &mut out, None)
            .unwrap();
        assert_eq!(score, MatchScore::default());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("No such entry.").count(), 2);
        assert!(text.contains("Matched 0 pairs for 0 points"));
    }

    #[test]
    fn settings_are_validated_and_rejected() {
        let mut app = haus_only();
        app.set_setting("mastery-threshold", "50").unwrap();
        assert_eq!(app.session.settings().mastery_threshold, 20);
        app.set_setting("mastered-words", "true").unwrap();
        assert!(app.session.settings().mastered_words_enabled);
        assert!(app.set_setting("repetition", "lots").is_err());
        assert!(app.set_setting("colour", "red").is_err());
    }

    #[test]
    fn add_list_from_generated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kitchen.json");
        fs::write(
            &path,
            r#"{
                "topic": "Kitchen",
                "difficulty": "beginner",
                "words": [
                    {"german": "Löffel", "article": "der", "type": "noun", "english": ["spoon"]},
                    {"german": "", "article": "die", "english": ["nothing"]}
                ]
            }"#,
        )
        .unwrap();

        let mut app = haus_only();
        let (list, warning) = app.add_list_from_file(&path, Some(3)).unwrap();
        assert_eq!(list.word_count, 1);
        assert_eq!(list.topic, "Kitchen");
        assert_eq!(
            warning.as_deref(),
            Some("Partial result: Generated 1 out of 3 requested words")
        );

        let mut out = Vec::new();
        app.write_lists(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&list.id));
        assert!(text.contains("[x] built-in"));
    }

    #[test]
    fn add_list_rejects_empty_result() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, r#"{"topic": "Nothing", "words": []}"#).unwrap();
        let mut app = haus_only();
        assert!(app.add_list_from_file(&path, None).is_err());
    }

    #[test]
    fn export_then_import_into_fresh_app() {
        let dir = TempDir::new().unwrap();
        let mut app = haus_only();
        app.play(Cursor::new("das\nhouse\n"), Vec::new(), None).unwrap();
        let path = app.export_to(dir.path()).unwrap();
        assert!(path.ends_with("artikel-meister-progress-2025-06-15.json"));

        let mut fresh = haus_only();
        fresh.import_from(&path).unwrap();
        assert_eq!(fresh.session.progress().total_questions(), 1);
    }

    #[test]
    fn reset_history_reloads_session() {
        let mut app = haus_only();
        app.play(Cursor::new("das\nhouse\n"), Vec::new(), None).unwrap();
        app.reset(ResetTarget::History).unwrap();
        assert!(app.session.history().is_empty());
        assert_eq!(app.session.progress().total_questions(), 1);
    }

    #[test]
    fn stats_and_progress_render() {
        let mut app = haus_only();
        app.play(Cursor::new("das\nhouse\n"), Vec::new(), None).unwrap();
        let mut out = Vec::new();
        app.write_stats(&mut out).unwrap();
        app.write_progress(&mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Questions answered: 1"));
        assert!(text.contains("1 questions over 1 days"));
        assert!(text.contains("In progress:"));
    }
}
