pub mod choices;
pub mod game;
pub mod matching;

pub use game::{GameSession, Round, RoundOutcome, SessionOptions};
pub use matching::{MatchResult, MatchScore, MatchingGame};
