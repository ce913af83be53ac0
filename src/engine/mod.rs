pub mod clock;
pub mod evaluate;
pub mod history;
pub mod progress;
pub mod selector;
pub mod stats;

pub use clock::{Clock, FixedClock, SystemClock};
pub use evaluate::{Evaluation, evaluate_answer};
pub use history::{StreakMastery, WordHistory, WordHistoryEntry};
pub use progress::{ProgressOverview, WordProgress, WordProgressEntry};
pub use selector::{Pool, PoolCounts, PoolWeights, pool_counts, select_next};
pub use stats::GameStats;
