pub mod consolidate;
pub mod custom;

pub use consolidate::{ActiveListsInfo, active_lists_info, consolidate};
pub use custom::{CustomListCollection, CustomWordList};
