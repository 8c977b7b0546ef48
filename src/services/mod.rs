pub mod directions;
pub mod export;
pub mod loader;
pub mod matching;
pub mod overview;
pub mod source;

pub use loader::Catalog;
pub use matching::{EmptySelectionPolicy, MatchEngine};
pub use source::{DatasetSource, FileSource};
