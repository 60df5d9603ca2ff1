pub mod fuzzy;
pub mod normalize;

pub use fuzzy::{FuzzyMatcher, NameMatch, MATCH_THRESHOLD};
pub use normalize::normalize_name;
