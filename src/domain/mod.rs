pub mod listing;
pub mod merged;

pub use listing::{Listing, SourceTag};
pub use merged::{MergedEntity, RankedRestaurant};
