pub mod card;
pub mod error;

pub use card::{card, restaurant_card};
pub use error::error_page;
