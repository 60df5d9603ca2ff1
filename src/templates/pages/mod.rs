pub mod home;
pub mod town;

pub use home::home_page;
pub use town::town_page;
