pub mod export_xlsx;

pub use export_xlsx::{export_restaurants_xlsx, restaurants_workbook};
