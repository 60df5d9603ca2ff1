use crate::domain::{RankedRestaurant, SourceTag};
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::{Format, Workbook};

const HEADERS: [&str; 10] = [
    "Rank",
    "Name",
    "Score",
    "Google Rating",
    "Google Reviews",
    "TripAdvisor Rating",
    "TripAdvisor Reviews",
    "Google Link",
    "TripAdvisor Link",
    "Review",
];

fn xlsx_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

/// One row per restaurant, best first.
pub fn restaurants_workbook(restaurants: &[RankedRestaurant]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();
    let score_format = Format::new().set_num_format("0.00");

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(xlsx_err(header))?;
    }

    for (i, restaurant) in restaurants.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet
            .write_number(r, 0, r as f64)
            .map_err(xlsx_err("rank"))?;
        worksheet
            .write_string(r, 1, &restaurant.name)
            .map_err(xlsx_err("name"))?;
        worksheet
            .write_number_with_format(r, 2, restaurant.score, &score_format)
            .map_err(xlsx_err("score"))?;

        for (offset, tag) in [(3u16, SourceTag::GoogleMaps), (5u16, SourceTag::TripAdvisor)] {
            if let Some(listing) = restaurant.site(tag) {
                worksheet
                    .write_number(r, offset, listing.rating)
                    .map_err(xlsx_err("rating"))?;
                worksheet
                    .write_number(r, offset + 1, listing.number_of_reviews as f64)
                    .map_err(xlsx_err("review count"))?;
            }
        }

        let gm_link = restaurant.site(SourceTag::GoogleMaps).map(|l| l.link.as_str());
        let ta_link = restaurant.site(SourceTag::TripAdvisor).map(|l| l.link.as_str());
        worksheet
            .write_string(r, 7, gm_link.unwrap_or(""))
            .map_err(xlsx_err("google link"))?;
        worksheet
            .write_string(r, 8, ta_link.unwrap_or(""))
            .map_err(xlsx_err("tripadvisor link"))?;
        worksheet
            .write_string(r, 9, restaurant.review.as_deref().unwrap_or(""))
            .map_err(xlsx_err("review"))?;
    }

    worksheet.set_column_width(1, 32).map_err(xlsx_err("column width"))?;
    worksheet.set_column_width(9, 80).map_err(xlsx_err("column width"))?;

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

pub fn export_restaurants_xlsx(restaurants: &[RankedRestaurant], town: &str) -> ResultResp {
    let buffer = restaurants_workbook(restaurants)?;
    let slug = crate::scraper::locale_slug(town);
    xlsx_response(buffer, &format!("restaurants_{slug}.xlsx"))
}
