use crate::domain::RankedRestaurant;
use crate::templates::components::restaurant_card;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn town_page(town: &str, restaurants: &[RankedRestaurant]) -> Markup {
    let encoded: String = url::form_urlencoded::byte_serialize(town.as_bytes()).collect();

    desktop_layout(
        &format!("Restaurants in {town}"),
        html! {
            main class="container" {
                h1 { "Best restaurants in " (town) }
                p {
                    a href=(format!("/export?town={encoded}")) { "Download as spreadsheet" }
                    " · "
                    a href=(format!("/restaurants?town={encoded}")) { "JSON" }
                }

                @for (i, restaurant) in restaurants.iter().enumerate() {
                    (restaurant_card(i + 1, restaurant))
                }
            }
        },
    )
}
