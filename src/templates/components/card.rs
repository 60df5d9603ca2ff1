use crate::domain::RankedRestaurant;
use maud::{html, Markup};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

pub fn restaurant_card(rank: usize, restaurant: &RankedRestaurant) -> Markup {
    let photo = restaurant
        .all_sites
        .iter()
        .filter_map(|l| l.photos.as_ref())
        .flatten()
        .next();

    card(
        &format!("{rank}. {}", restaurant.name),
        html! {
            p { "Score: " span class="score" { (format!("{:.2}", restaurant.score)) } }

            @if let Some(photo) = photo {
                img class="photo" alt=(restaurant.name) src=(format!("data:image/jpeg;base64,{photo}"));
            }

            div class="sites" {
                @for listing in &restaurant.all_sites {
                    div {
                        a href=(listing.link) { (listing.site.as_str()) }
                        " "
                        (format!("{:.1}/10", listing.rating))
                        " · "
                        (listing.number_of_reviews) " reviews"
                    }
                }
            }

            @if let Some(review) = &restaurant.review {
                p class="review" { "“" (review) "”" }
            }
        },
    )
}
