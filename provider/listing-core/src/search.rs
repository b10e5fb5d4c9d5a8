use serde::{Deserialize, Serialize};

/// One bookable listing as returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub name: String,
    /// Nightly price
    pub price: f64,
    /// 0 to 5
    pub rating: f64,
    /// Unique identifier of the listing
    pub url: String,
}

/// Search arguments. Field names match the tool input schema exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub city: String,
    pub date_from: String,
    pub date_to: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

struct Fixture {
    name: &'static str,
    price: f64,
    rating: f64,
    max_guests: u32,
    slug: u32,
}

const INVENTORY: [Fixture; 4] = [
    Fixture {
        name: "Cozy Apartment in the City Center",
        price: 120.0,
        rating: 4.8,
        max_guests: 2,
        slug: 1,
    },
    Fixture {
        name: "Spacious Loft with a View",
        price: 200.0,
        rating: 4.9,
        max_guests: 6,
        slug: 2,
    },
    Fixture {
        name: "Charming Cottage near the Park",
        price: 95.0,
        rating: 4.7,
        max_guests: 4,
        slug: 3,
    },
    Fixture {
        name: "Family House with Garden",
        price: 260.0,
        rating: 4.5,
        max_guests: 8,
        slug: 4,
    },
];

/// Mock search. Every city shares the same inventory; listings that cannot
/// hold the whole party are dropped and the rest are ranked by rating.
pub fn handle(query: &SearchQuery) -> Vec<ListingRecord> {
    let party = query.adults + query.children;
    let mut matches: Vec<&Fixture> = INVENTORY
        .iter()
        .filter(|fixture| fixture.max_guests >= party)
        .collect();
    matches.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    matches
        .into_iter()
        .map(|fixture| ListingRecord {
            name: fixture.name.to_string(),
            price: fixture.price,
            rating: fixture.rating,
            url: format!("https://stays.example.com/rooms/{}", fixture.slug),
        })
        .collect()
}
