//! Built-in catalog used whenever the content supplier yields nothing.

use once_cell::sync::Lazy;

use crate::domain::foundation::ItemId;

use super::Item;

fn entry(
    id: &str,
    title: &str,
    category: &str,
    duration_minutes: u32,
    score: f32,
    description: &str,
    year: i32,
) -> Item {
    Item {
        id: ItemId::new(id),
        title: title.to_string(),
        category: category.to_string(),
        duration_minutes,
        score,
        description: Some(description.to_string()),
        year: Some(year),
        poster_url: Some(format!(
            "https://via.placeholder.com/300x450?text={}",
            title.replace(' ', "+")
        )),
    }
}

static FALLBACK_CATALOG: Lazy<Vec<Item>> = Lazy::new(|| {
    vec![
        entry("1", "The Mandalorian", "Sci-Fi", 45, 8.7, "A bounty hunter in the outer reaches of the galaxy.", 2019),
        entry("2", "Stranger Things", "Horror", 55, 8.8, "Kids in a small town face supernatural forces.", 2016),
        entry("3", "The Office", "Comedy", 22, 9.0, "Mockumentary about office workers.", 2005),
        entry("4", "Breaking Bad", "Drama", 47, 9.5, "A chemistry teacher turns to crime.", 2008),
        entry("5", "The Crown", "Drama", 60, 8.6, "The reign of Queen Elizabeth II.", 2016),
        entry("6", "Avatar: The Last Airbender", "Animation", 24, 9.3, "A young airbender saves the world.", 2005),
        entry("7", "Ted Lasso", "Comedy", 30, 8.8, "An American football coach in England.", 2020),
        entry("8", "Game of Thrones", "Fantasy", 57, 9.2, "Noble families fight for the Iron Throne.", 2011),
        entry("9", "The Witcher", "Fantasy", 60, 8.2, "A monster hunter in a magical world.", 2019),
        entry("10", "Friends", "Comedy", 22, 8.9, "Six friends living in New York.", 1994),
    ]
});

/// The built-in fallback titles, in catalog order.
pub fn fallback_catalog() -> &'static [Item] {
    &FALLBACK_CATALOG
}
