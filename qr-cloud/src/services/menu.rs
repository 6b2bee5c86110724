//! Menu visibility, grouping and search

use shared::models::{MenuCategoryGroup, MenuItem, PublicMenu, Restaurant, RestaurantSummary};
use std::collections::BTreeMap;

pub const DEFAULT_OWNER_LIMIT: i64 = 100;
pub const MAX_OWNER_LIMIT: i64 = 500;

/// Owner listing filter (`GET /api/dashboard/menu`)
#[derive(Debug, Clone)]
pub struct OwnerFilter {
    pub include_unavailable: bool,
    pub category: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for OwnerFilter {
    fn default() -> Self {
        Self {
            include_unavailable: true,
            category: None,
            skip: 0,
            limit: DEFAULT_OWNER_LIMIT,
        }
    }
}

fn in_category(item: &MenuItem, category: Option<&str>) -> bool {
    category.is_none_or(|c| item.category == c)
}

/// Items a customer may see: available only, optionally one category
pub fn public_items(items: Vec<MenuItem>, category: Option<&str>) -> Vec<MenuItem> {
    items
        .into_iter()
        .filter(|i| i.is_available && in_category(i, category))
        .collect()
}

/// Items for the owner dashboard, unavailable ones included by default
pub fn owner_items(items: Vec<MenuItem>, filter: &OwnerFilter) -> Vec<MenuItem> {
    let skip = usize::try_from(filter.skip.max(0)).unwrap_or(usize::MAX);
    let limit = usize::try_from(filter.limit.clamp(1, MAX_OWNER_LIMIT)).unwrap_or(0);
    items
        .into_iter()
        .filter(|i| {
            (filter.include_unavailable || i.is_available)
                && in_category(i, filter.category.as_deref())
        })
        .skip(skip)
        .take(limit)
        .collect()
}

/// Distinct categories, sorted
pub fn categories(items: &[MenuItem]) -> Vec<String> {
    let mut cats: Vec<String> = items.iter().map(|i| i.category.clone()).collect();
    cats.sort();
    cats.dedup();
    cats
}

/// Sort by category, then name
pub fn sort_items(items: &mut [MenuItem]) {
    items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
}

pub fn public_menu(restaurant: &Restaurant, items: Vec<MenuItem>, category: Option<&str>) -> PublicMenu {
    let mut items = public_items(items, category);
    sort_items(&mut items);
    PublicMenu {
        restaurant: RestaurantSummary::from(restaurant),
        categories: categories(&items),
        total_items: items.len(),
        items,
    }
}

/// Group available items by category; groups and their items sorted by name
pub fn group_by_category(items: Vec<MenuItem>) -> Vec<MenuCategoryGroup> {
    let mut groups: BTreeMap<String, Vec<MenuItem>> = BTreeMap::new();
    for item in public_items(items, None) {
        groups.entry(item.category.clone()).or_default().push(item);
    }
    groups
        .into_iter()
        .map(|(category, mut items)| {
            items.sort_by(|a, b| a.name.cmp(&b.name));
            MenuCategoryGroup {
                category,
                item_count: items.len(),
                items,
            }
        })
        .collect()
}

/// Case-insensitive substring match on name or description among available items
pub fn search(items: Vec<MenuItem>, query: &str, category: Option<&str>, limit: i64) -> Vec<MenuItem> {
    let needle = query.to_lowercase();
    let limit = usize::try_from(limit.max(0)).unwrap_or(0);
    let mut hits: Vec<MenuItem> = public_items(items, category)
        .into_iter()
        .filter(|i| {
            i.name.to_lowercase().contains(&needle)
                || i
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect();
    sort_items(&mut hits);
    hits.truncate(limit);
    hits
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    pub fn item(name: &str, category: &str, available: bool) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::nil(),
            name: name.to_string(),
            description: Some(format!("Fresh {name}")),
            price: Decimal::new(995, 2),
            category: category.to_string(),
            image_url: None,
            is_available: available,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<MenuItem> {
        vec![
            item("Tacos", "Mains", true),
            item("Burger", "Mains", false),
            item("Lemonade", "Drinks", true),
            item("Espresso", "Drinks", true),
            item("Flan", "Desserts", false),
        ]
    }

    fn names(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn unavailable_hidden_from_public_but_listed_for_owner() {
        let public = public_items(sample(), None);
        assert!(!names(&public).contains(&"Burger"));
        assert!(!names(&public).contains(&"Flan"));

        let owner = owner_items(sample(), &OwnerFilter::default());
        assert!(names(&owner).contains(&"Burger"));
        assert!(names(&owner).contains(&"Flan"));

        let owner_available = owner_items(
            sample(),
            &OwnerFilter {
                include_unavailable: false,
                ..OwnerFilter::default()
            },
        );
        assert_eq!(owner_available.len(), 3);
    }

    #[test]
    fn owner_paging_and_category() {
        let filter = OwnerFilter {
            category: Some("Drinks".into()),
            skip: 1,
            limit: 10,
            ..OwnerFilter::default()
        };
        assert_eq!(owner_items(sample(), &filter).len(), 1);
    }

    #[test]
    fn public_menu_sorts_and_counts() {
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            name: "Casa".into(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let menu = public_menu(&restaurant, sample(), None);
        assert_eq!(names(&menu.items), vec!["Espresso", "Lemonade", "Tacos"]);
        assert_eq!(menu.categories, vec!["Drinks", "Mains"]);
        assert_eq!(menu.total_items, 3);
        assert_eq!(menu.restaurant.name, "Casa");

        let drinks = public_menu(&restaurant, sample(), Some("Drinks"));
        assert_eq!(drinks.total_items, 2);
    }

    #[test]
    fn groups_only_available_categories() {
        let groups = group_by_category(sample());
        let cats: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(cats, vec!["Drinks", "Mains"]);
        assert_eq!(names(&groups[0].items), vec!["Espresso", "Lemonade"]);
        assert_eq!(groups[0].item_count, 2);
    }

    #[test]
    fn search_matches_name_or_description() {
        assert_eq!(names(&search(sample(), "TACO", None, 20)), vec!["Tacos"]);
        // description is "Fresh <name>"
        assert_eq!(search(sample(), "fresh", None, 20).len(), 3);
        assert_eq!(search(sample(), "fresh", None, 2).len(), 2);
        assert!(search(sample(), "burger", None, 20).is_empty());
        assert_eq!(search(sample(), "fresh", Some("Mains"), 20).len(), 1);
    }
}
