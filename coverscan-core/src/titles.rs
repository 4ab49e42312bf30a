//! Display-title disambiguation.

use std::collections::HashMap;

use coverscan_model::{Item, ItemKind};

/// Assign each item a display title, in input order.
///
/// Movies always carry their production year so the HTML report and ZIP
/// folder names stay consistent between runs and libraries. Other kinds
/// only get the year when their raw title collides with another item in
/// the run. Two items with the same title and the same (or no) year keep
/// identical display titles; that ambiguity is accepted rather than
/// resolved by some invented tiebreak.
pub fn display_titles(items: &[Item]) -> Vec<String> {
    let mut title_counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *title_counts.entry(item.title.as_str()).or_default() += 1;
    }

    items
        .iter()
        .map(|item| {
            let collides = title_counts
                .get(item.title.as_str())
                .is_some_and(|count| *count > 1);
            let wants_year = item.kind == ItemKind::Movie || collides;
            match (wants_year, item.year) {
                (true, Some(year)) => format!("{} ({})", item.title, year),
                _ => item.title.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverscan_model::ItemId;
    use std::collections::BTreeMap;

    fn item(id: &str, kind: ItemKind, title: &str, year: Option<i32>) -> Item {
        Item {
            id: ItemId::from(id),
            kind,
            title: title.to_owned(),
            year,
            image_tags: BTreeMap::new(),
        }
    }

    #[test]
    fn test_series_collision_gets_years() {
        let items = vec![
            item("1", ItemKind::Series, "Foo", Some(2001)),
            item("2", ItemKind::Series, "Foo", Some(2010)),
            item("3", ItemKind::Series, "Unique", Some(1995)),
        ];
        assert_eq!(
            display_titles(&items),
            vec!["Foo (2001)", "Foo (2010)", "Unique"]
        );
    }

    #[test]
    fn test_movie_always_gets_year() {
        let items = vec![item("1", ItemKind::Movie, "Bar", Some(1999))];
        assert_eq!(display_titles(&items), vec!["Bar (1999)"]);
    }

    #[test]
    fn test_movie_without_year_keeps_raw_title() {
        let items = vec![item("1", ItemKind::Movie, "Bar", None)];
        assert_eq!(display_titles(&items), vec!["Bar"]);
    }

    #[test]
    fn test_identical_title_and_year_stay_identical() {
        let items = vec![
            item("1", ItemKind::Series, "Twin", Some(2004)),
            item("2", ItemKind::Series, "Twin", Some(2004)),
        ];
        assert_eq!(display_titles(&items), vec!["Twin (2004)", "Twin (2004)"]);
    }

    #[test]
    fn test_collision_without_years_stays_raw() {
        let items = vec![
            item("1", ItemKind::Series, "Twin", None),
            item("2", ItemKind::Series, "Twin", None),
        ];
        assert_eq!(display_titles(&items), vec!["Twin", "Twin"]);
    }
}
