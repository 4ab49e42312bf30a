//! Image slot resolution: from an item's validated tag map to the ordered
//! list of concrete slots a run classifies.

use coverscan_model::{ImageType, Item, Slot};

/// Resolve an item's concrete slots for the tracked types.
///
/// Single-slot types yield exactly one slot, present iff the item carries a
/// tag for them. Backdrop yields one present slot per index in ascending
/// order, or a single absent slot at index 0 when the item has none, so the
/// summary table always has a Backdrop cell to mark as missing. Output
/// order is canonical and independent of the tracked-set order.
pub fn resolve_slots(item: &Item, tracked: &[ImageType]) -> Vec<Slot> {
    let mut slots = Vec::new();
    for image_type in ImageType::canonical(tracked) {
        if image_type.is_multi_index() {
            match item.image_tags.get(&image_type) {
                Some(by_index) if !by_index.is_empty() => {
                    for (index, tag) in by_index {
                        slots.push(Slot::present(image_type, *index, tag.clone()));
                    }
                }
                _ => slots.push(Slot::absent(image_type, 0)),
            }
        } else {
            match item.tag(image_type, 0) {
                Some(tag) => slots.push(Slot::present(image_type, 0, tag)),
                None => slots.push(Slot::absent(image_type, 0)),
            }
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverscan_model::{ItemId, ItemKind};
    use std::collections::BTreeMap;

    fn item_with(tags: &[(ImageType, u32, &str)]) -> Item {
        let mut image_tags: BTreeMap<ImageType, BTreeMap<u32, String>> =
            BTreeMap::new();
        for (image_type, index, tag) in tags {
            image_tags
                .entry(*image_type)
                .or_default()
                .insert(*index, (*tag).to_owned());
        }
        Item {
            id: ItemId::from("item-1"),
            kind: ItemKind::Series,
            title: "Test".to_owned(),
            year: Some(2020),
            image_tags,
        }
    }

    #[test]
    fn test_zero_backdrops_yield_one_absent_slot() {
        let item = item_with(&[(ImageType::Primary, 0, "p")]);
        let slots =
            resolve_slots(&item, &[ImageType::Primary, ImageType::Backdrop]);
        assert_eq!(slots.len(), 2);
        assert!(slots[0].is_present());
        let backdrop = &slots[1];
        assert_eq!(backdrop.image_type, ImageType::Backdrop);
        assert_eq!(backdrop.index, 0);
        assert!(!backdrop.is_present());
    }

    #[test]
    fn test_multiple_backdrops_enumerate_ascending() {
        let item = item_with(&[
            (ImageType::Backdrop, 2, "b2"),
            (ImageType::Backdrop, 0, "b0"),
            (ImageType::Backdrop, 1, "b1"),
        ]);
        let slots = resolve_slots(&item, &[ImageType::Backdrop]);
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(Slot::is_present));
        assert_eq!(
            slots.iter().map(|slot| slot.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_order_is_canonical_not_selection_order() {
        let item = item_with(&[
            (ImageType::Logo, 0, "l"),
            (ImageType::Primary, 0, "p"),
        ]);
        let slots = resolve_slots(
            &item,
            &[ImageType::Logo, ImageType::Banner, ImageType::Primary],
        );
        assert_eq!(
            slots.iter().map(|slot| slot.image_type).collect::<Vec<_>>(),
            vec![ImageType::Primary, ImageType::Banner, ImageType::Logo]
        );
    }

    #[test]
    fn test_untracked_types_are_not_resolved() {
        let item = item_with(&[(ImageType::Disc, 0, "d")]);
        let slots = resolve_slots(&item, &[ImageType::Primary]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].image_type, ImageType::Primary);
    }
}
