//! Report aggregation: fold per-item slot results into rows and run-level
//! counts.

use coverscan_model::{
    Diagnostic, ImageType, Item, Report, ReportRow, RunSummary, Slot,
};

use crate::titles::display_titles;

/// Build the full report model for one run.
///
/// `slots_by_item` must parallel `items`; rows keep the catalog order the
/// loader returned, which makes repeated runs over an unchanged catalog
/// byte-stable.
pub fn aggregate(
    library_name: &str,
    tracked: &[ImageType],
    items: Vec<Item>,
    slots_by_item: Vec<Vec<Slot>>,
    diagnostics: Vec<Diagnostic>,
) -> Report {
    debug_assert_eq!(items.len(), slots_by_item.len());

    let titles = display_titles(&items);
    let mut summary = RunSummary::default();
    let rows: Vec<ReportRow> = items
        .into_iter()
        .zip(slots_by_item)
        .zip(titles)
        .map(|((item, slots), display_title)| {
            let has_missing = slots.iter().any(|slot| !slot.is_present());
            let has_low_res = slots.iter().any(|slot| slot.low_resolution);
            if has_missing {
                summary.with_missing += 1;
            }
            if has_low_res {
                summary.with_low_res += 1;
            }
            if !has_missing && !has_low_res {
                summary.complete += 1;
            }
            ReportRow {
                item,
                display_title,
                slots,
                has_missing,
                has_low_res,
            }
        })
        .collect();

    Report {
        library_name: library_name.to_owned(),
        tracked: ImageType::canonical(tracked),
        rows,
        summary,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverscan_model::{Dimensions, ItemId, ItemKind};
    use std::collections::BTreeMap;

    fn item(id: &str, title: &str) -> Item {
        Item {
            id: ItemId::from(id),
            kind: ItemKind::Series,
            title: title.to_owned(),
            year: Some(2020),
            image_tags: BTreeMap::new(),
        }
    }

    fn present(image_type: ImageType, low_res: bool) -> Slot {
        let mut slot = Slot::present(image_type, 0, "t");
        slot.dimensions = Some(Dimensions::try_from((100, 100)).unwrap());
        slot.low_resolution = low_res;
        slot
    }

    #[test]
    fn test_flags_are_independent() {
        let items = vec![item("1", "All present, one small")];
        let slots = vec![vec![
            present(ImageType::Primary, true),
            present(ImageType::Backdrop, false),
        ]];
        let report = aggregate(
            "Lib",
            &[ImageType::Primary, ImageType::Backdrop],
            items,
            slots,
            Vec::new(),
        );
        let row = &report.rows[0];
        assert!(!row.has_missing);
        assert!(row.has_low_res);
    }

    #[test]
    fn test_summary_counts() {
        let items = vec![
            item("1", "Complete"),
            item("2", "Missing one"),
            item("3", "Small one"),
        ];
        let slots = vec![
            vec![present(ImageType::Primary, false)],
            vec![Slot::absent(ImageType::Primary, 0)],
            vec![present(ImageType::Primary, true)],
        ];
        let report =
            aggregate("Lib", &[ImageType::Primary], items, slots, Vec::new());
        assert_eq!(report.summary.complete, 1);
        assert_eq!(report.summary.with_missing, 1);
        assert_eq!(report.summary.with_low_res, 1);
    }

    #[test]
    fn test_rows_keep_catalog_order() {
        let items = vec![item("1", "Zebra"), item("2", "Aardvark")];
        let slots = vec![
            vec![present(ImageType::Primary, false)],
            vec![present(ImageType::Primary, false)],
        ];
        let report =
            aggregate("Lib", &[ImageType::Primary], items, slots, Vec::new());
        assert_eq!(report.rows[0].item.title, "Zebra");
        assert_eq!(report.rows[1].item.title, "Aardvark");
    }
}
