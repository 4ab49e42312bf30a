//! ZIP export: one folder per selected item, one file per selected present
//! slot.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use tracing::warn;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use coverscan_model::{ExportNaming, Report, SlotRef};

use crate::engine::SlotAssets;
use crate::error::EngineError;

/// Every resolved slot of the report, the default selection for a
/// whole-library export.
pub fn full_selection(report: &Report) -> BTreeSet<SlotRef> {
    report
        .rows
        .iter()
        .flat_map(|row| {
            row.slots.iter().map(|slot| {
                SlotRef::new(&row.item.id, slot.image_type, slot.index)
            })
        })
        .collect()
}

/// Build the export archive in memory.
///
/// Items keep report order. A selected slot that is absent on the server
/// contributes nothing (the item's folder is still created), as does a
/// present slot whose bytes could not be fetched; neither is an error.
/// Multi-index slots get a one-based, zero-padded two-digit suffix,
/// single-slot types none.
pub fn build_zip(
    report: &Report,
    selection: &BTreeSet<SlotRef>,
    naming: &ExportNaming,
    assets: &SlotAssets,
) -> Result<Vec<u8>, EngineError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    for row in &report.rows {
        let selected: Vec<_> = row
            .slots
            .iter()
            .filter(|slot| {
                selection.contains(&SlotRef::new(
                    &row.item.id,
                    slot.image_type,
                    slot.index,
                ))
            })
            .collect();
        if selected.is_empty() {
            continue;
        }

        let folder = sanitize(naming.folder_name(&row.item.id, &row.display_title));
        writer.add_directory(format!("{folder}/"), options)?;

        for slot in selected {
            if !slot.is_present() {
                continue;
            }
            let slot_ref =
                SlotRef::new(&row.item.id, slot.image_type, slot.index);
            let Some(asset) = assets.get(&slot_ref) else {
                warn!(
                    item = %row.display_title,
                    slot = %slot.label(),
                    "no fetched bytes for selected slot, skipping"
                );
                continue;
            };
            let base = naming.file_basename(slot.image_type);
            let suffix = if slot.image_type.is_multi_index() {
                format!("{:02}", slot.index + 1)
            } else {
                String::new()
            };
            let name = format!(
                "{folder}/{}{suffix}.{}",
                sanitize(base),
                asset.extension()
            );
            writer.start_file(name, options)?;
            writer.write_all(&asset.bytes)?;
        }
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Keep archive entry names path-safe without mangling ordinary titles.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            _ => ch,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "untitled".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jellyfin::FetchedImage;
    use crate::report::aggregate;
    use coverscan_model::{
        ImageType, Item, ItemId, ItemKind, Slot,
    };
    use std::collections::{BTreeMap, HashMap};

    fn jpeg(byte: u8) -> FetchedImage {
        FetchedImage {
            content_type: "image/jpeg".to_owned(),
            bytes: vec![byte; 8],
        }
    }

    fn report_with_backdrops() -> (Report, SlotAssets) {
        let item = Item {
            id: ItemId::from("i1"),
            kind: ItemKind::Movie,
            title: "Bar".to_owned(),
            year: Some(1999),
            image_tags: BTreeMap::new(),
        };
        let slots = vec![
            Slot::present(ImageType::Primary, 0, "p"),
            Slot::present(ImageType::Backdrop, 0, "b0"),
            Slot::present(ImageType::Backdrop, 1, "b1"),
            Slot::absent(ImageType::Logo, 0),
        ];
        let report = aggregate(
            "Lib",
            &[ImageType::Primary, ImageType::Backdrop, ImageType::Logo],
            vec![item],
            vec![slots],
            Vec::new(),
        );
        let mut assets: SlotAssets = HashMap::new();
        let id = ItemId::from("i1");
        assets.insert(SlotRef::new(&id, ImageType::Primary, 0), jpeg(1));
        assets.insert(SlotRef::new(&id, ImageType::Backdrop, 0), jpeg(2));
        assets.insert(SlotRef::new(&id, ImageType::Backdrop, 1), jpeg(3));
        (report, assets)
    }

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_owned())
            .collect()
    }

    #[test]
    fn test_multi_index_suffix_and_overrides() {
        let (report, assets) = report_with_backdrops();
        let mut naming = ExportNaming::default();
        naming
            .file_basenames
            .insert(ImageType::Backdrop, "bg".to_owned());
        naming
            .file_basenames
            .insert(ImageType::Primary, "front".to_owned());
        let selection = full_selection(&report);
        let bytes =
            build_zip(&report, &selection, &naming, &assets).unwrap();
        let names = entry_names(bytes);
        assert!(names.contains(&"Bar (1999)/front.jpg".to_owned()));
        assert!(names.contains(&"Bar (1999)/bg01.jpg".to_owned()));
        assert!(names.contains(&"Bar (1999)/bg02.jpg".to_owned()));
    }

    #[test]
    fn test_absent_selected_slot_is_skipped_folder_remains() {
        let (report, assets) = report_with_backdrops();
        let id = ItemId::from("i1");
        let mut selection = BTreeSet::new();
        selection.insert(SlotRef::new(&id, ImageType::Logo, 0));
        let bytes = build_zip(
            &report,
            &selection,
            &ExportNaming::default(),
            &assets,
        )
        .unwrap();
        let names = entry_names(bytes);
        assert_eq!(names, vec!["Bar (1999)/".to_owned()]);
    }

    #[test]
    fn test_folder_override_replaces_display_title() {
        let (report, assets) = report_with_backdrops();
        let id = ItemId::from("i1");
        let mut naming = ExportNaming::default();
        naming.folder_overrides.insert(id.clone(), "exports".to_owned());
        let mut selection = BTreeSet::new();
        selection.insert(SlotRef::new(&id, ImageType::Primary, 0));
        let bytes = build_zip(&report, &selection, &naming, &assets).unwrap();
        let names = entry_names(bytes);
        assert!(names.contains(&"exports/cover.jpg".to_owned()));
    }

    #[test]
    fn test_unselected_items_get_no_folder() {
        let (report, assets) = report_with_backdrops();
        let selection = BTreeSet::new();
        let bytes = build_zip(
            &report,
            &selection,
            &ExportNaming::default(),
            &assets,
        )
        .unwrap();
        assert!(entry_names(bytes).is_empty());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a/b\\c:d"), "a-b-c-d");
        assert_eq!(sanitize("  .."), "untitled");
        assert_eq!(sanitize("Bar (1999)"), "Bar (1999)");
    }
}
