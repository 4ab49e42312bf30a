//! Run orchestration: load the catalog, probe artwork, classify, and
//! aggregate.
//!
//! Only the fetch layer is async; slot probes for independent slots run
//! concurrently but results are reassembled in slot order, so the report
//! model (and everything rendered from it) is deterministic for an
//! unchanged catalog.

use std::collections::HashMap;
use std::io::Cursor;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use coverscan_model::{
    Diagnostic, Dimensions, Report, RunOptions, Slot, SlotRef,
};

use crate::classify::classify_slots;
use crate::error::EngineError;
use crate::jellyfin::{FetchedImage, JellyfinClient};
use crate::report::aggregate;
use crate::slots::resolve_slots;

/// Fetched bytes per slot, kept when the run needs them again (embedded
/// HTML, ZIP export).
pub type SlotAssets = HashMap<SlotRef, FetchedImage>;

/// How many image probes run at once.
const PROBE_CONCURRENCY: usize = 8;

/// Everything one run produces before rendering.
#[derive(Debug)]
pub struct RunProduct {
    pub report: Report,
    pub assets: SlotAssets,
}

pub fn validate_options(options: &RunOptions) -> Result<(), EngineError> {
    if options.tracked.is_empty() {
        return Err(EngineError::InvalidOptions(
            "at least one image type must be tracked".to_owned(),
        ));
    }
    Ok(())
}

/// Execute one full inventory run against a library.
///
/// Fatal failures (unreachable server, rejected key, unknown library)
/// abort before anything is produced. Per-slot probe failures leave the
/// slot present-with-unknown-resolution and are accumulated as
/// diagnostics on the report. `keep_bytes` retains fetched image bytes in
/// the returned [`SlotAssets`] for embedded rendering or archive building.
pub async fn run(
    client: &JellyfinClient,
    library_name: &str,
    options: &RunOptions,
    keep_bytes: bool,
) -> Result<RunProduct, EngineError> {
    validate_options(options)?;

    let user_id = client.first_user_id().await?;
    let library = client.find_library(&user_id, library_name).await?;
    let items = client.library_items(&user_id, &library).await?;
    info!(items = items.len(), library = %library.name, "catalog loaded");

    let mut slots_by_item: Vec<Vec<Slot>> = items
        .iter()
        .map(|item| resolve_slots(item, &options.tracked))
        .collect();

    // One probe per present slot, indexed back into slots_by_item.
    let probes: Vec<(usize, usize, SlotRef, String)> = slots_by_item
        .iter()
        .enumerate()
        .flat_map(|(row_idx, slots)| {
            let item = &items[row_idx];
            slots.iter().enumerate().filter_map(move |(slot_idx, slot)| {
                let tag = slot.tag.as_deref()?;
                let slot_ref =
                    SlotRef::new(&item.id, slot.image_type, slot.index);
                let url = client.image_url(
                    &item.id,
                    slot.image_type,
                    slot.index,
                    tag,
                );
                Some((row_idx, slot_idx, slot_ref, url))
            })
        })
        .collect();

    let results: Vec<_> = stream::iter(probes.into_iter().map(
        |(row_idx, slot_idx, slot_ref, url)| async move {
            let fetched = client.fetch_image(&url).await;
            (row_idx, slot_idx, slot_ref, fetched)
        },
    ))
    .buffered(PROBE_CONCURRENCY)
    .collect()
    .await;

    let mut assets = SlotAssets::new();
    let mut diagnostics = Vec::new();
    for (row_idx, slot_idx, slot_ref, fetched) in results {
        let slot = &mut slots_by_item[row_idx][slot_idx];
        match fetched {
            Ok(image) => {
                match decode_dimensions(&image.bytes) {
                    Some(dims) => slot.dimensions = Some(dims),
                    None => {
                        slot.probe_failed = true;
                        diagnostics.push(Diagnostic {
                            item_title: items[row_idx].title.clone(),
                            slot: slot.label(),
                            reason: "image bytes could not be decoded"
                                .to_owned(),
                        });
                    }
                }
                if keep_bytes {
                    assets.insert(slot_ref, image);
                }
            }
            Err(err) => {
                debug!(slot = %slot.label(), error = %err, "probe failed");
                slot.probe_failed = true;
                diagnostics.push(Diagnostic {
                    item_title: items[row_idx].title.clone(),
                    slot: slot.label(),
                    reason: err.to_string(),
                });
            }
        }
    }

    for slots in &mut slots_by_item {
        classify_slots(slots, &options.thresholds);
    }

    let report = aggregate(
        &library.name,
        &options.tracked,
        items,
        slots_by_item,
        diagnostics,
    );
    Ok(RunProduct { report, assets })
}

/// Pixel dimensions from undecoded image bytes, `None` when the format is
/// unrecognizable or degenerate.
fn decode_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let (width, height) = reader.into_dimensions().ok()?;
    Dimensions::try_from((width, height)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use coverscan_model::ImageType;

    #[test]
    fn test_empty_tracked_set_is_rejected() {
        let options = RunOptions {
            tracked: Vec::new(),
            thresholds: Default::default(),
            colors: Default::default(),
            embedded: false,
        };
        assert!(matches!(
            validate_options(&options),
            Err(EngineError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_validate_accepts_tracked_types() {
        let options = RunOptions {
            tracked: vec![ImageType::Primary],
            thresholds: Default::default(),
            colors: Default::default(),
            embedded: false,
        };
        assert!(validate_options(&options).is_ok());
    }

    #[test]
    fn test_decode_dimensions_from_png_header() {
        // 1×1 transparent PNG.
        let png = BASE64
            .decode(
                "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==",
            )
            .unwrap();
        let dims = decode_dimensions(&png).unwrap();
        assert_eq!((dims.width_u32(), dims.height_u32()), (1, 1));
    }

    #[test]
    fn test_decode_dimensions_rejects_garbage() {
        assert!(decode_dimensions(b"not an image").is_none());
    }
}
