//! Resolution classification against per-run thresholds.

use coverscan_model::{Dimensions, Slot, Thresholds};

/// A present slot is low-resolution when it falls short of any configured
/// axis. Unset or zero thresholds disable that axis.
pub fn is_low_resolution(dimensions: Dimensions, thresholds: &Thresholds) -> bool {
    let under_width = thresholds
        .width_floor()
        .is_some_and(|floor| dimensions.width_u32() < floor);
    let under_height = thresholds
        .height_floor()
        .is_some_and(|floor| dimensions.height_u32() < floor);
    under_width || under_height
}

/// Apply the thresholds to every slot in place. Slots without dimensions
/// (absent, or present with a failed probe) are never flagged.
pub fn classify_slots(slots: &mut [Slot], thresholds: &Thresholds) {
    for slot in slots {
        slot.low_resolution = slot
            .dimensions
            .is_some_and(|dims| is_low_resolution(dims, thresholds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::try_from((width, height)).unwrap()
    }

    #[test]
    fn test_either_axis_flags() {
        let thresholds = Thresholds {
            min_width: Some(1000),
            min_height: Some(500),
        };
        assert!(is_low_resolution(dims(999, 600), &thresholds));
        assert!(is_low_resolution(dims(1200, 499), &thresholds));
        assert!(!is_low_resolution(dims(1000, 500), &thresholds));
    }

    #[test]
    fn test_zero_or_unset_threshold_never_flags() {
        let unset = Thresholds::default();
        assert!(!is_low_resolution(dims(1, 1), &unset));

        let zeroed = Thresholds {
            min_width: Some(0),
            min_height: None,
        };
        assert!(!is_low_resolution(dims(1, 1), &zeroed));
    }

    #[test]
    fn test_unknown_dimensions_are_not_flagged() {
        let thresholds = Thresholds {
            min_width: Some(4000),
            min_height: Some(4000),
        };
        let mut slots = vec![{
            let mut slot =
                Slot::present(coverscan_model::ImageType::Primary, 0, "t");
            slot.probe_failed = true;
            slot
        }];
        classify_slots(&mut slots, &thresholds);
        assert!(!slots[0].low_resolution);
    }

    #[test]
    fn test_classify_sets_flags_per_slot() {
        let thresholds = Thresholds {
            min_width: Some(800),
            min_height: None,
        };
        let mut small =
            Slot::present(coverscan_model::ImageType::Primary, 0, "a");
        small.dimensions = Some(dims(600, 900));
        let mut large =
            Slot::present(coverscan_model::ImageType::Backdrop, 0, "b");
        large.dimensions = Some(dims(1920, 1080));
        let mut slots = vec![small, large];
        classify_slots(&mut slots, &thresholds);
        assert!(slots[0].low_resolution);
        assert!(!slots[1].low_resolution);
    }
}
