use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Non-zero pixel dimensions of a fetched image.
///
/// A slot whose bytes could not be fetched or decoded has no `Dimensions`
/// at all; a zero-sized answer from the decoder is treated the same way, so
/// downstream code never has to special-case 0×0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionsError {
    ZeroWidth,
    ZeroHeight,
}

impl Dimensions {
    pub const fn width_u32(self) -> u32 {
        self.width.get()
    }

    pub const fn height_u32(self) -> u32 {
        self.height.get()
    }
}

impl TryFrom<(u32, u32)> for Dimensions {
    type Error = DimensionsError;

    fn try_from(value: (u32, u32)) -> Result<Self, Self::Error> {
        let (width, height) = value;
        let width = NonZeroU32::new(width).ok_or(DimensionsError::ZeroWidth)?;
        let height = NonZeroU32::new(height).ok_or(DimensionsError::ZeroHeight)?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_axes() {
        assert_eq!(Dimensions::try_from((0, 1080)), Err(DimensionsError::ZeroWidth));
        assert_eq!(Dimensions::try_from((1920, 0)), Err(DimensionsError::ZeroHeight));
        assert!(Dimensions::try_from((1920, 1080)).is_ok());
    }

    #[test]
    fn test_display() {
        let dims = Dimensions::try_from((600, 900)).unwrap();
        assert_eq!(dims.to_string(), "600×900");
    }
}
