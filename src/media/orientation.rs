//! Rotation to display orientation mapping

use super::frame::VideoRotation;

/// Orientation tag handed to the display surface
///
/// Two buckets only. The values match the EXIF / image-property
/// orientation codes the display layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayOrientation {
    /// Rotated 90° counter-clockwise (EXIF 8)
    Left,
    /// Rotated 90° clockwise (EXIF 6)
    Right,
}

impl DisplayOrientation {
    /// EXIF orientation code
    pub fn exif_value(&self) -> u32 {
        match self {
            DisplayOrientation::Left => 8,
            DisplayOrientation::Right => 6,
        }
    }

    /// Map a capture rotation to a display orientation
    ///
    /// 0°, 90° and 180° all map to `Right`; only 270° maps to `Left`.
    /// Anything else falls back to `Right`.
    pub fn from_rotation(rotation: VideoRotation) -> Self {
        match rotation {
            VideoRotation::Deg0 | VideoRotation::Deg90 | VideoRotation::Deg180 => {
                DisplayOrientation::Right
            }
            VideoRotation::Deg270 => DisplayOrientation::Left,
            VideoRotation::Other(_) => DisplayOrientation::Right,
        }
    }
}

impl From<VideoRotation> for DisplayOrientation {
    fn from(rotation: VideoRotation) -> Self {
        Self::from_rotation(rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_mapping() {
        assert_eq!(DisplayOrientation::from(VideoRotation::Deg0), DisplayOrientation::Right);
        assert_eq!(DisplayOrientation::from(VideoRotation::Deg90), DisplayOrientation::Right);
        assert_eq!(DisplayOrientation::from(VideoRotation::Deg180), DisplayOrientation::Right);
        assert_eq!(DisplayOrientation::from(VideoRotation::Deg270), DisplayOrientation::Left);
    }

    #[test]
    fn test_unknown_rotation_falls_back_to_right() {
        for degrees in [-90, 1, 45, 360, i32::MAX] {
            assert_eq!(
                DisplayOrientation::from(VideoRotation::from_degrees(degrees)),
                DisplayOrientation::Right,
                "rotation {degrees}"
            );
        }
    }

    #[test]
    fn test_exif_values() {
        assert_eq!(DisplayOrientation::Left.exif_value(), 8);
        assert_eq!(DisplayOrientation::Right.exif_value(), 6);
    }
}
