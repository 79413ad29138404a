//! Timed, display-ready sample buffers
//!
//! A [`TimedMediaBuffer`] pairs a pixel buffer with the format description
//! derived from it, its timing, and the attachments the display surface
//! reads (display-immediately, orientation).

use super::error::ConversionError;
use super::frame::{PixelBuffer, PixelFormat, Size};
use super::orientation::DisplayOrientation;
use super::timing::TimingInfo;

/// Video format description derived from a pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescription {
    /// Pixel layout
    pub pixel_format: PixelFormat,
    /// Media subtype (four-character code)
    pub media_subtype: u32,
    /// Encoded dimensions
    pub dimensions: Size,
}

impl FormatDescription {
    /// Derive a description from a pixel buffer's dimensions and format
    pub fn for_pixel_buffer(buffer: &PixelBuffer) -> Result<Self, ConversionError> {
        if buffer.width == 0 || buffer.height == 0 {
            return Err(ConversionError::FormatDescriptionFailed(format!(
                "empty dimensions {}x{}",
                buffer.width, buffer.height
            )));
        }

        let min_stride = (buffer.width as usize).saturating_mul(buffer.format.bytes_per_pixel());
        if buffer.bytes_per_row < min_stride {
            return Err(ConversionError::FormatDescriptionFailed(format!(
                "stride {} shorter than row of {} bytes",
                buffer.bytes_per_row, min_stride
            )));
        }

        let required = buffer.required_len().ok_or_else(|| {
            ConversionError::FormatDescriptionFailed("plane layout overflows".into())
        })?;
        if buffer.data.len() < required {
            return Err(ConversionError::FormatDescriptionFailed(format!(
                "buffer holds {} bytes, layout needs {}",
                buffer.data.len(),
                required
            )));
        }

        Ok(Self {
            pixel_format: buffer.format,
            media_subtype: buffer.format.fourcc(),
            dimensions: buffer.size(),
        })
    }

    /// Whether this description describes `buffer`
    pub fn matches(&self, buffer: &PixelBuffer) -> bool {
        self.pixel_format == buffer.format && self.dimensions == buffer.size()
    }
}

/// Per-sample attachments read by the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleAttachments {
    /// Render without additional latency buffering
    pub display_immediately: bool,
    /// Orientation to apply when rendering, once a sink has stamped it
    pub orientation: Option<DisplayOrientation>,
}

/// A timestamped, format-tagged image buffer ready for display
#[derive(Debug, Clone)]
pub struct TimedMediaBuffer {
    image: PixelBuffer,
    format: FormatDescription,
    timing: TimingInfo,
    attachments: SampleAttachments,
}

impl TimedMediaBuffer {
    /// Build a ready sample from an image buffer
    ///
    /// Fails if the description does not describe the image or the
    /// presentation timestamp is not a valid time.
    pub fn new(
        image: PixelBuffer,
        format: FormatDescription,
        timing: TimingInfo,
    ) -> Result<Self, ConversionError> {
        if !format.matches(&image) {
            return Err(ConversionError::SampleConstructionFailed(format!(
                "format {:?} {}x{} does not describe image {:?} {}x{}",
                format.pixel_format,
                format.dimensions.width,
                format.dimensions.height,
                image.format,
                image.width,
                image.height
            )));
        }
        if !timing.presentation_timestamp.is_valid() {
            return Err(ConversionError::SampleConstructionFailed(
                "presentation timestamp is not valid".into(),
            ));
        }

        Ok(Self {
            image,
            format,
            timing,
            attachments: SampleAttachments::default(),
        })
    }

    /// Request that the surface render this sample without buffering
    pub fn mark_display_immediately(&mut self) {
        self.attachments.display_immediately = true;
    }

    /// Stamp the display orientation
    pub fn set_orientation(&mut self, orientation: DisplayOrientation) {
        self.attachments.orientation = Some(orientation);
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    pub fn format(&self) -> &FormatDescription {
        &self.format
    }

    pub fn timing(&self) -> &TimingInfo {
        &self.timing
    }

    pub fn attachments(&self) -> &SampleAttachments {
        &self.attachments
    }

    /// Presentation timestamp in nanoseconds
    pub fn presentation_nanos(&self) -> i64 {
        // Validity is checked at construction
        self.timing.presentation_timestamp.as_nanos().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::media::timing::MediaTime;

    #[test]
    fn test_format_description_from_buffer() {
        let buffer = PixelBuffer::zeroed(PixelFormat::Bgra32, 640, 480);
        let format = FormatDescription::for_pixel_buffer(&buffer).unwrap();

        assert_eq!(format.pixel_format, PixelFormat::Bgra32);
        assert_eq!(format.media_subtype, PixelFormat::Bgra32.fourcc());
        assert_eq!(format.dimensions, Size::new(640, 480));
        assert!(format.matches(&buffer));
    }

    #[test]
    fn test_format_description_rejects_empty() {
        let buffer = PixelBuffer::new(PixelFormat::Nv12, 0, 480, 0, Bytes::new());
        let result = FormatDescription::for_pixel_buffer(&buffer);

        assert!(matches!(
            result,
            Err(ConversionError::FormatDescriptionFailed(_))
        ));
    }

    #[test]
    fn test_format_description_rejects_short_stride() {
        let buffer = PixelBuffer::new(PixelFormat::Bgra32, 4, 4, 8, Bytes::from(vec![0u8; 64]));
        let result = FormatDescription::for_pixel_buffer(&buffer);

        assert!(matches!(
            result,
            Err(ConversionError::FormatDescriptionFailed(_))
        ));
    }

    #[test]
    fn test_format_description_rejects_truncated_data() {
        // NV12 4x4 needs 16 luma + 8 chroma bytes
        let buffer = PixelBuffer::new(PixelFormat::Nv12, 4, 4, 4, Bytes::from(vec![0u8; 16]));
        let result = FormatDescription::for_pixel_buffer(&buffer);

        assert!(matches!(
            result,
            Err(ConversionError::FormatDescriptionFailed(_))
        ));
    }

    #[test]
    fn test_format_description_rejects_overflowing_stride() {
        let buffer = PixelBuffer::new(PixelFormat::Bgra32, 1, 2, 1usize << 63, Bytes::new());
        let result = FormatDescription::for_pixel_buffer(&buffer);

        assert_eq!(
            result,
            Err(ConversionError::FormatDescriptionFailed(
                "plane layout overflows".into()
            ))
        );
    }

    #[test]
    fn test_sample_rejects_mismatched_format() {
        let small = PixelBuffer::zeroed(PixelFormat::Nv12, 4, 4);
        let large = PixelBuffer::zeroed(PixelFormat::Nv12, 8, 8);
        let format = FormatDescription::for_pixel_buffer(&large).unwrap();

        let result = TimedMediaBuffer::new(small, format, TimingInfo::from_capture_seconds(0.0));
        assert!(matches!(
            result,
            Err(ConversionError::SampleConstructionFailed(_))
        ));
    }

    #[test]
    fn test_sample_rejects_invalid_pts() {
        let image = PixelBuffer::zeroed(PixelFormat::Nv12, 4, 4);
        let format = FormatDescription::for_pixel_buffer(&image).unwrap();
        let timing = TimingInfo {
            duration: MediaTime::INVALID,
            presentation_timestamp: MediaTime::INVALID,
            decode_timestamp: MediaTime::INVALID,
        };

        let result = TimedMediaBuffer::new(image, format, timing);
        assert!(matches!(
            result,
            Err(ConversionError::SampleConstructionFailed(_))
        ));
    }

    #[test]
    fn test_attachments() {
        let image = PixelBuffer::zeroed(PixelFormat::Bgra32, 2, 2);
        let format = FormatDescription::for_pixel_buffer(&image).unwrap();
        let mut sample =
            TimedMediaBuffer::new(image, format, TimingInfo::from_capture_seconds(1.5)).unwrap();

        assert_eq!(*sample.attachments(), SampleAttachments::default());

        sample.mark_display_immediately();
        sample.set_orientation(DisplayOrientation::Left);

        assert!(sample.attachments().display_immediately);
        assert_eq!(sample.attachments().orientation, Some(DisplayOrientation::Left));
        assert_eq!(sample.presentation_nanos(), 1_500_000_000);
    }
}
