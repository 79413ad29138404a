//! Decoded video frames as delivered by the RTC pipeline
//!
//! A [`VideoFrame`] is owned by the producing pipeline. The converter only
//! borrows it for the duration of one conversion call.

use bytes::Bytes;

/// Pixel layouts a native pixel buffer may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Bi-planar 4:2:0, video range ('420v')
    Nv12,
    /// Bi-planar 4:2:0, full range ('420f')
    Nv12FullRange,
    /// Packed 32-bit BGRA ('BGRA')
    Bgra32,
    /// Packed 4:2:2 ('2vuy')
    Uyvy,
}

impl PixelFormat {
    /// Four-character code identifying the format
    pub fn fourcc(&self) -> u32 {
        #[allow(clippy::mistyped_literal_suffixes)]
        match self {
            PixelFormat::Nv12 => 0x34_32_30_76,          // '420v'
            PixelFormat::Nv12FullRange => 0x34_32_30_66, // '420f'
            PixelFormat::Bgra32 => 0x42_47_52_41,        // 'BGRA'
            PixelFormat::Uyvy => 0x32_76_75_79,          // '2vuy'
        }
    }

    /// Look up a format by its four-character code
    pub fn from_fourcc(fourcc: u32) -> Option<Self> {
        #[allow(clippy::mistyped_literal_suffixes)]
        match fourcc {
            0x34_32_30_76 => Some(PixelFormat::Nv12),
            0x34_32_30_66 => Some(PixelFormat::Nv12FullRange),
            0x42_47_52_41 => Some(PixelFormat::Bgra32),
            0x32_76_75_79 => Some(PixelFormat::Uyvy),
            _ => None,
        }
    }

    /// Bytes per pixel in the first plane
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Nv12 | PixelFormat::Nv12FullRange => 1,
            PixelFormat::Uyvy => 2,
            PixelFormat::Bgra32 => 4,
        }
    }

    /// Whether the format stores chroma in a second, half-height plane
    pub fn is_biplanar(&self) -> bool {
        matches!(self, PixelFormat::Nv12 | PixelFormat::Nv12FullRange)
    }
}

/// Pixel dimensions of a frame or surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A native pixel buffer handle
///
/// Cheap to clone: the pixel data is reference counted, so every sink that
/// receives a buffer shares the same allocation.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    /// Pixel layout
    pub format: PixelFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Stride of the first plane in bytes
    pub bytes_per_row: usize,
    /// All planes, back to back
    pub data: Bytes,
}

impl PixelBuffer {
    /// Create a pixel buffer over existing data
    pub fn new(format: PixelFormat, width: u32, height: u32, bytes_per_row: usize, data: Bytes) -> Self {
        Self {
            format,
            width,
            height,
            bytes_per_row,
            data,
        }
    }

    /// Create a zero-filled, tightly packed buffer
    ///
    /// Dimensions whose layout does not fit in memory get an empty data
    /// block, which format description then rejects.
    pub fn zeroed(format: PixelFormat, width: u32, height: u32) -> Self {
        let bytes_per_row = (width as usize).saturating_mul(format.bytes_per_pixel());
        let len = Self::plane_bytes(format, bytes_per_row, height).unwrap_or(0);
        Self::new(format, width, height, bytes_per_row, Bytes::from(vec![0u8; len]))
    }

    /// Pixel dimensions
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Number of bytes the plane layout requires, or `None` if it overflows
    pub fn required_len(&self) -> Option<usize> {
        Self::plane_bytes(self.format, self.bytes_per_row, self.height)
    }

    fn plane_bytes(format: PixelFormat, bytes_per_row: usize, height: u32) -> Option<usize> {
        let luma = bytes_per_row.checked_mul(height as usize)?;
        if format.is_biplanar() {
            // Interleaved CbCr plane at half height, same stride
            let chroma = bytes_per_row.checked_mul((height as usize).div_ceil(2))?;
            luma.checked_add(chroma)
        } else {
            Some(luma)
        }
    }
}

/// Rotation the producer applied when capturing the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoRotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
    /// A value outside the four quadrants
    Other(i32),
}

impl VideoRotation {
    /// Interpret a raw rotation in degrees
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            0 => VideoRotation::Deg0,
            90 => VideoRotation::Deg90,
            180 => VideoRotation::Deg180,
            270 => VideoRotation::Deg270,
            other => VideoRotation::Other(other),
        }
    }

    /// Raw rotation in degrees
    pub fn degrees(&self) -> i32 {
        match self {
            VideoRotation::Deg0 => 0,
            VideoRotation::Deg90 => 90,
            VideoRotation::Deg180 => 180,
            VideoRotation::Deg270 => 270,
            VideoRotation::Other(d) => *d,
        }
    }
}

impl From<i32> for VideoRotation {
    fn from(degrees: i32) -> Self {
        Self::from_degrees(degrees)
    }
}

/// A decoded frame from a remote or local track
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Native pixel buffer; `None` when the producer delivered a buffer
    /// type that is not backed by one (e.g. a software I420 frame)
    pub buffer: Option<PixelBuffer>,
    /// Capture rotation
    pub rotation: VideoRotation,
    /// Capture timestamp in seconds on a monotonic clock with arbitrary epoch
    pub timestamp: f64,
}

impl VideoFrame {
    /// Create a frame backed by a native pixel buffer
    pub fn new(buffer: PixelBuffer, rotation: VideoRotation, timestamp: f64) -> Self {
        Self {
            buffer: Some(buffer),
            rotation,
            timestamp,
        }
    }

    /// Create a frame without a native pixel buffer
    pub fn without_buffer(rotation: VideoRotation, timestamp: f64) -> Self {
        Self {
            buffer: None,
            rotation,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_lookup() {
        for format in [
            PixelFormat::Nv12,
            PixelFormat::Nv12FullRange,
            PixelFormat::Bgra32,
            PixelFormat::Uyvy,
        ] {
            assert_eq!(PixelFormat::from_fourcc(format.fourcc()), Some(format));
        }
        assert_eq!(PixelFormat::from_fourcc(0x6A_70_65_67), None); // 'jpeg'
    }

    #[test]
    fn test_zeroed_nv12_layout() {
        let buffer = PixelBuffer::zeroed(PixelFormat::Nv12, 4, 3);

        assert_eq!(buffer.bytes_per_row, 4);
        // 4x3 luma + 4x2 chroma
        assert_eq!(buffer.data.len(), 20);
        assert_eq!(buffer.required_len(), Some(20));
    }

    #[test]
    fn test_required_len_overflow() {
        let buffer = PixelBuffer::new(PixelFormat::Bgra32, 1, 2, 1usize << 63, Bytes::new());
        assert_eq!(buffer.required_len(), None);

        let buffer = PixelBuffer::new(PixelFormat::Nv12, 1, 3, usize::MAX / 3, Bytes::new());
        assert_eq!(buffer.required_len(), None);
    }

    #[test]
    fn test_zeroed_bgra_layout() {
        let buffer = PixelBuffer::zeroed(PixelFormat::Bgra32, 2, 2);

        assert_eq!(buffer.bytes_per_row, 8);
        assert_eq!(buffer.data.len(), 16);
        assert_eq!(buffer.size(), Size::new(2, 2));
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(VideoRotation::from(0), VideoRotation::Deg0);
        assert_eq!(VideoRotation::from(270), VideoRotation::Deg270);
        assert_eq!(VideoRotation::from(45), VideoRotation::Other(45));
        assert_eq!(VideoRotation::Other(-90).degrees(), -90);
    }
}
