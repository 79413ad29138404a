//! Aspect scale factor advertised alongside each converted buffer

use super::frame::Size;

/// `max(w/h, h/w)` of the most recent frame size
///
/// Advisory metadata for the consumer's layout; conversion never reads it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Factor for a square (or not yet known) size
    pub const UNIT: ScaleFactor = ScaleFactor(1.0);

    /// Compute the factor for a size, or `None` if either side is zero
    pub fn from_size(size: Size) -> Option<Self> {
        Self::from_dimensions(size.width as f64, size.height as f64)
    }

    /// Compute the factor for arbitrary positive dimensions
    pub fn from_dimensions(width: f64, height: f64) -> Option<Self> {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return None;
        }
        Some(ScaleFactor((width / height).max(height / width)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub(crate) fn to_bits(self) -> u64 {
        self.0.to_bits()
    }

    pub(crate) fn from_bits(bits: u64) -> Self {
        ScaleFactor(f64::from_bits(bits))
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::UNIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_under_swap() {
        let sizes = [(640, 480), (1280, 720), (140, 240), (1, 1000), (333, 777)];
        for (w, h) in sizes {
            let a = ScaleFactor::from_size(Size::new(w, h)).unwrap();
            let b = ScaleFactor::from_size(Size::new(h, w)).unwrap();
            assert_eq!(a, b, "{w}x{h}");

            let expected = (w as f64 / h as f64).max(h as f64 / w as f64);
            assert_eq!(a.value(), expected);
        }
    }

    #[test]
    fn test_square_is_unit() {
        assert_eq!(ScaleFactor::from_size(Size::new(512, 512)), Some(ScaleFactor::UNIT));
        assert_eq!(ScaleFactor::default(), ScaleFactor::UNIT);
    }

    #[test]
    fn test_non_positive_rejected() {
        assert_eq!(ScaleFactor::from_size(Size::new(0, 480)), None);
        assert_eq!(ScaleFactor::from_dimensions(-1.0, 2.0), None);
        assert_eq!(ScaleFactor::from_dimensions(f64::NAN, 2.0), None);
        assert_eq!(ScaleFactor::from_dimensions(f64::INFINITY, 2.0), None);
    }

    #[test]
    fn test_bits_round_trip() {
        let factor = ScaleFactor::from_size(Size::new(1920, 1080)).unwrap();
        assert_eq!(ScaleFactor::from_bits(factor.to_bits()), factor);
    }
}
