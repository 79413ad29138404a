//! Presentation timing for converted samples
//!
//! Frames arrive at irregular intervals, so only the presentation timestamp
//! is meaningful. Duration and decode timestamp are always marked
//! indeterminate and the display surface schedules purely off presentation
//! time.

/// Ticks per second used for presentation timestamps (nanoseconds)
pub const NANOS_PER_SEC: i32 = 1_000_000_000;

/// Flag bits carried by a [`MediaTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeFlags(u32);

impl TimeFlags {
    /// The time holds a real value
    pub const VALID: u32 = 0x01;

    /// Create empty flags.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Create from raw u32 value.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Check if a flag is set.
    pub const fn contains(&self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }
}

/// A rational time value: `value / timescale` seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaTime {
    /// Numerator (ticks)
    pub value: i64,
    /// Ticks per second
    pub timescale: i32,
    /// Validity flags
    pub flags: TimeFlags,
}

impl MediaTime {
    /// The indeterminate time
    pub const INVALID: MediaTime = MediaTime {
        value: 0,
        timescale: 0,
        flags: TimeFlags::empty(),
    };

    /// A valid time of `nanos` nanoseconds
    pub const fn from_nanos(nanos: i64) -> Self {
        Self {
            value: nanos,
            timescale: NANOS_PER_SEC,
            flags: TimeFlags::from_bits(TimeFlags::VALID),
        }
    }

    /// Whether the time holds a usable value
    pub fn is_valid(&self) -> bool {
        self.flags.contains(TimeFlags::VALID) && self.timescale > 0
    }

    /// Value in nanoseconds, or `None` if invalid
    pub fn as_nanos(&self) -> Option<i64> {
        if !self.is_valid() {
            return None;
        }
        if self.timescale == NANOS_PER_SEC {
            return Some(self.value);
        }
        let nanos = self.value as i128 * NANOS_PER_SEC as i128 / self.timescale as i128;
        Some(nanos.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

/// Per-sample timing, mirroring a sample timing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingInfo {
    /// Always [`MediaTime::INVALID`]
    pub duration: MediaTime,
    /// Presentation timestamp in nanoseconds
    pub presentation_timestamp: MediaTime,
    /// Always [`MediaTime::INVALID`]
    pub decode_timestamp: MediaTime,
}

impl TimingInfo {
    /// Synthesize timing from a capture timestamp in seconds
    ///
    /// `pts = round(seconds * 1e9)` nanoseconds. NaN or infinite input is a
    /// producer contract violation; the float-to-int cast saturates rather
    /// than panicking.
    pub fn from_capture_seconds(seconds: f64) -> Self {
        let nanos = (seconds * NANOS_PER_SEC as f64).round() as i64;
        Self {
            duration: MediaTime::INVALID,
            presentation_timestamp: MediaTime::from_nanos(nanos),
            decode_timestamp: MediaTime::INVALID,
        }
    }
}
