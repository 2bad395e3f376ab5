//! Temperature acquisition: logical channels, the thermistor bank, and
//! the averaging [`SensorReader`](reader::SensorReader).
//!
//! ```text
//!   TemperatureSource ──▶ SensorReader ──▶ AveragedTemperatures ──▶ Thermostat
//!   (raw, per batch)      (filter, mean)   (immutable, per tick)
//! ```

pub mod reader;
pub mod thermistor;

use serde::Serialize;

/// Lowest plausible reading (exclusive).  Water at or below freezing in a
/// running heat pump loop means a disconnected or shorted probe.
pub const SANE_MIN_C: f64 = 0.0;
/// Highest plausible reading (exclusive).
pub const SANE_MAX_C: f64 = 100.0;

/// Upper bound on `samples_per_reading`.
pub const MAX_SAMPLES_PER_READING: usize = 32;

/// Sanity filter: `true` if `celsius` is a physically plausible water
/// temperature.  NaN is never sane.
pub fn is_sane(celsius: f64) -> bool {
    celsius > SANE_MIN_C && celsius < SANE_MAX_C
}

// ---------------------------------------------------------------------------
// Logical channels
// ---------------------------------------------------------------------------

/// The four fixed temperature probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Channel {
    /// Heat exchanger water inlet.
    HeatExIn = 0,
    /// Heat exchanger water outlet.
    HeatExOut = 1,
    /// Hot-water cylinder, top.
    HwcTop = 2,
    /// Hot-water cylinder, bottom.
    HwcBottom = 3,
}

impl Channel {
    pub const COUNT: usize = 4;

    /// Every channel, in batch order.
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::HeatExIn,
        Channel::HeatExOut,
        Channel::HwcTop,
        Channel::HwcBottom,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// One averaged, sanity-checked reading for a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub channel: Channel,
    pub celsius: f64,
}

/// The four readings produced together in one control cycle.
///
/// Only [`SensorReader`](reader::SensorReader) builds these, and only from
/// batches where every channel passed the sanity filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AveragedTemperatures {
    celsius: [f64; Channel::COUNT],
}

impl AveragedTemperatures {
    pub(crate) fn from_means(celsius: [f64; Channel::COUNT]) -> Self {
        debug_assert!(celsius.iter().all(|&c| is_sane(c)));
        Self { celsius }
    }

    pub fn reading(&self, channel: Channel) -> TemperatureReading {
        TemperatureReading {
            channel,
            celsius: self.celsius[channel.index()],
        }
    }

    pub fn celsius(&self, channel: Channel) -> f64 {
        self.celsius[channel.index()]
    }

    pub fn hex_in(&self) -> f64 {
        self.celsius(Channel::HeatExIn)
    }

    pub fn hex_out(&self) -> f64 {
        self.celsius(Channel::HeatExOut)
    }

    pub fn hwc_top(&self) -> f64 {
        self.celsius(Channel::HwcTop)
    }

    pub fn hwc_bottom(&self) -> f64 {
        self.celsius(Channel::HwcBottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanity_bounds_are_exclusive() {
        assert!(!is_sane(0.0));
        assert!(!is_sane(100.0));
        assert!(is_sane(0.01));
        assert!(is_sane(99.99));
        assert!(!is_sane(-127.0), "disconnected probe sentinel");
        assert!(!is_sane(f64::NAN));
    }

    #[test]
    fn channel_indices_match_batch_order() {
        for (i, ch) in Channel::ALL.iter().enumerate() {
            assert_eq!(ch.index(), i);
        }
    }

    #[test]
    fn readings_are_addressed_by_channel() {
        let t = AveragedTemperatures::from_means([30.0, 40.0, 56.0, 25.0]);
        assert_eq!(t.hex_in(), 30.0);
        assert_eq!(t.hex_out(), 40.0);
        assert_eq!(t.hwc_top(), 56.0);
        assert_eq!(t.hwc_bottom(), 25.0);
        assert_eq!(
            t.reading(Channel::HwcTop),
            TemperatureReading { channel: Channel::HwcTop, celsius: 56.0 }
        );
    }
}
