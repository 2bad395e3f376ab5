//! GPIO / peripheral pin assignments for the HWC heat-pump controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Temperature sensors: NTC thermistors on ADC1
// ---------------------------------------------------------------------------

/// Heat-exchanger water inlet.  ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const HEX_IN_ADC_CH: u32 = 3;
/// Heat-exchanger water outlet.  ADC1 channel 4 (GPIO 5).
pub const HEX_OUT_ADC_CH: u32 = 4;
/// Cylinder top pocket.  ADC1 channel 5 (GPIO 6).
pub const HWC_TOP_ADC_CH: u32 = 5;
/// Cylinder bottom pocket.  ADC1 channel 6 (GPIO 7).
pub const HWC_BOTTOM_ADC_CH: u32 = 6;

/// ADC1 channels indexed by [`Channel::index`](crate::sensors::Channel::index).
pub const TEMP_ADC_CHANNELS: [u32; 4] = [
    HEX_IN_ADC_CH,
    HEX_OUT_ADC_CH,
    HWC_TOP_ADC_CH,
    HWC_BOTTOM_ADC_CH,
];

// ---------------------------------------------------------------------------
// Relays (opto-isolated relay board)
// ---------------------------------------------------------------------------

/// Compressor contactor coil relay.
pub const COMPRESSOR_RELAY_GPIO: i32 = 10;
/// Backup immersion heater relay.
pub const HEATER_RELAY_GPIO: i32 = 11;

/// The relay board pulls the coil in when its input is driven LOW.
pub const RELAY_ACTIVE_LOW: bool = true;

// ---------------------------------------------------------------------------
// Circulation pump (zero-cross SSR, software PWM)
// ---------------------------------------------------------------------------

/// SSR control input: HIGH = pump powered.
pub const PUMP_SSR_GPIO: i32 = 12;

