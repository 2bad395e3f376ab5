//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `hardware`     | TemperatureSource  | NTC thermistors on ADC1      |
//! |                | ActuatorSink       | relay GPIOs, pump SSR        |
//! | `log_sink`     | EventSink          | Serial log + diagnostic ring |
//! | `time`         | Clock              | ESP32 system timer           |

pub mod hardware;
pub mod log_sink;
pub mod time;
