//! Batch-sampling temperature reader.
//!
//! Each reading is the per-channel mean of `samples_per_reading` accepted
//! batches.  A batch is rejected whole if any channel fails to read or
//! fails the sanity filter, so one noisy probe never skews the others and
//! every published value comes only from good samples.
//!
//! Retries are bounded by `max_batch_attempts`; a permanently faulted
//! probe yields [`SensorError::RetriesExhausted`] instead of stalling the
//! control tick.

use log::{debug, warn};

use crate::app::ports::TemperatureSource;
use crate::config::SystemConfig;
use crate::error::SensorError;

use super::{is_sane, AveragedTemperatures, Channel, TemperatureReading};

pub struct SensorReader {
    samples: usize,
    max_attempts: u32,
    /// Batches rejected during the most recent `read_averaged`.
    last_rejected: u32,
    /// First rejection reason seen during the most recent read.
    last_fault: Option<SensorError>,
}

impl SensorReader {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            samples: config.samples_per_reading,
            max_attempts: config.max_batch_attempts,
            last_rejected: 0,
            last_fault: None,
        }
    }

    /// Collect and average a full set of readings for all four channels.
    pub fn read_averaged(
        &mut self,
        source: &mut impl TemperatureSource,
    ) -> Result<AveragedTemperatures, SensorError> {
        self.last_rejected = 0;
        self.last_fault = None;

        let mut sums = [0.0f64; Channel::COUNT];
        let mut accepted = 0usize;
        let mut attempts = 0u32;

        while accepted < self.samples {
            if attempts >= self.max_attempts {
                warn!(
                    "sensor: {} of {} batches accepted after {} attempts, first fault: {:?}",
                    accepted, self.samples, attempts, self.last_fault
                );
                return Err(SensorError::RetriesExhausted { attempts });
            }
            attempts += 1;

            match Self::sample_batch(source) {
                Ok(batch) => {
                    for (sum, value) in sums.iter_mut().zip(batch) {
                        *sum += value;
                    }
                    accepted += 1;
                }
                Err(e) => {
                    debug!("sensor: batch {} rejected ({})", attempts, e);
                    self.last_rejected += 1;
                    self.last_fault.get_or_insert(e);
                }
            }
        }

        let n = accepted as f64;
        Ok(AveragedTemperatures::from_means(sums.map(|s| s / n)))
    }

    /// Averaged reading for a single channel.  Still samples the whole
    /// batch; the other channels are discarded.
    pub fn read_channel(
        &mut self,
        source: &mut impl TemperatureSource,
        channel: Channel,
    ) -> Result<TemperatureReading, SensorError> {
        Ok(self.read_averaged(source)?.reading(channel))
    }

    /// Batches rejected by the last read.
    pub fn last_rejected(&self) -> u32 {
        self.last_rejected
    }

    /// First rejection reason from the last read, if any.
    pub fn last_fault(&self) -> Option<SensorError> {
        self.last_fault
    }

    fn sample_batch(
        source: &mut impl TemperatureSource,
    ) -> Result<[f64; Channel::COUNT], SensorError> {
        source.request_conversion();

        let mut batch = [0.0f64; Channel::COUNT];
        for ch in Channel::ALL {
            let celsius = source.read_raw(ch)?;
            if !is_sane(celsius) {
                return Err(SensorError::OutOfRange(ch));
            }
            batch[ch.index()] = celsius;
        }
        Ok(batch)
    }
}
