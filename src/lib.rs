//! # linux_max31855
//!
//! A library that helps you read from a MAX31855 over Linux SPI.
//!
//! ## Usage
//!
//! To use this library, you'll need to know which SPI device to select.
//! On Linux, you can use `ls /dev -1 | grep spidev` to figure it out!
//!
//! Then, you can use something like this example in your binary...
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     use linux_max31855::{Max31855, SpiConfig};
//!
//!     let max = Max31855::new(SpiConfig::new("/dev/spidev0.0"));
//!     println!("Read Celsius! Got: {}° C.", max.read_celsius()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! The frame decoding is usable without any hardware at all:
//!
//! ```
//! use linux_max31855::{decode, RawFrame};
//!
//! let reading = decode(RawFrame::new([0x03, 0xE0, 0x0F, 0xF0]));
//! assert_eq!(reading.thermocouple_temp_raw(), 248);
//! assert!(!reading.is_faulted());
//! ```

use std::{io, path::PathBuf};

use thiserror::Error;
use tracing::debug;

pub mod bus;
pub mod frame;

pub use bus::{read_frame, SpiConfig, DEFAULT_DEVICE, DEFAULT_SPEED_HZ};
pub use frame::{decode, DecodedReading, FaultBits, RawFrame};

/// An error emitted due to problems with the MAX31855.
#[derive(Debug, Error)]
pub enum Max31855Error {
    #[error("Error opening SPI device {}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Error configuring SPI device {}", .path.display())]
    Configure { path: PathBuf, source: io::Error },
    #[error("Error during SPI transfer on {}", .path.display())]
    Transfer { path: PathBuf, source: io::Error },
    #[error("SPI mode {0} doesn't exist, pick one of 0 through 3")]
    InvalidMode(u8),
    #[error("The MAX31855 reported a fault ({faults}; D16 set: {summary}). Please check the thermocouple connection and try again.")]
    Fault { faults: FaultBits, summary: bool },
    #[error("Couldn't write the reading")]
    Io(#[from] io::Error),
}

impl Max31855Error {
    /// Whether the sensor itself complained, as opposed to the bus.
    pub fn is_sensor_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }
}

/// A representation of the MAX31855 thermocouple digitizer.
///
/// The device node is only held open for the length of a single read.
#[derive(Clone, Debug)]
pub struct Max31855 {
    config: SpiConfig,
}

impl Max31855 {
    pub fn new(config: SpiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SpiConfig {
        &self.config
    }

    /// Tries to return the sensor's raw frame.
    ///
    /// Refer to page 10 of [Maxim Integrated's MAX31855 specsheet](https://www.analog.com/media/en/technical-documentation/data-sheets/MAX31855.pdf)
    /// for info on how to interpret it, or just hand it to [`decode`].
    pub fn read_frame(&self) -> Result<RawFrame, Max31855Error> {
        bus::read_frame(&self.config)
    }

    /// Reads and decodes one frame. Faults are left in the reading.
    pub fn read_reading(&self) -> Result<DecodedReading, Max31855Error> {
        let reading = decode(self.read_frame()?);
        if reading.is_faulted() {
            debug!(faults = %reading.faults(), summary = reading.summary_fault_bit(), "faulted reading");
        }
        Ok(reading)
    }

    /// Tries to read the thermocouple's temperature in Celsius.
    ///
    /// ## Example
    ///
    /// ```no_run
    /// use linux_max31855::{Max31855, SpiConfig};
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let tc = Max31855::new(SpiConfig::default());
    ///
    ///     let celsius = tc.read_celsius()?;
    ///     println!("it's {}° celsius in here!", celsius);
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn read_celsius(&self) -> Result<f64, Max31855Error> {
        self.read_reading()
            .and_then(|r| check(&r).map(|()| r.thermocouple_celsius()))
    }

    /// Tries to read the cold-junction temperature in Celsius.
    pub fn read_internal_celsius(&self) -> Result<f64, Max31855Error> {
        self.read_reading()
            .and_then(|r| check(&r).map(|()| r.internal_celsius()))
    }
}

/// Turns a faulted reading into [`Max31855Error::Fault`].
pub fn check(reading: &DecodedReading) -> Result<(), Max31855Error> {
    if reading.is_faulted() {
        return Err(Max31855Error::Fault {
            faults: reading.faults(),
            summary: reading.summary_fault_bit(),
        });
    }
    Ok(())
}

/// Writes the thermocouple temperature as `"{:.2}\n"`, optionally followed by
/// the internal temperature on a second line.
///
/// Nothing is written for a faulted reading.
pub fn report(
    reading: &DecodedReading,
    with_internal: bool,
    out: &mut impl io::Write,
) -> Result<(), Max31855Error> {
    check(reading)?;

    writeln!(out, "{:.2}", reading.thermocouple_celsius())?;
    if with_internal {
        writeln!(out, "{:.2}", reading.internal_celsius())?;
    }
    Ok(())
}
