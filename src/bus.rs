//! One read-only SPI transaction against a spidev node.

use std::path::PathBuf;

use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use tracing::{debug, trace};

use crate::{frame::RawFrame, Max31855Error};

/// Where the MAX31855 usually lives on a Raspberry Pi.
pub const DEFAULT_DEVICE: &str = "/dev/spidev0.0";

/// Clock rate for the read. The MAX31855 tops out at 5 MHz.
pub const DEFAULT_SPEED_HZ: u32 = 500_000;

/// How to reach the sensor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpiConfig {
    pub path: PathBuf,
    pub speed_hz: u32,
    pub bits_per_word: u8,
    /// SPI mode, 0 through 3.
    pub mode: u8,
}

impl SpiConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn speed_hz(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    pub fn mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    fn mode_flags(&self) -> Result<SpiModeFlags, Max31855Error> {
        match self.mode {
            0 => Ok(SpiModeFlags::SPI_MODE_0),
            1 => Ok(SpiModeFlags::SPI_MODE_1),
            2 => Ok(SpiModeFlags::SPI_MODE_2),
            3 => Ok(SpiModeFlags::SPI_MODE_3),
            mode => Err(Max31855Error::InvalidMode(mode)),
        }
    }

    fn options(&self) -> Result<SpidevOptions, Max31855Error> {
        Ok(SpidevOptions::new()
            .bits_per_word(self.bits_per_word)
            .max_speed_hz(self.speed_hz)
            .mode(self.mode_flags()?)
            .build())
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DEVICE),
            speed_hz: DEFAULT_SPEED_HZ,
            bits_per_word: 8,
            mode: 0,
        }
    }
}

/// Opens the device, clocks out exactly four bytes and closes it again.
///
/// The handle is dropped on every return path, including a failed transfer.
pub fn read_frame(config: &SpiConfig) -> Result<RawFrame, Max31855Error> {
    let options = config.options()?;

    let mut spi = Spidev::open(&config.path).map_err(|source| Max31855Error::Open {
        path: config.path.clone(),
        source,
    })?;
    spi.configure(&options)
        .map_err(|source| Max31855Error::Configure {
            path: config.path.clone(),
            source,
        })?;
    debug!(
        path = %config.path.display(),
        speed_hz = config.speed_hz,
        mode = config.mode,
        "opened SPI device"
    );

    // Read-only: no tx buffer, the sensor ignores MOSI.
    let mut buf = [0_u8; RawFrame::LEN];
    {
        let mut transfer = SpidevTransfer::read(&mut buf);
        spi.transfer(&mut transfer)
            .map_err(|source| Max31855Error::Transfer {
                path: config.path.clone(),
                source,
            })?;
    }
    trace!(bytes = ?buf, "SPI transfer complete");

    Ok(RawFrame::new(buf))
}
