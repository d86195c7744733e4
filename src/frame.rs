//! Decoding of the 32-bit MAX31855 frame.
//!
//! Refer to page 10 of [Maxim Integrated's MAX31855 specsheet](https://www.analog.com/media/en/technical-documentation/data-sheets/MAX31855.pdf)
//! for the memory map:
//!
//! | Bits    | Meaning                                          |
//! |---------|--------------------------------------------------|
//! | D31:D18 | signed 14-bit thermocouple temperature, 0.25 °C  |
//! | D17     | reserved                                         |
//! | D16     | fault (any of SCV, SCG, OC)                      |
//! | D15:D4  | signed 12-bit internal temperature, 0.0625 °C    |
//! | D3      | reserved                                         |
//! | D2      | SCV fault, thermocouple shorted to VCC           |
//! | D1      | SCG fault, thermocouple shorted to GND           |
//! | D0      | OC fault, thermocouple open                      |

use std::fmt;

/// Degrees Celsius per thermocouple count.
pub const THERMOCOUPLE_RESOLUTION: f64 = 0.25;

/// Degrees Celsius per internal (cold-junction) count.
pub const INTERNAL_RESOLUTION: f64 = 0.0625;

/// Exactly four bytes clocked out of the MAX31855, most significant first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct RawFrame([u8; 4]);

impl RawFrame {
    pub const LEN: usize = 4;

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Builds a frame from a big-endian 32-bit word (D31 is the top bit).
    pub const fn from_word(word: u32) -> Self {
        Self(word.to_be_bytes())
    }

    pub const fn word(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl From<[u8; 4]> for RawFrame {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The three specific fault flags from D2:D0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FaultBits(u8);

impl FaultBits {
    /// D2, thermocouple short-circuited to VCC.
    pub const SCV: u8 = 0x04;
    /// D1, thermocouple short-circuited to GND.
    pub const SCG: u8 = 0x02;
    /// D0, thermocouple open.
    pub const OC: u8 = 0x01;

    const MASK: u8 = Self::SCV | Self::SCG | Self::OC;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn scv(&self) -> bool {
        self.0 & Self::SCV != 0
    }

    pub const fn scg(&self) -> bool {
        self.0 & Self::SCG != 0
    }

    pub const fn oc(&self) -> bool {
        self.0 & Self::OC != 0
    }
}

impl fmt::Display for FaultBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let names = [
            (self.scv(), "short to VCC"),
            (self.scg(), "short to GND"),
            (self.oc(), "open circuit"),
        ];
        let mut first = true;
        for (_, name) in names.iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// Everything one frame tells us, still in raw counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedReading {
    thermocouple_temp_raw: i16,
    internal_temp_raw: i16,
    faults: FaultBits,
    summary_fault_bit: bool,
}

impl DecodedReading {
    /// Thermocouple temperature in quarter degrees, -8192..=8191.
    pub const fn thermocouple_temp_raw(&self) -> i16 {
        self.thermocouple_temp_raw
    }

    /// Internal temperature in sixteenth degrees, -2048..=2047.
    pub const fn internal_temp_raw(&self) -> i16 {
        self.internal_temp_raw
    }

    pub const fn faults(&self) -> FaultBits {
        self.faults
    }

    /// True when any of SCV, SCG or OC is set.
    ///
    /// This is computed from the three specific flags and never from D16.
    pub const fn fault(&self) -> bool {
        !self.faults.is_empty()
    }

    pub const fn scv_fault(&self) -> bool {
        self.faults.scv()
    }

    pub const fn scg_fault(&self) -> bool {
        self.faults.scg()
    }

    pub const fn oc_fault(&self) -> bool {
        self.faults.oc()
    }

    /// The D16 bit as the sensor reported it.
    pub const fn summary_fault_bit(&self) -> bool {
        self.summary_fault_bit
    }

    /// Whether a caller should refuse to trust this reading.
    pub const fn is_faulted(&self) -> bool {
        self.fault() || self.summary_fault_bit
    }

    pub fn thermocouple_celsius(&self) -> f64 {
        f64::from(self.thermocouple_temp_raw) * THERMOCOUPLE_RESOLUTION
    }

    pub fn internal_celsius(&self) -> f64 {
        f64::from(self.internal_temp_raw) * INTERNAL_RESOLUTION
    }
}

impl From<RawFrame> for DecodedReading {
    fn from(frame: RawFrame) -> Self {
        decode(frame)
    }
}

/// Decodes a frame. Never fails; faults are reported as data.
pub const fn decode(frame: RawFrame) -> DecodedReading {
    let [b0, b1, b2, b3] = frame.0;

    // Reinterpret as i16 first so the shift drags the sign bit down.
    // Reserved bits D17 and D3 fall off the bottom either way.
    let thermocouple_temp_raw = i16::from_be_bytes([b0, b1]) >> 2;
    let internal_temp_raw = i16::from_be_bytes([b2, b3]) >> 4;

    DecodedReading {
        thermocouple_temp_raw,
        internal_temp_raw,
        faults: FaultBits::from_bits(b3),
        summary_fault_bit: b1 & 0x01 != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_room_temperature_scenario() {
        let reading = decode(RawFrame::new([0x03, 0xE0, 0x0F, 0xF0]));

        assert_eq!(reading.thermocouple_temp_raw(), 248);
        assert_eq!(reading.internal_temp_raw(), 0xFF);
        assert!(!reading.is_faulted());
        assert_eq!(format!("{:.2}", reading.thermocouple_celsius()), "62.00");
    }

    #[test]
    fn thermocouple_extremes() {
        let max = decode(RawFrame::new([0x7F, 0xFC, 0x00, 0x00]));
        assert_eq!(max.thermocouple_temp_raw(), 8191);
        assert!(!max.is_faulted());

        let min = decode(RawFrame::new([0x80, 0x00, 0x00, 0x00]));
        assert_eq!(min.thermocouple_temp_raw(), -8192);
        assert!(!min.is_faulted());
    }

    #[test]
    fn negative_internal_temperature() {
        // -0.0625 °C is all ones in D15:D4
        let reading = decode(RawFrame::new([0x00, 0x00, 0xFF, 0xF0]));
        assert_eq!(reading.internal_temp_raw(), -1);
        assert_eq!(reading.internal_celsius(), -0.0625);
    }

    #[test]
    fn reserved_bits_are_ignored() {
        let clean = decode(RawFrame::new([0x19, 0x00, 0x0C, 0x80]));
        let noisy = decode(RawFrame::new([0x19, 0x02, 0x0C, 0x88]));

        assert_eq!(clean, noisy);
    }

    #[test]
    fn open_circuit_sets_derived_fault() {
        let reading = decode(RawFrame::new([0x00, 0x00, 0x00, 0x01]));

        assert!(reading.oc_fault());
        assert!(!reading.scv_fault());
        assert!(!reading.scg_fault());
        assert!(reading.fault());
        assert!(reading.is_faulted());
    }

    #[test]
    fn summary_bit_alone_gates_but_is_not_derived_fault() {
        let reading = decode(RawFrame::new([0x00, 0x01, 0x00, 0x00]));

        assert!(reading.summary_fault_bit());
        assert!(!reading.fault());
        assert!(reading.is_faulted());
    }

    #[test]
    fn fault_names() {
        assert_eq!(FaultBits::from_bits(0).to_string(), "none");
        assert_eq!(FaultBits::from_bits(FaultBits::OC).to_string(), "open circuit");
        assert_eq!(
            FaultBits::from_bits(FaultBits::SCV | FaultBits::SCG).to_string(),
            "short to VCC, short to GND"
        );
    }

    #[test]
    fn conversions_agree_with_decode() {
        let bytes = [0x03, 0xE0, 0x0F, 0xF5];
        let frame = RawFrame::from(bytes);

        assert_eq!(frame.as_ref(), &bytes[..]);
        assert_eq!(DecodedReading::from(frame), decode(frame));
        assert_eq!(decode(frame).faults().bits(), FaultBits::SCV | FaultBits::OC);
        assert_eq!(FaultBits::from_bits(0xFF).bits(), 0x07);
    }

    #[test]
    fn word_is_big_endian() {
        let frame = RawFrame::from_word(0x03E0_0FF0);
        assert_eq!(frame.bytes(), [0x03, 0xE0, 0x0F, 0xF0]);
        assert_eq!(frame.word(), 0x03E0_0FF0);
    }
}
