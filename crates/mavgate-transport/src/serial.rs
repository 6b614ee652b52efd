//! Serial line configuration.
//!
//! The textual form is `baudrate[,parity[,data_bits[,stop_bits]]]`, e.g.
//! `57600`, `115200,N,8,1` or `9600,E,7,2`. Empty optional fields take the
//! defaults below.

use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

pub const DEFAULT_PARITY: Parity = Parity::None;
pub const DEFAULT_DATA_BITS: u8 = 8;
pub const DEFAULT_STOP_BITS: StopBits = StopBits::One;

const MAX_FIELDS: usize = 4;

const PARITY_ERROR: &str = "parity configuration must be either empty or one of N, O, E, M, or S";
const DATA_BITS_ERROR: &str = "data bits must be either empty or one of 5, 6, 7, or 8";
const STOP_BITS_ERROR: &str = "stop bits must be either empty or one of 1, 1.5, or 2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    fn parse(code: &str) -> Result<Self, TransportError> {
        match code {
            "N" => Ok(Self::None),
            "O" => Ok(Self::Odd),
            "E" => Ok(Self::Even),
            "M" => Ok(Self::Mark),
            "S" => Ok(Self::Space),
            _ => Err(invalid(PARITY_ERROR)),
        }
    }

    /// Human readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Odd => "Odd",
            Self::Even => "Even",
            Self::Mark => "Mark",
            Self::Space => "Space",
        }
    }

    /// Single-letter code used in configuration strings.
    pub fn code(self) -> char {
        match self {
            Self::None => 'N',
            Self::Odd => 'O',
            Self::Even => 'E',
            Self::Mark => 'M',
            Self::Space => 'S',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    OneAndHalf,
    Two,
}

impl StopBits {
    fn parse(code: &str) -> Result<Self, TransportError> {
        match code {
            "1" => Ok(Self::One),
            "1.5" => Ok(Self::OneAndHalf),
            "2" => Ok(Self::Two),
            _ => Err(invalid(STOP_BITS_ERROR)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::OneAndHalf => "1.5",
            Self::Two => "2",
        }
    }
}

/// Line settings for the flight-controller serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baudrate: u32,
    pub parity: Parity,
    pub data_bits: u8,
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// Config with the given baud rate and default framing (8N1).
    pub fn new(baudrate: u32) -> Self {
        Self {
            baudrate,
            parity: DEFAULT_PARITY,
            data_bits: DEFAULT_DATA_BITS,
            stop_bits: DEFAULT_STOP_BITS,
        }
    }

    /// One-line description for startup logging.
    pub fn summary(&self) -> String {
        format!(
            "{} bps (parity {}, {} data bits, and {} stop bits)",
            self.baudrate,
            self.parity.as_str(),
            self.data_bits,
            self.stop_bits.as_str()
        )
    }
}

impl FromStr for SerialConfig {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() > MAX_FIELDS {
            return Err(invalid("invalid serial port configuration string"));
        }

        let baud_field = fields[0];
        let baudrate = match baud_field.parse::<u32>() {
            Ok(baud) if baud > 0 && is_digits(baud_field) => baud,
            _ => return Err(invalid("baud rate must be a positive integer")),
        };

        let mut config = Self::new(baudrate);
        if let Some(parity) = fields.get(1).filter(|f| !f.is_empty()) {
            config.parity = Parity::parse(parity)?;
        }
        if let Some(data_bits) = fields.get(2).filter(|f| !f.is_empty()) {
            config.data_bits = parse_data_bits(data_bits)?;
        }
        if let Some(stop_bits) = fields.get(3).filter(|f| !f.is_empty()) {
            config.stop_bits = StopBits::parse(stop_bits)?;
        }

        Ok(config)
    }
}

impl fmt::Display for SerialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.baudrate,
            self.parity.code(),
            self.data_bits,
            self.stop_bits.as_str()
        )
    }
}

fn parse_data_bits(code: &str) -> Result<u8, TransportError> {
    match code {
        "5" => Ok(5),
        "6" => Ok(6),
        "7" => Ok(7),
        "8" => Ok(8),
        _ => Err(invalid(DATA_BITS_ERROR)),
    }
}

fn is_digits(field: &str) -> bool {
    field.bytes().all(|b| b.is_ascii_digit())
}

fn invalid(message: &str) -> TransportError {
    TransportError::InvalidSerialConfig(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baudrate_only_uses_defaults() {
        let cfg: SerialConfig = "57600".parse().unwrap();
        assert_eq!(cfg, SerialConfig::new(57600));
        assert_eq!(cfg.parity, Parity::None);
        assert_eq!(cfg.data_bits, 8);
        assert_eq!(cfg.stop_bits, StopBits::One);
    }

    #[test]
    fn full_config_with_whitespace() {
        let cfg: SerialConfig = " 9600 , E , 7 , 1.5 ".parse().unwrap();
        assert_eq!(cfg.baudrate, 9600);
        assert_eq!(cfg.parity, Parity::Even);
        assert_eq!(cfg.data_bits, 7);
        assert_eq!(cfg.stop_bits, StopBits::OneAndHalf);
    }

    #[test]
    fn empty_optional_fields_keep_defaults() {
        let cfg: SerialConfig = "115200,,,2".parse().unwrap();
        assert_eq!(cfg.parity, Parity::None);
        assert_eq!(cfg.data_bits, 8);
        assert_eq!(cfg.stop_bits, StopBits::Two);
    }

    #[test]
    fn rejects_bad_baudrate() {
        for input in ["", "0", "-9600", "+9600", "96x0", "99999999999"] {
            let err = input.parse::<SerialConfig>().unwrap_err();
            assert!(
                err.to_string().contains("baud rate"),
                "unexpected error for {input:?}: {err}"
            );
        }
    }

    #[test]
    fn rejects_bad_parity_data_and_stop_bits() {
        let err = "9600,X".parse::<SerialConfig>().unwrap_err();
        assert!(err.to_string().contains("parity"));

        let err = "9600,N,9".parse::<SerialConfig>().unwrap_err();
        assert!(err.to_string().contains("data bits"));

        let err = "9600,N,8,3".parse::<SerialConfig>().unwrap_err();
        assert!(err.to_string().contains("stop bits"));
    }

    #[test]
    fn rejects_extra_fields() {
        let err = "9600,N,8,1,extra".parse::<SerialConfig>().unwrap_err();
        assert!(matches!(err, TransportError::InvalidSerialConfig(_)));
    }

    #[test]
    fn display_is_parseable() {
        let cfg: SerialConfig = "19200,O,7,2".parse().unwrap();
        assert_eq!(cfg.to_string(), "19200,O,7,2");
        assert_eq!(cfg.to_string().parse::<SerialConfig>().unwrap(), cfg);
    }

    #[test]
    fn summary_mentions_every_field() {
        let cfg: SerialConfig = "57600,M,6,1".parse().unwrap();
        assert_eq!(
            cfg.summary(),
            "57600 bps (parity Mark, 6 data bits, and 1 stop bits)"
        );
    }
}
