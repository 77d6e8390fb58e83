//! Color types: the normalized RGB value used for cascade matching and
//! the enumerated target colors exposed through configuration.

use std::fmt;
use std::str::FromStr;

/// RGB color representation.
///
/// Equality is value equality after normalization; hex parsing is
/// case-insensitive and accepts an optional `#` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl RgbColor {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create an RGB color from a hex string such as `FF0000` or `#ff0000`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b))
    }

    /// Convert to an uppercase hex string without the `#` prefix.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Target colors the pipeline can apply to formulas.
///
/// The lowercase name is what ends up in the `mstyle` wrapper and the
/// annotation directive; the hex value is what the style cascade is
/// matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaColor {
    Red,
    Blue,
    Green,
    Black,
}

impl FormulaColor {
    /// Lowercase color name used in markup.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Black => "black",
        }
    }

    /// The RGB value this named color matches in style definitions.
    pub fn rgb(&self) -> RgbColor {
        match self {
            Self::Red => RgbColor::new(0xFF, 0x00, 0x00),
            Self::Blue => RgbColor::new(0x00, 0x00, 0xFF),
            Self::Green => RgbColor::new(0x00, 0xFF, 0x00),
            Self::Black => RgbColor::new(0x00, 0x00, 0x00),
        }
    }
}

impl fmt::Display for FormulaColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormulaColor {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            "black" => Ok(Self::Black),
            other => Err(crate::error::Error::InvalidFormat(format!(
                "Unknown formula color: {}",
                other
            ))),
        }
    }
}
