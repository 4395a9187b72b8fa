use std::{fmt, ops::Deref, str::FromStr};

use crate::error::{QRError, QRResult};

// Version
//------------------------------------------------------------------------------

/// Symbol version, 1 (21x21 modules) through 40 (177x177 modules).
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct Version(u8);

impl Version {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(40);

    pub fn new(version: u16) -> QRResult<Self> {
        match version {
            1..=40 => Ok(Self(version as u8)),
            v => Err(QRError::InvalidVersion(v)),
        }
    }

    /// Maps the `0` sentinel to automatic version selection.
    pub fn from_number(version: u16) -> QRResult<Option<Self>> {
        match version {
            0 => Ok(None),
            v => Self::new(v).map(Some),
        }
    }

    pub const fn width(self) -> usize {
        self.0 as usize * 4 + 17
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }

    pub(crate) fn to_qrcode(self) -> qrcode::Version {
        qrcode::Version::Normal(self.0 as i16)
    }
}

impl Deref for Version {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    pub const ALL: [Self; 4] = [Self::L, Self::M, Self::Q, Self::H];

    /// Next stronger level, if any.
    pub fn boosted(self) -> Option<Self> {
        match self {
            Self::L => Some(Self::M),
            Self::M => Some(Self::Q),
            Self::Q => Some(Self::H),
            Self::H => None,
        }
    }

    pub(crate) fn to_qrcode(self) -> qrcode::EcLevel {
        match self {
            Self::L => qrcode::EcLevel::L,
            Self::M => qrcode::EcLevel::M,
            Self::Q => qrcode::EcLevel::Q,
            Self::H => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for ECLevel {
    type Err = QRError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Self::L),
            "m" | "medium" => Ok(Self::M),
            "q" | "quartile" => Ok(Self::Q),
            "h" | "high" => Ok(Self::H),
            _ => Err(QRError::InvalidECLevel(s.to_string())),
        }
    }
}

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Alphanumeric => "alphanumeric",
            Self::Byte => "byte",
            Self::Kanji => "kanji",
        }
    }

    #[inline]
    pub fn contains(self, byte: u8) -> bool {
        match self {
            Self::Numeric => byte.is_ascii_digit(),
            Self::Alphanumeric => matches!(
                byte,
                b'0'..=b'9' | b'A'..=b'Z' | b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':'
            ),
            Self::Byte => true,
            Self::Kanji => false,
        }
    }

    /// Most compact single mode that can hold the whole text.
    ///
    /// Kanji is never chosen here, text reaches us as UTF-8 and has to be
    /// requested explicitly to go through Shift JIS.
    pub fn best_fit(text: &str) -> Self {
        let bytes = text.as_bytes();
        if bytes.iter().all(|b| Self::Numeric.contains(*b)) {
            Self::Numeric
        } else if bytes.iter().all(|b| Self::Alphanumeric.contains(*b)) {
            Self::Alphanumeric
        } else {
            Self::Byte
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = QRError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" | "num" => Ok(Self::Numeric),
            "alphanumeric" | "alnum" => Ok(Self::Alphanumeric),
            "byte" | "binary" => Ok(Self::Byte),
            "kanji" => Ok(Self::Kanji),
            _ => Err(QRError::InvalidMode(s.to_string())),
        }
    }
}
