//! Adapter over the `qrcode` crate.
//!
//! The encoder itself is treated as a black box. This module only decides which
//! version, error correction level and mode to hand it, validates text against
//! the chosen mode, and maps its errors onto [`QRError`].

use std::{borrow::Cow, fmt};

use encoding_rs::SHIFT_JIS;
use qrcode::{bits::Bits, types::QrError, QrCode};

use crate::{
    error::{QRError, QRResult},
    metadata::{ECLevel, Mode, Version},
    request::Request,
};

// Symbol
//------------------------------------------------------------------------------

/// An encoded QR symbol along with the options that were finally used.
#[derive(Clone)]
pub struct Symbol {
    code: QrCode,
    version: Version,
    ec_level: ECLevel,
    mode: Mode,
}

impl Symbol {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ec_level
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Width in modules, excluding the quiet zone.
    pub fn width(&self) -> usize {
        self.code.width()
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.code[(x, y)] == qrcode::Color::Dark
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Version: {}, Ec level: {:?}, Mode: {:?}, Width: {} }}",
            self.version,
            self.ec_level,
            self.mode,
            self.width()
        )
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("version", &self.version)
            .field("ec_level", &self.ec_level)
            .field("mode", &self.mode)
            .field("width", &self.width())
            .finish()
    }
}

// Encode
//------------------------------------------------------------------------------

pub fn encode(request: &Request) -> QRResult<Symbol> {
    let mode = request.mode().unwrap_or_else(|| Mode::best_fit(request.text()));
    let payload = to_payload(request.text(), mode)?;

    tracing::trace!(mode = mode.name(), bytes = payload.len(), "Encoding data");
    let (version, ec_level, bits) = match request.ec_level() {
        Some(ecl) => {
            let (version, bits) = fit(&payload, mode, ecl, request.version())?;
            (version, ecl, bits)
        }
        None => fit_auto_ec_level(&payload, mode, request.version())?,
    };

    let code =
        QrCode::with_bits(bits, ec_level.to_qrcode()).map_err(|e| map_qr_error(e, mode, version))?;
    debug_assert_eq!(code.width(), version.width(), "Symbol width doesn't match version");

    let symbol = Symbol { code, version, ec_level, mode };
    tracing::trace!(metadata = %symbol.metadata(), "Symbol encoded");
    Ok(symbol)
}

fn to_payload(text: &str, mode: Mode) -> QRResult<Cow<'_, [u8]>> {
    match mode {
        Mode::Numeric | Mode::Alphanumeric => {
            if text.bytes().all(|b| mode.contains(b)) {
                Ok(Cow::Borrowed(text.as_bytes()))
            } else {
                Err(QRError::InvalidChar(mode.name()))
            }
        }
        Mode::Byte => Ok(Cow::Borrowed(text.as_bytes())),
        Mode::Kanji => {
            let (sjis, _, had_errors) = SHIFT_JIS.encode(text);
            if had_errors || sjis.len() % 2 != 0 || !sjis.chunks_exact(2).all(is_kanji) {
                return Err(QRError::InvalidChar(mode.name()));
            }
            Ok(sjis)
        }
    }
}

// Double byte Shift JIS ranges representable in kanji mode
fn is_kanji(pair: &[u8]) -> bool {
    let code = u16::from_be_bytes([pair[0], pair[1]]);
    matches!(code, 0x8140..=0x9FFC | 0xE040..=0xEBBF) && matches!(pair[1], 0x40..=0x7E | 0x80..=0xFC)
}

fn build_bits(payload: &[u8], mode: Mode, version: Version, ec_level: ECLevel) -> QRResult<Bits> {
    let mut bits = Bits::new(version.to_qrcode());
    let pushed = match mode {
        Mode::Numeric => bits.push_numeric_data(payload),
        Mode::Alphanumeric => bits.push_alphanumeric_data(payload),
        Mode::Byte => bits.push_byte_data(payload),
        Mode::Kanji => bits.push_kanji_data(payload),
    };
    pushed
        .and_then(|()| bits.push_terminator(ec_level.to_qrcode()))
        .map_err(|e| map_qr_error(e, mode, version))?;
    Ok(bits)
}

/// Encodes at the given version, or at the smallest version that fits.
fn fit(
    payload: &[u8],
    mode: Mode,
    ec_level: ECLevel,
    version: Option<Version>,
) -> QRResult<(Version, Bits)> {
    if let Some(v) = version {
        return build_bits(payload, mode, v, ec_level).map(|bits| (v, bits));
    }

    tracing::trace!("Finding best version");
    for v in Version::all() {
        match build_bits(payload, mode, v, ec_level) {
            Ok(bits) => return Ok((v, bits)),
            Err(QRError::DataTooLong) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(QRError::DataTooLong)
}

/// Starts from level M (L if M can't fit at all) and boosts to the strongest
/// level that still fits the same version.
fn fit_auto_ec_level(
    payload: &[u8],
    mode: Mode,
    version: Option<Version>,
) -> QRResult<(Version, ECLevel, Bits)> {
    let (mut ec_level, (version, mut bits)) = match fit(payload, mode, ECLevel::M, version) {
        Ok(fitted) => (ECLevel::M, fitted),
        Err(QRError::DataTooLong) => {
            return fit(payload, mode, ECLevel::L, version).map(|(v, b)| (v, ECLevel::L, b));
        }
        Err(e) => return Err(e),
    };

    while let Some(next) = ec_level.boosted() {
        match build_bits(payload, mode, version, next) {
            Ok(b) => {
                ec_level = next;
                bits = b;
            }
            Err(QRError::DataTooLong) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((version, ec_level, bits))
}

fn map_qr_error(err: QrError, mode: Mode, version: Version) -> QRError {
    match err {
        QrError::DataTooLong => QRError::DataTooLong,
        QrError::InvalidCharacter | QrError::UnsupportedCharacterSet => {
            QRError::InvalidChar(mode.name())
        }
        QrError::InvalidVersion => QRError::InvalidVersion(*version as u16),
        other => QRError::Internal(format!("{other:?}")),
    }
}
