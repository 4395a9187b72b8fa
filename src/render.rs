use std::{io::Cursor, path::Path};

use image::{GrayImage, ImageFormat, Luma};

use crate::{
    encode::Symbol,
    error::{QRError, QRResult},
};

/// Quiet zone around normal symbols, in modules.
pub const QUIET_ZONE: u32 = 4;

/// Upper bound on rendered pixels, a little over a 16k x 16k canvas.
pub const MAX_IMAGE_PIXELS: u64 = 1 << 28;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

// Rasterize
//------------------------------------------------------------------------------

/// Draws `symbol` with every module as a `module_sz` square.
///
/// The canvas side is `(width + 2 * QUIET_ZONE) * module_sz`, so the buffer
/// grows with the square of the scale.
pub fn rasterize(symbol: &Symbol, module_sz: u32) -> QRResult<GrayImage> {
    if module_sz == 0 {
        return Err(QRError::InvalidScale(module_sz));
    }

    let total_sz = (symbol.width() as u64 + 2 * QUIET_ZONE as u64) * module_sz as u64;
    let pixels = total_sz * total_sz;
    if pixels > MAX_IMAGE_PIXELS {
        return Err(QRError::ImageTooLarge(pixels));
    }

    let total_sz = total_sz as u32;
    let qz_sz = QUIET_ZONE * module_sz;
    let qr_sz = total_sz - 2 * qz_sz;

    let canvas = GrayImage::from_fn(total_sz, total_sz, |x, y| {
        if x < qz_sz || x >= qz_sz + qr_sz || y < qz_sz || y >= qz_sz + qr_sz {
            return LIGHT;
        }
        let c = ((x - qz_sz) / module_sz) as usize;
        let r = ((y - qz_sz) / module_sz) as usize;
        if symbol.is_dark(c, r) {
            DARK
        } else {
            LIGHT
        }
    });

    Ok(canvas)
}

// Artifact
//------------------------------------------------------------------------------

/// A successfully generated image together with a description of its symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    image: GrayImage,
    module_sz: u32,
    symbol: String,
}

impl Artifact {
    pub fn new(image: GrayImage, module_sz: u32, symbol: impl Into<String>) -> Self {
        Self { image, module_sz, symbol: symbol.into() }
    }

    pub fn from_symbol(symbol: &Symbol, module_sz: u32) -> QRResult<Self> {
        let image = rasterize(symbol, module_sz)?;
        Ok(Self::new(image, module_sz, symbol.metadata()))
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Raw 8-bit luma pixels, row major.
    pub fn image_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn module_sz(&self) -> u32 {
        self.module_sz
    }

    /// Diagnostic description of the encoded symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    pub fn to_png(&self) -> QRResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> QRResult<()> {
        std::fs::write(path, self.to_png()?)?;
        Ok(())
    }

    /// Renders the image with half block characters, two module rows per line.
    ///
    /// Modules are sampled at their centres, quiet zone included.
    pub fn to_terminal(&self) -> String {
        let (w, h) = self.image.dimensions();
        let half = self.module_sz / 2;
        let cols = w / self.module_sz;
        let rows = h / self.module_sz;
        let dark = |c: u32, r: u32| {
            r < rows && self.image.get_pixel(c * self.module_sz + half, r * self.module_sz + half)[0] < 128
        };

        let mut canvas = String::with_capacity(((cols + 1) * rows.div_ceil(2)) as usize * 3);
        for r in (0..rows).step_by(2) {
            for c in 0..cols {
                canvas.push(match (dark(c, r), dark(c, r + 1)) {
                    (true, true) => ' ',
                    (true, false) => '▄',
                    (false, true) => '▀',
                    (false, false) => '█',
                });
            }
            canvas.push('\n');
        }
        canvas
    }
}
