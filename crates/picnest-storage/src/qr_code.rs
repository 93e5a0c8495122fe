use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use picnest_core::error::Error;
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;

/// Generator of QR code images.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeGenerator {
    /// Pixels per module.
    box_size: u32,
    /// Width of the quiet zone in modules.
    border: u32,
}

impl Default for QrCodeGenerator {
    #[inline]
    fn default() -> Self {
        Self {
            box_size: 10,
            border: 4,
        }
    }
}

impl QrCodeGenerator {
    /// Creates a new instance with the module size and the quiet zone width.
    #[inline]
    pub fn new(box_size: u32, border: u32) -> Self {
        Self {
            box_size: box_size.max(1),
            border,
        }
    }

    /// Encodes the data as a black-on-white PNG image.
    pub fn encode(&self, data: &str) -> Result<Vec<u8>, Error> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
            .map_err(|err| Error::with_source("fail to encode the QR code", err))?;
        let width = u32::try_from(code.width())?;
        let box_size = self.box_size;
        let side = (width + 2 * self.border) * box_size;
        let mut img = GrayImage::from_pixel(side, side, Luma([255]));
        for (index, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            let index = u32::try_from(index)?;
            let left = (index % width + self.border) * box_size;
            let top = (index / width + self.border) * box_size;
            for y in top..top + box_size {
                for x in left..left + box_size {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }

        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|err| Error::with_source("fail to encode the QR code image", err))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::QrCodeGenerator;

    #[test]
    fn it_renders_png_qr_codes() {
        let generator = QrCodeGenerator::default();
        let bytes = generator
            .encode("https://blobs.example.com/b@x.com/publications/7/current_img")
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_luma8();
        let (width, height) = img.dimensions();
        assert_eq!(width, height);
        assert_eq!(width % 10, 0);
        // Quiet zone is white and the finder pattern starts right after it.
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        assert_eq!(img.get_pixel(40, 40).0, [0]);
    }
}
