use image::{
    DynamicImage, ImageFormat, Rgba, RgbaImage,
    imageops::{self, FilterType},
};
use picnest_core::error::Error;
use std::io::Cursor;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Named image transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum Transformation {
    /// Converts to grayscale.
    Grayscale,
    /// Rotates 90 degrees counterclockwise.
    Left,
    /// Rotates 90 degrees clockwise.
    Right,
    /// Flips vertically.
    Flip,
    /// Flips horizontally.
    Mirror,
    /// Applies a gaussian blur.
    Blur,
    /// Crops the center square.
    Square,
    /// Scales down to fit in 200x200 pixels.
    Thumbnail,
    /// Inverts the colors.
    Invert,
    /// Crops the center square and adds a light blue border.
    Border,
    /// Crops a 250x250 circle with transparent corners.
    Circle,
}

impl Transformation {
    /// Side length of thumbnails.
    const THUMBNAIL_SIZE: u32 = 200;
    /// Diameter of circles.
    const CIRCLE_SIZE: u32 = 250;
    /// Width of borders.
    const BORDER_WIDTH: u32 = 5;
    /// Color of borders.
    const BORDER_COLOR: Rgba<u8> = Rgba([173, 216, 230, 255]);

    /// Decodes the image, applies the transformation and encodes the result as PNG.
    pub fn apply(&self, bytes: &[u8]) -> Result<Vec<u8>, Error> {
        let img = image::load_from_memory(bytes)
            .map_err(|err| Error::with_source("fail to decode the image", err))?;
        let output = self.transform(img);
        let mut buf = Vec::new();
        output
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|err| Error::with_source("fail to encode the image", err))?;
        Ok(buf)
    }

    /// Applies the transformation to a decoded image.
    pub fn transform(&self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::Grayscale => img.grayscale(),
            Self::Left => img.rotate270(),
            Self::Right => img.rotate90(),
            Self::Flip => img.flipv(),
            Self::Mirror => img.fliph(),
            Self::Blur => img.blur(3.0),
            Self::Square => center_square(&img),
            Self::Thumbnail => img.thumbnail(Self::THUMBNAIL_SIZE, Self::THUMBNAIL_SIZE),
            Self::Invert => {
                let mut img = img;
                img.invert();
                img
            }
            Self::Border => {
                let square = center_square(&img).to_rgba8();
                let side = square.width() + 2 * Self::BORDER_WIDTH;
                let mut canvas = RgbaImage::from_pixel(side, side, Self::BORDER_COLOR);
                let offset = i64::from(Self::BORDER_WIDTH);
                imageops::overlay(&mut canvas, &square, offset, offset);
                DynamicImage::ImageRgba8(canvas)
            }
            Self::Circle => {
                let size = Self::CIRCLE_SIZE;
                let mut canvas = center_square(&img)
                    .resize_exact(size, size, FilterType::Triangle)
                    .to_rgba8();
                let radius = f64::from(size) / 2.0;
                for (x, y, pixel) in canvas.enumerate_pixels_mut() {
                    let dx = f64::from(x) + 0.5 - radius;
                    let dy = f64::from(y) + 0.5 - radius;
                    if dx * dx + dy * dy > radius * radius {
                        pixel.0[3] = 0;
                    }
                }
                DynamicImage::ImageRgba8(canvas)
            }
        }
    }
}

/// Crops the largest square in the center.
fn center_square(img: &DynamicImage) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let side = width.min(height);
    img.crop_imm((width - side) / 2, (height - side) / 2, side, side)
}
