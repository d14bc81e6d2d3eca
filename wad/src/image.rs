use super::errors::{ErrorKind, Result};
use super::read::{read_i16, read_i32, read_u8};
use super::types::{Palette, FLAT_SIZE};
use failchain::{ensure, ResultExt};

pub const MAX_IMAGE_SIZE: usize = 4096;

const POST_END: u8 = 255;
const PICTURE_COLUMNS_OFFSET: usize = 8;

/// An RGBA image. Row 0 is the bottom row, so UV `v` grows upwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Image {
    /// A fully transparent image.
    pub fn new(width: usize, height: usize) -> Result<Image> {
        ensure!(
            width > 0 && height > 0 && width <= MAX_IMAGE_SIZE && height <= MAX_IMAGE_SIZE,
            ErrorKind::image(format!("Invalid image size {}x{}.", width, height))
        );
        Ok(Image {
            width,
            height,
            pixels: vec![0; width * height * 4],
        })
    }

    /// Expands a 64x64 flat. Bytes are consumed column by column: byte
    /// `col * 64 + row` lands at pixel `(col, row)`.
    pub fn from_flat(bytes: &[u8], palette: &Palette) -> Result<Image> {
        let num_pixels = FLAT_SIZE * FLAT_SIZE;
        ensure!(
            bytes.len() >= num_pixels,
            ErrorKind::CorruptWad(format!(
                "Flat too small: {} < {} bytes.",
                bytes.len(),
                num_pixels
            ))
        );
        let mut image = Image::new(FLAT_SIZE, FLAT_SIZE)?;
        let mut source = bytes.iter();
        for col in 0..FLAT_SIZE {
            for row in 0..FLAT_SIZE {
                if let Some(&index) = source.next() {
                    image.set_pixel(col, row, palette.rgba(index));
                }
            }
        }
        Ok(image)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Texture coordinate scale which makes one UV unit one texel, so wall UVs
    /// can be expressed in world units.
    pub fn uv_repeat(&self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(rgba)
    }

    fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let offset = (y * self.width + x) * 4;
        self.pixels[offset..offset + 4].copy_from_slice(&rgba);
    }

    /// Draws a picture-format lump with its top-left corner at
    /// `(x_offset, y_offset)` texels from the top-left of this image.
    /// Out-of-range pixels are clipped; later draws overwrite earlier ones.
    pub fn blit_patch(
        &mut self,
        patch: &[u8],
        x_offset: i32,
        y_offset: i32,
        palette: &Palette,
    ) -> Result<()> {
        let patch_width =
            i32::from(read_i16(patch, 0).chain_err(|| ErrorKind::image("Missing patch width."))?);
        let width = self.width as i32;
        let height = self.height as i32;

        for col in 0..patch_width.max(0) {
            let x = x_offset + col;
            if x < 0 || x >= width {
                continue;
            }
            let column_offset = read_i32(patch, PICTURE_COLUMNS_OFFSET + col as usize * 4)
                .chain_err(|| ErrorKind::image(format!("Missing offset for column {}.", col)))?;
            ensure!(
                column_offset >= 0,
                ErrorKind::image(format!("Negative offset for column {}.", col))
            );

            let mut pointer = column_offset as usize;
            let mut i_post = 0;
            loop {
                let top_delta =
                    read_u8(patch, pointer).chain_err(|| unfinished_post(col, i_post))?;
                if top_delta == POST_END {
                    break;
                }
                let run_length =
                    read_u8(patch, pointer + 1).chain_err(|| unfinished_post(col, i_post))?;
                // Skip the length byte and the leading padding byte.
                pointer += 3;
                for i_pixel in 0..i32::from(run_length) {
                    let index =
                        read_u8(patch, pointer).chain_err(|| unfinished_post(col, i_post))?;
                    pointer += 1;
                    let y = height - (i32::from(top_delta) + i_pixel) - 1 - y_offset;
                    if y >= 0 && y < height {
                        self.set_pixel(x as usize, y as usize, palette.rgba(index));
                    }
                }
                // Trailing padding byte.
                pointer += 1;
                i_post += 1;
            }
        }
        Ok(())
    }
}

fn unfinished_post(col: i32, i_post: usize) -> ErrorKind {
    ErrorKind::image(format!("Unfinished post {} in column {}.", i_post, col))
}

#[cfg(test)]
mod test {
    use super::Image;
    use crate::test_wad::{palette, patch};
    use crate::types::Palette;

    fn test_palette() -> Palette {
        Palette::from_bytes(&palette(&[(0, 0, 0), (10, 20, 30), (40, 50, 60), (70, 80, 90)]))
            .expect("test: bad palette")
    }

    #[test]
    fn single_post_fills_bottom_up() {
        // One 2x2 patch: both columns hold a single run of two pixels.
        let picture = patch(2, 2, &[vec![(0, vec![1, 2])], vec![(0, vec![3, 1])]]);
        let mut image = Image::new(2, 2).expect("test: bad image");
        image
            .blit_patch(&picture, 0, 0, &test_palette())
            .expect("test: blit failed");

        #[rustfmt::skip]
        let expected = [
            40, 50, 60, 255,   10, 20, 30, 255,
            10, 20, 30, 255,   70, 80, 90, 255,
        ];
        assert_eq!(image.pixels(), &expected[..]);
        assert_eq!(image.uv_repeat(), [0.5, 0.5]);
    }

    #[test]
    fn posts_with_gaps_leave_transparency() {
        let picture = patch(1, 4, &[vec![(0, vec![1]), (2, vec![2, 3])]]);
        let mut image = Image::new(1, 4).expect("test: bad image");
        image
            .blit_patch(&picture, 0, 0, &test_palette())
            .expect("test: blit failed");
        assert_eq!(image.pixel(0, 3), Some([10, 20, 30, 255]));
        assert_eq!(image.pixel(0, 2), Some([0, 0, 0, 0]));
        assert_eq!(image.pixel(0, 1), Some([40, 50, 60, 255]));
        assert_eq!(image.pixel(0, 0), Some([70, 80, 90, 255]));
    }

    #[test]
    fn patches_are_clipped_to_the_image() {
        let opaque = Some([10, 20, 30, 255]);
        let clear = Some([0, 0, 0, 0]);
        let picture = patch(3, 3, &vec![vec![(0, vec![1, 1, 1])]; 3]);

        // Positive y offsets push the patch down, towards row 0.
        let mut image = Image::new(2, 2).expect("test: bad image");
        image
            .blit_patch(&picture, -1, 1, &test_palette())
            .expect("test: blit failed");
        assert_eq!(image.pixel(0, 0), opaque);
        assert_eq!(image.pixel(1, 0), opaque);
        assert_eq!(image.pixel(0, 1), clear);
        assert_eq!(image.pixel(1, 1), clear);

        let mut image = Image::new(2, 2).expect("test: bad image");
        image
            .blit_patch(&picture, 1, -1, &test_palette())
            .expect("test: blit failed");
        assert_eq!(image.pixel(1, 0), opaque);
        assert_eq!(image.pixel(1, 1), opaque);
        assert_eq!(image.pixel(0, 0), clear);
        assert_eq!(image.pixel(0, 1), clear);
    }

    #[test]
    fn truncated_posts_are_errors() {
        let mut picture = patch(1, 2, &[vec![(0, vec![1, 2])]]);
        let len = picture.len();
        picture.truncate(len - 3);
        let mut image = Image::new(1, 2).expect("test: bad image");
        assert!(image.blit_patch(&picture, 0, 0, &test_palette()).is_err());
    }

    #[test]
    fn flats_are_read_column_major() {
        let mut flat = vec![0u8; 4096];
        flat[1] = 1;
        flat[64] = 2;
        let image = Image::from_flat(&flat, &test_palette()).expect("test: bad flat");
        assert_eq!((image.width(), image.height()), (64, 64));
        assert_eq!(image.pixel(0, 1), Some([10, 20, 30, 255]));
        assert_eq!(image.pixel(1, 0), Some([40, 50, 60, 255]));
        assert_eq!(image.pixel(5, 5), Some([0, 0, 0, 255]));
        assert_eq!(image.uv_repeat(), [1.0 / 64.0, 1.0 / 64.0]);
        assert!(Image::from_flat(&flat[..100], &test_palette()).is_err());
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(Image::new(0, 4).is_err());
        assert!(Image::new(4097, 4).is_err());
    }
}
