//! Procedural tyre tread height map.
//!
//! Two staggered rows of slanted dark blocks over a mid-grey base, crossed by
//! thin horizontal grooves. The raster drives the tyre's bump channel, so only
//! relative brightness matters: darker is lower.

use std::f32::consts::PI;

use image::GrayImage;

use crate::{
    data_structures::texture::{TextureMap, Wrap},
    resources::canvas::Canvas,
};

pub const TREAD_SIZE: u32 = 1024;
pub const BASE_SHADE: u8 = 0x7a;
pub const BLOCK_SHADE: u8 = 0x40;
pub const GROOVE_SHADE: u8 = 0x55;

const BLOCK_WIDTH: f32 = 40.0;
const BLOCK_HEIGHT: f32 = 110.0;
const BLOCK_GAP: f32 = 10.0;
const BLOCK_SLANT_DEG: f32 = 12.0;
const GROOVE_SPACING: usize = 12;
const GROOVE_WIDTH: f32 = 2.0;

/// Paint the tread pattern onto a fresh `size` x `size` raster.
pub fn paint_tread(size: u32) -> GrayImage {
    let mut canvas = Canvas::new(size, size);
    let extent = size as f32;

    canvas.fill_style = BASE_SHADE;
    canvas.fill_rect(0.0, 0.0, extent, extent);

    canvas.fill_style = BLOCK_SHADE;
    let slant = BLOCK_SLANT_DEG * PI / 180.0;
    let mut y = -BLOCK_HEIGHT;
    while y < extent + BLOCK_HEIGHT {
        let mut x = -BLOCK_WIDTH;
        while x < extent + BLOCK_WIDTH {
            canvas.save();
            canvas.translate(x, y);
            canvas.rotate(-slant);
            canvas.fill_rect(0.0, 0.0, BLOCK_WIDTH, BLOCK_HEIGHT);
            canvas.restore();

            canvas.save();
            canvas.translate(x + BLOCK_WIDTH, y + BLOCK_HEIGHT / 2.0);
            canvas.rotate(slant);
            canvas.fill_rect(0.0, 0.0, BLOCK_WIDTH, BLOCK_HEIGHT);
            canvas.restore();

            x += BLOCK_WIDTH * 2.0;
        }
        y += BLOCK_HEIGHT + BLOCK_GAP;
    }

    canvas.stroke_style = GROOVE_SHADE;
    canvas.line_width = GROOVE_WIDTH;
    for i in (0..size as usize).step_by(GROOVE_SPACING) {
        canvas.stroke_horizontal(0.0, extent, i as f32);
    }

    canvas.into_image()
}

/// The tyre's bump map: the tread raster, repeating 8 times around the
/// circumference and twice across the tube, with 16x anisotropic filtering.
pub fn make_tread_texture() -> TextureMap {
    TextureMap::new("tread", paint_tread(TREAD_SIZE))
        .with_wrap(Wrap::Repeat, Wrap::Repeat)
        .with_repeat(8.0, 2.0)
        .with_anisotropy(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groove_rows_are_two_pixels_wide() {
        let image = paint_tread(64);
        // Row 11 and 12 straddle the groove at y = 12.
        for x in 0..64 {
            assert_eq!(image.get_pixel(x, 11).0, [GROOVE_SHADE]);
            assert_eq!(image.get_pixel(x, 12).0, [GROOVE_SHADE]);
        }
        // Only the lower half of the y = 0 groove lies inside the raster.
        assert!((0..64).all(|x| image.get_pixel(x, 0).0 == [GROOVE_SHADE]));
    }

    #[test]
    fn only_three_shades_are_painted() {
        let image = paint_tread(256);
        assert!(
            image
                .pixels()
                .all(|p| [BASE_SHADE, BLOCK_SHADE, GROOVE_SHADE].contains(&p.0[0]))
        );
    }
}
