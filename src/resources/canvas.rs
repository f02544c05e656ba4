//! A tiny greyscale raster canvas with a 2D affine transform stack.
//!
//! Coordinates follow the usual canvas convention: origin top-left, y grows
//! downwards, positive rotation angles turn clockwise on screen. A pixel is
//! painted when its centre lies inside the transformed shape, so output does
//! not depend on the order shapes overlap in beyond plain painter's order.

use image::{GrayImage, Luma};

/// Row-major 2x3 affine matrix: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Canvas {
    image: GrayImage,
    transform: Affine,
    stack: Vec<Affine>,
    pub fill_style: u8,
    pub stroke_style: u8,
    pub line_width: f32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            fill_style: 0,
            stroke_style: 0,
            line_width: 1.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn save(&mut self) {
        self.stack.push(self.transform);
    }

    /// Pop the last saved transform. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        let t = &mut self.transform;
        t.e += t.a * tx + t.c * ty;
        t.f += t.b * tx + t.d * ty;
    }

    pub fn rotate(&mut self, radians: f32) {
        let (sin, cos) = radians.sin_cos();
        let t = self.transform;
        self.transform = Affine {
            a: t.a * cos + t.c * sin,
            b: t.b * cos + t.d * sin,
            c: t.c * cos - t.a * sin,
            d: t.d * cos - t.b * sin,
            e: t.e,
            f: t.f,
        };
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let value = self.fill_style;
        self.paint_rect(x, y, w, h, value);
    }

    /// Stroke a horizontal segment from `(x0, y)` to `(x1, y)` with butt caps.
    pub fn stroke_horizontal(&mut self, x0: f32, x1: f32, y: f32) {
        let value = self.stroke_style;
        let half = self.line_width / 2.0;
        let (left, right) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        self.paint_rect(left, y - half, right - left, self.line_width, value);
    }

    fn paint_rect(&mut self, x: f32, y: f32, w: f32, h: f32, value: u8) {
        let Some(inverse) = self.transform.invert() else {
            return;
        };
        let corners = [
            self.transform.apply(x, y),
            self.transform.apply(x + w, y),
            self.transform.apply(x, y + h),
            self.transform.apply(x + w, y + h),
        ];
        let (min_x, max_x, min_y, max_y) = corners.iter().fold(
            (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
            |(min_x, max_x, min_y, max_y), &(cx, cy)| {
                (min_x.min(cx), max_x.max(cx), min_y.min(cy), max_y.max(cy))
            },
        );
        let width = self.image.width() as i64;
        let height = self.image.height() as i64;
        let x_start = (min_x.floor() as i64).clamp(0, width);
        let x_end = (max_x.ceil() as i64).clamp(0, width);
        let y_start = (min_y.floor() as i64).clamp(0, height);
        let y_end = (max_y.ceil() as i64).clamp(0, height);

        for py in y_start..y_end {
            for px in x_start..x_end {
                let (lx, ly) = inverse.apply(px as f32 + 0.5, py as f32 + 0.5);
                if lx >= x && lx < x + w && ly >= y && ly < y + h {
                    self.image.put_pixel(px as u32, py as u32, Luma([value]));
                }
            }
        }
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_round_trips_transform() {
        let mut canvas = Canvas::new(8, 8);
        canvas.save();
        canvas.translate(3.0, 4.0);
        canvas.rotate(0.3);
        canvas.restore();
        assert_eq!(canvas.transform(), Affine::IDENTITY);
    }

    #[test]
    fn positive_rotation_turns_clockwise() {
        let mut canvas = Canvas::new(8, 8);
        canvas.rotate(std::f32::consts::FRAC_PI_2);
        let (x, y) = canvas.transform().apply(1.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!((y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fill_rect_covers_pixel_centres() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_style = 200;
        canvas.fill_rect(1.0, 1.0, 2.0, 1.0);
        let image = canvas.into_image();
        assert_eq!(image.get_pixel(1, 1).0, [200]);
        assert_eq!(image.get_pixel(2, 1).0, [200]);
        assert_eq!(image.get_pixel(1, 2).0, [0]);
        assert_eq!(image.get_pixel(0, 1).0, [0]);
    }
}
