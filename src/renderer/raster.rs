use euclid::default::Box2D;

use crate::error::{NewsreelError, NewsreelResult};
use crate::text::Layout;

/// Opaque RGB8 frame.
///
/// Pixels are arranged in row-major order with the origin at the top-left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterFrame {
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let len = (width as usize).saturating_mul(height as usize);
        let mut pixels = Vec::with_capacity(len * 3);
        for _ in 0..len {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Blends `color` (straight alpha) over every pixel covered by `rect`.
    pub fn fill_box(&mut self, rect: &Box2D<f32>, color: [u8; 4]) {
        let x0 = rect.min.x.floor().max(0.0) as u32;
        let y0 = rect.min.y.floor().max(0.0) as u32;
        let x1 = (rect.max.x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (rect.max.y.ceil().max(0.0) as u32).min(self.height);
        let rgb = [color[0], color[1], color[2]];

        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, rgb, color[3]);
            }
        }
    }

    /// Composites the columns `x < reveal_width` of `layer`; everything to the
    /// right of the edge is left untouched.
    pub fn composite(&mut self, layer: &TextLayer, reveal_width: u32) {
        let width = self.width.min(layer.width).min(reveal_width);
        let height = self.height.min(layer.height);

        for y in 0..height {
            for x in 0..width {
                let [r, g, b, a] = layer.pixels[y as usize * layer.width as usize + x as usize];
                if a == 0 {
                    continue;
                }
                self.blend(x, y, [r, g, b], a);
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, src: [u8; 3], alpha: u8) {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let a = alpha as u32;
        for (channel, &s) in self.pixels[idx..idx + 3].iter_mut().zip(src.iter()) {
            let d = *channel as u32;
            *channel = ((s as u32 * a + d * (255 - a) + 127) / 255) as u8;
        }
    }

    pub fn into_image(self) -> NewsreelResult<image::RgbImage> {
        let (width, height) = (self.width, self.height);
        image::RgbImage::from_raw(width, height, self.pixels).ok_or_else(|| {
            NewsreelError::invalid_argument(format!(
                "pixel buffer does not match a {width}x{height} frame"
            ))
        })
    }
}

/// Straight-alpha RGBA layer holding every glyph of a layout.
///
/// Rasterized once per card; frames only differ in how much of it they
/// reveal.
#[derive(Clone, Debug)]
pub struct TextLayer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl TextLayer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            pixels: vec![[0; 4]; len],
        }
    }

    /// Draws every line of every block of `layout`.
    pub fn from_layout(layout: &Layout) -> Self {
        let mut layer = Self::new(layout.canvas.width, layout.canvas.height);

        for block in &layout.blocks {
            let origin_x = block.left_x.round() as i32;
            for (index, line) in block.lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let origin_y = block.line_top(index).round() as i32;
                let color = block.color;
                block.face.rasterize(
                    &line.text(),
                    block.point_size,
                    &mut |x, y, coverage| layer.plot(origin_x + x, origin_y + y, color, coverage),
                );
            }
        }

        layer
    }

    /// Adds one coverage sample; overlapping glyphs keep the strongest one.
    pub fn plot(&mut self, x: i32, y: i32, color: [u8; 4], coverage: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let alpha = (coverage as u32 * color[3] as u32 / 255) as u8;
        let pixel = &mut self.pixels[y as usize * self.width as usize + x as usize];
        if alpha > pixel[3] {
            *pixel = [color[0], color[1], color[2], alpha];
        }
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|pixel| pixel[3] == 0)
    }
}

#[cfg(test)]
mod tests {
    use euclid::default::Point2D;

    use super::*;

    #[test]
    fn filled_frame_is_opaque_rgb() {
        let frame = RasterFrame::filled(4, 3, [1, 2, 3]);
        assert_eq!(frame.pixels.len(), 4 * 3 * 3);
        assert_eq!(frame.pixel(3, 2), Some([1, 2, 3]));
        assert_eq!(frame.pixel(4, 0), None);
    }

    #[test]
    fn composite_stops_at_the_reveal_edge() {
        let mut layer = TextLayer::new(4, 1);
        for x in 0..4 {
            layer.plot(x, 0, [255, 255, 255, 255], 255);
        }
        let mut frame = RasterFrame::filled(4, 1, [0, 0, 0]);
        frame.composite(&layer, 2);
        assert_eq!(frame.pixel(1, 0), Some([255, 255, 255]));
        assert_eq!(frame.pixel(2, 0), Some([0, 0, 0]));
    }

    #[test]
    fn partial_alpha_blends_over_the_background() {
        let mut frame = RasterFrame::filled(2, 2, [0, 0, 0]);
        let rect = Box2D::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0));
        frame.fill_box(&rect, [255, 0, 0, 204]);
        assert_eq!(frame.pixel(0, 0), Some([204, 0, 0]));
        assert_eq!(frame.pixel(1, 1), Some([0, 0, 0]));
    }

    #[test]
    fn boxes_are_clipped_to_the_frame() {
        let mut frame = RasterFrame::filled(2, 2, [0, 0, 0]);
        let rect = Box2D::new(Point2D::new(-5.0, -5.0), Point2D::new(50.0, 50.0));
        frame.fill_box(&rect, [0, 0, 255, 255]);
        assert!(frame.pixels.chunks(3).all(|p| p == [0, 0, 255]));
    }

    #[test]
    fn plot_keeps_strongest_coverage_and_ignores_out_of_bounds() {
        let mut layer = TextLayer::new(2, 2);
        layer.plot(0, 0, [255, 255, 255, 255], 200);
        layer.plot(0, 0, [10, 10, 10, 255], 100);
        layer.plot(-1, 0, [255, 255, 255, 255], 255);
        layer.plot(5, 5, [255, 255, 255, 255], 255);
        assert_eq!(layer.pixels[0], [255, 255, 255, 200]);
        assert!(!layer.is_blank());
    }

    #[test]
    fn into_image_keeps_dimensions() {
        let image = RasterFrame::filled(3, 2, [9, 9, 9]).into_image();
        let image = image.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(image.dimensions(), (3, 2));
    }
}
