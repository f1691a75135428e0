use crate::core::projection::ScreenTriangle;
use log::debug;

/// 绘制输出端。排序后的三角形由远到近逐个交给它，
/// 实现方只管覆盖绘制，不做任何深度判断。
pub trait DrawSink {
    fn draw_triangle(&mut self, triangle: &ScreenTriangle);
}

/// 仅收集三角形的输出端，测试用
#[derive(Debug, Default)]
pub struct CollectSink {
    pub triangles: Vec<ScreenTriangle>,
}

impl DrawSink for CollectSink {
    fn draw_triangle(&mut self, triangle: &ScreenTriangle) {
        self.triangles.push(triangle.clone());
    }
}

/// RGB 帧缓冲输出端，扫描线填充三角形并可存为 PNG
pub struct FramebufferSink {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    background: [u8; 3],
}

impl FramebufferSink {
    pub fn new(width: usize, height: usize, background: [u8; 3]) -> Self {
        let mut sink = Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
            background,
        };
        sink.clear();
        sink
    }

    /// 帧缓冲重置为背景色
    pub fn clear(&mut self) {
        for pixel in self.pixels.chunks_exact_mut(3) {
            pixel.copy_from_slice(&self.background);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let base = (y * self.width + x) * 3;
        [self.pixels[base], self.pixels[base + 1], self.pixels[base + 2]]
    }

    pub fn save_png(&self, path: &str) -> Result<(), String> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width as u32,
            self.height as u32,
            image::ColorType::Rgb8,
        )
        .map_err(|e| format!("无法保存PNG文件 {path}: {e}"))?;
        debug!("帧已保存至 {path}");
        Ok(())
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: [u8; 3]) {
        let base = (y * self.width + x) * 3;
        self.pixels[base..base + 3].copy_from_slice(&color);
    }

    /// 某条扫描线（像素中心 y+0.5）与三角形边的交点横坐标
    fn scanline_span(triangle: &ScreenTriangle, cy: f32) -> Option<(f32, f32)> {
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut hit = false;
        for k in 0..3 {
            let [x0, y0] = triangle.screen[k];
            let [x1, y1] = triangle.screen[(k + 1) % 3];
            if (y0 - y1).abs() < 1e-9 {
                if (cy - y0).abs() < 0.5 {
                    min_x = min_x.min(x0.min(x1));
                    max_x = max_x.max(x0.max(x1));
                    hit = true;
                }
                continue;
            }
            let t = (cy - y0) / (y1 - y0);
            if (0.0..=1.0).contains(&t) {
                let x = x0 + t * (x1 - x0);
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                hit = true;
            }
        }
        hit.then_some((min_x, max_x))
    }
}

impl DrawSink for FramebufferSink {
    fn draw_triangle(&mut self, triangle: &ScreenTriangle) {
        let ys = triangle.screen.map(|v| v[1]);
        let y_min = ys.iter().cloned().fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
        let y_max = ys
            .iter()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max)
            .ceil()
            .min(self.height as f32 - 1.0);
        if y_max < 0.0 {
            return;
        }
        for y in y_min..=y_max as usize {
            let cy = y as f32 + 0.5;
            let Some((min_x, max_x)) = Self::scanline_span(triangle, cy) else {
                continue;
            };
            let x_start = min_x.floor().max(0.0) as usize;
            let x_end = max_x.ceil().min(self.width as f32 - 1.0);
            if x_end < 0.0 {
                continue;
            }
            for x in x_start..=x_end as usize {
                let cx = x as f32 + 0.5;
                if cx >= min_x && cx <= max_x {
                    self.set_pixel(x, y, triangle.color);
                }
            }
        }
    }
}
