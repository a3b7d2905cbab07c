// renderer/capture.rs
// Readback of the presented frame into numbered PNG files. Presented rows
// arrive bottom-to-top and are flipped on the way out.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use super::backend::RenderBackend;

/// Raster capture with a monotonically increasing sequence counter.
#[derive(Default)]
pub struct FrameCapture {
    counter: u64,
}

impl FrameCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Write the presented frame to `path`. A request made before anything
    /// has been presented is a normal startup race and is dropped silently.
    pub fn capture_single<B: RenderBackend>(&self, backend: &B, path: &Path) {
        let Some((width, height)) = backend.viewport() else {
            log::debug!("capture skipped: no render surface");
            return;
        };
        let Some(rows) = backend.read_rgb() else {
            log::debug!("capture skipped: no frame presented yet");
            return;
        };
        if rows.len() != (width * height * 3) as usize {
            log::warn!(
                "capture skipped: framebuffer is {} bytes, expected {}",
                rows.len(),
                width * height * 3
            );
            return;
        }

        let mut img: RgbImage = ImageBuffer::new(width, height);
        for y in 0..height {
            let src = ((height - 1 - y) * width * 3) as usize;
            for x in 0..width {
                let i = src + (x * 3) as usize;
                img.put_pixel(x, y, Rgb([rows[i], rows[i + 1], rows[i + 2]]));
            }
        }
        match img.save(path) {
            Ok(()) => log::info!("frame saved as '{}'", path.display()),
            Err(e) => log::error!("error while writing file '{}': {e}", path.display()),
        }
    }

    /// Batch mode: `<base><counter>.png` with a zero-padded nine-digit
    /// counter. The counter advances even when the surface is not ready so
    /// file numbering tracks request numbering.
    pub fn capture_sequence<B: RenderBackend>(&mut self, backend: &B, base: &str) {
        let path = format!("{base}{:09}.png", self.counter);
        self.counter += 1;
        self.capture_single(backend, Path::new(&path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::RenderBackend;
    use crate::renderer::painter::Painter;
    use palette::Srgba;
    use ultraviolet::DVec3;

    #[test]
    fn capture_before_present_is_a_no_op() {
        let painter = Painter::new(8, 8, 1.0);
        let dir = std::env::temp_dir().join("nbody_scope_capture_test");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("early.png");
        let _ = std::fs::remove_file(&path);

        FrameCapture::new().capture_single(&painter, &path);
        assert!(!path.exists());
    }

    #[test]
    fn capture_flips_rows_top_to_bottom() {
        let mut painter = Painter::new(9, 9, 3.0);
        // one bright point in the upper half of the view (positive y)
        painter.set_color(Srgba::new(1.0, 0.0, 0.0, 1.0));
        painter.set_point_size(1.0);
        painter.draw_points(&[DVec3::new(0.0, 1.0, 0.0)]);
        painter.present();

        let dir = std::env::temp_dir().join("nbody_scope_capture_test");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("flip.png");
        let _ = std::fs::remove_file(&path);
        FrameCapture::new().capture_single(&painter, &path);

        let img = image::open(&path).unwrap().to_rgb8();
        let mut red_rows = Vec::new();
        for (_, y, pixel) in img.enumerate_pixels() {
            if pixel.0 == [255, 0, 0] {
                red_rows.push(y);
            }
        }
        assert!(!red_rows.is_empty());
        // positive world y must end up in the upper image half (small y index)
        assert!(red_rows.iter().all(|&y| y < 4), "rows: {red_rows:?}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn sequence_counter_is_zero_padded_and_monotonic() {
        let mut painter = Painter::new(4, 4, 1.0);
        painter.present();
        let dir = std::env::temp_dir().join("nbody_scope_capture_seq");
        let _ = std::fs::remove_dir_all(&dir);
        let _ = std::fs::create_dir_all(&dir);
        let base = format!("{}/frame_", dir.display());

        let mut cap = FrameCapture::new();
        cap.capture_sequence(&painter, &base);
        cap.capture_sequence(&painter, &base);
        assert_eq!(cap.counter(), 2);
        assert!(dir.join("frame_000000000.png").exists());
        assert!(dir.join("frame_000000001.png").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
