// renderer/painter.rs
// Software rendering backend: rigid transform stack, orthographic
// projection, and a plain RGB framebuffer. Rows are stored bottom-to-top
// like a swapchain back buffer, which is exactly what capture expects to
// have to flip. Doubles as the test backend.

use std::collections::VecDeque;

use palette::Srgba;
use ultraviolet::{DRotor3, DVec3};

use super::backend::RenderBackend;

/// Rigid transform v -> rot * v + pos. Rotations and translations compose
/// the way a matrix stack composes them: later calls apply in local
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    rot: DRotor3,
    pos: DVec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            rot: DRotor3::identity(),
            pos: DVec3::zero(),
        }
    }

    pub fn apply(&self, v: DVec3) -> DVec3 {
        self.rot * v + self.pos
    }

    pub fn translate(&mut self, d: DVec3) {
        self.pos += self.rot * d;
    }

    pub fn rotate(&mut self, r: DRotor3) {
        self.rot = self.rot * r;
    }
}

pub struct Painter {
    width: u32,
    height: u32,
    /// World units spanned by the viewport height.
    view_extent: f64,
    transform: Transform,
    stack: Vec<Transform>,
    color: [u8; 3],
    point_size: f32,
    canvas: Vec<u8>,
    presented: Option<Vec<u8>>,
    keys: VecDeque<char>,
}

impl Painter {
    pub fn new(width: u32, height: u32, view_extent: f64) -> Self {
        Self {
            width,
            height,
            view_extent: view_extent.max(f64::MIN_POSITIVE),
            transform: Transform::identity(),
            stack: Vec::new(),
            color: [255, 255, 255],
            point_size: 1.0,
            canvas: vec![0; (width * height * 3) as usize],
            presented: None,
            keys: VecDeque::new(),
        }
    }

    /// Queue a key press for the next poll; the event source for headless
    /// and scripted runs.
    pub fn push_key(&mut self, key: char) {
        self.keys.push_back(key);
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Orthographic projection to pixel coordinates, y up.
    fn project(&self, v: DVec3) -> (f64, f64) {
        let scale = f64::from(self.height) / self.view_extent;
        (
            f64::from(self.width) * 0.5 + v.x * scale,
            f64::from(self.height) * 0.5 + v.y * scale,
        )
    }

    fn plot(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 3) as usize;
        self.canvas[i..i + 3].copy_from_slice(&self.color);
    }

    fn plot_square(&mut self, cx: f64, cy: f64, size: f32) {
        let half = (f64::from(size) * 0.5).max(0.5);
        let (x0, x1) = ((cx - half).round() as i64, (cx + half).round() as i64);
        let (y0, y1) = ((cy - half).round() as i64, (cy + half).round() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.plot(x, y);
            }
        }
    }

    fn stroke(&mut self, a: DVec3, b: DVec3, colors: Option<([u8; 3], [u8; 3])>) {
        let (ax, ay) = self.project(self.transform.apply(a));
        let (bx, by) = self.project(self.transform.apply(b));
        let steps = (bx - ax).abs().max((by - ay).abs()).ceil() as i64;
        let steps = steps.clamp(1, 1 << 16);
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            if let Some((ca, cb)) = colors {
                for c in 0..3 {
                    let v = f64::from(ca[c]) + (f64::from(cb[c]) - f64::from(ca[c])) * t;
                    self.color[c] = v.round() as u8;
                }
            }
            let x = ax + (bx - ax) * t;
            let y = ay + (by - ay) * t;
            self.plot(x.round() as i64, y.round() as i64);
        }
    }
}

fn to_bytes(color: Srgba<f32>) -> [u8; 3] {
    let c: Srgba<u8> = color.into_format();
    [c.red, c.green, c.blue]
}

impl RenderBackend for Painter {
    fn clear(&mut self) {
        self.canvas.fill(0);
    }

    fn set_color(&mut self, color: Srgba<f32>) {
        self.color = to_bytes(color);
    }

    fn set_point_size(&mut self, size: f32) {
        self.point_size = size;
    }

    fn draw_points(&mut self, points: &[DVec3]) {
        for p in points {
            let (x, y) = self.project(self.transform.apply(*p));
            self.plot_square(x, y, self.point_size);
        }
    }

    fn draw_solid_sphere(&mut self, center: DVec3, radius: f64) {
        let (cx, cy) = self.project(self.transform.apply(center));
        let scale = f64::from(self.height) / self.view_extent;
        let r = (radius * scale).max(0.5);
        let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.plot(x, y);
                }
            }
        }
    }

    fn draw_wire_cube(&mut self, center: DVec3, extents: DVec3) {
        let h = extents * 0.5;
        let corner = |i: usize| {
            DVec3::new(
                center.x + if i & 1 == 0 { -h.x } else { h.x },
                center.y + if i & 2 == 0 { -h.y } else { h.y },
                center.z + if i & 4 == 0 { -h.z } else { h.z },
            )
        };
        // each edge connects corners differing in exactly one bit
        for i in 0..8 {
            for bit in [1usize, 2, 4] {
                if i & bit == 0 {
                    self.stroke(corner(i), corner(i | bit), None);
                }
            }
        }
    }

    fn draw_line_loop(&mut self, points: &[DVec3]) {
        if points.len() < 2 {
            return;
        }
        for pair in points.windows(2) {
            self.stroke(pair[0], pair[1], None);
        }
        self.stroke(points[points.len() - 1], points[0], None);
    }

    fn draw_line_strip(&mut self, points: &[(DVec3, Srgba<f32>)]) {
        for pair in points.windows(2) {
            let (a, ca) = pair[0];
            let (b, cb) = pair[1];
            self.stroke(a, b, Some((to_bytes(ca), to_bytes(cb))));
        }
    }

    fn translate(&mut self, shift: DVec3) {
        self.transform.translate(shift);
    }

    fn rotate_x_deg(&mut self, degrees: f64) {
        self.transform
            .rotate(DRotor3::from_rotation_yz(degrees.to_radians()));
    }

    fn rotate_z_deg(&mut self, degrees: f64) {
        self.transform
            .rotate(DRotor3::from_rotation_xy(degrees.to_radians()));
    }

    fn push_transform(&mut self) {
        self.stack.push(self.transform);
    }

    fn pop_transform(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn present(&mut self) {
        self.presented = Some(self.canvas.clone());
    }

    fn viewport(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn read_rgb(&self) -> Option<Vec<u8>> {
        self.presented.clone()
    }

    fn poll_keys(&mut self) -> Vec<char> {
        self.keys.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_readable_before_first_present() {
        let mut p = Painter::new(8, 8, 10.0);
        assert!(p.read_rgb().is_none());
        p.present();
        assert_eq!(p.read_rgb().unwrap().len(), 8 * 8 * 3);
    }

    #[test]
    fn points_land_in_the_framebuffer() {
        let mut p = Painter::new(16, 16, 4.0);
        p.set_color(Srgba::new(1.0, 1.0, 0.0, 1.0));
        p.set_point_size(2.0);
        p.draw_points(&[DVec3::zero()]);
        p.present();
        let rows = p.read_rgb().unwrap();
        // center pixel of row 8
        let i = (8 * 16 + 8) * 3;
        assert_eq!(&rows[i..i + 3], &[255, 255, 0]);
    }

    #[test]
    fn translate_then_inverse_restores_identity_transform() {
        let mut p = Painter::new(4, 4, 1.0);
        let before = p.transform();
        let shift = DVec3::new(512.0, -128.0, 0.25);
        p.translate(shift);
        assert_ne!(p.transform(), before);
        p.translate(-shift);
        assert_eq!(p.transform(), before);
    }

    #[test]
    fn push_pop_restores_rotated_transform() {
        let mut p = Painter::new(4, 4, 1.0);
        p.rotate_z_deg(30.0);
        let before = p.transform();
        p.push_transform();
        p.translate(DVec3::new(1.0, 2.0, 3.0));
        p.rotate_x_deg(45.0);
        p.pop_transform();
        assert_eq!(p.transform(), before);
    }

    #[test]
    fn rotation_moves_points_as_expected() {
        let mut p = Painter::new(64, 64, 8.0);
        p.rotate_z_deg(90.0);
        // unit x rotated 90 degrees about z lands on +y
        let v = p.transform().apply(DVec3::unit_x());
        assert!((v.x).abs() < 1.0e-12);
        assert!((v.y - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn keys_drain_in_order() {
        let mut p = Painter::new(4, 4, 1.0);
        p.push_key('a');
        p.push_key('b');
        assert_eq!(p.poll_keys(), vec!['a', 'b']);
        assert!(p.poll_keys().is_empty());
    }
}
