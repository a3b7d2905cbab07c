// renderer/backend.rs
// Drawing/presentation capability injected into the render loop. The loop
// only issues transform and draw calls and reads pixels back for capture;
// what a "surface" is stays the implementation's business.

use palette::Srgba;
use ultraviolet::DVec3;

pub trait RenderBackend {
    /// Wipe the working frame to the background color.
    fn clear(&mut self);

    fn set_color(&mut self, color: Srgba<f32>);

    fn set_point_size(&mut self, size: f32);

    /// Plot the point cloud under the current transform.
    fn draw_points(&mut self, points: &[DVec3]);

    /// Filled sphere at `center` (current-transform coordinates).
    fn draw_solid_sphere(&mut self, center: DVec3, radius: f64);

    /// Axis-aligned wireframe box of the given extents around `center`.
    fn draw_wire_cube(&mut self, center: DVec3, extents: DVec3);

    fn draw_line_loop(&mut self, points: &[DVec3]);

    /// Polyline with per-vertex colors, for streaks fading along their
    /// length.
    fn draw_line_strip(&mut self, points: &[(DVec3, Srgba<f32>)]);

    /// Post-compose a translation onto the current transform. Applying the
    /// negated shift afterwards is the undo half of the ghost-image
    /// discipline.
    fn translate(&mut self, shift: DVec3);

    fn rotate_x_deg(&mut self, degrees: f64);

    fn rotate_z_deg(&mut self, degrees: f64);

    fn push_transform(&mut self);

    fn pop_transform(&mut self);

    /// Present the composed frame. The first present is what makes the
    /// surface readable for capture.
    fn present(&mut self);

    fn viewport(&self) -> Option<(u32, u32)>;

    /// Presented pixels as tightly packed RGB rows, bottom row first. None
    /// until a frame has been presented.
    fn read_rgb(&self) -> Option<Vec<u8>>;

    /// Drain pending key presses in arrival order.
    fn poll_keys(&mut self) -> Vec<char>;
}
