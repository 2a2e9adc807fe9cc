use cgmath::{ortho, Matrix4, Vector3};

/// Near plane of the canvas projection. The quad sits at z = 0.
const Z_NEAR: f32 = -1.0;
/// Far plane of the canvas projection.
const Z_FAR: f32 = 1.0;

/// Orthographic pixel-space camera looking straight at the canvas quad.
///
/// The projection maps `[0, width] × [0, height]` with a top-left origin
/// (y grows downwards) onto the full clip volume. Bounds are recomputed on
/// every resize; near/far are fixed.
#[derive(Debug, Copy, Clone)]
pub struct PixelCamera {
    width: f32,
    height: f32,
}

impl PixelCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Updates the projection bounds to `[0, width] × [0, height]`.
    ///
    /// Degenerate sizes are not rejected here; the resulting matrix is
    /// whatever `cgmath::ortho` produces for them.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }

    /// Projection matrix for the current bounds.
    pub fn projection(&self) -> Matrix4<f32> {
        // Top-left origin: y = 0 maps to the top of clip space.
        ortho(0.0, self.width, self.height, 0.0, Z_NEAR, Z_FAR)
    }

    /// Model transform placing the unit quad so it exactly covers the
    /// viewport: centered at `(width/2, height/2)`, scaled to the full size.
    pub fn quad_model(&self) -> Matrix4<f32> {
        let center = Vector3::new(self.width / 2.0, self.height / 2.0, 0.0);
        Matrix4::from_translation(center)
            * Matrix4::from_nonuniform_scale(self.width, self.height, 1.0)
    }

    /// Combined matrix the vertex stage applies to unit-quad corners.
    pub fn quad_mvp(&self) -> [[f32; 4]; 4] {
        (self.projection() * self.quad_model()).into()
    }
}
