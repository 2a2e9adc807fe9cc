/// Straight (non-premultiplied) RGB color, used for clearing the surface.
///
/// The canvas always clears to an opaque color, so there is no alpha channel
/// here. Values are not range-checked; out-of-range components are passed to
/// the GPU as-is.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from a `0xRRGGBB` integer, e.g. `Rgb::from_hex(0x888888)`.
    ///
    /// Bits above the low 24 are ignored.
    #[inline]
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self { r, g, b }
    }

    /// Converts to the double-precision color wgpu expects for clear ops.
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_extracts_channels() {
        let c = Rgb::from_hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn from_hex_ignores_high_bits() {
        assert_eq!(Rgb::from_hex(0xff_888888), Rgb::from_hex(0x888888));
    }

    #[test]
    fn to_wgpu_is_opaque() {
        let c = Rgb::from_hex(0x123456).to_wgpu();
        assert_eq!(c.a, 1.0);
    }
}
