/// A uniform value, tagged with its shader-side type.
///
/// The variant chosen at first assignment decides the WGSL declaration the
/// shader sees. Replacing a value with a different variant later is not
/// range-checked here; the mismatch surfaces as a shader-level failure, the
/// same way the underlying library reports any other uniform type error.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl UniformValue {
    /// WGSL type name for the declaration this value produces.
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            Self::Int(_) => "i32",
            Self::UInt(_) => "u32",
            Self::Float(_) => "f32",
            Self::Vec2(_) => "vec2<f32>",
            Self::Vec3(_) => "vec3<f32>",
            Self::Vec4(_) => "vec4<f32>",
        }
    }

    /// Alignment in bytes under WGSL uniform address-space rules.
    pub fn align(&self) -> usize {
        match self {
            Self::Int(_) | Self::UInt(_) | Self::Float(_) => 4,
            Self::Vec2(_) => 8,
            Self::Vec3(_) | Self::Vec4(_) => 16,
        }
    }

    /// Size in bytes of the value itself (padding excluded).
    pub fn size(&self) -> usize {
        match self {
            Self::Int(_) | Self::UInt(_) | Self::Float(_) => 4,
            Self::Vec2(_) => 8,
            Self::Vec3(_) => 12,
            Self::Vec4(_) => 16,
        }
    }

    /// Writes the raw bytes of this value into `out` at `offset`.
    ///
    /// `out` must be at least `offset + self.size()` long.
    pub fn write_bytes(&self, out: &mut [u8], offset: usize) {
        let dst = &mut out[offset..offset + self.size()];
        match self {
            Self::Int(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::UInt(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Float(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Vec2(v) => dst.copy_from_slice(bytemuck::cast_slice(v)),
            Self::Vec3(v) => dst.copy_from_slice(bytemuck::cast_slice(v)),
            Self::Vec4(v) => dst.copy_from_slice(bytemuck::cast_slice(v)),
        }
    }

    /// Returns the inner float for `Float` values, `None` otherwise.
    ///
    /// Convenience for callers animating scalar uniforms.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the inner integer for `Int` values, `None` otherwise.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        Self::UInt(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        Self::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        Self::Vec4(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_alignments_follow_wgsl_rules() {
        assert_eq!(UniformValue::Float(0.0).size(), 4);
        assert_eq!(UniformValue::Vec2([0.0; 2]).align(), 8);
        assert_eq!(UniformValue::Vec3([0.0; 3]).size(), 12);
        assert_eq!(UniformValue::Vec3([0.0; 3]).align(), 16);
        assert_eq!(UniformValue::Vec4([0.0; 4]).size(), 16);
    }

    #[test]
    fn write_bytes_round_trips_scalars() {
        let mut buf = [0u8; 8];
        UniformValue::Float(1.5).write_bytes(&mut buf, 4);
        assert_eq!(f32::from_le_bytes(buf[4..8].try_into().unwrap()), 1.5);

        UniformValue::Int(-7).write_bytes(&mut buf, 0);
        assert_eq!(i32::from_le_bytes(buf[0..4].try_into().unwrap()), -7);
    }

    #[test]
    fn write_bytes_round_trips_vectors() {
        let mut buf = [0u8; 16];
        UniformValue::Vec3([1.0, 2.0, 3.0]).write_bytes(&mut buf, 0);
        let got: &[f32] = bytemuck::cast_slice(&buf[0..12]);
        assert_eq!(got, &[1.0, 2.0, 3.0]);
    }
}
