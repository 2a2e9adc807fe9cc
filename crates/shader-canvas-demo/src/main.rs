use anyhow::Result;

use shader_canvas::logging::{init_logging, LoggingConfig};
use shader_canvas::{CanvasConfig, CanvasRuntime, Rgb, UniformValue};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = CanvasConfig {
        title: "shader-canvas plasma".to_string(),
        fragment_shader: Some(include_str!("plasma.frag.wgsl").to_string()),
        uniforms: vec![
            ("speed".to_string(), UniformValue::Float(1.0)),
            ("tint".to_string(), UniformValue::Vec3([1.0, 1.0, 1.0])),
        ],
        clear_color: Rgb::from_hex(0x202020),
        ..Default::default()
    };

    CanvasRuntime::run_with(config, |canvas, _window| {
        // Ramp the animation speed up over the first few seconds.
        canvas.apply_to_uniform("speed", |v| {
            let current = v.and_then(|v| v.as_float()).unwrap_or(1.0);
            UniformValue::Float((current + 0.002).min(2.5))
        });
    })
}
