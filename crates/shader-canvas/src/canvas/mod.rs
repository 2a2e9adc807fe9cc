//! The shader canvas itself.
//!
//! `ShaderCanvas` pairs a CPU-side state block (uniform table, frame clock,
//! camera, clear color, running flag) with the GPU resources for the
//! full-viewport quad. The state block carries all the observable semantics
//! and is testable without a device; the GPU half only executes what the
//! state describes.

mod camera;
mod pipeline;

pub use camera::PixelCamera;
pub use pipeline::{compose_module, QuadRenderer, DEFAULT_FRAGMENT_SHADER, DEFAULT_VERTEX_SHADER};

use std::time::Instant;

use winit::dpi::LogicalSize;

use crate::color::Rgb;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::uniforms::{builtin, UniformLayout, UniformTable, UniformValue};
use crate::time::FrameClock;

/// Canvas construction options.
///
/// All fields have defaults; a `CanvasConfig::default()` canvas opens a
/// visible window, tracks resizes, starts rendering immediately, and runs
/// the fallback UV-visualizing fragment shader over a mid-gray clear.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Window title.
    pub title: String,

    /// Initial window size in logical pixels.
    pub initial_size: LogicalSize<f64>,

    /// Initial caller-defined uniforms, merged after the built-ins.
    ///
    /// Order is preserved; it becomes the declaration order of the caller
    /// fields in the generated uniform struct.
    pub uniforms: Vec<(String, UniformValue)>,

    /// WGSL fragment stage source. `None` selects the fallback shader.
    ///
    /// The source must define `fn fs_main(in: VertexOut) -> @location(0)
    /// vec4<f32>`; it can read every table entry through the `uniforms`
    /// binding and the interpolated `in.fUv`.
    pub fragment_shader: Option<String>,

    /// WGSL vertex stage override.
    ///
    /// Changing this casually breaks the canvas: the default vertex stage
    /// defines the `fUv` output the fragment contract relies on. A
    /// replacement must produce the same `VertexOut` interface.
    pub vertex_shader: Option<String>,

    /// Create the window visible (the native analogue of attaching the
    /// drawable element to the document).
    pub auto_visible: bool,

    /// Forward host resize events to [`ShaderCanvas::resize`].
    pub auto_resize: bool,

    /// Start the render loop at construction.
    pub auto_start: bool,

    /// Initial clear color.
    pub clear_color: Rgb,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            title: "shader-canvas".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            uniforms: Vec::new(),
            fragment_shader: None,
            vertex_shader: None,
            auto_visible: true,
            auto_resize: true,
            auto_start: true,
            clear_color: Rgb::from_hex(0x888888),
        }
    }
}

/// Control directive returned from the per-frame render path.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CanvasControl {
    Continue,
    Exit,
}

/// CPU-side canvas state: everything observable through the public API.
#[derive(Debug, Clone)]
struct CanvasState {
    uniforms: UniformTable,
    clock: FrameClock,
    camera: PixelCamera,
    clear_color: Rgb,
    running: bool,
}

impl CanvasState {
    fn new(uniforms: UniformTable, clear_color: Rgb, running: bool, width: u32, height: u32) -> Self {
        let mut state = Self {
            uniforms,
            clock: FrameClock::new(),
            camera: PixelCamera::new(width, height),
            clear_color,
            running,
        };
        // A canvas is never observed before its first resize.
        state.resize(width, height);
        state
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.uniforms
            .set(builtin::SCREEN_WIDTH, UniformValue::Int(width as i32));
        self.uniforms
            .set(builtin::SCREEN_HEIGHT, UniformValue::Int(height as i32));
    }

    fn start_drawing(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.clock.restart(now);
        true
    }

    fn stop_drawing(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Writes the timing uniforms for the frame at `now`.
    fn begin_frame(&mut self, now: Instant) {
        let sample = self.clock.sample(now);
        self.uniforms.set(builtin::TIME, UniformValue::Float(sample.time));
        self.uniforms
            .set(builtin::DELTA_TIME, UniformValue::Float(sample.delta));
    }

    /// Advances the frame counter and the clock baseline after the draw.
    fn end_frame(&mut self, now: Instant) {
        self.uniforms.apply(builtin::FRAME, |v| {
            let current = v.and_then(|v| v.as_int()).unwrap_or(0);
            UniformValue::Int(current.wrapping_add(1))
        });
        self.clock.commit(now);
    }
}

/// Receiver for one frame's worth of GPU work.
///
/// `render_frame` drives a sink in the contract order; the production sink
/// wraps the quad renderer and an open encoder, tests substitute a recording
/// one so the sequence is checkable without a device.
trait FrameSink {
    fn clear(&mut self, color: Rgb);
    fn upload_uniforms(&mut self, uniforms: &UniformTable);
    fn upload_transform(&mut self, mvp: [[f32; 4]; 4]);
    fn draw(&mut self);
}

/// Runs one frame against `sink`: timing uniforms, clear, uniform upload,
/// quad draw, then the frame-counter/baseline advance.
fn drive_frame<S: FrameSink>(state: &mut CanvasState, sink: &mut S, now: Instant) {
    state.begin_frame(now);
    sink.clear(state.clear_color);
    sink.upload_uniforms(&state.uniforms);
    sink.upload_transform(state.camera.quad_mvp());
    sink.draw();
    state.end_frame(now);
}

/// Production sink: uploads go straight to the queue; the clear color is
/// held until `draw`, because wgpu expresses a clear as the load op of the
/// pass the quad is drawn in.
struct GpuFrameSink<'a> {
    renderer: &'a QuadRenderer,
    queue: &'a wgpu::Queue,
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    clear: Rgb,
}

impl FrameSink for GpuFrameSink<'_> {
    fn clear(&mut self, color: Rgb) {
        self.clear = color;
    }

    fn upload_uniforms(&mut self, uniforms: &UniformTable) {
        self.renderer.write_uniforms(self.queue, uniforms);
    }

    fn upload_transform(&mut self, mvp: [[f32; 4]; 4]) {
        self.renderer.write_transform(self.queue, mvp);
    }

    fn draw(&mut self) {
        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shader-canvas quad pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        self.renderer.draw(&mut rpass);
    }
}

/// A full-screen fragment-shader canvas.
///
/// Owns the uniform table, the orthographic camera, the viewport quad and
/// its compiled pipeline. The window runtime calls [`resize`] and
/// [`render_frame`]; everything else is direct caller API.
///
/// [`resize`]: ShaderCanvas::resize
/// [`render_frame`]: ShaderCanvas::render_frame
pub struct ShaderCanvas {
    state: CanvasState,
    renderer: QuadRenderer,
    warned_undeclared: bool,
}

impl ShaderCanvas {
    /// Builds a canvas against an initialized GPU context.
    ///
    /// Installs the built-in uniforms, merges the caller's entries, compiles
    /// the shader module, and performs the initial resize from the surface's
    /// current dimensions.
    pub fn new(gpu: &Gpu<'_>, config: &CanvasConfig) -> Self {
        let mut uniforms = UniformTable::with_builtins();
        for (key, value) in &config.uniforms {
            uniforms.set(key, *value);
        }

        let layout = UniformLayout::of(&uniforms);
        let vertex_src = config
            .vertex_shader
            .as_deref()
            .unwrap_or(DEFAULT_VERTEX_SHADER);
        let fragment_src = config
            .fragment_shader
            .as_deref()
            .unwrap_or(DEFAULT_FRAGMENT_SHADER);

        let renderer = QuadRenderer::new(
            gpu.device(),
            gpu.surface_format(),
            layout,
            vertex_src,
            fragment_src,
        );

        let size = gpu.size();
        let state = CanvasState::new(
            uniforms,
            config.clear_color,
            config.auto_start,
            size.width,
            size.height,
        );

        Self {
            state,
            renderer,
            warned_undeclared: false,
        }
    }

    /// Inserts or overwrites a uniform value.
    ///
    /// Keys the pipeline was not compiled against still round-trip through
    /// the table but never reach the shader; the first such key logs a debug
    /// diagnostic.
    pub fn set_uniform(&mut self, key: &str, value: UniformValue) {
        if !self.renderer.layout().declares(key) && !self.warned_undeclared {
            log::debug!("uniform `{key}` was not declared at construction; the shader cannot see it");
            self.warned_undeclared = true;
        }
        self.state.uniforms.set(key, value);
    }

    /// Current value of the named uniform, or `None` if never set.
    pub fn get_uniform(&self, key: &str) -> Option<UniformValue> {
        self.state.uniforms.get(key)
    }

    /// Reads, transforms, and writes back a uniform in one step.
    ///
    /// Equivalent to `set_uniform(key, f(get_uniform(key)))`; `f` receives
    /// `None` for a key that was never set.
    pub fn apply_to_uniform<F>(&mut self, key: &str, f: F)
    where
        F: FnOnce(Option<UniformValue>) -> UniformValue,
    {
        let next = f(self.get_uniform(key));
        self.set_uniform(key, next);
    }

    /// Updates the canvas to a new surface size in pixels.
    ///
    /// Refreshes the `screenWidth`/`screenHeight` uniforms and the camera
    /// bounds, and re-centers/re-scales the quad to cover the viewport.
    /// Surface reconfiguration itself belongs to the GPU layer; the runtime
    /// calls both on a host resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.state.resize(width, height);
    }

    pub fn clear_color(&self) -> Rgb {
        self.state.clear_color
    }

    /// Sets the clear color; takes effect with the next rendered frame.
    pub fn set_clear_color(&mut self, color: Rgb) {
        self.state.clear_color = color;
    }

    /// Starts the render loop.
    ///
    /// Returns true iff the loop was not running and is now; a second call
    /// while running returns false and changes nothing. Starting rebases the
    /// timing uniforms to zero.
    pub fn start_drawing(&mut self) -> bool {
        self.state.start_drawing(Instant::now())
    }

    /// Stops the render loop; returns true iff it was running.
    ///
    /// The window and GPU resources stay alive; `start_drawing` resumes with
    /// rebased timing.
    pub fn stop_drawing(&mut self) -> bool {
        self.state.stop_drawing()
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Renders one frame: clears with the current clear color, uploads the
    /// uniforms and the quad transform, draws the quad, and advances the
    /// frame counter. A no-op while the loop is stopped.
    pub fn render_frame(&mut self, gpu: &mut Gpu<'_>) -> CanvasControl {
        if !self.state.running {
            return CanvasControl::Continue;
        }

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface out of memory; stopping");
                        CanvasControl::Exit
                    }
                    _ => CanvasControl::Continue,
                };
            }
        };

        // Sink borrows the encoder; dropped before submit takes the frame.
        {
            let mut sink = GpuFrameSink {
                renderer: &self.renderer,
                queue: gpu.queue(),
                encoder: &mut frame.encoder,
                view: &frame.view,
                clear: self.state.clear_color,
            };
            drive_frame(&mut self.state, &mut sink, Instant::now());
        }

        gpu.submit(frame);
        CanvasControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> CanvasState {
        CanvasState::new(UniformTable::with_builtins(), Rgb::from_hex(0x888888), false, 640, 480)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn construction_performs_initial_resize() {
        let s = state();
        assert_eq!(s.uniforms.get(builtin::SCREEN_WIDTH), Some(UniformValue::Int(640)));
        assert_eq!(s.uniforms.get(builtin::SCREEN_HEIGHT), Some(UniformValue::Int(480)));
    }

    #[test]
    fn resize_updates_size_uniforms() {
        let mut s = state();
        s.resize(1920, 1080);
        assert_eq!(s.uniforms.get(builtin::SCREEN_WIDTH), Some(UniformValue::Int(1920)));
        assert_eq!(s.uniforms.get(builtin::SCREEN_HEIGHT), Some(UniformValue::Int(1080)));
    }

    // ── start / stop ──────────────────────────────────────────────────────

    #[test]
    fn start_drawing_is_true_exactly_once_while_running() {
        let mut s = state();
        let now = Instant::now();
        assert!(s.start_drawing(now));
        assert!(!s.start_drawing(now));
        assert!(!s.start_drawing(now + ms(16)));
        assert!(s.running);
    }

    #[test]
    fn stop_then_start_can_run_again() {
        let mut s = state();
        let now = Instant::now();
        assert!(!s.stop_drawing());
        assert!(s.start_drawing(now));
        assert!(s.stop_drawing());
        assert!(!s.running);
        assert!(s.start_drawing(now + ms(100)));
    }

    // ── frame contract ────────────────────────────────────────────────────

    #[test]
    fn frame_counter_matches_completed_frames() {
        let mut s = state();
        let t0 = Instant::now();
        s.start_drawing(t0);

        assert_eq!(s.uniforms.get(builtin::FRAME), Some(UniformValue::Int(0)));
        for i in 1..=5u64 {
            let now = t0 + ms(i * 16);
            s.begin_frame(now);
            s.end_frame(now);
        }
        assert_eq!(s.uniforms.get(builtin::FRAME), Some(UniformValue::Int(5)));
    }

    #[test]
    fn timing_uniforms_reflect_frame_spacing() {
        let mut s = state();
        let t0 = Instant::now();
        s.start_drawing(t0);

        s.begin_frame(t0 + ms(16));
        s.end_frame(t0 + ms(16));
        s.begin_frame(t0 + ms(48));

        let time = s.uniforms.get(builtin::TIME).and_then(|v| v.as_float()).unwrap();
        let delta = s
            .uniforms
            .get(builtin::DELTA_TIME)
            .and_then(|v| v.as_float())
            .unwrap();
        assert!((time - 0.048).abs() < 1e-6);
        assert!((delta - 0.032).abs() < 1e-6);
    }

    #[test]
    fn time_is_non_decreasing_over_a_run() {
        let mut s = state();
        let t0 = Instant::now();
        s.start_drawing(t0);

        let mut prev = -1.0f32;
        for i in 1..=8u64 {
            let now = t0 + ms(i * 9);
            s.begin_frame(now);
            let time = s.uniforms.get(builtin::TIME).and_then(|v| v.as_float()).unwrap();
            assert!(time >= prev);
            prev = time;
            s.end_frame(now);
        }
    }

    #[test]
    fn frame_counter_wraps_instead_of_overflowing() {
        let mut s = state();
        let now = Instant::now();
        s.uniforms.set(builtin::FRAME, UniformValue::Int(i32::MAX));
        s.begin_frame(now);
        s.end_frame(now);
        assert_eq!(s.uniforms.get(builtin::FRAME), Some(UniformValue::Int(i32::MIN)));
    }

    // ── render path ───────────────────────────────────────────────────────

    #[derive(Debug, PartialEq)]
    enum Step {
        Clear(Rgb),
        /// Timing/counter uniform values as seen at upload time.
        Uniforms { time: f32, frame: i32 },
        Transform,
        Draw,
    }

    #[derive(Default)]
    struct RecordingSink {
        steps: Vec<Step>,
    }

    impl FrameSink for RecordingSink {
        fn clear(&mut self, color: Rgb) {
            self.steps.push(Step::Clear(color));
        }

        fn upload_uniforms(&mut self, uniforms: &UniformTable) {
            self.steps.push(Step::Uniforms {
                time: uniforms.get(builtin::TIME).and_then(|v| v.as_float()).unwrap(),
                frame: uniforms.get(builtin::FRAME).and_then(|v| v.as_int()).unwrap(),
            });
        }

        fn upload_transform(&mut self, _mvp: [[f32; 4]; 4]) {
            self.steps.push(Step::Transform);
        }

        fn draw(&mut self) {
            self.steps.push(Step::Draw);
        }
    }

    #[test]
    fn frame_sequence_is_clear_upload_draw_then_advance() {
        let mut s = state();
        let t0 = Instant::now();
        s.start_drawing(t0);

        let mut sink = RecordingSink::default();
        drive_frame(&mut s, &mut sink, t0 + ms(16));

        assert_eq!(
            sink.steps,
            vec![
                Step::Clear(Rgb::from_hex(0x888888)),
                // Timing is written before the upload; the counter advances
                // only after the draw, so the upload still carries frame 0.
                Step::Uniforms { time: 0.016, frame: 0 },
                Step::Transform,
                Step::Draw,
            ]
        );
        assert_eq!(s.uniforms.get(builtin::FRAME), Some(UniformValue::Int(1)));
    }

    #[test]
    fn frame_clears_with_the_current_color_not_a_stale_one() {
        let mut s = state();
        let t0 = Instant::now();
        s.start_drawing(t0);

        let mut sink = RecordingSink::default();
        drive_frame(&mut s, &mut sink, t0 + ms(16));

        s.clear_color = Rgb::from_hex(0x123456);
        drive_frame(&mut s, &mut sink, t0 + ms(32));

        assert_eq!(sink.steps[4], Step::Clear(Rgb::from_hex(0x123456)));
    }

    // ── clear color ───────────────────────────────────────────────────────

    #[test]
    fn clear_color_is_plain_state() {
        let mut s = state();
        assert_eq!(s.clear_color, Rgb::from_hex(0x888888));
        s.clear_color = Rgb::from_hex(0x102030);
        assert_eq!(s.clear_color, Rgb::from_hex(0x102030));
    }
}
