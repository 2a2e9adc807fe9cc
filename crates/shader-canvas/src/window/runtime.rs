use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::canvas::{CanvasConfig, CanvasControl, ShaderCanvas};
use crate::device::{Gpu, GpuInit};

/// Entry point: runs a canvas until its window closes.
pub struct CanvasRuntime;

impl CanvasRuntime {
    /// Opens a window for `config` and blocks on the event loop.
    pub fn run(config: CanvasConfig) -> Result<()> {
        Self::run_with(config, |_canvas: &mut ShaderCanvas, _window: &Window| {})
    }

    /// Like [`run`], with a per-frame hook.
    ///
    /// The hook fires once per frame callback, before rendering, whether or
    /// not the canvas is currently drawing. It receives the canvas (for
    /// uniform updates, clear-color changes, start/stop) and the window
    /// handle (the host embedding surface).
    ///
    /// [`run`]: CanvasRuntime::run
    pub fn run_with<F>(config: CanvasConfig, hook: F) -> Result<()>
    where
        F: FnMut(&mut ShaderCanvas, &Window) + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState {
            config,
            gpu_init: GpuInit::default(),
            hook,
            entry: None,
            canvas: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct RuntimeState<F> {
    config: CanvasConfig,
    gpu_init: GpuInit,
    hook: F,

    entry: Option<WindowEntry>,
    canvas: Option<ShaderCanvas>,
}

impl<F> RuntimeState<F>
where
    F: FnMut(&mut ShaderCanvas, &Window) + 'static,
{
    fn create_canvas(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_visible(self.config.auto_visible);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryBuilder {
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).expect("GPU initialization failed")
            },
        }
        .build();

        self.canvas = Some(entry.with_gpu(|gpu| ShaderCanvas::new(gpu, &self.config)));
        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    /// Drops the window, GPU context, and canvas together.
    ///
    /// This is the disposal path: with the window gone, the host stops
    /// delivering resize and redraw callbacks, so nothing dangles.
    fn destroy_canvas(&mut self) {
        self.canvas = None;
        self.entry = None;
    }
}

impl<F> ApplicationHandler for RuntimeState<F>
where
    F: FnMut(&mut ShaderCanvas, &Window) + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_canvas(event_loop) {
            log::error!("failed to create canvas window: {e:#}");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.destroy_canvas();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                if self.config.auto_resize {
                    if let Some(canvas) = self.canvas.as_mut() {
                        canvas.resize(new_size.width, new_size.height);
                    }
                }
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                if self.config.auto_resize {
                    if let Some(canvas) = self.canvas.as_mut() {
                        canvas.resize(new_size.width, new_size.height);
                    }
                }
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let Some(canvas) = self.canvas.as_mut() else {
                    return;
                };
                let hook = &mut self.hook;

                // Re-arm the next frame before doing any frame work so a
                // mid-frame exit request is the only thing that stops the loop.
                entry.with_window(|w| w.request_redraw());

                let mut control = CanvasControl::Continue;
                entry.with_mut(|fields| {
                    hook(canvas, fields.window);

                    if canvas.is_running() {
                        fields.window.pre_present_notify();
                    }
                    control = canvas.render_frame(fields.gpu);
                });

                if control == CanvasControl::Exit {
                    self.destroy_canvas();
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}
