use anyhow::{Context, Result};
use clap::Parser;
use peerspace_assets::{AssetStore, DeferredModelLoader};
use peerspace_input::{InputEvent, Key};
use peerspace_net::{JsonLinesTransport, decode_envelope};
use peerspace_render::{DebugTextRenderer, Renderer, SceneDescription};
use peerspace_session::{Session, SessionConfig, SessionEvent};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "peerspace-desktop", about = "Peerspace desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write published player states here as JSON lines
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Inbound messages (JSON-lines envelopes) delivered before the first frame
    #[arg(long)]
    inbound: Option<PathBuf>,
}

/// Map the outcome of a cursor grab to the event the rig sees.
///
/// X11 has no `Locked` grab. `Confined` with a hidden cursor still delivers
/// raw `DeviceEvent::MouseMotion` deltas, which is all mouse look reads, so
/// it counts as captured. Any other outcome is a capture error.
fn capture_event(granted: Result<CursorGrabMode, String>) -> InputEvent {
    match granted {
        Ok(CursorGrabMode::Locked) => InputEvent::PointerLockChanged { locked: true },
        Ok(CursorGrabMode::Confined) => {
            tracing::info!("pointer lock unavailable, using confined cursor");
            InputEvent::PointerLockChanged { locked: true }
        }
        Ok(_) => InputEvent::PointerLockError {
            reason: "cursor grab was not applied".into(),
        },
        Err(reason) => InputEvent::PointerLockError { reason },
    }
}

type DesktopSession = Session<DeferredModelLoader, JsonLinesTransport<Box<dyn Write>>>;

struct App {
    session: DesktopSession,
    scene: SceneDescription,
    window: Option<Arc<Window>>,
    last_frame: Instant,
    last_report: Instant,
}

impl App {
    fn new(session: DesktopSession, scene: SceneDescription) -> Self {
        let now = Instant::now();
        Self {
            session,
            scene,
            window: None,
            last_frame: now,
            last_report: now,
        }
    }

    /// Ask the window system for exclusive pointer capture and report the
    /// outcome to the session.
    fn request_pointer_lock(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let granted = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .map(|()| CursorGrabMode::Locked)
            .or_else(|_| {
                window
                    .set_cursor_grab(CursorGrabMode::Confined)
                    .map(|()| CursorGrabMode::Confined)
            })
            .map_err(|e| e.to_string());
        if granted.is_ok() {
            window.set_cursor_visible(false);
        }
        self.session.push(capture_event(granted));
    }

    fn release_pointer_lock(&mut self) {
        if let Some(window) = &self.window {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                tracing::warn!("failed to release pointer: {e}");
            }
            window.set_cursor_visible(true);
        }
        self.session
            .push(InputEvent::PointerLockChanged { locked: false });
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        let view = self.session.frame(dt);

        if let Some(window) = &self.window {
            window.set_title(&format!(
                "Peerspace ({:.1}, {:.1}, {:.1}) peers={}",
                view.eye.x,
                view.eye.y,
                view.eye.z,
                view.peers.len()
            ));
        }
        if now - self.last_report >= std::time::Duration::from_secs(5) {
            self.last_report = now;
            tracing::debug!("\n{}", DebugTextRenderer::new().render(&self.scene, &view));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Peerspace")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.session.push(SessionEvent::Resize {
            width: size.width,
            height: size.height,
        });
        self.window = Some(window);
        tracing::info!("window created, click to capture the pointer");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.session.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.session.push(SessionEvent::Resize {
                    width: new_size.width,
                    height: new_size.height,
                });
            }
            WindowEvent::Focused(false) if self.session.rig().is_locked() => {
                self.release_pointer_lock();
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } if !self.session.rig().is_locked() => {
                self.request_pointer_lock();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    self.release_pointer_lock();
                    return;
                }
                self.session.push(InputEvent::KeyChange {
                    key: Key::from(code),
                    pressed: state == ElementState::Pressed,
                });
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.session.push(InputEvent::LookDelta {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("peerspace-desktop starting");

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let sink: Box<dyn Write> = match &cli.out {
        Some(path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::sink()),
    };
    let mut transport = JsonLinesTransport::new(sink);

    if let Some(path) = &cli.inbound {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        for (i, line) in text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
            let message =
                decode_envelope(line).with_context(|| format!("{} line {}", path.display(), i + 1))?;
            transport.deliver(message);
        }
    }

    let mut store = AssetStore::new();
    let (session, _) = Session::with_scene(&config, &mut store, transport)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(session, config.scene.clone());
    event_loop.run_app(&mut app)?;

    Ok(())
}
