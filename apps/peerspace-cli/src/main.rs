mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use peerspace_assets::AssetStore;
use peerspace_common::Pose;
use peerspace_input::{InputEvent, Key};
use peerspace_net::{
    InboundMessage, JsonLinesTransport, MemoryTransport, OfflineMessage, PeerStateMessage,
    Transport, decode_inbound,
};
use peerspace_render::{DebugTextRenderer, Renderer};
use peerspace_session::{Session, SessionConfig, SessionEvent};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use script::ScriptLine;

#[derive(Parser)]
#[command(name = "peerspace-cli", about = "CLI tool for peerspace sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration
    Info,
    /// Walk the rig and watch a peer join, move and leave
    Demo {
        /// Movement keys held for the whole demo
        #[arg(long, value_delimiter = ',', default_value = "W,D")]
        hold: Vec<Key>,
        /// Frames to run
        #[arg(short, long, default_value = "8")]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
    },
    /// Run a JSON-lines session script
    Simulate {
        /// Script file
        script: PathBuf,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Write published player states here as JSON lines
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the frame view after every frame, not only at the end
        #[arg(long)]
        every_frame: bool,
    },
    /// Decode one inbound message
    Decode {
        /// Event name (`player` or `offline`)
        event: String,
        /// JSON payload
        payload: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("peerspace-cli v{}", env!("CARGO_PKG_VERSION"));
            print!("{}", config.to_yaml()?);
        }
        Commands::Demo { hold, frames, dt } => run_demo(&config, &hold, frames, dt)?,
        Commands::Simulate {
            script,
            dt,
            out,
            every_frame,
        } => {
            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("reading {}", script.display()))?;
            let lines = script::parse(&text)?;
            let sink: Box<dyn Write> = match out {
                Some(path) => Box::new(std::io::BufWriter::new(
                    std::fs::File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?,
                )),
                None => Box::new(std::io::sink()),
            };
            run_script(&config, lines, JsonLinesTransport::new(sink), dt, every_frame)?;
        }
        Commands::Decode { event, payload } => {
            let message = decode_inbound(&event, &payload)?;
            println!("{message:#?}");
            println!("{:#?}", SessionEvent::from(message));
        }
    }

    Ok(())
}

fn run_demo(config: &SessionConfig, hold: &[Key], frames: u32, dt: f32) -> Result<()> {
    let mut store = AssetStore::new();
    let (mut session, _) = Session::with_scene(config, &mut store, MemoryTransport::new())?;
    let renderer = DebugTextRenderer::new();

    session.push(InputEvent::PointerLockChanged { locked: true });
    session.push(InputEvent::LookDelta { dx: -40.0, dy: 10.0 });
    for key in hold {
        session.push(InputEvent::KeyChange {
            key: *key,
            pressed: true,
        });
    }

    let rotation = Vec3::new(0.0, 0.1, 0.0);
    for frame in 0..frames {
        let message = match frame {
            0 => Some(player("abc", Vec3::new(1.0, 2.0, 3.0), rotation)),
            3 => Some(player("abc", Vec3::new(4.0, 5.0, 6.0), rotation)),
            f if f + 2 == frames => Some(InboundMessage::Offline(OfflineMessage {
                socketid: "abc".into(),
            })),
            _ => None,
        };
        if let Some(message) = message {
            session.transport_mut().deliver(message);
        }
        let view = session.frame(dt);
        print!("{}", renderer.render(&config.scene, &view));
    }

    println!(
        "published {} states, {} avatar(s) released",
        session.transport().published().len(),
        session.mirror().loader().released()
    );
    Ok(())
}

fn run_script<T: Transport>(
    config: &SessionConfig,
    lines: Vec<ScriptLine>,
    transport: T,
    dt: f32,
    every_frame: bool,
) -> Result<()> {
    let mut store = AssetStore::new();
    let (mut session, _) = Session::with_scene(config, &mut store, transport)?;
    let renderer = DebugTextRenderer::new();

    for line in lines {
        match line {
            ScriptLine::Event(event) => session.push(event),
            ScriptLine::Inbound(message) => session.push(message),
            ScriptLine::Frames { frames } => {
                for _ in 0..frames {
                    let view = session.frame(dt);
                    if every_frame {
                        print!("{}", renderer.render(&config.scene, &view));
                    }
                }
            }
        }
    }

    // Anything queued after the last frames line still gets a frame.
    if session.pending_events() > 0 {
        session.frame(dt);
    }
    print!("{}", renderer.render(&config.scene, &session.view()));
    tracing::info!(frames = session.frame_count(), "script finished");
    Ok(())
}

fn player(id: &str, position: Vec3, rotation: Vec3) -> InboundMessage {
    InboundMessage::Player(PeerStateMessage::new(id, Pose::new(position, rotation)))
}
