/// Orrery Terminal Demo - spinning boxes or a sun/earth/moon system
///
/// Controls:
///   - Mouse: click a body to select it, hover to inspect
///   - WASD / Arrow Keys: Tilt the scene
///   - E/R: Roll
///   - X: Toggle axes, F: Toggle flat shading
///   - Space: Pause, +/-: Animation speed
///   - Q/ESC: Quit
use clap::{Parser, ValueEnum};
use orrery_core::{Demo, DemoKind, OrreryConfig, Result};
use orrery_terminal::{logging, TerminalApp};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DemoArg {
    Boxes,
    Solar,
}

impl From<DemoArg> for DemoKind {
    fn from(arg: DemoArg) -> Self {
        match arg {
            DemoArg::Boxes => DemoKind::Boxes,
            DemoArg::Solar => DemoKind::Solar,
        }
    }
}

/// Render a small 3D scene in the terminal.
#[derive(Parser, Debug)]
#[command(name = "orrery-terminal", version, about)]
struct Args {
    /// Scene to show.
    #[arg(value_enum, default_value_t = DemoArg::Solar)]
    demo: DemoArg,

    /// Config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => OrreryConfig::load_from_path(path)?,
        None => OrreryConfig::default(),
    };

    println!("Orrery Terminal Renderer - Loading...");
    let hues = [rand::random(), rand::random(), rand::random()];
    let demo = Demo::build(args.demo.into(), &config, hues)?;
    info!(demo = demo.kind.name(), "starting");

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(demo, config.render)?;
    app.run()?;

    println!("Thank you for using the Orrery Terminal Renderer!");
    Ok(())
}
