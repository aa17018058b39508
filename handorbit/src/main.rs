//! Handorbit - hand gesture control for 3D models
//!
//! Replays landmark frames and control messages (one s-expression per
//! line) through the gesture session and prints the responses.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use handorbit::gesture::{ControllerConfig, RecognizerConfig};
use handorbit::ipc::handle_message;
use handorbit::scene::SceneModel;
use handorbit::state::Session;

#[derive(Parser, Debug)]
#[command(name = "handorbit", about = "Hand gesture recognition driving a 3D model")]
struct Cli {
    /// Message file to replay (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Number of selectable regions on the model
    #[arg(long, default_value_t = 8)]
    regions: usize,

    /// Model radians per radian of hand roll
    #[arg(long)]
    twist_sensitivity: Option<f32>,

    /// Print only the final status
    #[arg(long)]
    quiet: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("handorbit {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handorbit=info".into()),
        )
        .init();

    info!("handorbit v{} starting", env!("CARGO_PKG_VERSION"));

    let mut controller = ControllerConfig::default();
    if let Some(sensitivity) = cli.twist_sensitivity {
        controller.twist_sensitivity = sensitivity;
    }
    let mut session = Session::new(SceneModel::new(cli.regions), RecognizerConfig::default(), controller);

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            info!("replaying {}", path.display());
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", lineno + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        match handle_message(&mut session, line) {
            Some(response) if !cli.quiet => writeln!(out, "{}", response)?,
            Some(response) if response.contains(":status :error") => {
                warn!("line {}: {}", lineno + 1, response);
            }
            _ => {}
        }
    }

    writeln!(out, "{}", session.status_sexp())?;
    info!("processed {} frames", session.frames());
    Ok(())
}
