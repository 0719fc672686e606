mod colors;
mod config;
mod error;
mod geo;
mod help;
mod logging;
mod render;
mod settings;
mod surface;
mod terminal;
mod viz;

use clap::{Args, Parser, Subcommand};
use config::{MapConfig, PrintFrame, ViewConfig};
use settings::Settings;
use std::io::{self, Write};
use std::path::PathBuf;
use terminal::Terminal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "globefolio")]
#[command(version)]
#[command(about = "Terminal globe views for a personal portfolio: hero scene, travel globe and local map", long_about = None)]
struct Cli {
    /// Log file (defaults to the user cache directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct ViewArgs {
    /// Animation speed (seconds per frame)
    #[arg(short, long, default_value = "0.03")]
    time: f32,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Color scheme (0-9); overrides the settings file
    #[arg(short, long)]
    color: Option<u8>,

    /// Skip remote overlays (country borders, clouds)
    #[arg(long)]
    offline: bool,

    /// Print a single frame to stdout instead of running interactively
    #[arg(short, long)]
    print: bool,

    /// Print width in columns
    #[arg(long, default_value = "80")]
    width: u16,

    /// Print height in rows
    #[arg(long, default_value = "24")]
    height: u16,

    /// Elapsed seconds the printed frame is rendered at
    #[arg(long, default_value = "0.0")]
    at: f64,
}

impl ViewArgs {
    fn view_config(&self) -> ViewConfig {
        ViewConfig {
            time_step: self.time,
            seed: self.seed,
            color_scheme: self.color.map(|c| c.min(9)),
            offline: self.offline,
        }
    }

    fn frame(&self) -> Option<PrintFrame> {
        self.print.then_some(PrintFrame {
            width: self.width.max(1),
            height: self.height.max(1),
            at: self.at,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decorative hero scene: wireframe globe, continents, particles
    Scene(ViewArgs),

    /// Interactive travel globe with visited countries and cities
    Travel {
        #[command(flatten)]
        view: ViewArgs,

        /// Spin the globe on its own
        #[arg(long)]
        auto_rotate: bool,
    },

    /// Tilted local map around the home district (needs a maps API key)
    Map(ViewArgs),
}

/// Run an interactive view, or do nothing if there is no terminal to draw on.
fn interactive<F>(view: F) -> io::Result<()>
where
    F: FnOnce(&mut Terminal) -> io::Result<()>,
{
    let mut term = match Terminal::new() {
        Ok(term) => term,
        Err(e) => {
            warn!(error = %e, "no interactive terminal, nothing to draw");
            return Ok(());
        }
    };
    view(&mut term)
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init(cli.log_file);
    info!(log = ?log_path, "globefolio starting");

    let mut settings = Settings::load();
    let stdout = io::stdout();

    match cli.command {
        Commands::Scene(args) => {
            let config = args.view_config();
            match args.frame() {
                Some(frame) => viz::scene::print(&mut stdout.lock(), &config, &settings.scene, frame)?,
                None => interactive(|term| viz::scene::run(term, &config, &settings.scene))?,
            }
        }
        Commands::Travel { view, auto_rotate } => {
            settings.travel.auto_rotate |= auto_rotate;
            let config = view.view_config();
            match view.frame() {
                Some(frame) => viz::travel::print(&mut stdout.lock(), &config, &settings.travel, frame)?,
                None => interactive(|term| viz::travel::run(term, &config, &settings.travel))?,
            }
        }
        Commands::Map(args) => {
            let config = args.view_config();
            let map = MapConfig::from_env(&settings.map);
            match args.frame() {
                Some(frame) => {
                    viz::map::print(&mut stdout.lock(), &config, map.as_ref(), &settings.travel, frame)?
                }
                None => interactive(|term| viz::map::run(term, &config, map.as_ref(), &settings.travel))?,
            }
        }
    }

    stdout.lock().flush()
}
