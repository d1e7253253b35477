mod assets;
mod config;
mod display;
mod game;
mod input;
mod noise;
mod particles;
mod pool;
mod snapshot;
mod texture;
mod util;

use std::path::PathBuf;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use assets::GameAssets;
use config::{GameConfig, DEFAULT_CONFIG_FILE};
use display::{Display, PixelBuffer, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use game::Game;
use input::InputState;
use snapshot::SnapshotWriter;
use util::FpsCounter;

const TITLE: &str = "starglitch";
/// Seconds between FPS readouts in the title bar
const FPS_REPORT_INTERVAL: f32 = 1.0;

/// Command line overrides on top of the config file
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    width: Option<u32>,
    height: Option<u32>,
    no_vsync: bool,
    seed: Option<u64>,
    config: Option<PathBuf>,
}

impl CliArgs {
    fn apply(&self, config: &mut GameConfig) {
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
        if self.no_vsync {
            config.vsync = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

fn print_help() {
    println!("Usage: {} [OPTIONS]", TITLE);
    println!();
    println!("Options:");
    println!(
        "  --width W, -w W       Set window width (default: {})",
        DEFAULT_WIDTH
    );
    println!(
        "  --height H, -h H      Set window height (default: {})",
        DEFAULT_HEIGHT
    );
    println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1024x768)");
    println!("  --no-vsync            Disable VSync for uncapped framerate");
    println!("  --seed N              Seed the RNG for a reproducible run");
    println!(
        "  --config PATH         Load settings from PATH (default: {})",
        DEFAULT_CONFIG_FILE
    );
    println!("  --help                Show this help message");
    println!();
    println!("Controls:");
    println!("  W/A/S/D      - Move the ship (after the intro)");
    println!("  Space        - Fire");
    println!("  Left mouse   - Laser (when every projectile is in flight)");
    println!("  Both buttons - Row selector marker");
    println!("  Shift+S      - Save a snapshot (save<N>.png)");
    println!("  Escape       - Quit");
}

/// Parse command line arguments (without the program name)
fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => cli.no_vsync = true,
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        cli.width = Some(w);
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        cli.height = Some(h);
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    if let Some((w, h)) = args[i + 1].split_once('x') {
                        if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                            cli.width = Some(w);
                            cli.height = Some(h);
                        }
                    }
                    i += 1;
                }
            },
            "--seed" => {
                if i + 1 < args.len() {
                    if let Ok(seed) = args[i + 1].parse::<u64>() {
                        cli.seed = Some(seed);
                    }
                    i += 1;
                }
            },
            "--config" => {
                if i + 1 < args.len() {
                    cli.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--help" => {
                print_help();
                std::process::exit(0);
            },
            other => log::warn!("Ignoring unknown argument {:?}", other),
        }
        i += 1;
    }

    cli
}

/// An explicit `--config` must load; the default file is optional
fn load_config(cli: &CliArgs) -> Result<GameConfig, String> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?,
        None => match GameConfig::load(DEFAULT_CONFIG_FILE) {
            Ok(config) => {
                log::info!("Loaded {}", DEFAULT_CONFIG_FILE);
                config
            },
            Err(e) => {
                log::debug!("No usable {} ({}), using defaults", DEFAULT_CONFIG_FILE, e);
                GameConfig::default()
            },
        },
    };
    cli.apply(&mut config);

    if config.width == 0 || config.height == 0 {
        return Err(format!(
            "Invalid resolution {}x{}",
            config.width, config.height
        ));
    }
    Ok(config)
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args);
    let config = load_config(&cli)?;

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    log::info!(
        "Starting {}x{} (vsync {}), seed {}",
        config.width,
        config.height,
        if config.vsync { "on" } else { "off" },
        seed
    );

    let (mut display, texture_creator) =
        Display::with_options(TITLE, config.width, config.height, config.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, config.width, config.height)?;
    let mut buffer = PixelBuffer::with_size(config.width, config.height);

    let assets = GameAssets::load(&config);
    let mut game = Game::new(&config, assets, Pcg32::seed_from_u64(seed));
    let mut input = InputState::new();
    let mut snapshots = SnapshotWriter::new(&config.snapshot_dir);

    // FPS counter with 60 sample rolling average
    let mut fps_counter = FpsCounter::new(60);
    let mut since_report = 0.0;

    loop {
        let (dt, avg_fps) = fps_counter.tick();

        input.begin_frame();
        for event in display.poll_events() {
            input.handle_event(&event);
        }
        if input.quit_requested() {
            break;
        }

        let frame = input.snapshot();
        game.update(&frame, dt);
        game.render(&mut buffer);

        if frame.snapshot {
            if let Err(e) = snapshots.save(&buffer) {
                log::error!("Failed to save snapshot: {}", e);
            }
        }

        display.present(&mut target, &buffer)?;

        since_report += dt;
        if since_report >= FPS_REPORT_INTERVAL {
            since_report = 0.0;
            log::debug!(
                "tick {} | {:.1} fps ({:.2} ms) | {} projectiles, {} particles | {:?}",
                game.tick(),
                avg_fps,
                fps_counter.avg_frame_time_ms(),
                game.weapons().in_flight(),
                game.particles().count(),
                game.ending_phase()
            );
            display.set_title(&format!("{} - {:.0} fps", TITLE, avg_fps))?;
        }
    }

    log::info!("Exiting after {} ticks", game.tick());
    Ok(())
}
