//! Brickfall headless host
//!
//! Drives the simulation on its own thread with the autopilot at the wheel,
//! publishing a snapshot every tick. The main thread only reads snapshots.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::sync::{Arc, mpsc};
    use std::thread;
    use std::time::{Duration, Instant};

    use clap::Parser;

    use brickfall::consts::{PLAY_HEIGHT, PLAY_WIDTH};
    use brickfall::sim::{GameEvent, GameState, Rect, TickInput, tick};
    use brickfall::{RenderSnapshot, RuleSet, SnapshotPublisher, Tuning};

    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Run seed; the same seed replays the same game
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Number of ticks to simulate
        #[arg(long, default_value_t = 3600)]
        ticks: u64,
        /// Rule-set preset (terminal, desktop-legacy)
        #[arg(long, default_value = "terminal")]
        rules: String,
        /// JSON file overriding individual tuning values
        #[arg(long, value_name = "FILE")]
        tuning: Option<PathBuf>,
        /// Play area width in cells
        #[arg(long, default_value_t = PLAY_WIDTH)]
        width: f32,
        /// Play area height in cells
        #[arg(long, default_value_t = PLAY_HEIGHT)]
        height: f32,
        /// Log a snapshot summary every N ticks
        #[arg(long, value_name = "TICKS", default_value_t = 600)]
        report_every: u64,
        /// Pace ticks at the configured tick rate instead of running flat out
        #[arg(long)]
        realtime: bool,
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        let args = Args::parse();

        match simulate(&args) {
            Ok(snapshot) => match serde_json::to_string_pretty(snapshot.as_ref()) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    log::error!("Failed to serialize final snapshot: {}", e);
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                log::error!("{}", e);
                ExitCode::FAILURE
            }
        }
    }

    fn load_tuning(args: &Args) -> Result<Tuning, Box<dyn Error>> {
        let preset = RuleSet::from_str(&args.rules)
            .ok_or_else(|| format!("Unknown rule set: {}", args.rules))?;

        let mut tuning = match &args.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
                Tuning::from_json(&json)?
            }
            None => Tuning::default(),
        };
        tuning.apply_preset(preset);
        tuning.validate()?;
        log::info!("Using {} rules", preset.as_str());
        Ok(tuning)
    }

    fn simulate(args: &Args) -> Result<Arc<RenderSnapshot>, Box<dyn Error>> {
        let tuning = load_tuning(args)?;
        let area = Rect::new(0.0, 0.0, args.width, args.height);
        area.validate()?;
        let tick_duration = Duration::from_secs_f32(1.0 / tuning.tick_rate);

        let mut state = GameState::new(area, tuning, args.seed)?;
        let publisher = Arc::new(SnapshotPublisher::new(RenderSnapshot::project(&state)));
        let (progress_tx, progress_rx) = mpsc::channel::<u64>();

        let ticks = args.ticks;
        let report_every = args.report_every.max(1);
        let realtime = args.realtime;
        let writer = Arc::clone(&publisher);

        let sim = thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || {
                let input = TickInput {
                    idle_mode: true,
                    ..Default::default()
                };
                let mut pacer = Pacer::new(Instant::now(), tick_duration);

                for n in 1..=ticks {
                    tick(&mut state, &input);
                    for event in state.drain_events() {
                        log_event(&event);
                    }
                    writer.publish(RenderSnapshot::project(&state));

                    if n % report_every == 0 && progress_tx.send(n).is_err() {
                        break;
                    }
                    if realtime {
                        if let Some(wait) = pacer.advance(Instant::now()) {
                            thread::sleep(wait);
                        }
                    }
                }
            })?;

        // Reader side: wake on progress and look at whatever is newest
        for n in progress_rx {
            log::info!("tick {}: {}", n, publisher.latest().summary());
        }

        sim.join()
            .map_err(|_| "Simulation thread panicked".to_string())?;
        Ok(publisher.latest())
    }

    /// Fixed-rate deadlines, one tick at a time
    struct Pacer {
        next: Instant,
        step: Duration,
    }

    impl Pacer {
        fn new(start: Instant, step: Duration) -> Self {
            Self { next: start, step }
        }

        /// Move to the next deadline; how long to sleep until it, if it is still ahead of `now`
        fn advance(&mut self, now: Instant) -> Option<Duration> {
            self.next += self.step;
            self.next.checked_duration_since(now)
        }
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::ScoreChanged { score } => log::trace!("Score: {}", score),
            GameEvent::GameOver { final_score } => {
                log::info!("Game over, final score {}", final_score)
            }
            other => log::debug!("{:?}", other),
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
