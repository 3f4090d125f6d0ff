//! Cube Dash headless replay
//!
//! Plays one attempt of a level without rendering and reports the outcome.
//!
//! ```text
//! cube-dash <level.json> [--jump-at X1,X2,...]
//! cube-dash --seed N [--sections N] [--jump-at X1,X2,...]
//! ```
//!
//! Jumps are pressed on the first frame the actor reaches each listed x.
//! Physics tuning is read from the file named by `CUBE_DASH_TUNING`, if set.

#[cfg(not(target_arch = "wasm32"))]
mod replay {
    use std::process::ExitCode;

    use cube_dash::level::generate;
    use cube_dash::sim::InputDevice;
    use cube_dash::{FrameHandle, FrameScheduler, GameLoop, Level, OutcomeNotifier, Session, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Safety net for levels that can never end
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    enum Source {
        File(String),
        Seed { seed: u64, sections: u32 },
    }

    struct Args {
        source: Source,
        jump_at: Vec<f32>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut path = None;
        let mut seed = None;
        let mut sections = 20;
        let mut jump_at = Vec::new();

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = args.next().ok_or("--seed needs a value")?;
                    seed = Some(value.parse().map_err(|_| format!("bad seed: {value}"))?);
                }
                "--sections" => {
                    let value = args.next().ok_or("--sections needs a value")?;
                    sections = value
                        .parse()
                        .map_err(|_| format!("bad section count: {value}"))?;
                }
                "--jump-at" => {
                    let value = args.next().ok_or("--jump-at needs a value")?;
                    for x in value.split(',').filter(|s| !s.is_empty()) {
                        jump_at.push(x.trim().parse().map_err(|_| format!("bad jump x: {x}"))?);
                    }
                }
                other if other.starts_with("--") => return Err(format!("unknown option {other}")),
                other => path = Some(other.to_string()),
            }
        }
        jump_at.sort_by(f32::total_cmp);

        let source = match (path, seed) {
            (Some(path), None) => Source::File(path),
            (None, Some(seed)) => Source::Seed { seed, sections },
            (None, None) => Source::Seed { seed: 0, sections },
            (Some(_), Some(_)) => return Err("give either a level file or --seed, not both".into()),
        };
        Ok(Args { source, jump_at })
    }

    /// Delivers frames back-to-back on a simulated 60 Hz clock
    #[derive(Default)]
    struct ReplayClock {
        next_id: u64,
        requested: Option<FrameHandle>,
    }

    impl FrameScheduler for ReplayClock {
        fn request_frame(&mut self) -> FrameHandle {
            self.next_id += 1;
            let handle = FrameHandle(self.next_id);
            self.requested = Some(handle);
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if self.requested == Some(handle) {
                self.requested = None;
            }
        }
    }

    #[derive(Default)]
    struct Outcome {
        died: bool,
        won: bool,
        score: u8,
    }

    impl OutcomeNotifier for Outcome {
        fn on_death(&mut self) {
            self.died = true;
        }

        fn on_win(&mut self) {
            self.won = true;
        }

        fn on_progress(&mut self, score: u8) {
            if score / 10 != self.score / 10 {
                log::debug!("Progress {score}%");
            }
            self.score = score;
        }
    }

    pub fn run() -> ExitCode {
        env_logger::init();

        let args = match parse_args() {
            Ok(args) => args,
            Err(err) => {
                eprintln!("{err}");
                eprintln!("usage: cube-dash [<level.json> | --seed N [--sections N]] [--jump-at X1,X2,...]");
                return ExitCode::from(2);
            }
        };

        let tuning = match Tuning::from_env() {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("Invalid tuning: {err}");
                return ExitCode::FAILURE;
            }
        };

        let level = match &args.source {
            Source::File(path) => Level::load(path),
            Source::Seed { seed, sections } => {
                log::info!("Generating practice level from seed {seed}");
                Level::from_data(generate(*seed, *sections))
            }
        };
        let level = match level {
            Ok(level) => level,
            Err(err) => {
                log::error!("Invalid level: {err}");
                return ExitCode::FAILURE;
            }
        };

        let session = Session::new(level, tuning);
        let mut game = GameLoop::new(session, ReplayClock::default(), Outcome::default());
        let mut jumps = args.jump_at.into_iter().peekable();
        let mut frames = 0;
        let mut pressed = false;

        game.start();
        while game.is_scheduled() {
            let Some(handle) = game.scheduler().requested else {
                break;
            };
            if frames >= MAX_FRAMES {
                log::warn!("Giving up after {frames} frames");
                game.stop();
                break;
            }

            let x = game.session().state().actor.pos.x;
            if pressed {
                game.session_mut().release(InputDevice::Keyboard);
                pressed = false;
            }
            if jumps.next_if(|&at| x >= at).is_some() {
                // Skip targets already passed in the same frame
                while jumps.next_if(|&at| x >= at).is_some() {}
                game.session_mut().press(InputDevice::Keyboard);
                pressed = true;
            }

            frames += 1;
            game.on_frame(handle, f64::from(frames) * FRAME_MS);
        }

        let state = game.session().state();
        let outcome = game.notifier();
        let verdict = if outcome.won {
            "complete"
        } else if outcome.died {
            "died"
        } else {
            "unfinished"
        };
        println!(
            "{verdict} at x={:.1} ({}%) after {} ticks",
            state.actor.pos.x, state.score, state.time_ticks
        );

        if outcome.won {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    replay::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host; there is no standalone wasm binary
}
