//! Attempt lifecycle and frame pacing
//!
//! [`Session`] owns one level and the state of the current attempt; it turns
//! wall-clock frame deltas into simulation ticks. [`GameLoop`] drives a session
//! from a host's frame callbacks (e.g. `requestAnimationFrame`), forwards
//! outcomes, and makes sure at most one frame request is ever outstanding.

use crate::consts::TICK_MS;
use crate::level::Level;
use crate::sim::{GameEvent, InputDevice, InputEdgeTracker, SimState, Snapshot, tick};
use crate::tuning::Tuning;

/// Receives the outcome of each life
pub trait OutcomeNotifier {
    fn on_death(&mut self);
    fn on_win(&mut self);
    /// Progress percentage changed
    fn on_progress(&mut self, _score: u8) {}
}

/// Receives a snapshot after every simulated frame
pub trait RenderSink {
    fn present(&mut self, snapshot: &Snapshot);
}

/// Renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn present(&mut self, _snapshot: &Snapshot) {}
}

/// Opaque id of a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host frame source
pub trait FrameScheduler {
    /// Ask for one frame callback; the host later calls [`GameLoop::on_frame`]
    /// with the returned handle.
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a request that has not been delivered yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// One level and the attempt currently being played on it
pub struct Session {
    level: Level,
    state: SimState,
    input: InputEdgeTracker,
    /// 1-based attempt number
    attempt: u32,
}

impl Session {
    pub fn new(level: Level, tuning: Tuning) -> Self {
        let state = SimState::new(&level, tuning);
        log::info!(
            "Attempt 1 on level ({} obstacles, length {})",
            level.obstacles.len(),
            level.length
        );
        Self {
            level,
            state,
            input: InputEdgeTracker::new(),
            attempt: 1,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Neither dead nor finished
    pub fn is_running(&self) -> bool {
        self.state.actor.is_running()
    }

    pub fn press(&mut self, device: InputDevice) {
        self.input.press(device);
    }

    pub fn release(&mut self, device: InputDevice) {
        self.input.release(device);
    }

    /// Simulate `elapsed_ms` of wall-clock time as one (clamped) tick
    pub fn frame(&mut self, elapsed_ms: f32) -> Vec<GameEvent> {
        let dt = elapsed_ms / TICK_MS;
        let mut input = self.input.sample(dt, self.state.tuning.max_delta);
        let events = tick(&mut self.state, &self.level, &mut input);
        self.input.settle(&input);
        events
    }

    /// Start a new attempt from the spawn point
    pub fn restart(&mut self) {
        self.state.reset(&self.level);
        self.input.reset();
        self.attempt += 1;
        log::info!("Attempt {}", self.attempt);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.attempt)
    }
}

/// Frame-paced driver for a [`Session`]
pub struct GameLoop<S: FrameScheduler, N: OutcomeNotifier, R: RenderSink = NullSink> {
    session: Session,
    scheduler: S,
    notifier: N,
    sink: R,
    /// The only outstanding frame request
    pending: Option<FrameHandle>,
    /// Host timestamp of the previous frame
    last_time_ms: Option<f64>,
    /// Begin the next attempt as soon as a life ends in death
    pub auto_restart: bool,
}

impl<S: FrameScheduler, N: OutcomeNotifier> GameLoop<S, N, NullSink> {
    pub fn new(session: Session, scheduler: S, notifier: N) -> Self {
        Self::with_sink(session, scheduler, notifier, NullSink)
    }
}

impl<S: FrameScheduler, N: OutcomeNotifier, R: RenderSink> GameLoop<S, N, R> {
    pub fn with_sink(session: Session, scheduler: S, notifier: N, sink: R) -> Self {
        Self {
            session,
            scheduler,
            notifier,
            sink,
            pending: None,
            last_time_ms: None,
            auto_restart: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// For input forwarding
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    /// A frame request is outstanding
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin requesting frames. No-op if already scheduled or the life is over.
    pub fn start(&mut self) {
        if self.pending.is_none() && self.session.is_running() {
            self.last_time_ms = None;
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    /// Host frame callback
    pub fn on_frame(&mut self, handle: FrameHandle, time_ms: f64) {
        if self.pending != Some(handle) {
            log::debug!("Ignoring stale frame {:?}", handle);
            return;
        }
        self.pending = None;

        // First frame after (re)start advances exactly one tick
        let elapsed_ms = match self.last_time_ms {
            Some(last) => (time_ms - last) as f32,
            None => TICK_MS,
        };
        self.last_time_ms = Some(time_ms);

        let events = self.session.frame(elapsed_ms);
        let mut died = false;
        for event in &events {
            match event {
                GameEvent::Died { .. } => {
                    died = true;
                    self.notifier.on_death();
                }
                GameEvent::Won => self.notifier.on_win(),
                GameEvent::Progress { score } => self.notifier.on_progress(*score),
                _ => {}
            }
        }
        self.sink.present(&self.session.snapshot());

        if self.session.is_running() {
            self.pending = Some(self.scheduler.request_frame());
        } else if died && self.auto_restart {
            self.restart();
        }
    }

    /// Stop requesting frames, withdrawing any outstanding request
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Abandon the current attempt and start the next one
    pub fn restart(&mut self) {
        self.stop();
        self.session.restart();
        self.start();
    }
}

impl<S: FrameScheduler, N: OutcomeNotifier, R: RenderSink> Drop for GameLoop<S, N, R> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;
    use crate::sim::ObstacleKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FrameLog {
        next: u64,
        pending: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    #[derive(Default, Clone)]
    struct Frames(Rc<RefCell<FrameLog>>);

    impl FrameScheduler for Frames {
        fn request_frame(&mut self) -> FrameHandle {
            let mut log = self.0.borrow_mut();
            log.next += 1;
            let handle = FrameHandle(log.next);
            log.pending.push(handle);
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            let mut log = self.0.borrow_mut();
            log.pending.retain(|h| *h != handle);
            log.cancelled.push(handle);
        }
    }

    impl Frames {
        /// Deliver the oldest outstanding frame
        fn deliver(&self) -> Option<FrameHandle> {
            let mut log = self.0.borrow_mut();
            (!log.pending.is_empty()).then(|| log.pending.remove(0))
        }

        fn pending(&self) -> usize {
            self.0.borrow().pending.len()
        }

        fn cancelled(&self) -> Vec<FrameHandle> {
            self.0.borrow().cancelled.clone()
        }
    }

    #[derive(Default)]
    struct Outcomes {
        deaths: u32,
        wins: u32,
        progress: Vec<u8>,
    }

    impl OutcomeNotifier for Outcomes {
        fn on_death(&mut self) {
            self.deaths += 1;
        }

        fn on_win(&mut self) {
            self.wins += 1;
        }

        fn on_progress(&mut self, score: u8) {
            self.progress.push(score);
        }
    }

    #[derive(Default)]
    struct Presented(Vec<Snapshot>);

    impl RenderSink for Presented {
        fn present(&mut self, snapshot: &Snapshot) {
            self.0.push(snapshot.clone());
        }
    }

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn spike_level() -> Level {
        let mut data = LevelData::with_length(5000.0);
        data.push(ObstacleKind::Spike, 300.0, 320.0, 30.0, 30.0);
        Level::from_data(data).unwrap()
    }

    fn new_loop(level: Level) -> (GameLoop<Frames, Outcomes>, Frames) {
        let frames = Frames::default();
        let session = Session::new(level, Tuning::default());
        (GameLoop::new(session, frames.clone(), Outcomes::default()), frames)
    }

    /// Deliver frames until none are requested (or `limit` is hit)
    fn pump<R: RenderSink>(game: &mut GameLoop<Frames, Outcomes, R>, frames: &Frames, limit: usize) -> usize {
        let mut delivered = 0;
        while delivered < limit {
            let Some(handle) = frames.deliver() else {
                break;
            };
            delivered += 1;
            game.on_frame(handle, delivered as f64 * FRAME_MS);
        }
        delivered
    }

    #[test]
    fn test_session_consumes_press_once() {
        let mut session = Session::new(spike_level(), Tuning::default());
        session.press(InputDevice::Keyboard);
        let events = session.frame(TICK_MS);
        assert!(events.contains(&GameEvent::Jumped { airborne: false }));
        assert!(session.state().actor.dy < 0.0);

        // Still held, but the edge is spent: no air jump
        session.frame(TICK_MS);
        assert_eq!(session.state().actor.jumps_available, 1);
    }

    #[test]
    fn test_session_clamps_long_frames() {
        let mut session = Session::new(spike_level(), Tuning::default());
        session.frame(500.0);
        let expected = 100.0 + 5.8 * Tuning::default().max_delta;
        assert!((session.state().actor.pos.x - expected).abs() < 0.001);
    }

    #[test]
    fn test_restart_counts_attempts() {
        let mut session = Session::new(spike_level(), Tuning::default());
        session.press(InputDevice::Touch);
        session.frame(TICK_MS);
        session.restart();
        assert_eq!(session.attempt(), 2);
        assert_eq!(session.snapshot().attempt, 2);
        assert_eq!(session.state().actor.pos.x, 100.0);
        assert!(session.is_running());
    }

    #[test]
    fn test_death_stops_requesting_frames() {
        let (mut game, frames) = new_loop(spike_level());
        game.start();
        game.start();
        assert_eq!(frames.pending(), 1, "start is idempotent");

        let delivered = pump(&mut game, &frames, 500);
        assert!(delivered < 500);
        assert!(!game.session().is_running());
        assert!(!game.is_scheduled());
        assert_eq!(frames.pending(), 0);
        assert_eq!(game.notifier().deaths, 1);
        assert_eq!(game.notifier().wins, 0);
    }

    #[test]
    fn test_win_notifies_once() {
        let (mut game, frames) = new_loop(Level::from_data(LevelData::with_length(300.0)).unwrap());
        game.start();
        pump(&mut game, &frames, 500);

        let outcomes = game.notifier();
        assert_eq!(outcomes.wins, 1);
        assert_eq!(outcomes.deaths, 0);
        assert_eq!(outcomes.progress.last(), Some(&100));
        assert!(outcomes.progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_stale_frames_are_ignored() {
        let (mut game, frames) = new_loop(spike_level());
        game.start();
        game.on_frame(FrameHandle(999), FRAME_MS);
        assert_eq!(game.session().state().time_ticks, 0);

        let first = frames.deliver().unwrap();
        game.on_frame(first, FRAME_MS);
        assert_eq!(game.session().state().time_ticks, 1);

        // Redelivering a consumed handle does nothing
        game.on_frame(first, 2.0 * FRAME_MS);
        assert_eq!(game.session().state().time_ticks, 1);
    }

    #[test]
    fn test_stop_and_restart_cancel_pending() {
        let (mut game, frames) = new_loop(spike_level());
        game.start();
        pump(&mut game, &frames, 3);
        let outstanding = frames.0.borrow().pending[0];

        game.restart();
        assert_eq!(frames.cancelled(), vec![outstanding]);
        assert_eq!(frames.pending(), 1);
        assert_eq!(game.session().attempt(), 2);

        // The withdrawn handle is stale now
        game.on_frame(outstanding, 100.0);
        assert_eq!(game.session().state().time_ticks, 0);

        game.stop();
        assert_eq!(frames.pending(), 0);
        assert_eq!(frames.cancelled().len(), 2);
    }

    #[test]
    fn test_drop_cancels_pending() {
        let (mut game, frames) = new_loop(spike_level());
        game.start();
        drop(game);
        assert_eq!(frames.pending(), 0);
        assert_eq!(frames.cancelled().len(), 1);
    }

    #[test]
    fn test_auto_restart_after_death() {
        let (mut game, frames) = new_loop(spike_level());
        game.auto_restart = true;
        game.start();

        // Runs into the spike, then immediately starts attempt 2
        let mut guard = 0;
        while game.notifier().deaths == 0 && guard < 500 {
            if let Some(handle) = frames.deliver() {
                game.on_frame(handle, guard as f64 * FRAME_MS);
            }
            guard += 1;
        }
        assert_eq!(game.notifier().deaths, 1);
        assert_eq!(game.session().attempt(), 2);
        assert!(game.session().is_running());
        assert!(game.is_scheduled());
    }

    #[test]
    fn test_sink_sees_every_frame() {
        let frames = Frames::default();
        let session = Session::new(spike_level(), Tuning::default());
        let mut game = GameLoop::with_sink(session, frames.clone(), Outcomes::default(), Presented::default());
        game.start();
        let delivered = pump(&mut game, &frames, 10);

        let seen = &game.sink().0;
        assert_eq!(seen.len(), delivered);
        assert!(seen.windows(2).all(|w| w[0].x < w[1].x));
        assert_eq!(seen[0].camera_x, seen[0].x - 100.0);
    }
}
