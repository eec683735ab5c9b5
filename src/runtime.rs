use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};
use tracing::{debug, warn};

use crate::controller::SessionController;
use crate::observer::SessionObserver;

/// What the host loop reacts to between redraws
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within the tick rate
    Tick,
    /// The input side hung up; no key can arrive any more
    Closed,
}

/// Anything that can hand the host its next event
pub trait EventSource {
    /// Waits at most `timeout`. Returns `Tick` when nothing arrived and
    /// `Closed` once the producer is gone.
    fn wait(&self, timeout: Duration) -> AppEvent;
}

/// Events delivered over a channel, fed either by the terminal reader
/// thread or directly by a test.
pub struct ChannelEvents {
    rx: Receiver<AppEvent>,
}

impl ChannelEvents {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    /// Spawns a thread forwarding crossterm key and resize events.
    ///
    /// The thread ends when reading the terminal fails or the receiver is
    /// dropped; the source reports `Closed` from then on.
    pub fn terminal() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) => AppEvent::Key(key),
                Ok(Event::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal input failed, closing event stream");
                    break;
                }
            };
            if tx.send(forwarded).is_err() {
                break;
            }
        });

        Self::new(rx)
    }
}

impl EventSource for ChannelEvents {
    fn wait(&self, timeout: Duration) -> AppEvent {
        match self.rx.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => AppEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => AppEvent::Closed,
        }
    }
}

/// Drives a session from the host side: waits for input at the redraw
/// rate and turns elapsed wall-clock seconds into countdown ticks.
pub struct Runner<E: EventSource> {
    events: E,
    tick_rate: Duration,
    metronome: Metronome,
}

impl<E: EventSource> Runner<E> {
    pub fn new(events: E, tick_rate: Duration) -> Self {
        Self {
            events,
            tick_rate,
            metronome: Metronome::new(Duration::from_secs(1)),
        }
    }

    /// Blocks up to the tick rate for the next event.
    pub fn step(&self) -> AppEvent {
        self.events.wait(self.tick_rate)
    }

    /// Forwards one `on_tick` per whole second the countdown has been
    /// running, measured from the session's start. Returns how many were sent.
    pub fn sync_timer<O: SessionObserver>(
        &mut self,
        controller: &mut SessionController<O>,
        now: Instant,
    ) -> u32 {
        if !controller.timer_running() {
            self.metronome.disarm();
            return 0;
        }

        self.metronome.arm(controller.state().start_time.unwrap_or(now));
        let due = self.metronome.due(now);
        if due > 1 {
            debug!(due, "catching up countdown ticks");
        }
        for _ in 0..due {
            controller.on_tick();
        }
        due
    }
}

/// Turns wall-clock time into whole countdown periods.
///
/// Armed at the moment a countdown starts; `due` reports how many periods
/// have passed since the last call so the host can forward one timer tick each.
#[derive(Clone, Copy, Debug)]
pub struct Metronome {
    period: Duration,
    next_due: Option<Instant>,
}

impl Metronome {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Starts counting from `from`. Already armed metronomes keep their phase.
    pub fn arm(&mut self, from: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(from + self.period);
        }
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next_due else {
            return 0;
        };

        let mut count = 0;
        while next <= now {
            count += 1;
            next += self.period;
        }
        self.next_due = Some(next);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::personal_best::MemoryPersonalBestStore;
    use crate::texts::FixedText;
    use crate::{Difficulty, KeyInput, Mode, SessionSettings};

    fn timed_session(clock: &ManualClock) -> SessionController {
        SessionController::new(
            SessionSettings {
                mode: Mode::Timed,
                difficulty: Difficulty::Easy,
                seed: Some(5),
            },
            Box::new(FixedText::new("some words to type")),
            Box::new(MemoryPersonalBestStore::new(0)),
            Box::new(clock.clone()),
            (),
        )
    }

    #[test]
    fn wait_times_out_as_tick() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(1));

        assert_eq!(runner.step(), AppEvent::Tick);
    }

    #[test]
    fn queued_events_come_first() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(10));

        assert_eq!(runner.step(), AppEvent::Resize);
    }

    #[test]
    fn dropped_sender_reports_closed_after_draining() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        drop(tx);
        let runner = Runner::new(ChannelEvents::new(rx), Duration::from_secs(30));

        assert_eq!(runner.step(), AppEvent::Resize);
        let start = Instant::now();
        for _ in 0..3 {
            assert_eq!(runner.step(), AppEvent::Closed);
        }
        // closed is reported immediately, never as a tick after the timeout
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn sync_timer_is_silent_while_idle() {
        let clock = ManualClock::new();
        let mut session = timed_session(&clock);
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(1));

        clock.advance(Duration::from_secs(5));
        assert_eq!(runner.sync_timer(&mut session, clock.now()), 0);
        assert_eq!(session.state().time_remaining, Some(60));
    }

    #[test]
    fn sync_timer_forwards_whole_seconds_since_start() {
        let clock = ManualClock::new();
        let mut session = timed_session(&clock);
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(1));

        session.handle_input(KeyInput::Char('s'));
        clock.advance(Duration::from_millis(900));
        assert_eq!(runner.sync_timer(&mut session, clock.now()), 0);

        clock.advance(Duration::from_millis(2200));
        assert_eq!(runner.sync_timer(&mut session, clock.now()), 3);
        assert_eq!(session.state().time_remaining, Some(57));
    }

    #[test]
    fn sync_timer_rearms_for_the_next_session() {
        let clock = ManualClock::new();
        let mut session = timed_session(&clock);
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(1));

        session.handle_input(KeyInput::Char('s'));
        clock.advance(Duration::from_millis(1500));
        assert_eq!(runner.sync_timer(&mut session, clock.now()), 1);

        session.reset();
        assert_eq!(runner.sync_timer(&mut session, clock.now()), 0);

        clock.advance(Duration::from_millis(300));
        session.handle_input(KeyInput::Char('s'));
        clock.advance(Duration::from_millis(800));
        assert_eq!(runner.sync_timer(&mut session, clock.now()), 0);
        clock.advance(Duration::from_millis(200));
        assert_eq!(runner.sync_timer(&mut session, clock.now()), 1);
        assert_eq!(session.state().time_remaining, Some(59));
    }

    #[test]
    fn metronome_idle_until_armed() {
        let mut metronome = Metronome::new(Duration::from_secs(1));
        let now = Instant::now();

        assert!(!metronome.is_armed());
        assert_eq!(metronome.due(now + Duration::from_secs(5)), 0);
    }

    #[test]
    fn metronome_counts_whole_periods() {
        let mut metronome = Metronome::new(Duration::from_secs(1));
        let start = Instant::now();
        metronome.arm(start);

        assert_eq!(metronome.due(start + Duration::from_millis(999)), 0);
        assert_eq!(metronome.due(start + Duration::from_millis(1000)), 1);
        assert_eq!(metronome.due(start + Duration::from_millis(1500)), 0);
        assert_eq!(metronome.due(start + Duration::from_millis(4200)), 3);
    }

    #[test]
    fn metronome_rearm_keeps_phase() {
        let mut metronome = Metronome::new(Duration::from_secs(1));
        let start = Instant::now();
        metronome.arm(start);
        metronome.arm(start + Duration::from_millis(700));

        assert_eq!(metronome.due(start + Duration::from_millis(1100)), 1);

        metronome.disarm();
        assert_eq!(metronome.due(start + Duration::from_secs(10)), 0);
    }
}
