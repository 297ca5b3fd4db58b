//! Phase timers.
//!
//! A game keeps at most two timers outstanding: one "advance" timer that
//! fires the next phase step once, and one "poll" timer that repeats while
//! nominations are open. Each timer runs as a tokio task that posts a
//! [`Tick`] to the game's tick channel and owns a [`CancellationToken`].
//! Arming a timer cancels the one it replaces, and [`Scheduler::accept`]
//! discards ticks from any timer that is no longer outstanding, so a tick
//! that was already queued when its timer was cancelled is ignored.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::game::PlayerId;

/// The phase step an advance timer leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Night,
    NightResolution,
    TrialVote,
    FinalVote(PlayerId),
    Verdict(PlayerId),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Advance(Step),
    Poll,
}

/// A timer firing, stamped with the game epoch it was armed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
    pub timer: u64,
    pub kind: TimerKind,
}

#[derive(Debug)]
struct Pending {
    id: u64,
    cancel: CancellationToken,
}

impl Pending {
    fn cancel(self) {
        self.cancel.cancel();
    }
}

/// Owns the outstanding timers of one game instance.
///
/// Timers are spawned on the current tokio runtime.
#[derive(Debug)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<Tick>,
    next_id: u64,
    advance: Option<Pending>,
    poll: Option<Pending>,
}

impl Scheduler {
    /// Creates a scheduler and the receiver its ticks arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            next_id: 0,
            advance: None,
            poll: None,
        };
        (scheduler, rx)
    }

    fn arm(&mut self) -> Pending {
        self.next_id += 1;
        Pending {
            id: self.next_id,
            cancel: CancellationToken::new(),
        }
    }

    /// Fires `step` once after `delay`, replacing any outstanding advance.
    pub fn advance_after(&mut self, epoch: u64, delay: Duration, step: Step) {
        self.cancel_advance();
        let pending = self.arm();
        let tick = Tick {
            epoch,
            timer: pending.id,
            kind: TimerKind::Advance(step),
        };
        let token = pending.cancel.clone();
        let tx = self.tx.clone();
        trace!(timer = pending.id, ?step, ?delay, "arming advance timer");

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(tick);
                }
            }
        });
        self.advance = Some(pending);
    }

    /// Fires a poll tick every `period`, starting one period from now,
    /// replacing any outstanding poll.
    pub fn poll_every(&mut self, epoch: u64, period: Duration) {
        self.cancel_poll();
        let pending = self.arm();
        let tick = Tick {
            epoch,
            timer: pending.id,
            kind: TimerKind::Poll,
        };
        let token = pending.cancel.clone();
        let tx = self.tx.clone();
        trace!(timer = pending.id, ?period, "arming poll timer");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(tick).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        self.poll = Some(pending);
    }

    /// Returns true if `tick` comes from an outstanding timer. Accepting an
    /// advance tick retires that timer.
    pub fn accept(&mut self, tick: &Tick) -> bool {
        match tick.kind {
            TimerKind::Advance(_) => {
                if self.advance.as_ref().is_some_and(|p| p.id == tick.timer) {
                    self.advance = None;
                    true
                } else {
                    false
                }
            }
            TimerKind::Poll => self.poll.as_ref().is_some_and(|p| p.id == tick.timer),
        }
    }

    pub fn has_advance(&self) -> bool {
        self.advance.is_some()
    }

    pub fn has_poll(&self) -> bool {
        self.poll.is_some()
    }

    pub fn cancel_advance(&mut self) {
        if let Some(pending) = self.advance.take() {
            pending.cancel();
        }
    }

    pub fn cancel_poll(&mut self) {
        if let Some(pending) = self.poll.take() {
            pending.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel_advance();
        self.cancel_poll();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn advance_fires_once_after_delay() {
        let (mut scheduler, mut rx) = Scheduler::new();
        let started = Instant::now();
        scheduler.advance_after(3, Duration::from_secs(10), Step::Night);
        assert!(scheduler.has_advance());

        let tick = rx.recv().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(10));
        assert_eq!(tick.epoch, 3);
        assert_eq!(tick.kind, TimerKind::Advance(Step::Night));

        assert!(scheduler.accept(&tick));
        assert!(!scheduler.has_advance());
        assert!(!scheduler.accept(&tick), "a retired timer must not be accepted twice");
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_previous_advance() {
        let (mut scheduler, mut rx) = Scheduler::new();
        scheduler.advance_after(0, Duration::from_secs(5), Step::Night);
        scheduler.advance_after(0, Duration::from_secs(1), Step::TrialVote);

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.kind, TimerKind::Advance(Step::TrialVote));
        assert!(scheduler.accept(&tick));

        tokio::time::sleep(Duration::from_secs(10)).await;
        while let Ok(stale) = rx.try_recv() {
            assert!(!scheduler.accept(&stale));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn poll_repeats_until_cancelled() {
        let (mut scheduler, mut rx) = Scheduler::new();
        let started = Instant::now();
        scheduler.poll_every(1, Duration::from_secs(1));

        for n in 1..=3u64 {
            let tick = rx.recv().await.unwrap();
            assert_eq!(tick.kind, TimerKind::Poll);
            assert!(scheduler.accept(&tick));
            assert!(started.elapsed() >= Duration::from_secs(n));
        }
        assert!(scheduler.has_poll());

        scheduler.cancel_poll();
        assert!(!scheduler.has_poll());
        tokio::time::sleep(Duration::from_secs(5)).await;
        while let Ok(stale) = rx.try_recv() {
            assert!(!scheduler.accept(&stale));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn poll_and_advance_are_independent() {
        let (mut scheduler, mut rx) = Scheduler::new();
        scheduler.poll_every(0, Duration::from_secs(1));
        scheduler.advance_after(0, Duration::from_millis(1500), Step::End);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, TimerKind::Poll);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, TimerKind::Advance(Step::End));
        assert!(scheduler.accept(&second));
        assert!(scheduler.has_poll());

        scheduler.cancel_all();
        assert!(!scheduler.accept(&first));
    }
}
