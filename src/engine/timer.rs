// src/engine/timer.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::TIMER_PREFIX,
    error::AppError,
    models::session::TimerSnapshot,
    storage::{KeyValueStore, read_json, write_json},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    NotStarted,
    Running,
    Expired,
}

/// Result of driving the timer forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do: not started, or expiry was already reported.
    Idle,
    Running(u32),
    /// Reported exactly once per timer, on the transition to zero.
    Expired,
}

/// Exam countdown driven by wall-clock deltas.
///
/// Each tick subtracts the whole seconds elapsed since the previous tick, so a
/// throttled or delayed caller catches up instead of drifting.
/// Invariant: `0 <= remaining <= limit`.
#[derive(Debug, Clone)]
pub struct ExamTimer {
    state: TimerState,
    limit: u32,
    remaining: u32,
    last_tick: Option<DateTime<Utc>>,
}

impl Default for ExamTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExamTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::NotStarted,
            limit: 0,
            remaining: 0,
            last_tick: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn time_used(&self) -> u32 {
        self.limit.saturating_sub(self.remaining)
    }

    /// Starts the countdown, catching up from `snapshot` when one survived a
    /// restart. A snapshot already past zero expires immediately.
    pub fn start(
        &mut self,
        limit: u32,
        now: DateTime<Utc>,
        snapshot: Option<TimerSnapshot>,
    ) -> TickOutcome {
        if self.state != TimerState::NotStarted {
            return TickOutcome::Idle;
        }

        self.limit = limit;
        self.remaining = match snapshot {
            Some(snapshot) => {
                let elapsed = whole_seconds(now - snapshot.updated_at);
                snapshot.remaining.saturating_sub(elapsed).min(limit)
            }
            None => limit,
        };
        self.last_tick = Some(now);
        self.state = TimerState::Running;

        tracing::debug!("Exam timer started: {}s of {}s left", self.remaining, limit);
        self.settle()
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Idle;
        }

        let last = self.last_tick.unwrap_or(now);
        let elapsed = whole_seconds(now - last);
        if elapsed == 0 {
            return TickOutcome::Running(self.remaining);
        }

        self.last_tick = Some(last + Duration::seconds(i64::from(elapsed)));
        self.remaining = self.remaining.saturating_sub(elapsed);
        self.settle()
    }

    fn settle(&mut self) -> TickOutcome {
        if self.remaining == 0 {
            self.state = TimerState::Expired;
            tracing::info!("Exam time is up");
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Option<TimerSnapshot> {
        match self.state {
            TimerState::NotStarted => None,
            _ => Some(TimerSnapshot {
                remaining: self.remaining,
                updated_at: now,
            }),
        }
    }

    /// Tears the countdown down. Further ticks are ignored.
    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Expired;
        }
        self.last_tick = None;
    }
}

fn whole_seconds(delta: Duration) -> u32 {
    u32::try_from(delta.num_seconds().max(0)).unwrap_or(u32::MAX)
}

pub fn timer_key(tracking_id: &str) -> String {
    format!("{}:{}", TIMER_PREFIX, tracking_id)
}

/// Persists timer snapshots under `quiztimer:<attempt or quiz id>`.
#[derive(Clone)]
pub struct TimerStore {
    store: Arc<dyn KeyValueStore>,
}

impl TimerStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A corrupt snapshot is dropped and treated as absent.
    pub async fn load(&self, tracking_id: &str) -> Result<Option<TimerSnapshot>, AppError> {
        let key = timer_key(tracking_id);
        match read_json(self.store.as_ref(), &key).await {
            Err(AppError::Storage(reason)) => {
                tracing::warn!("Discarding corrupt timer snapshot {}: {}", key, reason);
                self.store.remove(&key).await?;
                Ok(None)
            }
            other => other,
        }
    }

    pub async fn save(&self, tracking_id: &str, snapshot: &TimerSnapshot) -> Result<(), AppError> {
        write_json(self.store.as_ref(), &timer_key(tracking_id), snapshot).await
    }

    pub async fn clear(&self, tracking_id: &str) -> Result<(), AppError> {
        self.store.remove(&timer_key(tracking_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn at_ms(ms: i64) -> DateTime<Utc> {
        at(0) + Duration::milliseconds(ms)
    }

    #[test]
    fn test_ticks_subtract_elapsed_wall_clock() {
        let mut timer = ExamTimer::new();
        assert_eq!(timer.start(240, at(0), None), TickOutcome::Running(240));

        assert_eq!(timer.tick(at(1)), TickOutcome::Running(239));
        // A throttled callback five seconds late catches up in one tick.
        assert_eq!(timer.tick(at(6)), TickOutcome::Running(234));
        assert_eq!(timer.time_used(), 6);
    }

    #[test]
    fn test_sub_second_ticks_do_not_lose_fractions() {
        let mut timer = ExamTimer::new();
        timer.start(240, at(0), None);

        assert_eq!(timer.tick(at_ms(600)), TickOutcome::Running(240));
        assert_eq!(timer.tick(at_ms(1200)), TickOutcome::Running(239));
        assert_eq!(timer.tick(at_ms(1900)), TickOutcome::Running(239));
        assert_eq!(timer.tick(at_ms(2050)), TickOutcome::Running(238));
    }

    #[test]
    fn test_remaining_stays_within_bounds() {
        let mut timer = ExamTimer::new();
        timer.start(10, at(0), None);
        for second in 1..30 {
            timer.tick(at(second));
            assert!(timer.remaining() <= timer.limit());
        }
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_expiry_reported_once() {
        let mut timer = ExamTimer::new();
        timer.start(3, at(0), None);

        assert_eq!(timer.tick(at(2)), TickOutcome::Running(1));
        assert_eq!(timer.tick(at(3)), TickOutcome::Expired);
        // A second observer of the zero crossing gets nothing.
        assert_eq!(timer.tick(at(3)), TickOutcome::Idle);
        assert_eq!(timer.tick(at(4)), TickOutcome::Idle);
        assert_eq!(timer.state(), TimerState::Expired);
    }

    #[test]
    fn test_restore_subtracts_time_spent_away() {
        let snapshot = TimerSnapshot {
            remaining: 100,
            updated_at: at(0),
        };
        let mut timer = ExamTimer::new();
        assert_eq!(timer.start(240, at(30), Some(snapshot)), TickOutcome::Running(70));
    }

    #[test]
    fn test_restore_clamps_to_limit_and_expires_stale_snapshot() {
        let oversized = TimerSnapshot {
            remaining: 999,
            updated_at: at(0),
        };
        let mut timer = ExamTimer::new();
        assert_eq!(timer.start(240, at(0), Some(oversized)), TickOutcome::Running(240));

        let stale = TimerSnapshot {
            remaining: 20,
            updated_at: at(0),
        };
        let mut timer = ExamTimer::new();
        assert_eq!(timer.start(240, at(3600), Some(stale)), TickOutcome::Expired);
        assert_eq!(timer.tick(at(3601)), TickOutcome::Idle);
    }

    #[test]
    fn test_stopped_timer_ignores_ticks() {
        let mut timer = ExamTimer::new();
        assert_eq!(timer.tick(at(1)), TickOutcome::Idle);
        timer.start(240, at(0), None);
        timer.stop();
        assert_eq!(timer.tick(at(500)), TickOutcome::Idle);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_through_store() {
        let memory = MemoryStore::new();
        let timers = TimerStore::new(Arc::new(memory.clone()));

        let mut timer = ExamTimer::new();
        timer.start(480, at(0), None);
        timer.tick(at(5));
        let snapshot = timer.snapshot(at(5)).unwrap();
        timers.save("quiz-1", &snapshot).await.unwrap();

        assert_eq!(timers.load("quiz-1").await.unwrap(), Some(snapshot));

        memory.set(&timer_key("quiz-2"), "garbage").await.unwrap();
        assert_eq!(timers.load("quiz-2").await.unwrap(), None);
        assert_eq!(memory.get(&timer_key("quiz-2")).await.unwrap(), None);
    }
}
