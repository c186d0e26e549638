//! Checkpointed projector
//!
//! Replaying from the start of the log on every frame is linear in the
//! number of events before the cursor. The index stores a full projection
//! every `stride` events, built once when the log arrives, so a query only
//! folds the events between the nearest checkpoint and the query time.
//! Checkpoints are never updated after construction; output matches
//! [`project`](super::project) exactly.

use std::sync::Arc;

use super::{query_time, ProjectedState};
use crate::log::EventLog;

#[derive(Debug, Clone)]
pub struct ProjectionIndex {
    log: Arc<EventLog>,
    stride: usize,
    /// `checkpoints[k]` is the state after the first `k * stride` events
    checkpoints: Vec<ProjectedState>,
}

impl ProjectionIndex {
    /// Index `log`, checkpointing every `stride` events (a stride of 0 is treated as 1)
    pub fn new(log: Arc<EventLog>, stride: usize) -> Self {
        let stride = stride.max(1);
        let mut checkpoints = Vec::with_capacity(log.len() / stride + 1);

        let mut state = ProjectedState::new();
        checkpoints.push(state.clone());
        for (i, event) in log.events().iter().enumerate() {
            state.apply(event);
            if (i + 1) % stride == 0 {
                checkpoints.push(state.clone());
            }
        }

        Self {
            log,
            stride,
            checkpoints,
        }
    }

    pub fn log(&self) -> &Arc<EventLog> {
        &self.log
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Same result as `project(self.log(), time)`
    pub fn project(&self, time: f64) -> ProjectedState {
        let end = self.log.prefix_len(query_time(time));
        let k = (end / self.stride).min(self.checkpoints.len() - 1);

        let mut state = self.checkpoints[k].clone();
        for event in &self.log.events()[k * self.stride..end] {
            state.apply(event);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Event;
    use crate::projection::project;

    fn busy_log() -> Arc<EventLog> {
        let events = (0..500)
            .map(|i| {
                let t = i as f64 * 0.01;
                match i % 5 {
                    0 => Event::digital(t, 17, (i % 2) as i64),
                    1 => Event::duty_cycle(t, 18, i as i64 % 100),
                    2 => Event::frequency(t, 18, 200 + i as i64),
                    3 => Event::stop(t, 18),
                    _ => Event::digital(t, 22 + (i % 3) as u32, 1),
                }
            })
            .collect();
        Arc::new(EventLog::new(events))
    }

    #[test]
    fn test_index_matches_full_scan() {
        let log = busy_log();
        for stride in [1, 7, 64, 1000] {
            let index = ProjectionIndex::new(Arc::clone(&log), stride);
            for step in -5..=520 {
                let t = step as f64 * 0.01;
                assert_eq!(index.project(t), project(&log, t), "stride {stride} t {t}");
            }
        }
    }

    #[test]
    fn test_zero_stride() {
        let index = ProjectionIndex::new(busy_log(), 0);
        assert_eq!(index.stride(), 1);
        assert_eq!(index.project(2.0), project(index.log(), 2.0));
    }

    #[test]
    fn test_empty_log() {
        let index = ProjectionIndex::new(Arc::new(EventLog::default()), 16);
        assert!(index.project(1.0).is_empty());
    }

    #[test]
    fn test_invalid_times_never_reach_either_path() {
        let log = Arc::new(EventLog::new(vec![
            Event::digital(f64::NAN, 1, 0),
            Event::digital(0.0, 1, 1),
            Event::digital(-1.0, 3, 1),
        ]));
        let index = ProjectionIndex::new(Arc::clone(&log), 4);

        assert_eq!(index.project(1.0), project(&log, 1.0));
        assert_eq!(project(&log, 1.0).level(1), 1);

        // a query before the start sees only time-0 events
        assert_eq!(project(&log, -5.0).len(), 1);
        assert_eq!(project(&log, -5.0).level(3), 0);
        assert_eq!(index.project(-5.0), project(&log, -5.0));
    }
}
