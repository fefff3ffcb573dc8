use std::time::Duration;

/// Progress polling cadence.
///
/// Successful polls repeat at a fixed `interval` with no attempt cap. Failed
/// polls are retried after the same interval until `max_consecutive_failures`
/// is reached. `max_wait` optionally bounds the whole polling phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_consecutive_failures: u32,
    pub max_wait: Option<Duration>,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_consecutive_failures: 3,
            max_wait: None,
        }
    }
}

impl PollSchedule {
    /// Whether another attempt is allowed after `failures` consecutive failures.
    pub fn allows_retry(&self, failures: u32) -> bool {
        failures < self.max_consecutive_failures
    }

    pub fn exceeded(&self, elapsed: Duration) -> bool {
        self.max_wait.is_some_and(|max| elapsed >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::PollSchedule;
    use std::time::Duration;

    #[test]
    fn retries_are_bounded() {
        let s = PollSchedule::default();
        assert!(s.allows_retry(0));
        assert!(s.allows_retry(2));
        assert!(!s.allows_retry(3));
    }

    #[test]
    fn no_deadline_by_default() {
        let s = PollSchedule::default();
        assert!(!s.exceeded(Duration::from_secs(86_400)));
        let bounded = PollSchedule {
            max_wait: Some(Duration::from_secs(10)),
            ..s
        };
        assert!(!bounded.exceeded(Duration::from_secs(9)));
        assert!(bounded.exceeded(Duration::from_secs(10)));
    }
}
