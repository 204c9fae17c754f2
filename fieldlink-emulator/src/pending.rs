use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Publishes still waiting for their confirmation, keyed by device and message id.
pub struct PendingReplies {
    timeout: Duration,
    waiting: HashMap<(String, String), Instant>,
}

impl PendingReplies {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            waiting: HashMap::new(),
        }
    }

    pub fn expect(&mut self, device_id: &str, message_id: &str, sent_at: Instant) {
        self.waiting
            .insert((device_id.to_string(), message_id.to_string()), sent_at);
    }

    /// Round trip time of a confirmation, if it was expected.
    pub fn resolve(&mut self, device_id: &str, message_id: &str, received_at: Instant) -> Option<Duration> {
        self.waiting
            .remove(&(device_id.to_string(), message_id.to_string()))
            .map(|sent_at| received_at.saturating_duration_since(sent_at))
    }

    /// Removes and returns every publish whose confirmation is overdue.
    pub fn expire(&mut self, now: Instant) -> Vec<(String, String)> {
        let timeout = self.timeout;
        let overdue: Vec<_> = self
            .waiting
            .iter()
            .filter(|(_, sent_at)| now.saturating_duration_since(**sent_at) > timeout)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &overdue {
            self.waiting.remove(key);
        }

        overdue
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_expected_reply() {
        let mut pending = PendingReplies::new(Duration::from_secs(5));
        let sent_at = Instant::now();

        pending.expect("test_device_001", "2025-12-18T10:00:00", sent_at);

        let elapsed = pending.resolve("test_device_001", "2025-12-18T10:00:00", sent_at + Duration::from_millis(40));
        assert_eq!(elapsed, Some(Duration::from_millis(40)));
        assert_eq!(pending.len(), 0);

        assert_eq!(pending.resolve("test_device_001", "2025-12-18T10:00:00", sent_at), None);
    }

    #[test]
    fn test_expire_overdue_replies() {
        let mut pending = PendingReplies::new(Duration::from_secs(5));
        let start = Instant::now();

        pending.expect("test_device_001", "a", start);
        pending.expect("test_device_002", "b", start + Duration::from_secs(4));

        let overdue = pending.expire(start + Duration::from_secs(6));
        assert_eq!(overdue, vec![(String::from("test_device_001"), String::from("a"))]);
        assert_eq!(pending.len(), 1);
    }
}
