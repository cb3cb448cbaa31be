use dashmap::DashMap;
use std::time::{Duration, Instant};

struct FailureRecord {
    count: u32,
    first_failure: Instant,
    locked_until: Option<Instant>,
}

/// IP-based authentication failure tracker with automatic lockout.
///
/// Counts failed logins and rejected tokens per IP. After `max_failures`
/// within `window`, the IP is locked out for `lockout` duration.
pub struct BruteForceGuard {
    failures: DashMap<String, FailureRecord>,
    max_failures: u32,
    window: Duration,
    lockout: Duration,
}

impl BruteForceGuard {
    pub fn new(max_failures: u32, window: Duration, lockout: Duration) -> Self {
        tracing::info!(
            "Brute-force guard: max {} failures in {}s window, {}s lockout",
            max_failures,
            window.as_secs(),
            lockout.as_secs()
        );

        Self {
            failures: DashMap::new(),
            max_failures,
            window,
            lockout,
        }
    }

    /// Record an authentication failure for the given IP.
    /// Triggers lockout after `max_failures` within the tracking window.
    pub fn record_failure(&self, ip: &str) {
        let now = Instant::now();
        let mut entry = self
            .failures
            .entry(ip.to_string())
            .or_insert(FailureRecord {
                count: 0,
                first_failure: now,
                locked_until: None,
            });
        let record = entry.value_mut();

        // Reset if outside tracking window
        if now.duration_since(record.first_failure) > self.window {
            record.count = 0;
            record.first_failure = now;
            record.locked_until = None;
        }

        record.count += 1;
        if record.count >= self.max_failures {
            record.locked_until = Some(now + self.lockout);
            tracing::warn!(
                "Brute-force lockout triggered for IP {} ({} failures in window)",
                ip,
                record.count
            );
        }
    }

    pub fn is_locked(&self, ip: &str) -> bool {
        self.failures
            .get(ip)
            .and_then(|entry| entry.locked_until)
            .is_some_and(|locked_until| Instant::now() < locked_until)
    }

    /// Clear failure tracking for an IP after successful authentication.
    pub fn record_success(&self, ip: &str) {
        self.failures.remove(ip);
    }

    /// Remove stale entries older than window + lockout duration.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let max_age = self.window + self.lockout;
        self.failures
            .retain(|_, record| now.duration_since(record.first_failure) < max_age);
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.failures.len()
    }
}
