//! Time source port.

/// Wall clock abstraction so window arithmetic can be pinned in tests.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> f64;
}
