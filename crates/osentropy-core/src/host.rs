//! Hooks into the host runtime.
//!
//! The reader never touches signal state or a global execution lock itself.
//! An embedder that has either passes them in through [`Host`]; both hooks
//! are consulted only in error-reporting mode.

/// Capabilities the host runtime lends to the entropy reader.
pub trait Host: Send + Sync {
    /// Called after a read was interrupted by a signal.
    ///
    /// Return `true` to abort the read with [`Error::Interrupted`](crate::Error::Interrupted),
    /// `false` to retry it.
    fn check_signals(&self) -> bool {
        false
    }

    /// Run a potentially blocking OS call with the host's global lock released.
    fn allow_threads(&self, call: &mut dyn FnMut()) {
        call()
    }
}

/// Host with no signal handling and no global lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHost;

impl Host for NoHost {}

/// Issue `call` through [`Host::allow_threads`] and return its result.
pub(crate) fn without_lock<T>(host: &dyn Host, mut call: impl FnMut() -> T) -> T {
    let mut out = None;
    host.allow_threads(&mut || out = Some(call()));
    // Run inline if the host did not invoke the closure.
    match out {
        Some(v) => v,
        None => call(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHost {
        released: AtomicUsize,
    }

    impl Host for CountingHost {
        fn allow_threads(&self, call: &mut dyn FnMut()) {
            self.released.fetch_add(1, Ordering::Relaxed);
            call()
        }
    }

    #[test]
    fn test_without_lock_goes_through_host() {
        let host = CountingHost {
            released: AtomicUsize::new(0),
        };
        let v = without_lock(&host, || 7);
        assert_eq!(v, 7);
        assert_eq!(host.released.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_no_host_never_aborts() {
        assert!(!NoHost.check_signals());
        assert_eq!(without_lock(&NoHost, || "ok"), "ok");
    }
}
