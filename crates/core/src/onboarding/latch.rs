use std::sync::atomic::{AtomicU64, Ordering};

/// Phase of the one-shot gate for a given session lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Unchecked,
    Checked,
}

/// One-shot latch keyed by session epoch.
///
/// Each session lifetime has its own epoch (strictly increasing, starting
/// at 1). The latch remembers the newest epoch that has been checked, so a
/// new epoch is automatically `Unchecked` and a stale epoch is never
/// re-checked.
#[derive(Debug, Default)]
pub struct GateLatch {
    checked_epoch: AtomicU64,
}

impl GateLatch {
    pub const fn new() -> Self {
        Self {
            checked_epoch: AtomicU64::new(0),
        }
    }

    pub fn phase(&self, epoch: u64) -> GatePhase {
        if self.checked_epoch.load(Ordering::Acquire) >= epoch {
            GatePhase::Checked
        } else {
            GatePhase::Unchecked
        }
    }

    /// Move `epoch` from `Unchecked` to `Checked`. Exactly one caller per
    /// epoch gets `true`.
    pub fn try_check(&self, epoch: u64) -> bool {
        let mut current = self.checked_epoch.load(Ordering::Acquire);
        loop {
            if current >= epoch {
                return false;
            }
            match self.checked_epoch.compare_exchange(
                current,
                epoch,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn first_check_wins_and_repeats_lose() {
        let latch = GateLatch::new();
        assert_eq!(latch.phase(1), GatePhase::Unchecked);
        assert!(latch.try_check(1));
        assert!(!latch.try_check(1));
        assert!(!latch.try_check(1));
        assert_eq!(latch.phase(1), GatePhase::Checked);
    }

    #[test]
    fn new_epoch_rearms() {
        let latch = GateLatch::new();
        assert!(latch.try_check(1));
        assert_eq!(latch.phase(2), GatePhase::Unchecked);
        assert!(latch.try_check(2));
        assert!(!latch.try_check(1));
    }

    #[test]
    fn concurrent_checks_have_one_winner() {
        let latch = Arc::new(GateLatch::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let latch = latch.clone();
                let winners = winners.clone();
                std::thread::spawn(move || {
                    if latch.try_check(3) {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
