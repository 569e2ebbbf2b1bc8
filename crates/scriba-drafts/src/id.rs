//! Local draft id allocation.

use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use scriba_protocol::{Clock, DraftId};

/// Ids per clock millisecond. The low digits hold the random part.
const SLOTS_PER_MILLI: u64 = 1000;

/// Hands out [`DraftId`]s derived from the clock plus a small random
/// offset.
///
/// Ids are strictly increasing for the lifetime of the generator, even
/// when several are taken in the same millisecond or the clock steps
/// backwards. Ids already persisted can be fed to
/// [`observe`](Self::observe) so new ones always sort after them.
#[derive(Debug)]
pub struct DraftIdGenerator {
    clock: Arc<dyn Clock>,
    last: Mutex<u64>,
}

impl DraftIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: Mutex::new(0),
        }
    }

    /// Allocates the next id.
    pub fn next(&self) -> DraftId {
        let jitter = rand::rng().random_range(0..SLOTS_PER_MILLI);
        let candidate = self
            .clock
            .now_millis()
            .saturating_mul(SLOTS_PER_MILLI)
            .saturating_add(jitter);

        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let id = if candidate > *last {
            candidate
        } else {
            last.saturating_add(1)
        };
        *last = id;
        DraftId(id)
    }

    /// Makes sure every later id is greater than `id`.
    pub fn observe(&self, id: DraftId) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if id.0 > *last {
            *last = id.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriba_protocol::ManualClock;
    use std::time::Duration;

    #[test]
    fn test_next_is_strictly_increasing_within_one_millisecond() {
        let generator = DraftIdGenerator::new(Arc::new(ManualClock::new(5_000)));

        let ids: Vec<_> = (0..50).map(|_| generator.next()).collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_next_tracks_the_clock() {
        let clock = Arc::new(ManualClock::new(5_000));
        let generator = DraftIdGenerator::new(clock.clone());

        let first = generator.next();
        clock.advance(Duration::from_secs(1));
        let second = generator.next();

        assert!(first.0 >= 5_000 * SLOTS_PER_MILLI);
        assert!(second.0 >= 6_000 * SLOTS_PER_MILLI);
    }

    #[test]
    fn test_next_survives_clock_stepping_back() {
        let clock = Arc::new(ManualClock::new(10_000));
        let generator = DraftIdGenerator::new(clock.clone());
        let before = generator.next();

        clock.set(1_000);

        assert!(generator.next() > before);
    }

    #[test]
    fn test_observe_pushes_floor_up() {
        let generator = DraftIdGenerator::new(Arc::new(ManualClock::new(1)));
        generator.observe(DraftId(u64::from(u32::MAX)));

        assert!(generator.next().0 > u64::from(u32::MAX));
    }
}
