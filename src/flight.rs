//! Single-flight bookkeeping for a resource that is fetched off the state owner.
//!
//! At most one request per resource is in flight. Each request carries a
//! sequence number; a result whose number is no longer current is stale and
//! must be dropped.

#[derive(Debug, Default)]
pub struct SingleFlight {
    last_seq: u64,
    in_flight: Option<u64>,
    pending: bool,
}

/// What to do with a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Apply the result. `resync` is set when another request was asked for
    /// while this one was running.
    Current { resync: bool },
    /// Superseded or invalidated; drop the result.
    Stale,
}

impl SingleFlight {
    /// Start a request, or return `None` if one is already running. With
    /// `coalesce`, a refused request is remembered and reported on landing.
    pub fn begin(&mut self, coalesce: bool) -> Option<u64> {
        if self.in_flight.is_some() {
            self.pending |= coalesce;
            return None;
        }
        self.last_seq += 1;
        self.in_flight = Some(self.last_seq);
        Some(self.last_seq)
    }

    pub fn land(&mut self, seq: u64) -> Landing {
        if self.in_flight != Some(seq) {
            return Landing::Stale;
        }
        self.in_flight = None;
        Landing::Current {
            resync: std::mem::take(&mut self.pending),
        }
    }

    /// Make every outstanding request stale. Sequence numbers keep growing,
    /// so an old result can never match a newer request.
    pub fn invalidate(&mut self) {
        self.in_flight = None;
        self.pending = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_refused() {
        let mut flight = SingleFlight::default();
        let first = flight.begin(true).unwrap();
        assert!(flight.begin(true).is_none());
        assert_eq!(flight.land(first), Landing::Current { resync: true });
        assert!(!flight.is_in_flight());
    }

    #[test]
    fn test_uncoalesced_refusal_is_forgotten() {
        let mut flight = SingleFlight::default();
        let first = flight.begin(false).unwrap();
        assert!(flight.begin(false).is_none());
        assert_eq!(flight.land(first), Landing::Current { resync: false });
    }

    #[test]
    fn test_invalidated_results_are_stale() {
        let mut flight = SingleFlight::default();
        let old = flight.begin(false).unwrap();
        flight.invalidate();
        let new = flight.begin(false).unwrap();
        assert_ne!(old, new);
        assert_eq!(flight.land(old), Landing::Stale);
        assert_eq!(flight.land(new), Landing::Current { resync: false });
        // Landing twice is stale too
        assert_eq!(flight.land(new), Landing::Stale);
    }
}
