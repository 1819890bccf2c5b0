//! Point-in-time reads of the counter bank.
//!
//! A [`Snapshot`] holds one [`CounterSample`] per configured discipline. Each
//! field is read independently with the discipline's own load rule, so a
//! snapshot is not a consistent cut across counters: two values in the same
//! snapshot may come from different instants.
//!
//! With the `serde` feature both types serialize as plain records:
//!
//! ```text
//! {"elapsed_ms":400,"samples":[{"discipline":"relaxed","value":120034}]}
//! ```

use crate::discipline::Discipline;

/// The observed value of one counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterSample {
    /// The discipline of the sampled counter.
    pub discipline: Discipline,
    /// The value read.
    pub value: u64,
}

impl CounterSample {
    /// Creates a new sample.
    pub fn new(discipline: Discipline, value: u64) -> Self {
        Self { discipline, value }
    }

    /// Label of the sampled counter.
    pub fn name(&self) -> &'static str {
        self.discipline.name()
    }
}

/// An immutable set of counter samples taken at one point of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Milliseconds since the run started.
    pub elapsed_ms: u64,
    /// One sample per configured discipline, in report order.
    pub samples: Vec<CounterSample>,
}

impl Snapshot {
    /// Creates a snapshot from already collected samples.
    pub fn new(elapsed_ms: u64, samples: Vec<CounterSample>) -> Self {
        Self {
            elapsed_ms,
            samples,
        }
    }

    /// Finds the sample of a discipline.
    pub fn get(&self, discipline: Discipline) -> Option<u64> {
        self.samples
            .iter()
            .find(|s| s.discipline == discipline)
            .map(|s| s.value)
    }

    /// Iterates over the samples in report order.
    pub fn iter(&self) -> impl Iterator<Item = &CounterSample> {
        self.samples.iter()
    }

    /// Number of sampled counters.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no counter was sampled.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot::new(
            42,
            vec![
                CounterSample::new(Discipline::Unsynchronized, 7),
                CounterSample::new(Discipline::SeqCst, 9),
            ],
        )
    }

    #[test]
    fn test_get() {
        let snapshot = sample();
        assert_eq!(snapshot.get(Discipline::Unsynchronized), Some(7));
        assert_eq!(snapshot.get(Discipline::SeqCst), Some(9));
        assert_eq!(snapshot.get(Discipline::Mutex), None);
    }

    #[test]
    fn test_len_and_iter() {
        let snapshot = sample();
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.is_empty());
        let names: Vec<_> = snapshot.iter().map(CounterSample::name).collect();
        assert_eq!(names, vec!["unsynchronized", "seq_cst"]);
    }

    #[test]
    fn test_empty() {
        let snapshot = Snapshot::new(0, vec![]);
        assert!(snapshot.is_empty());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_serialize_snapshot() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"elapsed_ms":42,"samples":[{"discipline":"unsynchronized","value":7},{"discipline":"seq_cst","value":9}]}"#
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{"elapsed_ms":5,"samples":[{"discipline":"acquire","value":3}]}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.elapsed_ms, 5);
        assert_eq!(snapshot.get(Discipline::Acquire), Some(3));
    }
}
