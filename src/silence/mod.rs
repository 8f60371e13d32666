pub mod parse;

pub use parse::{parse_silence_log, SilenceScan};

use crate::time::TimeInterval;

/// A detected low-volume interval, used as a preferred cut/snap point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Silence {
    interval: TimeInterval,
    chapter_start: bool,
}

impl Silence {
    pub fn new(start_ms: i64, length_ms: i64) -> Self {
        Self {
            interval: TimeInterval::new(start_ms, length_ms),
            chapter_start: false,
        }
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn start(&self) -> i64 {
        self.interval.start()
    }

    pub fn end(&self) -> i64 {
        self.interval.end()
    }

    pub fn length(&self) -> i64 {
        self.interval.length()
    }

    pub fn midpoint(&self) -> i64 {
        self.interval.midpoint()
    }

    /// Whether this silence was chosen as a chapter cut point.
    pub fn is_chapter_start(&self) -> bool {
        self.chapter_start
    }

    pub fn mark_chapter_start(&mut self) {
        self.chapter_start = true;
    }
}

/// Supplier of detected silences, ordered ascending by start and unique
/// by start position.
///
/// Memoization is owned by the implementor; the engine treats the slice
/// as cacheable for the duration of a pass.
pub trait SilenceSource {
    fn silences(&self) -> &[Silence];
}

/// An in-memory, pre-sorted silence list.
#[derive(Debug, Clone, Default)]
pub struct CachedSilences {
    silences: Vec<Silence>,
}

impl CachedSilences {
    /// Sorts ascending by start; duplicates by identical start collapse to
    /// the latest occurrence.
    pub fn new(silences: Vec<Silence>) -> Self {
        let mut by_start = std::collections::BTreeMap::new();
        for silence in silences {
            by_start.insert(silence.start(), silence);
        }
        Self {
            silences: by_start.into_values().collect(),
        }
    }

    /// Parse detector output, discarding the total-duration hint.
    pub fn from_log(log: &str) -> Self {
        Self::new(parse_silence_log(log).silences)
    }

    pub fn is_empty(&self) -> bool {
        self.silences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.silences.len()
    }
}

impl SilenceSource for CachedSilences {
    fn silences(&self) -> &[Silence] {
        &self.silences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_accessors() {
        let silence = Silence::new(15_716, 4275);
        assert_eq!(silence.start(), 15_716);
        assert_eq!(silence.length(), 4275);
        assert_eq!(silence.end(), 19_991);
        assert!(!silence.is_chapter_start());
    }

    #[test]
    fn test_mark_chapter_start() {
        let mut silence = Silence::new(0, 1000);
        silence.mark_chapter_start();
        assert!(silence.is_chapter_start());
    }

    #[test]
    fn test_cached_silences_sorts_by_start() {
        let cached = CachedSilences::new(vec![
            Silence::new(5000, 100),
            Silence::new(1000, 100),
            Silence::new(3000, 100),
        ]);

        let starts: Vec<i64> = cached.silences().iter().map(|s| s.start()).collect();
        assert_eq!(starts, vec![1000, 3000, 5000]);
    }

    #[test]
    fn test_cached_silences_dedup_keeps_latest() {
        let cached = CachedSilences::new(vec![
            Silence::new(1000, 100),
            Silence::new(1000, 900),
        ]);

        assert_eq!(cached.len(), 1);
        assert_eq!(cached.silences()[0].length(), 900);
    }
}
