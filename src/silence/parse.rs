//! Parsing of silence-detector log output.
//!
//! The detector (ffmpeg `silencedetect`) writes verbose, partially
//! unstructured text. Two patterns matter: `silence_end: <sec> |
//! silence_duration: <sec>` pairs, and an overall `Duration: HH:MM:SS.cc`
//! line. Everything else is noise and is skipped without error.

use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use super::Silence;
use crate::time::parse_timestamp;

/// Result of scanning one detector log: the silences found, plus a
/// total-duration hint when the log carried one.
#[derive(Debug, Clone, Default)]
pub struct SilenceScan {
    pub silences: Vec<Silence>,
    pub total_duration_ms: Option<i64>,
}

/// Parse line-oriented silence-detector output.
///
/// The silence start is derived as `end - duration`. Output is ordered
/// ascending by start; duplicate starts collapse to the latest occurrence.
pub fn parse_silence_log(log: &str) -> SilenceScan {
    let silence_re =
        Regex::new(r"silence_end:\s*([\d.]+)\s*\|\s*silence_duration:\s*([\d.]+)")
            .expect("Invalid regex");
    let duration_re = Regex::new(r"Duration:\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)").expect("Invalid regex");

    let mut by_start: BTreeMap<i64, Silence> = BTreeMap::new();
    let mut total_duration_ms = None;

    for line in log.lines() {
        if let Some(cap) = silence_re.captures(line) {
            let end_secs: f64 = match cap[1].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let duration_secs: f64 = match cap[2].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };

            let end_ms = end_secs * 1000.0;
            let duration_ms = duration_secs * 1000.0;
            let start_ms = (end_ms - duration_ms) as i64;

            let silence = Silence::new(start_ms, duration_ms as i64);
            by_start.insert(silence.start(), silence);
        } else if let Some(cap) = duration_re.captures(line) {
            if let Some(ms) = parse_timestamp(&cap[1]) {
                total_duration_ms = Some(ms);
            }
        }
    }

    let silences: Vec<Silence> = by_start.into_values().collect();
    debug!(
        "Parsed {} silences, total duration {:?}",
        silences.len(),
        total_duration_ms
    );

    SilenceScan {
        silences,
        total_duration_ms,
    }
}
