//! Reducers that turn a time-ordered stream of note on/off events into intervals.
//!
//! Vocal charts mark spans with notes rather than with explicit ranges:
//!  - note 105 spans one lyric phrase
//!  - note 116 spans an overdrive phrase
//!  - notes 36..=84 span single sung syllables
//!
//! Charts in the wild are not always well formed, so each reducer has a fixed
//! policy for a note on that arrives while a span is already open.

use std::collections::HashMap;

use crate::midi::NoteEdge;

/// A half-open tick interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn contains(&self, tick: u64) -> bool {
        self.start <= tick && tick < self.end
    }
}

/// What a note on does when a marker span is already open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerPolicy {
    /// The note on closes the open span (phrase markers).
    NoteOnCloses,
    /// The note on discards the open span and opens a new one (overdrive).
    NoteOnRestarts,
}

/// Pairs on/off events of a single marker note into intervals.
#[derive(Debug)]
pub struct MarkerPairing {
    policy: MarkerPolicy,
    open: Option<u64>,
    done: Vec<Interval>,
}

impl MarkerPairing {
    pub fn new(policy: MarkerPolicy) -> Self {
        Self { policy, open: None, done: Vec::new() }
    }

    pub fn step(&mut self, time: u64, edge: NoteEdge) {
        match (edge, self.open, self.policy) {
            (NoteEdge::On, None, _) | (NoteEdge::On, Some(_), MarkerPolicy::NoteOnRestarts) => {
                self.open = Some(time);
            }
            (NoteEdge::On, Some(start), MarkerPolicy::NoteOnCloses)
            | (NoteEdge::Off, Some(start), _) => {
                self.done.push(Interval { start, end: time });
                self.open = None;
            }
            // stray note off
            (NoteEdge::Off, None, _) => {}
        }
    }

    /// Closed intervals in the order they closed. An open trailing span is dropped.
    pub fn finish(self) -> Vec<Interval> {
        if let Some(start) = self.open {
            tracing::debug!(start, policy = ?self.policy, "dropping unterminated marker span");
        }
        self.done
    }
}

/// A sung syllable: its span and the pitch that carried it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SungSpan {
    pub start: u64,
    pub end: u64,
    pub key: u8,
}

/// Pairs sung-note events per pitch.
///
/// A note on for a pitch that is already open closes the open span at the new
/// event's tick, then opens a fresh span there.
#[derive(Debug, Default)]
pub struct SungPairing {
    open: HashMap<u8, u64>,
    done: Vec<SungSpan>,
}

impl SungPairing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, time: u64, key: u8, edge: NoteEdge) {
        match edge {
            NoteEdge::On => {
                if let Some(start) = self.open.insert(key, time) {
                    self.done.push(SungSpan { start, end: time, key });
                }
            }
            NoteEdge::Off => {
                if let Some(start) = self.open.remove(&key) {
                    self.done.push(SungSpan { start, end: time, key });
                }
            }
        }
    }

    /// Closed spans sorted by start tick. Unterminated spans are dropped.
    pub fn finish(self) -> Vec<SungSpan> {
        if !self.open.is_empty() {
            tracing::debug!(count = self.open.len(), "dropping unterminated sung notes");
        }
        let mut done = self.done;
        done.sort_by_key(|s| s.start);
        done
    }
}
