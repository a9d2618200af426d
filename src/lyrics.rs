//! lyrics.rs
//!
//! Rebuilds the lyric sheet of a jam track from its `PRO VOCALS` chart.
//!
//! A vocal chart stores lyrics as one meta event per syllable, sitting on the
//! same tick as the pitched note that sings it. Phrases are not stored as text
//! at all: a marker note (105) spans each phrase, and another marker (116)
//! spans the overdrive phrases. Song sections come from a separate `SECTION`
//! track.
//!
//! The pipeline:
//!  - pair marker and sung notes into intervals (see `pairing`)
//!  - attach each lyric to the sung note starting on exactly the same tick
//!  - collect the syllables of each phrase, without bleeding into the next one
//!  - add zero-width phrases for section labels and flag overdrive phrases
//!  - order everything by tick and render one wiki markup line per phrase

use midly::Smf;

use crate::decrypt::{DecryptError, normalize_midi_buffer};
use crate::midi::{EventKind, decode_text, find_track_by_name, to_absolute_time, track_events};
use crate::pairing::{Interval, MarkerPairing, MarkerPolicy, SungPairing};
use crate::section::Section;

pub const PRO_VOCALS_TRACK: &str = "PRO VOCALS";
pub const SECTION_TRACK: &str = "SECTION";

/// Marker note spanning one lyric phrase.
pub const PHRASE_NOTE: u8 = 105;
/// Marker note spanning an overdrive phrase.
pub const OVERDRIVE_NOTE: u8 = 116;

/// Line break appended to every rendered line.
pub const LINE_BREAK: &str = "<br>";

#[derive(thiserror::Error, Debug)]
pub enum LyricsError {
    #[error("Pro Vocals not supported")]
    UnsupportedTrack,
    #[error(transparent)]
    Buffer(#[from] DecryptError),
    #[error("MIDI parse error: {0}")]
    Parse(#[from] midly::Error),
}

/// Pitched vocal notes are 36..=84; anything else on the track is a marker or unused.
pub fn is_sung_note(key: u8) -> bool {
    key > 35 && key < 85
}

/// One entry in a phrase's line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineNote {
    /// The phrase starts inside an overdrive span.
    Overdrive,
    /// A section header such as `'''[Chorus]'''`.
    Section(Section),
    Syllable(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    pub start: u64,
    pub end: u64,
    pub notes: Vec<LineNote>,
}

impl Phrase {
    pub fn is_section(&self) -> bool {
        self.notes.iter().any(|n| matches!(n, LineNote::Section(_)))
    }
}

#[derive(Debug)]
struct SungNote {
    start: u64,
    end: u64,
    text: Option<String>,
}

/// Decode a MIDI buffer into wiki markup lyric lines.
///
/// Leading junk before the `MThd` header is skipped. The only chart-level
/// failure is a missing `PRO VOCALS` track; anything odd inside the chart
/// degrades to missing text instead.
pub fn extract_pro_vocals_lyrics(buf: &[u8]) -> Result<Vec<String>, LyricsError> {
    let phrases = build_phrases(buf)?;
    Ok(render_phrases(&phrases))
}

/// Every phrase of the chart, sections included, in display order.
pub fn build_phrases(buf: &[u8]) -> Result<Vec<Phrase>, LyricsError> {
    let buf = normalize_midi_buffer(buf)?;
    let smf = Smf::parse(buf)?;

    let vocals = find_track_by_name(&smf, PRO_VOCALS_TRACK).ok_or(LyricsError::UnsupportedTrack)?;
    let events = to_absolute_time(&track_events(vocals));

    let mut phrase_markers = MarkerPairing::new(MarkerPolicy::NoteOnCloses);
    let mut overdrive_markers = MarkerPairing::new(MarkerPolicy::NoteOnRestarts);
    let mut sung_pairing = SungPairing::new();
    let mut lyrics = Vec::new();

    for ev in &events {
        if let EventKind::Lyrics(text) = ev.kind {
            lyrics.push((ev.time, decode_text(text)));
            continue;
        }
        let Some((key, edge)) = ev.kind.note() else { continue };
        match key {
            PHRASE_NOTE => phrase_markers.step(ev.time, edge),
            OVERDRIVE_NOTE => overdrive_markers.step(ev.time, edge),
            k if is_sung_note(k) => sung_pairing.step(ev.time, k, edge),
            _ => {}
        }
    }

    let markers = phrase_markers.finish();
    let overdrive = overdrive_markers.finish();
    let mut sung: Vec<SungNote> = sung_pairing
        .finish()
        .into_iter()
        .map(|s| SungNote { start: s.start, end: s.end, text: None })
        .collect();

    // Exact tick match only; a later lyric on the same tick wins.
    lyrics.sort_by_key(|(time, _)| *time);
    for (time, text) in lyrics {
        let idx = sung.partition_point(|s| s.start < time);
        match sung.get_mut(idx) {
            Some(note) if note.start == time => note.text = Some(text),
            _ => tracing::debug!(time, text = %text, "lyric without a sung note"),
        }
    }

    let mut phrases: Vec<Phrase> = markers
        .iter()
        .enumerate()
        .map(|(i, marker)| Phrase {
            start: marker.start,
            end: marker.end,
            notes: phrase_syllables(marker, markers.get(i + 1), &sung),
        })
        .collect();

    if let Some(section_track) = find_track_by_name(&smf, SECTION_TRACK) {
        for ev in to_absolute_time(&track_events(section_track)) {
            if matches!(ev.kind, EventKind::TrackName(_)) {
                continue;
            }
            let Some(raw) = ev.kind.text() else { continue };
            let text = decode_text(raw);
            if text.trim().is_empty() {
                continue;
            }
            phrases.push(Phrase {
                start: ev.time,
                end: ev.time,
                notes: vec![LineNote::Section(Section::from_token(&text))],
            });
        }
    }

    for phrase in &mut phrases {
        if overdrive.iter().any(|od| od.contains(phrase.start)) {
            phrase.notes.insert(0, LineNote::Overdrive);
        }
    }

    sort_phrases(&mut phrases);

    tracing::debug!(phrases = phrases.len(), sung = sung.len(), "built vocal phrases");
    Ok(phrases)
}

/// Order by start tick. Stable: on a shared tick sections go first, the rest
/// keep chart order.
pub fn sort_phrases(phrases: &mut [Phrase]) {
    phrases.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.is_section().cmp(&a.is_section()))
    });
}

/// Syllables inside `marker` that also end before the next phrase starts.
fn phrase_syllables(marker: &Interval, next: Option<&Interval>, sung: &[SungNote]) -> Vec<LineNote> {
    sung.iter()
        .filter(|s| s.start >= marker.start && s.end <= marker.end)
        .filter(|s| next.is_none_or(|n| s.end < n.start))
        .filter_map(|s| s.text.as_deref())
        .filter(|t| !t.trim().is_empty())
        .map(|t| LineNote::Syllable(t.to_owned()))
        .collect()
}

/// Render phrases to wiki markup, one entry per output line.
///
/// Section headers are preceded by an empty entry. Verses are numbered in
/// order of appearance.
pub fn render_phrases(phrases: &[Phrase]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut verse_count = 0u32;

    for phrase in phrases {
        let mut line = String::new();
        let mut overdrive = false;
        let mut is_section = false;
        let last = phrase.notes.len().saturating_sub(1);

        for (i, note) in phrase.notes.iter().enumerate() {
            match note {
                LineNote::Section(section) => {
                    lines.push(String::new());
                    is_section = true;
                    if *section == Section::Verse {
                        verse_count += 1;
                        line.push_str(&format!("'''[{section} {verse_count}]'''"));
                    } else {
                        line.push_str(&format!("'''[{section}]'''"));
                    }
                }
                LineNote::Overdrive => overdrive = true,
                LineNote::Syllable(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let joins_next = text.contains(['-', '=', '+']);
                    line.push_str(&clean_syllable(text));
                    if !joins_next && i != last {
                        line.push(' ');
                    }
                }
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if overdrive && !is_section {
            lines.push(format!("{{{{OverdriveLyric|{line}}}}}{LINE_BREAK}"));
        } else {
            lines.push(format!("{line}{LINE_BREAK}"));
        }
    }

    lines
}

/// Strip chart control characters from a syllable.
///
/// `=` is a literal hyphen and `§` joins two words with a space; the other
/// markers (`- + # ^ * % $ _`) only carry timing or pitch hints.
pub fn clean_syllable(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '-' | '+' | '#' | '^' | '*' | '%' | '$' | '_' => None,
            '=' => Some('-'),
            '§' => Some(' '),
            c => Some(c),
        })
        .collect()
}
