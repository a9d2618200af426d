//! midi.rs
//!
//! A thin event model over `midly` for the vocal charts in jam track MIDI files.
//!
//! The charts are ordinary Standard MIDI Files, but only a handful of event kinds
//! matter to us:
//!  - note on / note off, keyed by note number (phrase markers, overdrive, sung pitches)
//!  - lyric meta events (one syllable each)
//!  - the track name meta event (to find the `PRO VOCALS` and `SECTION` tracks)
//!  - any other text-bearing meta event (section labels live in these)
//!
//! Everything else collapses into `EventKind::Other`. Times stay in ticks: the
//! lyric pipeline only ever compares and orders them, so no tempo map is built.

use midly::{MetaMessage, MidiMessage, Smf, Track, TrackEventKind};

/// Whether a note event opens or closes a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEdge {
    On,
    Off,
}

/// The subset of MIDI events the lyric extractor looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind<'a> {
    NoteOn { key: u8 },
    NoteOff { key: u8 },
    Lyrics(&'a [u8]),
    TrackName(&'a [u8]),
    /// Text, marker, cue point and the other free-text meta events.
    Text(&'a [u8]),
    Other,
}

impl<'a> EventKind<'a> {
    pub fn note(&self) -> Option<(u8, NoteEdge)> {
        match *self {
            EventKind::NoteOn { key } => Some((key, NoteEdge::On)),
            EventKind::NoteOff { key } => Some((key, NoteEdge::Off)),
            _ => None,
        }
    }

    /// Raw payload of any text-bearing meta event.
    pub fn text(&self) -> Option<&'a [u8]> {
        match *self {
            EventKind::Lyrics(t) | EventKind::TrackName(t) | EventKind::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// An event with its track-relative delta time.
#[derive(Clone, Copy, Debug)]
pub struct RawEvent<'a> {
    pub delta: u32,
    pub kind: EventKind<'a>,
}

/// An event placed on the track's absolute tick timeline.
#[derive(Clone, Copy, Debug)]
pub struct AbsoluteEvent<'a> {
    pub time: u64,
    pub kind: EventKind<'a>,
}

/// Normalize one `midly` event into our `EventKind`.
///
/// NoteOn with velocity=0 is equivalent to NoteOff.
pub fn classify<'a>(kind: &TrackEventKind<'a>) -> EventKind<'a> {
    match *kind {
        TrackEventKind::Midi { message, .. } => match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => {
                EventKind::NoteOff { key: key.as_int() }
            }
            MidiMessage::NoteOn { key, .. } => EventKind::NoteOn { key: key.as_int() },
            MidiMessage::NoteOff { key, .. } => EventKind::NoteOff { key: key.as_int() },
            _ => EventKind::Other,
        },
        TrackEventKind::Meta(m) => match m {
            MetaMessage::Lyric(t) => EventKind::Lyrics(t),
            MetaMessage::TrackName(t) => EventKind::TrackName(t),
            MetaMessage::Text(t)
            | MetaMessage::Copyright(t)
            | MetaMessage::InstrumentName(t)
            | MetaMessage::Marker(t)
            | MetaMessage::CuePoint(t)
            | MetaMessage::ProgramName(t)
            | MetaMessage::DeviceName(t) => EventKind::Text(t),
            _ => EventKind::Other,
        },
        _ => EventKind::Other,
    }
}

pub fn track_events<'a>(track: &Track<'a>) -> Vec<RawEvent<'a>> {
    track
        .iter()
        .map(|ev| RawEvent { delta: ev.delta.as_int(), kind: classify(&ev.kind) })
        .collect()
}

/// Accumulate delta ticks into absolute ticks, one running sum per track.
pub fn to_absolute_time<'a>(events: &[RawEvent<'a>]) -> Vec<AbsoluteEvent<'a>> {
    let mut abs_ticks: u64 = 0;
    events
        .iter()
        .map(|ev| {
            abs_ticks += ev.delta as u64;
            AbsoluteEvent { time: abs_ticks, kind: ev.kind }
        })
        .collect()
}

/// First non-empty track name meta event in the track.
pub fn track_name<'a>(track: &Track<'a>) -> Option<&'a [u8]> {
    track.iter().find_map(|ev| match ev.kind {
        TrackEventKind::Meta(MetaMessage::TrackName(t)) if !t.is_empty() => Some(t),
        _ => None,
    })
}

/// First track whose name is exactly `name`.
pub fn find_track_by_name<'s, 'a>(smf: &'s Smf<'a>, name: &str) -> Option<&'s Track<'a>> {
    smf.tracks
        .iter()
        .find(|tr| track_name(tr) == Some(name.as_bytes()))
}

/// Decode a meta payload as UTF-8. Invalid sequences become U+FFFD.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
