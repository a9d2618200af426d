//! Lyric sheets for jam track wiki articles.
//!
//! Jam track charts ship as AES encrypted MIDI files. `decrypt` recovers the
//! MIDI bytes, `lyrics` rebuilds the `PRO VOCALS` lyrics as wiki markup lines,
//! and `wiki` wraps them into the article's lyrics section.

pub mod decrypt;
pub mod lyrics;
pub mod midi;
pub mod pairing;
pub mod section;
pub mod source;
pub mod wiki;

pub use decrypt::{DecryptError, decrypt_midi, normalize_midi_buffer};
pub use lyrics::{LyricsError, extract_pro_vocals_lyrics};
pub use section::Section;
pub use wiki::lyrics_section;
