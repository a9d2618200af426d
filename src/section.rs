//! Song section labels from the `SECTION` track.

use std::borrow::Cow;
use std::fmt;

/// A song section, as named by a `SECTION` track text event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Section {
    Intro,
    Verse,
    Build,
    Chorus,
    PreChorus,
    Breakdown,
    Bridge,
    Drop,
    GuitarSolo,
    BassSolo,
    DrumSolo,
    VocalSolo,
    KeyboardSolo,
    Outro,
    /// A token outside the known set, kept verbatim.
    Unknown(String),
}

impl Section {
    /// Parse a raw event text like `[verse]`.
    ///
    /// Surrounding whitespace and the first `[` and `]` are dropped before lookup.
    pub fn from_token(raw: &str) -> Self {
        let token = strip_first(&strip_first(raw.trim(), '['), ']').into_owned();
        match token.as_str() {
            "intro" => Section::Intro,
            "verse" => Section::Verse,
            "build" => Section::Build,
            "chorus" => Section::Chorus,
            "prechorus" => Section::PreChorus,
            "breakdown" => Section::Breakdown,
            "bridge" => Section::Bridge,
            "drop" => Section::Drop,
            "solo_guitar" => Section::GuitarSolo,
            "solo_bass" => Section::BassSolo,
            "solo_drums" => Section::DrumSolo,
            "solo_vocals" => Section::VocalSolo,
            "solo_keys" => Section::KeyboardSolo,
            "outro" => Section::Outro,
            _ => {
                tracing::warn!(token = %token, "unknown section name, using it as is");
                Section::Unknown(token)
            }
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Section::Intro => "Intro",
            Section::Verse => "Verse",
            Section::Build => "Build",
            Section::Chorus => "Chorus",
            Section::PreChorus => "Pre-Chorus",
            Section::Breakdown => "Breakdown",
            Section::Bridge => "Bridge",
            Section::Drop => "Drop",
            Section::GuitarSolo => "Guitar Solo",
            Section::BassSolo => "Bass Solo",
            Section::DrumSolo => "Drum Solo",
            Section::VocalSolo => "Vocal Solo",
            Section::KeyboardSolo => "Keyboard Solo",
            Section::Outro => "Outro",
            Section::Unknown(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn strip_first(s: &str, c: char) -> Cow<'_, str> {
    match s.find(c) {
        Some(i) => {
            let mut out = String::with_capacity(s.len() - c.len_utf8());
            out.push_str(&s[..i]);
            out.push_str(&s[i + c.len_utf8()..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(s),
    }
}
