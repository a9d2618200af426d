//! Wiki markup around the extracted lyric lines.

/// Height of the lyrics scroll box on jam track pages.
pub const SCROLLBOX_HEIGHT: u32 = 450;

/// The `== Lyrics ==` block of a jam track article, with `lines` as its content.
pub fn lyrics_section(lines: &[String]) -> String {
    let mut out = String::from("== Lyrics ==\n");
    out.push_str("{{Scrollbox Clear\n");
    out.push_str(&format!("|BoxHeight = {SCROLLBOX_HEIGHT}\n"));
    out.push_str("|Content = \n");
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("}}\n");
    out
}
