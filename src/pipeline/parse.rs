use crate::color::Color;
use crate::palette::ColorEntry;

/// Extract `#RRGGBB (label)` occurrences from free-form backend text, in
/// order of appearance, without deduplication.
///
/// This is an explicit scan with the semantics of the lazy pattern
/// `#([0-9A-Fa-f]{6})\s*\((.*?)\)`:
///
/// - exactly six hex digits after the `#`;
/// - any run of whitespace (newlines included) before the `(`;
/// - the label ends at the first `)` and may not span lines;
/// - a failed candidate resumes scanning right after its `#`, a successful
///   one right after its `)`, so matches never overlap.
///
/// An empty result is a valid result, not an error.
pub fn parse_palette(text: &str) -> Vec<ColorEntry> {
    let mut entries = Vec::new();
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        // '#' is ASCII, so byte stepping never lands inside a UTF-8 sequence
        // that could be mistaken for it.
        if bytes[pos] != b'#' {
            pos += 1;
            continue;
        }
        match scan_entry(text, pos) {
            Some((entry, end)) => {
                entries.push(entry);
                pos = end;
            }
            None => pos += 1,
        }
    }
    entries
}

/// Try to match one entry starting at the `#` at byte offset `start`.
/// Returns the entry and the byte offset just past its closing paren.
fn scan_entry(text: &str, start: usize) -> Option<(ColorEntry, usize)> {
    let bytes = text.as_bytes();
    let mut i = start + 1;

    if bytes.len() < i + 6 || !bytes[i..i + 6].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let hex = &text[i..i + 6];
    i += 6;

    while let Some(c) = text[i..].chars().next() {
        if !c.is_whitespace() {
            break;
        }
        i += c.len_utf8();
    }

    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    i += 1;

    let label_start = i;
    for (offset, c) in text[i..].char_indices() {
        match c {
            ')' => {
                let label = &text[label_start..i + offset];
                let color = Color::from_hex(hex).ok()?;
                return Some((ColorEntry::new(color, label), i + offset + 1));
            }
            // The label cannot cross a line terminator.
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => return None,
            _ => {}
        }
    }
    None
}
