//! Speaker name normalization.

/// Honorifics stripped from the front of a speaker name.
const HONORIFICS: &[&str] = &["Dr.", "Mr.", "Mrs.", "Ms.", "Prof."];

/// Normalizes a raw speaker label.
///
/// Trims, strips one leading honorific and title-cases the remainder, so
/// `"dr. alice CHEN"` and `"Alice Chen"` name the same participant.
pub fn normalize_speaker(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_honorific = HONORIFICS
        .iter()
        .find_map(|h| strip_prefix_ignore_case(trimmed, h))
        .map_or(trimmed, str::trim_start);
    title_case(without_honorific)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
