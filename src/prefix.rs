//! Word-prefix sharding key and link-target normalization.
//!
//! [`word_prefix`] is a deliberate re-implementation of the Kobo reader's
//! `DictionaryParser::htmlForWord` prefix logic, grounded in
//! `examples/cessen-kobo_jp_dict/src/kobo.rs`'s `dictionary_prefix` and
//! cross-checked in tests against [`word_prefix_faithful`], a closer port of
//! the original `kobodict.wordPrefix` (see `examples/original_source/kobodict/util.go`).
//! The two are expected to always agree; any divergence found by the test in
//! this module is a genuine upstream ambiguity, not a bug to silently paper
//! over.

use unicode_categories::UnicodeCategories;

/// Computes the shard key used to bucket a word's dicthtml file.
///
/// Returns a string of 1 or 2 characters. Never errors.
pub fn word_prefix(word: &str) -> String {
    // Lowercase, keep at most the first two characters, and cut at an
    // embedded NUL the way a C string would.
    let mut chars: Vec<char> = Vec::with_capacity(2);
    for c in word.chars() {
        if chars.len() >= 2 || c == '\0' {
            break;
        }
        chars.extend(c.to_lowercase());
    }
    chars.truncate(2);

    while matches!(chars.first(), Some(c) if c.is_whitespace()) {
        chars.remove(0);
    }
    while matches!(chars.last(), Some(c) if c.is_whitespace()) {
        chars.pop();
    }

    if chars.is_empty() {
        return "11".into();
    }

    if is_cyrillic(chars[0]) {
        return chars.into_iter().collect();
    }

    while chars.len() < 2 {
        chars.push('a');
    }

    if !is_letter(chars[0]) || !is_letter(chars[1]) {
        return "11".into();
    }

    chars.into_iter().collect()
}

/// A closer, less "clean" port of the reverse-engineered
/// `DictionaryParser::htmlForWord` logic, operating UTF-16-code-unit-wise the
/// way the original `QString`-based code does for the initial 2-character
/// truncation. Kept alongside [`word_prefix`] to cross-check against it, per
/// the open question in spec.md §9 (the original source ships two
/// independent implementations that are expected to, but are not proven to,
/// agree).
pub fn word_prefix_faithful(word: &str) -> String {
    let lower = word.to_lowercase();

    // QString::leftRef(2) truncates by UTF-16 code units, not scalar values;
    // approximate that here since dicthtml words are overwhelmingly within
    // the BMP (surrogate pairs would split a codepoint, which would be a
    // pre-existing quirk of the original too).
    let units: Vec<u16> = lower.encode_utf16().take(2).collect();
    let truncated: String = String::from_utf16_lossy(&units);

    let trimmed = truncated.trim();

    let mut r: Vec<char> = trimmed.chars().collect();
    if let Some(pos) = r.iter().position(|&c| c == '\0') {
        r.truncate(pos);
    }

    let starts_cyrillic = matches!(r.first(), Some(&c) if is_cyrillic(c));
    if !starts_cyrillic && r.len() != 2 {
        r.push('a');
    }

    let starts_cyrillic = matches!(r.first(), Some(&c) if is_cyrillic(c));
    if !starts_cyrillic {
        let ok = r.len() >= 2 && is_letter(r[0]) && is_letter(r[1]);
        if !ok {
            return "11".into();
        }
    } else if r.is_empty() {
        return "11".into();
    }

    r.into_iter().collect()
}

fn is_cyrillic(c: char) -> bool {
    matches!(c as u32,
        0x0400..=0x04FF | 0x0500..=0x052F | 0x2DE0..=0x2DFF | 0xA640..=0xA69F | 0x1C80..=0x1C8F
    )
}

fn is_letter(c: char) -> bool {
    c.is_letter()
}

/// Normalizes a word for use as a dicthtml link target
/// (`<a name="...">` for headwords, `<variant name="...">` for variants).
///
/// Variants are additionally lowercased, since the reader only ever
/// prefix-matches variants against the lowercased query.
pub fn normalize_word_reference(word: &str, variant: bool) -> String {
    if variant {
        word.trim().to_lowercase()
    } else {
        word.trim().to_string()
    }
}
