//! Recovers an approximate dictfile from a built dictzip.
//!
//! Grounded in
//! `examples/original_source/examples/dictzip-decompile/parse.go`. Not a
//! lossless round-trip (spec.md §9 Non-goals): the three producer-specific
//! regexes below are tried in order, and only their differences from the
//! generic fallback let the recovered dictfile look anything like a human
//! wrote it (preserved header info, a clean headword, etc).

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::bytes::Regex;
use sha1::{Digest, Sha1};

use crate::dictfile::{DictFile, Entry};
use crate::error::{DecompileError, Result};

lazy_static! {
    // Penelope: <a name="x"/><div><b>x</b><br/>content</div>
    static ref PENELOPE_RE: Regex =
        Regex::new(r#"(?s)^<a name="([^"]+)"/><div><b>([^<]+)</b><br/>(.+)</div>$"#).unwrap();

    // Kobo French-style: headword repeated, header info before a double <br/>.
    static ref KOBO_FR_RE: Regex = Regex::new(
        r#"(?s)^<p><a name="([^"]+)" ?(?:/>|></a>)<b>\s*([^<]+)\s*</b>\s*(.*?)<br ?/><br ?/>\s*(.+)\s*</p>$"#
    )
    .unwrap();

    // Kobo English-style / self-produced (dictgen's own output matches this too).
    static ref KOBO_EN_RE: Regex = Regex::new(
        r#"(?s)^<p><a name="([^"]+)" ?(?:/>|></a>)<b>\s*(.+?)\s*</b>\s*(.*?)\s*</p>\s*(.+)\s*$"#
    )
    .unwrap();

    static ref HEAD_FALLBACK_RE: Regex = Regex::new(r#"<a name="([^"]+)" ?(?:/>|></a>)"#).unwrap();
    static ref VARIANTS_RE: Regex = Regex::new(r#"(?s)<var>(.*?)</var>"#).unwrap();
    static ref VARIANTS_ITEM_RE: Regex =
        Regex::new(r#"<variant name="([^"]+)" ?(?:/>|></variant>)"#).unwrap();

    static ref ENTRY_RE: Regex = Regex::new(r#"(?s)<w>\s*(.+?)\s*</w>"#).unwrap();
}

/// Recovers a [`DictFile`] from the already-decompressed bytes of every
/// dicthtml shard. Duplicate entries (the same bytes appearing in more than
/// one shard, e.g. an entry duplicated across prefixes by a variant) are
/// collapsed by content hash.
pub fn decompile(shards: &[Vec<u8>]) -> Result<DictFile> {
    let mut df = DictFile::new();
    let mut seen: HashSet<[u8; 20]> = HashSet::new();

    for shard in shards {
        for body in extract_entries(shard)? {
            let digest: [u8; 20] = Sha1::digest(&body).into();
            if !seen.insert(digest) {
                continue;
            }
            df.push(decompile_entry(&body)?);
        }
    }

    Ok(df)
}

/// Splits a shard's decompressed HTML into the trimmed body of each `<w>`
/// entry, verifying only whitespace appears between entries (and around the
/// `<html>`/`</html>` wrapper).
pub fn extract_entries(buf: &[u8]) -> Result<Vec<Vec<u8>>> {
    let start = find(buf, b"<html>")
        .ok_or_else(|| DecompileError::MissingHtmlStart(String::from_utf8_lossy(buf).to_string()))?;
    let buf = &buf[start + 6..];

    let end = rfind(buf, b"</html>")
        .ok_or_else(|| DecompileError::MissingHtmlEnd(String::from_utf8_lossy(buf).to_string()))?;
    let buf = &buf[..end];

    let mut entries = Vec::new();
    let mut prev_end = 0usize;

    for m in ENTRY_RE.captures_iter(buf) {
        let whole = m.get(0).unwrap();
        let body = m.get(1).unwrap();

        let between = &buf[prev_end..whole.start()];
        if between.iter().any(|&b| !(b as char).is_whitespace()) {
            return Err(DecompileError::NonWhitespaceBetweenEntries(
                String::from_utf8_lossy(buf).to_string(),
                String::from_utf8_lossy(between).to_string(),
            )
            .into());
        }

        prev_end = whole.end();
        entries.push(body.as_bytes().to_vec());
    }

    let trailing = &buf[prev_end..];
    if trailing.iter().any(|&b| !(b as char).is_whitespace()) {
        return Err(DecompileError::NonWhitespaceBetweenEntries(
            String::from_utf8_lossy(buf).to_string(),
            String::from_utf8_lossy(trailing).to_string(),
        )
        .into());
    }

    Ok(entries)
}

/// Decompiles one trimmed `<w>...</w>` body into an [`Entry`].
pub fn decompile_entry(buf: &[u8]) -> Result<Entry> {
    let mut entry = Entry::default();
    let mut matched = false;

    if let Some(c) = PENELOPE_RE.captures(buf) {
        let headword_index = &c[1];
        let headword_display = &c[2];
        let content = &c[3];
        if headword_index == headword_display {
            entry.headword = String::from_utf8_lossy(headword_index).to_string();
            entry.raw_html = true;
            entry.definition = String::from_utf8_lossy(content).to_string();
            matched = true;
        }
    }

    if !matched {
        if let Some(c) = KOBO_FR_RE.captures(buf) {
            let headword_index = &c[1];
            let headword_display = &c[2];
            let header_info = &c[3];
            let content = &c[4];
            if !contains_false_positive_markup(headword_display) && !contains_false_positive_markup(header_info) {
                entry.headword = if headword_index.eq_ignore_ascii_case(headword_display) {
                    String::from_utf8_lossy(headword_display).to_string()
                } else {
                    String::from_utf8_lossy(headword_index).to_string()
                };
                entry.raw_html = true;
                entry.header_info = String::from_utf8_lossy(header_info).to_string();
                entry.definition = format!("<p>{}</p>", String::from_utf8_lossy(content));
                matched = true;
            }
        }
    }

    if !matched {
        if let Some(c) = KOBO_EN_RE.captures(buf) {
            let headword_index = &c[1];
            let headword_display = &c[2];
            let header_info = &c[3];
            let content = &c[4];
            if !contains_false_positive_markup(headword_display) && !contains_false_positive_markup(header_info) {
                entry.headword = if headword_index.eq_ignore_ascii_case(headword_display) {
                    String::from_utf8_lossy(headword_display).to_string()
                } else {
                    String::from_utf8_lossy(headword_index).to_string()
                };
                entry.raw_html = true;
                entry.header_info = String::from_utf8_lossy(header_info).to_string();
                entry.definition = String::from_utf8_lossy(content).to_string();
                matched = true;
            }
        }
    }

    if !matched {
        entry.no_header = true;
        entry.raw_html = true;
        let mut first_taken = false;
        let replaced = HEAD_FALLBACK_RE.replace_all(buf, |caps: &regex::bytes::Captures| {
            if first_taken {
                return caps.get(0).unwrap().as_bytes().to_vec();
            }
            entry.headword = String::from_utf8_lossy(&caps[1]).to_string();
            first_taken = true;
            Vec::new()
        });
        entry.definition = String::from_utf8_lossy(&replaced).to_string();

        if entry.headword.is_empty() {
            return Err(DecompileError::NoHeadwordFound(String::from_utf8_lossy(buf).to_string()).into());
        }
    }

    // Stray <a name="..."> tags left in the definition become variants.
    let def_bytes = entry.definition.clone().into_bytes();
    let mut stray_variants = Vec::new();
    let def_bytes = HEAD_FALLBACK_RE.replace_all(&def_bytes, |caps: &regex::bytes::Captures| {
        stray_variants.push(String::from_utf8_lossy(&caps[1]).to_string());
        Vec::new()
    });
    entry.variants.append(&mut stray_variants);

    // <var>...</var> blocks become variants too, and are stripped.
    let def_bytes = VARIANTS_RE.replace_all(&def_bytes, |caps: &regex::bytes::Captures| {
        for item in VARIANTS_ITEM_RE.captures_iter(&caps[1]) {
            entry.variants.push(String::from_utf8_lossy(&item[1]).to_string());
        }
        Vec::new()
    });
    entry.definition = String::from_utf8_lossy(&def_bytes).to_string();

    Ok(entry)
}

fn contains_false_positive_markup(s: &[u8]) -> bool {
    for needle in [&b"<br"[..], b"<li", b"<var", b"<p"] {
        if find(s, needle).is_some() {
            return true;
        }
    }
    false
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
