//! Renders one [`Entry`] into the exact micro-HTML the Kobo reader's
//! lookup regexes match against.
//!
//! Grounded in `examples/original_source/dictgen/dictgen.go`'s
//! `koboHTMLTmpl`. The whitespace in the output is load-bearing (the
//! reader's matching is regex-based and brittle, per spec.md §9), so this
//! never goes through a templating engine that might introduce incidental
//! whitespace — it's built with direct `push_str` calls instead.

use pulldown_cmark::{html, Options, Parser};

use crate::dictfile::{DictFile, Entry};
use crate::error::Result;
use crate::prefix::normalize_word_reference;

/// Renders Markdown the same way the reference renderer's defaults do:
/// tables, fenced code (core CommonMark), and strikethrough enabled;
/// footnotes left off.
fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);
    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);
    html_out.trim().to_string()
}

/// Renders a single entry's `<w>...</w>` block.
pub fn write_entry_html(e: &Entry, out: &mut String) {
    out.push_str("<w>");

    let normhw = normalize_word_reference(&e.headword, false);
    if e.no_header {
        out.push_str("<a name=\"");
        out.push_str(&normhw);
        out.push_str("\" />");
    } else {
        out.push_str("<p><a name=\"");
        out.push_str(&normhw);
        out.push_str("\" /><b>");
        out.push_str(&e.headword);
        out.push_str("</b>");
        if !e.header_info.is_empty() {
            out.push(' ');
            out.push_str(&e.header_info);
        }
        out.push_str("</p>");
    }

    out.push_str("<var>");
    for v in &e.variants {
        out.push_str("<variant name=\"");
        out.push_str(&normalize_word_reference(v, true));
        out.push_str("\"/>");
    }
    out.push_str("</var>");

    if !e.definition.is_empty() {
        if e.raw_html {
            out.push_str(&e.definition);
        } else {
            out.push_str(&render_markdown(&e.definition));
        }
    }

    if !e.post_raw_html.is_empty() {
        out.push_str(&e.post_raw_html);
    }

    out.push_str("</w>");
}

/// Renders a full shard document: `<html>` + every entry (sorted ascending
/// by headword) + `</html>`, with zero inter-entry whitespace.
///
/// Does not validate `entries` itself — the pipeline driver validates the
/// whole combined entry set once, before sharding, so an invalid entry
/// anywhere aborts the build before any shard is rendered or written.
pub fn write_shard_html(entries: &DictFile) -> Result<String> {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.headword.cmp(&b.headword));

    let mut out = String::from("<html>");
    for e in sorted {
        write_entry_html(e, &mut out);
    }
    out.push_str("</html>");
    Ok(out)
}
