//! Validator: rejects entries with forbidden content before they're
//! sharded or emitted.
//!
//! Grounded in the `TODO(v0)` comment block in
//! `examples/original_source/dictgen/dictfile.go`'s `Validate` (left
//! unimplemented upstream); this crate implements what that TODO describes.

use crate::dictfile::{DictFile, Entry};
use crate::error::{Result, ValidationError};

const FORBIDDEN_SUBSTRINGS: &[&str] = &[
    "<w", "</w", "<html", "</html", "<var", "</var", "<a name=",
];

/// Validates every entry in `df`, returning the first violation found.
pub fn validate(df: &DictFile) -> Result<()> {
    for e in df {
        validate_entry(e)?;
    }
    Ok(())
}

fn validate_entry(e: &Entry) -> Result<()> {
    let headword_trimmed = e.headword.trim();
    if headword_trimmed.is_empty() {
        return Err(ValidationError::EmptyHeadword {
            headword: e.headword.clone(),
            line: e.source_line,
        }
        .into());
    }

    check_field(e, "headword", &e.headword, true)?;
    for v in &e.variants {
        if v.trim().is_empty() {
            return Err(ValidationError::EmptyVariant {
                headword: e.headword.clone(),
                variant: v.clone(),
                line: e.source_line,
            }
            .into());
        }
        check_field(e, "variant", v, true)?;
    }
    check_field(e, "header_info", &e.header_info, false)?;
    check_field(e, "definition", &e.definition, false)?;
    check_field(e, "post_raw_html", &e.post_raw_html, false)?;

    Ok(())
}

fn check_field(e: &Entry, name: &'static str, value: &str, check_quote: bool) -> Result<()> {
    for &needle in FORBIDDEN_SUBSTRINGS {
        if value.contains(needle) {
            return Err(ValidationError::ForbiddenSubstring {
                headword: e.headword.clone(),
                line: e.source_line,
                field: name,
                substring: needle,
            }
            .into());
        }
    }
    if check_quote && value.contains('"') {
        return Err(ValidationError::DoubleQuote {
            headword: e.headword.clone(),
            line: e.source_line,
            field: name,
        }
        .into());
    }
    Ok(())
}
