//! The dictfile source format: a line-directive text format that parses into
//! [`Entry`] values and can be re-serialized losslessly (modulo the
//! diagnostic `source_line`).
//!
//! Grounded in `examples/original_source/dictgen/dictfile.go`
//! (`ParseDictFile`, `WriteDictFile`).

use std::io::{BufRead, Write};

use crate::error::{ParseError, Result};

/// One headword's worth of dictionary content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entry {
    pub headword: String,
    pub variants: Vec<String>,

    pub no_header: bool,
    pub header_info: String,

    pub raw_html: bool,
    pub definition: String,

    /// Appended verbatim after the definition at emit time (e.g. a
    /// footer-suppression span). Never set by the parser.
    pub post_raw_html: String,

    /// 1-based source line the entry's `@` directive appeared on, for
    /// diagnostics. Zero when the entry was synthesized rather than parsed.
    pub source_line: usize,
}

pub type DictFile = Vec<Entry>;

/// Parses a dictfile from `r`.
///
/// See spec.md §4.6 / §6 for the line-directive grammar.
pub fn parse_dict_file<R: BufRead>(r: R) -> Result<DictFile> {
    let mut df: DictFile = Vec::new();
    let mut current: Option<usize> = None; // index into df of the in-progress entry

    for (idx, line) in r.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;

        if line.is_empty() {
            if let Some(i) = current {
                if !df[i].definition.is_empty() {
                    df[i].definition.push('\n');
                }
            }
            continue;
        }

        let mut chars = line.char_indices();
        let first = chars.next().map(|(_, c)| c);

        match first {
            Some('@') => {
                let headword = line[1..].trim().to_string();
                if headword.is_empty() {
                    return Err(ParseError::EmptyHeadword { line: lineno }.into());
                }
                df.push(Entry {
                    headword,
                    source_line: lineno,
                    ..Entry::default()
                });
                current = Some(df.len() - 1);
            }
            Some(':') => {
                let i = current.ok_or(ParseError::HeaderBeforeWord { line: lineno })?;
                if !df[i].definition.is_empty() {
                    return Err(ParseError::HeaderAfterDefinition { line: lineno }.into());
                }
                if df[i].no_header || !df[i].header_info.is_empty() {
                    return Err(ParseError::MultipleHeaders { line: lineno }.into());
                }
                let rest = &line[1..];
                if rest.starts_with(':') {
                    if !rest[1..].trim().is_empty() {
                        return Err(ParseError::ExtraDataAfterNoHeader { line: lineno }.into());
                    }
                    df[i].no_header = true;
                } else {
                    df[i].header_info = rest.trim().to_string();
                }
            }
            Some('&') => {
                let i = current.ok_or(ParseError::VariantBeforeWord { line: lineno })?;
                if !df[i].definition.is_empty() {
                    return Err(ParseError::VariantAfterDefinition { line: lineno }.into());
                }
                let v = line[1..].trim().to_string();
                if v.is_empty() {
                    return Err(ParseError::EmptyVariant { line: lineno }.into());
                }
                df[i].variants.push(v);
            }
            Some(_) => {
                let i = current.ok_or(ParseError::DefinitionBeforeWord { line: lineno })?;
                let line = line
                    .strip_prefix(" @")
                    .map(|rest| format!("@{}", rest))
                    .or_else(|| line.strip_prefix(" :").map(|rest| format!(":{}", rest)))
                    .or_else(|| line.strip_prefix(" &").map(|rest| format!("&{}", rest)))
                    .unwrap_or(line);
                df[i].definition.push_str(&line);
                df[i].definition.push('\n');
            }
            None => unreachable!("non-empty line must have a first char"),
        }
    }

    for dfe in df.iter_mut() {
        dfe.definition = dfe.definition.trim().to_string();

        let without_sentinel = dfe
            .definition
            .strip_prefix("<html>")
            .map(|rest| rest.trim_start().to_string());

        if let Some(v) = without_sentinel {
            if v.ends_with("</html>") {
                return Err(ParseError::RawHtmlFullDocument {
                    line: dfe.source_line,
                }
                .into());
            }
            dfe.raw_html = true;
            dfe.definition = v;
        } else if dfe.definition.contains("<html>") {
            return Err(ParseError::StrayHtmlTag {
                line: dfe.source_line,
            }
            .into());
        }
    }

    Ok(df)
}

/// Writes `df` back out in dictfile format.
///
/// Lines inside a definition that would otherwise be mistaken for a
/// directive (`@`, `:`, `&` as the first byte) are escaped with a leading
/// space; `parse_dict_file` strips exactly that leading space back off, so
/// `parse(write(entries)) == entries` holds even when a definition contains
/// such lines.
pub fn write_dict_file<W: Write>(df: &DictFile, mut w: W) -> Result<()> {
    for dfe in df {
        write_entry(dfe, &mut w)?;
        writeln!(w)?;
    }
    Ok(())
}

fn escape_definition(def: &str) -> String {
    def.replace("\n@", "\n @")
        .replace("\n:", "\n :")
        .replace("\n&", "\n &")
}

fn write_entry<W: Write>(e: &Entry, mut w: W) -> Result<()> {
    write!(w, "@ {}", e.headword)?;

    if e.no_header {
        write!(w, "\n::")?;
    } else if !e.header_info.is_empty() {
        write!(w, "\n: {}", e.header_info)?;
    }

    for v in &e.variants {
        write!(w, "\n& {}", v)?;
    }

    if e.raw_html {
        write!(w, "\n<html>")?;
    }

    if !e.definition.is_empty() {
        write!(w, "\n{}", escape_definition(&e.definition))?;
    }

    writeln!(w)?;
    Ok(())
}
