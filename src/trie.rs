//! Pluggable MARISA trie codec.
//!
//! Grounded in `examples/original_source/kobodict/marisa.go`, which exposes
//! the trie as a package-level interface variable rather than a concrete
//! implementation, letting callers substitute their own binding. This crate
//! mirrors that shape as a trait plus two implementations:
//!
//! - [`ExternalMarisaCodec`] shells out to the `marisa-build`/
//!   `marisa-reverse-lookup` command-line tools via a temp directory, the
//!   same approach `examples/cessen-kobo_jp_dict/src/kobo.rs`'s
//!   `write_dictionary` uses for its own word index.
//! - [`PlainWordListCodec`] is a dependency-free newline-joined encoding,
//!   used as this crate's default so the library and its tests don't
//!   require the real MARISA toolchain to be installed. It is not
//!   reader-compatible; production builds destined for an actual device
//!   must supply [`ExternalMarisaCodec`] or an equivalent.

use std::io::Write as _;
use std::process::Command;

use crate::error::Result;

pub trait TrieCodec {
    fn serialize(&self, words: &[String]) -> Result<Vec<u8>>;
    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Newline-joined word list. Not the real MARISA wire format; intended for
/// use in tests and as a safe default that never requires external tools.
#[derive(Default)]
pub struct PlainWordListCodec;

impl TrieCodec for PlainWordListCodec {
    fn serialize(&self, words: &[String]) -> Result<Vec<u8>> {
        Ok(words.join("\n").into_bytes())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let text = String::from_utf8_lossy(bytes);
        Ok(text
            .split('\n')
            .filter(|w| !w.is_empty())
            .map(|w| w.to_string())
            .collect())
    }
}

/// Shells out to `marisa-build`/`marisa-reverse-lookup` for a
/// reader-compatible trie. Requires those tools to be present on `PATH`.
pub struct ExternalMarisaCodec;

impl TrieCodec for ExternalMarisaCodec {
    fn serialize(&self, words: &[String]) -> Result<Vec<u8>> {
        let dir = tempfile::tempdir()?;
        let words_path = dir.path().join("words.txt");
        let trie_path = dir.path().join("words.marisa");

        let mut f = std::fs::File::create(&words_path)?;
        for word in words {
            writeln!(f, "{}", word)?;
        }
        f.sync_all()?;
        drop(f);

        let output = Command::new("marisa-build")
            .arg("-o")
            .arg(&trie_path)
            .arg(&words_path)
            .output()?;
        if !output.status.success() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!(
                    "marisa-build exited with failure: {}",
                    String::from_utf8_lossy(&output.stderr)
                ),
            )
            .into());
        }

        Ok(std::fs::read(&trie_path)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let dir = tempfile::tempdir()?;
        let trie_path = dir.path().join("words.marisa");
        std::fs::write(&trie_path, bytes)?;

        let output = Command::new("marisa-reverse-lookup")
            .arg(&trie_path)
            .output()?;
        if !output.status.success() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!(
                    "marisa-reverse-lookup exited with failure: {}",
                    String::from_utf8_lossy(&output.stderr)
                ),
            )
            .into());
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_codec_round_trips_sorted_words() {
        let codec = PlainWordListCodec;
        let words: Vec<String> = vec!["apple".into(), "banana".into(), "cherry".into()];
        let bytes = codec.serialize(&words).unwrap();
        let back = codec.deserialize(&bytes).unwrap();
        assert_eq!(back, words);
    }

    #[test]
    fn plain_codec_round_trips_empty() {
        let codec = PlainWordListCodec;
        let bytes = codec.serialize(&[]).unwrap();
        let back = codec.deserialize(&bytes).unwrap();
        assert!(back.is_empty());
    }
}
