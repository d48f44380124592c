//! The dictzip container: a ZIP archive holding gzip-compressed (optionally
//! AES-encrypted) per-prefix `dicthtml` shards, flat raw resource files, and
//! a `words` entry holding the MARISA word index.
//!
//! Grounded in `examples/original_source/kobodict/writer.go` and
//! `reader.go`. The original streams each dicthtml entry through a live
//! `gzip.Writer` sitting directly on top of the open zip entry; this port
//! buffers one entry's plaintext at a time instead (`pending`), since the
//! pipeline driver always has a shard's full HTML in memory before writing
//! it anyway, and buffering avoids holding a borrow of the zip writer open
//! across calls.

use std::collections::BTreeSet;
use std::io::{Cursor, Read, Seek, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::crypt::Crypter;
use crate::error::{ContainerError, Result};
use crate::trie::TrieCodec;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Builds a dictzip archive. Does no content validation of its own; the
/// pipeline driver validates and shards before anything reaches this type.
pub struct Writer<W: Write + Seek> {
    zip: zip::ZipWriter<W>,
    words: BTreeSet<String>,
    names: BTreeSet<String>,
    pending: Option<(String, Vec<u8>)>,
    encrypter: Option<Box<dyn Crypter>>,
}

impl<W: Write + Seek> Writer<W> {
    pub fn new(w: W) -> Self {
        Writer {
            zip: zip::ZipWriter::new(w),
            words: BTreeSet::new(),
            names: BTreeSet::new(),
            pending: None,
            encrypter: None,
        }
    }

    /// Sets the encrypter used for every dicthtml entry written from this
    /// point on. Raw files and the word index are never encrypted.
    pub fn set_encrypter(&mut self, c: Box<dyn Crypter>) {
        self.encrypter = Some(c);
    }

    /// Adds `word` to the index. Only trimmed for whitespace; not otherwise
    /// normalized, matching the original's "index words aren't normalized
    /// except for trimming spaces".
    pub fn add_word(&mut self, word: &str) -> Result<()> {
        self.words.insert(word.trim().to_string());
        Ok(())
    }

    /// Whether `name` has already been written (a raw file, a dicthtml
    /// shard, or is still pending flush).
    pub fn exists(&self, name: &str) -> bool {
        self.names.contains(name)
            || matches!(&self.pending, Some((n, _)) if n == name)
    }

    /// Writes a dicthtml shard for `prefix` (gzip-compressed, then
    /// encrypted if an encrypter is set).
    pub fn create_dicthtml(&mut self, prefix: &str, html: &[u8]) -> Result<()> {
        self.write_entry(format!("{}.html", prefix), html, true)
    }

    /// Writes a flat raw resource file (e.g. an embedded image).
    pub fn create_file(&mut self, filename: &str, data: &[u8]) -> Result<()> {
        self.write_entry(filename.to_string(), data, false)
    }

    fn write_entry(&mut self, name: String, data: &[u8], compress: bool) -> Result<()> {
        if name.contains('/') {
            return Err(ContainerError::FilenameContainsSlash(name).into());
        }
        if name == "words" {
            return Err(ContainerError::ReservedFilename.into());
        }
        if self.names.contains(&name) {
            return Err(ContainerError::DuplicateEntry(name).into());
        }

        self.flush_pending()?;

        let payload = if compress {
            let mut enc = GzEncoder::new(Vec::new(), Compression::default());
            enc.write_all(data)?;
            enc.finish()?
        } else {
            data.to_vec()
        };

        let payload = match &self.encrypter {
            Some(c) if compress => c.encrypt(&payload)?,
            _ => payload,
        };

        self.names.insert(name.clone());
        self.pending = Some((name, payload));
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some((name, buf)) = self.pending.take() {
            self.zip.start_file(&name, zip::write::FileOptions::default())?;
            self.zip.write_all(&buf)?;
        }
        Ok(())
    }

    /// Writes the word index and the zip footer, returning the underlying
    /// writer. Words are sorted for deterministic output. Consumes the
    /// writer, so a second `finalize` call is a compile error rather than a
    /// runtime one.
    pub fn finalize(mut self, trie: &dyn TrieCodec) -> Result<W> {
        self.flush_pending()?;

        let words: Vec<String> = self.words.iter().cloned().collect();
        let index_bytes = trie.serialize(&words)?;
        self.zip.start_file("words", zip::write::FileOptions::default())?;
        self.zip.write_all(&index_bytes)?;

        Ok(self.zip.finish()?)
    }
}

/// One dicthtml shard discovered while opening a [`Reader`].
pub struct DicthtmlEntry {
    pub name: String,
    pub prefix: String,
}

/// One flat raw resource file discovered while opening a [`Reader`].
pub struct FileEntry {
    pub name: String,
}

/// Reads the contents of a dictzip archive.
pub struct Reader<R: Read + Seek> {
    zip: zip::ZipArchive<R>,
    pub words: Vec<String>,
    pub dicthtml: Vec<DicthtmlEntry>,
    pub files: Vec<FileEntry>,
    decrypter: Option<Box<dyn Crypter>>,
}

impl<R: Read + Seek> Reader<R> {
    pub fn new(r: R, trie: &dyn TrieCodec) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(r)?;

        let mut words_bytes = None;
        let mut dicthtml = Vec::new();
        let mut files = Vec::new();

        for i in 0..zip.len() {
            let f = zip.by_index(i)?;
            let name = f.name().to_string();
            if name == "words" {
                let mut buf = Vec::new();
                let mut f = f;
                f.read_to_end(&mut buf)?;
                words_bytes = Some(buf);
                continue;
            }
            if !f.is_file() {
                continue;
            }
            if name.contains('/') {
                return Err(ContainerError::IllegalFileName(name).into());
            }
            if let Some(prefix) = name.strip_suffix(".html") {
                dicthtml.push(DicthtmlEntry {
                    name: name.clone(),
                    prefix: prefix.to_string(),
                });
            } else {
                files.push(FileEntry { name: name.clone() });
            }
        }

        let words_bytes = words_bytes.ok_or(ContainerError::NoWordsIndex)?;
        let words = trie.deserialize(&words_bytes)?;

        Ok(Reader {
            zip,
            words,
            dicthtml,
            files,
            decrypter: None,
        })
    }

    pub fn set_decrypter(&mut self, d: Box<dyn Crypter>) {
        self.decrypter = Some(d);
    }

    /// Reads and decompresses the dicthtml entry named `name`, transparently
    /// decrypting first if its bytes aren't already gzip-framed.
    pub fn open_dicthtml(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut raw = Vec::new();
        self.zip.by_name(name)?.read_to_end(&mut raw)?;

        let gzip_framed = raw.len() >= 2 && raw[0..2] == GZIP_MAGIC;
        let plain = if gzip_framed {
            raw
        } else {
            let decrypter = self
                .decrypter
                .as_ref()
                .ok_or_else(|| ContainerError::NoDecrypter(name.to_string()))?;
            let dec = decrypter.decrypt(&raw)?;
            if dec.len() < 2 || dec[0..2] != GZIP_MAGIC {
                return Err(ContainerError::BadKeyOrCorrupt(name.to_string()).into());
            }
            dec
        };

        let mut out = Vec::new();
        GzDecoder::new(Cursor::new(plain)).read_to_end(&mut out)?;
        Ok(out)
    }

    /// Reads a flat raw resource file verbatim.
    pub fn open_file(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.zip.by_name(name)?.read_to_end(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypt::AesCrypter;
    use crate::trie::PlainWordListCodec;

    fn build(html_by_prefix: &[(&str, &str)], encrypter: Option<Box<dyn Crypter>>) -> Vec<u8> {
        let mut w = Writer::new(Cursor::new(Vec::new()));
        if let Some(c) = encrypter {
            w.set_encrypter(c);
        }
        for (prefix, html) in html_by_prefix {
            w.add_word(prefix).unwrap();
            w.create_dicthtml(prefix, html.as_bytes()).unwrap();
        }
        w.finalize(&PlainWordListCodec).unwrap().into_inner()
    }

    #[test]
    fn round_trips_plaintext_shards() {
        let bytes = build(&[("ap", "<html>apple</html>"), ("ba", "<html>banana</html>")], None);
        let mut r = Reader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
        assert_eq!(r.dicthtml.len(), 2);
        let content = r.open_dicthtml("ap.html").unwrap();
        assert_eq!(content, b"<html>apple</html>");
    }

    #[test]
    fn round_trips_encrypted_shards() {
        let key = vec![0x11u8; 16];
        let enc = Box::new(AesCrypter::new(&key).unwrap());
        let bytes = build(&[("ap", "<html>apple</html>")], Some(enc));

        let mut r = Reader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
        assert!(r.open_dicthtml("ap.html").is_err());

        r.set_decrypter(Box::new(AesCrypter::new(&key).unwrap()));
        let content = r.open_dicthtml("ap.html").unwrap();
        assert_eq!(content, b"<html>apple</html>");
    }

    #[test]
    fn wrong_decryption_key_is_rejected() {
        let key = vec![0x11u8; 16];
        let enc = Box::new(AesCrypter::new(&key).unwrap());
        let bytes = build(&[("ap", "<html>apple</html>")], Some(enc));

        let mut r = Reader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
        r.set_decrypter(Box::new(AesCrypter::new(&[0x22u8; 16]).unwrap()));
        assert!(r.open_dicthtml("ap.html").is_err());
    }

    #[test]
    fn raw_files_are_not_compressed_or_encrypted() {
        let mut w = Writer::new(Cursor::new(Vec::new()));
        w.create_file("cover.jpg", b"fake-jpeg-bytes").unwrap();
        let bytes = w.finalize(&PlainWordListCodec).unwrap().into_inner();

        let mut r = Reader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
        assert_eq!(r.files.len(), 1);
        assert_eq!(r.open_file("cover.jpg").unwrap(), b"fake-jpeg-bytes");
    }

    #[test]
    fn missing_words_index_is_rejected_on_read() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("a.html", zip::write::FileOptions::default()).unwrap();
        zip.write_all(b"not a words file").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(Reader::new(Cursor::new(bytes), &PlainWordListCodec).is_err());
    }

    #[test]
    fn filename_with_slash_is_rejected() {
        let mut w = Writer::new(Cursor::new(Vec::new()));
        assert!(w.create_file("sub/dir.jpg", b"x").is_err());
    }

    #[test]
    fn reserved_words_filename_is_rejected() {
        let mut w = Writer::new(Cursor::new(Vec::new()));
        assert!(w.create_file("words", b"x").is_err());
    }

    #[test]
    fn duplicate_entry_name_is_rejected() {
        let mut w = Writer::new(Cursor::new(Vec::new()));
        w.create_dicthtml("ap", b"<html></html>").unwrap();
        assert!(w.create_dicthtml("ap", b"<html></html>").is_err());
    }

    #[test]
    fn finalize_returns_the_underlying_writer() {
        let mut w = Writer::new(Cursor::new(Vec::new()));
        w.create_dicthtml("ap", b"<html></html>").unwrap();
        let cursor = w.finalize(&PlainWordListCodec).unwrap();
        assert!(!cursor.into_inner().is_empty());
    }

    #[test]
    fn finalize_with_no_entries_still_writes_words_index() {
        let w = Writer::new(Cursor::new(Vec::new()));
        let bytes = w.finalize(&PlainWordListCodec).unwrap().into_inner();
        let r = Reader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
        assert!(r.words.is_empty());
        assert!(r.dicthtml.is_empty());
    }
}
