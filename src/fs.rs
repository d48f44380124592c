//! Filesystem pack/unpack: lets a dictzip be edited as a plain directory of
//! files instead of round-tripping through the ZIP container.
//!
//! Grounded in `examples/original_source/kobodict/fs.go` (`Unpack`/`Pack`).

use std::fs;
use std::io::{Read, Seek, Write};
use std::path::Path;

use crate::container::{Reader as ContainerReader, Writer as ContainerWriter};
use crate::error::{ContainerError, Result};
use crate::trie::TrieCodec;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Unpacks every entry of `r` into `dir`, which must not already exist.
/// Dicthtml files are written already gzip-decompressed (and decrypted, if
/// a decrypter was set on `r`), so they can be edited as plain HTML; `Pack`
/// re-compresses them.
pub fn unpack<R: Read + Seek>(r: &mut ContainerReader<R>, dir: &Path) -> Result<()> {
    if dir.exists() {
        return Err(ContainerError::DirAlreadyExists(dir.display().to_string()).into());
    }
    fs::create_dir(dir)?;

    let html_names: Vec<String> = r.dicthtml.iter().map(|e| e.name.clone()).collect();
    for name in html_names {
        let content = r.open_dicthtml(&name)?;
        fs::write(dir.join(&name), content)?;
    }

    let file_names: Vec<String> = r.files.iter().map(|e| e.name.clone()).collect();
    for name in file_names {
        let content = r.open_file(&name)?;
        fs::write(dir.join(&name), content)?;
    }

    fs::write(dir.join("words"), r.words.join("\n"))?;
    Ok(())
}

/// Packs a directory previously produced by [`unpack`] (or hand-authored in
/// the same layout) into `dw`. `dw` should not have had anything written to
/// it yet.
pub fn pack<W: Write + Seek>(dw: &mut ContainerWriter<W>, dir: &Path) -> Result<()> {
    let words_path = dir.join("words");
    if !words_path.is_file() {
        return Err(ContainerError::NotAnUnpackedDict(dir.display().to_string()).into());
    }

    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let file_type = entry.file_type()?;
        let name = entry.file_name().to_string_lossy().to_string();

        if file_type.is_dir() {
            return Err(ContainerError::SubdirectoryNotSupported(name).into());
        }
        if name == "words" {
            continue;
        }

        let content = fs::read(entry.path())?;

        if let Some(prefix) = name.strip_suffix(".html") {
            if content.len() >= 2 && content[0..2] == GZIP_MAGIC {
                return Err(ContainerError::AlreadyCompressed(name).into());
            }
            dw.create_dicthtml(prefix, &content)?;
        } else {
            dw.create_file(&name, &content)?;
        }
    }

    for line in fs::read_to_string(&words_path)?.lines() {
        let word = line.trim();
        if !word.is_empty() {
            dw.add_word(word)?;
        }
    }

    Ok(())
}

/// Convenience: packs `dir` and finalizes the archive, returning the
/// completed writer.
pub fn pack_to<W: Write + Seek>(w: W, dir: &Path, trie: &dyn TrieCodec) -> Result<W> {
    let mut dw = ContainerWriter::new(w);
    pack(&mut dw, dir)?;
    dw.finalize(trie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::PlainWordListCodec;
    use std::io::Cursor;

    fn tempdir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn round_trips_through_unpack_and_pack() {
        let mut dw = ContainerWriter::new(Cursor::new(Vec::new()));
        dw.add_word("apple").unwrap();
        dw.create_dicthtml("ap", b"<html><w>apple</w></html>").unwrap();
        dw.create_file("cover.jpg", b"fake-jpeg").unwrap();
        let bytes = dw.finalize(&PlainWordListCodec).unwrap().into_inner();

        let mut r = ContainerReader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
        let dir = tempdir();
        let unpacked = dir.path().join("unpacked");
        unpack(&mut r, &unpacked).unwrap();

        assert!(unpacked.join("ap.html").is_file());
        assert!(unpacked.join("cover.jpg").is_file());
        assert!(unpacked.join("words").is_file());

        let html = fs::read(unpacked.join("ap.html")).unwrap();
        assert_eq!(html[0..2], GZIP_MAGIC, "unpacked html should not be pre-gzip-framed");

        let mut dw2 = ContainerWriter::new(Cursor::new(Vec::new()));
        pack(&mut dw2, &unpacked).unwrap();
        let bytes2 = dw2.finalize(&PlainWordListCodec).unwrap().into_inner();

        let mut r2 = ContainerReader::new(Cursor::new(bytes2), &PlainWordListCodec).unwrap();
        assert!(r2.words.contains(&"apple".to_string()));
        let content = r2.open_dicthtml("ap.html").unwrap();
        assert_eq!(content, b"<html><w>apple</w></html>");
    }

    #[test]
    fn unpack_refuses_existing_dir() {
        let mut dw = ContainerWriter::new(Cursor::new(Vec::new()));
        let bytes = dw.finalize(&PlainWordListCodec).unwrap().into_inner();
        let mut r = ContainerReader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();

        let dir = tempdir();
        unpack(&mut r, &dir.path().join("out")).unwrap();

        let mut dw2 = ContainerWriter::new(Cursor::new(Vec::new()));
        let bytes2 = dw2.finalize(&PlainWordListCodec).unwrap().into_inner();
        let mut r2 = ContainerReader::new(Cursor::new(bytes2), &PlainWordListCodec).unwrap();
        assert!(unpack(&mut r2, &dir.path().join("out")).is_err());
    }

    #[test]
    fn pack_refuses_dir_without_words_file() {
        let dir = tempdir();
        let mut dw = ContainerWriter::new(Cursor::new(Vec::new()));
        assert!(pack(&mut dw, dir.path()).is_err());
    }

    #[test]
    fn pack_refuses_subdirectories() {
        let dir = tempdir();
        fs::write(dir.path().join("words"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut dw = ContainerWriter::new(Cursor::new(Vec::new()));
        assert!(pack(&mut dw, dir.path()).is_err());
    }

    #[test]
    fn pack_refuses_already_gzipped_html() {
        let dir = tempdir();
        fs::write(dir.path().join("words"), "").unwrap();
        fs::write(dir.path().join("ap.html"), [0x1fu8, 0x8b, 0, 0]).unwrap();
        let mut dw = ContainerWriter::new(Cursor::new(Vec::new()));
        assert!(pack(&mut dw, dir.path()).is_err());
    }
}
