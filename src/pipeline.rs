//! Pipeline driver: orchestrates parse → validate → shard → render →
//! image-transform → container-write in the order the original does.
//!
//! Grounded in `examples/original_source/dictgen/dictgen.go`'s
//! `WriteDictzip`.

use std::io::{Seek, Write};

use crate::container::Writer as ContainerWriter;
use crate::crypt::Crypter;
use crate::dictfile::DictFile;
use crate::emitter::write_shard_html;
use crate::error::Result;
use crate::image::{transform_html_images, ImageHandler, ResourceSink};
use crate::shard;
use crate::trie::TrieCodec;
use crate::validate::validate;

/// The literal span injected at the end of every entry's rendered content
/// when `write_dictzip`'s `remove_footer` option is set; hides a
/// device-specific footer the reader appends after the dictionary's own
/// content, by toggling its whole subtree's display off via CSS.
const FOOTER_SUPPRESSION_SPAN: &str =
    "<span class=\"end\"><style>.end,.end+*{display: none !important;}</style></span>";

/// Image handling strategy for a build, mirroring the three original
/// `ImageHandler` implementations plus an opt-out.
#[derive(Clone, Copy)]
pub enum ImagePolicy<'a> {
    /// Skip image transformation entirely; `<img>` tags are left as-is.
    None,
    Handled(&'a dyn ImageHandler, &'a dyn Fn(&str) -> Result<Vec<u8>>),
}

/// Builds a dictzip from `df` into `dw`, in the same order as the original:
/// the combined entry set is validated once up front (so an invalid entry
/// anywhere aborts before any shard is rendered or written), then shards are
/// written in sorted prefix order, each shard's words added to the index
/// before its dicthtml entry is created.
///
/// When `remove_footer` is set, every entry gets the footer-suppression
/// span appended to its rendered content, hiding the reader's own
/// end-of-dictionary footer.
pub fn write_dictzip<W: Write + Seek>(
    df: &DictFile,
    dw: &mut ContainerWriter<W>,
    images: ImagePolicy,
    remove_footer: bool,
) -> Result<()> {
    validate(df)?;

    let mut df = df.clone();
    if remove_footer {
        for e in &mut df {
            e.post_raw_html = FOOTER_SUPPRESSION_SPAN.to_string();
        }
    }

    let plan = shard::plan(&df);

    for (prefix, shard_entries) in &plan {
        for e in shard_entries {
            dw.add_word(&e.headword)?;
            for v in &e.variants {
                dw.add_word(v)?;
            }
        }

        let html = write_shard_html(shard_entries)?;
        let html = match images {
            ImagePolicy::None => html.into_bytes(),
            ImagePolicy::Handled(handler, open_image) => {
                transform_html_images(html.as_bytes(), handler, dw as &mut dyn ResourceSink, |src| {
                    open_image(src)
                })?
            }
        };

        dw.create_dicthtml(prefix, &html)?;
    }

    Ok(())
}

/// Convenience wrapper: builds a complete dictzip from `df` into `w`,
/// optionally encrypting dicthtml entries, and returns the finished writer.
pub fn build_dictzip<W: Write + Seek>(
    df: &DictFile,
    w: W,
    trie: &dyn TrieCodec,
    encrypter: Option<Box<dyn Crypter>>,
    images: ImagePolicy,
    remove_footer: bool,
) -> Result<W> {
    let mut dw = ContainerWriter::new(w);
    if let Some(c) = encrypter {
        dw.set_encrypter(c);
    }
    write_dictzip(df, &mut dw, images, remove_footer)?;
    dw.finalize(trie)
}
