//! Image transform pipeline: rewrites `<img src="...">` references in a
//! rendered shard according to a pluggable [`ImageHandler`] policy.
//!
//! Grounded in `examples/original_source/dictgen/image.go`. The three
//! handlers there (remove / embed / base64-inline) map onto
//! [`RemoveHandler`], [`EmbedHandler`], and [`Base64Handler`]. The Go
//! version uses `github.com/disintegration/imaging`; this port uses the
//! `image` crate (already in the corpus's ecosystem) for decode, resize,
//! and grayscale, matching the same Lanczos3-resize + grayscale + JPEG
//! pipeline.

use std::io::{Seek, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use sha1::{Digest, Sha1};

use crate::container::Writer as ContainerWriter;
use crate::error::{ImageError, Result};

lazy_static! {
    static ref IMG_TAG_RE: Regex =
        Regex::new(r#"(<img)(\s+(?:[^>]*\s+)?src\s*=\s*['"]+)([^'"]+)(['"][^>]*>)"#).unwrap();
}

/// The subset of [`ContainerWriter`] the image handlers need: adding a raw
/// resource file and checking whether one was already added.
pub trait ResourceSink {
    fn create_file(&mut self, filename: &str, data: &[u8]) -> Result<()>;
    fn exists(&self, name: &str) -> bool;
}

impl<W: Write + Seek> ResourceSink for ContainerWriter<W> {
    fn create_file(&mut self, filename: &str, data: &[u8]) -> Result<()> {
        ContainerWriter::create_file(self, filename, data)
    }

    fn exists(&self, name: &str) -> bool {
        ContainerWriter::exists(self, name)
    }
}

/// The outcome of transforming one image reference.
#[derive(Debug)]
pub struct Transformed {
    /// New `src` attribute value. An empty string means: drop the `<img>`
    /// tag entirely.
    pub src: String,
    /// Extra inline CSS to add to the tag's `style` attribute, if any.
    pub css: String,
}

/// Transforms images referenced in a shard's HTML.
pub trait ImageHandler {
    fn transform(&self, src: &str, data: &[u8], sink: &mut dyn ResourceSink) -> Result<Transformed>;
}

/// Drops every `<img>` tag.
pub struct RemoveHandler;

impl ImageHandler for RemoveHandler {
    fn transform(&self, _src: &str, _data: &[u8], _sink: &mut dyn ResourceSink) -> Result<Transformed> {
        Ok(Transformed {
            src: String::new(),
            css: String::new(),
        })
    }
}

/// Embeds the image unmodified as a raw container resource, named by the
/// SHA1 of its source path so repeated references to the same image dedupe.
///
/// Only `.jpg` and `.gif` are accepted, matching what Kobo firmware expects.
pub struct EmbedHandler;

impl ImageHandler for EmbedHandler {
    fn transform(&self, src: &str, data: &[u8], sink: &mut dyn ResourceSink) -> Result<Transformed> {
        let ext = if src.ends_with(".jpg") {
            ".jpg"
        } else if src.ends_with(".gif") {
            ".gif"
        } else {
            return Err(ImageError::UnsupportedEmbedExtension(src.to_string()).into());
        };

        let digest = Sha1::digest(src.as_bytes());
        let filename = format!("{}{}", hex::encode(digest), ext);
        if !sink.exists(&filename) {
            sink.create_file(&filename, data)?;
        }

        Ok(Transformed {
            src: format!("dict:///{}", filename),
            css: String::new(),
        })
    }
}

/// Resizes, optionally grayscales, and inlines the image as a base64 JPEG
/// data URL. The most compatible option at the cost of space.
pub struct Base64Handler {
    pub max_width: u32,
    pub max_height: u32,
    pub grayscale: bool,
    pub jpeg_quality: u8,
}

impl Default for Base64Handler {
    fn default() -> Self {
        Base64Handler {
            max_width: 1000,
            max_height: 1000,
            grayscale: true,
            jpeg_quality: 60,
        }
    }
}

impl ImageHandler for Base64Handler {
    fn transform(&self, src: &str, data: &[u8], _sink: &mut dyn ResourceSink) -> Result<Transformed> {
        let img = image::load_from_memory(data)
            .map_err(|e| ImageError::Decode(src.to_string(), e))?;

        let (ow, oh) = (img.width() as f64, img.height() as f64);
        let scale = (self.max_width as f64 / ow).min(self.max_height as f64 / oh);
        let (nw, nh) = ((ow * scale) as u32, (oh * scale) as u32);
        let mut img = img.resize_exact(nw.max(1), nh.max(1), FilterType::Lanczos3);

        if self.grayscale {
            img = image::DynamicImage::ImageLuma8(img.to_luma8());
        }

        let mut jpeg_bytes = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, self.jpeg_quality);
        encoder
            .encode_image(&img)
            .map_err(|e| ImageError::Encode(src.to_string(), e))?;

        let css = format!(
            "width:{}px;height:{}px;max-width:100%;margin:1em auto;page-break-before:auto;object-fit:scale-down;object-position:center",
            img.width(),
            img.height()
        );

        Ok(Transformed {
            src: format!("data:image/jpeg;base64,{}", BASE64.encode(&jpeg_bytes)),
            css,
        })
    }
}

/// Rewrites every non-data-URL `<img>` tag in `html` using `handler`,
/// resolving each referenced path through `open_image`.
pub fn transform_html_images(
    html: &[u8],
    handler: &dyn ImageHandler,
    sink: &mut dyn ResourceSink,
    mut open_image: impl FnMut(&str) -> Result<Vec<u8>>,
) -> Result<Vec<u8>> {
    let mut out = html.to_vec();

    for m in IMG_TAG_RE.captures_iter(html) {
        let whole = m.get(0).unwrap().as_bytes();
        let prefix = m.get(1).unwrap().as_bytes();
        let attrs_between = m.get(2).unwrap().as_bytes();
        let src = m.get(3).unwrap().as_bytes();
        let suffix = m.get(4).unwrap().as_bytes();

        if src.starts_with(b"data:") {
            continue;
        }
        let src_str = String::from_utf8_lossy(src).to_string();

        let data = open_image(&src_str)?;
        let transformed = handler.transform(&src_str, &data, sink)?;

        let replacement: Vec<u8> = if transformed.src.is_empty() {
            Vec::new()
        } else {
            let mut r = Vec::new();
            r.extend_from_slice(prefix);
            if !transformed.css.is_empty() {
                r.extend_from_slice(format!(" style=\"{}\"", transformed.css).as_bytes());
            }
            r.extend_from_slice(attrs_between);
            r.extend_from_slice(transformed.src.as_bytes());
            r.extend_from_slice(suffix);
            r
        };

        out = replace_first(&out, whole, &replacement);
    }

    Ok(out)
}

fn replace_first(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if let Some(pos) = find_subslice(haystack, needle) {
        let mut out = Vec::with_capacity(haystack.len() - needle.len() + replacement.len());
        out.extend_from_slice(&haystack[..pos]);
        out.extend_from_slice(replacement);
        out.extend_from_slice(&haystack[pos + needle.len()..]);
        out
    } else {
        haystack.to_vec()
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len().max(1))
        .position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeSink {
        created: HashSet<String>,
    }

    impl ResourceSink for FakeSink {
        fn create_file(&mut self, filename: &str, _data: &[u8]) -> Result<()> {
            self.created.insert(filename.to_string());
            Ok(())
        }

        fn exists(&self, name: &str) -> bool {
            self.created.contains(name)
        }
    }

    #[test]
    fn remove_handler_drops_img_tag() {
        let html = br#"<p><img src="foo.jpg"> text</p>"#;
        let mut sink = FakeSink { created: HashSet::new() };
        let out = transform_html_images(html, &RemoveHandler, &mut sink, |_| Ok(vec![1, 2, 3])).unwrap();
        assert_eq!(out, b"<p> text</p>");
    }

    #[test]
    fn data_url_images_are_left_alone() {
        let html = br#"<img src="data:image/png;base64,AAAA">"#;
        let mut sink = FakeSink { created: HashSet::new() };
        let out = transform_html_images(html, &RemoveHandler, &mut sink, |_| {
            panic!("should not be called for data: urls")
        })
        .unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn embed_handler_rejects_unsupported_extension() {
        let mut sink = FakeSink { created: HashSet::new() };
        let err = EmbedHandler.transform("foo.png", &[1, 2, 3], &mut sink).unwrap_err();
        assert!(format!("{}", err).contains("unsupported image file"));
    }

    #[test]
    fn embed_handler_rewrites_src_and_dedupes() {
        let html = br#"<img src="foo.jpg"><img src="foo.jpg">"#;
        let mut sink = FakeSink { created: HashSet::new() };
        let out = transform_html_images(html, &EmbedHandler, &mut sink, |_| Ok(vec![0xff, 0xd8])).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("dict:///"));
        assert_eq!(sink.created.len(), 1);
    }

    #[test]
    fn embed_handler_accepts_gif() {
        let mut sink = FakeSink { created: HashSet::new() };
        let t = EmbedHandler.transform("a.gif", b"GIF89a", &mut sink).unwrap();
        assert!(t.src.ends_with(".gif") == false); // src is "dict:///<hex>.gif"
        assert!(t.src.contains(".gif"));
    }
}
