//! Crate-wide error taxonomy.
//!
//! One variant family per component, matching the `fmt.Errorf("...: %w", err)`
//! wrapping chains of the original Go implementation. Every fallible
//! operation in this crate returns [`Result`].

use std::io;

pub type Result<T> = std::result::Result<T, DictzipError>;

#[derive(thiserror::Error, Debug)]
pub enum DictzipError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Decompile(#[from] DecompileError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Dictfile parsing errors, carrying the 1-based source line where possible.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("line {line}: empty headword after @")]
    EmptyHeadword { line: usize },

    #[error("line {line}: header info (: or ::) specified before word (@)")]
    HeaderBeforeWord { line: usize },

    #[error("line {line}: header info (: or ::) specified within definition content (prepend a space if this was intended to be part of the definition itself)")]
    HeaderAfterDefinition { line: usize },

    #[error("line {line}: multiple header infos (: or ::) specified in definition block")]
    MultipleHeaders { line: usize },

    #[error("line {line}: extra data after no header specified (::)")]
    ExtraDataAfterNoHeader { line: usize },

    #[error("line {line}: variant (&) specified before word (@)")]
    VariantBeforeWord { line: usize },

    #[error("line {line}: variant (&) specified within definition content (prepend a space if this was intended to be part of the definition itself)")]
    VariantAfterDefinition { line: usize },

    #[error("line {line}: no word after variant specifier (&)")]
    EmptyVariant { line: usize },

    #[error("line {line}: definition specified before word (@)")]
    DefinitionBeforeWord { line: usize },

    #[error("entry at line {line}: raw HTML definitions are specified with <html>, but SHOULD NOT be a full HTML document ending with </html>")]
    RawHtmlFullDocument { line: usize },

    #[error("entry at line {line}: <html> tag found outside of the leading raw-HTML sentinel")]
    StrayHtmlTag { line: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("entry {headword:?} (from line {line}): headword is empty after trimming")]
    EmptyHeadword { headword: String, line: usize },

    #[error("entry {headword:?} (from line {line}): variant {variant:?} is empty after trimming")]
    EmptyVariant {
        headword: String,
        variant: String,
        line: usize,
    },

    #[error("entry {headword:?} (from line {line}): field {field} contains forbidden substring {substring:?}")]
    ForbiddenSubstring {
        headword: String,
        line: usize,
        field: &'static str,
        substring: &'static str,
    },

    #[error("entry {headword:?} (from line {line}): field {field} contains a double quote")]
    DoubleQuote {
        headword: String,
        line: usize,
        field: &'static str,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ContainerError {
    #[error("not a dictzip: no words index found")]
    NoWordsIndex,

    #[error("invalid filename {0:?}: must not contain slashes")]
    FilenameContainsSlash(String),

    #[error("invalid filename: must not be the reserved name \"words\"")]
    ReservedFilename,

    #[error("duplicate entry name {0:?}")]
    DuplicateEntry(String),

    #[error("read zip: illegal file {0:?}: contains slash (not in root dir)")]
    IllegalFileName(String),

    #[error("corrupt or encrypted dicthtml {0:?}: invalid gzip header and no decrypter set")]
    NoDecrypter(String),

    #[error("corrupt dicthtml {0:?} or invalid encryption key: invalid header after decryption")]
    BadKeyOrCorrupt(String),

    #[error("dir {0:?} already exists")]
    DirAlreadyExists(String),

    #[error("dir {0:?} is not an unpacked dictzip (no words file)")]
    NotAnUnpackedDict(String),

    #[error("invalid dir entry {0:?}: subdirectories are not supported")]
    SubdirectoryNotSupported(String),

    #[error("invalid unpacked dicthtml file {0:?}: already gzip-framed")]
    AlreadyCompressed(String),
}

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("bad key size {0}: must be 16, 24, or 32 bytes")]
    BadKeySize(usize),

    #[error("data length {0} is empty or not a multiple of the block size (16)")]
    BadBlockAlignment(usize),

    #[error("invalid padding")]
    BadPadding,

    #[error("unknown encryption method {0:?}")]
    UnknownMethod(String),

    #[error("invalid crypter spec {0:?}: expected \"method:keyhex\"")]
    InvalidSpec(String),

    #[error("invalid crypter key hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    #[error("unsupported image file {0}: extension must be .jpg or .gif when embedding")]
    UnsupportedEmbedExtension(String),

    #[error("decode image {0}: {1}")]
    Decode(String, image::ImageError),

    #[error("encode image {0}: {1}")]
    Encode(String, image::ImageError),

    #[error("open image {0}: {1}")]
    Open(String, io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum DecompileError {
    #[error("shard {0:?}: missing <html> tag")]
    MissingHtmlStart(String),

    #[error("shard {0:?}: missing </html> tag")]
    MissingHtmlEnd(String),

    #[error("shard {0:?}: non-whitespace between word entries: {1:?}")]
    NonWhitespaceBetweenEntries(String, String),

    #[error("no headword found in entry body {0:?}")]
    NoHeadwordFound(String),
}
