//! End-to-end: dictfile source -> dictzip -> container reader, and back out
//! through the decompiler.

use std::io::Cursor;

use kobo_dictzip::container::Reader as ContainerReader;
use kobo_dictzip::decompile::decompile;
use kobo_dictzip::dictfile::parse_dict_file;
use kobo_dictzip::pipeline::{build_dictzip, ImagePolicy};
use kobo_dictzip::trie::PlainWordListCodec;

const DICTFILE: &str = "\
@apple
:a fruit
a sweet fruit that grows on trees

@banana
&plantain
:another fruit
a long yellow fruit
";

#[test]
fn dictfile_builds_into_a_readable_dictzip() {
    let df = parse_dict_file(DICTFILE.as_bytes()).unwrap();
    assert_eq!(df.len(), 2);

    let bytes = build_dictzip(
        &df,
        Cursor::new(Vec::new()),
        &PlainWordListCodec,
        None,
        ImagePolicy::None,
        false,
    )
    .unwrap()
    .into_inner();

    let mut r = ContainerReader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
    assert!(r.words.contains(&"apple".to_string()));
    assert!(r.words.contains(&"banana".to_string()));
    assert!(r.words.contains(&"plantain".to_string()));

    let ap_html = String::from_utf8(r.open_dicthtml("ap.html").unwrap()).unwrap();
    assert!(ap_html.contains("apple"));
    assert!(ap_html.contains("a sweet fruit that grows on trees"));

    let ba_html = String::from_utf8(r.open_dicthtml("ba.html").unwrap()).unwrap();
    assert!(ba_html.contains("banana"));
}

#[test]
fn decompiling_a_built_dictzip_recovers_headwords() {
    let df = parse_dict_file(DICTFILE.as_bytes()).unwrap();
    let bytes = build_dictzip(
        &df,
        Cursor::new(Vec::new()),
        &PlainWordListCodec,
        None,
        ImagePolicy::None,
        false,
    )
    .unwrap()
    .into_inner();

    let mut r = ContainerReader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
    let names: Vec<String> = r.dicthtml.iter().map(|e| e.name.clone()).collect();
    let shards: Vec<Vec<u8>> = names.iter().map(|n| r.open_dicthtml(n).unwrap()).collect();

    let decompiled = decompile(&shards).unwrap();
    let headwords: Vec<&str> = decompiled.iter().map(|e| e.headword.as_str()).collect();
    assert!(headwords.contains(&"apple"));
    assert!(headwords.contains(&"banana"));
}
