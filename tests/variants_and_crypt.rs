//! Cross-prefix variant duplication and encrypted-archive fidelity.

use std::io::Cursor;

use kobo_dictzip::container::Reader as ContainerReader;
use kobo_dictzip::crypt::AesCrypter;
use kobo_dictzip::dictfile::Entry;
use kobo_dictzip::pipeline::{build_dictzip, ImagePolicy};
use kobo_dictzip::trie::PlainWordListCodec;

fn entry(headword: &str, variants: &[&str], definition: &str) -> Entry {
    Entry {
        headword: headword.into(),
        variants: variants.iter().map(|s| s.to_string()).collect(),
        definition: definition.into(),
        ..Entry::default()
    }
}

#[test]
fn a_variant_in_another_prefix_duplicates_the_entry_into_both_shards() {
    // "apple" shards under "ap"; its variant "zest" shards under "ze".
    let df = vec![entry("apple", &["zest"], "a fruit")];

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
    assert!(names.contains(&"ap.html".to_string()));
    assert!(names.contains(&"ze.html".to_string()));

    let ap = String::from_utf8(r.open_dicthtml("ap.html").unwrap()).unwrap();
    let ze = String::from_utf8(r.open_dicthtml("ze.html").unwrap()).unwrap();
    assert!(ap.contains("apple") && ap.contains("zest"));
    assert!(ze.contains("apple") && ze.contains("zest"));
}

#[test]
fn a_variant_sharing_its_headwords_prefix_is_not_duplicated() {
    // "apple" and its variant "apply" both shard under "ap".
    let df = vec![entry("apple", &["apply"], "a fruit")];

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

    let r = ContainerReader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
    assert_eq!(r.dicthtml.len(), 1);
    assert_eq!(r.dicthtml[0].name, "ap.html");
}

#[test]
fn encrypted_dictzip_requires_the_right_key_to_read() {
    let df = vec![entry("secret", &[], "classified")];
    let key = vec![0x42u8; 32];

    let bytes = build_dictzip(
        &df,
        Cursor::new(Vec::new()),
        &PlainWordListCodec,
        Some(Box::new(AesCrypter::new(&key).unwrap())),
        ImagePolicy::None,
        false,
    )
    .unwrap()
    .into_inner();

    // Without a decrypter, the shard looks corrupt (no gzip magic).
    let mut r_nodecrypt = ContainerReader::new(Cursor::new(bytes.clone()), &PlainWordListCodec).unwrap();
    assert!(r_nodecrypt.open_dicthtml("se.html").is_err());

    // With the wrong key, decryption "succeeds" but yields garbage.
    let mut r_wrongkey = ContainerReader::new(Cursor::new(bytes.clone()), &PlainWordListCodec).unwrap();
    r_wrongkey.set_decrypter(Box::new(AesCrypter::new(&[0x99u8; 32]).unwrap()));
    assert!(r_wrongkey.open_dicthtml("se.html").is_err());

    // With the right key, the content comes back intact.
    let mut r = ContainerReader::new(Cursor::new(bytes), &PlainWordListCodec).unwrap();
    r.set_decrypter(Box::new(AesCrypter::new(&key).unwrap()));
    let html = String::from_utf8(r.open_dicthtml("se.html").unwrap()).unwrap();
    assert!(html.contains("secret"));
    assert!(html.contains("classified"));
}
