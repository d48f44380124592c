//! Decompiling shards produced by other dictzip generators, not just our
//! own emitter.

use kobo_dictzip::decompile::decompile;

#[test]
fn recognizes_a_penelope_style_entry() {
    let shard = br#"<html><w><a name="cat"/><div><b>cat</b><br/>a small domesticated feline</div></w></html>"#.to_vec();

    let df = decompile(&[shard]).unwrap();
    assert_eq!(df.len(), 1);
    assert_eq!(df[0].headword, "cat");
    assert!(df[0].raw_html);
    assert!(df[0].definition.contains("small domesticated feline"));
}

#[test]
fn recognizes_a_kobo_french_style_entry_with_header_info() {
    let shard = br#"<html><w><p><a name="chat" /><b>chat</b> nom masculin<br/><br/>un petit animal domestique</p></w></html>"#.to_vec();

    let df = decompile(&[shard]).unwrap();
    assert_eq!(df.len(), 1);
    assert_eq!(df[0].headword, "chat");
    assert_eq!(df[0].header_info, "nom masculin");
    assert!(df[0].definition.contains("petit animal domestique"));
}

#[test]
fn falls_back_to_generic_extraction_when_no_recognizer_matches() {
    let shard = br#"<html><w><a name="dog"/>some completely unstructured content</w></html>"#.to_vec();

    let df = decompile(&[shard]).unwrap();
    assert_eq!(df.len(), 1);
    assert_eq!(df[0].headword, "dog");
    assert!(df[0].no_header);
    assert!(df[0].definition.contains("unstructured content"));
}

#[test]
fn multiple_shards_are_concatenated_in_order() {
    let shard_a = br#"<html><w><a name="dog"/>canine</w></html>"#.to_vec();
    let shard_b = br#"<html><w><a name="fish"/>aquatic</w></html>"#.to_vec();

    let df = decompile(&[shard_a, shard_b]).unwrap();
    assert_eq!(df.len(), 2);
    assert_eq!(df[0].headword, "dog");
    assert_eq!(df[1].headword, "fish");
}
