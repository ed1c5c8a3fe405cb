use std::collections::BTreeMap;

use crate::*;

// ============================================================================
//  SCALARS
// ============================================================================

#[test]
fn test_scalars_in_list() -> Result<()> {
    let mut enc = Encoder::new();
    enc.list_begin()?;
    enc.null()?;
    enc.bool(true)?;
    enc.bool(false)?;
    enc.int(i64::MIN)?;
    enc.float(2.5)?;
    enc.str("domain-🦀")?;
    enc.bytes(&[0, 1, 2])?;
    enc.list_end()?;

    let bytes = enc.into_bytes()?;
    let mut dec = Decoder::new(&bytes);
    let mut items = dec.list()?;

    items.next().unwrap()?.null()?;
    assert!(items.next().unwrap()?.bool()?);
    assert!(!items.next().unwrap()?.bool()?);
    assert_eq!(items.next().unwrap()?.int()?, i64::MIN);
    assert_eq!(items.next().unwrap()?.float()?, 2.5);
    assert_eq!(items.next().unwrap()?.str()?, "domain-🦀");
    assert_eq!(items.next().unwrap()?.bytes()?, &[0, 1, 2]);
    assert!(items.next().is_none());
    assert_eq!(dec.remaining(), 0);
    Ok(())
}

#[test]
fn test_fields_keep_write_order() -> Result<()> {
    let mut enc = Encoder::new();
    enc.map_begin()?;
    for (name, v) in [("zeta", 1), ("alpha", 2), ("mid", 3)] {
        enc.field_begin(name)?;
        enc.int(v)?;
        enc.field_end()?;
    }
    enc.map_end()?;

    let bytes = enc.into_bytes()?;
    let mut dec = Decoder::new(&bytes);
    let names: Vec<&str> = dec.map()?
        .map(|f| f.map(|(name, _)| name))
        .collect::<Result<_>>()?;
    assert_eq!(names, ["zeta", "alpha", "mid"]);
    Ok(())
}

#[test]
fn test_nested_map_in_field() -> Result<()> {
    let mut enc = Encoder::new();
    enc.map_begin()?;
    enc.field_begin("StateChangeReason")?;
    enc.map_begin()?;
    enc.field_begin("Code")?;
    enc.str("NONE")?;
    enc.field_end()?;
    enc.map_end()?;
    enc.field_end()?;
    enc.map_end()?;
    assert_eq!(enc.depth(), 0);

    let doc = Document::decode(&enc.into_bytes()?)?;
    let code = doc.get("StateChangeReason").and_then(|r| r.get("Code"));
    assert_eq!(code.and_then(Document::as_str), Some("NONE"));
    Ok(())
}

// ============================================================================
//  ENCODER STRICTNESS
// ============================================================================

#[test]
fn test_map_rejects_bare_scalar() {
    let mut enc = Encoder::new();
    enc.map_begin().unwrap();
    assert_eq!(enc.int(10), Err(Error::InvalidMapEntry));
    assert_eq!(enc.list_begin(), Err(Error::InvalidMapEntry));
}

#[test]
fn test_field_rejects_second_value() {
    let mut enc = Encoder::new();
    enc.field_begin("V").unwrap();
    enc.int(1).unwrap();
    assert_eq!(enc.int(2), Err(Error::TooManyItems));
}

#[test]
fn test_field_rejects_empty_close() {
    let mut enc = Encoder::new();
    enc.field_begin("projectId").unwrap();
    // the name is metadata, not the value
    assert_eq!(enc.field_end(), Err(Error::EmptyField("projectId".into())));
}

#[test]
fn test_scope_mismatch() {
    let mut enc = Encoder::new();
    enc.list_begin().unwrap();
    assert_eq!(enc.map_end(), Err(Error::ScopeMismatch { expected: Scope::Map, actual: Scope::List }));
}

#[test]
fn test_scope_underflow() {
    let mut enc = Encoder::new();
    assert_eq!(enc.list_end(), Err(Error::ScopeUnderflow));
}

#[test]
fn test_scope_still_open() {
    let mut enc = Encoder::new();
    enc.map_begin().unwrap();
    assert_eq!(enc.into_bytes().err(), Some(Error::ScopeStillOpen));
}

// ============================================================================
//  DECODER FAILURE MODES
// ============================================================================

#[test]
fn test_truncated_length() {
    let data = [0x10, 0x01];
    assert_eq!(Decoder::new(&data).str(), Err(Error::UnexpectedEnd));
}

#[test]
fn test_truncated_body() {
    let mut data = vec![0x10];
    data.extend_from_slice(&100u32.to_le_bytes());
    data.push(b'a');
    assert_eq!(Decoder::new(&data).str(), Err(Error::UnexpectedEnd));
}

#[test]
fn test_invalid_utf8() {
    let mut enc = Encoder::new();
    enc.bytes(&[0xFF, 0xFE]).unwrap();
    let mut raw = enc.into_bytes().unwrap();
    raw[0] = Tag::String as u8;
    assert_eq!(Decoder::new(&raw).str(), Err(Error::InvalidUtf8));
}

#[test]
fn test_invalid_tag() {
    let data = [0xFF];
    assert_eq!(Decoder::new(&data).peek_tag(), Err(Error::InvalidTag(0xFF)));
}

#[test]
fn test_wrong_tag_reports_both() {
    let mut enc = Encoder::new();
    enc.int(3).unwrap();
    let raw = enc.into_bytes().unwrap();
    assert_eq!(
        Decoder::new(&raw).str(),
        Err(Error::UnexpectedTag { expected: Tag::String, found: Tag::Int })
    );
}

#[test]
fn test_map_with_non_field_entry() {
    let mut enc = Encoder::new();
    enc.list_begin().unwrap();
    enc.int(10).unwrap();
    enc.list_end().unwrap();
    let mut raw = enc.into_bytes().unwrap();
    raw[0] = Tag::Map as u8;

    let mut dec = Decoder::new(&raw);
    let mut fields = dec.map().unwrap();
    assert!(matches!(fields.next(), Some(Err(Error::UnexpectedTag { .. }))));
    assert!(fields.next().is_none());
}

#[test]
fn test_item_decoders_are_bounded() -> Result<()> {
    let mut enc = Encoder::new();
    enc.list_begin()?;
    enc.int(10)?;
    enc.int(11)?;
    enc.list_end()?;

    let bytes = enc.into_bytes()?;
    let mut dec = Decoder::new(&bytes);
    let mut item = dec.list()?.next().unwrap()?;
    assert_eq!(item.int()?, 10);
    assert_eq!(item.int(), Err(Error::UnexpectedEnd));
    Ok(())
}

// ============================================================================
//  DOCUMENT
// ============================================================================

#[test]
fn test_document_roundtrip() -> Result<()> {
    let mut inner = BTreeMap::new();
    inner.insert("name".to_string(), Document::String("orders".into()));
    inner.insert("retentionDays".to_string(), Document::Int(30));
    inner.insert("description".to_string(), Document::Null);

    let doc = Document::Map(BTreeMap::from([
        ("domainInfos".to_string(), Document::List(vec![Document::Map(inner)])),
        ("truncated".to_string(), Document::Bool(false)),
    ]));

    let decoded = Document::decode(&doc.to_bytes()?)?;
    assert_eq!(decoded, doc);
    Ok(())
}

#[test]
fn test_document_rejects_duplicate_fields() -> Result<()> {
    let mut enc = Encoder::new();
    enc.map_begin()?;
    for _ in 0..2 {
        enc.field_begin("name")?;
        enc.str("x")?;
        enc.field_end()?;
    }
    enc.map_end()?;

    let bytes = enc.into_bytes()?;
    assert_eq!(Document::decode(&bytes), Err(Error::DuplicateField("name".into())));
    Ok(())
}

#[test]
fn test_document_depth_limit() -> Result<()> {
    let mut enc = Encoder::new();
    for _ in 0..=MAX_DEPTH + 1 {
        enc.list_begin()?;
    }
    for _ in 0..=MAX_DEPTH + 1 {
        enc.list_end()?;
    }
    let bytes = enc.into_bytes()?;
    assert_eq!(Document::decode(&bytes), Err(Error::TooDeep));
    Ok(())
}

#[test]
fn test_document_trailing_bytes() -> Result<()> {
    let mut enc = Encoder::new();
    enc.int(1)?;
    enc.int(2)?;
    let bytes = enc.into_bytes()?;
    assert_eq!(Document::decode(&bytes), Err(Error::TrailingBytes(9)));
    Ok(())
}
