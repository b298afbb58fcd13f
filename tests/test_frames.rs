mod fixtures;

use fixtures::*;

use pretty_assertions::assert_eq;
use sizeprefix::err::DeserializationError;
use sizeprefix::{
    FrameIter, FrameReader, FrameSummary, ReaderSettings, get_size_prefix, remove_size_prefix,
    size_prefixed_payload,
};
use std::io::Cursor;

#[test]
fn test_walks_stream_with_raw_accessors() {
    ensure_env_logger_initialized();
    let buf = regular_stream();

    let mut offset = 0;
    let mut payloads = vec![];
    while offset < buf.len() {
        let size = get_size_prefix(&buf, offset).unwrap() as usize;
        let (same, payload_offset) = remove_size_prefix(&buf, offset);
        payloads.push(&same[payload_offset..payload_offset + size]);
        offset = payload_offset + size;
    }

    assert_eq!(payloads, vec![&b"hello"[..], &b""[..], &b"world!"[..]]);
}

#[test]
fn test_payload_accessor_at_inner_offset() {
    let buf = regular_stream();
    assert_eq!(size_prefixed_payload(&buf, 13).unwrap(), b"world!");
    assert_eq!(size_prefixed_payload(&buf, 9).unwrap(), b"");
}

#[test]
fn test_slice_and_stream_iteration_agree() {
    ensure_env_logger_initialized();
    let buf = regular_stream();

    let from_slice: Vec<FrameSummary> = FrameIter::new(&buf, ReaderSettings::new())
        .map(|f| f.unwrap().summary())
        .collect();
    let from_stream: Vec<FrameSummary> = FrameReader::new(Cursor::new(buf), ReaderSettings::new())
        .map(|f| f.unwrap().summary())
        .collect();

    assert_eq!(from_slice, from_stream);
    assert_eq!(
        from_slice.iter().map(|s| s.offset).collect::<Vec<_>>(),
        vec![0, 9, 13]
    );
}

#[test]
fn test_truncated_stream_yields_frames_then_one_error() {
    ensure_env_logger_initialized();
    let results: Vec<_> =
        FrameReader::new(Cursor::new(truncated_stream()), ReaderSettings::new()).collect();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().payload, b"ok".to_vec());

    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.offset(), 6);
    assert!(matches!(
        err,
        DeserializationError::SizePrefixOutOfBounds {
            size: 100,
            available: 10,
            ..
        }
    ));
}

#[test]
fn test_summary_serializes_to_json() {
    let buf = regular_stream();
    let summary = FrameIter::new(&buf, ReaderSettings::new())
        .nth(2)
        .unwrap()
        .unwrap()
        .summary();

    insta::assert_json_snapshot!(summary, @r###"
    {
      "index": 2,
      "offset": 13,
      "size": 6,
      "payload_offset": 17
    }
    "###);
}
