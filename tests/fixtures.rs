#![allow(dead_code)]
use sizeprefix::write_size_prefixed;
use std::path::{Path, PathBuf};
use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .is_test(true)
            .init();
    });
}

pub fn frame_stream(payloads: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for payload in payloads {
        write_size_prefixed(&mut out, payload).unwrap();
    }
    out
}

/// Three frames: `hello` (offset 0), an empty frame (offset 9) and `world!` (offset 13).
pub fn regular_stream() -> Vec<u8> {
    frame_stream(&[b"hello", b"", b"world!"])
}

/// A valid frame followed by a prefix that claims more bytes than remain.
pub fn truncated_stream() -> Vec<u8> {
    let mut out = frame_stream(&[b"ok"]);
    out.extend_from_slice(&100_i32.to_le_bytes());
    out.extend_from_slice(b"not enough");
    out
}

pub fn write_sample(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
