#![deny(unused_must_use)]
#![forbid(unsafe_code)]
// Don't allow dbg! prints in release.
#![cfg_attr(not(debug_assertions), deny(clippy::dbg_macro))]

pub use frames::{Frame, FrameIter, FrameReader, FrameRef, FrameSummary};
pub use settings::{DEFAULT_MAX_FRAME_SIZE, ReaderSettings};
pub use size_prefix::{
    SIZE_PREFIX_LENGTH, get_size_prefix, get_size_prefix_u32, prepend_size_prefix,
    remove_size_prefix, size_prefixed_payload, write_size_prefixed,
};
pub use utils::dump_hex;

pub mod err;
pub mod frames;
pub mod settings;
pub mod size_prefix;

mod utils;
