pub(crate) mod bytes;
mod hexdump;

pub use self::hexdump::dump_hex;
