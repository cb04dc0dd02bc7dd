#![forbid(unsafe_code)]

//! Pack and unpack Game Baker savefiles: a marker byte, length-prefixed
//! name/payload records, a `0xDEADBEEF` terminator and zero padding to
//! 256 KiB blocks.

pub mod save;
