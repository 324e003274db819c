//! Container format handling
//!
//! Clips enter and leave the filter host as YUV4MPEG2 streams.

pub mod y4m;

pub use self::y4m::{read_clip, Y4mReader, Y4mWriter};
