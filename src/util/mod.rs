//! Common utilities and data structures

pub mod buffer;
pub mod pixfmt;
pub mod rational;
pub mod timestamp;

pub use buffer::{Buffer, BufferRef};
pub use pixfmt::{ColorFamily, PixelFormat, SampleType};
pub use rational::Rational;
pub use timestamp::Timestamp;
