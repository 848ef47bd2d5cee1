//! Output file handling

pub mod writer;

pub use writer::write_atomic;
