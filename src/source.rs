#![forbid(unsafe_code)]

//! Structural scanning of spec source files

mod line_resolver;

pub use line_resolver::resolve_line;
