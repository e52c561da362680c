//! Run configuration produced by option resolution

pub mod run_config;

pub use run_config::{
    DEFAULT_PATTERN, Destination, DiffMode, ExampleFilter, FormatRequest, FormatterKind,
    LoadOrder, RunConfiguration,
};
