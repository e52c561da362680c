#![forbid(unsafe_code)]

//! The run configuration assembled from command-line options
//!
//! A [`RunConfiguration`] starts out with defaults and is mutated by option
//! callbacks while the argument vector is dispatched. The resolution driver
//! then validates it and hands it to the caller.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Glob used to pick spec files out of directories when `--pattern` is absent
pub const DEFAULT_PATTERN: &str = "**/*_spec.rb";

/// Which examples a run should execute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExampleFilter {
    /// Every example is selected
    #[default]
    All,
    /// Examples matching any of these names
    Names { names: Vec<String> },
    /// Names read from a file (one per line), typically written by a
    /// `failing_examples` formatter on a previous run
    FromFile { path: PathBuf, names: Vec<String> },
}

impl ExampleFilter {
    /// Filter selecting a single example or group by name
    pub fn named(name: impl Into<String>) -> Self {
        ExampleFilter::Names {
            names: vec![name.into()],
        }
    }

    /// Interprets an `--example` argument
    ///
    /// An existing file supplies one name per non-blank line; an empty file
    /// selects everything. Any other argument is taken as a name.
    pub fn from_arg(arg: &str) -> io::Result<Self> {
        let path = Path::new(arg);
        if !path.is_file() {
            return Ok(ExampleFilter::named(arg));
        }

        let names: Vec<String> = fs::read_to_string(path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        if names.is_empty() {
            Ok(ExampleFilter::All)
        } else {
            Ok(ExampleFilter::FromFile {
                path: path.to_path_buf(),
                names,
            })
        }
    }

    /// Returns true if some subset of examples has been selected
    pub fn is_set(&self) -> bool {
        !matches!(self, ExampleFilter::All)
    }

    /// The selected names; empty when everything runs
    pub fn names(&self) -> &[String] {
        match self {
            ExampleFilter::All => &[],
            ExampleFilter::Names { names } | ExampleFilter::FromFile { names, .. } => names,
        }
    }
}

/// Output formats understood by the runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterKind {
    Silent,
    Progress,
    Profile,
    Specdoc,
    Nested,
    Html,
    FailingExamples,
    FailingExampleGroups,
    /// A formatter the runner loads by name (usually together with `--require`)
    Custom(String),
}

impl FormatterKind {
    /// Maps a format name or its one-letter shorthand to a formatter
    pub fn from_name(name: &str) -> Self {
        match name {
            "silent" | "l" => FormatterKind::Silent,
            "progress" | "p" => FormatterKind::Progress,
            "profile" | "o" => FormatterKind::Profile,
            "specdoc" | "s" => FormatterKind::Specdoc,
            "nested" | "n" => FormatterKind::Nested,
            "html" | "h" => FormatterKind::Html,
            "failing_examples" | "e" => FormatterKind::FailingExamples,
            "failing_example_groups" | "g" => FormatterKind::FailingExampleGroups,
            other => FormatterKind::Custom(other.to_string()),
        }
    }

    /// Canonical long name
    pub fn as_str(&self) -> &str {
        match self {
            FormatterKind::Silent => "silent",
            FormatterKind::Progress => "progress",
            FormatterKind::Profile => "profile",
            FormatterKind::Specdoc => "specdoc",
            FormatterKind::Nested => "nested",
            FormatterKind::Html => "html",
            FormatterKind::FailingExamples => "failing_examples",
            FormatterKind::FailingExampleGroups => "failing_example_groups",
            FormatterKind::Custom(name) => name,
        }
    }
}

/// Where a formatter writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// The output stream the resolver was given
    #[default]
    Output,
    File(PathBuf),
}

/// One `--format FORMAT[:WHERE]` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatRequest {
    pub format: FormatterKind,
    pub destination: Destination,
}

impl FormatRequest {
    /// Parses `FORMAT[:WHERE]`, splitting on the first colon
    ///
    /// An empty or missing `WHERE` means the output stream.
    pub fn parse(spec: &str) -> Self {
        let (name, destination) = match spec.split_once(':') {
            Some((name, "")) => (name, Destination::Output),
            Some((name, path)) => (name, Destination::File(PathBuf::from(path))),
            None => (spec, Destination::Output),
        };

        FormatRequest {
            format: FormatterKind::from_name(name),
            destination,
        }
    }

    /// The formatter used when no `--format` option was given
    pub fn default_progress() -> Self {
        FormatRequest {
            format: FormatterKind::Progress,
            destination: Destination::Output,
        }
    }
}

/// How failed equality expectations are diffed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    #[default]
    Off,
    Unified,
    Context,
    /// A differ loaded by name
    Custom(String),
}

impl DiffMode {
    /// Interprets the optional `--diff` argument; no argument means unified
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("unified") | Some("u") => DiffMode::Unified,
            Some("context") | Some("c") => DiffMode::Context,
            Some(other) => DiffMode::Custom(other.to_string()),
        }
    }
}

/// Order in which spec files are loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrder {
    #[default]
    Alphabetical,
    /// Most recently modified first
    Mtime,
}

/// Fully resolved options for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfiguration {
    pub examples: ExampleFilter,
    pub line: Option<u32>,
    pub formats: Vec<FormatRequest>,
    pub diff: DiffMode,
    pub requires: Vec<String>,
    pub backtrace: bool,
    pub colour: bool,
    pub load_order: LoadOrder,
    pub reverse: bool,
    /// Per-example timeout in seconds
    pub timeout: Option<f64>,
    pub heckle: Option<String>,
    pub dry_run: bool,
    pub runner: Option<String>,
    pub patterns: Vec<String>,
    /// Residual positional arguments: files, directories and globs
    pub files: Vec<String>,
    #[serde(skip)]
    patterns_overridden: bool,
}

impl RunConfiguration {
    pub fn new() -> Self {
        RunConfiguration {
            examples: ExampleFilter::All,
            line: None,
            formats: Vec::new(),
            diff: DiffMode::Off,
            requires: Vec::new(),
            backtrace: false,
            colour: false,
            load_order: LoadOrder::Alphabetical,
            reverse: false,
            timeout: None,
            heckle: None,
            dry_run: false,
            runner: None,
            patterns: vec![DEFAULT_PATTERN.to_string()],
            files: Vec::new(),
            patterns_overridden: false,
        }
    }

    /// Adds the comma-separated patterns of one `--pattern` option
    ///
    /// The first explicit pattern replaces the default.
    pub fn add_patterns(&mut self, arg: &str) {
        if !self.patterns_overridden {
            self.patterns.clear();
            self.patterns_overridden = true;
        }
        self.patterns.extend(
            arg.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
        );
    }

    /// Falls back to a single progress formatter on the output stream
    pub fn ensure_format(&mut self) -> bool {
        if self.formats.is_empty() {
            self.formats.push(FormatRequest::default_progress());
            true
        } else {
            false
        }
    }
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
