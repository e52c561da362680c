#![forbid(unsafe_code)]

//! Turning an argument vector into a run configuration
//!
//! The [`Resolver`] parses the arguments, fires one callback per option in
//! command-line order, and validates the result. Three options leave the
//! normal flow: `--options` re-runs resolution on an expanded argument
//! vector, `--drb` hands the arguments to a remote runner, and `--help` /
//! `--version` stop once printed to a stream that may end the process.

use crate::cli::dispatch::{self, Occurrence, ParsedArgs, Value};
use crate::cli::grammar::{self, OptionName};
use crate::cli::options_file;
use crate::config::{DiffMode, ExampleFilter, FormatRequest, LoadOrder, RunConfiguration};
use crate::delegate::{RemoteError, RemoteRunner};
use crate::resolve::{ResolveError, Stream};
use crate::source::resolve_line;
use std::fs;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use termcolor::{Color, ColorSpec, WriteColor};
use tracing::{debug, info, warn};

/// How deeply options files may pull in further options files
pub const MAX_OPTIONS_DEPTH: usize = 8;

/// What resolution produced
#[derive(Debug)]
pub enum Outcome {
    /// Run locally with this configuration
    Run(Box<RunConfiguration>),
    /// An alternate path ran (remote hand-off, help or version); nothing is
    /// left to run here
    Transferred,
}

impl Outcome {
    pub fn into_configuration(self) -> Option<RunConfiguration> {
        match self {
            Outcome::Run(config) => Some(*config),
            Outcome::Transferred => None,
        }
    }

    pub fn is_transferred(&self) -> bool {
        matches!(self, Outcome::Transferred)
    }
}

type Step = ControlFlow<Outcome>;

/// Resolves argument vectors against injected streams and delegates
pub struct Resolver<'a> {
    err: Stream<'a>,
    out: Stream<'a>,
    remote: &'a mut dyn RemoteRunner,
}

impl<'a> Resolver<'a> {
    pub fn new(err: Stream<'a>, out: Stream<'a>, remote: &'a mut dyn RemoteRunner) -> Self {
        Resolver { err, out, remote }
    }

    /// Resolves `args` (without the program name)
    ///
    /// With `warn_if_no_files` set, an argument vector without files is
    /// reported; it is an error only when the error stream may end the
    /// process. Any error is written to the error stream before it is
    /// returned.
    pub fn resolve(
        &mut self,
        args: &[String],
        warn_if_no_files: bool,
    ) -> Result<Outcome, ResolveError> {
        let result = self.resolve_at(args, warn_if_no_files, 0);
        if let Err(error) = &result {
            self.report(error)?;
        }
        result
    }

    fn resolve_at(
        &mut self,
        args: &[String],
        warn_if_no_files: bool,
        depth: usize,
    ) -> Result<Outcome, ResolveError> {
        let parsed = dispatch::parse(args).map_err(|e| ResolveError::Usage {
            message: usage_message(&e),
        })?;

        let mut config = RunConfiguration::new();
        config.files = parsed.files.clone();

        for occurrence in &parsed.occurrences {
            if let ControlFlow::Break(outcome) =
                self.apply(occurrence, &mut config, args, &parsed, depth)?
            {
                return Ok(outcome);
            }
        }

        self.validate(config, warn_if_no_files)
    }

    /// Fires the callback for one option
    fn apply(
        &mut self,
        occurrence: &Occurrence,
        config: &mut RunConfiguration,
        args: &[String],
        parsed: &ParsedArgs,
        depth: usize,
    ) -> Result<Step, ResolveError> {
        let text = occurrence.value.as_ref().and_then(Value::as_text);

        match (occurrence.option.name, &occurrence.value) {
            (OptionName::Pattern, Some(Value::Text(patterns))) => config.add_patterns(patterns),
            (OptionName::Diff, _) => config.diff = DiffMode::from_arg(text),
            (OptionName::Colour, _) => config.colour = true,
            (OptionName::Example | OptionName::Specification, Some(Value::Text(example))) => {
                config.examples = ExampleFilter::from_arg(example)?;
                debug!(names = ?config.examples.names(), "selected examples");
            }
            // A bare --example leaves the selection alone
            (OptionName::Example | OptionName::Specification, None) => {}
            (OptionName::Line, Some(Value::Integer(line))) => config.line = Some(*line),
            (OptionName::Format, Some(Value::Text(format))) => {
                let request = FormatRequest::parse(format);
                debug!(
                    format = request.format.as_str(),
                    destination = ?request.destination,
                    "added formatter"
                );
                config.formats.push(request);
            }
            (OptionName::Require, Some(Value::Text(file))) => config.requires.push(file.clone()),
            (OptionName::Backtrace, _) => config.backtrace = true,
            (OptionName::LoadBy, Some(Value::Text(strategy))) => {
                config.load_order = match strategy.as_str() {
                    "mtime" => LoadOrder::Mtime,
                    _ => LoadOrder::Alphabetical,
                };
            }
            (OptionName::Reverse, _) => config.reverse = true,
            (OptionName::Timeout, Some(Value::Float(seconds))) => config.timeout = Some(*seconds),
            (OptionName::Heckle, Some(Value::Text(code))) => config.heckle = Some(code.clone()),
            (OptionName::DryRun, _) => config.dry_run = true,
            (OptionName::Runner, Some(Value::Text(runner))) => config.runner = Some(runner.clone()),
            (OptionName::GenerateOptions, Some(Value::Text(path))) => {
                self.generate_options(Path::new(path), occurrence, args)?;
            }
            (OptionName::OptionsFile, Some(Value::Text(_))) => {
                let outcome = self.expand_options_files(occurrence, args, parsed, depth)?;
                return Ok(ControlFlow::Break(outcome));
            }
            (OptionName::Drb, _) => {
                let outcome = self.hand_off(occurrence, args)?;
                return Ok(ControlFlow::Break(outcome));
            }
            (OptionName::Version, _) => {
                writeln!(self.out, "{}", grammar::version_text())?;
                if self.out.may_exit() {
                    return Ok(ControlFlow::Break(Outcome::Transferred));
                }
            }
            (OptionName::Help, _) => {
                write!(self.out, "{}", grammar::banner())?;
                if self.out.may_exit() {
                    return Ok(ControlFlow::Break(Outcome::Transferred));
                }
            }
            (name, value) => warn!(?name, ?value, "option arrived without a usable value"),
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Splices every `--options` file into the arguments and starts over
    ///
    /// The files are appended in command-line order after the remaining
    /// arguments; the nested run does not warn about missing files.
    fn expand_options_files(
        &mut self,
        occurrence: &Occurrence,
        args: &[String],
        parsed: &ParsedArgs,
        depth: usize,
    ) -> Result<Outcome, ResolveError> {
        let paths: Vec<PathBuf> = parsed
            .occurrences
            .iter()
            .filter(|o| o.option.name == OptionName::OptionsFile)
            .filter_map(|o| o.value.as_ref().and_then(Value::as_text))
            .map(PathBuf::from)
            .collect();

        if depth >= MAX_OPTIONS_DEPTH {
            return Err(ResolveError::OptionsFileNesting {
                path: paths.first().cloned().unwrap_or_default(),
                limit: MAX_OPTIONS_DEPTH,
            });
        }

        let mut expanded = options_file::strip_option(args, occurrence.option);
        for path in &paths {
            let file_args = options_file::read_args(path).map_err(|source| {
                ResolveError::OptionsFileUnreadable {
                    path: path.clone(),
                    source,
                }
            })?;
            debug!(path = %path.display(), count = file_args.len(), depth, "expanding options file");
            expanded.extend(file_args);
        }

        self.resolve_at(&expanded, false, depth + 1)
    }

    /// Writes the arguments, minus `--generate-options`, to `path`
    ///
    /// The notice goes to the error stream so the output stream only ever
    /// carries what the run itself produces.
    fn generate_options(
        &mut self,
        path: &Path,
        occurrence: &Occurrence,
        args: &[String],
    ) -> Result<(), ResolveError> {
        let remaining = options_file::strip_option(args, occurrence.option);
        options_file::write_args(path, &remaining).map_err(|source| {
            ResolveError::OptionsFileUnwritable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(path = %path.display(), "generated options file");

        writeln!(self.err)?;
        writeln!(
            self.err,
            "Options written to {}. You can now use these options with:",
            path.display()
        )?;
        writeln!(
            self.err,
            "{} --options {}",
            grammar::PROGRAM_NAME,
            path.display()
        )?;
        Ok(())
    }

    /// Passes the arguments, minus `--drb`, to the remote runner
    fn hand_off(
        &mut self,
        occurrence: &Occurrence,
        args: &[String],
    ) -> Result<Outcome, ResolveError> {
        let remaining = options_file::strip_option(args, occurrence.option);
        debug!(args = ?remaining, "handing run to remote runner");

        match self.remote.run(&remaining, &mut self.err, &mut self.out) {
            Ok(()) => {}
            Err(RemoteError::NoServer) => writeln!(self.err, "{}", RemoteError::NoServer)?,
            Err(RemoteError::Io(source)) => return Err(source.into()),
        }

        Ok(Outcome::Transferred)
    }

    /// Cross-option checks run once every callback has fired
    fn validate(
        &mut self,
        mut config: RunConfiguration,
        warn_if_no_files: bool,
    ) -> Result<Outcome, ResolveError> {
        if config.files.is_empty() && warn_if_no_files {
            if self.err.may_exit() {
                return Err(ResolveError::NoFiles);
            }
            writeln!(self.err, "{}", ResolveError::NoFiles)?;
            writeln!(self.err)?;
            write!(self.err, "{}", grammar::banner())?;
        }

        if let Some(line) = config.line {
            if config.examples.is_set() {
                return Err(ResolveError::MutuallyExclusiveOptions);
            }
            let path = match config.files.as_slice() {
                [file] => PathBuf::from(file),
                files => {
                    return Err(ResolveError::LineTargetCount {
                        files: files.to_vec(),
                    });
                }
            };
            self.select_by_line(&mut config, &path, line)?;
        }

        if config.ensure_format() {
            debug!("no --format given, using progress");
        }

        Ok(Outcome::Run(Box::new(config)))
    }

    fn select_by_line(
        &mut self,
        config: &mut RunConfiguration,
        path: &Path,
        line: u32,
    ) -> Result<(), ResolveError> {
        if !path.exists() {
            return Err(ResolveError::LineTargetMissing {
                path: path.to_path_buf(),
            });
        }
        if path.is_dir() {
            return Err(ResolveError::LineTargetIsDirectory {
                path: path.to_path_buf(),
            });
        }
        let source =
            fs::read_to_string(path).map_err(|source| ResolveError::LineTargetUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        match resolve_line(&source, line) {
            Some(name) => {
                debug!(path = %path.display(), line, %name, "resolved --line");
                config.examples = ExampleFilter::named(name);
            }
            None => {
                writeln!(
                    self.err,
                    "No example or group found at line {} of {}; running all examples",
                    line,
                    path.display()
                )?;
            }
        }
        Ok(())
    }

    fn report(&mut self, error: &ResolveError) -> std::io::Result<()> {
        self.err
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(self.err, "{}", error.to_string().trim_end())?;
        self.err.reset()?;

        if error.shows_banner() {
            writeln!(self.err)?;
            write!(self.err, "{}", grammar::banner())?;
        }
        self.err.flush()
    }
}

/// clap's error text without its usage section; the banner supplies that
fn usage_message(error: &clap::Error) -> String {
    let rendered = error.render().to_string();
    let message: Vec<&str> = rendered
        .lines()
        .take_while(|line| !line.starts_with("Usage:"))
        .collect();
    message.join("\n").trim_end().to_string()
}
