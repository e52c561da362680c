#![forbid(unsafe_code)]

//! The option grammar
//!
//! Every flag the front end understands is described once in [`OPTIONS`].
//! The same table drives argument parsing and the usage banner, so the help
//! text cannot drift away from what the parser accepts.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command, value_parser};

/// Name the program reports in its banner and version text
pub const PROGRAM_NAME: &str = "spec";

/// clap id of the positional file/directory/glob arguments
pub const FILES_ID: &str = "files";

const USAGE: &str = "spec (FILE|DIRECTORY|GLOB)+ [options]";

/// Symbolic option names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    Pattern,
    Diff,
    Colour,
    Example,
    Specification,
    Line,
    Format,
    Require,
    Backtrace,
    LoadBy,
    Reverse,
    Timeout,
    Heckle,
    DryRun,
    OptionsFile,
    GenerateOptions,
    Runner,
    Drb,
    Version,
    Help,
}

/// How many values an option takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Required,
    Optional,
}

/// Type a value is coerced to before its callback runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
}

/// Static description of one option
#[derive(Debug)]
pub struct OptionDescriptor {
    pub name: OptionName,
    /// clap id, also used in log output
    pub id: &'static str,
    /// Every accepted spelling; the first short and first long are primary
    pub flags: &'static [&'static str],
    pub arity: Arity,
    pub kind: ValueKind,
    pub value_name: &'static str,
    pub help: &'static [&'static str],
    /// Restricts accepted values
    pub choices: &'static [&'static str],
}

impl OptionDescriptor {
    /// Short spellings without the leading dash
    pub fn shorts(&self) -> impl Iterator<Item = char> + '_ {
        self.flags
            .iter()
            .filter(|f| !f.starts_with("--"))
            .filter_map(|f| f.strip_prefix('-'))
            .filter_map(|f| f.chars().next())
    }

    /// Long spellings without the leading dashes
    pub fn longs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.flags.iter().filter_map(|f| f.strip_prefix("--"))
    }

    pub fn takes_value(&self) -> bool {
        self.arity != Arity::None
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id).help(self.help.join("\n"));

        let mut shorts = self.shorts();
        if let Some(short) = shorts.next() {
            arg = arg.short(short);
        }
        for alias in shorts {
            arg = arg.visible_short_alias(alias);
        }

        let mut longs = self.longs();
        if let Some(long) = longs.next() {
            arg = arg.long(long);
        }
        for alias in longs {
            arg = arg.visible_alias(alias);
        }

        arg = match self.arity {
            Arity::None => arg.action(ArgAction::SetTrue),
            Arity::Required => arg.action(ArgAction::Append).num_args(1),
            Arity::Optional => arg
                .action(ArgAction::Append)
                .num_args(0..=1)
                .default_missing_value(""),
        };

        if self.takes_value() {
            arg = arg.value_name(self.value_name);
            arg = match self.kind {
                ValueKind::Integer => arg.value_parser(value_parser!(u32)),
                ValueKind::Float => arg.value_parser(positive_seconds),
                ValueKind::Text if !self.choices.is_empty() => {
                    arg.value_parser(PossibleValuesParser::new(self.choices.iter().copied()))
                }
                ValueKind::Text => arg,
            };
        }

        arg
    }
}

/// Parses a duration in seconds; must be finite and greater than zero
fn positive_seconds(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(format!("'{}' is not a positive, finite number of seconds", value))
    }
}

/// The complete option grammar, in banner order
pub static OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor {
        name: OptionName::Pattern,
        id: "pattern",
        flags: &["-p", "--pattern"],
        arity: Arity::Required,
        kind: ValueKind::Text,
        value_name: "PATTERN",
        help: &[
            "Limit files loaded to those matching this pattern. Defaults to '**/*_spec.rb'",
            "Separate multiple patterns with commas.",
            "Applies only to directories named on the command line (files",
            "named explicitly on the command line will be loaded regardless).",
        ],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Diff,
        id: "diff",
        flags: &["-D", "--diff"],
        arity: Arity::Optional,
        kind: ValueKind::Text,
        value_name: "FORMAT",
        help: &[
            "Show diff of objects that are expected to be equal when they are not",
            "Builtin formats: unified|u|context|c",
            "You can also specify a custom differ class",
            "(in which case you should also specify --require)",
        ],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Colour,
        id: "colour",
        flags: &["-c", "--colour", "--color"],
        arity: Arity::None,
        kind: ValueKind::Text,
        value_name: "",
        help: &["Show coloured (red/green) output"],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Example,
        id: "example",
        flags: &["-e", "--example"],
        arity: Arity::Optional,
        kind: ValueKind::Text,
        value_name: "NAME|FILE_NAME",
        help: &[
            "Execute example(s) with matching name(s). If the argument is",
            "the path to an existing file (typically generated by a previous",
            "run using --format failing_examples:file.txt), then the examples",
            "on each line of that file will be executed. If the file is empty,",
            "all examples will be run (as if --example was not specified).",
            "",
            "If the argument is not an existing file, then it is treated as",
            "an example name directly, causing only the matching example to run",
        ],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Specification,
        id: "specification",
        flags: &["-s", "--specification"],
        arity: Arity::Optional,
        kind: ValueKind::Text,
        value_name: "NAME",
        help: &["DEPRECATED - use -e instead"],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Line,
        id: "line",
        flags: &["-l", "--line"],
        arity: Arity::Required,
        kind: ValueKind::Integer,
        value_name: "LINE_NUMBER",
        help: &[
            "Execute example group or example at given line.",
            "(does not work for dynamically generated examples)",
        ],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Format,
        id: "format",
        flags: &["-f", "--format"],
        arity: Arity::Required,
        kind: ValueKind::Text,
        value_name: "FORMAT[:WHERE]",
        help: &[
            "Specifies what format to use for output. Specify WHERE to tell",
            "the formatter where to write the output. All built-in formats",
            "expect WHERE to be a file name, and will write to the output",
            "stream if it's not specified. The --format option may be specified",
            "several times if you want several outputs",
            "",
            "Builtin formats:",
            "silent|l                 : No output",
            "progress|p               : Text-based progress bar",
            "profile|o                : Text-based progress bar with profiling of 10 slowest examples",
            "specdoc|s                : Code example doc strings",
            "nested|n                 : Code example doc strings with nested groups indented",
            "html|h                   : A nice HTML report",
            "failing_examples|e       : Write all failing examples - input for --example",
            "failing_example_groups|g : Write all failing example groups - input for --example",
            "",
            "FORMAT can also be the name of a custom formatter class",
            "(in which case you should also specify --require to load it)",
        ],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Require,
        id: "require",
        flags: &["-r", "--require"],
        arity: Arity::Required,
        kind: ValueKind::Text,
        value_name: "FILE",
        help: &[
            "Require FILE before running specs",
            "Useful for loading custom formatters or other extensions.",
            "If this option is used it must come before the others",
        ],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Backtrace,
        id: "backtrace",
        flags: &["-b", "--backtrace"],
        arity: Arity::None,
        kind: ValueKind::Text,
        value_name: "",
        help: &["Output full backtrace"],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::LoadBy,
        id: "loadby",
        flags: &["-L", "--loadby"],
        arity: Arity::Required,
        kind: ValueKind::Text,
        value_name: "STRATEGY",
        help: &[
            "Specify the strategy by which spec files should be loaded.",
            "STRATEGY can currently only be 'mtime' (File modification time)",
            "By default, spec files are loaded in alphabetical order if --loadby",
            "is not specified.",
        ],
        choices: &["mtime"],
    },
    OptionDescriptor {
        name: OptionName::Reverse,
        id: "reverse",
        flags: &["-R", "--reverse"],
        arity: Arity::None,
        kind: ValueKind::Text,
        value_name: "",
        help: &["Run examples in reverse order"],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Timeout,
        id: "timeout",
        flags: &["-t", "--timeout"],
        arity: Arity::Required,
        kind: ValueKind::Float,
        value_name: "FLOAT",
        help: &[
            "Interrupt and fail each example that doesn't complete in the",
            "specified time",
        ],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Heckle,
        id: "heckle",
        flags: &["-H", "--heckle"],
        arity: Arity::Required,
        kind: ValueKind::Text,
        value_name: "CODE",
        help: &[
            "If all examples pass, this will mutate the classes and methods",
            "identified by CODE little by little and run all the examples again",
            "for each mutation. The intent is that for each mutation, at least",
            "one example *should* fail. CODE should be either Some::Module,",
            "Some::Class or Some::Fabulous#method",
        ],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::DryRun,
        id: "dry-run",
        flags: &["-d", "--dry-run"],
        arity: Arity::None,
        kind: ValueKind::Text,
        value_name: "",
        help: &["Invokes formatters without executing the examples."],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::OptionsFile,
        id: "options",
        flags: &["-O", "--options"],
        arity: Arity::Required,
        kind: ValueKind::Text,
        value_name: "PATH",
        help: &["Read options from a file"],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::GenerateOptions,
        id: "generate-options",
        flags: &["-G", "--generate-options"],
        arity: Arity::Required,
        kind: ValueKind::Text,
        value_name: "PATH",
        help: &["Generate an options file for --options"],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Runner,
        id: "runner",
        flags: &["-U", "--runner"],
        arity: Arity::Required,
        kind: ValueKind::Text,
        value_name: "RUNNER",
        help: &["Use a custom Runner."],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Drb,
        id: "drb",
        flags: &["-X", "--drb"],
        arity: Arity::None,
        kind: ValueKind::Text,
        value_name: "",
        help: &["Run examples via DRb. (For example against a running spec server)"],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Version,
        id: "version",
        flags: &["-v", "--version"],
        arity: Arity::None,
        kind: ValueKind::Text,
        value_name: "",
        help: &["Show version"],
        choices: &[],
    },
    OptionDescriptor {
        name: OptionName::Help,
        id: "help",
        flags: &["-h", "--help"],
        arity: Arity::None,
        kind: ValueKind::Text,
        value_name: "",
        help: &["You're looking at it"],
        choices: &[],
    },
];

/// Looks up the descriptor for a symbolic name
pub fn descriptor(name: OptionName) -> &'static OptionDescriptor {
    OPTIONS
        .iter()
        .find(|d| d.name == name)
        .unwrap_or_else(|| unreachable!("every OptionName has a descriptor"))
}

/// Builds the clap command for the whole grammar
///
/// Help and version handling are disabled in clap: both are ordinary table
/// entries whose callbacks decide whether the host process may exit.
pub fn command() -> Command {
    let files = Arg::new(FILES_ID)
        .value_name("FILE|DIRECTORY|GLOB")
        .action(ArgAction::Append)
        .num_args(0..)
        .help("Spec files, directories of spec files, or globs");

    OPTIONS.iter().fold(
        Command::new(PROGRAM_NAME)
            .no_binary_name(true)
            .override_usage(USAGE)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .arg(files),
        |command, descriptor| command.arg(descriptor.to_arg()),
    )
}

/// The usage banner listing every option
pub fn banner() -> String {
    command().render_help().to_string()
}

/// The text printed by `--version`
pub fn version_text() -> String {
    format!("{} {}", PROGRAM_NAME, env!("CARGO_PKG_VERSION"))
}
