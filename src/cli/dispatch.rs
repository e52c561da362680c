#![forbid(unsafe_code)]

//! Matching an argument vector against the option grammar
//!
//! [`parse`] lets clap validate the arguments against the grammar table and
//! then flattens the matches back into the order the options appeared on the
//! command line, so callbacks can be fired left to right.

use crate::cli::grammar::{self, Arity, FILES_ID, OPTIONS, OptionDescriptor, ValueKind};
use clap::ArgMatches;
use clap::parser::ValueSource;

/// A coerced option value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(u32),
    Float(f64),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// One option as it appeared on the command line
#[derive(Debug, Clone)]
pub struct Occurrence {
    /// Position in the argument vector
    pub index: usize,
    pub option: &'static OptionDescriptor,
    /// `None` for flags, and for optional values that were left out
    pub value: Option<Value>,
}

/// Result of matching an argument vector
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    /// Options in command-line order
    pub occurrences: Vec<Occurrence>,
    /// Positional arguments in command-line order
    pub files: Vec<String>,
}

/// Matches `args` (without the program name) against the grammar
///
/// # Errors
///
/// Returns clap's error for unknown flags, missing values and values that
/// fail coercion.
pub fn parse(args: &[String]) -> Result<ParsedArgs, clap::Error> {
    let matches = grammar::command().try_get_matches_from(args)?;

    let mut occurrences = Vec::new();
    for option in OPTIONS {
        collect_occurrences(&matches, option, &mut occurrences);
    }
    occurrences.sort_by_key(|o| o.index);

    let files = matches
        .get_many::<String>(FILES_ID)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    Ok(ParsedArgs { occurrences, files })
}

fn collect_occurrences(
    matches: &ArgMatches,
    option: &'static OptionDescriptor,
    occurrences: &mut Vec<Occurrence>,
) {
    // Flags carry an implicit default; only explicit occurrences count
    if matches.value_source(option.id) != Some(ValueSource::CommandLine) {
        return;
    }
    let Some(indices) = matches.indices_of(option.id) else {
        return;
    };

    if option.arity == Arity::None {
        occurrences.extend(indices.map(|index| Occurrence {
            index,
            option,
            value: None,
        }));
        return;
    }

    let values: Vec<Option<Value>> = match option.kind {
        ValueKind::Text => matches
            .get_many::<String>(option.id)
            .into_iter()
            .flatten()
            .map(|text| {
                // An optional value left out arrives as an empty string
                (!text.is_empty() || option.arity == Arity::Required)
                    .then(|| Value::Text(text.clone()))
            })
            .collect(),
        ValueKind::Integer => matches
            .get_many::<u32>(option.id)
            .into_iter()
            .flatten()
            .map(|n| Some(Value::Integer(*n)))
            .collect(),
        ValueKind::Float => matches
            .get_many::<f64>(option.id)
            .into_iter()
            .flatten()
            .map(|f| Some(Value::Float(*f)))
            .collect(),
    };

    occurrences.extend(
        indices
            .zip(values)
            .map(|(index, value)| Occurrence {
                index,
                option,
                value,
            }),
    );
}
