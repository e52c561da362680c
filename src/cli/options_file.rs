//! Options files
//!
//! An options file holds command-line arguments separated by whitespace.
//! `--generate-options` writes one and `--options` splices one back into the
//! argument vector. Arguments containing whitespace do not survive the trip.

use crate::cli::grammar::{Arity, OPTIONS, OptionDescriptor};
use std::fs;
use std::io;
use std::path::Path;

/// Reads the arguments stored in an options file
pub fn read_args(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_args(&content))
}

/// Splits options-file content into arguments
pub fn parse_args(content: &str) -> Vec<String> {
    content.split_whitespace().map(String::from).collect()
}

/// Writes arguments in the format [`read_args`] understands
pub fn write_args(path: &Path, args: &[String]) -> io::Result<()> {
    let mut content = args.join(" ");
    content.push('\n');
    fs::write(path, content)
}

/// Returns a copy of `args` with every occurrence of an option removed
///
/// Handles `--long VALUE`, `--long=VALUE`, `-s VALUE`, `-sVALUE` and short
/// flags bundled with other value-less shorts (`-cX`). Everything after a
/// bare `--` is positional and kept as is.
pub fn strip_option(args: &[String], option: &OptionDescriptor) -> Vec<String> {
    let mut kept = Vec::with_capacity(args.len());
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            kept.push(arg.clone());
            kept.extend(iter.cloned());
            break;
        }

        if let Some(long) = arg.strip_prefix("--") {
            let matched = match long.split_once('=') {
                Some((name, _)) => option.longs().any(|l| l == name),
                None if option.longs().any(|l| l == long) => {
                    skip_value(&mut iter, option.arity);
                    true
                }
                None => false,
            };
            if !matched {
                kept.push(arg.clone());
            }
            continue;
        }

        if let Some(cluster) = arg.strip_prefix('-').filter(|c| !c.is_empty()) {
            match strip_short(cluster, option) {
                ShortMatch::NotPresent => kept.push(arg.clone()),
                ShortMatch::Removed { rest, needs_value } => {
                    if needs_value {
                        skip_value(&mut iter, option.arity);
                    }
                    if !rest.is_empty() {
                        kept.push(format!("-{}", rest));
                    }
                }
            }
            continue;
        }

        kept.push(arg.clone());
    }

    kept
}

fn skip_value<'a, I>(iter: &mut std::iter::Peekable<I>, arity: Arity)
where
    I: Iterator<Item = &'a String>,
{
    match arity {
        Arity::None => {}
        Arity::Required => {
            iter.next();
        }
        Arity::Optional => {
            if iter.peek().is_some_and(|next| !next.starts_with('-')) {
                iter.next();
            }
        }
    }
}

enum ShortMatch {
    NotPresent,
    /// The option's character was dropped from the cluster; `needs_value` is
    /// set when its value is the following argument
    Removed { rest: String, needs_value: bool },
}

fn strip_short(cluster: &str, option: &OptionDescriptor) -> ShortMatch {
    let mut prefix = String::new();

    for (idx, c) in cluster.char_indices() {
        if option.shorts().any(|s| s == c) {
            let after = &cluster[idx + c.len_utf8()..];
            if option.takes_value() {
                // Anything after the flag is its attached value
                return ShortMatch::Removed {
                    rest: prefix,
                    needs_value: after.is_empty(),
                };
            }
            prefix.push_str(after);
            return ShortMatch::Removed {
                rest: prefix,
                needs_value: false,
            };
        }

        match OPTIONS.iter().find(|d| d.shorts().any(|s| s == c)) {
            Some(other) if !other.takes_value() => prefix.push(c),
            // A value-taking short consumes the rest of the cluster
            _ => return ShortMatch::NotPresent,
        }
    }

    ShortMatch::NotPresent
}
