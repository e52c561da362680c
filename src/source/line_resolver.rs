#![forbid(unsafe_code)]

//! Line-to-name resolution for spec sources
//!
//! `--line N` selects the example or group declared around line `N`. Rather
//! than parsing the file, the resolver walks it line by line, keeping a stack
//! of open blocks. Blocks opened by a declaration (`describe "Stack" do`)
//! carry that declaration's name; every other block (`if`, `def`, a bare
//! `{`) is anonymous. The innermost named block still open at the requested
//! line wins.

use regex::Regex;
use std::sync::LazyLock;

/// Matches an example or group declaration at the start of a line and
/// captures everything after the keyword
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:RSpec|Spec)\.)?(?:describe|context|it|specify|example|scenario|feature|shared_examples_for|shared_context)(?:\s+|\s*\()(?P<rest>.*)$",
    )
    .unwrap_or_else(|e| unreachable!("declaration pattern is valid: {e}"))
});

/// Keywords and braces that open or close blocks
static BLOCK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:do|end|if|unless|while|until|case|def|class|module|begin|for)\b|[{}]")
        .unwrap_or_else(|e| unreachable!("block token pattern is valid: {e}"))
});

static CONSTANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<constant>[A-Z][A-Za-z0-9_]*(?:::[A-Z][A-Za-z0-9_]*)*)(?P<tail>.*)$")
        .unwrap_or_else(|e| unreachable!("constant pattern is valid: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Open,
    Close,
}

/// Returns the name of the innermost example or group enclosing `line`
///
/// `line` is 1-based. A declaration's span runs from its own line through
/// the line holding its closing `end` or `}`. Returns `None` when no named
/// declaration encloses the line or the line is outside the source.
pub fn resolve_line(source: &str, line: u32) -> Option<String> {
    let target = usize::try_from(line).ok()?;
    if target == 0 {
        return None;
    }

    let mut stack: Vec<Option<String>> = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let lineno = idx + 1;
        let name = declaration_name(raw);
        let code = strip_literals(raw);
        let tokens = block_tokens(&code);

        if lineno == target {
            let opens = tokens.iter().filter(|t| **t == Token::Open).count();
            if opens == 0 {
                // A declaration without a block spans only its own line
                if name.is_some() {
                    return name;
                }
            } else {
                stack.push(name);
                stack.extend(std::iter::repeat_n(None, opens - 1));
            }
            // Closers on the target line still belong to the blocks they close
            return stack.into_iter().rev().flatten().next();
        }

        let mut name = name;
        for token in tokens {
            match token {
                Token::Open => stack.push(name.take()),
                Token::Close => {
                    stack.pop();
                }
            }
        }
    }

    None
}

/// Extracts the description of a declaration line, if it is one
///
/// Accepts a quoted description (`it "pops"`), a constant (`describe Stack`)
/// or a constant followed by a quoted description (`describe Stack, "when
/// full"`, which yields `Stack when full`).
fn declaration_name(line: &str) -> Option<String> {
    let captures = DECLARATION.captures(line)?;
    let rest = captures.name("rest")?.as_str().trim_start();

    if let Some((text, _)) = quoted(rest) {
        return Some(text);
    }

    let captures = CONSTANT.captures(rest)?;
    let constant = captures.name("constant")?.as_str();
    let tail = captures.name("tail").map_or("", |m| m.as_str()).trim_start();

    let described = tail
        .strip_prefix(',')
        .map(str::trim_start)
        .and_then(quoted)
        .map(|(text, _)| text);

    match described {
        Some(text) => Some(format!("{} {}", constant, text)),
        None => Some(constant.to_string()),
    }
}

/// Reads a leading single- or double-quoted string, returning its contents
/// and the remainder after the closing quote
fn quoted(text: &str) -> Option<(String, &str)> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let mut contents = String::new();
    let mut escaped = false;

    for (idx, c) in text.char_indices().skip(1) {
        if escaped {
            contents.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some((contents, &text[idx + 1..]));
        } else {
            contents.push(c);
        }
    }

    None
}

/// Blanks string contents and drops a trailing comment so keywords inside
/// them are not counted
fn strip_literals(line: &str) -> String {
    let mut code = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in line.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                    code.push(' ');
                } else if c == '\\' {
                    escaped = true;
                    code.push(' ');
                } else if c == q {
                    quote = None;
                    code.push(c);
                } else {
                    code.push(' ');
                }
            }
            None => match c {
                '#' => break,
                '"' | '\'' | '`' => {
                    quote = Some(c);
                    code.push(c);
                }
                _ => code.push(c),
            },
        }
    }

    code
}

fn block_tokens(code: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut loop_header = false;

    for m in BLOCK_TOKEN.find_iter(code) {
        let word = m.as_str();
        let before = &code[..m.start()];
        let after = &code[m.end()..];

        if word == "{" {
            tokens.push(Token::Open);
            continue;
        }
        if word == "}" {
            tokens.push(Token::Close);
            continue;
        }

        // Method calls (`range.end`), symbols (`:end`), hash keys (`class:`)
        // and predicate names (`end?`) are not keywords
        if before.ends_with(['.', ':', '@', '$'])
            || after.starts_with([':', '?', '!'])
        {
            continue;
        }

        match word {
            "end" => tokens.push(Token::Close),
            "do" => {
                // `while cond do` shares one block with its loop keyword
                if !loop_header {
                    tokens.push(Token::Open);
                }
                loop_header = false;
            }
            "if" | "unless" | "while" | "until" => {
                if starts_statement(before) {
                    tokens.push(Token::Open);
                    loop_header = word == "while" || word == "until";
                }
            }
            "for" => {
                tokens.push(Token::Open);
                loop_header = true;
            }
            _ => tokens.push(Token::Open),
        }
    }

    tokens
}

/// True when a conditional keyword begins a statement rather than modifying
/// one (`return if done`)
fn starts_statement(before: &str) -> bool {
    let before = before.trim_end();
    before.is_empty()
        || before.ends_with(['=', '(', ';', '|', '&', ','])
        || before.ends_with("then")
}
