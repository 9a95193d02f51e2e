// Signature dump parser
//
// Blocks are located with an explicit brace-depth scan rather than regex
// capture, so braces inside string constants, char constants, comments or
// nested bodies cannot desynchronize package and class boundaries.

use super::params::param_list_span;
use super::{Class, Member, MemberKind, Package};
use miette::{Diagnostic, IntoDiagnostic, Result, WrapErr};
use regex::Regex;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// The signature format version this parser understands
pub const DEFAULT_HEADER: &str = "// Signature format: 2.0";

/// Malformed signature dump
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported signature format header: expected `{expected}`, found `{found}`")]
    #[diagnostic(
        code(apisurface::signature::header),
        help("regenerate the signature file with the configured format version")
    )]
    UnsupportedHeader { expected: String, found: String },

    #[error("unbalanced block delimiter at line {line}: {reason}")]
    #[diagnostic(code(apisurface::signature::unbalanced))]
    UnbalancedBlock { line: usize, reason: &'static str },

    #[error("unexpected {context} block at line {line}: `{header}`")]
    #[diagnostic(code(apisurface::signature::unexpected_block))]
    UnexpectedBlock {
        line: usize,
        context: &'static str,
        header: String,
    },
}

/// A brace-delimited block at depth zero of some text
#[derive(Debug, Clone, Copy)]
struct Block<'a> {
    /// Last non-empty line before the opening brace
    header: &'a str,
    /// Text strictly between the braces
    body: &'a str,
    /// 1-based line of the opening brace
    line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Quoted(u8),
    Comment,
}

/// Find every depth-zero block in `text`, whose first line is `first_line`
fn scan_blocks(text: &str, first_line: usize) -> Result<Vec<Block<'_>>, FormatError> {
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();
    let mut state = Lex::Code;
    let mut depth = 0usize;
    let mut line = first_line;
    let mut segment_start = 0;
    let mut open_at = 0;
    let mut open_line = first_line;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            line += 1;
        }

        match state {
            Lex::Code => match b {
                b'"' | b'\'' => state = Lex::Quoted(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => state = Lex::Comment,
                b'{' => {
                    if depth == 0 {
                        open_at = i;
                        open_line = line;
                    }
                    depth += 1;
                }
                b'}' => {
                    if depth == 0 {
                        return Err(FormatError::UnbalancedBlock {
                            line,
                            reason: "closing brace without a matching opening brace",
                        });
                    }
                    depth -= 1;
                    if depth == 0 {
                        blocks.push(Block {
                            header: last_line(&text[segment_start..open_at]),
                            body: &text[open_at + 1..i],
                            line: open_line,
                        });
                        segment_start = i + 1;
                    }
                }
                _ => {}
            },
            Lex::Quoted(quote) => {
                if b == b'\\' {
                    // Skip the escaped byte, keeping the line count right
                    if bytes.get(i + 1) == Some(&b'\n') {
                        line += 1;
                    }
                    i += 1;
                } else if b == quote || b == b'\n' {
                    // Literals never span lines in a signature dump
                    state = Lex::Code;
                }
            }
            Lex::Comment => {
                if b == b'\n' {
                    state = Lex::Code;
                }
            }
        }

        i += 1;
    }

    if depth > 0 {
        return Err(FormatError::UnbalancedBlock {
            line: open_line,
            reason: "block is never closed",
        });
    }

    Ok(blocks)
}

fn last_line(segment: &str) -> &str {
    segment
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("")
}

/// Parser for API signature dumps
pub struct SignatureParser {
    header: String,
    package_pattern: Regex,
    class_pattern: Regex,
}

impl SignatureParser {
    pub fn new(header: impl Into<String>) -> Self {
        let package_pattern = Regex::new(r"^package\s+([A-Za-z_][\w.]*)$")
            .expect("package header pattern is valid");
        let class_pattern =
            Regex::new(r"(?:^|\s)(?:class|interface|enum|@interface)\s+([A-Za-z_$][\w.$]*)")
                .expect("class header pattern is valid");

        Self {
            header: header.into(),
            package_pattern,
            class_pattern,
        }
    }

    /// The format header this parser accepts
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Read and parse a signature file
    pub fn parse_file(&self, path: &Path) -> Result<Vec<Package>> {
        let content = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read signature file: {}", path.display()))?;
        let packages = self
            .parse(&content)
            .wrap_err_with(|| format!("Invalid signature file: {}", path.display()))?;
        Ok(packages)
    }

    /// Parse the full text of a signature dump
    pub fn parse(&self, content: &str) -> Result<Vec<Package>, FormatError> {
        let first = content.lines().next().unwrap_or("").trim_end();
        if first != self.header {
            return Err(FormatError::UnsupportedHeader {
                expected: self.header.clone(),
                found: first.to_string(),
            });
        }

        let mut packages = Vec::new();
        for block in scan_blocks(content, 1)? {
            let name = self
                .package_pattern
                .captures(block.header)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| FormatError::UnexpectedBlock {
                    line: block.line,
                    context: "top-level",
                    header: block.header.to_string(),
                })?;

            let classes = self.parse_package_body(block.body, block.line)?;
            debug!("package {}: {} classes", name, classes.len());
            packages.push(Package { name, classes });
        }

        Ok(packages)
    }

    fn parse_package_body(&self, body: &str, first_line: usize) -> Result<Vec<Class>, FormatError> {
        scan_blocks(body, first_line)?
            .into_iter()
            .map(|block| {
                let name = self
                    .class_pattern
                    .captures(block.header)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .ok_or_else(|| FormatError::UnexpectedBlock {
                        line: block.line,
                        context: "package-level",
                        header: block.header.to_string(),
                    })?;

                let members = block.body.lines().filter_map(parse_member).collect();
                Ok(Class { name, members })
            })
            .collect()
    }
}

impl Default for SignatureParser {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER)
    }
}

/// Parse one declaration line inside a class body
fn parse_member(line: &str) -> Option<Member> {
    let line = strip_line_comment(line).trim();
    let (keyword, rest) = line.split_once(char::is_whitespace)?;
    let descriptor = line.trim_end_matches(';').trim_end().to_string();

    let (kind, name) = match keyword {
        "method" | "ctor" => {
            let (open, _) = param_list_span(rest)?;
            let name = rest[..open].split_whitespace().last()?;
            (MemberKind::Method, name)
        }
        "field" | "enum_constant" => {
            let declaration = rest.split(" = ").next()?;
            let declaration = declaration.trim_end().trim_end_matches(';');
            let name = declaration.split_whitespace().last()?;
            (MemberKind::Field, name)
        }
        _ => return None,
    };

    if name.is_empty() {
        return None;
    }

    Some(Member {
        kind,
        name: name.to_string(),
        descriptor,
    })
}

/// Cut a trailing `//` comment, ignoring `//` inside string or char literals
fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => return &line[..i],
                _ => {}
            },
        }
        i += 1;
    }

    line
}
