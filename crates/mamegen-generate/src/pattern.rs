//! Minimal pattern expansion for the `regex` rule.
//!
//! Supported syntax: character classes `[…]` (with `a-z` ranges),
//! top-level alternation `a|b`, and repetition `{n}` / `{m,n}` on the
//! preceding atom. No anchors, no back-references, no nesting.

use rand::Rng;

use mamegen_core::{DslError, Result};

/// A compiled pattern: one branch is drawn uniformly per expansion.
#[derive(Debug, Clone)]
pub struct Pattern {
    branches: Vec<Vec<Piece>>,
}

#[derive(Debug, Clone)]
struct Piece {
    atom: Atom,
    min_repeat: usize,
    max_repeat: usize,
}

#[derive(Debug, Clone)]
enum Atom {
    Literal(char),
    Class(Vec<char>),
}

impl Pattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let mut branches = Vec::new();
        for branch in split_alternation(pattern) {
            branches.push(compile_branch(&branch, pattern)?);
        }
        Ok(Self { branches })
    }

    pub fn expand(&self, rng: &mut impl Rng) -> String {
        let branch = &self.branches[rng.gen_range(0..self.branches.len())];
        let mut out = String::new();
        for piece in branch {
            let count = if piece.min_repeat == piece.max_repeat {
                piece.min_repeat
            } else {
                rng.gen_range(piece.min_repeat..=piece.max_repeat)
            };
            for _ in 0..count {
                match &piece.atom {
                    Atom::Literal(ch) => out.push(*ch),
                    Atom::Class(chars) => {
                        out.push(chars[rng.gen_range(0..chars.len())]);
                    }
                }
            }
        }
        out
    }
}

/// Split on top-level `|`, honouring `[…]` class boundaries.
fn split_alternation(pattern: &str) -> Vec<String> {
    let mut branches = Vec::new();
    let mut current = String::new();
    let mut in_class = false;
    for ch in pattern.chars() {
        match ch {
            '[' if !in_class => {
                in_class = true;
                current.push(ch);
            }
            ']' if in_class => {
                in_class = false;
                current.push(ch);
            }
            '|' if !in_class => {
                branches.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    branches.push(current);
    branches
}

fn compile_branch(branch: &str, pattern: &str) -> Result<Vec<Piece>> {
    let chars: Vec<char> = branch.chars().collect();
    let mut pieces: Vec<Piece> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| bad_pattern(pattern, "unterminated character class"))?;
                let class = expand_class(&chars[i + 1..close]);
                if class.is_empty() {
                    return Err(bad_pattern(pattern, "empty character class"));
                }
                pieces.push(Piece {
                    atom: Atom::Class(class),
                    min_repeat: 1,
                    max_repeat: 1,
                });
                i = close + 1;
            }
            '{' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&c| c == '}')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| bad_pattern(pattern, "unterminated repetition"))?;
                let spec: String = chars[i + 1..close].iter().collect();
                let (min_repeat, max_repeat) = parse_repeat(&spec)
                    .ok_or_else(|| bad_pattern(pattern, format!("invalid repetition {{{spec}}}")))?;
                let piece = pieces
                    .last_mut()
                    .ok_or_else(|| bad_pattern(pattern, "repetition without a preceding atom"))?;
                piece.min_repeat = min_repeat;
                piece.max_repeat = max_repeat;
                i = close + 1;
            }
            ']' | '}' => {
                return Err(bad_pattern(pattern, format!("stray '{}'", chars[i])));
            }
            other => {
                pieces.push(Piece {
                    atom: Atom::Literal(other),
                    min_repeat: 1,
                    max_repeat: 1,
                });
                i += 1;
            }
        }
    }
    Ok(pieces)
}

/// `A-Z0-9_` style class body into the concrete character list.
fn expand_class(body: &[char]) -> Vec<char> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == '-' {
            let (lo, hi) = (body[i] as u32, body[i + 2] as u32);
            for code in lo..=hi {
                if let Some(ch) = char::from_u32(code) {
                    out.push(ch);
                }
            }
            i += 3;
        } else {
            out.push(body[i]);
            i += 1;
        }
    }
    out
}

fn parse_repeat(spec: &str) -> Option<(usize, usize)> {
    match spec.split_once(',') {
        Some((min, max)) => {
            let min = min.trim().parse::<usize>().ok()?;
            let max = max.trim().parse::<usize>().ok()?;
            (min <= max).then_some((min, max))
        }
        None => {
            let n = spec.trim().parse::<usize>().ok()?;
            Some((n, n))
        }
    }
}

fn bad_pattern(pattern: &str, message: impl std::fmt::Display) -> DslError {
    DslError::generation(format!("invalid pattern \"{pattern}\": {message}"))
}
