// src/blame.rs

//! Parsing of `git blame --porcelain` and `git log` text into blame facts.
//!
//! The porcelain scanner is an explicit two-state machine. Outside a
//! metadata block it only reacts to hunk headers. After the first header
//! of a commit it has not seen yet, it reads metadata lines until the
//! configured `author`/`committer` key resolves the identity, or until the
//! block ends without one, in which case every hunk of that commit is
//! dropped.

use crate::error::{FameError, Result};
use crate::model::{BlameFact, CommitId, Identity, IdentityMode};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const COMMIT_ID_LEN: usize = 40;

static AUTHOR_RE: OnceLock<Regex> = OnceLock::new();
static COMMITTER_RE: OnceLock<Regex> = OnceLock::new();
static LOG_COMMIT_RE: OnceLock<Regex> = OnceLock::new();
static LOG_AUTHOR_RE: OnceLock<Regex> = OnceLock::new();
static LOG_COMMITTER_RE: OnceLock<Regex> = OnceLock::new();

fn identity_pattern(mode: IdentityMode) -> &'static Regex {
    match mode {
        IdentityMode::Author => AUTHOR_RE
            .get_or_init(|| Regex::new(r"^author\s(.+)$").expect("valid regex")),
        IdentityMode::Committer => COMMITTER_RE
            .get_or_init(|| Regex::new(r"^committer\s(.+)$").expect("valid regex")),
    }
}

fn log_commit_pattern() -> &'static Regex {
    LOG_COMMIT_RE
        .get_or_init(|| Regex::new(r"^commit\s([0-9a-fA-F]{40})$").expect("valid regex"))
}

fn log_author_pattern() -> &'static Regex {
    LOG_AUTHOR_RE.get_or_init(|| Regex::new(r"^Author:\s(.+)$").expect("valid regex"))
}

fn log_committer_pattern() -> &'static Regex {
    LOG_COMMITTER_RE.get_or_init(|| Regex::new(r"^Commit:\s(.+)$").expect("valid regex"))
}

/// Result of scanning one file's porcelain output
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedBlame {
    pub facts: Vec<BlameFact>,
    /// Hunk headers seen, including those of commits that were dropped
    pub hunks: usize,
}

impl ParsedBlame {
    /// No hunk header at all: the file has nothing to blame and needs the
    /// history fallback.
    pub fn is_empty(&self) -> bool {
        self.hunks == 0
    }
}

#[derive(Debug)]
enum State {
    ExpectHunk,
    InMetadata { commit: CommitId, lines: u64 },
}

#[derive(Debug)]
enum Line<'a> {
    Hunk { commit: &'a str, lines: u64 },
    /// Header of a further line inside an already counted group
    GroupLine,
    Content,
    Other,
}

fn is_commit_id(token: &str) -> bool {
    token.len() == COMMIT_ID_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}

fn classify(line: &str, line_no: usize) -> Result<Line<'_>> {
    if line.starts_with('\t') {
        return Ok(Line::Content);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.first() {
        Some(first) if is_commit_id(first) => {}
        _ => return Ok(Line::Other),
    }

    if tokens.len() != 3 && tokens.len() != 4 {
        return Err(FameError::MalformedBlameOutput {
            line: line_no,
            reason: format!("expected 3 or 4 fields, found {}", tokens.len()),
        });
    }

    let mut numbers = [0u64; 3];
    for (slot, token) in numbers.iter_mut().zip(&tokens[1..]) {
        *slot = token
            .parse()
            .map_err(|_| FameError::MalformedBlameOutput {
                line: line_no,
                reason: format!("non-numeric field '{}'", token),
            })?;
    }

    if tokens.len() == 3 {
        Ok(Line::GroupLine)
    } else {
        Ok(Line::Hunk {
            commit: tokens[0],
            lines: numbers[2],
        })
    }
}

/// Strip a trailing `<email>` from a signature value.
///
/// A value that is nothing but an email is kept as is.
pub fn extract_name(value: &str) -> String {
    match value.find('<') {
        Some(idx) if !value[..idx].trim().is_empty() => value[..idx].trim().to_string(),
        _ => value.trim().to_string(),
    }
}

/// Parse porcelain blame text into one fact per resolvable hunk.
pub fn parse_blame(text: &str, mode: IdentityMode) -> Result<ParsedBlame> {
    let key = identity_pattern(mode);
    let mut identities: HashMap<CommitId, Identity> = HashMap::new();
    let mut unresolved: HashSet<CommitId> = HashSet::new();
    let mut state = State::ExpectHunk;
    let mut parsed = ParsedBlame::default();

    for (idx, line) in text.lines().enumerate() {
        match classify(line, idx + 1)? {
            Line::Hunk { commit, lines } => {
                parsed.hunks += 1;
                if let State::InMetadata { commit, .. } =
                    std::mem::replace(&mut state, State::ExpectHunk)
                {
                    unresolved.insert(commit);
                }

                if let Some(identity) = identities.get(commit) {
                    parsed.facts.push(BlameFact {
                        commit: commit.to_string(),
                        identity: identity.clone(),
                        lines,
                    });
                } else if !unresolved.contains(commit) {
                    state = State::InMetadata {
                        commit: commit.to_string(),
                        lines,
                    };
                }
            }
            Line::GroupLine | Line::Content => {
                // metadata always precedes the first content line
                if let State::InMetadata { commit, .. } =
                    std::mem::replace(&mut state, State::ExpectHunk)
                {
                    unresolved.insert(commit);
                }
            }
            Line::Other => {
                let State::InMetadata { commit, lines } = &state else {
                    continue;
                };
                let Some(caps) = key.captures(line) else {
                    continue;
                };
                let identity = extract_name(&caps[1]);
                identities.insert(commit.clone(), identity.clone());
                parsed.facts.push(BlameFact {
                    commit: commit.clone(),
                    identity,
                    lines: *lines,
                });
                state = State::ExpectHunk;
            }
        }
    }

    Ok(parsed)
}

/// Parse the head of `git log` output into a zero-line fact for the most
/// recent commit touching the file.
///
/// The text must open with a `commit <id>` line followed by an `Author:`
/// line, otherwise the result is `None`. In committer mode the identity
/// comes from the `Commit:` line of the same header block, as printed by
/// `--format=fuller`, so the fallback names the same person porcelain
/// blame would.
pub fn parse_history(text: &str, mode: IdentityMode) -> Option<BlameFact> {
    let mut lines = text.lines();
    let commit = log_commit_pattern().captures(lines.next()?)?[1].to_string();
    let author = log_author_pattern().captures(lines.next()?)?;

    let identity = match mode {
        IdentityMode::Author => extract_name(&author[1]),
        IdentityMode::Committer => {
            let committer = lines
                .take_while(|line| !line.trim().is_empty())
                .find_map(|line| log_committer_pattern().captures(line))?;
            extract_name(&committer[1])
        }
    };

    Some(BlameFact {
        commit,
        identity,
        lines: 0,
    })
}
