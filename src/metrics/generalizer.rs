//! Request path → metric label.
//!
//! Rules are compiled once at startup and evaluated in order; the first
//! full match wins. Unmatched paths are used as-is.
//!
//! Pattern syntax, segment by segment:
//! - `name`: matches exactly `name`
//! - `*`: matches any single non-empty segment
//! - `**`: only as the last segment, matches whatever non-empty text is
//!   left, empty segments included
//!
//! No regex: matching is a single left-to-right walk over the segments.

use serde::Deserialize;
use thiserror::Error;

/// One `(pattern, label)` pair as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathRule {
    pub pattern: String,
    pub label: String,
}

impl PathRule {
    pub fn new(pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern must start with '/': {0:?}")]
    NotAbsolute(String),
    #[error("'**' may only be the last segment: {0:?}")]
    MisplacedRest(String),
    #[error("label must not be empty (pattern {0:?})")]
    EmptyLabel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Rest,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    segments: Vec<Segment>,
    label: String,
}

impl CompiledRule {
    fn compile(rule: &PathRule) -> Result<Self, PatternError> {
        let Some(body) = rule.pattern.strip_prefix('/') else {
            return Err(PatternError::NotAbsolute(rule.pattern.clone()));
        };
        if rule.label.is_empty() {
            return Err(PatternError::EmptyLabel(rule.pattern.clone()));
        }

        let raw: Vec<&str> = body.split('/').collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (i, part) in raw.iter().enumerate() {
            segments.push(match *part {
                "**" if i + 1 == raw.len() => Segment::Rest,
                "**" => return Err(PatternError::MisplacedRest(rule.pattern.clone())),
                "*" => Segment::Any,
                lit => Segment::Literal(lit.to_owned()),
            });
        }

        Ok(Self {
            segments,
            label: rule.label.clone(),
        })
    }

    fn matches(&self, path: &str) -> bool {
        let Some(mut rest) = path.strip_prefix('/') else {
            return false;
        };

        for (i, segment) in self.segments.iter().enumerate() {
            if *segment == Segment::Rest {
                return !rest.is_empty();
            }
            let (part, tail) = match rest.split_once('/') {
                Some((part, tail)) => (part, Some(tail)),
                None => (rest, None),
            };
            match segment {
                Segment::Any if part.is_empty() => return false,
                Segment::Literal(lit) if lit != part => return false,
                _ => {}
            }
            match tail {
                Some(tail) => rest = tail,
                None => return i + 1 == self.segments.len(),
            }
        }
        false
    }
}

/// Ordered, immutable rule table. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PathGeneralizer {
    rules: Vec<CompiledRule>,
}

impl PathGeneralizer {
    pub fn new(rules: &[PathRule]) -> Result<Self, PatternError> {
        let rules = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    /// Collapse per-record routes into a single series.
    pub fn default_rules() -> Vec<PathRule> {
        vec![PathRule::new("/api/resources/**", "/api/resources/*")]
    }

    /// Label of the first matching rule, or `path` itself.
    pub fn generalize<'a>(&'a self, path: &'a str) -> &'a str {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map_or(path, |rule| rule.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for PathGeneralizer {
    fn default() -> Self {
        Self {
            rules: vec![CompiledRule {
                segments: vec![
                    Segment::Literal("api".into()),
                    Segment::Literal("resources".into()),
                    Segment::Rest,
                ],
                label: "/api/resources/*".into(),
            }],
        }
    }
}
