//! Extension versions and dependency version constraints.
//!
//! Extension versions are free-form strings such as `1.0`, `2.1-milestone-1`
//! or `3.0-SNAPSHOT`. They are compared token by token:
//!
//! - the string is split on `.`, `-`, `_` and `+`, and again at every
//!   digit/letter transition (`rc1` becomes `rc`, `1`)
//! - numeric tokens compare numerically and rank above any qualifier
//! - qualifiers rank `alpha < beta < milestone < rc < snapshot < other`,
//!   other qualifiers comparing alphabetically among themselves
//! - release qualifiers (`ga`, `final`, `release`) carry no weight
//! - missing trailing tokens count as `0`, so `1.0` and `1.0.0` rank the same,
//!   and zeros right before a qualifier are dropped (`1.0-rc1` is `1-rc1`)
//!
//! Two versions that rank the same are ordered by their raw string, which
//! keeps [`Version`]'s `Ord` total and consistent with string equality.
//!
//! # Examples
//!
//! ```
//! use extrepo_core::version::{Version, VersionConstraint};
//!
//! assert!(Version::new("1.0-SNAPSHOT") < Version::new("1.0"));
//! assert!(Version::new("1.9") < Version::new("1.10"));
//!
//! let constraint = VersionConstraint::parse(">=1.0,<2.0").unwrap();
//! assert!(constraint.satisfies(&Version::new("1.5")));
//! assert!(!constraint.satisfies(&Version::new("2.0")));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConstraintError;

/// One comparable piece of a version string.
///
/// Variant order matters: every qualifier ranks below every number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Token {
    Qualifier { rank: u8, name: String },
    /// Digits without leading zeros, compared by length first.
    Number { len: usize, digits: String },
}

impl Token {
    fn number(raw: &str) -> Self {
        let trimmed = raw.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Token::Number {
            len: digits.len(),
            digits: digits.to_string(),
        }
    }

    fn zero() -> Self {
        Token::number("0")
    }

    /// `None` for release qualifiers, which do not take part in ordering.
    fn qualifier(raw: &str) -> Option<Self> {
        let name = raw.to_ascii_lowercase();
        let rank = match name.as_str() {
            "ga" | "final" | "release" => return None,
            "alpha" | "a" => 0,
            "beta" | "b" => 1,
            "milestone" | "m" => 2,
            "rc" | "cr" => 3,
            "snapshot" => 4,
            _ => 5,
        };
        Some(Token::Qualifier { rank, name })
    }

    fn is_zero(&self) -> bool {
        matches!(self, Token::Number { digits, .. } if digits == "0")
    }
}

fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    for part in raw.split(['.', '-', '_', '+']) {
        let mut current = String::new();
        let mut numeric = false;

        for c in part.chars() {
            let is_digit = c.is_ascii_digit();
            if !current.is_empty() && is_digit != numeric {
                push_token(&mut tokens, &current, numeric);
                current.clear();
            }
            numeric = is_digit;
            current.push(c);
        }
        if !current.is_empty() {
            push_token(&mut tokens, &current, numeric);
        }
    }

    while tokens.last().is_some_and(Token::is_zero) {
        tokens.pop();
    }
    tokens
}

fn push_token(tokens: &mut Vec<Token>, raw: &str, numeric: bool) {
    if numeric {
        tokens.push(Token::number(raw));
    } else if let Some(token) = Token::qualifier(raw) {
        // `1.0-rc1` and `1-rc1` name the same version
        while tokens.last().is_some_and(Token::is_zero) {
            tokens.pop();
        }
        tokens.push(token);
    }
}

/// An extension version.
///
/// Equality and hashing use the raw string; ordering is the total order
/// described in the [module documentation](self).
#[derive(Clone)]
pub struct Version {
    raw: String,
    tokens: Vec<Token>,
}

impl Version {
    /// Create a version from its string form. Any string is accepted.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let tokens = tokenize(raw.trim());
        Self { raw, tokens }
    }

    /// The original version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compare two versions ignoring their spelling, so `1.0` and `1.0.0`
    /// compare equal.
    pub fn cmp_canonical(&self, other: &Self) -> Ordering {
        let zero = Token::zero();
        let len = self.tokens.len().max(other.tokens.len());
        for i in 0..len {
            let left = self.tokens.get(i).unwrap_or(&zero);
            let right = other.tokens.get(i).unwrap_or(&zero);
            match left.cmp(right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

/// Compare two versions.
///
/// This is the total order used to keep version lists sorted and to walk
/// them newest first.
pub fn compare(v1: &Version, v2: &Version) -> Ordering {
    v1.cmp(v2)
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_canonical(other)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({:?})", self.raw)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Version {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Version::new)
    }
}

/// A single version comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    /// `>=`
    Gte,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `<`
    Lt,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

/// A single version specifier: an operator paired with a version.
#[derive(Debug, Clone)]
struct Specifier {
    op: CompareOp,
    version: Version,
}

impl Specifier {
    fn matches(&self, candidate: &Version) -> bool {
        let ord = candidate.cmp_canonical(&self.version);
        match self.op {
            CompareOp::Gte => ord != Ordering::Less,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Lte => ord != Ordering::Greater,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
        }
    }
}

/// A parsed dependency version constraint.
///
/// Supports comma-separated compound constraints (all must match). An empty
/// constraint or `*` accepts every version.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    specifiers: Vec<Specifier>,
    /// The original constraint string for display.
    raw: String,
}

impl VersionConstraint {
    /// A constraint accepting every version.
    pub fn any() -> Self {
        Self {
            specifiers: Vec::new(),
            raw: String::new(),
        }
    }

    /// Parse a version constraint string.
    ///
    /// - `>=1.0`
    /// - `>=1.0,<2.0`
    /// - `==2.1-milestone-1`
    /// - `!=1.3`
    /// - `1.2` (bare version implies `==`)
    pub fn parse(constraint: &str) -> Result<Self, ConstraintError> {
        let trimmed = constraint.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(Self {
                specifiers: Vec::new(),
                raw: trimmed.to_string(),
            });
        }

        let mut specifiers = Vec::new();
        for part in trimmed.split(',').map(str::trim) {
            if part.is_empty() {
                return Err(ConstraintError {
                    constraint: constraint.to_string(),
                    reason: "empty specifier".to_string(),
                });
            }
            specifiers.push(parse_specifier(constraint, part)?);
        }

        Ok(Self {
            specifiers,
            raw: trimmed.to_string(),
        })
    }

    /// Check if a version satisfies this constraint.
    pub fn satisfies(&self, version: &Version) -> bool {
        self.specifiers.iter().all(|spec| spec.matches(version))
    }

    /// Whether this constraint accepts every version.
    pub fn is_any(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Return the original constraint string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self::any()
    }
}

impl PartialEq for VersionConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for VersionConstraint {}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            f.write_str("*")
        } else {
            f.write_str(&self.raw)
        }
    }
}

/// Parse a single specifier like `>=1.2` or `<2.0`.
fn parse_specifier(constraint: &str, s: &str) -> Result<Specifier, ConstraintError> {
    let (op, version_str) = if let Some(rest) = s.strip_prefix(">=") {
        (CompareOp::Gte, rest)
    } else if let Some(rest) = s.strip_prefix("<=") {
        (CompareOp::Lte, rest)
    } else if let Some(rest) = s.strip_prefix("!=") {
        (CompareOp::Ne, rest)
    } else if let Some(rest) = s.strip_prefix("==") {
        (CompareOp::Eq, rest)
    } else if let Some(rest) = s.strip_prefix('>') {
        (CompareOp::Gt, rest)
    } else if let Some(rest) = s.strip_prefix('<') {
        (CompareOp::Lt, rest)
    } else {
        // Bare version implies ==
        (CompareOp::Eq, s)
    };

    let version_str = version_str.trim();
    if version_str.is_empty() || version_str.contains(['<', '>', '=', '!']) {
        return Err(ConstraintError {
            constraint: constraint.to_string(),
            reason: format!("invalid version in '{s}'"),
        });
    }

    Ok(Specifier {
        op,
        version: Version::new(version_str),
    })
}
