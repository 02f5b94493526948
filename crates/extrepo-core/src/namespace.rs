//! Namespaces scope where an extension is considered installed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A scoping key for installation.
///
/// [`Namespace::Root`] means "everywhere": an extension installed at root is
/// installed in every named namespace too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    #[default]
    Root,
    Named(String),
}

impl Namespace {
    /// Create a named namespace.
    pub fn named(name: impl Into<String>) -> Self {
        Namespace::Named(name.into())
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Namespace::Root)
    }

    /// The namespace name, `None` for root.
    pub fn name(&self) -> Option<&str> {
        match self {
            Namespace::Root => None,
            Namespace::Named(name) => Some(name),
        }
    }
}

impl From<Option<&str>> for Namespace {
    fn from(name: Option<&str>) -> Self {
        match name {
            None => Namespace::Root,
            Some(name) => Namespace::named(name),
        }
    }
}

impl FromStr for Namespace {
    type Err = std::convert::Infallible;

    /// `""` and `"{root}"` parse as root; anything else is a named namespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.is_empty() || s == "{root}" {
            Namespace::Root
        } else {
            Namespace::named(s)
        })
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Root => f.write_str("{root}"),
            Namespace::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root_spellings() {
        assert_eq!("".parse::<Namespace>().unwrap(), Namespace::Root);
        assert_eq!("{root}".parse::<Namespace>().unwrap(), Namespace::Root);
        assert_eq!(
            "wiki1".parse::<Namespace>().unwrap(),
            Namespace::named("wiki1")
        );
    }

    #[test]
    fn display_round_trips() {
        for ns in [Namespace::Root, Namespace::named("wiki:main")] {
            assert_eq!(ns.to_string().parse::<Namespace>().unwrap(), ns);
        }
    }

    #[test]
    fn root_sorts_first() {
        let mut all = vec![Namespace::named("b"), Namespace::Root, Namespace::named("a")];
        all.sort();
        assert_eq!(
            all,
            vec![Namespace::Root, Namespace::named("a"), Namespace::named("b")]
        );
    }
}
