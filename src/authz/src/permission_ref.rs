//! Permission references and batch match modes
//!
//! A [`PermissionRef`] names a permission either by identity or by name.
//! String input is classified once, at the boundary:
//!
//! ```
//! use single_role_authz::PermissionRef;
//!
//! assert_eq!(PermissionRef::parse("5"), PermissionRef::ById(5));
//! assert_eq!(PermissionRef::parse("posts.edit"), PermissionRef::ByName("posts.edit".into()));
//!
//! let refs = PermissionRef::parse_list("view|3");
//! assert_eq!(refs, vec![PermissionRef::ByName("view".into()), PermissionRef::ById(3)]);
//! ```

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::types::{Permission, PermissionId};

/// Separator for the delimited form accepted by [`PermissionRef::parse_list`]
pub const LIST_DELIMITER: char = '|';

/// Reference to a permission by identity or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionRef {
    /// Match on permission identity
    ById(PermissionId),
    /// Match on exact permission name
    ByName(String),
}

impl PermissionRef {
    /// Classify a string reference.
    ///
    /// Numeric strings (surrounding ASCII whitespace allowed, optional sign,
    /// decimal or exponent forms) become [`PermissionRef::ById`] with the
    /// value truncated to an integer. Anything else is a name, kept verbatim.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim_matches(is_numeric_padding);

        if let Ok(id) = trimmed.parse::<PermissionId>() {
            return Self::ById(id);
        }

        if is_numeric_literal(trimmed) {
            if let Ok(value) = trimmed.parse::<f64>() {
                if value.is_finite() {
                    return Self::ById(value.trunc() as PermissionId);
                }
            }
        }

        Self::ByName(input.to_string())
    }

    /// Split a `|`-delimited string into an ordered list of references.
    ///
    /// An empty input yields a single empty-name reference, not an empty list.
    pub fn parse_list(input: &str) -> Vec<Self> {
        input.split(LIST_DELIMITER).map(Self::parse).collect()
    }

    /// Whether `permission` is the one referenced
    pub fn matches(&self, permission: &Permission) -> bool {
        match self {
            Self::ById(id) => permission.id == *id,
            Self::ByName(name) => permission.name == *name,
        }
    }
}

fn is_numeric_padding(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

fn is_numeric_literal(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
}

impl FromStr for PermissionRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for PermissionRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for PermissionRef {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<PermissionId> for PermissionRef {
    fn from(id: PermissionId) -> Self {
        Self::ById(id)
    }
}

impl fmt::Display for PermissionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ById(id) => write!(f, "#{}", id),
            Self::ByName(name) => f.write_str(name),
        }
    }
}

/// How a batch of references is evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// At least one reference must match; an empty batch never matches
    #[default]
    Any,
    /// Every reference must match; an empty batch always matches
    All,
}

impl From<bool> for MatchMode {
    /// `true` selects [`MatchMode::All`]
    fn from(all: bool) -> Self {
        if all {
            Self::All
        } else {
            Self::Any
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_strings_are_ids() {
        assert_eq!(PermissionRef::parse("5"), PermissionRef::ById(5));
        assert_eq!(PermissionRef::parse("+12"), PermissionRef::ById(12));
        assert_eq!(PermissionRef::parse("-3"), PermissionRef::ById(-3));
        assert_eq!(PermissionRef::parse(" 7 "), PermissionRef::ById(7));
        assert_eq!(PermissionRef::parse("007"), PermissionRef::ById(7));
        assert_eq!(PermissionRef::parse("\t\x0B8\x0C\n"), PermissionRef::ById(8));
    }

    #[test]
    fn test_decimal_and_exponent_strings_truncate() {
        assert_eq!(PermissionRef::parse("1.9"), PermissionRef::ById(1));
        assert_eq!(PermissionRef::parse("2e1"), PermissionRef::ById(20));
        assert_eq!(PermissionRef::parse(".5"), PermissionRef::ById(0));
    }

    #[test]
    fn test_non_numeric_strings_are_names() {
        assert_eq!(PermissionRef::parse("edit"), PermissionRef::ByName("edit".into()));
        assert_eq!(PermissionRef::parse("5a"), PermissionRef::ByName("5a".into()));
        assert_eq!(PermissionRef::parse("inf"), PermissionRef::ByName("inf".into()));
        assert_eq!(PermissionRef::parse("NaN"), PermissionRef::ByName("NaN".into()));
        assert_eq!(PermissionRef::parse("1e"), PermissionRef::ByName("1e".into()));
        assert_eq!(PermissionRef::parse(""), PermissionRef::ByName(String::new()));
        // names are kept verbatim, whitespace included
        assert_eq!(PermissionRef::parse(" edit"), PermissionRef::ByName(" edit".into()));
        // only ASCII whitespace may pad a number
        assert_eq!(PermissionRef::parse("\u{a0}5"), PermissionRef::ByName("\u{a0}5".into()));
        assert_eq!(PermissionRef::parse("5\u{2003}"), PermissionRef::ByName("5\u{2003}".into()));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            PermissionRef::parse_list("edit|delete|4"),
            vec![
                PermissionRef::ByName("edit".into()),
                PermissionRef::ByName("delete".into()),
                PermissionRef::ById(4),
            ]
        );
        assert_eq!(PermissionRef::parse_list(""), vec![PermissionRef::ByName(String::new())]);
    }

    #[test]
    fn test_matches() {
        let permission = Permission::new(5, "edit");

        assert!(PermissionRef::ById(5).matches(&permission));
        assert!(!PermissionRef::ById(6).matches(&permission));
        assert!(PermissionRef::ByName("edit".into()).matches(&permission));
        assert!(!PermissionRef::ByName("EDIT".into()).matches(&permission));
    }

    #[test]
    fn test_match_mode_from_bool() {
        assert_eq!(MatchMode::from(true), MatchMode::All);
        assert_eq!(MatchMode::from(false), MatchMode::Any);
        assert_eq!(MatchMode::default(), MatchMode::Any);
    }
}
