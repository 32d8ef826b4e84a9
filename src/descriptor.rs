use serde::{Deserialize, Serialize};

use crate::parser::escape_title;

/// System assumed when a descriptor does not name one.
pub const DEFAULT_SYSTEM: &str = "hudson";

/// Recognized CI systems and the identifier each one resolves to.
const RECOGNIZED_SYSTEMS: [(&str, &str); 5] = [
    ("bamboo", "bamboo"),
    ("cruise", "cruise"),
    ("go", "go"),
    ("jenkins", "hudson"),
    ("hudson", "hudson"),
];

/// Resolves a system token to its canonical identifier.
///
/// Matching trims the token and ignores case. Returns `None` for anything
/// outside the recognized set.
pub fn recognized_system(token: &str) -> Option<&'static str> {
    let token = token.trim();
    RECOGNIZED_SYSTEMS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|&(_, canonical)| canonical)
}

/// One CI source named by a descriptor string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiSourceDescriptor {
    pub title: String,
    pub system: String,
    pub url: String,
}

impl CiSourceDescriptor {
    pub fn new(title: impl Into<String>, system: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            system: system.into(),
            url: url.into(),
        }
    }
}

impl std::fmt::Display for CiSourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}:{}", self.system, self.url)
        } else {
            write!(f, "[{}]{}:{}", escape_title(&self.title), self.system, self.url)
        }
    }
}
