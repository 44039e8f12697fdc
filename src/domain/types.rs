//! Closed editorial vocabularies shared across the crate.
//!
//! Free-form labels never reach the placement engine or the home composer;
//! they are folded into these types by [`crate::domain::normalize`].

use std::fmt;

use serde::{Serialize, Serializer};

/// Stable article identifier assigned by the article store.
pub type ArticleId = i64;

/// Canonical editorial position, declared from most to least prominent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// The single hero slot (formerly "supermanchete").
    TopHeadline,
    /// The bounded featured shelf (formerly "destaque").
    Featured,
    Municipalities,
    #[default]
    General,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::TopHeadline,
        Position::Featured,
        Position::Municipalities,
        Position::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::TopHeadline => "top_headline",
            Position::Featured => "featured",
            Position::Municipalities => "municipalities",
            Position::General => "general",
        }
    }

    /// Exact match against the canonical tokens; no folding.
    pub fn from_canonical(value: &str) -> Option<Self> {
        match value {
            "top_headline" => Some(Position::TopHeadline),
            "featured" => Some(Position::Featured),
            "municipalities" => Some(Position::Municipalities),
            "general" => Some(Position::General),
            _ => None,
        }
    }

    /// Positions whose occupancy is bounded by a capacity invariant.
    pub fn is_constrained(self) -> bool {
        matches!(self, Position::TopHeadline | Position::Featured)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    General,
    Section,
    Municipality,
}

/// Public display category.
///
/// Only the normalizer can build a non-general category, so every value is
/// guaranteed to be a member of the public section set or the municipality
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category {
    slug: &'static str,
    kind: CategoryKind,
}

impl Category {
    pub const GENERAL: Category = Category {
        slug: "general",
        kind: CategoryKind::General,
    };

    pub(crate) const fn section(slug: &'static str) -> Self {
        Self {
            slug,
            kind: CategoryKind::Section,
        }
    }

    pub(crate) const fn municipality(slug: &'static str) -> Self {
        Self {
            slug,
            kind: CategoryKind::Municipality,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.slug
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    pub fn is_general(&self) -> bool {
        self.kind == CategoryKind::General
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::GENERAL
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug)
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug)
    }
}
