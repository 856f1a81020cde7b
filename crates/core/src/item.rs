//! Searchable item model
//!
//! A `SearchableItem` is the unit the index works with. Domain records
//! (projects, artworks, ...) are narrowed into this shape at the ingestion
//! boundary; anything domain-specific lives in the typed `ItemMetadata`
//! variant rather than an open key/value bag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// ItemType
// ============================================================================

/// Category tag describing what kind of content an item is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A software project
    Project,
    /// A piece of artwork
    Artwork,
    /// A written article or post
    Article,
    /// A static page
    Page,
}

impl ItemType {
    /// All item types in declaration order
    pub fn all() -> &'static [ItemType] {
        &[
            ItemType::Project,
            ItemType::Artwork,
            ItemType::Article,
            ItemType::Page,
        ]
    }

    /// Lowercase name, as used in facets and serialized queries
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Project => "project",
            ItemType::Artwork => "artwork",
            ItemType::Article => "article",
            ItemType::Page => "page",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ItemMetadata
// ============================================================================

/// Project-specific fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Languages, frameworks and tools used
    pub technologies: Vec<String>,
    /// Free-form status ("active", "archived", ...)
    pub status: Option<String>,
    /// Source repository link
    pub repository_url: Option<String>,
    /// Live demo link
    pub demo_url: Option<String>,
}

/// Artwork-specific fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkMetadata {
    /// Medium ("oil on canvas", "digital", ...)
    pub medium: Option<String>,
    /// Year of creation
    pub year: Option<i32>,
    /// Link to the full-size image
    pub image_url: Option<String>,
}

/// Typed per-domain metadata attached to an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemMetadata {
    /// No domain metadata
    #[default]
    None,
    /// Metadata for `ItemType::Project`
    Project(ProjectMetadata),
    /// Metadata for `ItemType::Artwork`
    Artwork(ArtworkMetadata),
}

impl ItemMetadata {
    /// Metadata terms that should be searchable
    pub fn searchable_terms(&self) -> Vec<String> {
        match self {
            ItemMetadata::None => vec![],
            ItemMetadata::Project(p) => {
                let mut terms = p.technologies.clone();
                terms.extend(p.status.iter().cloned());
                terms
            }
            ItemMetadata::Artwork(a) => {
                let mut terms: Vec<String> = a.medium.iter().cloned().collect();
                terms.extend(a.year.map(|y| y.to_string()));
                terms
            }
        }
    }
}

// ============================================================================
// SearchableItem
// ============================================================================

/// A record that can be indexed and searched
///
/// Immutable once indexed: changing an item means re-indexing the whole
/// item set, which replaces the index generation atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchableItem {
    /// Unique key within one index generation
    pub id: String,

    /// Kind of content
    pub item_type: ItemType,

    /// Display title
    pub title: String,

    /// Short description
    pub description: String,

    /// Full searchable body text
    pub content: String,

    /// Tags, kept ordered for deterministic output
    pub tags: BTreeSet<String>,

    /// Optional single category
    pub category: Option<String>,

    /// Opaque reference handed back to the caller
    pub url: String,

    /// Last modification time
    pub last_modified: DateTime<Utc>,

    /// Typed domain metadata
    pub metadata: ItemMetadata,
}

impl SearchableItem {
    /// Create a new item with empty text fields
    ///
    /// `last_modified` defaults to the Unix epoch so construction stays
    /// deterministic; use `with_last_modified` to set it.
    pub fn new(id: impl Into<String>, item_type: ItemType, title: impl Into<String>) -> Self {
        SearchableItem {
            id: id.into(),
            item_type,
            title: title.into(),
            description: String::new(),
            content: String::new(),
            tags: BTreeSet::new(),
            category: None,
            url: String::new(),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            metadata: ItemMetadata::None,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set body content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder: set tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder: set url
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder: set last modified time
    pub fn with_last_modified(mut self, ts: DateTime<Utc>) -> Self {
        self.last_modified = ts;
        self
    }

    /// Builder: set domain metadata
    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Concatenated text fed to the indexes and the scorer
    ///
    /// Order: title, description, content, tags, category, metadata terms.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.title, &self.description, &self.content];
        parts.extend(self.tags.iter().map(String::as_str));
        if let Some(category) = &self.category {
            parts.push(category);
        }
        let meta = self.metadata.searchable_terms();
        parts.extend(meta.iter().map(String::as_str));

        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
