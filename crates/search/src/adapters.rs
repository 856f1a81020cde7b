//! Domain record adapters
//!
//! Projects and artworks are narrowed into `SearchableItem` here, at the
//! ingestion boundary. Their domain-specific fields land in the typed
//! `ItemMetadata` variant and, through it, in the searchable text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sift_core::{ArtworkMetadata, ItemMetadata, ItemType, ProjectMetadata, SearchableItem};

/// A software project record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique id
    pub id: String,
    /// Project name
    pub title: String,
    /// One-line summary
    pub description: String,
    /// Longer write-up
    pub details: String,
    /// Languages, frameworks and tools
    pub technologies: Vec<String>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Optional category
    pub category: Option<String>,
    /// Status ("active", "archived", ...)
    pub status: Option<String>,
    /// Source repository link
    pub repository_url: Option<String>,
    /// Live demo link
    pub demo_url: Option<String>,
    /// Last update
    pub updated_at: Option<DateTime<Utc>>,
}

/// An artwork record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Unique id
    pub id: String,
    /// Artwork title
    pub title: String,
    /// Description
    pub description: String,
    /// Medium ("oil on canvas", "digital", ...)
    pub medium: Option<String>,
    /// Year of creation
    pub year: Option<i32>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Optional category
    pub category: Option<String>,
    /// Link to the image
    pub image_url: Option<String>,
    /// Creation or last update time
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Project> for SearchableItem {
    fn from(p: &Project) -> Self {
        let mut item = SearchableItem::new(p.id.clone(), ItemType::Project, p.title.clone())
            .with_description(p.description.clone())
            .with_content(p.details.clone())
            .with_tags(p.tags.iter().cloned())
            .with_url(format!("/projects/{}", p.id))
            .with_metadata(ItemMetadata::Project(ProjectMetadata {
                technologies: p.technologies.clone(),
                status: p.status.clone(),
                repository_url: p.repository_url.clone(),
                demo_url: p.demo_url.clone(),
            }));
        if let Some(category) = &p.category {
            item = item.with_category(category.clone());
        }
        if let Some(ts) = p.updated_at {
            item = item.with_last_modified(ts);
        }
        item
    }
}

impl From<&Artwork> for SearchableItem {
    fn from(a: &Artwork) -> Self {
        let mut item = SearchableItem::new(a.id.clone(), ItemType::Artwork, a.title.clone())
            .with_description(a.description.clone())
            .with_tags(a.tags.iter().cloned())
            .with_url(format!("/artwork/{}", a.id))
            .with_metadata(ItemMetadata::Artwork(ArtworkMetadata {
                medium: a.medium.clone(),
                year: a.year,
                image_url: a.image_url.clone(),
            }));
        if let Some(category) = &a.category {
            item = item.with_category(category.clone());
        }
        if let Some(ts) = a.created_at {
            item = item.with_last_modified(ts);
        }
        item
    }
}
