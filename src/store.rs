use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use colored::*;
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

#[derive(Debug)]
pub struct ManifestError(pub String);

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.red())
    }
}

impl std::error::Error for ManifestError {}

/// One gallery item: a themed set of images with metadata.
///
/// Immutable for the lifetime of the viewer; the collection is loaded once
/// per session and never mutated while the carousels are mounted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    /// Unique across the collection: this is the deep-link key.
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Non-empty; position 0 is the canonical image.
    pub image_urls: Vec<String>,
    /// Index into `image_urls` used for the thumbnail tile.
    #[serde(default)]
    pub preview_image_index: Option<usize>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub creator: Option<String>,
}

impl GalleryEntry {
    pub fn preview_url(&self) -> &str {
        &self.image_urls[self.preview_image_index.unwrap_or(0)]
    }
}

/// The ordered entry collection, as read from a JSON manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub entries: Vec<GalleryEntry>,
    /// Base address used when rendering the shareable deep link.
    #[serde(default)]
    pub link_base: Option<String>,
}

impl Gallery {
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ManifestError(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ManifestError> {
        let gallery: Gallery = serde_json::from_str(raw)
            .map_err(|e| ManifestError(format!("Failed to parse manifest: {}", e)))?;
        gallery.validate()?;
        Ok(gallery)
    }

    /// Enforce the entry-store contract the carousel relies on: at least one
    /// entry, non-empty image lists, preview indices in range, and titles
    /// that slugify to unique, non-empty values. Duplicate slugs would make
    /// deep-link resolution ambiguous, so they are rejected here at load
    /// time rather than silently resolved first-match-wins.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.entries.is_empty() {
            return Err(ManifestError("Manifest contains no entries".to_string()));
        }

        let mut seen: HashMap<String, &str> = HashMap::new();
        for entry in &self.entries {
            if entry.image_urls.is_empty() {
                return Err(ManifestError(format!(
                    "Entry '{}' has no images",
                    entry.title
                )));
            }
            if let Some(preview) = entry.preview_image_index {
                if preview >= entry.image_urls.len() {
                    return Err(ManifestError(format!(
                        "Entry '{}' preview index {} is out of range (0-{})",
                        entry.title,
                        preview,
                        entry.image_urls.len() - 1
                    )));
                }
            }

            let slug = slugify(&entry.title);
            if slug.is_empty() {
                return Err(ManifestError(format!(
                    "Entry '{}' produces an empty slug",
                    entry.title
                )));
            }
            if let Some(previous) = seen.insert(slug.clone(), &entry.title) {
                return Err(ManifestError(format!(
                    "Entries '{}' and '{}' share the slug '{}'",
                    previous, entry.title, slug
                )));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stable ascending sort by date; undated entries keep their manifest order
/// ahead of dated ones. Render order for both the CLI listing and the
/// thumbnail carousel.
pub fn sort_entries_by_date(entries: &mut [GalleryEntry]) {
    entries.sort_by_key(|entry| entry.date);
}
