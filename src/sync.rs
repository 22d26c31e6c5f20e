use crate::location::Location;
use crate::slug::{resolve, slugify};
use crate::store::{sort_entries_by_date, Gallery, GalleryEntry};

/// Query parameter carrying the deep-link slug.
pub const SLIDE_PARAM: &str = "slide";

/// Repositioning command for a carousel. The synchronizer never touches a
/// carousel directly; it hands these back to the host, which applies them.
/// The carousels in turn report settled selections back in, so there is a
/// single arbiter and no carousel-to-carousel coupling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ScrollThumb { index: usize, immediate: bool },
    ScrollMain { index: usize, immediate: bool },
}

/// Keeps the thumbnail carousel, the main carousel and the location
/// consistent.
///
/// Invariants:
/// - whenever the selected entry changes, the main carousel is reset to
///   image 0 without animation;
/// - after any settled entry selection, the location's `slide` parameter
///   equals the slug of the selected entry's title. Navigating the main
///   carousel never touches the location.
pub struct Synchronizer<L: Location> {
    entries: Vec<GalleryEntry>,
    thumb_index: usize,
    main_index: usize,
    resolving: bool,
    location: L,
}

impl<L: Location> Synchronizer<L> {
    /// Takes ownership of a validated gallery and sorts it for rendering
    /// (stable, ascending by date). The collection is read-only from here on.
    pub fn new(gallery: Gallery, location: L) -> Self {
        let mut entries = gallery.entries;
        sort_entries_by_date(&mut entries);
        Self {
            entries,
            thumb_index: 0,
            main_index: 0,
            resolving: false,
            location,
        }
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn selected_entry(&self) -> &GalleryEntry {
        &self.entries[self.thumb_index]
    }

    pub fn thumb_index(&self) -> usize {
        self.thumb_index
    }

    pub fn main_index(&self) -> usize {
        self.main_index
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    /// True while a deep link is being restored (between `resolve_deep_link`
    /// issuing a scroll and the resulting selection arriving).
    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    /// Mount-time deep-link resolution: read the slug from the location and
    /// drive the thumbnail carousel to the matching entry without animation.
    /// The scroll triggers the ordinary selection-changed transition, so the
    /// reset and location rewrite follow the one code path. A miss leaves
    /// the default selection and the location untouched.
    pub fn resolve_deep_link(&mut self) -> Vec<Command> {
        let query = self.location.read();
        let Some(slug) = query.get(SLIDE_PARAM) else {
            return Vec::new();
        };
        match resolve(slug, &self.entries) {
            Some(index) if index != self.thumb_index => {
                self.resolving = true;
                vec![Command::ScrollThumb {
                    index,
                    immediate: true,
                }]
            }
            _ => Vec::new(),
        }
    }

    /// A settled thumbnail selection: click, drag-snap or programmatic.
    pub fn thumb_selected(&mut self, index: usize) -> Vec<Command> {
        let index = index.min(self.entries.len() - 1);
        self.thumb_index = index;
        self.main_index = 0;
        self.resolving = false;

        let mut query = self.location.read();
        query.insert(SLIDE_PARAM.to_string(), slugify(&self.entries[index].title));
        self.location.replace(query);

        vec![Command::ScrollMain {
            index: 0,
            immediate: true,
        }]
    }

    /// A settled main-carousel selection. The location is deliberately left
    /// alone: the slide-within-entry position is never part of the link.
    pub fn main_selected(&mut self, index: usize) {
        let images = self.selected_entry().image_urls.len();
        self.main_index = index.min(images - 1);
    }
}
