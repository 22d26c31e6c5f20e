pub mod carousel;
pub mod gui;
pub mod location;
pub mod slug;
pub mod store;
pub mod sync;

pub use location::{Location, QueryMap, ShareLink};
pub use slug::{resolve, slugify};
pub use store::{Gallery, GalleryEntry, ManifestError};
pub use sync::{Command, Synchronizer, SLIDE_PARAM};
