use crate::store::GalleryEntry;

/// Derive the URL-safe identifier for an entry title.
///
/// Everything that is not an ASCII letter, digit or space is dropped,
/// runs of spaces collapse to a single hyphen, and the result is
/// lowercased. Total for any input; an empty title yields an empty slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_gap = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_gap && !slug.is_empty() {
                slug.push('-');
            }
            pending_gap = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == ' ' {
            pending_gap = true;
        }
    }

    slug
}

/// Find the entry whose title slugifies to `slug`. First match wins.
///
/// Returns `None` for an empty slug or when nothing matches; callers
/// treat that as "keep the current selection", never as an error.
pub fn resolve(slug: &str, entries: &[GalleryEntry]) -> Option<usize> {
    if slug.is_empty() {
        return None;
    }
    entries.iter().position(|entry| slugify(&entry.title) == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GalleryEntry;

    fn entry(title: &str) -> GalleryEntry {
        GalleryEntry {
            title: title.to_string(),
            description: None,
            image_urls: vec!["a.png".to_string()],
            preview_image_index: None,
            date: None,
            creator: None,
        }
    }

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Pride Month 2021"), "pride-month-2021");
        assert_eq!(slugify("Black Widow"), "black-widow");
    }

    #[test]
    fn slugify_is_case_insensitive() {
        assert_eq!(slugify("Hellfire Gala"), slugify("HELLFIRE GALA"));
        assert_eq!(slugify("Hellfire Gala"), "hellfire-gala");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("What If...?"), "what-if");
        assert_eq!(slugify("Spider-Man: No Way Home"), "spiderman-no-way-home");
        assert_eq!(slugify("D&D Night"), "dd-night");
    }

    #[test]
    fn slugify_collapses_space_runs() {
        assert_eq!(slugify("a   b"), "a-b");
        assert_eq!(slugify("A & B"), "a-b");
    }

    #[test]
    fn slugify_handles_empty_input() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_is_deterministic() {
        let title = "Pride Month 2021";
        assert_eq!(slugify(title), slugify(title));
    }

    #[test]
    fn resolve_finds_every_unique_title() {
        let entries = vec![entry("Pride Month 2021"), entry("Black Widow"), entry("Hellfire Gala")];
        for (i, e) in entries.iter().enumerate() {
            assert_eq!(resolve(&slugify(&e.title), &entries), Some(i));
        }
    }

    #[test]
    fn resolve_misses_are_not_errors() {
        let entries = vec![entry("Pride Month 2021")];
        assert_eq!(resolve("nonexistent-slug", &entries), None);
        assert_eq!(resolve("", &entries), None);
    }

    #[test]
    fn resolve_first_match_wins() {
        let entries = vec![entry("Same Title"), entry("Same  Title")];
        assert_eq!(resolve("same-title", &entries), Some(0));
    }
}
