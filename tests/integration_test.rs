use galleria::carousel::ReelMotion;
use galleria::location::{Location, ShareLink};
use galleria::store::{Gallery, GalleryEntry};
use galleria::sync::{Command, Synchronizer, SLIDE_PARAM};

const DT: f32 = 1.0 / 60.0;
const LINK_BASE: &str = "https://gallery.example.org";

fn entry(title: &str, images: &[&str]) -> GalleryEntry {
    GalleryEntry {
        title: title.to_string(),
        description: None,
        image_urls: images.iter().map(|s| s.to_string()).collect(),
        preview_image_index: None,
        date: None,
        creator: None,
    }
}

fn collection() -> Gallery {
    Gallery {
        entries: vec![
            entry("Pride Month 2021", &["a.png", "b.png"]),
            entry("Black Widow", &["c.png"]),
        ],
        ..Gallery::default()
    }
}

/// Both carousels plus the synchronizer, wired the way the viewer wires
/// them: settled selections flow into the synchronizer, its commands flow
/// back down, and nothing talks carousel-to-carousel.
struct Harness {
    sync: Synchronizer<ShareLink>,
    thumbs: ReelMotion,
    main: ReelMotion,
}

impl Harness {
    fn mount(query: Option<&str>) -> Self {
        let link = match query {
            Some(q) => ShareLink::with_query(LINK_BASE, q),
            None => ShareLink::new(LINK_BASE),
        };
        let sync = Synchronizer::new(collection(), link);
        let thumbs = ReelMotion::new(sync.entries().len());
        let main = ReelMotion::new(sync.selected_entry().image_urls.len());

        let mut harness = Harness { sync, thumbs, main };
        let commands = harness.sync.resolve_deep_link();
        harness.apply(commands);
        harness.pump();
        harness
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::ScrollThumb { index, immediate } => {
                    self.thumbs.scroll_to(index, immediate);
                }
                Command::ScrollMain { index, immediate } => {
                    self.main.scroll_to(index, immediate);
                }
            }
        }
    }

    /// Run animations to rest and route settled selections until quiescent,
    /// like letting the event loop drain.
    fn pump(&mut self) {
        for _ in 0..10 {
            for _ in 0..600 {
                if !self.thumbs.tick(DT) {
                    break;
                }
            }
            for _ in 0..600 {
                if !self.main.tick(DT) {
                    break;
                }
            }

            let mut routed = false;
            if let Some(index) = self.thumbs.take_selection_change() {
                let commands = self.sync.thumb_selected(index);
                self.main.set_len(self.sync.selected_entry().image_urls.len());
                self.apply(commands);
                routed = true;
            }
            if let Some(index) = self.main.take_selection_change() {
                self.sync.main_selected(index);
                routed = true;
            }
            if !routed {
                return;
            }
        }
        panic!("event routing did not quiesce");
    }

    fn slide(&self) -> Option<String> {
        self.sync.location().read().get(SLIDE_PARAM).cloned()
    }
}

#[test]
fn scenario_a_deep_link_selects_entry_on_mount() {
    let harness = Harness::mount(Some("?slide=black-widow"));

    assert_eq!(harness.sync.thumb_index(), 1);
    assert_eq!(harness.sync.main_index(), 0);
    assert_eq!(harness.thumbs.selected(), 1);
    assert_eq!(harness.sync.selected_entry().image_urls, vec!["c.png"]);
    assert_eq!(harness.main.len(), 1);
}

#[test]
fn scenario_b_click_writes_link_and_resets_main() {
    let mut harness = Harness::mount(None);
    assert_eq!(harness.sync.thumb_index(), 0);
    assert_eq!(harness.slide(), None);

    // Leave the main carousel on image 1 so the reset is observable.
    harness.main.step(1);
    harness.pump();
    assert_eq!(harness.sync.main_index(), 1);

    // User clicks thumbnail 1: animated scroll, then settle.
    harness.thumbs.scroll_to(1, false);
    harness.pump();

    assert_eq!(harness.sync.thumb_index(), 1);
    assert_eq!(harness.slide().as_deref(), Some("black-widow"));
    assert_eq!(harness.sync.main_index(), 0);
    assert_eq!(harness.main.selected(), 0);
}

#[test]
fn scenario_c_main_navigation_leaves_link_untouched() {
    let mut harness = Harness::mount(None);

    harness.main.step(1);
    harness.pump();

    assert_eq!(harness.sync.main_index(), 1);
    assert_eq!(harness.sync.thumb_index(), 0);
    assert_eq!(harness.slide(), None);
}

#[test]
fn deep_link_miss_falls_back_to_first_entry() {
    let harness = Harness::mount(Some("?slide=nonexistent-slug"));

    assert_eq!(harness.sync.thumb_index(), 0);
    assert_eq!(harness.sync.main_index(), 0);
    assert_eq!(harness.thumbs.selected(), 0);
}

#[test]
fn every_entry_round_trips_through_its_slug() {
    for (i, entry) in Synchronizer::new(collection(), ShareLink::new(LINK_BASE))
        .entries()
        .iter()
        .enumerate()
    {
        let slug = galleria::slugify(&entry.title);
        let query = format!("?{}={}", SLIDE_PARAM, slug);
        let harness = Harness::mount(Some(&query));
        assert_eq!(harness.sync.thumb_index(), i);
        assert_eq!(harness.slide().as_deref(), Some(slug.as_str()));
    }
}

#[test]
fn stepping_back_and_forth_keeps_link_and_reset_consistent() {
    let mut harness = Harness::mount(None);

    harness.thumbs.step(1);
    harness.pump();
    assert_eq!(harness.slide().as_deref(), Some("black-widow"));

    harness.thumbs.step(-1);
    harness.pump();
    assert_eq!(harness.slide().as_deref(), Some("pride-month-2021"));
    assert_eq!(harness.sync.main_index(), 0);
    assert_eq!(harness.main.len(), 2);
}
