use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;

use eframe::egui;
use rfd::FileDialog;
use serde::{Deserialize, Serialize};

use crate::carousel::{Carousel, CarouselOptions, HeightSpring, Tile};
use crate::location::ShareLink;
use crate::store::Gallery;
use crate::sync::{Command, Synchronizer};

const THUMB_TILE_W: f32 = 140.0;
const THUMB_TILE_H: f32 = 90.0;
const MAIN_SLIDE_FRACTION: f32 = 0.8;
const DEFAULT_MAIN_HEIGHT: f32 = 420.0;
// Below this width the prev/next affordances are hidden (mobile-class layout).
const NARROW_VIEWPORT_PX: f32 = 700.0;
const DEFAULT_LINK_BASE: &str = "https://gallery.example.org";

/// Last-session state, persisted under the user config directory.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RecentConfig {
    last_manifest: Option<PathBuf>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("galleria").join("recent.json"))
}

fn load_recent() -> RecentConfig {
    let Some(path) = config_path() else {
        return RecentConfig::default();
    };
    match fs::read_to_string(&path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        Err(_) => RecentConfig::default(),
    }
}

fn save_recent(config: &RecentConfig) {
    let Some(path) = config_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("Could not create config directory: {}", e);
            return;
        }
    }
    match serde_json::to_string_pretty(config) {
        Ok(raw) => {
            if let Err(e) = fs::write(&path, raw) {
                log::warn!("Could not save recents: {}", e);
            }
        }
        Err(e) => log::warn!("Could not serialize recents: {}", e),
    }
}

fn open_with_system_viewer(path: &Path) {
    #[cfg(target_os = "windows")]
    let result = ProcessCommand::new("cmd")
        .args(["/C", "start", ""])
        .arg(path)
        .spawn();
    #[cfg(target_os = "macos")]
    let result = ProcessCommand::new("open").arg(path).spawn();
    #[cfg(all(unix, not(target_os = "macos")))]
    let result = ProcessCommand::new("xdg-open").arg(path).spawn();

    if let Err(e) = result {
        log::warn!("Could not open {}: {}", path.display(), e);
    }
}

pub struct GalleryApp {
    sync: Option<Synchronizer<ShareLink>>,
    thumbs: Carousel,
    main: Carousel,
    height: HeightSpring,
    /// Decoded textures by image URL; `None` marks a failed decode so it is
    /// not retried every frame.
    textures: HashMap<String, Option<egui::TextureHandle>>,
    manifest_dir: Option<PathBuf>,
    /// Deep link read once, on the first frame after a gallery is installed.
    deep_link_pending: bool,
    initial_query: Option<String>,
    status: String,
}

impl GalleryApp {
    pub fn new(manifest: Option<PathBuf>, initial_query: Option<String>) -> Self {
        let mut app = GalleryApp {
            sync: None,
            thumbs: Carousel::new(egui::Vec2::new(THUMB_TILE_W, THUMB_TILE_H)),
            main: Carousel::new(egui::Vec2::new(640.0, DEFAULT_MAIN_HEIGHT)),
            height: HeightSpring::new(DEFAULT_MAIN_HEIGHT),
            textures: HashMap::new(),
            manifest_dir: None,
            deep_link_pending: false,
            initial_query,
            status: "No gallery loaded".to_string(),
        };

        let manifest = manifest.or_else(|| load_recent().last_manifest);
        if let Some(path) = manifest {
            app.load_gallery(&path);
        }
        app
    }

    fn load_gallery(&mut self, path: &Path) {
        let gallery = match Gallery::from_path(path) {
            Ok(gallery) => gallery,
            Err(e) => {
                log::warn!("Failed to load {}: {}", path.display(), e.0);
                self.status = e.0;
                return;
            }
        };

        log::info!("Loaded {} entries from {}", gallery.len(), path.display());
        self.status = format!("{} entries from {}", gallery.len(), path.display());

        let base = gallery
            .link_base
            .clone()
            .unwrap_or_else(|| DEFAULT_LINK_BASE.to_string());
        let link = match self.initial_query.take() {
            Some(query) => ShareLink::with_query(&base, &query),
            None => ShareLink::new(&base),
        };

        let sync = Synchronizer::new(gallery, link);
        self.thumbs = Carousel::new(egui::Vec2::new(THUMB_TILE_W, THUMB_TILE_H));
        self.thumbs.set_len(sync.entries().len());
        self.main = Carousel::new(egui::Vec2::new(640.0, DEFAULT_MAIN_HEIGHT));
        self.main.set_len(sync.selected_entry().image_urls.len());
        self.sync = Some(sync);

        self.textures.clear();
        self.manifest_dir = path.parent().map(|p| p.to_path_buf());
        self.deep_link_pending = true;

        save_recent(&RecentConfig {
            last_manifest: Some(path.to_path_buf()),
        });
    }

    fn image_path(&self, url: &str) -> Option<PathBuf> {
        if url.starts_with("http://") || url.starts_with("https://") {
            // Remote assets are out of scope; manifests ship local files.
            return None;
        }
        let path = PathBuf::from(url);
        if path.is_absolute() {
            Some(path)
        } else {
            self.manifest_dir.as_ref().map(|dir| dir.join(url))
        }
    }

    fn texture_for(&mut self, ctx: &egui::Context, url: &str) -> Option<egui::TextureHandle> {
        if let Some(cached) = self.textures.get(url) {
            return cached.clone();
        }

        let loaded = self.image_path(url).and_then(|path| match image::open(&path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [rgba.width() as usize, rgba.height() as usize],
                    rgba.as_raw(),
                );
                Some(ctx.load_texture(url.to_string(), color_image, Default::default()))
            }
            Err(e) => {
                log::warn!("Could not decode {}: {}", path.display(), e);
                None
            }
        });

        self.textures.insert(url.to_string(), loaded.clone());
        loaded
    }

    fn apply_commands(&mut self, commands: Vec<Command>) {
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

    fn download_current(&mut self) {
        let Some(sync) = self.sync.as_ref() else {
            return;
        };
        let url = sync.selected_entry().image_urls[sync.main_index()].clone();
        let Some(source) = self.image_path(&url) else {
            self.status = format!("Cannot download remote image {}", url);
            return;
        };
        let Some(downloads) = dirs::download_dir() else {
            self.status = "No download directory available".to_string();
            return;
        };
        let file_name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "image".into());
        let dest = downloads.join(file_name);
        match fs::copy(&source, &dest) {
            Ok(_) => self.status = format!("Saved to {}", dest.display()),
            Err(e) => self.status = format!("Download failed: {}", e),
        }
    }

    fn open_current(&mut self) {
        let Some(sync) = self.sync.as_ref() else {
            return;
        };
        let url = sync.selected_entry().image_urls[sync.main_index()].clone();
        match self.image_path(&url) {
            Some(path) => open_with_system_viewer(&path),
            None => self.status = format!("Cannot open remote image {}", url),
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Galleria");

            if ui.button("📁 Open Gallery").clicked() {
                let picked = FileDialog::new()
                    .add_filter("Gallery manifest", &["json"])
                    .pick_file();
                if let Some(path) = picked {
                    self.load_gallery(&path);
                }
            }

            if let Some(sync) = self.sync.as_ref() {
                let href = sync.location().href();
                ui.separator();
                ui.monospace(href.as_str());
                if ui.button("Copy link").clicked() {
                    ctx.output_mut(|o| o.copied_text = href);
                    self.status = "Link copied".to_string();
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(&self.status);
            });
        });
    }

    fn show_thumbnails(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let urls: Vec<String> = match self.sync.as_ref() {
            Some(sync) => sync
                .entries()
                .iter()
                .map(|entry| entry.preview_url().to_string())
                .collect(),
            None => return,
        };
        let tiles: Vec<Tile> = urls
            .iter()
            .map(|url| Tile {
                texture: self.texture_for(ctx, url),
            })
            .collect();

        let opts = CarouselOptions {
            select_on_click: true,
            highlight_selected: true,
        };
        let response = self.thumbs.ui(ui, &tiles, &opts);

        if let Some(index) = response.selection_changed {
            self.on_thumb_settled(index);
        }
    }

    fn on_thumb_settled(&mut self, index: usize) {
        let Some(sync) = self.sync.as_mut() else {
            return;
        };
        let commands = sync.thumb_selected(index);
        let images = sync.selected_entry().image_urls.len();
        // The main carousel always shows exactly the selected entry's images.
        self.main.set_len(images);
        self.apply_commands(commands);
    }

    fn show_main(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, wide: bool) {
        let Some(sync) = self.sync.as_ref() else {
            ui.centered_and_justified(|ui| {
                ui.label("Open a gallery manifest to start browsing");
            });
            return;
        };

        let entry = sync.selected_entry();
        let title = entry.title.clone();
        let description = entry.description.clone();
        let date = entry.date;
        let creator = entry.creator.clone();
        let urls = entry.image_urls.clone();
        let main_index = sync.main_index();

        ui.vertical(|ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(&title);
                if let Some(date) = date {
                    ui.weak(date.format("%B %e, %Y").to_string());
                }
                if let Some(creator) = &creator {
                    ui.weak(format!("by {}", creator));
                }
            });
            if let Some(description) = &description {
                ui.label(description);
            }
            ui.add_space(4.0);

            let tiles: Vec<Tile> = urls
                .iter()
                .map(|url| Tile {
                    texture: self.texture_for(ctx, url),
                })
                .collect();

            // Ease the container toward the snapped slide's natural height.
            let avail = ui.available_size();
            let slide_width = avail.x * MAIN_SLIDE_FRACTION;
            let controls_reserve = 40.0;
            // Tallest slide among the snapped one and its neighbors, which
            // is what can be on screen at once.
            let visible = main_index.saturating_sub(1)..(main_index + 2).min(tiles.len());
            let target_height = tiles[visible]
                .iter()
                .filter_map(|tile| tile.texture.as_ref())
                .map(|texture| {
                    let size = texture.size_vec2();
                    size.y * (slide_width / size.x).min(1.0)
                })
                .reduce(f32::max)
                .map(|h| h.min(avail.y - controls_reserve).max(120.0))
                .unwrap_or_else(|| DEFAULT_MAIN_HEIGHT.min(avail.y - controls_reserve));
            self.height.set_target(target_height);
            let dt = ui.input(|i| i.stable_dt).min(0.25);
            if self.height.tick(dt) {
                ctx.request_repaint();
            }
            self.main
                .set_tile_size(egui::Vec2::new(slide_width, self.height.value()));

            let opts = CarouselOptions {
                select_on_click: false,
                highlight_selected: false,
            };
            let response = self.main.ui(ui, &tiles, &opts);

            if let Some(index) = response.selection_changed {
                if let Some(sync) = self.sync.as_mut() {
                    sync.main_selected(index);
                }
            }

            // Per-slide actions, visible only on the snapped slide.
            if let Some(rect) = response.snapped_rect {
                let actions = egui::Rect::from_min_size(
                    egui::Pos2::new(rect.left() + 8.0, rect.top() + 8.0),
                    egui::Vec2::new(160.0, 24.0),
                );
                let mut open_clicked = false;
                let mut download_clicked = false;
                ui.allocate_ui_at_rect(actions, |ui| {
                    ui.horizontal(|ui| {
                        open_clicked = ui.button("↗ Open").clicked();
                        download_clicked = ui.button("⬇ Save").clicked();
                    });
                });
                if open_clicked {
                    self.open_current();
                }
                if download_clicked {
                    self.download_current();
                }
            }

            if wide {
                ui.horizontal(|ui| {
                    // Prev/next delegate to the thumbnail carousel's own snap
                    // stepping; the selection event does the rest.
                    if ui.button("◀ Previous").clicked() {
                        self.thumbs.step(-1);
                    }
                    if ui.button("Next ▶").clicked() {
                        self.thumbs.step(1);
                    }
                    ui.label(format!("Image {} of {}", main_index + 1, urls.len()));
                });
            }
        });
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Deep-link restoration runs once, before any panel draws, so the
        // first visible frame is already on the linked entry.
        if self.deep_link_pending {
            self.deep_link_pending = false;
            if let Some(sync) = self.sync.as_mut() {
                let commands = sync.resolve_deep_link();
                self.apply_commands(commands);
            }
        }

        let wide = ctx.screen_rect().width() >= NARROW_VIEWPORT_PX;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.show_toolbar(ctx, ui);
        });

        egui::TopBottomPanel::bottom("thumbnails").show(ctx, |ui| {
            self.show_thumbnails(ctx, ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_main(ctx, ui, wide);
        });

        // Keyboard navigation drives the main carousel only.
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.main.step(-1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.main.step(1);
        }
    }
}
