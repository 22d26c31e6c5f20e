use clap::{Arg, ArgAction, Command};
use colored::*;
use rayon::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use galleria::slug::{resolve, slugify};
use galleria::store::{sort_entries_by_date, Gallery, GalleryEntry};

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("galleria")
        .version("0.1")
        .about("Inspect and validate gallery manifests")
        .arg(
            Arg::new("manifest")
                .short('m')
                .long("manifest")
                .value_name("FILE")
                .help("Path to the gallery manifest (JSON)")
                .required(true),
        )
        .arg(
            Arg::new("slide")
                .short('s')
                .long("slide")
                .value_name("SLUG")
                .help("Resolve a deep-link slug against the manifest"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .action(ArgAction::SetTrue)
                .help("Verify that every referenced image exists and decodes"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("NUM")
                .help("Number of threads for --check (default: auto-detect)")
                .default_value("0"),
        )
        .get_matches();

    let manifest_path = PathBuf::from(matches.get_one::<String>("manifest").unwrap());
    let threads = matches
        .get_one::<String>("threads")
        .unwrap()
        .parse::<usize>()
        .map_err(|_| "Invalid threads value")?;

    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
    }

    // Loading validates the entry-store contract: non-empty image lists,
    // preview indices in range, unique slugs.
    let gallery = Gallery::from_path(&manifest_path)?;

    let mut entries = gallery.entries.clone();
    sort_entries_by_date(&mut entries);

    println!(
        "{} {} entries in {}",
        "Found".bold().blue(),
        entries.len(),
        manifest_path.display()
    );
    print_listing(&entries);

    if let Some(slug) = matches.get_one::<String>("slide") {
        print_resolution(slug, &entries);
    }

    if matches.get_flag("check") {
        let manifest_dir = manifest_path.parent().unwrap_or(Path::new("."));
        check_images(&entries, manifest_dir)?;
    }

    Ok(())
}

fn print_listing(entries: &[GalleryEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        let date = entry
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let creator = entry.creator.as_deref().unwrap_or("-");
        println!(
            "  {:>3}  {}  {} ({} images, {}, {})",
            i,
            slugify(&entry.title).green(),
            entry.title,
            entry.image_urls.len(),
            date,
            creator
        );
    }
}

fn print_resolution(slug: &str, entries: &[GalleryEntry]) {
    match resolve(slug, entries) {
        Some(index) => {
            println!(
                "{} '{}' -> entry {} ({})",
                "Resolved".bold().green(),
                slug,
                index,
                entries[index].title
            );
        }
        None => {
            // A miss is not an error: the viewer falls back to the first entry.
            println!(
                "{}: '{}' does not match any entry; the viewer would fall back to '{}'",
                "Warning".yellow(),
                slug,
                entries[0].title
            );
        }
    }
}

fn check_images(entries: &[GalleryEntry], manifest_dir: &Path) -> Result<(), Box<dyn Error>> {
    let images: Vec<(String, PathBuf)> = entries
        .iter()
        .flat_map(|entry| {
            entry
                .image_urls
                .iter()
                .map(|url| (entry.title.clone(), manifest_dir.join(url)))
        })
        .collect();

    let total = images.len();
    println!(
        "{} {} images with {} threads...",
        "Checking".bold().cyan(),
        total,
        rayon::current_num_threads()
    );

    let start_time = Instant::now();
    let checked_count = AtomicUsize::new(0);

    let failures: Vec<String> = images
        .par_iter()
        .filter_map(|(title, path)| {
            let result = image::open(path)
                .err()
                .map(|e| format!("{}: {} ({})", title, path.display(), e));

            let current = checked_count.fetch_add(1, Ordering::Relaxed) + 1;
            if current % 50 == 0 || current == total {
                println!("{} {}/{}", "Checked".green(), current, total);
            }
            result
        })
        .collect();

    let elapsed = start_time.elapsed();
    if failures.is_empty() {
        println!("{}", "All images decode cleanly!".bold().green());
        println!("{}: {:.2?}", "Check time".blue(), elapsed);
        Ok(())
    } else {
        for failure in &failures {
            eprintln!("  {}: {}", "Failed".red(), failure);
        }
        Err(format!("{} of {} images failed to decode", failures.len(), total).into())
    }
}
