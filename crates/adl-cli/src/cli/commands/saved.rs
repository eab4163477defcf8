//! `adl saved` – list or delete saved server-mode downloads.

use adl_core::config::AdlConfig;
use adl_core::library;
use anyhow::Result;

pub fn run_saved(cfg: &AdlConfig, delete: Option<&str>) -> Result<()> {
    let root = &cfg.download_dir;
    if let Some(name) = delete {
        library::delete_saved(root, name)?;
        println!("Deleted {}", name);
        return Ok(());
    }

    let saved = library::list_saved(root)?;
    if saved.is_empty() {
        println!("No saved downloads in {}.", root.display());
        return Ok(());
    }
    println!("{:<32} {:<6} {:<12} {}", "NAME", "FILES", "SIZE", "CREATED");
    for d in saved {
        println!(
            "{:<32} {:<6} {:<12} {}",
            d.name,
            d.files,
            d.size,
            d.created.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
