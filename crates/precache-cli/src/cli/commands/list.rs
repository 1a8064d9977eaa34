//! `wp-precache list` – show cached artifacts.

use anyhow::Result;
use precache_core::cache::{CacheStore, FileCache};

pub fn run_list(store: &FileCache) -> Result<()> {
    let entries = store.entries()?;
    if entries.is_empty() {
        println!("Cache at {} is empty.", store.root().display());
    } else {
        println!("{:<12} {}", "SIZE", "KEY");
        for e in entries {
            println!("{:<12} {}", e.size, e.key);
        }
    }
    Ok(())
}
