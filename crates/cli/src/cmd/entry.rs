//! Single-entry commands: show, update, remove.

use std::path::Path;

use super::output::print_json;
use super::{load_config, open_store};

pub async fn show(config: Option<&Path>, profile: Option<&str>, path: &str) {
    let rc = load_config(config, profile);
    let store = open_store(&rc).await;

    match store.get_entry(path) {
        Ok(Some(entry)) => print_json(&entry),
        Ok(None) => {
            eprintln!("No index entry for {}", path);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error reading index: {}", e);
            std::process::exit(1);
        }
    }
}

pub async fn update(config: Option<&Path>, profile: Option<&str>, path: &str) {
    let rc = load_config(config, profile);
    let store = open_store(&rc).await;
    let existed = matches!(store.get_entry(path), Ok(Some(_)));

    match store.update_entry(path).await {
        Ok(entry) => {
            let verb = if existed { "Updated" } else { "Added" };
            println!("{} {} ({})", verb, entry.relative_path, entry.file_metrics.size_formatted);
        }
        Err(e) => {
            eprintln!("Error updating {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

pub async fn remove(config: Option<&Path>, profile: Option<&str>, path: &str) {
    let rc = load_config(config, profile);
    let store = open_store(&rc).await;

    match store.remove_entry(path).await {
        Ok(true) => println!("Removed {}", path),
        Ok(false) => println!("No index entry for {}", path),
        Err(e) => {
            eprintln!("Error removing {}: {}", path, e);
            std::process::exit(1);
        }
    }
}
