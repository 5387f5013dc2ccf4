//! Reindex command implementation.

use std::path::Path;

use membank_core::index::format_size;

use super::{load_config, open_store};

/// Run the reindex command.
pub async fn run(config: Option<&Path>, profile: Option<&str>) {
    let rc = load_config(config, profile);
    let store = open_store(&rc).await;

    println!("Indexing memory bank: {}", rc.bank_root.display());

    match store.build_index().await {
        Ok(result) => {
            println!();
            println!("Indexing complete:");
            println!("  Files found:    {}", result.files_processed);
            println!("  Files indexed:  {}", result.files_indexed);
            if result.files_errored > 0 {
                println!("  Files errored:  {}", result.files_errored);
                for failure in &result.errors {
                    println!("    {}: {}", failure.relative_path, failure.error);
                }
            }
            println!("  Total size:     {}", format_size(result.stats.total_size_bytes));
            println!("  Duration:       {}ms", result.duration);
            println!();
            println!("Index stored at: {}", store.settings().index_file().display());
        }
        Err(e) => {
            eprintln!("\nError during indexing: {}", e);
            std::process::exit(1);
        }
    }
}
