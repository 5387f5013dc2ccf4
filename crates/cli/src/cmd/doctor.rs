use membank_core::config::loader::{ConfigLoader, default_config_path};
use std::path::Path;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            crate::logging::init(&rc);
            let settings = rc.index_settings();

            println!("OK   mbk doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("bank_root: {}", rc.bank_root.display());
            println!("index_file: {}", settings.index_file().display());
            println!("index.max_age_hours: {}", rc.index.max_age_hours);
            println!("index.auto_rebuild: {}", rc.index.auto_rebuild);
            println!("index.rebuild_delay_ms: {}", rc.index.rebuild_delay_ms);
            println!("index.extensions: {}", rc.index.extensions.join(", "));
            for folder in &rc.excluded_folders {
                println!("excluded: {}", folder.display());
            }
            if !rc.bank_root.is_dir() {
                println!("WARN bank_root does not exist or is not a directory");
            }
        }
        Err(e) => {
            println!("FAIL mbk doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
