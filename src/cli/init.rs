use std::path::PathBuf;

use crate::db::SqliteStorage;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists, shellexpand_path};

pub fn run(data_dir: Option<String>, user_name: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(name) = user_name {
        settings.user_name = name;
    }
    let existed = settings_file_exists();

    let resolved = PathBuf::from(&settings.data_dir);
    SqliteStorage::open_in_data_dir(&resolved)?;
    save_settings(&settings)?;

    if existed {
        println!("Updated settings. Data directory: {}", resolved.display());
    } else {
        println!("Initialized finflow in {}", resolved.display());
    }
    Ok(())
}
