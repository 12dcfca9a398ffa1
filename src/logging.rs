// the terminal belongs to the tui, so the log goes to a file next to the
// settings instead. RUST_LOG overrides the default "info" filter.
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::pipeline::settings::DRUMGRID_DIR;

const LOG_FILE: &str = "drumgrid.log";

pub fn log_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DRUMGRID_DIR).join(LOG_FILE)
}

pub fn init(project_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = log_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(path)
}
