//! Output writers
//!
//! Two artifacts per run, one file per sink:
//! - `posts_csv`: the flat scored-post table
//! - `summary_json`: the per-thread sentiment summary

mod posts_csv;
mod summary_json;

pub use posts_csv::{write_posts_csv, POSTS_HEADER};
pub use summary_json::write_summary_json;

use crate::Result;
use std::path::Path;

/// Creates the parent directory of an output path when it has one
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
