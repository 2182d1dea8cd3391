//! Per-thread summary JSON writer

use crate::output::ensure_parent_dir;
use crate::pipeline::ThreadSummary;
use crate::Result;
use std::path::Path;

/// Writes the summary document: a pretty-printed JSON array with one
/// object per successfully crawled thread, in input order
pub fn write_summary_json(path: &Path, summaries: &[ThreadSummary]) -> Result<()> {
    ensure_parent_dir(path)?;

    let json = serde_json::to_string_pretty(summaries)?;
    std::fs::write(path, json)?;

    tracing::info!(
        "Wrote summary for {} threads to {}",
        summaries.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ThreadInput;
    use crate::pipeline::summarize_thread;
    use tempfile::TempDir;

    #[test]
    fn test_summary_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");

        let empty = summarize_thread(&ThreadInput::new("https://forum.example.com/t-1.html"), &[]);
        write_summary_json(&path, &[empty]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0]["thread_url"],
            "https://forum.example.com/t-1.html"
        );
        assert_eq!(entries[0]["post_count"], 0);
        assert!(entries[0]["avg_compound"].is_null());
    }

    #[test]
    fn test_empty_run_is_an_empty_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");

        write_summary_json(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }
}
