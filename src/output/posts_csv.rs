//! Scored-post CSV writer

use crate::output::ensure_parent_dir;
use crate::pipeline::ScoredPost;
use crate::Result;
use std::path::Path;

/// Fixed column order of the post-level output
///
/// Must match the field order of [`ScoredPost`]; downstream consumers key
/// on these names and positions.
pub const POSTS_HEADER: &[&str] = &[
    "thread_url",
    "page_url",
    "post_id",
    "author",
    "posted_at",
    "heading",
    "text",
    "compound",
    "label",
    "pos",
    "neg",
    "neu",
];

/// Writes the flat post table
///
/// The header row is always written, so a run with zero posts still
/// produces a well-formed file with a stable shape. Optional fields
/// serialize as empty cells.
pub fn write_posts_csv(path: &Path, rows: &[ScoredPost]) -> Result<()> {
    ensure_parent_dir(path)?;

    // Header written by hand so the columns do not depend on serde's
    // first-row behavior
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(POSTS_HEADER)?;

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    tracing::info!("Wrote {} posts to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Label;
    use tempfile::TempDir;

    fn row(text: &str, compound: f64) -> ScoredPost {
        ScoredPost {
            thread_url: "https://forum.example.com/t-1.html".to_string(),
            page_url: "https://forum.example.com/t-1.html".to_string(),
            post_id: Some("m1".to_string()),
            author: None,
            posted_at: None,
            heading: None,
            text: text.to_string(),
            compound,
            label: Label::from_compound(compound),
            pos: 0.5,
            neg: 0.0,
            neu: 0.5,
        }
    }

    #[test]
    fn test_header_written_for_empty_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.csv");

        write_posts_csv(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), POSTS_HEADER.join(","));
    }

    #[test]
    fn test_rows_follow_header_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.csv");

        write_posts_csv(&path, &[row("up big", 0.8), row("down bad", -0.6)]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            POSTS_HEADER
        );

        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][6], "up big");
        assert_eq!(&records[0][8], "positive");
        assert_eq!(&records[1][8], "negative");
        // Absent optional fields are empty cells
        assert_eq!(&records[0][3], "");
    }

    #[test]
    fn test_parent_directories_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("posts.csv");

        write_posts_csv(&path, &[row("anything", 0.0)]).unwrap();
        assert!(path.exists());
    }
}
