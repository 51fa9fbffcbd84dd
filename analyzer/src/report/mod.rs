use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use shared::{RepositoryActivity, RepositoryScoreTable};
use tracing::info;

use crate::{cli::OutputFormat, names::UserNameCache};

pub mod csv_export;
pub mod table;

/// Files of one map are written to `<output>/<label>/<last label segment>.<ext>`.
pub fn report_path(output: &Path, label: &str, extension: &str) -> PathBuf {
    let mut path = output.to_path_buf();
    let mut file_name = label;
    for segment in label.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
        file_name = segment;
    }
    path.join(format!("{file_name}.{extension}"))
}

pub struct ReportWriter<'a> {
    pub output: &'a Path,
    pub format: OutputFormat,
    pub names: Option<&'a UserNameCache>,
    pub generated_at: DateTime<Utc>,
}

impl ReportWriter<'_> {
    /// Writes the requested files for one map and returns their paths.
    ///
    /// The text table is also printed to stdout.
    pub fn write(
        &self,
        label: &str,
        activity: &RepositoryActivity,
        scores: &RepositoryScoreTable,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if self.format.includes_table() {
            let text = table::render(scores, self.names, self.generated_at);
            println!("\n[{label}]\n{text}");

            let path = report_path(self.output, label, "txt");
            create_parent(&path)?;
            fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }

        if self.format.includes_csv() {
            let path = report_path(self.output, label, "csv");
            create_parent(&path)?;
            let file =
                File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
            csv_export::write_csv(BufWriter::new(file), scores, activity)?;
            written.push(path);
        }

        for path in &written {
            info!("Saved {}", path.display());
        }
        Ok(written)
    }
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use shared::{ActivityRecord, Bucket, TOTAL_LABEL};

    use super::*;

    #[test]
    fn paths_per_label() {
        let output = Path::new("results");
        assert_eq!(
            report_path(output, "near/nearcore", "txt"),
            PathBuf::from("results/near/nearcore/nearcore.txt")
        );
        assert_eq!(
            report_path(output, TOTAL_LABEL, "csv"),
            PathBuf::from("results/total/total.csv")
        );
    }

    #[test]
    fn writes_requested_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut activity = RepositoryActivity::new();
        let mut record = ActivityRecord::default();
        record.record(Bucket::PrFeatureBug);
        activity.insert("alice".to_string(), record);
        let scores = RepositoryScoreTable::from_activity(&activity);

        let writer = ReportWriter {
            output: dir.path(),
            format: OutputFormat::Csv,
            names: None,
            generated_at: Utc::now(),
        };
        let written = writer.write("owner/repo", &activity, &scores).unwrap();
        assert_eq!(written, vec![dir.path().join("owner/repo/repo.csv")]);
        assert!(!dir.path().join("owner/repo/repo.txt").exists());

        let writer = ReportWriter {
            format: OutputFormat::All,
            ..writer
        };
        let written = writer.write("owner/repo", &activity, &scores).unwrap();
        assert_eq!(written.len(), 2);

        let text = fs::read_to_string(dir.path().join("owner/repo/repo.txt")).unwrap();
        assert!(text.starts_with(table::TITLE));
        assert!(text.contains("100.00%"));
        let csv = fs::read_to_string(dir.path().join("owner/repo/repo.csv")).unwrap();
        assert!(csv.ends_with("alice,1,3,0,0,0,0,0,0,0,0,3\n"));
    }
}
