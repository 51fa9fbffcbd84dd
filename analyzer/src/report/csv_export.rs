use std::io::Write;

use shared::{RepositoryActivity, RepositoryScoreTable};

pub const HEADER: [&str; 12] = [
    "name",
    "feat/bug PR count",
    "feat/bug PR score",
    "doc PR count",
    "doc PR score",
    "typo PR count",
    "typo PR score",
    "feat/bug issue count",
    "feat/bug issue score",
    "doc issue count",
    "doc issue score",
    "total",
];

/// Rows follow the ranking; counts are the raw, uncapped ones.
pub fn write_csv<W: Write>(
    out: W,
    scores: &RepositoryScoreTable,
    activity: &RepositoryActivity,
) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    wtr.write_record(HEADER)?;

    for row in &scores.rows {
        let score = &row.score;
        let record = activity
            .get(&score.participant)
            .copied()
            .unwrap_or_default();

        wtr.write_record([
            score.participant.clone(),
            record.pull_requests.bug_and_feat.to_string(),
            score.pr_feature.to_string(),
            record.pull_requests.doc.to_string(),
            score.pr_doc.to_string(),
            record.pull_requests.typo.to_string(),
            score.pr_typo.to_string(),
            record.issues.bug_and_feat.to_string(),
            score.issue_feature.to_string(),
            record.issues.doc.to_string(),
            score.issue_doc.to_string(),
            score.total.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
