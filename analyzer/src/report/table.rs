use chrono::{DateTime, Utc};
use comfy_table::{presets::ASCII_FULL, CellAlignment, Table};
use shared::RepositoryScoreTable;

use crate::names::UserNameCache;

pub const TITLE: &str = "Contribution Score by Participant";

pub const COLUMNS: [&str; 9] = [
    "Rank",
    "Participant",
    "feat/bug PR score",
    "doc PR score",
    "typo PR score",
    "feat/bug issue score",
    "doc issue score",
    "Total",
    "Rate(%)",
];

pub fn render(
    scores: &RepositoryScoreTable,
    names: Option<&UserNameCache>,
    generated_at: DateTime<Utc>,
) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(COLUMNS);

    for row in &scores.rows {
        let score = &row.score;
        let participant = match names {
            Some(names) => names.display(&score.participant),
            None => score.participant.clone(),
        };
        table.add_row(vec![
            row.rank.to_string(),
            participant,
            score.pr_feature.to_string(),
            score.pr_doc.to_string(),
            score.pr_typo.to_string(),
            score.issue_feature.to_string(),
            score.issue_doc.to_string(),
            score.total.to_string(),
            format!("{}%", row.rate_percent()),
        ]);
    }

    for index in (0..COLUMNS.len()).filter(|&i| i != 1) {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    format!(
        "{TITLE}\nGenerated at {}\n\n{table}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
