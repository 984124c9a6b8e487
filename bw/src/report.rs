//! Rendering of change reports
//!
//! Pure functions only; the caller decides where the text goes.

use crate::domain::ChangeReport;

/// Render a report as human-readable text
///
/// ```text
/// Number of new commits: 1 (aaa1110..bbb2220)
/// bbb2220: Fix bug (Jane)
///
/// src/x.py (modified)
/// ```
pub fn render(report: &ChangeReport) -> String {
    match report {
        ChangeReport::FirstRun { observed_tip } => {
            format!("First run detected. Baseline set to {}.", observed_tip.short())
        }
        ChangeReport::NoChange { .. } => "No changes detected since last check.".to_string(),
        ChangeReport::Changed {
            previous_tip,
            new_tip,
            ahead_by,
            commits,
            files,
        } => {
            let mut lines = Vec::with_capacity(commits.len() + files.len() + 2);
            lines.push(format!(
                "Number of new commits: {} ({}..{})",
                ahead_by,
                previous_tip.short(),
                new_tip.short()
            ));
            lines.extend(
                commits
                    .iter()
                    .map(|c| format!("{}: {} ({})", c.sha.short(), c.message, c.author)),
            );
            lines.push(String::new());
            lines.extend(files.iter().map(|f| format!("{} ({})", f.path, f.status)));
            lines.join("\n")
        }
    }
}

/// Render a report as pretty JSON for machine consumers
pub fn render_json(report: &ChangeReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
