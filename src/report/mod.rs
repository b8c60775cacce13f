//! Console rendering of run results.

use crate::processors::jnd::{format_jnd, SubjectSummary, CONDITIONS};

const BOX_WIDTH: usize = 62;
const KEY_WIDTH: usize = 20;
const VALUE_WIDTH: usize = BOX_WIDTH - KEY_WIDTH - 2;

/// Format a boxed `key: value` summary.
pub fn format_summary(title: &str, items: &[(&str, String)]) -> String {
    let rule = "═".repeat(BOX_WIDTH + 2);
    let mut out = String::new();

    out.push_str(&format!("╔{}╗\n", rule));
    out.push_str(&format!("║ {:<width$} ║\n", title, width = BOX_WIDTH));
    out.push_str(&format!("╠{}╣\n", rule));
    for (key, value) in items {
        let display_value = if value.chars().count() > VALUE_WIDTH {
            let head: String = value.chars().take(VALUE_WIDTH - 3).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        out.push_str(&format!(
            "║ {:<kw$}: {:<vw$} ║\n",
            key,
            display_value,
            kw = KEY_WIDTH,
            vw = VALUE_WIDTH
        ));
    }
    out.push_str(&format!("╚{}╝\n", rule));
    out
}

/// Print a summary box
pub fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    print!("{}", format_summary(title, items));
    println!();
}

/// Render summary rows as a Markdown pipe table.
///
/// Text columns are left-aligned and JND columns right-aligned. Values use
/// the same text as the summary CSV; absent values are blank cells.
pub fn render_summary_table(summaries: &[SubjectSummary]) -> String {
    let mut headers = vec![
        "filename".to_string(),
        "Subj_ID".to_string(),
        "Group".to_string(),
    ];
    headers.extend(CONDITIONS.iter().map(|c| c.column_name()));
    let text_columns = 3;

    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            let mut row = vec![s.filename.clone(), s.subj_id.clone(), s.group.to_string()];
            row.extend(s.jnd_values().into_iter().map(format_jnd));
            row
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i < text_columns {
                    format!(" {:<w$} ", cell, w = widths[i])
                } else {
                    format!(" {:>w$} ", cell, w = widths[i])
                }
            })
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let separator: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            if i < text_columns {
                format!(":{}", "-".repeat(w + 1))
            } else {
                format!("{}:", "-".repeat(w + 1))
            }
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(&headers));
    lines.push(format!("|{}|", separator.join("|")));
    lines.extend(rows.iter().map(|r| format_row(r)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::jnd::Group;

    fn summary(filename: &str, subj: &str, group: Group, jnd: [Option<f64>; 4]) -> SubjectSummary {
        SubjectSummary {
            filename: filename.to_string(),
            subj_id: subj.to_string(),
            group,
            jnd_500_1000: jnd[0],
            jnd_500_100: jnd[1],
            jnd_3000_1000: jnd[2],
            jnd_3000_100: jnd[3],
        }
    }

    #[test]
    fn test_render_summary_table() {
        let table = render_summary_table(&[
            summary("s01.csv", "S01", Group::Old, [Some(2.0), Some(12.5), None, Some(30.0)]),
            summary("young_02.csv", "Y2", Group::Young, [None; 4]),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("| filename     | Subj_ID | Group |"));
        assert!(lines[0].ends_with("| JND_3000_100 |"));
        assert!(lines[1].starts_with("|:-------------|:--------|:------|"));
        assert!(lines[1].ends_with("-------------:|"));
        assert!(lines[2].contains("| s01.csv      | S01     | Old   |"));
        assert!(lines[2].contains("|        12.5 |"));
        assert!(lines[2].contains("|          2.0 |"));
        assert!(lines[3].ends_with(&format!("|{}|", " ".repeat(14))));

        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]));
    }

    #[test]
    fn test_render_summary_table_empty() {
        let table = render_summary_table(&[]);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_format_summary_truncates() {
        let long = "x".repeat(80);
        let text = format_summary("Run", &[("Output", long), ("Files", "3".to_string())]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[3].contains("..."));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]));
    }
}
