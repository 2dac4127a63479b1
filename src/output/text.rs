//! Plain-text rendering of visible rows for the terminal.

use crate::navigation::RowView;

const NAME_WIDTH: usize = 60;

/// Render rows as an indented table
///
/// **Public** - used by the analyze command
///
/// # Arguments
/// * `rows` - Rows in display order
/// * `max_rows` - Stop after this many rows (a trailer notes the rest)
pub fn render_rows(rows: &[RowView], max_rows: usize) -> String {
    let mut lines = Vec::with_capacity(rows.len().min(max_rows) + 3);

    lines.push(format!(
        "  {:<width$} {:>10} {:>10} {:>8}",
        "Function",
        "Inclusive",
        "Exclusive",
        "%",
        width = NAME_WIDTH
    ));
    lines.push(format!("  {}", "-".repeat(NAME_WIDTH + 31)));

    for row in rows.iter().take(max_rows) {
        let label = format!("{}{}", "  ".repeat(row.depth), row.display_name);
        lines.push(format!(
            "  {:<width$} {:>10} {:>10} {:>8}",
            truncate(&label, NAME_WIDTH),
            row.inclusive_count,
            row.exclusive_count,
            row.percentage_string,
            width = NAME_WIDTH
        ));
    }

    if rows.len() > max_rows {
        lines.push(format!("  ... {} more rows", rows.len() - max_rows));
    }

    lines.join("\n")
}

/// **Private** - keeps the tail of long labels
fn truncate(label: &str, width: usize) -> String {
    let count = label.chars().count();
    if count <= width {
        return label.to_string();
    }
    let tail: String = label.chars().skip(count - (width - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::NodePath;

    fn row(depth: usize, name: &str) -> RowView {
        RowView {
            depth,
            display_name: name.to_string(),
            inclusive_count: 976,
            exclusive_count: 976,
            percentage_string: "97.60%".to_string(),
            module: None,
            address: None,
            path: NodePath::default(),
        }
    }

    #[test]
    fn test_render_rows() {
        let text = render_rows(&[row(0, "clock_gettime"), row(1, "now")], 10);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("clock_gettime"));
        assert!(lines[2].ends_with("97.60%"));
        assert!(lines[3].starts_with("    now"));
    }

    #[test]
    fn test_render_rows_limit() {
        let rows: Vec<RowView> = (0..5).map(|i| row(0, &format!("f{}", i))).collect();
        let text = render_rows(&rows, 2);
        assert!(text.ends_with("... 3 more rows"));
    }

    #[test]
    fn test_truncate_long_label() {
        let long = "x".repeat(100);
        let out = truncate(&long, 20);
        assert_eq!(out.chars().count(), 20);
        assert!(out.starts_with("..."));
    }
}
