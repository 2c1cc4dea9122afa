/// Widest a single cell may grow before it is truncated.
const MAX_CELL: usize = 48;

#[derive(Clone, Copy, Debug, Default)]
pub struct TableOptions {
    /// Color review-status words (`approved`, `rejected`, ...).
    pub color: bool,
}

/// Render left-aligned columns separated by two spaces.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .fold(header.len(), usize::max)
                .min(MAX_CELL)
        })
        .collect();

    let header_line = join_cells(headers.iter().map(|h| (*h).to_string()), &widths, false);
    let mut lines = vec![header_line.clone(), "-".repeat(header_line.trim_end().len())];
    for row in rows {
        let cells = (0..widths.len()).map(|i| row.get(i).cloned().unwrap_or_else(|| "-".into()));
        lines.push(join_cells(cells, &widths, options.color));
    }
    lines.join("\n")
}

fn join_cells(cells: impl Iterator<Item = String>, widths: &[usize], color: bool) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| {
            let cell = truncate(&cell, *width);
            let pad = " ".repeat(width.saturating_sub(cell.chars().count()));
            if color {
                format!("{}{pad}", colorize(&cell))
            } else {
                format!("{cell}{pad}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn colorize(value: &str) -> String {
    let code = match value {
        "approved" | "installed" | "success" | "true" => "32",
        "under_review" => "33",
        "rejected" | "error" => "31",
        _ => return value.to_string(),
    };
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aligns_columns() {
        let rows = vec![
            vec!["Echo".to_string(), "approved".to_string()],
            vec!["weather_bot".to_string(), "under_review".to_string()],
        ];
        let out = render_table(&["name", "status"], &rows, TableOptions::default());
        assert_eq!(
            out,
            "name         status\n-------------------\nEcho         approved\nweather_bot  under_review"
        );
    }

    #[test]
    fn long_cells_are_truncated() {
        let rows = vec![vec!["x".repeat(100)]];
        let out = render_table(&["value"], &rows, TableOptions::default());
        let last = out.lines().last().unwrap();
        assert_eq!(last.chars().count(), MAX_CELL);
        assert!(last.ends_with('…'));
    }

    #[test]
    fn color_wraps_status_words() {
        let rows = vec![vec!["rejected".to_string()]];
        let out = render_table(&["status"], &rows, TableOptions { color: true });
        assert!(out.contains("\u{1b}[31mrejected\u{1b}[0m"));
    }
}
