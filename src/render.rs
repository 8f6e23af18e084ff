use std::borrow::Cow;
use std::fmt::Write as _;

use itertools::Itertools;

use crate::table::Table;

const COLUMN_GAP: &str = "  ";

pub fn render_rows(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect_vec();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_line(headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat((*w).max(3))).collect_vec();
    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect_vec();
    let _ = writeln!(output, "{}", format_line(&rule, &rule_widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_line(row, &widths));
    }
    output
}

pub fn render_table(table: &Table, limit: Option<usize>) -> String {
    let shown = limit.unwrap_or(table.row_count()).min(table.row_count());
    let rows = (0..shown)
        .map(|row| {
            table
                .columns
                .iter()
                .map(|column| column.get(row).unwrap_or_default().to_string())
                .collect_vec()
        })
        .collect_vec();
    render_rows(&table.headers(), &rows)
}

pub fn print_rows(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_rows(headers, rows));
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let cleaned = strip_control(cell);
            let padding = width.saturating_sub(display_width(&cleaned));
            format!("{cleaned}{}", " ".repeat(padding))
        })
        .join(COLUMN_GAP);
    line.trim_end_matches(' ').to_string()
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI colour sequences end at 'm' and take no columns
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn strip_control(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{column::Column, types::ScalarType};

    #[test]
    fn aligns_columns_under_rule() {
        let headers = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Alice".to_string()],
            vec!["2".to_string(), "Bob".to_string()],
        ];
        let rendered = render_rows(&headers, &rows);
        let lines = rendered.lines().collect_vec();
        assert_eq!(lines, vec!["id  name", "---  -----", "1   Alice", "2   Bob"]);
    }

    #[test]
    fn flattens_control_characters() {
        let headers = vec!["note".to_string()];
        let rows = vec![vec!["line1\nline2\tvalue".to_string()]];
        let rendered = render_rows(&headers, &rows);
        assert_eq!(rendered.lines().nth(2), Some("line1 line2 value"));
    }

    #[test]
    fn render_table_respects_limit() {
        let mut table = Table::new("t");
        table.add_column(Column::from_strs("n", ScalarType::Integer, &["1", "2", "3"]));
        let rendered = render_table(&table, Some(2));
        assert_eq!(rendered.lines().count(), 4);
    }
}
