//! Table rendering utilities for CLI outputs.

use regex::Regex;
use std::sync::OnceLock;

fn visible_len(s: &str) -> usize {
    static ANSI: OnceLock<Option<Regex>> = OnceLock::new();
    match ANSI.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[mK]").ok()) {
        Some(re) => re.replace_all(s, "").chars().count(),
        None => s.chars().count(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub struct Table {
    headers: Vec<(String, Align)>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[(&str, Align)]) -> Self {
        Self {
            headers: headers.iter().map(|(h, a)| (h.to_string(), *a)).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns are sized to the widest visible cell (ANSI codes excluded).
    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, (h, _))| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| visible_len(c))
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let header_cells: Vec<String> = self.headers.iter().map(|(h, _)| h.clone()).collect();
        push_line(&mut out, &header_cells, &self.headers, &widths);
        let total: usize = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');

        for row in &self.rows {
            push_line(&mut out, row, &self.headers, &widths);
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], headers: &[(String, Align)], widths: &[usize]) {
    let empty = String::new();
    let parts: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, (_, align))| {
            let cell = cells.get(i).unwrap_or(&empty);
            let pad = " ".repeat(widths[i].saturating_sub(visible_len(cell)));
            match align {
                Align::Left => format!("{cell}{pad}"),
                Align::Right => format!("{pad}{cell}"),
            }
        })
        .collect();
    out.push_str(parts.join(" | ").trim_end());
    out.push('\n');
}
