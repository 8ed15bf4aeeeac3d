//! Preview Table Widget
//! Central scrollable table showing the first rows of the compiled result.

use csv_compiler::CompiledResult;
use egui::{Color32, RichText, ScrollArea};

/// Longest cell text shown before truncation.
const MAX_CELL_CHARS: usize = 60;
const MIN_COL_WIDTH: f32 = 60.0;

/// Read-only copy of the leading rows of a CompiledResult.
#[derive(Default)]
pub struct PreviewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl PreviewTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.headers.clear();
        self.rows.clear();
        self.total_rows = 0;
    }

    /// Take the header list and up to `limit` records.
    pub fn set_result(&mut self, result: &CompiledResult, limit: usize) {
        self.headers = result.headers().as_slice().to_vec();
        self.rows = result
            .records()
            .iter()
            .take(limit)
            .map(|record| record.values().to_vec())
            .collect();
        self.total_rows = result.row_count();
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        if self.headers.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        ui.horizontal(|ui| {
            ui.label(RichText::new("Preview").size(16.0).strong());
            ui.label(
                RichText::new(format!(
                    "showing {} of {} rows",
                    self.rows.len(),
                    self.total_rows
                ))
                .size(12.0)
                .color(Color32::GRAY),
            );
        });
        ui.add_space(6.0);

        ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("preview_grid")
                    .striped(true)
                    .min_col_width(MIN_COL_WIDTH)
                    .show(ui, |ui| {
                        ui.label(RichText::new("#").color(Color32::GRAY));
                        for header in &self.headers {
                            ui.label(RichText::new(display_cell(header)).strong());
                        }
                        ui.end_row();

                        for (i, row) in self.rows.iter().enumerate() {
                            ui.label(RichText::new((i + 1).to_string()).color(Color32::GRAY));
                            for value in row {
                                if value.is_empty() {
                                    ui.label("");
                                } else {
                                    ui.label(display_cell(value)).on_hover_text(value.as_str());
                                }
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}

/// Single-line, length-capped rendering of a cell.
fn display_cell(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { '⏎' } else { c })
        .collect();
    if flat.chars().count() > MAX_CELL_CHARS {
        let cut: String = flat.chars().take(MAX_CELL_CHARS - 1).collect();
        format!("{cut}…")
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv_compiler::{CsvCompiler, Source};

    #[test]
    fn keeps_only_leading_rows() {
        let sources = vec![Source::new("p.csv", "a,b\n1,2\n3,4\n5,6\n")];
        let result = CsvCompiler::default().compile(&sources).unwrap();

        let mut table = PreviewTable::new();
        table.set_result(&result, 2);
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
        assert_eq!(table.total_rows, 3);

        table.clear();
        assert!(table.headers.is_empty());
    }

    #[test]
    fn cells_are_flattened_and_capped() {
        assert_eq!(display_cell("a\nb"), "a⏎b");
        let long = "x".repeat(100);
        assert_eq!(display_cell(&long).chars().count(), MAX_CELL_CHARS);
    }
}
