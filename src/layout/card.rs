//! Card content: which text goes in which cell, in which style.

use super::grid::CardGeometry;
use super::style::{CardStyle, StyleId, select_rank_style};
use crate::models::{BacklogRecord, UNASSIGNED};
use crate::render::{Cell, Grid};
use serde::Serialize;

pub const DESCRIPTION_LABEL: &str = "Description:";
pub const PROCESSOR_LABEL: &str = "Processor:";

/// Assignee names longer than this use the small processor style.
pub const SMALL_PROCESSOR_THRESHOLD: usize = 30;

/// One cell, tagged with the record field it shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardCell {
    pub field: &'static str,
    pub text: String,
    pub style: StyleId,
}

impl CardCell {
    fn new(field: &'static str, text: impl Into<String>, style: StyleId) -> Self {
        Self {
            field,
            text: text.into(),
            style,
        }
    }
}

/// The 4x2 table of a card.
///
/// Rows: rank/priority, key/summary, description, processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardContent {
    pub rows: [[CardCell; 2]; 4],
}

impl CardContent {
    pub fn cells(&self) -> impl Iterator<Item = &CardCell> {
        self.rows.iter().flatten()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut CardCell> {
        self.rows.iter_mut().flatten()
    }

    /// Resolve styles and attach the table dimensions.
    pub fn into_grid(self, geometry: &CardGeometry) -> Grid {
        Grid {
            column_widths: geometry.column_widths.to_vec(),
            row_heights: geometry.row_heights.to_vec(),
            rows: self
                .rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| Cell {
                            text: cell.text,
                            style: cell.style.text_style(),
                        })
                        .collect()
                })
                .collect(),
            header_rows: 1,
        }
    }
}

/// Lay out the cells for `record` in the decided style.
pub fn build_card(record: &BacklogRecord, style: &CardStyle) -> CardContent {
    let rank_style = select_rank_style(&record.rank, style.first_line);
    CardContent {
        rows: [
            [
                CardCell::new("rank", record.rank.as_str(), rank_style),
                CardCell::new("priority", record.priority.as_str(), style.first_line),
            ],
            [
                CardCell::new("key", record.key.as_str(), StyleId::Summary),
                CardCell::new("summary", record.summary.as_str(), StyleId::Summary),
            ],
            [
                CardCell::new("description label", DESCRIPTION_LABEL, StyleId::Label),
                CardCell::new("description", record.description.as_str(), StyleId::Description),
            ],
            [
                CardCell::new("processor label", PROCESSOR_LABEL, StyleId::Label),
                processor_cell(&record.assignee),
            ],
        ],
    }
}

/// Assignee cell. Unassigned cards get a blank line to write a name on.
pub fn processor_cell(assignee: &str) -> CardCell {
    let name = if assignee == UNASSIGNED { "" } else { assignee };
    let style = if name.chars().count() > SMALL_PROCESSOR_THRESHOLD {
        StyleId::SmallProcessor
    } else {
        StyleId::Processor
    };
    CardCell::new("assignee", name, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rgb;

    fn record() -> BacklogRecord {
        BacklogRecord {
            key: "42".to_string(),
            project: "PLAT".to_string(),
            summary: "Login page".to_string(),
            description: "Users need to log in".to_string(),
            assignee: "Meyer, Max".to_string(),
            priority: "Major".to_string(),
            rank: "774".to_string(),
            ..Default::default()
        }
    }

    fn standard() -> CardStyle {
        CardStyle {
            color: Rgb::new(192, 255, 62),
            first_line: StyleId::FirstLine,
        }
    }

    #[test]
    fn test_card_layout() {
        let card = build_card(&record(), &standard());
        let texts: Vec<&str> = card.cells().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "774",
                "Major",
                "42",
                "Login page",
                "Description:",
                "Users need to log in",
                "Processor:",
                "Meyer, Max"
            ]
        );
        assert_eq!(card.rows[0][0].style, StyleId::FirstLine);
        assert_eq!(card.rows[1][0].style, StyleId::Summary);
        assert_eq!(card.rows[2][1].style, StyleId::Description);
        assert_eq!(card.rows[3][1].style, StyleId::Processor);
    }

    #[test]
    fn test_lexo_rank_uses_large_style() {
        let mut r = record();
        r.rank = "0|hzzzz7:".to_string();
        let card = build_card(&r, &standard());
        assert_eq!(card.rows[0][0].style, StyleId::LargeRank);
        assert_eq!(card.rows[0][1].style, StyleId::FirstLine);
    }

    #[test]
    fn test_unassigned_processor_is_blank() {
        let cell = processor_cell(UNASSIGNED);
        assert_eq!(cell.text, "");
        assert_eq!(cell.style, StyleId::Processor);
    }

    #[test]
    fn test_long_processor_name() {
        let name = "Maximilian Alexander von Musterhausen";
        assert!(name.len() > SMALL_PROCESSOR_THRESHOLD);
        assert_eq!(processor_cell(name).style, StyleId::SmallProcessor);
        assert_eq!(processor_cell(&"x".repeat(30)).style, StyleId::Processor);
    }

    #[test]
    fn test_into_grid() {
        let geometry = CardGeometry::default();
        let grid = build_card(&record(), &standard()).into_grid(&geometry);
        assert_eq!(grid.rows.len(), 4);
        assert!(grid.rows.iter().all(|row| row.len() == 2));
        assert_eq!(grid.header_rows, 1);
        assert_eq!(grid.rows[1][1].style.name, "Summary");
        assert!((grid.height() - geometry.row_heights.iter().sum::<f32>()).abs() < 1e-3);
    }
}
