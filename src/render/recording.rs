//! In-memory renderer that records draw calls.

use super::{Grid, Point, Renderer, Size, TextValidator, markup};
use crate::models::Rgb;
use crate::{Error, Result};
use serde::Serialize;

/// A cell as it was handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCell {
    pub text: String,
    pub style: &'static str,
}

/// One `draw_grid` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCard {
    pub origin: Point,
    pub frame: Size,
    pub background: Rgb,
    pub cells: Vec<Vec<RecordedCell>>,
}

impl RecordedCard {
    /// Text of the cell at `row`, `column`, if present.
    pub fn text(&self, row: usize, column: usize) -> Option<&str> {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.text.as_str())
    }

    /// Style name of the cell at `row`, `column`, if present.
    pub fn style(&self, row: usize, column: usize) -> Option<&'static str> {
        self.cells.get(row).and_then(|r| r.get(column)).map(|c| c.style)
    }
}

type ValidatorFn = Box<dyn Fn(&str) -> bool>;

/// Renderer that keeps every card in memory instead of writing a file.
///
/// Used for dry runs and by tests that inspect placements.
#[derive(Default)]
pub struct RecordingRenderer {
    pages: Vec<Vec<RecordedCard>>,
    current: Vec<RecordedCard>,
    page_breaks: usize,
    saved: bool,
    validator: Option<ValidatorFn>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace markup validation with a custom predicate.
    pub fn with_validator(validator: impl Fn(&str) -> bool + 'static) -> Self {
        Self {
            validator: Some(Box::new(validator)),
            ..Self::default()
        }
    }

    /// Finished pages, plus the current one if it holds cards.
    pub fn pages(&self) -> Vec<&[RecordedCard]> {
        let mut pages: Vec<&[RecordedCard]> = self.pages.iter().map(Vec::as_slice).collect();
        if !self.current.is_empty() {
            pages.push(&self.current);
        }
        pages
    }

    /// All recorded cards in draw order.
    pub fn cards(&self) -> impl Iterator<Item = &RecordedCard> {
        self.pages.iter().flatten().chain(self.current.iter())
    }

    /// Number of `new_page` calls received.
    pub fn page_breaks(&self) -> usize {
        self.page_breaks
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }
}

impl std::fmt::Debug for RecordingRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingRenderer")
            .field("pages", &self.pages)
            .field("current", &self.current)
            .field("page_breaks", &self.page_breaks)
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}

impl TextValidator for RecordingRenderer {
    fn validate_text(&self, content: &str) -> bool {
        match &self.validator {
            Some(validator) => validator(content),
            None => markup::validate(content).is_ok(),
        }
    }
}

impl Renderer for RecordingRenderer {
    fn draw_grid(
        &mut self,
        origin: Point,
        frame: Size,
        grid: &Grid,
        background: Rgb,
    ) -> Result<()> {
        if self.saved {
            return Err(Error::Other("draw after save".to_string()));
        }
        let cells = grid
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| RecordedCell {
                        text: cell.text.clone(),
                        style: cell.style.name,
                    })
                    .collect()
            })
            .collect();
        self.current.push(RecordedCard {
            origin,
            frame,
            background,
            cells,
        });
        Ok(())
    }

    fn new_page(&mut self) -> Result<()> {
        self.page_breaks += 1;
        if !self.current.is_empty() {
            let page = std::mem::take(&mut self.current);
            self.pages.push(page);
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if self.saved {
            return Err(Error::Other("document was already saved".to_string()));
        }
        self.saved = true;
        Ok(())
    }
}
