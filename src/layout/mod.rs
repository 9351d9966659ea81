//! Card placement.
//!
//! [`CardLayoutEngine`] owns a renderer for one run. Each record is styled
//! (see [`style`]), turned into a 4x2 table (see [`card`]) and drawn in the
//! next free slot of a 2x2 page grid (see [`grid`]). After the fourth card a
//! page break is issued.

pub mod card;
pub mod colors;
pub mod grid;
pub mod style;

pub use colors::{ACCENT, ColorAllocator, OVERFLOW, OverflowPolicy, PALETTE};
pub use grid::{CardGeometry, GridCursor, Slot};
pub use style::{
    CardStyle, ColorSource, Condition, StyleId, StyleRule, StyleRules, Tone, select_rank_style,
};

use crate::models::{BacklogRecord, Rgb};
use crate::render::{Point, Renderer, markup};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Where a card ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub key: String,
    /// One-based page number
    pub page: usize,
    pub slot: Slot,
    pub origin: Point,
    pub color: Rgb,
}

/// Result of laying out a whole deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckSummary {
    pub cards: usize,
    pub pages: usize,
    pub placements: Vec<Placement>,
    /// Palette color bound to each assignee
    pub colors: BTreeMap<String, Rgb>,
    /// Assignees that received an overflow color
    pub overflowed: usize,
}

/// Draws one card per record into a renderer.
pub struct CardLayoutEngine<R: Renderer> {
    renderer: R,
    geometry: CardGeometry,
    rules: StyleRules,
    colors: ColorAllocator,
    cursor: GridCursor,
    placements: Vec<Placement>,
}

impl<R: Renderer> CardLayoutEngine<R> {
    pub fn new(renderer: R, rules: StyleRules, colors: ColorAllocator) -> Self {
        Self {
            renderer,
            geometry: CardGeometry::default(),
            rules,
            colors,
            cursor: GridCursor::new(),
            placements: Vec::new(),
        }
    }

    /// Draw the card for `record` in the next slot.
    pub fn draw_card(&mut self, record: &BacklogRecord) -> Result<Placement> {
        let style = self.rules.decide(record, &mut self.colors);
        let mut content = card::build_card(record, &style);

        for cell in content.cells_mut() {
            if self.renderer.validate_text(&cell.text) {
                continue;
            }
            let escaped = markup::escape(&cell.text);
            if !self.renderer.validate_text(&escaped) {
                return Err(Error::UnrenderableContent {
                    key: record.full_key(),
                    field: cell.field,
                });
            }
            warn!(key = %record.full_key(), field = cell.field, "cell rejected, drawing escaped text");
            cell.text = escaped;
        }

        let slot = self.cursor.slot();
        let origin = self.geometry.origin(slot);
        let grid = content.into_grid(&self.geometry);
        self.renderer
            .draw_grid(origin, self.geometry.frame, &grid, style.color)?;

        let placement = Placement {
            key: record.full_key(),
            page: self.cursor.page() + 1,
            slot,
            origin,
            color: style.color,
        };
        debug!(
            key = %placement.key,
            page = placement.page,
            slot = slot.number(),
            color = %style.color,
            "placed card"
        );
        self.placements.push(placement.clone());

        if self.cursor.advance() {
            self.renderer.new_page()?;
        }
        Ok(placement)
    }

    /// Save the document and hand back the renderer.
    pub fn finish(mut self) -> Result<(DeckSummary, R)> {
        self.renderer.save()?;
        let cards = self.placements.len();
        let summary = DeckSummary {
            cards,
            pages: cards.div_ceil(4).max(1),
            placements: self.placements,
            colors: self.colors.assignments().clone(),
            overflowed: self.colors.overflow_count(),
        };
        info!(cards = summary.cards, pages = summary.pages, "deck finished");
        Ok((summary, self.renderer))
    }
}

/// Lay out `records` in order and save the document.
pub fn generate<R: Renderer>(
    records: &[BacklogRecord],
    renderer: R,
    rules: StyleRules,
    colors: ColorAllocator,
) -> Result<(DeckSummary, R)> {
    let mut engine = CardLayoutEngine::new(renderer, rules, colors);
    for record in records {
        engine.draw_card(record)?;
    }
    engine.finish()
}
