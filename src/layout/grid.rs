//! Page geometry and the four-slot cursor.

use crate::render::{CM, PageSize, Point, Size};
use serde::Serialize;

/// Position of a card on its page, in fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "u8")]
pub enum Slot {
    /// Top left
    #[default]
    One,
    /// Top right
    Two,
    /// Bottom left
    Three,
    /// Bottom right
    Four,
}

impl Slot {
    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
            Slot::Three => 3,
            Slot::Four => 4,
        }
    }

    fn index(self) -> usize {
        usize::from(self.number() - 1)
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.number()
    }
}

/// Fixed dimensions of a card deck.
#[derive(Debug, Clone, PartialEq)]
pub struct CardGeometry {
    pub page_size: PageSize,
    /// Outer frame of one card
    pub frame: Size,
    /// Bottom-left corner of each slot's frame
    pub origins: [Point; 4],
    pub column_widths: [f32; 2],
    pub row_heights: [f32; 4],
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4.landscape(),
            frame: Size::new(14.5 * CM, 8.5 * CM),
            origins: [
                Point::new(10.0, 325.0),
                Point::new(420.0, 325.0),
                Point::new(10.0, 75.0),
                Point::new(420.0, 75.0),
            ],
            column_widths: [2.7 * CM, 11.3 * CM],
            row_heights: [1.2 * CM, 3.4 * CM, 2.1 * CM, 1.2 * CM],
        }
    }
}

impl CardGeometry {
    /// Frame origin of `slot`.
    pub fn origin(&self, slot: Slot) -> Point {
        self.origins[slot.index()]
    }
}

/// Where the next card goes.
///
/// Fills the slots left to right, top to bottom, and wraps to a new page
/// after the fourth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCursor {
    slot: Slot,
    page: usize,
}

impl GridCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Zero-based page index.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Move past the card just placed.
    ///
    /// Returns `true` when that card filled the page, i.e. the page must be
    /// flushed before the next card is drawn.
    pub fn advance(&mut self) -> bool {
        let (next, flush) = match self.slot {
            Slot::One => (Slot::Two, false),
            Slot::Two => (Slot::Three, false),
            Slot::Three => (Slot::Four, false),
            Slot::Four => (Slot::One, true),
        };
        self.slot = next;
        if flush {
            self.page += 1;
        }
        flush
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_cycles_through_slots() {
        let mut cursor = GridCursor::new();
        let mut seen = Vec::new();
        let mut flushes = Vec::new();
        for _ in 0..9 {
            seen.push((cursor.page(), cursor.slot().number()));
            flushes.push(cursor.advance());
        }
        assert_eq!(
            seen,
            vec![
                (0, 1),
                (0, 2),
                (0, 3),
                (0, 4),
                (1, 1),
                (1, 2),
                (1, 3),
                (1, 4),
                (2, 1)
            ]
        );
        assert_eq!(
            flushes,
            vec![false, false, false, true, false, false, false, true, false]
        );
    }

    #[test]
    fn test_slot_origins() {
        let geometry = CardGeometry::default();
        assert_eq!(geometry.origin(Slot::One), Point::new(10.0, 325.0));
        assert_eq!(geometry.origin(Slot::Two), Point::new(420.0, 325.0));
        assert_eq!(geometry.origin(Slot::Three), Point::new(10.0, 75.0));
        assert_eq!(geometry.origin(Slot::Four), Point::new(420.0, 75.0));
    }

    #[test]
    fn test_cards_fit_on_landscape_page() {
        let geometry = CardGeometry::default();
        for origin in geometry.origins {
            assert!(origin.x + geometry.frame.width <= geometry.page_size.width);
            assert!(origin.y + geometry.frame.height <= geometry.page_size.height);
        }
        let table_width: f32 = geometry.column_widths.iter().sum();
        assert!(table_width < geometry.frame.width);
    }

    #[test]
    fn test_slot_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Slot::Three).unwrap(), "3");
    }
}
