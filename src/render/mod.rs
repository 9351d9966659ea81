//! Document rendering for card decks.
//!
//! The layout engine talks to a [`Renderer`]: a document that accepts styled
//! grids at absolute positions, page breaks, and a final save. Two backends
//! exist:
//! - [`PdfRenderer`] writes a PDF using the standard Helvetica fonts
//! - [`RecordingRenderer`] keeps the draw calls in memory (dry runs, tests)
//!
//! Coordinates are PDF points with the origin at the bottom-left corner of
//! the page.

pub mod markup;
pub mod pdf;
pub mod recording;

pub use pdf::PdfRenderer;
pub use recording::{RecordedCard, RecordedCell, RecordingRenderer};

use crate::Result;
use crate::models::Rgb;
use serde::Serialize;

/// Points per centimeter.
pub const CM: f32 = 72.0 / 2.54;

/// 2D point in page coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height in points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Physical page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4, portrait
    pub const A4: PageSize = PageSize {
        width: 595.2756,
        height: 841.8898,
    };

    /// The same page turned on its side (width >= height).
    pub fn landscape(self) -> Self {
        if self.width >= self.height {
            self
        } else {
            Self {
                width: self.height,
                height: self.width,
            }
        }
    }
}

/// Typeface used for a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

/// Resolved text style for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    /// Style name, used in dry-run output
    pub name: &'static str,
    pub font: Font,
    pub size: f32,
    /// Distance between baselines
    pub leading: f32,
    pub color: Rgb,
}

/// One cell of a grid: markup text plus its style.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub style: TextStyle,
}

/// A table to draw at a fixed position.
///
/// The first `header_rows` rows are filled with the background color and
/// their content is centered vertically; other rows are top-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub column_widths: Vec<f32>,
    pub row_heights: Vec<f32>,
    pub rows: Vec<Vec<Cell>>,
    pub header_rows: usize,
}

impl Grid {
    /// Total table width
    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    /// Total table height
    pub fn height(&self) -> f32 {
        self.row_heights.iter().sum()
    }
}

/// Decides whether a text can be drawn as paragraph markup.
pub trait TextValidator {
    /// Return `true` if the renderer accepts `content` as-is.
    fn validate_text(&self, content: &str) -> bool;
}

/// Validator for the paragraph markup understood by both renderers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RichTextValidator;

impl TextValidator for RichTextValidator {
    fn validate_text(&self, content: &str) -> bool {
        markup::validate(content).is_ok()
    }
}

/// A paginated output document.
///
/// A renderer is created for one output (the "new document" step), receives
/// grids and page breaks, and is saved exactly once.
pub trait Renderer: TextValidator {
    /// Draw `grid` inside a frame whose bottom-left corner is `origin`.
    fn draw_grid(
        &mut self,
        origin: Point,
        frame: Size,
        grid: &Grid,
        background: Rgb,
    ) -> Result<()>;

    /// Finish the current page; later draws go to a fresh page.
    ///
    /// A page that never receives a draw is not emitted.
    fn new_page(&mut self) -> Result<()>;

    /// Finalize the document.
    fn save(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_swaps_portrait() {
        let page = PageSize::A4.landscape();
        assert!(page.width > page.height);
        assert_eq!(page.width, PageSize::A4.height);
        assert_eq!(page.landscape(), page);
    }

    #[test]
    fn test_rich_text_validator() {
        let validator = RichTextValidator;
        assert!(validator.validate_text("plain"));
        assert!(validator.validate_text("Text <i>link</i> more"));
        assert!(!validator.validate_text("<img src=\"a.gif\">"));
    }

    #[test]
    fn test_centimeters() {
        assert!((CM * 2.54 - 72.0).abs() < 1e-4);
    }
}
