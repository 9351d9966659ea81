//! PDF backend built on lopdf.
//!
//! Pages are collected as content-stream operations and written in one go
//! when the document is saved. Text uses the four standard Helvetica faces
//! with WinAnsi encoding, so no font files are embedded. Paragraphs are
//! word-wrapped with the Helvetica advance widths and clipped to their cell.

use super::markup::{self, Span};
use super::{Font, Grid, PageSize, Point, Renderer, Size, TextStyle, TextValidator};
use crate::models::Rgb;
use crate::{Error, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Space between the card frame and its table.
const FRAME_PADDING: f32 = 6.0;
const CELL_PADDING_X: f32 = 6.0;
const CELL_PADDING_Y: f32 = 3.0;
/// Bottom padding of header rows (replaces `CELL_PADDING_Y`).
const HEADER_BOTTOM_PADDING: f32 = 14.0;
const LINE_WIDTH: f32 = 0.9;

/// Resource names and base fonts, indexed by `bold + 2 * italic`.
const FACES: [(&str, &str); 4] = [
    ("F1", "Helvetica"),
    ("F2", "Helvetica-Bold"),
    ("F3", "Helvetica-Oblique"),
    ("F4", "Helvetica-BoldOblique"),
];

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Bold glyphs run slightly wider than the regular table.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

/// A PDF document under construction.
pub struct PdfRenderer {
    path: PathBuf,
    out: Option<BufWriter<File>>,
    page_size: PageSize,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
}

impl PdfRenderer {
    /// Open the output file and start an empty document.
    ///
    /// The file is created immediately so an unwritable destination fails
    /// before any card is laid out.
    pub fn create(path: impl Into<PathBuf>, page_size: PageSize) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        debug!(path = %path.display(), "opened output document");
        Ok(Self {
            path,
            out: Some(BufWriter::new(file)),
            page_size,
            pages: Vec::new(),
            current: Vec::new(),
        })
    }

    /// Number of pages holding content so far.
    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.current.is_empty())
    }

    fn build_document(&mut self) -> Result<Document> {
        let mut pages = std::mem::take(&mut self.pages);
        if !self.current.is_empty() || pages.is_empty() {
            pages.push(std::mem::take(&mut self.current));
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for (name, base_font) in FACES {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base_font,
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(name, font_id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            self.page_size.width.into(),
            self.page_size.height.into(),
        ];
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal(concat!("cardgen ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(created),
        });
        doc.trailer.set("Info", info_id);

        doc.compress();
        Ok(doc)
    }

    fn draw_cell(
        &mut self,
        text: &str,
        style: &TextStyle,
        origin: Point,
        size: Size,
        header: bool,
    ) -> Result<()> {
        let spans = markup::parse(text)
            .map_err(|e| Error::InvalidInput(format!("cannot draw {text:?}: {e}")))?;
        let content_width = size.width - 2.0 * CELL_PADDING_X;
        let lines = wrap(&spans, style, content_width);
        if lines.is_empty() {
            return Ok(());
        }

        let bottom_padding = if header {
            HEADER_BOTTOM_PADDING
        } else {
            CELL_PADDING_Y
        };
        let content_top = origin.y - CELL_PADDING_Y;
        let content_bottom = origin.y - size.height + bottom_padding;
        let first_baseline = if header {
            let available = content_top - content_bottom;
            let block = style.size + style.leading * (lines.len() - 1) as f32;
            content_top - (available - block) / 2.0 - style.size
        } else {
            content_top - style.size
        };

        let [r, g, b] = style.color.unit();
        let x = origin.x + CELL_PADDING_X;
        for (i, line) in lines.iter().enumerate() {
            let baseline = first_baseline - style.leading * i as f32;
            if i > 0 && baseline < content_bottom {
                break;
            }
            self.current.push(Operation::new("BT", vec![]));
            self.current
                .push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            self.current
                .push(Operation::new("Td", vec![x.into(), baseline.into()]));
            for piece in line {
                self.current.push(Operation::new(
                    "Tf",
                    vec![FACES[piece.face].0.into(), style.size.into()],
                ));
                self.current.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_win_ansi(&piece.text))],
                ));
            }
            self.current.push(Operation::new("ET", vec![]));
        }
        Ok(())
    }

    fn stroke_line(&mut self, from: Point, to: Point) {
        self.current
            .push(Operation::new("m", vec![from.x.into(), from.y.into()]));
        self.current
            .push(Operation::new("l", vec![to.x.into(), to.y.into()]));
        self.current.push(Operation::new("S", vec![]));
    }
}

impl TextValidator for PdfRenderer {
    fn validate_text(&self, content: &str) -> bool {
        markup::validate(content).is_ok()
    }
}

impl Renderer for PdfRenderer {
    fn draw_grid(
        &mut self,
        origin: Point,
        frame: Size,
        grid: &Grid,
        background: Rgb,
    ) -> Result<()> {
        let left = origin.x + FRAME_PADDING;
        let top = origin.y + frame.height - FRAME_PADDING;
        let width = grid.width();
        let height = grid.height();

        let header_height: f32 = grid.row_heights.iter().take(grid.header_rows).sum();
        if header_height > 0.0 {
            let [r, g, b] = background.unit();
            self.current.push(Operation::new("q", vec![]));
            self.current
                .push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            self.current.push(Operation::new(
                "re",
                vec![
                    left.into(),
                    (top - header_height).into(),
                    width.into(),
                    header_height.into(),
                ],
            ));
            self.current.push(Operation::new("f", vec![]));
            self.current.push(Operation::new("Q", vec![]));
        }

        let mut row_top = top;
        for (row_index, (row, &row_height)) in grid.rows.iter().zip(&grid.row_heights).enumerate() {
            let mut cell_left = left;
            for (cell, &column_width) in row.iter().zip(&grid.column_widths) {
                self.draw_cell(
                    &cell.text,
                    &cell.style,
                    Point::new(cell_left, row_top),
                    Size::new(column_width, row_height),
                    row_index < grid.header_rows,
                )?;
                cell_left += column_width;
            }
            row_top -= row_height;
        }

        self.current.push(Operation::new("q", vec![]));
        self.current
            .push(Operation::new("w", vec![LINE_WIDTH.into()]));
        self.current
            .push(Operation::new("RG", vec![0.into(), 0.into(), 0.into()]));
        self.current.push(Operation::new(
            "re",
            vec![
                left.into(),
                (top - height).into(),
                width.into(),
                height.into(),
            ],
        ));
        self.current.push(Operation::new("S", vec![]));

        let mut x = left;
        for column_width in grid.column_widths.iter().take(grid.column_widths.len().saturating_sub(1)) {
            x += column_width;
            self.stroke_line(Point::new(x, top), Point::new(x, top - height));
        }
        let mut y = top;
        for row_height in grid.row_heights.iter().take(grid.row_heights.len().saturating_sub(1)) {
            y -= row_height;
            self.stroke_line(Point::new(left, y), Point::new(left + width, y));
        }
        self.current.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn new_page(&mut self) -> Result<()> {
        if !self.current.is_empty() {
            let page = std::mem::take(&mut self.current);
            self.pages.push(page);
            debug!(pages = self.pages.len(), "page finished");
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let mut out = self
            .out
            .take()
            .ok_or_else(|| Error::Other(format!("{} was already saved", self.path.display())))?;
        let mut doc = self.build_document()?;
        doc.save_to(&mut out)?;
        out.flush()?;
        info!(path = %self.path.display(), pages = doc.get_pages().len(), "document saved");
        Ok(())
    }
}

/// A run of text in one face within a wrapped line.
#[derive(Debug, Clone, PartialEq)]
struct Piece {
    text: String,
    face: usize,
}

/// Greedy word wrap of paragraph spans into lines no wider than `max_width`.
///
/// Whitespace (including newlines) collapses to single spaces; only `<br/>`
/// forces a break. A word wider than a whole line is split between
/// characters.
fn wrap(spans: &[Span], style: &TextStyle, max_width: f32) -> Vec<Vec<Piece>> {
    let base_bold = style.font == Font::HelveticaBold;
    let space = glyph_width(' ', false, style.size);

    let mut lines: Vec<Vec<Piece>> = Vec::new();
    let mut line: Vec<Piece> = Vec::new();
    let mut line_width = 0.0_f32;
    let mut pending_space = false;

    for span in spans {
        let (text, bold, italic) = match span {
            Span::Break => {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
                pending_space = false;
                continue;
            }
            Span::Text { text, bold, italic } => (text, *bold || base_bold, *italic),
        };
        let face = usize::from(bold) + 2 * usize::from(italic);

        let mut rest = text.as_str();
        while !rest.is_empty() {
            let leading_ws = rest.len() - rest.trim_start().len();
            if leading_ws > 0 {
                pending_space = true;
                rest = &rest[leading_ws..];
                continue;
            }
            let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let word = &rest[..word_end];
            rest = &rest[word_end..];

            let word_width = text_width(word, bold, style.size);
            let gap = if pending_space && !line.is_empty() {
                space
            } else {
                0.0
            };
            pending_space = false;

            if !line.is_empty() && line_width + gap + word_width > max_width {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            } else if gap > 0.0 {
                push_piece(&mut line, " ", face);
                line_width += gap;
            }

            if word_width <= max_width {
                push_piece(&mut line, word, face);
                line_width += word_width;
                continue;
            }

            // The line is empty here; fill whole lines and keep the tail open.
            let mut start = 0;
            let mut chunk_width = 0.0_f32;
            for (i, c) in word.char_indices() {
                let w = glyph_width(c, bold, style.size);
                if i > start && chunk_width + w > max_width {
                    push_piece(&mut line, &word[start..i], face);
                    lines.push(std::mem::take(&mut line));
                    start = i;
                    chunk_width = 0.0;
                }
                chunk_width += w;
            }
            push_piece(&mut line, &word[start..], face);
            line_width = chunk_width;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn push_piece(line: &mut Vec<Piece>, text: &str, face: usize) {
    match line.last_mut() {
        Some(last) if last.face == face => last.text.push_str(text),
        _ => line.push(Piece {
            text: text.to_string(),
            face,
        }),
    }
}

fn char_width(c: char) -> f32 {
    let index = u32::from(c).checked_sub(32).and_then(|i| usize::try_from(i).ok());
    let units = index
        .and_then(|i| HELVETICA_WIDTHS.get(i))
        .copied()
        .unwrap_or(556);
    f32::from(units)
}

fn glyph_width(c: char, bold: bool, size: f32) -> f32 {
    let factor = if bold { BOLD_WIDTH_FACTOR } else { 1.0 };
    char_width(c) * size / 1000.0 * factor
}

fn text_width(text: &str, bold: bool, size: f32) -> f32 {
    text.chars().map(|c| glyph_width(c, bold, size)).sum()
}

/// Encode text for a WinAnsi Type1 font; characters outside Latin-1 become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7e | 0xa0..=0xff => u8::try_from(u32::from(c)).unwrap_or(b'?'),
            _ => b'?',
        })
        .collect()
}
