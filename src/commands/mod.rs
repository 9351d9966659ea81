//! Command implementations for the cardgen CLI.
//!
//! `generate` runs the whole pipeline: resolve config, read and extract
//! the export, lay out the deck and save it. Results implement [`Output`]
//! so `main` can print them as JSON or as human-readable text.

use crate::config::{ConfigOverrides, ResolvedConfig, resolve_config};
use crate::extract::parse_backlog;
use crate::layout::{self, CardGeometry, ColorAllocator, DeckSummary, Placement, StyleRules};
use crate::models::Rgb;
use crate::render::{PdfRenderer, RecordingRenderer, RichTextValidator};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Inputs of one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub input: PathBuf,
    /// Explicit output path; defaults to [`default_output_path`]
    pub output: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    /// Lay out in memory only
    pub dry_run: bool,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub input: PathBuf,
    /// Written file; `None` on a dry run
    pub output: Option<PathBuf>,
    pub dry_run: bool,
    pub cards: usize,
    pub pages: usize,
    /// Palette color per assignee
    pub colors: BTreeMap<String, Rgb>,
    pub overflowed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config_files: Vec<PathBuf>,
    /// Card positions, reported on dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placements: Option<Vec<Placement>>,
    /// Whether the caller should open `output` in a viewer
    #[serde(skip)]
    pub open_viewer: bool,
}

impl Output for GenerateResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        let cards = if self.cards == 1 { "card" } else { "cards" };
        let pages = if self.pages == 1 { "page" } else { "pages" };
        match &self.output {
            Some(path) => {
                let _ = writeln!(
                    out,
                    "Generated {} {} on {} {}: {}",
                    self.cards,
                    cards,
                    self.pages,
                    pages,
                    path.display()
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "Dry run: {} {} on {} {} (nothing written)",
                    self.cards, cards, self.pages, pages
                );
            }
        }

        if !self.colors.is_empty() {
            let _ = writeln!(out, "\nColors:");
            let width = self.colors.keys().map(|k| k.chars().count()).max().unwrap_or(0);
            for (assignee, color) in &self.colors {
                let _ = writeln!(out, "  {:<width$}  {}", assignee, color, width = width);
            }
        }
        if self.overflowed > 0 {
            let _ = writeln!(
                out,
                "\nWarning: {} assignee(s) share a color (palette exhausted)",
                self.overflowed
            );
        }

        if let Some(placements) = &self.placements {
            let _ = writeln!(out, "\nPlacements:");
            for p in placements {
                let _ = writeln!(
                    out,
                    "  page {} slot {}  {}  {}",
                    p.page,
                    p.slot.number(),
                    p.color,
                    p.key
                );
            }
        }

        out.trim_end().to_string()
    }
}

/// `backlog.xml` -> `backlog.pdf`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}

/// Run the full pipeline for `request`.
///
/// The export is extracted completely before the output file is created,
/// so malformed input never leaves a partial PDF behind.
pub fn generate(request: &GenerateRequest) -> Result<GenerateResult> {
    let config = resolve_config(&request.input, &request.overrides)?;
    let xml = std::fs::read_to_string(&request.input).map_err(|e| {
        Error::InvalidInput(format!("Cannot read {}: {}", request.input.display(), e))
    })?;
    let records = parse_backlog(&xml, &RichTextValidator)?;

    let rules = StyleRules::with_overrides(config.rules.clone());
    let colors = match config.seed() {
        Some(seed) => ColorAllocator::seeded(seed, config.overflow_policy()),
        None => ColorAllocator::from_entropy(config.overflow_policy()),
    };

    if request.dry_run {
        let (summary, _) = layout::generate(&records, RecordingRenderer::new(), rules, colors)?;
        return Ok(build_result(request, &config, summary, None));
    }

    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&request.input));
    if is_same_file(&request.input, &output) {
        return Err(Error::InvalidInput(format!(
            "Output would overwrite the input file {}",
            output.display()
        )));
    }
    let renderer = PdfRenderer::create(&output, CardGeometry::default().page_size)?;
    let (summary, _) = layout::generate(&records, renderer, rules, colors)?;
    info!(output = %output.display(), cards = summary.cards, "deck written");
    Ok(build_result(request, &config, summary, Some(output)))
}

/// Whether `output` resolves to the existing `input` file.
///
/// The output usually does not exist yet, so its parent directory is
/// resolved and the file name joined back on.
fn is_same_file(input: &Path, output: &Path) -> bool {
    let Ok(input) = input.canonicalize() else {
        return false;
    };
    if let Ok(resolved) = output.canonicalize() {
        return resolved == input;
    }
    let parent = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), output.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name) == input,
        _ => false,
    }
}

fn build_result(
    request: &GenerateRequest,
    config: &ResolvedConfig,
    summary: DeckSummary,
    output: Option<PathBuf>,
) -> GenerateResult {
    GenerateResult {
        input: request.input.clone(),
        open_viewer: output.is_some() && config.open_viewer(),
        output,
        dry_run: request.dry_run,
        cards: summary.cards,
        pages: summary.pages,
        colors: summary.colors,
        overflowed: summary.overflowed,
        seed: config.seed(),
        config_files: config.files.clone(),
        placements: request.dry_run.then_some(summary.placements),
    }
}
