//! Text styles and the styling-rule table.
//!
//! A card's header color and first-line tone are decided by an ordered list
//! of [`StyleRule`]s: the first rule whose conditions all hold wins. User
//! rules from the config go first, then the built-in rules, which end in a
//! catch-all so every record gets a style.

use super::colors::{ACCENT, ColorAllocator};
use crate::models::{BacklogRecord, Rgb, UNASSIGNED, is_lexo_rank};
use crate::render::{Font, TextStyle};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Named text styles used on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StyleId {
    FirstLine,
    FirstLineUnassigned,
    LargeRank,
    LargeRankUnassigned,
    Summary,
    Description,
    Processor,
    SmallProcessor,
    Label,
}

impl StyleId {
    pub fn name(self) -> &'static str {
        match self {
            StyleId::FirstLine => "FirstLine",
            StyleId::FirstLineUnassigned => "FirstLineUnassigned",
            StyleId::LargeRank => "LargeRank",
            StyleId::LargeRankUnassigned => "LargeRankUnassigned",
            StyleId::Summary => "Summary",
            StyleId::Description => "Description",
            StyleId::Processor => "Processor",
            StyleId::SmallProcessor => "SmallProcessor",
            StyleId::Label => "Label",
        }
    }

    /// Concrete font settings for this style.
    pub fn text_style(self) -> TextStyle {
        let (font, size, leading, color) = match self {
            StyleId::FirstLine => (Font::HelveticaBold, 18.0, None, Rgb::BLACK),
            StyleId::FirstLineUnassigned => (Font::HelveticaBold, 18.0, None, Rgb::WHITE),
            StyleId::LargeRank => (Font::HelveticaBold, 13.0, None, Rgb::BLACK),
            StyleId::LargeRankUnassigned => (Font::HelveticaBold, 13.0, None, Rgb::WHITE),
            StyleId::Summary => (Font::HelveticaBold, 22.0, Some(22.0), Rgb::BLACK),
            StyleId::Description => (Font::Helvetica, 11.0, Some(12.0), Rgb::BLACK),
            StyleId::Processor => (Font::HelveticaBold, 20.0, None, Rgb::BLACK),
            StyleId::SmallProcessor => (Font::HelveticaBold, 15.0, None, Rgb::BLACK),
            StyleId::Label => (Font::Helvetica, 12.0, None, Rgb::BLACK),
        };
        TextStyle {
            name: self.name(),
            font,
            size,
            leading: leading.unwrap_or(size * 1.2),
            color,
        }
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text color on the card header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Dark text
    #[default]
    Standard,
    /// Light text, for dark header colors
    Inverted,
}

impl Tone {
    /// Style for the priority cell in this tone.
    pub fn first_line(self) -> StyleId {
        match self {
            Tone::Standard => StyleId::FirstLine,
            Tone::Inverted => StyleId::FirstLineUnassigned,
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" | "standard" => Ok(Tone::Standard),
            "light" | "inverted" => Ok(Tone::Inverted),
            _ => Err(format!(
                "Invalid text tone: '{}'. Valid values: dark, light",
                s
            )),
        }
    }
}

/// A test on one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Assignee(String),
    Project(String),
    Priority(String),
    HasComponent(String),
    LacksComponent(String),
    HasLabel(String),
}

impl Condition {
    pub fn matches(&self, record: &BacklogRecord) -> bool {
        match self {
            Condition::Assignee(name) => record.assignee == *name,
            Condition::Project(project) => record.project == *project,
            Condition::Priority(priority) => record.priority.eq_ignore_ascii_case(priority),
            Condition::HasComponent(component) => record.components.contains(component),
            Condition::LacksComponent(component) => !record.components.contains(component),
            Condition::HasLabel(label) => record.labels.contains(label),
        }
    }
}

/// Where a rule takes the header color from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    Fixed(Rgb),
    /// The assignee's color from the [`ColorAllocator`]
    Palette,
}

/// Conditions mapped to a color and tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub name: String,
    /// All must hold; an empty list matches every record
    pub conditions: Vec<Condition>,
    pub color: ColorSource,
    pub tone: Tone,
}

impl StyleRule {
    pub fn matches(&self, record: &BacklogRecord) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

/// Outcome of styling one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStyle {
    pub color: Rgb,
    pub first_line: StyleId,
}

/// Ordered rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRules {
    rules: Vec<StyleRule>,
}

impl Default for StyleRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StyleRules {
    /// Unassigned cards in the accent color with light text; everyone else
    /// in their palette color.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                StyleRule {
                    name: "unassigned".to_string(),
                    conditions: vec![Condition::Assignee(UNASSIGNED.to_string())],
                    color: ColorSource::Fixed(ACCENT),
                    tone: Tone::Inverted,
                },
                StyleRule {
                    name: "assignee".to_string(),
                    conditions: Vec::new(),
                    color: ColorSource::Palette,
                    tone: Tone::Standard,
                },
            ],
        }
    }

    /// Built-in rules preceded by `rules`.
    pub fn with_overrides(rules: Vec<StyleRule>) -> Self {
        let mut table = rules;
        table.extend(Self::builtin().rules);
        Self { rules: table }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Pick the color and first-line style for `record`.
    pub fn decide(&self, record: &BacklogRecord, colors: &mut ColorAllocator) -> CardStyle {
        let (source, tone) = self
            .rules
            .iter()
            .find(|rule| rule.matches(record))
            .map_or((ColorSource::Palette, Tone::Standard), |rule| {
                (rule.color, rule.tone)
            });
        let color = match source {
            ColorSource::Fixed(color) => color,
            ColorSource::Palette => colors.color_for(&record.assignee),
        };
        CardStyle {
            color,
            first_line: tone.first_line(),
        }
    }
}

/// Style for the rank cell.
///
/// Short legacy ranks use the first-line style; lexicographic ranks are
/// too long for it and drop to the large-rank size in the same tone.
pub fn select_rank_style(rank: &str, first_line: StyleId) -> StyleId {
    if !is_lexo_rank(rank) {
        first_line
    } else if first_line == StyleId::FirstLineUnassigned {
        StyleId::LargeRankUnassigned
    } else {
        StyleId::LargeRank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::colors::{OverflowPolicy, PALETTE};

    fn record(assignee: &str) -> BacklogRecord {
        BacklogRecord {
            key: "1".to_string(),
            project: "PLAT".to_string(),
            assignee: assignee.to_string(),
            priority: "Major".to_string(),
            components: vec!["Backend".to_string()],
            labels: vec!["urgent".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_styles() {
        assert_eq!(select_rank_style("774", StyleId::FirstLine), StyleId::FirstLine);
        assert_eq!(
            select_rank_style("774", StyleId::FirstLineUnassigned),
            StyleId::FirstLineUnassigned
        );
        assert_eq!(select_rank_style("0|hzzzz7:", StyleId::FirstLine), StyleId::LargeRank);
        assert_eq!(
            select_rank_style("0|hzzzz7:", StyleId::FirstLineUnassigned),
            StyleId::LargeRankUnassigned
        );
    }

    #[test]
    fn test_builtin_unassigned_rule() {
        let mut colors = ColorAllocator::seeded(1, OverflowPolicy::Cycle);
        let style = StyleRules::builtin().decide(&record(UNASSIGNED), &mut colors);
        assert_eq!(style.color, ACCENT);
        assert_eq!(style.first_line, StyleId::FirstLineUnassigned);
        assert_eq!(colors.remaining().len(), 10);
    }

    #[test]
    fn test_builtin_palette_rule() {
        let mut colors = ColorAllocator::seeded(1, OverflowPolicy::Cycle);
        let style = StyleRules::builtin().decide(&record("Anna"), &mut colors);
        assert!(PALETTE.contains(&style.color));
        assert_eq!(style.first_line, StyleId::FirstLine);
        assert_eq!(colors.assignments().get("Anna"), Some(&style.color));
    }

    #[test]
    fn test_user_rules_take_precedence() {
        let tomato = Rgb::new(255, 99, 71);
        let rules = StyleRules::with_overrides(vec![StyleRule {
            name: "platform".to_string(),
            conditions: vec![
                Condition::Project("PLAT".to_string()),
                Condition::LacksComponent("Frontend".to_string()),
            ],
            color: ColorSource::Fixed(tomato),
            tone: Tone::Inverted,
        }]);
        assert_eq!(rules.rules().len(), 3);

        let mut colors = ColorAllocator::seeded(1, OverflowPolicy::Cycle);
        let style = rules.decide(&record("Anna"), &mut colors);
        assert_eq!(style.color, tomato);
        assert_eq!(style.first_line, StyleId::FirstLineUnassigned);
        assert!(colors.assignments().is_empty());

        let mut frontend = record("Anna");
        frontend.components.push("Frontend".to_string());
        let style = rules.decide(&frontend, &mut colors);
        assert!(PALETTE.contains(&style.color));
    }

    #[test]
    fn test_conditions() {
        let r = record("Anna");
        assert!(Condition::Assignee("Anna".to_string()).matches(&r));
        assert!(Condition::Priority("major".to_string()).matches(&r));
        assert!(Condition::HasComponent("Backend".to_string()).matches(&r));
        assert!(!Condition::LacksComponent("Backend".to_string()).matches(&r));
        assert!(Condition::HasLabel("urgent".to_string()).matches(&r));
        assert!(!Condition::Project("WEB".to_string()).matches(&r));
    }

    #[test]
    fn test_text_styles() {
        let summary = StyleId::Summary.text_style();
        assert_eq!(summary.size, 22.0);
        assert_eq!(summary.leading, 22.0);
        assert_eq!(summary.font, Font::HelveticaBold);

        let label = StyleId::Label.text_style();
        assert_eq!(label.font, Font::Helvetica);
        assert_eq!(label.name, "Label");

        assert_eq!(StyleId::FirstLineUnassigned.text_style().color, Rgb::WHITE);
        assert_eq!(StyleId::LargeRank.text_style().size, 13.0);
    }

    #[test]
    fn test_tone_parse() {
        assert_eq!("light".parse::<Tone>(), Ok(Tone::Inverted));
        assert_eq!("Dark".parse::<Tone>(), Ok(Tone::Standard));
        assert!("grey".parse::<Tone>().is_err());
    }
}
