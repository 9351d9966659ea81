//! KDL schema for `config.kdl` / `.cardgen.kdl`.
//!
//! ```kdl
//! overflow-policy "cycle"   // or "fixed"
//! open-viewer #false
//! seed 42
//!
//! rule "platform" {
//!     project "PLAT"
//!     not-component "Frontend"
//!     color 255 99 71        // or: color "#ff6347", color "palette"
//!     text "light"           // "dark" (default) or "light"
//! }
//! ```
//!
//! Unknown top-level nodes are ignored. Inside a `rule` block every node
//! must be known, so a misspelled condition cannot silently widen a rule.

use crate::layout::{ColorSource, Condition, OverflowPolicy, StyleRule, Tone};
use crate::models::Rgb;
use crate::{Error, Result};
use kdl::{KdlDocument, KdlNode, KdlValue};

/// Settings from one config file. `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardgenConfig {
    pub overflow_policy: Option<OverflowPolicy>,

    /// Open the generated PDF with the system viewer
    pub open_viewer: Option<bool>,

    /// Seed for the color shuffle
    pub seed: Option<u64>,

    /// Styling rules, in file order
    pub rules: Vec<StyleRule>,
}

impl CardgenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse KDL text.
    pub fn parse(content: &str) -> Result<Self> {
        let doc: KdlDocument = content
            .parse()
            .map_err(|e| Error::Config(format!("Failed to parse KDL: {}", e)))?;
        Self::from_kdl(&doc)
    }

    /// Read settings from a parsed document.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        let mut config = Self::new();

        for node in doc.nodes() {
            match node.name().value() {
                "overflow-policy" => {
                    let value = string_arg(node)?;
                    config.overflow_policy = Some(value.parse().map_err(Error::Config)?);
                }
                "open-viewer" => {
                    let value = first_value(node)?;
                    config.open_viewer = Some(value.as_bool().ok_or_else(|| {
                        Error::Config(format!("open-viewer must be #true or #false, got {}", value))
                    })?);
                }
                "seed" => {
                    let value = first_value(node)?;
                    let seed = value
                        .as_integer()
                        .and_then(|i| u64::try_from(i).ok())
                        .ok_or_else(|| {
                            Error::Config(format!("seed must be a non-negative integer, got {}", value))
                        })?;
                    config.seed = Some(seed);
                }
                "rule" => config.rules.push(parse_rule_node(node)?),
                _ => {}
            }
        }

        Ok(config)
    }
}

/// Parse a `rule "name" { ... }` block.
fn parse_rule_node(node: &KdlNode) -> Result<StyleRule> {
    let name = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| Error::Config("rule node must have a name argument".to_string()))?
        .to_string();

    let mut rule = StyleRule {
        name,
        conditions: Vec::new(),
        color: ColorSource::Palette,
        tone: Tone::Standard,
    };

    let Some(children) = node.children() else {
        return Ok(rule);
    };
    for child in children.nodes() {
        let property = child.name().value();
        match property {
            "assignee" => rule.conditions.push(Condition::Assignee(string_arg(child)?)),
            "project" => rule.conditions.push(Condition::Project(string_arg(child)?)),
            "priority" => rule.conditions.push(Condition::Priority(string_arg(child)?)),
            "component" => rule
                .conditions
                .push(Condition::HasComponent(string_arg(child)?)),
            "not-component" => rule
                .conditions
                .push(Condition::LacksComponent(string_arg(child)?)),
            "label" => rule.conditions.push(Condition::HasLabel(string_arg(child)?)),
            "color" => rule.color = parse_color(child)?,
            "text" => rule.tone = string_arg(child)?.parse().map_err(Error::Config)?,
            other => {
                return Err(Error::Config(format!(
                    "Unknown property '{}' in rule '{}'",
                    other, rule.name
                )));
            }
        }
    }
    Ok(rule)
}

/// `color R G B`, `color "#rrggbb"` or `color "palette"`.
fn parse_color(node: &KdlNode) -> Result<ColorSource> {
    let values: Vec<&KdlValue> = node.entries().iter().map(|e| e.value()).collect();
    match values.as_slice() {
        [single] => {
            let text = single
                .as_string()
                .ok_or_else(|| Error::Config(format!("Invalid color: {}", single)))?;
            if text.eq_ignore_ascii_case("palette") {
                return Ok(ColorSource::Palette);
            }
            Rgb::from_hex(text)
                .map(ColorSource::Fixed)
                .ok_or_else(|| Error::Config(format!("Invalid color: '{}'", text)))
        }
        [r, g, b] => {
            let channel = |v: &KdlValue| {
                v.as_integer()
                    .and_then(|i| u8::try_from(i).ok())
                    .ok_or_else(|| Error::Config(format!("Color channel must be 0-255, got {}", v)))
            };
            Ok(ColorSource::Fixed(Rgb::new(channel(r)?, channel(g)?, channel(b)?)))
        }
        _ => Err(Error::Config(
            "color takes three channels, a \"#rrggbb\" string or \"palette\"".to_string(),
        )),
    }
}

fn first_value(node: &KdlNode) -> Result<&KdlValue> {
    node.entries().first().map(|e| e.value()).ok_or_else(|| {
        Error::Config(format!("'{}' needs a value", node.name().value()))
    })
}

fn string_arg(node: &KdlNode) -> Result<String> {
    let value = first_value(node)?;
    value.as_string().map(str::to_string).ok_or_else(|| {
        Error::Config(format!(
            "'{}' expects a string, got {}",
            node.name().value(),
            value
        ))
    })
}
