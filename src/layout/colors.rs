//! Per-run assignee color allocation.

use crate::models::{Rgb, UNASSIGNED};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Header colors handed out to assignees, in palette order.
pub const PALETTE: [Rgb; 10] = [
    Rgb::new(192, 255, 62),  // olive
    Rgb::new(135, 206, 250), // light blue
    Rgb::new(255, 110, 180), // hot pink
    Rgb::new(255, 236, 139), // gold
    Rgb::new(250, 128, 114), // salmon
    Rgb::new(152, 251, 152), // pale green
    Rgb::new(234, 234, 234), // light grey
    Rgb::new(0, 206, 209),   // dark turquoise
    Rgb::new(255, 140, 0),   // dark orange
    Rgb::new(171, 130, 255), // medium purple
];

/// Royal blue, reserved for unassigned cards.
pub const ACCENT: Rgb = Rgb::new(0, 85, 164);

/// Neutral grey used by [`OverflowPolicy::Fixed`].
pub const OVERFLOW: Rgb = Rgb::new(200, 200, 200);

/// What to hand out once every palette color is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// The n-th extra assignee gets `PALETTE[n % PALETTE.len()]`
    #[default]
    Cycle,
    /// Every extra assignee gets [`OVERFLOW`]
    Fixed,
}

impl OverflowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowPolicy::Cycle => "cycle",
            OverflowPolicy::Fixed => "fixed",
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cycle" => Ok(OverflowPolicy::Cycle),
            "fixed" => Ok(OverflowPolicy::Fixed),
            _ => Err(format!(
                "Invalid overflow policy: '{}'. Valid values: cycle, fixed",
                s
            )),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binds each assignee to one color for the lifetime of a run.
///
/// The first lookup of an assignee draws a random color from the remaining
/// pool and removes it, so distinct assignees get distinct colors until the
/// pool runs dry. The `Unassigned` sentinel always maps to [`ACCENT`] and
/// never consumes a palette entry.
#[derive(Debug, Clone)]
pub struct ColorAllocator {
    rng: StdRng,
    policy: OverflowPolicy,
    remaining: Vec<Rgb>,
    assigned: BTreeMap<String, Rgb>,
    overflowed: usize,
}

impl ColorAllocator {
    /// Create an allocator with a full palette.
    pub fn new(rng: StdRng, policy: OverflowPolicy) -> Self {
        let mut allocator = Self {
            rng,
            policy,
            remaining: Vec::new(),
            assigned: BTreeMap::new(),
            overflowed: 0,
        };
        allocator.load_palette();
        allocator
    }

    /// Deterministic allocator for reproducible decks.
    pub fn seeded(seed: u64, policy: OverflowPolicy) -> Self {
        Self::new(StdRng::seed_from_u64(seed), policy)
    }

    pub fn from_entropy(policy: OverflowPolicy) -> Self {
        Self::new(StdRng::from_entropy(), policy)
    }

    /// Refill the pool with the full palette. Existing bindings are kept.
    pub fn load_palette(&mut self) {
        self.remaining = PALETTE.to_vec();
    }

    /// Colors still available for new assignees.
    pub fn remaining(&self) -> &[Rgb] {
        &self.remaining
    }

    /// Swap the pool of unbound colors. Existing bindings are kept.
    pub fn replace_remaining(&mut self, colors: Vec<Rgb>) {
        self.remaining = colors;
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Color bound to `assignee`, binding one if needed.
    pub fn color_for(&mut self, assignee: &str) -> Rgb {
        if assignee == UNASSIGNED {
            return ACCENT;
        }
        if let Some(color) = self.assigned.get(assignee) {
            return *color;
        }

        let color = if self.remaining.is_empty() {
            let color = match self.policy {
                OverflowPolicy::Cycle => PALETTE[self.overflowed % PALETTE.len()],
                OverflowPolicy::Fixed => OVERFLOW,
            };
            self.overflowed += 1;
            warn!(
                assignee,
                policy = %self.policy,
                color = %color,
                "color palette exhausted, reusing a color"
            );
            color
        } else {
            let index = self.rng.gen_range(0..self.remaining.len());
            self.remaining.remove(index)
        };

        debug!(assignee, color = %color, "bound assignee color");
        self.assigned.insert(assignee.to_string(), color);
        color
    }

    /// Bindings made so far, by assignee.
    pub fn assignments(&self) -> &BTreeMap<String, Rgb> {
        &self.assigned
    }

    /// Number of assignees that got an overflow color.
    pub fn overflow_count(&self) -> usize {
        self.overflowed
    }
}
