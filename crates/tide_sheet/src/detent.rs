//! Snap positions ("detents")

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A resting position of the sheet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetDetent {
    /// Nearly full screen
    Maximum,
    /// Roughly half the screen (default)
    #[default]
    Middle,
    /// A short peek above the bottom edge
    Minimum,
}

impl SheetDetent {
    /// Declaration order, most expanded first
    pub const ALL: [SheetDetent; 3] = [
        SheetDetent::Maximum,
        SheetDetent::Middle,
        SheetDetent::Minimum,
    ];

    /// Release speed above which the middle detent is skipped
    pub const SKIP_MIDDLE_VELOCITY: f32 = 2000.0;
    /// Downward release speed above which a flingable sheet dismisses
    pub const FLING_DISMISS_VELOCITY: f32 = 4000.0;
    /// Upward release speed that lifts a low sheet to the middle detent
    pub const MINIMUM_TO_MIDDLE_VELOCITY: f32 = 900.0;
}

/// Candidate list for detent resolution (never more than three entries)
pub type DetentList = SmallVec<[SheetDetent; 3]>;

/// The detents a presentation may rest at, in caller declaration order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowedDetents {
    detents: DetentList,
}

impl AllowedDetents {
    /// Build from any sequence; duplicates are dropped, an empty sequence means all
    pub fn new(detents: impl IntoIterator<Item = SheetDetent>) -> Self {
        let mut list = DetentList::new();
        for detent in detents {
            if !list.contains(&detent) {
                list.push(detent);
            }
        }
        if list.is_empty() {
            tracing::debug!("empty allowed detent list, allowing all detents");
            list.extend(SheetDetent::ALL);
        }
        Self { detents: list }
    }

    pub fn all() -> Self {
        Self::new(SheetDetent::ALL)
    }

    pub fn contains(&self, detent: SheetDetent) -> bool {
        self.detents.contains(&detent)
    }

    pub fn iter(&self) -> impl Iterator<Item = SheetDetent> + '_ {
        self.detents.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.detents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detents.is_empty()
    }

    pub fn to_list(&self) -> DetentList {
        self.detents.clone()
    }

    /// Allowed detents that are also in `only`, or every allowed detent if none are
    pub fn restrict(&self, only: &[SheetDetent]) -> DetentList {
        let list: DetentList = self.iter().filter(|d| only.contains(d)).collect();
        if list.is_empty() {
            self.to_list()
        } else {
            list
        }
    }

    /// Allowed detents except `excluded`, or every allowed detent if that leaves none
    pub fn without(&self, excluded: SheetDetent) -> DetentList {
        let list: DetentList = self.iter().filter(|d| *d != excluded).collect();
        if list.is_empty() {
            self.to_list()
        } else {
            list
        }
    }
}

impl Default for AllowedDetents {
    fn default() -> Self {
        Self::all()
    }
}

impl From<&[SheetDetent]> for AllowedDetents {
    fn from(detents: &[SheetDetent]) -> Self {
        Self::new(detents.iter().copied())
    }
}
