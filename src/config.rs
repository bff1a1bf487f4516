//! Tunables for [`Mirror`](crate::projection::mirror::Mirror).

use serde::{Deserialize, Serialize};

/// Where a refreshed derived item ends up after its source item mutated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePlacement {
    /// Remove the stale entry and append the fresh one.
    #[default]
    MoveToEnd,
    /// Overwrite the stale entry at its current position.
    InPlace,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorOptions {
    pub placement: UpdatePlacement,

    /// Maximum nesting of reconciliation steps, i.e. how often an observer of
    /// the derived sequence may mutate the source again before the mirror
    /// refuses with [`Error::ReentrancyLimit`](crate::Error::ReentrancyLimit).
    pub max_depth: usize,
}

impl MirrorOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    pub fn with_placement(mut self, placement: UpdatePlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for MirrorOptions {
    fn default() -> Self {
        MirrorOptions {
            placement: UpdatePlacement::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = MirrorOptions::default();
        assert_eq!(opts.placement, UpdatePlacement::MoveToEnd);
        assert_eq!(opts.max_depth, 32);
    }

    #[test]
    fn deserialize_partial() {
        let opts: MirrorOptions = serde_json::from_str(r#"{ "placement": "in_place" }"#).unwrap();
        assert_eq!(opts.placement, UpdatePlacement::InPlace);
        assert_eq!(opts.max_depth, MirrorOptions::DEFAULT_MAX_DEPTH);

        let opts: MirrorOptions = serde_json::from_str(r#"{ "max_depth": 4 }"#).unwrap();
        assert_eq!(opts, MirrorOptions::default().with_max_depth(4));
    }
}
