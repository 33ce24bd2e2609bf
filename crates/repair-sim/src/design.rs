//! Block designs consumed by the participant registry
//!
//! A design is an ordered list of blocks, one per participant, each block a set
//! of share ids. The simulator assumes but does not check regularity; the
//! derived [`DesignParameters`] report whatever the blocks actually exhibit.

use crate::error::{Result, SimError};
use crate::ids::ShareId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

pub mod catalog;

/// An ordered collection of blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDesign {
    /// Optional human-readable name, e.g. `"7,7,3,3,1"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// One block per participant, in participant order
    pub blocks: Vec<Vec<ShareId>>,
}

impl BlockDesign {
    /// Build a design from raw share ids, collapsing duplicates within a block.
    pub fn new<I, B>(blocks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = u32>,
    {
        let blocks = blocks
            .into_iter()
            .map(|block| block.into_iter().map(ShareId).collect())
            .collect();
        Self { name: None, blocks }.normalized()
    }

    /// Attach a name to the design
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse a design from TOML (`name = "..."`, `blocks = [[...], ...]`)
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let design: Self = toml::from_str(input)?;
        design.normalized().validated()
    }

    /// Parse a design from JSON
    pub fn from_json_str(input: &str) -> Result<Self> {
        let design: Self =
            serde_json::from_str(input).map_err(|e| SimError::parse(e.to_string()))?;
        design.normalized().validated()
    }

    /// Load a design file, choosing the format from the extension (`.json` or TOML).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::io(format!("reading {}: {e}", path.display())))?;
        let mut design = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_toml_str(&text)?,
        };
        if design.name.is_none() {
            design.name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_owned);
        }
        Ok(design)
    }

    /// Reject designs the registry cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(SimError::EmptyDesign);
        }
        if let Some(index) = self.blocks.iter().position(Vec::is_empty) {
            return Err(SimError::EmptyBlock { index });
        }
        Ok(())
    }

    /// Validate and return self
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Number of blocks, i.e. participants
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the design has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Display name, falling back to the derived parameters
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.parameters().to_string())
    }

    /// The set of every share held by some block
    pub fn share_universe(&self) -> BTreeSet<ShareId> {
        self.blocks.iter().flatten().copied().collect()
    }

    /// Largest number of shares any two distinct blocks have in common
    pub fn max_block_intersection(&self) -> usize {
        let sets: Vec<BTreeSet<ShareId>> = self
            .blocks
            .iter()
            .map(|block| block.iter().copied().collect())
            .collect();
        let mut max = 0;
        for (i, a) in sets.iter().enumerate() {
            for b in &sets[i + 1..] {
                max = max.max(a.intersection(b).count());
            }
        }
        max
    }

    /// Derive `(v, b, r, k, λ)` from the blocks
    pub fn parameters(&self) -> DesignParameters {
        let v = self.share_universe().len();
        let b = self.blocks.len();

        let k = uniform(self.blocks.iter().map(Vec::len));

        let mut replication: HashMap<ShareId, usize> = HashMap::new();
        for share in self.blocks.iter().flatten() {
            *replication.entry(*share).or_default() += 1;
        }
        let r = uniform(replication.values().copied());

        let mut pair_counts: HashMap<(ShareId, ShareId), usize> = HashMap::new();
        for block in &self.blocks {
            for (i, a) in block.iter().enumerate() {
                for b in &block[i + 1..] {
                    let pair = if a < b { (*a, *b) } else { (*b, *a) };
                    *pair_counts.entry(pair).or_default() += 1;
                }
            }
        }
        // Every pair of points must be covered for λ to be defined.
        let all_pairs = v * v.saturating_sub(1) / 2;
        let lambda = if v > 1 && pair_counts.len() == all_pairs {
            uniform(pair_counts.values().copied())
        } else {
            None
        };

        DesignParameters {
            v,
            b,
            r,
            k,
            lambda,
            max_intersection: self.max_block_intersection(),
        }
    }

    /// Fewest distinct peers any successful repair can contact: `⌈k / μ⌉` where
    /// `μ` is the largest block intersection. `None` unless the block size is
    /// uniform and some pair of blocks intersects.
    pub fn min_contacts_lower_bound(&self) -> Option<usize> {
        let params = self.parameters();
        let k = params.k?;
        if params.max_intersection == 0 {
            return None;
        }
        Some(k.div_ceil(params.max_intersection))
    }

    fn normalized(mut self) -> Self {
        for block in &mut self.blocks {
            let mut seen = BTreeSet::new();
            block.retain(|share| seen.insert(*share));
        }
        self
    }
}

fn uniform(mut values: impl Iterator<Item = usize>) -> Option<usize> {
    let first = values.next()?;
    values.all(|value| value == first).then_some(first)
}

/// Observed parameters of a block design.
///
/// `r`, `k` and `lambda` are `None` when the blocks are not regular in that
/// respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignParameters {
    /// Number of distinct shares
    pub v: usize,
    /// Number of blocks
    pub b: usize,
    /// Blocks per share
    pub r: Option<usize>,
    /// Shares per block
    pub k: Option<usize>,
    /// Blocks per pair of shares
    pub lambda: Option<usize>,
    /// Largest intersection between two blocks
    pub max_intersection: usize,
}

impl fmt::Display for DesignParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(value: Option<usize>) -> String {
            value.map_or_else(|| "?".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.v,
            self.b,
            opt(self.r),
            opt(self.k),
            opt(self.lambda)
        )
    }
}
