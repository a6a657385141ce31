//! Layout configuration
//!
//! Byte budgets for the target cache topology and the tuning knobs of the
//! sampling-based blocker. Everything derived (cache line capacity, region
//! extent, per-tile cost) is computed from these values so that a single
//! `LayoutConfig` fully determines a run together with the input order.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest supported window radius; quadrants span `radius + 1` cells, which
/// must stay within the serializable tile edge.
pub const MAX_WINDOW_RADIUS: usize = 3;

/// Order in which the blocker visits nonzeros
///
/// Which nonzeros a tile absorbs depends on this order, so it is part of the
/// configuration rather than an implementation detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitOrder {
    /// The order entries were supplied in
    #[default]
    Input,
    /// Ascending by row, then column
    RowMajor,
}

/// Configuration shared by every stage of the layout pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Bytes in one cache line
    pub cache_line_bytes: usize,
    /// Bytes per stored element (matrix values and vector entries)
    pub element_bytes: usize,
    /// Page budget that one cache region must fit into
    pub page_bytes: usize,
    /// Extra elements stored per tile (edge, row, col)
    pub tile_overhead: usize,
    /// Fraction of the sampling window drawn per tile
    pub sampling_rate: f64,
    /// Fraction of a quadrant drawn when refining its density
    pub refine_rate: f64,
    /// Quadrant density above which a 4x4 tile is attempted
    pub quadrant_threshold: f64,
    /// Half-width of the sampling window around a seed
    pub window_radius: usize,
    /// Neighbors requested per spatial-index query during arrangement
    pub neighbor_limit: usize,
    /// Nonzero visiting order for the blocker
    pub visit_order: VisitOrder,
    /// Seed for the sampling generator; `None` draws one from entropy
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cache_line_bytes: 64,
            element_bytes: 4,
            page_bytes: 80,
            tile_overhead: 3,
            sampling_rate: 0.2,
            refine_rate: 0.2,
            quadrant_threshold: 0.5,
            window_radius: MAX_WINDOW_RADIUS,
            neighbor_limit: 20,
            visit_order: VisitOrder::Input,
            seed: None,
        }
    }
}

impl LayoutConfig {
    /// Create a configuration with default budgets
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling rate used for the quadrant window
    pub fn with_sampling_rate(mut self, rate: f64) -> Self {
        self.sampling_rate = rate;
        self
    }

    /// Set the sampling rate used when refining a single quadrant
    pub fn with_refine_rate(mut self, rate: f64) -> Self {
        self.refine_rate = rate;
        self
    }

    /// Set both sampling rates at once
    pub fn with_rates(self, rate: f64) -> Self {
        self.with_sampling_rate(rate).with_refine_rate(rate)
    }

    /// Set the quadrant density threshold
    pub fn with_quadrant_threshold(mut self, threshold: f64) -> Self {
        self.quadrant_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the sampling window radius
    pub fn with_window_radius(mut self, radius: usize) -> Self {
        self.window_radius = radius;
        self
    }

    /// Set the number of neighbors requested per spatial query
    pub fn with_neighbor_limit(mut self, limit: usize) -> Self {
        self.neighbor_limit = limit;
        self
    }

    /// Set the cache line and page budgets in bytes
    pub fn with_budgets(mut self, cache_line_bytes: usize, page_bytes: usize) -> Self {
        self.cache_line_bytes = cache_line_bytes;
        self.page_bytes = page_bytes;
        self
    }

    /// Set the order in which nonzeros seed new tiles
    pub fn with_visit_order(mut self, order: VisitOrder) -> Self {
        self.visit_order = order;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Elements that fit in one cache line; the arrangement locality radius
    pub fn cache_line_capacity(&self) -> usize {
        self.cache_line_bytes / self.element_bytes
    }

    /// Rows and columns covered by one cache region
    pub fn region_extent(&self) -> (usize, usize) {
        let extent = self.page_bytes / self.element_bytes;
        (extent, extent)
    }

    /// Check every parameter before a run starts
    pub fn validate(&self) -> Result<()> {
        if self.element_bytes == 0 {
            return Err(Error::InvalidParameter(
                "element_bytes must be positive".to_string(),
            ));
        }
        if self.cache_line_capacity() == 0 {
            return Err(Error::InvalidParameter(format!(
                "cache line of {} bytes holds no {}-byte elements",
                self.cache_line_bytes, self.element_bytes
            )));
        }
        if self.region_extent().0 == 0 {
            return Err(Error::InvalidParameter(format!(
                "page of {} bytes holds no {}-byte elements",
                self.page_bytes, self.element_bytes
            )));
        }
        for (name, rate) in [
            ("sampling_rate", self.sampling_rate),
            ("refine_rate", self.refine_rate),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(Error::invalid_rate(name, rate));
            }
        }
        if !(0.0..=1.0).contains(&self.quadrant_threshold) {
            return Err(Error::InvalidParameter(format!(
                "quadrant_threshold {} must be in [0, 1]",
                self.quadrant_threshold
            )));
        }
        if self.window_radius == 0 || self.window_radius > MAX_WINDOW_RADIUS {
            return Err(Error::InvalidParameter(format!(
                "window_radius {} must be in 1..={MAX_WINDOW_RADIUS}",
                self.window_radius
            )));
        }
        if self.neighbor_limit == 0 {
            return Err(Error::InvalidParameter(
                "neighbor_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
