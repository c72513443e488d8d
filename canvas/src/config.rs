//! Canvas sizing constants.

/// Sizes used when compacting and restoring shapes, plus row layout gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Full card width.
    pub card_width: f64,
    /// Full card height.
    pub card_height: f64,
    /// Side of a compacted card.
    pub card_compact_size: f64,
    /// Full group width.
    pub group_width: f64,
    /// Full group height.
    pub group_height: f64,
    /// Side of a compacted group.
    pub group_compact_size: f64,
    /// Horizontal gap between siblings in a row.
    pub node_gap: f64,
    /// Vertical gap between a row and the parent below it.
    pub rank_gap: f64,
    /// Font size given to new groups.
    pub default_font_size: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            card_width: 210.0,
            card_height: 195.0,
            card_compact_size: 54.0,
            group_width: 210.0,
            group_height: 150.0,
            group_compact_size: 66.0,
            node_gap: 20.0,
            rank_gap: 40.0,
            default_font_size: 16,
        }
    }
}

impl CanvasConfig {
    /// Override the row gaps.
    #[must_use]
    pub const fn with_gaps(mut self, node_gap: f64, rank_gap: f64) -> Self {
        self.node_gap = node_gap;
        self.rank_gap = rank_gap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_gaps_keeps_sizes() {
        let config = CanvasConfig::default().with_gaps(8.0, 12.0);
        assert_eq!(config.node_gap, 8.0);
        assert_eq!(config.rank_gap, 12.0);
        assert_eq!(config.card_compact_size, 54.0);
        assert_eq!(config.group_compact_size, 66.0);
    }
}
