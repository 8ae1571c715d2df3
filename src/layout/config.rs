//! Configuration for the layout engine

/// Configuration options for layout computation
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Largest number of pin positions on one side of a symbol
    pub max_side_anchors: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_side_anchors: 200,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest number of pin positions per side
    pub fn with_max_side_anchors(mut self, max: usize) -> Self {
        self.max_side_anchors = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.max_side_anchors, 200);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new().with_max_side_anchors(16);
        assert_eq!(config.max_side_anchors, 16);
    }
}
