//! Configuration for KiCad output

/// Configuration options for building KiCad symbols
#[derive(Debug, Clone)]
pub struct KicadConfig {
    /// Pin grid pitch in millimetres
    pub grid_mm: f64,

    /// Stroke width of the body rectangle in mil
    pub body_line_width_mil: f64,

    /// Spacing of the hidden properties below the body, in grid units
    pub hidden_text_gap: f64,

    /// Distance of the text item from the top of the pin rectangle, in grid
    /// units, for small, big and very big symbols
    pub text_gap: f64,
    pub text_gap_big: f64,
    pub text_gap_very_big: f64,

    /// Vertical pin counts above which a symbol counts as big / very big
    pub big_pin_count: usize,
    pub very_big_pin_count: usize,
}

impl Default for KicadConfig {
    fn default() -> Self {
        Self {
            grid_mm: 2.54,
            body_line_width_mil: 10.0,
            hidden_text_gap: 1.0,
            text_gap: 0.5,
            text_gap_big: 2.5,
            text_gap_very_big: 5.5,
            big_pin_count: 5,
            very_big_pin_count: 15,
        }
    }
}

impl KicadConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid pitch in millimetres
    pub fn with_grid(mut self, grid_mm: f64) -> Self {
        self.grid_mm = grid_mm;
        self
    }

    /// Set the body stroke width in mil
    pub fn with_body_line_width(mut self, mil: f64) -> Self {
        self.body_line_width_mil = mil;
        self
    }

    /// Set the spacing of hidden properties
    pub fn with_hidden_text_gap(mut self, gap: f64) -> Self {
        self.hidden_text_gap = gap;
        self
    }

    /// Set the three text gaps
    pub fn with_text_gaps(mut self, small: f64, big: f64, very_big: f64) -> Self {
        self.text_gap = small;
        self.text_gap_big = big;
        self.text_gap_very_big = very_big;
        self
    }

    /// Set the pin count thresholds for big and very big symbols
    pub fn with_pin_count_thresholds(mut self, big: usize, very_big: usize) -> Self {
        self.big_pin_count = big;
        self.very_big_pin_count = very_big;
        self
    }

    /// Text gap for a symbol with `pin_count` positions on its fuller
    /// vertical side
    pub fn text_gap_for(&self, pin_count: usize) -> f64 {
        if pin_count > self.very_big_pin_count {
            self.text_gap_very_big
        } else if pin_count > self.big_pin_count {
            self.text_gap_big
        } else {
            self.text_gap
        }
    }

    /// Convert grid units to millimetres
    pub fn to_mm(&self, grid: f64) -> f64 {
        grid * self.grid_mm
    }
}

/// Convert mil to millimetres
pub fn mil_to_mm(mil: f64) -> f64 {
    mil * 0.0254
}
