// Series color assignment

/// Ordered list of colors cycled through by series index
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    /// Falls back to category10 when `colors` is empty
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            Self::category10()
        } else {
            Self { colors }
        }
    }

    /// D3 category10 scheme
    pub fn category10() -> Self {
        Self {
            colors: category10_hex().into_iter().map(String::from).collect(),
        }
    }

    pub fn color_at(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    /// Series 0 takes the chart's own color; the rest cycle the palette
    pub fn series_color(&self, index: usize, primary: &str) -> String {
        if index == 0 && !primary.is_empty() {
            primary.to_string()
        } else {
            self.color_at(index).to_string()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::category10()
    }
}

pub fn category10_hex() -> Vec<&'static str> {
    vec![
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
        "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
    ]
}
