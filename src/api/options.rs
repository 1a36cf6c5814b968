use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::interaction::CrosshairMode;
use crate::render::Color;

/// Chart-level options re-applied wholesale whenever they change.
///
/// Serializable so hosts can persist chart setup as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// When enabled the surface sizes the chart and explicit resize is never called.
    #[serde(default)]
    pub auto_size: bool,
    #[serde(default)]
    pub layout: LayoutOptions,
    #[serde(default = "default_crosshair_mode")]
    pub crosshair_mode: CrosshairMode,
    #[serde(default)]
    pub horz_scale: HorzScaleOptions,
    #[serde(default = "default_true")]
    pub handle_scroll: bool,
    #[serde(default = "default_true")]
    pub handle_scale: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            auto_size: false,
            layout: LayoutOptions::default(),
            crosshair_mode: default_crosshair_mode(),
            horz_scale: HorzScaleOptions::default(),
            handle_scroll: true,
            handle_scale: true,
        }
    }
}

impl ChartOptions {
    #[must_use]
    pub fn with_auto_size(mut self, auto_size: bool) -> Self {
        self.auto_size = auto_size;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_crosshair_mode(mut self, mode: CrosshairMode) -> Self {
        self.crosshair_mode = mode;
        self
    }

    #[must_use]
    pub fn with_horz_scale(mut self, horz_scale: HorzScaleOptions) -> Self {
        self.horz_scale = horz_scale;
        self
    }

    #[must_use]
    pub fn with_interactions(mut self, handle_scroll: bool, handle_scale: bool) -> Self {
        self.handle_scroll = handle_scroll;
        self.handle_scale = handle_scale;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.layout.validate()?;
        self.horz_scale.validate()
    }

    pub fn from_json(input: &str) -> ChartResult<Self> {
        let options: Self = serde_json::from_str(input)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> ChartResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub background: Color,
    pub text_color: Color,
    pub font_size_px: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            text_color: Color::rgb(0.1, 0.1, 0.1),
            font_size_px: 12.0,
        }
    }
}

impl LayoutOptions {
    pub fn validate(self) -> ChartResult<()> {
        self.background.validate()?;
        self.text_color.validate()?;
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "layout font size must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorzScaleOptions {
    pub visible: bool,
    pub right_offset_bars: f64,
    pub min_bar_spacing_px: f64,
}

impl Default for HorzScaleOptions {
    fn default() -> Self {
        Self {
            visible: true,
            right_offset_bars: 0.0,
            min_bar_spacing_px: 0.5,
        }
    }
}

impl HorzScaleOptions {
    pub fn validate(self) -> ChartResult<()> {
        if !self.right_offset_bars.is_finite() {
            return Err(ChartError::InvalidData(
                "horizontal scale right offset must be finite".to_owned(),
            ));
        }
        if !self.min_bar_spacing_px.is_finite() || self.min_bar_spacing_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "horizontal scale min bar spacing must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Per-series style options, re-applied wholesale on change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOptions {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_series_color")]
    pub color: Color,
    #[serde(default = "default_line_width_px")]
    pub line_width_px: f64,
    #[serde(default = "default_true")]
    pub last_value_visible: bool,
    #[serde(default = "default_true")]
    pub price_line_visible: bool,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            visible: true,
            color: default_series_color(),
            line_width_px: default_line_width_px(),
            last_value_visible: true,
            price_line_visible: true,
        }
    }
}

impl SeriesOptions {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width_px: f64) -> Self {
        self.line_width_px = line_width_px;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.color.validate()?;
        if !self.line_width_px.is_finite() || self.line_width_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "series line width must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_crosshair_mode() -> CrosshairMode {
    CrosshairMode::Magnet
}

fn default_series_color() -> Color {
    Color::rgb(0.16, 0.38, 1.0)
}

fn default_line_width_px() -> f64 {
    2.0
}
