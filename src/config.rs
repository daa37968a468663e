//! Template configuration.
//!
//! Every tunable of the news template lives here. Defaults reproduce the
//! 720x1280 portrait template; any field can be overridden from JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::{Ease, LeadPhase};
use crate::error::{NewsreelError, NewsreelResult};
use crate::renderer::HighlightSpec;
use crate::text::{CanvasSize, LayoutConfig, WrapConfig, wrap::default_orphan_tokens};

/// Where a block's face comes from.
///
/// `path` wins over `family`; with neither set the generic sans-serif family
/// of the loaded fonts is used.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub path: Option<PathBuf>,
    pub family: Option<String>,
    pub weight: u16,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            path: None,
            family: None,
            weight: 400,
        }
    }
}

impl FontSpec {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn family(family: impl Into<String>, weight: u16) -> Self {
        Self {
            path: None,
            family: Some(family.into()),
            weight,
        }
    }
}

/// Styling of one block role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockStyle {
    pub font: FontSpec,
    /// Point sizes, largest first.
    pub sizes: Vec<f32>,
    pub line_spacing: f32,
    pub spacing_before: Option<f32>,
    pub color: [u8; 4],
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            sizes: vec![34.0],
            line_spacing: 0.0,
            spacing_before: None,
            color: [255, 255, 255, 255],
        }
    }
}

impl BlockStyle {
    fn sized(font: &str, sizes: Vec<f32>, line_spacing: f32, spacing_before: Option<f32>) -> Self {
        Self {
            font: FontSpec::file(font),
            sizes,
            line_spacing,
            spacing_before,
            ..Self::default()
        }
    }
}

/// How long body cards stay on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyDuration {
    /// Word-count steps, see [`crate::timing::body_duration`].
    #[default]
    Steps,
    /// Reading rate, see [`crate::timing::reading_rate_duration`].
    ReadingRate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub lead: LeadPhase,
    pub easing: Ease,
    pub opening_lead_secs: f64,
    pub opening_reveal_secs: f64,
    pub body_lead_frames: u32,
    pub body_reveal_frames: u32,
    pub body_duration: BodyDuration,
    /// Length of the blank closing card; zero disables it.
    pub closing_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lead: LeadPhase::Hidden,
            easing: Ease::OutCubic,
            opening_lead_secs: 0.2,
            opening_reveal_secs: 0.8,
            body_lead_frames: 0,
            body_reveal_frames: 18,
            body_duration: BodyDuration::Steps,
            closing_secs: 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub canvas: CanvasSize,
    pub fps: u32,
    pub background: [u8; 3],
    pub margin_left: f32,
    pub margin_right: f32,
    /// Top of the first block as a fraction of the canvas height.
    pub start_y_ratio: f32,
    pub footer_margin: f32,
    pub inter_block_spacing: f32,
    pub max_upward_shift: f32,
    pub safety_pad: f32,
    pub label: BlockStyle,
    pub title: BlockStyle,
    pub subtitle: BlockStyle,
    pub body: BlockStyle,
    pub timing: TimingConfig,
    pub highlight: HighlightSpec,
    pub orphan_tokens: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::PORTRAIT,
            fps: 24,
            background: [0, 0, 0],
            margin_left: 70.0,
            margin_right: 90.0,
            start_y_ratio: 0.60,
            footer_margin: 170.0,
            inter_block_spacing: 20.0,
            max_upward_shift: 220.0,
            safety_pad: 10.0,
            label: BlockStyle::sized("ProximaNova-Regular.ttf", vec![28.0], 4.0, None),
            title: BlockStyle::sized("DMSerifDisplay-Regular.ttf", vec![60.0, 56.0], 4.0, Some(12.0)),
            subtitle: BlockStyle::sized("ProximaNova-Regular.ttf", vec![28.0], 4.0, Some(16.0)),
            body: BlockStyle::sized("Poppins-Bold.ttf", vec![34.0, 31.0], 6.0, None),
            timing: TimingConfig::default(),
            highlight: HighlightSpec::default(),
            orphan_tokens: default_orphan_tokens(),
        }
    }
}

impl TemplateConfig {
    /// 1080x1080 preset; sizes and margins scale with the width.
    pub fn square() -> Self {
        let base = Self::default();
        let scale = CanvasSize::SQUARE.width as f32 / base.canvas.width as f32;
        let scaled = |style: BlockStyle| BlockStyle {
            sizes: style.sizes.iter().map(|size| (size * scale).floor()).collect(),
            line_spacing: style.line_spacing * scale,
            spacing_before: style.spacing_before.map(|s| s * scale),
            ..style
        };

        Self {
            canvas: CanvasSize::SQUARE,
            margin_left: base.margin_left * scale,
            margin_right: base.margin_right * scale,
            start_y_ratio: 0.55,
            footer_margin: 150.0,
            label: scaled(base.label.clone()),
            title: scaled(base.title.clone()),
            subtitle: scaled(base.subtitle.clone()),
            body: scaled(base.body.clone()),
            ..base
        }
    }

    /// Reads a JSON template; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> NewsreelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::debug!("loaded template from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> NewsreelResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that make layout or timing meaningless.
    pub fn validate(&self) -> NewsreelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(NewsreelError::config("canvas must not be empty"));
        }
        if self.fps == 0 {
            return Err(NewsreelError::config("fps must be positive"));
        }
        if self.margin_left < 0.0
            || self.margin_right < 0.0
            || self.margin_left + self.margin_right >= self.canvas.width as f32
        {
            return Err(NewsreelError::config("margins leave no room for text"));
        }
        if !(0.0..1.0).contains(&self.start_y_ratio) {
            return Err(NewsreelError::config("start_y_ratio must be in [0, 1)"));
        }
        if self.footer_margin < 0.0 || self.max_upward_shift < 0.0 || self.safety_pad < 0.0 {
            return Err(NewsreelError::config(
                "footer margin, shift cap and safety pad must not be negative",
            ));
        }
        for (role, style) in [
            ("label", &self.label),
            ("title", &self.title),
            ("subtitle", &self.subtitle),
            ("body", &self.body),
        ] {
            if style.sizes.is_empty() {
                return Err(NewsreelError::config(format!("{role} has no sizes")));
            }
            if style.sizes.iter().any(|size| !size.is_finite() || *size <= 0.0) {
                return Err(NewsreelError::config(format!("{role} sizes must be positive")));
            }
        }
        let timing = &self.timing;
        if timing.opening_lead_secs < 0.0
            || timing.opening_reveal_secs < 0.0
            || timing.closing_secs < 0.0
        {
            return Err(NewsreelError::config("timing must not be negative"));
        }
        Ok(())
    }

    pub fn start_y(&self) -> f32 {
        (self.canvas.height as f32 * self.start_y_ratio).floor()
    }

    pub fn wrap_config(&self) -> WrapConfig {
        WrapConfig {
            max_width: self.canvas.width as f32,
            margin_left: self.margin_left,
            margin_right: self.margin_right,
            orphan_tokens: self.orphan_tokens.clone(),
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            canvas: self.canvas,
            start_y: self.start_y(),
            footer_margin: self.footer_margin,
            inter_block_spacing: self.inter_block_spacing,
            max_upward_shift: self.max_upward_shift,
            safety_pad: self.safety_pad,
            wrap: self.wrap_config(),
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_describe_the_portrait_template() {
        let config = TemplateConfig::default();
        config.validate().unwrap();

        let layout = config.layout_config();
        assert_eq!(layout.start_y, 768.0);
        assert_eq!(layout.footer_limit(), 1110.0);
        assert_eq!(layout.wrap.max_width, 720.0);
        assert_eq!(config.title.sizes, vec![60.0, 56.0]);
        assert_eq!(config.body.sizes, vec![34.0, 31.0]);
    }

    #[test]
    fn square_preset_scales_the_template() {
        let config = TemplateConfig::square();
        config.validate().unwrap();
        assert_eq!(config.canvas, CanvasSize::SQUARE);
        assert_eq!(config.title.sizes, vec![90.0, 84.0]);
        assert_eq!(config.margin_left, 105.0);
        assert_eq!(config.start_y(), 594.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TemplateConfig::from_json_str(
            r#"{
                "fps": 30,
                "footer_margin": 140,
                "timing": { "lead": "visible", "easing": "linear" },
                "highlight": { "styles": { "red": [220, 30, 30, 255] } },
                "title": { "font": { "family": "DM Serif Display" }, "sizes": [54] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.fps, 30);
        assert_eq!(config.footer_margin, 140.0);
        assert_eq!(config.timing.lead, LeadPhase::Visible);
        assert_eq!(config.timing.easing, Ease::Linear);
        assert_eq!(config.timing.body_reveal_frames, 18);
        assert_eq!(config.highlight.padding, 3.0);
        assert_eq!(config.highlight.color_for(Some("red")), [220, 30, 30, 255]);
        assert_eq!(config.title.font.family.as_deref(), Some("DM Serif Display"));
        assert_eq!(config.title.font.weight, 400);
        assert_eq!(config.title.sizes, vec![54.0]);
        assert_eq!(config.canvas, CanvasSize::PORTRAIT);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = TemplateConfig::from_json_str(r#"{ "fps": 0 }"#).unwrap_err();
        assert!(matches!(err, NewsreelError::Config(_)));

        let err = TemplateConfig::from_json_str(r#"{ "body": { "sizes": [] } }"#).unwrap_err();
        assert!(matches!(err, NewsreelError::Config(_)));

        let err = TemplateConfig::from_json_str(r#"{ "margin_left": 400, "margin_right": 400 }"#)
            .unwrap_err();
        assert!(matches!(err, NewsreelError::Config(_)));

        let err = TemplateConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, NewsreelError::Json(_)));
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "background": [10, 20, 30] }}"#).unwrap();
        let config = TemplateConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.background, [10, 20, 30]);

        let missing = TemplateConfig::from_json_file(Path::new("/no/such/template.json"));
        assert!(matches!(missing, Err(NewsreelError::Io(_))));
    }
}
