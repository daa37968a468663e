//! Frame timeline of a reveal: lead, reveal, settled.

use serde::{Deserialize, Serialize};

/// Easing functions used to map normalized animation progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-out.
    OutQuad,
    /// Cubic ease-out, `1 - (1 - t)^3`.
    #[default]
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// What the lead frames before the reveal show.
///
/// Both policies exist in production templates, so this is configuration
/// rather than a fixed rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadPhase {
    /// Nothing is revealed until the reveal starts.
    #[default]
    Hidden,
    /// The settled card is shown, then wiped in again.
    Visible,
}

/// Position of a frame on the card timeline. Monotonic in the frame index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealPhase {
    LeadStatic,
    /// Linear progress in `[0, 1)`.
    Revealing(f64),
    Settled,
}

/// Frame budget of one card, fixed when the card is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSpec {
    pub total_frames: u32,
    pub static_lead_frames: u32,
    pub reveal_frames: u32,
    pub easing: Ease,
    pub lead: LeadPhase,
}

impl AnimationSpec {
    /// Builds a spec from explicit frame counts.
    ///
    /// Lead and reveal are clamped so they never extend past `total_frames`.
    pub fn with_frames(total_frames: u32, static_lead_frames: u32, reveal_frames: u32) -> Self {
        let static_lead_frames = static_lead_frames.min(total_frames);
        let reveal_frames = reveal_frames.min(total_frames - static_lead_frames);
        Self {
            total_frames,
            static_lead_frames,
            reveal_frames,
            easing: Ease::default(),
            lead: LeadPhase::default(),
        }
    }

    /// Builds a spec from a clip duration; frame counts are truncated like
    /// `int(fps * seconds)`.
    pub fn from_seconds(duration: f64, fps: u32, lead: f64, reveal: f64) -> Self {
        let frames = |seconds: f64| (fps as f64 * seconds.max(0.0)) as u32;
        Self::with_frames(frames(duration), frames(lead), frames(reveal))
    }

    pub fn easing(mut self, easing: Ease) -> Self {
        self.easing = easing;
        self
    }

    pub fn lead(mut self, lead: LeadPhase) -> Self {
        self.lead = lead;
        self
    }

    /// First frame at which the card is fully revealed.
    pub fn settled_at(&self) -> u32 {
        self.static_lead_frames + self.reveal_frames
    }

    pub fn phase(&self, frame_index: u32) -> RevealPhase {
        if frame_index < self.static_lead_frames {
            RevealPhase::LeadStatic
        } else if frame_index < self.settled_at() {
            let t = (frame_index - self.static_lead_frames) as f64 / self.reveal_frames as f64;
            RevealPhase::Revealing(t.clamp(0.0, 1.0))
        } else {
            RevealPhase::Settled
        }
    }

    /// Eased fraction of the canvas width that is revealed at `frame_index`.
    pub fn visible_fraction(&self, frame_index: u32) -> f64 {
        match self.phase(frame_index) {
            RevealPhase::LeadStatic => match self.lead {
                LeadPhase::Hidden => 0.0,
                LeadPhase::Visible => 1.0,
            },
            RevealPhase::Revealing(t) => self.easing.apply(t),
            RevealPhase::Settled => 1.0,
        }
    }
}
