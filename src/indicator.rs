//! LED indicator state machine.
//!
//! Two states, flipped unconditionally by every push-button press.  The look
//! for each state (colour, emissive strength, light intensity) is fixed
//! configuration, never computed.

use bevy::prelude::*;

/// Indicator state.  Starts `Dim` and toggles forever; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LedState {
    /// Resting yellow glow.
    #[default]
    Dim,
    /// Bright red glow after a press.
    Glowing,
}

impl LedState {
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            LedState::Dim => LedState::Glowing,
            LedState::Glowing => LedState::Dim,
        }
    }
}

/// Display parameters pushed to the renderer for one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorLook {
    pub color: Color,
    /// Multiplier on the bulb's emissive colour.
    pub emissive_intensity: f32,
    /// Point-light intensity in lumens.
    pub light_intensity: f32,
}

/// Look for each [`LedState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorLooks {
    pub dim: IndicatorLook,
    pub glowing: IndicatorLook,
}

impl IndicatorLooks {
    #[inline]
    pub fn look(&self, state: LedState) -> &IndicatorLook {
        match state {
            LedState::Dim => &self.dim,
            LedState::Glowing => &self.glowing,
        }
    }
}

/// Visual side of the indicator.  Called once per state transition.
pub trait IndicatorRenderer {
    fn set_indicator(&mut self, look: &IndicatorLook);
}
