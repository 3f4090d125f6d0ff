//! Jump input capture
//!
//! Press/release events from any device are folded into two primitives:
//! - `held`: level-triggered, true while any device is down
//! - `queued`: edge-triggered, set by a fresh press and cleared only by the
//!   tick that consumes it
//!
//! Keeping them separate is what stops one press from being spent twice.

use serde::{Deserialize, Serialize};

/// Input devices that can drive the jump button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputDevice {
    Keyboard,
    Pointer,
    Touch,
}

impl InputDevice {
    fn bit(self) -> u8 {
        match self {
            InputDevice::Keyboard => 0b001,
            InputDevice::Pointer => 0b010,
            InputDevice::Touch => 0b100,
        }
    }
}

/// Debounces jump presses from every device into `held` / `queued`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputEdgeTracker {
    /// Bitmask of devices currently down
    down: u8,
    queued: bool,
}

impl InputEdgeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device went down. Auto-repeat from a device that is already down is
    /// ignored.
    pub fn press(&mut self, device: InputDevice) {
        if self.down & device.bit() != 0 {
            return;
        }
        self.down |= device.bit();
        self.queued = true;
    }

    /// A device came up. `held` stays true while another device is down.
    pub fn release(&mut self, device: InputDevice) {
        self.down &= !device.bit();
    }

    #[inline]
    pub fn held(&self) -> bool {
        self.down != 0
    }

    #[inline]
    pub fn queued(&self) -> bool {
        self.queued
    }

    /// Take the queued edge. Returns true at most once per press.
    pub fn consume(&mut self) -> bool {
        std::mem::take(&mut self.queued)
    }

    /// Build the input for one tick
    pub fn sample(&self, dt: f32, max_delta: f32) -> TickInput {
        TickInput::new(dt, max_delta, self.held(), self.queued)
    }

    /// Write back what the tick did with the queued edge
    pub fn settle(&mut self, input: &TickInput) {
        if self.queued && !input.jump_queued {
            self.queued = false;
        }
    }

    /// Forget everything (new attempt)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Elapsed logical ticks (1.0 = 1/60 s), already clamped
    pub dt: f32,
    /// Jump button is down
    pub jump_held: bool,
    /// A fresh press waiting to be consumed; the tick clears it when used
    pub jump_queued: bool,
}

impl TickInput {
    /// Clamp `dt` into `[0, max_delta]` so slow frames cannot tunnel
    pub fn new(dt: f32, max_delta: f32, jump_held: bool, jump_queued: bool) -> Self {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, max_delta)
        } else {
            0.0
        };
        Self {
            dt,
            jump_held,
            jump_queued,
        }
    }

    /// Idle input for `dt` ticks
    pub fn idle(dt: f32) -> Self {
        Self {
            dt,
            ..Default::default()
        }
    }

    /// A fresh press this tick
    pub fn press(dt: f32) -> Self {
        Self {
            dt,
            jump_held: true,
            jump_queued: true,
        }
    }

    /// Consume the queued edge; true if there was one
    pub fn take_queued(&mut self) -> bool {
        std::mem::take(&mut self.jump_queued)
    }
}
