//! # Hardware collaborator interfaces.
//!
//! The controller never touches pins, buses, or cameras directly; it talks
//! to these narrow traits, injected at construction. That keeps ambient
//! global hardware state out of the runtime and lets tests substitute
//! simulated collaborators (see [`sim`]).
//!
//! The traits mirror the vehicle's physical peripherals: motor driver,
//! infrared line tracker, buzzer, battery ADC, camera.

pub mod sim;

use async_trait::async_trait;

use crate::error::WorkerError;

/// Motor driver: four signed PWM magnitudes, one per wheel.
pub trait Actuator: Send + Sync + 'static {
    /// Applies drive values to the four motors.
    fn set_drive(&self, left_front: i16, left_rear: i16, right_front: i16, right_rear: i16);

    /// Drives every motor to the all-zero (stopped) state.
    ///
    /// Called on every shutdown path before the process goes away.
    fn halt(&self) {
        self.set_drive(0, 0, 0, 0);
    }
}

/// Infrared line tracker: one blocking/polling read of a 3-bit mask
/// (left, middle, right). Pure input; never supervised by the controller.
pub trait LineSensor: Send + Sync + 'static {
    /// Reads the current mask; only the low three bits are meaningful.
    fn read_mask(&self) -> u8;
}

/// One-shot audible/visual "ready" indication (the vehicle's buzzer).
///
/// Fired on a detached task after start, so a slow or broken indicator can
/// never delay worker startup.
#[async_trait]
pub trait ReadySignal: Send + Sync + 'static {
    /// Announces that the service is up.
    async fn announce(&self);
}

/// Battery monitor sampled by the telemetry worker.
pub trait PowerMonitor: Send + Sync + 'static {
    /// Current battery voltage in volts.
    fn read_voltage(&self) -> f32;
}

/// Frame source for the media worker.
#[async_trait]
pub trait Camera: Send + Sync + 'static {
    /// Captures one encoded frame.
    async fn capture(&self) -> Result<Vec<u8>, WorkerError>;
}
