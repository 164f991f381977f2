//! Simulated hardware collaborators.
//!
//! Used by tests and by the default binary when no real peripherals are
//! attached. [`SimActuator`] records the last drive it was given so tests
//! can assert the all-stop guarantee.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::WorkerError;
use crate::hal::{Actuator, Camera, LineSensor, PowerMonitor, ReadySignal};

/// Records drive commands instead of toggling pins.
#[derive(Default)]
pub struct SimActuator {
    last: Mutex<(i16, i16, i16, i16)>,
}

impl SimActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last drive applied, in (lf, lr, rf, rr) order.
    pub fn last_drive(&self) -> (i16, i16, i16, i16) {
        self.last.lock().map(|g| *g).unwrap_or((0, 0, 0, 0))
    }
}

impl Actuator for SimActuator {
    fn set_drive(&self, lf: i16, lr: i16, rf: i16, rr: i16) {
        if let Ok(mut g) = self.last.lock() {
            *g = (lf, lr, rf, rr);
        }
    }
}

/// Returns a fixed 3-bit mask.
pub struct FixedLineSensor {
    mask: AtomicU8,
}

impl FixedLineSensor {
    pub fn new(mask: u8) -> Self {
        Self {
            mask: AtomicU8::new(mask & 0b111),
        }
    }

    pub fn set_mask(&self, mask: u8) {
        self.mask.store(mask & 0b111, Ordering::Relaxed);
    }
}

impl LineSensor for FixedLineSensor {
    fn read_mask(&self) -> u8 {
        self.mask.load(Ordering::Relaxed)
    }
}

/// Prints the ready notice after the buzzer's characteristic pause.
pub struct ConsoleChime;

#[async_trait]
impl ReadySignal for ConsoleChime {
    async fn announce(&self) {
        tokio::time::sleep(Duration::from_millis(500)).await;
        println!("roverd ready");
    }
}

/// Reports a healthy two-cell battery.
pub struct SimPowerMonitor;

impl PowerMonitor for SimPowerMonitor {
    fn read_voltage(&self) -> f32 {
        7.4
    }
}

/// Produces a small test-pattern frame at roughly 10 fps.
pub struct TestPatternCamera;

#[async_trait]
impl Camera for TestPatternCamera {
    async fn capture(&self) -> Result<Vec<u8>, WorkerError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(vec![0x55; 256])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actuator_halt_zeroes_every_wheel() {
        let m = SimActuator::new();
        m.set_drive(1000, 1000, -1100, -1100);
        assert_eq!(m.last_drive(), (1000, 1000, -1100, -1100));
        m.halt();
        assert_eq!(m.last_drive(), (0, 0, 0, 0));
    }

    #[test]
    fn line_sensor_mask_is_three_bits() {
        let s = FixedLineSensor::new(0xFF);
        assert_eq!(s.read_mask(), 0b111);
        s.set_mask(0b010);
        assert_eq!(s.read_mask(), 0b010);
    }
}
