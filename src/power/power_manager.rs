use crate::core::domain::{error::VirtualPowerResult, model::power_state::PowerState};
use async_trait::async_trait;

/// Power control as seen by the instance lifecycle layer.
///
/// Transitions never fail with an error: anything that goes wrong is
/// reported as [`PowerState::Error`] and logged where it happened.
#[async_trait]
pub trait PowerManager: Send {
    /// Powers the machine on.
    ///
    /// Returns [`PowerState::Active`] once the machine is confirmed running.
    async fn activate_node(&mut self) -> PowerState;

    /// Powers the machine off.
    ///
    /// Returns [`PowerState::Deleted`] once the machine is confirmed stopped.
    async fn deactivate_node(&mut self) -> PowerState;

    /// Hard-resets the machine.
    ///
    /// Returns [`PowerState::Active`] if the machine is running afterwards.
    async fn reboot_node(&mut self) -> PowerState;

    /// Checks whether the machine is currently running.
    async fn is_power_on(&mut self) -> bool;

    /// Result of the last transition, if any ran.
    fn state(&self) -> Option<PowerState>;

    async fn start_console(&mut self) -> VirtualPowerResult<()> {
        Ok(())
    }

    async fn stop_console(&mut self) -> VirtualPowerResult<()> {
        Ok(())
    }
}
