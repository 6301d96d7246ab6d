// Use cases layer: the kiosk check-in workflow and the task that drives it.

mod checkin;
mod controller;
mod gate;
mod identify;
mod input;
pub mod kiosk;
mod overlay;
pub mod state;
pub mod timers;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::KioskController;
pub use kiosk::{KioskHandle, KioskSettings, spawn_kiosk};
pub use state::{KioskState, Navigation, Screen};
pub use timers::KioskTimings;
pub use types::{Command, Completion, Key, KioskInput, PinKey};
