use crate::use_cases::{KioskHandle, KioskInput, KioskState};
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Inputs flowing from the front end into the kiosk task.
    pub input_tx: mpsc::Sender<KioskInput>,
    // Latest controller state published by the kiosk task.
    pub state_rx: watch::Receiver<KioskState>,
}

impl From<KioskHandle> for AppState {
    fn from(handle: KioskHandle) -> Self {
        Self {
            input_tx: handle.input_tx,
            state_rx: handle.state_rx,
        }
    }
}
