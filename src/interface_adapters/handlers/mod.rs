// HTTP handlers split by plain request/response routes vs the live socket.

pub mod input;
pub mod socket;

pub use input::{get_view, post_input};
pub use socket::ws_handler;

/// Local wall-clock time shown in the kiosk header.
pub fn local_clock() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}
