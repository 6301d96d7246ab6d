// Kiosk runtime: the single task that owns the controller.
//
// Inputs arrive on an mpsc channel, remote calls run as spawned tasks whose
// results come back on a second channel, and the controller's earliest timer
// deadline is awaited with `sleep_until`. The latest state is published on a
// watch channel for the rendering side.

use crate::domain::{InputMode, KioskBackend};
use crate::use_cases::KioskController;
use crate::use_cases::state::KioskState;
use crate::use_cases::timers::KioskTimings;
use crate::use_cases::types::{Command, Completion, KioskInput};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Configuration for spawning the kiosk task.
#[derive(Debug, Clone)]
pub struct KioskSettings {
    /// Capacity for inbound input events.
    pub input_channel_capacity: usize,
    /// Capacity for remote-call completions.
    pub completion_channel_capacity: usize,
    /// Input mode shown at boot and restored after each flow.
    pub default_mode: InputMode,
    /// Session check-ins fall back to when none is selected.
    pub terminal_session_id: Option<u64>,
    pub timings: KioskTimings,
    /// PIN that unlocks the exit gate.
    pub exit_pin: String,
}

/// Channels the adapters use to talk to the kiosk task.
#[derive(Clone)]
pub struct KioskHandle {
    pub input_tx: mpsc::Sender<KioskInput>,
    pub state_rx: watch::Receiver<KioskState>,
}

/// Spawns the kiosk task and returns its channels.
pub fn spawn_kiosk(settings: KioskSettings, backend: Arc<dyn KioskBackend>) -> KioskHandle {
    let controller = KioskController::new(
        settings.default_mode,
        settings.terminal_session_id,
        settings.timings,
    )
    .with_exit_pin(settings.exit_pin);
    let (input_tx, input_rx) = mpsc::channel::<KioskInput>(settings.input_channel_capacity);
    let (state_tx, state_rx) = watch::channel(controller.state().clone());

    tokio::spawn(kiosk_task(
        controller,
        backend,
        input_rx,
        state_tx,
        settings.completion_channel_capacity,
    ));

    KioskHandle { input_tx, state_rx }
}

pub async fn kiosk_task(
    mut controller: KioskController,
    backend: Arc<dyn KioskBackend>,
    mut input_rx: mpsc::Receiver<KioskInput>,
    state_tx: watch::Sender<KioskState>,
    completion_channel_capacity: usize,
) {
    let (done_tx, mut done_rx) = mpsc::channel::<Completion>(completion_channel_capacity);
    info!(
        mode = %controller.state().active_input_mode,
        session_id = ?controller.state().terminal_session_id,
        "kiosk ready"
    );

    loop {
        let deadline = controller.next_deadline();

        let commands = tokio::select! {
            input = input_rx.recv() => match input {
                Some(input) => controller.handle_input(input, now()),
                None => {
                    info!("input channel closed; kiosk task exiting");
                    break;
                }
            },
            Some(done) = done_rx.recv() => controller.handle_completion(done, now()),
            _ = sleep_until(deadline) => controller.fire_due(now()),
        };

        for command in commands {
            spawn_command(command, backend.clone(), done_tx.clone());
        }

        let latest = controller.state();
        state_tx.send_if_modified(|published| {
            if published == latest {
                return false;
            }
            *published = latest.clone();
            true
        });
    }
}

fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

fn spawn_command(
    command: Command,
    backend: Arc<dyn KioskBackend>,
    done_tx: mpsc::Sender<Completion>,
) {
    debug!(?command, "starting remote call");
    tokio::spawn(async move {
        let completion = execute(command, backend.as_ref()).await;
        if done_tx.send(completion).await.is_err() {
            warn!("kiosk task gone; dropping remote call result");
        }
    });
}

/// Performs one remote call and wraps its result for the controller.
pub async fn execute(command: Command, backend: &dyn KioskBackend) -> Completion {
    match command {
        Command::Lookup { mode, value } => {
            let result = backend.lookup(mode, &value).await;
            Completion::Lookup {
                mode,
                value,
                result,
            }
        }
        Command::Search { query, session_id } => {
            let result = backend.search(&query, session_id).await;
            Completion::Search { query, result }
        }
        Command::FetchMemberInfo { partner_id } => Completion::MemberInfo {
            partner_id,
            result: backend.member_info(partner_id).await,
        },
        Command::Checkin {
            partner_id,
            session_id,
        } => Completion::Checkin {
            partner_id,
            result: backend.checkin(partner_id, session_id).await,
        },
        Command::InstructorAuth { attempt, pin } => Completion::InstructorAuth {
            attempt,
            result: backend.instructor_auth(&pin).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CheckinStatus, MemberInfo};
    use crate::use_cases::state::{Navigation, Screen};
    use crate::use_cases::test_support::{
        FailureFlags, RecordingBackend, member, ms, outcome, session,
    };
    use crate::use_cases::types::{Key, PinKey};

    fn settings(mode: InputMode) -> KioskSettings {
        KioskSettings {
            input_channel_capacity: 64,
            completion_channel_capacity: 16,
            default_mode: mode,
            terminal_session_id: Some(5),
            timings: KioskTimings::default(),
            exit_pin: "1234".to_string(),
        }
    }

    async fn wait_until(
        state_rx: &mut watch::Receiver<KioskState>,
        predicate: impl FnMut(&KioskState) -> bool,
    ) {
        state_rx
            .wait_for(predicate)
            .await
            .map(|_| ())
            .expect("kiosk task should still be publishing");
    }

    async fn send(handle: &KioskHandle, input: KioskInput) {
        handle
            .input_tx
            .send(input)
            .await
            .expect("kiosk task should accept input");
    }

    #[tokio::test(start_paused = true)]
    async fn when_barcode_member_checks_in_then_full_flow_returns_to_idle() {
        let backend = RecordingBackend::new()
            .with_member("A1234", member(9))
            .with_member_info(MemberInfo {
                sessions: vec![session(31)],
                history: Vec::new(),
            })
            .with_checkin_outcome(outcome(CheckinStatus::Ok));
        let handle = spawn_kiosk(settings(InputMode::Barcode), Arc::new(backend.clone()));
        let mut state_rx = handle.state_rx.clone();

        for c in "A1234".chars() {
            send(&handle, KioskInput::Key(Key::Char(c))).await;
        }
        send(&handle, KioskInput::Key(Key::Enter)).await;
        wait_until(&mut state_rx, |s| s.selected_class_session_id == Some(31)).await;

        send(&handle, KioskInput::ConfirmCheckin).await;
        wait_until(&mut state_rx, |s| matches!(s.screen, Screen::Confirmation(_))).await;

        tokio::time::sleep(ms(5_100)).await;
        wait_until(&mut state_rx, |s| {
            s.screen == Screen::Input && s.current_candidate_member.is_none()
        })
        .await;

        assert_eq!(
            backend.calls(),
            vec![
                Command::Lookup {
                    mode: InputMode::Barcode,
                    value: "A1234".to_string(),
                },
                Command::FetchMemberInfo { partner_id: 9 },
                Command::Checkin {
                    partner_id: 9,
                    session_id: Some(31),
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn when_pin_is_unknown_then_error_shows_and_pin_resets() {
        let backend = RecordingBackend::new();
        let handle = spawn_kiosk(settings(InputMode::Pin), Arc::new(backend.clone()));
        let mut state_rx = handle.state_rx.clone();

        for d in [4, 8, 2, 1] {
            send(&handle, KioskInput::PinKey(PinKey::Digit(d))).await;
        }
        wait_until(&mut state_rx, |s| s.pin_error).await;
        assert_eq!(state_rx.borrow().pending_pin_digits, "4821");

        tokio::time::sleep(ms(2_100)).await;
        wait_until(&mut state_rx, |s| !s.pin_error && s.pending_pin_digits.is_empty()).await;

        assert_eq!(
            backend.calls(),
            vec![Command::Lookup {
                mode: InputMode::Pin,
                value: "4821".to_string(),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn when_checkin_transport_fails_then_error_confirmation_is_shown() {
        let backend = RecordingBackend::new()
            .with_member("CARD", member(9))
            .with_member_info(MemberInfo {
                sessions: vec![session(31)],
                history: Vec::new(),
            })
            .with_failures(FailureFlags {
                checkin: true,
                ..FailureFlags::default()
            });
        let handle = spawn_kiosk(settings(InputMode::Barcode), Arc::new(backend));
        let mut state_rx = handle.state_rx.clone();

        for c in "CARD".chars() {
            send(&handle, KioskInput::Key(Key::Char(c))).await;
        }
        send(&handle, KioskInput::Key(Key::Enter)).await;
        wait_until(&mut state_rx, |s| s.checkin_enabled()).await;
        send(&handle, KioskInput::ConfirmCheckin).await;

        wait_until(&mut state_rx, |s| match &s.screen {
            Screen::Confirmation(outcome) => outcome.status == CheckinStatus::Error,
            _ => false,
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn when_instructor_pin_matches_then_navigation_is_published() {
        let backend = RecordingBackend::new().with_instructor_pin("2468");
        let handle = spawn_kiosk(settings(InputMode::Barcode), Arc::new(backend));
        let mut state_rx = handle.state_rx.clone();

        send(&handle, KioskInput::OpenInstructorGate).await;
        for d in [2, 4, 6, 8] {
            send(&handle, KioskInput::GateKey(PinKey::Digit(d))).await;
        }

        wait_until(&mut state_rx, |s| {
            s.navigation == Some(Navigation::InstructorSurface)
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn when_exit_pin_is_entered_then_backend_navigation_is_published() {
        let backend = RecordingBackend::new();
        let handle = spawn_kiosk(
            KioskSettings {
                exit_pin: "7007".to_string(),
                ..settings(InputMode::Barcode)
            },
            Arc::new(backend.clone()),
        );
        let mut state_rx = handle.state_rx.clone();

        send(&handle, KioskInput::OpenExitGate).await;
        for d in [7, 0, 0, 7] {
            send(&handle, KioskInput::GateKey(PinKey::Digit(d))).await;
        }

        wait_until(&mut state_rx, |s| s.navigation == Some(Navigation::Backend)).await;
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn when_input_channel_closes_then_task_exits() {
        let controller =
            KioskController::new(InputMode::Barcode, None, KioskTimings::default());
        let (input_tx, input_rx) = mpsc::channel(4);
        let (state_tx, _state_rx) = watch::channel(controller.state().clone());
        let task = tokio::spawn(kiosk_task(
            controller,
            Arc::new(RecordingBackend::new()),
            input_rx,
            state_tx,
            4,
        ));

        drop(input_tx);

        task.await.expect("kiosk task should exit cleanly");
    }
}
