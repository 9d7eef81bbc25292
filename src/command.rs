//! Operator command submission.
//!
//! A submission snapshots the [`ControlAuthority`], normalises it into a
//! [`ControlCommand`], posts it once, and reports the outcome through the
//! [`MessageBoard`]. Confirmations clear themselves after a delay; errors stay
//! until the next outcome replaces them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use crate::authority::{ControlAuthority, ControlMode};
use crate::debug_flags::{self, DEBUG_SUBMIT};
use crate::error::SubmitError;
use crate::http_client::DeviceApi;
use crate::render::Renderer;

const ERROR_TEXT: &str = "✗ Error applying changes";

// ── Payload ─────────────────────────────────────────────────────────

/// Body of `POST /api/control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlCommand {
    pub pump: u8,
    pub light: u8,
    pub mode: ControlMode,
    pub duration_pump: u32,
    pub duration_light: u32,
}

impl From<&ControlAuthority> for ControlCommand {
    fn from(authority: &ControlAuthority) -> Self {
        let overrides = authority.overrides();
        let (duration_pump, duration_light) = authority.effective_durations();
        Self {
            pump: overrides.pump_requested as u8,
            light: overrides.light_requested as u8,
            mode: authority.mode(),
            duration_pump,
            duration_light,
        }
    }
}

impl ControlCommand {
    /// Human-readable summary shown after a successful submission.
    pub fn summary(&self) -> String {
        format!(
            "✓ Applied: {} mode, Pump {}, Light {}",
            self.mode,
            on_off(self.pump),
            on_off(self.light)
        )
    }
}

fn on_off(v: u8) -> &'static str {
    if v != 0 {
        "ON"
    } else {
        "OFF"
    }
}

/// Acknowledgement of a delivered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub command: ControlCommand,
}

// ── Status messages ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Confirmation(String),
    Error(String),
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Confirmation(s) | StatusMessage::Error(s) => s,
        }
    }
}

/// The single message slot shown to the operator.
///
/// Each post bumps a generation counter; a clear request only succeeds for the
/// generation it was issued against, so an old timer can never erase a newer
/// message.
pub struct MessageBoard<R> {
    renderer: Rc<R>,
    current: RefCell<Option<StatusMessage>>,
    generation: Cell<u64>,
}

impl<R: Renderer> MessageBoard<R> {
    pub fn new(renderer: Rc<R>) -> Self {
        Self {
            renderer,
            current: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn current(&self) -> Option<StatusMessage> {
        self.current.borrow().clone()
    }

    pub fn post(&self, message: StatusMessage) -> u64 {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        self.renderer.show_status_message(Some(&message));
        *self.current.borrow_mut() = Some(message);
        generation
    }

    /// Returns whether the message was cleared.
    pub fn clear_if_current(&self, generation: u64) -> bool {
        if self.generation.get() != generation || self.current.borrow().is_none() {
            return false;
        }
        *self.current.borrow_mut() = None;
        self.renderer.show_status_message(None);
        true
    }
}

// ── Submitter ───────────────────────────────────────────────────────

pub struct CommandSubmitter<A, R> {
    api: Rc<A>,
    board: Rc<MessageBoard<R>>,
    clear_after: Duration,
}

impl<A, R> CommandSubmitter<A, R>
where
    A: DeviceApi,
    R: Renderer + 'static,
{
    pub fn new(api: Rc<A>, renderer: Rc<R>, clear_after: Duration) -> Self {
        Self {
            api,
            board: Rc::new(MessageBoard::new(renderer)),
            clear_after,
        }
    }

    pub fn board(&self) -> &MessageBoard<R> {
        &self.board
    }

    /// Single attempt, no retry. Must run inside a `LocalSet`: a successful
    /// submission spawns the confirmation's clear timer as a local task.
    pub async fn submit(&self, authority: ControlAuthority) -> Result<Ack, SubmitError> {
        let command = ControlCommand::from(&authority);
        if debug_flags::is_on(&DEBUG_SUBMIT) {
            info!("Submitting {:?}", command);
        } else {
            debug!("Submitting {:?}", command);
        }

        match self.api.send_control(&command).await {
            Ok(()) => {
                info!("Command applied: {} mode", command.mode);
                let generation = self.board.post(StatusMessage::Confirmation(command.summary()));
                self.schedule_clear(generation);
                Ok(Ack { command })
            }
            Err(e) => {
                let err = SubmitError::from(e);
                warn!("Command failed: {}", err);
                self.board.post(StatusMessage::Error(ERROR_TEXT.to_string()));
                Err(err)
            }
        }
    }

    fn schedule_clear(&self, generation: u64) {
        let board = Rc::clone(&self.board);
        let delay = self.clear_after;
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            board.clear_if_current(generation);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testing::{FakeApi, RecordingRenderer, RenderEvent};
    use tokio::task::LocalSet;

    const CLEAR: Duration = Duration::from_millis(3000);

    fn manual(pump: bool, light: bool, pump_min: u32, light_min: u32) -> ControlAuthority {
        let mut authority = ControlAuthority::new(ControlMode::Manual);
        let o = authority.overrides_mut();
        o.pump_requested = pump;
        o.light_requested = light;
        o.pump_duration_minutes = pump_min;
        o.light_duration_minutes = light_min;
        authority
    }

    #[test]
    fn auto_mode_zeroes_durations() {
        let mut authority = manual(true, true, 25, 40);
        authority.set_mode(ControlMode::Auto);
        let cmd = ControlCommand::from(&authority);
        assert_eq!(cmd.mode, ControlMode::Auto);
        assert_eq!((cmd.duration_pump, cmd.duration_light), (0, 0));
        assert_eq!((cmd.pump, cmd.light), (1, 1));
    }

    #[test]
    fn manual_mode_keeps_exact_duration() {
        let cmd = ControlCommand::from(&manual(true, false, 15, 0));
        assert_eq!(cmd.duration_pump, 15);
        assert_eq!(cmd.mode, ControlMode::Manual);
    }

    #[test]
    fn payload_wire_shape() {
        let cmd = ControlCommand::from(&manual(true, false, 5, 0));
        let json = serde_json::to_value(cmd).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pump": 1, "light": 0, "mode": "manual",
                "durationPump": 5, "durationLight": 0
            })
        );
    }

    #[test]
    fn summary_names_mode_and_targets() {
        let cmd = ControlCommand::from(&manual(true, false, 5, 0));
        assert_eq!(cmd.summary(), "✓ Applied: MANUAL mode, Pump ON, Light OFF");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_shows_persistent_error() {
        LocalSet::new()
            .run_until(async {
                let api = Rc::new(FakeApi::new());
                api.push_control(Err(TransportError::Status(500)));
                let renderer = Rc::new(RecordingRenderer::default());
                let submitter = CommandSubmitter::new(api.clone(), renderer.clone(), CLEAR);

                let result = submitter.submit(manual(true, false, 5, 0)).await;
                assert!(matches!(result, Err(SubmitError::Rejected { status: 500 })));

                tokio::time::sleep(CLEAR * 3).await;
                let shown = submitter.board().current().unwrap();
                assert!(matches!(shown, StatusMessage::Error(_)));
                assert_eq!(shown.text(), ERROR_TEXT);
                assert!(!renderer.events().contains(&RenderEvent::Message(None)));

                let sent = api.sent_commands();
                assert_eq!(sent.len(), 1);
                assert_eq!(sent[0].duration_pump, 5);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_clears_after_delay() {
        LocalSet::new()
            .run_until(async {
                let api = Rc::new(FakeApi::new());
                let renderer = Rc::new(RecordingRenderer::default());
                let submitter = CommandSubmitter::new(api, renderer.clone(), CLEAR);

                let ack = submitter.submit(manual(false, true, 0, 10)).await.unwrap();
                assert_eq!(ack.command.light, 1);
                assert!(matches!(
                    submitter.board().current(),
                    Some(StatusMessage::Confirmation(_))
                ));

                tokio::time::sleep(CLEAR - Duration::from_millis(1)).await;
                assert!(submitter.board().current().is_some());

                tokio::time::sleep(Duration::from_millis(2)).await;
                tokio::task::yield_now().await;
                assert!(submitter.board().current().is_none());
                assert_eq!(renderer.events().last(), Some(&RenderEvent::Message(None)));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_clear_newer_message() {
        LocalSet::new()
            .run_until(async {
                let api = Rc::new(FakeApi::new());
                let renderer = Rc::new(RecordingRenderer::default());
                let submitter = CommandSubmitter::new(api.clone(), renderer, CLEAR);

                submitter.submit(manual(true, false, 1, 0)).await.unwrap();
                tokio::time::sleep(Duration::from_millis(2000)).await;

                // Second outcome is an error; the first timer fires at 3000 ms.
                api.push_control(Err(TransportError::Unavailable("link down".into())));
                let err = submitter.submit(manual(true, false, 1, 0)).await.unwrap_err();
                assert!(matches!(err, SubmitError::Network(_)));

                tokio::time::sleep(Duration::from_millis(5000)).await;
                tokio::task::yield_now().await;
                assert!(matches!(
                    submitter.board().current(),
                    Some(StatusMessage::Error(_))
                ));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_confirmations_each_get_full_delay() {
        LocalSet::new()
            .run_until(async {
                let api = Rc::new(FakeApi::new());
                let renderer = Rc::new(RecordingRenderer::default());
                let submitter = CommandSubmitter::new(api, renderer, CLEAR);

                submitter.submit(manual(true, false, 1, 0)).await.unwrap();
                tokio::time::sleep(Duration::from_millis(2500)).await;
                submitter.submit(manual(false, false, 0, 0)).await.unwrap();

                // First timer fires at 3000 ms but must leave the second message.
                tokio::time::sleep(Duration::from_millis(1000)).await;
                tokio::task::yield_now().await;
                assert_eq!(
                    submitter.board().current().unwrap().text(),
                    "✓ Applied: MANUAL mode, Pump OFF, Light OFF"
                );

                tokio::time::sleep(Duration::from_millis(2100)).await;
                tokio::task::yield_now().await;
                assert!(submitter.board().current().is_none());
            })
            .await;
    }

    #[test]
    fn board_ignores_unknown_generation() {
        let board = MessageBoard::new(Rc::new(RecordingRenderer::default()));
        let first = board.post(StatusMessage::Confirmation("a".into()));
        let second = board.post(StatusMessage::Error("b".into()));
        assert!(!board.clear_if_current(first));
        assert!(board.clear_if_current(second));
        assert!(!board.clear_if_current(second));
    }
}
