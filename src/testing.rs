//! Test doubles shared by the module tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::authority::ControlMode;
use crate::command::{ControlCommand, StatusMessage};
use crate::error::TransportError;
use crate::history::SeriesSnapshot;
use crate::http_client::DeviceApi;
use crate::render::Renderer;
use crate::telemetry::DeviceStatus;

pub(crate) const STATUS_BODY: &str = r#"{"airTemp":21.5,"airHum":48,"forecast3Temp":20,
    "forecast3Hum":52,"pumpOn":0,"light":1,"mode":0,"soil":[30,31,32]}"#;

pub(crate) fn status_body(air_temp: f32) -> String {
    format!(
        r#"{{"airTemp":{},"airHum":48,"forecast3Temp":20,"forecast3Hum":52,
            "pumpOn":1,"mode":2,"soil":[30,31,32]}}"#,
        air_temp
    )
}

/// Scripted device. Empty queues answer with a healthy status / accepted command.
#[derive(Default)]
pub(crate) struct FakeApi {
    statuses: RefCell<VecDeque<Result<String, TransportError>>>,
    controls: RefCell<VecDeque<Result<(), TransportError>>>,
    sent: RefCell<Vec<ControlCommand>>,
    fetches: RefCell<usize>,
    latency: Option<Duration>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub(crate) fn push_status(&self, result: Result<String, TransportError>) {
        self.statuses.borrow_mut().push_back(result);
    }

    pub(crate) fn push_control(&self, result: Result<(), TransportError>) {
        self.controls.borrow_mut().push_back(result);
    }

    pub(crate) fn sent_commands(&self) -> Vec<ControlCommand> {
        self.sent.borrow().clone()
    }

    pub(crate) fn fetch_count(&self) -> usize {
        *self.fetches.borrow()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl DeviceApi for FakeApi {
    async fn fetch_status(&self) -> Result<String, TransportError> {
        *self.fetches.borrow_mut() += 1;
        self.delay().await;
        self.statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(STATUS_BODY.to_string()))
    }

    async fn send_control(&self, command: &ControlCommand) -> Result<(), TransportError> {
        self.sent.borrow_mut().push(*command);
        self.delay().await;
        self.controls.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RenderEvent {
    Charts(SeriesSnapshot),
    Cards(DeviceStatus),
    Authority(ControlMode),
    Message(Option<StatusMessage>),
}

#[derive(Default)]
pub(crate) struct RecordingRenderer {
    events: RefCell<Vec<RenderEvent>>,
    not_ready: bool,
}

impl RecordingRenderer {
    pub(crate) fn not_ready() -> Self {
        Self {
            not_ready: true,
            ..Self::default()
        }
    }

    pub(crate) fn events(&self) -> Vec<RenderEvent> {
        self.events.borrow().clone()
    }

    pub(crate) fn chart_refreshes(&self) -> Vec<SeriesSnapshot> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Charts(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn ready(&self) -> bool {
        !self.not_ready
    }

    fn refresh_charts(&self, snapshot: &SeriesSnapshot) {
        self.events.borrow_mut().push(RenderEvent::Charts(snapshot.clone()));
    }

    fn refresh_status_cards(&self, status: &DeviceStatus) {
        self.events.borrow_mut().push(RenderEvent::Cards(status.clone()));
    }

    fn reflect_authority(&self, mode: ControlMode) {
        self.events.borrow_mut().push(RenderEvent::Authority(mode));
    }

    fn show_status_message(&self, message: Option<&StatusMessage>) {
        self.events
            .borrow_mut()
            .push(RenderEvent::Message(message.cloned()));
    }
}
