//! Operator console: one command per input line.

use core::str::FromStr;
use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use tokio::task::JoinHandle;

use crate::authority::{parse_duration_field, ControlAuthority, ControlMode};
use crate::command::{Ack, CommandSubmitter};
use crate::debug_flags;
use crate::error::{InputError, SubmitError};
use crate::http_client::DeviceApi;
use crate::poller::TelemetryPoller;
use crate::render::Renderer;

pub const HELP: &str = "\
commands:
  mode auto|manual   switch control authority
  pump on|off        requested pump state
  light on|off       requested light state
  pump-min <n>       manual pump duration (minutes)
  light-min <n>      manual light duration (minutes)
  apply              send the current settings to the device
  status             redraw the latest status and charts
  history            show history fill level
  debug [flag]       show or toggle debug flags (poll, http, submit)
  help               this text
  quit               exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    Mode(ControlMode),
    Pump(bool),
    Light(bool),
    PumpMinutes(u32),
    LightMinutes(u32),
    Apply,
    Status,
    History,
    Debug(Option<String>),
    Help,
    Quit,
}

fn on_off_arg(command: &'static str, arg: Option<&str>) -> Result<bool, InputError> {
    match arg {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(InputError::BadArgument {
            command,
            expected: "on or off",
        }),
    }
}

fn minutes_arg(command: &'static str, arg: Option<&str>) -> Result<u32, InputError> {
    arg.map(parse_duration_field).ok_or(InputError::BadArgument {
        command,
        expected: "a number of minutes",
    })
}

impl FromStr for OperatorInput {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().to_ascii_lowercase();
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let arg = words.next();

        match command {
            "mode" => arg
                .and_then(|a| a.parse().ok())
                .map(OperatorInput::Mode)
                .ok_or(InputError::BadArgument {
                    command: "mode",
                    expected: "auto or manual",
                }),
            "pump" => on_off_arg("pump", arg).map(OperatorInput::Pump),
            "light" => on_off_arg("light", arg).map(OperatorInput::Light),
            "pump-min" => minutes_arg("pump-min", arg).map(OperatorInput::PumpMinutes),
            "light-min" => minutes_arg("light-min", arg).map(OperatorInput::LightMinutes),
            "apply" => Ok(OperatorInput::Apply),
            "status" => Ok(OperatorInput::Status),
            "history" => Ok(OperatorInput::History),
            "debug" => Ok(OperatorInput::Debug(arg.map(str::to_string))),
            "help" | "?" => Ok(OperatorInput::Help),
            "quit" | "exit" => Ok(OperatorInput::Quit),
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Silent,
    Text(String),
    Quit,
}

/// Owns the control authority and routes operator input to it, the submitter
/// and the poller. Polls never touch the authority; submissions never touch
/// the history.
pub struct ControlPanel<A, R, const N: usize> {
    authority: RefCell<ControlAuthority>,
    renderer: Rc<R>,
    submitter: Rc<CommandSubmitter<A, R>>,
    poller: Rc<TelemetryPoller<A, R, N>>,
}

impl<A, R, const N: usize> ControlPanel<A, R, N>
where
    A: DeviceApi + 'static,
    R: Renderer + 'static,
{
    pub fn new(
        renderer: Rc<R>,
        submitter: Rc<CommandSubmitter<A, R>>,
        poller: Rc<TelemetryPoller<A, R, N>>,
    ) -> Self {
        Self {
            authority: RefCell::new(ControlAuthority::default()),
            renderer,
            submitter,
            poller,
        }
    }

    /// Show the initial authority state.
    pub fn init(&self) {
        self.renderer.reflect_authority(self.mode());
    }

    pub fn mode(&self) -> ControlMode {
        self.authority.borrow().mode()
    }

    pub fn authority(&self) -> ControlAuthority {
        *self.authority.borrow()
    }

    /// Always notifies the renderer, even when the mode does not change.
    pub fn set_mode(&self, mode: ControlMode) {
        let now = self.authority.borrow_mut().set_mode(mode);
        info!("Control mode {}", now);
        self.renderer.reflect_authority(now);
    }

    /// Submit a copy of the current authority as a local task. Input and
    /// polling carry on while it is in flight.
    pub fn apply(&self) -> JoinHandle<Result<Ack, SubmitError>> {
        let authority = self.authority();
        let submitter = Rc::clone(&self.submitter);
        tokio::task::spawn_local(async move { submitter.submit(authority).await })
    }

    pub fn handle_line(&self, line: &str) -> Result<Reply, InputError> {
        let input: OperatorInput = line.parse()?;
        Ok(self.handle(input))
    }

    pub fn handle(&self, input: OperatorInput) -> Reply {
        match input {
            OperatorInput::Mode(mode) => {
                self.set_mode(mode);
                Reply::Silent
            }
            OperatorInput::Pump(on) => self.edit(|a| a.overrides_mut().pump_requested = on),
            OperatorInput::Light(on) => self.edit(|a| a.overrides_mut().light_requested = on),
            OperatorInput::PumpMinutes(n) => {
                self.edit_manual_only("pump-min", |a| a.overrides_mut().pump_duration_minutes = n)
            }
            OperatorInput::LightMinutes(n) => {
                self.edit_manual_only("light-min", |a| a.overrides_mut().light_duration_minutes = n)
            }
            OperatorInput::Apply => {
                drop(self.apply());
                Reply::Silent
            }
            OperatorInput::Status => {
                if self.poller.rerender() {
                    Reply::Silent
                } else {
                    Reply::Text("no status received yet".to_string())
                }
            }
            OperatorInput::History => Reply::Text(format!(
                "history {}/{} samples, poller {}",
                self.poller.history_len(),
                self.poller.history_capacity(),
                self.poller.state()
            )),
            OperatorInput::Debug(None) => Reply::Text(debug_flags::status_line()),
            OperatorInput::Debug(Some(name)) => match debug_flags::flag_by_name(&name) {
                Some(flag) => {
                    let on = debug_flags::toggle(flag);
                    Reply::Text(format!("debug {} {}", name, if on { "ON" } else { "off" }))
                }
                None => Reply::Text(format!(
                    "unknown debug flag '{}' (flags: {})",
                    name,
                    debug_flags::FLAG_NAMES.join(", ")
                )),
            },
            OperatorInput::Help => Reply::Text(HELP.to_string()),
            OperatorInput::Quit => Reply::Quit,
        }
    }

    fn edit<F: FnOnce(&mut ControlAuthority)>(&self, f: F) -> Reply {
        f(&mut self.authority.borrow_mut());
        Reply::Silent
    }

    /// Duration fields stay editable in AUTO, but the edit has no effect there.
    fn edit_manual_only<F: FnOnce(&mut ControlAuthority)>(&self, field: &str, f: F) -> Reply {
        f(&mut self.authority.borrow_mut());
        if self.mode().is_manual() {
            Reply::Silent
        } else {
            warn!("{} edited while in AUTO mode", field);
            Reply::Text(format!(
                "{} saved, but inactive in AUTO mode (use 'mode manual')",
                field
            ))
        }
    }
}
