//! Terminal rendition of the console screens: status cards, sparkline charts,
//! the control-authority line and the submission message area.

mod cards;
mod charts;

use std::cell::RefCell;
use std::io::Write;

use crate::authority::ControlMode;
use crate::command::StatusMessage;
use crate::history::SeriesSnapshot;
use crate::render::Renderer;
use crate::telemetry::DeviceStatus;

pub const DEFAULT_CHART_WIDTH: usize = 40;

/// Writes every screen update as plain lines to `W` (stdout in the binary).
///
/// Write failures are dropped: a broken terminal must not stop the poll loop.
pub struct ConsoleRenderer<W: Write> {
    out: RefCell<W>,
    chart_width: usize,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, chart_width: usize) -> Self {
        Self {
            out: RefCell::new(out),
            chart_width: chart_width.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = self.out.borrow_mut();
        for line in lines {
            writeln!(out, "{}", line.as_ref()).ok();
        }
        out.flush().ok();
    }

    /// A free-form line from the operator console (help text, replies).
    pub fn note(&self, text: &str) {
        self.write_lines([text]);
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn refresh_charts(&self, snapshot: &SeriesSnapshot) {
        self.write_lines(charts::chart_lines(snapshot, self.chart_width));
    }

    fn refresh_status_cards(&self, status: &DeviceStatus) {
        self.write_lines(cards::status_card_lines(status));
    }

    fn reflect_authority(&self, mode: ControlMode) {
        self.write_lines([cards::authority_line(mode)]);
    }

    fn show_status_message(&self, message: Option<&StatusMessage>) {
        match message {
            Some(m) => self.write_lines([m.text()]),
            None => self.write_lines(["(status cleared)"]),
        }
    }
}
