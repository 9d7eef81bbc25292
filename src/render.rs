use crate::authority::ControlMode;
use crate::command::StatusMessage;
use crate::history::SeriesSnapshot;
use crate::telemetry::DeviceStatus;

/// The presentation side of the console.
///
/// The core only ever calls these hooks; it never inspects what they draw.
/// Implementations take `&self` because the poll cycle and command submissions
/// share one renderer on the same thread.
pub trait Renderer {
    /// Whether the renderer can accept output yet. Checked once before the
    /// poll loop starts.
    fn ready(&self) -> bool {
        true
    }

    fn refresh_charts(&self, snapshot: &SeriesSnapshot);

    fn refresh_status_cards(&self, status: &DeviceStatus);

    /// Enable or dim the manual-only fields for `mode`.
    fn reflect_authority(&self, mode: ControlMode);

    /// Show a submission outcome, or clear the message area with `None`.
    fn show_status_message(&self, message: Option<&StatusMessage>);
}
