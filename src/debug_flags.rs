use std::sync::atomic::{AtomicBool, Ordering};

/// Global debug flags toggled from the console.
/// When a flag is true, the module logs at info! level instead of debug!.
pub static DEBUG_POLL: AtomicBool = AtomicBool::new(false);
pub static DEBUG_HTTP: AtomicBool = AtomicBool::new(false);
pub static DEBUG_SUBMIT: AtomicBool = AtomicBool::new(false);

pub const FLAG_NAMES: [&str; 3] = ["poll", "http", "submit"];

pub fn is_on(flag: &AtomicBool) -> bool {
    flag.load(Ordering::Relaxed)
}

pub fn set(flag: &AtomicBool, val: bool) {
    flag.store(val, Ordering::Relaxed);
}

pub fn toggle(flag: &AtomicBool) -> bool {
    !flag.fetch_xor(true, Ordering::Relaxed)
}

pub fn flag_by_name(name: &str) -> Option<&'static AtomicBool> {
    match name {
        "poll" => Some(&DEBUG_POLL),
        "http" => Some(&DEBUG_HTTP),
        "submit" => Some(&DEBUG_SUBMIT),
        _ => None,
    }
}

fn on_off(flag: &AtomicBool) -> &'static str {
    if is_on(flag) {
        "ON"
    } else {
        "off"
    }
}

pub fn status_line() -> String {
    format!(
        "poll={} http={} submit={}",
        on_off(&DEBUG_POLL),
        on_off(&DEBUG_HTTP),
        on_off(&DEBUG_SUBMIT),
    )
}
