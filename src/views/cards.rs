use crate::authority::ControlMode;
use crate::telemetry::DeviceStatus;

fn on_off(v: bool) -> &'static str {
    if v {
        "ON"
    } else {
        "OFF"
    }
}

pub(crate) fn status_card_lines(status: &DeviceStatus) -> Vec<String> {
    let mut lines = vec![
        format!("Air          {:.1}C / {:.0}%", status.air_temp, status.air_hum),
        format!(
            "Forecast +3h {:.1}C / {:.0}%",
            status.forecast3_temp, status.forecast3_hum
        ),
    ];

    if let (Some(temp), Some(hum)) = (status.forecast_temp, status.forecast_hum) {
        let mut line = format!("Forecast now {:.1}C / {:.0}%", temp, hum);
        if let Some(light) = status.forecast_light {
            line.push_str(&format!(" / light {:.0}", light));
        }
        lines.push(line);
    }

    lines.push(format!("Pump         {}", on_off(status.pump_on)));
    lines.push(format!("Light        {}", on_off(status.light)));
    lines.push(format!("Mode         {}", status.mode));
    lines.push(format!(
        "Soil         {:.0} / {:.0} / {:.0}",
        status.soil[0], status.soil[1], status.soil[2]
    ));

    if let Some(rain) = status.rain_soon {
        lines.push(format!("Rain soon    {}", if rain { "YES" } else { "no" }));
    }
    if let Some(secs) = status.next_irrigation_secs {
        lines.push(format!("Next water   device t+{}s", secs));
    }
    lines
}

/// Manual-only fields are listed as disabled while the device decides.
pub(crate) fn authority_line(mode: ControlMode) -> String {
    match mode {
        ControlMode::Manual => {
            "Control MANUAL: pump, light, pump-min, light-min active".to_string()
        }
        ControlMode::Auto => {
            "Control AUTO: pump-min, light-min disabled (device schedule in charge)".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::SystemMode;

    fn status() -> DeviceStatus {
        DeviceStatus {
            air_temp: 23.44,
            air_hum: 56.2,
            forecast3_temp: 21.0,
            forecast3_hum: 60.0,
            pump_on: true,
            light: false,
            mode: SystemMode::Degraded,
            soil: [30.0, 31.4, 32.6],
            forecast_temp: None,
            forecast_hum: None,
            forecast_light: None,
            rain_soon: None,
            next_irrigation_secs: None,
        }
    }

    #[test]
    fn required_cards() {
        let lines = status_card_lines(&status());
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Air          23.4C / 56%");
        assert_eq!(lines[2], "Pump         ON");
        assert_eq!(lines[3], "Light        OFF");
        assert_eq!(lines[4], "Mode         DEGRADED");
        assert_eq!(lines[5], "Soil         30 / 31 / 33");
    }

    #[test]
    fn optional_cards_appear_when_reported() {
        let mut s = status();
        s.forecast_temp = Some(19.5);
        s.forecast_hum = Some(70.0);
        s.rain_soon = Some(true);
        s.next_irrigation_secs = Some(3600);
        s.mode = SystemMode::Unknown(7);

        let lines = status_card_lines(&s);
        assert!(lines.contains(&"Forecast now 19.5C / 70%".to_string()));
        assert!(lines.contains(&"Rain soon    YES".to_string()));
        assert!(lines.contains(&"Next water   device t+3600s".to_string()));
        assert!(lines.contains(&"Mode         7".to_string()));
    }

    #[test]
    fn auto_marks_durations_disabled() {
        assert!(authority_line(ControlMode::Auto).contains("disabled"));
        assert!(!authority_line(ControlMode::Manual).contains("disabled"));
    }
}
