use crate::history::{Channel, Label, SeriesSnapshot};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub(crate) const CHARTS: [(Channel, &str, &str); 5] = [
    (Channel::AirTemp, "Air °C", "C"),
    (Channel::AirHumidity, "Humidity", "%"),
    (Channel::Soil1, "Soil 1", ""),
    (Channel::Soil2, "Soil 2", ""),
    (Channel::Soil3, "Soil 3", ""),
];

pub(crate) fn min_max(values: &[f32]) -> Option<(f32, f32)> {
    let mut iter = values.iter().copied().filter(|v| v.is_finite());
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Keep at most `width` points, picked evenly across the series and always
/// including the newest one.
pub(crate) fn downsample(values: &[f32], width: usize) -> Vec<f32> {
    if width == 0 || values.is_empty() {
        return Vec::new();
    }
    if values.len() <= width {
        return values.to_vec();
    }
    let last = values.len() - 1;
    let steps = width - 1;
    (0..width)
        .map(|i| {
            let idx = if steps == 0 { last } else { i * last / steps };
            values[idx]
        })
        .collect()
}

pub(crate) fn sparkline(values: &[f32], width: usize) -> String {
    let points = downsample(values, width);
    let Some((lo, hi)) = min_max(&points) else {
        return String::new();
    };
    let range = (hi - lo).max(0.1);
    points
        .iter()
        .map(|v| {
            if !v.is_finite() {
                return ' ';
            }
            let level = ((v - lo) / range * (BARS.len() - 1) as f32).round() as usize;
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

fn time_range(labels: &[Label]) -> String {
    match (labels.first(), labels.last()) {
        (Some(first), Some(last)) => format!("{} → {}", first, last),
        _ => String::new(),
    }
}

/// Every charted series, one line each, under a header with the label range.
pub(crate) fn chart_lines(snapshot: &SeriesSnapshot, width: usize) -> Vec<String> {
    if snapshot.is_empty() {
        return vec!["(collecting data...)".to_string()];
    }

    let mut lines = Vec::with_capacity(CHARTS.len() + 1);
    lines.push(format!(
        "History {} samples  {}",
        snapshot.len(),
        time_range(&snapshot.labels)
    ));

    for (channel, name, unit) in CHARTS {
        let values = snapshot.channel(channel);
        let spark = sparkline(values, width);
        let latest = values.last().copied().unwrap_or(f32::NAN);
        let line = match min_max(values) {
            Some((lo, hi)) => format!(
                "{:<9}{:<w$}  {:.1}{u}  (min {:.1} max {:.1})",
                name,
                spark,
                latest,
                lo,
                hi,
                w = width,
                u = unit
            ),
            None => format!("{:<9}--", name),
        };
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsample_keeps_ends() {
        let values: Vec<f32> = (0..40).map(|v| v as f32).collect();
        let out = downsample(&values, 5);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[4], 39.0);

        assert_eq!(downsample(&values[..3], 5), vec![0.0, 1.0, 2.0]);
        assert_eq!(downsample(&values, 1), vec![39.0]);
        assert!(downsample(&values, 0).is_empty());
    }

    #[test]
    fn sparkline_spans_full_range() {
        let line = sparkline(&[10.0, 12.0, 14.0], 10);
        assert_eq!(line, "▁▅█");
    }

    #[test]
    fn flat_series_stays_on_the_floor() {
        assert_eq!(sparkline(&[5.0, 5.0, 5.0], 10), "▁▁▁");
        assert_eq!(sparkline(&[], 10), "");
    }

    #[test]
    fn min_max_skips_non_finite() {
        assert_eq!(min_max(&[3.0, f32::NAN, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(min_max(&[f32::NAN]), None);
    }

    #[test]
    fn empty_snapshot_reports_collecting() {
        let lines = chart_lines(&SeriesSnapshot::default(), 20);
        assert_eq!(lines, vec!["(collecting data...)".to_string()]);
    }
}
