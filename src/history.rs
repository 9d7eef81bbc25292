// Rolling telemetry history (fixed-size, no heap growth).
//
// Five numeric series (air temp, air humidity, soil 1-3) plus a label series,
// stored as parallel queues so the renderer can consume one channel at a
// time. All six queues always have the same length: `append` is the only
// mutator and it evicts from, and pushes to, every queue in one step.
//
// Tuning:
// - `HISTORY_CAPACITY`: window size (40 samples = 80 s at the default 2 s poll)

use heapless::{Deque, String};

use crate::telemetry::Sample;

// ── Constants ───────────────────────────────────────────────────────

pub const HISTORY_CAPACITY: usize = 40;

/// Longest label produced by `LABEL_FORMAT` ("HH:MM:SS").
const LABEL_LEN: usize = 8;
const LABEL_FORMAT: &str = "%H:%M:%S";

pub type Label = String<LABEL_LEN>;

/// Index of each channel in a [`SeriesSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    AirTemp,
    AirHumidity,
    Soil1,
    Soil2,
    Soil3,
}

// ── Snapshot ────────────────────────────────────────────────────────

/// Owned copy of the buffer, oldest → newest. Never aliases later appends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSnapshot {
    pub labels: Vec<Label>,
    pub air_temp: Vec<f32>,
    pub air_humidity: Vec<f32>,
    pub soil: [Vec<f32>; 3],
}

impl SeriesSnapshot {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn channel(&self, channel: Channel) -> &[f32] {
        match channel {
            Channel::AirTemp => &self.air_temp,
            Channel::AirHumidity => &self.air_humidity,
            Channel::Soil1 => &self.soil[0],
            Channel::Soil2 => &self.soil[1],
            Channel::Soil3 => &self.soil[2],
        }
    }
}

// ── Rolling buffer ──────────────────────────────────────────────────

pub struct RollingSeriesBuffer<const N: usize> {
    labels: Deque<Label, N>,
    air_temp: Deque<f32, N>,
    air_humidity: Deque<f32, N>,
    soil: [Deque<f32, N>; 3],
}

impl<const N: usize> Default for RollingSeriesBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RollingSeriesBuffer<N> {
    pub fn new() -> Self {
        Self {
            labels: Deque::new(),
            air_temp: Deque::new(),
            air_humidity: Deque::new(),
            soil: [Deque::new(), Deque::new(), Deque::new()],
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Push a new sample, evicting the oldest one from every series when full.
    pub fn append(&mut self, sample: &Sample) {
        if self.labels.is_full() {
            self.evict_oldest();
        }

        let mut label = Label::new();
        // A formatted time never exceeds LABEL_LEN; fall back to an empty label.
        let _ = core::fmt::write(&mut label, format_args!("{}", sample.timestamp.format(LABEL_FORMAT)));

        // Every queue has a free slot here, so none of these pushes can fail.
        let _ = self.labels.push_back(label);
        let _ = self.air_temp.push_back(sample.air_temp);
        let _ = self.air_humidity.push_back(sample.air_humidity);
        for (series, value) in self.soil.iter_mut().zip(sample.soil) {
            let _ = series.push_back(value);
        }
    }

    fn evict_oldest(&mut self) {
        self.labels.pop_front();
        self.air_temp.pop_front();
        self.air_humidity.pop_front();
        for series in self.soil.iter_mut() {
            series.pop_front();
        }
    }

    pub fn snapshot(&self) -> SeriesSnapshot {
        SeriesSnapshot {
            labels: self.labels.iter().cloned().collect(),
            air_temp: self.air_temp.iter().copied().collect(),
            air_humidity: self.air_humidity.iter().copied().collect(),
            soil: [
                self.soil[0].iter().copied().collect(),
                self.soil[1].iter().copied().collect(),
                self.soil[2].iter().copied().collect(),
            ],
        }
    }

    #[cfg(test)]
    fn series_lengths(&self) -> [usize; 6] {
        [
            self.labels.len(),
            self.air_temp.len(),
            self.air_humidity.len(),
            self.soil[0].len(),
            self.soil[1].len(),
            self.soil[2].len(),
        ]
    }
}
