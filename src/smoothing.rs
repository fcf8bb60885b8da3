// src/smoothing.rs - One-Euro pointer smoothing with deadzone and edge damping
//
// Smooth at rest (jitter suppressed), responsive during fast motion.
use std::collections::VecDeque;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Adaptive low-pass filter for a single axis.
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    /// Minimum cutoff frequency (Hz); lower is smoother at rest.
    min_cutoff: f64,
    /// Speed coefficient; higher means less lag during fast motion.
    beta: f64,
    /// Derivative cutoff frequency (Hz).
    d_cutoff: f64,
    initial_freq: f64,

    freq: f64,
    x_prev: Option<f64>,
    dx_prev: f64,
    t_prev: Option<f64>,
}

impl OneEuroFilter {
    pub fn new(freq: f64, min_cutoff: f64, beta: f64, d_cutoff: f64) -> Self {
        Self {
            min_cutoff,
            beta,
            d_cutoff,
            initial_freq: freq,
            freq,
            x_prev: None,
            dx_prev: 0.0,
            t_prev: None,
        }
    }

    fn alpha(&self, cutoff: f64) -> f64 {
        let tau = 1.0 / (2.0 * PI * cutoff);
        let te = 1.0 / self.freq;
        1.0 / (1.0 + tau / te)
    }

    /// Filters `x` sampled at `t` seconds. The first sample passes through.
    pub fn filter(&mut self, x: f64, t: f64) -> f64 {
        let Some(x_prev) = self.x_prev else {
            self.x_prev = Some(x);
            self.t_prev = Some(t);
            return x;
        };

        if let Some(t_prev) = self.t_prev {
            let dt = t - t_prev;
            if dt > 0.0 {
                self.freq = 1.0 / dt;
            }
        }
        self.t_prev = Some(t);

        let a_d = self.alpha(self.d_cutoff);
        let dx = (x - x_prev) * self.freq;
        let dx_hat = a_d * dx + (1.0 - a_d) * self.dx_prev;
        self.dx_prev = dx_hat;

        let cutoff = self.min_cutoff + self.beta * dx_hat.abs();
        let a = self.alpha(cutoff);
        let x_hat = a * x + (1.0 - a) * x_prev;
        self.x_prev = Some(x_hat);
        x_hat
    }

    pub fn frequency(&self) -> f64 {
        self.freq
    }

    pub fn is_primed(&self) -> bool {
        self.x_prev.is_some()
    }

    pub fn reset(&mut self) {
        self.freq = self.initial_freq;
        self.x_prev = None;
        self.dx_prev = 0.0;
        self.t_prev = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    pub frequency: f64,
    pub min_cutoff: f64,
    pub beta: f64,
    pub d_cutoff: f64,
    /// Per-axis movement (caller units) below which only `deadzone_keep` of the step is applied.
    pub deadzone: f64,
    pub deadzone_keep: f64,
    /// Fraction of the extent treated as the edge band.
    pub edge_margin: f64,
    /// Damping factor at the very edge; rises linearly to 1.0 at the band boundary.
    pub edge_min_factor: f64,
    pub width: f64,
    pub height: f64,
    pub history_len: usize,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            frequency: 60.0,
            min_cutoff: 0.8,
            beta: 0.4,
            d_cutoff: 1.0,
            deadzone: 2.0,
            deadzone_keep: 0.3,
            edge_margin: 0.15,
            edge_min_factor: 0.6,
            width: 1920.0,
            height: 1080.0,
            history_len: 10,
        }
    }
}

/// Two One-Euro filters plus position-aware damping.
#[derive(Debug, Clone)]
pub struct AdaptiveSmoother {
    config: SmootherConfig,
    x: OneEuroFilter,
    y: OneEuroFilter,
    prev: Option<(f64, f64)>,
    history: VecDeque<(f64, f64)>,
}

impl AdaptiveSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        let axis = || OneEuroFilter::new(config.frequency, config.min_cutoff, config.beta, config.d_cutoff);
        Self {
            x: axis(),
            y: axis(),
            history: VecDeque::with_capacity(config.history_len),
            prev: None,
            config,
        }
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    pub fn smooth(&mut self, x: f64, y: f64, now: f64) -> (f64, f64) {
        let mut fx = self.x.filter(x, now);
        let mut fy = self.y.filter(y, now);

        if let Some((px, py)) = self.prev {
            fx = self.deadzone(fx, px);
            fy = self.deadzone(fy, py);

            if let Some(factor) = self.edge_factor(fx, fy) {
                fx = px + (fx - px) * factor;
                fy = py + (fy - py) * factor;
            }
        }

        self.prev = Some((fx, fy));
        if self.config.history_len > 0 {
            if self.history.len() == self.config.history_len {
                self.history.pop_front();
            }
            self.history.push_back((fx, fy));
        }
        (fx, fy)
    }

    fn deadzone(&self, value: f64, prev: f64) -> f64 {
        if (value - prev).abs() < self.config.deadzone {
            prev + (value - prev) * self.config.deadzone_keep
        } else {
            value
        }
    }

    /// Damping factor when (x, y) lies inside the edge band, else `None`.
    fn edge_factor(&self, x: f64, y: f64) -> Option<f64> {
        let nx = x / self.config.width;
        let ny = y / self.config.height;
        let dist = nx.min(1.0 - nx).min(ny).min(1.0 - ny);
        if dist >= self.config.edge_margin {
            return None;
        }
        // Past the bound counts as at the edge.
        let t = (dist / self.config.edge_margin).max(0.0);
        let min = self.config.edge_min_factor;
        Some(min + (1.0 - min) * t)
    }

    pub fn previous(&self) -> Option<(f64, f64)> {
        self.prev
    }

    /// Recent outputs, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.history.iter()
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.prev = None;
        self.history.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Multiplier applied to normalized hand deltas in relative mode.
    pub sensitivity: f64,
    /// Relative (delta) instead of absolute pointer mapping.
    pub relative: bool,
    /// Flip x so movement matches a mirrored preview.
    pub mirror_x: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            sensitivity: 2.5,
            relative: true,
            mirror_x: false,
        }
    }
}

/// Delta-based pointer: hand motion nudges the current pointer position.
#[derive(Debug, Clone)]
pub struct RelativePointer {
    smoother: AdaptiveSmoother,
    sensitivity: f64,
    last_raw: Option<(f64, f64)>,
}

impl RelativePointer {
    pub fn new(smoother: AdaptiveSmoother, sensitivity: f64) -> Self {
        Self {
            smoother,
            sensitivity,
            last_raw: None,
        }
    }

    /// `raw` is a normalized hand position, `current` the pointer's actual
    /// position. Returns `None` on the seeding call. The result is not clamped.
    pub fn update(&mut self, raw: (f64, f64), current: (f64, f64), now: f64) -> Option<(f64, f64)> {
        let last = self.last_raw.replace(raw)?;
        let config = self.smoother.config();
        let dx = (raw.0 - last.0) * config.width * self.sensitivity;
        let dy = (raw.1 - last.1) * config.height * self.sensitivity;
        Some(self.smoother.smooth(current.0 + dx, current.1 + dy, now))
    }

    pub fn smoother(&self) -> &AdaptiveSmoother {
        &self.smoother
    }

    pub fn reset(&mut self) {
        self.last_raw = None;
        self.smoother.reset();
    }
}

/// Clamps a point into `[0, width - 1] x [0, height - 1]`.
pub fn clamp_to_extent(point: (f64, f64), width: f64, height: f64) -> (f64, f64) {
    (
        point.0.clamp(0.0, (width - 1.0).max(0.0)),
        point.1.clamp(0.0, (height - 1.0).max(0.0)),
    )
}
