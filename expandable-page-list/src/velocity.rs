//! Pointer velocity estimation.
//!
//! Positions are fit per axis with a least-squares polynomial over a short,
//! recent window; the velocity is the fitted curve's slope at the newest
//! sample.

use crate::geometry::Offset;
use crate::pointer::PointerChange;

const HISTORY_SIZE: usize = 20;
/// Samples older than this (relative to the newest) are ignored.
const HORIZON_MS: u64 = 100;
/// A gap this long between samples means the pointer stopped moving.
const ASSUME_STOPPED_MS: u64 = 40;
const MAX_DEGREE: usize = 2;

#[derive(Debug, Clone, Copy)]
struct Sample {
    uptime_ms: u64,
    position: Offset,
}

#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: [Option<Sample>; HISTORY_SIZE],
    /// Index of the newest sample.
    head: usize,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self {
            samples: [None; HISTORY_SIZE],
            head: 0,
        }
    }

    pub fn add_position(&mut self, uptime_ms: u64, position: Offset) {
        self.head = (self.head + 1) % HISTORY_SIZE;
        self.samples[self.head] = Some(Sample {
            uptime_ms,
            position,
        });
    }

    /// Feeds a pointer change; a fresh down restarts the history.
    pub fn add_pointer_change(&mut self, change: &PointerChange) {
        if change.pressed && !change.previous_pressed {
            self.reset();
        }
        self.add_position(change.uptime_ms, change.position);
    }

    /// Velocity in px/s at the newest sample, zero without enough history.
    pub fn calculate_velocity(&self) -> Offset {
        let window = self.window();
        if window.len() < 2 {
            return Offset::ZERO;
        }
        let newest = window[0].uptime_ms;
        let times: Vec<f64> = window
            .iter()
            .map(|s| -((newest - s.uptime_ms) as f64))
            .collect();
        // Relative to the newest sample so a resting axis fits to exactly zero.
        let origin = window[0].position;
        let xs: Vec<f64> = window
            .iter()
            .map(|s| (s.position.x - origin.x) as f64)
            .collect();
        let ys: Vec<f64> = window
            .iter()
            .map(|s| (s.position.y - origin.y) as f64)
            .collect();
        let degree = MAX_DEGREE.min(window.len() - 1);

        let per_ms = |values: &[f64]| {
            fit_polynomial(&times, values, degree)
                .map(|coefficients| coefficients[1])
                .unwrap_or(0.0)
        };
        Offset::new(
            (per_ms(&xs) * 1000.0) as f32,
            (per_ms(&ys) * 1000.0) as f32,
        )
    }

    pub fn reset(&mut self) {
        self.samples = [None; HISTORY_SIZE];
        self.head = 0;
    }

    /// Newest-first samples inside the horizon, cut at the first stop gap.
    fn window(&self) -> Vec<Sample> {
        let mut window = Vec::with_capacity(HISTORY_SIZE);
        let mut index = self.head;
        let Some(newest) = self.samples[index] else {
            return window;
        };
        let mut previous = newest;
        for _ in 0..HISTORY_SIZE {
            let Some(sample) = self.samples[index] else {
                break;
            };
            // Out-of-order timestamps end the window.
            if sample.uptime_ms > previous.uptime_ms {
                break;
            }
            let age = newest.uptime_ms - sample.uptime_ms;
            let gap = previous.uptime_ms - sample.uptime_ms;
            if age > HORIZON_MS || gap > ASSUME_STOPPED_MS {
                break;
            }
            window.push(sample);
            previous = sample;
            index = (index + HISTORY_SIZE - 1) % HISTORY_SIZE;
        }
        window
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Least-squares polynomial fit of `values` over `times`. Returns
/// `degree + 1` coefficients, lowest order first, or `None` when the system is
/// singular (e.g. all samples share one timestamp).
fn fit_polynomial(times: &[f64], values: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = degree + 1;
    // Normal equations: (AᵀA) c = Aᵀv with A[i][j] = t_i^j.
    let mut matrix = vec![vec![0.0f64; n + 1]; n];
    for (&t, &v) in times.iter().zip(values) {
        let powers: Vec<f64> = (0..2 * n).map(|p| t.powi(p as i32)).collect();
        for row in 0..n {
            for col in 0..n {
                matrix[row][col] += powers[row + col];
            }
            matrix[row][n] += powers[row] * v;
        }
    }

    for pivot in 0..n {
        let best = (pivot..n).max_by(|&a, &b| {
            matrix[a][pivot]
                .abs()
                .total_cmp(&matrix[b][pivot].abs())
        })?;
        if matrix[best][pivot].abs() < 1e-9 {
            return None;
        }
        matrix.swap(pivot, best);
        for row in 0..n {
            if row == pivot {
                continue;
            }
            let factor = matrix[row][pivot] / matrix[pivot][pivot];
            for col in pivot..=n {
                matrix[row][col] -= factor * matrix[pivot][col];
            }
        }
    }
    Some((0..n).map(|i| matrix[i][n] / matrix[i][i]).collect())
}
