//! Fixed timestep driver
//!
//! Real elapsed time accumulates and the simulation steps once per whole
//! tick; leftover time carries into the next frame so the simulation runs
//! at the same rate regardless of display refresh.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{GameEvent, SessionState, TickInput, step};
use crate::tuning::Tuning;

/// Result of a finished session, handed to the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub score: u64,
    /// Wall-clock play time
    pub elapsed_ms: f64,
}

impl GameSummary {
    /// Leaderboard note: play time in seconds, e.g. `12.34s`
    pub fn note(&self) -> String {
        format!("{:.2}s", self.elapsed_ms / 1000.0)
    }
}

/// What happened during one rendered frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Simulation steps run this frame
    pub steps: u32,
    pub events: Vec<GameEvent>,
    /// Set on the frame the session ended
    pub summary: Option<GameSummary>,
}

/// Owns the running session and its timing state
#[derive(Debug)]
pub struct GameLoop {
    state: SessionState,
    input: TickInput,
    accumulator: f64,
    last_time: Option<f64>,
    started_at: f64,
}

impl GameLoop {
    pub fn new(tuning: Tuning, seed: u64, now_ms: f64) -> Self {
        log::info!("Session started ({}, seed {})", tuning.difficulty.as_str(), seed);
        Self {
            state: SessionState::new(tuning, seed),
            input: TickInput::default(),
            accumulator: 0.0,
            last_time: None,
            started_at: now_ms,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Latest sampled pointer position in field space
    pub fn set_target_x(&mut self, x: f32) {
        self.input.target_x = x;
    }

    /// Throw the session away and start a fresh one
    pub fn restart(&mut self, seed: u64, now_ms: f64) {
        let tuning = self.state.tuning;
        *self = Self::new(tuning, seed, now_ms);
    }

    /// Run as many fixed steps as the elapsed time allows
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let mut report = FrameReport::default();

        let last = self.last_time.replace(now_ms).unwrap_or(now_ms);
        let dt = (now_ms - last).clamp(0.0, MAX_FRAME_MS);
        if self.state.is_over() {
            return report;
        }
        self.accumulator += dt;

        while self.accumulator >= TICK_MS && report.steps < MAX_SUBSTEPS {
            step(&mut self.state, &self.input);
            self.accumulator -= TICK_MS;
            report.steps += 1;

            if self.state.is_over() {
                self.accumulator = 0.0;
                report.summary = Some(GameSummary {
                    score: self.state.score,
                    elapsed_ms: now_ms - self.started_at,
                });
                break;
            }
        }
        // Anything beyond the substep cap is dropped
        if report.steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(TICK_MS);
        }

        report.events = self.state.take_events();
        report
    }
}
