//! Busy/idle tracking for the stages that call out of process

use serde::Serialize;

/// State of one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// State of a stage, tagged with the dataset generation it belongs to.
///
/// A completion is only applied if its generation still matches; a re-upload
/// resets the tracker to the new generation, so late completions are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTracker {
    state: StageState,
    generation: u64,
}

impl StageTracker {
    pub fn state(&self) -> StageState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.state == StageState::Running
    }

    /// Mark the stage running for `generation`. Returns false if it already is.
    pub fn try_start(&mut self, generation: u64) -> bool {
        if self.is_running() && self.generation == generation {
            return false;
        }
        self.state = StageState::Running;
        self.generation = generation;
        true
    }

    /// Record the end of a run. Ignored if the run belongs to an older generation.
    pub fn finish(&mut self, generation: u64, success: bool) -> bool {
        if self.generation != generation || !self.is_running() {
            return false;
        }
        self.state = if success {
            StageState::Succeeded
        } else {
            StageState::Failed
        };
        true
    }

    /// Mark a stage that completed without an external call
    pub fn complete_immediately(&mut self, generation: u64) {
        self.state = StageState::Succeeded;
        self.generation = generation;
    }

    /// Back to idle for a new dataset
    pub fn reset(&mut self, generation: u64) {
        self.state = StageState::Idle;
        self.generation = generation;
    }
}
