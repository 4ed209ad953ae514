use crate::ai::TrajectoryStep;
use crate::error::TrainingError;
use crate::game::Action;

/// Ordered steps of one episode. Built by a single worker, consumed once by
/// the learning update.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    steps: Vec<TrajectoryStep>,
}

impl Trajectory {
    /// Reserve room for `capacity` steps up front so the hot loop never
    /// reallocates. Allocation failure is reported instead of aborting.
    pub fn with_capacity(capacity: usize) -> Result<Self, TrainingError> {
        let mut steps = Vec::new();
        steps
            .try_reserve_exact(capacity)
            .map_err(|source| TrainingError::BufferAllocation { capacity, source })?;
        Ok(Trajectory { steps })
    }

    pub fn push(&mut self, step: TrajectoryStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Undiscounted sum of rewards.
    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|s| s.reward).sum()
    }

    pub fn decisions(&self) -> usize {
        self.steps.iter().filter(|s| s.decision).count()
    }

    /// Decisions where the player chose to buy.
    pub fn buys(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.decision && s.action == Action::Buy)
            .count()
    }
}
