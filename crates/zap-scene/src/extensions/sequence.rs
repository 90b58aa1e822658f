// extensions/sequence.rs
//
// Sequence: an ordered timeline of wait / set / start steps.
// Time only passes on `Wait` steps; `Set` and `Start` run as soon as the
// cursor reaches them, so one advance may apply several steps.

use crate::api::types::{NodeId, SequenceId};
use crate::api::value::Value;
use crate::core::scene::Scene;
use crate::core::time::FixedTimestep;
use super::animator::AnimationRequest;

/// Slack for accumulated float error when a wait is nearly complete.
const WAIT_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone)]
pub enum Step {
    /// Hold for a number of seconds.
    Wait(f32),
    /// Write a property through the dispatcher.
    Set { property: String, value: Value },
    /// Launch another animation; its sequence becomes a child of this one.
    Start(Box<AnimationRequest>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    Playing,
    /// Halted without losing its position.
    Paused,
    /// Waiting for another sequence to finish before building its timeline.
    Queued { after: SequenceId },
    Finished,
}

#[derive(Debug, Clone)]
pub struct Sequence {
    node: NodeId,
    steps: Vec<Step>,
    cursor: usize,
    /// Time spent in the current wait step.
    waited: f32,
    pub(crate) status: SequenceStatus,
    timestep: Option<FixedTimestep>,
    pub(crate) children: Vec<SequenceId>,
    /// Request whose timeline is built once the queued-after sequence ends.
    pub(crate) pending: Option<(SequenceId, AnimationRequest)>,
}

impl Sequence {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            steps: Vec::new(),
            cursor: 0,
            waited: 0.0,
            status: SequenceStatus::Playing,
            timestep: None,
            children: Vec::new(),
            pending: None,
        }
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    /// Advance in whole multiples of `dt` only.
    pub fn with_time_step(mut self, dt: Option<f32>) -> Self {
        self.timestep = dt.filter(|dt| *dt > 0.0).map(FixedTimestep::new);
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn status(&self) -> SequenceStatus {
        self.status
    }

    /// Sequences started by this one's `Start` steps.
    pub fn children(&self) -> &[SequenceId] {
        &self.children
    }

    /// Total of all wait steps, in seconds.
    pub fn duration(&self) -> f32 {
        self.steps
            .iter()
            .map(|s| match s {
                Step::Wait(d) => *d,
                _ => 0.0,
            })
            .sum()
    }

    pub fn is_finished(&self) -> bool {
        self.status == SequenceStatus::Finished
    }

    /// Run steps covered by `dt`. Returns the requests of any `Start` steps
    /// reached, for the caller to launch.
    pub(crate) fn advance(&mut self, dt: f32, scene: &mut Scene) -> Vec<AnimationRequest> {
        if self.status != SequenceStatus::Playing {
            return Vec::new();
        }
        let mut budget = match self.timestep.as_mut() {
            Some(ts) => ts.release(dt),
            None => dt.max(0.0),
        };
        let mut started = Vec::new();
        while let Some(step) = self.steps.get(self.cursor) {
            match step {
                Step::Wait(duration) => {
                    let remaining = duration - self.waited;
                    if budget + WAIT_EPSILON < remaining {
                        self.waited += budget;
                        return started;
                    }
                    budget = (budget - remaining).max(0.0);
                    self.waited = 0.0;
                }
                Step::Set { property, value } => scene.set(self.node, property, value.clone()),
                Step::Start(request) => started.push((**request).clone()),
            }
            self.cursor += 1;
        }
        self.status = SequenceStatus::Finished;
        started
    }

    /// Apply every remaining step immediately, skipping waits.
    pub(crate) fn run_to_end(&mut self, scene: &mut Scene) -> Vec<AnimationRequest> {
        let mut started = Vec::new();
        for step in &self.steps[self.cursor.min(self.steps.len())..] {
            match step {
                Step::Wait(_) => {}
                Step::Set { property, value } => scene.set(self.node, property, value.clone()),
                Step::Start(request) => started.push((**request).clone()),
            }
        }
        self.cursor = self.steps.len();
        self.waited = 0.0;
        self.status = SequenceStatus::Finished;
        started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_x(v: f32) -> Step {
        Step::Set { property: "x".into(), value: Value::Float(v) }
    }

    #[test]
    fn waits_gate_sets() {
        let mut scene = Scene::new();
        let id = scene.spawn("n");
        let mut seq = Sequence::new(id).with_steps(vec![Step::Wait(0.5), set_x(1.0), Step::Wait(0.5), set_x(2.0)]);
        assert_eq!(seq.duration(), 1.0);

        seq.advance(0.25, &mut scene);
        assert_eq!(scene.node(id).unwrap().x(), 0.0);
        seq.advance(0.25, &mut scene);
        assert_eq!(scene.node(id).unwrap().x(), 1.0);
        assert_eq!(seq.status(), SequenceStatus::Playing);
        seq.advance(0.5, &mut scene);
        assert_eq!(scene.node(id).unwrap().x(), 2.0);
        assert!(seq.is_finished());
    }

    #[test]
    fn large_dt_runs_through_several_waits() {
        let mut scene = Scene::new();
        let id = scene.spawn("n");
        let mut seq = Sequence::new(id).with_steps(vec![Step::Wait(0.1), set_x(1.0), Step::Wait(0.1), set_x(2.0)]);
        seq.advance(1.0, &mut scene);
        assert_eq!(scene.node(id).unwrap().x(), 2.0);
        assert!(seq.is_finished());
    }

    #[test]
    fn paused_sequence_keeps_position() {
        let mut scene = Scene::new();
        let id = scene.spawn("n");
        let mut seq = Sequence::new(id).with_steps(vec![Step::Wait(0.5), set_x(1.0)]);
        seq.advance(0.25, &mut scene);
        seq.status = SequenceStatus::Paused;
        seq.advance(10.0, &mut scene);
        assert_eq!(scene.node(id).unwrap().x(), 0.0);
        seq.status = SequenceStatus::Playing;
        seq.advance(0.25, &mut scene);
        assert_eq!(scene.node(id).unwrap().x(), 1.0);
    }

    #[test]
    fn fixed_time_step_releases_whole_steps() {
        let mut scene = Scene::new();
        let id = scene.spawn("n");
        let mut seq = Sequence::new(id)
            .with_steps(vec![Step::Wait(0.5), set_x(1.0)])
            .with_time_step(Some(0.25));
        seq.advance(0.125, &mut scene);
        seq.advance(0.25, &mut scene);
        assert_eq!(scene.node(id).unwrap().x(), 0.0);
        seq.advance(0.125, &mut scene);
        assert_eq!(scene.node(id).unwrap().x(), 1.0);
    }

    #[test]
    fn run_to_end_skips_waits() {
        let mut scene = Scene::new();
        let id = scene.spawn("n");
        let mut seq = Sequence::new(id).with_steps(vec![Step::Wait(100.0), set_x(3.0)]);
        assert!(seq.run_to_end(&mut scene).is_empty());
        assert_eq!(scene.node(id).unwrap().x(), 3.0);
        assert!(seq.is_finished());
    }
}
