// extensions/animator.rs
//
// Animator: builds and runs property animations as sequences.
// Owns every sequence; nodes only record the ids of theirs.
//
// Usage:
//   let mut animator = Animator::new();
//   animator.animate(&mut scene, id, "x", 5.0, AnimateOptions::new(1.0))?;
//   animator.tick(dt, &mut scene);  // Advances sequences, writes properties

use std::collections::{BTreeMap, HashMap};
use glam::{Vec2, Vec3, Vec4};
use crate::api::config::SceneConfig;
use crate::api::types::{NodeId, SequenceId};
use crate::api::value::Value;
use crate::components::node::animator_key;
use crate::core::error::NodeError;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::systems::dispatch::read_vec3;
use super::easing::Easing;
use super::sequence::{Sequence, SequenceStatus, Step};

/// Timing and policy of one `animate` call.
#[derive(Debug, Clone, Copy)]
pub struct AnimateOptions {
    /// Seconds from first to last step.
    pub duration: f32,
    /// Seconds before the timeline starts.
    pub delay: f32,
    pub curve: Easing,
    /// Number of interpolation steps. Defaults to one per expected frame.
    pub resolution: Option<u32>,
    /// Pause the property's running animation instead of queueing behind it.
    pub interrupt: bool,
    /// Advance the sequence in whole multiples of this step.
    pub time_step: Option<f32>,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            duration: 0.1,
            delay: 0.0,
            curve: Easing::ExpoIn,
            resolution: None,
            interrupt: true,
            time_step: None,
        }
    }
}

impl AnimateOptions {
    pub fn new(duration: f32) -> Self {
        Self { duration, ..Self::default() }
    }

    /// Defaults for color animations: non-interrupting.
    pub fn color() -> Self {
        Self { interrupt: false, ..Self::default() }
    }

    /// Defaults for fades: half a second, non-interrupting.
    pub fn fade() -> Self {
        Self { duration: 0.5, interrupt: false, ..Self::default() }
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_curve(mut self, curve: Easing) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_interrupt(mut self, interrupt: bool) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = Some(time_step);
        self
    }
}

/// A deferred `animate` call.
#[derive(Debug, Clone)]
pub struct AnimationRequest {
    pub node: NodeId,
    pub property: String,
    pub target: Value,
    pub options: AnimateOptions,
}

/// Parameters of `Animator::shake`.
#[derive(Debug, Clone, Copy)]
pub struct ShakeOptions {
    pub duration: f32,
    pub magnitude: f32,
    /// Seconds per half-shake.
    pub speed: f32,
    /// Scales the random offset on the x and y axes.
    pub direction: Vec2,
}

impl Default for ShakeOptions {
    fn default() -> Self {
        Self {
            duration: 0.2,
            magnitude: 1.0,
            speed: 0.05,
            direction: Vec2::ONE,
        }
    }
}

/// Owns and advances every animation sequence.
#[derive(Debug)]
pub struct Animator {
    sequences: BTreeMap<SequenceId, Sequence>,
    next_id: u32,
    rng: Rng,
    /// The one paused predecessor kept per node property after an interrupt.
    superseded: HashMap<(NodeId, String), SequenceId>,
    /// Set when sequences were removed outside `tick`.
    stale: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animator whose shake offsets are seeded from the config.
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            sequences: BTreeMap::new(),
            next_id: 0,
            rng: Rng::new(config.rng_seed),
            superseded: HashMap::new(),
            stale: false,
        }
    }

    fn insert(&mut self, sequence: Sequence) -> SequenceId {
        let id = SequenceId(self.next_id);
        self.next_id += 1;
        self.sequences.insert(id, sequence);
        id
    }

    /// Animate a property from its current value to `target`.
    ///
    /// With no delay the timeline is built now, sampling the current value.
    /// With a delay the returned sequence waits, then starts the timeline.
    pub fn animate(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        property: &str,
        target: impl Into<Value>,
        options: AnimateOptions,
    ) -> Result<SequenceId, NodeError> {
        self.launch(
            scene,
            AnimationRequest {
                node,
                property: property.to_string(),
                target: target.into(),
                options,
            },
        )
    }

    fn launch(&mut self, scene: &mut Scene, mut request: AnimationRequest) -> Result<SequenceId, NodeError> {
        scene.node_or_err(request.node)?;
        if request.options.delay <= 0.0 {
            return self.begin(scene, request);
        }
        let node = request.node;
        let delay = request.options.delay;
        request.options.delay = 0.0;
        let sequence = Sequence::new(node)
            .with_steps(vec![Step::Wait(delay), Step::Start(Box::new(request))]);
        let id = self.insert(sequence);
        scene.node_mut_or_err(node)?.animations.push(id);
        Ok(id)
    }

    /// Register the property's new animator, applying the interruption
    /// policy to the previous one.
    fn begin(&mut self, scene: &mut Scene, request: AnimationRequest) -> Result<SequenceId, NodeError> {
        let key = animator_key(&request.property);
        let prior = scene.node_or_err(request.node)?.animators.get(&key).copied();

        let mut queued_after = None;
        if let Some(prior) = prior {
            match (request.options.interrupt, self.status(prior)) {
                (true, Some(status)) if status != SequenceStatus::Finished => {
                    self.pause(prior);
                    self.supersede(scene, request.node, &key, prior);
                }
                (false, Some(SequenceStatus::Playing | SequenceStatus::Queued { .. })) => {
                    queued_after = Some(prior);
                }
                (false, Some(SequenceStatus::Paused)) => {
                    self.finish(scene, prior);
                }
                _ => {}
            }
        }

        let mut sequence = Sequence::new(request.node).with_time_step(request.options.time_step);
        match queued_after {
            Some(after) => {
                sequence.status = SequenceStatus::Queued { after };
                sequence.pending = Some((after, request.clone()));
            }
            None => sequence = self.build(scene, sequence, &request)?,
        }
        let id = self.insert(sequence);
        let node = scene.node_mut_or_err(request.node)?;
        node.animators.insert(key, id);
        node.animations.push(id);
        log::trace!("animate '{}' of {:?} as {:?}", request.property, request.node, id);
        Ok(id)
    }

    /// Keep `paused` as the property's only paused predecessor, killing the
    /// one it replaces.
    fn supersede(&mut self, scene: &mut Scene, node: NodeId, key: &str, paused: SequenceId) {
        let Some(old) = self.superseded.insert((node, key.to_string()), paused) else {
            return;
        };
        if old != paused && self.kill(old) {
            if let Some(n) = scene.node_mut(node) {
                n.animations.retain(|id| *id != old);
            }
        }
    }

    /// Fill a sequence with the interpolation timeline of a request.
    fn build(
        &self,
        scene: &Scene,
        mut sequence: Sequence,
        request: &AnimationRequest,
    ) -> Result<Sequence, NodeError> {
        let property = request.property.as_str();
        let start = scene
            .get(request.node, property)
            .ok_or_else(|| NodeError::invalid(property, "readable property", &Value::None))?;
        let options = &request.options;
        let resolution = options
            .resolution
            .unwrap_or_else(|| (options.duration * scene.config().animation_fps) as u32)
            .max(1);
        let target = conform_target(property, &start, &request.target)?;
        let wait = options.duration.max(0.0) / resolution as f32;
        for i in 0..=resolution {
            let t = i as f32 / resolution as f32;
            let value = start
                .lerp(&target, options.curve.apply(t))
                .ok_or_else(|| NodeError::invalid(property, start.kind(), &request.target))?;
            sequence.push(Step::Wait(wait));
            sequence.push(Step::Set { property: property.to_string(), value });
        }
        Ok(sequence)
    }

    /// Advance all playing sequences and apply their steps to the scene.
    /// Returns the number of sequences that completed this tick.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) -> usize {
        let ids: Vec<SequenceId> = self.sequences.keys().copied().collect();
        let mut started = Vec::new();
        for id in ids {
            let Some(sequence) = self.sequences.get_mut(&id) else { continue };
            if !scene.contains(sequence.node()) {
                self.sequences.remove(&id);
                continue;
            }
            for request in sequence.advance(dt, scene) {
                started.push((id, request));
            }
        }
        for (parent, request) in started {
            self.launch_child(scene, parent, request);
        }
        self.activate_queued(scene);

        let before = self.sequences.len();
        self.sequences.retain(|_, s| !s.is_finished());
        let completed = before - self.sequences.len();
        if completed > 0 || self.stale {
            self.prune(scene);
            self.stale = false;
        }
        completed
    }

    fn launch_child(&mut self, scene: &mut Scene, parent: SequenceId, request: AnimationRequest) -> Option<SequenceId> {
        let property = request.property.clone();
        match self.launch(scene, request) {
            Ok(child) => {
                if let Some(sequence) = self.sequences.get_mut(&parent) {
                    sequence.children.push(child);
                }
                Some(child)
            }
            Err(e) => {
                log::warn!("could not start '{}' animation: {}", property, e);
                None
            }
        }
    }

    /// Build queued sequences whose predecessor has finished or is gone.
    fn activate_queued(&mut self, scene: &mut Scene) {
        let ready: Vec<SequenceId> = self
            .sequences
            .iter()
            .filter_map(|(id, s)| match s.status {
                SequenceStatus::Queued { after } => {
                    let done = self.sequences.get(&after).map_or(true, |p| p.is_finished());
                    done.then_some(*id)
                }
                _ => None,
            })
            .collect();
        for id in ready {
            let Some(mut sequence) = self.sequences.remove(&id) else { continue };
            let Some((_, request)) = sequence.pending.take() else { continue };
            sequence.status = SequenceStatus::Playing;
            let sequence = self.build(scene, sequence, &request).unwrap_or_else(|e| {
                log::warn!("queued '{}' animation dropped: {}", request.property, e);
                let mut empty = Sequence::new(request.node);
                empty.status = SequenceStatus::Finished;
                empty
            });
            self.sequences.insert(id, sequence);
        }
    }

    /// Drop node references to sequences that no longer exist.
    fn prune(&mut self, scene: &mut Scene) {
        self.superseded.retain(|_, id| self.sequences.contains_key(id));
        for node in scene.iter_mut() {
            if node.animations.is_empty() {
                continue;
            }
            node.animations.retain(|id| self.sequences.contains_key(id));
            node.animators.retain(|_, id| self.sequences.contains_key(id));
        }
    }

    // -- Control --

    pub fn status(&self, id: SequenceId) -> Option<SequenceStatus> {
        self.sequences.get(&id).map(|s| s.status)
    }

    /// Playing or waiting to play.
    pub fn is_active(&self, id: SequenceId) -> bool {
        matches!(
            self.status(id),
            Some(SequenceStatus::Playing | SequenceStatus::Queued { .. })
        )
    }

    pub fn sequence(&self, id: SequenceId) -> Option<&Sequence> {
        self.sequences.get(&id)
    }

    /// The most recent sequence animating `property` on `node`.
    pub fn animator(&self, scene: &Scene, node: NodeId, property: &str) -> Option<SequenceId> {
        scene
            .node(node)?
            .animator(property)
            .filter(|id| self.sequences.contains_key(id))
    }

    /// Halt a sequence, keeping its position.
    pub fn pause(&mut self, id: SequenceId) -> bool {
        match self.sequences.get_mut(&id) {
            Some(s) if matches!(s.status, SequenceStatus::Playing | SequenceStatus::Queued { .. }) => {
                s.status = SequenceStatus::Paused;
                true
            }
            _ => false,
        }
    }

    pub fn resume(&mut self, id: SequenceId) -> bool {
        match self.sequences.get_mut(&id) {
            Some(s) if s.status == SequenceStatus::Paused => {
                s.status = match &s.pending {
                    Some((after, _)) => SequenceStatus::Queued { after: *after },
                    None => SequenceStatus::Playing,
                };
                true
            }
            _ => false,
        }
    }

    /// Apply every remaining step now, then finish the sequences it started.
    pub fn finish(&mut self, scene: &mut Scene, id: SequenceId) -> bool {
        let Some(mut sequence) = self.sequences.remove(&id) else {
            return false;
        };
        if sequence.is_finished() {
            self.sequences.insert(id, sequence);
            return true;
        }
        if let Some((_, request)) = sequence.pending.take() {
            sequence = match self.build(scene, sequence.clone(), &request) {
                Ok(built) => built,
                Err(e) => {
                    log::warn!("queued '{}' animation dropped: {}", request.property, e);
                    sequence
                }
            };
        }
        let requests = sequence.run_to_end(scene);
        self.sequences.insert(id, sequence);
        for request in requests {
            self.launch_child(scene, id, request);
        }
        let children = self
            .sequences
            .get(&id)
            .map(|s| s.children.clone())
            .unwrap_or_default();
        for child in children {
            self.finish(scene, child);
        }
        true
    }

    /// Remove a sequence without applying its remaining steps.
    pub fn kill(&mut self, id: SequenceId) -> bool {
        let removed = self.sequences.remove(&id).is_some();
        self.stale |= removed;
        removed
    }

    /// Number of live sequences, finished ones included until the next tick.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn clear(&mut self) {
        self.stale |= !self.sequences.is_empty();
        self.sequences.clear();
        self.superseded.clear();
    }

    // -- Composites --

    /// Animate x, y and (for 3-component targets) z independently.
    pub fn animate_position(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        target: impl Into<Value>,
        options: AnimateOptions,
    ) -> Result<Vec<SequenceId>, NodeError> {
        let target = target.into();
        let components = match &target {
            Value::Vec2(_) | Value::Vec3(_) => target.components(),
            Value::Floats(f) if f.len() == 2 || f.len() == 3 => Some(f.clone()),
            _ => None,
        }
        .ok_or_else(|| NodeError::invalid("position", "vec2 or vec3", &target))?;
        self.fan_out(scene, node, &["x", "y", "z"], &components, options)
    }

    pub fn animate_rotation(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        target: Vec3,
        options: AnimateOptions,
    ) -> Result<Vec<SequenceId>, NodeError> {
        let names = ["rotation_x", "rotation_y", "rotation_z"];
        self.fan_out(scene, node, &names, &target.to_array(), options)
    }

    /// A scalar target scales all three axes.
    pub fn animate_scale(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        target: impl Into<Value>,
        options: AnimateOptions,
    ) -> Result<Vec<SequenceId>, NodeError> {
        let target = target.into();
        let scale = match target.as_f32() {
            Some(s) => Vec3::splat(s),
            None => target
                .as_vec3()
                .ok_or_else(|| NodeError::invalid("scale", "number or vec3", &target))?,
        };
        let names = ["scale_x", "scale_y", "scale_z"];
        self.fan_out(scene, node, &names, &scale.to_array(), options)
    }

    fn fan_out(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        names: &[&str],
        components: &[f32],
        options: AnimateOptions,
    ) -> Result<Vec<SequenceId>, NodeError> {
        names
            .iter()
            .zip(components)
            .map(|(name, value)| self.animate(scene, node, name, *value, options))
            .collect()
    }

    pub fn animate_x(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "x", value, options)
    }

    pub fn animate_y(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "y", value, options)
    }

    pub fn animate_z(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "z", value, options)
    }

    pub fn animate_rotation_x(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "rotation_x", value, options)
    }

    pub fn animate_rotation_y(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "rotation_y", value, options)
    }

    pub fn animate_rotation_z(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "rotation_z", value, options)
    }

    pub fn animate_scale_x(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "scale_x", value, options)
    }

    pub fn animate_scale_y(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "scale_y", value, options)
    }

    pub fn animate_scale_z(&mut self, scene: &mut Scene, node: NodeId, value: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "scale_z", value, options)
    }

    // -- Color --

    /// See `AnimateOptions::color` for the usual options.
    pub fn animate_color(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        target: Vec4,
        options: AnimateOptions,
    ) -> Result<SequenceId, NodeError> {
        self.animate(scene, node, "color", target, options)
    }

    /// Animate alpha up to `alpha` (usually 1). See `AnimateOptions::fade`.
    pub fn fade_in(&mut self, scene: &mut Scene, node: NodeId, alpha: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.fade(scene, node, alpha, options)
    }

    /// Animate alpha down to `alpha` (usually 0). See `AnimateOptions::fade`.
    pub fn fade_out(&mut self, scene: &mut Scene, node: NodeId, alpha: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        self.fade(scene, node, alpha, options)
    }

    fn fade(&mut self, scene: &mut Scene, node: NodeId, alpha: f32, options: AnimateOptions) -> Result<SequenceId, NodeError> {
        let color = scene.node_or_err(node)?.color();
        self.animate_color(scene, node, color.truncate().extend(alpha), options)
    }

    /// Flash to `flash` and back. A blink already running on the node is
    /// finished first, so the color returned to is the settled one.
    pub fn blink(
        &mut self,
        scene: &mut Scene,
        node: NodeId,
        flash: Vec4,
        options: AnimateOptions,
    ) -> Result<SequenceId, NodeError> {
        let previous = scene.node_or_err(node)?.animator("blink");
        if let Some(previous) = previous {
            self.finish(scene, previous);
            self.kill(previous);
        }
        let original = scene.node_or_err(node)?.color();
        let duration = options.duration;
        let request = |target: Vec4, delay: f32| AnimationRequest {
            node,
            property: "color".to_string(),
            target: Value::Vec4(target),
            options: AnimateOptions {
                duration: duration * 0.4,
                delay,
                ..options
            },
        };
        let sequence = Sequence::new(node).with_steps(vec![
            Step::Start(Box::new(request(flash, 0.0))),
            Step::Start(Box::new(request(original, duration * 0.5))),
            Step::Wait(duration * 0.9),
        ]);
        let id = self.insert(sequence);
        let n = scene.node_mut_or_err(node)?;
        n.animators.insert(animator_key("blink"), id);
        n.animations.push(id);

        // Launch the leading starts now.
        let requests = match self.sequences.get_mut(&id) {
            Some(sequence) => sequence.advance(0.0, scene),
            None => Vec::new(),
        };
        for request in requests {
            self.launch_child(scene, id, request);
        }
        Ok(id)
    }

    /// Jitter the node around its current position, then return to it.
    /// Offsets are discrete jumps on the x and y axes.
    pub fn shake(&mut self, scene: &mut Scene, node: NodeId, options: ShakeOptions) -> Result<SequenceId, NodeError> {
        let origin = scene.node_or_err(node)?.position();
        let count = if options.speed > 0.0 {
            (options.duration / options.speed + 1e-4).floor() as u32
        } else {
            0
        };
        let mut sequence = Sequence::new(node);
        for _ in 0..count {
            let offset = Vec3::new(
                self.rng.uniform(-0.1, 0.1) * options.magnitude * options.direction.x,
                self.rng.uniform(-0.1, 0.1) * options.magnitude * options.direction.y,
                0.0,
            );
            sequence.push(Step::Wait(options.speed));
            sequence.push(Step::Set { property: "position".into(), value: Value::Vec3(origin + offset) });
            sequence.push(Step::Wait(options.speed));
            sequence.push(Step::Set { property: "position".into(), value: Value::Vec3(origin) });
        }
        let id = self.insert(sequence);
        scene.node_mut_or_err(node)?.animations.push(id);
        Ok(id)
    }
}

/// Bring a target to the shape of the property's current value, accepting
/// the same payloads a direct write does.
fn conform_target(property: &str, start: &Value, target: &Value) -> Result<Value, NodeError> {
    let conformed = match (start, target) {
        (Value::Vec3(_), Value::Float(_) | Value::Int(_)) if property.ends_with("scale") => {
            target.as_f32().map(|s| Value::Vec3(Vec3::splat(s)))
        }
        (Value::Vec3(current), Value::Vec2(_) | Value::Floats(_)) => {
            Some(Value::Vec3(read_vec3(property, target, current.z)?))
        }
        (Value::Vec4(_), Value::Floats(_)) => target.as_color().map(Value::Vec4),
        (Value::Vec2(_), Value::Floats(_)) => target.as_vec2().map(Value::Vec2),
        _ => Some(target.clone()),
    };
    conformed.ok_or_else(|| NodeError::invalid(property, start.kind(), target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear(duration: f32) -> AnimateOptions {
        AnimateOptions::new(duration).with_curve(Easing::Linear)
    }

    fn x(scene: &Scene, id: NodeId) -> f32 {
        scene.node(id).unwrap().x()
    }

    #[test]
    fn animate_reaches_target() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let seq = animator.animate(&mut scene, id, "x", 5.0, linear(1.0)).unwrap();
        assert_eq!(animator.animator(&scene, id, "x"), Some(seq));

        animator.tick(0.5, &mut scene);
        assert!(x(&scene, id) > 2.0 && x(&scene, id) < 3.0);
        for _ in 0..10 {
            animator.tick(0.1, &mut scene);
        }
        assert_relative_eq!(x(&scene, id), 5.0);
        assert!(animator.is_empty());
        assert!(scene.node(id).unwrap().animations().is_empty());
    }

    #[test]
    fn default_resolution_is_one_step_per_frame() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let seq = animator.animate(&mut scene, id, "x", 1.0, AnimateOptions::new(1.0)).unwrap();
        // 61 wait + set pairs for 60 steps.
        assert_eq!(animator.sequence(seq).unwrap().steps().len(), 122);
        let seq = animator.animate(&mut scene, id, "y", 1.0, AnimateOptions::new(0.0)).unwrap();
        assert_eq!(animator.sequence(seq).unwrap().steps().len(), 4);
    }

    #[test]
    fn interrupt_pauses_prior_and_converges_to_second_target() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let first = animator.animate(&mut scene, id, "x", 5.0, linear(1.0)).unwrap();
        let second = animator.animate(&mut scene, id, "x", -5.0, linear(1.0)).unwrap();

        assert_eq!(animator.status(first), Some(SequenceStatus::Paused));
        let active: Vec<_> = scene
            .node(id)
            .unwrap()
            .animations()
            .iter()
            .filter(|s| animator.is_active(**s))
            .copied()
            .collect();
        assert_eq!(active, vec![second]);
        assert_eq!(animator.animator(&scene, id, "x"), Some(second));

        for _ in 0..30 {
            animator.tick(0.1, &mut scene);
        }
        assert_relative_eq!(x(&scene, id), -5.0);
        // The paused sequence is kept, resumable.
        assert_eq!(animator.status(first), Some(SequenceStatus::Paused));
    }

    #[test]
    fn repeated_interrupts_keep_one_paused_predecessor() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("follower");
        for i in 0..500 {
            animator.animate(&mut scene, id, "x", i as f32, AnimateOptions::new(1.0)).unwrap();
            animator.tick(1.0 / 60.0, &mut scene);
            assert!(animator.len() <= 2);
        }
        for _ in 0..200 {
            animator.tick(0.1, &mut scene);
        }
        assert_relative_eq!(x(&scene, id), 499.0, epsilon = 1e-3);
        assert_eq!(animator.len(), 1);
        assert_eq!(scene.node(id).unwrap().animations().len(), 1);
    }

    #[test]
    fn whole_property_targets_accept_direct_write_shapes() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        scene.set(id, "position", Vec3::new(0.0, 0.0, 7.0));
        animator.animate(&mut scene, id, "scale", 2.0, linear(0.1)).unwrap();
        animator.animate(&mut scene, id, "position", Vec2::new(1.0, 2.0), linear(0.1)).unwrap();
        animator
            .animate(&mut scene, id, "rotation", vec![0.0_f32, 45.0, 0.0], linear(0.1))
            .unwrap();
        for _ in 0..3 {
            animator.tick(0.1, &mut scene);
        }
        let node = scene.node(id).unwrap();
        assert!(node.scale().abs_diff_eq(Vec3::splat(2.0), 1e-5));
        assert!(node.position().abs_diff_eq(Vec3::new(1.0, 2.0, 7.0), 1e-5));
        assert_relative_eq!(node.rotation_y(), 45.0, epsilon = 1e-3);

        let err = animator.animate(&mut scene, id, "position", 3.0, linear(0.1)).unwrap_err();
        assert!(matches!(err, NodeError::InvalidValue { .. }));
    }

    #[test]
    fn without_interrupt_the_next_animation_queues() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let first = animator.animate(&mut scene, id, "x", 4.0, linear(0.5)).unwrap();
        let second = animator
            .animate(&mut scene, id, "x", 8.0, linear(0.5).with_interrupt(false))
            .unwrap();
        assert_eq!(animator.status(second), Some(SequenceStatus::Queued { after: first }));

        for _ in 0..6 {
            animator.tick(0.1, &mut scene);
        }
        assert_relative_eq!(x(&scene, id), 4.0);
        assert_eq!(animator.status(second), Some(SequenceStatus::Playing));
        for _ in 0..6 {
            animator.tick(0.1, &mut scene);
        }
        assert_relative_eq!(x(&scene, id), 8.0);
    }

    #[test]
    fn without_interrupt_a_paused_prior_is_finished() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let first = animator.animate(&mut scene, id, "x", 4.0, linear(1.0)).unwrap();
        animator.pause(first);
        animator
            .animate(&mut scene, id, "x", 8.0, linear(1.0).with_interrupt(false))
            .unwrap();
        assert_eq!(animator.status(first), Some(SequenceStatus::Finished));
        assert_relative_eq!(x(&scene, id), 4.0);
    }

    #[test]
    fn delay_postpones_sampling() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        animator
            .animate(&mut scene, id, "x", 10.0, linear(0.5).with_delay(0.5))
            .unwrap();
        assert!(animator.animator(&scene, id, "x").is_none());
        scene.set(id, "x", 2.0);

        animator.tick(0.5, &mut scene);
        let timeline = animator.animator(&scene, id, "x").unwrap();
        match &animator.sequence(timeline).unwrap().steps()[1] {
            Step::Set { value, .. } => assert_eq!(value.as_f32(), Some(2.0)),
            other => panic!("unexpected step {:?}", other),
        }
        for _ in 0..10 {
            animator.tick(0.1, &mut scene);
        }
        assert_relative_eq!(x(&scene, id), 10.0);
    }

    #[test]
    fn pause_resume_kill() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let seq = animator.animate(&mut scene, id, "x", 1.0, linear(1.0)).unwrap();
        assert!(animator.pause(seq));
        animator.tick(5.0, &mut scene);
        assert_eq!(x(&scene, id), 0.0);
        assert!(animator.resume(seq));
        assert!(animator.is_active(seq));
        assert!(animator.kill(seq));
        assert!(animator.status(seq).is_none());
    }

    #[test]
    fn finish_jumps_to_target() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let seq = animator.animate(&mut scene, id, "scale_x", 3.0, linear(10.0)).unwrap();
        assert!(animator.finish(&mut scene, seq));
        assert_relative_eq!(scene.node(id).unwrap().scale_x(), 3.0);
        assert_eq!(animator.tick(0.0, &mut scene), 1);
    }

    #[test]
    fn sequences_of_destroyed_nodes_are_dropped() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        animator.animate(&mut scene, id, "x", 1.0, linear(1.0)).unwrap();
        scene.destroy(id);
        animator.tick(0.1, &mut scene);
        assert!(animator.is_empty());
    }

    #[test]
    fn position_fans_out_per_axis() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let ids = animator
            .animate_position(&mut scene, id, Vec2::new(1.0, 2.0), linear(0.2))
            .unwrap();
        assert_eq!(ids.len(), 2);
        let ids = animator
            .animate_position(&mut scene, id, Vec3::new(1.0, 2.0, 3.0), linear(0.2))
            .unwrap();
        assert_eq!(ids.len(), 3);
        for _ in 0..5 {
            animator.tick(0.1, &mut scene);
        }
        assert!(scene.node(id).unwrap().position().abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
    }

    #[test]
    fn scalar_scale_and_rotation() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        assert_eq!(animator.animate_scale(&mut scene, id, 2.0_f32, linear(0.1)).unwrap().len(), 3);
        animator
            .animate_rotation(&mut scene, id, Vec3::new(0.0, 90.0, 0.0), linear(0.1))
            .unwrap();
        for _ in 0..3 {
            animator.tick(0.1, &mut scene);
        }
        let node = scene.node(id).unwrap();
        assert!(node.scale().abs_diff_eq(Vec3::splat(2.0), 1e-5));
        assert_relative_eq!(node.rotation_y(), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn fades_touch_only_alpha() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        scene.set(id, "color", Vec4::new(1.0, 0.5, 0.0, 1.0));
        animator.fade_out(&mut scene, id, 0.0, AnimateOptions::fade()).unwrap();
        for _ in 0..6 {
            animator.tick(0.1, &mut scene);
        }
        let color = scene.node(id).unwrap().color();
        assert!(color.abs_diff_eq(Vec4::new(1.0, 0.5, 0.0, 0.0), 1e-5));

        animator.fade_in(&mut scene, id, 1.0, AnimateOptions::fade()).unwrap();
        for _ in 0..6 {
            animator.tick(0.1, &mut scene);
        }
        assert_relative_eq!(scene.node(id).unwrap().alpha(), 1.0);
    }

    #[test]
    fn blink_returns_to_original_color() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        scene.set(id, "color", red);
        let blink = animator
            .blink(&mut scene, id, Vec4::ZERO, AnimateOptions::color().with_duration(1.0))
            .unwrap();
        assert!(!animator.sequence(blink).unwrap().children().is_empty());

        animator.tick(0.45, &mut scene);
        assert!(scene.node(id).unwrap().color().abs_diff_eq(Vec4::ZERO, 1e-5));
        for _ in 0..10 {
            animator.tick(0.1, &mut scene);
        }
        assert!(scene.node(id).unwrap().color().abs_diff_eq(red, 1e-5));
    }

    #[test]
    fn new_blink_finishes_running_one() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        let white = scene.node(id).unwrap().color();
        let first = animator
            .blink(&mut scene, id, Vec4::ZERO, AnimateOptions::color().with_duration(1.0))
            .unwrap();
        animator.tick(0.2, &mut scene);
        animator
            .blink(&mut scene, id, Vec4::ZERO, AnimateOptions::color().with_duration(1.0))
            .unwrap();
        assert!(animator.status(first).is_none());
        for _ in 0..15 {
            animator.tick(0.1, &mut scene);
        }
        assert!(scene.node(id).unwrap().color().abs_diff_eq(white, 1e-5));
    }

    #[test]
    fn shake_returns_home() {
        let mut scene = Scene::new();
        let mut animator = Animator::new();
        let id = scene.spawn("n");
        scene.set(id, "position", Vec3::new(1.0, 1.0, 1.0));
        let seq = animator.shake(&mut scene, id, ShakeOptions::default()).unwrap();
        // Four jitters of (wait, offset, wait, return).
        assert_eq!(animator.sequence(seq).unwrap().steps().len(), 16);

        animator.tick(0.05, &mut scene);
        let shaken = scene.node(id).unwrap().position();
        assert_ne!(shaken, Vec3::ONE);
        assert!((shaken - Vec3::ONE).abs().max_element() <= 0.1);
        assert_eq!(shaken.z, 1.0);

        animator.tick(1.0, &mut scene);
        assert_eq!(scene.node(id).unwrap().position(), Vec3::ONE);
    }
}
