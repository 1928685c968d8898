//! Bubble migration engine.
//!
//! ## Design
//!
//! Bubbles are spawned once in per-electrode batches at uniformly random
//! points inside the electrolyte.  While the animation flag is set, every
//! rendered frame calls [`BubbleEngine::tick`], which moves each live bubble a
//! fixed step straight toward its electrode and reclaims bubbles that arrive.
//!
//! The engine never touches the ECS directly.  Every visual effect goes through
//! a [`BubbleRenderer`], so the same logic drives Bevy entities in the app and
//! a recording fake in tests.

use bevy::prelude::*;
use rand::Rng;

use crate::constants::{ARRIVAL_EPSILON, ARRIVAL_THRESHOLD, BUBBLE_STEP};
use crate::error::{CellError, CellResult};

// ── Categories and targets ────────────────────────────────────────────────────

/// Which electrode a bubble belongs to.  Fixed for the bubble's lifetime.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Electrode {
    /// Blue bubbles; migrate to the MnO2OH plate.
    Manganese,
    /// Red bubbles; migrate to the Fe2O3OH plate.
    Iron,
}

impl Electrode {
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Electrode::Manganese => "MnO2OH",
            Electrode::Iron => "Fe2O3OH",
        }
    }
}

/// Destination of each electrode category.  Immutable after scene setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectrodeTargets {
    pub manganese: Vec3,
    pub iron: Vec3,
}

impl ElectrodeTargets {
    #[inline]
    pub fn target(&self, electrode: Electrode) -> Vec3 {
        match electrode {
            Electrode::Manganese => self.manganese,
            Electrode::Iron => self.iron,
        }
    }
}

// ── Spawn volume ──────────────────────────────────────────────────────────────

/// Axis-aligned box bubbles are scattered in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnVolume {
    min: Vec3,
    max: Vec3,
}

impl SpawnVolume {
    /// Build a volume, rejecting non-finite bounds and any axis without
    /// positive extent.
    pub fn new(min: Vec3, max: Vec3) -> CellResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(CellError::NonFiniteVolume);
        }
        for (axis, lo, hi) in [
            ("x", min.x, max.x),
            ("y", min.y, max.y),
            ("z", min.z, max.z),
        ] {
            if hi <= lo {
                return Err(CellError::DegenerateVolume {
                    axis,
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Volume of the given size centred on `center`.
    pub fn centered(center: Vec3, size: Vec3) -> CellResult<Self> {
        Self::new(center - size * 0.5, center + size * 0.5)
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Independent uniform sample on each axis.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        Vec3::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
            rng.gen_range(self.min.z..=self.max.z),
        )
    }
}

// ── Renderer seam ─────────────────────────────────────────────────────────────

/// Visual side of the engine.
///
/// `add_bubble` is called once per spawned bubble, `update_bubble_position`
/// once per tick for each bubble still live after that tick, and
/// `remove_bubble` exactly once when a bubble arrives.  A handle is never
/// used again after it has been passed to `remove_bubble`.
pub trait BubbleRenderer {
    type Handle;

    fn add_bubble(&mut self, position: Vec3, electrode: Electrode) -> Self::Handle;
    fn update_bubble_position(&mut self, handle: &Self::Handle, position: Vec3);
    /// Release every drawable resource held for this bubble.
    fn remove_bubble(&mut self, handle: Self::Handle);
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// One live bubble.
#[derive(Debug, Clone)]
pub struct Bubble<H> {
    position: Vec3,
    electrode: Electrode,
    handle: H,
}

impl<H> Bubble<H> {
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn electrode(&self) -> Electrode {
        self.electrode
    }

    #[inline]
    pub fn handle(&self) -> &H {
        &self.handle
    }
}

/// Owns every live bubble and advances them toward their electrodes.
#[derive(Debug, Clone)]
pub struct BubbleEngine<H> {
    bubbles: Vec<Bubble<H>>,
    targets: ElectrodeTargets,
    step: f32,
    threshold: f32,
}

impl<H> BubbleEngine<H> {
    /// Engine with the default step and arrival threshold.
    pub fn new(targets: ElectrodeTargets) -> Self {
        Self::with_motion(targets, BUBBLE_STEP, ARRIVAL_THRESHOLD)
    }

    /// Engine with an explicit per-tick step and arrival threshold.
    ///
    /// Callers validate the pair first (see [`crate::config::CellConfig::validate`]).
    pub fn with_motion(targets: ElectrodeTargets, step: f32, threshold: f32) -> Self {
        Self {
            bubbles: Vec::new(),
            targets,
            step,
            threshold,
        }
    }

    #[inline]
    pub fn targets(&self) -> &ElectrodeTargets {
        &self.targets
    }

    #[inline]
    pub fn live(&self) -> &[Bubble<H>] {
        &self.bubbles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Scatter `count` bubbles of `electrode` uniformly inside `volume` and
    /// register each with the renderer.  Returns the newly spawned bubbles.
    pub fn spawn_batch<R, Rend>(
        &mut self,
        electrode: Electrode,
        count: usize,
        volume: &SpawnVolume,
        rng: &mut R,
        renderer: &mut Rend,
    ) -> &[Bubble<H>]
    where
        R: Rng + ?Sized,
        Rend: BubbleRenderer<Handle = H> + ?Sized,
    {
        let start = self.bubbles.len();
        self.bubbles.reserve(count);
        for _ in 0..count {
            let position = volume.sample(rng);
            let handle = renderer.add_bubble(position, electrode);
            self.bubbles.push(Bubble {
                position,
                electrode,
                handle,
            });
        }
        &self.bubbles[start..]
    }

    /// Advance every live bubble once and reclaim the ones that arrived.
    ///
    /// Each bubble is visited exactly once per call regardless of removals.
    /// Returns the number of bubbles reclaimed.
    pub fn tick<Rend>(&mut self, renderer: &mut Rend) -> usize
    where
        Rend: BubbleRenderer<Handle = H> + ?Sized,
    {
        let targets = self.targets;
        let step = self.step;
        let arrive_at = self.threshold + ARRIVAL_EPSILON;

        let mut arrived: Vec<H> = Vec::new();
        let mut kept: Vec<Bubble<H>> = Vec::with_capacity(self.bubbles.len());

        for mut bubble in self.bubbles.drain(..) {
            let target = targets.target(bubble.electrode);
            let offset = target - bubble.position;
            let distance = offset.length();

            // Zero offset has no direction; treat it as arrived.
            let Some(direction) = offset.try_normalize() else {
                arrived.push(bubble.handle);
                continue;
            };
            if distance <= arrive_at {
                arrived.push(bubble.handle);
                continue;
            }

            bubble.position += direction * step;
            if bubble.position.distance(target) <= arrive_at {
                arrived.push(bubble.handle);
                continue;
            }

            renderer.update_bubble_position(&bubble.handle, bubble.position);
            kept.push(bubble);
        }

        self.bubbles = kept;

        let reclaimed = arrived.len();
        for handle in arrived {
            renderer.remove_bubble(handle);
        }
        reclaimed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    /// Renderer fake that records every call keyed by a sequential id.
    #[derive(Default)]
    pub(crate) struct RecordingRenderer {
        next_id: u32,
        pub added: Vec<(u32, Vec3, Electrode)>,
        pub updates: HashMap<u32, Vec<Vec3>>,
        pub removed: Vec<u32>,
    }

    impl RecordingRenderer {
        pub fn update_count(&self, id: u32) -> usize {
            self.updates.get(&id).map_or(0, Vec::len)
        }
    }

    impl BubbleRenderer for RecordingRenderer {
        type Handle = u32;

        fn add_bubble(&mut self, position: Vec3, electrode: Electrode) -> u32 {
            let id = self.next_id;
            self.next_id += 1;
            self.added.push((id, position, electrode));
            id
        }

        fn update_bubble_position(&mut self, handle: &u32, position: Vec3) {
            assert!(
                !self.removed.contains(handle),
                "bubble {handle} updated after removal"
            );
            self.updates.entry(*handle).or_default().push(position);
        }

        fn remove_bubble(&mut self, handle: u32) {
            assert!(
                !self.removed.contains(&handle),
                "bubble {handle} removed twice"
            );
            self.removed.push(handle);
        }
    }

    pub(crate) fn cell_targets() -> ElectrodeTargets {
        ElectrodeTargets {
            manganese: Vec3::new(0.0, 0.0, -2.5),
            iron: Vec3::new(0.0, 0.0, 2.5),
        }
    }

    fn electrolyte() -> SpawnVolume {
        SpawnVolume::new(Vec3::new(-0.9, -1.4, -2.4), Vec3::new(0.9, 1.4, 2.4)).unwrap()
    }

    /// Single-point volume around `p`, tight enough that sampling is effectively exact.
    fn point_volume(p: Vec3) -> SpawnVolume {
        SpawnVolume::new(p, p + Vec3::splat(1e-6)).unwrap()
    }

    // ── SpawnVolume ───────────────────────────────────────────────────────────

    #[test]
    fn zero_extent_axis_is_rejected() {
        let err = SpawnVolume::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, CellError::DegenerateVolume { axis: "y", .. }));
    }

    #[test]
    fn inverted_axis_is_rejected() {
        let err = SpawnVolume::new(Vec3::new(0.0, 0.0, 2.0), Vec3::ONE).unwrap_err();
        assert!(matches!(err, CellError::DegenerateVolume { axis: "z", .. }));
    }

    #[test]
    fn nan_bound_is_rejected() {
        let err = SpawnVolume::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE).unwrap_err();
        assert_eq!(err, CellError::NonFiniteVolume);
    }

    #[test]
    fn centered_volume_matches_electrolyte_bounds() {
        let v = SpawnVolume::centered(Vec3::ZERO, Vec3::new(1.8, 2.8, 4.8)).unwrap();
        assert!((v.min() - Vec3::new(-0.9, -1.4, -2.4)).length() < 1e-6);
        assert!((v.max() - Vec3::new(0.9, 1.4, 2.4)).length() < 1e-6);
    }

    // ── spawn_batch ───────────────────────────────────────────────────────────

    #[test]
    fn spawned_bubbles_lie_inside_volume() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());
        let volume = electrolyte();

        let batch = engine.spawn_batch(Electrode::Manganese, 20, &volume, &mut rng, &mut renderer);
        assert_eq!(batch.len(), 20);
        for bubble in batch {
            assert!(
                volume.contains(bubble.position()),
                "{:?} outside electrolyte",
                bubble.position()
            );
        }
        assert_eq!(renderer.added.len(), 20);
    }

    #[test]
    fn batches_append_and_keep_their_category() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());
        let volume = electrolyte();

        engine.spawn_batch(Electrode::Manganese, 5, &volume, &mut rng, &mut renderer);
        engine.spawn_batch(Electrode::Iron, 3, &volume, &mut rng, &mut renderer);
        assert_eq!(engine.len(), 8);

        let before: Vec<(u32, Electrode)> = engine
            .live()
            .iter()
            .map(|b| (*b.handle(), b.electrode()))
            .collect();
        for _ in 0..50 {
            engine.tick(&mut renderer);
        }
        for bubble in engine.live() {
            let original = before.iter().find(|(h, _)| h == bubble.handle()).unwrap();
            assert_eq!(original.1, bubble.electrode());
        }
        assert_eq!(
            before.iter().filter(|(_, e)| *e == Electrode::Iron).count(),
            3
        );
    }

    #[test]
    fn zero_count_spawns_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());
        let batch = engine.spawn_batch(Electrode::Iron, 0, &electrolyte(), &mut rng, &mut renderer);
        assert!(batch.is_empty());
        assert!(engine.is_empty());
        assert!(renderer.added.is_empty());
    }

    // ── tick ──────────────────────────────────────────────────────────────────

    #[test]
    fn bubble_from_origin_arrives_after_240_ticks() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());
        engine.spawn_batch(
            Electrode::Manganese,
            1,
            &point_volume(Vec3::ZERO),
            &mut rng,
            &mut renderer,
        );

        for _ in 0..239 {
            assert_eq!(engine.tick(&mut renderer), 0);
        }
        assert_eq!(engine.len(), 1, "bubble must still be live after 239 ticks");

        assert_eq!(engine.tick(&mut renderer), 1);
        assert!(engine.is_empty());
        assert_eq!(renderer.removed, vec![0]);
        assert_eq!(renderer.update_count(0), 239);
    }

    #[test]
    fn distance_to_target_never_increases() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());
        let volume = electrolyte();
        engine.spawn_batch(Electrode::Manganese, 10, &volume, &mut rng, &mut renderer);
        engine.spawn_batch(Electrode::Iron, 10, &volume, &mut rng, &mut renderer);

        let targets = cell_targets();
        let mut last: HashMap<u32, f32> = engine
            .live()
            .iter()
            .map(|b| (*b.handle(), b.position().distance(targets.target(b.electrode()))))
            .collect();

        for _ in 0..600 {
            engine.tick(&mut renderer);
            for bubble in engine.live() {
                let d = bubble.position().distance(targets.target(bubble.electrode()));
                let prev = last.insert(*bubble.handle(), d).unwrap();
                assert!(d <= prev + 1e-6, "distance grew from {prev} to {d}");
            }
        }
    }

    #[test]
    fn bubble_within_threshold_is_removed_on_next_tick() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());
        engine.spawn_batch(
            Electrode::Iron,
            1,
            &point_volume(Vec3::new(0.0, 0.05, 2.5)),
            &mut rng,
            &mut renderer,
        );

        assert_eq!(engine.tick(&mut renderer), 1);
        assert!(engine.is_empty());
        assert_eq!(renderer.update_count(0), 0);

        // Further ticks are no-ops.
        assert_eq!(engine.tick(&mut renderer), 0);
        assert_eq!(renderer.removed.len(), 1);
    }

    #[test]
    fn bubble_exactly_on_target_is_reclaimed_without_nan() {
        let targets = ElectrodeTargets {
            manganese: Vec3::ZERO,
            iron: Vec3::new(0.0, 0.0, 2.5),
        };
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::with_motion(targets, 0.01, 0.0);
        let handle = renderer.add_bubble(Vec3::ZERO, Electrode::Manganese);
        engine.bubbles.push(Bubble {
            position: Vec3::ZERO,
            electrode: Electrode::Manganese,
            handle,
        });

        assert_eq!(engine.tick(&mut renderer), 1);
        assert!(engine.is_empty());
        assert!(renderer.updates.is_empty(), "no update with a NaN position");
    }

    #[test]
    fn removal_mid_tick_neither_skips_nor_repeats_neighbours() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());

        // far, arriving, far, arriving, far
        for z in [0.0, -2.45, 0.5, -2.5, 1.0] {
            engine.spawn_batch(
                Electrode::Manganese,
                1,
                &point_volume(Vec3::new(0.0, 0.0, z)),
                &mut rng,
                &mut renderer,
            );
        }

        assert_eq!(engine.tick(&mut renderer), 2);
        assert_eq!(engine.len(), 3);
        for id in [0, 2, 4] {
            assert_eq!(renderer.update_count(id), 1, "bubble {id} updated once");
        }
        for id in [1, 3] {
            assert_eq!(renderer.update_count(id), 0);
        }
        let mut removed = renderer.removed.clone();
        removed.sort_unstable();
        assert_eq!(removed, vec![1, 3]);

        let survivors: Vec<u32> = engine.live().iter().map(|b| *b.handle()).collect();
        assert_eq!(survivors, vec![0, 2, 4], "live order is preserved");
    }

    #[test]
    fn every_bubble_eventually_arrives() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());
        let volume = electrolyte();
        engine.spawn_batch(Electrode::Manganese, 20, &volume, &mut rng, &mut renderer);
        engine.spawn_batch(Electrode::Iron, 20, &volume, &mut rng, &mut renderer);

        // Farthest possible start is under 6 units from either plate.
        for _ in 0..700 {
            engine.tick(&mut renderer);
        }
        assert!(engine.is_empty());
        assert_eq!(renderer.removed.len(), 40);
    }
}
