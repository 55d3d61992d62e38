//! Frame-stepped animation state for the scripted scene objects.
//!
//! Every animation advances by a fixed increment per frame rather than per
//! second, so replaying the same sequence of actions always yields the same
//! state. Each type is advanced through its own `tick`, and [`Animations`]
//! ticks them all in a fixed order.

use crate::camera::{Camera, MoveDirection};

/// Which way the boat is currently drifting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoatPhase {
    #[default]
    Advancing,
    Retreating,
}

/// The boat drifts back and forth between 0 and 2 forever.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoatOscillation {
    pub phase: BoatPhase,
    pub progress: f32,
}

impl BoatOscillation {
    pub const STEP: f32 = 0.005;
    pub const MAX: f32 = 2.0;

    pub fn tick(&mut self) {
        // Snap within half a step so float drift never adds or drops a frame.
        match self.phase {
            BoatPhase::Advancing => {
                self.progress += Self::STEP;
                if self.progress >= Self::MAX - Self::STEP * 0.5 {
                    self.progress = Self::MAX;
                    self.phase = BoatPhase::Retreating;
                    log::debug!("boat turned back");
                }
            }
            BoatPhase::Retreating => {
                self.progress -= Self::STEP;
                if self.progress <= Self::STEP * 0.5 {
                    self.progress = 0.0;
                    self.phase = BoatPhase::Advancing;
                    log::debug!("boat turned forward");
                }
            }
        }
    }
}

/// The duck group slides along -X while migrating, stopping at a threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DuckMigration {
    pub migrating: bool,
    pub progress: f32,
}

impl DuckMigration {
    pub const STEP: f32 = 0.001;
    pub const THRESHOLD: f32 = 1.5;

    pub fn trigger(&mut self) {
        self.migrating = true;
    }

    pub fn tick(&mut self) {
        if !self.migrating {
            return;
        }
        self.progress -= Self::STEP;
        if self.progress <= Self::THRESHOLD {
            self.migrating = false;
            log::debug!("ducks settled at {:.3}", self.progress);
        }
    }
}

/// Distance the arrow has travelled since it was shot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArrowFlight {
    pub shooting: bool,
    pub distance: f32,
}

impl ArrowFlight {
    pub const STEP: f32 = 0.05;

    pub fn shoot(&mut self) {
        self.shooting = true;
    }

    /// Stop the arrow and return it to the bow.
    pub fn cancel(&mut self) {
        self.shooting = false;
        self.distance = 0.0;
    }

    pub fn tick(&mut self) {
        if self.shooting {
            self.distance += Self::STEP;
        }
    }
}

/// Uniform growth of the scalable tree group.
///
/// Until the first grow or shrink request the trees keep their authored size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreeScaling {
    pub scaling: bool,
    pub offset: f32,
    pending: f32,
}

impl TreeScaling {
    pub const STEP: f32 = 0.01;
    pub const MIN_OFFSET: f32 = -0.5;
    pub const MAX_OFFSET: f32 = 1.0;

    pub fn grow(&mut self) {
        self.scaling = true;
        self.pending += Self::STEP;
    }

    pub fn shrink(&mut self) {
        self.scaling = true;
        self.pending -= Self::STEP;
    }

    pub fn tick(&mut self) {
        self.offset = (self.offset + self.pending).clamp(Self::MIN_OFFSET, Self::MAX_OFFSET);
        self.pending = 0.0;
    }

    /// Scale factor applied to the trees, or `None` while they keep their authored size.
    pub fn factor(&self) -> Option<f32> {
        self.scaling.then_some(1.0 + self.offset)
    }
}

/// The plane crosses the lake in a loop while enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaneLoop {
    pub looping: bool,
    pub progress: f32,
}

impl PlaneLoop {
    pub const STEP: f32 = 0.05;
    pub const LENGTH: f32 = 10.0;

    pub fn toggle(&mut self) {
        self.looping = !self.looping;
        log::info!("plane loop {}", if self.looping { "on" } else { "off" });
    }

    pub fn tick(&mut self) {
        if !self.looping {
            return;
        }
        self.progress += Self::STEP;
        if self.progress >= Self::LENGTH {
            self.progress = 0.0;
        }
    }
}

/// Leg of the scripted camera fly-through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TourPhase {
    Forward,
    Right,
    Left,
    Center,
    #[default]
    Idle,
}

/// A scripted camera fly-through: forward to the lake, sweep right, sweep
/// left, then settle back in the middle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraTour {
    pub phase: TourPhase,
}

impl CameraTour {
    pub const FORWARD_STOP_Z: f32 = 1.3;
    pub const RIGHT_STOP_X: f32 = 3.2;
    pub const LEFT_STOP_X: f32 = -3.3;
    pub const CENTER_STOP_X: f32 = 0.0;

    /// Put the camera at its starting pose and begin the first leg.
    ///
    /// Starting while a tour is running restarts it.
    pub fn start(&mut self, camera: &mut Camera) {
        camera.reset_to_start();
        self.phase = TourPhase::Forward;
        log::info!("camera tour started");
    }

    pub fn is_running(&self) -> bool {
        self.phase != TourPhase::Idle
    }

    /// Move the camera one step along the current leg.
    ///
    /// A leg whose stop condition already holds hands over to the next one
    /// within the same frame.
    pub fn tick(&mut self, camera: &mut Camera, speed: f32) {
        loop {
            let position = camera.position();
            let (keep_going, direction, next) = match self.phase {
                TourPhase::Forward => (
                    position.z > Self::FORWARD_STOP_Z,
                    MoveDirection::Forward,
                    TourPhase::Right,
                ),
                TourPhase::Right => (
                    position.x < Self::RIGHT_STOP_X,
                    MoveDirection::Right,
                    TourPhase::Left,
                ),
                TourPhase::Left => (
                    position.x > Self::LEFT_STOP_X,
                    MoveDirection::Left,
                    TourPhase::Center,
                ),
                TourPhase::Center => (
                    position.x < Self::CENTER_STOP_X,
                    MoveDirection::Right,
                    TourPhase::Idle,
                ),
                TourPhase::Idle => return,
            };

            if keep_going {
                camera.move_in(direction, speed);
                return;
            }
            log::debug!("camera tour {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
    }
}

/// All per-object animation state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Animations {
    pub boat: BoatOscillation,
    pub ducks: DuckMigration,
    pub arrow: ArrowFlight,
    pub trees: TreeScaling,
    pub plane: PlaneLoop,
    pub tour: CameraTour,
}

impl Animations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every animation by `frames` frames.
    pub fn tick(&mut self, frames: u32, camera: &mut Camera, camera_speed: f32) {
        for _ in 0..frames {
            self.boat.tick();
            self.ducks.tick();
            self.arrow.tick();
            self.trees.tick();
            self.plane.tick();
            self.tour.tick(camera, camera_speed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn boat_oscillates_in_400_steps_each_way() {
        let mut boat = BoatOscillation::default();
        for _ in 0..399 {
            boat.tick();
            assert_eq!(boat.phase, BoatPhase::Advancing);
        }
        boat.tick();
        assert_eq!(boat.phase, BoatPhase::Retreating);
        assert_eq!(boat.progress, 2.0);

        for _ in 0..399 {
            boat.tick();
            assert_eq!(boat.phase, BoatPhase::Retreating);
        }
        boat.tick();
        assert_eq!(boat.phase, BoatPhase::Advancing);
        assert_eq!(boat.progress, 0.0);
    }

    #[test]
    fn boat_never_leaves_its_range() {
        let mut boat = BoatOscillation::default();
        for _ in 0..10_000 {
            boat.tick();
            assert!((0.0..=2.0).contains(&boat.progress));
        }
    }

    #[test]
    fn ducks_stop_at_threshold_and_wait_for_trigger() {
        let mut ducks = DuckMigration::default();
        ducks.tick();
        assert_eq!(ducks.progress, 0.0);

        ducks.trigger();
        ducks.tick();
        assert!(!ducks.migrating);
        assert!(ducks.progress <= DuckMigration::THRESHOLD);
        let settled = ducks.progress;

        for _ in 0..100 {
            ducks.tick();
        }
        assert_eq!(ducks.progress, settled);

        ducks.trigger();
        ducks.tick();
        assert_relative_eq!(ducks.progress, settled - DuckMigration::STEP);
    }

    #[test]
    fn arrow_accumulates_and_cancel_resets() {
        let mut arrow = ArrowFlight::default();
        arrow.shoot();
        for _ in 0..37 {
            arrow.tick();
        }
        assert_relative_eq!(arrow.distance, 37.0 * 0.05, epsilon = 1e-4);

        arrow.cancel();
        assert_eq!(arrow.distance, 0.0);
        arrow.tick();
        assert_eq!(arrow.distance, 0.0);
    }

    #[test]
    fn trees_keep_authored_size_until_requested() {
        let mut trees = TreeScaling::default();
        trees.tick();
        assert_eq!(trees.factor(), None);

        trees.grow();
        trees.tick();
        assert_relative_eq!(trees.factor().unwrap(), 1.01);
    }

    #[test]
    fn tree_scale_is_clamped() {
        let mut trees = TreeScaling::default();
        for _ in 0..500 {
            trees.grow();
            trees.tick();
        }
        assert_eq!(trees.factor(), Some(2.0));

        for _ in 0..500 {
            trees.shrink();
            trees.tick();
        }
        assert_eq!(trees.factor(), Some(0.5));
    }

    #[test]
    fn plane_wraps_at_loop_length() {
        let mut plane = PlaneLoop::default();
        plane.tick();
        assert_eq!(plane.progress, 0.0);

        plane.toggle();
        for _ in 0..1_000 {
            plane.tick();
            assert!(plane.progress < PlaneLoop::LENGTH);
        }

        plane.toggle();
        let frozen = plane.progress;
        plane.tick();
        assert_eq!(plane.progress, frozen);
    }

    #[test]
    fn tour_visits_every_leg_and_returns_to_center() {
        let mut camera = Camera::default();
        let mut tour = CameraTour::default();
        tour.start(&mut camera);

        let mut seen = vec![tour.phase];
        for _ in 0..10_000 {
            tour.tick(&mut camera, 0.02);
            if seen.last() != Some(&tour.phase) {
                seen.push(tour.phase);
            }
            if !tour.is_running() {
                break;
            }
        }

        assert_eq!(
            seen,
            vec![
                TourPhase::Forward,
                TourPhase::Right,
                TourPhase::Left,
                TourPhase::Center,
                TourPhase::Idle
            ]
        );
        assert!(camera.position().z <= CameraTour::FORWARD_STOP_Z);
        assert!(camera.position().x >= 0.0 && camera.position().x < 0.02 + 1e-4);
    }

    #[test]
    fn restarting_the_tour_resets_the_camera() {
        let mut camera = Camera::default();
        let mut tour = CameraTour::default();
        tour.start(&mut camera);
        for _ in 0..200 {
            tour.tick(&mut camera, 0.02);
        }
        assert_eq!(tour.phase, TourPhase::Right);

        tour.start(&mut camera);
        assert_eq!(tour.phase, TourPhase::Forward);
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn tick_advances_all_objects_once_per_frame() {
        let mut camera = Camera::default();
        let mut animations = Animations::new();
        animations.arrow.shoot();
        animations.tick(10, &mut camera, 0.02);
        assert_relative_eq!(animations.boat.progress, 0.05, epsilon = 1e-5);
        assert_relative_eq!(animations.arrow.distance, 0.5, epsilon = 1e-5);
        assert_eq!(camera, Camera::default());
    }
}
