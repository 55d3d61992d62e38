//! The fixed set of objects that make up the scene.
//!
//! Each [`SceneObject`] knows where its model lives on disk and how to build
//! its model matrix from the current animation state. Both render passes walk
//! [`DRAW_ORDER`].

use glam::{Mat4, Vec3};

use crate::animation::Animations;
use crate::transform::ObjectTransform;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneObject {
    Ground,
    Structures,
    Campsite,
    StaticTrees,
    BucketWater,
    Cat,
    Horse,
    StaticDucks,
    RotatedDuck,
    Lantern,
    Wolf,
    Boat,
    Ducks,
    ScalableTrees,
    Bow,
    Arrow,
    Plane,
}

/// Order objects are drawn in by both the depth and the lit pass.
pub const DRAW_ORDER: [SceneObject; 17] = [
    SceneObject::Ground,
    SceneObject::Structures,
    SceneObject::Campsite,
    SceneObject::StaticTrees,
    SceneObject::BucketWater,
    SceneObject::Cat,
    SceneObject::Horse,
    SceneObject::StaticDucks,
    SceneObject::RotatedDuck,
    SceneObject::Lantern,
    SceneObject::Wolf,
    SceneObject::Boat,
    SceneObject::Ducks,
    SceneObject::ScalableTrees,
    SceneObject::Bow,
    SceneObject::Arrow,
    SceneObject::Plane,
];

/// Every object in the scene rests on the ground plane at this height.
const GROUND_OFFSET: Vec3 = Vec3::new(0.0, -0.5, 0.0);

impl SceneObject {
    /// Index of this object in [`DRAW_ORDER`], used as its uniform slot.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Model file, relative to the asset directory.
    pub fn model_path(self) -> &'static str {
        match self {
            SceneObject::Ground => "models/ground/ground4.obj",
            SceneObject::Structures => "models/buildings/structures.obj",
            SceneObject::Campsite => "models/buildings/campsite.obj",
            SceneObject::StaticTrees => "models/trees/staticTrees.obj",
            SceneObject::BucketWater => "models/ground/bucketWater.obj",
            SceneObject::Cat => "models/cat/cats.obj",
            SceneObject::Horse => "models/horse/horse.obj",
            SceneObject::StaticDucks => "models/duck/staticDucks.obj",
            SceneObject::RotatedDuck => "models/duck/rotateDuck.obj",
            SceneObject::Lantern => "models/lantern/lantern.obj",
            SceneObject::Wolf => "models/cat/wolf.obj",
            SceneObject::Boat => "models/boat/boat.obj",
            SceneObject::Ducks => "models/duck/movingDucks.obj",
            SceneObject::ScalableTrees => "models/trees/scalableTrees.obj",
            SceneObject::Bow => "models/bow and arrow/bow.obj",
            SceneObject::Arrow => "models/bow and arrow/arrow.obj",
            SceneObject::Plane => "models/plane/plane.obj",
        }
    }

    /// Model matrix for this frame.
    pub fn transform(self, animations: &Animations) -> Mat4 {
        let t = ObjectTransform::new();
        let t = match self {
            SceneObject::Ground
            | SceneObject::Structures
            | SceneObject::Campsite
            | SceneObject::StaticTrees
            | SceneObject::BucketWater
            | SceneObject::Horse
            | SceneObject::StaticDucks
            | SceneObject::Wolf => t.translate(GROUND_OFFSET),
            SceneObject::Cat => t
                .rotate(-10.0, Vec3::new(-0.2, 1.2, 1.0))
                .translate(Vec3::new(-1.3, -0.3, 0.0))
                .scale(1.5),
            SceneObject::RotatedDuck => t
                .rotate(-45.0, Vec3::X)
                .translate(Vec3::new(-0.05, -1.55, -0.9)),
            SceneObject::Lantern => t
                .rotate(-5.0, Vec3::Y)
                .translate(Vec3::new(-0.8, -0.6, -1.5))
                .scale(1.5),
            SceneObject::Boat => {
                t.translate(Vec3::new(-animations.boat.progress, -0.45, 2.9))
            }
            SceneObject::Ducks => {
                t.translate(Vec3::new(animations.ducks.progress, -0.5, 0.0))
            }
            SceneObject::ScalableTrees => {
                let t = t.translate(Vec3::new(0.0, -0.6, 0.0));
                match animations.trees.factor() {
                    Some(factor) => t.scale(factor),
                    None => t,
                }
            }
            SceneObject::Bow => t
                .rotate(-5.0, Vec3::Y)
                .translate(Vec3::new(0.8, -0.6, 1.5))
                .scale(1.5),
            SceneObject::Arrow => t
                .rotate(-5.0, Vec3::Y)
                .translate(Vec3::new(0.8, -0.6, 1.5 - animations.arrow.distance))
                .scale(1.5),
            SceneObject::Plane => {
                t.translate(Vec3::new(-animations.plane.progress, -0.5, 2.9))
            }
        };
        t.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slots_follow_draw_order() {
        for (i, object) in DRAW_ORDER.iter().enumerate() {
            assert_eq!(object.slot(), i);
        }
    }

    #[test]
    fn static_objects_rest_on_the_ground() {
        let animations = Animations::new();
        let origin = SceneObject::Horse
            .transform(&animations)
            .transform_point3(Vec3::ZERO);
        assert_eq!(origin, GROUND_OFFSET);
    }

    #[test]
    fn arrow_leaves_the_bow_along_its_axis() {
        let mut animations = Animations::new();
        let bow = SceneObject::Bow.transform(&animations);
        assert_eq!(SceneObject::Arrow.transform(&animations), bow);

        animations.arrow.shoot();
        animations.arrow.tick();
        let tip = SceneObject::Arrow
            .transform(&animations)
            .transform_point3(Vec3::ZERO);
        let rest = bow.transform_point3(Vec3::ZERO);
        assert_relative_eq!(tip.distance(rest), 0.05, epsilon = 1e-5);
    }

    #[test]
    fn boat_and_plane_follow_their_own_progress() {
        let mut animations = Animations::new();
        animations.boat.progress = 1.0;
        animations.plane.progress = 4.0;
        let boat = SceneObject::Boat.transform(&animations).w_axis;
        let plane = SceneObject::Plane.transform(&animations).w_axis;
        assert_eq!(boat.x, -1.0);
        assert_eq!(plane.x, -4.0);
    }

    #[test]
    fn trees_scale_about_their_base() {
        let mut animations = Animations::new();
        animations.trees.grow();
        animations.trees.tick();
        let m = SceneObject::ScalableTrees.transform(&animations);
        assert_relative_eq!(m.x_axis.x, 1.01, epsilon = 1e-6);
        assert_relative_eq!(m.w_axis.y, -0.6, epsilon = 1e-6);
    }
}
