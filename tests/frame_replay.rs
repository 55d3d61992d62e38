//! The update step is deterministic: replaying the same actions always
//! produces the same camera, lights and per-object uniforms.

use glade::{
    Action, ActionState, AppConfig, DRAW_ORDER, FrameContext, FrameUniforms, ObjectUniforms,
    TourPhase, Vec2,
};

/// A frame-by-frame input script exercising every animation.
fn script() -> Vec<ActionState> {
    let mut frames = Vec::new();
    let idle = ActionState::default();

    frames.push(idle.clone().with(Action::ShootArrow).with(Action::MigrateDucks));
    frames.push(idle.clone().with(Action::TogglePlane));
    for i in 0..40 {
        let mut frame = idle
            .clone()
            .with(Action::MoveForward)
            .with(Action::RotateLightLeft)
            .with_mouse_delta(Vec2::new(3.0, -(i as f32) * 0.5));
        if i % 2 == 0 {
            frame = frame.with(Action::GrowTrees);
        }
        frames.push(frame);
    }
    frames.push(idle.clone().with(Action::Wireframe));
    frames.push(idle.clone().with(Action::StartTour));
    frames.extend(std::iter::repeat_n(idle.clone(), 200));
    frames.push(idle.clone().with(Action::CancelArrow).with(Action::ShrinkTrees));
    frames.extend(std::iter::repeat_n(idle, 50));
    frames
}

fn replay(config: &AppConfig) -> (FrameContext, FrameUniforms, Vec<ObjectUniforms>) {
    let mut frame = FrameContext::new(config);
    for actions in script() {
        frame.update(&actions);
    }
    let uniforms = frame.frame_uniforms();
    let objects = DRAW_ORDER.iter().map(|&o| frame.object_uniforms(o)).collect();
    (frame, uniforms, objects)
}

#[test]
fn replays_are_bitwise_identical() {
    let config = AppConfig::default();
    let (first_frame, first, first_objects) = replay(&config);
    let (second_frame, second, second_objects) = replay(&config);

    assert_eq!(bytemuck::bytes_of(&first), bytemuck::bytes_of(&second));
    for (a, b) in first_objects.iter().zip(&second_objects) {
        assert_eq!(bytemuck::bytes_of(a), bytemuck::bytes_of(b));
    }
    assert_eq!(first_frame.camera, second_frame.camera);
    assert_eq!(first_frame.animations, second_frame.animations);
    assert_eq!(
        bytemuck::bytes_of(&first_frame.light_marker_uniforms()),
        bytemuck::bytes_of(&second_frame.light_marker_uniforms())
    );
}

#[test]
fn script_changes_the_scene() {
    let config = AppConfig::default();
    let untouched = FrameContext::new(&config);
    let (frame, uniforms, _) = replay(&config);

    assert_ne!(uniforms.view, untouched.frame_uniforms().view);
    assert_ne!(frame.animations.boat.progress, 0.0);
    assert!(frame.animations.plane.looping);
    assert!(!frame.animations.arrow.shooting);
    assert_eq!(frame.lights.angle, 40.0);
}

#[test]
fn camera_tour_runs_to_completion() {
    let mut frame = FrameContext::new(&AppConfig::default());
    frame.update(&ActionState::default().with(Action::StartTour));

    let idle = ActionState::default();
    let mut frames = 0;
    while frame.animations.tour.phase != TourPhase::Idle {
        frame.update(&idle);
        frames += 1;
        assert!(frames < 2000, "tour never finished");
    }

    let position = frame.camera.position();
    assert!(position.x >= 0.0 && position.x < 0.05, "ended at {}", position);
    assert!(position.z <= 1.3);
}
