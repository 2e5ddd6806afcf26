use super::*;

fn defaults() -> AnimationConfig {
    AnimationConfig {
        duration_ms: 1500,
        pop_out_distance: 0.8,
        lift_height: 0.3,
        viewer_angle_deg: 60.0,
    }
}

#[test]
fn boundary_poses_match_defaults() {
    let cfg = defaults();
    assert_eq!(AnimationConfig::default(), cfg);
    assert_eq!(
        evaluate(0.0, &cfg),
        OverlayPose {
            scale: 0.01,
            depth_offset: 0.0,
            height_offset: 0.1,
            tilt_deg: -90.0,
            opacity: 0.0,
        }
    );
    assert_eq!(
        evaluate(1.0, &cfg),
        OverlayPose {
            scale: 1.0,
            depth_offset: 0.8,
            height_offset: 0.3,
            tilt_deg: -60.0,
            opacity: 1.0,
        }
    );
}

#[test]
fn out_of_range_time_is_clamped() {
    let clip = PopOutClip::new(&defaults());
    assert_eq!(clip.evaluate(-0.5), clip.initial_pose());
    assert_eq!(clip.evaluate(3.0), clip.final_pose());
    assert_eq!(clip.evaluate(f64::NAN), clip.initial_pose());
}

#[test]
fn progress_follows_elapsed_time() {
    let clip = PopOutClip::new(&defaults());
    assert_eq!(clip.progress(Duration::ZERO), 0.0);
    assert!((clip.progress(Duration::from_millis(750)) - 0.5).abs() < 1e-12);
    assert_eq!(clip.progress(Duration::from_millis(1500)), 1.0);
    assert_eq!(clip.progress(Duration::from_secs(9)), 1.0);
    assert_eq!(clip.sample_at(Duration::from_secs(2)), clip.final_pose());
}

#[test]
fn zero_duration_clip_is_complete() {
    let clip = PopOutClip::new(&AnimationConfig {
        duration_ms: 0,
        ..defaults()
    });
    assert_eq!(clip.progress(Duration::ZERO), 1.0);
}

#[test]
fn mid_clip_scale_overshoots_and_opacity_is_half() {
    let clip = PopOutClip::new(&defaults());
    let mid = clip.evaluate(0.5);
    assert!(mid.scale > 1.0);
    assert!((mid.opacity - 0.5).abs() < 1e-12);
    assert!(mid.tilt_deg > -90.0 && mid.tilt_deg < -60.0);
}

#[test]
fn scene_transform_maps_axes() {
    let pose = evaluate(1.0, &defaults());
    let st = pose.scene_transform();
    assert_eq!(st.translation, [0.0, 0.3, 0.8]);
    assert!((st.rotation_x_rad + std::f64::consts::FRAC_PI_3).abs() < 1e-12);
    assert_eq!(st.scale, 1.0);
    assert_eq!(st.opacity, 1.0);
}
