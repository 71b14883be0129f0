use nalgebra::Matrix3;
use upright::homography::transform_point;
use upright::prelude::*;
use upright::{compute_auto_scale, solve_from_guides};

fn approx_pt(p: [f64; 2], q: [f64; 2], tol: f64) -> bool {
    (p[0] - q[0]).abs() < tol && (p[1] - q[1]).abs() < tol
}

#[test]
fn neutral_params_give_identity_on_any_frame() {
    for frame in [
        Frame::new(1, 1),
        Frame::new(640, 480),
        Frame::new(4000, 3000),
        Frame::new(100, 4000),
    ] {
        let h = build_homography(&GeometryParams::default(), frame, true);
        assert_eq!(h, Matrix3::identity(), "frame {frame:?}");
    }
}

#[test]
fn forward_and_backward_compose_to_identity_for_all_strategies() {
    let frame = Frame::new(1600, 1200);
    let samples = [
        [0.0, 0.0],
        [1600.0, 0.0],
        [0.0, 1200.0],
        [800.0, 600.0],
        [321.0, 987.0],
    ];
    for strategy in [
        RotationStrategy::Simple,
        RotationStrategy::Camera,
        RotationStrategy::LensShift,
    ] {
        for (yaw, pitch, roll) in [(0.0, 12.0, 0.0), (-8.0, 4.0, 2.5), (20.0, -15.0, -6.0)] {
            let params = GeometryParams {
                strategy,
                rotation: RotationParams::new(yaw, pitch, roll),
                scale: 6.0,
                shift_x: 12.0,
                shift_y: -7.0,
                ..Default::default()
            };
            let fwd = build_homography(&params, frame, true);
            let bwd = build_homography(&params, frame, false);
            let prod = fwd * bwd;
            for pt in samples {
                let p = transform_point(&prod, pt).unwrap();
                assert!(
                    approx_pt(p, pt, 1e-5),
                    "{strategy:?} ({yaw},{pitch},{roll}) at {pt:?} -> {p:?}"
                );
            }
        }
    }
}

#[test]
fn auto_scale_is_at_least_one_and_covers_corners() {
    let frame = Frame::new(1000, 750);
    for (yaw, pitch, roll) in [(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (-6.0, 14.0, 3.0)] {
        let params = GeometryParams {
            rotation: RotationParams::new(yaw, pitch, roll),
            ..Default::default()
        };
        let inv = build_homography(&params, frame, false);
        let zoom = compute_auto_scale(&inv, frame);
        assert!(zoom >= 1.0);

        let [cx, cy] = frame.center();
        let k = 1.0 / zoom;
        let shrink = Matrix3::new(
            k,
            0.0,
            cx * (1.0 - k),
            0.0,
            k,
            cy * (1.0 - k),
            0.0,
            0.0,
            1.0,
        );
        let scaled = shrink * inv;
        for corner in [
            [0.0, 0.0],
            [frame.w(), 0.0],
            [0.0, frame.h()],
            [frame.w(), frame.h()],
        ] {
            let p = transform_point(&scaled, corner).unwrap();
            assert!(
                p[0] >= -1e-6 && p[0] <= frame.w() + 1e-6 && p[1] >= -1e-6
                    && p[1] <= frame.h() + 1e-6,
                "corner {corner:?} sampled out of bounds: {p:?} (zoom {zoom})"
            );
        }
    }
}

#[test]
fn degenerate_inputs_never_crash() {
    // Empty frames.
    let empty = Frame::new(0, 0);
    let h = build_homography(
        &GeometryParams {
            rotation: RotationParams::new(10.0, 5.0, 1.0),
            ..Default::default()
        },
        empty,
        true,
    );
    assert_eq!(h, Matrix3::identity());
    assert_eq!(compute_auto_scale(&Matrix3::identity(), empty), 1.0);

    let (params, residual) = solve_from_guides(&[Guide::new([0.2, 0.2], [0.8, 0.8])], empty);
    assert!(params.is_neutral());
    assert_eq!(residual, 0.0);

    // Zero-length guide on a real frame.
    let (params, residual) =
        solve_from_guides(&[Guide::new([0.4, 0.4], [0.4, 0.4])], Frame::new(800, 600));
    assert!(params.is_neutral());
    assert_eq!(residual, 0.0);

    // Zero-determinant matrix into the auto-scale solver.
    assert_eq!(
        compute_auto_scale(&Matrix3::zeros(), Frame::new(800, 600)),
        1.0
    );
}

#[test]
fn extreme_angles_stay_finite() {
    let frame = Frame::new(2000, 1500);
    let params = GeometryParams {
        rotation: RotationParams::new(85.0, -85.0, 90.0),
        ..Default::default()
    };
    for forward in [true, false] {
        let h = build_homography(&params, frame, forward);
        assert!(h.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn serialized_params_round_trip() {
    let params = GeometryParams {
        rotation: RotationParams::new(3.0, -4.5, 1.25),
        strategy: RotationStrategy::LensShift,
        shear: 8.0,
        aspect: 1.05,
        scale: 20.0,
        shift_x: -14.0,
        shift_y: 3.0,
        ..Default::default()
    };
    let json = serde_json::to_string(&params).unwrap();
    let back: GeometryParams = serde_json::from_str(&json).unwrap();
    assert_eq!(params, back);
}
