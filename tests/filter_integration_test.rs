//! Integration tests for the built-in filters
//!
//! These tests drive the filters through the registry and the scheduler the
//! way the command line tool does.

use std::sync::Arc;
use zvf_lib::filter::{ChromaTest, DotBlur, MotionCompensate, RainbowDetect, Thresholds};
use zvf_lib::host::{Args, Core, FilterNode, Node, Registry, Scheduler};
use zvf_lib::util::{Rational, Timestamp};

#[path = "common/mod.rs"]
mod common;

use common::*;

fn invoke(function: &str, clip: Node, pairs: &[&str]) -> Node {
    let mut args = Args::new();
    args.set_clip("clip", clip);
    for pair in pairs {
        args.set_parsed(pair).unwrap();
    }
    Registry::builtin().invoke(function, &args).unwrap()
}

// ============================================================================
// dotblur.Blur
// ============================================================================

/// Every sample except the last three of a row is the rounded mean of four
#[test]
fn test_blur_averages_rows() {
    let src = create_gradient_frame(12, 4, 0);
    let expected: Vec<Vec<Vec<u8>>> = (0..3).map(|p| plane_bytes(&src, p)).collect();
    let node = invoke("dotblur.Blur", create_clip(vec![src]), &[]);

    let out = Scheduler::default().get_frame(&node, 0).unwrap();
    for (p, rows) in expected.iter().enumerate() {
        for (y, row) in rows.iter().enumerate() {
            let got = out.plane(p).row(y);
            for x in 0..row.len() - 3 {
                let sum: u16 = row[x..x + 4].iter().map(|&v| u16::from(v)).sum();
                assert_eq!(got[x], ((sum + 2) / 4) as u8, "plane {} ({}, {})", p, x, y);
            }
            assert_eq!(got[row.len() - 3..], row[row.len() - 3..]);
        }
    }
}

#[test]
fn test_blur_keeps_frame_props() {
    let node = invoke("dotblur.Blur", create_clip(vec![create_gradient_frame(8, 2, 7)]), &[]);
    let out = Scheduler::default().get_frame(&node, 0).unwrap();
    assert_eq!(out.props.pts, Timestamp::new(7));
    assert_eq!(out.props.duration, Rational::new(1, 25));
}

#[test]
fn test_blur_is_not_idempotent() {
    let clip = create_clip(vec![create_gradient_frame(16, 2, 0)]);
    let once = invoke("dotblur.Blur", clip, &[]);
    let twice = FilterNode::into_node(DotBlur::new(once.clone()).unwrap());

    let scheduler = Scheduler::default();
    let a = scheduler.get_frame(&once, 0).unwrap();
    let b = scheduler.get_frame(&twice, 0).unwrap();
    assert_ne!(plane_bytes(&a, 0), plane_bytes(&b, 0));
}

#[test]
fn test_blur_flat_frame_unchanged() {
    let src = create_flat_frame(8, 4, 0, [16, 128, 240]);
    let node = invoke("dotblur.Blur", create_clip(vec![src.clone()]), &[]);
    let out = Scheduler::default().get_frame(&node, 0).unwrap();
    for p in 0..3 {
        assert_eq!(plane_bytes(&out, p), plane_bytes(&src, p));
    }
}

// ============================================================================
// rainbowdetect.Detect
// ============================================================================

fn rainbow_clip() -> Node {
    let prev = create_flat_frame(8, 4, 0, [100, 128, 128]);
    let cur = create_frame_444(8, 4, 1, |p, x, y| match (p, x, y) {
        (0, _, _) => 100,
        (1, 2, 1) => 160,
        // change inside the default (5, 20] band is not flagged
        (2, 5, 3) => 140,
        _ => 128,
    });
    create_clip(vec![prev, cur])
}

#[test]
fn test_rainbow_first_frame_is_blank() {
    let node = invoke("rainbowdetect.Detect", rainbow_clip(), &[]);
    let out = Scheduler::default().get_frame(&node, 0).unwrap();
    for p in 0..3 {
        assert!(is_zero_plane(&out, p));
    }
    assert_eq!(out.props.pts, Timestamp::new(0));
}

#[test]
fn test_rainbow_marks_chroma_changes() {
    let node = invoke("rainbowdetect.Detect", rainbow_clip(), &[]);
    let out = Scheduler::default().get_frame(&node, 1).unwrap();

    assert!(is_binary(&out));
    assert_eq!(out.plane(0).get(2, 1), 255);
    assert_eq!(out.plane(0).get(5, 3), 0);
    let marked = out.plane(0).rows().flatten().filter(|&&v| v == 255).count();
    assert_eq!(marked, 1);
    assert!(is_zero_plane(&out, 1));
    assert!(is_zero_plane(&out, 2));
    assert_eq!(out.props.pts, Timestamp::new(1));
}

#[test]
fn test_rainbow_luma_floor() {
    let node = invoke("rainbowdetect.Detect", rainbow_clip(), &["threshY=100"]);
    let out = Scheduler::default().get_frame(&node, 1).unwrap();
    assert!(is_zero_plane(&out, 0));
}

#[test]
fn test_rainbow_band_mode() {
    let filter = RainbowDetect::new(rainbow_clip(), Thresholds::default(), ChromaTest::Band).unwrap();
    let node = FilterNode::into_node(filter);
    let out = Scheduler::default().get_frame(&node, 1).unwrap();

    // unchanged pixels have d = 0 < threshU1 and are flagged in band mode
    assert_eq!(out.plane(0).get(0, 0), 255);
    assert_eq!(out.plane(0).get(2, 1), 255);
    // 12 lies inside [5, 20] for V and 0 < 5 for U, so U flags it
    assert_eq!(out.plane(0).get(5, 3), 255);
}

#[test]
fn test_rainbow_over_blurred_clip() {
    let blurred = invoke("dotblur.Blur", rainbow_clip(), &[]);
    let node = invoke("rainbowdetect.Detect", blurred, &[]);
    let frames = Scheduler::default().render_all(&node).unwrap();
    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|f| is_binary(f)));
}

// ============================================================================
// motiondetect.Estimate / motiondetect.Compensate
// ============================================================================

#[test]
fn test_estimate_passes_first_frame_through() {
    let clip = create_moving_clip(16, 8, 3);
    let upstream = clip.get_frame(0, &Core::default()).unwrap();
    let node = invoke("motiondetect.Estimate", clip, &[]);
    let out = Scheduler::default().get_frame(&node, 0).unwrap();
    assert!(Arc::ptr_eq(&out, &upstream));
}

#[test]
fn test_estimate_marks_moving_pixels() {
    let node = invoke("motiondetect.Estimate", create_moving_clip(16, 8, 3), &[]);
    let out = Scheduler::default().get_frame(&node, 2).unwrap();
    assert!(out.plane(0).rows().flatten().all(|&v| v == 255));
    assert!(is_zero_plane(&out, 1));
    assert!(is_zero_plane(&out, 2));
}

#[test]
fn test_estimate_static_clip() {
    let frames = (0..2).map(|i| create_gradient_frame(8, 8, i)).collect();
    let node = invoke("motiondetect.Estimate", create_clip(frames), &["threshold=0"]);
    let out = Scheduler::default().get_frame(&node, 1).unwrap();
    assert!(is_zero_plane(&out, 0));
}

#[test]
fn test_compensate_mask() {
    let node = invoke("motiondetect.Compensate", create_moving_clip(16, 8, 2), &[]);
    let out = Scheduler::default().get_frame(&node, 1).unwrap();
    assert!(is_binary(&out));
    assert!(out.plane(0).rows().flatten().all(|&v| v == 255));
    assert!(is_zero_plane(&out, 1));
}

#[test]
fn test_compensate_rebuilds_shifted_blocks() {
    let clip = create_moving_clip(16, 8, 2);
    let cur = clip.get_frame(1, &Core::default()).unwrap();
    let filter = MotionCompensate::new(clip, MotionCompensate::DEFAULT_THRESHOLD, true).unwrap();
    let node = FilterNode::into_node(filter);
    let out = Scheduler::default().get_frame(&node, 1).unwrap();

    // content moved one pixel right; every block but the left column has an
    // exact match in the previous frame
    for p in 0..3 {
        for y in 0..8 {
            assert_eq!(out.plane(p).row(y)[4..], cur.plane(p).row(y)[4..], "plane {} row {}", p, y);
        }
    }
    assert_eq!(out.props.pts, Timestamp::new(1));
}

// ============================================================================
// uncross.Filter
// ============================================================================

#[test]
fn test_uncross_is_passthrough() {
    let clip = create_moving_clip(8, 4, 2);
    let upstream = clip.get_frame(1, &Core::default()).unwrap();
    let node = invoke("uncross.Filter", clip, &[]);
    assert_eq!(node.name(), "Uncross");
    let out = Scheduler::default().get_frame(&node, 1).unwrap();
    assert!(Arc::ptr_eq(&out, &upstream));
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_parallel_render_matches_sequential() {
    let node = invoke("motiondetect.Compensate", create_moving_clip(16, 8, 6), &["show=1"]);
    let scheduler = Scheduler::default();

    let parallel = scheduler.render_range(&node, 0..6).unwrap();
    for (n, frame) in parallel.iter().enumerate() {
        let single = scheduler.get_frame(&node, n).unwrap();
        assert_eq!(**frame, *single);
        assert_eq!(frame.props.pts, Timestamp::new(n as i64));
    }
}
