//! Time normalization integration tests.

use framegrab::{FrameGrabError, GrabTime, normalize_time};

// ── Seconds ────────────────────────────────────────────────────────

#[test]
fn seconds_pass_through_unchanged() {
    for seconds in [0.0, 0.04, 1.5, 59.999, 3600.0, 86_399.5] {
        for rate in [23.976, 24.0, 30.0, 60.0] {
            assert_eq!(normalize_time(&GrabTime::Seconds(seconds), rate).unwrap(), seconds);
        }
    }
}

// ── Timecodes ──────────────────────────────────────────────────────

#[test]
fn whole_second_and_hour_timecodes() {
    for rate in [24.0, 25.0, 29.97, 30.0, 50.0] {
        assert_eq!(normalize_time(&"00:00:01:00".into(), rate).unwrap(), 1.0);
        assert_eq!(normalize_time(&"01:00:00:00".into(), rate).unwrap(), 3600.0);
    }
}

#[test]
fn short_forms_count_from_the_right() {
    assert_eq!(normalize_time(&"12".into(), 24.0).unwrap(), 0.5);
    assert_eq!(normalize_time(&"3:06".into(), 24.0).unwrap(), 3.25);
    assert_eq!(normalize_time(&"2:00:00".into(), 25.0).unwrap(), 120.0);
    assert_eq!(normalize_time(&"1:1:1:1".into(), 1.0).unwrap(), 3662.0);
}

#[test]
fn malformed_timecodes_are_rejected() {
    for timecode in ["", "1:2:3:4:5", "001:00", "a:00", "00::00", "1.5", "-1"] {
        let error = normalize_time(&GrabTime::from(timecode), 24.0).unwrap_err();
        assert!(
            matches!(error, FrameGrabError::InvalidTime(_)),
            "{timecode:?} should be invalid"
        );
    }
}

#[test]
fn timecodes_need_a_frame_rate() {
    for rate in [0.0, -24.0, f64::NAN] {
        assert!(normalize_time(&"00:00:01:00".into(), rate).is_err());
    }
}
