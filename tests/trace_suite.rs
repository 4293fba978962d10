use backdrop_fx::config::EffectKind;
use backdrop_fx::shader::math::to_rgba8;
use backdrop_fx::sim::{
    rasterize, simulate, tsv_header, tsv_row, write_ppm, Point, PointParseError, TriggerScript,
};
use backdrop_fx::uniforms::{U_ACTIVE, U_CENTER, U_PHASE, U_TIME, U_TOUCH};

const RES: [f32; 2] = [200.0, 200.0];

#[test]
fn ripple_run_ends_once_past_cutoff() {
    let script = TriggerScript::new().tap_at(0, [100.0, 100.0]);
    let records = simulate(EffectKind::Ripple, &script, 240, 60, RES);
    assert_eq!(records.len(), 240);

    let first_idle = records
        .iter()
        .position(|r| !r.active)
        .expect("ripple should finish within 240 frames");
    assert_eq!(first_idle, 91);
    assert!(records[first_idle].uniforms.float(U_TIME) > 1.5);
    assert!(records[first_idle - 1].uniforms.float(U_TIME) <= 1.5);

    // Active flips exactly once and never comes back.
    assert!(records[..first_idle].iter().all(|r| r.active));
    assert!(records[first_idle..].iter().all(|r| !r.active));
    assert!(records[first_idle..]
        .iter()
        .all(|r| r.uniforms.float(U_ACTIVE) == 0.0));

    // Time increases monotonically while running, from exactly zero.
    assert_eq!(records[0].uniforms.float(U_TIME), 0.0);
    for pair in records[..=first_idle].windows(2) {
        assert!(pair[1].uniforms.float(U_TIME) > pair[0].uniforms.float(U_TIME));
    }
    assert!(records
        .iter()
        .all(|r| r.uniforms.float2(U_TOUCH) == [100.0, 100.0]));
}

#[test]
fn ripple_frames_after_fade_are_visually_idle() {
    let script = TriggerScript::new().tap_at(0, [100.0, 100.0]);
    let records = simulate(EffectKind::Ripple, &script, 90, 60, RES);
    // Past 1 s the run is still active but paints only the background.
    let late = records
        .iter()
        .find(|r| r.uniforms.float(U_TIME) >= 1.0)
        .expect("a frame past one second");
    assert!(late.active);
    let px = rasterize(EffectKind::Ripple, &late.uniforms, 20, 20);
    let base = to_rgba8([0.1, 0.12, 0.18]);
    assert!(px.chunks_exact(4).all(|p| p == base));
}

#[test]
fn star_flight_follows_arc_and_ignores_relaunch() {
    let script = TriggerScript::new().launch_at(0).launch_at(60);
    let records = simulate(EffectKind::Star, &script, 300, 60, RES);

    let mid = &records[120];
    assert!(mid.active);
    let phase = mid.uniforms.float(U_PHASE);
    assert!((phase - 2.0 / 3.95).abs() < 1e-3, "phase {phase}");

    let landed = records.iter().position(|r| !r.active).expect("star lands");
    // Frame 237 sits at 3_949_999_842 ns, still short of 3.95 s.
    assert_eq!(landed, 238);
    assert!(records[landed - 1].active);
    let c = records[landed].uniforms.float2(U_CENTER);
    assert!((c[0] - 0.95).abs() < 1e-4 && (c[1] - 0.8).abs() < 1e-4);

    let crest = records[landed / 2].uniforms.float2(U_CENTER);
    assert!(crest[1] < 0.36, "crest y {}", crest[1]);

    for pair in records[..=landed].windows(2) {
        assert!(pair[1].uniforms.float(U_PHASE) >= pair[0].uniforms.float(U_PHASE));
    }
}

#[test]
fn idle_star_publishes_inactive_start_position() {
    let records = simulate(EffectKind::Star, &TriggerScript::new(), 5, 60, RES);
    for r in &records {
        assert!(!r.active);
        assert_eq!(r.uniforms.float(U_PHASE), 0.0);
    }
}

#[test]
fn gradient_time_tracks_frame_clock() {
    let records = simulate(EffectKind::Gradient, &TriggerScript::new(), 61, 60, RES);
    let last = records.last().unwrap();
    assert_eq!(last.t_ns, 60 * 16_666_666);
    assert!((last.uniforms.float(U_TIME) - 1.0).abs() < 1e-3);
    assert!(records.iter().all(|r| r.active));
}

#[test]
fn tsv_rows_match_header_columns() {
    let script = TriggerScript::new().tap_at(0, [3.0, 4.0]);
    let records = simulate(EffectKind::Ripple, &script, 3, 30, RES);
    let header = tsv_header(&records[0]);
    assert_eq!(
        header,
        "frame\tt_ms\tactive\tu_resolution.x\tu_resolution.y\tu_touch.x\tu_touch.y\tu_time\tu_active"
    );
    for r in &records {
        assert_eq!(tsv_row(r).split('\t').count(), header.split('\t').count());
    }
    assert!(tsv_row(&records[0]).starts_with("0\t0.000\t1\t200.00000"));
}

#[test]
fn ppm_snapshot_drops_alpha() {
    let rgba = [1u8, 2, 3, 255, 4, 5, 6, 255];
    let mut out = Vec::new();
    write_ppm(&mut out, &rgba, 2, 1).unwrap();
    assert_eq!(&out[..11], b"P6\n2 1\n255\n");
    assert_eq!(&out[11..], &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn point_parses_x_comma_y() {
    assert_eq!("100,100".parse::<Point>(), Ok(Point([100.0, 100.0])));
    assert_eq!(" 1.5 , 2 ".parse::<Point>(), Ok(Point([1.5, 2.0])));
    assert_eq!(
        "100".parse::<Point>(),
        Err(PointParseError::Shape("100".to_string()))
    );
    assert_eq!(
        "a,1".parse::<Point>(),
        Err(PointParseError::Coordinate("a".to_string()))
    );
    assert!(matches!("inf,1".parse::<Point>(), Err(PointParseError::NotFinite(_))));
    assert_eq!(
        PointParseError::NotFinite(f32::INFINITY).to_string(),
        "coordinate inf is not finite"
    );
}
