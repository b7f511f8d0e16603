use gammaview_core::{tile_id_of, LogicalPoint, ViewportState, TILE_SIZE};

fn states() -> Vec<ViewportState> {
    let mut out = Vec::new();
    for &(zoom, e_off, t_off) in &[
        (1.0, 0.0, (0, 0)),
        (0.512, 1000.0, (3, 17)),
        (7.25, -42.5, (-130, 255)),
        (0.001, 1.0e6, (1000, -1000)),
    ] {
        out.push(ViewportState {
            x_zoom: zoom,
            y_zoom: zoom * 1.5,
            x_e_offset: -e_off,
            y_e_offset: e_off,
            x_tile_offset: t_off.0,
            y_tile_offset: t_off.1,
            vp_width: 640,
            vp_height: 480,
            ..ViewportState::default()
        });
    }
    out
}

#[test]
fn test_screen_tile_round_trip() {
    for state in states() {
        let m = state.mapper();
        for sx in (-50..700).step_by(7) {
            for sy in (-50..530).step_by(11) {
                let (tx, ty) = m.screen_to_tile(sx, sy);
                assert_eq!(m.tile_to_screen(tx, ty), (sx, sy));
            }
        }
    }
}

#[test]
fn test_screen_data_round_trip_within_one_pixel() {
    for state in states() {
        let m = state.mapper();
        for sx in (0..640).step_by(13) {
            for sy in (0..480).step_by(17) {
                let (bx, by) = m.data_to_screen(m.screen_to_data(sx, sy));
                assert!((bx - sx).abs() <= 1, "x {sx} -> {bx}");
                assert!((by - sy).abs() <= 1, "y {sy} -> {by}");
            }
        }
    }
}

#[test]
fn test_tile_id_matches_floor_division() {
    for pos in -1000..=1000 {
        let expected = (f64::from(pos) / f64::from(TILE_SIZE)).floor();
        assert_eq!(f64::from(tile_id_of(pos)), expected, "pos {pos}");
    }
    assert_eq!(tile_id_of(-1), -1);
    assert_eq!(tile_id_of(-128), -1);
    assert_eq!(tile_id_of(-129), -2);
}

#[test]
fn test_mapper_is_a_snapshot() {
    let mut state = states()[1];
    let mapper = state.mapper();
    let before = mapper.screen_to_data(10, 10);
    state.x_zoom *= 2.0;
    state.x_tile_offset += 50;
    assert_eq!(mapper.screen_to_data(10, 10), before);
    assert_ne!(state.mapper().screen_to_data(10, 10), before);
}

#[test]
fn test_data_to_screen_y_up() {
    let state = states()[0];
    let m = state.mapper();
    let (_, low) = m.data_to_screen(LogicalPoint::new(0.0, 10.0));
    let (_, high) = m.data_to_screen(LogicalPoint::new(0.0, 20.0));
    assert!(high < low);
}
