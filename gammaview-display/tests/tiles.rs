use gammaview_core::{
    Axis, BoundingBox, Colormap, Cut, DenseMatrix, Error, LogicalPoint, MatrixSource, Result,
    TileId, ZScale,
};
use gammaview_display::{
    CutId, DisplayCut, LineStyle, Raster, RenderContext, StyleRegistry, TileCache, View2D,
    ViewConfig, ViewportController,
};

fn config() -> ViewConfig {
    ViewConfig {
        borders: gammaview_core::Borders::default(),
        ..ViewConfig::default()
    }
}

fn controller() -> ViewportController {
    let mut c = ViewportController::new(&config());
    c.layout(512, 512).unwrap();
    c.set_domain(BoundingBox::new(0.0, 0.0, 1000.0, 1000.0)).unwrap();
    c.zoom_full().unwrap();
    c
}

fn matrix() -> DenseMatrix {
    let axis = Axis::new(0.0, 1000.0, 1000).unwrap();
    DenseMatrix::from_fn(axis, axis, |x, y| if (x - y).abs() < 5.0 { 100.0 } else { 1.0 }).unwrap()
}

/// A matrix with one unreadable bin.
struct BrokenBin {
    matrix: DenseMatrix,
    bad: (usize, usize),
}

impl MatrixSource for BrokenBin {
    fn x_axis(&self) -> Axis {
        self.matrix.x_axis()
    }

    fn y_axis(&self) -> Axis {
        self.matrix.y_axis()
    }

    fn bin_content(&self, bx: usize, by: usize) -> Result<f64> {
        if (bx, by) == self.bad {
            return Err(Error::DataSourceUnavailable(format!("bin ({bx}, {by}) is unreadable")));
        }
        self.matrix.bin_content(bx, by)
    }

    fn maximum(&self) -> f64 {
        self.matrix.maximum()
    }
}

fn context<'a>(
    c: &ViewportController,
    source: &'a dyn MatrixSource,
    cuts: &'a [DisplayCut],
    styles: &'a StyleRegistry,
) -> RenderContext<'a> {
    RenderContext {
        mapper: c.mapper(),
        z_scale: ZScale::for_maximum(source.maximum(), true),
        colormap: Colormap::Spectrum,
        source: Some(source),
        cuts,
        markers: &[],
        zoom_markers: &[],
        styles,
        overlay_generation: 0,
    }
}

#[test]
fn test_top_left_of_tile_zero_after_zoom_full() {
    let c = controller();
    let m = c.mapper();
    let (sx, sy) = m.tile_screen_origin(TileId::new(0, 0)).unwrap();
    assert_eq!((sx, sy), (0, 0));
    let p = m.screen_to_data(sx, sy);
    assert!((p.x - 0.0).abs() < 1e-9);
    assert!((p.y - 1000.0).abs() < 1e-9);
    assert_eq!(c.visible_tiles().len(), 16);
}

#[test]
fn test_weed_keeps_exactly_visible_requested_tiles() {
    let mut c = controller();
    let (source, styles) = (matrix(), StyleRegistry::new());
    let mut cache = TileCache::new();

    let before = c.visible_tiles();
    for id in before.iter() {
        cache
            .get_tile(id.x(), id.y(), &context(&c, &source, &[], &styles))
            .unwrap();
    }
    assert_eq!(cache.len(), 16);

    c.shift_offset(-300, 140).unwrap();
    let after = c.visible_tiles();
    let removed = cache.weed_tiles(&after);

    let mut expected: Vec<TileId> = before.iter().filter(|id| after.contains(*id)).collect();
    expected.sort_unstable();
    assert_eq!(cache.ids(), expected);
    assert_eq!(removed, 16 - expected.len());
    assert_eq!(cache.stats().evictions, removed as u64);

    // Panning keeps the remaining tiles valid.
    let renders = cache.stats().renders;
    for id in &expected {
        cache
            .get_tile(id.x(), id.y(), &context(&c, &source, &[], &styles))
            .unwrap();
    }
    assert_eq!(cache.stats().renders, renders);
}

#[test]
fn test_flush_then_get_renders_again() {
    let c = controller();
    let (source, styles) = (matrix(), StyleRegistry::new());
    let ctx = context(&c, &source, &[], &styles);
    let mut cache = TileCache::new();
    let first = cache.get_tile(1, 1, &ctx).unwrap().clone();
    assert_eq!(cache.flush_tiles(), 1);
    assert!(cache.is_empty());
    let second = cache.get_tile(1, 1, &ctx).unwrap().clone();
    assert_eq!(cache.stats().renders, 2);
    assert_eq!(first, second);
}

#[test]
fn test_zoom_around_keeps_cursor_point() {
    for &(sx, sy) in &[(0, 0), (37, 411), (256, 256), (511, 3)] {
        for &(fx, fy) in &[(2.0, 2.0), (0.5, 0.5), (1.25, 3.0), (7.0, 0.1)] {
            let mut c = controller();
            let anchor = c.mapper().screen_to_data(sx, sy);
            c.zoom_around((sx, sy), fx, fy).unwrap();
            let (bx, by) = c.mapper().data_to_screen(anchor);
            assert!((bx - sx).abs() <= 1, "x {sx} -> {bx} for ({fx}, {fy})");
            assert!((by - sy).abs() <= 1, "y {sy} -> {by} for ({fx}, {fy})");
        }
    }
}

#[test]
fn test_later_cut_draws_on_top() {
    let c = controller();
    let source = matrix();
    let mut styles = StyleRegistry::new();
    let red = [255, 0, 0, 255];
    let white = [255, 255, 255, 255];
    // Both cuts share the edge from (10, 990) to (100, 990).
    let a = Cut::from_pairs(&[(10.0, 990.0), (100.0, 990.0), (100.0, 900.0)], false).unwrap();
    let b = Cut::from_pairs(&[(10.0, 990.0), (100.0, 990.0), (10.0, 900.0)], false).unwrap();
    let cuts = vec![
        DisplayCut {
            id: CutId(0),
            cut: a,
            style: styles.register(LineStyle::solid(red)),
        },
        DisplayCut {
            id: CutId(1),
            cut: b,
            style: styles.register(LineStyle::solid(white)),
        },
    ];
    let tile = TileCache::render_tile(TileId::new(0, 0), &context(&c, &source, &cuts, &styles))
        .unwrap();
    let (x, y) = c.mapper().data_to_screen(LogicalPoint::new(50.0, 990.0));
    assert_eq!(tile.pixel(x, y), Some(white));

    let reversed: Vec<DisplayCut> = cuts.iter().rev().cloned().collect();
    let tile = TileCache::render_tile(
        TileId::new(0, 0),
        &context(&c, &source, &reversed, &styles),
    )
    .unwrap();
    assert_eq!(tile.pixel(x, y), Some(red));
}

#[test]
fn test_view_redraw_matches_tiles() {
    let mut view = View2D::new(config()).unwrap();
    view.layout(512, 512).unwrap();
    view.set_matrix(Box::new(matrix())).unwrap();
    let mut frame = Raster::try_new(512, 512, [0, 0, 0, 255]).unwrap();
    view.do_redraw(&mut frame);
    let tile = view.get_tile(1, 2).unwrap().clone();
    assert_eq!(frame.pixel(128 + 5, 256 + 7), tile.pixel(5, 7));
}

#[test]
fn test_unreadable_bin_caches_nothing() {
    let c = controller();
    let styles = StyleRegistry::new();
    // Pixel (52, 51) of tile (0, 0) samples bin (101, 900).
    let broken = BrokenBin {
        matrix: matrix(),
        bad: (101, 900),
    };
    let healthy = matrix();
    let mut cache = TileCache::new();

    let result = cache.get_tile(0, 0, &context(&c, &broken, &[], &styles));
    assert!(matches!(result, Err(Error::DataSourceUnavailable(_))));
    assert!(cache.is_empty());
    assert_eq!(cache.stats().renders, 0);

    // Other tiles of the same source still render.
    cache
        .get_tile(2, 2, &context(&c, &broken, &[], &styles))
        .unwrap();
    assert_eq!(cache.len(), 1);

    let tile = cache
        .get_tile(0, 0, &context(&c, &healthy, &[], &styles))
        .unwrap()
        .clone();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().renders, 2);
    assert_eq!(
        tile,
        TileCache::render_tile(TileId::new(0, 0), &context(&c, &healthy, &[], &styles)).unwrap()
    );
}

#[test]
fn test_view_retries_failed_tile() {
    let mut view = View2D::new(config()).unwrap();
    view.layout(512, 512).unwrap();
    view.set_matrix(Box::new(BrokenBin {
        matrix: matrix(),
        bad: (101, 900),
    }))
    .unwrap();
    let mut frame = Raster::try_new(512, 512, [0, 0, 0, 255]).unwrap();
    let stats = view.do_redraw(&mut frame);
    assert_eq!((stats.tiles, stats.placeholders), (15, 1));
    assert_eq!(view.cached_tiles(), 15);

    let stats = view.do_redraw(&mut frame);
    assert_eq!(stats.placeholders, 1);
    assert_eq!(view.cache_stats().hits, 15);
}

#[test]
fn test_oversized_raster_is_resource_exhaustion() {
    for (w, h) in [(u32::MAX, u32::MAX), (u32::MAX, 1 << 20)] {
        let err = Raster::try_new(w, h, [0, 0, 0, 255]).unwrap_err();
        assert!(matches!(err, Error::ResourceExhaustion { .. }), "{w}x{h}: {err}");
    }
}
