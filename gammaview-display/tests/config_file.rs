use std::io::Write;

use gammaview_core::{Colormap, Error};
use gammaview_display::{LineStyle, View2D, ViewConfig};

#[test]
fn test_config_file_round_trip() {
    let config = ViewConfig {
        colormap: Colormap::Grayscale,
        zoom_step: 1.5,
        cut_style: Some(LineStyle::dashed([10, 20, 30, 255])),
        ..ViewConfig::default()
    };
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config.to_json().unwrap().as_bytes()).unwrap();

    let loaded = ViewConfig::from_file(file.path()).unwrap();
    assert_eq!(loaded, config);
    assert!(View2D::new(loaded).is_ok());
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ViewConfig::from_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::ConfigError(_))));
}
