use anyhow::Result;
use camino::Utf8PathBuf;
use nodal_editor::config::{EditorConfig, Theme};
use tempfile::tempdir;

fn temp_root(dir: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path")
}

#[test]
fn missing_file_yields_defaults() -> Result<()> {
    let dir = tempdir()?;
    let cfg = EditorConfig::load(&temp_root(&dir).join("absent.json"))?;
    assert_eq!(cfg, EditorConfig::default());
    assert_eq!(cfg.theme, Theme::Light);
    assert_eq!(cfg.log_capacity, 500);
    Ok(())
}

#[test]
fn partial_file_fills_missing_fields() -> Result<()> {
    let dir = tempdir()?;
    let path = temp_root(&dir).join("cfg.json");
    std::fs::write(&path, r#"{"theme": "dark", "workspace": "designs"}"#)?;
    let cfg = EditorConfig::load(&path)?;
    assert_eq!(cfg.theme, Theme::Dark);
    assert_eq!(cfg.workspace, Utf8PathBuf::from("designs"));
    assert_eq!(cfg.window_title, EditorConfig::default().window_title);
    Ok(())
}

#[test]
fn save_then_load() -> Result<()> {
    let dir = tempdir()?;
    let path = temp_root(&dir).join("sub/cfg.json");
    let cfg = EditorConfig {
        log_capacity: 42,
        window_size: [800.0, 600.0],
        ..Default::default()
    };
    cfg.save(&path)?;
    assert_eq!(EditorConfig::load(&path)?, cfg);
    Ok(())
}

#[test]
fn malformed_file_is_an_error() -> Result<()> {
    let dir = tempdir()?;
    let path = temp_root(&dir).join("cfg.json");
    std::fs::write(&path, "{ theme: ")?;
    let err = EditorConfig::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("cfg.json"));
    Ok(())
}
