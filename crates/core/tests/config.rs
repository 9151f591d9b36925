use std::io::Write;
use std::path::Path;

use scplint_core::config::{Config, OutputFormat};

#[test]
fn parse_valid_toml() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(
        f,
        r#"
size_max = 6144
minimize = true
detailed = true
recursive = false
output = "yaml"
actions_file = "catalogs/aws_actions.txt"
"#
    )
    .unwrap();

    let cfg = Config::load(f.path()).unwrap();
    assert_eq!(cfg.size_max, Some(6144));
    assert_eq!(cfg.minimize, Some(true));
    assert_eq!(cfg.detailed, Some(true));
    assert_eq!(cfg.recursive, Some(false));
    assert_eq!(cfg.output, Some(OutputFormat::Yaml));
    assert_eq!(
        cfg.actions_file.as_deref(),
        Some(Path::new("catalogs/aws_actions.txt"))
    );
}

#[test]
fn parse_empty_toml_gives_defaults() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "").unwrap();

    let cfg = Config::load(f.path()).unwrap();
    assert_eq!(cfg.size_max, None);
    assert_eq!(cfg.minimize, None);
    assert_eq!(cfg.detailed, None);
    assert_eq!(cfg.recursive, None);
    assert_eq!(cfg.output, None);
    assert!(cfg.actions_file.is_none());
}

#[test]
fn parse_invalid_toml_returns_error() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "this is not valid [ toml {{{{").unwrap();

    assert!(Config::load(f.path()).is_err());
}

#[test]
fn unknown_output_format_is_rejected() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "output = \"markdown\"\n").unwrap();

    assert!(Config::load(f.path()).is_err());
}

#[test]
fn zero_size_max_is_rejected() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "size_max = 0\n").unwrap();

    let err = Config::load(f.path()).unwrap_err();
    assert!(err.to_string().contains("size_max"));
}
