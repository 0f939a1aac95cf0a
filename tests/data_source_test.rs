//! Dataset sources over the bundled demo tables.

mod common;

use clusterhub::adapters::data_sources::DirectoryDataSource;
use clusterhub::domain::errors::DataSourceError;
use clusterhub::domain::models::{AttributeKind, Value};
use clusterhub::domain::ports::DatasetSource;
use clusterhub::infrastructure::arff::parse_arff;

fn demo_root() -> std::path::PathBuf {
    common::demo_path("weather")
        .parent()
        .and_then(|p| p.parent())
        .map(std::path::Path::to_path_buf)
        .unwrap()
}

#[tokio::test]
async fn test_directory_source_reads_demo_tables() {
    let source = DirectoryDataSource::new(demo_root());
    let weather = source.resolve("demo", "weather").await.unwrap();
    assert_eq!(weather.relation(), "weather");
    assert_eq!(weather.num_instances(), 14);
    assert_eq!(weather.num_attributes(), 5);
    assert!(matches!(weather.attributes()[0].kind, AttributeKind::Nominal(ref v) if v.len() == 3));

    let notes = source.resolve("demo", "notes").await.unwrap();
    assert_eq!(notes.instances()[2][1], Value::Missing);
}

#[tokio::test]
async fn test_directory_source_rejects_escape() {
    let source = DirectoryDataSource::new(demo_root());
    assert!(matches!(
        source.resolve("..", "Cargo").await,
        Err(DataSourceError::InvalidReference(_))
    ));
}

#[test]
fn test_weather_render_parse_round_trip() {
    let weather = common::weather();
    let reparsed = parse_arff(&weather.to_string()).unwrap();
    assert_eq!(reparsed, weather);
}
