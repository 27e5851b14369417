use serde::{Deserialize, Serialize};
use tagwalk::reflect::{self, Annotated, Shape, StructSchema};
use tagwalk::source::Sources;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Config {
    http_max_retries: i64,
    elasticsearch_host: String,
}

impl Annotated for Config {
    fn schema() -> StructSchema {
        StructSchema::new("Config")
            .tagged("http_max_retries", Shape::I64, r#"conf:"HTTP_MAX_RETRIES""#)
            .tagged(
                "elasticsearch_host",
                Shape::Str,
                r#"conf:"ELASTICSEARCH_HOST""#,
            )
    }
}

fn main() -> Result<(), tagwalk::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // file defaults -> environment overrides
    let vars = Sources::builder()
        .with_file("demos/defaults.toml", false)
        .with_env()
        .build()?;

    let mut cfg = Config::default();
    reflect::populate(&mut cfg, &vars)?;

    println!(
        "ElasticsearchHost: {}, HttpMaxRetries: {}",
        cfg.elasticsearch_host, cfg.http_max_retries
    );

    Ok(())
}
