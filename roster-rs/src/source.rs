//! Provides the sources from which payloads are fetched.
//!
//! A [PayloadSource] hands out the raw JSON payload which is then
//! [normalized](crate::normalize) into a batch. Fetching is the only suspension point of the
//! whole engine, everything downstream operates synchronously.
//!
//! Two sources are provided: [FileSource] reads a JSON file from disk, [StaticSource] hands out
//! a fixed payload, which is handy for tests and demos. Network transports are expected to be
//! provided by the embedding application.
//!
//! # Example
//! ```
//! # use roster::source::{PayloadSource, StaticSource};
//! # use serde_json::json;
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let source = StaticSource::new(json!([{ "name": "Asha" }]));
//!
//! assert_eq!(source.fetch().await?, json!([{ "name": "Asha" }]));
//! assert_eq!(source.to_string(), "static payload");
//! # Ok(())
//! # }
//! ```
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use anyhow::Context;
use serde_json::Value;

/// Describes the API of a payload source.
#[async_trait::async_trait]
pub trait PayloadSource: Display + Send + Sync {
    /// Fetches the current payload.
    async fn fetch(&self) -> anyhow::Result<Value>;
}

/// Reads the payload from a JSON file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a new source which reads the given file on each fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl Display for FileSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "file {}", self.path.display())
    }
}

#[async_trait::async_trait]
impl PayloadSource for FileSource {
    async fn fetch(&self) -> anyhow::Result<Value> {
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Cannot read {}.", self.path.display()))?;

        serde_json::from_str(data.as_str())
            .with_context(|| format!("Cannot parse the JSON data in {}.", self.path.display()))
    }
}

/// Hands out a fixed payload.
pub struct StaticSource {
    payload: Value,
}

impl StaticSource {
    /// Creates a new source which always yields the given payload.
    pub fn new(payload: Value) -> Self {
        StaticSource { payload }
    }
}

impl Display for StaticSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "static payload")
    }
}

#[async_trait::async_trait]
impl PayloadSource for StaticSource {
    async fn fetch(&self) -> anyhow::Result<Value> {
        Ok(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::source::{FileSource, PayloadSource};
    use serde_json::json;

    #[test]
    fn files_are_read_and_parsed() {
        crate::testing::test_async(async {
            let path = std::env::temp_dir().join("roster-source-test.json");
            tokio::fs::write(&path, r#"{ "data": [["Asha"]] }"#)
                .await
                .unwrap();

            let payload = FileSource::new(&path).fetch().await.unwrap();
            assert_eq!(payload, json!({ "data": [["Asha"]] }));

            let _ = tokio::fs::remove_file(&path).await;
        });
    }

    #[test]
    fn missing_or_broken_files_report_an_error() {
        crate::testing::test_async(async {
            let missing = FileSource::new("/this/file/does/not/exist.json");
            let error = missing.fetch().await.unwrap_err();
            assert_eq!(error.to_string().starts_with("Cannot read"), true);

            let path = std::env::temp_dir().join("roster-source-broken.json");
            tokio::fs::write(&path, "{ not json").await.unwrap();
            let error = FileSource::new(&path).fetch().await.unwrap_err();
            assert_eq!(error.to_string().starts_with("Cannot parse"), true);

            let _ = tokio::fs::remove_file(&path).await;
        });
    }
}
