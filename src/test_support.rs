//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;

use crate::catalog::{Entry, PageRef, Source, SourceError};

/// Builds a deterministic series entry from a title.
pub fn series(title: &str) -> Entry {
    Entry {
        source: String::from("static"),
        id: format!("series-{}", title.to_lowercase().replace(' ', "-")),
        title: title.to_string(),
        detail: String::new(),
    }
}

/// Builds a deterministic chapter entry from a title.
pub fn chapter(title: &str) -> Entry {
    Entry {
        source: String::from("static"),
        id: format!("chapter-{}", title.to_lowercase().replace(' ', "-")),
        title: title.to_string(),
        detail: String::new(),
    }
}

/// A source that answers every request from fixed data.
pub struct StaticSource {
    pub name: String,
    pub results: Vec<Entry>,
    pub chapter_list: Vec<Entry>,
}

impl StaticSource {
    pub fn new(name: &str, results: Vec<Entry>) -> Self {
        Self {
            name: name.to_string(),
            results,
            chapter_list: Vec::new(),
        }
    }
}

#[async_trait]
impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str) -> Result<Vec<Entry>, SourceError> {
        Ok(self.results.clone())
    }

    async fn chapters(&self, _series: &Entry) -> Result<Vec<Entry>, SourceError> {
        Ok(self.chapter_list.clone())
    }

    async fn pages(&self, _chapter: &Entry) -> Result<Vec<PageRef>, SourceError> {
        Ok(Vec::new())
    }
}

/// A source whose every request fails at the network level.
pub struct FailingSource {
    pub name: String,
}

impl FailingSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    fn err(&self) -> SourceError {
        SourceError::Network(String::from("connection timed out"))
    }
}

#[async_trait]
impl Source for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str) -> Result<Vec<Entry>, SourceError> {
        Err(self.err())
    }

    async fn chapters(&self, _series: &Entry) -> Result<Vec<Entry>, SourceError> {
        Err(self.err())
    }

    async fn pages(&self, _chapter: &Entry) -> Result<Vec<PageRef>, SourceError> {
        Err(self.err())
    }
}
