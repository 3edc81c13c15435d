//! MangaDex source implementation.
//!
//! Three endpoints of the public REST API:
//! - `GET /manga?title=…` for search
//! - `GET /manga/{id}/feed` for the chapter list
//! - `GET /at-home/server/{id}` to resolve a chapter's page URLs

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;

use crate::catalog::{Entry, PageRef, Source, SourceError};

const SEARCH_LIMIT: u32 = 40;
const FEED_LIMIT: u32 = 500;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Deserialize, Debug)]
struct MangaListResponse {
    data: Vec<MangaItem>,
}

#[derive(Deserialize, Debug)]
struct MangaItem {
    id: String,
    attributes: MangaAttributes,
}

#[derive(Deserialize, Debug)]
struct MangaAttributes {
    #[serde(default)]
    title: HashMap<String, String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize, Debug)]
struct FeedResponse {
    data: Vec<ChapterItem>,
}

#[derive(Deserialize, Debug)]
struct ChapterItem {
    id: String,
    attributes: ChapterAttributes,
}

#[derive(Deserialize, Debug)]
struct ChapterAttributes {
    #[serde(default)]
    chapter: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    pages: u32,
}

#[derive(Deserialize, Debug)]
struct AtHomeResponse {
    #[serde(rename = "baseUrl")]
    base_url: String,
    chapter: AtHomeChapter,
}

#[derive(Deserialize, Debug)]
struct AtHomeChapter {
    hash: String,
    data: Vec<String>,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Picks a display title: preferred language first, then whatever exists.
fn pick_title(titles: &HashMap<String, String>, language: &str) -> String {
    titles
        .get(language)
        .or_else(|| titles.get("en"))
        .or_else(|| titles.values().next())
        .cloned()
        .unwrap_or_else(|| String::from("Untitled"))
}

fn series_detail(attrs: &MangaAttributes) -> String {
    match (attrs.year, attrs.status.as_deref()) {
        (Some(year), Some(status)) => format!("{year} · {status}"),
        (Some(year), None) => year.to_string(),
        (None, Some(status)) => status.to_string(),
        (None, None) => String::new(),
    }
}

fn chapter_title(attrs: &ChapterAttributes) -> String {
    match (attrs.chapter.as_deref(), attrs.title.as_deref()) {
        (Some(number), Some(name)) if !name.is_empty() => {
            format!("Chapter {number} · {name}")
        }
        (Some(number), _) => format!("Chapter {number}"),
        (None, Some(name)) if !name.is_empty() => name.to_string(),
        _ => String::from("Oneshot"),
    }
}

// ============================================================================
// Source Implementation
// ============================================================================

pub struct MangaDex {
    base_url: String,
    language: String,
    client: reqwest::Client,
}

impl MangaDex {
    pub fn new(base_url: String, language: String) -> Self {
        Self {
            base_url,
            language,
            client: reqwest::Client::new(),
        }
    }

    /// Issues a GET and decodes the JSON body, mapping failures onto
    /// `SourceError` variants.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Source for MangaDex {
    fn name(&self) -> &str {
        "mangadex"
    }

    async fn search(&self, query: &str) -> Result<Vec<Entry>, SourceError> {
        let limit = SEARCH_LIMIT.to_string();
        let body: MangaListResponse = self
            .get_json(
                format!("{}/manga", self.base_url),
                &[("title", query), ("limit", limit.as_str())],
            )
            .await?;

        info!("mangadex search '{}': {} series", query, body.data.len());

        Ok(body
            .data
            .into_iter()
            .map(|item| Entry {
                source: self.name().to_string(),
                id: item.id,
                title: pick_title(&item.attributes.title, &self.language),
                detail: series_detail(&item.attributes),
            })
            .collect())
    }

    async fn chapters(&self, series: &Entry) -> Result<Vec<Entry>, SourceError> {
        let limit = FEED_LIMIT.to_string();
        let body: FeedResponse = self
            .get_json(
                format!("{}/manga/{}/feed", self.base_url, series.id),
                &[
                    ("limit", limit.as_str()),
                    ("order[chapter]", "asc"),
                    ("translatedLanguage[]", self.language.as_str()),
                ],
            )
            .await?;

        info!("mangadex feed '{}': {} chapters", series.title, body.data.len());

        Ok(body
            .data
            .into_iter()
            .map(|item| {
                let detail = format!("{} pages", item.attributes.pages);
                Entry {
                    source: self.name().to_string(),
                    id: item.id,
                    title: chapter_title(&item.attributes),
                    detail,
                }
            })
            .collect())
    }

    async fn pages(&self, chapter: &Entry) -> Result<Vec<PageRef>, SourceError> {
        let body: AtHomeResponse = self
            .get_json(
                format!("{}/at-home/server/{}", self.base_url, chapter.id),
                &[],
            )
            .await?;

        Ok(body
            .chapter
            .data
            .iter()
            .enumerate()
            .map(|(i, file)| PageRef {
                url: format!("{}/data/{}/{}", body.base_url, body.chapter.hash, file),
                filename: format!("{:03}-{}", i + 1, file),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_title_prefers_configured_language() {
        let mut titles = HashMap::new();
        titles.insert("en".to_string(), "English".to_string());
        titles.insert("ja".to_string(), "日本語".to_string());
        assert_eq!(pick_title(&titles, "ja"), "日本語");
        assert_eq!(pick_title(&titles, "fr"), "English");
        assert_eq!(pick_title(&HashMap::new(), "en"), "Untitled");
    }

    #[test]
    fn test_chapter_title_formats() {
        let attrs = ChapterAttributes {
            chapter: Some("12".into()),
            title: Some("The Bridge".into()),
            pages: 20,
        };
        assert_eq!(chapter_title(&attrs), "Chapter 12 · The Bridge");

        let bare = ChapterAttributes {
            chapter: Some("3".into()),
            title: None,
            pages: 20,
        };
        assert_eq!(chapter_title(&bare), "Chapter 3");

        let oneshot = ChapterAttributes {
            chapter: None,
            title: None,
            pages: 20,
        };
        assert_eq!(chapter_title(&oneshot), "Oneshot");
    }

    #[test]
    fn test_series_detail_handles_missing_fields() {
        let attrs = MangaAttributes {
            title: HashMap::new(),
            year: Some(1997),
            status: Some("completed".into()),
        };
        assert_eq!(series_detail(&attrs), "1997 · completed");

        let empty = MangaAttributes {
            title: HashMap::new(),
            year: None,
            status: None,
        };
        assert_eq!(series_detail(&empty), "");
    }
}
