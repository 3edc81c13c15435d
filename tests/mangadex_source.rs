use serde_json::json;
use tome::catalog::{Entry, MangaDex, Source, SourceError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn source_for(server: &MockServer) -> MangaDex {
    MangaDex::new(server.uri(), "en".to_string())
}

fn series_entry(id: &str) -> Entry {
    Entry {
        source: "mangadex".into(),
        id: id.into(),
        title: "Some Series".into(),
        detail: String::new(),
    }
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_parses_series_listing() {
    let server = MockServer::start().await;

    let body = json!({
        "data": [
            {
                "id": "manga-1",
                "attributes": {
                    "title": { "en": "Berserk" },
                    "year": 1989,
                    "status": "hiatus"
                }
            },
            {
                "id": "manga-2",
                "attributes": {
                    "title": { "ja": "モンスター" }
                }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/manga"))
        .and(query_param("title", "berserk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let entries = source_for(&server).search("berserk").await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "manga-1");
    assert_eq!(entries[0].title, "Berserk");
    assert_eq!(entries[0].detail, "1989 · hiatus");
    assert_eq!(entries[0].source, "mangadex");
    // No English title: falls back to whatever language exists.
    assert_eq!(entries[1].title, "モンスター");
    assert_eq!(entries[1].detail, "");
}

#[tokio::test]
async fn test_search_maps_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manga"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = source_for(&server).search("x").await.unwrap_err();
    match err {
        SourceError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_maps_malformed_bodies_to_parse_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manga"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = source_for(&server).search("x").await.unwrap_err();
    assert!(matches!(err, SourceError::Parse(_)));
}

// ============================================================================
// Chapter Feed
// ============================================================================

#[tokio::test]
async fn test_chapters_parse_the_feed_in_order() {
    let server = MockServer::start().await;

    let body = json!({
        "data": [
            {
                "id": "ch-1",
                "attributes": { "chapter": "1", "title": "The Black Swordsman", "pages": 52 }
            },
            {
                "id": "ch-2",
                "attributes": { "chapter": "2", "pages": 31 }
            },
            {
                "id": "ch-3",
                "attributes": { "pages": 8 }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/manga/manga-1/feed"))
        .and(query_param("translatedLanguage[]", "en"))
        .and(query_param("order[chapter]", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let chapters = source_for(&server)
        .chapters(&series_entry("manga-1"))
        .await
        .unwrap();

    assert_eq!(chapters.len(), 3);
    assert_eq!(chapters[0].title, "Chapter 1 · The Black Swordsman");
    assert_eq!(chapters[0].detail, "52 pages");
    assert_eq!(chapters[1].title, "Chapter 2");
    assert_eq!(chapters[2].title, "Oneshot");
}

#[tokio::test]
async fn test_chapters_surface_server_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manga/manga-9/feed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .chapters(&series_entry("manga-9"))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Api { status: 500, .. }));
}

// ============================================================================
// Page Resolution
// ============================================================================

#[tokio::test]
async fn test_pages_compose_urls_and_ordered_filenames() {
    let server = MockServer::start().await;

    let body = json!({
        "baseUrl": "https://cdn.example",
        "chapter": {
            "hash": "abc123",
            "data": ["x1.png", "x2.png", "x3.png"]
        }
    });

    Mock::given(method("GET"))
        .and(path("/at-home/server/ch-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let mut chapter = series_entry("ch-1");
    chapter.title = "Chapter 1".into();
    let pages = source_for(&server).pages(&chapter).await.unwrap();

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].url, "https://cdn.example/data/abc123/x1.png");
    assert_eq!(pages[0].filename, "001-x1.png");
    assert_eq!(pages[2].filename, "003-x3.png");
}
