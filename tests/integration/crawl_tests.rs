//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the real
//! reqwest-backed fetcher through full crawl sessions.

use std::sync::Arc;
use tokio::sync::mpsc;
use wiremock::matchers::{header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wraith::archive::{ArchiveClient, ArchiveError};
use wraith::config::Config;
use wraith::crawler::{HttpFetcher, LinkRecord, SourceKind, Supervisor};
use wraith::output::{write_records, Deduplicator, RecordFormat};

/// Creates a test configuration with a short depth and no timeout
fn create_test_config(max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.threads = 4;
    config.crawler.timeout = -1;
    config
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

/// Crawls the given seed lines and collects every emitted record
async fn crawl(config: &Config, input: &str) -> Vec<LinkRecord> {
    let fetcher = Arc::new(HttpFetcher::new(&config.http).expect("Failed to build fetcher"));
    let supervisor = Supervisor::new(config, fetcher);
    let (tx, mut rx) = mpsc::channel(64);

    let collector = tokio::spawn(async move {
        let mut records = Vec::new();
        while let Some(record) = rx.recv().await {
            records.push(record);
        }
        records
    });

    supervisor
        .run(input.as_bytes(), tx)
        .await
        .expect("Crawl failed");
    collector.await.expect("Collector panicked")
}

#[tokio::test]
async fn test_full_session_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><body>
            <a href="{}/page1">Page 1</a>
            <a href="https://elsewhere.test/">Elsewhere</a>
            <script src="/static/app.js"></script>
            <form action="/login"></form>
            </body></html>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<a href="/page2">Page 2</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(r#"<a href="/page3">Page 3</a>"#))
        .mount(&mock_server)
        .await;

    let records = crawl(&create_test_config(1), &format!("{}/\n", base_url)).await;

    let root = format!("{}/", base_url);
    let page1 = format!("{}/page1", base_url);
    assert_eq!(
        records,
        vec![
            LinkRecord::new(SourceKind::Href, page1.clone(), root.clone()),
            LinkRecord::new(SourceKind::Href, "https://elsewhere.test/", root.clone()),
            LinkRecord::new(SourceKind::Script, format!("{}/static/app.js", base_url), root.clone()),
            LinkRecord::new(SourceKind::Form, format!("{}/login", base_url), root.clone()),
            LinkRecord::new(SourceKind::Href, format!("{}/page2", base_url), page1),
        ]
    );

    // page2 sits beyond the depth limit and the script is not followed
    let requests = mock_server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(paths, vec!["/", "/page1"]);
}

#[tokio::test]
async fn test_body_size_truncation() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut body = String::from(r#"<a href="/early">early</a>"#);
    body.push_str(&" ".repeat(2048));
    body.push_str(r#"<a href="/late">late</a>"#);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(body))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(0);
    config.http.max_size_kb = 1;

    let records = crawl(&config, &format!("{}/\n", base_url)).await;

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/early", base_url).as_str()]);
}

#[tokio::test]
async fn test_disabled_redirects() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/target"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/target"))
        .respond_with(html(r#"<a href="/found">found</a>"#))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/start\n", base_url);

    let mut config = create_test_config(0);
    config.http.disable_redirects = true;
    assert!(crawl(&config, &seed).await.is_empty());

    // Followed redirects report the final page as the origin
    let records = crawl(&create_test_config(0), &seed).await;
    assert_eq!(
        records,
        vec![LinkRecord::new(
            SourceKind::Href,
            format!("{}/found", base_url),
            format!("{}/target", base_url),
        )]
    );
}

#[tokio::test]
async fn test_custom_headers_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "session=abc"))
        .and(header("x-test", "yes"))
        .and(header_regex("user-agent", "^Mozilla/5\\.0 "))
        .respond_with(html(r#"<a href="/private">private</a>"#))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(0);
    config.http.headers = wraith::config::parse_headers("Cookie: session=abc;;X-Test: yes").unwrap();

    let records = crawl(&config, &format!("{}/\n", base_url)).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/private", base_url));
}

#[tokio::test]
async fn test_bare_seed_probes_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let bare = base_url.trim_start_matches("http://").to_string();

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">a</a>"#))
        .mount(&mock_server)
        .await;

    let records = crawl(&create_test_config(0), &format!("{}\n", bare)).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/a", base_url));
}

#[tokio::test]
async fn test_archive_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdx"))
        .and(query_param("url", "*.example.com"))
        .and(query_param("collapse", "urlkey"))
        .and(query_param("filter", "statuscode:200"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "com,example)/ 20200101000000 http://example.com/ text/html 200 AAA 100\n\
             com,example)/old 20200101000000 http://example.com/old text/html 200 BBB 100\n",
        ))
        .mount(&mock_server)
        .await;

    let archive = ArchiveClient::new(reqwest::Client::new(), format!("{}/cdx", mock_server.uri()));
    let urls = archive.lookup("example.com").await.unwrap();

    assert_eq!(urls, vec!["http://example.com/", "http://example.com/old"]);
}

#[tokio::test]
async fn test_archive_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdx"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let archive = ArchiveClient::new(reqwest::Client::new(), format!("{}/cdx", mock_server.uri()));
    let result = archive.lookup("example.com").await;
    assert!(matches!(result, Err(ArchiveError::Status { status: 503, .. })));

    let config = create_test_config(0);
    let fetcher = Arc::new(HttpFetcher::new(&config.http).unwrap());
    let supervisor = Supervisor::new(&config, fetcher).with_archive(archive);
    let (tx, _rx) = mpsc::channel(4);

    let result = supervisor.run("http://example.com/\n".as_bytes(), tx).await;
    assert!(matches!(result, Err(wraith::WraithError::Archive(_))));
}

#[tokio::test]
async fn test_supervisor_end_to_end_with_archive_and_dedup() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/cdx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "key 20200101000000 {}/old text/html 200 AAA 100\n",
            base_url
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(html(r#"<a href="/shared">shared</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/shared">shared</a><form action="/search"></form>"#,
        ))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(0);
    config.output.unique = true;
    config.output.show_source = true;
    config.archive.enabled = true;
    config.archive.endpoint = format!("{}/cdx", base_url);

    let fetcher = Arc::new(HttpFetcher::new(&config.http).unwrap());
    let archive = ArchiveClient::new(fetcher.client().clone(), config.archive.endpoint.clone());
    let supervisor = Supervisor::new(&config, fetcher).with_archive(archive);

    let (tx, rx) = mpsc::channel(config.crawler.threads as usize);
    let consumer = tokio::spawn(async move {
        let mut out = Vec::new();
        let written = write_records(
            rx,
            &mut out,
            RecordFormat::from_config(&config.output),
            Some(Arc::new(Deduplicator::new())),
        )
        .await
        .unwrap();
        (written, String::from_utf8(out).unwrap())
    });

    let report = supervisor
        .run(format!("{}/\n", base_url).as_bytes(), tx)
        .await
        .unwrap();
    let (written, out) = consumer.await.unwrap();

    assert_eq!(report.seeds_read, 1);
    assert_eq!(report.sessions_completed, 2);
    assert_eq!(report.records_emitted, 3);
    assert_eq!(written, 2);
    // The archived page is crawled before the seed itself
    assert_eq!(
        out,
        format!(
            "{base}/shared [source: href]\n{base}/search [source: form]\n",
            base = base_url
        )
    );
}
