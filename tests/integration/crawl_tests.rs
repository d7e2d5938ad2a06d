//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock catalog sources and run the
//! full crawl cycle end-to-end, checking the JSON dataset that lands on disk.

use handset_catalog::config::{Config, FlushMode, SourceKind};
use handset_catalog::crawler::run_crawl;
use handset_catalog::CatalogError;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECORD_KEYS: [&str; 14] = [
    "id",
    "brand",
    "model",
    "slug",
    "release_date",
    "status",
    "price",
    "currency",
    "display",
    "platform",
    "memory",
    "camera",
    "battery",
    "images",
];

/// Creates a test configuration pointed at the mock server
fn create_test_config(kind: SourceKind, base_url: &str, output: &Path) -> Config {
    let mut config = Config::default();
    config.source.kind = kind;
    config.source.base_url = base_url.to_string();
    config.crawler.throttle_ms = 0;
    config.crawler.timeout_secs = 5;
    config.output.path = output.to_string_lossy().into_owned();
    config
}

fn output_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("phones.json")
}

fn read_dataset(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).expect("dataset should exist");
    serde_json::from_str(&text).expect("dataset should be a JSON array")
}

fn ids(dataset: &[Value]) -> Vec<&str> {
    dataset.iter().filter_map(|r| r["id"].as_str()).collect()
}

fn api_detail(id: &str, brand: &str) -> Value {
    json!({
        "data": {
            "id": id,
            "brand": brand,
            "model": id.to_uppercase(),
            "release_date": "2024-02-01",
            "specifications": [
                {"title": "Display", "specs": [
                    {"key": "Type", "value": "OLED, 120Hz"},
                    {"key": "Size", "value": "6.1 inches"}
                ]},
                {"title": "Battery", "specs": [
                    {"key": "Capacity", "value": "5000 mAh"}
                ]}
            ]
        }
    })
}

async fn mount_brands(server: &MockServer, brands: Value) {
    Mock::given(method("GET"))
        .and(path("/brands"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brands))
        .mount(server)
        .await;
}

async fn mount_listing_page(server: &MockServer, brand: &str, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/brands/{}", brand)))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_details(server: &MockServer, brand: &str, phones: &[&str]) {
    for phone in phones {
        Mock::given(method("GET"))
            .and(path(format!("/phones/{}", phone)))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_detail(phone, brand)))
            .mount(server)
            .await;
    }
}

fn stubs(phones: &[&str]) -> Vec<Value> {
    phones
        .iter()
        .map(|p| json!({"slug": p, "model": p.to_uppercase()}))
        .collect()
}

#[tokio::test]
async fn test_full_api_crawl_with_failed_detail() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    mount_brands(&server, json!({"data": [{"name": "Acme", "slug": "acme"}]})).await;
    mount_listing_page(
        &server,
        "acme",
        1,
        json!({"data": stubs(&["a1", "a2", "a3"]), "meta": {"current_page": 1, "last_page": 2}}),
    )
    .await;
    mount_listing_page(
        &server,
        "acme",
        2,
        json!({"data": stubs(&["a4", "a5"]), "meta": {"current_page": 2, "last_page": 2}}),
    )
    .await;
    mount_details(&server, "Acme", &["a1", "a2", "a4", "a5"]).await;
    Mock::given(method("GET"))
        .and(path("/phones/a3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(SourceKind::Api, &server.uri(), &output);
    let stats = run_crawl(config).await.expect("crawl should succeed");

    assert_eq!(stats.records_written, 4);
    assert_eq!(stats.details_failed, 1);
    assert_eq!(stats.pages_fetched, 2);

    let dataset = read_dataset(&output);
    assert_eq!(ids(&dataset), vec!["a1", "a2", "a4", "a5"]);

    for record in &dataset {
        let object = record.as_object().unwrap();
        for key in RECORD_KEYS {
            assert!(object.contains_key(key), "record missing {}", key);
        }
        assert_eq!(record["display"]["refresh_rate"], "120Hz");
        assert_eq!(record["battery"]["capacity"], "5000 mAh");
        assert_eq!(record["platform"]["os"], Value::Null);
        assert_eq!(record["camera"]["rear"], json!([]));
    }
}

#[tokio::test]
async fn test_pagination_stops_at_explicit_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    mount_brands(&server, json!([{"name": "Acme", "slug": "acme"}])).await;
    mount_listing_page(
        &server,
        "acme",
        1,
        json!({"phones": stubs(&["a1"]), "next_page": 2}),
    )
    .await;
    mount_listing_page(
        &server,
        "acme",
        2,
        json!({"phones": stubs(&["a2"]), "next_page": null}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/brands/acme"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    mount_details(&server, "Acme", &["a1", "a2"]).await;

    let config = create_test_config(SourceKind::Api, &server.uri(), &output);
    run_crawl(config).await.unwrap();

    assert_eq!(ids(&read_dataset(&output)), vec!["a1", "a2"]);
}

#[tokio::test]
async fn test_pagination_stops_at_empty_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    mount_brands(&server, json!(["Acme"])).await;
    mount_listing_page(&server, "acme", 1, json!(stubs(&["a1", "a2"]))).await;
    mount_listing_page(&server, "acme", 2, json!([])).await;
    mount_details(&server, "Acme", &["a1", "a2"]).await;

    let config = create_test_config(SourceKind::Api, &server.uri(), &output);
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_written, 2);
}

#[tokio::test]
async fn test_link_pagination_visits_each_page_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    mount_brands(&server, json!([{"name": "Acme", "slug": "acme"}])).await;
    mount_listing_page(
        &server,
        "acme",
        1,
        json!({"data": stubs(&["a1"]), "links": {"next": "/brands/acme?page=2"}}),
    )
    .await;
    mount_listing_page(&server, "acme", 2, json!({"data": stubs(&["a2"])})).await;
    Mock::given(method("GET"))
        .and(path("/brands/acme"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    for phone in ["a1", "a2"] {
        Mock::given(method("GET"))
            .and(path(format!("/phones/{}", phone)))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_detail(phone, "Acme")))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = create_test_config(SourceKind::Api, &server.uri(), &output);
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.stubs_seen, 2);
    assert_eq!(ids(&read_dataset(&output)), vec!["a1", "a2"]);
}

#[tokio::test]
async fn test_failing_brand_does_not_stop_others() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    mount_brands(
        &server,
        json!([
            {"name": "One", "slug": "one"},
            {"name": "Two", "slug": "two"},
            {"name": "Three", "slug": "three"}
        ]),
    )
    .await;
    mount_listing_page(&server, "one", 1, json!({"data": stubs(&["o1"]), "next_page": null})).await;
    Mock::given(method("GET"))
        .and(path("/brands/two"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing_page(
        &server,
        "three",
        1,
        json!({"data": stubs(&["h1", "h2"]), "next_page": null}),
    )
    .await;
    mount_details(&server, "One", &["o1"]).await;
    mount_details(&server, "Three", &["h1", "h2"]).await;

    let config = create_test_config(SourceKind::Api, &server.uri(), &output);
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.brands_seen, 3);
    assert_eq!(stats.brands_failed, 1);

    let dataset = read_dataset(&output);
    assert_eq!(ids(&dataset), vec!["o1", "h1", "h2"]);
    assert_eq!(dataset[1]["brand"], "Three");
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    Mock::given(method("GET"))
        .and(path("/brands"))
        .and(header("authorization", "Bearer sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(SourceKind::Api, &server.uri(), &output);
    config.source.api_token = Some("sekrit".to_string());

    let stats = run_crawl(config).await.expect("authorized request should succeed");
    assert_eq!(stats.records_written, 0);
    assert_eq!(read_dataset(&output), Vec::<Value>::new());
}

#[tokio::test]
async fn test_unreachable_source_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    Mock::given(method("GET"))
        .and(path("/brands"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(SourceKind::Api, &server.uri(), &output);
    let result = run_crawl(config).await;

    assert!(matches!(result, Err(CatalogError::SourceUnreachable(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_duplicates_across_brands_and_per_brand_flush() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    mount_brands(
        &server,
        json!([{"name": "One", "slug": "one"}, {"name": "Two", "slug": "two"}]),
    )
    .await;
    mount_listing_page(&server, "one", 1, json!({"data": stubs(&["x", "o1"]), "next_page": null})).await;
    mount_listing_page(&server, "two", 1, json!({"data": stubs(&["t1", "x"]), "next_page": null})).await;
    mount_details(&server, "One", &["x", "o1", "t1"]).await;

    let mut config = create_test_config(SourceKind::Api, &server.uri(), &output);
    config.output.flush = FlushMode::PerBrand;
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.records_collected, 4);
    assert_eq!(stats.duplicates_dropped, 1);
    assert_eq!(ids(&read_dataset(&output)), vec!["x", "o1", "t1"]);
}

#[tokio::test]
async fn test_full_html_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    let html = |body: &str| {
        ResponseTemplate::new(200)
            .set_body_string(format!("<html><body>{}</body></html>", body))
            .insert_header("content-type", "text/html")
    };

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<div class="brandmenu-v2"><ul><li><a href="acme-phones-1.php">Acme</a></li></ul></div>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme-phones-1.php"))
        .respond_with(html(
            r#"<div class="makers"><ul>
                <li><a href="acme_rocket-101.php"><img src="/thumbs/rocket.jpg"><strong><span>Rocket</span></strong></a></li>
                <li><a href="acme_comet-102.php"><strong><span>Comet</span></strong></a></li>
            </ul></div>
            <a class="pages-next" href="acme-phones-f-1-0-p2.php">Next</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme-phones-f-1-0-p2.php"))
        .respond_with(html(
            r#"<div class="makers"><ul>
                <li><a href="acme_nova-103.php"><strong><span>Nova</span></strong></a></li>
            </ul></div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    for (slug, name) in [
        ("acme_rocket-101", "Acme Rocket"),
        ("acme_comet-102", "Acme Comet"),
        ("acme_nova-103", "Acme Nova"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/{}.php", slug)))
            .respond_with(html(&format!(
                r#"<h1 class="specs-phone-name-title">{}</h1>
                <div id="specs-list"><table>
                    <tr><th>Platform</th><td class="ttl">OS</td><td class="nfo">Android 14</td></tr>
                    <tr><td class="ttl">Chipset</td><td class="nfo">Snapdragon 8 Gen 3</td></tr>
                </table><table>
                    <tr><th>Memory</th><td class="ttl">Internal</td><td class="nfo">256GB 12GB RAM</td></tr>
                </table></div>"#,
                name
            )))
            .mount(&server)
            .await;
    }

    let config = create_test_config(SourceKind::Html, &server.uri(), &output);
    let stats = run_crawl(config).await.expect("crawl should succeed");

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_written, 3);

    let dataset = read_dataset(&output);
    assert_eq!(
        ids(&dataset),
        vec!["acme_rocket-101", "acme_comet-102", "acme_nova-103"]
    );

    let rocket = &dataset[0];
    assert_eq!(rocket["brand"], "Acme");
    assert_eq!(rocket["model"], "Rocket");
    assert_eq!(rocket["platform"]["os_version"], "14");
    assert_eq!(rocket["platform"]["chipset"], "Snapdragon 8 Gen 3");
    assert_eq!(rocket["memory"]["ram"], "12GB");
    assert_eq!(
        rocket["images"]["thumbnail"],
        format!("{}/thumbs/rocket.jpg", server.uri())
    );
    assert_eq!(dataset[1]["images"], json!({}));
}
