//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from search pages to the exported file.

use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wlw_scraper::config::{RetryConfig, SearchMode, Settings};
use wlw_scraper::crawler::{crawl, Coordinator, CrawlOutput, HttpFetcher};
use wlw_scraper::output::{export_to_json, Termination};

/// Creates test settings pointing at the mock server
fn create_test_settings(base_url: &str, mode: SearchMode, max_pages: u32) -> Settings {
    Settings {
        base_url: base_url.to_string(),
        query: Some("Aufzüge".to_string()),
        mode,
        max_pages,
        retry: RetryConfig {
            retries: 1,
            backoff_factor: 0.0,
            timeout: 5.0,
        },
        ..Default::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_search_page(server: &MockServer, segment: &str, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/de/{}/", segment)))
        .and(query_param("q", "Aufzüge"))
        .and(query_param("page", page))
        .and(query_param("country", "DE"))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_company_crawl_with_details() {
    let mock_server = MockServer::start().await;

    mount_search_page(
        &mock_server,
        "firmen",
        "1",
        r#"
        <article class="company-item" data-id="1001">
          <h2>Acme Aufzüge GmbH</h2>
          <a data-test="company-link" href="/de/firma/acme-aufzuege-1001">Profil</a>
          <div class="address">Hauptstr. 1, 12345 Berlin</div>
        </article>
        <article class="company-item">
          <h2>Beta Lift AG</h2>
          <a href="/de/firmen/beta-lift-2002">Profil</a>
        </article>
        "#,
    )
    .await;

    mount_search_page(
        &mock_server,
        "firmen",
        "2",
        r#"<article class="company-item"><h2>Gamma</h2></article>"#,
    )
    .await;

    // Page 3 has markup but no cards
    mount_search_page(&mock_server, "firmen", "3", "<p>Keine weiteren Treffer</p>").await;

    Mock::given(method("GET"))
        .and(path("/de/firma/acme-aufzuege-1001"))
        .respond_with(html(
            r#"
            <h1>Acme Aufzüge GmbH</h1>
            <address>Hauptstr. 1, 12345 Berlin, Deutschland DE</address>
            <p>Gründungsjahr: 1998 | Mitarbeiteranzahl: 50-99</p>
            <div class="contact-person"><h4>Jane Doe</h4><span class="role">Vertrieb</span></div>
            "#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The second profile is permanently broken
    Mock::given(method("GET"))
        .and(path("/de/firmen/beta-lift-2002"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let settings = create_test_settings(&mock_server.uri(), SearchMode::Company, 0);
    let (output, stats) = crawl(settings).await.expect("crawl failed");

    let companies = match output {
        CrawlOutput::Companies(companies) => companies,
        other => panic!("expected companies, got {:?}", other),
    };

    assert_eq!(companies.len(), 3);
    assert_eq!(companies[0].company_id.as_deref(), Some("1001"));
    assert_eq!(companies[1].company_id.as_deref(), Some("2002"));
    assert_eq!(companies[2].name.as_deref(), Some("Gamma"));

    let acme = companies[0].details.as_ref().expect("details attached");
    assert_eq!(acme.address.postal_code.as_deref(), Some("12345"));
    assert_eq!(acme.address.city.as_deref(), Some("Berlin"));
    assert_eq!(acme.address.country_code.as_deref(), Some("DE"));
    assert_eq!(acme.founding_year, Some(1998));
    assert_eq!(acme.employee_count.as_deref(), Some("Mitarbeiteranzahl: 50-99"));
    assert_eq!(acme.contacts.len(), 1);
    assert_eq!(acme.contacts[0].first_name.as_deref(), Some("Jane"));
    assert_eq!(acme.contacts[0].last_name.as_deref(), Some("Doe"));

    assert!(companies[1].details.is_none());
    assert!(companies[2].details.is_none());

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.details_fetched, 1);
    assert_eq!(stats.details_failed, 1);
    assert_eq!(stats.termination, Some(Termination::EmptyPage { page: 3 }));
}

#[tokio::test]
async fn test_product_crawl_respects_max_pages() {
    let mock_server = MockServer::start().await;

    mount_search_page(
        &mock_server,
        "produkte",
        "1",
        r#"
        <div data-test="product-result-card">
          <h3>Personenaufzug</h3>
          <a href="/de/produkte/personenaufzug">Details</a>
          <a href="/de/firmen/acme-1001" class="company-name">Acme</a>
        </div>
        "#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/de/produkte/"))
        .and(query_param("page", "2"))
        .respond_with(html("<div data-test='product-result-card'><h3>Nie</h3></div>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let settings = create_test_settings(&mock_server.uri(), SearchMode::Product, 1);
    let fetcher = HttpFetcher::new(settings.retry.clone()).unwrap();
    let mut coordinator = Coordinator::new(settings, fetcher).unwrap();
    let output = coordinator.run().await.unwrap();

    let products = match output {
        CrawlOutput::Products(products) => products,
        other => panic!("expected products, got {:?}", other),
    };

    assert_eq!(products.len(), 1);
    let product = &products[0];
    assert_eq!(product.name.as_deref(), Some("Personenaufzug"));
    assert_eq!(product.company_name.as_deref(), Some("Acme"));
    assert_eq!(product.company_id.as_deref(), Some("1001"));
    assert_eq!(
        product.product_url.as_deref(),
        Some(format!("{}/de/produkte/personenaufzug", mock_server.uri()).as_str())
    );
    assert_eq!(
        coordinator.stats().termination,
        Some(Termination::MaxPages { page: 1 })
    );
}

#[tokio::test]
async fn test_unreachable_first_page_exports_empty_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let settings = create_test_settings(&mock_server.uri(), SearchMode::Company, 0);
    let (output, stats) = crawl(settings).await.unwrap();

    assert!(output.is_empty());
    assert_eq!(stats.termination, Some(Termination::FetchFailed { page: 1 }));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("out.json");
    let meta = match &output {
        CrawlOutput::Companies(records) => export_to_json(records, &path),
        CrawlOutput::Products(records) => export_to_json(records, &path),
    }
    .unwrap();

    assert_eq!(meta.record_count, 0);
    let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["data"], serde_json::json!([]));
    assert_eq!(json["meta"]["record_count"], 0);
}

#[tokio::test]
async fn test_exported_company_file_layout() {
    let mock_server = MockServer::start().await;

    mount_search_page(
        &mock_server,
        "firmen",
        "1",
        r#"<div class="company-card" data-company-id="7"><h3>Müller & Söhne</h3></div>"#,
    )
    .await;

    let mut settings = create_test_settings(&mock_server.uri(), SearchMode::Company, 1);
    settings.include_company_details = false;
    let (output, _) = crawl(settings).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    if let CrawlOutput::Companies(records) = &output {
        export_to_json(records, &path).unwrap();
    } else {
        panic!("expected companies");
    }

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("Müller & Söhne"));

    let json: Value = serde_json::from_str(&raw).unwrap();
    let record = &json["data"][0];
    assert_eq!(record["company_id"], "7");
    assert!(record["address"].is_object());
    assert!(record["founding_year"].is_null());
    assert!(record.get("details").is_none());
    assert_eq!(json["meta"]["record_count"], 1);
}
