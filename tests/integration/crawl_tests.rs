//! End-to-end domain crawls

use crate::{engine, mount_html, mount_html_expect, page, test_config};
use std::sync::Arc;
use sumi_scout::config::Config;
use sumi_scout::crawler::{harvest, ContactHarvester, DomainOutcome};
use sumi_scout::storage::{open_storage, DomainStatus, Storage};
use sumi_scout::{Confidence, ContactAnalyzer, CrawlEngine, Site};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_contact_page_mailto_halts_crawl() {
    let server = MockServer::start().await;

    mount_html(&server, "/", page(r#"<a href="/contact">Contact</a> <a href="/services">Services</a>"#)).await;
    mount_html_expect(
        &server,
        "/contact",
        page(r#"<p>Write to us:</p><a href="mailto:info@example.com">Info Team</a>"#),
        1,
    )
    .await;

    // halting skips both the sitemap and the general crawl
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_html_expect(&server, "/services", page("<p>What we do</p>"), 0).await;

    let site = Site::parse(&server.uri()).unwrap();
    let report = engine(test_config()).crawl(&site).await.expect("Crawl failed");

    assert!(report.halted_after_priority);
    assert!(!report.used_sitemap);
    assert_eq!(report.contacts.len(), 1);

    let contact = &report.contacts[0];
    assert_eq!(contact.email, "info@example.com");
    assert_eq!(contact.name, "Info Team");
    assert_eq!(contact.confidence, Confidence::High);
    assert!(contact.source_url.ends_with("/contact"));
}

#[tokio::test]
async fn test_page_budget_limits_general_crawl() {
    let server = MockServer::start().await;

    let links: String = (0..100).map(|i| format!(r#"<a href="/p{}">Page {}</a>"#, i, i)).collect();
    mount_html(&server, "/", page(&links)).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/p\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page("<p>Nothing here</p>"), "text/html"))
        .expect(5)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.max_pages_per_domain = 5;

    let site = Site::parse(&server.uri()).unwrap();
    let report = engine(config).crawl(&site).await.expect("Crawl failed");

    assert!(!report.halted_after_priority);
    assert!(!report.used_sitemap);
    assert_eq!(report.pages_fetched, 5);
    assert!(report.contacts.is_empty());
}

#[tokio::test]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;

    mount_html_expect(&server, "/", page(r#"<a href="/a">A</a> <a href="/b">B</a>"#), 1).await;
    mount_html_expect(
        &server,
        "/a",
        page(r#"<a href="/b">B</a> <a href="/">Home</a> <a href="/a#top">Top</a>"#),
        1,
    )
    .await;
    mount_html_expect(&server, "/b", page(r#"<a href="/a">A</a> <a href="/b?">B again</a>"#), 1).await;
    mount_html_expect(&server, "/contact", page(r#"<a href="/a">A</a>"#), 1).await;

    let site = Site::parse(&server.uri()).unwrap();
    let report = engine(test_config()).crawl(&site).await.expect("Crawl failed");

    let mut paths: Vec<&str> = report.fetched_urls.iter().map(|u| u.path()).collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total, "a page was dispatched twice: {:?}", report.fetched_urls);
}

#[tokio::test]
async fn test_obfuscated_emails_are_found() {
    let server = MockServer::start().await;

    // protected address only: the probe asks for rendering, which is off
    mount_html(
        &server,
        "/",
        page(
            r#"<a href="/about">About</a>
               <p>Support: <a href="/cdn-cgi/l/email-protection" class="__cf_email__"
                  data-cfemail="422d323102242b302f6c212d2f">[email&#160;protected]</a></p>"#,
        ),
    )
    .await;
    mount_html(&server, "/about", page("<p>Questions? jane [at] firm [dot] com</p>")).await;

    let mut config = test_config();
    config.crawler.halt_on_priority_contact = false;

    let site = Site::parse(&server.uri()).unwrap();
    let report = engine(config).crawl(&site).await.expect("Crawl failed");

    let emails: Vec<&str> = report.contacts.iter().map(|c| c.email.as_str()).collect();
    assert!(emails.contains(&"ops@firm.com"), "got {:?}", emails);
    assert!(emails.contains(&"jane@firm.com"), "got {:?}", emails);
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"))
        .mount(&server)
        .await;
    mount_html(&server, "/", page(r#"<a href="/private/team">Team</a> <a href="/open">Open</a>"#)).await;
    mount_html_expect(&server, "/private/team", page("<p>ceo@firm.com</p>"), 0).await;
    mount_html_expect(&server, "/open", page("<p>Open page</p>"), 1).await;

    let site = Site::parse(&server.uri()).unwrap();
    let report = engine(test_config()).crawl(&site).await.expect("Crawl failed");

    assert!(report.contacts.is_empty());
}

#[tokio::test]
async fn test_failing_domain_does_not_affect_others() {
    let server = MockServer::start().await;
    mount_html(&server, "/", page(r#"<a href="mailto:hello@example.com">Say hello</a>"#)).await;

    let engine = CrawlEngine::new(Arc::new(test_config()), ContactAnalyzer::without_names()).unwrap();
    let harvester = ContactHarvester::new(engine);
    let inputs = vec![
        "http://127.0.0.1:1".to_string(),
        "ftp://files.example.com".to_string(),
        server.uri(),
    ];

    let outcomes = harvester.harvest(&inputs).await;
    assert_eq!(outcomes.len(), 3);

    // unreachable: crawled, nothing found
    let unreachable = outcomes[0].result().expect("unreachable site should still be crawled");
    assert!(unreachable.is_empty());

    assert!(matches!(&outcomes[1], DomainOutcome::Failed { .. }));

    let found = outcomes[2].result().unwrap();
    assert_eq!(found.website, server.uri());
    assert_eq!(found.find("hello@example.com").unwrap().name, "Say hello");
}

#[tokio::test]
async fn test_harvest_writes_database_and_summary() {
    let server = MockServer::start().await;
    mount_html(&server, "/", page(r#"<a href="/contact-us">Contact us</a>"#)).await;
    mount_html(&server, "/contact-us", page(r#"<a href="mailto:sales@example.com">Sales Desk</a>"#)).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scout.db");
    let summary_path = dir.path().join("summary.md");

    let mut config: Config = test_config();
    config.output.database_path = Some(db_path.to_string_lossy().into_owned());
    config.output.summary_path = Some(summary_path.to_string_lossy().into_owned());

    let inputs = vec![server.uri(), "mailto:nobody".to_string()];
    let outcomes = harvest(config, "test-hash", &inputs).await.expect("Harvest failed");
    assert_eq!(outcomes.len(), 2);

    let storage = open_storage(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().expect("run recorded");
    assert_eq!(run.config_hash, "test-hash");
    assert!(run.finished_at.is_some());

    let domains = storage.load_domains(run.id).unwrap();
    assert_eq!(domains[0].status, DomainStatus::Found);
    assert_eq!(domains[1].status, DomainStatus::Failed);

    let contacts = storage.load_contacts(run.id).unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].contact.email, "sales@example.com");

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("sales@example.com"));
    assert!(summary.contains("## Failed Domains"));
}
