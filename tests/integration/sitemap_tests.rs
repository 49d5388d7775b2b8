//! Sitemap resolution against mock servers

use crate::{engine, mount_html, mount_html_expect, page, test_config};
use std::sync::Arc;
use sumi_scout::config::FetcherConfig;
use sumi_scout::crawler::{build_http_client, SitemapResolver, StaticFetcher, TlsPolicy};
use sumi_scout::Site;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

fn url_set(pages: &[String]) -> String {
    let entries: String = pages
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

async fn mount_xml(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/xml"))
        .expect(times)
        .mount(server)
        .await;
}

/// robots.txt points at an index; the index and a child sitemap point back at each other
async fn mount_cyclic_sitemaps(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("User-agent: *\nAllow: /\nSitemap: {}/sitemap_index.xml", base)),
        )
        .mount(server)
        .await;

    mount_xml(
        server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/sitemap_a.xml", base), format!("{}/sitemap_b.xml", base)]),
        1,
    )
    .await;
    mount_xml(
        server,
        "/sitemap_a.xml",
        sitemap_index(&[format!("{}/sitemap_index.xml", base), format!("{}/sitemap_b.xml", base)]),
        1,
    )
    .await;
    mount_xml(
        server,
        "/sitemap_b.xml",
        url_set(&[
            format!("{}/team", base),
            format!("{}/people", base),
            format!("{}/team/", base),
            "https://elsewhere.example.org/staff".to_string(),
        ]),
        1,
    )
    .await;
}

#[tokio::test]
async fn test_sitemap_index_cycle_is_resolved_once() {
    let server = MockServer::start().await;
    mount_cyclic_sitemaps(&server).await;

    let fetcher = StaticFetcher::new(&FetcherConfig::default()).unwrap();
    let site = Site::parse(&server.uri()).unwrap();
    let urls = SitemapResolver::new(Arc::new(fetcher)).resolve(&site).await;

    let paths: Vec<String> = urls
        .iter()
        .filter(|u| site.contains(u))
        .map(|u| u.path().to_string())
        .collect();
    assert_eq!(paths, vec!["/team".to_string(), "/people".to_string()]);
}

#[tokio::test]
async fn test_sitemap_limit_stops_resolution() {
    let server = MockServer::start().await;
    let base = server.uri();

    // no robots.txt: the default location is used
    mount_xml(&server, "/sitemap.xml", sitemap_index(&[format!("{}/sitemap_a.xml", base)]), 1).await;
    mount_xml(&server, "/sitemap_a.xml", url_set(&[format!("{}/team", base)]), 0).await;

    let client = build_http_client(&FetcherConfig::default(), TlsPolicy::Relaxed).unwrap();
    let fetcher = StaticFetcher::with_client(client);
    let site = Site::parse(&base).unwrap();

    let urls = SitemapResolver::new(Arc::new(fetcher))
        .with_max_sitemaps(1)
        .resolve(&site)
        .await;
    assert!(urls.is_empty());
}

#[tokio::test]
async fn test_sitemap_urls_replace_link_following() {
    let server = MockServer::start().await;
    mount_cyclic_sitemaps(&server).await;

    mount_html(&server, "/", page(r#"<a href="/blog">Blog</a>"#)).await;
    mount_html_expect(&server, "/team", page("<p>Meet Ana Ruiz, ana@firm.com</p>"), 1).await;
    mount_html_expect(&server, "/people", page(r#"<a href="/hidden">More people</a>"#), 1).await;

    // linked from the homepage and a sitemap page, but absent from the sitemap
    mount_html_expect(&server, "/blog", page("<p>blog@firm.com</p>"), 0).await;
    mount_html_expect(&server, "/hidden", page("<p>hidden@firm.com</p>"), 0).await;

    let site = Site::parse(&server.uri()).unwrap();
    let report = engine(test_config()).crawl(&site).await.expect("Crawl failed");

    assert!(report.used_sitemap);
    assert!(!report.halted_after_priority);
    assert_eq!(report.pages_fetched, 2);

    let emails: Vec<&str> = report.contacts.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(emails, vec!["ana@firm.com"]);
}
