//! End-to-end update checks

mod helper;

use std::sync::Arc;
use std::time::Duration;

use mockito::Server;

use helper::{
    DETAIL_ENDPOINT, MockTransport, PACKAGE_ENDPOINT, create_test_checker, create_test_store,
    detail_url, plugin_at, version_body, version_url,
};
use update_checker::package::types::PackageKind;
use update_checker::version::error::RegistryError;
use update_checker::version::stores::MemoryStore;
use update_checker::config::FETCH_TIMEOUT_MS;
use update_checker::version::transports::HttpTransport;
use update_checker::version::transports::http::user_agent;
use update_checker::version::types::UpdateRecord;

fn create_http_transport() -> HttpTransport {
    HttpTransport::new(&user_agent(None), Duration::from_millis(FETCH_TIMEOUT_MS)).unwrap()
}

#[tokio::test]
async fn reports_newer_version_over_http() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/api/package/demo-id")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(version_body("demo", "1.1.0"))
        .expect(1)
        .create_async()
        .await;

    let (_temp_dir, store) = create_test_store();
    let checker = create_test_checker(
        Arc::new(create_http_transport()),
        store,
        &format!("{}/api/package", server.url()),
        &format!("{}/api/detail", server.url()),
    );
    let package = plugin_at("/var/www/html", "demo-id", Some("1.0.0"));

    let first = checker.check(&package).await.unwrap();
    let second = checker.check(&package).await.unwrap();

    mock.assert_async().await;
    let expected = UpdateRecord {
        kind: PackageKind::Plugin,
        slug: "demo".to_string(),
        install_slug: "demo/demo.php".to_string(),
        new_version: "1.1.0".to_string(),
        url: "http://x/y".to_string(),
        package_source: "http://x/pkg.zip".to_string(),
    };
    assert_eq!(first, Some(expected));
    assert_eq!(first, second);
}

#[tokio::test]
async fn reports_nothing_when_versions_match() {
    let transport =
        Arc::new(MockTransport::new().with_body(&version_url("demo-id"), &version_body("demo", "1.0.0")));
    let checker = create_test_checker(
        transport.clone(),
        Arc::new(MemoryStore::new()),
        PACKAGE_ENDPOINT,
        DETAIL_ENDPOINT,
    );

    let result = checker
        .check(&plugin_at("/var/www/html", "demo-id", Some("1.0.0")))
        .await
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn retries_immediately_after_a_failed_fetch() {
    let transport = Arc::new(
        MockTransport::new()
            .with_status(&version_url("demo-id"), 503)
            .with_body(&version_url("demo-id"), &version_body("demo", "1.1.0")),
    );
    let (_temp_dir, store) = create_test_store();
    let checker = create_test_checker(transport.clone(), store, PACKAGE_ENDPOINT, DETAIL_ENDPOINT);
    let package = plugin_at("/var/www/html", "demo-id", Some("1.0.0"));

    let first = checker.check(&package).await;
    assert!(matches!(
        first,
        Err(RegistryError::UnexpectedStatus { status: 503, .. })
    ));

    let second = checker.check(&package).await.unwrap();
    assert_eq!(second.map(|r| r.new_version), Some("1.1.0".to_string()));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn same_package_on_different_hosts_shares_slug_and_cache_slot() {
    let transport =
        Arc::new(MockTransport::new().with_body(&version_url("demo-id"), &version_body("demo", "2.0.0")));
    let checker = create_test_checker(
        transport.clone(),
        Arc::new(MemoryStore::new()),
        PACKAGE_ENDPOINT,
        DETAIL_ENDPOINT,
    );

    let local = checker
        .check(&plugin_at("/var/www/html", "demo-id", Some("1.0.0")))
        .await
        .unwrap()
        .unwrap();
    let staging = checker
        .check(&plugin_at("/srv/staging/site", "demo-id", Some("1.0.0")))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(local.install_slug, staging.install_slug);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn different_packages_never_share_a_cache_slot() {
    let transport = Arc::new(
        MockTransport::new()
            .with_body(&version_url("pkgA"), &version_body("a", "2.0.0"))
            .with_body(&version_url("pkgB"), &version_body("b", "1.0.0")),
    );
    let checker = create_test_checker(
        transport.clone(),
        Arc::new(MemoryStore::new()),
        PACKAGE_ENDPOINT,
        DETAIL_ENDPOINT,
    );

    let a = checker
        .check(&plugin_at("/var/www/html", "pkgA", Some("1.0.0")))
        .await
        .unwrap();
    let b = checker
        .check(&plugin_at("/var/www/html", "pkgB", Some("1.0.0")))
        .await
        .unwrap();

    assert_eq!(a.map(|r| r.slug), Some("a".to_string()));
    assert_eq!(b, None);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn details_are_served_for_the_checked_slug_only() {
    let transport = Arc::new(
        MockTransport::new()
            .with_body(&version_url("demo-id"), &version_body("demo", "1.1.0"))
            .with_body(
                &detail_url("demo-id"),
                r#"{
                    "slug": "demo",
                    "version": "1.1.0",
                    "sections": {"description": "Demo plugin", "changelog": "Fixes"},
                    "banners": {"low": "http://x/low.png"},
                    "tested": "6.4"
                }"#,
            ),
    );
    let checker = create_test_checker(
        transport.clone(),
        Arc::new(MemoryStore::new()),
        PACKAGE_ENDPOINT,
        DETAIL_ENDPOINT,
    );
    let package = plugin_at("/var/www/html", "demo-id", Some("1.0.0"));

    checker.check(&package).await.unwrap();

    assert_eq!(checker.details(&package, "other").await.unwrap(), None);

    let detail = checker.details(&package, "demo").await.unwrap().unwrap();
    assert_eq!(
        detail.sections.keys().collect::<Vec<_>>(),
        vec!["description", "changelog"]
    );
    assert_eq!(detail.banners["low"], "http://x/low.png");
    assert_eq!(detail.metadata["tested"], serde_json::json!("6.4"));
    assert_eq!(transport.calls(), 2);
}
