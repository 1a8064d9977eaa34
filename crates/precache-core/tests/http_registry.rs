//! libcurl-backed registry and fetcher against a local HTTP server.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::fixtures::{file_count, HELLO_BODY, HELLO_MD5};
use common::registry_server::{self, Route};
use precache_core::cache::{CacheStore, FileCache};
use precache_core::fetcher::{CurlFetcher, DownloadRequest, Fetcher};
use precache_core::package::{ItemKind, PackageKind};
use precache_core::pipeline::{CoreRequest, Pipeline, StepPolicy};
use precache_core::registry::{HttpRegistry, Registry};
use precache_core::resolver::RegistryEndpoints;
use precache_core::rewrite::rewrite_version;
use precache_core::PrecacheError;
use tempfile::tempdir;

const VERSION_CHECK: &str = "/core/version-check/1.7/?locale=en_US";
const AKISMET_INFO: &str = "/plugins/info/1.2/?action=plugin_information&request%5Bslug%5D=akismet";
const GHOST_INFO: &str = "/plugins/info/1.2/?action=plugin_information&request%5Bslug%5D=ghost";

fn endpoints(host: &str) -> RegistryEndpoints {
    RegistryEndpoints {
        api_base: format!("http://{host}"),
        download_scheme: "http".to_string(),
        download_host: host.to_string(),
    }
}

fn registry(host: &str) -> HttpRegistry {
    HttpRegistry::new(endpoints(host), Duration::from_secs(5))
}

#[test]
fn version_check_offers_are_decoded() {
    let body = r#"{"offers":[{"response":"upgrade","locale":"en_US","current":"6.4.2",
        "download":"https://downloads.wordpress.org/release/wordpress-6.4.2.zip"}]}"#;
    let server = registry_server::start(HashMap::from([(
        VERSION_CHECK.to_string(),
        Route::ok(body),
    )]));
    let offer = registry(&server.host).current_offer("en_US").unwrap();
    assert_eq!(offer.version, "6.4.2");
    assert_eq!(offer.locale, "en_US");
    assert_eq!(server.request_count("GET", VERSION_CHECK), 1);
}

#[test]
fn item_info_lookup() {
    let plugin = server_with_akismet();
    let registry = registry(&plugin.host);

    let descriptor = registry.item_info(ItemKind::Plugin, "akismet").unwrap();
    assert_eq!(descriptor.name, "Akismet Anti-Spam");
    assert_eq!(descriptor.version, "5.3");
    assert_eq!(descriptor.kind, PackageKind::Plugin);

    let err = registry.item_info(ItemKind::Plugin, "ghost").unwrap_err();
    assert!(matches!(err, PrecacheError::InvalidSlug { status: 404, .. }));
    assert_eq!(plugin.request_count("GET", GHOST_INFO), 1);
}

#[test]
fn item_info_server_error_is_unreachable() {
    let server = registry_server::start(HashMap::from([(
        AKISMET_INFO.to_string(),
        Route::status(503, "down"),
    )]));
    let err = registry(&server.host)
        .item_info(ItemKind::Plugin, "akismet")
        .unwrap_err();
    assert!(matches!(
        err,
        PrecacheError::RegistryUnreachable { status: 503, .. }
    ));
}

#[test]
fn batch_aborts_when_registry_is_down() {
    let server = registry_server::start(HashMap::from([(
        AKISMET_INFO.to_string(),
        Route::status(503, "down"),
    )]));
    let cache = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let store = Arc::new(FileCache::new(cache.path()));
    let pipeline = Pipeline::new(
        Arc::new(registry(&server.host)),
        Arc::new(CurlFetcher),
        store.clone(),
        scratch.path(),
    );
    let err = pipeline
        .precache_items(
            ItemKind::Plugin,
            &["akismet".to_string(), "hello-dolly".to_string()],
            None,
            StepPolicy::BATCH,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PrecacheError::RegistryUnreachable { status: 503, .. }
    ));
    // The outage stops the batch before the second slug is looked up.
    assert_eq!(server.requests.lock().unwrap().len(), 1);
    assert!(store.entries().unwrap().is_empty());
}

#[test]
fn rewrite_probes_with_head() {
    let server = server_with_akismet();
    let registry = registry(&server.host);
    let descriptor = registry.item_info(ItemKind::Plugin, "akismet").unwrap();

    let pinned = rewrite_version(&registry, &descriptor, "5.0").unwrap();
    assert_eq!(pinned.download_url, server.url("/plugin/akismet.5.0.zip"));
    assert_eq!(server.request_count("HEAD", "/plugin/akismet.5.0.zip"), 1);
    assert_eq!(server.request_count("GET", "/plugin/akismet.5.0.zip"), 0);

    let err = rewrite_version(&registry, &descriptor, "0.1").unwrap_err();
    assert!(matches!(
        err,
        PrecacheError::VersionNotFound { status: 404, .. }
    ));
}

#[test]
fn curl_fetcher_downloads_into_scratch() {
    let server = registry_server::start(HashMap::from([(
        "/plugin/hello.zip".to_string(),
        Route::ok(HELLO_BODY),
    )]));
    let scratch = tempdir().unwrap();
    let request = DownloadRequest::new(server.url("/plugin/hello.zip"), scratch.path());
    let artifact = CurlFetcher.fetch(&request).unwrap();
    assert_eq!(artifact.status_code(), 200);
    assert_eq!(std::fs::read(artifact.local_path()).unwrap(), HELLO_BODY);
    assert!(artifact.local_path().starts_with(scratch.path()));
    artifact.discard().unwrap();
    assert_eq!(file_count(scratch.path()), 0);
}

#[test]
fn curl_fetcher_missing_download_leaves_nothing() {
    let server = registry_server::start(HashMap::new());
    let scratch = tempdir().unwrap();
    let request = DownloadRequest::new(server.url("/plugin/gone.zip"), scratch.path());
    let err = CurlFetcher.fetch(&request).unwrap_err();
    assert!(matches!(err, PrecacheError::DownloadNotFound { status: 404, .. }));
    assert_eq!(file_count(scratch.path()), 0);
}

#[test]
fn core_release_end_to_end() {
    let server = registry_server::start(HashMap::from([
        ("/wordpress-6.4.tar.gz".to_string(), Route::ok(HELLO_BODY)),
        (
            "/wordpress-6.4.tar.gz.md5".to_string(),
            Route::ok(format!("{HELLO_MD5}\n")),
        ),
    ]));
    let cache = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let store = Arc::new(FileCache::new(cache.path()));
    let pipeline = Pipeline::new(
        Arc::new(registry(&server.host)),
        Arc::new(CurlFetcher),
        store.clone(),
        scratch.path(),
    )
    .with_endpoints(endpoints(&server.host));

    let request = CoreRequest {
        version: Some("6.4".to_string()),
        ..CoreRequest::default()
    };
    let report = pipeline.precache_core(&request, StepPolicy::FAIL_FAST).unwrap();
    assert_eq!(
        report.success_message(),
        "WordPress pre-cached: core/wordpress-6.4-en_US.tar.gz."
    );

    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "core/wordpress-6.4-en_US.tar.gz");
    assert_eq!(entries[0].size, HELLO_BODY.len() as u64);
    assert_eq!(file_count(scratch.path()), 0);
}

fn server_with_akismet() -> registry_server::RegistryServer {
    registry_server::start_with(|host| {
        let info = format!(
            r#"{{"name":"Akismet Anti-Spam","slug":"akismet","version":"5.3",
                "download_link":"http://{host}/plugin/akismet.5.3.zip"}}"#
        );
        HashMap::from([
            (AKISMET_INFO.to_string(), Route::ok(info)),
            ("/plugin/akismet.5.0.zip".to_string(), Route::ok(b"old".to_vec())),
        ])
    })
}
