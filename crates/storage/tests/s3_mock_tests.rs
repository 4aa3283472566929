use httpmock::Method::HEAD;
use httpmock::MockServer;
use s3etag_core::{Etag, RemoteConfig};
use s3etag_storage::{EtagStore, S3Backend, StorageError};
use std::net::TcpListener;
use std::time::Duration;

const BUCKET: &str = "bucket";

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn backend_for(server: &MockServer) -> S3Backend {
    let mut config = RemoteConfig::new(BUCKET);
    config.endpoint = Some(server.base_url());
    config.access_key_id = Some("access".to_string());
    config.secret_access_key = Some("secret".to_string());
    config.force_path_style = true;
    S3Backend::new(&config).unwrap()
}

#[tokio::test]
async fn head_strips_quotes_from_simple_etag() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(HEAD).path("/bucket/data/a.txt");
            then.status(200)
                .header("ETag", "\"781e5e245d69b566979b86e28d23f2c7\"");
        })
        .await;

    let backend = backend_for(&server);
    let etag = backend.etag("data/a.txt").await.unwrap().unwrap();
    assert_eq!(etag.to_string(), "781e5e245d69b566979b86e28d23f2c7");
    mock.assert_async().await;
}

#[tokio::test]
async fn head_parses_multipart_etag() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/bucket/large.bin");
            then.status(200)
                .header("ETag", "\"0e7f77975c09731444156f23125696f6-3\"");
        })
        .await;

    let backend = backend_for(&server);
    let etag = backend.etag("large.bin").await.unwrap().unwrap();
    assert_eq!(
        etag,
        Etag::parse("0e7f77975c09731444156f23125696f6-3").unwrap()
    );
    assert_eq!(etag.part_count(), Some(3));
}

#[tokio::test]
async fn head_not_found_is_none() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/bucket/missing");
            then.status(404);
        })
        .await;

    let backend = backend_for(&server);
    assert!(backend.head("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn head_forbidden_is_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/bucket/secret");
            then.status(403);
        })
        .await;

    let backend = backend_for(&server);
    let err = backend.head("secret").await.unwrap_err();
    assert!(matches!(err, StorageError::S3(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn head_malformed_etag_is_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/bucket/weird");
            then.status(200).header("ETag", "\"not-a-digest\"");
        })
        .await;

    let backend = backend_for(&server);
    let err = backend.head("weird").await.unwrap_err();
    assert!(
        matches!(err, StorageError::InvalidEtag { ref key, .. } if key == "weird"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn head_times_out_as_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/bucket/slow");
            then.status(200)
                .header("ETag", "\"781e5e245d69b566979b86e28d23f2c7\"")
                .delay(Duration::from_secs(5));
        })
        .await;

    let mut config = RemoteConfig::new(BUCKET);
    config.endpoint = Some(server.base_url());
    config.access_key_id = Some("access".to_string());
    config.secret_access_key = Some("secret".to_string());
    config.force_path_style = true;
    config.timeout = Some(Duration::from_millis(200));
    let backend = S3Backend::new(&config).unwrap();

    assert!(matches!(
        backend.head("slow").await,
        Err(StorageError::S3(_))
    ));
}
