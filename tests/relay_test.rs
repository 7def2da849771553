//! Integration tests for fetch-and-relay.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::routing::get;
use axum::Router;
use futures_util::stream::{self, BoxStream, StreamExt};
use common::{dir_entries, test_config, Progress, RecordingOutbox, RecordingProgress, Sent};
use terabox_relay_bot::constants::messages;
use terabox_relay_bot::relay::{Phase, Relay, RelayError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn relay_in(work_dir: &TempDir) -> Relay {
    let config = test_config("https://www.terabox.com", work_dir.path());
    Relay::new(reqwest::Client::new(), &config)
}

async fn serve_file(server: &MockServer, body: Vec<u8>) -> String {
    Mock::given(method("GET"))
        .and(path("/file/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "video/mp4"))
        .mount(server)
        .await;
    format!("{}/file/clip.mp4", server.uri())
}

type Chunks = BoxStream<'static, Result<Vec<u8>, std::io::Error>>;

/// Serve `/file/clip.mp4` with a chunked body and no `content-length`.
async fn serve_chunked(make_body: fn() -> Chunks) -> String {
    let app = Router::new().route(
        "/file/clip.mp4",
        get(move || async move { Body::from_stream(make_body()) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/file/clip.mp4")
}

#[tokio::test]
async fn test_relays_exact_bytes_and_cleans_up() {
    let server = MockServer::start().await;
    let body: Vec<u8> = (0..3_000_000u32).map(|i| (i % 251) as u8).collect();
    let url = serve_file(&server, body.clone()).await;

    let work_dir = TempDir::new().unwrap();
    let outbox = RecordingOutbox::new();
    let progress = RecordingProgress::default();

    relay_in(&work_dir)
        .fetch_and_relay(&url, "clip.mp4", &progress, &outbox)
        .await
        .unwrap();

    let videos = outbox.videos();
    assert_eq!(videos.len(), 1);
    match &videos[0] {
        Sent::Video {
            filename,
            caption,
            bytes,
            path,
        } => {
            assert_eq!(filename, "terabox_clip.mp4");
            assert_eq!(caption, messages::VIDEO_CAPTION);
            assert_eq!(*bytes, body.len());
            assert!(path.starts_with(work_dir.path()));
            assert!(!path.exists());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(dir_entries(work_dir.path()), 0);

    let events = progress.events();
    assert_eq!(events.first(), Some(&Progress::Phase(Phase::Starting)));
    assert_eq!(events.last(), Some(&Progress::Phase(Phase::Uploading)));
    assert!(!events.contains(&Progress::Phase(Phase::Downloading)));
    assert_eq!(progress.percents().last(), Some(&100));
}

#[tokio::test]
async fn test_progress_is_throttled() {
    let server = MockServer::start().await;
    let url = serve_file(&server, vec![7u8; 8 * 1024 * 1024]).await;

    let work_dir = TempDir::new().unwrap();
    let progress = RecordingProgress::default();

    relay_in(&work_dir)
        .fetch_and_relay(&url, "clip.mp4", &progress, &RecordingOutbox::new())
        .await
        .unwrap();

    let percents = progress.percents();
    assert!(!percents.is_empty());
    assert!(percents.len() <= 20);
    assert!(percents.windows(2).all(|w| w[1] / 5 > w[0] / 5));
}

#[tokio::test]
async fn test_non_200_never_creates_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file/clip.mp4"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let work_dir = TempDir::new().unwrap();
    let outbox = RecordingOutbox::new();

    let result = relay_in(&work_dir)
        .fetch_and_relay(
            &format!("{}/file/clip.mp4", server.uri()),
            "clip.mp4",
            &RecordingProgress::default(),
            &outbox,
        )
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, RelayError::Status(403)));
    assert_eq!(err.user_message(), messages::DOWNLOAD_FAILED);
    assert!(outbox.videos().is_empty());
    assert_eq!(dir_entries(work_dir.path()), 0);
}

#[tokio::test]
async fn test_failed_upload_still_cleans_up() {
    let server = MockServer::start().await;
    let url = serve_file(&server, vec![1u8; 4096]).await;

    let work_dir = TempDir::new().unwrap();
    let outbox = RecordingOutbox::failing_uploads();

    let result = relay_in(&work_dir)
        .fetch_and_relay(&url, "clip.mp4", &RecordingProgress::default(), &outbox)
        .await;

    assert!(matches!(result, Err(RelayError::Upload(_))));
    match &outbox.videos()[0] {
        Sent::Video { bytes, path, .. } => {
            assert_eq!(*bytes, 4096);
            assert!(!path.exists());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(dir_entries(work_dir.path()), 0);
}

#[tokio::test]
async fn test_declared_size_over_limit() {
    let server = MockServer::start().await;
    let url = serve_file(&server, vec![0u8; 10_000]).await;

    let work_dir = TempDir::new().unwrap();
    let mut config = test_config("https://www.terabox.com", work_dir.path());
    config.max_file_size = Some(1_000);
    let relay = Relay::new(reqwest::Client::new(), &config);

    let result = relay
        .fetch_and_relay(
            &url,
            "clip.mp4",
            &RecordingProgress::default(),
            &RecordingOutbox::new(),
        )
        .await;

    assert!(matches!(
        result,
        Err(RelayError::TooLarge {
            size: 10_000,
            limit: 1_000
        })
    ));
    assert_eq!(dir_entries(work_dir.path()), 0);
}

#[tokio::test]
async fn test_slow_headers_stall() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file/clip.mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vec![0u8; 16], "video/mp4")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let work_dir = TempDir::new().unwrap();
    let mut config = test_config("https://www.terabox.com", work_dir.path());
    config.download_stall_timeout = Duration::from_millis(200);
    let relay = Relay::new(reqwest::Client::new(), &config);

    let result = relay
        .fetch_and_relay(
            &format!("{}/file/clip.mp4", server.uri()),
            "clip.mp4",
            &RecordingProgress::default(),
            &RecordingOutbox::new(),
        )
        .await;

    assert!(matches!(result, Err(RelayError::Stalled(_))));
    assert_eq!(dir_entries(work_dir.path()), 0);
}

#[tokio::test]
async fn test_unknown_size_reports_phase_only() {
    let url = serve_chunked(|| {
        stream::iter((0..4u8).map(|i| Ok(vec![i; 1000]))).boxed()
    })
    .await;

    let work_dir = TempDir::new().unwrap();
    let outbox = RecordingOutbox::new();
    let progress = RecordingProgress::default();

    relay_in(&work_dir)
        .fetch_and_relay(&url, "clip.mp4", &progress, &outbox)
        .await
        .unwrap();

    assert_eq!(
        progress.events(),
        vec![
            Progress::Phase(Phase::Starting),
            Progress::Phase(Phase::Downloading),
            Progress::Phase(Phase::Uploading),
        ]
    );
    assert!(progress.percents().is_empty());
    match &outbox.videos()[0] {
        Sent::Video { bytes, .. } => assert_eq!(*bytes, 4000),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(dir_entries(work_dir.path()), 0);
}

#[tokio::test]
async fn test_stream_that_stops_midway_stalls() {
    let url = serve_chunked(|| {
        stream::iter([Ok(vec![5u8; 1000])])
            .chain(stream::pending())
            .boxed()
    })
    .await;

    let work_dir = TempDir::new().unwrap();
    let mut config = test_config("https://www.terabox.com", work_dir.path());
    config.download_stall_timeout = Duration::from_millis(300);
    let relay = Relay::new(reqwest::Client::new(), &config);
    let outbox = RecordingOutbox::new();

    let result = relay
        .fetch_and_relay(&url, "clip.mp4", &RecordingProgress::default(), &outbox)
        .await;

    assert!(matches!(result, Err(RelayError::Stalled(_))));
    assert!(outbox.videos().is_empty());
    assert_eq!(dir_entries(work_dir.path()), 0);
}

#[tokio::test]
async fn test_same_name_runs_do_not_collide() {
    let server = MockServer::start().await;
    let url = serve_file(&server, vec![9u8; 64 * 1024]).await;

    let work_dir = TempDir::new().unwrap();
    let relay = relay_in(&work_dir);
    let outbox_a = RecordingOutbox::new();
    let outbox_b = RecordingOutbox::new();
    let progress = RecordingProgress::default();

    let (a, b) = tokio::join!(
        relay.fetch_and_relay(&url, "same.mp4", &progress, &outbox_a),
        relay.fetch_and_relay(&url, "same.mp4", &progress, &outbox_b),
    );
    a.unwrap();
    b.unwrap();

    let path_of = |outbox: &RecordingOutbox| match &outbox.videos()[0] {
        Sent::Video { path, bytes, .. } => {
            assert_eq!(*bytes, 64 * 1024);
            path.clone()
        }
        other => panic!("unexpected event {other:?}"),
    };
    assert_ne!(path_of(&outbox_a), path_of(&outbox_b));
    assert_eq!(dir_entries(work_dir.path()), 0);
}
