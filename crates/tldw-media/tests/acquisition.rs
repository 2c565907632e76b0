//! Acquisition integration tests against mock resolver and relay backends.

use std::time::Duration;

use tldw_media::{
    AcquisitionConfig, Acquirer, MediaError, RecordingProgress, DOWNLOADING, RESOLVING,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(resolvers: Vec<String>, relays: Vec<String>) -> AcquisitionConfig {
    AcquisitionConfig::default()
        .with_resolvers(resolvers)
        .with_relays(relays)
        .with_attempt_timeout(Duration::from_secs(5))
}

async fn failing_resolver(server: &MockServer, route: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "text": format!("{route} unavailable")
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Backends `[fail, fail, success, unused]`: two failures, one success,
/// nothing after.
#[tokio::test]
async fn test_resolvers_stop_at_first_success() {
    let server = MockServer::start().await;
    failing_resolver(&server, "/r1", 1).await;
    failing_resolver(&server, "/r2", 1).await;
    Mock::given(method("POST"))
        .and(path("/r3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "stream",
            "url": format!("{}/media/x.mp4", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;
    failing_resolver(&server, "/r4", 0).await;
    Mock::given(method("GET"))
        .and(path("/relay"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"bytes".to_vec(), "video/mp4"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let acquirer = Acquirer::from_config(&config(
        ["/r1", "/r2", "/r3", "/r4"]
            .iter()
            .map(|r| format!("{uri}{r}"))
            .collect(),
        vec![format!("{uri}/relay?url={{url}}")],
    ))
    .unwrap();

    let progress = RecordingProgress::new();
    let media = acquirer
        .acquire("https://m.youtube.com/watch?v=abc123&t=42", &progress)
        .await
        .unwrap();

    assert_eq!(media.filename, "youtube_video.mp4");
    assert_eq!(&media.bytes[..], b"bytes");
    assert_eq!(progress.events(), vec![RESOLVING, DOWNLOADING]);
}

#[tokio::test]
async fn test_all_resolvers_fail() {
    let server = MockServer::start().await;
    failing_resolver(&server, "/r1", 1).await;
    failing_resolver(&server, "/r2", 1).await;

    let uri = server.uri();
    let acquirer = Acquirer::from_config(&config(
        vec![format!("{uri}/r1"), format!("{uri}/r2")],
        vec![format!("{uri}/relay?url={{url}}")],
    ))
    .unwrap();

    let err = acquirer
        .acquire("https://youtu.be/abc123", &RecordingProgress::new())
        .await
        .unwrap_err();

    assert!(err.is_exhausted());
    assert!(matches!(
        err.last_failure(),
        Some(MediaError::ResolverRejected(text)) if text == "/r2 unavailable"
    ));
}

#[tokio::test]
async fn test_direct_reference_exhausts_relays() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let uri = server.uri();
    let acquirer = Acquirer::from_config(&config(
        Vec::new(),
        vec![
            format!("{uri}/relay-a?url={{url}}"),
            format!("{uri}/relay-b?url={{url}}"),
        ],
    ))
    .unwrap();

    let err = acquirer
        .acquire(&format!("{uri}/files/v.mp4"), &RecordingProgress::new())
        .await
        .unwrap_err();

    match err {
        MediaError::DownloadExhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, MediaError::HttpStatus { status: 404, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}
