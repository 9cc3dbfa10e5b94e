mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use api_client::ClientError;
use common::*;
use futures::future::join_all;
use reqwest::StatusCode;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_post_requiring(server: &MockServer, token: &str, expected_ok: u64, expected_401: u64) {
    Mock::given(method("GET"))
        .and(path(api_path("/posts/1")))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": post_json(1, "hello")
        })))
        .with_priority(1)
        .expect(expected_ok)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/posts/1")))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_json("token expired")))
        .expect(expected_401)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    mount_post_requiring(&server, "new-token", 5, 5).await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(session_json("new-token"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, expired) = client_with_counter(&server);
    let results = join_all((0..5).map(|_| client.get_post(1))).await;

    for result in results {
        let post = result.expect("replayed request succeeds");
        assert_eq!(post.content, "hello");
    }
    assert_eq!(client.access_token().as_deref(), Some("new-token"));
    assert!(!client.is_refreshing());
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_refresh_expires_every_queued_request() {
    let server = MockServer::start().await;
    mount_post_requiring(&server, "new-token", 0, 3).await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(error_json("invalid refresh token"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, expired) = client_with_counter(&server);
    let results = join_all((0..3).map(|_| client.get_post(1))).await;

    for result in results {
        let err = result.expect_err("session should be expired");
        assert!(err.is_session_expired(), "unexpected error: {err:?}");
    }
    assert_eq!(expired.load(Ordering::SeqCst), 1);
    assert_eq!(client.access_token(), None);
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn test_refresh_server_error_is_treated_as_expired_session() {
    let server = MockServer::start().await;
    mount_post_requiring(&server, "new-token", 0, 1).await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (client, expired) = client_with_counter(&server);
    let err = client.get_post(1).await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_replayed_request_is_not_refreshed_twice() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/posts/1")))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_json("still unauthorized")))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("new-token")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, expired) = client_with_counter(&server);
    let err = client.get_post(1).await.unwrap_err();

    match &err {
        ClientError::Api { status, message, .. } => {
            assert_eq!(*status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "still unauthorized");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.alert_message(),
        "Your session has expired. Please log in again."
    );
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_401_on_refresh_itself_expires_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_json("refresh token required")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, expired) = client_with_counter(&server);
    let err = client.refresh_session().await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(expired.load(Ordering::SeqCst), 1);
    assert_eq!(client.access_token(), None);
}

#[tokio::test]
async fn test_login_401_does_not_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/login")))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(error_json("invalid email or password")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("new-token")))
        .expect(0)
        .mount(&server)
        .await;

    let (client, expired) = client_with_counter(&server);
    let err = client
        .login("alice@example.com", "wrong-password")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(!err.is_session_expired());
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_explicit_refresh_joins_running_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(session_json("new-token"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with_counter(&server);
    let (a, b) = tokio::join!(client.refresh(), client.refresh());

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(client.access_token().as_deref(), Some("new-token"));
}

#[tokio::test]
async fn test_explicit_rotation_waits_for_running_refresh() {
    let server = MockServer::start().await;
    mount_post_requiring(&server, "new-token", 1, 1).await;

    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(session_json("new-token"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/auth/me")))
        .and(header("authorization", "Bearer new-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": user_json(1, "alice")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, expired) = client_with_counter(&server);

    let rotation = {
        let client = client.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(client.is_refreshing());
            client.refresh_session().await
        }
    };
    let (post, session) = tokio::join!(client.get_post(1), rotation);

    assert_eq!(post.expect("replayed request succeeds").id, 1);
    let session = session.expect("rotation joins the running refresh");
    assert_eq!(session.token, "new-token");
    assert_eq!(session.user.username, "alice");
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_leader_hands_refresh_to_waiter() {
    let server = MockServer::start().await;
    mount_post_requiring(&server, "new-token", 2, 3).await;

    // The cancelled leader's call reaches the server too
    Mock::given(method("POST"))
        .and(path(api_path("/auth/refresh")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(session_json("new-token"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let (client, expired) = client_with_counter(&server);

    let leader = {
        let client = client.clone();
        tokio::spawn(async move {
            tokio::time::timeout(Duration::from_millis(150), client.get_post(1)).await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.is_refreshing());

    let results = join_all((0..2).map(|_| client.get_post(1))).await;
    for result in results {
        let post = result.expect("waiter takes over the refresh");
        assert_eq!(post.content, "hello");
    }

    assert!(leader.await.expect("task").is_err(), "leader was cancelled");
    assert_eq!(client.access_token().as_deref(), Some("new-token"));
    assert_eq!(expired.load(Ordering::SeqCst), 0);
    assert!(!client.is_refreshing());
}
