use gitpull::{
    FailureKind, Phase, SessionError, SessionParams, SyncFailure, SyncNotice, SyncSession,
};
use gitpull_sse::start_session;
use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO: &str = "https://github.com/acme/content";

fn session_for(server: &MockServer) -> SyncSession {
    let mut params = SessionParams::new(format!("{}/user/alice", server.uri()), REPO);
    params.branch = Some("main".into());
    params.xsrf = Some("tok".into());
    params.path = "lab/tree/content/index.ipynb".into();
    SyncSession::new(params)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<SyncNotice>) -> Vec<SyncNotice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

async fn mount_stream(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/user/alice/git-pull/api"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_owned(), "text/event-stream"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn sync_runs_to_finished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/alice/git-pull/api"))
        .and(query_param("repo", REPO))
        .and(query_param("targetpath", "content"))
        .and(query_param("branch", "main"))
        .and(query_param("_xsrf", "tok"))
        .and(header("Accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            concat!(
                "data: {\"phase\":\"syncing\",\"output\":\"Fetching origin\\n\"}\n\n",
                "data: {\"phase\":\"syncing\",\"output\":\"Already up to date.\\n\"}\n\n",
                "data: {\"phase\":\"finished\"}\n\n",
            ),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut rx = session.subscribe();
    let client = reqwest::Client::new();

    let phase = start_session(&mut session, &client).await.unwrap();

    assert_eq!(phase, Phase::Finished);
    assert_eq!(
        drain(&mut rx),
        vec![
            SyncNotice::Syncing { output: "Fetching origin\n".into() },
            SyncNotice::Syncing { output: "Already up to date.\n".into() },
            SyncNotice::Finished {
                redirect_url: format!("{}/user/alice/lab/tree/content/index.ipynb", server.uri()),
            },
        ]
    );
    assert_eq!(session.output().len(), 2);
    assert!(!session.is_open());
}

#[tokio::test]
async fn merge_failure_is_classified() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "data: {\"phase\":\"error\",\"message\":\"Automatic merge failed\",\"output\":\"Traceback\"}\n\n",
    )
    .await;

    let mut session = session_for(&server);
    let mut rx = session.subscribe();

    let phase = start_session(&mut session, &reqwest::Client::new()).await.unwrap();

    assert_eq!(phase, Phase::Error);
    let notices = drain(&mut rx);
    let SyncNotice::Error(failure) = &notices[0] else {
        panic!("expected an error notice, got {notices:?}");
    };
    assert_eq!(failure.kind(), FailureKind::MergeConflict);
    assert_eq!(failure.output.as_deref(), Some("Traceback"));
}

#[tokio::test]
async fn http_error_status_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/alice/git-pull/api"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut rx = session.subscribe();

    let phase = start_session(&mut session, &reqwest::Client::new()).await.unwrap();

    assert_eq!(phase, Phase::Error);
    assert_eq!(drain(&mut rx), vec![SyncNotice::Error(SyncFailure::transport())]);
}

#[tokio::test]
async fn wrong_content_type_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/alice/git-pull/api"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut rx = session.subscribe();

    let phase = start_session(&mut session, &reqwest::Client::new()).await.unwrap();

    assert_eq!(phase, Phase::Error);
    assert_eq!(drain(&mut rx), vec![SyncNotice::Error(SyncFailure::transport())]);
}

#[tokio::test]
async fn stream_ending_before_terminal_phase_is_error() {
    let server = MockServer::start().await;
    mount_stream(&server, "data: {\"phase\":\"syncing\",\"output\":\"a\"}\n\n").await;

    let mut session = session_for(&server);
    let mut rx = session.subscribe();

    let phase = start_session(&mut session, &reqwest::Client::new()).await.unwrap();

    assert_eq!(phase, Phase::Error);
    assert_eq!(
        drain(&mut rx),
        vec![
            SyncNotice::Syncing { output: "a".into() },
            SyncNotice::Error(SyncFailure::transport()),
        ]
    );
}

#[tokio::test]
async fn named_events_and_unknown_phases_are_ignored() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        concat!(
            ": keepalive\n\n",
            "event: heartbeat\ndata: {\"phase\":\"error\",\"message\":\"nope\"}\n\n",
            "data: {\"phase\":\"compressing\"}\n\n",
            "data: not json\n\n",
            "data: {\"phase\":\"finished\"}\n\n",
        ),
    )
    .await;

    let mut session = session_for(&server);
    let mut rx = session.subscribe();

    let phase = start_session(&mut session, &reqwest::Client::new()).await.unwrap();

    assert_eq!(phase, Phase::Finished);
    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert!(matches!(notices[0], SyncNotice::Finished { .. }));
}

#[tokio::test]
async fn relative_base_url_is_rejected_before_connecting() {
    let mut session = SyncSession::new(SessionParams::new("/user/alice/", REPO));
    let mut rx = session.subscribe();

    let result = start_session(&mut session, &reqwest::Client::new()).await;

    assert!(matches!(result, Err(SessionError::RelativeBaseUrl(_))));
    assert_eq!(session.phase(), Phase::Idle);
    assert!(drain(&mut rx).is_empty());
}
