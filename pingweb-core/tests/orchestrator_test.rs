use fake_transport::{FakeTransport, RecordedCall};
use pingweb_core::{
    ClientConfig, EncodingMode, Notification, Orchestrator, PingError, Severity, Transports,
    UnaryMethod,
    messages::{MessagePing, MessagePong},
    orchestrator::Outcome,
    session::SessionEnd,
};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

mod fake_transport;

type TestOrchestrator = Orchestrator<FakeTransport, UnboundedSender<Notification>>;

fn orchestrator(
    text: FakeTransport,
    binary: FakeTransport,
) -> (TestOrchestrator, UnboundedReceiver<Notification>) {
    let (sink, notifications) = unbounded_channel();
    let orchestrator = Orchestrator::new(
        Transports::new(text, binary),
        sink,
        ClientConfig::default(),
    );
    (orchestrator, notifications)
}

fn drain(notifications: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = vec![];
    while let Ok(notification) = notifications.try_recv() {
        out.push(notification);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_ping_reports_response_after_delay() {
    let text = FakeTransport::new(EncodingMode::Text);
    let binary = FakeTransport::new(EncodingMode::Binary);
    let (orchestrator, mut notifications) = orchestrator(text.clone(), binary.clone());

    let ping = orchestrator.ping("11111", EncodingMode::Text);
    tokio::pin!(ping);

    // The call has answered but the success is held back.
    let early = tokio::time::timeout(Duration::from_millis(499), &mut ping).await;
    assert!(early.is_err());
    assert!(drain(&mut notifications).is_empty());

    let pong = ping.await.unwrap();

    assert_eq!(
        pong,
        MessagePong {
            timestamp: 11111,
            service_name: "svc-a".to_string()
        }
    );
    assert_eq!(
        drain(&mut notifications),
        vec![Notification::success("Resp: 11111 - svc-a")]
    );
    assert_eq!(
        text.calls(),
        vec![RecordedCall::Unary {
            method: UnaryMethod::ServiceAPing,
            payload: MessagePing { timestamp: 11111 },
            headers: vec![("custom-header-1".to_string(), "value1".to_string())],
        }]
    );
    assert!(binary.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_digit_only_inputs_issue_exactly_one_call() {
    for (input, expected) in [("0", 0), ("42", 42), (" 11111 ", 11111), ("007", 7)] {
        let text = FakeTransport::new(EncodingMode::Text);
        let (orchestrator, mut notifications) =
            orchestrator(text.clone(), FakeTransport::new(EncodingMode::Binary));

        orchestrator.ping(input, EncodingMode::Text).await.unwrap();

        assert_eq!(
            text.calls(),
            vec![RecordedCall::Unary {
                method: UnaryMethod::ServiceAPing,
                payload: MessagePing {
                    timestamp: expected
                },
                headers: vec![("custom-header-1".to_string(), "value1".to_string())],
            }],
            "input {input:?}"
        );
        assert_eq!(drain(&mut notifications).len(), 1);
    }
}

#[tokio::test]
async fn test_invalid_inputs_issue_no_call() {
    for input in ["abc", "-1", "12.5", "1e3", "", "99999999999999999999"] {
        let text = FakeTransport::new(EncodingMode::Text);
        let binary = FakeTransport::new(EncodingMode::Binary);
        let (orchestrator, mut notifications) = orchestrator(text.clone(), binary.clone());

        let err = orchestrator.ping(input, EncodingMode::Text).await.unwrap_err();

        assert!(matches!(err, PingError::InvalidInput { .. }), "input {input:?}");
        assert!(text.calls().is_empty());
        assert!(binary.calls().is_empty());

        let notifications = drain(&mut notifications);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].severity, Severity::Danger);
        assert!(notifications[0].message.contains("invalid format"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_mode_is_chosen_per_call() {
    let text = FakeTransport::new(EncodingMode::Text);
    let binary = FakeTransport::new(EncodingMode::Binary);
    let (orchestrator, _notifications) = orchestrator(text.clone(), binary.clone());

    orchestrator.ping("1", EncodingMode::Text).await.unwrap();
    orchestrator.ping("2", EncodingMode::Binary).await.unwrap();

    assert_eq!(text.calls().len(), 1);
    assert_eq!(binary.calls().len(), 1);
    assert!(matches!(
        &binary.calls()[0],
        RecordedCall::Unary { payload, .. } if payload.timestamp == 2
    ));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_in_both_modes() {
    let text = FakeTransport::new(EncodingMode::Text);
    let binary = FakeTransport::new(EncodingMode::Binary);
    let (orchestrator, mut notifications) = orchestrator(text.clone(), binary.clone());

    let (a, b) = tokio::join!(
        orchestrator.ping("1", EncodingMode::Text),
        orchestrator.ping("2", EncodingMode::Binary),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(text.calls().len(), 1);
    assert_eq!(binary.calls().len(), 1);
    assert_eq!(drain(&mut notifications).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_is_reported_immediately() {
    let text = FakeTransport::new(EncodingMode::Text)
        .with_unary_error(tonic::Status::unavailable("gateway down"));
    let (orchestrator, mut notifications) =
        orchestrator(text.clone(), FakeTransport::new(EncodingMode::Binary));

    let started = tokio::time::Instant::now();
    let err = orchestrator.ping("5", EncodingMode::Text).await.unwrap_err();

    assert_eq!(started.elapsed(), Duration::ZERO);
    match err {
        PingError::Transport(status) => {
            assert_eq!(status.code(), tonic::Code::Unavailable);
            assert_eq!(status.message(), "gateway down");
        }
        other => panic!("Unexpected error: {other:?}"),
    }
    assert_eq!(
        drain(&mut notifications),
        vec![Notification::danger("Error code: 14 \"gateway down\"")]
    );
    // no retry
    assert_eq!(text.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_orchestrator_stays_usable_after_a_failure() {
    let (orchestrator, mut notifications) = orchestrator(
        FakeTransport::new(EncodingMode::Text),
        FakeTransport::new(EncodingMode::Binary),
    );

    assert!(orchestrator.ping("nope", EncodingMode::Text).await.is_err());
    assert!(orchestrator.ping("7", EncodingMode::Text).await.is_ok());

    let severities: Vec<_> = drain(&mut notifications)
        .into_iter()
        .map(|n| n.severity)
        .collect();
    assert_eq!(severities, vec![Severity::Danger, Severity::Success]);
}

#[tokio::test(start_paused = true)]
async fn test_unary_methods_keep_their_path() {
    let text = FakeTransport::new(EncodingMode::Text);
    let (orchestrator, _notifications) =
        orchestrator(text.clone(), FakeTransport::new(EncodingMode::Binary));

    orchestrator
        .unary(UnaryMethod::ServiceExtraPost, "3", EncodingMode::Text)
        .await
        .unwrap();

    match &text.calls()[0] {
        RecordedCall::Unary { method, .. } => {
            assert_eq!(*method, UnaryMethod::ServiceExtraPost);
            assert_eq!(method.path(), "/v2.ServiceExtra/Post");
        }
        other => panic!("Unexpected call: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_submit_dispatches_by_input_shape() {
    let text = FakeTransport::new(EncodingMode::Text).with_stream(vec![
        Ok(fake_transport::pong(5000, 0)),
        Ok(fake_transport::pong(5000, 1)),
    ]);
    let (orchestrator, mut notifications) =
        orchestrator(text.clone(), FakeTransport::new(EncodingMode::Binary));

    assert_eq!(
        orchestrator.submit("   ", EncodingMode::Text).await.unwrap(),
        Outcome::Ignored
    );
    assert!(text.calls().is_empty());
    assert!(drain(&mut notifications).is_empty());

    assert!(matches!(
        orchestrator.submit("11111", EncodingMode::Text).await.unwrap(),
        Outcome::Pong(_)
    ));

    assert_eq!(
        orchestrator.submit("20 5000", EncodingMode::Text).await.unwrap(),
        Outcome::Streamed {
            received: 2,
            end: SessionEnd::Completed
        }
    );

    let calls = text.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], RecordedCall::Unary { .. }));
    assert!(matches!(calls[1], RecordedCall::Streaming { .. }));
}
