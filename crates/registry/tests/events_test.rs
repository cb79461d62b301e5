//! Integration tests for the lifecycle notification channel.

use std::sync::Arc;

use async_trait::async_trait;
use maestro_registry::{Service, ServiceEvent, ServiceOptions, ServiceRegistry};
use maestro_service::BoxError;

struct Noop;

#[async_trait]
impl Service for Noop {
    async fn init(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

struct FailingInit;

#[async_trait]
impl Service for FailingInit {
    async fn init(&self) -> Result<(), BoxError> {
        Err("boom".into())
    }
}

/// Drain everything currently queued on a receiver.
fn drain(receiver: &mut tokio::sync::broadcast::Receiver<ServiceEvent>) -> Vec<ServiceEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn lifecycle_events_are_delivered_in_emission_order() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let registry = ServiceRegistry::new();
    let mut events = registry.subscribe();

    registry
        .register(
            "a",
            || async { Ok(Arc::new(Noop) as Arc<dyn Service>) },
            ServiceOptions::default(),
        )
        .await;
    registry.init_service("a").await.unwrap();
    registry.dispose_service("a").await.unwrap();

    let received = drain(&mut events);
    assert_eq!(received.len(), 5);
    assert!(matches!(
        received[0],
        ServiceEvent::Registered {
            replaced: false,
            ..
        }
    ));
    assert!(matches!(received[1], ServiceEvent::Initializing { .. }));
    assert!(matches!(received[2], ServiceEvent::Ready { .. }));
    assert!(matches!(received[3], ServiceEvent::Disposing { .. }));
    assert!(matches!(received[4], ServiceEvent::Disposed { .. }));
    for event in &received {
        assert_eq!(event.service_name(), "a");
    }
}

#[tokio::test]
async fn failures_are_announced_with_the_error_message() {
    let registry = ServiceRegistry::new();
    let mut events = registry.subscribe();

    registry
        .register(
            "a",
            || async { Ok(Arc::new(FailingInit) as Arc<dyn Service>) },
            ServiceOptions::default(),
        )
        .await;
    registry.init_service("a").await.unwrap_err();

    let received = drain(&mut events);
    assert_eq!(received.len(), 3);
    match &received[2] {
        ServiceEvent::Error { name, message } => {
            assert_eq!(name, "a");
            assert!(message.contains("boom"));
        }
        other => panic!("expected error event, got {other:?}"),
    }
}

#[tokio::test]
async fn reregistration_is_announced_as_a_replacement() {
    let registry = ServiceRegistry::new();
    let mut events = registry.subscribe();

    for _ in 0..2 {
        registry
            .register(
                "a",
                || async { Ok(Arc::new(Noop) as Arc<dyn Service>) },
                ServiceOptions::default(),
            )
            .await;
    }

    let received = drain(&mut events);
    assert!(matches!(
        received[0],
        ServiceEvent::Registered {
            replaced: false,
            ..
        }
    ));
    assert!(matches!(
        received[1],
        ServiceEvent::Registered { replaced: true, .. }
    ));
}

#[tokio::test]
async fn subscribers_receive_independent_copies() {
    let registry = ServiceRegistry::new();
    let first = registry.subscribe();
    let mut second = registry.subscribe();

    registry
        .register(
            "a",
            || async { Ok(Arc::new(Noop) as Arc<dyn Service>) },
            ServiceOptions::default(),
        )
        .await;

    // Dropping one receiver must not disturb the other.
    drop(first);

    registry.init_service("a").await.unwrap();

    let received = drain(&mut second);
    assert_eq!(received.len(), 3);
    assert!(matches!(received[2], ServiceEvent::Ready { .. }));

    // Late subscribers only see events emitted after they subscribed.
    let mut late = registry.subscribe();
    registry.dispose_service("a").await.unwrap();
    let received = drain(&mut late);
    assert_eq!(received.len(), 2);
    assert!(matches!(received[0], ServiceEvent::Disposing { .. }));
    assert!(matches!(received[1], ServiceEvent::Disposed { .. }));
}
