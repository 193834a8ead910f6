//! Precondition checks and the primary-then-fallback protocol

use std::sync::Arc;

use servicebase::{
    Broadcast, ClientError, Connection, ConnectionManager, ConnectionState, ListenerEvent,
};

use crate::support::{
    is_same, CountingPresence, Journal, MockConnector, RecordingListener, RecordingRegistry,
};

const REQUIRED_VERSION: u64 = 1400500;

struct Fixture {
    journal: Journal,
    presence: Arc<CountingPresence>,
    registry: Arc<RecordingRegistry>,
    primary: Arc<MockConnector>,
    secondary: Arc<MockConnector>,
    manager: ConnectionManager,
}

fn fixture(installed: Option<u64>, primary_ok: bool, secondary_ok: bool) -> Fixture {
    build_fixture(installed, primary_ok, secondary_ok, false)
}

/// Primary that also listens for broadcasts
fn receiver_primary_fixture(primary_ok: bool) -> Fixture {
    build_fixture(Some(REQUIRED_VERSION), primary_ok, true, true)
}

fn build_fixture(
    installed: Option<u64>,
    primary_ok: bool,
    secondary_ok: bool,
    primary_receives: bool,
) -> Fixture {
    let journal = Journal::default();
    let presence = CountingPresence::new(installed);
    let registry = RecordingRegistry::new(&journal);
    let primary = MockConnector::new("primary", primary_ok, &journal);
    let secondary = MockConnector::new("secondary", secondary_ok, &journal);

    let manager = ConnectionManager::builder()
        .supported_client_version(REQUIRED_VERSION)
        .presence(presence.clone())
        .registry(registry.clone())
        .primary({
            let primary = primary.clone();
            move || {
                if primary_receives {
                    Some(Connection::receiver(primary.clone()))
                } else {
                    Some(Connection::direct(primary.clone()))
                }
            }
        })
        .secondary({
            let secondary = secondary.clone();
            move || Some(Connection::receiver(secondary.clone()))
        })
        .build()
        .unwrap();

    Fixture {
        journal,
        presence,
        registry,
        primary,
        secondary,
        manager,
    }
}

#[test]
fn test_absent_counterpart_reports_not_installed() {
    let f = fixture(None, true, true);
    let listener = RecordingListener::new();

    f.manager.start_connection(listener.clone()).unwrap();

    assert_eq!(
        listener.events(),
        vec![ListenerEvent::Error(ClientError::not_installed())]
    );
    assert_eq!(f.manager.state(), ConnectionState::Disconnected);
    assert_eq!(f.primary.starts(), 0);
    assert_eq!(f.secondary.starts(), 0);
    assert_eq!(f.manager.stats().precondition_failures, 1);
}

#[test]
fn test_old_counterpart_reports_not_compatible() {
    let f = fixture(Some(REQUIRED_VERSION - 1), true, true);
    let listener = RecordingListener::new();

    f.manager.start_connection(listener.clone()).unwrap();

    assert_eq!(
        listener.events(),
        vec![ListenerEvent::Error(ClientError::not_compatible())]
    );
    assert_eq!(f.manager.state(), ConnectionState::Disconnected);
    assert_eq!(f.primary.starts(), 0);
    assert!(f.journal.entries().is_empty());
}

#[test]
fn test_exact_required_version_is_accepted() {
    let f = fixture(Some(REQUIRED_VERSION), true, true);
    let listener = RecordingListener::new();

    f.manager.start_connection(listener.clone()).unwrap();

    assert_eq!(listener.events(), vec![ListenerEvent::Ready]);
    assert_eq!(f.presence.queries(), 1);
}

#[test]
fn test_primary_success_never_touches_secondary() {
    let f = fixture(Some(REQUIRED_VERSION), true, true);
    let listener = RecordingListener::new();

    f.manager.start_connection(listener.clone()).unwrap();

    assert_eq!(listener.events(), vec![ListenerEvent::Ready]);
    assert_eq!(f.manager.state(), ConnectionState::Connected);
    assert!(f.manager.is_ready());
    assert_eq!(f.manager.active_connector(), Some("primary"));
    assert_eq!(f.secondary.starts(), 0);
    assert!(f.registry.added.lock().is_empty());
    assert_eq!(f.journal.entries(), vec!["start:primary"]);
}

#[test]
fn test_fallback_registers_observer_before_start() {
    let f = fixture(Some(REQUIRED_VERSION), false, true);
    let listener = RecordingListener::new();

    f.manager.start_connection(listener.clone()).unwrap();

    assert_eq!(listener.events(), vec![ListenerEvent::Ready]);
    assert_eq!(f.manager.active_connector(), Some("secondary"));
    assert_eq!(
        f.journal.entries(),
        vec!["start:primary", "add_observer", "start:secondary"]
    );

    let added = f.registry.added.lock();
    assert_eq!(added.len(), 1);
    assert!(is_same(&added[0], &f.secondary));
    assert!(!is_same(&added[0], &f.primary));
    assert_eq!(f.manager.stats().fallback_connects, 1);
}

#[test]
fn test_receiver_primary_is_never_registered() {
    let f = receiver_primary_fixture(false);
    let listener = RecordingListener::new();

    f.manager.start_connection(listener.clone()).unwrap();

    assert_eq!(listener.events(), vec![ListenerEvent::Ready]);
    assert_eq!(f.manager.active_connector(), Some("secondary"));
    assert_eq!(
        f.journal.entries(),
        vec!["start:primary", "add_observer", "start:secondary"]
    );

    let added = f.registry.added.lock();
    assert_eq!(added.len(), 1);
    assert!(is_same(&added[0], &f.secondary));
    assert!(!added.iter().any(|observer| is_same(observer, &f.primary)));
}

#[test]
fn test_receiver_primary_unregistered_on_teardown() {
    let f = receiver_primary_fixture(true);
    f.manager.start_connection(RecordingListener::new()).unwrap();
    assert_eq!(f.manager.active_connector(), Some("primary"));
    assert!(f.registry.added.lock().is_empty());

    f.manager.end_connection();

    assert_eq!(
        f.journal.entries(),
        vec!["start:primary", "remove_observer", "stop:primary"]
    );
    let removed = f.registry.removed.lock();
    assert_eq!(removed.len(), 1);
    assert!(is_same(&removed[0], &f.primary));
    assert_eq!(f.manager.state(), ConnectionState::Disconnected);
    assert_eq!(f.secondary.starts(), 0);
}

#[test]
fn test_registered_fallback_receives_broadcasts() {
    let f = fixture(Some(REQUIRED_VERSION), false, true);
    f.manager.start_connection(RecordingListener::new()).unwrap();

    let delivered = f
        .registry
        .inner
        .dispatch(&Broadcast::new("com.farsitel.bazaar.ping", &b""[..]));

    assert_eq!(delivered, 1);
    assert_eq!(
        f.secondary
            .broadcasts
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[test]
fn test_both_connectors_fail() {
    let f = fixture(Some(REQUIRED_VERSION), false, false);
    let listener = RecordingListener::new();

    f.manager.start_connection(listener.clone()).unwrap();

    assert_eq!(
        listener.events(),
        vec![ListenerEvent::Error(ClientError::could_not_connect())]
    );
    assert_eq!(f.manager.state(), ConnectionState::Disconnected);
    assert!(!f.manager.is_ready());
    assert_eq!(f.manager.active_connector(), None);
    // The failed fallback does not stay registered
    assert!(f.registry.inner.is_empty());
    assert_eq!(f.manager.stats().connect_failures, 1);
}

#[test]
fn test_failed_attempt_can_be_retried_explicitly() {
    let f = fixture(Some(REQUIRED_VERSION), false, false);
    let listener = RecordingListener::new();

    f.manager.start_connection(listener.clone()).unwrap();
    f.manager.start_connection(listener.clone()).unwrap();

    assert_eq!(listener.errors().len(), 2);
    assert_eq!(f.primary.starts(), 2);
    assert_eq!(f.secondary.starts(), 2);
}

#[test]
fn test_unavailable_factories_fall_through() {
    let journal = Journal::default();
    let secondary = MockConnector::new("secondary", true, &journal);
    let manager = ConnectionManager::builder()
        .presence(CountingPresence::new(Some(1)))
        .registry(RecordingRegistry::new(&journal))
        .primary(|| None)
        .secondary({
            let secondary = secondary.clone();
            move || Some(Connection::direct(secondary.clone()))
        })
        .build()
        .unwrap();

    let listener = RecordingListener::new();
    manager.start_connection(listener.clone()).unwrap();

    assert_eq!(listener.events(), vec![ListenerEvent::Ready]);
    // A plain fallback is never registered
    assert_eq!(journal.entries(), vec!["start:secondary"]);
}

#[test]
fn test_no_factories_cannot_connect() {
    let manager = ConnectionManager::builder()
        .presence(CountingPresence::new(Some(1)))
        .registry(RecordingRegistry::new(&Journal::default()))
        .build()
        .unwrap();

    let listener = RecordingListener::new();
    manager.start_connection(listener.clone()).unwrap();

    assert_eq!(listener.errors(), vec![ClientError::could_not_connect()]);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}
