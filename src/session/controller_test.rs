use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use super::*;
use crate::session::monitor::MonitorPhase;
use crate::util::storage::{MemoryStorage, StorageBackend, UnavailableStorage};

struct Fixture {
    controller: AuthSessionController,
    tokens: TokenStore,
    notices: Arc<AtomicUsize>,
}

fn fixture_with(tokens: TokenStore) -> Fixture {
    let monitor = SessionMonitor::new(Duration::from_secs(60), Duration::from_secs(5));
    let controller = AuthSessionController::new(tokens.clone(), monitor);
    let notices = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&notices);
    controller.set_expiry_notifier(move || {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    Fixture { controller, tokens, notices }
}

fn fixture() -> Fixture {
    fixture_with(TokenStore::new(Arc::new(MemoryStorage::new()), "auth"))
}

fn recorded_states(controller: &AuthSessionController) -> Arc<Mutex<Vec<AuthState>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    controller.subscribe(move |s| sink.lock().unwrap().push(*s));
    seen
}

// =============================================================================
// mount
// =============================================================================

#[test]
fn unmounted_controller_is_uninitialized() {
    let f = fixture();
    assert!(f.controller.is_loading());
    assert!(!f.controller.is_authenticated());
}

#[test]
fn mount_without_token_resolves_unauthenticated() {
    let f = fixture();
    f.controller.mount();
    assert_eq!(f.controller.state(), AuthState::resolved(false));
}

#[test]
fn mount_with_stored_token_resolves_authenticated() {
    let f = fixture();
    f.tokens.set(&Token::from("persisted"));
    f.controller.mount();
    assert_eq!(f.controller.state(), AuthState::resolved(true));
}

#[test]
fn mount_publishes_single_resolved_state() {
    let f = fixture();
    f.tokens.set(&Token::from("persisted"));
    let seen = recorded_states(&f.controller);
    f.controller.mount();
    assert_eq!(*seen.lock().unwrap(), vec![AuthState::resolved(true)]);
}

#[test]
fn mount_arms_the_monitor() {
    let f = fixture();
    f.controller.mount();
    assert_eq!(f.controller.monitor().phase(), MonitorPhase::Armed);
}

#[test]
fn mount_outside_browser_resolves_unauthenticated() {
    let f = fixture_with(TokenStore::new(Arc::new(UnavailableStorage), "auth"));
    f.controller.mount();
    assert_eq!(f.controller.state(), AuthState::resolved(false));
}

#[test]
fn unmount_tears_down_monitor() {
    let f = fixture();
    f.controller.mount();
    f.controller.unmount();
    assert_eq!(f.controller.monitor().phase(), MonitorPhase::Idle);
    f.controller.unmount();
}

// =============================================================================
// login / logout
// =============================================================================

#[test]
fn login_then_logout_scenario() {
    let f = fixture();
    f.controller.mount();

    f.controller.login(Token::from("tok-123"));
    assert_eq!(f.tokens.get(), Some(Token::from("tok-123")));
    assert!(f.tokens.is_authenticated());
    assert!(f.controller.is_authenticated());

    f.controller.logout();
    assert!(f.tokens.get().is_none());
    assert!(!f.tokens.is_authenticated());
    assert!(!f.controller.is_authenticated());
}

#[test]
fn login_before_mount_resolves_loading() {
    let f = fixture();
    f.controller.login(Token::from("tok"));
    assert_eq!(f.controller.state(), AuthState::resolved(true));
}

#[test]
fn login_with_blank_token_is_ignored() {
    let f = fixture();
    f.controller.mount();
    f.controller.login(Token::from("  "));
    assert!(!f.controller.is_authenticated());
    assert!(f.tokens.get().is_none());
}

#[test]
fn login_replaces_previous_token() {
    let f = fixture();
    f.controller.login(Token::from("old"));
    f.controller.login(Token::from("new"));
    assert_eq!(f.tokens.get(), Some(Token::from("new")));
}

#[test]
fn double_logout_is_idempotent_and_silent() {
    let f = fixture();
    f.controller.mount();
    f.controller.login(Token::from("tok"));
    let seen = recorded_states(&f.controller);

    f.controller.logout();
    f.controller.logout();

    assert!(f.tokens.get().is_none());
    assert!(!f.controller.is_authenticated());
    assert_eq!(*seen.lock().unwrap(), vec![AuthState::resolved(false)]);
    assert_eq!(f.notices.load(Ordering::SeqCst), 0);
}

#[test]
fn logout_when_never_logged_in_does_not_error() {
    let f = fixture();
    f.controller.logout();
    assert_eq!(f.controller.state(), AuthState::resolved(false));
}

// =============================================================================
// expiry
// =============================================================================

#[test]
fn expiry_logs_out_and_notifies_once() {
    let f = fixture();
    f.controller.mount();
    f.controller.login(Token::from("tok"));

    f.controller.monitor().signal_expired();
    f.controller.monitor().signal_expired();

    assert!(!f.controller.is_authenticated());
    assert!(f.tokens.get().is_none());
    assert_eq!(f.notices.load(Ordering::SeqCst), 1);
}

#[test]
fn logout_after_expiry_adds_no_notice() {
    let f = fixture();
    f.controller.login(Token::from("tok"));
    f.controller.monitor().signal_expired();
    f.controller.logout();
    f.controller.logout();
    assert_eq!(f.notices.load(Ordering::SeqCst), 1);
}

#[test]
fn expiry_while_logged_out_is_silent() {
    let f = fixture();
    f.controller.mount();
    f.controller.monitor().signal_expired();
    assert_eq!(f.notices.load(Ordering::SeqCst), 0);
    assert!(!f.controller.is_authenticated());
}

#[test]
fn idle_tab_expiry_keeps_token_stored_by_another_tab() {
    let shared = Arc::new(MemoryStorage::new());
    let tab_a = fixture_with(TokenStore::new(shared.clone(), "auth"));
    let tab_b = fixture_with(TokenStore::new(shared, "auth"));
    tab_a.controller.mount();
    tab_b.controller.mount();

    tab_b.controller.login(Token::from("tok-b"));
    assert!(tab_a.controller.monitor().poll(u64::MAX));

    assert_eq!(tab_b.tokens.get(), Some(Token::from("tok-b")));
    assert!(tab_b.controller.is_authenticated());
    assert!(!tab_a.controller.is_authenticated());
    assert_eq!(tab_a.notices.load(Ordering::SeqCst), 0);
}

#[test]
fn logout_clears_token_even_when_unauthenticated() {
    let shared = Arc::new(MemoryStorage::new());
    let f = fixture_with(TokenStore::new(shared.clone(), "auth"));
    f.controller.mount();
    shared.set_item("auth", "stray").unwrap();
    f.controller.logout();
    assert!(f.tokens.get().is_none());
}

#[test]
fn new_login_rearms_after_expiry() {
    let f = fixture();
    f.controller.login(Token::from("first"));
    f.controller.monitor().signal_expired();
    assert_eq!(f.controller.monitor().phase(), MonitorPhase::Expired);

    f.controller.login(Token::from("second"));
    assert_eq!(f.controller.monitor().phase(), MonitorPhase::Armed);
    f.controller.monitor().signal_expired();
    assert_eq!(f.notices.load(Ordering::SeqCst), 2);
}

#[test]
fn inactivity_poll_expires_session() {
    let f = fixture();
    f.controller.login(Token::from("tok"));
    assert!(f.controller.monitor().poll(u64::MAX));
    assert!(!f.controller.is_authenticated());
    assert_eq!(f.notices.load(Ordering::SeqCst), 1);
}

#[test]
fn expiry_after_unmount_does_nothing() {
    let f = fixture();
    f.controller.login(Token::from("tok"));
    f.controller.unmount();
    assert!(!f.controller.monitor().signal_expired());
    assert!(f.controller.is_authenticated());
    assert_eq!(f.notices.load(Ordering::SeqCst), 0);
}

#[test]
fn dropped_controller_does_not_fire_through_monitor() {
    let f = fixture();
    let monitor = f.controller.monitor().clone();
    f.controller.login(Token::from("tok"));
    drop(f.controller);
    assert!(monitor.signal_expired());
    assert_eq!(f.notices.load(Ordering::SeqCst), 0);
    assert_eq!(f.tokens.get(), Some(Token::from("tok")));
}

// =============================================================================
// subscriptions
// =============================================================================

#[test]
fn subscribers_receive_changes_in_order() {
    let f = fixture();
    let seen = recorded_states(&f.controller);
    f.controller.mount();
    f.controller.login(Token::from("tok"));
    f.controller.logout();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![AuthState::resolved(false), AuthState::resolved(true), AuthState::resolved(false)]
    );
}

#[test]
fn unsubscribed_observer_stops_receiving() {
    let f = fixture();
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    let id = f.controller.subscribe(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    f.controller.mount();
    f.controller.unsubscribe(id);
    f.controller.login(Token::from("tok"));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn subscriber_may_read_controller_state() {
    let f = fixture();
    let controller = f.controller.clone();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    f.controller.subscribe(move |_| sink.lock().unwrap().push(controller.is_authenticated()));
    f.controller.login(Token::from("tok"));
    assert_eq!(*seen.lock().unwrap(), vec![true]);
}
