//! Session persistence against instrumented stores.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use assert_matches::assert_matches;
use proptest::prelude::*;
use tether_app::session::serialize_session;
use tether_app::{
    AppConfig, AppCore, KeyValueStore, LocalKeyboard, ModalRegistry, Session, SessionRecord,
    TetherError,
};
use tether_testkit::strategies::arb_user_sequence;
use tether_testkit::{assert_stored, CountingStore, FailingStore, ValueLog};

#[test]
fn each_set_writes_exactly_once() {
    let store = CountingStore::new();
    let session = Session::new(SessionRecord::empty(), Arc::new(store.clone()), "session").unwrap();
    assert_eq!(store.writes(), 0);

    session.set(SessionRecord::for_user("a")).unwrap();
    assert_eq!(store.writes(), 1);
    assert_stored!(store, "session", r#"{"user":"a"}"#);

    session.set(SessionRecord::for_user("b")).unwrap();
    assert_eq!(store.writes(), 2);
    assert_eq!(
        store.last_write(),
        Some(("session".to_string(), r#"{"user":"b"}"#.to_string()))
    );
}

#[test]
fn storage_failure_surfaces_from_set() {
    let store = FailingStore::new();
    let session = Session::new(SessionRecord::empty(), Arc::new(store.clone()), "session").unwrap();

    assert_matches!(
        session.set(SessionRecord::for_user("a")),
        Err(TetherError::Storage { .. })
    );
    // The in-memory value was already replaced.
    assert_eq!(session.get().unwrap().user.as_deref(), Some("a"));
    assert_stored!(store.memory(), "session", None);
}

#[test]
fn other_observers_see_values_after_persistence() {
    let store = CountingStore::new();
    let session = Session::new(SessionRecord::empty(), Arc::new(store.clone()), "session").unwrap();
    let seen = ValueLog::<SessionRecord>::new();
    session.container().bind(seen.reaction()).unwrap();

    session
        .update(|record| record.with_attribute("theme", "dark"))
        .unwrap();
    assert_eq!(seen.values().len(), 1);
    assert_eq!(seen.values()[0].attributes["theme"], "dark");
    assert_eq!(store.writes(), 1);
}

#[test]
fn restart_restores_previous_session() {
    let store = CountingStore::new();
    {
        let app: AppCore<SessionRecord, String> = AppCore::new(
            AppConfig::default(),
            Arc::new(store.clone()),
            Arc::new(LocalKeyboard::new()),
            ModalRegistry::new(),
            SessionRecord::empty(),
        )
        .unwrap();
        app.session()
            .set(SessionRecord::for_user("kim").with_attribute("locale", "en"))
            .unwrap();
        app.shutdown();
    }

    let app: AppCore<SessionRecord, String> = AppCore::restore(
        AppConfig::default(),
        Arc::new(store.clone()),
        Arc::new(LocalKeyboard::new()),
        ModalRegistry::new(),
        SessionRecord::empty(),
    )
    .unwrap();
    let restored = app.session().get().unwrap();
    assert_eq!(restored.user.as_deref(), Some("kim"));
    assert_eq!(restored.attributes["locale"], "en");
    // Restoring does not write.
    assert_eq!(store.writes(), 1);
}

proptest! {
    #[test]
    fn last_set_wins_in_storage(users in arb_user_sequence(12)) {
        let store = CountingStore::new();
        let session = Session::new(SessionRecord::empty(), Arc::new(store.clone()), "session").unwrap();

        for user in &users {
            session.set(SessionRecord::for_user(user.as_str())).unwrap();
        }

        let last = SessionRecord::for_user(users[users.len() - 1].as_str());
        prop_assert_eq!(store.writes(), users.len());
        prop_assert_eq!(
            store.get_item("session").unwrap(),
            Some(serialize_session(&last).unwrap())
        );
        prop_assert_eq!(session.get().unwrap(), last);
    }
}
