//! End-to-end modal lifecycle through AppCore: open, sync, interact through
//! the mounted shell or keyboard, sync again.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::{json, Value};
use tether_app::{
    AppConfig, AppCore, KeyCode, LocalKeyboard, MemoryStore, ModalDescriptor, ModalKind,
    ModalProps, ModalRegistry, Result, SessionRecord, ShellElement, ShellOutcome, ShellProps,
    SubmitEvent, TetherError,
};
use tether_testkit::{assert_calls, CallRecorder};

fn confirm(props: ModalProps) -> Result<ShellProps<String>> {
    let payload = props.arguments().get("answer").cloned().unwrap_or(Value::Null);
    Ok(props
        .shell()
        .title("Confirm")
        .body("Proceed?".to_string())
        .footer("ok".to_string())
        .on_submit_handler(props.submit_handler(move || Ok(payload.clone()))))
}

fn notice(props: ModalProps) -> Result<ShellProps<String>> {
    Ok(ShellProps::new().title("Notice").body(props.arguments().to_string()))
}

fn app(keyboard: &LocalKeyboard) -> AppCore<SessionRecord, String> {
    let registry = ModalRegistry::new()
        .with("confirm", confirm)
        .and_then(|r| r.with("notice", notice))
        .unwrap();
    AppCore::new(
        AppConfig::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(keyboard.clone()),
        registry,
        SessionRecord::empty(),
    )
    .unwrap()
}

#[test]
fn cancel_key_runs_hooks_in_order_and_unmounts() {
    let keyboard = LocalKeyboard::new();
    let mut app = app(&keyboard);
    let calls = CallRecorder::new();

    app.open_modal(
        ModalDescriptor::new("confirm")
            .before_cancel(calls.hook("before_cancel"))
            .after_cancel(calls.hook("after_cancel")),
    );
    assert!(app.sync_modals().unwrap().is_some());
    assert_eq!(keyboard.registrations_for(KeyCode::Escape), 1);

    keyboard.press(KeyCode::Escape).unwrap();
    assert_calls!(calls, ["before_cancel", "after_cancel"]);
    assert!(!app.modals().is_active());

    assert!(app.sync_modals().unwrap().is_none());
    assert_eq!(keyboard.registration_count(), 0);

    // A released registration no longer reaches the old handler.
    keyboard.press(KeyCode::Escape).unwrap();
    assert_eq!(calls.count("before_cancel"), 1);
}

#[test]
fn captured_submission_reaches_after_submit_with_payload() {
    let keyboard = LocalKeyboard::new();
    let mut app = app(&keyboard);
    let calls = CallRecorder::new();

    app.open_modal(
        ModalDescriptor::new("confirm")
            .with_arguments(json!({ "answer": { "ok": true } }))
            .before_submit(calls.submit_hook("before_submit"))
            .after_submit(calls.submit_hook("after_submit")),
    );

    let shell = app.sync_modals().unwrap().unwrap();
    let mut event = SubmitEvent::new(ShellElement::Footer);
    assert_eq!(shell.dispatch_submit(&mut event).unwrap(), ShellOutcome::Submitted);
    assert!(event.default_prevented());

    assert_calls!(calls, ["before_submit", "after_submit"]);
    assert_eq!(calls.payloads("after_submit"), vec![json!({ "ok": true })]);
    assert!(!app.modals().is_active());
}

#[test]
fn failing_before_cancel_keeps_shell_mounted() {
    let keyboard = LocalKeyboard::new();
    let mut app = app(&keyboard);
    let calls = CallRecorder::new();

    let id = app.open_modal(
        ModalDescriptor::new("confirm")
            .before_cancel(calls.failing_hook("before_cancel", "unsaved changes"))
            .after_cancel(calls.hook("after_cancel")),
    );
    app.sync_modals().unwrap();

    let shell = app.host().shell().unwrap();
    assert_matches!(
        shell.dispatch_click(ShellElement::Backdrop),
        Err(TetherError::Hook { .. })
    );
    assert_calls!(calls, ["before_cancel"]);

    app.sync_modals().unwrap();
    assert_eq!(app.host().mounted_id(), Some(id));
    assert_eq!(keyboard.registrations_for(KeyCode::Escape), 1);
}

#[test]
fn after_cancel_can_chain_the_next_modal() {
    let keyboard = LocalKeyboard::new();
    let mut app = app(&keyboard);

    let controller = app.modals().clone();
    let first = app.open_modal(ModalDescriptor::new("confirm").after_cancel(move || {
        controller.open_modal(ModalDescriptor::new("notice").with_arguments(json!("step 2")));
        Ok(())
    }));
    app.sync_modals().unwrap();

    keyboard.press(KeyCode::Escape).unwrap();
    assert_eq!(app.modals().active_kind(), Some(ModalKind::from("notice")));

    let shell = app.sync_modals().unwrap().unwrap();
    assert_eq!(shell.layout().body.map(String::as_str), Some("\"step 2\""));
    assert_ne!(app.host().mounted_id(), Some(first));
    assert_eq!(keyboard.registrations_for(KeyCode::Escape), 1);
}

#[test]
fn shell_without_close_handler_ignores_cancel_key() {
    let keyboard = LocalKeyboard::new();
    let mut app = app(&keyboard);

    // `notice` builds its props from scratch, so no close handler is wired.
    let id = app.open_modal(ModalDescriptor::new("notice"));
    let shell = app.sync_modals().unwrap().unwrap();
    assert!(!shell.layout().header.unwrap().close.enabled);

    keyboard.press(KeyCode::Escape).unwrap();
    assert_eq!(app.modals().active_id(), Some(id));
}

#[test]
fn unknown_kind_fails_sync() {
    let keyboard = LocalKeyboard::new();
    let mut app = app(&keyboard);
    app.open_modal(ModalDescriptor::new("does-not-exist"));

    assert_matches!(
        app.sync_modals(),
        Err(TetherError::UnknownModalKind { kind }) if kind == "does-not-exist"
    );
    assert!(app.host().shell().is_none());
}

#[test]
fn replacing_an_open_modal_skips_its_hooks() {
    let keyboard = LocalKeyboard::new();
    let mut app = app(&keyboard);
    let calls = CallRecorder::new();

    app.open_modal(
        ModalDescriptor::new("confirm")
            .before_cancel(calls.hook("first_before"))
            .after_cancel(calls.hook("first_after")),
    );
    app.sync_modals().unwrap();
    let second = app.open_modal(ModalDescriptor::new("notice"));
    app.sync_modals().unwrap();

    assert!(calls.is_empty());
    assert_eq!(app.host().mounted_id(), Some(second));
    assert_eq!(keyboard.registrations_for(KeyCode::Escape), 1);
}

#[test]
fn outdated_shell_cannot_dismiss_the_modal_that_replaced_it() {
    let keyboard = LocalKeyboard::new();
    let mut app = app(&keyboard);
    let calls = CallRecorder::new();

    app.open_modal(ModalDescriptor::new("confirm"));
    app.sync_modals().unwrap();
    // `notice` wires no close handler, so nothing may dismiss it.
    let notice = app.open_modal(
        ModalDescriptor::new("notice")
            .before_cancel(calls.hook("before_cancel"))
            .after_cancel(calls.hook("after_cancel")),
    );

    let stale = app.host().shell().unwrap();
    assert_ne!(app.host().mounted_id(), Some(notice));
    stale.dispatch_click(ShellElement::Backdrop).unwrap();
    assert_eq!(app.modals().active_id(), Some(notice));

    keyboard.press(KeyCode::Escape).unwrap();
    assert_eq!(app.modals().active_id(), Some(notice));
    assert!(calls.is_empty());

    app.sync_modals().unwrap();
    assert_eq!(app.host().mounted_id(), Some(notice));
}
