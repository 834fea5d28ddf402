//! Minimal headless host. Boots an [`AppCore`] over an in-memory store and
//! keyboard, then replays a short scripted session: sign in, confirm a
//! submit dialog, dismiss a second one from the backdrop and a third with the
//! cancel key, and print what ended up persisted. Useful for checking a
//! config file and for watching the transition logs (`RUST_LOG=debug`).
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tether_app::{
    AppConfig, AppCore, KeyValueStore, LocalKeyboard, MemoryStore, ModalDescriptor, ModalProps,
    ModalRegistry, SessionRecord, ShellElement, ShellProps, SubmitEvent,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tether-host", about = "Replay a scripted modal session against AppCore")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// User to sign in as
    #[arg(long, default_value = "demo")]
    user: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.merge_with_env().context("applying TETHER_* overrides")?;
    Ok(config)
}

fn confirm(props: ModalProps) -> tether_app::Result<ShellProps<String>> {
    let question = props.arguments()["question"]
        .as_str()
        .unwrap_or("Continue?")
        .to_string();
    let answer = props.arguments().clone();
    Ok(props
        .shell()
        .title("Confirm")
        .body(question)
        .footer("[Enter] confirm  [Esc] cancel".to_string())
        .on_submit_handler(props.submit_handler(move || Ok(answer.clone()))))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = load_config(args.config.as_ref())?;
    let store = MemoryStore::new();
    let keyboard = LocalKeyboard::new();
    let mut app: AppCore<SessionRecord, String> = AppCore::new(
        config,
        Arc::new(store.clone()),
        Arc::new(keyboard.clone()),
        ModalRegistry::new().with("confirm", confirm)?,
        SessionRecord::empty(),
    )?;

    app.session()
        .set(SessionRecord::for_user(&args.user).with_display_name(args.user.to_uppercase()))?;

    let session = app.session().container().clone();
    app.open_modal(
        ModalDescriptor::new("confirm")
            .with_arguments(json!({ "question": "Remember this device?" }))
            .after_submit(move |_| {
                session.update(|record| record.with_attribute("trusted_device", "yes"))
            }),
    );
    if let Some(shell) = app.sync_modals()? {
        let mut event = SubmitEvent::new(ShellElement::Footer);
        let outcome = shell.dispatch_submit(&mut event)?;
        println!("first dialog: {outcome:?}");
    }
    app.sync_modals()?;

    app.open_modal(
        ModalDescriptor::new("confirm")
            .with_arguments(json!({ "question": "Sign out?" }))
            .after_cancel(|| {
                tracing::info!("sign-out cancelled");
                Ok(())
            }),
    );
    if let Some(shell) = app.sync_modals()? {
        let outcome = shell.dispatch_click(ShellElement::Backdrop)?;
        println!("second dialog: {outcome:?}");
    }
    app.sync_modals()?;

    app.open_modal(ModalDescriptor::new("confirm"));
    app.sync_modals()?;
    let cancel_key = app.config().cancel_key;
    let delivered = keyboard.press(cancel_key)?;
    println!("third dialog: {delivered} handler(s) for {cancel_key}");
    app.sync_modals()?;

    let key = app.config().session_key.clone();
    let persisted = store
        .get_item(&key)?
        .context("session was never persisted")?;
    println!("modal active: {}", app.modals().is_active());
    println!("persisted {key}: {persisted}");

    app.shutdown();
    Ok(())
}
