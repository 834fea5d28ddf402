//! # Dialog Shell
//!
//! Headless interaction contract for whatever renders the active modal. The
//! shell does not draw anything; it decides which blocks exist and how user
//! input maps onto the close and submit handlers it was given.
//!
//! ## Element tree
//!
//! ```text
//! Backdrop
//! └── Dialog
//!     └── Content            (form region when a submit handler is present)
//!         ├── Header
//!         │   ├── Title
//!         │   └── CloseButton
//!         ├── Body
//!         └── Footer
//! ```
//!
//! ## Rules
//!
//! - The close button is laid out whenever the header is; without a close
//!   handler it is disabled and activating it does nothing.
//! - Only a click whose target *is* the backdrop dismisses. Clicks inside the
//!   dialog bubble up to the backdrop listener but are ignored there.
//! - While mounted the shell holds a keyboard registration for the cancel key.
//!   The registration is a [`ShortcutGuard`], released on unmount, on
//!   replacement and on drop.
//! - With a submit handler, a submission raised inside the content box has its
//!   default action prevented and calls the handler once.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tether_core::{KeyCode, KeyboardDispatcher, Result, Shortcut, ShortcutGuard, TetherError};

/// Handler behind the close affordance, backdrop and cancel key.
pub type CloseHandler = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Handler for captured form submissions.
pub type SubmitHandler = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Horizontal alignment of the footer block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterAlign {
    /// Left-aligned
    Start,
    /// Right-aligned
    #[default]
    End,
}

/// Shell defaults applied from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellDefaults {
    /// Whether shells show a header unless told otherwise
    pub show_header: bool,
    /// Footer alignment unless told otherwise
    pub footer_align: FooterAlign,
}

impl Default for ShellDefaults {
    fn default() -> Self {
        Self {
            show_header: true,
            footer_align: FooterAlign::End,
        }
    }
}

/// Input to a dialog shell. `C` is the host's content type.
pub struct ShellProps<C> {
    title: Option<String>,
    on_close: Option<CloseHandler>,
    on_submit: Option<SubmitHandler>,
    show_header: bool,
    footer_align: FooterAlign,
    body: Option<C>,
    footer: Option<C>,
}

impl<C> Default for ShellProps<C> {
    fn default() -> Self {
        Self::with_defaults(&ShellDefaults::default())
    }
}

impl<C> ShellProps<C> {
    /// Empty props: header shown, footer right-aligned, no handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty props using configured defaults
    pub fn with_defaults(defaults: &ShellDefaults) -> Self {
        Self {
            title: None,
            on_close: None,
            on_submit: None,
            show_header: defaults.show_header,
            footer_align: defaults.footer_align,
            body: None,
            footer: None,
        }
    }

    /// Build props from positional content: first is the body, second the
    /// footer. More than two items is rejected.
    pub fn from_children(children: Vec<C>) -> Result<Self> {
        Self::new().with_children(children)
    }

    /// Fill the body and footer from positional content, replacing whatever
    /// they held. Title, handlers and layout settings are kept.
    pub fn with_children(mut self, children: Vec<C>) -> Result<Self> {
        if children.len() > 2 {
            return Err(TetherError::invalid_shell(format!(
                "a dialog shell takes at most two content slots (body, footer), got {}",
                children.len()
            )));
        }
        let mut slots = children.into_iter();
        self.body = slots.next();
        self.footer = slots.next();
        Ok(self)
    }

    /// Set the header title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the close handler from a closure
    pub fn on_close<F>(self, handler: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.on_close_handler(Arc::new(handler))
    }

    /// Set the close handler
    pub fn on_close_handler(mut self, handler: CloseHandler) -> Self {
        self.on_close = Some(handler);
        self
    }

    /// Set the submit handler from a closure
    pub fn on_submit<F>(self, handler: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.on_submit_handler(Arc::new(handler))
    }

    /// Set the submit handler
    pub fn on_submit_handler(mut self, handler: SubmitHandler) -> Self {
        self.on_submit = Some(handler);
        self
    }

    /// Show or hide the header
    pub fn show_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    /// Footer alignment
    pub fn footer_align(mut self, align: FooterAlign) -> Self {
        self.footer_align = align;
        self
    }

    /// Body content
    pub fn body(mut self, body: C) -> Self {
        self.body = Some(body);
        self
    }

    /// Footer content
    pub fn footer(mut self, footer: C) -> Self {
        self.footer = Some(footer);
        self
    }
}

impl<C: fmt::Debug> fmt::Debug for ShellProps<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellProps")
            .field("title", &self.title)
            .field("on_close", &self.on_close.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .field("show_header", &self.show_header)
            .field("footer_align", &self.footer_align)
            .field("body", &self.body)
            .field("footer", &self.footer)
            .finish()
    }
}

/// Elements a click or submission can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShellElement {
    /// Dismissible region around the dialog
    Backdrop,
    /// Wrapper positioning the content box
    Dialog,
    /// The content box
    Content,
    /// Header block
    Header,
    /// Header title
    Title,
    /// Close affordance in the header
    CloseButton,
    /// Body block (or anything the host put in it)
    Body,
    /// Footer block (or anything the host put in it)
    Footer,
}

impl ShellElement {
    /// The element's parent, `None` for the backdrop
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Backdrop => None,
            Self::Dialog => Some(Self::Backdrop),
            Self::Content => Some(Self::Dialog),
            Self::Header | Self::Body | Self::Footer => Some(Self::Content),
            Self::Title | Self::CloseButton => Some(Self::Header),
        }
    }

    /// Whether the element is the content box or inside it
    pub fn is_within_content(self) -> bool {
        let mut current = Some(self);
        while let Some(element) = current {
            if element == Self::Content {
                return true;
            }
            current = element.parent();
        }
        false
    }
}

/// What an interaction did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellOutcome {
    /// The close handler ran
    Dismissed,
    /// The submit handler ran
    Submitted,
    /// Nothing ran
    Ignored,
}

/// A native form submission raised inside the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitEvent {
    origin: ShellElement,
    default_prevented: bool,
}

impl SubmitEvent {
    /// Submission triggered from `origin` (e.g. a button in the footer)
    pub fn new(origin: ShellElement) -> Self {
        Self {
            origin,
            default_prevented: false,
        }
    }

    /// Element that triggered the submission
    pub fn origin(&self) -> ShellElement {
        self.origin
    }

    /// Suppress the default submission action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether the default action was suppressed
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Whether the content box captures submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentRegion {
    /// Submission-capturing region
    Form,
    /// Plain container
    Plain,
}

/// The close affordance in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CloseAffordance {
    /// False when there is no close handler
    pub enabled: bool,
}

/// Header block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderLayout<'a> {
    /// Title, when one was given
    pub title: Option<&'a str>,
    /// Always present alongside the header
    pub close: CloseAffordance,
}

/// Footer block.
#[derive(Debug, PartialEq, Eq)]
pub struct FooterLayout<'a, C> {
    /// Footer content
    pub content: &'a C,
    /// Horizontal alignment
    pub align: FooterAlign,
}

/// Which blocks the renderer should draw.
#[derive(Debug, PartialEq, Eq)]
pub struct ShellLayout<'a, C> {
    /// Header, when shown
    pub header: Option<HeaderLayout<'a>>,
    /// Body content, when present
    pub body: Option<&'a C>,
    /// Footer, when present
    pub footer: Option<FooterLayout<'a, C>>,
    /// Form or plain content box
    pub content: ContentRegion,
}

/// A mounted dialog shell.
pub struct DialogShell<C> {
    props: ShellProps<C>,
    keyboard: Arc<dyn KeyboardDispatcher>,
    cancel_key: KeyCode,
    shortcut: Option<ShortcutGuard>,
}

impl<C> DialogShell<C> {
    /// Mount the shell and register its cancel key with `keyboard`
    pub fn mount(
        props: ShellProps<C>,
        keyboard: Arc<dyn KeyboardDispatcher>,
        cancel_key: KeyCode,
    ) -> Self {
        let shortcut = Self::register_cancel_key(&props, &keyboard, cancel_key);
        tracing::debug!(
            title = props.title.as_deref().unwrap_or(""),
            %cancel_key,
            "dialog shell mounted"
        );
        Self {
            props,
            keyboard,
            cancel_key,
            shortcut: Some(shortcut),
        }
    }

    fn register_cancel_key(
        props: &ShellProps<C>,
        keyboard: &Arc<dyn KeyboardDispatcher>,
        cancel_key: KeyCode,
    ) -> ShortcutGuard {
        let on_close = props.on_close.clone();
        let shortcut = Shortcut::new(cancel_key, move || match &on_close {
            Some(close) => close(),
            None => Ok(()),
        });
        ShortcutGuard::acquire(Arc::clone(keyboard), shortcut)
    }

    /// Swap in new props; the old cancel-key registration is released first
    pub fn replace(&mut self, props: ShellProps<C>) {
        if let Some(previous) = self.shortcut.take() {
            previous.release();
        }
        self.shortcut = Some(Self::register_cancel_key(&props, &self.keyboard, self.cancel_key));
        self.props = props;
        tracing::debug!("dialog shell replaced");
    }

    /// Unmount, releasing the cancel-key registration
    pub fn unmount(mut self) {
        if let Some(shortcut) = self.shortcut.take() {
            shortcut.release();
        }
        tracing::debug!("dialog shell unmounted");
    }

    /// Whether the cancel-key registration is held
    pub fn is_registered(&self) -> bool {
        self.shortcut.is_some()
    }

    /// Key the shell listens for
    pub fn cancel_key(&self) -> KeyCode {
        self.cancel_key
    }

    /// The props the shell was mounted with
    pub fn props(&self) -> &ShellProps<C> {
        &self.props
    }

    /// Whether the content box captures submissions
    pub fn content_region(&self) -> ContentRegion {
        if self.props.on_submit.is_some() {
            ContentRegion::Form
        } else {
            ContentRegion::Plain
        }
    }

    /// Blocks to draw
    pub fn layout(&self) -> ShellLayout<'_, C> {
        let header = self.props.show_header.then(|| HeaderLayout {
            title: self.props.title.as_deref().filter(|title| !title.is_empty()),
            close: CloseAffordance {
                enabled: self.props.on_close.is_some(),
            },
        });
        ShellLayout {
            header,
            body: self.props.body.as_ref(),
            footer: self.props.footer.as_ref().map(|content| FooterLayout {
                content,
                align: self.props.footer_align,
            }),
            content: self.content_region(),
        }
    }

    /// Activate the close affordance
    pub fn activate_close(&self) -> Result<ShellOutcome> {
        self.invoke_close()
    }

    /// Deliver a click on `target`, bubbling up to the backdrop
    pub fn dispatch_click(&self, target: ShellElement) -> Result<ShellOutcome> {
        let mut outcome = ShellOutcome::Ignored;
        let mut current = Some(target);
        while let Some(element) = current {
            let step = match element {
                ShellElement::CloseButton if self.layout_has_close() => self.invoke_close()?,
                ShellElement::Backdrop => self.backdrop_listener(target)?,
                _ => ShellOutcome::Ignored,
            };
            if step != ShellOutcome::Ignored {
                outcome = step;
            }
            current = element.parent();
        }
        Ok(outcome)
    }

    /// Deliver a form submission
    pub fn dispatch_submit(&self, event: &mut SubmitEvent) -> Result<ShellOutcome> {
        let Some(on_submit) = &self.props.on_submit else {
            return Ok(ShellOutcome::Ignored);
        };
        if !event.origin().is_within_content() {
            return Ok(ShellOutcome::Ignored);
        }
        event.prevent_default();
        on_submit()?;
        tracing::debug!(origin = ?event.origin(), "dialog shell captured submission");
        Ok(ShellOutcome::Submitted)
    }

    fn layout_has_close(&self) -> bool {
        self.props.show_header
    }

    fn backdrop_listener(&self, target: ShellElement) -> Result<ShellOutcome> {
        if target != ShellElement::Backdrop {
            return Ok(ShellOutcome::Ignored);
        }
        self.invoke_close()
    }

    fn invoke_close(&self) -> Result<ShellOutcome> {
        match &self.props.on_close {
            Some(close) => {
                close()?;
                Ok(ShellOutcome::Dismissed)
            }
            None => Ok(ShellOutcome::Ignored),
        }
    }
}

impl<C> Drop for DialogShell<C> {
    fn drop(&mut self) {
        if let Some(shortcut) = self.shortcut.take() {
            shortcut.release();
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for DialogShell<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogShell")
            .field("props", &self.props)
            .field("cancel_key", &self.cancel_key)
            .field("registered", &self.shortcut.is_some())
            .finish()
    }
}
