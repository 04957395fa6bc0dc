//! # Buddy Browser CDP
//!
//! Runs the Buddy runtime against a real Chrome tab through the Chrome
//! DevTools Protocol.
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Attach and hand the host to the runtime:
//!    ```rust,ignore
//!    let client = Arc::new(CdpClient::connect("http://localhost:9222").await?);
//!    let page = Arc::new(client.attach_first_page().await?);
//!    let host = Arc::new(CdpHost::new(page, prompter).with_opener(client));
//!    ```
//!
//! [`CdpHost`] implements both `HostBus` and `TabController`: browser
//! actions run as page scripts through `Runtime.evaluate`, permission
//! prompts go to a [`PermissionPrompter`] and everything else is published
//! to subscribers.

mod client;
mod error;
mod host;
mod protocol;
mod scripts;
mod session;

pub use client::{CdpClient, DEFAULT_CALL_TIMEOUT};
pub use error::CdpError;
pub use host::{ATTACHED_TAB, CdpHost, PageDriver, PermissionPrompter, TabOpener};
pub use protocol::*;
pub use session::PageSession;
