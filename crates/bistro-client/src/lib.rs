//! Async editing layer for bistro websites.
//!
//! Wraps the synchronous [`bistro_canvas::Canvas`] with everything that talks
//! to a server:
//!
//! - [`EditSession`]: the UI-facing façade. Local edits, dirty tracking,
//!   load/save, and autosave against a [`WebsiteRemote`].
//! - [`SyncedCollection`]: optimistic CRUD with rollback for events and
//!   locations against an [`EntityRemote`].
//! - [`Notifier`]: where success and failure notices go.
//!
//! Bundled remotes: [`MemoryWebsiteRemote`] / [`MemoryEntityRemote`] for tests
//! and demos, and [`FsWebsiteRemote`] for JSON files on disk.

pub mod config;
pub mod constants;
pub mod fs;
pub mod memory;
pub mod notify;
pub mod remote;
pub mod session;
pub mod sync;

pub use config::{ConfigError, EditorConfig};
pub use fs::FsWebsiteRemote;
pub use memory::{MemoryEntityRemote, MemoryWebsiteRemote};
pub use notify::{BroadcastNotifier, Notice, NoticeVariant, Notifier, TracingNotifier};
pub use remote::{EntityRemote, WebsiteRemote};
pub use session::{AutosaveHandle, EditSession, LoadOutcome, SaveOutcome, SessionError, SessionState};
pub use sync::{Confirmation, FetchOutcome, PendingMutation, SyncError, SyncOp, SyncedCollection};
