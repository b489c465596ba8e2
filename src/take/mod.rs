//! Take capture and confirmation
//!
//! A "take" is one continuous recording attempt. The recorder owns the
//! active capture session; the pending slot holds the single stopped,
//! unconfirmed take while the contributor fills in metadata and decides to
//! save or discard it.

pub mod metadata;
pub mod pending;
pub mod recorder;

pub use metadata::{Category, Dialect, Language, Metadata, MetadataPatch, PROMPT_PHRASES};
pub use pending::{ConfirmedTake, PendingSlot, PendingView};
pub use recorder::{RecorderStatus, TakeRecorder};
