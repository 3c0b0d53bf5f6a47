//! Proxy synchronization layer between scripts and a native document.
//!
//! Scripts never touch native state directly. They read and write [`Proxy`]
//! mirrors which fetch lazily from the [`NativeDocument`], mark themselves dirty
//! on write, and are pushed back in one [`CommitManager::flush`] per flush point.
//!
//! # Staleness
//!
//! A proxy refetches before a read when it was never fetched, or when it is clean
//! and the document version moved since its last sync. Dirty proxies are
//! authoritative and are never overwritten by a fetch.

pub mod attributes;
pub mod commit;
pub mod item;
pub mod location;
pub mod memory;
pub mod native;
pub mod proxy;
pub mod session;

pub use attributes::{CharacterStyle, CharacterStylePatch, FillStyle, PathStyle, PathStylePatch, ProxyAttributes, StrokeStyle};
pub use commit::{CommitContext, CommitError, CommitManager, Commitable, DEFAULT_MAX_FLUSH_ROUNDS, DirtyMark, FlushStats};
pub use item::Item;
pub use location::{CurveGeometry, CurveLocation, EndSegment};
pub use memory::{MemoryDocument, StoredItem};
pub use native::{AttributeKind, AttributePatch, AttributeSet, Baseline, ItemDirectory, NativeDocument, NativeError, Slot};
pub use proxy::{Binding, OwnerKey, Proxy, ProxyRef};
pub use session::Session;
