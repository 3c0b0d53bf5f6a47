//! Fetch / dirty / commit protocol for a single native resource.
//!
//! A [`Proxy`] caches every attribute of one kind for one handle. Its state
//! machine:
//!
//! - never fetched: the next read or write fetches first
//! - clean and fetched: authoritative while the document version equals the
//!   version of the last sync, stale otherwise
//! - dirty: authoritative regardless of version, waiting in the commit manager
//!
//! Writes go through [`ProxyRef::write`], which returns a [`DirtyMark`] on the
//! first clean-to-dirty transition. The mark must be handed to the
//! [`CommitManager`](crate::CommitManager) so that every dirty proxy is pending.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use graver_primitives::{DocumentVersion, ItemId, NativeHandle};
use tracing::trace;

use crate::attributes::ProxyAttributes;
use crate::commit::{CommitContext, Commitable, DirtyMark};
use crate::native::{AttributeKind, Baseline, NativeDocument, NativeError};

/// Identity of a proxy in the pending set: the owning item plus the proxy kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerKey {
	pub item: ItemId,
	pub kind: AttributeKind,
}

impl OwnerKey {
	pub const fn new(item: ItemId, kind: AttributeKind) -> Self {
		Self { item, kind }
	}
}

impl fmt::Display for OwnerKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.item, self.kind)
	}
}

/// Attachment of a proxy to its owner and native resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
	pub owner: ItemId,
	pub handle: NativeHandle,
}

/// Local mirror of one native resource's attributes.
#[derive(Debug)]
pub struct Proxy<A> {
	binding: Option<Binding>,
	cached: A,
	/// Values as of the last fetch or commit, or the seed until the first commit;
	/// base for commit payloads.
	synced: Option<A>,
	/// `synced` holds seed values the native side has never seen.
	seeded: bool,
	fetched: bool,
	dirty: bool,
	last_synced: Option<DocumentVersion>,
}

impl<A: ProxyAttributes> Proxy<A> {
	/// A proxy attached to a native resource, fetched on first access.
	pub fn bound(binding: Binding) -> Self {
		Self {
			binding: Some(binding),
			cached: A::default(),
			synced: None,
			seeded: false,
			fetched: false,
			dirty: false,
			last_synced: None,
		}
	}

	/// A proxy attached to a native resource and seeded from serialized data.
	///
	/// Skips the fetch and starts dirty: the seeded values are pending writes.
	pub fn seeded(binding: Binding, attributes: A) -> Self {
		Self {
			binding: Some(binding),
			synced: Some(attributes.clone()),
			seeded: true,
			cached: attributes,
			fetched: true,
			dirty: true,
			last_synced: None,
		}
	}

	/// A free-standing value that never fetches or commits.
	pub fn detached(attributes: A) -> Self {
		Self {
			binding: None,
			cached: attributes,
			synced: None,
			seeded: false,
			fetched: true,
			dirty: false,
			last_synced: None,
		}
	}

	pub fn binding(&self) -> Option<Binding> {
		self.binding
	}

	pub fn key(&self) -> Option<OwnerKey> {
		self.binding.map(|binding| OwnerKey::new(binding.owner, A::KIND))
	}

	pub fn is_fetched(&self) -> bool {
		self.fetched
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	pub fn last_synced_version(&self) -> Option<DocumentVersion> {
		self.last_synced
	}

	/// Cached values without any staleness check.
	pub fn cached(&self) -> &A {
		&self.cached
	}

	/// Whether a read at document version `current` must fetch first.
	pub fn is_stale(&self, current: DocumentVersion) -> bool {
		self.binding.is_some() && (!self.fetched || (!self.dirty && self.last_synced != Some(current)))
	}

	/// Fetches if stale.
	pub fn update(&mut self, native: &mut dyn NativeDocument) -> Result<(), NativeError> {
		let Some(binding) = self.binding else {
			return Ok(());
		};
		if self.is_stale(native.document_version(binding.handle)) {
			self.fetch(native)?;
		}
		Ok(())
	}

	/// Replaces the cache with the native values in one round-trip.
	///
	/// Does nothing while dirty: local edits are authoritative until committed.
	pub fn fetch(&mut self, native: &mut dyn NativeDocument) -> Result<(), NativeError> {
		let Some(binding) = self.binding else {
			return Ok(());
		};
		if self.dirty {
			trace!(owner = %binding.owner, kind = %A::KIND, "proxy.fetch.skipped_dirty");
			return Ok(());
		}
		let attributes = A::from_set(native.fetch(binding.handle, A::KIND)?)?;
		let version = native.document_version(binding.handle);
		trace!(owner = %binding.owner, kind = %A::KIND, %version, "proxy.fetch");
		self.synced = Some(attributes.clone());
		self.seeded = false;
		self.cached = attributes;
		self.fetched = true;
		self.last_synced = Some(version);
		Ok(())
	}

	/// Reads from the cache, fetching first if stale.
	pub fn read<R>(&mut self, native: &mut dyn NativeDocument, read: impl FnOnce(&A) -> R) -> Result<R, NativeError> {
		self.update(native)?;
		Ok(read(&self.cached))
	}

	/// Edits the cache, fetching first if stale so untouched fields stay current.
	///
	/// Returns `true` on the clean-to-dirty transition of a bound proxy.
	pub fn edit(&mut self, native: &mut dyn NativeDocument, edit: impl FnOnce(&mut A)) -> Result<bool, NativeError> {
		self.update(native)?;
		edit(&mut self.cached);
		if self.binding.is_none() || self.dirty {
			return Ok(false);
		}
		self.dirty = true;
		Ok(true)
	}

	/// Pushes the full attribute set to the native side. No-op when clean.
	///
	/// On failure the proxy stays dirty.
	pub fn commit_to(&mut self, native: &mut dyn NativeDocument) -> Result<(), NativeError> {
		if !self.dirty {
			return Ok(());
		}
		let Some(binding) = self.binding else {
			self.dirty = false;
			return Ok(());
		};
		let empty = A::default();
		let base = match (&self.synced, self.seeded) {
			(Some(synced), false) => Baseline::Synced(synced),
			(Some(seed), true) => Baseline::Seeded(seed),
			(None, _) => Baseline::Seeded(&empty),
		};
		let patch = self.cached.patch(base);
		native.commit(binding.handle, patch)?;

		let version = native.document_version(binding.handle);
		trace!(owner = %binding.owner, kind = %A::KIND, %version, "proxy.commit");
		// Seeded proxies only sent their defined fields; refetch to see the merged result.
		if self.seeded || self.synced.is_none() {
			self.fetched = false;
			self.seeded = false;
		}
		self.synced = Some(self.cached.clone());
		self.dirty = false;
		self.last_synced = Some(version);
		Ok(())
	}

	/// Drops local edits; the next access refetches.
	pub fn discard(&mut self) {
		if self.binding.is_none() {
			return;
		}
		self.dirty = false;
		self.seeded = false;
		self.fetched = false;
	}
}

impl<A: ProxyAttributes> Commitable for Proxy<A> {
	fn is_dirty(&self) -> bool {
		self.dirty
	}

	fn commit(&mut self, cx: &mut CommitContext<'_>) -> Result<(), NativeError> {
		self.commit_to(cx.native())
	}

	fn discard(&mut self) {
		Proxy::discard(self);
	}
}

/// Shared handle to a [`Proxy`], as held by items and script values.
pub struct ProxyRef<A>(Rc<RefCell<Proxy<A>>>);

impl<A> Clone for ProxyRef<A> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<A: fmt::Debug> fmt::Debug for ProxyRef<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ProxyRef").field(&self.0).finish()
	}
}

impl<A: ProxyAttributes> ProxyRef<A> {
	pub fn new(proxy: Proxy<A>) -> Self {
		Self(Rc::new(RefCell::new(proxy)))
	}

	/// Seeds a bound proxy from serialized data, returning the mark for its pending write.
	pub fn seeded(binding: Binding, attributes: A) -> (Self, DirtyMark) {
		let proxy = Self::new(Proxy::seeded(binding, attributes));
		let mark = DirtyMark::new(OwnerKey::new(binding.owner, A::KIND), proxy.0.clone());
		(proxy, mark)
	}

	pub fn borrow(&self) -> Ref<'_, Proxy<A>> {
		self.0.borrow()
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub fn read<R>(&self, native: &mut dyn NativeDocument, read: impl FnOnce(&A) -> R) -> Result<R, NativeError> {
		self.0.borrow_mut().read(native, read)
	}

	/// Writes through the proxy.
	///
	/// Returns a mark when this write made the proxy dirty; the caller hands it to
	/// the commit manager.
	#[must_use = "a dirty mark must be registered with the commit manager"]
	pub fn write(&self, native: &mut dyn NativeDocument, edit: impl FnOnce(&mut A)) -> Result<Option<DirtyMark>, NativeError> {
		let (became_dirty, key) = {
			let mut proxy = self.0.borrow_mut();
			(proxy.edit(native, edit)?, proxy.key())
		};
		Ok(match key {
			Some(key) if became_dirty => Some(DirtyMark::new(key, self.0.clone())),
			_ => None,
		})
	}

	pub fn fetch(&self, native: &mut dyn NativeDocument) -> Result<(), NativeError> {
		self.0.borrow_mut().fetch(native)
	}
}
