//! Explicitly constructed document session.
//!
//! A [`Session`] owns the native collaborator, the commit manager and the items
//! handed out to scripts. It replaces any process-wide engine state: create one
//! per document, drop it to tear down.

use graver_primitives::{DocumentVersion, ItemId};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::attributes::ProxyAttributes;
use crate::commit::{CommitError, CommitManager, DirtyMark, FlushStats};
use crate::item::Item;
use crate::native::{AttributeKind, ItemDirectory, NativeDocument, NativeError};
use crate::proxy::{OwnerKey, ProxyRef};

#[derive(Debug)]
pub struct Session<N> {
	native: N,
	commits: CommitManager,
	/// Items handed out so far. Entries stay until [`Session::forget`] or drop.
	items: FxHashMap<ItemId, Item>,
}

impl<N: NativeDocument> Session<N> {
	pub fn new(native: N) -> Self {
		Self::with_commit_manager(native, CommitManager::new())
	}

	pub fn with_commit_manager(native: N, commits: CommitManager) -> Self {
		Self {
			native,
			commits,
			items: FxHashMap::default(),
		}
	}

	pub fn native(&self) -> &N {
		&self.native
	}

	/// Direct native access. Changes made here bypass the proxies.
	pub fn native_mut(&mut self) -> &mut N {
		&mut self.native
	}

	pub fn commits(&self) -> &CommitManager {
		&self.commits
	}

	pub fn document_version(&self, item: &Item) -> DocumentVersion {
		self.native.document_version(item.handle())
	}

	pub fn read<A: ProxyAttributes, R>(&mut self, proxy: &ProxyRef<A>, read: impl FnOnce(&A) -> R) -> Result<R, NativeError> {
		proxy.read(&mut self.native, read)
	}

	/// Writes through `proxy` and registers it with the commit manager on its
	/// first dirty transition.
	pub fn write<A: ProxyAttributes>(&mut self, proxy: &ProxyRef<A>, edit: impl FnOnce(&mut A)) -> Result<(), NativeError> {
		if let Some(mark) = proxy.write(&mut self.native, edit)? {
			self.commits.mark_dirty(mark);
		}
		Ok(())
	}

	pub fn register(&mut self, mark: DirtyMark) {
		self.commits.mark_dirty(mark);
	}

	/// Adopts a seeded item from [`Item::with_style`] and registers its pending style.
	///
	/// An item already cached under the same id is forgotten first and returned.
	pub fn adopt(&mut self, (item, mark): (Item, DirtyMark)) -> Option<Item> {
		debug_assert_eq!(mark.key().item, item.id(), "mark belongs to another item");
		let previous = self.forget(item.id());
		if previous.is_some() {
			debug!(item = %item.id(), "session.adopt.replaced");
		}
		self.commits.mark_dirty(mark);
		self.items.insert(item.id(), item);
		previous
	}

	/// Drops the cached item for `id` along with any edits it has pending.
	///
	/// A later [`Session::item`] lookup builds a fresh item.
	pub fn forget(&mut self, id: ItemId) -> Option<Item> {
		let item = self.items.remove(&id)?;
		for kind in AttributeKind::ALL {
			self.commits.discard(&OwnerKey::new(id, kind));
		}
		Some(item)
	}

	pub fn flush(&mut self) -> Result<FlushStats, CommitError> {
		self.commits.flush(&mut self.native)
	}

	pub fn discard(&mut self, key: &OwnerKey) -> bool {
		self.commits.discard(key)
	}

	pub fn into_native(self) -> N {
		self.native
	}
}

impl<N: NativeDocument + ItemDirectory> Session<N> {
	/// The session's item for `id`, created on first lookup.
	///
	/// Repeated lookups return the same item so that a script sees its own
	/// uncommitted writes.
	pub fn item(&mut self, id: ItemId) -> Option<Item> {
		if let Some(item) = self.items.get(&id) {
			return Some(item.clone());
		}
		let handle = self.native.lookup(id)?;
		let item = Item::new(id, handle);
		self.items.insert(id, item.clone());
		Some(item)
	}

	pub fn item_ids(&self) -> Vec<ItemId> {
		self.native.item_ids()
	}
}
