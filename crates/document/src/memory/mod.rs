//! In-process native document.
//!
//! Stands in for the host collaborator in the CLI and in tests: items with stored
//! attributes, one document-wide version, call counters and commit failure
//! injection. Persists as JSON.

use std::collections::BTreeMap;

use graver_primitives::{DocumentVersion, ItemId, NativeHandle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::{CharacterStyle, PathStyle};
use crate::native::{AttributeKind, AttributePatch, AttributeSet, ItemDirectory, NativeDocument, NativeError};

/// Native-side state of one item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredItem {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub style: PathStyle,
	pub character_style: CharacterStyle,
}

#[derive(Serialize, Deserialize)]
struct DocumentFile {
	#[serde(default)]
	version: DocumentVersion,
	#[serde(default)]
	items: Vec<ItemRecord>,
}

#[derive(Serialize, Deserialize)]
struct ItemRecord {
	id: ItemId,
	#[serde(flatten)]
	item: StoredItem,
}

/// A [`NativeDocument`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDocument {
	version: DocumentVersion,
	items: BTreeMap<ItemId, StoredItem>,
	fetches: usize,
	commits: usize,
	last_patch: Option<(NativeHandle, AttributePatch)>,
	reject_next_commit: Option<String>,
}

impl MemoryDocument {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses the JSON form written by [`MemoryDocument::to_json`].
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		let file: DocumentFile = serde_json::from_str(json)?;
		Ok(Self {
			version: file.version,
			items: file.items.into_iter().map(|record| (record.id, record.item)).collect(),
			..Self::default()
		})
	}

	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		let file = DocumentFile {
			version: self.version,
			items: self
				.items
				.iter()
				.map(|(id, item)| ItemRecord { id: *id, item: item.clone() })
				.collect(),
		};
		serde_json::to_string_pretty(&file)
	}

	pub const fn handle_of(item: ItemId) -> NativeHandle {
		NativeHandle::from_raw(item.0)
	}

	pub fn version(&self) -> DocumentVersion {
		self.version
	}

	/// Inserts or replaces an item. Counts as a document change.
	pub fn insert(&mut self, id: ItemId, item: StoredItem) -> NativeHandle {
		self.items.insert(id, item);
		self.touch();
		Self::handle_of(id)
	}

	pub fn item(&self, id: ItemId) -> Option<&StoredItem> {
		self.items.get(&id)
	}

	/// Mutates an item as an edit from outside this process would.
	pub fn edit_externally(&mut self, id: ItemId, edit: impl FnOnce(&mut StoredItem)) -> bool {
		let Some(item) = self.items.get_mut(&id) else {
			return false;
		};
		edit(item);
		self.touch();
		true
	}

	/// Bumps the document version without changing any item.
	pub fn touch(&mut self) {
		self.version = self.version.next();
	}

	pub fn fetch_count(&self) -> usize {
		self.fetches
	}

	pub fn commit_count(&self) -> usize {
		self.commits
	}

	/// Payload of the most recent successful commit.
	pub fn last_patch(&self) -> Option<&(NativeHandle, AttributePatch)> {
		self.last_patch.as_ref()
	}

	/// Makes the next commit fail with [`NativeError::Rejected`].
	pub fn reject_next_commit(&mut self, reason: impl Into<String>) {
		self.reject_next_commit = Some(reason.into());
	}

	fn stored_mut(&mut self, handle: NativeHandle) -> Result<&mut StoredItem, NativeError> {
		self.items.get_mut(&ItemId(handle.raw())).ok_or(NativeError::UnknownHandle(handle))
	}
}

impl NativeDocument for MemoryDocument {
	fn document_version(&self, _handle: NativeHandle) -> DocumentVersion {
		self.version
	}

	fn fetch(&mut self, handle: NativeHandle, kind: AttributeKind) -> Result<AttributeSet, NativeError> {
		let item = self.stored_mut(handle)?;
		let set = match kind {
			AttributeKind::PathStyle => AttributeSet::PathStyle(item.style.clone()),
			AttributeKind::CharacterStyle => AttributeSet::CharacterStyle(item.character_style.clone()),
		};
		self.fetches += 1;
		Ok(set)
	}

	fn commit(&mut self, handle: NativeHandle, patch: AttributePatch) -> Result<(), NativeError> {
		if let Some(reason) = self.reject_next_commit.take() {
			return Err(NativeError::Rejected(reason));
		}
		let item = self.stored_mut(handle)?;
		match patch.clone() {
			AttributePatch::PathStyle(patch) => patch.apply_to(&mut item.style),
			AttributePatch::CharacterStyle(patch) => patch.apply_to(&mut item.character_style),
		}
		self.commits += 1;
		self.last_patch = Some((handle, patch));
		self.touch();
		debug!(%handle, version = %self.version, "memory.commit");
		Ok(())
	}
}

impl ItemDirectory for MemoryDocument {
	fn lookup(&self, item: ItemId) -> Option<NativeHandle> {
		self.items.contains_key(&item).then(|| Self::handle_of(item))
	}

	fn item_ids(&self) -> Vec<ItemId> {
		self.items.keys().copied().collect()
	}
}
