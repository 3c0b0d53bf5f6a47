use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use graver_primitives::{ItemId, NativeHandle};

use crate::attributes::{CharacterStyle, PathStyle};
use crate::commit::DirtyMark;
use crate::proxy::{Binding, Proxy, ProxyRef};

struct ItemInner {
	id: ItemId,
	handle: NativeHandle,
	style: OnceCell<ProxyRef<PathStyle>>,
	character_style: OnceCell<ProxyRef<CharacterStyle>>,
}

/// A logical document item decorated by attribute proxies.
///
/// Proxies are created on first access and live as long as the item. Clones
/// share the same proxies.
#[derive(Clone)]
pub struct Item {
	inner: Rc<ItemInner>,
}

impl Item {
	pub fn new(id: ItemId, handle: NativeHandle) -> Self {
		Self {
			inner: Rc::new(ItemInner {
				id,
				handle,
				style: OnceCell::new(),
				character_style: OnceCell::new(),
			}),
		}
	}

	/// Builds an item whose path style comes from serialized data instead of a fetch.
	///
	/// The returned mark registers the seeded style for the next flush.
	pub fn with_style(id: ItemId, handle: NativeHandle, style: PathStyle) -> (Self, DirtyMark) {
		let item = Self::new(id, handle);
		let (proxy, mark) = ProxyRef::seeded(item.binding(), style);
		// Freshly created cell, cannot already be set.
		let _ = item.inner.style.set(proxy);
		(item, mark)
	}

	pub fn id(&self) -> ItemId {
		self.inner.id
	}

	pub fn handle(&self) -> NativeHandle {
		self.inner.handle
	}

	pub fn binding(&self) -> Binding {
		Binding {
			owner: self.inner.id,
			handle: self.inner.handle,
		}
	}

	pub fn style(&self) -> ProxyRef<PathStyle> {
		self.inner.style.get_or_init(|| ProxyRef::new(Proxy::bound(self.binding()))).clone()
	}

	pub fn character_style(&self) -> ProxyRef<CharacterStyle> {
		self.inner
			.character_style
			.get_or_init(|| ProxyRef::new(Proxy::bound(self.binding())))
			.clone()
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Item {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Item")
			.field("id", &self.inner.id)
			.field("handle", &self.inner.handle)
			.finish_non_exhaustive()
	}
}
