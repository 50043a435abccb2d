//! Strategy selection, decided once when a [`BoundList`](`crate::BoundList`) is constructed.

use core::fmt::{self, Debug, Formatter};
use wasm_bindgen::JsValue;

/// Turns one item into a fresh, unattached node.
///
/// Must not hand out the same node twice.
pub type Render<T> = dyn FnMut(&T, usize) -> Result<web_sys::Node, JsValue>;

/// Derives the identity of an item.
pub type KeyFn<T, K> = dyn Fn(&T) -> K;

/// Patches a reused node in place to show the current item.
pub type Update<T> = dyn FnMut(&web_sys::Node, &T, usize) -> Result<(), JsValue>;

/// Fires once per key appearance or disappearance.
pub type Hook<T> = dyn FnMut(&web_sys::Node, &T);

/// Takes over all DOM mutation: `(old_items, new_items, container, render)`.
pub type Reconcile<T> = dyn FnMut(&[T], &[T], &web_sys::Element, &mut Render<T>) -> Result<(), JsValue>;

/// How a [`BoundList`](`crate::BoundList`) maps items onto its container's child nodes.
pub enum Mode<T, K> {
	/// Re-render every item on every mutation.
	///
	/// Meant for small or rarely updated lists. Node identity is never stable.
	Default,

	/// Reuse nodes by key. See [`Keyed`].
	Keyed(Keyed<T, K>),

	/// Delegate all DOM mutation to the callback.
	///
	/// The list only keeps track of its items; whether the container's content matches them is entirely up to the callback.
	Custom(Box<Reconcile<T>>),
}
impl<T, K> Mode<T, K> {
	pub fn custom(reconcile: impl 'static + FnMut(&[T], &[T], &web_sys::Element, &mut Render<T>) -> Result<(), JsValue>) -> Self {
		Self::Custom(Box::new(reconcile))
	}
}
impl<T, K> From<Keyed<T, K>> for Mode<T, K> {
	fn from(keyed: Keyed<T, K>) -> Self {
		Self::Keyed(keyed)
	}
}
impl<T, K> Debug for Mode<T, K> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Mode::Default => f.write_str("Default"),
			Mode::Keyed(keyed) => f.debug_tuple("Keyed").field(keyed).finish(),
			Mode::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}

/// Configuration for keyed reconciliation.
///
/// Without an [`update`](`Keyed::update`) callback, a reused node keeps whatever it showed when it was rendered,
/// even if the item under its key has changed.
pub struct Keyed<T, K> {
	pub(crate) key: Box<KeyFn<T, K>>,
	pub(crate) update: Option<Box<Update<T>>>,
	pub(crate) on_add: Option<Box<Hook<T>>>,
	pub(crate) on_remove: Option<Box<Hook<T>>>,
}
impl<T, K> Keyed<T, K> {
	pub fn new(key: impl 'static + Fn(&T) -> K) -> Self {
		Self {
			key: Box::new(key),
			update: None,
			on_add: None,
			on_remove: None,
		}
	}

	#[must_use]
	pub fn update(mut self, update: impl 'static + FnMut(&web_sys::Node, &T, usize) -> Result<(), JsValue>) -> Self {
		self.update = Some(Box::new(update));
		self
	}

	/// Called right after a node was rendered for a new key, before it is attached.
	#[must_use]
	pub fn on_add(mut self, on_add: impl 'static + FnMut(&web_sys::Node, &T)) -> Self {
		self.on_add = Some(Box::new(on_add));
		self
	}

	/// Called right before the node of a vanished key is detached.
	///
	/// The item passed along is the one from the last reconcile that went through for that key.
	/// A node whose very first reconcile failed reports the item it was rendered for.
	#[must_use]
	pub fn on_remove(mut self, on_remove: impl 'static + FnMut(&web_sys::Node, &T)) -> Self {
		self.on_remove = Some(Box::new(on_remove));
		self
	}
}
impl<T, K> Debug for Keyed<T, K> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Keyed")
			.field("update", &self.update.is_some())
			.field("on_add", &self.on_add.is_some())
			.field("on_remove", &self.on_remove.is_some())
			.finish_non_exhaustive()
	}
}
