use crate::{
	diff::{self, KeyedDiffer},
	error::Error,
	mode::{Mode, Reconcile, Render},
};
use core::{
	cell::RefCell,
	convert::TryFrom,
	fmt::{self, Debug, Formatter},
	hash::Hash,
};
use std::rc::Rc;
use tracing::{error, instrument, trace};
use wasm_bindgen::JsValue;

/// An item array bound to the child nodes of a container element.
///
/// Every mutation computes the next item array from the current one and reconciles the whole container against it,
/// synchronously, before returning.
///
/// Clones are handles to the same list. This means callbacks can capture the list they belong to,
/// but any mutation they attempt while the list is reconciling fails with [`Error::Reentrant`].
///
/// # Missing container
///
/// A list constructed without a container ignores all mutations and reports no items or elements.
pub struct BoundList<T, K = ()>
where
	K: Hash + Eq,
{
	shared: Rc<Shared<T, K>>,
}

struct Shared<T, K>
where
	K: Hash + Eq,
{
	container: Option<web_sys::Element>,
	state: RefCell<State<T, K>>,
}

struct State<T, K>
where
	K: Hash + Eq,
{
	items: Vec<T>,
	render: Box<Render<T>>,
	strategy: Strategy<T, K>,
}

enum Strategy<T, K>
where
	K: Hash + Eq,
{
	BlowAway { elements: Vec<web_sys::Node> },
	Keyed(KeyedDiffer<T, K>),
	Custom(Box<Reconcile<T>>),
}

impl<T, K> Clone for BoundList<T, K>
where
	K: Hash + Eq,
{
	fn clone(&self) -> Self {
		Self { shared: Rc::clone(&self.shared) }
	}
}

impl<T, K> BoundList<T, K>
where
	T: Clone,
	K: Hash + Eq + Clone + Debug,
{
	/// Binds a new, empty list to `container`'s child nodes.
	///
	/// Nothing is rendered until the first mutation.
	#[instrument(skip(render))]
	pub fn new(container: Option<web_sys::Element>, render: impl 'static + FnMut(&T, usize) -> Result<web_sys::Node, JsValue>, mode: Mode<T, K>) -> Self {
		if container.is_none() {
			trace!("No container given. All mutations on this list will be ignored.");
		}

		let strategy = match mode {
			Mode::Default => Strategy::BlowAway { elements: Vec::new() },
			Mode::Keyed(keyed) => Strategy::Keyed(KeyedDiffer::new(keyed)),
			Mode::Custom(reconcile) => Strategy::Custom(reconcile),
		};

		Self {
			shared: Rc::new(Shared {
				container,
				state: RefCell::new(State {
					items: Vec::new(),
					render: Box::new(render),
					strategy,
				}),
			}),
		}
	}

	pub fn for_element_child_nodes(container: web_sys::Element, render: impl 'static + FnMut(&T, usize) -> Result<web_sys::Node, JsValue>, mode: Mode<T, K>) -> Self {
		Self::new(Some(container), render, mode)
	}

	#[must_use]
	pub fn container(&self) -> Option<&web_sys::Element> {
		self.shared.container.as_ref()
	}

	#[must_use]
	pub fn is_bound(&self) -> bool {
		self.shared.container.is_some()
	}

	/// Replaces all items.
	///
	/// # Errors
	///
	/// See [`Error`].
	pub fn set(&self, items: Vec<T>) -> Result<(), Error> {
		self.commit("set", move |_| items)
	}

	/// Adds `items` after the current ones.
	///
	/// # Errors
	///
	/// See [`Error`].
	pub fn append(&self, items: impl IntoIterator<Item = T>) -> Result<(), Error> {
		self.commit("append", move |current| current.iter().cloned().chain(items).collect())
	}

	/// Adds `items` before the current ones.
	///
	/// # Errors
	///
	/// See [`Error`].
	pub fn prepend(&self, items: impl IntoIterator<Item = T>) -> Result<(), Error> {
		self.commit("prepend", move |current| items.into_iter().chain(current.iter().cloned()).collect())
	}

	/// Inserts `items` so that the first of them ends up at `index`.
	///
	/// Negative indices count from the end. Out of range indices are clamped.
	///
	/// # Errors
	///
	/// See [`Error`].
	pub fn insert(&self, index: isize, items: impl IntoIterator<Item = T>) -> Result<(), Error> {
		self.commit("insert", move |current| {
			let at = splice_index(current.len(), index);
			let mut next = current[..at].to_vec();
			next.extend(items);
			next.extend_from_slice(&current[at..]);
			next
		})
	}

	/// Removes all items matching `predicate`.
	///
	/// # Errors
	///
	/// See [`Error`].
	pub fn remove(&self, mut predicate: impl FnMut(&T) -> bool) -> Result<(), Error> {
		self.commit("remove", move |current| current.iter().filter(|item| !predicate(item)).cloned().collect())
	}

	/// Replaces each item matching `predicate` with what `updater` makes of it.
	///
	/// # Errors
	///
	/// See [`Error`].
	pub fn update(&self, mut predicate: impl FnMut(&T) -> bool, mut updater: impl FnMut(&T) -> T) -> Result<(), Error> {
		self.commit("update", move |current| {
			current
				.iter()
				.map(|item| if predicate(item) { updater(item) } else { item.clone() })
				.collect()
		})
	}

	/// Removes all items.
	///
	/// # Errors
	///
	/// See [`Error`].
	pub fn clear(&self) -> Result<(), Error> {
		self.commit("clear", |_| Vec::new())
	}

	/// Clears the list and drops strategy-internal allocations.
	///
	/// The list stays usable afterwards and behaves as if freshly constructed.
	///
	/// # Errors
	///
	/// Same as [`clear`](`BoundList::clear`). Internal state is only released if clearing succeeded.
	pub fn destroy(&self) -> Result<(), Error> {
		self.clear()?;
		if let Ok(mut state) = self.shared.state.try_borrow_mut() {
			match &mut state.strategy {
				Strategy::BlowAway { elements } => *elements = Vec::new(),
				Strategy::Keyed(differ) => differ.release(),
				Strategy::Custom(_) => (),
			}
			state.items = Vec::new();
		}
		trace!("Destroyed.");
		Ok(())
	}

	/// A snapshot of the current items.
	#[must_use]
	pub fn items(&self) -> Vec<T> {
		self.read("items", |state| state.items.clone())
	}

	/// A snapshot of the nodes representing the current items, in the same order.
	///
	/// With [`Mode::Custom`], this is simply the container's child nodes.
	#[must_use]
	pub fn elements(&self) -> Vec<web_sys::Node> {
		let container = match &self.shared.container {
			Some(container) => container,
			None => return Vec::new(),
		};
		self.read("elements", |state| match &state.strategy {
			Strategy::BlowAway { elements } => elements.clone(),
			Strategy::Keyed(differ) => differ.elements().to_vec(),
			Strategy::Custom(_) => {
				let child_nodes = container.child_nodes();
				(0..child_nodes.length()).filter_map(|i| child_nodes.get(i)).collect()
			}
		})
	}

	/// The node currently registered for `key`. Always [`None`] unless the list is keyed.
	#[must_use]
	pub fn element_for_key(&self, key: &K) -> Option<web_sys::Node> {
		self.read("element_for_key", |state| match &state.strategy {
			Strategy::Keyed(differ) => differ.element_for_key(key).cloned(),
			Strategy::BlowAway { .. } | Strategy::Custom(_) => None,
		})
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.read("len", |state| state.items.len())
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	#[instrument(skip(self, next))]
	fn commit(&self, operation: &'static str, next: impl FnOnce(&[T]) -> Vec<T>) -> Result<(), Error> {
		let container = match &self.shared.container {
			Some(container) => container,
			None => return Ok(()),
		};

		let mut state = self.shared.state.try_borrow_mut().map_err(|_| {
			error!("Re-entrant `{}` rejected: This list is already reconciling.", operation);
			Error::Reentrant
		})?;
		let State { items, render, strategy } = &mut *state;

		let new_items = next(items);
		match strategy {
			Strategy::BlowAway { elements } => *elements = diff::replace_all(container, &mut **render, &new_items)?,
			Strategy::Keyed(differ) => differ.reconcile(container, &mut **render, &new_items)?,
			Strategy::Custom(reconcile) => diff::delegate(&mut **reconcile, items, &new_items, container, &mut **render)?,
		}
		*items = new_items;
		Ok(())
	}

	/// Reads the state, or returns the default for `R` if no container is bound or a reconcile is in progress.
	fn read<R: Default>(&self, accessor: &'static str, f: impl FnOnce(&State<T, K>) -> R) -> R {
		if self.shared.container.is_none() {
			return R::default();
		}
		match self.shared.state.try_borrow() {
			Ok(state) => f(&state),
			Err(_) => {
				error!("`{}` called while this list is reconciling. Returning an empty result.", accessor);
				R::default()
			}
		}
	}
}

impl<T, K> Debug for BoundList<T, K>
where
	K: Hash + Eq,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let mut debug = f.debug_struct("BoundList");
		debug.field("container", &self.shared.container);
		match self.shared.state.try_borrow() {
			Ok(state) => {
				let strategy: &dyn Debug = match &state.strategy {
					Strategy::BlowAway { elements } => elements,
					Strategy::Keyed(differ) => differ,
					Strategy::Custom(_) => &"Custom(..)",
				};
				debug.field("items.len()", &state.items.len()).field("strategy", strategy)
			}
			Err(_) => debug.field("state", &"<reconciling>"),
		};
		debug.finish()
	}
}

/// Resolves a splice index against a list of length `len`: Negative values count from the end, and the result is clamped to `0..=len`.
fn splice_index(len: usize, index: isize) -> usize {
	match usize::try_from(index) {
		Ok(index) => index.min(len),
		Err(_) => len.saturating_sub(index.unsigned_abs()),
	}
}
