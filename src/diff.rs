use crate::{
	error::Error,
	mode::{Keyed, Reconcile, Render},
	registry::Registry,
	temp_set::TempKeySet,
};
use core::{
	fmt::{self, Debug, Formatter},
	hash::Hash,
};
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};
use wasm_bindgen::JsValue;

/// Keeps the child nodes of a container in step with an item array, reusing one node per key.
///
/// # Correct Use
///
/// The container's child nodes are assumed to be exactly the nodes this instance placed there.
/// Nodes added by other code are shifted behind the keyed nodes by the reorder pass and otherwise left alone.
pub struct KeyedDiffer<T, K>
where
	K: Hash + Eq,
{
	keyed: Keyed<T, K>,
	registry: Registry<K, web_sys::Node, T>,
	new_keys: TempKeySet<K>,
	elements: Vec<web_sys::Node>,
}
impl<T, K> KeyedDiffer<T, K>
where
	T: Clone,
	K: Hash + Eq + Clone + Debug,
{
	#[must_use]
	pub fn new(keyed: Keyed<T, K>) -> Self {
		Self {
			keyed,
			registry: Registry::new(),
			new_keys: TempKeySet::new(),
			elements: Vec::new(),
		}
	}

	/// The nodes of the last successful reconcile, in item order.
	#[must_use]
	pub fn elements(&self) -> &[web_sys::Node] {
		&self.elements
	}

	pub fn element_for_key(&self, key: &K) -> Option<&web_sys::Node> {
		self.registry.get(key)
	}

	/// Evicts, creates, refreshes and reorders nodes so that `container`'s child nodes represent `items`.
	///
	/// # Errors
	///
	/// Fails without changing anything if `items` contains a duplicate key.
	/// Otherwise, errors from `render`, the update callback and DOM insertions are passed through immediately.
	#[instrument(skip(self, container, render, items), fields(items.len = items.len()))]
	pub fn reconcile(&mut self, container: &web_sys::Element, render: &mut Render<T>, items: &[T]) -> Result<(), Error> {
		let Self {
			keyed: Keyed {
				key: key_fn,
				update,
				on_add,
				on_remove,
			},
			registry,
			new_keys,
			elements,
		} = self;

		let keys: Vec<K> = items.iter().map(|item| key_fn(item)).collect();

		let new_keys = new_keys.temp();
		for (index, key) in keys.iter().enumerate() {
			if !new_keys.insert(key.clone()) {
				if cfg!(feature = "dangerous-logging") {
					error!("Duplicate key {:?} at index {}. Rejecting the whole update.", key, index);
				} else {
					error!("Duplicate key at index {}. Rejecting the whole update.", index);
				}
				return Err(Error::DuplicateKey { index });
			}
		}

		{
			let span = trace_span!("Deletion pass", registry.len = registry.len());
			let _enter = span.enter();
			for (key, node, item) in registry.evict_unless(|key| new_keys.contains(key)) {
				log_key("Evicting", &key);
				if let Some(on_remove) = on_remove {
					on_remove(&node, &item)
				}
				detach(container, &node);
			}
		}

		let mut targets = Vec::with_capacity(items.len());
		{
			let span = trace_span!("Build/refresh pass");
			let _enter = span.enter();
			for (index, (item, key)) in items.iter().zip(&keys).enumerate() {
				let node = match registry.get(key) {
					Some(node) => {
						log_key("Reusing", key);
						if let Some(update) = update {
							update(node, item, index).map_err(Error::Update)?;
						}
						node.clone()
					}
					None => {
						log_key("Creating", key);
						let node = render(item, index).map_err(Error::Render)?;
						registry.insert(key.clone(), node.clone(), item.clone());
						if let Some(on_add) = on_add {
							on_add(&node, item)
						}
						node
					}
				};
				targets.push(node);
			}
		}

		{
			let span = trace_span!("Reorder pass", targets.len = targets.len());
			let _enter = span.enter();
			reorder(container, &targets)?;
		}

		// Reused entries only take on their new items once the whole pass went through.
		for (item, key) in items.iter().zip(&keys) {
			if let Some((_, stored)) = registry.get_mut(key) {
				*stored = item.clone();
			}
		}
		*elements = targets;

		info!("Registry size/arena capacity: {}/{}", registry.len(), registry.capacity());
		info!("Diff heap capacity (keys): {}", new_keys.capacity());
		Ok(())
	}

	/// Drops the registry and scratch allocations. Registered nodes are forgotten, not detached.
	pub fn release(&mut self) {
		if !self.registry.is_empty() {
			warn!("Releasing {} registered node(s) without detaching them.", self.registry.len());
		}
		self.registry.release();
		self.new_keys.release();
		self.elements = Vec::new();
	}
}
impl<T, K> Debug for KeyedDiffer<T, K>
where
	K: Hash + Eq,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("KeyedDiffer")
			.field("keyed", &self.keyed)
			.field("registry.len()", &self.registry.len())
			.field("elements", &self.elements)
			.finish()
	}
}

fn log_key<K: Debug>(action: &'static str, key: &K) {
	if cfg!(feature = "dangerous-logging") {
		trace!("{} node for key {:?}.", action, key);
	} else {
		trace!("{} node.", action);
	}
}

/// Moves each of `targets` to its index among `container`'s child nodes, where it isn't already.
///
/// This is a positional pass, not a minimal-move one: A single node moved to the front shifts every other node by one,
/// which is then accepted as-is, but a node moved towards the back causes one move per node it jumped over.
fn reorder(container: &web_sys::Element, targets: &[web_sys::Node]) -> Result<(), Error> {
	let child_nodes = container.child_nodes();
	for (target, i) in targets.iter().zip(0_u32..) {
		let occupant = child_nodes.get(i);
		if occupant.as_ref() != Some(target) {
			trace!("Moving node into position {}.", i);
			container.insert_before(target, occupant.as_ref()).map_err(Error::Dom)?;
		}
	}

	if STATIC_MAX_LEVEL >= Level::ERROR && cfg!(debug_assertions) {
		let in_order = targets.iter().zip(0_u32..).all(|(target, i)| child_nodes.get(i).as_ref() == Some(target));
		if !in_order {
			error!("Child nodes are out of order after the reorder pass.");
		}
		if child_nodes.length() as usize > targets.len() {
			warn!(
				"The container holds {} child node(s) that aren't part of this list.",
				child_nodes.length() as usize - targets.len()
			);
		}
	}
	Ok(())
}

/// Removes `node` from `container`, if it's still there.
fn detach(container: &web_sys::Element, node: &web_sys::Node) {
	let container: &web_sys::Node = container;
	match node.parent_node() {
		Some(parent) if &parent == container => {
			if let Err(error) = container.remove_child(node) {
				error!("Failed to remove the node: {:?}", error)
			}
		}
		Some(_) => warn!("Evicted node was moved to another parent by other code. Leaving it there."),
		None => trace!("Evicted node was already detached."),
	}
}

/// Renders all of `items` into a fragment and then swaps it in for all of `container`'s child nodes.
///
/// Returns the freshly rendered nodes in item order.
///
/// # Errors
///
/// If `render` fails, the container is left untouched.
#[instrument(skip(container, render, items), fields(items.len = items.len()))]
pub fn replace_all<T>(container: &web_sys::Element, render: &mut Render<T>, items: &[T]) -> Result<Vec<web_sys::Node>, Error> {
	let document = container
		.owner_document()
		.ok_or_else(|| Error::Dom(JsValue::from_str("Container has no owner document.")))?;
	let fragment = document.create_document_fragment();

	let mut nodes = Vec::with_capacity(items.len());
	for (index, item) in items.iter().enumerate() {
		let node = render(item, index).map_err(Error::Render)?;
		fragment.append_child(&node).map_err(Error::Dom)?;
		nodes.push(node);
	}

	container.set_text_content(None);
	container.append_child(&fragment).map_err(Error::Dom)?;
	trace!("Replaced child nodes with {} freshly rendered node(s).", nodes.len());
	Ok(nodes)
}

/// Hands the whole update to `reconcile`.
///
/// # Errors
///
/// Passes through the callback's error.
#[instrument(skip(reconcile, old_items, new_items, container, render), fields(old_items.len = old_items.len(), new_items.len = new_items.len()))]
pub fn delegate<T>(reconcile: &mut Reconcile<T>, old_items: &[T], new_items: &[T], container: &web_sys::Element, render: &mut Render<T>) -> Result<(), Error> {
	reconcile(old_items, new_items, container, render).map_err(Error::Custom)
}
