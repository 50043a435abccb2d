//! The element registry: which node currently represents which key.
//!
//! Keys map to [`Slot`] handles into an arena instead of holding nodes directly,
//! so a node is owned by exactly one slot at a time.

use core::{borrow::Borrow, hash::Hash};
use hashbrown::{hash_map::Entry, HashMap};

/// Opaque handle into the arena of a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(usize);

#[derive(Debug)]
struct Occupant<N, T> {
	node: N,
	item: T,
}

/// Maps keys to the nodes (and last seen items) representing them.
///
/// `N` is the node type, which is [`web_sys::Node`] outside of tests.
#[derive(Debug)]
pub struct Registry<K, N, T>
where
	K: Hash + Eq,
{
	slots: HashMap<K, Slot>,
	arena: Vec<Option<Occupant<N, T>>>,
	free: Vec<Slot>,
}
impl<K, N, T> Default for Registry<K, N, T>
where
	K: Hash + Eq,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, N, T> Registry<K, N, T>
where
	K: Hash + Eq,
{
	#[must_use]
	pub fn new() -> Self {
		Self {
			slots: HashMap::new(),
			arena: Vec::new(),
			free: Vec::new(),
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Arena capacity, which includes freed slots that are waiting for reuse.
	#[must_use]
	pub fn capacity(&self) -> usize {
		self.arena.capacity()
	}

	#[cfg(test)]
	pub fn contains_key<Q: ?Sized>(&self, k: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		self.slots.contains_key(k)
	}

	pub fn get<Q: ?Sized>(&self, k: &Q) -> Option<&N>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		let slot = *self.slots.get(k)?;
		self.occupant(slot).map(|occupant| &occupant.node)
	}

	/// Returns the node registered for `k` along with mutable access to the item it was last refreshed with.
	pub fn get_mut<Q: ?Sized>(&mut self, k: &Q) -> Option<(&N, &mut T)>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		let slot = *self.slots.get(k)?;
		self.arena
			.get_mut(slot.0)
			.and_then(Option::as_mut)
			.map(|occupant| (&occupant.node, &mut occupant.item))
	}

	/// Registers `node` for `k`.
	///
	/// If `k` was already registered, the previous node and item are handed back and the slot is reused.
	pub fn insert(&mut self, k: K, node: N, item: T) -> Option<(N, T)> {
		match self.slots.entry(k) {
			Entry::Occupied(occupied) => {
				let slot = *occupied.get();
				self.arena
					.get_mut(slot.0)
					.and_then(|cell| cell.replace(Occupant { node, item }))
					.map(|Occupant { node, item }| (node, item))
			}
			Entry::Vacant(vacant) => {
				let occupant = Some(Occupant { node, item });
				let slot = match self.free.pop() {
					Some(slot) => {
						self.arena[slot.0] = occupant;
						slot
					}
					None => {
						self.arena.push(occupant);
						Slot(self.arena.len() - 1)
					}
				};
				vacant.insert(slot);
				None
			}
		}
	}

	#[cfg(test)]
	pub fn remove<Q: ?Sized>(&mut self, k: &Q) -> Option<(N, T)>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		let slot = self.slots.remove(k)?;
		self.vacate(slot)
	}

	/// Evicts every entry whose key does not satisfy `keep`.
	///
	/// The returned iterator must be exhausted, otherwise the skipped entries' slots are not recycled.
	pub fn evict_unless<'a, F>(&'a mut self, mut keep: F) -> impl 'a + Iterator<Item = (K, N, T)>
	where
		F: 'a + FnMut(&K) -> bool,
	{
		let Self { slots, arena, free } = self;
		slots.drain_filter(move |k, _| !keep(k)).filter_map(move |(k, slot)| {
			let Occupant { node, item } = arena.get_mut(slot.0)?.take()?;
			free.push(slot);
			Some((k, node, item))
		})
	}

	/// Drops all entries along with the arena's allocation.
	pub fn release(&mut self) {
		*self = Self::new()
	}

	fn occupant(&self, slot: Slot) -> Option<&Occupant<N, T>> {
		self.arena.get(slot.0).and_then(Option::as_ref)
	}

	#[cfg(test)]
	fn vacate(&mut self, slot: Slot) -> Option<(N, T)> {
		let Occupant { node, item } = self.arena.get_mut(slot.0)?.take()?;
		self.free.push(slot);
		Some((node, item))
	}
}
