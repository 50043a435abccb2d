use core::hash::Hash;
use hashbrown::HashSet;

/// Scratch set of the keys in an incoming item array, kept around so its allocation is reused between reconciles.
pub struct TempKeySet<K>(HashSet<K>);
impl<K: Hash + Eq + core::fmt::Debug> core::fmt::Debug for TempKeySet<K> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_tuple("TempKeySet").field(&self.0).finish()
	}
}
impl<K: Hash + Eq> TempKeySet<K> {
	pub fn new() -> Self {
		Self(HashSet::new())
	}

	/// Hands out the set, cleared.
	pub fn temp(&mut self) -> &mut HashSet<K> {
		self.0.clear();
		&mut self.0
	}

	/// Retrieves the cache set's capacity without clearing it first.
	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}

	pub fn release(&mut self) {
		self.0 = HashSet::new()
	}
}
