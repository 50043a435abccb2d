use thiserror::Error;
use wasm_bindgen::JsValue;

/// Why a [`BoundList`](`crate::BoundList`) mutation did not complete.
///
/// There is no rollback: After a failure partway through a reconcile, nodes may already have been created, moved or evicted.
/// The item list is left at its previous value in that case, and the next successful mutation brings the container back in line.
#[derive(Debug, Error)]
pub enum Error {
	#[error("render callback failed: {0:?}")]
	Render(JsValue),

	#[error("update callback failed: {0:?}")]
	Update(JsValue),

	#[error("custom reconcile callback failed: {0:?}")]
	Custom(JsValue),

	#[error("DOM mutation failed: {0:?}")]
	Dom(JsValue),

	/// A key appeared more than once in the incoming items. Nothing was changed.
	#[error("duplicate key at index {index}")]
	DuplicateKey { index: usize },

	/// The list was mutated from inside one of its own callbacks. Nothing was changed.
	#[error("re-entrant mutation while a reconcile was in progress")]
	Reentrant,
}
