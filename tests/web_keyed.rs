use bound_list_dom::{BoundList, Error, Keyed, Mode};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::Node;

wasm_bindgen_test_configure!(run_in_browser);

use web_common_::{child_nodes, container, entry, li, texts, Entry};

fn keyed() -> Keyed<Entry, u32> {
	Keyed::new(|entry: &Entry| entry.id).update(|node, entry, _| {
		node.set_text_content(Some(entry.name));
		Ok(())
	})
}

#[derive(Default)]
struct Hooks {
	added: Vec<u32>,
	removed: Vec<(Node, Entry)>,
}

fn hooked(hooks: &Rc<RefCell<Hooks>>) -> Keyed<Entry, u32> {
	let on_add = Rc::clone(hooks);
	let on_remove = Rc::clone(hooks);
	keyed()
		.on_add(move |_, entry| on_add.borrow_mut().added.push(entry.id))
		.on_remove(move |node, entry| on_remove.borrow_mut().removed.push((node.clone(), entry.clone())))
}

#[wasm_bindgen_test]
fn reuse_and_reorder() {
	let container = container();
	let list = BoundList::for_element_child_nodes(container.clone(), |entry: &Entry, _| li(entry.name), Mode::Keyed(keyed()));

	list.set(vec![entry(1, "A"), entry(2, "B")]).unwrap();
	assert_eq!(texts(&container), ["A", "B"]);
	let before = list.elements();

	list.set(vec![entry(2, "B2"), entry(1, "A")]).unwrap();
	assert_eq!(texts(&container), ["B2", "A"]);

	let after = list.elements();
	assert_eq!(after[0], before[1]);
	assert_eq!(after[1], before[0]);
	assert_eq!(child_nodes(&container), after);
}

#[wasm_bindgen_test]
fn identical_set_renders_nothing_new() {
	let container = container();
	let renders = Rc::new(RefCell::new(0));
	let list = BoundList::for_element_child_nodes(
		container.clone(),
		{
			let renders = Rc::clone(&renders);
			move |entry: &Entry, _| {
				*renders.borrow_mut() += 1;
				li(entry.name)
			}
		},
		Mode::Keyed(keyed()),
	);

	let items = vec![entry(1, "A"), entry(2, "B"), entry(3, "C")];
	list.set(items.clone()).unwrap();
	let first = list.elements();
	list.set(items).unwrap();

	assert_eq!(*renders.borrow(), 3);
	assert_eq!(list.elements(), first);
	assert_eq!(texts(&container), ["A", "B", "C"]);
}

#[wasm_bindgen_test]
fn hooks_fire_once_per_key_change() {
	let hooks = Rc::new(RefCell::new(Hooks::default()));
	let list = BoundList::for_element_child_nodes(container(), |entry: &Entry, _| li(entry.name), Mode::Keyed(hooked(&hooks)));

	list.set(vec![entry(1, "A"), entry(2, "B")]).unwrap();
	assert_eq!(hooks.borrow().added, [1, 2]);
	assert!(hooks.borrow().removed.is_empty());

	list.set(vec![entry(2, "B"), entry(3, "C")]).unwrap();
	assert_eq!(hooks.borrow().added, [1, 2, 3]);
	let removed: Vec<u32> = hooks.borrow().removed.iter().map(|(_, entry)| entry.id).collect();
	assert_eq!(removed, [1]);
}

#[wasm_bindgen_test]
fn remove_evicts_with_hook() {
	let container = container();
	let hooks = Rc::new(RefCell::new(Hooks::default()));
	let list = BoundList::for_element_child_nodes(container.clone(), |entry: &Entry, _| li(entry.name), Mode::Keyed(hooked(&hooks)));

	list.set(vec![entry(1, "A"), entry(2, "B")]).unwrap();
	list.set(vec![entry(2, "B2"), entry(1, "A")]).unwrap();
	let a = list.element_for_key(&1).unwrap();

	list.remove(|entry| entry.id == 1).unwrap();

	assert_eq!(texts(&container), ["B2"]);
	assert_eq!(list.items(), [entry(2, "B2")]);
	let hooks = hooks.borrow();
	assert_eq!(hooks.removed.len(), 1);
	assert_eq!(hooks.removed[0].0, a);
	assert_eq!(hooks.removed[0].1, entry(1, "A"));
	assert!(a.parent_node().is_none());
	assert!(list.element_for_key(&1).is_none());
}

#[wasm_bindgen_test]
fn insert_splices() {
	let container = container();
	let list = BoundList::for_element_child_nodes(container.clone(), |entry: &Entry, _| li(entry.name), Mode::Keyed(keyed()));

	list.set(vec![entry(1, "A"), entry(2, "B")]).unwrap();
	let b = list.element_for_key(&2).unwrap();

	list.insert(1, vec![entry(3, "C")]).unwrap();
	assert_eq!(texts(&container), ["A", "C", "B"]);
	assert_eq!(list.element_for_key(&2).unwrap(), b);

	list.insert(-1, vec![entry(4, "D")]).unwrap();
	assert_eq!(texts(&container), ["A", "C", "D", "B"]);

	list.insert(100, vec![entry(5, "E")]).unwrap();
	list.insert(-100, vec![entry(6, "F")]).unwrap();
	assert_eq!(texts(&container), ["F", "A", "C", "D", "B", "E"]);
	assert_eq!(child_nodes(&container), list.elements());
}

#[wasm_bindgen_test]
fn append_and_prepend_keep_existing_nodes() {
	let container = container();
	let list = BoundList::for_element_child_nodes(container.clone(), |entry: &Entry, _| li(entry.name), Mode::Keyed(keyed()));

	list.set(vec![entry(1, "A")]).unwrap();
	let a = list.element_for_key(&1).unwrap();

	list.append(vec![entry(2, "B"), entry(3, "C")]).unwrap();
	list.prepend(vec![entry(0, "Z")]).unwrap();

	assert_eq!(texts(&container), ["Z", "A", "B", "C"]);
	assert_eq!(list.elements()[1], a);
	assert_eq!(list.len(), 4);
}

#[wasm_bindgen_test]
fn update_patches_matching_items() {
	let container = container();
	let list = BoundList::for_element_child_nodes(container.clone(), |entry: &Entry, _| li(entry.name), Mode::Keyed(keyed()));

	list.set(vec![entry(1, "A"), entry(2, "B"), entry(3, "C")]).unwrap();
	let before = list.elements();

	list.update(|entry| entry.id % 2 == 1, |entry| Entry { name: "odd", ..entry.clone() }).unwrap();

	assert_eq!(texts(&container), ["odd", "B", "odd"]);
	assert_eq!(list.elements(), before);
	assert_eq!(list.items()[1], entry(2, "B"));
}

#[wasm_bindgen_test]
fn stale_content_without_update_callback() {
	let container = container();
	let list = BoundList::for_element_child_nodes(container.clone(), |entry: &Entry, _| li(entry.name), Mode::Keyed(Keyed::new(|entry: &Entry| entry.id)));

	list.set(vec![entry(1, "A")]).unwrap();
	list.set(vec![entry(1, "A2")]).unwrap();

	assert_eq!(texts(&container), ["A"]);
	assert_eq!(list.items(), [entry(1, "A2")]);
}

#[wasm_bindgen_test]
fn duplicate_keys_are_rejected() {
	let container = container();
	let list = BoundList::for_element_child_nodes(container.clone(), |entry: &Entry, _| li(entry.name), Mode::Keyed(keyed()));

	list.set(vec![entry(1, "A"), entry(2, "B")]).unwrap();
	let before = list.elements();

	let result = list.set(vec![entry(3, "C"), entry(1, "A"), entry(3, "C again")]);
	assert!(matches!(result, Err(Error::DuplicateKey { index: 2 })));

	assert_eq!(texts(&container), ["A", "B"]);
	assert_eq!(list.elements(), before);
	assert_eq!(list.items(), [entry(1, "A"), entry(2, "B")]);
	assert!(list.element_for_key(&3).is_none());
}

#[wasm_bindgen_test]
fn empty_set_evicts_everything() {
	let container = container();
	let list = BoundList::for_element_child_nodes(container.clone(), |entry: &Entry, _| li(entry.name), Mode::Keyed(keyed()));

	list.set(vec![entry(1, "A"), entry(2, "B")]).unwrap();
	list.set(Vec::new()).unwrap();

	assert!(child_nodes(&container).is_empty());
	assert!(list.elements().is_empty());
	assert!(list.is_empty());
	assert!(list.element_for_key(&1).is_none());
}

#[wasm_bindgen_test]
fn failed_render_is_repaired_by_next_set() {
	let container = container();
	let list = BoundList::for_element_child_nodes(
		container.clone(),
		|entry: &Entry, _| if entry.name == "boom" { Err("boom".into()) } else { li(entry.name) },
		Mode::Keyed(keyed()),
	);

	list.set(vec![entry(1, "A")]).unwrap();
	let result = list.set(vec![entry(2, "B"), entry(3, "boom")]);
	assert!(matches!(result, Err(Error::Render(_))));
	assert_eq!(list.items(), [entry(1, "A")]);

	list.set(vec![entry(2, "B")]).unwrap();
	assert_eq!(texts(&container), ["B"]);
	assert_eq!(child_nodes(&container), list.elements());
}

#[wasm_bindgen_test]
fn reentrant_mutation_fails_fast() {
	let container = container();
	let handle: Rc<RefCell<Option<BoundList<Entry, u32>>>> = Rc::default();
	let reentry = Rc::new(RefCell::new(None));

	let list = BoundList::for_element_child_nodes(
		container.clone(),
		{
			let handle = Rc::clone(&handle);
			let reentry = Rc::clone(&reentry);
			move |entry: &Entry, _| {
				if let Some(list) = &*handle.borrow() {
					*reentry.borrow_mut() = Some((list.set(Vec::new()), list.items()));
				}
				li(entry.name)
			}
		},
		Mode::Keyed(keyed()),
	);
	*handle.borrow_mut() = Some(list.clone());

	list.set(vec![entry(1, "A"), entry(2, "B")]).unwrap();

	let (result, items_seen) = reentry.borrow_mut().take().unwrap();
	assert!(matches!(result, Err(Error::Reentrant)));
	assert!(items_seen.is_empty());
	assert_eq!(texts(&container), ["A", "B"]);
	assert_eq!(list.len(), 2);

	handle.borrow_mut().take();
}

#[wasm_bindgen_test]
fn failed_update_keeps_previous_items() {
	let container = container();
	let removed = Rc::new(RefCell::new(Vec::new()));
	let list = BoundList::for_element_child_nodes(
		container.clone(),
		|entry: &Entry, _| li(entry.name),
		Mode::Keyed(
			Keyed::new(|entry: &Entry| entry.id)
				.update(|node, entry, _| {
					if entry.name == "bad" {
						return Err("bad".into());
					}
					node.set_text_content(Some(entry.name));
					Ok(())
				})
				.on_remove({
					let removed = Rc::clone(&removed);
					move |_, entry| removed.borrow_mut().push(entry.clone())
				}),
		),
	);

	list.set(vec![entry(1, "A"), entry(2, "B")]).unwrap();
	let result = list.set(vec![entry(1, "A2"), entry(2, "bad")]);
	assert!(matches!(result, Err(Error::Update(_))));
	assert_eq!(list.items(), [entry(1, "A"), entry(2, "B")]);

	list.set(vec![entry(2, "B3"), entry(3, "C")]).unwrap();
	assert_eq!(texts(&container), ["B3", "C"]);
	assert_eq!(child_nodes(&container), list.elements());
	assert_eq!(*removed.borrow(), [entry(1, "A")]);
}

#[wasm_bindgen_test]
fn callbacks_receive_new_positions() {
	let container = container();
	let list = BoundList::for_element_child_nodes(
		container.clone(),
		|entry: &Entry, index| li(&format!("{}{}", index, entry.name)),
		Mode::Keyed(Keyed::new(|entry: &Entry| entry.id).update(|node, entry, index| {
			node.set_text_content(Some(&format!("{}{}", index, entry.name)));
			Ok(())
		})),
	);

	list.set(vec![entry(1, "A"), entry(2, "B"), entry(3, "C")]).unwrap();
	assert_eq!(texts(&container), ["0A", "1B", "2C"]);
	let before = list.elements();

	list.set(vec![entry(3, "C"), entry(1, "A"), entry(2, "B"), entry(4, "D")]).unwrap();
	assert_eq!(texts(&container), ["0C", "1A", "2B", "3D"]);
	assert_eq!(list.elements()[..3], [before[2].clone(), before[0].clone(), before[1].clone()]);
}
