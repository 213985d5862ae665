//! Thread-local registry of mounted chip panels.
//!
//! Each chip filter is its own yew app, so they cannot share a context.
//! Opening one panel closes every other registered panel through the close
//! callback it left here. Thread-local because WASM runs on one thread.
//! Entries are keyed by a per-instance id, since one page can mount the same
//! filter more than once.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use yew::Callback;

thread_local! {
    static NEXT_ID: Cell<usize> = const { Cell::new(0) };
    /// Close callbacks keyed by instance id.
    static PANELS: RefCell<HashMap<usize, Callback<()>>> = RefCell::new(HashMap::new());
}

/// A fresh instance id.
pub fn next_id() -> usize {
    NEXT_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

pub fn register(id: usize, close: Callback<()>) {
    PANELS.with(|p| {
        p.borrow_mut().insert(id, close);
    });
}

pub fn unregister(id: usize) {
    PANELS.with(|p| {
        p.borrow_mut().remove(&id);
    });
}

/// Close every panel except instance `id`.
pub fn close_others(id: usize) {
    // Emit outside the borrow: closing re-renders, and a render may register.
    let others: Vec<Callback<()>> = PANELS.with(|p| {
        p.borrow()
            .iter()
            .filter(|(other, _)| **other != id)
            .map(|(_, cb)| cb.clone())
            .collect()
    });
    for close in others {
        close.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn recorder(closed: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Callback<()> {
        let closed = closed.clone();
        Callback::from(move |_| closed.borrow_mut().push(name))
    }

    #[test]
    fn closes_every_other_panel() {
        let closed = Rc::new(RefCell::new(Vec::new()));
        let ids: Vec<usize> = ["products", "authors", "campaigns"]
            .into_iter()
            .map(|name| {
                let id = next_id();
                register(id, recorder(&closed, name));
                id
            })
            .collect();
        unregister(ids[2]);

        close_others(ids[0]);
        assert_eq!(*closed.borrow(), vec!["authors"]);
    }

    #[test]
    fn instances_of_the_same_filter_are_tracked_apart() {
        let closed = Rc::new(RefCell::new(Vec::new()));
        let first = next_id();
        let second = next_id();
        assert_ne!(first, second);
        register(first, recorder(&closed, "first products"));
        register(second, recorder(&closed, "second products"));

        close_others(first);
        assert_eq!(*closed.borrow(), vec!["second products"]);

        unregister(first);
        close_others(first);
        assert_eq!(*closed.borrow(), vec!["second products", "second products"]);
    }
}
