// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notification for values derived from elements.
//!
//! An [`ElementObserver`] watches one derived value (for example an element's
//! size) for a set of elements. Layout code [triggers](ElementObserver::trigger_element)
//! an element whenever the value might have changed; once layout settles,
//! [`check_triggered_elements`](ElementObserver::check_triggered_elements)
//! compares each triggered element's value with the last value delivered and
//! notifies handlers only when it differs. Transient values seen while layout
//! is still in flight are never delivered.

use std::collections::{BTreeMap, BTreeSet};

use crate::element::{ElementId, ElementTree};

/// Handle to one handler registered with [`ElementObserver::observe`].
#[must_use = "dropping a connection leaves the handler registered; pass it to `disconnect` to remove it"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ObserverConnection {
    element: ElementId,
    slot: u64,
}

impl ObserverConnection {
    /// Returns the observed element.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }
}

type Handler<T> = Box<dyn FnMut(&T)>;

struct Observed<T> {
    prev_value: T,
    handlers: Vec<(u64, Handler<T>)>,
}

/// Watches a value extracted from elements and notifies on change.
///
/// Observing an element [retains](ElementTree::retain) it until its last
/// handler is disconnected.
pub struct ElementObserver<T> {
    extract: Box<dyn Fn(&ElementTree, ElementId) -> T>,
    observed: BTreeMap<ElementId, Observed<T>>,
    triggered: BTreeSet<ElementId>,
    next_slot: u64,
}

impl<T> core::fmt::Debug for ElementObserver<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementObserver")
            .field("observed", &self.observed.len())
            .field("triggered", &self.triggered)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq + 'static> ElementObserver<T> {
    /// Creates an observer for the value computed by `extract`.
    #[must_use]
    pub fn new(extract: impl Fn(&ElementTree, ElementId) -> T + 'static) -> Self {
        Self {
            extract: Box::new(extract),
            observed: BTreeMap::new(),
            triggered: BTreeSet::new(),
            next_slot: 0,
        }
    }

    /// Registers `handler` for changes of `element`'s value.
    ///
    /// The first registration for an element records its current value as
    /// the baseline and retains the element.
    pub fn observe(
        &mut self,
        tree: &mut ElementTree,
        element: ElementId,
        handler: impl FnMut(&T) + 'static,
    ) -> ObserverConnection {
        let slot = self.next_slot;
        self.next_slot += 1;
        let extract = &self.extract;
        let entry = self.observed.entry(element).or_insert_with(|| {
            tree.retain(element);
            Observed {
                prev_value: extract(tree, element),
                handlers: Vec::new(),
            }
        });
        entry.handlers.push((slot, Box::new(handler)));
        ObserverConnection { element, slot }
    }

    /// Removes the handler behind `connection`.
    ///
    /// When it was the element's last handler, the element stops being
    /// observed and is released. Returns `false` if the connection was
    /// already disconnected.
    pub fn disconnect(&mut self, tree: &mut ElementTree, connection: ObserverConnection) -> bool {
        let element = connection.element;
        let Some(entry) = self.observed.get_mut(&element) else {
            return false;
        };
        let before = entry.handlers.len();
        entry.handlers.retain(|(slot, _)| *slot != connection.slot);
        if entry.handlers.len() == before {
            return false;
        }
        if entry.handlers.is_empty() {
            self.forget(tree, element);
        }
        true
    }

    /// Removes every handler of `element`. Returns whether it was observed.
    pub fn unobserve(&mut self, tree: &mut ElementTree, element: ElementId) -> bool {
        if !self.observed.contains_key(&element) {
            return false;
        }
        self.forget(tree, element);
        true
    }

    /// Returns whether `element` has at least one handler.
    #[must_use]
    pub fn is_observed(&self, element: ElementId) -> bool {
        self.observed.contains_key(&element)
    }

    /// Returns the number of handlers registered for `element`.
    #[must_use]
    pub fn handler_count(&self, element: ElementId) -> usize {
        self.observed
            .get(&element)
            .map_or(0, |entry| entry.handlers.len())
    }

    /// Notes that `element`'s value may have changed. Ignored for elements
    /// without handlers.
    pub fn trigger_element(&mut self, element: ElementId) {
        if self.observed.contains_key(&element) {
            self.triggered.insert(element);
        }
    }

    /// Checks every triggered element, notifying handlers of changed values.
    ///
    /// Returns the number of elements whose handlers were notified.
    pub fn check_triggered_elements(&mut self, tree: &ElementTree) -> usize {
        let triggered = core::mem::take(&mut self.triggered);
        triggered
            .into_iter()
            .filter(|&element| self.check_element(tree, element))
            .count()
    }

    /// Checks every observed element regardless of triggers.
    pub fn check_all_elements(&mut self, tree: &ElementTree) -> usize {
        self.triggered.clear();
        let observed: Vec<ElementId> = self.observed.keys().copied().collect();
        observed
            .into_iter()
            .filter(|&element| self.check_element(tree, element))
            .count()
    }

    fn check_element(&mut self, tree: &ElementTree, element: ElementId) -> bool {
        if !tree.is_alive(element) {
            self.observed.remove(&element);
            return false;
        }
        let value = (self.extract)(tree, element);
        let Some(entry) = self.observed.get_mut(&element) else {
            return false;
        };
        if entry.prev_value == value {
            return false;
        }
        for (_, handler) in &mut entry.handlers {
            handler(&value);
        }
        entry.prev_value = value;
        true
    }

    fn forget(&mut self, tree: &mut ElementTree, element: ElementId) {
        self.observed.remove(&element);
        self.triggered.remove(&element);
        if tree.is_alive(element) {
            tree.release(element);
        }
    }
}
