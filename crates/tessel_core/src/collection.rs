//! Collection change notification
//!
//! [`ObservableVec<T>`] is a list that reports every mutation through
//! `collection_changed` as a [`CollectionChangedEventArgs`] delta, so bound
//! views can patch themselves instead of re-reading the whole list.
//!
//! | Mutation | Event |
//! |----------|-------|
//! | `push`, `extend`, `insert`, `insert_many` | `Add` |
//! | `pop`, `remove`, `remove_range`, `truncate` | `Remove` |
//! | `retain` | one `Remove` per contiguous removed run |
//! | `set`, `replace_all`, `sort_by` | `Reset` |
//! | `clear`, `replace_all` with no items | `Clear` |
//!
//! Mutations with nothing to add or remove (an empty `extend`, `clear` or
//! `retain` on a list with nothing to drop) dispatch nothing. Items are not
//! compared, so `set` and `sort_by` always dispatch `Reset` on a list they can
//! touch. When the length changes, `property_changed` is also notified with
//! `"len"` after the collection event.
//!
//! The list is mutated through `&self` and no borrow is held during dispatch,
//! so handlers can read the list (or mutate it again).

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use tracing::trace;

use crate::error::{DispatchError, ObservableError};
use crate::events::EventSource;
use crate::property::PropertyName;

/// Name notified on `property_changed` when the length changes
pub const LEN_PROPERTY: PropertyName = PropertyName::new("len");

/// Kind of a collection change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionChangedAction {
    Add,
    Remove,
    Reset,
    Clear,
}

/// A single collection change.
///
/// An event is exactly one kind; an `Add` never carries removed items and a
/// `Remove` never carries added ones.
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionChangedEventArgs<T> {
    /// Contiguous items inserted starting at `new_starting_index`
    Add {
        new_items: Vec<T>,
        new_starting_index: usize,
    },
    /// Contiguous items removed, previously starting at `old_starting_index`
    Remove {
        old_items: Vec<T>,
        old_starting_index: usize,
    },
    /// The contents changed in a way that is not a simple add or remove;
    /// re-read the whole collection.
    Reset,
    /// The collection is now empty.
    Clear,
}

impl<T> CollectionChangedEventArgs<T> {
    pub fn action(&self) -> CollectionChangedAction {
        match self {
            Self::Add { .. } => CollectionChangedAction::Add,
            Self::Remove { .. } => CollectionChangedAction::Remove,
            Self::Reset => CollectionChangedAction::Reset,
            Self::Clear => CollectionChangedAction::Clear,
        }
    }

    pub fn new_items(&self) -> Option<&[T]> {
        match self {
            Self::Add { new_items, .. } => Some(new_items),
            _ => None,
        }
    }

    pub fn new_starting_index(&self) -> Option<usize> {
        match self {
            Self::Add {
                new_starting_index, ..
            } => Some(*new_starting_index),
            _ => None,
        }
    }

    pub fn old_items(&self) -> Option<&[T]> {
        match self {
            Self::Remove { old_items, .. } => Some(old_items),
            _ => None,
        }
    }

    pub fn old_starting_index(&self) -> Option<usize> {
        match self {
            Self::Remove {
                old_starting_index, ..
            } => Some(*old_starting_index),
            _ => None,
        }
    }
}

impl<T: Clone> CollectionChangedEventArgs<T> {
    /// Apply this change to a mirror of the collection.
    ///
    /// Returns `false` for `Reset`, or if the indices do not fit the mirror;
    /// the caller must then re-read the source collection.
    pub fn apply_to(&self, mirror: &mut Vec<T>) -> bool {
        match self {
            Self::Add {
                new_items,
                new_starting_index,
            } => {
                if *new_starting_index > mirror.len() {
                    return false;
                }
                mirror.splice(*new_starting_index..*new_starting_index, new_items.iter().cloned());
                true
            }
            Self::Remove {
                old_items,
                old_starting_index,
            } => {
                let end = old_starting_index + old_items.len();
                if end > mirror.len() {
                    return false;
                }
                mirror.drain(*old_starting_index..end);
                true
            }
            Self::Reset => false,
            Self::Clear => {
                mirror.clear();
                true
            }
        }
    }
}

/// A vector that reports its mutations.
pub struct ObservableVec<T: 'static> {
    items: RefCell<Vec<T>>,
    /// Bumped once per dispatched mutation
    revision: Cell<u64>,
    collection_changed: EventSource<CollectionChangedEventArgs<T>>,
    property_changed: EventSource<PropertyName>,
}

impl<T: Clone + 'static> ObservableVec<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Wrap existing items. No event is dispatched.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(items),
            revision: Cell::new(0),
            collection_changed: EventSource::with_label("collection_changed"),
            property_changed: EventSource::with_label("property_changed"),
        }
    }

    pub fn collection_changed(&self) -> &EventSource<CollectionChangedEventArgs<T>> {
        &self.collection_changed
    }

    pub fn property_changed(&self) -> &EventSource<PropertyName> {
        &self.property_changed
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    /// Clone the current contents
    pub fn to_vec(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    /// Access the contents by reference. Mutating the list inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.items.borrow())
    }

    // =========================================================================
    // Add
    // =========================================================================

    pub fn push(&self, item: T) -> Result<(), ObservableError> {
        let index = self.len();
        self.insert_many(index, vec![item])
    }

    /// Append items as a single `Add`
    pub fn extend(&self, items: impl IntoIterator<Item = T>) -> Result<(), ObservableError> {
        let index = self.len();
        self.insert_many(index, items.into_iter().collect())
    }

    pub fn insert(&self, index: usize, item: T) -> Result<(), ObservableError> {
        self.insert_many(index, vec![item])
    }

    /// Insert contiguous items at `index` as a single `Add`
    pub fn insert_many(&self, index: usize, items: Vec<T>) -> Result<(), ObservableError> {
        if items.is_empty() {
            return self.check_insert_index(index);
        }
        {
            let mut current = self.items.borrow_mut();
            if index > current.len() {
                return Err(ObservableError::IndexOutOfBounds {
                    index,
                    len: current.len(),
                });
            }
            current.splice(index..index, items.iter().cloned());
        }
        self.dispatch(
            CollectionChangedEventArgs::Add {
                new_items: items,
                new_starting_index: index,
            },
            true,
        )
    }

    // =========================================================================
    // Remove
    // =========================================================================

    pub fn pop(&self) -> Result<Option<T>, ObservableError> {
        let len = self.len();
        if len == 0 {
            return Ok(None);
        }
        self.remove(len - 1).map(Some)
    }

    /// Remove the item at `index`.
    ///
    /// On a handler failure the item is already removed and is dropped with
    /// the event; only handlers see it.
    pub fn remove(&self, index: usize) -> Result<T, ObservableError> {
        let item = {
            let mut current = self.items.borrow_mut();
            if index >= current.len() {
                return Err(ObservableError::IndexOutOfBounds {
                    index,
                    len: current.len(),
                });
            }
            current.remove(index)
        };
        self.dispatch(
            CollectionChangedEventArgs::Remove {
                old_items: vec![item.clone()],
                old_starting_index: index,
            },
            true,
        )?;
        Ok(item)
    }

    /// Remove a contiguous range as a single `Remove`.
    ///
    /// As with [`remove`](Self::remove), a handler failure drops the removed items.
    pub fn remove_range(&self, range: Range<usize>) -> Result<Vec<T>, ObservableError> {
        let removed: Vec<T> = {
            let mut current = self.items.borrow_mut();
            if range.start > range.end || range.end > current.len() {
                return Err(ObservableError::IndexOutOfBounds {
                    index: range.end.max(range.start),
                    len: current.len(),
                });
            }
            current.drain(range.clone()).collect()
        };
        if removed.is_empty() {
            return Ok(removed);
        }
        self.dispatch(
            CollectionChangedEventArgs::Remove {
                old_items: removed.clone(),
                old_starting_index: range.start,
            },
            true,
        )?;
        Ok(removed)
    }

    /// Shorten the list to `len` items
    pub fn truncate(&self, len: usize) -> Result<(), ObservableError> {
        let current = self.len();
        if len >= current {
            return Ok(());
        }
        self.remove_range(len..current).map(|_| ())
    }

    /// Keep only the items matching `keep`.
    ///
    /// Each contiguous run of removed items is reported as its own `Remove`,
    /// front to back. Every event's index is valid for the list as it is when
    /// that event is dispatched.
    ///
    /// Handlers may change the list between runs. When one does, the scan
    /// restarts from the front and `keep` is asked again about the items it
    /// already saw, so on return every item matches `keep`.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> Result<(), ObservableError> {
        let mut results = Vec::new();
        let mut from = 0;
        loop {
            let next = {
                let current = self.items.borrow();
                let from = from.min(current.len());
                next_removed_run(&current[from..], &mut keep)
                    .map(|(run, kept_after)| (run.start + from..run.end + from, kept_after))
            };
            let Some((run, kept_after)) = next else {
                break;
            };

            let removed: Vec<T> = self.items.borrow_mut().drain(run.clone()).collect();
            let revision = self.revision.get();
            results.push(self.dispatch_events(
                CollectionChangedEventArgs::Remove {
                    old_items: removed,
                    old_starting_index: run.start,
                },
                true,
            ));

            from = if self.revision.get() != revision + 1 {
                // A handler mutated the list; positions are stale.
                0
            } else if kept_after {
                run.start + 1
            } else {
                run.start
            };
        }
        DispatchError::collect(results).map_err(ObservableError::from)
    }

    /// Empty the list
    pub fn clear(&self) -> Result<(), ObservableError> {
        let previous = {
            let mut current = self.items.borrow_mut();
            if current.is_empty() {
                return Ok(());
            }
            std::mem::take(&mut *current)
        };
        drop(previous);
        self.dispatch(CollectionChangedEventArgs::Clear, true)
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Replace the item at `index`, returning the previous item.
    ///
    /// Always dispatches `Reset`, even if the new item equals the old one. A
    /// handler failure drops the previous item.
    pub fn set(&self, index: usize, item: T) -> Result<T, ObservableError> {
        let previous = {
            let mut current = self.items.borrow_mut();
            let len = current.len();
            match current.get_mut(index) {
                Some(slot) => std::mem::replace(slot, item),
                None => return Err(ObservableError::IndexOutOfBounds { index, len }),
            }
        };
        self.dispatch(CollectionChangedEventArgs::Reset, false)?;
        Ok(previous)
    }

    /// Replace the whole contents.
    ///
    /// Dispatches `Reset`, or `Clear` if the new contents are empty. Replacing
    /// an empty list with nothing dispatches nothing.
    pub fn replace_all(&self, items: Vec<T>) -> Result<(), ObservableError> {
        let (previous, len_changed) = {
            let mut current = self.items.borrow_mut();
            if current.is_empty() && items.is_empty() {
                return Ok(());
            }
            let len_changed = current.len() != items.len();
            (std::mem::replace(&mut *current, items), len_changed)
        };
        drop(previous);
        let args = if self.is_empty() {
            CollectionChangedEventArgs::Clear
        } else {
            CollectionChangedEventArgs::Reset
        };
        self.dispatch(args, len_changed)
    }

    /// Sort the list and dispatch `Reset`.
    ///
    /// The list stays borrowed while `compare` runs; reading or mutating the
    /// list from inside `compare` panics.
    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> Ordering) -> Result<(), ObservableError> {
        if self.len() < 2 {
            return Ok(());
        }
        self.items.borrow_mut().sort_by(compare);
        self.dispatch(CollectionChangedEventArgs::Reset, false)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn check_insert_index(&self, index: usize) -> Result<(), ObservableError> {
        let len = self.len();
        if index > len {
            Err(ObservableError::IndexOutOfBounds { index, len })
        } else {
            Ok(())
        }
    }

    fn dispatch(&self, args: CollectionChangedEventArgs<T>, len_changed: bool) -> Result<(), ObservableError> {
        self.dispatch_events(args, len_changed)
            .map_err(ObservableError::from)
    }

    /// Dispatch the collection event, then the length notification.
    /// Both run even if the first has failing handlers.
    fn dispatch_events(
        &self,
        args: CollectionChangedEventArgs<T>,
        len_changed: bool,
    ) -> Result<(), DispatchError> {
        self.revision.set(self.revision.get() + 1);
        trace!(action = ?args.action(), "collection changed");
        let collection = self.collection_changed.invoke(&args);
        let len = if len_changed {
            self.property_changed.invoke(&LEN_PROPERTY)
        } else {
            Ok(())
        };
        DispatchError::collect([collection, len])
    }
}

impl<T: Clone + 'static> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> From<Vec<T>> for ObservableVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableVec")
            .field("items", &*self.items.borrow())
            .field("collection_changed", &self.collection_changed)
            .finish()
    }
}

/// First contiguous run of items failing `keep`, and whether an item that
/// passes `keep` follows it. `keep` is called at most once per item.
fn next_removed_run<T>(items: &[T], keep: &mut impl FnMut(&T) -> bool) -> Option<(Range<usize>, bool)> {
    let start = items.iter().position(|item| !keep(item))?;
    let run = match items[start + 1..].iter().position(|item| keep(item)) {
        Some(offset) => (start..start + 1 + offset, true),
        None => (start..items.len(), false),
    };
    Some(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::rc::Rc;

    type Log<T> = Rc<RefCell<Vec<CollectionChangedEventArgs<T>>>>;

    fn record<T: Clone + 'static>(list: &ObservableVec<T>) -> Log<T> {
        let log: Log<T> = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let _ = list
            .collection_changed()
            .subscribe(move |args| l.borrow_mut().push(args.clone()));
        log
    }

    #[test]
    fn test_append_then_remove() {
        let list = ObservableVec::from_vec(vec!['x', 'y', 'z']);
        let log = record(&list);

        list.extend(['a', 'b']).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![CollectionChangedEventArgs::Add {
                new_items: vec!['a', 'b'],
                new_starting_index: 3,
            }]
        );

        log.borrow_mut().clear();
        assert_eq!(list.remove(1).unwrap(), 'y');
        assert_eq!(
            *log.borrow(),
            vec![CollectionChangedEventArgs::Remove {
                old_items: vec!['y'],
                old_starting_index: 1,
            }]
        );
        assert_eq!(list.to_vec(), vec!['x', 'z', 'a', 'b']);
    }

    #[test]
    fn test_accessors_match_action() {
        let add = CollectionChangedEventArgs::Add {
            new_items: vec![1],
            new_starting_index: 0,
        };
        assert_eq!(add.action(), CollectionChangedAction::Add);
        assert_eq!(add.new_items(), Some(&[1][..]));
        assert_eq!(add.old_items(), None);
        assert_eq!(add.old_starting_index(), None);

        let reset = CollectionChangedEventArgs::<i32>::Reset;
        assert_eq!(reset.action(), CollectionChangedAction::Reset);
        assert_eq!(reset.new_starting_index(), None);
    }

    #[test]
    fn test_noop_mutations_dispatch_nothing() {
        let list = ObservableVec::<i32>::new();
        let log = record(&list);

        list.extend(Vec::new()).unwrap();
        list.clear().unwrap();
        list.truncate(4).unwrap();
        assert_eq!(list.pop().unwrap(), None);
        list.retain(|_| true).unwrap();
        list.sort_by(|a, b| a.cmp(b)).unwrap();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let list = ObservableVec::from_vec(vec![1, 2]);
        let log = record(&list);

        assert!(matches!(
            list.insert(5, 0),
            Err(ObservableError::IndexOutOfBounds { index: 5, len: 2 })
        ));
        assert!(matches!(
            list.remove(2),
            Err(ObservableError::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert!(list.remove_range(1..3).is_err());
        assert!(list.set(9, 0).is_err());
        assert!(log.borrow().is_empty());
        assert_eq!(list.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_retain_reports_each_run() {
        let list = ObservableVec::from_vec(vec![1, 2, 3, 4, 5, 6, 7]);
        let log = record(&list);

        list.retain(|n| *n != 2 && *n != 3 && *n != 6).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                CollectionChangedEventArgs::Remove {
                    old_items: vec![2, 3],
                    old_starting_index: 1,
                },
                CollectionChangedEventArgs::Remove {
                    old_items: vec![6],
                    old_starting_index: 3,
                },
            ]
        );
        assert_eq!(list.to_vec(), vec![1, 4, 5, 7]);
    }

    #[test]
    fn test_mirror_tracks_source_through_events() {
        let list = Rc::new(ObservableVec::from_vec(vec![10, 20, 30]));
        let mirror = Rc::new(RefCell::new(list.to_vec()));

        let m = mirror.clone();
        let weak = Rc::downgrade(&list);
        let _sync = list.collection_changed().subscribe(move |args| {
            let mut mirror = m.borrow_mut();
            if !args.apply_to(&mut mirror) {
                if let Some(list) = weak.upgrade() {
                    *mirror = list.to_vec();
                }
            }
        });

        list.push(40).unwrap();
        list.insert(0, 5).unwrap();
        list.retain(|n| n % 20 != 0).unwrap();
        list.set(1, 11).unwrap();
        list.sort_by(|a, b| b.cmp(a)).unwrap();
        list.remove_range(0..1).unwrap();
        assert_eq!(*mirror.borrow(), list.to_vec());

        list.clear().unwrap();
        assert!(mirror.borrow().is_empty());
    }

    #[test]
    fn test_set_and_replace_all_reset() {
        let list = ObservableVec::from_vec(vec!["a", "b"]);
        let log = record(&list);

        assert_eq!(list.set(0, "z").unwrap(), "a");
        list.replace_all(vec!["q"]).unwrap();

        let actions: Vec<_> = log.borrow().iter().map(|e| e.action()).collect();
        assert_eq!(
            actions,
            vec![CollectionChangedAction::Reset, CollectionChangedAction::Reset]
        );
    }

    #[test]
    fn test_len_notified_after_collection_event() {
        let list = ObservableVec::<u8>::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        let _c = list
            .collection_changed()
            .subscribe(move |args| o.borrow_mut().push(format!("{:?}", args.action())));
        let o = order.clone();
        let _p = list
            .property_changed()
            .subscribe(move |name| o.borrow_mut().push(name.to_string()));

        list.push(1).unwrap();
        list.set(0, 2).unwrap();
        list.clear().unwrap();

        assert_eq!(*order.borrow(), vec!["Add", "len", "Reset", "Clear", "len"]);
    }

    #[test]
    fn test_handler_failure_after_mutation() {
        let list = ObservableVec::from_vec(vec![1]);
        let _bad = list
            .collection_changed()
            .subscribe_fallible(|_| Err(anyhow!("view detached")));

        let err = list.push(2).unwrap_err();
        let dispatch = err.dispatch().unwrap();
        assert_eq!(dispatch.len(), 1);
        assert_eq!(list.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_next_removed_run() {
        let mut odd = |n: &i32| n % 2 == 1;
        assert_eq!(next_removed_run(&[1, 2, 4, 5], &mut odd), Some((1..3, true)));
        assert_eq!(next_removed_run(&[1, 3, 6, 8], &mut odd), Some((2..4, false)));
        assert_eq!(next_removed_run(&[1, 3], &mut odd), None);
        let empty: [i32; 0] = [];
        assert_eq!(next_removed_run(&empty, &mut odd), None);
    }

    #[test]
    fn test_retain_calls_keep_once_per_item() {
        let list = ObservableVec::from_vec(vec![1, 2, 3, 4, 5, 6, 7]);
        let calls = Rc::new(RefCell::new(Vec::new()));

        let c = calls.clone();
        list.retain(move |n| {
            c.borrow_mut().push(*n);
            n % 3 != 0
        })
        .unwrap();

        assert_eq!(*calls.borrow(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(list.to_vec(), vec![1, 2, 4, 5, 7]);
    }

    #[test]
    fn test_retain_survives_handler_inserting_at_front() {
        let list = Rc::new(ObservableVec::from_vec((1..=7).collect::<Vec<i32>>()));
        let inserted = Rc::new(Cell::new(false));

        let weak = Rc::downgrade(&list);
        let flag = inserted.clone();
        let _reg = list.collection_changed().subscribe_fallible(move |args| {
            if args.action() == CollectionChangedAction::Remove && !flag.get() {
                flag.set(true);
                if let Some(list) = weak.upgrade() {
                    list.insert(0, 101)?;
                }
            }
            Ok(())
        });

        list.retain(|n| n % 2 == 1).unwrap();

        assert!(inserted.get());
        assert_eq!(list.to_vec(), vec![101, 1, 3, 5, 7]);
    }

    #[test]
    fn test_retain_after_handler_removes_items() {
        let list = Rc::new(ObservableVec::from_vec(vec![2, 1, 4, 3, 6, 5, 8]));
        let removed = Rc::new(RefCell::new(Vec::new()));
        let handled = Rc::new(Cell::new(false));

        let weak = Rc::downgrade(&list);
        let (r, h) = (removed.clone(), handled.clone());
        let _reg = list.collection_changed().subscribe_fallible(move |args| {
            if let Some(items) = args.old_items() {
                r.borrow_mut().extend(items.iter().copied());
            }
            if !h.replace(true) {
                if let Some(list) = weak.upgrade() {
                    list.remove(0)?;
                }
            }
            Ok(())
        });

        list.retain(|n| n % 2 == 1).unwrap();

        assert_eq!(list.to_vec(), vec![3, 5]);
        assert_eq!(*removed.borrow(), vec![2, 1, 4, 6, 8]);
    }

    #[test]
    fn test_set_equal_item_still_resets() {
        let list = ObservableVec::from_vec(vec![1, 2, 3]);
        let log = record(&list);

        assert_eq!(list.set(1, 2).unwrap(), 2);
        list.sort_by(|a, b| a.cmp(b)).unwrap();

        assert_eq!(log.borrow().len(), 2);
        assert!(log.borrow().iter().all(|e| e.action() == CollectionChangedAction::Reset));
    }

    #[test]
    #[should_panic]
    fn test_sort_comparator_reading_list_panics() {
        let list = Rc::new(ObservableVec::from_vec(vec![3, 1, 2]));
        let inner = list.clone();
        let _ = list.sort_by(move |a, b| {
            let _ = inner.len();
            a.cmp(b)
        });
    }

    #[test]
    fn test_replace_all_with_nothing() {
        let list = ObservableVec::from_vec(vec![1, 2]);
        let log = record(&list);

        list.replace_all(Vec::new()).unwrap();
        list.replace_all(Vec::new()).unwrap();

        let actions: Vec<_> = log.borrow().iter().map(|e| e.action()).collect();
        assert_eq!(actions, vec![CollectionChangedAction::Clear]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_replace_all_on_empty_list_with_nothing_is_silent() {
        let list = ObservableVec::<u8>::new();
        let log = record(&list);
        let lens = Rc::new(Cell::new(0));
        let l = lens.clone();
        let _p = list.property_changed().subscribe(move |_| l.set(l.get() + 1));

        list.replace_all(Vec::new()).unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(lens.get(), 0);
    }
}
