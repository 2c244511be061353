//! Observable base object
//!
//! [`ObservableObject<O>`] is the per-instance half of the property system:
//! private value slots for the properties registered on `O`, and the
//! instance's `property_changed` event source.
//!
//! Models embed one and implement [`Observable`] to expose it:
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tessel_core::{register_property, Observable, ObservableObject};
//!
//! struct Counter {
//!     base: ObservableObject<Counter>,
//! }
//!
//! impl Observable for Counter {
//!     fn observable(&self) -> &ObservableObject<Self> {
//!         &self.base
//!     }
//! }
//!
//! let count = register_property::<Counter, i32>("count", 0).unwrap();
//! let counter = Counter { base: ObservableObject::new() };
//!
//! let fired = Rc::new(Cell::new(0));
//! let f = fired.clone();
//! let _reg = counter.property_changed().subscribe(move |_| f.set(f.get() + 1));
//!
//! counter.set_property(&count, 5).unwrap();
//! counter.set_property(&count, 5).unwrap();
//! assert_eq!(counter.get_property(&count), 5);
//! assert_eq!(fired.get(), 1);
//! ```

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::DispatchError;
use crate::events::EventSource;
use crate::property::{self, Property, PropertyName, PropertyValue};

/// Per-instance observable state for owner type `O`.
pub struct ObservableObject<O: 'static> {
    /// Written values only; unwritten properties read their registered default.
    slots: RefCell<FxHashMap<&'static str, Box<dyn Any>>>,
    property_changed: EventSource<PropertyName>,
    _owner: PhantomData<fn() -> O>,
}

impl<O: 'static> ObservableObject<O> {
    /// Create the observable state for a new instance.
    ///
    /// This seals `O`: no further properties can be registered on it.
    pub fn new() -> Self {
        property::seal::<O>();
        Self {
            slots: RefCell::new(FxHashMap::default()),
            property_changed: EventSource::with_label(type_name::<O>()),
            _owner: PhantomData,
        }
    }

    /// Event source notified with the property name after each change
    pub fn property_changed(&self) -> &EventSource<PropertyName> {
        &self.property_changed
    }

    /// Read a property, falling back to its registered default
    pub fn get<V: PropertyValue>(&self, property: &Property<O, V>) -> V {
        self.slots
            .borrow()
            .get(property.name().as_str())
            .and_then(|value| value.downcast_ref::<V>())
            .cloned()
            .unwrap_or_else(|| property.default_value().clone())
    }

    /// Access a property by reference without cloning.
    ///
    /// The slots stay borrowed while `f` runs; writing any property of this
    /// instance from inside `f` panics.
    pub fn with<V: PropertyValue, R>(&self, property: &Property<O, V>, f: impl FnOnce(&V) -> R) -> R {
        let slots = self.slots.borrow();
        match slots
            .get(property.name().as_str())
            .and_then(|value| value.downcast_ref::<V>())
        {
            Some(value) => f(value),
            None => f(property.default_value()),
        }
    }

    /// Write a property.
    ///
    /// If `value` differs from the current value it is stored and
    /// `property_changed` is dispatched with the property name. Returns whether
    /// the value changed. Handler failures are returned after the value has
    /// been stored and every handler has run.
    pub fn set<V: PropertyValue>(&self, property: &Property<O, V>, value: V) -> Result<bool, DispatchError> {
        let name = property.name();
        let previous = {
            let mut slots = self.slots.borrow_mut();
            let unchanged = match slots
                .get(name.as_str())
                .and_then(|current| current.downcast_ref::<V>())
            {
                Some(current) => *current == value,
                None => *property.default_value() == value,
            };
            if unchanged {
                return Ok(false);
            }
            slots.insert(name.as_str(), Box::new(value))
        };
        // Old value is dropped outside the borrow.
        drop(previous);

        trace!(owner = type_name::<O>(), property = %name, "property changed");
        self.property_changed.invoke(&name)?;
        Ok(true)
    }

    /// Modify a property through a closure, notifying if the result differs
    pub fn update<V: PropertyValue>(
        &self,
        property: &Property<O, V>,
        f: impl FnOnce(&mut V),
    ) -> Result<bool, DispatchError> {
        let mut value = self.get(property);
        f(&mut value);
        self.set(property, value)
    }

    /// Restore a property to its registered default
    pub fn reset<V: PropertyValue>(&self, property: &Property<O, V>) -> Result<bool, DispatchError> {
        self.set(property, property.default_value().clone())
    }

    /// Dispatch `property_changed` for a name without writing a slot.
    ///
    /// Used for derived values that have no slot of their own.
    pub fn notify(&self, name: PropertyName) -> Result<(), DispatchError> {
        self.property_changed.invoke(&name)
    }
}

impl<O: 'static> Default for ObservableObject<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: 'static> fmt::Debug for ObservableObject<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableObject")
            .field("owner", &type_name::<O>())
            .field("written", &self.slots.borrow().len())
            .field("property_changed", &self.property_changed)
            .finish()
    }
}

/// An entity that exposes observable properties.
pub trait Observable: Sized + 'static {
    fn observable(&self) -> &ObservableObject<Self>;

    fn property_changed(&self) -> &EventSource<PropertyName> {
        self.observable().property_changed()
    }

    fn get_property<V: PropertyValue>(&self, property: &Property<Self, V>) -> V {
        self.observable().get(property)
    }

    fn set_property<V: PropertyValue>(
        &self,
        property: &Property<Self, V>,
        value: V,
    ) -> Result<bool, DispatchError> {
        self.observable().set(property, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{is_sealed, register_property};
    use anyhow::anyhow;
    use std::cell::Cell;
    use std::rc::Rc;

    fn names(log: &Rc<RefCell<Vec<PropertyName>>>) -> Vec<&'static str> {
        log.borrow().iter().map(|n| n.as_str()).collect()
    }

    fn record(obj: &ObservableObject<impl Sized + 'static>) -> Rc<RefCell<Vec<PropertyName>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let _ = obj
            .property_changed()
            .subscribe(move |name| l.borrow_mut().push(*name));
        log
    }

    #[test]
    fn test_counter_scenario() {
        struct Counter;

        let count = register_property::<Counter, i32>("count", 0).unwrap();
        let c = ObservableObject::<Counter>::new();
        let log = record(&c);

        assert_eq!(c.get(&count), 0);

        assert!(c.set(&count, 5).unwrap());
        assert_eq!(names(&log), vec!["count"]);
        assert_eq!(c.get(&count), 5);

        assert!(!c.set(&count, 5).unwrap());
        assert_eq!(names(&log), vec!["count"]);
    }

    #[test]
    fn test_writing_default_before_any_write_is_silent() {
        struct Widget;

        let title = register_property::<Widget, String>("title", "untitled".into()).unwrap();
        let w = ObservableObject::<Widget>::new();
        let log = record(&w);

        assert!(!w.set(&title, "untitled".to_string()).unwrap());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_instances_have_independent_slots_and_sources() {
        struct Slot;

        let value = register_property::<Slot, u8>("value", 1).unwrap();
        let a = ObservableObject::<Slot>::new();
        let b = ObservableObject::<Slot>::new();
        let log_a = record(&a);
        let log_b = record(&b);

        a.set(&value, 9).unwrap();
        assert_eq!(a.get(&value), 9);
        assert_eq!(b.get(&value), 1);
        assert_eq!(log_a.borrow().len(), 1);
        assert!(log_b.borrow().is_empty());
    }

    #[test]
    fn test_construction_seals_type() {
        struct Late;

        register_property::<Late, bool>("early", false).unwrap();
        let _obj = ObservableObject::<Late>::new();

        assert!(is_sealed::<Late>());
        assert!(register_property::<Late, bool>("late", false).is_err());
    }

    #[test]
    fn test_handler_sees_new_value_and_may_write_again() {
        struct Mirror;

        let source = register_property::<Mirror, i32>("source", 0).unwrap();
        let copy = register_property::<Mirror, i32>("copy", 0).unwrap();
        let obj = Rc::new(ObservableObject::<Mirror>::new());
        let log = record(&*obj);

        let weak = Rc::downgrade(&obj);
        let (s, c) = (source.clone(), copy.clone());
        let _sync = obj.property_changed().subscribe_fallible(move |name| {
            if *name == "source" {
                if let Some(obj) = weak.upgrade() {
                    obj.set(&c, obj.get(&s) * 10)?;
                }
            }
            Ok(())
        });

        obj.set(&source, 4).unwrap();

        assert_eq!(obj.get(&copy), 40);
        assert_eq!(names(&log), vec!["source", "copy"]);
    }

    #[test]
    fn test_handler_failure_reaches_writer_after_value_is_stored() {
        struct Fragile;

        let level = register_property::<Fragile, u32>("level", 0).unwrap();
        let obj = ObservableObject::<Fragile>::new();
        let ran = Rc::new(Cell::new(false));

        let _bad = obj
            .property_changed()
            .subscribe_fallible(|name| Err(anyhow!("cannot render {name}")));
        let r = ran.clone();
        let _good = obj.property_changed().subscribe(move |_| r.set(true));

        let err = obj.set(&level, 3).unwrap_err();

        assert_eq!(obj.get(&level), 3);
        assert!(ran.get());
        assert_eq!(err.first().error.to_string(), "cannot render level");
    }

    #[test]
    fn test_update_and_reset() {
        struct Bag;

        let items = register_property::<Bag, Vec<u8>>("items", vec![1]).unwrap();
        let bag = ObservableObject::<Bag>::new();
        let log = record(&bag);

        assert!(bag.update(&items, |v| v.push(2)).unwrap());
        assert!(!bag.update(&items, |_| {}).unwrap());
        assert_eq!(bag.with(&items, |v| v.len()), 2);

        assert!(bag.reset(&items).unwrap());
        assert_eq!(bag.get(&items), vec![1]);
        assert_eq!(names(&log), vec!["items", "items"]);
    }

    #[test]
    fn test_notify_without_slot() {
        struct Derived;

        let obj = ObservableObject::<Derived>::new();
        let log = record(&obj);

        obj.notify(PropertyName::new("total")).unwrap();
        assert_eq!(names(&log), vec!["total"]);
    }
}
