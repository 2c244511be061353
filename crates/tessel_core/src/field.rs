//! Statically declared observable fields
//!
//! [`ObservableField<T>`] is the plain-struct alternative to the property
//! registry: the field carries its own name and value, and notifies on an
//! event source supplied by its owner. Values need not be `Send` or `Sync`.

use std::cell::RefCell;
use std::fmt;

use crate::error::DispatchError;
use crate::events::EventSource;
use crate::property::PropertyName;

pub struct ObservableField<T> {
    name: PropertyName,
    value: RefCell<T>,
}

impl<T: Clone + PartialEq> ObservableField<T> {
    pub fn new(name: &'static str, initial: T) -> Self {
        Self {
            name: PropertyName::new(name),
            value: RefCell::new(initial),
        }
    }

    pub fn name(&self) -> PropertyName {
        self.name
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Access the value by reference. Setting the field inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store `value` and notify `changed` with this field's name, if the
    /// value differs from the current one.
    pub fn set(&self, value: T, changed: &EventSource<PropertyName>) -> Result<bool, DispatchError> {
        let previous = {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return Ok(false);
            }
            std::mem::replace(&mut *current, value)
        };
        drop(previous);

        changed.invoke(&self.name)?;
        Ok(true)
    }

    /// Store `value` without notifying. Returns whether it changed.
    pub fn set_silently(&self, value: T) -> bool {
        let mut current = self.value.borrow_mut();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableField")
            .field("name", &self.name)
            .field("value", &*self.value.borrow())
            .finish()
    }
}
