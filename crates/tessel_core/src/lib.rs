//! Tessel Core Runtime
//!
//! This crate provides the change-notification primitives every Tessel model
//! and control is built on:
//!
//! - **Event Sources**: Typed multicast channels with explicit registration handles
//! - **Observable Properties**: Per-type property declarations with compare-and-notify writes
//! - **Collection Changes**: Add/Remove/Reset/Clear deltas for incremental list updates
//!
//! Everything here is single-threaded and synchronous: handlers run on the
//! caller's stack, in subscription order, and may re-enter freely.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tessel_core::{register_property, ObservableObject};
//!
//! struct Slider;
//!
//! let value = register_property::<Slider, f32>("value", 0.0).unwrap();
//! let slider = ObservableObject::<Slider>::new();
//!
//! let changes = Rc::new(RefCell::new(Vec::new()));
//! let log = changes.clone();
//! let registration = slider
//!     .property_changed()
//!     .subscribe(move |name| log.borrow_mut().push(name.to_string()));
//!
//! slider.set(&value, 0.5).unwrap();
//! slider.set(&value, 0.5).unwrap();
//! registration.unregister();
//! slider.set(&value, 1.0).unwrap();
//!
//! assert_eq!(*changes.borrow(), vec!["value"]);
//! ```

pub mod collection;
pub mod error;
pub mod events;
pub mod field;
pub mod observable;
pub mod property;

pub use collection::{CollectionChangedAction, CollectionChangedEventArgs, ObservableVec, LEN_PROPERTY};
pub use error::{DispatchError, HandlerFailure, ObservableError, RegistrationError};
pub use events::{EventSource, Registration, SubscriptionGuard, SubscriptionId};
pub use field::ObservableField;
pub use observable::{Observable, ObservableObject};
pub use property::{
    find_property, is_sealed, register_property, registered_properties, Property, PropertyDescriptor,
    PropertyName, PropertySetup, PropertyValue,
};
