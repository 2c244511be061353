//! Type-level observable property registration
//!
//! Each observable type declares its properties once, before the first
//! instance exists. A declaration is a `(type, name, default)` triple stored in
//! a process-wide registry keyed by [`TypeId`]. Registration hands back a typed
//! [`Property<O, V>`] key, which is the only way to read or write the property
//! on an [`ObservableObject<O>`](crate::ObservableObject).
//!
//! Constructing the first instance of a type seals it: later registrations on
//! that type fail with [`RegistrationError::Sealed`].
//!
//! ```rust
//! use tessel_core::{register_property, ObservableObject};
//!
//! struct Counter;
//!
//! let count = register_property::<Counter, i32>("count", 0).unwrap();
//! let counter = ObservableObject::<Counter>::new();
//! assert_eq!(counter.get(&count), 0);
//! ```

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::RegistrationError;

/// Global type registry
static REGISTRY: OnceLock<RwLock<PropertyRegistry>> = OnceLock::new();

/// Values that can be stored in an observable property.
///
/// Change detection uses `PartialEq`. Defaults live in the process-wide
/// registry, so values must be `Send + Sync`.
pub trait PropertyValue: Any + Clone + PartialEq + Send + Sync {}

impl<T> PropertyValue for T where T: Any + Clone + PartialEq + Send + Sync {}

/// Name of an observable property, used as the `property_changed` payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyName(&'static str);

impl PropertyName {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl PartialEq<str> for PropertyName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PropertyName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Metadata for one registered property, shared by all instances of its type
pub struct PropertyDescriptor {
    name: PropertyName,
    owner_name: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    default: Arc<dyn Any + Send + Sync>,
}

impl PropertyDescriptor {
    pub fn name(&self) -> PropertyName {
        self.name
    }

    pub fn owner_name(&self) -> &'static str {
        self.owner_name
    }

    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    /// The registered default, if `V` is the property's value type
    pub fn default_value<V: PropertyValue>(&self) -> Option<V> {
        self.default.downcast_ref::<V>().cloned()
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("owner", &self.owner_name)
            .field("value_type", &self.value_type_name)
            .finish()
    }
}

/// Typed key for a property of type `V` declared on owner type `O`.
///
/// Obtained from [`register_property`]; cheap to clone.
pub struct Property<O, V> {
    descriptor: Arc<PropertyDescriptor>,
    default: Arc<V>,
    _owner: PhantomData<fn() -> O>,
}

impl<O, V> Property<O, V> {
    pub fn name(&self) -> PropertyName {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &PropertyDescriptor {
        &self.descriptor
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }
}

impl<O, V> Clone for Property<O, V> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            default: Arc::clone(&self.default),
            _owner: PhantomData,
        }
    }
}

impl<O, V> fmt::Debug for Property<O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.descriptor.name).finish()
    }
}

/// Properties declared on one type
#[derive(Default)]
struct TypeProperties {
    properties: Vec<Arc<PropertyDescriptor>>,
    by_name: FxHashMap<&'static str, usize>,
    sealed: bool,
}

/// Registry of observable properties for every type
#[derive(Default)]
struct PropertyRegistry {
    types: FxHashMap<TypeId, TypeProperties>,
}

fn registry() -> &'static RwLock<PropertyRegistry> {
    REGISTRY.get_or_init(|| RwLock::new(PropertyRegistry::default()))
}

// The registry holds no invariants a panicking writer could break halfway,
// so a poisoned lock is recovered rather than propagated.
fn read_registry() -> RwLockReadGuard<'static, PropertyRegistry> {
    registry()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_registry() -> RwLockWriteGuard<'static, PropertyRegistry> {
    registry()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Declare an observable property `name` on type `O` with a default value.
///
/// # Errors
///
/// - [`RegistrationError::Duplicate`] if `name` is already declared on `O`;
///   the first declaration is left untouched.
/// - [`RegistrationError::Sealed`] if an instance of `O` has already been
///   constructed.
pub fn register_property<O: 'static, V: PropertyValue>(
    name: &'static str,
    default: V,
) -> Result<Property<O, V>, RegistrationError> {
    let owner_name = type_name::<O>();
    let mut registry = write_registry();
    let entry = registry.types.entry(TypeId::of::<O>()).or_default();

    if entry.by_name.contains_key(name) {
        return Err(RegistrationError::Duplicate {
            type_name: owner_name,
            name,
        });
    }
    if entry.sealed {
        return Err(RegistrationError::Sealed {
            type_name: owner_name,
            name,
        });
    }

    let default = Arc::new(default);
    let descriptor = Arc::new(PropertyDescriptor {
        name: PropertyName(name),
        owner_name,
        value_type: TypeId::of::<V>(),
        value_type_name: type_name::<V>(),
        default: Arc::clone(&default) as Arc<dyn Any + Send + Sync>,
    });
    entry.by_name.insert(name, entry.properties.len());
    entry.properties.push(Arc::clone(&descriptor));

    debug!(
        owner = owner_name,
        property = name,
        value_type = type_name::<V>(),
        "registered observable property"
    );

    Ok(Property {
        descriptor,
        default,
        _owner: PhantomData,
    })
}

/// All properties declared on `O`, in registration order
pub fn registered_properties<O: 'static>() -> Vec<Arc<PropertyDescriptor>> {
    read_registry()
        .types
        .get(&TypeId::of::<O>())
        .map(|props| props.properties.clone())
        .unwrap_or_default()
}

/// Look up a single declared property by name
pub fn find_property<O: 'static>(name: &str) -> Option<Arc<PropertyDescriptor>> {
    let registry = read_registry();
    let props = registry.types.get(&TypeId::of::<O>())?;
    props
        .by_name
        .get(name)
        .map(|idx| Arc::clone(&props.properties[*idx]))
}

/// Whether an instance of `O` has been constructed
pub fn is_sealed<O: 'static>() -> bool {
    read_registry()
        .types
        .get(&TypeId::of::<O>())
        .is_some_and(|props| props.sealed)
}

/// Close `O` to further registration. Called when the first instance is built.
pub(crate) fn seal<O: 'static>() {
    if is_sealed::<O>() {
        return;
    }
    let mut registry = write_registry();
    let entry = registry.types.entry(TypeId::of::<O>()).or_default();
    if !entry.sealed {
        entry.sealed = true;
        debug!(
            owner = type_name::<O>(),
            properties = entry.properties.len(),
            "sealed observable type"
        );
    }
}

/// One-time property setup for a type.
///
/// Holds the result of the first setup call; every later call returns the
/// same property set without registering again.
///
/// ```rust
/// use tessel_core::{register_property, Property, PropertySetup, RegistrationError};
///
/// struct Slider;
///
/// struct SliderProperties {
///     value: Property<Slider, f64>,
/// }
///
/// static PROPERTIES: PropertySetup<SliderProperties> = PropertySetup::new();
///
/// fn properties() -> Result<&'static SliderProperties, RegistrationError> {
///     PROPERTIES.get_or_register(|| {
///         Ok(SliderProperties {
///             value: register_property::<Slider, _>("value", 0.0)?,
///         })
///     })
/// }
///
/// let first = properties().unwrap() as *const _;
/// let second = properties().unwrap() as *const _;
/// assert_eq!(first, second);
/// ```
pub struct PropertySetup<P> {
    cell: OnceLock<Result<P, RegistrationError>>,
}

impl<P> PropertySetup<P> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Run `setup` on the first call and cache its outcome.
    ///
    /// A failed setup is cached too; it is reported on every call.
    pub fn get_or_register<F>(&self, setup: F) -> Result<&P, RegistrationError>
    where
        F: FnOnce() -> Result<P, RegistrationError>,
    {
        self.cell.get_or_init(setup).as_ref().map_err(Clone::clone)
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<P> Default for PropertySetup<P> {
    fn default() -> Self {
        Self::new()
    }
}
