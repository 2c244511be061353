//! Button model
//!
//! The Button provides:
//! - An observable label and enabled flag
//! - A `clicked` event that fires only while enabled

use tessel_core::{
    register_property, DispatchError, EventSource, Observable, ObservableObject, Property, PropertySetup,
    RegistrationError,
};
use tracing::debug;

/// Observable properties declared on [`Button`]
pub struct ButtonProperties {
    pub label: Property<Button, String>,
    pub enabled: Property<Button, bool>,
}

static PROPERTIES: PropertySetup<ButtonProperties> = PropertySetup::new();

/// Register the button properties (once) and return them
pub fn properties() -> Result<&'static ButtonProperties, RegistrationError> {
    PROPERTIES.get_or_register(|| {
        Ok(ButtonProperties {
            label: register_property::<Button, _>("label", String::new())?,
            enabled: register_property::<Button, _>("enabled", true)?,
        })
    })
}

/// Button configuration
#[derive(Clone, Debug, Default)]
pub struct ButtonConfig {
    /// Button label text
    pub label: String,
    /// Whether the button is disabled
    pub disabled: bool,
}

impl ButtonConfig {
    /// Create a new button config with a label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set whether the button is disabled
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Button widget model
pub struct Button {
    base: ObservableObject<Button>,
    props: &'static ButtonProperties,
    clicked: EventSource<()>,
}

impl Button {
    /// Create a new button
    pub fn new(label: impl Into<String>) -> Result<Self, RegistrationError> {
        Self::with_config(ButtonConfig::new(label))
    }

    /// Create a button with custom config
    pub fn with_config(config: ButtonConfig) -> Result<Self, RegistrationError> {
        let props = properties()?;
        let button = Self {
            base: ObservableObject::new(),
            props,
            clicked: EventSource::with_label("button.clicked"),
        };

        // Nobody is subscribed yet, so these writes cannot fail.
        button.base.set(&props.label, config.label).ok();
        button.base.set(&props.enabled, !config.disabled).ok();
        Ok(button)
    }

    pub fn label(&self) -> String {
        self.base.get(&self.props.label)
    }

    pub fn set_label(&self, label: impl Into<String>) -> Result<bool, DispatchError> {
        self.base.set(&self.props.label, label.into())
    }

    pub fn is_enabled(&self) -> bool {
        self.base.get(&self.props.enabled)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<bool, DispatchError> {
        self.base.set(&self.props.enabled, enabled)
    }

    /// Fired on each click while the button is enabled
    pub fn clicked(&self) -> &EventSource<()> {
        &self.clicked
    }

    /// Click the button. Returns whether the click was delivered.
    pub fn click(&self) -> Result<bool, DispatchError> {
        if !self.is_enabled() {
            debug!(label = %self.label(), "click ignored on disabled button");
            return Ok(false);
        }
        self.clicked.invoke(&())?;
        Ok(true)
    }
}

impl Observable for Button {
    fn observable(&self) -> &ObservableObject<Self> {
        &self.base
    }
}
