//! Collapsible panel model

use tessel_core::{
    register_property, DispatchError, Observable, ObservableObject, Property, PropertySetup, RegistrationError,
};

/// Observable properties declared on [`Panel`]
pub struct PanelProperties {
    pub title: Property<Panel, String>,
    pub is_open: Property<Panel, bool>,
    pub collapsible: Property<Panel, bool>,
}

static PROPERTIES: PropertySetup<PanelProperties> = PropertySetup::new();

/// Register the panel properties (once) and return them
pub fn properties() -> Result<&'static PanelProperties, RegistrationError> {
    PROPERTIES.get_or_register(|| {
        Ok(PanelProperties {
            title: register_property::<Panel, _>("title", String::new())?,
            is_open: register_property::<Panel, _>("is_open", false)?,
            collapsible: register_property::<Panel, _>("collapsible", true)?,
        })
    })
}

/// A titled panel that can be expanded and collapsed
pub struct Panel {
    base: ObservableObject<Panel>,
    props: &'static PanelProperties,
}

impl Panel {
    /// Create a closed, collapsible panel with a title
    pub fn new(title: impl Into<String>) -> Result<Self, RegistrationError> {
        let props = properties()?;
        let panel = Self {
            base: ObservableObject::new(),
            props,
        };
        panel.base.set(&props.title, title.into()).ok();
        Ok(panel)
    }

    pub fn title(&self) -> String {
        self.base.get(&self.props.title)
    }

    pub fn set_title(&self, title: impl Into<String>) -> Result<bool, DispatchError> {
        self.base.set(&self.props.title, title.into())
    }

    pub fn is_open(&self) -> bool {
        self.base.get(&self.props.is_open)
    }

    /// Open or close the panel directly, ignoring `collapsible`
    pub fn set_open(&self, open: bool) -> Result<bool, DispatchError> {
        self.base.set(&self.props.is_open, open)
    }

    pub fn is_collapsible(&self) -> bool {
        self.base.get(&self.props.collapsible)
    }

    /// A panel that is not collapsible stays in whatever state it is in
    pub fn set_collapsible(&self, collapsible: bool) -> Result<bool, DispatchError> {
        self.base.set(&self.props.collapsible, collapsible)
    }

    /// Flip between open and closed. Returns whether the state changed.
    pub fn toggle(&self) -> Result<bool, DispatchError> {
        if !self.is_collapsible() {
            return Ok(false);
        }
        self.base.update(&self.props.is_open, |open| *open = !*open)
    }
}

impl Observable for Panel {
    fn observable(&self) -> &ObservableObject<Self> {
        &self.base
    }
}
