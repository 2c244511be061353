//! Menu and menu item models
//!
//! Menu items are one type tagged by [`MenuItemKind`]. Each kind reacts to
//! activation differently:
//! - `Command` fires its `activated` event and closes the owning menu
//! - `Checkbox` toggles its `checked` property
//! - `TextBox` edits `text` directly and ignores activation

use std::rc::Rc;

use tessel_core::{
    register_property, DispatchError, EventSource, Observable, ObservableError, ObservableObject,
    ObservableVec, Property, PropertySetup, RegistrationError,
};
use tracing::debug;

/// Menu item variants
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItemKind {
    Command,
    Checkbox,
    TextBox,
}

/// Observable properties declared on [`MenuItem`]
pub struct MenuItemProperties {
    pub label: Property<MenuItem, String>,
    pub enabled: Property<MenuItem, bool>,
    pub checked: Property<MenuItem, bool>,
    pub text: Property<MenuItem, String>,
    pub placeholder: Property<MenuItem, String>,
}

static ITEM_PROPERTIES: PropertySetup<MenuItemProperties> = PropertySetup::new();

/// Register the menu item properties (once) and return them
pub fn item_properties() -> Result<&'static MenuItemProperties, RegistrationError> {
    ITEM_PROPERTIES.get_or_register(|| {
        Ok(MenuItemProperties {
            label: register_property::<MenuItem, _>("label", String::new())?,
            enabled: register_property::<MenuItem, _>("enabled", true)?,
            checked: register_property::<MenuItem, _>("checked", false)?,
            text: register_property::<MenuItem, _>("text", String::new())?,
            placeholder: register_property::<MenuItem, _>("placeholder", String::new())?,
        })
    })
}

/// A single entry in a [`Menu`]
///
/// All item kinds share one property set; properties a kind does not use
/// (such as `text` on a command) keep their defaults.
pub struct MenuItem {
    kind: MenuItemKind,
    base: ObservableObject<MenuItem>,
    props: &'static MenuItemProperties,
    activated: EventSource<()>,
}

impl MenuItem {
    /// A plain command item
    pub fn command(label: impl Into<String>) -> Result<Self, RegistrationError> {
        Self::with_kind(MenuItemKind::Command, label.into())
    }

    /// A checkable item
    pub fn checkbox(label: impl Into<String>, checked: bool) -> Result<Self, RegistrationError> {
        let item = Self::with_kind(MenuItemKind::Checkbox, label.into())?;
        item.base.set(&item.props.checked, checked).ok();
        Ok(item)
    }

    /// An inline text entry with placeholder text
    pub fn text_box(placeholder: impl Into<String>) -> Result<Self, RegistrationError> {
        let item = Self::with_kind(MenuItemKind::TextBox, String::new())?;
        item.base.set(&item.props.placeholder, placeholder.into()).ok();
        Ok(item)
    }

    fn with_kind(kind: MenuItemKind, label: String) -> Result<Self, RegistrationError> {
        let props = item_properties()?;
        let item = Self {
            kind,
            base: ObservableObject::new(),
            props,
            activated: EventSource::with_label("menu_item.activated"),
        };
        // Fresh instance with no subscribers; the write cannot fail.
        item.base.set(&props.label, label).ok();
        Ok(item)
    }

    /// Which variant this item is
    pub fn kind(&self) -> MenuItemKind {
        self.kind
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

    pub fn is_checked(&self) -> bool {
        self.base.get(&self.props.checked)
    }

    pub fn set_checked(&self, checked: bool) -> Result<bool, DispatchError> {
        self.base.set(&self.props.checked, checked)
    }

    pub fn text(&self) -> String {
        self.base.get(&self.props.text)
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<bool, DispatchError> {
        self.base.set(&self.props.text, text.into())
    }

    pub fn placeholder(&self) -> String {
        self.base.get(&self.props.placeholder)
    }

    pub fn set_placeholder(&self, placeholder: impl Into<String>) -> Result<bool, DispatchError> {
        self.base.set(&self.props.placeholder, placeholder.into())
    }

    /// Fired when a command item is activated
    pub fn activated(&self) -> &EventSource<()> {
        &self.activated
    }

    /// Activate the item. Returns whether the activation was handled.
    pub fn activate(&self) -> Result<bool, DispatchError> {
        if !self.is_enabled() {
            return Ok(false);
        }
        debug!(kind = ?self.kind, label = %self.label(), "menu item activated");
        match self.kind {
            MenuItemKind::Command => {
                self.activated.invoke(&())?;
                Ok(true)
            }
            MenuItemKind::Checkbox => {
                self.base
                    .update(&self.props.checked, |checked| *checked = !*checked)?;
                Ok(true)
            }
            MenuItemKind::TextBox => Ok(false),
        }
    }
}

impl Observable for MenuItem {
    fn observable(&self) -> &ObservableObject<Self> {
        &self.base
    }
}

/// Observable properties declared on [`Menu`]
pub struct MenuProperties {
    pub is_open: Property<Menu, bool>,
}

static MENU_PROPERTIES: PropertySetup<MenuProperties> = PropertySetup::new();

/// Register the menu properties (once) and return them
pub fn menu_properties() -> Result<&'static MenuProperties, RegistrationError> {
    MENU_PROPERTIES.get_or_register(|| {
        Ok(MenuProperties {
            is_open: register_property::<Menu, _>("is_open", false)?,
        })
    })
}

/// A list of menu items with an open/closed state
pub struct Menu {
    base: ObservableObject<Menu>,
    props: &'static MenuProperties,
    items: ObservableVec<Rc<MenuItem>>,
}

impl Menu {
    /// Create an empty, closed menu
    pub fn new() -> Result<Self, RegistrationError> {
        let props = menu_properties()?;
        Ok(Self {
            base: ObservableObject::new(),
            props,
            items: ObservableVec::new(),
        })
    }

    /// Items, observable through `collection_changed`
    pub fn items(&self) -> &ObservableVec<Rc<MenuItem>> {
        &self.items
    }

    /// Append an item and return a shared handle to it
    pub fn add_item(&self, item: MenuItem) -> Result<Rc<MenuItem>, ObservableError> {
        let item = Rc::new(item);
        self.items.push(Rc::clone(&item))?;
        Ok(item)
    }

    /// Remove an item by identity. Returns whether it was in the menu.
    pub fn remove_item(&self, item: &Rc<MenuItem>) -> Result<bool, ObservableError> {
        let position = self
            .items
            .with(|items| items.iter().position(|other| Rc::ptr_eq(other, item)));
        match position {
            Some(index) => self.items.remove(index).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn is_open(&self) -> bool {
        self.base.get(&self.props.is_open)
    }

    /// Open the menu. Returns whether it was closed before.
    pub fn open(&self) -> Result<bool, DispatchError> {
        self.base.set(&self.props.is_open, true)
    }

    pub fn close(&self) -> Result<bool, DispatchError> {
        self.base.set(&self.props.is_open, false)
    }

    /// Activate the item at `index`. A handled command closes the menu.
    pub fn activate_item(&self, index: usize) -> Result<bool, ObservableError> {
        let item = self.items.get(index).ok_or(ObservableError::IndexOutOfBounds {
            index,
            len: self.items.len(),
        })?;

        // Handlers may disable the item; whether it closes the menu is decided up front.
        let closes_menu = item.kind() == MenuItemKind::Command && item.is_enabled();
        let handled = item.activate();
        // Close even if a command handler failed; the activation happened.
        let closed = if closes_menu {
            self.close().map(|_| ())
        } else {
            Ok(())
        };

        let handled = match (handled, closed) {
            (Ok(handled), Ok(())) => handled,
            (Err(mut err), Err(close_err)) => {
                err.merge(close_err);
                return Err(err.into());
            }
            (Err(err), _) | (_, Err(err)) => return Err(err.into()),
        };
        Ok(handled)
    }
}

impl Observable for Menu {
    fn observable(&self) -> &ObservableObject<Self> {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_checkbox_toggles_on_activate() {
        let item = MenuItem::checkbox("Word wrap", false).unwrap();
        let changes = Rc::new(Cell::new(0));
        let c = changes.clone();
        let _reg = item.property_changed().subscribe(move |name| {
            if *name == "checked" {
                c.set(c.get() + 1);
            }
        });

        assert!(item.activate().unwrap());
        assert!(item.is_checked());
        assert!(item.activate().unwrap());
        assert!(!item.is_checked());
        assert_eq!(changes.get(), 2);
    }

    #[test]
    fn test_disabled_item_ignores_activation() {
        let item = MenuItem::command("Delete").unwrap();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let _reg = item.activated().subscribe(move |_| f.set(true));

        item.set_enabled(false).unwrap();
        assert!(!item.activate().unwrap());
        assert!(!fired.get());
    }

    #[test]
    fn test_text_box_placeholder() {
        let item = MenuItem::text_box("Filter...").unwrap();
        assert_eq!(item.kind(), MenuItemKind::TextBox);
        assert_eq!(item.placeholder(), "Filter...");
        assert_eq!(item.text(), "");
        assert!(!item.activate().unwrap());

        assert!(item.set_text("abc").unwrap());
        assert_eq!(item.text(), "abc");
    }

    #[test]
    fn test_command_closes_menu() {
        let menu = Menu::new().unwrap();
        let open = menu.add_item(MenuItem::command("Open").unwrap()).unwrap();
        menu.add_item(MenuItem::checkbox("Autosave", true).unwrap()).unwrap();

        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        let _reg = open.activated().subscribe(move |_| f.set(f.get() + 1));

        menu.open().unwrap();
        assert!(menu.activate_item(1).unwrap());
        assert!(menu.is_open());

        assert!(menu.activate_item(0).unwrap());
        assert_eq!(fired.get(), 1);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_command_disabled_by_its_handler_still_closes_menu() {
        let menu = Menu::new().unwrap();
        let once = menu.add_item(MenuItem::command("Run once").unwrap()).unwrap();

        let weak = Rc::downgrade(&once);
        let _reg = once.activated().subscribe_fallible(move |_| {
            if let Some(item) = weak.upgrade() {
                item.set_enabled(false)?;
            }
            Ok(())
        });

        menu.open().unwrap();
        assert!(menu.activate_item(0).unwrap());
        assert!(!once.is_enabled());
        assert!(!menu.is_open());
    }

    #[test]
    fn test_activate_out_of_range() {
        let menu = Menu::new().unwrap();
        assert!(matches!(
            menu.activate_item(0),
            Err(ObservableError::IndexOutOfBounds { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_remove_item_by_identity() {
        let menu = Menu::new().unwrap();
        let a = menu.add_item(MenuItem::command("Cut").unwrap()).unwrap();
        let b = menu.add_item(MenuItem::command("Cut").unwrap()).unwrap();

        assert!(menu.remove_item(&a).unwrap());
        assert!(!menu.remove_item(&a).unwrap());
        assert_eq!(menu.items().len(), 1);
        assert!(Rc::ptr_eq(&menu.items().get(0).unwrap(), &b));
    }
}
