//! Tessel Widget Models
//!
//! Control models built on `tessel_core`. Each control keeps its state in
//! observable properties so views can bind to it:
//!
//! - [`Button`]: label, enabled flag and a `clicked` event
//! - [`Panel`]: collapsible titled container
//! - [`Menu`] / [`MenuItem`]: command, checkbox and text entry items
//!
//! These are models only; drawing and input routing live elsewhere.

pub mod button;
pub mod menu;
pub mod panel;

pub use button::{Button, ButtonConfig, ButtonProperties};
pub use menu::{Menu, MenuItem, MenuItemKind, MenuItemProperties, MenuProperties};
pub use panel::{Panel, PanelProperties};
