//! egui drawing of controls and view models. Widgets never touch the
//! dashboard directly; they push [`ControlEvent`](crate::selection::ControlEvent)s
//! that the app applies after the frame is laid out.

pub mod panels;
pub mod plot;
pub mod table;
