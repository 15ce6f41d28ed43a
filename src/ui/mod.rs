//! UI Module - egui integration and ShellController
//!
//! Handles the interface between the shell's control logic and the egui frontend.
//! Everything stateful lives in `controller`; `app` only draws it.

pub mod app;
pub mod controller;
pub mod dialog;
pub mod markup;
pub mod pages;
pub mod registry;
pub mod router;
pub mod widgets;

pub use app::AppUI;
pub use controller::{ShellController, ShellEvent, ShellSender};
pub use dialog::{DialogAction, DialogHost, DialogKind, DialogOptions, DialogReply};
pub use registry::{PageContainer, PageContext, PageRegistry, PageView, Teardown};
pub use router::{NavigationState, Router};
