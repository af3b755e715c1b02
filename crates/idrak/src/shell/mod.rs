//! View-State Shell
//!
//! `ShellState` holds everything a dashboard tab shows; `ShellCommand`s mutate
//! it and `ShellSnapshot::capture` resolves what the client should render.

mod breadcrumbs;
mod command;
mod render;
mod state;

pub use breadcrumbs::*;
pub use command::*;
pub use render::*;
pub use state::*;

use idrak_types::{EmergencyMode, MainSection};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;

/// Layout flags around the main content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Chrome {
    pub sidebar: bool,
    pub view_toggle: bool,
    pub emergency_header: bool,
    pub breadcrumbs: bool,
    pub emergency_bar: bool,
    pub rtl: bool,
}

impl Chrome {
    pub fn of(state: &ShellState) -> Self {
        let mode = state.emergency_mode();
        let on_dashboard = state.section() == MainSection::Dashboard;
        Self {
            sidebar: mode == EmergencyMode::Off,
            view_toggle: on_dashboard && !mode.is_active(),
            emergency_header: on_dashboard && mode.is_active(),
            breadcrumbs: on_dashboard && !mode.is_active(),
            emergency_bar: mode.is_active() && state.simulation().is_some(),
            rtl: state.language().is_rtl(),
        }
    }
}

/// Everything a client needs to render one frame
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ShellSnapshot {
    pub state: ShellState,
    pub view: ViewDescriptor,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub chrome: Chrome,
}

impl ShellSnapshot {
    pub fn capture(state: &ShellState, catalog: &Catalog) -> Self {
        let chrome = Chrome::of(state);
        Self {
            state: state.clone(),
            view: resolve(state, catalog),
            breadcrumbs: if chrome.breadcrumbs {
                breadcrumbs(state, catalog)
            } else {
                Vec::new()
            },
            chrome,
        }
    }
}
