//! Dashboard breadcrumb trail

use idrak_types::ViewLevel;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ShellState;
use crate::catalog::Catalog;

/// One step of the trail
///
/// `label` is set for entity crumbs (floor and room names, incident and
/// sensor ids); generic crumbs are labelled by the client from `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Breadcrumb {
    pub level: ViewLevel,
    pub label: Option<String>,
    pub clickable: bool,
    pub active: bool,
}

impl Breadcrumb {
    fn new(level: ViewLevel, label: Option<String>, clickable: bool) -> Self {
        Self {
            level,
            label,
            clickable,
            active: false,
        }
    }
}

/// Build the trail for the dashboard navigation bar
pub fn breadcrumbs(state: &ShellState, catalog: &Catalog) -> Vec<Breadcrumb> {
    let view = state.view();
    let selection = state.selection();
    let mut crumbs = Vec::new();

    let root = if state.emergency_mode().is_active() {
        ViewLevel::Emergency
    } else {
        ViewLevel::Summary
    };
    crumbs.push(Breadcrumb::new(root, None, view != root));

    if matches!(
        view,
        ViewLevel::Floors | ViewLevel::Incidents | ViewLevel::Sensors | ViewLevel::Map
    ) {
        crumbs.push(Breadcrumb::new(view, None, false));
    }

    if selection.floor.is_some() || view == ViewLevel::Floor {
        if !crumbs.iter().any(|c| c.level == ViewLevel::Floors) {
            crumbs.push(Breadcrumb::new(ViewLevel::Floors, None, true));
        }
        let name = selection
            .floor
            .as_deref()
            .and_then(|id| catalog.get_floor(id))
            .map(|f| f.name.clone());
        crumbs.push(Breadcrumb::new(ViewLevel::Floor, name, view != ViewLevel::Floor));
    }

    if selection.room.is_some() || view == ViewLevel::Room {
        let name = selection
            .room
            .as_deref()
            .and_then(|id| catalog.find_room(id))
            .map(|r| r.name.clone());
        crumbs.push(Breadcrumb::new(ViewLevel::Room, name, view != ViewLevel::Room));
    }

    if selection.incident.is_some() || view == ViewLevel::Incident {
        crumbs.push(Breadcrumb::new(
            ViewLevel::Incident,
            selection.incident.clone(),
            false,
        ));
    }

    if selection.sensor.is_some() || view == ViewLevel::Sensor {
        crumbs.push(Breadcrumb::new(
            ViewLevel::Sensor,
            selection.sensor.clone(),
            false,
        ));
    }

    if let Some(last) = crumbs.last_mut() {
        last.active = true;
    }
    crumbs
}
