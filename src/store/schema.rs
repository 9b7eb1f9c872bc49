use serde::{Deserialize, Serialize};

use crate::engine::navigation::NavigationState;

/// Last screen and table, as written after every navigation change.
/// Both values stay raw strings so a stale or hand-edited file can never
/// fail to load; interpretation happens in `NavigationState::restore`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default)]
    pub last_view: Option<String>,
    #[serde(default)]
    pub last_table: Option<String>,
}

impl SessionData {
    pub fn from_nav(nav: &NavigationState) -> Self {
        Self {
            last_view: Some(nav.view.as_str().to_string()),
            last_table: Some(nav.selected_table.to_string()),
        }
    }
}
