//! Zone Model

use serde::{Deserialize, Serialize};

/// Zone entity (区域：大厅、露台、包厢等)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(rename = "sedeId")]
    pub site_id: String,
}
