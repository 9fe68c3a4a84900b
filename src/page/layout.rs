use serde::{Deserialize, Serialize};

use crate::models::Crn;

/// Where the registration page keeps the controls the poll cycle touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageLayout {
    pub url: String,
    pub term_select_id: String,
    pub campus_select_id: String,
    pub campus_value: String,
    pub crn_input_id: String,
    pub search_button_id: String,
    /// Status elements are `<prefix><crn>`, with text `current/capacity`.
    pub status_id_prefix: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            url: "https://banner.university.edu/StudentRegistrationSsb/ssb/classSearch/classSearch"
                .into(),
            term_select_id: "txt_term".into(),
            campus_select_id: "txt_campus".into(),
            campus_value: "MAIN".into(),
            crn_input_id: "txt_keywordlike".into(),
            search_button_id: "search-go".into(),
            status_id_prefix: "status-".into(),
        }
    }
}

impl PageLayout {
    pub fn status_id(&self, crn: &Crn) -> String {
        format!("{}{}", self.status_id_prefix, crn)
    }
}
