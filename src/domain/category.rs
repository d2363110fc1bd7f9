use serde::{Deserialize, Serialize};

use super::record::Mode;

/// Entry of the user-maintained category list offered when recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mode: Mode,
}

impl CategoryEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, mode: Mode) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode,
        }
    }

    /// Categories seeded when no list has been stored yet.
    pub fn defaults() -> Vec<CategoryEntry> {
        vec![
            Self::new("exp_conv", "convenience store", Mode::Expense),
            Self::new("exp_super", "supermarket", Mode::Expense),
            Self::new("exp_cafe", "cafe", Mode::Expense),
            Self::new("inc_salary", "salary", Mode::Income),
            Self::new("inc_parttime", "part-time job", Mode::Income),
            Self::new("inc_other", "other income", Mode::Income),
        ]
    }

    pub fn matches_name(&self, mode: Mode, name: &str) -> bool {
        self.mode == mode && self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
