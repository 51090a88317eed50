use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub String);

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file picked in an upload control. Only the selection is tracked, never the bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub size_bytes: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    File(FileHandle),
}

impl FieldValue {
    pub fn is_present_text(&self) -> bool {
        matches!(self, Self::Text(text) if !text.trim().is_empty())
    }

    pub fn is_selected_file(&self) -> bool {
        matches!(self, Self::File(handle) if !handle.name.trim().is_empty())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<FileHandle> for FieldValue {
    fn from(value: FileHandle) -> Self {
        Self::File(value)
    }
}

/// Value of a branch flag: a toggle or one choice out of a small enum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BranchValue {
    Bool(bool),
    Choice(String),
}

impl From<bool> for BranchValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for BranchValue {
    fn from(value: &str) -> Self {
        Self::Choice(value.to_owned())
    }
}

impl fmt::Display for BranchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Choice(value) => f.write_str(value),
        }
    }
}

/// State of one open wizard.
///
/// `fields` and `branch_flags` accumulate for the whole life of the session; moving between
/// steps never clears them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WizardSession {
    pub wizard: String,
    pub current_step: StepId,
    pub fields: BTreeMap<String, FieldValue>,
    pub branch_flags: BTreeMap<String, BranchValue>,
}

impl WizardSession {
    pub fn new(wizard: impl Into<String>, first_step: StepId) -> Self {
        Self {
            wizard: wizard.into(),
            current_step: first_step,
            fields: BTreeMap::new(),
            branch_flags: BTreeMap::new(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn flag(&self, key: &str) -> Option<&BranchValue> {
        self.branch_flags.get(key)
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Raw flag write. `StepNavigator::set_branch_flag` also refuses values that skip `current_step`.
    pub fn set_branch_flag(&mut self, key: impl Into<String>, value: impl Into<BranchValue>) {
        self.branch_flags.insert(key.into(), value.into());
    }

    pub fn clear_field(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }
}
