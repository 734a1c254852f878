//! Form Schema Models
//!
//! The typed schema of a form document: an ordered sequence of groups, each
//! an ordered sequence of fields. The schema is built once by the parser and
//! never mutated afterwards; responses live separately on the `Document`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor class expected to resolve a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Agent,
    /// Any other named role declared in the document
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
            Role::Other(name) => name,
        }
    }

    /// Wildcard role that disables role filtering
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Role::Other(name) if name == "*")
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => Role::User,
            "agent" => Role::Agent,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> String {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Number,
    TextList,
    SingleChoice,
    MultiChoice,
    CheckboxSet,
    Url,
    UrlList,
    Date,
    Year,
    Table,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::TextList => "text-list",
            FieldKind::SingleChoice => "single-choice",
            FieldKind::MultiChoice => "multi-choice",
            FieldKind::CheckboxSet => "checkbox-set",
            FieldKind::Url => "url",
            FieldKind::UrlList => "url-list",
            FieldKind::Date => "date",
            FieldKind::Year => "year",
            FieldKind::Table => "table",
        }
    }

    /// Parse a kind name as written in a field directive
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(FieldKind::Text),
            "number" => Some(FieldKind::Number),
            "text-list" => Some(FieldKind::TextList),
            "single-choice" => Some(FieldKind::SingleChoice),
            "multi-choice" => Some(FieldKind::MultiChoice),
            "checkbox-set" => Some(FieldKind::CheckboxSet),
            "url" => Some(FieldKind::Url),
            "url-list" => Some(FieldKind::UrlList),
            "date" => Some(FieldKind::Date),
            "year" => Some(FieldKind::Year),
            "table" => Some(FieldKind::Table),
            _ => None,
        }
    }

    /// Kinds that carry an option list
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldKind::SingleChoice | FieldKind::MultiChoice | FieldKind::CheckboxSet
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checkbox response mode: boolean per option, or free status string per option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckboxMode {
    #[default]
    Simple,
    Status,
}

/// One selectable option of a choice or checkbox field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Cell kinds allowed in table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Number,
    Url,
    Date,
    Year,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Url => "url",
            ColumnKind::Date => "date",
            ColumnKind::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ColumnKind::Text),
            "number" => Some(ColumnKind::Number),
            "url" => Some(ColumnKind::Url),
            "date" => Some(ColumnKind::Date),
            "year" => Some(ColumnKind::Year),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed column of a table field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub label: String,
    pub kind: ColumnKind,
    #[serde(default)]
    pub required: bool,
}

/// A single typed question/slot in the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique field identifier
    pub id: String,
    /// Value kind
    pub kind: FieldKind,
    /// Human label
    pub label: String,
    /// Whether an answer is required for the form to complete
    #[serde(default)]
    pub required: bool,
    /// Actor expected to answer
    #[serde(default)]
    pub role: Role,
    /// Prompt text shown to the answering actor
    #[serde(default)]
    pub prompt: String,
    /// Options for choice/checkbox kinds
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    /// Checkbox mode (checkbox-set kind only)
    #[serde(default)]
    pub checkbox_mode: CheckboxMode,
    /// Columns for the table kind
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Minimum row count for the table kind
    #[serde(default)]
    pub min_rows: Option<usize>,
    /// Maximum row count for the table kind
    #[serde(default)]
    pub max_rows: Option<usize>,
    /// Declared order level; defaults to the group's level
    #[serde(default)]
    pub order: Option<i64>,
    /// Field id this field depends on
    #[serde(default)]
    pub depends_on: Option<String>,
    /// Parallel batch grouping tag for the planner
    #[serde(default)]
    pub parallel_group: Option<String>,
    /// Explicitly non-parallelizable
    #[serde(default)]
    pub serial: bool,
}

impl Field {
    /// Create a field with required attributes; everything else defaults
    pub fn new(id: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            required: false,
            role: Role::default(),
            prompt: String::new(),
            options: Vec::new(),
            checkbox_mode: CheckboxMode::default(),
            columns: Vec::new(),
            min_rows: None,
            max_rows: None,
            order: None,
            depends_on: None,
            parallel_group: None,
            serial: false,
        }
    }

    /// Look up an option by id
    pub fn option(&self, id: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Look up a column by id
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }
}

/// A named section of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub label: String,
    /// Free prose between the group directive and its first field
    #[serde(default)]
    pub description: String,
    /// Declared order level; defaults to declaration position
    #[serde(default)]
    pub order: Option<i64>,
    pub fields: Vec<Field>,
}

impl Group {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            order: None,
            fields: Vec::new(),
        }
    }
}

/// The full ordered schema of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub groups: Vec<Group>,
}

impl Schema {
    /// Iterate fields in declaration order, with their owning group
    pub fn fields(&self) -> impl Iterator<Item = (&Group, &Field)> {
        self.groups
            .iter()
            .flat_map(|g| g.fields.iter().map(move |f| (g, f)))
    }

    /// Look up a field and its group by field id
    pub fn field(&self, id: &str) -> Option<(&Group, &Field)> {
        self.fields().find(|(_, f)| f.id == id)
    }

    /// Look up a group by id
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Declaration index of a field (position among all fields)
    pub fn declaration_index(&self, field_id: &str) -> Option<usize> {
        self.fields().position(|(_, f)| f.id == field_id)
    }

    pub fn field_count(&self) -> usize {
        self.groups.iter().map(|g| g.fields.len()).sum()
    }

    pub fn option_count(&self) -> usize {
        self.fields().map(|(_, f)| f.options.len()).sum()
    }
}
