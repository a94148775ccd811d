use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A flat source record. Only the fields named by the [`FieldMapping`] are
/// interpreted; everything else rides along as opaque payload for the
/// presentation layer.
pub type Record = serde_json::Map<String, Value>;

// ── Node identity ──

/// A node id as it appears in source records: integer or string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Str(String),
}

impl NodeId {
    /// Read an id out of a raw record value. Null and missing values collapse
    /// to the empty-string id, the same normalization the parent field gets.
    pub fn from_value(value: Option<&Value>) -> NodeId {
        match value {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => NodeId::Int(i),
                None => NodeId::Str(n.to_string()),
            },
            Some(Value::String(s)) => NodeId::Str(s.clone()),
            Some(Value::Bool(b)) => NodeId::Str(b.to_string()),
            Some(Value::Null) | None => NodeId::Str(String::new()),
            Some(other) => NodeId::Str(other.to_string()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(i) => write!(f, "{}", i),
            NodeId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for NodeId {
    fn from(i: i64) -> Self {
        NodeId::Int(i)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Str(s.to_string())
    }
}

// ── Field mapping ──

/// Binding from logical roles to concrete record field names.
///
/// `id` and `parent` are always bound. Every other role is optional: an
/// unbound role is simply never interpreted, and its data (if any) passes
/// through on [`OrgNode::data`] untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldMapping {
    pub id: String,
    pub parent: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub role_type: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub badge_type: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub vacant: Option<String>,
    #[serde(default)]
    pub interim: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl FieldMapping {
    pub fn new(id: &str, parent: &str) -> Self {
        FieldMapping {
            id: id.to_string(),
            parent: parent.to_string(),
            name: None,
            firstname: None,
            role: None,
            direction: None,
            role_type: None,
            image: None,
            badge: None,
            badge_type: None,
            link: None,
            order: None,
            vacant: None,
            interim: None,
            email: None,
            phone: None,
        }
    }

    /// The record's id under this mapping.
    pub fn record_id(&self, record: &Record) -> NodeId {
        NodeId::from_value(record.get(&self.id))
    }

    /// The record's parent reference. Null, missing and empty-string values
    /// all mean "no parent", i.e. a root candidate.
    pub fn record_parent(&self, record: &Record) -> Option<NodeId> {
        match record.get(&self.parent) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(NodeId::from_value(Some(value))),
        }
    }

    /// The record's role type. Unbound mapping or unrecognized value both
    /// fall back to [`RoleType::Standard`].
    pub fn record_role_type(&self, record: &Record) -> RoleType {
        RoleType::from_field(self.role_type.as_ref().and_then(|f| record.get(f)))
    }

    /// Numeric sort key for the `order` role. Missing and non-numeric values
    /// sort as 0.
    pub fn record_order(&self, record: &Record) -> f64 {
        match self.order.as_ref().and_then(|f| record.get(f)) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        FieldMapping::new("id", "parent_id")
    }
}

// ── Role type ──

/// How a node hangs off its parent: a line-management child, supporting
/// staff, or a cross-functional (dotted-line) relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Standard,
    Assistant,
    Transversal,
}

impl RoleType {
    /// Anything that is not a recognized marker, including an absent field,
    /// is a standard child.
    pub fn from_field(value: Option<&Value>) -> RoleType {
        match value.and_then(Value::as_str) {
            Some("assistant") => RoleType::Assistant,
            Some("transversal") => RoleType::Transversal,
            _ => RoleType::Standard,
        }
    }
}

// ── Tree node ──

/// One position in the organization tree, backed by one input record.
///
/// The three child collections are mutually exclusive partitions of the
/// node's direct reports. Nodes are never mutated after construction; the
/// whole tree is rebuilt when the input changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrgNode {
    pub id: NodeId,
    /// None exactly for the root.
    pub parent_id: Option<NodeId>,
    /// The originating record, untouched.
    pub data: Record,
    pub children: Vec<OrgNode>,
    pub assistants: Vec<OrgNode>,
    pub transversals: Vec<OrgNode>,
    /// 0 at the root, parent depth + 1 otherwise.
    pub depth: u32,
    /// True iff all three child partitions are empty.
    pub is_leaf: bool,
}

// ── Validation errors ──

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationErrorKind {
    EmptyData,
    DuplicateId,
    NoRoot,
    MultipleRoots,
    Orphan,
    Cycle,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::EmptyData => "empty-data",
            ValidationErrorKind::DuplicateId => "duplicate-id",
            ValidationErrorKind::NoRoot => "no-root",
            ValidationErrorKind::MultipleRoots => "multiple-roots",
            ValidationErrorKind::Orphan => "orphan",
            ValidationErrorKind::Cycle => "cycle",
        }
    }
}

/// A dangling parent reference: `id` names `parent`, which does not exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrphanRef {
    pub id: NodeId,
    pub parent: NodeId,
}

/// Structured payload attached to a validation error for programmatic use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ErrorDetail {
    DuplicateIds { ids: Vec<NodeId> },
    Roots { ids: Vec<NodeId> },
    Orphans { refs: Vec<OrphanRef> },
    CycleNodes { ids: Vec<NodeId> },
}

/// One structural defect in a record set. Never transient or retryable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

// ── Search ──

/// The searchable logical fields, in match-priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Name,
    Firstname,
    Role,
    Direction,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::Name,
        SearchField::Firstname,
        SearchField::Role,
        SearchField::Direction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Firstname => "firstname",
            SearchField::Role => "role",
            SearchField::Direction => "direction",
        }
    }

    /// The source field this role is bound to, if any.
    pub fn mapped<'m>(&self, mapping: &'m FieldMapping) -> Option<&'m str> {
        match self {
            SearchField::Name => mapping.name.as_deref(),
            SearchField::Firstname => mapping.firstname.as_deref(),
            SearchField::Role => mapping.role.as_deref(),
            SearchField::Direction => mapping.direction.as_deref(),
        }
    }
}

/// One search hit: the node, which logical field matched, and the raw
/// (un-normalized) matched value.
#[derive(Clone, Debug)]
pub struct SearchResult<'a> {
    pub node: &'a OrgNode,
    pub field: SearchField,
    pub value: String,
}
