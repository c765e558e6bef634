//! # Domain Model
//!
//! The catalog is three mutually-referencing collections plus supporting
//! reference lists:
//!
//! ```text
//!   App ──functions──▶ Function        (Assignment: {functionId, status})
//!    ▲ ▲
//!    │ └──── IntegrationPair ────┐     (undirected, canonical low/high ids)
//!    └───────────────────────────┘
//! ```
//!
//! ## Assignments live inside the App
//!
//! Older data kept assignments as a flat top-level list, and older still as a
//! plain list of function *names* on each app. Both are folded into
//! [`App::functions`] once at load time (see `migrate`), so every read site
//! sees exactly one shape. Uniqueness is per `(app, function)`.
//!
//! ## Canonical pairs
//!
//! An [`IntegrationPair`] stores its two app ids ordered lexicographically
//! (`app_low_id < app_high_id`). [`canonical_pair`] is the only way ids are
//! ordered, so a lookup from either side resolves to the same record.
//!
//! ## Serialized shape
//!
//! Field names are camelCase so exported documents stay readable by the
//! browser build that shares the same storage layout. Every field has a serde
//! default, which is what makes partially-shaped persisted records loadable.

use serde::{Deserialize, Deserializer, Serialize};

use crate::util::{letter_avatar, null_as_default, LetterAvatar};

/// Placeholder name for functions synthesized to heal dangling assignments.
pub const UNNAMED_FUNCTION: &str = "(unnamed function)";
pub const UNNAMED_APP: &str = "(unnamed)";
pub const DEFAULT_CATEGORY: &str = "Other";

/// How an app serves a function.
///
/// Levels rotate `available → primary → evaluating → available`.
///
/// Stored levels are matched case-insensitively; anything unrecognised,
/// including `null`, reads as `available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Primary,
    #[default]
    Available,
    Evaluating,
}

impl Level {
    pub fn next(self) -> Self {
        match self {
            Level::Available => Level::Primary,
            Level::Primary => Level::Evaluating,
            Level::Evaluating => Level::Available,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Primary => "primary",
            Level::Available => "available",
            Level::Evaluating => "evaluating",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "primary" => Level::Primary,
            "evaluating" => Level::Evaluating,
            _ => Level::Available,
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Level::parse_lenient).unwrap_or_default())
    }
}

/// One row of the App ↔ Function relation, embedded in its App.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "id")]
    pub function_id: String,
    #[serde(default)]
    pub status: Level,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Icon {
    Emoji {
        value: String,
    },
    Image {
        src: String,
    },
    Library {
        id: String,
    },
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatapointMapping {
    pub master_datapoint_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inbound_tag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outbound_tag: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct App {
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon: Icon,
    #[serde(deserialize_with = "null_as_default")]
    pub functions: Vec<Assignment>,
    #[serde(deserialize_with = "null_as_default")]
    pub datapoints: Vec<DatapointMapping>,
}

impl App {
    pub fn new(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn assignment(&self, function_id: &str) -> Option<&Assignment> {
        self.functions.iter().find(|a| a.function_id == function_id)
    }

    pub fn assignment_mut(&mut self, function_id: &str) -> Option<&mut Assignment> {
        self.functions
            .iter_mut()
            .find(|a| a.function_id == function_id)
    }

    /// The letter avatar to draw when the app has no icon.
    pub fn avatar(&self) -> Option<LetterAvatar> {
        match self.icon {
            Icon::None => Some(letter_avatar(&self.name)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Function {
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "category_or_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
}

fn category_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()))
}

impl Default for Function {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            notes: String::new(),
        }
    }
}

impl Function {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            ..Default::default()
        }
    }
}

/// Which relationship flag on a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairKind {
    Direct,
    Zapier,
}

/// Display colour of a pair, a pure function of its two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairColor {
    Direct,
    Zapier,
    Both,
    None,
}

impl PairColor {
    pub fn from_flags(has_direct: bool, has_zapier: bool) -> Self {
        match (has_direct, has_zapier) {
            (true, true) => PairColor::Both,
            (true, false) => PairColor::Direct,
            (false, true) => PairColor::Zapier,
            (false, false) => PairColor::None,
        }
    }
}

/// Aggregate integration style of one direction, or of a legacy link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Zapier,
    Direct,
    Both,
}

impl FlowType {
    pub fn from_color(color: PairColor) -> Option<Self> {
        match color {
            PairColor::Direct => Some(FlowType::Direct),
            PairColor::Zapier => Some(FlowType::Zapier),
            PairColor::Both => Some(FlowType::Both),
            PairColor::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationAction {
    pub label: String,
    #[serde(default)]
    pub category: String,
    pub integration_type: PairKind,
}

/// Actions flowing one way across a pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectionalFlow {
    #[serde(default)]
    pub actions: Vec<IntegrationAction>,
}

impl DirectionalFlow {
    pub fn flow_type(&self) -> Option<FlowType> {
        let direct = self
            .actions
            .iter()
            .any(|a| a.integration_type == PairKind::Direct);
        let zapier = self
            .actions
            .iter()
            .any(|a| a.integration_type == PairKind::Zapier);
        FlowType::from_color(PairColor::from_flags(direct, zapier))
    }
}

/// Undirected relationship between two distinct apps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrationPair {
    pub id: String,
    pub app_low_id: String,
    pub app_high_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub has_direct: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_zapier: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub direct_notes: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub zapier_notes: Vec<String>,
    #[serde(rename = "aToB")]
    pub a_to_b: DirectionalFlow,
    #[serde(rename = "bToA")]
    pub b_to_a: DirectionalFlow,
}

impl IntegrationPair {
    pub fn involves(&self, app_id: &str) -> bool {
        self.app_low_id == app_id || self.app_high_id == app_id
    }

    /// The member that is not `app_id`, if `app_id` is a member at all.
    pub fn other(&self, app_id: &str) -> Option<&str> {
        if self.app_low_id == app_id {
            Some(&self.app_high_id)
        } else if self.app_high_id == app_id {
            Some(&self.app_low_id)
        } else {
            None
        }
    }

    pub fn color(&self) -> PairColor {
        PairColor::from_flags(self.has_direct, self.has_zapier)
    }

    /// A pair is drawn only once it records some relationship.
    pub fn is_active(&self) -> bool {
        self.has_direct
            || self.has_zapier
            || !self.direct_notes.is_empty()
            || !self.zapier_notes.is_empty()
            || !self.a_to_b.actions.is_empty()
            || !self.b_to_a.actions.is_empty()
    }

    pub fn notes(&self, kind: PairKind) -> &[String] {
        match kind {
            PairKind::Direct => &self.direct_notes,
            PairKind::Zapier => &self.zapier_notes,
        }
    }

    /// Flow leaving `from_app`; `aToB` is low → high.
    pub fn flow_from_mut(&mut self, from_app: &str) -> Option<&mut DirectionalFlow> {
        if self.app_low_id == from_app {
            Some(&mut self.a_to_b)
        } else if self.app_high_id == from_app {
            Some(&mut self.b_to_a)
        } else {
            None
        }
    }
}

/// Order two app ids for pair storage. `None` for self-pairs or empty ids.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> Option<(&'a str, &'a str)> {
    if a.is_empty() || b.is_empty() || a == b {
        return None;
    }
    if a < b {
        Some((a, b))
    } else {
        Some((b, a))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrationPattern {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Document,
    Video,
    Form,
    Link,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrgSettings {
    pub firm_name: String,
    pub custodian: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamingTemplate {
    pub id: String,
    pub name: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderTemplate {
    pub id: String,
    pub name: String,
    pub folders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryIcon {
    pub id: String,
    pub name: String,
    pub data: String,
}

/// A master datapoint, the vocabulary behind merge-field tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Datapoint {
    pub name: String,
    pub description: String,
}

/// What a workflow step can cite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    App,
    Resource,
    Member,
    Template,
}

impl RefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RefKind::App => "app",
            RefKind::Resource => "resource",
            RefKind::Member => "member",
            RefKind::Template => "template",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: RefKind,
    pub id: String,
}

impl ResourceRef {
    /// Index key, `kind:id`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowStep {
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resources: Vec<ResourceRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub steps: Vec<WorkflowStep>,
}
