use serde::{Deserialize, Serialize};

use crate::client::HttpMethod;

/// Complete set of checks for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Banner printed at the top of the run
    pub title: String,

    pub login: LoginCheck,

    /// Functional areas in run order
    #[serde(default)]
    pub areas: Vec<Area>,
}

/// Authentication call performed once per role before any area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCheck {
    #[serde(default = "default_login_name")]
    pub name: String,

    #[serde(default = "default_login_title")]
    pub title: String,

    #[serde(default)]
    pub icon: Option<String>,

    pub path: String,

    #[serde(default = "default_status")]
    pub status: u16,

    /// Body field holding the session token
    #[serde(default = "default_token_field")]
    pub token_field: String,

    /// Body field holding the user object
    #[serde(default = "default_user_field")]
    pub user_field: String,

    pub message: String,

    #[serde(default)]
    pub details: Option<String>,
}

/// Group of checks printed under one banner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub title: String,

    #[serde(default)]
    pub icon: Option<String>,

    pub checks: Vec<EndpointCheck>,
}

impl Area {
    /// "📋 TASKS TESTS"
    pub fn banner(&self) -> String {
        banner(self.icon.as_deref(), &self.title)
    }
}

impl LoginCheck {
    pub fn banner(&self) -> String {
        banner(self.icon.as_deref(), &self.title)
    }
}

fn banner(icon: Option<&str>, title: &str) -> String {
    match icon {
        Some(icon) => format!("{} {}", icon, title),
        None => title.to_string(),
    }
}

/// One request/expectation pair, executed once per role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCheck {
    pub name: String,

    #[serde(default)]
    pub method: HttpMethod,

    pub path: String,

    /// JSON payload for write calls
    #[serde(default)]
    pub body: Option<serde_json::Value>,

    /// Status expected by roles the check is open to
    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(default)]
    pub shape: BodyShape,

    /// Dotted paths that must be present and non-null in the body
    #[serde(default)]
    pub require: Vec<String>,

    #[serde(default)]
    pub access: Option<AccessRule>,

    /// Success message template
    pub message: String,

    /// Success details template
    #[serde(default)]
    pub details: Option<String>,

    /// Title of the owning area; filled in when the catalog is parsed
    #[serde(skip)]
    pub area: String,
}

impl EndpointCheck {
    /// "Companies (customer)"
    pub fn result_name(&self, role: &str) -> String {
        result_name(&self.name, role)
    }

    /// What `role` must observe for this check to pass
    pub fn expectation_for(&self, role: &str) -> Expectation {
        match &self.access {
            Some(rule) if !rule.permits(role) => Expectation::Denied {
                status: rule.denied_status,
            },
            _ => Expectation::Allowed {
                status: self.status,
            },
        }
    }
}

impl LoginCheck {
    pub fn result_name(&self, role: &str) -> String {
        result_name(&self.name, role)
    }
}

fn result_name(name: &str, role: &str) -> String {
    format!("{} ({})", name, role)
}

/// Required top-level structure of a successful body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyShape {
    #[default]
    Any,
    Object,
    List,
}

impl BodyShape {
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            BodyShape::Any => true,
            BodyShape::Object => value.is_object(),
            BodyShape::List => value.is_array(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            BodyShape::Any => "any JSON value",
            BodyShape::Object => "a JSON object",
            BodyShape::List => "a JSON array",
        }
    }
}

/// Restricts a check to some roles; everyone else must be refused
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRule {
    pub allowed_roles: Vec<String>,

    #[serde(default = "default_denied_status")]
    pub denied_status: u16,
}

impl AccessRule {
    pub fn permits(&self, role: &str) -> bool {
        self.allowed_roles.iter().any(|r| r == role)
    }

    /// "Non-admin user properly restricted"
    pub fn denial_note(&self) -> String {
        format!("Non-{} user properly restricted", self.allowed_roles.join("/"))
    }
}

/// Outcome a role must observe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Allowed { status: u16 },
    Denied { status: u16 },
}

fn default_login_name() -> String {
    "Login".to_string()
}

fn default_login_title() -> String {
    "AUTHENTICATION TESTS".to_string()
}

fn default_token_field() -> String {
    "token".to_string()
}

fn default_user_field() -> String {
    "user".to_string()
}

fn default_status() -> u16 {
    200
}

fn default_denied_status() -> u16 {
    401
}
