use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::names::{validate_component_name, validate_lane_name};

/// Identifier of a component: optional owning scope, name, optional version.
///
/// Equality includes the version. Use [`ComponentId::is_same_component`] to
/// compare identities regardless of version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    /// Scope the component was exported to (`None` for a new local component).
    pub scope: Option<String>,
    /// Slash-separated component name (e.g. `ui/button`).
    pub name: String,
    /// Tag or snap hash, if this id addresses a specific version.
    pub version: Option<String>,
}

impl ComponentId {
    /// Create a version-less id.
    pub fn new(scope: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.map(str::to_string),
            name: name.into(),
            version: None,
        }
    }

    /// Parse `scope/name@version`.
    ///
    /// When `has_scope` is `true` the first path segment is the scope;
    /// otherwise the whole path is the name.
    pub fn parse(s: &str, has_scope: bool) -> Result<Self, TypeError> {
        let (path, version) = match s.rsplit_once('@') {
            Some((path, version)) if !version.is_empty() => (path, Some(version.to_string())),
            Some(_) => return Err(TypeError::InvalidComponentId(s.to_string())),
            None => (s, None),
        };
        let (scope, name) = if has_scope {
            let (scope, name) = path
                .split_once('/')
                .ok_or_else(|| TypeError::InvalidComponentId(s.to_string()))?;
            if scope.is_empty() {
                return Err(TypeError::InvalidComponentId(s.to_string()));
            }
            (Some(scope.to_string()), name)
        } else {
            (None, path)
        };
        validate_component_name(name)?;
        Ok(Self {
            scope,
            name: name.to_string(),
            version,
        })
    }

    pub fn has_scope(&self) -> bool {
        self.scope.is_some()
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    /// The version string, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns a copy of this id pointing at `version`.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..self.clone()
        }
    }

    /// Returns a copy of this id without a version.
    pub fn without_version(&self) -> Self {
        Self {
            version: None,
            ..self.clone()
        }
    }

    /// Returns a copy of this id moved to another scope.
    pub fn with_scope(&self, scope: Option<&str>) -> Self {
        Self {
            scope: scope.map(str::to_string),
            ..self.clone()
        }
    }

    /// `scope/name`, or `name` for an unscoped component.
    pub fn to_string_without_version(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{scope}/{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Same scope and name, ignoring versions.
    pub fn is_same_component(&self, other: &Self) -> bool {
        self.scope == other.scope && self.name == other.name
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_without_version())?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}

/// Identity of a lane: optional scope plus name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId {
    pub scope: Option<String>,
    pub name: String,
}

impl LaneId {
    /// Create a lane id after validating the name.
    pub fn new(scope: Option<&str>, name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate_lane_name(&name)?;
        Ok(Self {
            scope: scope.map(str::to_string),
            name,
        })
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{scope}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
