//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ViewerRole;
use crate::error::GatewayError;

/// Query parameters selecting the dashboard role.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleParams {
    /// `admin`, `teacher`, or `parent` (case-insensitive).
    #[serde(default)]
    pub role: Option<String>,
}

impl RoleParams {
    /// Parses the role.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRole`] when the parameter is missing
    /// or names an unknown role.
    pub fn parse(&self) -> Result<ViewerRole, GatewayError> {
        let raw = self
            .role
            .as_deref()
            .ok_or_else(|| GatewayError::InvalidRole("role parameter is required".to_string()))?;
        raw.trim().parse().map_err(GatewayError::InvalidRole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        let params = RoleParams {
            role: Some(" Parent ".to_string()),
        };
        assert!(matches!(params.parse(), Ok(ViewerRole::Parent)));
    }

    #[test]
    fn rejects_missing_and_unknown() {
        assert!(RoleParams { role: None }.parse().is_err());
        let params = RoleParams {
            role: Some("janitor".to_string()),
        };
        assert!(matches!(params.parse(), Err(GatewayError::InvalidRole(_))));
    }
}
