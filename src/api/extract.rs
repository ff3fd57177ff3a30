//! Request extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::Claims;
use crate::domain::{Action, Profile, Resource, Role, Ticket};
use crate::error::{DeskError, DeskResult};
use crate::AppState;

/// The authenticated caller, resolved to their stored profile.
///
/// Rejects with 401 when no valid token was presented, and with whatever
/// profile resolution returns otherwise (403 for deactivated, 500 on store
/// failure).
pub struct Caller(pub Profile);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = DeskError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| DeskError::Unauthorized("Missing authorization token".to_string()))?;

        let profile = state.sessions.resolve(&claims).await?;
        Ok(Caller(profile))
    }
}

impl Caller {
    pub fn profile(&self) -> &Profile {
        &self.0
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub async fn require(&self, state: &AppState, action: Action, resource: Resource) -> DeskResult<()> {
        state.permissions.require(self.0.role, action, resource).await
    }

    /// Technicians only see tickets they reported or are assigned to.
    pub fn row_scope(&self) -> Option<uuid::Uuid> {
        (self.0.role == Role::Technician).then_some(self.0.id)
    }

    pub fn can_see(&self, ticket: &Ticket) -> bool {
        self.row_scope().map_or(true, |id| ticket.involves(id))
    }
}
