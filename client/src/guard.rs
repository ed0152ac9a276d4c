//! Route guard: decides whether the current session may render a
//! protected view.
//!
//! The outcome is deliberately four-way, not a binary allow/deny: a
//! session whose role claim is still being decoded must render a neutral
//! pending state, never be misread as unauthorized.

use serde::{Deserialize, Serialize};

use crate::session::state::{Role, Session};

/// Admission decision for a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Render the view.
    Allow,
    /// No token: go to the login view.
    RedirectLogin,
    /// Token and role present, but the role is not permitted here.
    RedirectUnauthorized,
    /// Token present, role not yet resolved: render a neutral loading
    /// state and wait. Never redirect from here.
    Pending,
}

/// Decide admission for a view requiring one of `required` roles.
///
/// 1. No session → [`Decision::RedirectLogin`]
/// 2. Session with unresolved role → [`Decision::Pending`]
/// 3. Resolved role → [`Decision::Allow`] iff it is a member of
///    `required`, else [`Decision::RedirectUnauthorized`]
///
/// Role normalization (trim, uppercase) happens once at claim-decode
/// time; membership here is a typed comparison.
#[must_use]
pub fn decide(required: &[Role], session: Option<&Session>) -> Decision {
    let Some(session) = session else {
        return Decision::RedirectLogin;
    };

    let Some(role) = session.role else {
        return Decision::Pending;
    };

    if required.contains(&role) {
        Decision::Allow
    } else {
        Decision::RedirectUnauthorized
    }
}

/// The application's route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Login form (public).
    Login,
    /// Registration form (public).
    Register,
    /// User panel: submit and view own tickets.
    Panel,
    /// Admin panel: triage all tickets.
    Admin,
    /// Unauthorized notice (public).
    Unauthorized,
}

/// Roles permitted on the user panel.
const PANEL_ROLES: &[Role] = &[Role::User, Role::Admin];
/// Roles permitted on the admin panel.
const ADMIN_ROLES: &[Role] = &[Role::Admin];

impl Route {
    /// Resolve a path to a route. Unknown paths fall through to login.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        match path {
            "/register" => Self::Register,
            "/panel" => Self::Panel,
            "/admin" => Self::Admin,
            "/unauthorized" => Self::Unauthorized,
            // "/login" and the catch-all
            _ => Self::Login,
        }
    }

    /// The canonical path for this route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Panel => "/panel",
            Self::Admin => "/admin",
            Self::Unauthorized => "/unauthorized",
        }
    }

    /// Roles permitted to render this route; `None` means public.
    #[must_use]
    pub const fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Self::Login | Self::Register | Self::Unauthorized => None,
            Self::Panel => Some(PANEL_ROLES),
            Self::Admin => Some(ADMIN_ROLES),
        }
    }
}

/// Decide admission for a concrete route. Public routes always allow.
#[must_use]
pub fn guard_route(route: Route, session: Option<&Session>) -> Decision {
    match route.allowed_roles() {
        None => Decision::Allow,
        Some(required) => decide(required, session),
    }
}

/// Where a freshly authenticated session lands: admins on the admin
/// panel, everyone else on the user panel.
#[must_use]
pub const fn landing_route(role: Role) -> Route {
    match role {
        Role::Admin => Route::Admin,
        Role::User => Route::Panel,
    }
}
