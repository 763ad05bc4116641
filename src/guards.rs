// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guards: pure decisions over an auth snapshot.
//!
//! Guards never perform I/O and never fail; the routing layer calls them
//! with the latest [`SessionSnapshot`] and acts on the decision.

use crate::models::Role;
use crate::services::session::SessionSnapshot;

/// Where unauthenticated visitors are sent.
pub const SIGN_IN_PATH: &str = "/login";

/// Where authenticated non-admins are sent by the admin guard.
pub const HOME_PATH: &str = "/";

/// Guard decision for a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Session restore is still resolving; render a loading placeholder,
    /// never a redirect.
    Loading,
    /// Render the requested route.
    Render,
    /// Redirect to the given path.
    Redirect(&'static str),
}

/// Require an authenticated session.
pub fn auth_guard(snapshot: &SessionSnapshot) -> Decision {
    if snapshot.restoring {
        return Decision::Loading;
    }
    if snapshot.authenticated() {
        Decision::Render
    } else {
        Decision::Redirect(SIGN_IN_PATH)
    }
}

/// Require an authenticated admin.
///
/// Composes [`auth_guard`], so the loading state is shared (no second
/// loading phase) and an unauthenticated visitor still lands on sign-in.
/// A profile that has not loaded yet (role `None`) is not admin.
pub fn admin_guard(snapshot: &SessionSnapshot) -> Decision {
    match auth_guard(snapshot) {
        Decision::Render => {}
        other => return other,
    }

    if snapshot.role == Some(Role::Admin) {
        Decision::Render
    } else {
        Decision::Redirect(HOME_PATH)
    }
}
