//! Session API endpoints and the in-memory session store.
//!
//! Sessions are held in process memory and die with it; there is no expiry.
//! Each one carries the operator's [`AccessScope`] plus the ids staged for
//! deletion, so a confirm step can act on what an earlier request marked.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use api_types::session::{Login, Role as ApiRole, SessionCreated, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{AccessScope, MovementKind, Role};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// An authenticated operator and the per-session state their pages use.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub scope: AccessScope,
    pending_deletes: HashMap<MovementKind, Vec<i32>>,
}

/// Shared map from bearer token to live session.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Opens a session for `scope` and returns a copy of it.
    pub fn create(&self, scope: AccessScope) -> Session {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            scope,
            pending_deletes: HashMap::new(),
        };
        self.write().insert(session.token.clone(), session.clone());
        session
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.read().get(token).cloned()
    }

    /// Removes the session; returns whether the token was known.
    pub fn remove(&self, token: &str) -> bool {
        self.write().remove(token).is_some()
    }

    /// Replaces the staged deletion set for `kind`; returns how many ids are
    /// now staged.
    pub fn stage_deletes(&self, token: &str, kind: MovementKind, ids: Vec<i32>) -> usize {
        let mut sessions = self.write();
        let Some(session) = sessions.get_mut(token) else {
            return 0;
        };
        let staged = ids.len();
        session.pending_deletes.insert(kind, ids);
        staged
    }

    /// Removes and returns the staged deletion set for `kind`.
    pub fn take_deletes(&self, token: &str, kind: MovementKind) -> Vec<i32> {
        self.write()
            .get_mut(token)
            .and_then(|session| session.pending_deletes.remove(&kind))
            .unwrap_or_default()
    }

    pub fn clear_deletes(&self, token: &str, kind: MovementKind) {
        if let Some(session) = self.write().get_mut(token) {
            session.pending_deletes.remove(&kind);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Session>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn user_view(scope: &AccessScope) -> UserView {
    UserView {
        username: scope.username.clone(),
        role: match scope.role {
            Role::Standard => ApiRole::Standard,
            Role::Administrative => ApiRole::Administrative,
        },
        cost_center_id: scope.cost_center_id,
    }
}

/// Handle login requests, opening a new session
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<(StatusCode, Json<SessionCreated>), ServerError> {
    let scope = state
        .engine
        .authenticate(&payload.username, &payload.password)
        .await?;
    tracing::info!("session opened for {}", scope.username);
    let session = state.sessions.create(scope);

    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            token: session.token.clone(),
            user: user_view(&session.scope),
        }),
    ))
}

/// Handle requests for the logged-in user behind the current token
pub async fn current_user(Extension(session): Extension<Session>) -> Json<UserView> {
    Json(user_view(&session.scope))
}

/// Handle logout requests, dropping the session and anything staged in it
pub async fn logout(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> StatusCode {
    state.sessions.remove(&session.token);
    StatusCode::NO_CONTENT
}
