//! The session store: owns the authenticated-session lifecycle and the
//! role-derived authorization flags.
//!
//! Construct one per application, call [`SessionStore::initialize`] once at
//! startup, and share it by reference. Login and register never bubble a
//! gateway error: failures come back as a [`SessionError`] whose `Display`
//! is the inline-renderable message, and the same message is recorded on
//! the store for readers that poll state instead.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use {
    servicehub_client::{ApiClient, AuthResponse},
    servicehub_common::{ProfilePatch, RegisterForm, Role, User},
    servicehub_vault::{PROFILE_KEY, TOKEN_KEY, Vault},
};

use crate::{claims, error::SessionError};

const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Before [`SessionStore::initialize`] has run.
    #[default]
    Unknown,
    Anonymous,
    Authenticated,
}

#[derive(Default)]
struct State {
    phase: SessionPhase,
    user: Option<User>,
    loading: bool,
    error: Option<String>,
}

pub struct SessionStore {
    client: ApiClient,
    vault: Arc<dyn Vault>,
    state: RwLock<State>,
}

impl SessionStore {
    /// The client and the store must share the same vault: the client reads
    /// the credential this store persists.
    pub fn new(client: ApiClient, vault: Arc<dyn Vault>) -> Self {
        Self {
            client,
            vault,
            state: RwLock::new(State::default()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Lifecycle transitions ────────────────────────────────────────────────

    /// Restore the session from the durable store. Synchronous, no network:
    /// expiry comes from the credential's own claims. A missing, expired,
    /// or corrupt snapshot is purged silently and the session settles
    /// anonymous — stale credentials are not a user-visible error.
    pub fn initialize(&self) {
        let token = self.vault.get(TOKEN_KEY);
        let snapshot = self.vault.get(PROFILE_KEY);

        let restored = match (token, snapshot) {
            (Some(token), Some(snapshot)) if !claims::is_expired_now(&token) => {
                serde_json::from_str::<User>(&snapshot).ok()
            },
            _ => None,
        };

        if restored.is_none() {
            self.purge_persisted();
        }

        let mut state = self.write_state();
        state.phase = if restored.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };
        debug!(phase = ?state.phase, "session initialized");
        state.user = restored;
        state.loading = false;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        self.begin_attempt();
        match self.client.login(email, password).await {
            Ok(response) => self.settle_authenticated(response),
            Err(err) => Err(self.fail_attempt(displayable(err.message(), LOGIN_FALLBACK))),
        }
    }

    /// Validates the form before dispatch; validation failures surface
    /// synchronously and never reach the gateway.
    pub async fn register(&self, form: &RegisterForm) -> Result<User, SessionError> {
        if let Err(invalid) = form.validate() {
            self.write_state().error = Some(invalid.message.clone());
            return Err(invalid.into());
        }
        self.begin_attempt();
        match self.client.register(form).await {
            Ok(response) => self.settle_authenticated(response),
            Err(err) => Err(self.fail_attempt(displayable(err.message(), REGISTER_FALLBACK))),
        }
    }

    /// Clear the persisted credential and profile and the in-memory
    /// identity. Synchronous and idempotent; any server-side revocation is
    /// a fire-and-forget collaborator concern, not awaited here.
    pub fn logout(&self) {
        self.purge_persisted();
        let mut state = self.write_state();
        state.user = None;
        state.error = None;
        state.phase = SessionPhase::Anonymous;
    }

    /// Merge a partial patch into the profile without contacting the
    /// network (optimistic local edit). Returns the updated profile, or
    /// `None` when there is no authenticated user to patch.
    pub fn update_user(&self, patch: &ProfilePatch) -> Result<Option<User>, SessionError> {
        let Some(mut user) = self.user() else {
            return Ok(None);
        };
        user.apply(patch);
        let snapshot = serde_json::to_string(&user).map_err(SessionError::Encode)?;
        self.vault.put(PROFILE_KEY, &snapshot)?;
        self.write_state().user = Some(user.clone());
        Ok(Some(user))
    }

    pub fn clear_error(&self) {
        self.write_state().error = None;
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.read_state().phase
    }

    pub fn user(&self) -> Option<User> {
        self.read_state().user.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.read_state().error.clone()
    }

    /// Advisory only: a second auth action started while one is in flight
    /// is not prevented, and the last one to resolve wins.
    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    /// The currently persisted credential, if any.
    pub fn token(&self) -> Option<String> {
        self.vault.get(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().user.is_some()
    }

    // Role flags are recomputed from `user.role` on every read so they can
    // never diverge from the profile. Exactly one is true when
    // authenticated; all are false otherwise.

    pub fn is_user(&self) -> bool {
        self.has_role(Role::User)
    }

    pub fn is_master(&self) -> bool {
        self.has_role(Role::Master)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    fn has_role(&self, role: Role) -> bool {
        self.read_state()
            .user
            .as_ref()
            .is_some_and(|u| u.role == role)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn begin_attempt(&self) {
        let mut state = self.write_state();
        state.loading = true;
        state.error = None;
    }

    /// Persist strictly before the in-memory update: any reader reacting to
    /// the flag flip can assume the durable copy is already consistent.
    fn settle_authenticated(&self, response: AuthResponse) -> Result<User, SessionError> {
        if let Err(err) = self.persist(&response) {
            warn!(error = %err, "session persist failed; rolling back credential");
            self.purge_persisted();
            let message = err.message();
            self.fail_attempt(message);
            return Err(err);
        }
        let mut state = self.write_state();
        state.user = Some(response.user.clone());
        state.phase = SessionPhase::Authenticated;
        state.loading = false;
        state.error = None;
        Ok(response.user)
    }

    fn persist(&self, response: &AuthResponse) -> Result<(), SessionError> {
        let snapshot = serde_json::to_string(&response.user).map_err(SessionError::Encode)?;
        self.vault.put(TOKEN_KEY, &response.token)?;
        self.vault.put(PROFILE_KEY, &snapshot)?;
        Ok(())
    }

    fn fail_attempt(&self, message: String) -> SessionError {
        let mut state = self.write_state();
        state.loading = false;
        state.error = Some(message.clone());
        SessionError::Auth(message)
    }

    fn purge_persisted(&self) {
        if let Err(err) = self.vault.remove(TOKEN_KEY) {
            warn!(error = %err, "failed to clear persisted credential");
        }
        if let Err(err) = self.vault.remove(PROFILE_KEY) {
            warn!(error = %err, "failed to clear persisted profile");
        }
    }
}

fn displayable(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use servicehub_vault::MemoryVault;

    use super::*;

    fn seeded_store(role: Role) -> SessionStore {
        let vault: Arc<dyn Vault> = Arc::new(MemoryVault::new());
        let token = claims::fake_token(&serde_json::json!({
            "exp": claims::now_secs() + 3_600,
        }));
        vault.put(TOKEN_KEY, &token).unwrap();
        let user = User {
            id: "u1".into(),
            name: "Jane".into(),
            email: Some("jane@example.com".into()),
            role,
            avatar: None,
        };
        vault
            .put(PROFILE_KEY, &serde_json::to_string(&user).unwrap())
            .unwrap();
        let client = ApiClient::new("http://127.0.0.1:1", Arc::clone(&vault));
        let store = SessionStore::new(client, vault);
        store.initialize();
        store
    }

    fn anonymous_store() -> SessionStore {
        let vault: Arc<dyn Vault> = Arc::new(MemoryVault::new());
        let client = ApiClient::new("http://127.0.0.1:1", Arc::clone(&vault));
        let store = SessionStore::new(client, vault);
        store.initialize();
        store
    }

    #[test]
    fn phase_is_unknown_before_initialize() {
        let vault: Arc<dyn Vault> = Arc::new(MemoryVault::new());
        let client = ApiClient::new("http://127.0.0.1:1", Arc::clone(&vault));
        let store = SessionStore::new(client, vault);
        assert_eq!(store.phase(), SessionPhase::Unknown);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn exactly_one_role_flag_per_role() {
        for role in Role::ALL {
            let store = seeded_store(role);
            let flags = [store.is_user(), store.is_master(), store.is_admin()];
            assert_eq!(
                flags.iter().filter(|f| **f).count(),
                1,
                "role {role} must set exactly one flag"
            );
            assert_eq!(store.is_user(), role == Role::User);
            assert_eq!(store.is_master(), role == Role::Master);
            assert_eq!(store.is_admin(), role == Role::Admin);
        }
    }

    #[test]
    fn anonymous_has_no_role_flags() {
        let store = anonymous_store();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert!(!store.is_user() && !store.is_master() && !store.is_admin());
    }

    #[test]
    fn logout_is_idempotent() {
        let store = seeded_store(Role::User);
        assert!(store.is_authenticated());
        store.logout();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert!(store.token().is_none());
        store.logout();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert!(store.user().is_none());
    }

    #[test]
    fn update_user_is_a_noop_when_anonymous() {
        let store = anonymous_store();
        let updated = store
            .update_user(&ProfilePatch {
                name: Some("Ghost".into()),
                ..ProfilePatch::default()
            })
            .unwrap();
        assert!(updated.is_none());
        assert!(store.token().is_none());
    }

    #[test]
    fn update_user_persists_before_memory() {
        let store = seeded_store(Role::Master);
        let updated = store
            .update_user(&ProfilePatch {
                name: Some("Jane Doe".into()),
                ..ProfilePatch::default()
            })
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(store.user().unwrap().name, "Jane Doe");
        // The persisted snapshot reflects the patch too.
        let snapshot = store.vault.get(PROFILE_KEY).unwrap();
        let persisted: User = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(persisted.name, "Jane Doe");
    }

    #[test]
    fn corrupt_profile_snapshot_settles_anonymous() {
        let vault: Arc<dyn Vault> = Arc::new(MemoryVault::new());
        let token = claims::fake_token(&serde_json::json!({
            "exp": claims::now_secs() + 3_600,
        }));
        vault.put(TOKEN_KEY, &token).unwrap();
        vault.put(PROFILE_KEY, "{not json").unwrap();
        let client = ApiClient::new("http://127.0.0.1:1", Arc::clone(&vault));
        let store = SessionStore::new(client, Arc::clone(&vault));
        store.initialize();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        // Both keys purged.
        assert!(vault.get(TOKEN_KEY).is_none());
        assert!(vault.get(PROFILE_KEY).is_none());
    }
}
