//! The session state machine.
//!
//! [`SessionController`] is the only writer of [`SessionSnapshot`]. Readers
//! take snapshots or subscribe to the watch channel.
//!
//! Every user action (`login`, `logout`, `initialize_system`,
//! `invalidate_session`) bumps a generation counter. Background completions
//! (boot hydration and `refresh_user_data`) capture the generation when they
//! start and are dropped if it changed by the time they finish, so a logout
//! always wins over a refresh that was already in flight. The generation check
//! and the credential store write happen under the watch channel's write lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use stay_core::{
    ActiveSession, InitializationState, SessionPhase, SessionSnapshot, User, ViewId,
};

use crate::api::{AdminPayload, AuthApi, InitializeSystemResponse, OrganizationPayload};
use crate::credential_store::{CredentialStore, RememberedLogin};
use crate::error::AuthError;
use crate::ticker::AgeTicker;
use crate::{prober, validation};

struct Shared {
    state: watch::Sender<SessionSnapshot>,
    generation: AtomicU64,
    alive: AtomicBool,
}

impl Shared {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Advance the age counter. Returns `false` once ticking should stop.
    fn tick(&self) -> bool {
        if !self.is_alive() {
            return false;
        }
        let mut live = false;
        self.state.send_if_modified(|state| {
            if !state.is_authenticated() {
                return false;
            }
            live = true;
            state.session_age_minutes = state.session_age_minutes.saturating_add(1);
            true
        });
        live
    }
}

pub struct SessionController<A: AuthApi> {
    api: A,
    store: Arc<dyn CredentialStore>,
    shared: Arc<Shared>,
    ticker: Mutex<AgeTicker>,
}

impl<A: AuthApi> SessionController<A> {
    /// `tick_interval` is how often the session age advances by one.
    pub fn new(api: A, store: Arc<dyn CredentialStore>, tick_interval: Duration) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::booting());
        Self {
            api,
            store,
            shared: Arc::new(Shared {
                state,
                generation: AtomicU64::new(0),
                alive: AtomicBool::new(true),
            }),
            ticker: Mutex::new(AgeTicker::new(tick_interval)),
        }
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.shared.state.borrow().phase
    }

    /// Dashboard for the authenticated user.
    #[must_use]
    pub fn current_view(&self) -> Option<ViewId> {
        self.shared.state.borrow().view()
    }

    #[must_use]
    pub fn remembered_login(&self) -> Option<RememberedLogin> {
        self.store.remembered()
    }

    /// Which credential tier holds the persisted session.
    #[must_use]
    pub fn credential_source(&self) -> Option<&'static str> {
        self.store.source()
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_running()
    }

    /// Probe the backend and hydrate any persisted session.
    ///
    /// Only acts while the phase is `Booting`; afterwards it returns the
    /// current phase without touching the network.
    pub async fn boot(&self) -> SessionPhase {
        if self.phase() != SessionPhase::Booting {
            return self.phase();
        }
        let generation = self.current_generation();

        if !prober::probe(&self.api).await {
            self.update(Some(generation), |state| {
                set_initialization(state, InitializationState::Uninitialized);
                set_phase(state, SessionPhase::Uninitialized);
            });
            return self.phase();
        }
        self.update(Some(generation), |state| {
            set_initialization(state, InitializationState::Initialized);
        });

        let persisted = match self.store.load() {
            Some(session) if session.tokens.is_complete() => session,
            Some(_) => {
                tracing::warn!("persisted session is missing a token; discarding it");
                self.discard_hydration(generation);
                return self.phase();
            }
            None => {
                self.update(Some(generation), |state| {
                    set_phase(state, SessionPhase::Anonymous);
                });
                return self.phase();
            }
        };

        match self.api.current_user(&persisted.tokens.access_token).await {
            Ok(user) => {
                warn_if_unrecognized(&user);
                let session = persisted.with_user(user);
                let age = session.elapsed_minutes(Utc::now());
                let store = &*self.store;
                let accepted = self.update(Some(generation), |state| {
                    store.save(&session);
                    state.session = Some(session);
                    state.session_age_minutes = age;
                    set_phase(state, SessionPhase::Authenticated);
                });
                if accepted {
                    self.start_ticker();
                    tracing::info!(age_minutes = age, "restored persisted session");
                }
            }
            Err(error) => {
                tracing::warn!(%error, "persisted session failed validation; clearing it");
                self.discard_hydration(generation);
            }
        }
        self.phase()
    }

    /// Log in. `organization_slug = None` is the system-owner login.
    ///
    /// On failure the session and the credential store are left exactly as
    /// they were.
    ///
    /// # Errors
    ///
    /// `Validation` for blank input or an uninitialized system,
    /// `Authentication` when the backend refuses the credentials, `Transport`
    /// when it cannot be reached, and `Superseded` when a newer action took
    /// over while the call was in flight.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        organization_slug: Option<&str>,
    ) -> Result<User, AuthError> {
        let request = validation::login_request(email, password, organization_slug)?;
        if self.shared.state.borrow().initialization == InitializationState::Uninitialized {
            return Err(AuthError::Validation(
                "The system has not been set up yet. Complete the setup first.".into(),
            ));
        }

        let generation = self.begin_action();
        let response = self
            .api
            .login(&request)
            .await
            .map_err(AuthError::from_login_failure)?;
        if !response.tokens.is_complete() {
            return Err(AuthError::transport("login response is missing a token"));
        }

        let user = response.user.clone();
        warn_if_unrecognized(&user);
        let session = ActiveSession::new(response.tokens, response.user, Utc::now());
        let remembered = RememberedLogin {
            organization_slug: request.organization_slug,
            email: request.email,
        };
        let store = &*self.store;
        let accepted = self.update(Some(generation), |state| {
            store.save(&session);
            store.remember(&remembered);
            set_initialization(state, InitializationState::Initialized);
            state.session = Some(session);
            state.session_age_minutes = 0;
            set_phase(state, SessionPhase::Authenticated);
        });
        if !accepted {
            return Err(AuthError::Superseded);
        }

        self.start_ticker();
        tracing::info!(role = %user.role, "logged in");
        Ok(user)
    }

    /// Log in without an organization, as the system owner.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login).
    pub async fn login_system_owner(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.login(email, password, None).await
    }

    /// Revoke the refresh token if possible, then clear the local session.
    ///
    /// Never fails and is safe to call repeatedly.
    pub async fn logout(&self) {
        let generation = self.begin_action();
        self.stop_ticker();

        let tokens = self.shared.state.borrow().tokens().cloned();
        if let Some(tokens) = tokens
            && let Err(error) = self.api.logout(&tokens).await
        {
            tracing::debug!(%error, "remote logout failed; clearing local session anyway");
        }

        let store = &*self.store;
        if self.update(Some(generation), |state| clear_session(store, state)) {
            self.stop_ticker();
            tracing::info!("logged out");
        }
    }

    /// Re-fetch the current user and replace it wholesale.
    ///
    /// Tokens, login time and session age are kept.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` outside an authenticated session, including one
    /// ended while this call was in flight. `Authorization` when the backend
    /// answers 401/403; the session has then been ended. `Transport` when the
    /// backend cannot be reached or fails with any other status; state is
    /// unchanged.
    /// `Superseded` when a newer action took over during the call.
    pub async fn refresh_user_data(&self) -> Result<User, AuthError> {
        let (access_token, generation) = {
            let state = self.shared.state.borrow();
            match state.access_token() {
                Some(token) if state.is_authenticated() => {
                    (token.to_string(), self.current_generation())
                }
                _ => return Err(AuthError::NotAuthenticated),
            }
        };

        match self.api.current_user(&access_token).await {
            Ok(user) => {
                warn_if_unrecognized(&user);
                let store = &*self.store;
                let fresh = user.clone();
                let mut replaced = false;
                let accepted = self.update(Some(generation), |state| {
                    if let Some(session) = state.session.take() {
                        let session = session.with_user(fresh);
                        store.save(&session);
                        state.session = Some(session);
                        replaced = true;
                    }
                });
                match (accepted, replaced) {
                    (true, true) => Ok(user),
                    (true, false) => Err(AuthError::NotAuthenticated),
                    (false, _) => Err(AuthError::Superseded),
                }
            }
            Err(error) if error.is_unauthorized() => {
                tracing::warn!(%error, "access token rejected; ending session");
                let store = &*self.store;
                if self.update(Some(generation), |state| clear_session(store, state)) {
                    self.stop_ticker();
                    Err(AuthError::from_session_failure(error))
                } else {
                    Err(AuthError::Superseded)
                }
            }
            Err(error) => Err(AuthError::from_session_failure(error)),
        }
    }

    /// End the session because a downstream call reported the access token
    /// as invalid.
    pub fn invalidate_session(&self) {
        let generation = self.begin_action();
        let store = &*self.store;
        if self.update(Some(generation), |state| clear_session(store, state)) {
            tracing::info!("session invalidated");
        }
        self.stop_ticker();
    }

    /// Run first-run setup: create the first organization and its admin.
    ///
    /// # Errors
    ///
    /// `Validation` before any network call for an incomplete form, a short or
    /// unconfirmed password, or an already initialized system. `Bootstrap`
    /// when the backend rejects the submission; the system stays
    /// uninitialized. `Transport` when the backend cannot be reached.
    pub async fn initialize_system(
        &self,
        organization: &OrganizationPayload,
        admin: &AdminPayload,
    ) -> Result<InitializeSystemResponse, AuthError> {
        validation::bootstrap(organization, admin)?;
        if self.shared.state.borrow().initialization.is_initialized() {
            return Err(AuthError::Validation(
                "The system has already been set up.".into(),
            ));
        }

        self.begin_action();
        let response = self
            .api
            .initialize_system(organization, admin)
            .await
            .map_err(AuthError::from_bootstrap_failure)?;

        if !prober::probe(&self.api).await {
            tracing::warn!("system status still reports uninitialized after setup succeeded");
        }

        let remembered = RememberedLogin {
            organization_slug: Some(organization.slug.trim().to_string()),
            email: admin.email.trim().to_string(),
        };
        let store = &*self.store;
        // The backend accepted the setup, so this applies even if a newer
        // action has started since.
        self.update(None, |state| {
            store.remember(&remembered);
            set_initialization(state, InitializationState::Initialized);
            if matches!(state.phase, SessionPhase::Booting | SessionPhase::Uninitialized) {
                set_phase(state, SessionPhase::Anonymous);
            }
        });
        tracing::info!(organization = %organization.slug, "system initialized");
        Ok(response)
    }

    /// Stop the ticker and drop every completion still in flight.
    pub fn shutdown(&self) {
        if self.shared.alive.swap(false, Ordering::SeqCst) {
            tracing::debug!("session controller shut down");
        }
        self.begin_action();
        self.stop_ticker();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn begin_action(&self) -> u64 {
        self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Apply `change` if the controller is alive and, when given, the
    /// generation is still current. Returns whether it was applied.
    fn update<F>(&self, generation: Option<u64>, change: F) -> bool
    where
        F: FnOnce(&mut SessionSnapshot),
    {
        let shared = &self.shared;
        let mut accepted = false;
        shared.state.send_if_modified(|state| {
            let current = generation
                .is_none_or(|generation| generation == shared.generation.load(Ordering::SeqCst));
            if !shared.is_alive() || !current {
                return false;
            }
            accepted = true;
            let before = state.clone();
            change(state);
            *state != before
        });
        if !accepted {
            tracing::debug!(?generation, "dropping stale session update");
        }
        accepted
    }

    fn discard_hydration(&self, generation: u64) {
        let store = &*self.store;
        self.update(Some(generation), |state| {
            store.clear();
            state.session = None;
            set_phase(state, SessionPhase::Anonymous);
        });
    }

    /// Spawn the age ticker if the session is still authenticated.
    ///
    /// Runs after the committing update has released the state lock, so a
    /// logout may already have landed. Clearing paths stop the ticker after
    /// their update, and this check runs under the same mutex.
    fn start_ticker(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.shared.is_alive() || !self.shared.state.borrow().is_authenticated() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        ticker.start(move || shared.tick());
    }

    fn stop_ticker(&self) {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
    }
}

impl<A: AuthApi> Drop for SessionController<A> {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::SeqCst);
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
    }
}

fn set_phase(state: &mut SessionSnapshot, next: SessionPhase) {
    if let Err(error) = state.phase.ensure_transition(next) {
        tracing::warn!(%error, "unexpected session transition");
    }
    if state.phase != next {
        tracing::debug!(from = %state.phase, to = %next, "session phase changed");
    }
    state.phase = next;
}

/// Initialization only moves forward.
fn set_initialization(state: &mut SessionSnapshot, next: InitializationState) {
    if state.initialization == next {
        return;
    }
    match state.initialization.ensure_transition(next) {
        Ok(()) => state.initialization = next,
        Err(error) => tracing::debug!(%error, "ignoring initialization regression"),
    }
}

fn warn_if_unrecognized(user: &User) {
    if !user.role.is_recognized() {
        tracing::warn!(role = %user.role, "unrecognized role; showing the manager dashboard");
    }
}

fn clear_session(store: &dyn CredentialStore, state: &mut SessionSnapshot) {
    store.clear();
    state.session = None;
    state.session_age_minutes = 0;
    if matches!(state.phase, SessionPhase::Booting | SessionPhase::Authenticated) {
        set_phase(state, SessionPhase::Anonymous);
    }
}
