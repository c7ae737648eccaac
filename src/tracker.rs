use crate::config::IdentityTable;
use crate::errors::TrackerError;
use crate::models::{ScoreDraft, Session, ViewMode};
use crate::remote::Backend;
use crate::repository::ScoreRepository;
use crate::session::SessionController;
use crate::store::{Dashboard, Event, reduce};
use crate::validate::validate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

const SAVE_FAILED: &str = "Failed to save score";
const ALREADY_SAVING: &str = "A score is already being saved";

/// Owns the single dashboard and runs the remote side of every user action.
pub struct Tracker {
    sessions: SessionController,
    scores: ScoreRepository,
    state: Mutex<Dashboard>,
}

impl Tracker {
    pub fn new(backend: Arc<dyn Backend>, identities: IdentityTable) -> Self {
        Self {
            sessions: SessionController::new(Arc::clone(&backend), identities),
            scores: ScoreRepository::new(backend),
            state: Mutex::new(Dashboard::default()),
        }
    }

    pub async fn snapshot(&self) -> Dashboard {
        self.state.lock().await.clone()
    }

    async fn dispatch(&self, event: Event) -> Dashboard {
        let mut state = self.state.lock().await;
        *state = reduce(std::mem::take(&mut *state), event);
        state.clone()
    }

    /// Start-up session check; loads scores when a session is still alive.
    pub async fn restore(&self) -> Option<Session> {
        let session = self.sessions.current_session().await;
        self.dispatch(Event::SessionRestored(session.clone())).await;
        if let Some(session) = &session {
            info!(user = %session.identity.id, "restored session");
            self.refresh().await;
        }
        session
    }

    #[instrument(skip(self))]
    pub async fn login(&self, token: &str) -> Result<Session, TrackerError> {
        match self.sessions.login(token).await {
            Ok(session) => {
                self.dispatch(Event::LoggedIn(session.clone())).await;
                self.refresh().await;
                Ok(session)
            }
            Err(err) => {
                self.dispatch(Event::LoginFailed(err.to_string())).await;
                Err(err)
            }
        }
    }

    pub async fn logout(&self) {
        self.sessions.logout().await;
        self.dispatch(Event::LoggedOut).await;
    }

    /// Re-reads every record. Failures leave the previous records displayed.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        if self.state.lock().await.session.is_none() {
            return;
        }
        let generation = self.dispatch(Event::FetchIssued).await.fetch_generation;
        match self.scores.fetch_all().await {
            Ok(records) => {
                self.dispatch(Event::ScoresLoaded { generation, records }).await;
            }
            Err(err) => {
                error!("Error fetching scores: {err}");
                self.dispatch(Event::FetchFailed { generation }).await;
            }
        }
    }

    pub async fn switch_view(&self, view: ViewMode) -> Result<(), TrackerError> {
        self.require_session().await?;
        self.dispatch(Event::ViewSwitched(view)).await;
        Ok(())
    }

    pub async fn open_add(&self) -> Result<(), TrackerError> {
        let state = self.require_session().await?;
        if state.saving {
            return Err(TrackerError::Unavailable(ALREADY_SAVING));
        }
        if !state.can_add() {
            return Err(TrackerError::Unavailable(
                "Scores can only be added from your own view, up to 30 days",
            ));
        }
        self.dispatch(Event::AddOpened).await;
        Ok(())
    }

    pub async fn open_edit(&self, id: &str) -> Result<(), TrackerError> {
        let state = self.require_session().await?;
        if state.saving {
            return Err(TrackerError::Unavailable(ALREADY_SAVING));
        }
        if !state.can_edit(id) {
            return Err(TrackerError::Unavailable("Only your own scores can be edited"));
        }
        self.dispatch(Event::EditOpened(id.to_string())).await;
        Ok(())
    }

    pub async fn cancel_form(&self) {
        self.dispatch(Event::FormCancelled).await;
    }

    /// Validates and saves the open form, then re-fetches everything.
    #[instrument(skip(self, draft))]
    pub async fn submit(&self, draft: ScoreDraft) -> Result<(), TrackerError> {
        let (owner, editing, own_count) = {
            let mut state = self.state.lock().await;
            let owner = state.owner_id().ok_or(TrackerError::NotSignedIn)?.to_string();
            let form = state
                .form
                .as_ref()
                .ok_or(TrackerError::Unavailable("Open the score form first"))?;
            if state.saving {
                return Err(TrackerError::Unavailable(ALREADY_SAVING));
            }
            let editing = form.editing.clone();
            let own_count = state.my_scores.len();
            *state = reduce(std::mem::take(&mut *state), Event::SubmitStarted(draft.clone()));
            (owner, editing, own_count)
        };

        let score = match validate(&draft, own_count) {
            Ok(score) => score,
            Err(err) => {
                self.dispatch(Event::SubmitRejected(err.to_string())).await;
                return Err(err.into());
            }
        };

        let saved = match &editing {
            Some(id) => self.scores.update(id, score.fields).await,
            None => self.scores.create(&owner, score.fields, score.day).await,
        };
        if let Err(err) = saved {
            let message = match err.to_string() {
                message if message.trim().is_empty() => SAVE_FAILED.to_string(),
                message => message,
            };
            self.dispatch(Event::SubmitRejected(message)).await;
            return Err(err.into());
        }

        self.dispatch(Event::Submitted).await;
        self.refresh().await;
        Ok(())
    }

    async fn require_session(&self) -> Result<Dashboard, TrackerError> {
        let state = self.snapshot().await;
        if state.session.is_none() {
            return Err(TrackerError::NotSignedIn);
        }
        Ok(state)
    }
}
