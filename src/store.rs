//! Dashboard state and the reducer that advances it.
//!
//! Every change goes through [`reduce`]: an event in, a new snapshot out.
//! Remote effects live in [`crate::tracker`], which dispatches their outcomes here.

use crate::models::{AggregateStats, CHALLENGE_DAYS, ScoreDraft, ScoreRecord, Session, ViewMode};
use crate::repository::partition;
use crate::stats::aggregate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct EntryForm {
    pub draft: ScoreDraft,
    pub editing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Dashboard {
    pub session: Option<Session>,
    pub my_scores: Vec<ScoreRecord>,
    pub friend_scores: Vec<ScoreRecord>,
    pub my_stats: AggregateStats,
    pub friend_stats: AggregateStats,
    pub view: ViewMode,
    pub form: Option<EntryForm>,
    pub error: Option<String>,
    /// A create or update is in flight. Lives outside the form so that
    /// closing the form cannot release it.
    pub saving: bool,
    /// Generation of the most recently issued fetch.
    pub fetch_generation: u64,
}

#[derive(Debug, Clone)]
pub enum Event {
    SessionRestored(Option<Session>),
    LoginFailed(String),
    LoggedIn(Session),
    LoggedOut,
    FetchIssued,
    ScoresLoaded { generation: u64, records: Vec<ScoreRecord> },
    FetchFailed { generation: u64 },
    ViewSwitched(ViewMode),
    AddOpened,
    EditOpened(String),
    FormCancelled,
    SubmitStarted(ScoreDraft),
    SubmitRejected(String),
    Submitted,
}

impl Dashboard {
    pub fn can_add(&self) -> bool {
        self.session.is_some()
            && self.view == ViewMode::Own
            && self.my_scores.len() < CHALLENGE_DAYS
    }

    pub fn can_edit(&self, id: &str) -> bool {
        self.session.is_some()
            && self.view == ViewMode::Own
            && self.my_scores.iter().any(|r| r.id == id)
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.identity.id.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        self.saving
    }

    fn signed_out(fetch_generation: u64) -> Self {
        // The counter survives sign-out so fetches issued before it stay stale.
        Self {
            fetch_generation,
            ..Self::default()
        }
    }
}

pub fn reduce(state: Dashboard, event: Event) -> Dashboard {
    match event {
        Event::SessionRestored(session) => Dashboard {
            session,
            ..Dashboard::signed_out(state.fetch_generation)
        },
        Event::LoginFailed(message) => Dashboard {
            error: Some(message),
            ..state
        },
        Event::LoggedIn(session) => Dashboard {
            session: Some(session),
            ..Dashboard::signed_out(state.fetch_generation)
        },
        Event::LoggedOut => Dashboard::signed_out(state.fetch_generation),
        Event::FetchIssued => Dashboard {
            fetch_generation: state.fetch_generation + 1,
            ..state
        },
        Event::ScoresLoaded { generation, records } => {
            if generation != state.fetch_generation {
                return state;
            }
            let Some(owner) = state.owner_id().map(str::to_string) else {
                return state;
            };
            let split = partition(records, &owner);
            Dashboard {
                my_stats: aggregate(&split.mine),
                friend_stats: aggregate(&split.friend),
                my_scores: split.mine,
                friend_scores: split.friend,
                ..state
            }
        }
        // Stale data stays on screen.
        Event::FetchFailed { .. } => state,
        Event::ViewSwitched(view) => Dashboard { view, ..state },
        Event::AddOpened => {
            if !state.can_add() || state.is_submitting() {
                return state;
            }
            Dashboard {
                form: Some(EntryForm::default()),
                error: None,
                ..state
            }
        }
        Event::EditOpened(id) => {
            if !state.can_edit(&id) || state.is_submitting() {
                return state;
            }
            let draft = state
                .my_scores
                .iter()
                .find(|r| r.id == id)
                .map(ScoreDraft::from_record)
                .unwrap_or_default();
            Dashboard {
                form: Some(EntryForm {
                    draft,
                    editing: Some(id),
                }),
                error: None,
                ..state
            }
        }
        Event::FormCancelled => {
            if state.is_submitting() {
                return state;
            }
            Dashboard {
                form: None,
                error: None,
                ..state
            }
        }
        Event::SubmitStarted(draft) => {
            let Some(form) = state.form.clone() else {
                return state;
            };
            Dashboard {
                form: Some(EntryForm { draft, ..form }),
                saving: true,
                error: None,
                ..state
            }
        }
        Event::SubmitRejected(message) => Dashboard {
            saving: false,
            error: Some(message),
            ..state
        },
        Event::Submitted => Dashboard {
            form: None,
            saving: false,
            error: None,
            ..state
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;
    use chrono::{Duration, TimeZone, Utc};

    fn session(id: &str) -> Session {
        Session {
            identity: Identity {
                id: id.to_string(),
                name: "Kumush".to_string(),
                email: "k@x.io".to_string(),
            },
            friend_name: "Ezoza".to_string(),
        }
    }

    fn record(id: &str, owner: &str, listening: u8, writing: f64) -> ScoreRecord {
        ScoreRecord {
            id: id.to_string(),
            owner_id: owner.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(listening.into()),
            listening,
            reading: 20,
            writing,
            day: 1,
        }
    }

    fn loaded(records: Vec<ScoreRecord>) -> Dashboard {
        let state = reduce(Dashboard::default(), Event::LoggedIn(session("me")));
        let state = reduce(state, Event::FetchIssued);
        let generation = state.fetch_generation;
        reduce(state, Event::ScoresLoaded { generation, records })
    }

    #[test]
    fn loaded_scores_are_split_and_aggregated() {
        let state = loaded(vec![
            record("1", "me", 30, 7.0),
            record("2", "friend", 10, 0.0),
            record("3", "me", 20, 0.0),
        ]);
        assert_eq!(state.my_scores.len(), 2);
        assert_eq!(state.friend_scores.len(), 1);
        assert_eq!(state.my_stats.avg_listening, 25.0);
        assert_eq!(state.my_stats.avg_writing, 7.0);
        assert_eq!(state.friend_stats.total, 1);
    }

    #[test]
    fn stale_fetch_results_are_discarded() {
        let state = reduce(Dashboard::default(), Event::LoggedIn(session("me")));
        let state = reduce(state, Event::FetchIssued);
        let old = state.fetch_generation;
        let state = reduce(state, Event::FetchIssued);
        let new = state.fetch_generation;

        let state = reduce(
            state,
            Event::ScoresLoaded {
                generation: new,
                records: vec![record("1", "me", 30, 0.0), record("2", "me", 31, 0.0)],
            },
        );
        let state = reduce(
            state,
            Event::ScoresLoaded {
                generation: old,
                records: vec![],
            },
        );
        assert_eq!(state.my_scores.len(), 2);
    }

    #[test]
    fn results_arriving_after_logout_are_dropped() {
        let state = reduce(Dashboard::default(), Event::LoggedIn(session("me")));
        let state = reduce(state, Event::FetchIssued);
        let generation = state.fetch_generation;
        let state = reduce(state, Event::LoggedOut);
        let state = reduce(
            state,
            Event::ScoresLoaded {
                generation,
                records: vec![record("1", "me", 30, 0.0)],
            },
        );
        assert!(state.session.is_none());
        assert!(state.my_scores.is_empty());
        assert_eq!(state.fetch_generation, generation);
    }

    #[test]
    fn failed_fetch_keeps_previous_scores() {
        let state = loaded(vec![record("1", "me", 30, 0.0)]);
        let state = reduce(state, Event::FetchIssued);
        let generation = state.fetch_generation;
        let state = reduce(state, Event::FetchFailed { generation });
        assert_eq!(state.my_scores.len(), 1);
    }

    #[test]
    fn switching_views_keeps_data() {
        let before = loaded(vec![record("1", "me", 30, 0.0), record("2", "friend", 12, 0.0)]);
        let after = reduce(before.clone(), Event::ViewSwitched(ViewMode::Compare));
        assert_eq!(after.view, ViewMode::Compare);
        assert_eq!(after.my_scores, before.my_scores);
        assert_eq!(after.friend_stats, before.friend_stats);
        assert_eq!(after.fetch_generation, before.fetch_generation);
    }

    #[test]
    fn add_is_only_offered_in_own_view_below_thirty() {
        let state = loaded(vec![record("1", "me", 30, 0.0)]);
        assert!(state.can_add());

        let friend_view = reduce(state.clone(), Event::ViewSwitched(ViewMode::Friend));
        assert!(!friend_view.can_add());
        assert!(reduce(friend_view, Event::AddOpened).form.is_none());

        let full: Vec<_> = (0..CHALLENGE_DAYS as u8)
            .map(|i| record(&i.to_string(), "me", i, 0.0))
            .collect();
        let state = loaded(full);
        assert!(!state.can_add());
        assert!(reduce(state, Event::AddOpened).form.is_none());
    }

    #[test]
    fn edit_prefills_draft_and_add_resets_it() {
        let state = loaded(vec![record("1", "me", 30, 6.5), record("2", "friend", 12, 0.0)]);

        let editing = reduce(state.clone(), Event::EditOpened("1".to_string()));
        let form = editing.form.clone().unwrap();
        assert_eq!(form.editing.as_deref(), Some("1"));
        assert_eq!(form.draft.listening, "30");
        assert_eq!(form.draft.writing, "6.5");

        let adding = reduce(editing, Event::AddOpened);
        assert_eq!(adding.form, Some(EntryForm::default()));

        // Friend's records are not editable.
        assert!(reduce(state, Event::EditOpened("2".to_string())).form.is_none());
    }

    #[test]
    fn rejected_submit_keeps_form_open_with_draft() {
        let state = reduce(loaded(vec![]), Event::AddOpened);
        let draft = ScoreDraft {
            listening: "41".to_string(),
            reading: "20".to_string(),
            writing: String::new(),
        };
        let state = reduce(state, Event::SubmitStarted(draft.clone()));
        assert!(state.is_submitting());

        let state = reduce(state, Event::SubmitRejected("out of range".to_string()));
        assert!(!state.saving);
        let form = state.form.clone().unwrap();
        assert_eq!(form.draft, draft);
        assert_eq!(state.error.as_deref(), Some("out of range"));

        let state = reduce(state, Event::Submitted);
        assert!(state.form.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn form_stays_locked_while_saving() {
        let state = loaded(vec![record("1", "me", 30, 0.0)]);
        let state = reduce(state, Event::AddOpened);
        let state = reduce(state, Event::SubmitStarted(ScoreDraft::default()));

        let state = reduce(state, Event::FormCancelled);
        assert!(state.form.is_some());
        assert!(state.saving);

        let state = reduce(state, Event::EditOpened("1".to_string()));
        assert_eq!(state.form.as_ref().unwrap().editing, None);
        let state = reduce(state, Event::AddOpened);
        assert!(state.saving);

        let state = reduce(state, Event::Submitted);
        assert!(!state.saving);
        assert!(state.form.is_none());
        assert!(reduce(state, Event::AddOpened).form.is_some());
    }

    #[test]
    fn logout_clears_everything() {
        let state = loaded(vec![record("1", "me", 30, 0.0)]);
        let state = reduce(state, Event::ViewSwitched(ViewMode::Friend));
        let state = reduce(state, Event::LoggedOut);
        assert!(state.session.is_none());
        assert!(state.my_scores.is_empty());
        assert_eq!(state.view, ViewMode::Own);
    }
}
