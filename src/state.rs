use crate::config::IdentityTable;
use crate::remote::Backend;
use crate::tracker::Tracker;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, identities: IdentityTable) -> Self {
        Self {
            tracker: Arc::new(Tracker::new(backend, identities)),
        }
    }
}
