use server_api::ApiContext;
use shared::domain::SessionState;

use crate::{sessions::SessionRegistry, views::PageChrome};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) sessions: SessionRegistry,
    pub(crate) currency_prefix: String,
}

impl AppState {
    pub(crate) fn chrome(&self, session: SessionState) -> PageChrome<'_> {
        PageChrome {
            is_admin: session.is_admin,
            view: session.view,
            currency_prefix: &self.currency_prefix,
        }
    }
}
