use super::query::ObservedQuery;
use super::state::SessionStatus;
use super::state::TabId;

#[derive(Debug, Clone)]
pub enum NavAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    SelectTab(TabId),
    /// `None` exits the current space. The id is raw user input and is
    /// validated by the reducer.
    SelectSpace(Option<String>),
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    ObserveUrl(ObservedQuery),
    SessionChanged(SessionStatus),
}

impl NavAction {
    pub fn select_tab(tab: TabId) -> Self {
        Self::User(UserAction::SelectTab(tab))
    }

    pub fn select_space(space: impl Into<String>) -> Self {
        Self::User(UserAction::SelectSpace(Some(space.into())))
    }

    pub fn exit_space() -> Self {
        Self::User(UserAction::SelectSpace(None))
    }

    pub fn observe(url: &str) -> Self {
        Self::Runtime(RuntimeAction::ObserveUrl(ObservedQuery::parse(url)))
    }

    pub fn session(status: SessionStatus) -> Self {
        Self::Runtime(RuntimeAction::SessionChanged(status))
    }
}
