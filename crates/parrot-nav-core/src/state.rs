use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::config::NavConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabId {
    Spaces,
    Dashboard,
    UserDashboard,
    Projects,
    Forms,
    Services,
    Documents,
    Admin,
    Companies,
    CompanyCalendars,
    ProjectOverview,
    Debug,
    Reports,
    Settings,
    UserSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabClass {
    AdminOnly,
    SpaceRequired,
    Personal,
    SpaceOptional,
}

impl TabId {
    pub const ALL: [TabId; 15] = [
        TabId::Spaces,
        TabId::Dashboard,
        TabId::UserDashboard,
        TabId::Projects,
        TabId::Forms,
        TabId::Services,
        TabId::Documents,
        TabId::Admin,
        TabId::Companies,
        TabId::CompanyCalendars,
        TabId::ProjectOverview,
        TabId::Debug,
        TabId::Reports,
        TabId::Settings,
        TabId::UserSettings,
    ];

    /// The one place tab classes are defined; every policy consults this.
    pub fn class(self) -> TabClass {
        match self {
            Self::Spaces | Self::Admin | Self::Companies | Self::ProjectOverview | Self::Debug => {
                TabClass::AdminOnly
            }
            Self::Dashboard
            | Self::Projects
            | Self::Services
            | Self::CompanyCalendars
            | Self::Documents
            | Self::Settings => TabClass::SpaceRequired,
            Self::UserDashboard | Self::UserSettings => TabClass::Personal,
            Self::Reports | Self::Forms => TabClass::SpaceOptional,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spaces => "spaces",
            Self::Dashboard => "dashboard",
            Self::UserDashboard => "user-dashboard",
            Self::Projects => "projects",
            Self::Forms => "forms",
            Self::Services => "services",
            Self::Documents => "documents",
            Self::Admin => "admin",
            Self::Companies => "companies",
            Self::CompanyCalendars => "company-calendars",
            Self::ProjectOverview => "project-overview",
            Self::Debug => "debug",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::UserSettings => "user-settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Spaces => "Spaces",
            Self::Dashboard => "Dashboard",
            Self::UserDashboard => "My Dashboard",
            Self::Projects => "Projects",
            Self::Forms => "Forms",
            Self::Services => "Services",
            Self::Documents => "Documents",
            Self::Admin => "Users",
            Self::Companies => "Companies",
            Self::CompanyCalendars => "Calendars",
            Self::ProjectOverview => "Project Overview",
            Self::Debug => "Debug",
            Self::Reports => "Reports",
            Self::Settings => "Space Settings",
            Self::UserSettings => "My Settings",
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab: {0:?}")]
pub struct TabParseError(pub String);

impl FromStr for TabId {
    type Err = TabParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        TabId::ALL
            .into_iter()
            .find(|tab| tab.as_str() == input)
            .ok_or_else(|| TabParseError(input.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    User,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleParseError {
    #[error("role {0:?} is not handled by dashboard navigation")]
    Unsupported(String),
    #[error("unknown role: {0:?}")]
    Unknown(String),
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
            Self::Internal => "internal",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Admins and managers may work inside arbitrary spaces; everyone else
    /// lands on their personal dashboard by default.
    pub fn has_space_access(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    pub fn can_access(self, tab: TabId, space: Option<&SpaceId>) -> bool {
        if tab.class() != TabClass::AdminOnly {
            return true;
        }
        match self {
            Self::Admin => true,
            // Space-scoped user management only.
            Self::Manager => tab == TabId::Admin && space.is_some(),
            Self::User | Self::Internal => false,
        }
    }

    /// Landing tab when the URL names none.
    pub fn default_tab(self, has_space: bool) -> TabId {
        if has_space {
            return TabId::Dashboard;
        }
        if self.is_admin() {
            TabId::Spaces
        } else {
            TabId::UserDashboard
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "user" => Ok(Self::User),
            "internal" => Ok(Self::Internal),
            "system_admin" => Err(RoleParseError::Unsupported(input.to_string())),
            other => Err(RoleParseError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpaceId(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpaceIdError {
    #[error("space id must not be empty")]
    Empty,
}

impl SpaceId {
    pub fn parse(raw: &str) -> Result<Self, SpaceIdError> {
        if raw.trim().is_empty() {
            return Err(SpaceIdError::Empty);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SpaceId {
    type Error = SpaceIdError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw.trim().is_empty() {
            return Err(SpaceIdError::Empty);
        }
        Ok(Self(raw))
    }
}

impl From<SpaceId> for String {
    fn from(id: SpaceId) -> Self {
        id.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<SpaceId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub active_tab: TabId,
    pub current_space_id: Option<SpaceId>,
    /// Legacy mirror of `current_space_id`.
    pub selected_company: Option<SpaceId>,
}

impl NavigationState {
    pub fn scoped(tab: TabId, space: Option<SpaceId>) -> Self {
        Self {
            active_tab: tab,
            selected_company: space.clone(),
            current_space_id: space,
        }
    }

    pub fn projection(&self) -> UrlProjection {
        UrlProjection {
            tab: self.active_tab,
            space: self.current_space_id.clone(),
        }
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::scoped(TabId::UserDashboard, None)
    }
}

/// The `(tab, space)` pair a URL encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlProjection {
    pub tab: TabId,
    pub space: Option<SpaceId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    Push,
    Replace,
}

impl NavigationMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingIntent {
    pub generation: u64,
    pub projection: UrlProjection,
}

/// Projections committed by the reducer that the router has not echoed yet.
#[derive(Debug, Clone)]
pub struct IntentQueue {
    cap: usize,
    items: VecDeque<PendingIntent>,
}

impl IntentQueue {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            items: VecDeque::with_capacity(cap),
        }
    }

    pub fn record(&mut self, intent: PendingIntent) {
        if self.items.len() == self.cap {
            self.items.pop_front();
        }
        self.items.push_back(intent);
    }

    /// Drains every intent up to and including the oldest one matching
    /// `observed`, returning its generation. Echoes arrive in commit order,
    /// so anything older was skipped by the router.
    pub fn take_echo(&mut self, observed: &UrlProjection) -> Option<u64> {
        let idx = self
            .items
            .iter()
            .position(|intent| &intent.projection == observed)?;
        let generation = self.items[idx].generation;
        self.items.drain(..=idx);
        Some(generation)
    }

    pub fn newest(&self) -> Option<&PendingIntent> {
        self.items.back()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    User,
    Url,
    Session,
}

impl LogSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Url => "url",
            Self::Session => "session",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub source: LogSource,
    pub context: Option<String>,
    pub message: String,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        if self.cap == 0 {
            return;
        }
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.buf.back()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavSettings {
    pub legacy_company_param: bool,
    pub max_pending_intents: usize,
    pub log_capacity: usize,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            legacy_company_param: false,
            max_pending_intents: 8,
            log_capacity: 500,
        }
    }
}

impl From<&NavConfig> for NavSettings {
    fn from(config: &NavConfig) -> Self {
        Self {
            legacy_company_param: config.router.legacy_company_param,
            max_pending_intents: config.intents.max_pending,
            log_capacity: config.log.buffer_capacity,
        }
    }
}

/// What tab-content components read: always a consistent pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavView<'a> {
    pub active_tab: TabId,
    pub space: Option<&'a SpaceId>,
}

#[derive(Debug, Clone)]
pub struct NavState {
    pub session: SessionStatus,
    pub nav: NavigationState,
    /// Last URL projection the router shows, observed or pushed.
    pub location: Option<UrlProjection>,
    pub generation: u64,
    pub intents: IntentQueue,
    pub logs: LogBuffer,
    pub settings: NavSettings,
}

impl NavState {
    pub fn new(settings: NavSettings) -> Self {
        Self {
            session: SessionStatus::Loading,
            nav: NavigationState::default(),
            location: None,
            generation: 0,
            intents: IntentQueue::new(settings.max_pending_intents),
            logs: LogBuffer::new(settings.log_capacity),
            settings,
        }
    }

    pub fn with_session(session: Session) -> Self {
        let mut state = Self::new(NavSettings::default());
        state.session = SessionStatus::Authenticated(session);
        state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.session {
            SessionStatus::Authenticated(session) => Some(session),
            SessionStatus::Loading | SessionStatus::Unauthenticated => None,
        }
    }

    pub fn view(&self) -> NavView<'_> {
        NavView {
            active_tab: self.nav.active_tab,
            space: self.nav.current_space_id.as_ref(),
        }
    }

    pub fn reset_navigation(&mut self) {
        self.nav = NavigationState::default();
        self.location = None;
        self.intents.clear();
    }

    pub fn log(
        &mut self,
        level: LogLevel,
        source: LogSource,
        context: Option<&str>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        let generation = self.generation;
        let ctx = context.unwrap_or("-");
        match level {
            LogLevel::Trace => {
                tracing::trace!(source = source.label(), context = ctx, generation, "{message}")
            }
            LogLevel::Debug => {
                tracing::debug!(source = source.label(), context = ctx, generation, "{message}")
            }
            LogLevel::Info => {
                tracing::info!(source = source.label(), context = ctx, generation, "{message}")
            }
            LogLevel::Warn => {
                tracing::warn!(source = source.label(), context = ctx, generation, "{message}")
            }
            LogLevel::Error => {
                tracing::error!(source = source.label(), context = ctx, generation, "{message}")
            }
        }
        self.logs.append(LogEntry {
            seq: 0,
            level,
            source,
            context: context.map(str::to_string),
            message,
            generation,
        });
    }
}

const SIDEBAR_ORDER: &[TabId] = &[
    TabId::UserDashboard,
    TabId::Spaces,
    TabId::Dashboard,
    TabId::Projects,
    TabId::Services,
    TabId::Documents,
    TabId::CompanyCalendars,
    TabId::Forms,
    TabId::Reports,
    TabId::Companies,
    TabId::ProjectOverview,
    TabId::Admin,
    TabId::Settings,
    TabId::Debug,
    TabId::UserSettings,
];

/// Sidebar entries for `role`, in display order.
pub fn visible_tabs(role: Role, has_space: bool) -> Vec<TabId> {
    SIDEBAR_ORDER
        .iter()
        .copied()
        .filter(|tab| match tab.class() {
            TabClass::AdminOnly => match role {
                Role::Admin => true,
                Role::Manager => *tab == TabId::Admin && has_space,
                Role::User | Role::Internal => false,
            },
            TabClass::SpaceRequired => has_space,
            TabClass::Personal => *tab == TabId::UserSettings || !role.is_admin(),
            TabClass::SpaceOptional => true,
        })
        .collect()
}
