use std::fs;
use std::path::Path;

use parrot_nav_core::check_invariants;
use parrot_nav_core::journal_events;
use parrot_nav_core::NavAction;
use parrot_nav_core::NavConfig;
use parrot_nav_core::NavEffect;
use parrot_nav_core::NavJournal;
use parrot_nav_core::NavigationMode;
use parrot_nav_core::Session;
use parrot_nav_core::SessionStatus;
use parrot_nav_core::SpaceId;
use parrot_nav_core::TabId;
use parrot_nav_router::MemoryRouter;
use parrot_nav_router::NavigationDriver;
use parrot_nav_router::Router;
use parrot_nav_router::RouterOp;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub session: Session,
    /// URL the dashboard is loaded on before the session resolves.
    #[serde(default)]
    pub start_url: Option<String>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStep {
    Open(String),
    Tab(TabId),
    Space(String),
    ExitSpace,
    Back,
    Forward,
    SignIn(Session),
    SignOut,
}

impl ScenarioStep {
    fn label(&self) -> String {
        match self {
            Self::Open(url) => format!("open {url}"),
            Self::Tab(tab) => format!("tab {tab}"),
            Self::Space(space) => format!("space {space}"),
            Self::ExitSpace => "exit space".to_string(),
            Self::Back => "back".to_string(),
            Self::Forward => "forward".to_string(),
            Self::SignIn(session) => format!("sign in {} ({})", session.user_id, session.role),
            Self::SignOut => "sign out".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationReport {
    pub mode: NavigationMode,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: String,
    pub navigations: Vec<NavigationReport>,
    /// Router history operations performed during the step, back and
    /// forward included.
    pub router: Vec<RouterOp>,
    pub signed_out: bool,
    pub tab: TabId,
    pub space: Option<SpaceId>,
    pub url: Option<String>,
}

pub fn load_scenario(path: &Path) -> Result<Scenario, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("failed to read scenario {}: {err}", path.display()))?;
    let scenario = serde_yaml::from_str(&text)
        .map_err(|err| format!("invalid scenario {}: {err}", path.display()))?;
    Ok(scenario)
}

/// Plays `scenario` through a driver over an in-memory router, checking the
/// navigation invariants after every step.
pub fn run_scenario(
    config: &NavConfig,
    scenario: &Scenario,
    mut journal: Option<&mut NavJournal>,
) -> Result<Vec<StepReport>, Box<dyn std::error::Error>> {
    let router = match scenario.start_url.as_deref() {
        Some(url) => MemoryRouter::at(url),
        None => MemoryRouter::new(),
    };
    let mut driver = NavigationDriver::from_config(config, router);

    let first = ScenarioStep::SignIn(scenario.session.clone());
    let mut reports = Vec::with_capacity(scenario.steps.len() + 1);
    for step in std::iter::once(&first).chain(scenario.steps.iter()) {
        let before = driver.state().nav.clone();
        let ops_before = driver.router().ops().len();
        let effects = match step {
            ScenarioStep::Open(url) => driver.open(url)?,
            ScenarioStep::Tab(tab) => driver.dispatch(NavAction::select_tab(*tab))?,
            ScenarioStep::Space(space) => driver.dispatch(NavAction::select_space(space.as_str()))?,
            ScenarioStep::ExitSpace => driver.dispatch(NavAction::exit_space())?,
            ScenarioStep::Back => driver.back()?,
            ScenarioStep::Forward => driver.forward()?,
            ScenarioStep::SignIn(session) => driver.dispatch(NavAction::session(
                SessionStatus::Authenticated(session.clone()),
            ))?,
            ScenarioStep::SignOut => {
                driver.dispatch(NavAction::session(SessionStatus::Unauthenticated))?
            }
        };

        if let Some(journal) = journal.as_deref_mut() {
            for event in journal_events(&before, driver.state(), &effects) {
                journal.append(event)?;
            }
        }
        if driver.state().session().is_some() {
            check_invariants(driver.state())
                .map_err(|err| format!("after step {:?}: {err}", step.label()))?;
        }
        reports.push(step_report(step, &driver, &effects, ops_before));
    }
    Ok(reports)
}

fn step_report(
    step: &ScenarioStep,
    driver: &NavigationDriver<MemoryRouter>,
    effects: &[NavEffect],
    ops_before: usize,
) -> StepReport {
    let view = driver.state().view();
    StepReport {
        step: step.label(),
        navigations: effects
            .iter()
            .filter_map(|effect| match effect {
                NavEffect::Navigate { mode, url, .. } => Some(NavigationReport {
                    mode: *mode,
                    url: url.clone(),
                }),
                NavEffect::RedirectToSignIn => None,
            })
            .collect(),
        router: driver.router().ops()[ops_before..].to_vec(),
        signed_out: effects.contains(&NavEffect::RedirectToSignIn),
        tab: view.active_tab,
        space: view.space.cloned(),
        url: driver.router().current().map(str::to_string),
    }
}
