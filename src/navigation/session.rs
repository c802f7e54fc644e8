//! Navigation session: the watched route, its load status and the view state.
//!
//! Every resolution is identified by a [`Ticket`] carrying a monotonically
//! increasing sequence number. Only the ticket issued last may update the view
//! state; responses for superseded tickets are discarded, whichever order they
//! arrive in.

use serde::Serialize;

use crate::models::{Entity, EntityContext};
use crate::{Error, ErrorKind};

use super::route::Route;
use super::state::HierarchyViewState;

/// Handle for one outstanding resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    route: Route,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn route(&self) -> &Route {
        &self.route
    }
}

/// Payload of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Context(EntityContext),
    TopLevel(Vec<Entity>),
}

/// Something the user can do from an error screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    GoBack,
    Retry,
    GoTopLevel,
    Reauthenticate,
}

impl RecoveryAction {
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryAction::GoBack => "go back",
            RecoveryAction::Retry => "retry",
            RecoveryAction::GoTopLevel => "go to top level",
            RecoveryAction::Reauthenticate => "sign in again",
        }
    }
}

/// A failed resolution, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub kind: ErrorKind,
    pub message: String,
    /// The route whose resolution failed
    pub route: Route,
    pub actions: Vec<RecoveryAction>,
}

impl ErrorView {
    pub fn new(error: &Error, route: Route, can_go_back: bool) -> Self {
        let kind = error.kind();
        let mut actions = Vec::new();
        if can_go_back {
            actions.push(RecoveryAction::GoBack);
        }
        match kind {
            ErrorKind::Authentication => actions.push(RecoveryAction::Reauthenticate),
            ErrorKind::Network | ErrorKind::Server | ErrorKind::Other => {
                actions.push(RecoveryAction::Retry)
            }
            ErrorKind::Validation | ErrorKind::NotFound => {}
        }
        if route != Route::TopLevel {
            actions.push(RecoveryAction::GoTopLevel);
        }
        Self {
            kind,
            message: error.to_string(),
            route,
            actions,
        }
    }

    pub fn offers(&self, action: RecoveryAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Load status of the watched route.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading(Ticket),
    Ready,
    /// The last resolution failed; the view state still holds the previous one
    Failed(ErrorView),
}

/// What [`NavigationSession::apply`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Superseded by a newer ticket and discarded
    Stale,
    Failed,
}

/// Owns the route being watched and everything derived from resolving it.
#[derive(Debug, Default)]
pub struct NavigationSession {
    route: Option<Route>,
    history: Vec<Route>,
    state: HierarchyViewState,
    status: LoadStatus,
    last_seq: u64,
}

impl NavigationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn state(&self) -> &HierarchyViewState {
        &self.state
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn error(&self) -> Option<&ErrorView> {
        match &self.status {
            LoadStatus::Failed(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, LoadStatus::Loading(_))
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Watch `route`, returning a ticket when it needs resolving.
    ///
    /// Re-navigating to the route already loaded (or loading) is a no-op.
    pub fn navigate(&mut self, route: Route) -> Option<Ticket> {
        if self.route.as_ref() == Some(&route)
            && matches!(self.status, LoadStatus::Ready | LoadStatus::Loading(_))
        {
            return None;
        }
        if let Some(previous) = self.route.replace(route.clone()) {
            if previous != route {
                self.history.push(previous);
            }
        }
        Some(self.issue(route))
    }

    /// Resolve the current route again.
    pub fn retry(&mut self) -> Option<Ticket> {
        let route = self.route.clone()?;
        Some(self.issue(route))
    }

    /// Return to the previously watched route.
    pub fn go_back(&mut self) -> Option<Ticket> {
        let route = self.history.pop()?;
        self.route = Some(route.clone());
        Some(self.issue(route))
    }

    pub fn go_top_level(&mut self) -> Option<Ticket> {
        self.navigate(Route::TopLevel)
    }

    fn issue(&mut self, route: Route) -> Ticket {
        self.last_seq += 1;
        let ticket = Ticket {
            seq: self.last_seq,
            route,
        };
        tracing::debug!(seq = ticket.seq, route = %ticket.route, "resolution requested");
        self.status = LoadStatus::Loading(ticket.clone());
        ticket
    }

    /// Apply the outcome of a resolution.
    ///
    /// Only the most recently issued ticket is applied. On failure the view
    /// state is left untouched and the error is recorded in the status.
    pub fn apply(&mut self, ticket: &Ticket, result: crate::Result<Resolution>) -> ApplyOutcome {
        match &self.status {
            LoadStatus::Loading(outstanding) if outstanding.seq == ticket.seq => {}
            _ => {
                tracing::debug!(
                    seq = ticket.seq,
                    route = %ticket.route,
                    "discarding superseded resolution"
                );
                return ApplyOutcome::Stale;
            }
        }

        match result {
            Ok(Resolution::Context(context)) => {
                self.state.apply_context(context);
                self.status = LoadStatus::Ready;
                ApplyOutcome::Applied
            }
            Ok(Resolution::TopLevel(roots)) => {
                self.state.apply_top_level(roots);
                self.status = LoadStatus::Ready;
                ApplyOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(
                    route = %ticket.route,
                    kind = %err.kind(),
                    "resolution failed: {}",
                    err
                );
                let view = ErrorView::new(&err, ticket.route.clone(), self.can_go_back());
                self.status = LoadStatus::Failed(view);
                ApplyOutcome::Failed
            }
        }
    }
}
