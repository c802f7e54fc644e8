//! Responsive layout selection.
//!
//! The viewport width picks one of three layouts:
//! - desktop: parent, current and children panes side by side
//! - tablet: current and children; the parent is reachable through the breadcrumb
//! - mobile: one pane at a time, chosen by the active tab
//!
//! Resize events arrive in bursts, so widths go through a [`ResizeDebouncer`]
//! before they reach the [`LayoutSelector`].

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::navigation::{HierarchyViewState, Route};

/// Widest viewport, in pixels, still classified as mobile.
pub const MOBILE_MAX_WIDTH: u32 = 767;

/// Widest viewport, in pixels, still classified as tablet.
pub const TABLET_MAX_WIDTH: u32 = 1023;

/// Default resize coalescing window
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Viewport class derived from width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    Mobile,
    Tablet,
    Desktop,
}

impl ViewportClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewportClass::Mobile => "mobile",
            ViewportClass::Tablet => "tablet",
            ViewportClass::Desktop => "desktop",
        }
    }
}

impl fmt::Display for ViewportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a viewport width in pixels.
pub fn classify(width: u32) -> ViewportClass {
    if width <= MOBILE_MAX_WIDTH {
        ViewportClass::Mobile
    } else if width <= TABLET_MAX_WIDTH {
        ViewportClass::Tablet
    } else {
        ViewportClass::Desktop
    }
}

/// One of the three display regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    Parent,
    Current,
    Children,
}

impl Pane {
    pub fn label(&self) -> &'static str {
        match self {
            Pane::Parent => "Parent",
            Pane::Current => "Current",
            Pane::Children => "Children",
        }
    }
}

/// Shown in place of pane content when the hierarchy has nothing there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    /// The current type has no parent type
    TopLevel,
    /// The current type has no child type
    NoChildren,
}

impl Placeholder {
    pub fn text(&self) -> &'static str {
        match self {
            Placeholder::TopLevel => "Top level",
            Placeholder::NoChildren => "No children",
        }
    }
}

/// A pane to render, with its placeholder if it has no content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaneSlot {
    pub pane: Pane,
    pub placeholder: Option<Placeholder>,
}

/// What to render for the current viewport and view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub class: ViewportClass,
    /// Panes in left-to-right order
    pub panes: Vec<PaneSlot>,
    /// Tab bar entries (mobile only)
    pub tabs: Vec<Pane>,
    /// Selected tab (mobile only)
    pub active_tab: Option<Pane>,
}

/// Tracks viewport class and the mobile tab selection.
#[derive(Debug, Clone)]
pub struct LayoutSelector {
    class: ViewportClass,
    active_tab: Pane,
    /// Route the tab selection belongs to
    observed: Option<Route>,
}

impl LayoutSelector {
    pub fn new(width: u32) -> Self {
        Self {
            class: classify(width),
            active_tab: Pane::Current,
            observed: None,
        }
    }

    pub fn class(&self) -> ViewportClass {
        self.class
    }

    pub fn active_tab(&self) -> Pane {
        self.active_tab
    }

    /// Apply a (debounced) viewport width. Returns true if the class changed.
    pub fn on_resize(&mut self, width: u32) -> bool {
        let class = classify(width);
        if class == self.class {
            return false;
        }
        tracing::debug!(width, from = %self.class, to = %class, "viewport class changed");
        self.class = class;
        true
    }

    /// Note the route whose state is displayed. A different route resets the
    /// active tab to the current entity.
    pub fn observe_route(&mut self, route: Option<&Route>) {
        if self.observed.as_ref() != route {
            self.observed = route.cloned();
            self.active_tab = Pane::Current;
        }
    }

    /// Select a mobile tab if it is visible for `state`. Returns true on change.
    pub fn select_tab(&mut self, pane: Pane, state: &HierarchyViewState) -> bool {
        if !visible_tabs(state).contains(&pane) || self.active_tab == pane {
            return false;
        }
        self.active_tab = pane;
        true
    }

    /// Cycle to the next visible mobile tab.
    pub fn next_tab(&mut self, state: &HierarchyViewState) {
        let tabs = visible_tabs(state);
        let index = tabs.iter().position(|&t| t == self.active_tab).unwrap_or(0);
        self.active_tab = tabs[(index + 1) % tabs.len()];
    }

    /// Decide which panes to render.
    pub fn plan(&self, state: &HierarchyViewState) -> LayoutPlan {
        let parent = PaneSlot {
            pane: Pane::Parent,
            placeholder: state.parent_type().is_none().then_some(Placeholder::TopLevel),
        };
        let current = PaneSlot {
            pane: Pane::Current,
            placeholder: None,
        };
        let children = PaneSlot {
            pane: Pane::Children,
            placeholder: state.child_type().is_none().then_some(Placeholder::NoChildren),
        };

        match self.class {
            ViewportClass::Desktop => LayoutPlan {
                class: self.class,
                panes: vec![parent, current, children],
                tabs: Vec::new(),
                active_tab: None,
            },
            ViewportClass::Tablet => LayoutPlan {
                class: self.class,
                panes: vec![current, children],
                tabs: Vec::new(),
                active_tab: None,
            },
            ViewportClass::Mobile => {
                let tabs = visible_tabs(state);
                let active = if tabs.contains(&self.active_tab) {
                    self.active_tab
                } else {
                    Pane::Current
                };
                let slot = match active {
                    Pane::Parent => parent,
                    Pane::Current => current,
                    Pane::Children => children,
                };
                LayoutPlan {
                    class: self.class,
                    panes: vec![slot],
                    tabs,
                    active_tab: Some(active),
                }
            }
        }
    }
}

/// Mobile tabs: parent and children only appear when there is data for them.
fn visible_tabs(state: &HierarchyViewState) -> Vec<Pane> {
    let mut tabs = Vec::with_capacity(3);
    if state.parent_entity().is_some() {
        tabs.push(Pane::Parent);
    }
    tabs.push(Pane::Current);
    if !state.child_entities().is_empty() {
        tabs.push(Pane::Children);
    }
    tabs
}

/// Coalesces bursts of resize events into the last width of the burst.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    window: Duration,
    pending: Option<(u32, Instant)>,
}

impl ResizeDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a resize. Later events in the same burst replace earlier ones.
    pub fn push(&mut self, width: u32, now: Instant) {
        self.pending = Some((width, now));
    }

    /// Width to apply, once no resize has arrived for the whole window.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        match self.pending {
            Some((width, at)) if now.duration_since(at) >= self.window => {
                self.pending = None;
                Some(width)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE)
    }
}
