pub mod session;

use std::time::Duration;

pub use session::{SessionClock, SessionDisplay};

pub const LANDING_PAGE: &str = "landingpage.html";
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalEvent {
    Open,
    OpenEdit(u64),
    Close,
    Cancel,
    OutsideClick,
    Submitted,
}

#[derive(Clone, Debug, Default)]
pub struct Modal<F> {
    mode: Option<ModalMode>,
    draft: F,
}

impl<F: Default> Modal<F> {
    pub fn new() -> Self {
        Self {
            mode: None,
            draft: F::default(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<ModalMode> {
        self.mode
    }

    pub fn draft(&self) -> &F {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut F {
        &mut self.draft
    }

    pub fn open_with(&mut self, mode: ModalMode, draft: F) {
        self.mode = Some(mode);
        self.draft = draft;
    }

    pub fn handle(&mut self, event: ModalEvent) {
        match event {
            ModalEvent::Open => self.mode = Some(ModalMode::Create),
            ModalEvent::OpenEdit(id) => self.mode = Some(ModalMode::Edit(id)),
            ModalEvent::Close
            | ModalEvent::Cancel
            | ModalEvent::OutsideClick
            | ModalEvent::Submitted => {
                self.mode = None;
                self.draft = F::default();
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelState {
    Hidden,
    Visible,
    Confirming,
    LoggingOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelEvent {
    Open,
    Close,
    Cancel,
    OutsideClick,
    Escape,
    Confirm,
    ConfirmFinal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelEffect {
    None,
    Redirect { to: String, after: Duration },
}

#[derive(Clone, Debug)]
pub struct SessionPanel {
    state: PanelState,
    landing_page: String,
}

impl Default for SessionPanel {
    fn default() -> Self {
        Self::new(LANDING_PAGE)
    }
}

impl SessionPanel {
    pub fn new(landing_page: impl Into<String>) -> Self {
        Self {
            state: PanelState::Hidden,
            landing_page: landing_page.into(),
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn scroll_locked(&self) -> bool {
        matches!(self.state, PanelState::Visible | PanelState::Confirming)
    }

    pub fn handle(&mut self, event: PanelEvent) -> PanelEffect {
        use PanelEvent as E;
        use PanelState as S;

        let (next, effect) = match (self.state, event) {
            (S::Hidden, E::Open) => (S::Visible, PanelEffect::None),
            (S::Visible, E::Close | E::Cancel | E::OutsideClick | E::Escape) => {
                (S::Hidden, PanelEffect::None)
            }
            (S::Visible, E::Confirm) => (S::Confirming, PanelEffect::None),
            (S::Confirming, E::Cancel | E::OutsideClick | E::Escape) => {
                (S::Visible, PanelEffect::None)
            }
            (S::Confirming, E::ConfirmFinal) => (
                S::LoggingOut,
                PanelEffect::Redirect {
                    to: self.landing_page.clone(),
                    after: REDIRECT_DELAY,
                },
            ),
            (state, _) => (state, PanelEffect::None),
        };
        self.state = next;
        effect
    }
}
