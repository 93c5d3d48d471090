//! View state - the single owner of what the operator window shows
//!
//! Nothing touches `ViewState` directly except the view thread. The frame loop
//! and the voice pathway hand it `ViewEvent`s over a channel.

use crate::gesture::GestureLatchState;
use crate::types::{JointSample, Point3, UiAction};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;

const MARKER_ACTIVE: u32 = 60;
const MARKER_IDLE: u32 = 20;

/// Operator window placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    #[default]
    Normal,
    /// Topmost and maximized
    Shown,
    /// Minimized
    Hidden,
}

/// Circle drawn over a tracked joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMarker {
    pub position: Point3,
    pub highlighted: bool,
}

impl OverlayMarker {
    fn new(position: Point3, highlighted: bool) -> Self {
        Self { position, highlighted }
    }

    pub fn diameter(&self) -> u32 {
        if self.highlighted {
            MARKER_ACTIVE
        } else {
            MARKER_IDLE
        }
    }
}

/// Joint markers for one processed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointOverlay {
    pub head: OverlayMarker,
    pub left_hand: OverlayMarker,
    pub right_hand: OverlayMarker,
}

impl JointOverlay {
    /// The left hand lights up while "back" is held, the right while "forward" is.
    pub fn from_sample(sample: &JointSample, latches: &GestureLatchState) -> Self {
        Self {
            head: OverlayMarker::new(sample.head.position, false),
            left_hand: OverlayMarker::new(sample.left_hand.position, latches.back_active()),
            right_hand: OverlayMarker::new(sample.right_hand.position, latches.forward_active()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    Action(UiAction),
    Overlay(JointOverlay),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub window: WindowState,
    pub circles_visible: bool,
    pub overlay: Option<JointOverlay>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            window: WindowState::Normal,
            circles_visible: true,
            overlay: None,
        }
    }
}

impl ViewState {
    /// Apply an action; returns whether anything changed.
    pub fn apply(&mut self, action: UiAction) -> bool {
        let before = (self.window, self.circles_visible);
        match action {
            UiAction::ShowWindow => self.window = WindowState::Shown,
            UiAction::HideWindow => self.window = WindowState::Hidden,
            UiAction::ShowCircles => self.circles_visible = true,
            UiAction::HideCircles => self.circles_visible = false,
            UiAction::ToggleCircles => self.circles_visible = !self.circles_visible,
        }
        before != (self.window, self.circles_visible)
    }

    pub fn handle(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Action(action) => {
                if self.apply(action) {
                    log::info!(
                        "View: {:?} -> window={:?} circles={}",
                        action,
                        self.window,
                        if self.circles_visible { "shown" } else { "hidden" }
                    );
                } else {
                    log::debug!("View: {:?} (no change)", action);
                }
            }
            ViewEvent::Overlay(overlay) => self.overlay = Some(overlay),
        }
    }
}

/// Runs the view owner on its own thread
pub struct ViewHandle {
    tx: Sender<ViewEvent>,
    stop: Option<Sender<()>>,
    state: Arc<Mutex<ViewState>>,
    thread: Option<JoinHandle<()>>,
}

impl ViewHandle {
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let state = Arc::new(Mutex::new(ViewState::default()));
        let owned = Arc::clone(&state);
        let thread = std::thread::Builder::new()
            .name("presenter-view".into())
            .spawn(move || run_view(rx, stop_rx, owned))?;
        Ok(Self {
            tx,
            stop: Some(stop_tx),
            state,
            thread: Some(thread),
        })
    }

    pub fn sender(&self) -> Sender<ViewEvent> {
        self.tx.clone()
    }

    /// Copy of the current view state
    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }

    /// Apply whatever is already queued, then stop the view thread.
    /// Senders handed out earlier see a closed channel afterwards.
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        drop(self.stop.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("View thread panicked");
            }
        }
    }
}

impl Drop for ViewHandle {
    fn drop(&mut self) {
        self.join();
    }
}

fn run_view(rx: Receiver<ViewEvent>, stop: Receiver<()>, state: Arc<Mutex<ViewState>>) {
    loop {
        crossbeam_channel::select! {
            recv(rx) -> event => match event {
                Ok(event) => state.lock().handle(event),
                Err(_) => break,
            },
            recv(stop) -> _ => {
                for event in rx.try_iter() {
                    state.lock().handle(event);
                }
                break;
            }
        }
    }
    log::debug!("View thread stopped");
}
