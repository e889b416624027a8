//! Timed bubble pipeline
//!
//! A live bubble is inserted hidden, revealed at its deadline, recorded to
//! history and scrolled into view. Only the deadline of the most recent live
//! bubble is cancelable; typing and scroll timers are left to fire against
//! whatever is on screen.

use super::markup;
use super::surface::{BubbleId, BubbleView, BubbleWidth, Surface};
use super::timing::{self, BubbleSchedule, SCROLL_STEPS, SCROLL_STEP_INTERVAL};
use super::BubbleRole;
use crate::config::BubbleOptions;
use crate::conversation::Choice;
use crate::history::{HistoryEntry, HistoryStore};
use crate::render::{MathTypesetter, RenderGate, Renderer, MATH_DELIMITERS};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Called once a bubble has been revealed
pub type PostedCallback = Box<dyn FnOnce() + Send + 'static>;

/// A request to show one bubble
pub struct BubbleRequest {
    pub payload: String,
    pub role: BubbleRole,
    pub choices: Vec<Choice>,
    pub on_posted: Option<PostedCallback>,
    /// `false` when restoring history: no animation, no persistence
    pub live: bool,
    pub ice_breaker: bool,
}

impl BubbleRequest {
    pub fn live(payload: impl Into<String>, role: BubbleRole) -> Self {
        Self {
            payload: payload.into(),
            role,
            choices: Vec::new(),
            on_posted: None,
            live: true,
            ice_breaker: false,
        }
    }

    pub fn replay(entry: &HistoryEntry) -> Self {
        Self {
            payload: entry.say.clone(),
            role: entry.reply,
            choices: Vec::new(),
            on_posted: None,
            live: false,
            ice_breaker: true,
        }
    }

    /// Choices in display order
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn on_posted(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_posted = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for BubbleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BubbleRequest")
            .field("payload", &self.payload)
            .field("role", &self.role)
            .field("choices", &self.choices)
            .field("live", &self.live)
            .field("ice_breaker", &self.ice_breaker)
            .finish_non_exhaustive()
    }
}

/// Payload after sentinel stripping and delimiter normalization
#[derive(Debug, Clone)]
struct PreparedBubble {
    /// What gets rendered and remembered
    say: String,
    from_viewer: bool,
}

impl PreparedBubble {
    fn new(payload: &str, role: BubbleRole) -> Self {
        let (sentinel, rest) = markup::strip_input_sentinel(payload);
        let normalized = markup::normalize_math_delimiters(rest);
        let say = if sentinel {
            markup::echo_markup(&normalized)
        } else {
            normalized
        };
        Self {
            say,
            from_viewer: sentinel || role == BubbleRole::Freeform,
        }
    }
}

struct InFlight {
    id: BubbleId,
    token: CancellationToken,
}

#[derive(Default)]
struct QueueState {
    next_id: u64,
    in_flight: Option<InFlight>,
    /// Revealed choice sets still waiting for a pick
    choice_sets: HashMap<BubbleId, Vec<Choice>>,
    last_finalized: Option<(BubbleId, BubbleRole)>,
}

pub struct BubbleQueue {
    options: BubbleOptions,
    surface: Arc<dyn Surface>,
    renderer: Arc<dyn Renderer>,
    typesetter: Arc<dyn MathTypesetter>,
    gate: RenderGate,
    history: Arc<HistoryStore>,
    state: Mutex<QueueState>,
}

impl BubbleQueue {
    pub fn new(
        options: BubbleOptions,
        surface: Arc<dyn Surface>,
        renderer: Arc<dyn Renderer>,
        typesetter: Arc<dyn MathTypesetter>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            options,
            surface,
            renderer,
            typesetter,
            gate: RenderGate::default(),
            history,
            state: Mutex::new(QueueState::default()),
        }
    }

    pub fn options(&self) -> &BubbleOptions {
        &self.options
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate(&self) -> BubbleId {
        let mut state = self.state();
        state.next_id += 1;
        BubbleId(state.next_id)
    }

    /// Present a live bubble, superseding any bubble still waiting for its
    /// deadline. Replay requests reveal immediately and are never remembered.
    pub fn present(self: &Arc<Self>, request: BubbleRequest) -> BubbleId {
        if !request.live {
            let queue = Arc::clone(self);
            let id = self.allocate();
            tokio::spawn(async move { queue.reveal_replay(id, request).await });
            return id;
        }

        let start = Instant::now();
        let prepared = PreparedBubble::new(&request.payload, request.role);
        let plan = timing::schedule(
            prepared.say.chars().count(),
            request.role,
            true,
            &self.options,
        );
        let id = self.allocate();

        let token = CancellationToken::new();
        {
            let mut state = self.state();
            if let Some(previous) = state.in_flight.replace(InFlight {
                id,
                token: token.clone(),
            }) {
                tracing::debug!(superseded = %previous.id, by = %id, "Interrupting pending bubble");
                previous.token.cancel();
            }
        }

        self.schedule_typing(start, &plan);

        let queue = Arc::clone(self);
        let role = request.role;
        let choices = request.choices;
        let on_posted = request.on_posted;
        let ice_breaker = request.ice_breaker;
        tokio::spawn(async move {
            queue
                .insert(id, &prepared, role, false, choices.clone())
                .await;

            tokio::select! {
                biased;
                () = token.cancelled() => {
                    tracing::debug!(bubble = %id, "Bubble superseded before its deadline");
                    return;
                }
                () = sleep_until(start + plan.deadline) => {}
            }

            queue.release(id);
            queue.finalize(id, &prepared, role, choices, on_posted);
            if !ice_breaker {
                queue.remember(&prepared.say, role);
            }
            queue.spawn_scroll(plan.scroll_after);
        });

        id
    }

    /// Render persisted interactions instantly, in order, without re-persisting
    pub async fn restore(self: &Arc<Self>, entries: &[HistoryEntry]) -> usize {
        for entry in entries {
            let request = BubbleRequest::replay(entry);
            let id = self.allocate();
            self.reveal_replay(id, request).await;
        }
        if !entries.is_empty() {
            tracing::info!(count = entries.len(), "Restored previous interactions");
        }
        entries.len()
    }

    async fn reveal_replay(self: &Arc<Self>, id: BubbleId, request: BubbleRequest) {
        let prepared = PreparedBubble::new(&request.payload, request.role);
        self.insert(id, &prepared, request.role, true, request.choices.clone())
            .await;
        self.finalize(
            id,
            &prepared,
            request.role,
            request.choices,
            request.on_posted,
        );
        self.spawn_scroll(BubbleSchedule::immediate().scroll_after);
    }

    /// Cancel the pending deadline of the in-flight bubble, if any
    pub fn interrupt(&self) -> Option<BubbleId> {
        let in_flight = self.state().in_flight.take()?;
        in_flight.token.cancel();
        tracing::debug!(bubble = %in_flight.id, "Bubble interrupted");
        Some(in_flight.id)
    }

    /// Id of the bubble currently waiting for its deadline
    pub fn in_flight(&self) -> Option<BubbleId> {
        self.state().in_flight.as_ref().map(|f| f.id)
    }

    /// Show the typing indicator
    pub fn think(&self) {
        self.surface.set_typing(true);
    }

    /// Hide the typing indicator
    pub fn stop(&self) {
        self.surface.set_typing(false);
    }

    /// Fix a choice set shut on `index`, returning the picked choice.
    ///
    /// Only revealed sets can be picked. Returns `None` for unknown, pending,
    /// superseded or hidden bubbles, for sets that were already picked and
    /// for out-of-range picks, which leave the set open.
    pub fn pick(&self, id: BubbleId, index: usize) -> Option<Choice> {
        let choice = {
            let mut state = self.state();
            let choice = state.choice_sets.get(&id)?.get(index)?.clone();
            state.choice_sets.remove(&id);
            choice
        };
        self.surface.collapse_choices(id, index);
        Some(choice)
    }

    /// Most recent revealed choice set that is still open
    pub fn open_choice_set(&self) -> Option<BubbleId> {
        self.state().choice_sets.keys().copied().max()
    }

    /// Hide the last revealed bubble when it is a menu the viewer is typing
    /// past. A hidden menu can no longer be picked.
    pub fn hide_stale_menu(&self) -> Option<BubbleId> {
        let id = {
            let mut state = self.state();
            let (id, role) = state.last_finalized?;
            if !role.sizes_buttons() {
                return None;
            }
            state.choice_sets.remove(&id);
            id
        };
        self.surface.hide_bubble(id);
        Some(id)
    }

    fn release(&self, id: BubbleId) {
        let mut state = self.state();
        if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
            state.in_flight = None;
        }
    }

    fn schedule_typing(&self, start: Instant, plan: &BubbleSchedule) {
        if let Some(on) = plan.typing_on {
            let surface = Arc::clone(&self.surface);
            tokio::spawn(async move {
                sleep_until(start + on).await;
                surface.set_typing(true);
            });
        }
        if let Some(off) = plan.typing_off {
            let surface = Arc::clone(&self.surface);
            tokio::spawn(async move {
                sleep_until(start + off).await;
                surface.set_typing(false);
            });
        }
    }

    async fn insert(
        &self,
        id: BubbleId,
        prepared: &PreparedBubble,
        role: BubbleRole,
        history: bool,
        choices: Vec<Choice>,
    ) {
        let html = self
            .gate
            .when_ready(
                "markdown",
                || self.renderer.is_ready(),
                || markup::wrap_message(&self.renderer.render(&prepared.say), prepared.from_viewer),
            )
            .await;

        self.surface.insert_bubble(&BubbleView {
            id,
            html: html.clone(),
            source: prepared.say.clone(),
            role,
            history,
            choices,
        });

        let gate = self.gate;
        let typesetter = Arc::clone(&self.typesetter);
        let surface = Arc::clone(&self.surface);
        tokio::spawn(async move {
            let typeset = gate
                .when_ready(
                    "math",
                    || typesetter.is_ready(),
                    || typesetter.typeset(&html, MATH_DELIMITERS),
                )
                .await;
            if typeset != html {
                surface.replace_content(id, &typeset);
            }
        });
    }

    fn finalize(
        &self,
        id: BubbleId,
        prepared: &PreparedBubble,
        role: BubbleRole,
        choices: Vec<Choice>,
        on_posted: Option<PostedCallback>,
    ) {
        let width = if markup::is_image(&prepared.say) {
            BubbleWidth::Percent(50)
        } else if role.is_statement() {
            BubbleWidth::Pixels(self.surface.content_width(id) + self.options.wider_by)
        } else {
            BubbleWidth::Auto
        };

        if role.sizes_buttons() {
            let widths: Vec<f64> = self
                .surface
                .button_widths(id)
                .into_iter()
                .map(|w| w - self.options.side_padding * 2.0 + self.options.wider_by)
                .collect();
            self.surface.size_buttons(id, &widths);
        }

        self.surface.finalize(id, width);
        {
            let mut state = self.state();
            state.last_finalized = Some((id, role));
            if !choices.is_empty() {
                state.choice_sets.insert(id, choices);
            }
        }

        if let Some(callback) = on_posted {
            callback();
        }
    }

    fn remember(&self, say: &str, role: BubbleRole) {
        self.history.record(say, role);
        if let Err(e) = self.history.commit() {
            tracing::warn!(error = %e, "Failed to commit interaction history");
        }
    }

    fn spawn_scroll(&self, delay: Duration) {
        let surface = Arc::clone(&self.surface);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scroll_to_bottom(surface.as_ref()).await;
        });
    }
}

/// Hop the container toward the bottom in a bounded number of steps
async fn scroll_to_bottom(surface: &dyn Surface) {
    let metrics = surface.scroll_metrics();
    let difference = metrics.scroll_height - metrics.scroll_top;
    if difference <= 0.0 {
        return;
    }
    let hop = difference / f64::from(SCROLL_STEPS);
    let start = Instant::now();

    for step in 1..=SCROLL_STEPS {
        sleep_until(start + SCROLL_STEP_INTERVAL * step).await;
        let current = surface.scroll_metrics();
        if current.scroll_height - current.scroll_top > current.container_height {
            surface.set_scroll_top(current.scroll_top + hop);
        }
    }
}
