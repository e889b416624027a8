//! Recording surface for tests

use super::surface::{BubbleId, BubbleView, BubbleWidth, ScrollMetrics, Surface};
use super::BubbleQueue;
use crate::config::BubbleOptions;
use crate::history::{HistoryStore, MemoryStorage};
use crate::render::{MarkdownRenderer, MathTypesetter, NoopTypesetter, Renderer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Default measured width of bubble content
pub const CONTENT_WIDTH: f64 = 100.0;

/// Default measured width of each button
pub const BUTTON_WIDTH: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Inserted(BubbleView),
    Content { id: BubbleId, html: String },
    Typing(bool),
    ButtonsSized { id: BubbleId, widths: Vec<f64> },
    Finalized { id: BubbleId, width: BubbleWidth },
    Collapsed { id: BubbleId, picked: usize },
    Hidden(BubbleId),
    ScrollTop(f64),
    InputCleared,
}

/// Surface that records every call
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    button_counts: Mutex<HashMap<BubbleId, usize>>,
    scroll: Mutex<ScrollMetrics>,
}

#[allow(dead_code)]
impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn inserted(&self) -> Vec<BubbleView> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Inserted(view) => Some(view),
                _ => None,
            })
            .collect()
    }

    pub fn finalized(&self) -> Vec<BubbleId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Finalized { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Inserted bubbles that were revealed, in reveal order
    pub fn revealed(&self) -> Vec<BubbleView> {
        let inserted = self.inserted();
        self.finalized()
            .into_iter()
            .filter_map(|id| inserted.iter().find(|b| b.id == id).cloned())
            .collect()
    }

    pub fn width_of(&self, id: BubbleId) -> Option<BubbleWidth> {
        self.events().into_iter().find_map(|e| match e {
            SurfaceEvent::Finalized { id: found, width } if found == id => Some(width),
            _ => None,
        })
    }

    pub fn button_sizes(&self, id: BubbleId) -> Option<Vec<f64>> {
        self.events().into_iter().find_map(|e| match e {
            SurfaceEvent::ButtonsSized { id: found, widths } if found == id => Some(widths),
            _ => None,
        })
    }

    pub fn typing(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Typing(visible) => Some(visible),
                _ => None,
            })
            .collect()
    }

    pub fn set_scroll(&self, metrics: ScrollMetrics) {
        *self.scroll.lock().unwrap() = metrics;
    }

    pub fn scroll(&self) -> ScrollMetrics {
        *self.scroll.lock().unwrap()
    }

    fn push(&self, event: SurfaceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Surface for RecordingSurface {
    fn insert_bubble(&self, bubble: &BubbleView) {
        self.button_counts
            .lock()
            .unwrap()
            .insert(bubble.id, bubble.choices.len());
        self.push(SurfaceEvent::Inserted(bubble.clone()));
    }

    fn replace_content(&self, id: BubbleId, html: &str) {
        self.push(SurfaceEvent::Content {
            id,
            html: html.to_string(),
        });
    }

    fn set_typing(&self, visible: bool) {
        self.push(SurfaceEvent::Typing(visible));
    }

    fn content_width(&self, _id: BubbleId) -> f64 {
        CONTENT_WIDTH
    }

    fn button_widths(&self, id: BubbleId) -> Vec<f64> {
        let count = self
            .button_counts
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or_default();
        vec![BUTTON_WIDTH; count]
    }

    fn size_buttons(&self, id: BubbleId, widths: &[f64]) {
        self.push(SurfaceEvent::ButtonsSized {
            id,
            widths: widths.to_vec(),
        });
    }

    fn finalize(&self, id: BubbleId, width: BubbleWidth) {
        self.push(SurfaceEvent::Finalized { id, width });
    }

    fn collapse_choices(&self, id: BubbleId, picked: usize) {
        self.push(SurfaceEvent::Collapsed { id, picked });
    }

    fn hide_bubble(&self, id: BubbleId) {
        self.push(SurfaceEvent::Hidden(id));
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.scroll()
    }

    fn set_scroll_top(&self, top: f64) {
        self.scroll.lock().unwrap().scroll_top = top;
        self.push(SurfaceEvent::ScrollTop(top));
    }

    fn clear_input(&self) {
        self.push(SurfaceEvent::InputCleared);
    }
}

/// Queue over a recording surface and in-memory history of `capacity`
pub fn test_queue(
    capacity: usize,
) -> (Arc<BubbleQueue>, Arc<RecordingSurface>, Arc<HistoryStore>) {
    queue_with(
        Arc::new(MarkdownRenderer::default()),
        Arc::new(NoopTypesetter),
        capacity,
    )
}

/// Like `test_queue`, with the given render capabilities
pub fn queue_with(
    renderer: Arc<dyn Renderer>,
    typesetter: Arc<dyn MathTypesetter>,
    capacity: usize,
) -> (Arc<BubbleQueue>, Arc<RecordingSurface>, Arc<HistoryStore>) {
    let surface = Arc::new(RecordingSurface::new());
    let history = Arc::new(HistoryStore::open(
        Arc::new(MemoryStorage::new()),
        capacity,
    ));
    let queue = Arc::new(BubbleQueue::new(
        BubbleOptions::default(),
        surface.clone(),
        renderer,
        typesetter,
        history.clone(),
    ));
    (queue, surface, history)
}
