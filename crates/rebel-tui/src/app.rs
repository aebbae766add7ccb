use ratatui::layout::Rect;
use rebel_core::catalog::{self, Product};
use rebel_core::{Cart, Conversation, GatewayError, StylistGateway, TurnId};
use tokio::task::JoinHandle;

use crate::tui::{AppEvent, EventSender};

/// Which part of the screen receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Products,
    Lookbook,
    Stylist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Idle,
    Thinking,
    Offline,
}

/// The floating stylist chat. Exists only while the panel is open; dropping
/// it abandons any call still in flight.
pub struct StylistPanel {
    pub conversation: Conversation,
    task: Option<JoinHandle<()>>,
    pub scroll: u16,
    pub chat_height: u16,     // Inner height of transcript area, set during render
    pub content_lines: usize, // Wrapped transcript height, set during render
}

impl StylistPanel {
    fn new(authorized: bool) -> Self {
        Self {
            conversation: Conversation::new(authorized),
            task: None,
            scroll: 0,
            chat_height: 0,
            content_lines: 0,
        }
    }

    fn max_scroll(&self) -> u16 {
        let hidden = self.content_lines.saturating_sub(self.chat_height as usize);
        u16::try_from(hidden).unwrap_or(u16::MAX)
    }

    /// Keep the newest message in view after the transcript changed
    pub fn follow_transcript(&mut self) {
        if self.conversation.take_scroll_request() {
            self.scroll = self.max_scroll();
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1).min(self.max_scroll());
    }
}

impl Drop for StylistPanel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            tracing::debug!("stylist panel closed with a call in flight, aborting");
            task.abort();
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,

    // Storefront state
    pub selected_product: usize,
    pub grid_columns: usize, // Set during render
    pub lookbook_offset: usize,
    pub cart: Cart,
    pub cart_flash: u8, // Ticks left on the add-to-cart glitch

    // Stylist state
    pub stylist: Option<StylistPanel>,
    pub gateway: Option<StylistGateway>,
    pub model: String,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub products_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    events: EventSender,
}

impl App {
    pub fn new(gateway: Option<StylistGateway>, model: String, events: EventSender) -> Self {
        Self {
            should_quit: false,
            focus: Focus::Products,

            selected_product: 0,
            grid_columns: 3,
            lookbook_offset: 0,
            cart: Cart::new(),
            cart_flash: 0,

            stylist: None,
            gateway,
            model,

            animation_frame: 0,

            products_area: None,
            chat_area: None,

            events,
        }
    }

    pub fn panel_state(&self) -> PanelState {
        match &self.stylist {
            None => PanelState::Closed,
            Some(panel) if !panel.conversation.is_authorized() => PanelState::Offline,
            Some(panel) if panel.conversation.is_busy() => PanelState::Thinking,
            Some(_) => PanelState::Idle,
        }
    }

    // Storefront navigation

    pub fn selected(&self) -> Option<&'static Product> {
        catalog::products().get(self.selected_product)
    }

    pub fn next_product(&mut self) {
        let len = catalog::products().len();
        if len > 0 {
            self.selected_product = (self.selected_product + 1).min(len - 1);
        }
    }

    pub fn prev_product(&mut self) {
        self.selected_product = self.selected_product.saturating_sub(1);
    }

    pub fn product_row_down(&mut self) {
        let len = catalog::products().len();
        let target = self.selected_product + self.grid_columns.max(1);
        if target < len {
            self.selected_product = target;
        }
    }

    pub fn product_row_up(&mut self) {
        self.selected_product = self
            .selected_product
            .checked_sub(self.grid_columns.max(1))
            .unwrap_or(self.selected_product);
    }

    pub fn add_selected_to_cart(&mut self) {
        if let Some(product) = self.selected() {
            self.cart.add(product);
            self.cart_flash = 2;
            tracing::info!(product = product.name, count = self.cart.count(), "added to cart");
        }
    }

    pub fn lookbook_next(&mut self) {
        let len = catalog::lookbook().len();
        if len > 0 {
            self.lookbook_offset = (self.lookbook_offset + 1).min(len - 1);
        }
    }

    pub fn lookbook_prev(&mut self) {
        self.lookbook_offset = self.lookbook_offset.saturating_sub(1);
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match (self.focus, self.stylist.is_some()) {
            (Focus::Products, _) => Focus::Lookbook,
            (Focus::Lookbook, true) => Focus::Stylist,
            (Focus::Lookbook, false) => Focus::Products,
            (Focus::Stylist, _) => Focus::Products,
        };
    }

    // Stylist panel

    pub fn toggle_stylist(&mut self) {
        if self.stylist.is_some() {
            self.close_stylist();
        } else {
            self.open_stylist();
        }
    }

    pub fn open_stylist(&mut self) {
        if self.stylist.is_none() {
            self.stylist = Some(StylistPanel::new(self.gateway.is_some()));
        }
        self.focus = Focus::Stylist;
    }

    pub fn close_stylist(&mut self) {
        // Dropping the panel aborts its task and forgets the transcript
        self.stylist = None;
        self.chat_area = None;
        if self.focus == Focus::Stylist {
            self.focus = Focus::Products;
        }
    }

    pub fn submit_stylist(&mut self) {
        let Some(panel) = self.stylist.as_mut() else {
            return;
        };

        let turn = match panel.conversation.submit_draft() {
            Ok(turn) => turn,
            Err(rejection) => {
                tracing::debug!(%rejection, "stylist submit ignored");
                return;
            }
        };

        let Some(gateway) = self.gateway.clone() else {
            panel.conversation.on_gateway_failure(turn.id);
            return;
        };

        let events = self.events.clone();
        panel.task = Some(tokio::spawn(async move {
            let outcome = gateway.ask(&turn.utterance).await;
            let _ = events.send(AppEvent::StylistReply {
                turn: turn.id,
                outcome,
            });
        }));
    }

    pub fn apply_stylist_reply(&mut self, turn: TurnId, outcome: Result<Option<String>, GatewayError>) {
        let Some(panel) = self.stylist.as_mut() else {
            tracing::debug!(?turn, "stylist reply arrived after panel closed");
            return;
        };

        if panel.conversation.resolve(turn, outcome) {
            panel.task = None;
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick(&mut self) {
        if self.panel_state() == PanelState::Thinking {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.cart_flash = self.cart_flash.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rebel_core::conversation::{GATEWAY_ERROR_PLACEHOLDER, GREETING};
    use rebel_core::{ChatMessage, GenerationRequest, TextGenerator};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Scripted {
        calls: AtomicUsize,
        reply: Result<Option<String>, u16>,
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Option<String>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(status) => Err(GatewayError::Status {
                    status: *status,
                    body: String::new(),
                }),
            }
        }
    }

    struct Hanging;

    #[async_trait]
    impl TextGenerator for Hanging {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Option<String>, GatewayError> {
            std::future::pending().await
        }
    }

    fn app_with(generator: Option<Arc<dyn TextGenerator>>) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = generator.map(StylistGateway::new);
        (App::new(gateway, "test-model".to_string(), tx), rx)
    }

    fn type_draft(app: &mut App, text: &str) {
        let panel = app.stylist.as_mut().unwrap();
        for c in text.chars() {
            panel.conversation.insert_char(c);
        }
    }

    async fn deliver_reply(app: &mut App, rx: &mut mpsc::UnboundedReceiver<AppEvent>) {
        match rx.recv().await {
            Some(AppEvent::StylistReply { turn, outcome }) => app.apply_stylist_reply(turn, outcome),
            other => panic!("expected stylist reply, got {:?}", other),
        }
    }

    fn transcript(app: &App) -> &[ChatMessage] {
        app.stylist.as_ref().unwrap().conversation.transcript()
    }

    #[tokio::test]
    async fn test_reply_round_trip_through_event_channel() {
        let generator = Arc::new(Scripted {
            calls: AtomicUsize::new(0),
            reply: Ok(Some("Try the Anarchy Combat Boots.".to_string())),
        });
        let (mut app, mut rx) = app_with(Some(generator.clone()));

        app.open_stylist();
        type_draft(&mut app, "show me boots");
        app.submit_stylist();
        assert_eq!(transcript(&app).len(), 2);
        assert_eq!(app.panel_state(), PanelState::Thinking);

        deliver_reply(&mut app, &mut rx).await;
        assert_eq!(
            transcript(&app).last(),
            Some(&ChatMessage::assistant("Try the Anarchy Combat Boots."))
        );
        assert_eq!(app.panel_state(), PanelState::Idle);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_submit_while_thinking_is_ignored() {
        let generator = Arc::new(Scripted {
            calls: AtomicUsize::new(0),
            reply: Ok(Some("fit".to_string())),
        });
        let (mut app, mut rx) = app_with(Some(generator.clone()));

        app.open_stylist();
        type_draft(&mut app, "first");
        app.submit_stylist();
        type_draft(&mut app, "second");
        app.submit_stylist();
        assert_eq!(transcript(&app).len(), 2);

        deliver_reply(&mut app, &mut rx).await;
        assert_eq!(transcript(&app).len(), 3);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        // The rejected text stays in the input box
        assert_eq!(app.stylist.as_ref().unwrap().conversation.draft(), "second");
    }

    #[tokio::test]
    async fn test_gateway_error_becomes_placeholder() {
        let generator = Arc::new(Scripted {
            calls: AtomicUsize::new(0),
            reply: Err(503),
        });
        let (mut app, mut rx) = app_with(Some(generator));

        app.open_stylist();
        type_draft(&mut app, "show me boots");
        app.submit_stylist();
        deliver_reply(&mut app, &mut rx).await;

        assert_eq!(transcript(&app).last().unwrap().text, GATEWAY_ERROR_PLACEHOLDER);
        assert_eq!(app.panel_state(), PanelState::Idle);
    }

    #[tokio::test]
    async fn test_offline_panel_ignores_submit() {
        let (mut app, _rx) = app_with(None);

        app.open_stylist();
        assert_eq!(app.panel_state(), PanelState::Offline);
        type_draft(&mut app, "show me boots");
        app.submit_stylist();

        assert_eq!(transcript(&app), [ChatMessage::assistant(GREETING)]);
    }

    #[tokio::test]
    async fn test_closing_panel_discards_late_reply() {
        let (mut app, _rx) = app_with(Some(Arc::new(Hanging)));

        app.open_stylist();
        type_draft(&mut app, "show me boots");
        app.submit_stylist();
        let turn = app.stylist.as_ref().unwrap().conversation.pending_turn().unwrap();

        app.close_stylist();
        assert_eq!(app.panel_state(), PanelState::Closed);
        assert_eq!(app.focus, Focus::Products);

        // A result that was already queued must not revive anything
        app.apply_stylist_reply(turn, Ok(Some("late".to_string())));
        assert!(app.stylist.is_none());

        // Reopening starts over and rejects the old turn
        app.open_stylist();
        app.apply_stylist_reply(turn, Ok(Some("late".to_string())));
        assert_eq!(transcript(&app).len(), 1);
        assert_eq!(app.panel_state(), PanelState::Idle);
    }

    #[tokio::test]
    async fn test_cart_and_grid_navigation() {
        let (mut app, _rx) = app_with(None);
        app.grid_columns = 3;

        app.product_row_down();
        assert_eq!(app.selected_product, 3);
        app.product_row_down();
        assert_eq!(app.selected_product, 3);
        app.next_product();
        app.next_product();
        app.next_product();
        assert_eq!(app.selected_product, 5);
        app.product_row_up();
        assert_eq!(app.selected_product, 2);

        app.add_selected_to_cart();
        assert_eq!(app.cart.count(), 1);
        assert_eq!(app.cart.items()[0].name, "Anarchy Combat Boots");
        assert_eq!(app.cart_flash, 2);
        app.tick();
        app.tick();
        app.tick();
        assert_eq!(app.cart_flash, 0);
    }

    #[tokio::test]
    async fn test_follow_transcript_scrolls_to_bottom() {
        let (mut app, _rx) = app_with(None);
        app.open_stylist();
        let panel = app.stylist.as_mut().unwrap();
        panel.chat_height = 3;
        panel.content_lines = 7;

        panel.follow_transcript();
        assert_eq!(panel.scroll, 4);

        // No change, no jump
        panel.scroll = 0;
        panel.follow_transcript();
        assert_eq!(panel.scroll, 0);

        for _ in 0..10 {
            panel.scroll_down();
        }
        assert_eq!(panel.scroll, 4);
    }

    #[tokio::test]
    async fn test_scroll_is_clamped_for_huge_transcripts() {
        let (mut app, _rx) = app_with(None);
        app.open_stylist();
        let panel = app.stylist.as_mut().unwrap();
        panel.chat_height = 10;
        panel.content_lines = usize::MAX;

        panel.follow_transcript();
        assert_eq!(panel.scroll, u16::MAX);
        panel.scroll_down();
        assert_eq!(panel.scroll, u16::MAX);
    }
}
