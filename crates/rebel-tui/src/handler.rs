use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, Focus};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::StylistReply { turn, outcome } => app.apply_stylist_reply(turn, outcome),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if key.code == KeyCode::Tab {
        app.cycle_focus();
        return;
    }

    match app.focus {
        Focus::Stylist => handle_stylist_input(app, key),
        Focus::Products => handle_products(app, key),
        Focus::Lookbook => handle_lookbook(app, key),
    }
}

/// Keys shared by the storefront panes
fn handle_storefront_common(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('s') => app.toggle_stylist(),
        KeyCode::Char('L') => app.focus = Focus::Lookbook,
        KeyCode::Char('P') => app.focus = Focus::Products,
        _ => return false,
    }
    true
}

fn handle_products(app: &mut App, key: KeyEvent) {
    if handle_storefront_common(app, key) {
        return;
    }

    match key.code {
        KeyCode::Char('l') | KeyCode::Right => app.next_product(),
        KeyCode::Char('h') | KeyCode::Left => app.prev_product(),
        KeyCode::Char('j') | KeyCode::Down => app.product_row_down(),
        KeyCode::Char('k') | KeyCode::Up => app.product_row_up(),
        KeyCode::Enter | KeyCode::Char('a') => app.add_selected_to_cart(),
        KeyCode::Char(']') => app.lookbook_next(),
        KeyCode::Char('[') => app.lookbook_prev(),
        _ => {}
    }
}

fn handle_lookbook(app: &mut App, key: KeyEvent) {
    if handle_storefront_common(app, key) {
        return;
    }

    match key.code {
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char(']') => app.lookbook_next(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('[') => app.lookbook_prev(),
        KeyCode::Char('j') | KeyCode::Down => app.focus = Focus::Products,
        _ => {}
    }
}

fn handle_stylist_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.close_stylist();
        return;
    }
    if key.code == KeyCode::Enter {
        app.submit_stylist();
        return;
    }

    let Some(panel) = app.stylist.as_mut() else {
        app.focus = Focus::Products;
        return;
    };

    match key.code {
        KeyCode::Backspace => panel.conversation.backspace(),
        KeyCode::Delete => panel.conversation.delete(),
        KeyCode::Left => panel.conversation.cursor_left(),
        KeyCode::Right => panel.conversation.cursor_right(),
        KeyCode::Home => panel.conversation.cursor_home(),
        KeyCode::End => panel.conversation.cursor_end(),
        KeyCode::Up | KeyCode::PageUp => panel.scroll_up(),
        KeyCode::Down | KeyCode::PageDown => panel.scroll_down(),
        KeyCode::Char(c) => panel.conversation.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Determine which area the mouse is in (position-based scrolling)
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_products = app.products_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                if let Some(panel) = app.stylist.as_mut() {
                    panel.scroll_down();
                }
            } else if in_products {
                app.product_row_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                if let Some(panel) = app.stylist.as_mut() {
                    panel.scroll_up();
                }
            } else if in_products {
                app.product_row_up();
            }
        }
        MouseEventKind::Down(_) => {
            if in_chat {
                app.focus = Focus::Stylist;
            } else if in_products {
                app.focus = Focus::Products;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn new_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(None, "test-model".to_string(), tx)
    }

    #[test]
    fn test_typing_goes_to_stylist_draft() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Char('s'))).unwrap();
        assert_eq!(app.focus, Focus::Stylist);

        for c in "boots".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.stylist.as_ref().unwrap().conversation.draft(), "boot");

        // 's' while typing is text, not the panel toggle
        handle_event(&mut app, key(KeyCode::Char('s'))).unwrap();
        assert!(app.stylist.is_some());
        assert_eq!(app.stylist.as_ref().unwrap().conversation.draft(), "boots");
    }

    #[test]
    fn test_escape_closes_panel() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Char('s'))).unwrap();
        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(app.stylist.is_none());
        assert_eq!(app.focus, Focus::Products);
    }

    #[test]
    fn test_add_to_cart_and_quit() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Right)).unwrap();
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.cart.count(), 1);
        assert_eq!(app.cart.items()[0].name, "Glitch Mesh Shorts");

        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus, Focus::Lookbook);
        handle_event(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.lookbook_offset, 1);
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus, Focus::Products);
    }

    #[test]
    fn test_ctrl_c_quits_while_typing() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Char('s'))).unwrap();
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_event(&mut app, ctrl_c).unwrap();
        assert!(app.should_quit);
    }
}
