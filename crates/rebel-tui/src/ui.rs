use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        block::Title, Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
};
use rebel_core::catalog::{self, Product};
use rebel_core::Sender;
use crate::app::{App, Focus, PanelState, StylistPanel};

const NEON: Color = Color::Rgb(57, 255, 20);
const CARD_WIDTH: u16 = 28;
const CARD_HEIGHT: u16 = 6;
const FRAME_WIDTH: u16 = 24;
const PANEL_WIDTH: u16 = 46;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str, base: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };

        if start > 0 {
            spans.push(Span::styled(rest[..start].to_string(), base));
        }
        if end > 0 {
            spans.push(Span::styled(after[..end].to_string(), base.add_modifier(Modifier::BOLD)));
        }
        rest = &after[end + 2..];
    }

    // Push any remaining text (including an unmatched **)
    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), base));
    }

    Line::from(spans)
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(NEON)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [hero_area, lookbook_area, products_area] = Layout::vertical([
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_hero(frame, hero_area);
    render_lookbook(app, frame, lookbook_area);
    render_products(app, frame, products_area);
    render_footer(app, frame, footer_area);

    // The stylist floats over the right edge of the storefront
    if app.stylist.is_some() {
        let width = PANEL_WIDTH.min(body_area.width);
        let panel_area = Rect::new(
            body_area.x + body_area.width - width,
            body_area.y,
            width,
            body_area.height,
        );
        render_stylist(app, frame, panel_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let cart_style = if app.cart_flash > 0 {
        // Glitch: invert for a tick after adding
        Style::default().fg(Color::Black).bg(Color::White).bold()
    } else {
        Style::default().fg(Color::Black).bg(NEON).bold()
    };

    let mut spans = vec![
        Span::styled(" REBEL YOUTH ", Style::default().fg(NEON).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(format!("[ AI STYLIST: {} ]", app.model), Style::default().fg(NEON)),
        Span::raw("  "),
        Span::styled("CART", Style::default().fg(Color::White).bold()),
    ];
    if !app.cart.is_empty() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", app.cart.count()), cart_style));
        spans.push(Span::styled(
            format!(" ${}", app.cart.total()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_hero(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(NEON));

    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled("CHAOS", Style::default().fg(Color::White).bold())),
        Line::from(Span::styled("YOUTH", Style::default().fg(NEON).bold())),
        Line::from(Span::styled(
            "WEAR YOUR REBELLION.",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled("[ ENTER THE VOID ]", Style::default().fg(Color::White))),
    ]);

    let hero = Paragraph::new(text).alignment(Alignment::Center).block(block);
    frame.render_widget(hero, area);
}

fn render_lookbook(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Lookbook))
        .title(" CAMPAIGN // 2024 ")
        .title(
            Title::from(Span::styled(" SCROLL >>> ", Style::default().fg(NEON)))
                .alignment(Alignment::Right),
        );

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let frames = catalog::lookbook();
    let visible = (inner.width / (FRAME_WIDTH + 1)).max(1) as usize;

    for (slot, entry) in frames.iter().skip(app.lookbook_offset).take(visible).enumerate() {
        let x = inner.x + slot as u16 * (FRAME_WIDTH + 1);
        let width = FRAME_WIDTH.min(inner.right().saturating_sub(x));
        if width == 0 {
            break;
        }
        let frame_area = Rect::new(x, inner.y, width, inner.height);

        let tile = Paragraph::new(vec![
            Line::from(Span::styled(entry.caption, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(
                format!(" {} ", entry.label),
                Style::default().fg(NEON).bg(Color::Black),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::LEFT)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(tile, frame_area);
    }
}

fn render_products(app: &mut App, frame: &mut Frame, area: Rect) {
    let products = catalog::products();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Products))
        .title(Line::from(vec![
            Span::styled(" 01 // COLLECTION ", Style::default().fg(NEON)),
            Span::styled("LATEST DROPS ", Style::default().fg(Color::White).bold()),
        ]))
        .title(
            Title::from(Span::styled(
                format!(" [ {} ITEMS DETECTED ] ", products.len()),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Right),
        );

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Store area for mouse hit-testing
    app.products_area = Some(inner);

    let columns = (inner.width / CARD_WIDTH).max(1) as usize;
    app.grid_columns = columns;

    let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = app.selected_product / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    for (idx, product) in products.iter().enumerate() {
        let row = idx / columns;
        if row < first_row || row >= first_row + visible_rows {
            continue;
        }
        let col = (idx % columns) as u16;
        let card_area = Rect::new(
            inner.x + col * CARD_WIDTH,
            inner.y + (row - first_row) as u16 * CARD_HEIGHT,
            CARD_WIDTH.min(inner.width),
            CARD_HEIGHT.min(inner.height),
        );
        let selected = idx == app.selected_product && app.focus == Focus::Products;
        render_product_card(product, selected, frame, card_area);
    }
}

fn render_product_card(product: &Product, selected: bool, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(selected))
        .title(Span::styled(
            format!(" {} ", product.category.as_str().to_uppercase()),
            Style::default().fg(Color::White).bg(Color::Black),
        ));

    let (button_label, button_style) = if selected {
        ("Add to Cart", Style::default().fg(Color::Black).bg(NEON).bold())
    } else {
        ("View Item", Style::default().fg(Color::White))
    };

    let text = vec![
        Line::from(Span::styled(
            product.name.to_uppercase(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(format!("${}", product.price), Style::default().fg(NEON).bold())),
        Line::default(),
        Line::from(Span::styled(format!(" {:<20}+ ", button_label.to_uppercase()), button_style)),
    ];

    let card = Paragraph::new(text).block(block);
    frame.render_widget(card, area);
}

fn render_stylist(app: &mut App, frame: &mut Frame, area: Rect) {
    let panel_state = app.panel_state();
    let focused = app.focus == Focus::Stylist;
    let frame_index = app.animation_frame;

    let Some(panel) = app.stylist.as_mut() else {
        return;
    };

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let status = match panel_state {
        PanelState::Offline => Span::styled(" OFFLINE ", Style::default().fg(Color::Black).bg(Color::Red).bold()),
        PanelState::Thinking => Span::styled(" ● ", Style::default().fg(Color::Black).bg(NEON)),
        PanelState::Idle | PanelState::Closed => Span::styled(" ○ ", Style::default().fg(Color::Black).bg(NEON)),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON))
        .title(Line::from(vec![
            status,
            Span::styled(" REBEL_NET ", Style::default().fg(Color::Black).bg(NEON).bold()),
        ]))
        .title(Title::from(" Esc × ").alignment(Alignment::Right));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(inner);

    app.chat_area = Some(chat_area);

    // The transcript wraps one column short of the chat area; the scrollbar
    // owns the last column. Scrolling is measured on the same paragraph.
    let text_area = Rect {
        width: chat_area.width.saturating_sub(1),
        ..chat_area
    };
    let transcript = transcript_paragraph(panel, frame_index);
    panel.chat_height = chat_area.height;
    panel.content_lines = transcript.line_count(text_area.width.max(1));
    panel.follow_transcript();

    frame.render_widget(transcript.scroll((panel.scroll, 0)), text_area);
    if panel.content_lines > chat_area.height as usize {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None);
        let mut scrollbar_state = ScrollbarState::new(panel.content_lines)
            .position(panel.scroll as usize);
        frame.render_stateful_widget(scrollbar, chat_area, &mut scrollbar_state);
    }

    render_stylist_input(panel, focused, frame, input_area);
}

fn transcript_paragraph(panel: &StylistPanel, frame_index: u8) -> Paragraph<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let tag_style = Style::default().fg(NEON).bg(Color::Black).add_modifier(Modifier::BOLD);

    for msg in panel.conversation.transcript() {
        match msg.sender {
            Sender::User => {
                lines.push(
                    Line::from(Span::styled("YOU", Style::default().fg(Color::Gray).bold()))
                        .alignment(Alignment::Right),
                );
                for line in msg.text.lines() {
                    lines.push(
                        Line::from(Span::styled(line.to_string(), Style::default().fg(Color::White)))
                            .alignment(Alignment::Right),
                    );
                }
            }
            Sender::Assistant => {
                lines.push(Line::from(Span::styled("STYLIST.EXE", tag_style)));
                for line in msg.text.lines() {
                    lines.push(parse_markdown_line(line, Style::default().fg(NEON)));
                }
            }
        }
        lines.push(Line::default());
    }

    if panel.conversation.is_busy() {
        lines.push(Line::from(Span::styled("STYLIST.EXE", tag_style)));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(frame_index as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true })
}

fn render_stylist_input(panel: &StylistPanel, focused: bool, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(border_style(focused));

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(1) as usize;
    let cursor_pos = panel.conversation.cursor();
    let draft = panel.conversation.draft();

    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };

    let input = if draft.is_empty() {
        Paragraph::new(Span::styled("Ask for advice...", Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::White))
    };
    frame.render_widget(input.block(block), area);

    // Show cursor when typing
    if focused {
        let cursor_x = u16::try_from(cursor_pos - scroll_offset)
            .unwrap_or(u16::MAX)
            .min(area.width.saturating_sub(1));
        frame.set_cursor_position((area.x + cursor_x, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.focus {
        Focus::Stylist => Style::default().bg(NEON).fg(Color::Black),
        _ => Style::default().bg(Color::White).fg(Color::Black),
    };

    let mode_text = match app.focus {
        Focus::Products => " SHOP ",
        Focus::Lookbook => " LOOKBOOK ",
        Focus::Stylist => " STYLIST ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.focus {
        Focus::Products => vec![
            Span::styled(" h/j/k/l ", key_style),
            Span::styled(" browse ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" add to cart ", label_style),
            Span::styled(" [ ] ", key_style),
            Span::styled(" lookbook ", label_style),
        ],
        Focus::Lookbook => vec![
            Span::styled(" h/l ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" j ", key_style),
            Span::styled(" products ", label_style),
        ],
        Focus::Stylist => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" ↑/↓ ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ],
    };

    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" focus ", label_style),
    ]);
    if app.focus != Focus::Stylist {
        hints.extend(vec![
            Span::styled(" s ", key_style),
            Span::styled(if app.stylist.is_some() { " hide stylist " } else { " stylist " }, label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]);
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
