//! Pure rendering: map App state to ratatui widget trees.
//!
//! Geometry comes from [`layout::regions`], the same rectangles the event
//! loop hit-tests against. Widget-building functions are pure (state in,
//! widgets out); the only effect is writing to the frame's buffer.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::content::{Face, Media, Page, COVER_TITLE, QUESTION};
use crate::timer::TimerKind;

use super::book::{bend_angle, top_flipped, top_unflipped};
use super::layout::{self, Prompt, Regions, NEXT_LABEL, NO_LABEL, PREV_LABEL, START_LABEL, YES_LABEL};
use super::state::{App, Card};
use super::theme;

/// Rows at the bottom of the question face kept free for the prompt.
const PROMPT_ROWS: u16 = 5;

// ============================================================================
// DISPATCH
// ============================================================================

/// Render the whole card to the terminal frame.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let regions = layout::regions(area, &app.card);

    frame.render_widget(render_title(&app.card), regions.title);
    render_book(app, &regions, frame);
    render_controls(&app.card, &regions, frame);
    frame.render_widget(render_help(&app.card), regions.help);

    if app.card.celebrating {
        render_celebration(app, frame, area);
    }
    if let Some(start) = regions.start {
        render_start_overlay(frame, start);
    }
}

// ============================================================================
// SHARED LAYOUT
// ============================================================================

fn render_title(card: &Card) -> Paragraph<'static> {
    let mut spans = vec![Span::styled("paper-heart ♥", theme::STYLE_TITLE)];
    if card.closing {
        spans.push(Span::styled("  closing the book...", theme::STYLE_DIM));
    }
    Paragraph::new(Line::from(spans))
}

fn render_help(card: &Card) -> Paragraph<'static> {
    let help_text = if card.show_start_overlay() {
        "[Enter] start the music  [q] quit"
    } else if card.is_locked() {
        "[q] quit"
    } else if card.on_terminal_page() {
        "[←/→] turn  [y] yes  [n] no  [q] quit"
    } else {
        "[←/→] turn  drag the page to flip  [q] quit"
    };
    Paragraph::new(Span::styled(help_text, theme::STYLE_HELP))
}

// ============================================================================
// BOOK
// ============================================================================

fn render_book(app: &App, regions: &Regions, frame: &mut Frame) {
    let card = &app.card;

    if card.current == 0 {
        render_cover(frame, regions.right);
        return;
    }

    let page_count = app.pages.len();

    if let Some(left) = regions.left {
        match top_flipped(card.current, page_count).and_then(|i| app.pages.get(i)) {
            Some(page) => render_leaf(frame, left, &page.back, theme::STYLE_BORDER, 0),
            None => render_inside_cover(frame, left),
        }
    }

    let Some((turning, page)) = top_unflipped(card.current, page_count)
        .and_then(|i| app.pages.get(i).map(|page| (i, page)))
    else {
        return;
    };
    let bend = bend_angle(turning, card.current, card.nudge, &card.book.gesture);
    let border = if bend == 0.0 { theme::STYLE_BORDER } else { theme::STYLE_CURL };

    match &regions.prompt {
        Some(prompt) => {
            render_leaf(frame, regions.right, &page.front, border, PROMPT_ROWS);
            render_prompt(card, prompt, frame);
        }
        None => render_leaf(frame, regions.right, &page.front, border, 0),
    }
}

fn render_cover(frame: &mut Frame, area: Rect) {
    let block = Block::bordered()
        .border_type(BorderType::Double)
        .border_style(theme::STYLE_COVER);
    let top_pad = area.height.saturating_sub(6) / 2;

    let mut lines: Vec<Line> = (0..top_pad).map(|_| Line::from("")).collect();
    for title in COVER_TITLE {
        lines.push(Line::from(Span::styled(title, theme::STYLE_COVER)));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled("♥", theme::STYLE_HEART)));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_inside_cover(frame: &mut Frame, area: Rect) {
    let block = Block::bordered()
        .border_type(BorderType::Double)
        .border_style(theme::STYLE_COVER);
    let top_pad = area.height.saturating_sub(3) / 2;
    let mut lines: Vec<Line> = (0..top_pad).map(|_| Line::from("")).collect();
    lines.push(Line::from(Span::styled("♥", theme::STYLE_HEART)));
    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

/// One face inside a rounded leaf. `reserved` rows at the bottom stay empty.
fn render_leaf(frame: &mut Frame, area: Rect, face: &Face, border: Style, reserved: u16) {
    frame.render_widget(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border),
        area,
    );

    let inner = layout::inner(area);
    let body = Rect::new(
        inner.x,
        inner.y,
        inner.width,
        inner.height.saturating_sub(reserved),
    );
    let paragraph = Paragraph::new(face_lines(face)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, body);
}

/// Text lines for a face, top to bottom.
fn face_lines(face: &Face) -> Vec<Line<'_>> {
    let gap = || if face.compact { None } else { Some(Line::from("")) };
    let mut lines = Vec::new();

    if let Some(eyebrow) = &face.eyebrow {
        lines.push(Line::from(Span::styled(eyebrow.to_uppercase(), theme::STYLE_EYEBROW)));
    }
    let heading = if face.signature.is_some() {
        theme::STYLE_HERO
    } else {
        theme::STYLE_HEADING
    };
    lines.push(Line::from(Span::styled(face.title.as_str(), heading)));
    lines.extend(gap());

    for paragraph in face.text.lines() {
        lines.push(Line::from(paragraph));
    }

    if let Some(pill) = &face.pill {
        lines.extend(gap());
        lines.push(Line::from(Span::styled(format!("( {} )", pill), theme::STYLE_INTERACTIVE)));
    }
    if let Some(signature) = &face.signature {
        lines.extend(gap());
        lines.push(
            Line::from(Span::styled(signature.as_str(), theme::STYLE_SIGNATURE)).right_aligned(),
        );
    }
    if let Some(media) = &face.media {
        lines.extend(gap());
        lines.push(Line::from(Span::styled(media_label(media), theme::STYLE_MEDIA)));
    }

    lines
}

/// How a piece of media appears in a text-only frame.
fn media_label(media: &Media) -> String {
    match media {
        Media::Placeholder(label) => format!("┄┄ {} ┄┄", label),
        Media::Image(image) => format!("[image: {} — {}]", image.alt, image.src),
    }
}

fn render_prompt(card: &Card, prompt: &Prompt, frame: &mut Frame) {
    let locked = card.is_locked();

    if prompt.yes.y > prompt.zone.y + 1 {
        let question_row = Rect::new(prompt.zone.x, prompt.yes.y - 2, prompt.zone.width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(QUESTION, theme::STYLE_QUESTION))
                .alignment(Alignment::Center),
            question_row,
        );
    }

    let (yes_style, no_style) = if locked {
        (theme::STYLE_DISABLED, theme::STYLE_DISABLED)
    } else {
        (theme::STYLE_YES, theme::STYLE_NO)
    };
    if !prompt.yes.is_empty() {
        frame.render_widget(Paragraph::new(Span::styled(YES_LABEL, yes_style)), prompt.yes);
    }
    if !prompt.no.is_empty() {
        frame.render_widget(Clear, prompt.no);
        frame.render_widget(Paragraph::new(Span::styled(NO_LABEL, no_style)), prompt.no);
    }

    frame.render_widget(
        Paragraph::new(Span::styled(card.response.as_str(), theme::STYLE_RESPONSE))
            .alignment(Alignment::Center),
        prompt.response,
    );
}

// ============================================================================
// CONTROLS
// ============================================================================

fn render_controls(card: &Card, regions: &Regions, frame: &mut Frame) {
    let style = if card.is_locked() {
        theme::STYLE_DISABLED
    } else {
        theme::STYLE_INTERACTIVE
    };
    frame.render_widget(Paragraph::new(Span::styled(PREV_LABEL, style)), regions.prev);
    frame.render_widget(
        Paragraph::new(pager_label(card)).alignment(Alignment::Center),
        regions.pager,
    );
    frame.render_widget(Paragraph::new(Span::styled(NEXT_LABEL, style)), regions.next);
}

/// "3 / 5": the cover counts as a page.
pub fn pager_label(card: &Card) -> String {
    format!("{} / {}", card.current + 1, card.total_pages())
}

// ============================================================================
// OVERLAYS
// ============================================================================

fn render_celebration(app: &App, frame: &mut Frame, area: Rect) {
    let elapsed = app.card.celebration_frames as f32 * TimerKind::Frame.interval().as_secs_f32();

    if area.width > 0 && area.height > 0 {
        let buf = frame.buffer_mut();
        for heart in &app.card.hearts {
            let Some(progress) = heart.progress(elapsed) else {
                continue;
            };
            let x = area.x + (u32::from(area.width - 1) * u32::from(heart.left.min(100)) / 100) as u16;
            let y = area.y + ((area.height - 1) as f32 * progress) as u16;
            let style = if heart.is_large() {
                theme::STYLE_HEART_LARGE
            } else {
                theme::STYLE_HEART
            };
            buf.set_string(x, y, "♥", style);
        }
    }

    let ending = ending_face(&app.pages);
    let mut lines = Vec::new();
    if let Some(face) = ending {
        lines.push(Line::from(Span::styled(face.title.as_str(), theme::STYLE_HERO)));
        if !face.text.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(face.text.as_str()));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        app.card.response.as_str(),
        theme::STYLE_RESPONSE,
    )));

    let height = (lines.len() as u16 + 2).min(area.height);
    let width = 56u16.min(area.width);
    let boxed = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, boxed);
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(theme::STYLE_HEART),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        boxed,
    );
}

fn ending_face(pages: &[Page]) -> Option<&Face> {
    pages.iter().map(|p| &p.back).find(|face| face.ending)
}

fn render_start_overlay(frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Span::styled(START_LABEL, theme::STYLE_START))
            .block(Block::bordered().border_style(theme::STYLE_INTERACTIVE))
            .alignment(Alignment::Center),
        area,
    );
}

// ============================================================================
// TESTS
// ============================================================================
