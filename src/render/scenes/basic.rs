//! Title, command, list, outro and quote layouts.

use crate::{
    foundation::core::Rgb8,
    render::base::{CONTENT_W, CONTENT_X, Layers, WIDTH, card},
    render::svg::{Anchor, TextStyle},
    render::text::{fit_width, text_width, truncate, wrap_capped},
    render::theme::{
        ACCENT_GREEN, BG_WHITE, CARD_SHADOW, CODE_BG, CODE_BLUE, SIZE_CODE, SIZE_DESC,
        SIZE_HEADER, SIZE_SMALL, SIZE_SUBTITLE, SIZE_TITLE, TEXT_DARK, TEXT_GRAY, TEXT_LIGHT,
    },
    scene::model::{CommandContent, ListContent, OutroContent, QuoteContent, TitleContent},
};

const MAX_TERMINAL_LINES: usize = 8;
const MAX_LIST_ITEMS: usize = 5;
const MAX_QUOTE_LINES: usize = 4;

pub fn title(c: &TitleContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let end = &mut layers.end;

    let cx = WIDTH / 2.0;
    end.rounded_rect(cx - 860.0, 300.0, 1720.0, 420.0, 48.0, BG_WHITE, 0.55);
    end.outline(cx - 860.0, 300.0, 1720.0, 420.0, 48.0, accent, 3.0);

    let title = fit_width(c.title.trim(), 1600.0, SIZE_TITLE, false);
    end.text(
        cx,
        500.0,
        &title,
        TextStyle::new(SIZE_TITLE, TEXT_DARK).bold().centered(),
    );

    let underline = text_width(&title, SIZE_TITLE, false).clamp(200.0, 1600.0);
    end.rounded_rect(cx - underline / 2.0, 540.0, underline, 8.0, 4.0, accent, 1.0);

    let subtitle = fit_width(c.subtitle.trim(), 1500.0, SIZE_SUBTITLE, false);
    end.text(
        cx,
        630.0,
        &subtitle,
        TextStyle::new(SIZE_SUBTITLE, TEXT_GRAY).centered(),
    );
    layers
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    Prompt,
    Output,
    Success,
    Comment,
    Bullet,
    Plain,
}

fn classify_line(line: &str) -> (LineKind, &str) {
    let t = line.trim_start();
    if let Some(rest) = t.strip_prefix('$') {
        (LineKind::Prompt, rest.trim_start())
    } else if t.starts_with("python") || t.starts_with("cargo ") || t.starts_with("npm ") {
        (LineKind::Prompt, t)
    } else if let Some(rest) = t.strip_prefix('→') {
        (LineKind::Output, rest.trim_start())
    } else if let Some(rest) = t.strip_prefix('✓') {
        (LineKind::Success, rest.trim_start())
    } else if t.starts_with('#') {
        (LineKind::Comment, t)
    } else if let Some(rest) = t.strip_prefix("- ") {
        (LineKind::Bullet, rest)
    } else {
        (LineKind::Plain, t)
    }
}

pub fn command(c: &CommandContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let below = layers.header(accent, &c.header, &c.description);

    let end = &mut layers.end;
    let (x, y, w) = (CONTENT_X, below + 40.0, CONTENT_W);
    let shown = c.commands.len().min(MAX_TERMINAL_LINES);
    let h = (120.0 + shown as f32 * 56.0).max(300.0);
    end.rounded_rect(x + 6.0, y + 8.0, w, h, 24.0, CARD_SHADOW, 0.6);
    end.rounded_rect(x, y, w, h, 24.0, CODE_BG, 1.0);
    end.rounded_rect(x, y, w, 56.0, 24.0, Rgb8::new(51, 65, 85), 1.0);
    for (i, dot) in [
        Rgb8::new(239, 68, 68),
        Rgb8::new(234, 179, 8),
        ACCENT_GREEN,
    ]
    .into_iter()
    .enumerate()
    {
        end.circle(x + 36.0 + i as f32 * 32.0, y + 28.0, 9.0, dot, 1.0);
    }

    let text_w = w - 140.0;
    let mut baseline = y + 110.0;
    for line in c.commands.iter().take(MAX_TERMINAL_LINES) {
        let (kind, body) = classify_line(line);
        let text_x = x + 90.0;
        let style = TextStyle::new(SIZE_CODE, BG_WHITE).mono();
        match kind {
            LineKind::Prompt => {
                end.text(x + 40.0, baseline, "❯", style.bold().with_fill(accent));
                end.text(
                    text_x,
                    baseline,
                    &fit_width(body, text_w, SIZE_CODE, true),
                    style.with_fill(CODE_BLUE),
                );
            }
            LineKind::Output | LineKind::Success => {
                let mark = if kind == LineKind::Output { "→" } else { "✓" };
                end.text(x + 40.0, baseline, mark, style.with_fill(ACCENT_GREEN));
                end.text(
                    text_x,
                    baseline,
                    &fit_width(body, text_w, SIZE_CODE, true),
                    style.with_fill(ACCENT_GREEN),
                );
            }
            LineKind::Comment => {
                end.text(
                    x + 40.0,
                    baseline,
                    &fit_width(body, text_w + 50.0, SIZE_CODE, true),
                    style.with_fill(TEXT_LIGHT),
                );
            }
            LineKind::Bullet => {
                end.circle(x + 50.0, baseline - 10.0, 6.0, TEXT_LIGHT, 1.0);
                end.text(
                    text_x,
                    baseline,
                    &fit_width(body, text_w, SIZE_CODE, true),
                    style.with_fill(TEXT_LIGHT),
                );
            }
            LineKind::Plain => {
                end.text(
                    x + 40.0,
                    baseline,
                    &fit_width(body, text_w + 50.0, SIZE_CODE, true),
                    style,
                );
            }
        }
        baseline += 56.0;
    }
    if c.commands.len() > MAX_TERMINAL_LINES {
        let more = format!("+{} more", c.commands.len() - MAX_TERMINAL_LINES);
        end.text(
            x + w - 40.0,
            y + h - 30.0,
            &more,
            TextStyle::new(SIZE_SMALL, TEXT_LIGHT).anchored(Anchor::End),
        );
    }
    layers
}

pub fn list(c: &ListContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let below = layers.header(accent, &c.header, &c.description);

    let end = &mut layers.end;
    let top = below + 40.0;
    let shown = c.items.len().min(MAX_LIST_ITEMS);
    let container_h = (shown as f32 * 130.0 + 40.0).max(200.0);
    end.rounded_rect(CONTENT_X, top, CONTENT_W, container_h, 32.0, BG_WHITE, 0.4);
    end.outline(CONTENT_X, top, CONTENT_W, container_h, 32.0, accent, 2.0);

    let item_w = CONTENT_W - 40.0;
    for (i, item) in c.items.iter().take(MAX_LIST_ITEMS).enumerate() {
        let y = top + 20.0 + i as f32 * 130.0;
        card(end, CONTENT_X + 20.0, y, item_w, 110.0, 20.0);
        end.circle(CONTENT_X + 75.0, y + 55.0, 30.0, accent, 1.0);
        end.text(
            CONTENT_X + 75.0,
            y + 66.0,
            &(i + 1).to_string(),
            TextStyle::new(SIZE_SMALL, BG_WHITE).bold().centered(),
        );

        let (label, detail) = item.parts();
        let text_x = CONTENT_X + 130.0;
        let text_w = item_w - 140.0;
        match detail {
            Some(detail) if !detail.trim().is_empty() => {
                end.text(
                    text_x,
                    y + 48.0,
                    &fit_width(label.trim(), text_w, 36.0, false),
                    TextStyle::new(36.0, TEXT_DARK).bold(),
                );
                end.text(
                    text_x,
                    y + 90.0,
                    &fit_width(detail.trim(), text_w, SIZE_SMALL, false),
                    TextStyle::new(SIZE_SMALL, TEXT_GRAY),
                );
            }
            _ => {
                end.text(
                    text_x,
                    y + 68.0,
                    &fit_width(label.trim(), text_w, 36.0, false),
                    TextStyle::new(36.0, TEXT_DARK).bold(),
                );
            }
        }
    }
    if c.items.len() > MAX_LIST_ITEMS {
        let more = format!("+{} more", c.items.len() - MAX_LIST_ITEMS);
        end.text(
            CONTENT_X + CONTENT_W - 30.0,
            top + container_h + 50.0,
            &more,
            TextStyle::new(SIZE_SMALL, TEXT_GRAY).anchored(Anchor::End),
        );
    }
    layers
}

pub fn outro(c: &OutroContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let cx = WIDTH / 2.0;
    layers.both(|doc| {
        doc.circle(cx, 360.0, 110.0, accent, 0.15);
    });

    let end = &mut layers.end;
    end.circle(cx, 360.0, 80.0, accent, 1.0);
    end.path(
        &format!(
            "M{:.0} 362 L{:.0} 398 L{:.0} 322",
            cx - 38.0,
            cx - 10.0,
            cx + 42.0
        ),
        BG_WHITE,
        14.0,
        1.0,
    );

    let main = fit_width(c.main_text.trim(), 1600.0, 96.0, false);
    end.text(
        cx,
        600.0,
        &main,
        TextStyle::new(96.0, TEXT_DARK).bold().centered(),
    );

    let sub = fit_width(c.sub_text.trim(), 1400.0, SIZE_DESC, false);
    if !sub.is_empty() {
        let pill_w = text_width(&sub, SIZE_DESC, false) + 100.0;
        end.rounded_rect(cx - pill_w / 2.0, 660.0, pill_w, 80.0, 40.0, accent, 0.15);
        end.outline(cx - pill_w / 2.0, 660.0, pill_w, 80.0, 40.0, accent, 2.0);
        end.text(
            cx,
            713.0,
            &sub,
            TextStyle::new(SIZE_DESC, accent).bold().centered(),
        );
    }
    layers
}

pub fn quote(c: &QuoteContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let cx = WIDTH / 2.0;
    layers.both(|doc| {
        doc.circle(cx, 230.0, 70.0, accent, 0.15);
        doc.text(
            cx,
            275.0,
            "\u{201C}",
            TextStyle::new(140.0, accent).bold().centered(),
        );
    });

    let end = &mut layers.end;
    end.rounded_rect(cx - 60.0, 330.0, 120.0, 8.0, 4.0, accent, 1.0);

    let text = c.quote_text.trim();
    let size = if text.chars().count() <= 60 {
        SIZE_HEADER
    } else {
        SIZE_SUBTITLE
    };
    let lines = wrap_capped(text, 1500.0, size, false, MAX_QUOTE_LINES);
    let line_h = size * 1.4;
    let block_h = lines.len() as f32 * line_h;
    let first = 560.0 - block_h / 2.0 + size;
    let next = end.text_lines(
        cx,
        first,
        &lines,
        line_h,
        TextStyle::new(size, TEXT_DARK).bold().centered(),
    );

    let attribution = c.attribution.trim();
    if !attribution.is_empty() {
        let line = format!("\u{2014} {}", truncate(attribution, 80));
        end.text(
            cx,
            next + 40.0,
            &line,
            TextStyle::new(SIZE_DESC, TEXT_GRAY).centered(),
        );
    }
    layers
}
