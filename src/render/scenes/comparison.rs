//! Side-by-side layouts: code comparison and checkpoint columns.

use crate::{
    foundation::core::Rgb8,
    render::base::{CONTENT_X, Layers, WIDTH, badge, card},
    render::svg::{SvgDoc, TextStyle},
    render::text::{fit_width, truncate},
    render::theme::{
        ACCENT_GREEN, ACCENT_ORANGE, ACCENT_PINK, BG_WHITE, CODE_BG, SIZE_SMALL, SIZE_TINY,
        TEXT_DARK, TEXT_GRAY, TEXT_LIGHT,
    },
    scene::model::{CheckpointContent, CodeComparisonContent},
};

const MAX_CODE_LINES: usize = 10;
const MAX_COLUMN_ITEMS: usize = 6;
const COLUMN_ITEM_CHARS: usize = 40;

const PANEL_W: f32 = 780.0;
const PANEL_Y: f32 = 300.0;
const PANEL_H: f32 = 640.0;

/// Non-blank lines of a code block, capped.
fn code_lines(code: &str) -> Vec<&str> {
    code.lines()
        .filter(|l| !l.trim().is_empty())
        .take(MAX_CODE_LINES)
        .collect()
}

fn code_panel(doc: &mut SvgDoc, x: f32, label: &str, label_color: Rgb8, code: &str) {
    doc.rounded_rect(x, PANEL_Y, PANEL_W, PANEL_H, 24.0, CODE_BG, 1.0);
    badge(doc, x + 30.0, PANEL_Y + 26.0, label, label_color, SIZE_TINY);

    let mut baseline = PANEL_Y + 140.0;
    for line in code_lines(code) {
        let text = fit_width(line.trim_end(), PANEL_W - 70.0, 26.0, true);
        doc.text(
            x + 35.0,
            baseline,
            &text,
            TextStyle::new(26.0, BG_WHITE).mono(),
        );
        baseline += 46.0;
    }
}

pub fn code_comparison(c: &CodeComparisonContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let header = if c.header.trim().is_empty() {
        "Code Comparison"
    } else {
        c.header.as_str()
    };
    layers.header(accent, header, "");

    let end = &mut layers.end;
    let gap = WIDTH - 2.0 * CONTENT_X - 2.0 * PANEL_W;
    let left = CONTENT_X;
    let right = CONTENT_X + PANEL_W + gap;
    code_panel(end, left, &truncate(c.before_label.trim(), 24), ACCENT_PINK, &c.before_code);
    code_panel(end, right, &truncate(c.after_label.trim(), 24), ACCENT_GREEN, &c.after_code);

    let mid_x = left + PANEL_W + gap / 2.0;
    let mid_y = PANEL_Y + PANEL_H / 2.0;
    end.circle(mid_x, mid_y, 44.0, accent, 1.0);
    end.path(
        &format!(
            "M{:.0} {mid_y:.0} L{:.0} {mid_y:.0} M{:.0} {:.0} L{:.0} {mid_y:.0} L{:.0} {:.0}",
            mid_x - 20.0,
            mid_x + 20.0,
            mid_x + 6.0,
            mid_y - 14.0,
            mid_x + 20.0,
            mid_x + 6.0,
            mid_y + 14.0
        ),
        BG_WHITE,
        6.0,
        1.0,
    );
    layers
}

fn checkpoint_column(
    doc: &mut SvgDoc,
    x: f32,
    title: &str,
    color: Rgb8,
    marker: &str,
    items: &[String],
) {
    let (y, w, h) = (300.0, 450.0, 620.0);
    card(doc, x, y, w, h, 28.0);
    doc.rounded_rect(x, y, w, 80.0, 28.0, color, 1.0);
    doc.rect(x, y + 52.0, w, 28.0, color, 1.0);
    doc.text(
        x + w / 2.0,
        y + 52.0,
        title,
        TextStyle::new(34.0, BG_WHITE).bold().centered(),
    );

    let mut baseline = y + 140.0;
    for item in items.iter().take(MAX_COLUMN_ITEMS) {
        doc.text(
            x + 30.0,
            baseline,
            marker,
            TextStyle::new(SIZE_SMALL, color).bold(),
        );
        let text = fit_width(
            &truncate(item.trim(), COLUMN_ITEM_CHARS),
            w - 90.0,
            SIZE_TINY,
            false,
        );
        doc.text(
            x + 70.0,
            baseline,
            &text,
            TextStyle::new(SIZE_TINY, TEXT_DARK),
        );
        baseline += 76.0;
    }
    if items.len() > MAX_COLUMN_ITEMS {
        doc.text(
            x + 70.0,
            y + h - 24.0,
            &format!("+{} more", items.len() - MAX_COLUMN_ITEMS),
            TextStyle::new(SIZE_TINY, TEXT_LIGHT),
        );
    }
}

pub fn checkpoint(c: &CheckpointContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let title = format!("Checkpoint {}", c.checkpoint_number);
    layers.header(accent, &title, "Review your progress");

    let end = &mut layers.end;
    let (start_x, col_w, gap) = (225.0, 450.0, 60.0);
    let columns = [
        ("Completed", ACCENT_GREEN, "✓", &c.completed_topics),
        ("Review", ACCENT_ORANGE, "?", &c.review_questions),
        ("Next", accent, "→", &c.next_topics),
    ];
    for (i, (name, color, marker, items)) in columns.into_iter().enumerate() {
        let x = start_x + i as f32 * (col_w + gap);
        checkpoint_column(end, x, name, color, marker, items);
    }

    let total = c.completed_topics.len();
    if total > 0 {
        end.text(
            WIDTH / 2.0,
            990.0,
            &format!("{total} topics completed"),
            TextStyle::new(SIZE_TINY, TEXT_GRAY).centered(),
        );
    }
    layers
}
