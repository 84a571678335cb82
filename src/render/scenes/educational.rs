//! Quiz, learning-objective, exercise, problem and solution layouts.

use crate::{
    foundation::core::Rgb8,
    render::base::{CONTENT_W, CONTENT_X, Layers, WIDTH, badge, card},
    render::svg::TextStyle,
    render::text::{fit_width, truncate, wrap_capped},
    render::theme::{
        ACCENT_GREEN, BG_WHITE, CODE_BG, CODE_BLUE, SIZE_CODE, SIZE_DESC, SIZE_HEADER,
        SIZE_SMALL, SIZE_TINY, TEXT_DARK, TEXT_GRAY, TEXT_LIGHT, difficulty_color,
    },
    scene::model::{
        ExerciseContent, LearningObjectivesContent, ProblemContent, QuizContent, SolutionContent,
    },
};

const MAX_QUESTION_LINES: usize = 3;
const MAX_OPTIONS: usize = 4;
const OPTION_CHARS: usize = 50;
const MAX_OBJECTIVES: usize = 8;
const OBJECTIVE_CHARS: usize = 70;
const MAX_INSTRUCTIONS: usize = 8;
const INSTRUCTION_CHARS: usize = 80;
const MAX_PROBLEM_LINES: usize = 8;
const MAX_SOLUTION_LINES: usize = 12;
const MAX_EXPLANATION_LINES: usize = 3;

fn option_letter(i: usize) -> char {
    (b'A' + i as u8) as char
}

/// Whether `option` is the quiz answer, by letter (`B`), full text, or `B) text` form.
fn is_correct(option: &str, index: usize, answer: &str) -> bool {
    let answer = answer.trim();
    if answer.is_empty() {
        return false;
    }
    let letter = option_letter(index);
    if answer.len() == 1 && answer.eq_ignore_ascii_case(&letter.to_string()) {
        return true;
    }
    let option = option.trim();
    if option.eq_ignore_ascii_case(answer) {
        return true;
    }
    let stripped = answer
        .strip_prefix(letter)
        .or_else(|| answer.strip_prefix(letter.to_ascii_lowercase()))
        .map(|rest| rest.trim_start_matches([')', '.', ':']).trim());
    stripped.is_some_and(|rest| !rest.is_empty() && rest.eq_ignore_ascii_case(option))
}

pub fn quiz(c: &QuizContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let question = wrap_capped(c.question.trim(), CONTENT_W, 56.0, false, MAX_QUESTION_LINES);
    layers.both(|doc| {
        doc.text_lines(
            CONTENT_X,
            220.0,
            &question,
            72.0,
            TextStyle::new(56.0, TEXT_DARK).bold(),
        );
    });

    let end = &mut layers.end;
    badge(end, CONTENT_X, 90.0, "QUIZ", accent, SIZE_SMALL);

    let (card_w, card_h, gap) = (820.0, 130.0, 40.0);
    let grid_x = (WIDTH - (2.0 * card_w + gap)) / 2.0;
    let grid_y = 520.0;
    for (i, option) in c.options.iter().take(MAX_OPTIONS).enumerate() {
        let x = grid_x + (i % 2) as f32 * (card_w + gap);
        let y = grid_y + (i / 2) as f32 * (card_h + gap);
        let correct = c.show_answer && is_correct(option, i, &c.correct_answer);

        card(end, x, y, card_w, card_h, 24.0);
        if correct {
            end.rounded_rect(x, y, card_w, card_h, 24.0, ACCENT_GREEN, 0.15);
            end.outline(x, y, card_w, card_h, 24.0, ACCENT_GREEN, 4.0);
        }
        let circle = if correct { ACCENT_GREEN } else { accent };
        end.circle(x + 65.0, y + card_h / 2.0, 34.0, circle, 1.0);
        end.text(
            x + 65.0,
            y + card_h / 2.0 + 12.0,
            &option_letter(i).to_string(),
            TextStyle::new(SIZE_CODE, BG_WHITE).bold().centered(),
        );
        let label = fit_width(
            &truncate(option.trim(), OPTION_CHARS),
            card_w - 190.0,
            SIZE_CODE,
            false,
        );
        end.text(
            x + 120.0,
            y + card_h / 2.0 + 11.0,
            &label,
            TextStyle::new(SIZE_CODE, TEXT_DARK),
        );
        if correct {
            end.text(
                x + card_w - 50.0,
                y + card_h / 2.0 + 14.0,
                "✓",
                TextStyle::new(40.0, ACCENT_GREEN).bold().centered(),
            );
        }
    }
    layers
}

pub fn learning_objectives(c: &LearningObjectivesContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let below = layers.header(accent, &c.lesson_title, "Learning Objectives");

    let end = &mut layers.end;
    let shown = c.objectives.len().min(MAX_OBJECTIVES);
    let row_h = 70.0;
    let panel_h = (shown as f32 * row_h + 60.0).max(160.0);
    card(end, CONTENT_X, below + 30.0, CONTENT_W, panel_h, 28.0);

    let mut y = below + 60.0;
    for objective in c.objectives.iter().take(MAX_OBJECTIVES) {
        end.circle(CONTENT_X + 60.0, y + 25.0, 20.0, accent, 1.0);
        end.path(
            &format!(
                "M{:.0} {:.0} L{:.0} {:.0} L{:.0} {:.0}",
                CONTENT_X + 50.0,
                y + 25.0,
                CONTENT_X + 57.0,
                y + 33.0,
                CONTENT_X + 71.0,
                y + 17.0
            ),
            BG_WHITE,
            4.0,
            1.0,
        );
        let text = fit_width(
            &truncate(objective.trim(), OBJECTIVE_CHARS),
            CONTENT_W - 140.0,
            SIZE_CODE,
            false,
        );
        end.text(
            CONTENT_X + 100.0,
            y + 36.0,
            &text,
            TextStyle::new(SIZE_CODE, TEXT_DARK),
        );
        y += row_h;
    }
    if c.objectives.len() > MAX_OBJECTIVES {
        let more = format!("+{} more", c.objectives.len() - MAX_OBJECTIVES);
        end.text(
            CONTENT_X + 100.0,
            y + 30.0,
            &more,
            TextStyle::new(SIZE_SMALL, TEXT_GRAY),
        );
    }

    let info = &c.lesson_info;
    let mut parts = Vec::new();
    if let Some(minutes) = info.duration {
        parts.push(format!("{minutes} min"));
    }
    if let Some(difficulty) = info.difficulty.as_deref().filter(|d| !d.trim().is_empty()) {
        parts.push(difficulty.trim().to_string());
    }
    if !info.prerequisites.is_empty() {
        parts.push(format!("Requires: {}", info.prerequisites.join(", ")));
    }
    if !parts.is_empty() {
        let line = fit_width(&parts.join("  •  "), CONTENT_W, SIZE_SMALL, false);
        end.text(
            CONTENT_X,
            below + panel_h + 90.0,
            &line,
            TextStyle::new(SIZE_SMALL, TEXT_GRAY),
        );
    }
    layers
}

pub fn exercise(c: &ExerciseContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let below = layers.header(accent, &c.title, "Exercise");

    let end = &mut layers.end;
    let badge_w = badge(
        end,
        CONTENT_X,
        below + 10.0,
        c.difficulty.label(),
        difficulty_color(c.difficulty),
        SIZE_TINY,
    );
    if let Some(time) = c.estimated_time.as_deref().filter(|t| !t.trim().is_empty()) {
        end.text(
            CONTENT_X + badge_w + 30.0,
            below + 42.0,
            &format!("⏱ {}", truncate(time.trim(), 30)),
            TextStyle::new(SIZE_SMALL, TEXT_GRAY),
        );
    }

    let top = below + 90.0;
    let shown = c.instructions.len().min(MAX_INSTRUCTIONS);
    let row_h = 68.0;
    let panel_h = (shown as f32 * row_h + 50.0).max(150.0);
    card(end, CONTENT_X, top, CONTENT_W, panel_h, 28.0);

    let mut y = top + 25.0;
    for (i, instruction) in c.instructions.iter().take(MAX_INSTRUCTIONS).enumerate() {
        end.rounded_rect(CONTENT_X + 36.0, y + 6.0, 48.0, 48.0, 12.0, accent, 1.0);
        end.text(
            CONTENT_X + 60.0,
            y + 40.0,
            &(i + 1).to_string(),
            TextStyle::new(SIZE_SMALL, BG_WHITE).bold().centered(),
        );
        let text = fit_width(
            &truncate(instruction.trim(), INSTRUCTION_CHARS),
            CONTENT_W - 150.0,
            SIZE_CODE,
            false,
        );
        end.text(
            CONTENT_X + 110.0,
            y + 42.0,
            &text,
            TextStyle::new(SIZE_CODE, TEXT_DARK),
        );
        y += row_h;
    }
    if c.instructions.len() > MAX_INSTRUCTIONS {
        let more = format!("+{} more", c.instructions.len() - MAX_INSTRUCTIONS);
        end.text(
            CONTENT_X + 110.0,
            top + panel_h + 45.0,
            &more,
            TextStyle::new(SIZE_SMALL, TEXT_GRAY),
        );
    }
    layers
}

pub fn problem(c: &ProblemContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let number = format!("Problem {}", c.problem_number);
    let title = fit_width(c.title.trim(), CONTENT_W, SIZE_HEADER, false);
    layers.both(|doc| {
        badge(doc, CONTENT_X, 90.0, &number, accent, SIZE_SMALL);
        doc.text(
            CONTENT_X,
            230.0,
            &title,
            TextStyle::new(SIZE_HEADER, TEXT_DARK).bold(),
        );
    });

    let end = &mut layers.end;
    let (label, color) = match c.difficulty {
        Some(d) => (d.label(), difficulty_color(d)),
        None => ("PROBLEM", CODE_BLUE),
    };
    badge(end, WIDTH - CONTENT_X - 260.0, 90.0, label, color, SIZE_TINY);

    let lines = wrap_capped(
        c.problem_text.trim(),
        CONTENT_W - 120.0,
        SIZE_DESC,
        false,
        MAX_PROBLEM_LINES,
    );
    let panel_h = (lines.len() as f32 * 56.0 + 80.0).max(200.0);
    card(end, CONTENT_X, 290.0, CONTENT_W, panel_h, 28.0);
    end.rect(CONTENT_X, 290.0, 10.0, panel_h, accent, 1.0);
    end.text_lines(
        CONTENT_X + 60.0,
        360.0,
        &lines,
        56.0,
        TextStyle::new(SIZE_DESC, TEXT_DARK),
    );
    layers
}

pub fn solution(c: &SolutionContent, accent: Rgb8) -> Layers {
    let mut layers = Layers::new(accent);
    let below = layers.header(accent, &c.title, "");

    let end = &mut layers.end;
    let shown = c.solution_code.len().min(MAX_SOLUTION_LINES);
    let line_h = 44.0;
    let panel_y = below + 20.0;
    let panel_h = (shown as f32 * line_h + 60.0).max(160.0);
    end.rounded_rect(CONTENT_X, panel_y, CONTENT_W, panel_h, 24.0, CODE_BG, 1.0);
    end.rect(CONTENT_X, panel_y + 24.0, 8.0, panel_h - 48.0, accent, 1.0);

    let code: Vec<String> = c
        .solution_code
        .iter()
        .take(MAX_SOLUTION_LINES)
        .map(|l| fit_width(l.trim_end(), CONTENT_W - 100.0, 30.0, true))
        .collect();
    end.text_lines(
        CONTENT_X + 50.0,
        panel_y + 60.0,
        &code,
        line_h,
        TextStyle::new(30.0, BG_WHITE).mono(),
    );
    if c.solution_code.len() > MAX_SOLUTION_LINES {
        end.text(
            CONTENT_X + 50.0,
            panel_y + panel_h - 14.0,
            "...",
            TextStyle::new(30.0, TEXT_LIGHT).mono(),
        );
    }

    let explanation = wrap_capped(
        c.explanation.trim(),
        CONTENT_W,
        SIZE_SMALL,
        false,
        MAX_EXPLANATION_LINES,
    );
    end.text_lines(
        CONTENT_X,
        panel_y + panel_h + 60.0,
        &explanation,
        40.0,
        TextStyle::new(SIZE_SMALL, TEXT_GRAY),
    );
    layers
}
