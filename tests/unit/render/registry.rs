use std::sync::OnceLock;

use super::*;
use crate::scene::model::{
    CheckpointContent, CodeComparisonContent, CommandContent, Difficulty, ExerciseContent,
    LearningObjectivesContent, LessonInfo, ListContent, ListItem, OutroContent, ProblemContent,
    QuizContent, QuoteContent, SceneType, SolutionContent, TitleContent,
};

const ACCENT: Rgb8 = Rgb8::new(59, 130, 246);

fn renderer() -> &'static SceneRenderer {
    static R: OnceLock<SceneRenderer> = OnceLock::new();
    R.get_or_init(SceneRenderer::new)
}

fn content_for(ty: SceneType, text: &str) -> SceneContent {
    let s = || text.to_string();
    let many = || vec![s(); 12];
    match ty {
        SceneType::Title => SceneContent::Title(TitleContent {
            title: s(),
            subtitle: s(),
        }),
        SceneType::Command => SceneContent::Command(CommandContent {
            header: s(),
            description: s(),
            commands: vec![format!("$ {text}"), format!("→ {text}"), format!("# {text}"), s()],
        }),
        SceneType::List => SceneContent::List(ListContent {
            header: s(),
            description: s(),
            items: vec![
                ListItem::Text(s()),
                ListItem::Pair(s(), s()),
                ListItem::Text(s()),
                ListItem::Text(s()),
                ListItem::Text(s()),
                ListItem::Text(s()),
            ],
        }),
        SceneType::Outro => SceneContent::Outro(OutroContent {
            main_text: s(),
            sub_text: s(),
        }),
        SceneType::Quiz => SceneContent::Quiz(QuizContent {
            question: s(),
            options: vec![s(), s(), s(), s(), s()],
            correct_answer: "A".to_string(),
            show_answer: true,
        }),
        SceneType::LearningObjectives => {
            SceneContent::LearningObjectives(LearningObjectivesContent {
                lesson_title: s(),
                objectives: many(),
                lesson_info: LessonInfo {
                    duration: Some(30),
                    difficulty: Some(s()),
                    prerequisites: vec![s()],
                },
            })
        }
        SceneType::Exercise => SceneContent::Exercise(ExerciseContent {
            title: s(),
            instructions: many(),
            difficulty: Difficulty::Hard,
            estimated_time: Some(s()),
        }),
        SceneType::Checkpoint => SceneContent::Checkpoint(CheckpointContent {
            checkpoint_number: 2,
            completed_topics: many(),
            review_questions: many(),
            next_topics: many(),
        }),
        SceneType::Quote => SceneContent::Quote(QuoteContent {
            quote_text: s(),
            attribution: s(),
        }),
        SceneType::CodeComparison => SceneContent::CodeComparison(CodeComparisonContent {
            header: s(),
            before_code: format!("{text}\n{text}"),
            after_code: many().join("\n"),
            before_label: s(),
            after_label: s(),
        }),
        SceneType::Problem => SceneContent::Problem(ProblemContent {
            problem_number: 3,
            title: s(),
            problem_text: s(),
            difficulty: None,
        }),
        SceneType::Solution => SceneContent::Solution(SolutionContent {
            title: s(),
            solution_code: many(),
            explanation: s(),
        }),
    }
}

fn assert_renders(ty: SceneType, text: &str) {
    let scene = Scene::new(format!("{}_case", ty.as_str()), content_for(ty, text));
    let pair = renderer()
        .render(&scene, Some(ACCENT))
        .unwrap_or_else(|e| panic!("{} failed: {e}", ty.as_str()));
    assert_eq!(pair.start.dimensions(), (1920, 1080), "{}", ty.as_str());
    assert_eq!(pair.end.dimensions(), (1920, 1080), "{}", ty.as_str());
    assert!(!pair.is_static(), "{} keyframes are identical", ty.as_str());
}

#[test]
fn every_type_renders_empty_fields() {
    for ty in SceneType::ALL {
        assert_renders(ty, "");
    }
}

#[test]
fn every_type_renders_unicode_fields() {
    for ty in SceneType::ALL {
        assert_renders(ty, "日本語のテキスト ✓ émoji 🎬 <tag> & \"quotes\"\tcontrol\u{7}");
    }
}

#[test]
fn every_type_renders_overlong_fields() {
    let long = "word ".repeat(60) + &"x".repeat(120);
    assert!(long.chars().count() > 200);
    for ty in SceneType::ALL {
        assert_renders(ty, &long);
    }
}

#[test]
fn keyframes_differ_without_any_fonts() {
    let fontless = SceneRenderer::with_rasterizer(Rasterizer::with_fontdb(
        Arc::new(usvg::fontdb::Database::new()),
        BG_LIGHT,
    ));
    for ty in SceneType::ALL {
        let scene = Scene::new("s", content_for(ty, "text"));
        let pair = fontless.render(&scene, Some(ACCENT)).unwrap();
        assert!(!pair.is_static(), "{}", ty.as_str());
    }
}

#[test]
fn missing_accent_is_a_render_error() {
    let scene = Scene::new("s", content_for(SceneType::Title, "Hello"));
    let err = renderer().render(&scene, None).unwrap_err();
    assert!(matches!(err, ReelError::Render(_)));
    assert!(err.to_string().contains("'s'"));
}

#[test]
fn accent_color_changes_the_frame() {
    let scene = Scene::new("s", content_for(SceneType::Outro, "Bye"));
    let blue = renderer().render(&scene, Some(ACCENT)).unwrap();
    let pink = renderer()
        .render(&scene, Some(Rgb8::new(236, 72, 153)))
        .unwrap();
    assert_ne!(blue.end.as_raw(), pink.end.as_raw());
}

#[test]
fn layouts_are_deterministic() {
    let content = content_for(SceneType::Quiz, "Which one?");
    let a = compose(&content, ACCENT);
    let b = compose(&content, ACCENT);
    assert_eq!(a.start.finish(), b.start.finish());
    assert_eq!(a.end.finish(), b.end.finish());
}
