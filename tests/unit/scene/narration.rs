use super::*;
use crate::scene::model::{
    CheckpointContent, CommandContent, ListContent, OutroContent, TitleContent,
};

fn scene(content: SceneContent) -> Scene {
    Scene::new("s", content)
}

#[test]
fn title_template_uses_subtitle_when_opening() {
    let s = scene(SceneContent::Title(TitleContent {
        title: "Rust".to_string(),
        subtitle: "Ownership".to_string(),
    }));
    assert_eq!(
        template_narration(&s, 0, 3),
        "Welcome to Rust: Ownership. Let's get started."
    );
}

#[test]
fn list_and_command_templates_count_entries() {
    let list = scene(SceneContent::List(ListContent {
        header: "Features".to_string(),
        description: String::new(),
        items: vec!["a".into(), "b".into()],
    }));
    assert_eq!(
        template_narration(&list, 1, 3),
        "Let's look at Features. We have 2 key points to cover."
    );

    let cmd = scene(SceneContent::Command(CommandContent {
        header: "Install Tools".to_string(),
        description: String::new(),
        commands: vec!["$ cargo install x".to_string()],
    }));
    assert_eq!(
        template_narration(&cmd, 1, 3),
        "Here's how to install tools. We'll run 1 commands to get set up."
    );
}

#[test]
fn checkpoint_reports_progress() {
    let s = scene(SceneContent::Checkpoint(CheckpointContent {
        checkpoint_number: 1,
        completed_topics: vec![],
        review_questions: vec![],
        next_topics: vec![],
    }));
    assert!(template_narration(&s, 2, 4).contains("50%"));
}

#[test]
fn fill_missing_keeps_existing_narration() {
    let mut scenes = vec![
        scene(SceneContent::Title(TitleContent {
            title: "T".to_string(),
            subtitle: String::new(),
        }))
        .with_narration("Hand written"),
        scene(SceneContent::Outro(OutroContent {
            main_text: "Bye".to_string(),
            sub_text: "See docs".to_string(),
        })),
    ];
    assert_eq!(fill_missing_narration(&mut scenes), 1);
    assert_eq!(scenes[0].narration, "Hand written");
    assert_eq!(scenes[1].narration, "Bye. See docs. Thanks for watching!");
}

#[test]
fn speech_estimate_uses_words_per_second() {
    assert_eq!(word_count("  one two\tthree  "), 3);
    assert!((estimated_speech_secs("a b c d e") - 2.0).abs() < 1e-9);
}
