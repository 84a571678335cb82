use super::*;

fn title(id: &str) -> Scene {
    Scene::new(
        id,
        SceneContent::Title(TitleContent {
            title: "Hello".to_string(),
            subtitle: String::new(),
        }),
    )
}

#[test]
fn scene_serializes_flat_with_type_tag() {
    let scene = title("intro").with_narration("Welcome");
    let v = serde_json::to_value(&scene).unwrap();
    assert_eq!(v["type"], "title");
    assert_eq!(v["id"], "intro");
    assert_eq!(v["title"], "Hello");
    assert_eq!(v["narration"], "Welcome");
    assert!(v.get("voice").is_none());

    let back: Scene = serde_json::from_value(v).unwrap();
    assert_eq!(back, scene);
}

#[test]
fn missing_required_field_fails_to_parse() {
    let err = serde_json::from_str::<Scene>(r#"{ "id": "a", "type": "command" }"#);
    assert!(err.is_err());
    let err = serde_json::from_str::<Scene>(r#"{ "id": "a", "type": "spinning_cube" }"#);
    assert!(err.is_err());
}

#[test]
fn list_items_accept_text_and_pairs() {
    let scene: Scene = serde_json::from_str(
        r#"{ "id": "l", "type": "list", "header": "H", "items": ["one", ["two", "detail"]] }"#,
    )
    .unwrap();
    let SceneContent::List(list) = &scene.content else {
        panic!("expected list");
    };
    assert_eq!(list.items[0].parts(), ("one", None));
    assert_eq!(list.items[1].parts(), ("two", Some("detail")));
    assert_eq!(scene.min_duration, DEFAULT_MIN_DURATION);
    assert_eq!(scene.max_duration, DEFAULT_MAX_DURATION);
}

#[test]
fn scene_type_parse_accepts_dashes_and_case() {
    assert_eq!(
        SceneType::parse("Learning-Objectives"),
        Some(SceneType::LearningObjectives)
    );
    assert_eq!(SceneType::parse("code_comparison"), Some(SceneType::CodeComparison));
    assert_eq!(SceneType::parse("slideshow"), None);
    for t in SceneType::ALL {
        assert_eq!(SceneType::parse(t.as_str()), Some(t));
    }
}

#[test]
fn difficulty_aliases() {
    let d: Difficulty = serde_json::from_str("\"beginner\"").unwrap();
    assert_eq!(d, Difficulty::Easy);
    let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
    assert_eq!(d, Difficulty::Hard);
}

#[test]
fn clamp_duration_respects_bounds() {
    let s = title("t").with_durations(3.0, 10.0);
    assert_eq!(s.clamp_duration(1.0), 3.0);
    assert_eq!(s.clamp_duration(5.5), 5.5);
    assert_eq!(s.clamp_duration(42.0), 10.0);
    assert_eq!(s.clamp_duration(f64::NAN), 3.0);
}

#[test]
fn scene_validation_rules() {
    assert!(title("ok").validate().is_ok());
    assert!(title("").validate().is_err());
    assert!(title(&"x".repeat(201)).validate().is_err());
    assert!(title("a/b").validate().is_err());
    assert!(title("t").with_durations(5.0, 4.0).validate().is_err());
    assert!(title("t").with_durations(0.0, 301.0).validate().is_err());

    let quiz = Scene::new(
        "q",
        SceneContent::Quiz(QuizContent {
            question: "?".to_string(),
            options: vec!["a".to_string()],
            correct_answer: String::new(),
            show_answer: true,
        }),
    );
    let err = quiz.validate().unwrap_err();
    assert!(matches!(err, ReelError::Structure(_)));
}

#[test]
fn video_and_set_validation() {
    let empty = Video::new("v", "V");
    assert!(matches!(empty.validate(), Err(ReelError::Structure(_))));

    let dup = Video::new("v", "V").with_scene(title("a")).with_scene(title("a"));
    assert!(dup.validate().is_err());

    let ok = Video::new("v", "V").with_scene(title("a"));
    ok.validate().unwrap();

    let set = VideoSet::new("s", "S");
    assert!(set.validate().is_err());
    let set = VideoSet::new("s", "S").with_video(ok.clone()).with_video(ok);
    assert!(set.validate().is_err());
}

#[test]
fn apply_defaults_fills_missing_accent_only() {
    let mut set = VideoSet::new("s", "S")
        .with_video(Video::new("a", "A").with_scene(title("t")))
        .with_video(
            Video::new("b", "B")
                .with_accent(Rgb8::new(1, 2, 3))
                .with_scene(title("t")),
        );
    set.defaults.accent_color = Some(Rgb8::new(9, 9, 9));
    set.apply_defaults();
    assert_eq!(set.videos[0].accent_color, Some(Rgb8::new(9, 9, 9)));
    assert_eq!(set.videos[1].accent_color, Some(Rgb8::new(1, 2, 3)));
    assert_eq!(set.scene_count(), 2);
}

#[test]
fn single_wraps_video() {
    let set = VideoSet::single(Video::new("intro", "Intro").with_scene(title("t")));
    assert_eq!(set.set_id, "intro_set");
    assert_eq!(set.set_name, "Intro");
    assert!(set.video("intro").is_some());
}
