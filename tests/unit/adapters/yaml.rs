use super::*;
use crate::scene::model::{Difficulty, ListItem, SceneContent};

const VIDEO_DOC: &str = r##"
video:
  id: intro
  title: Intro to Rust
  accent_color: purple
  voices: [male, female]
scenes:
  - id: s1
    type: title
    title: Hello
    subtitle: World
    narration: Welcome.
  - scene_id: s2
    scene_type: list
    visual_content:
      header: Topics
      items:
        - Ownership
        - [Borrowing, "shared and unique"]
  - id: s3
    type: problem
    title: Two Sum
    difficulty: hard
    min_duration: 4
    max_duration: 9.5
"##;

fn opts() -> AdaptOptions {
    AdaptOptions {
        auto_narration: false,
        ..AdaptOptions::default()
    }
}

async fn parse(text: &str) -> ReelResult<VideoSet> {
    parse_yaml_str(text, None, &opts()).await
}

fn structure_msg(err: ReelError) -> String {
    match err {
        ReelError::Structure(msg) => msg,
        other => panic!("expected structure error, got {other:?}"),
    }
}

#[tokio::test]
async fn per_video_document_keeps_order_and_fields() {
    let set = parse(VIDEO_DOC).await.unwrap();
    assert_eq!(set.videos.len(), 1);
    let video = &set.videos[0];
    assert_eq!(video.video_id, "intro");
    assert_eq!(video.title, "Intro to Rust");
    assert_eq!(video.accent_color, Some(Rgb8::new(139, 92, 246)));
    assert_eq!(video.voices, vec!["male", "female"]);

    let types: Vec<SceneType> = video.scenes.iter().map(Scene::scene_type).collect();
    assert_eq!(
        types,
        vec![SceneType::Title, SceneType::List, SceneType::Problem]
    );

    let SceneContent::List(list) = &video.scenes[1].content else {
        unreachable!()
    };
    assert_eq!(video.scenes[1].id, "s2");
    assert_eq!(list.header, "Topics");
    assert_eq!(
        list.items,
        vec![
            ListItem::Text("Ownership".into()),
            ListItem::Pair("Borrowing".into(), "shared and unique".into())
        ]
    );

    let problem = &video.scenes[2];
    let SceneContent::Problem(p) = &problem.content else {
        unreachable!()
    };
    assert_eq!(p.difficulty, Some(Difficulty::Hard));
    assert_eq!(p.problem_number, 1);
    assert_eq!((problem.min_duration, problem.max_duration), (4.0, 9.5));
    assert!(problem.narration.is_empty());
}

#[tokio::test]
async fn missing_video_key_is_a_structure_error() {
    let msg = structure_msg(parse("scenes:\n  - id: a\n    type: title\n    title: x\n").await.unwrap_err());
    assert!(msg.contains("'video'"), "{msg}");

    let msg = structure_msg(parse("name: nothing useful\n").await.unwrap_err());
    assert!(msg.contains("'video'"), "{msg}");
}

#[tokio::test]
async fn missing_scenes_key_is_a_structure_error() {
    let msg = structure_msg(parse("video:\n  id: v\n").await.unwrap_err());
    assert!(msg.contains("'scenes'"), "{msg}");
}

#[tokio::test]
async fn unknown_scene_type_names_the_scene() {
    let doc = "video: {id: v}\nscenes:\n  - {id: a, type: title, title: t}\n  - {id: b, type: hologram}\n";
    let msg = structure_msg(parse(doc).await.unwrap_err());
    assert!(msg.contains("$.scenes[1]"), "{msg}");
    assert!(msg.contains("hologram"), "{msg}");
}

#[tokio::test]
async fn missing_required_field_is_a_structure_error() {
    let doc = "video: {id: v}\nscenes:\n  - {id: a, type: command}\n";
    let msg = structure_msg(parse(doc).await.unwrap_err());
    assert!(msg.contains("header"), "{msg}");
}

#[tokio::test]
async fn malformed_yaml_and_non_mapping_roots_fail() {
    assert!(matches!(
        parse("video: [unclosed").await.unwrap_err(),
        ReelError::Structure(_)
    ));
    assert!(matches!(
        parse("- just\n- a list\n").await.unwrap_err(),
        ReelError::Structure(_)
    ));
    assert!(matches!(parse("").await.unwrap_err(), ReelError::Structure(_)));
}

#[tokio::test]
async fn variables_are_substituted() {
    let doc = r#"
variables:
  product: Scenereel
  version: 2
video:
  id: v
  title: "${product} v${version}"
scenes:
  - id: a
    type: outro
    main_text: "Try ${product}"
    sub_text: "${site|example.com}"
    narration: "${unknown} stays"
"#;
    let set = parse(doc).await.unwrap();
    let video = &set.videos[0];
    assert_eq!(video.title, "Scenereel v2");
    let SceneContent::Outro(o) = &video.scenes[0].content else {
        unreachable!()
    };
    assert_eq!(o.main_text, "Try Scenereel");
    assert_eq!(o.sub_text, "example.com");
    assert_eq!(video.scenes[0].narration, "${unknown} stays");
}

#[tokio::test]
async fn auto_narration_fills_only_empty_scenes() {
    let o = AdaptOptions {
        auto_narration: true,
        ..AdaptOptions::default()
    };
    let set = parse_yaml_str(VIDEO_DOC, None, &o).await.unwrap();
    let scenes = &set.videos[0].scenes;
    assert_eq!(scenes[0].narration, "Welcome.");
    assert!(scenes[1].narration.starts_with("Let's look at Topics."));
    assert!(scenes.iter().all(Scene::has_narration));
}

#[tokio::test]
async fn set_document_reads_files_and_inline_videos() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("one.yaml"),
        "video: {id: one, title: One}\nscenes:\n  - {id: t, type: title, title: \"${course}\"}\n  - {id: q, type: quote, quote_text: Hi, min_duration: 2}\n",
    )
    .unwrap();
    let set_doc = r##"
variables:
  course: Rust 101
set:
  id: course
  name: Course
  defaults:
    accent_color: "#102030"
    voice: female
    min_duration: 5
    max_duration: 20
  videos:
    - one.yaml
    - id: two
      title: Two
      scenes:
        - {id: o, type: outro, main_text: Bye}
"##;
    let set_path = dir.path().join("course.yml");
    std::fs::write(&set_path, set_doc).unwrap();

    let set = load_yaml_file(&set_path, &opts()).await.unwrap();
    assert_eq!(set.set_id, "course");
    assert_eq!(set.set_name, "Course");
    assert_eq!(set.defaults.voice.as_deref(), Some("female"));
    assert_eq!(set.videos.len(), 2);

    let one = &set.videos[0];
    let SceneContent::Title(t) = &one.scenes[0].content else {
        unreachable!()
    };
    assert_eq!(t.title, "Rust 101");
    assert_eq!(
        (one.scenes[0].min_duration, one.scenes[0].max_duration),
        (5.0, 20.0)
    );
    assert_eq!(
        (one.scenes[1].min_duration, one.scenes[1].max_duration),
        (2.0, 20.0)
    );
    assert_eq!(set.videos[1].video_id, "two");
    assert_eq!(set.videos[1].scenes[0].scene_type(), SceneType::Outro);
}

#[tokio::test]
async fn set_with_missing_video_file_is_source_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let doc = "set:\n  id: s\n  videos: [missing.yaml]\n";
    let err = parse_yaml_str(doc, Some(dir.path()), &opts())
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::SourceNotFound(_)));
}

#[tokio::test]
async fn set_without_videos_is_rejected() {
    let msg = structure_msg(parse("set:\n  id: s\n").await.unwrap_err());
    assert!(msg.contains("videos"), "{msg}");
}

#[tokio::test]
async fn non_yaml_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("video.txt");
    std::fs::write(&path, VIDEO_DOC).unwrap();
    let err = load_yaml_file(&path, &opts()).await.unwrap_err();
    assert!(matches!(err, ReelError::Structure(_)));
}
