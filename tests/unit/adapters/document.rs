use super::*;
use crate::scene::model::SceneType;

const GUIDE: &str = "\
*Generated: today*

# Rust Guide

## Installation
Install the toolchain first.
```bash
# fetch rustup
curl https://sh.rustup.rs | sh
rustup default stable
```

## Features
- **Fast** builds
- [Safe](https://example.com) memory
- Great `tooling`
- Friendly community

## Philosophy
Rust values safety. It also values speed. And productivity matters too.
";

fn opts() -> AdaptOptions {
    AdaptOptions::default()
}

fn types(scenes: &[Scene]) -> Vec<SceneType> {
    scenes.iter().map(Scene::scene_type).collect()
}

#[test]
fn guide_yields_title_command_lists_outro() {
    let set = parse_document(GUIDE, "guide", "test", &opts()).unwrap();
    assert_eq!(set.set_id, "guide");
    assert_eq!(set.set_name, "Rust Guide");
    assert_eq!(set.videos.len(), 1);

    let video = &set.videos[0];
    assert_eq!(video.video_id, "guide_main");
    assert_eq!(
        types(&video.scenes),
        vec![
            SceneType::Title,
            SceneType::Command,
            SceneType::List,
            SceneType::List,
            SceneType::Outro
        ]
    );
    assert_eq!(video.scenes[0].id, "guide_main_title");
    assert_eq!(video.scenes.last().unwrap().id, "guide_main_outro");

    let SceneContent::Command(cmd) = &video.scenes[1].content else {
        panic!("expected command scene");
    };
    assert_eq!(
        cmd.commands,
        vec!["curl https://sh.rustup.rs | sh", "rustup default stable"]
    );
    assert_eq!(cmd.description, "Install the toolchain first.");
    assert_eq!(video.scenes[1].narration, "Here's how to installation.");

    let SceneContent::List(list) = &video.scenes[2].content else {
        panic!("expected list scene");
    };
    assert_eq!(list.items[0], ListItem::Text("Fast builds".into()));
    assert_eq!(list.items[1], ListItem::Text("Safe memory".into()));
    assert_eq!(
        video.scenes[2].narration,
        "This section covers features: Fast builds, Safe memory, Great tooling, and 1 more topics."
    );

    let SceneContent::List(prose) = &video.scenes[3].content else {
        panic!("expected prose list");
    };
    assert_eq!(prose.description, "Rust values safety");
    assert_eq!(prose.items.len(), 2);
    assert_eq!(video.scenes[3].narration, "About philosophy.");

    let SceneContent::Outro(outro) = &video.scenes[4].content else {
        panic!("expected outro");
    };
    assert_eq!(outro.main_text, "Learn More");
    assert_eq!(outro.sub_text, "See Full Documentation");
    assert_eq!(video.scenes[4].narration, OUTRO_NARRATION);
}

#[test]
fn max_scenes_bounds_the_total() {
    for max in 2..=6 {
        let o = AdaptOptions {
            max_scenes: max,
            ..opts()
        };
        let set = parse_document(GUIDE, "guide", "test", &o).unwrap();
        let scenes = &set.videos[0].scenes;
        assert!(scenes.len() <= max, "max {max}: got {}", scenes.len());
        assert_eq!(scenes[0].scene_type(), SceneType::Title);
        assert_eq!(scenes.last().unwrap().scene_type(), SceneType::Outro);
    }
}

#[test]
fn target_duration_lowers_the_budget() {
    let o = AdaptOptions {
        target_duration: Some(24.0),
        ..opts()
    };
    assert_eq!(content_budget(&o), 1);
    let o = AdaptOptions {
        target_duration: Some(80.0),
        max_scenes: 5,
        ..opts()
    };
    assert_eq!(content_budget(&o), 3);
    assert_eq!(content_budget(&opts()), 6);
}

#[test]
fn merge_picks_the_lightest_adjacent_pair() {
    let mk = |h: &str, n: usize| {
        let mut s = Section::new(h, 2);
        s.text = vec!["x".to_string(); n];
        s
    };
    let merged = merge_to_budget(vec![mk("A", 5), mk("B", 1), mk("C", 1), mk("D", 1)], 3);
    let headings: Vec<&str> = merged.iter().map(|s| s.heading.as_str()).collect();
    assert_eq!(headings, vec!["A", "B & C", "D"]);

    let merged = merge_to_budget(vec![mk("A", 1), mk("B", 1), mk("C", 1)], 1);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].heading, "A & B & C");
    assert_eq!(merged[0].weight(), 3);
}

#[test]
fn merged_code_section_stays_a_command() {
    let o = AdaptOptions {
        max_scenes: 3,
        ..opts()
    };
    let set = parse_document(GUIDE, "guide", "test", &o).unwrap();
    let scenes = &set.videos[0].scenes;
    assert_eq!(scenes.len(), 3);
    assert_eq!(scenes[1].scene_type(), SceneType::Command);
    let SceneContent::Command(cmd) = &scenes[1].content else {
        unreachable!()
    };
    assert!(cmd.header.contains(" & "));
}

#[test]
fn empty_document_is_title_and_outro() {
    for text in ["", "   \n\t\n  "] {
        let set = parse_document(text, "notes", "test", &opts()).unwrap();
        let scenes = &set.videos[0].scenes;
        assert_eq!(types(scenes), vec![SceneType::Title, SceneType::Outro]);
        let SceneContent::Title(t) = &scenes[0].content else {
            unreachable!()
        };
        assert_eq!(t.title, "Notes");
    }
}

#[test]
fn title_only_document_gets_overview() {
    let set = parse_document("# Only A Title\n", "x", "test", &opts()).unwrap();
    let scenes = &set.videos[0].scenes;
    assert_eq!(scenes.len(), 3);
    let SceneContent::List(l) = &scenes[1].content else {
        panic!("expected overview list");
    };
    assert_eq!(l.header, "Overview");
}

#[test]
fn tables_become_label_rows() {
    let md = "# T\n## Compare\n| Tool | Speed | Size |\n|---|---|---|\n| a | **fast** | 1 |\n| b | slow | 2 |\n";
    let set = parse_document(md, "t", "test", &opts()).unwrap();
    let scene = &set.videos[0].scenes[1];
    let SceneContent::List(l) = &scene.content else {
        panic!("expected list");
    };
    assert_eq!(
        l.items,
        vec![
            ListItem::Text("a: fast | 1".into()),
            ListItem::Text("b: slow | 2".into())
        ]
    );
    assert_eq!(l.description, "Key comparisons");
    assert_eq!(scene.narration, "Here's a comparison of compare.");
}

#[test]
fn code_and_list_in_one_section_give_both_scenes() {
    let md = "# T\n## Setup\n```\nmake\n```\n- one\n- two\n";
    let set = parse_document(md, "t", "test", &opts()).unwrap();
    assert_eq!(
        types(&set.videos[0].scenes),
        vec![
            SceneType::Title,
            SceneType::Command,
            SceneType::List,
            SceneType::Outro
        ]
    );
}

#[test]
fn split_by_h2_makes_one_video_per_group() {
    let md = "# Book\n### Preface\nHello.\n## One\nText one.\n### Detail\nMore.\n## Two\n- a\n";
    let o = AdaptOptions {
        split_by_h2: true,
        ..opts()
    };
    let set = parse_document(md, "book", "test", &o).unwrap();
    assert_eq!(set.videos.len(), 2);
    assert_eq!(set.videos[0].video_id, "book_video_0");
    assert_eq!(set.videos[0].title, "One");
    assert_eq!(set.videos[1].video_id, "book_video_1");
    // Preface joins the first group.
    assert_eq!(set.videos[0].scenes.len(), 5);
    let SceneContent::Title(t) = &set.videos[0].scenes[0].content else {
        unreachable!()
    };
    assert_eq!((t.title.as_str(), t.subtitle.as_str()), ("Book", "One"));
}

#[test]
fn long_text_is_capped() {
    let heading = "H".repeat(120);
    let md = format!("# {}\n## {heading}\n{}\n", "T".repeat(90), "word ".repeat(80));
    let set = parse_document(&md, "t", "test", &opts()).unwrap();
    let scenes = &set.videos[0].scenes;
    let SceneContent::Title(t) = &scenes[0].content else {
        unreachable!()
    };
    assert_eq!(t.title.chars().count(), TITLE_MAX_CHARS);
    let SceneContent::List(l) = &scenes[1].content else {
        unreachable!()
    };
    assert_eq!(l.header.chars().count(), HEADER_MAX_CHARS);
    assert!(l.description.chars().count() <= DESCRIPTION_MAX_CHARS);
}

#[test]
fn explicit_video_id_is_used() {
    let o = AdaptOptions {
        video_id: Some("custom".into()),
        ..opts()
    };
    let set = parse_document(GUIDE, "guide", "test", &o).unwrap();
    assert_eq!(set.videos[0].video_id, "custom");
    assert_eq!(set.videos[0].scenes[0].id, "custom_title");
}
