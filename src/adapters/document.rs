//! Markdown-like documents into title, content and outro scenes.

use crate::{
    adapters::markdown::{Section, parse_markdown, strip_inline},
    adapters::sanitize_id,
    foundation::config::AdaptOptions,
    foundation::error::ReelResult,
    render::text::truncate,
    scene::model::{
        CommandContent, ListContent, ListItem, OutroContent, Scene, SceneContent, TitleContent,
        Video, VideoSet,
    },
};

pub const TITLE_MAX_CHARS: usize = 60;
pub const SUBTITLE_MAX_CHARS: usize = 80;
pub const HEADER_MAX_CHARS: usize = 70;
pub const DESCRIPTION_MAX_CHARS: usize = 150;

const COMMANDS_PER_BLOCK: usize = 6;
const MAX_COMMANDS: usize = 6;
const MAX_TABLE_ROWS: usize = 4;
const MAX_LIST_ITEMS: usize = 5;
const MAX_PROSE_ITEMS: usize = 3;
/// Seconds of video one content scene is expected to fill.
const SECS_PER_SCENE: f64 = 8.0;

pub const OUTRO_MAIN: &str = "Learn More";
pub const OUTRO_SUB: &str = "See Full Documentation";
pub const OUTRO_NARRATION: &str =
    "Thanks for watching! Check out the documentation for more details.";

/// How a section is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    Command,
    Table,
    List,
    Prose,
}

pub fn classify(section: &Section) -> SectionKind {
    if section.has_code() {
        SectionKind::Command
    } else if section.has_table() {
        SectionKind::Table
    } else if !section.list_items.is_empty() && section.list_items.len() >= section.text.len() {
        SectionKind::List
    } else {
        SectionKind::Prose
    }
}

/// Content scenes allowed per video, title and outro excluded.
pub fn content_budget(opts: &AdaptOptions) -> usize {
    let budget = opts.max_scenes.max(2) - 2;
    match opts.target_duration {
        Some(target) if target.is_finite() && target > 0.0 => {
            let by_time = ((target / SECS_PER_SCENE).round() as i64 - 2).max(1) as usize;
            budget.min(by_time)
        }
        _ => budget,
    }
}

/// Split a section holding both code and list/table content into a code part and a list part.
fn split_mixed(section: Section) -> Vec<Section> {
    if !section.has_code() || (section.list_items.is_empty() && !section.has_table()) {
        return vec![section];
    }
    let mut rest = Section::new(section.heading.clone(), section.level);
    rest.list_items = section.list_items;
    rest.tables = section.tables;
    let code = Section {
        heading: section.heading,
        level: section.level,
        text: section.text,
        code_blocks: section.code_blocks,
        list_items: Vec::new(),
        tables: Vec::new(),
    };
    vec![code, rest]
}

/// Merge adjacent sections until at most `budget` remain.
///
/// Each step merges the adjacent pair with the smallest combined weight; ties go to the leftmost
/// pair. A zero budget drops every section.
pub fn merge_to_budget(mut sections: Vec<Section>, budget: usize) -> Vec<Section> {
    if budget == 0 {
        return Vec::new();
    }
    while sections.len() > budget {
        let Some(i) = (0..sections.len() - 1)
            .min_by_key(|&i| (sections[i].weight() + sections[i + 1].weight(), i))
        else {
            break;
        };
        let right = sections.remove(i + 1);
        sections[i].absorb(right);
    }
    sections
}

fn clean_text(section: &Section) -> ReelResult<String> {
    let joined = section.text.join(" ");
    strip_inline(&joined)
}

fn command_scene(section: &Section, id: String) -> ReelResult<Scene> {
    let commands: Vec<String> = section
        .code_blocks
        .iter()
        .flat_map(|block| {
            block
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .take(COMMANDS_PER_BLOCK)
        })
        .take(MAX_COMMANDS)
        .map(str::to_string)
        .collect();
    let heading = strip_inline(&section.heading)?;
    let content = CommandContent {
        header: truncate(&heading, HEADER_MAX_CHARS),
        description: truncate(&clean_text(section)?, DESCRIPTION_MAX_CHARS),
        commands,
    };
    Ok(Scene::new(id, SceneContent::Command(content))
        .with_narration(format!("Here's how to {}.", heading.to_lowercase())))
}

fn table_scene(section: &Section, id: String) -> ReelResult<Scene> {
    let mut items = Vec::new();
    if let Some(table) = section.tables.iter().find(|t| t.len() >= 2) {
        for row in table.iter().skip(1).take(MAX_TABLE_ROWS) {
            let item = match row.split_first() {
                Some((label, rest)) if !rest.is_empty() => {
                    format!("{label}: {}", rest.join(" | "))
                }
                Some((label, _)) => label.clone(),
                None => continue,
            };
            let item = strip_inline(&item)?;
            if !item.is_empty() {
                items.push(ListItem::Text(item));
            }
        }
    }
    let heading = strip_inline(&section.heading)?;
    let text = clean_text(section)?;
    let description = if text.is_empty() {
        "Key comparisons".to_string()
    } else {
        truncate(&text, DESCRIPTION_MAX_CHARS)
    };
    let content = ListContent {
        header: truncate(&heading, HEADER_MAX_CHARS),
        description,
        items,
    };
    Ok(Scene::new(id, SceneContent::List(content))
        .with_narration(format!("Here's a comparison of {}.", heading.to_lowercase())))
}

fn list_scene(section: &Section, id: String) -> ReelResult<Scene> {
    let mut items = Vec::new();
    for raw in &section.list_items {
        let item = strip_inline(raw)?;
        if !item.is_empty() {
            items.push(item);
        }
    }
    let heading = strip_inline(&section.heading)?;
    let mut narration = format!("This section covers {}", heading.to_lowercase());
    if !items.is_empty() {
        let preview: Vec<&str> = items.iter().take(3).map(String::as_str).collect();
        narration.push_str(": ");
        narration.push_str(&preview.join(", "));
        if items.len() > 3 {
            narration.push_str(&format!(", and {} more topics", items.len() - 3));
        }
    }
    narration.push('.');

    let content = ListContent {
        header: truncate(&heading, HEADER_MAX_CHARS),
        description: truncate(&clean_text(section)?, DESCRIPTION_MAX_CHARS),
        items: items
            .into_iter()
            .take(MAX_LIST_ITEMS)
            .map(ListItem::Text)
            .collect(),
    };
    Ok(Scene::new(id, SceneContent::List(content)).with_narration(narration))
}

fn prose_scene(section: &Section, id: String) -> ReelResult<Scene> {
    let text = clean_text(section)?;
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let description = sentences
        .first()
        .map(|s| truncate(s, DESCRIPTION_MAX_CHARS))
        .unwrap_or_default();
    let items: Vec<ListItem> = if sentences.len() > 1 {
        sentences
            .iter()
            .skip(1)
            .take(MAX_PROSE_ITEMS)
            .map(|s| ListItem::Text(s.to_string()))
            .collect()
    } else if !text.is_empty() {
        vec![ListItem::Text(truncate(&text, 100))]
    } else {
        Vec::new()
    };
    let heading = strip_inline(&section.heading)?;
    let content = ListContent {
        header: truncate(&heading, HEADER_MAX_CHARS),
        description,
        items,
    };
    Ok(Scene::new(id, SceneContent::List(content))
        .with_narration(format!("About {}.", heading.to_lowercase())))
}

/// Scene for one (possibly merged) section at content position `index`.
pub fn section_scene(section: &Section, video_id: &str, index: usize) -> ReelResult<Scene> {
    match classify(section) {
        SectionKind::Command => command_scene(section, format!("{video_id}_command_{index}")),
        SectionKind::Table => table_scene(section, format!("{video_id}_list_{index}")),
        SectionKind::List => list_scene(section, format!("{video_id}_list_{index}")),
        SectionKind::Prose => prose_scene(section, format!("{video_id}_list_{index}")),
    }
}

fn title_scene(video_id: &str, title: &str, subtitle: Option<&str>) -> Scene {
    let (subtitle_text, narration) = match subtitle {
        Some(sub) => (sub.to_string(), format!("Welcome to {title}: {sub}.")),
        None => ("Complete Guide".to_string(), format!("Welcome to {title}.")),
    };
    Scene::new(
        format!("{video_id}_title"),
        SceneContent::Title(TitleContent {
            title: truncate(title, TITLE_MAX_CHARS),
            subtitle: truncate(&subtitle_text, SUBTITLE_MAX_CHARS),
        }),
    )
    .with_narration(narration)
}

fn outro_scene(video_id: &str) -> Scene {
    Scene::new(
        format!("{video_id}_outro"),
        SceneContent::Outro(OutroContent {
            main_text: OUTRO_MAIN.to_string(),
            sub_text: OUTRO_SUB.to_string(),
        }),
    )
    .with_narration(OUTRO_NARRATION)
}

/// Scenes of one video: title, budgeted content scenes, outro.
pub fn build_scenes(
    video_id: &str,
    title: &str,
    subtitle: Option<&str>,
    sections: Vec<Section>,
    opts: &AdaptOptions,
) -> ReelResult<Vec<Scene>> {
    let segments: Vec<Section> = sections
        .into_iter()
        .filter(|s| !s.is_empty())
        .flat_map(split_mixed)
        .collect();
    let segments = merge_to_budget(segments, content_budget(opts));

    let mut scenes = Vec::with_capacity(segments.len() + 2);
    scenes.push(title_scene(video_id, title, subtitle));
    for (i, section) in segments.iter().enumerate() {
        scenes.push(section_scene(section, video_id, i)?);
    }
    scenes.push(outro_scene(video_id));
    Ok(scenes)
}

/// Group sections by level-2 heading. Sections before the first one join the first group.
fn group_by_h2(sections: Vec<Section>) -> Vec<(String, Vec<Section>)> {
    let mut groups: Vec<(String, Vec<Section>)> = Vec::new();
    let mut leading = Vec::new();
    for section in sections {
        if section.level == 2 {
            let mut members = std::mem::take(&mut leading);
            let heading = section.heading.clone();
            members.push(section);
            groups.push((heading, members));
        } else if let Some((_, members)) = groups.last_mut() {
            members.push(section);
        } else {
            leading.push(section);
        }
    }
    groups
}

fn humanize(name: &str) -> String {
    let words: Vec<String> = name
        .split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect();
    if words.is_empty() {
        "Document".to_string()
    } else {
        words.join(" ")
    }
}

/// Parse a Markdown-like document into a [`VideoSet`].
///
/// `name` seeds the ids, `origin` is recorded in the descriptions.
#[tracing::instrument(level = "debug", skip(text, opts))]
pub fn parse_document(
    text: &str,
    name: &str,
    origin: &str,
    opts: &AdaptOptions,
) -> ReelResult<VideoSet> {
    let structure = parse_markdown(text)?;
    let set_id = sanitize_id(name);
    let title = if structure.title.trim().is_empty() {
        humanize(&set_id)
    } else {
        structure.title.trim().to_string()
    };
    tracing::debug!(sections = structure.sections.len(), "document structure");

    let split = opts.split_by_h2 && structure.sections.iter().any(|s| s.level == 2);
    let mut set = VideoSet::new(set_id.clone(), title.clone());
    set.description = format!("Videos generated from {origin}");

    if split {
        for (i, (heading, sections)) in group_by_h2(structure.sections).into_iter().enumerate() {
            let video_id = format!("{set_id}_video_{i}");
            let heading = strip_inline(&heading)?;
            let scenes = build_scenes(&video_id, &title, Some(&heading), sections, opts)?;
            let mut video = Video::new(video_id, heading);
            video.description = format!("Generated from {origin}");
            video.scenes = scenes;
            set.videos.push(video);
        }
    } else {
        let video_id = opts
            .video_id
            .clone()
            .unwrap_or_else(|| format!("{set_id}_main"));
        let scenes = build_scenes(&video_id, &title, None, structure.sections, opts)?;
        let mut video = Video::new(video_id, title.clone());
        video.description = format!("Generated from {origin}");
        video.scenes = scenes;
        set.videos.push(video);
    }
    Ok(set)
}

#[cfg(test)]
#[path = "../../tests/unit/adapters/document.rs"]
mod tests;
