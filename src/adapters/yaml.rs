//! Structured YAML scene descriptions: per-video documents and set documents.
//!
//! A per-video document has a `video` header and a `scenes` list. A set document has a `set`
//! header whose `videos` entries are per-video file paths (relative to the set file) or inline
//! per-video mappings. Either form may declare `variables` used by `${name}` / `${name|default}`
//! placeholders in string values.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;
use serde_json::{Map, Value};

use crate::{
    adapters::{cached_regex, fetch},
    foundation::config::AdaptOptions,
    foundation::core::Rgb8,
    foundation::error::{ReelError, ReelResult},
    scene::model::{MAX_ITEMS, Scene, SceneType, SetDefaults, Video, VideoSet},
    scene::narration::fill_missing_narration,
};

/// `video` header of a per-video document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub(crate) struct VideoHeader {
    #[serde(alias = "video_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<Rgb8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voices: Vec<String>,
    /// Single-voice shorthand, appended to `voices`.
    #[serde(default, skip_serializing)]
    pub voice: Option<String>,
}

/// `set` header of a set document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub(crate) struct SetHeader {
    #[serde(alias = "set_id")]
    pub id: String,
    #[serde(default, alias = "set_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "SetDefaults::is_empty")]
    pub defaults: SetDefaults,
    /// File names or inline per-video mappings.
    #[serde(default)]
    pub videos: Vec<Value>,
}

type Variables = BTreeMap<String, String>;

fn placeholder_re() -> ReelResult<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?:\|([^}]*))?\}")
}

/// Load a `.yaml`/`.yml` file; set files resolve video paths against its directory.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn load_yaml_file(path: &Path, opts: &AdaptOptions) -> ReelResult<VideoSet> {
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if !ext_ok {
        return Err(ReelError::structure(format!(
            "{} is not a .yaml/.yml file",
            path.display()
        )));
    }
    let text = fetch::read_text_file(path).await?;
    parse_yaml_str(&text, path.parent(), opts).await
}

/// Parse a per-video or set document held in memory.
pub async fn parse_yaml_str(
    text: &str,
    base_dir: Option<&Path>,
    opts: &AdaptOptions,
) -> ReelResult<VideoSet> {
    let (root, vars) = parse_root(text, &Variables::new())?;
    if let Some(set) = root.get("set") {
        return parse_set(set, base_dir, &vars, opts).await;
    }
    let video = parse_video_doc(&root, &SetDefaults::default(), opts, "$")?;
    Ok(VideoSet::single(video))
}

/// Parse YAML into a top-level mapping, with `variables` extracted and substituted.
fn parse_root(text: &str, inherited: &Variables) -> ReelResult<(Map<String, Value>, Variables)> {
    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| ReelError::structure(format!("invalid YAML: {e}")))?;
    let Value::Object(mut root) = value else {
        return Err(ReelError::structure(
            "expected a mapping with a 'video' or 'set' key at the top level",
        ));
    };

    let mut vars = inherited.clone();
    match root.remove("variables") {
        None | Some(Value::Null) => {}
        Some(Value::Object(map)) => {
            for (name, value) in map {
                let text = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(ReelError::structure(format!(
                            "$.variables.{name}: expected a scalar, got {other}"
                        )));
                    }
                };
                vars.insert(name, text);
            }
        }
        Some(_) => return Err(ReelError::structure("$.variables: expected a mapping")),
    }

    if !vars.is_empty() {
        for value in root.values_mut() {
            substitute(value, &vars)?;
        }
    }
    Ok((root, vars))
}

/// Replace `${name}` / `${name|default}` in every string of `value`.
///
/// Unknown names without a default are left untouched.
fn substitute(value: &mut Value, vars: &Variables) -> ReelResult<()> {
    match value {
        Value::String(s) if s.contains("${") => {
            let re = placeholder_re()?;
            let replaced = re.replace_all(s, |caps: &regex::Captures<'_>| {
                match (vars.get(&caps[1]), caps.get(2)) {
                    (Some(v), _) => v.clone(),
                    (None, Some(default)) => default.as_str().to_string(),
                    (None, None) => caps[0].to_string(),
                }
            });
            *s = replaced.into_owned();
        }
        Value::Array(items) => {
            for item in items {
                substitute(item, vars)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute(item, vars)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn structure_at(path: &str, err: impl std::fmt::Display) -> ReelError {
    ReelError::structure(format!("{path}: {err}"))
}

async fn parse_set(
    raw: &Value,
    base_dir: Option<&Path>,
    vars: &Variables,
    opts: &AdaptOptions,
) -> ReelResult<VideoSet> {
    let header: SetHeader =
        serde_json::from_value(raw.clone()).map_err(|e| structure_at("$.set", e))?;
    if header.videos.is_empty() {
        return Err(ReelError::structure(
            "$.set: missing required key 'videos' (or it is empty)",
        ));
    }
    if header.videos.len() > MAX_ITEMS {
        return Err(ReelError::structure(format!(
            "$.set.videos: {} entries (max {MAX_ITEMS})",
            header.videos.len()
        )));
    }

    let mut set = VideoSet::new(
        header.id.clone(),
        header.name.clone().unwrap_or_else(|| header.id.clone()),
    );
    set.description = header.description.clone();
    set.defaults = header.defaults.clone();

    for (i, entry) in header.videos.iter().enumerate() {
        let path = format!("$.set.videos[{i}]");
        let video = match entry {
            Value::String(file) => {
                let file_path = resolve(base_dir, file);
                let text = fetch::read_text_file(&file_path).await?;
                let (doc, _) = parse_root(&text, vars)?;
                if doc.contains_key("set") {
                    return Err(structure_at(&path, "nested set documents are not supported"));
                }
                parse_video_doc(&doc, &set.defaults, opts, &file_path.display().to_string())?
            }
            Value::Object(map) if map.contains_key("video") => {
                parse_video_doc(map, &set.defaults, opts, &path)?
            }
            Value::Object(map) => inline_video(map, &set.defaults, opts, &path)?,
            _ => return Err(structure_at(&path, "expected a file name or a mapping")),
        };
        set.videos.push(video);
    }
    tracing::debug!(set = %set.set_id, videos = set.videos.len(), "parsed set document");
    Ok(set)
}

fn resolve(base_dir: Option<&Path>, file: &str) -> PathBuf {
    let file = Path::new(file.trim());
    match base_dir {
        Some(dir) if file.is_relative() => dir.join(file),
        _ => file.to_path_buf(),
    }
}

/// An inline set entry written as the header itself with a nested `scenes` list.
fn inline_video(
    map: &Map<String, Value>,
    defaults: &SetDefaults,
    opts: &AdaptOptions,
    path: &str,
) -> ReelResult<Video> {
    let mut header = map.clone();
    let scenes = header.remove("scenes");
    let mut doc = Map::new();
    doc.insert("video".to_string(), Value::Object(header));
    if let Some(scenes) = scenes {
        doc.insert("scenes".to_string(), scenes);
    }
    parse_video_doc(&doc, defaults, opts, path)
}

fn parse_video_doc(
    doc: &Map<String, Value>,
    defaults: &SetDefaults,
    opts: &AdaptOptions,
    path: &str,
) -> ReelResult<Video> {
    let Some(raw_header) = doc.get("video") else {
        return Err(structure_at(path, "missing required key 'video'"));
    };
    let Some(raw_scenes) = doc.get("scenes") else {
        return Err(structure_at(path, "missing required key 'scenes'"));
    };
    let header: VideoHeader = serde_json::from_value(raw_header.clone())
        .map_err(|e| structure_at(&format!("{path}.video"), e))?;
    let Value::Array(raw_scenes) = raw_scenes else {
        return Err(structure_at(&format!("{path}.scenes"), "expected a list"));
    };
    if raw_scenes.len() > MAX_ITEMS {
        return Err(structure_at(
            &format!("{path}.scenes"),
            format!("{} scenes (max {MAX_ITEMS})", raw_scenes.len()),
        ));
    }

    let mut video = Video::new(
        header.id.clone(),
        header.title.clone().unwrap_or_else(|| header.id.clone()),
    );
    video.description = header.description;
    video.accent_color = header.accent_color;
    video.voices = header.voices;
    if let Some(voice) = header.voice
        && !video.voices.contains(&voice)
    {
        video.voices.push(voice);
    }
    for (i, raw) in raw_scenes.iter().enumerate() {
        let scene_path = format!("{path}.scenes[{i}]");
        video.scenes.push(parse_scene(raw, defaults, &scene_path)?);
    }

    if opts.auto_narration {
        let filled = fill_missing_narration(&mut video.scenes);
        if filled > 0 {
            tracing::debug!(video = %video.video_id, filled, "generated template narration");
        }
    }
    Ok(video)
}

/// Normalize one scene mapping and deserialize it.
///
/// `scene_id`/`scene_type` alias `id`/`type`, fields nested under `visual_content` are lifted to
/// the top level, and missing durations come from the set defaults.
fn parse_scene(raw: &Value, defaults: &SetDefaults, path: &str) -> ReelResult<Scene> {
    let Value::Object(raw) = raw else {
        return Err(structure_at(path, "expected a mapping"));
    };
    let mut map = raw.clone();

    for (alias, key) in [("scene_id", "id"), ("scene_type", "type")] {
        if let Some(v) = map.remove(alias) {
            map.entry(key).or_insert(v);
        }
    }
    if !map.contains_key("id") {
        return Err(structure_at(path, "missing required key 'id'"));
    }
    let ty = match map.get("type") {
        Some(Value::String(s)) => SceneType::parse(s).ok_or_else(|| {
            let known: Vec<&str> = SceneType::ALL.iter().map(|t| t.as_str()).collect();
            structure_at(
                path,
                format!("unknown scene type '{s}' (expected one of {})", known.join(", ")),
            )
        })?,
        Some(other) => return Err(structure_at(path, format!("invalid scene type {other}"))),
        None => return Err(structure_at(path, "missing required key 'type'")),
    };
    map.insert("type".to_string(), Value::String(ty.as_str().to_string()));

    match map.remove("visual_content") {
        None | Some(Value::Null) => {}
        Some(Value::Object(visual)) => {
            for (k, v) in visual {
                map.entry(k).or_insert(v);
            }
        }
        Some(_) => return Err(structure_at(path, "visual_content: expected a mapping")),
    }

    for (key, value) in [
        ("min_duration", defaults.min_duration),
        ("max_duration", defaults.max_duration),
    ] {
        if let Some(v) = value
            && !map.contains_key(key)
            && let Some(n) = serde_json::Number::from_f64(v)
        {
            map.insert(key.to_string(), Value::Number(n));
        }
    }
    if matches!(map.get("narration"), Some(Value::Null)) {
        map.remove("narration");
    }

    serde_json::from_value(Value::Object(map)).map_err(|e| structure_at(path, e))
}

#[cfg(test)]
#[path = "../../tests/unit/adapters/yaml.rs"]
mod tests;
