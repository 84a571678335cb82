//! Two-level YAML export: one set file plus one file per video.
//!
//! The output is accepted by the structured-config adapter and reproduces an equal [`VideoSet`].

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    adapters::yaml::{SetHeader, VideoHeader},
    foundation::error::ReelResult,
    scene::model::{Scene, Video, VideoSet},
};

#[derive(serde::Serialize)]
struct VideoDoc<'a> {
    video: VideoHeader,
    scenes: &'a [Scene],
}

#[derive(serde::Serialize)]
struct SetDoc {
    set: SetHeader,
}

fn video_doc(video: &Video) -> VideoDoc<'_> {
    VideoDoc {
        video: VideoHeader {
            id: video.video_id.clone(),
            title: Some(video.title.clone()),
            description: video.description.clone(),
            accent_color: video.accent_color,
            voices: video.voices.clone(),
            voice: None,
        },
        scenes: &video.scenes,
    }
}

fn set_header(set: &VideoSet, videos: Vec<serde_json::Value>) -> SetHeader {
    SetHeader {
        id: set.set_id.clone(),
        name: Some(set.set_name.clone()),
        description: set.description.clone(),
        defaults: set.defaults.clone(),
        videos,
    }
}

/// File name of `video` inside an export directory.
pub fn video_file_name(video: &Video) -> String {
    format!("{}.yaml", video.video_id)
}

/// File name of the set file inside an export directory; never shadows a video file.
pub fn set_file_name(set: &VideoSet) -> String {
    let name = format!("{}.yaml", set.set_id);
    if set.videos.iter().any(|v| video_file_name(v) == name) {
        format!("{}_set.yaml", set.set_id)
    } else {
        name
    }
}

/// Per-video document for `video`.
pub fn video_yaml(video: &Video) -> ReelResult<String> {
    Ok(serde_yaml::to_string(&video_doc(video))?)
}

/// Set document referencing each video by file name.
pub fn set_yaml(set: &VideoSet) -> ReelResult<String> {
    let videos = set
        .videos
        .iter()
        .map(|v| serde_json::Value::String(video_file_name(v)))
        .collect();
    Ok(serde_yaml::to_string(&SetDoc {
        set: set_header(set, videos),
    })?)
}

/// Single set document with every video inlined, for in-memory round trips.
pub fn inline_set_yaml(set: &VideoSet) -> ReelResult<String> {
    let videos = set
        .videos
        .iter()
        .map(|v| serde_json::to_value(video_doc(v)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_yaml::to_string(&SetDoc {
        set: set_header(set, videos),
    })?)
}

/// Write `<set_id>.yaml` and one `<video_id>.yaml` per video into `dir`.
///
/// Returns the written paths, set file first.
#[tracing::instrument(level = "info", skip(set), fields(set = %set.set_id))]
pub fn export(set: &VideoSet, dir: &Path) -> ReelResult<Vec<PathBuf>> {
    set.validate()?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create export dir '{}'", dir.display()))?;

    let mut written = Vec::with_capacity(set.videos.len() + 1);
    let set_path = dir.join(set_file_name(set));
    std::fs::write(&set_path, set_yaml(set)?)
        .with_context(|| format!("write '{}'", set_path.display()))?;
    written.push(set_path);

    for video in &set.videos {
        let path = dir.join(video_file_name(video));
        std::fs::write(&path, video_yaml(video)?)
            .with_context(|| format!("write '{}'", path.display()))?;
        written.push(path);
    }
    tracing::info!(files = written.len(), dir = %dir.display(), "exported video set");
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/adapters/export.rs"]
mod tests;
