//! Input adapters: documents, structured YAML and programmatic values into a [`VideoSet`].

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;

use crate::{
    facade::block_on,
    foundation::config::AdaptOptions,
    foundation::core::Rgb8,
    foundation::error::{ReelError, ReelResult},
    scene::model::{Video, VideoSet},
};

pub mod document;
pub mod export;
pub mod fetch;
pub mod markdown;
pub mod programmatic;
pub mod yaml;

/// Accent used when neither the source nor the options name one.
pub const DEFAULT_ACCENT: Rgb8 = Rgb8::new(59, 130, 246);

/// Where a document comes from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    Path(PathBuf),
    Url(String),
    /// Inline Markdown; `name` seeds the set and video ids.
    Text { text: String, name: String },
}

/// Where a structured-config document comes from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YamlSource {
    Path(PathBuf),
    /// Inline YAML; set files resolve relative video paths against `base_dir`.
    Text {
        text: String,
        base_dir: Option<PathBuf>,
    },
}

/// Already-built scene model values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgrammaticSource {
    Set(VideoSet),
    Video(Video),
}

/// Every supported input, one variant per adapter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Document(DocumentSource),
    Yaml(YamlSource),
    Programmatic(ProgrammaticSource),
}

/// Adapter selection for a textual source argument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// URLs and non-YAML paths are documents, `.yaml`/`.yml` paths are structured config.
    #[default]
    Auto,
    Document,
    Yaml,
}

impl InputSource {
    /// Interpret a command-line style source argument.
    pub fn from_arg(arg: &str, kind: SourceKind) -> Self {
        let arg = arg.trim().trim_matches(|c| c == '"' || c == '\'');
        let is_yaml = || {
            Path::new(arg)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        };
        match kind {
            SourceKind::Yaml => InputSource::Yaml(YamlSource::Path(PathBuf::from(arg))),
            SourceKind::Auto if !fetch::is_url(arg) && is_yaml() => {
                InputSource::Yaml(YamlSource::Path(PathBuf::from(arg)))
            }
            SourceKind::Auto | SourceKind::Document => {
                if fetch::is_url(arg) {
                    InputSource::Document(DocumentSource::Url(arg.to_string()))
                } else {
                    InputSource::Document(DocumentSource::Path(PathBuf::from(arg)))
                }
            }
        }
    }

    /// Short human-readable description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            InputSource::Document(DocumentSource::Path(p)) => format!("document:{}", p.display()),
            InputSource::Document(DocumentSource::Url(u)) => format!("document:{u}"),
            InputSource::Document(DocumentSource::Text { name, .. }) => {
                format!("document:<inline {name}>")
            }
            InputSource::Yaml(YamlSource::Path(p)) => format!("yaml:{}", p.display()),
            InputSource::Yaml(YamlSource::Text { .. }) => "yaml:<inline>".to_string(),
            InputSource::Programmatic(ProgrammaticSource::Set(s)) => {
                format!("programmatic:{}", s.set_id)
            }
            InputSource::Programmatic(ProgrammaticSource::Video(v)) => {
                format!("programmatic:{}", v.video_id)
            }
        }
    }
}

/// Convert `source` into a validated [`VideoSet`].
#[tracing::instrument(level = "info", skip_all, fields(source = %source.describe()))]
pub async fn adapt(source: &InputSource, opts: &AdaptOptions) -> ReelResult<VideoSet> {
    let mut set = match source {
        InputSource::Document(doc) => {
            let (text, name) = match doc {
                DocumentSource::Path(path) => (fetch::read_text_file(path).await?, source_name(path)),
                DocumentSource::Url(url) => {
                    let name = url
                        .trim_end_matches('/')
                        .rsplit('/')
                        .next()
                        .map(|s| source_name(Path::new(s)))
                        .unwrap_or_else(|| "document".to_string());
                    (fetch::fetch_url(url).await?, name)
                }
                DocumentSource::Text { text, name } => (text.clone(), name.clone()),
            };
            let origin = source.describe();
            document::parse_document(&text, &name, &origin, opts)?
        }
        InputSource::Yaml(YamlSource::Path(path)) => yaml::load_yaml_file(path, opts).await?,
        InputSource::Yaml(YamlSource::Text { text, base_dir }) => {
            yaml::parse_yaml_str(text, base_dir.as_deref(), opts).await?
        }
        InputSource::Programmatic(p) => programmatic::from_value(p.clone())?,
    };
    finalize(&mut set, opts)?;
    tracing::info!(
        set = %set.set_id,
        videos = set.videos.len(),
        scenes = set.scene_count(),
        "adapted input"
    );
    Ok(set)
}

/// Blocking [`adapt`] through the synchronous façade.
pub fn adapt_blocking(source: &InputSource, opts: &AdaptOptions) -> ReelResult<VideoSet> {
    let source = source.clone();
    let opts = opts.clone();
    block_on(async move { adapt(&source, &opts).await })
}

/// Apply option overrides and set defaults, then validate.
///
/// Every video ends up with an accent color: the override, its own, the set default, then
/// [`DEFAULT_ACCENT`].
pub fn finalize(set: &mut VideoSet, opts: &AdaptOptions) -> ReelResult<()> {
    set.apply_defaults();
    for video in &mut set.videos {
        if let Some(accent) = opts.accent_color {
            video.accent_color = Some(accent);
        }
        video.accent_color.get_or_insert(DEFAULT_ACCENT);
        if let Some(voice) = &opts.voice {
            for scene in &mut video.scenes {
                scene.voice = Some(voice.clone());
            }
        }
    }
    set.validate()
}

/// File stem reduced to `[a-z0-9_-]`.
pub fn source_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    sanitize_id(stem)
}

/// Lowercase `raw` and replace everything outside `[a-z0-9_-]` with `_`.
pub fn sanitize_id(raw: &str) -> String {
    let id: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(crate::scene::model::MAX_ID_LEN - 16)
        .collect();
    if id.is_empty() || id.chars().all(|c| c == '_') {
        "document".to_string()
    } else {
        id
    }
}

/// Compile `pattern` once into `cell`.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Regex>,
    pattern: &str,
) -> ReelResult<&'static Regex> {
    if let Some(re) = cell.get() {
        return Ok(re);
    }
    let re = Regex::new(pattern)
        .map_err(|e| ReelError::Other(anyhow::anyhow!("invalid pattern '{pattern}': {e}")))?;
    Ok(cell.get_or_init(|| re))
}
