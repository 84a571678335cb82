use std::collections::BTreeSet;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{ReelError, ReelResult};

/// Longest accepted id (scene, video or set).
pub const MAX_ID_LEN: usize = 200;
/// Upper bound on scenes per video and videos per set.
pub const MAX_ITEMS: usize = 100;
/// Upper bound for `min_duration` / `max_duration`, in seconds.
pub const MAX_SCENE_DURATION: f64 = 300.0;

pub const DEFAULT_MIN_DURATION: f64 = 3.0;
pub const DEFAULT_MAX_DURATION: f64 = 15.0;

/// Registered scene types. Every variant has exactly one renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneType {
    Title,
    Command,
    List,
    Outro,
    Quiz,
    LearningObjectives,
    Exercise,
    Checkpoint,
    Quote,
    CodeComparison,
    Problem,
    Solution,
}

impl SceneType {
    pub const ALL: [SceneType; 12] = [
        SceneType::Title,
        SceneType::Command,
        SceneType::List,
        SceneType::Outro,
        SceneType::Quiz,
        SceneType::LearningObjectives,
        SceneType::Exercise,
        SceneType::Checkpoint,
        SceneType::Quote,
        SceneType::CodeComparison,
        SceneType::Problem,
        SceneType::Solution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SceneType::Title => "title",
            SceneType::Command => "command",
            SceneType::List => "list",
            SceneType::Outro => "outro",
            SceneType::Quiz => "quiz",
            SceneType::LearningObjectives => "learning_objectives",
            SceneType::Exercise => "exercise",
            SceneType::Checkpoint => "checkpoint",
            SceneType::Quote => "quote",
            SceneType::CodeComparison => "code_comparison",
            SceneType::Problem => "problem",
            SceneType::Solution => "solution",
        }
    }

    /// Parse a type key; `-` and `_` are interchangeable and case is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

/// Difficulty badge used by exercise and problem scenes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "beginner", alias = "Easy")]
    Easy,
    #[default]
    #[serde(alias = "intermediate", alias = "Medium")]
    Medium,
    #[serde(alias = "advanced", alias = "Hard")]
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TitleContent {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommandContent {
    pub header: String,
    #[serde(default)]
    pub description: String,
    /// Terminal lines; the prefix selects the styling (`$`, `→`, `✓`, `#`, `-`).
    #[serde(default)]
    pub commands: Vec<String>,
}

/// A list entry: plain text or a `[label, detail]` pair.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Text(String),
    Pair(String, String),
}

impl ListItem {
    /// Label and optional detail, for layout and narration.
    pub fn parts(&self) -> (&str, Option<&str>) {
        match self {
            ListItem::Text(t) => (t, None),
            ListItem::Pair(label, detail) => (label, Some(detail)),
        }
    }
}

impl From<&str> for ListItem {
    fn from(s: &str) -> Self {
        ListItem::Text(s.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ListContent {
    pub header: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutroContent {
    pub main_text: String,
    #[serde(default)]
    pub sub_text: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizContent {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub show_answer: bool,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LessonInfo {
    /// Lesson length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

impl LessonInfo {
    pub fn is_empty(&self) -> bool {
        self.duration.is_none() && self.difficulty.is_none() && self.prerequisites.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LearningObjectivesContent {
    pub lesson_title: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "LessonInfo::is_empty")]
    pub lesson_info: LessonInfo,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExerciseContent {
    pub title: String,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

fn default_checkpoint_number() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CheckpointContent {
    #[serde(default = "default_checkpoint_number")]
    pub checkpoint_number: u32,
    #[serde(default)]
    pub completed_topics: Vec<String>,
    #[serde(default)]
    pub review_questions: Vec<String>,
    #[serde(default)]
    pub next_topics: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuoteContent {
    pub quote_text: String,
    #[serde(default)]
    pub attribution: String,
}

fn default_before_label() -> String {
    "Before".to_string()
}

fn default_after_label() -> String {
    "After".to_string()
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CodeComparisonContent {
    #[serde(default)]
    pub header: String,
    /// Multi-line source shown in the left panel.
    pub before_code: String,
    /// Multi-line source shown in the right panel.
    pub after_code: String,
    #[serde(default = "default_before_label")]
    pub before_label: String,
    #[serde(default = "default_after_label")]
    pub after_label: String,
}

fn default_problem_number() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProblemContent {
    #[serde(default = "default_problem_number")]
    pub problem_number: u32,
    pub title: String,
    #[serde(default)]
    pub problem_text: String,
    /// Badge color; `None` draws a neutral blue badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

fn default_solution_title() -> String {
    "Solution".to_string()
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SolutionContent {
    #[serde(default = "default_solution_title")]
    pub title: String,
    #[serde(default)]
    pub solution_code: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

/// Type tag plus typed fields of a scene. Serialized flat with a `type` key.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneContent {
    Title(TitleContent),
    Command(CommandContent),
    List(ListContent),
    Outro(OutroContent),
    Quiz(QuizContent),
    LearningObjectives(LearningObjectivesContent),
    Exercise(ExerciseContent),
    Checkpoint(CheckpointContent),
    Quote(QuoteContent),
    CodeComparison(CodeComparisonContent),
    Problem(ProblemContent),
    Solution(SolutionContent),
}

impl SceneContent {
    pub fn scene_type(&self) -> SceneType {
        match self {
            SceneContent::Title(_) => SceneType::Title,
            SceneContent::Command(_) => SceneType::Command,
            SceneContent::List(_) => SceneType::List,
            SceneContent::Outro(_) => SceneType::Outro,
            SceneContent::Quiz(_) => SceneType::Quiz,
            SceneContent::LearningObjectives(_) => SceneType::LearningObjectives,
            SceneContent::Exercise(_) => SceneType::Exercise,
            SceneContent::Checkpoint(_) => SceneType::Checkpoint,
            SceneContent::Quote(_) => SceneType::Quote,
            SceneContent::CodeComparison(_) => SceneType::CodeComparison,
            SceneContent::Problem(_) => SceneType::Problem,
            SceneContent::Solution(_) => SceneType::Solution,
        }
    }

    fn validate(&self) -> ReelResult<()> {
        match self {
            SceneContent::Quiz(q) if q.show_answer && q.correct_answer.trim().is_empty() => Err(
                ReelError::structure("quiz with show_answer requires a correct_answer"),
            ),
            _ => Ok(()),
        }
    }
}

fn default_min_duration() -> f64 {
    DEFAULT_MIN_DURATION
}

fn default_max_duration() -> f64 {
    DEFAULT_MAX_DURATION
}

/// One visual beat of a video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Unique within the owning video.
    pub id: String,
    #[serde(flatten)]
    pub content: SceneContent,
    /// Text to synthesize; may be empty.
    #[serde(default)]
    pub narration: String,
    /// Voice name; `None` rotates through the video's voices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default = "default_min_duration")]
    pub min_duration: f64,
    #[serde(default = "default_max_duration")]
    pub max_duration: f64,
}

impl Scene {
    pub fn new(id: impl Into<String>, content: SceneContent) -> Self {
        Self {
            id: id.into(),
            content,
            narration: String::new(),
            voice: None,
            min_duration: DEFAULT_MIN_DURATION,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }

    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = narration.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_durations(mut self, min: f64, max: f64) -> Self {
        self.min_duration = min;
        self.max_duration = max;
        self
    }

    pub fn scene_type(&self) -> SceneType {
        self.content.scene_type()
    }

    pub fn has_narration(&self) -> bool {
        !self.narration.trim().is_empty()
    }

    /// Clamp a measured duration into `[min_duration, max_duration]`.
    pub fn clamp_duration(&self, secs: f64) -> f64 {
        let secs = if secs.is_finite() { secs } else { 0.0 };
        secs.clamp(self.min_duration, self.max_duration)
    }

    pub fn validate(&self) -> ReelResult<()> {
        validate_id("scene", &self.id)?;
        for (name, v) in [
            ("min_duration", self.min_duration),
            ("max_duration", self.max_duration),
        ] {
            if !v.is_finite() || !(0.0..=MAX_SCENE_DURATION).contains(&v) {
                return Err(ReelError::structure(format!(
                    "scene '{}': {name} must be within 0..={MAX_SCENE_DURATION}, got {v}",
                    self.id
                )));
            }
        }
        if self.min_duration > self.max_duration {
            return Err(ReelError::structure(format!(
                "scene '{}': min_duration ({}) must be <= max_duration ({})",
                self.id, self.min_duration, self.max_duration
            )));
        }
        self.content
            .validate()
            .map_err(|e| ReelError::structure(format!("scene '{}': {e}", self.id)))
    }
}

/// Ordered scenes plus per-video presentation settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Required by every renderer; adapters fill it from set defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<Rgb8>,
    /// Voices rotated across narrated scenes without an explicit voice.
    #[serde(default)]
    pub voices: Vec<String>,
    pub scenes: Vec<Scene>,
}

impl Video {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            description: String::new(),
            accent_color: None,
            voices: Vec::new(),
            scenes: Vec::new(),
        }
    }

    pub fn with_accent(mut self, accent: Rgb8) -> Self {
        self.accent_color = Some(accent);
        self
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scenes.push(scene);
        self
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn validate(&self) -> ReelResult<()> {
        validate_id("video", &self.video_id)?;
        if self.scenes.is_empty() {
            return Err(ReelError::structure(format!(
                "video '{}' has no scenes",
                self.video_id
            )));
        }
        if self.scenes.len() > MAX_ITEMS {
            return Err(ReelError::structure(format!(
                "video '{}' has {} scenes (max {MAX_ITEMS})",
                self.video_id,
                self.scenes.len()
            )));
        }
        let mut seen = BTreeSet::new();
        for scene in &self.scenes {
            scene.validate()?;
            if !seen.insert(scene.id.as_str()) {
                return Err(ReelError::structure(format!(
                    "video '{}': duplicate scene id '{}'",
                    self.video_id, scene.id
                )));
            }
        }
        Ok(())
    }
}

/// Set-level values merged into videos and scenes that lack explicit ones.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SetDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<Rgb8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<f64>,
}

impl SetDefaults {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A named collection of videos produced from one source.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoSet {
    pub set_id: String,
    pub set_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "SetDefaults::is_empty")]
    pub defaults: SetDefaults,
    pub videos: Vec<Video>,
}

impl VideoSet {
    pub fn new(set_id: impl Into<String>, set_name: impl Into<String>) -> Self {
        Self {
            set_id: set_id.into(),
            set_name: set_name.into(),
            description: String::new(),
            defaults: SetDefaults::default(),
            videos: Vec::new(),
        }
    }

    /// Wrap a single video in a set named after it.
    pub fn single(video: Video) -> Self {
        Self {
            set_id: format!("{}_set", video.video_id),
            set_name: video.title.clone(),
            description: video.description.clone(),
            defaults: SetDefaults::default(),
            videos: vec![video],
        }
    }

    pub fn with_video(mut self, video: Video) -> Self {
        self.videos.push(video);
        self
    }

    pub fn video(&self, id: &str) -> Option<&Video> {
        self.videos.iter().find(|v| v.video_id == id)
    }

    pub fn scene_count(&self) -> usize {
        self.videos.iter().map(|v| v.scenes.len()).sum()
    }

    /// Fill missing accent colors from the set defaults.
    pub fn apply_defaults(&mut self) {
        if let Some(accent) = self.defaults.accent_color {
            for video in &mut self.videos {
                video.accent_color.get_or_insert(accent);
            }
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        validate_id("set", &self.set_id)?;
        if self.videos.is_empty() {
            return Err(ReelError::structure(format!(
                "video set '{}' has no videos",
                self.set_id
            )));
        }
        if self.videos.len() > MAX_ITEMS {
            return Err(ReelError::structure(format!(
                "video set '{}' has {} videos (max {MAX_ITEMS})",
                self.set_id,
                self.videos.len()
            )));
        }
        let mut seen = BTreeSet::new();
        for video in &self.videos {
            video.validate()?;
            if !seen.insert(video.video_id.as_str()) {
                return Err(ReelError::structure(format!(
                    "video set '{}': duplicate video id '{}'",
                    self.set_id, video.video_id
                )));
            }
        }
        Ok(())
    }
}

fn validate_id(what: &str, id: &str) -> ReelResult<()> {
    if id.trim().is_empty() {
        return Err(ReelError::structure(format!("{what} id must be non-empty")));
    }
    let len = id.chars().count();
    if len > MAX_ID_LEN {
        return Err(ReelError::structure(format!(
            "{what} id is {len} characters (max {MAX_ID_LEN})"
        )));
    }
    if id.contains(['/', '\\']) || id.contains("..") {
        return Err(ReelError::structure(format!(
            "{what} id '{id}' must not contain path separators"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
