//! Template narration derived from scene fields.

use crate::scene::model::{Scene, SceneContent};

/// Average speaking rate used for duration estimates (150 words per minute).
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Derive narration for `scene` from its fields.
///
/// `position` and `total` are the scene's index and the number of scenes in its video; they pick
/// between opening/closing phrasings and drive the checkpoint progress percentage.
pub fn template_narration(scene: &Scene, position: usize, total: usize) -> String {
    match &scene.content {
        SceneContent::Title(t) => {
            let title = t.title.trim();
            let subtitle = t.subtitle.trim();
            match (position == 0, subtitle.is_empty()) {
                (true, false) => format!("Welcome to {title}: {subtitle}. Let's get started."),
                (true, true) => {
                    format!("Welcome to {title}. In this video, we'll explore key concepts.")
                }
                (false, false) => format!("{title}. {subtitle}."),
                (false, true) => format!("{title}."),
            }
        }
        SceneContent::Outro(o) => {
            let main = o.main_text.trim();
            let sub = o.sub_text.trim();
            let last = position + 1 >= total;
            match (last, sub.is_empty()) {
                (true, false) => format!("{main}. {sub}. Thanks for watching!"),
                (true, true) => format!(
                    "{main}. If you found this helpful, check out our other resources. Thanks for watching!"
                ),
                (false, false) => format!("{main}. {sub}."),
                (false, true) => format!("{main}."),
            }
        }
        SceneContent::List(l) => {
            let preview = if l.items.is_empty() {
                "We have several important points".to_string()
            } else {
                format!("We have {} key points to cover", l.items.len())
            };
            format!("Let's look at {}. {preview}.", l.header.trim())
        }
        SceneContent::Command(c) => {
            let header = c.header.trim();
            if c.commands.is_empty() {
                format!("Now let's look at {header}. Follow along with these steps.")
            } else {
                format!(
                    "Here's how to {}. We'll run {} commands to get set up.",
                    header.to_lowercase(),
                    c.commands.len()
                )
            }
        }
        SceneContent::CodeComparison(_) => {
            "Let's compare the before and after. Notice the key differences in the implementation."
                .to_string()
        }
        SceneContent::Quiz(_) => {
            "Time for a quick knowledge check. Think about what we've covered so far.".to_string()
        }
        SceneContent::Problem(_) => {
            "Here's the problem we need to solve. Let's break it down step by step.".to_string()
        }
        SceneContent::Solution(_) => {
            "And here's the solution. Notice how we apply the concepts we discussed earlier."
                .to_string()
        }
        SceneContent::Checkpoint(_) => {
            let progress = if total == 0 {
                0
            } else {
                position * 100 / total
            };
            format!(
                "Great progress! We're about {progress}% through. Let's review what we've learned."
            )
        }
        SceneContent::Exercise(_) => {
            "Now it's your turn to practice. Try this exercise to reinforce what you've learned."
                .to_string()
        }
        SceneContent::LearningObjectives(_) => {
            "By the end of this video, you'll understand these key concepts. Let's dive in."
                .to_string()
        }
        SceneContent::Quote(_) => {
            "Here's an important insight to remember. Keep this in mind as we continue."
                .to_string()
        }
    }
}

/// Fill empty narration in `scenes` from templates. Returns how many scenes were filled.
pub fn fill_missing_narration(scenes: &mut [Scene]) -> usize {
    let total = scenes.len();
    let mut filled = 0;
    for (i, scene) in scenes.iter_mut().enumerate() {
        if !scene.has_narration() {
            scene.narration = template_narration(scene, i, total);
            filled += 1;
        }
    }
    filled
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn estimated_speech_secs(text: &str) -> f64 {
    word_count(text) as f64 / WORDS_PER_SECOND
}

#[cfg(test)]
#[path = "../../tests/unit/scene/narration.rs"]
mod tests;
