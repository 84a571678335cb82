use std::io::{Read, Write as _};
use std::process::{Command, Stdio};

use crate::encode::encoder::{EncodeJob, EncodedArtifact, VideoEncoder, ensure_parent_dir};
use crate::foundation::core::{CANVAS, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// Streams raw RGB frames into the system `ffmpeg` and muxes the narration tracks.
///
/// Each audio track is delayed to its start offset and the tracks are mixed into one AAC stream.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    program: String,
    /// Overwrite output files that already exist.
    pub overwrite: bool,
    /// x264 constant rate factor.
    pub crf: u8,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            overwrite: true,
            crf: 23,
        }
    }
}

impl FfmpegEncoder {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Full argument list for `job`.
    pub fn args(&self, job: &EncodeJob) -> Vec<String> {
        let (w, h) = job
            .frames
            .clips()
            .first()
            .map(|c| c.keyframes.dimensions())
            .unwrap_or((CANVAS.width, CANVAS.height));
        let mut args: Vec<String> = vec![if self.overwrite { "-y" } else { "-n" }.into()];
        args.extend(
            [
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
            ]
            .map(String::from),
        );
        args.push(format!("{w}x{h}"));
        args.push("-r".into());
        args.push(fps_arg(job.fps));
        args.extend(["-i", "pipe:0"].map(String::from));

        for track in &job.audio {
            args.push("-i".into());
            args.push(track.path.display().to_string());
        }

        if job.audio.is_empty() {
            args.push("-an".into());
        } else {
            let mut filter = String::new();
            for (i, track) in job.audio.iter().enumerate() {
                let ms = (track.start_secs.max(0.0) * 1000.0).round() as u64;
                filter.push_str(&format!("[{}:a]adelay={ms}:all=1[a{i}];", i + 1));
            }
            for i in 0..job.audio.len() {
                filter.push_str(&format!("[a{i}]"));
            }
            filter.push_str(&format!(
                "amix=inputs={}:duration=longest:normalize=0[aout]",
                job.audio.len()
            ));
            args.extend(["-filter_complex".into(), filter]);
            args.extend(["-map", "0:v", "-map", "[aout]", "-c:a", "aac"].map(String::from));
        }

        args.extend(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-crf"].map(String::from));
        args.push(self.crf.to_string());
        if !job.audio.is_empty() {
            // Audio may run past the last frame; the video length wins.
            args.push("-shortest".into());
        }
        args.extend(["-movflags", "+faststart"].map(String::from));
        args.push(job.output_path.display().to_string());
        args
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn extension(&self) -> &str {
        "mp4"
    }

    fn encode(&self, job: &EncodeJob) -> ReelResult<EncodedArtifact> {
        if job.frames.is_empty() {
            return Err(ReelError::encoding(format!(
                "video '{}' has no frames",
                job.video_id
            )));
        }
        ensure_parent_dir(&job.output_path)?;
        if !self.overwrite && job.output_path.exists() {
            return Err(ReelError::encoding(format!(
                "output file '{}' already exists",
                job.output_path.display()
            )));
        }

        let mut child = Command::new(&self.program)
            .args(self.args(job))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelError::encoding(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    self.program
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok::<_, std::io::Error>(bytes)
        });

        let total = job.frames.len();
        let mut buf = Vec::with_capacity(CANVAS.rgb_len());
        let mut write_result = Ok(());
        for i in 0..total {
            if let Err(e) = job.frames.frame_into(FrameIndex(i), &mut buf) {
                write_result = Err(e);
                break;
            }
            if let Err(e) = stdin.write_all(&buf) {
                write_result = Err(ReelError::encoding(format!(
                    "failed to write frame {i} to ffmpeg stdin: {e}"
                )));
                break;
            }
        }
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| ReelError::encoding(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| ReelError::encoding("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| ReelError::encoding(format!("ffmpeg stderr read failed: {e}")))?;
        if !status.success() {
            return Err(ReelError::encoding(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        write_result?;

        tracing::debug!(video = %job.video_id, frames = total, "ffmpeg finished");
        EncodedArtifact::from_output(&job.output_path, total)
    }
}

fn fps_arg(fps: Fps) -> String {
    format!("{}/{}", fps.num, fps.den)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
