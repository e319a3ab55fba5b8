use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::catalog::id::ArtifactId;
use crate::encode::dir::ensure_parent_dir;
use crate::encode::sink::ArtifactSink;
use crate::foundation::core::Raster;
use crate::foundation::error::{AdsmithError, AdsmithResult};
use crate::foundation::math::mul_div255_u16;
use crate::pan::sequencer::PanFrame;

/// Options for [`Mp4SequenceSink`].
#[derive(Clone, Debug)]
pub struct Mp4SinkOpts {
    /// Directory receiving `<identifier>.mp4` files.
    pub root: PathBuf,
    /// Overwrite output files that already exist.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Mp4SinkOpts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink decorator that also encodes every sequence to H.264 MP4 through the system `ffmpeg`.
///
/// Stills and sequences are forwarded to the inner sink first.
pub struct Mp4SequenceSink<S> {
    inner: S,
    opts: Mp4SinkOpts,
    scratch: Vec<u8>,
}

impl<S: ArtifactSink> Mp4SequenceSink<S> {
    pub fn new(inner: S, opts: Mp4SinkOpts) -> Self {
        Self {
            inner,
            opts,
            scratch: Vec::new(),
        }
    }

    /// Path of the MP4 written for `id`.
    pub fn mp4_path(&self, id: &ArtifactId) -> PathBuf {
        self.opts.root.join(format!("{id}.mp4"))
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn encode(&mut self, path: &Path, frames: &[PanFrame], delay_ms: u32) -> AdsmithResult<()> {
        let Some(first) = frames.first() else {
            return Err(AdsmithError::validation("mp4 sequence has no frames"));
        };
        if delay_ms == 0 {
            return Err(AdsmithError::validation("frame delay must be non-zero"));
        }
        let (width, height) = first.raster.dimensions();

        ensure_parent_dir(path)?;
        if !self.opts.overwrite && path.exists() {
            return Err(AdsmithError::validation(format!(
                "output file '{}' already exists",
                path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(AdsmithError::render(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{width}x{height}"),
            "-r",
            &format!("1000/{delay_ms}"),
            "-i",
            "pipe:0",
            // yuv420p needs even dimensions; ad sizes are not guaranteed to have them.
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(path);

        let mut child = cmd.spawn().map_err(|e| {
            AdsmithError::render(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AdsmithError::render("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AdsmithError::render("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok::<_, std::io::Error>(stderr_bytes)
        });

        self.scratch.resize((width * height * 4) as usize, 0);
        let mut write_result = Ok(());
        for frame in frames {
            if frame.raster.dimensions() != (width, height) {
                write_result = Err(AdsmithError::validation(format!(
                    "frame size mismatch: got {}x{}, expected {width}x{height}",
                    frame.raster.width(),
                    frame.raster.height()
                )));
                break;
            }
            flatten_over_bg(&mut self.scratch, &frame.raster, self.opts.bg_rgba);
            if let Err(e) = stdin.write_all(&self.scratch) {
                write_result = Err(AdsmithError::render(format!(
                    "failed to write frame to ffmpeg stdin: {e}"
                )));
                break;
            }
        }
        drop(stdin);

        let status = child.wait().map_err(|e| {
            AdsmithError::render(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| AdsmithError::render("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| AdsmithError::render(format!("ffmpeg stderr read failed: {e}")))?;
        write_result?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(AdsmithError::render(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        tracing::debug!(path = %path.display(), frames = frames.len(), "wrote mp4");
        Ok(())
    }
}

impl<S: ArtifactSink> ArtifactSink for Mp4SequenceSink<S> {
    fn write_still(&mut self, id: &ArtifactId, raster: &Raster) -> AdsmithResult<()> {
        self.inner.write_still(id, raster)
    }

    fn write_sequence(
        &mut self,
        id: &ArtifactId,
        frames: &[PanFrame],
        delay_ms: u32,
    ) -> AdsmithResult<()> {
        self.inner.write_sequence(id, frames, delay_ms)?;
        let path = self.mp4_path(id);
        self.encode(&path, frames, delay_ms)
    }

    fn finish(&mut self) -> AdsmithResult<()> {
        self.inner.finish()
    }
}

/// Flatten a straight-alpha raster over `bg_rgba` into opaque RGBA8.
fn flatten_over_bg(dst: &mut [u8], src: &Raster, bg_rgba: [u8; 4]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.as_raw().chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255_u16(u16::from(s[c]), a) + mul_div255_u16(u16::from(bg_rgba[c]), inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
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
