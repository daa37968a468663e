//! Clip assembly: renders the cards of one item and streams the frames, in
//! timeline order, to a [`FrameSink`].

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::error::{NewsreelError, NewsreelResult};
use crate::news::Card;
use crate::renderer::{RasterFrame, RevealAnimator};
use crate::text::CanvasSize;

/// Shared flag that stops rendering at the next frame boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parallel rendering options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderThreading {
    pub parallel: bool,
    /// Frames rendered per batch. A batch reaches the sink only once every
    /// frame in it is done.
    pub chunk_size: u32,
    /// Worker count; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Passed to [`FrameSink::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub canvas: CanvasSize,
    pub fps: u32,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called with strictly increasing indices, starting at 0
/// for every clip.
pub trait FrameSink: Send {
    fn begin(&mut self, config: SinkConfig) -> NewsreelResult<()>;
    fn push_frame(&mut self, index: u64, frame: &RasterFrame) -> NewsreelResult<()>;
    fn end(&mut self) -> NewsreelResult<()>;
}

/// Keeps every frame in memory. Meant for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    config: Option<SinkConfig>,
    frames: Vec<(u64, RasterFrame)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.config
    }

    pub fn frames(&self) -> &[(u64, RasterFrame)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, config: SinkConfig) -> NewsreelResult<()> {
        self.config = Some(config);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RasterFrame) -> NewsreelResult<()> {
        self.frames.push((index, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> NewsreelResult<()> {
        Ok(())
    }
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... into one directory.
///
/// Encoding the sequence into a video is left to external tools, e.g.
/// `ffmpeg -framerate 24 -i frame_%05d.png clip.mp4`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _config: SinkConfig) -> NewsreelResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RasterFrame) -> NewsreelResult<()> {
        image::save_buffer(
            self.frame_path(index),
            &frame.pixels,
            frame.width,
            frame.height,
            image::ColorType::Rgb8,
        )?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> NewsreelResult<()> {
        log::info!("wrote {} frames to {}", self.written, self.dir.display());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipStats {
    pub cards: usize,
    pub frames: u64,
}

/// Renders cards frame by frame, in parallel batches when enabled.
pub struct ClipRenderer {
    threading: RenderThreading,
    pool: Option<rayon::ThreadPool>,
    cancel: CancelToken,
}

impl ClipRenderer {
    pub fn new(threading: RenderThreading, cancel: CancelToken) -> NewsreelResult<Self> {
        let pool = if threading.parallel {
            Some(build_thread_pool(threading.threads)?)
        } else {
            None
        };
        Ok(Self {
            threading,
            pool,
            cancel,
        })
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Renders `range` of `animator` and returns the frames in order.
    ///
    /// The cancel token is checked before every frame; a cancelled render
    /// returns [`NewsreelError::Cancelled`] and no frames.
    pub fn render_frames(
        &self,
        animator: &RevealAnimator,
        range: Range<u32>,
    ) -> NewsreelResult<Vec<RasterFrame>> {
        let render = |index: u32| -> NewsreelResult<RasterFrame> {
            if self.cancel.is_cancelled() {
                return Err(NewsreelError::Cancelled(index));
            }
            Ok(animator.render_frame(index))
        };

        match &self.pool {
            Some(pool) => pool.install(|| range.into_par_iter().map(render).collect()),
            None => range.map(render).collect(),
        }
    }

    /// Streams every frame of `cards` to `sink`.
    pub fn render_clip(
        &self,
        cards: &[Card],
        canvas: CanvasSize,
        fps: u32,
        background: [u8; 3],
        sink: &mut dyn FrameSink,
    ) -> NewsreelResult<ClipStats> {
        sink.begin(SinkConfig { canvas, fps })?;

        let chunk_size = self.threading.chunk_size.max(1);
        let mut next_index = 0u64;
        for card in cards {
            let animator = card.animator(background);
            let total = card.total_frames();

            let mut start = 0;
            while start < total {
                let end = start.saturating_add(chunk_size).min(total);
                for frame in self.render_frames(&animator, start..end)? {
                    sink.push_frame(next_index, &frame)?;
                    next_index += 1;
                }
                start = end;
            }
            log::debug!("{:?} card: {} frames", card.kind, total);
        }

        sink.end()?;
        Ok(ClipStats {
            cards: cards.len(),
            frames: next_index,
        })
    }
}

fn build_thread_pool(threads: Option<usize>) -> NewsreelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(NewsreelError::invalid_argument(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| NewsreelError::invalid_argument(format!("cannot build render pool: {e}")))
}
