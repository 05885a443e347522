//! The (video, sample) navigation cursor.
//!
//! Pure bookkeeping: which sampled frame is active, how many exist, and the
//! uncommitted scrub preview. All fetch decisions derive from the booleans
//! returned here — the cursor itself never touches the network.

/// Navigation cursor over a project's videos and their sampled frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCursor {
    video: usize,
    sample: u32,
    sampled_count: u32,
    frame_step: u32,
    /// Scrub preview index; `Some` only while a scrub gesture is live.
    pending: Option<u32>,
}

impl SampleCursor {
    /// Cursor at the first sample of the first video, before any metadata
    /// has arrived.
    pub fn new() -> Self {
        Self {
            video: 0,
            sample: 0,
            sampled_count: 0,
            frame_step: 1,
            pending: None,
        }
    }

    pub fn video(&self) -> usize {
        self.video
    }

    pub fn sample(&self) -> u32 {
        self.sample
    }

    pub fn sampled_count(&self) -> u32 {
        self.sampled_count
    }

    pub fn frame_step(&self) -> u32 {
        self.frame_step
    }

    pub fn is_scrubbing(&self) -> bool {
        self.pending.is_some()
    }

    /// Index the position display should show: the live scrub preview while
    /// scrubbing, the committed sample otherwise.
    pub fn display_sample(&self) -> u32 {
        self.pending.unwrap_or(self.sample)
    }

    /// Progress string like "4/120" (1-based, over the sampled count).
    pub fn progress(&self) -> String {
        format!("{}/{}", self.display_sample() + 1, self.sampled_count)
    }

    /// Clamp an index into the valid sample range.
    pub fn clamp_index(&self, index: u32) -> u32 {
        if self.sampled_count == 0 {
            0
        } else {
            index.min(self.sampled_count - 1)
        }
    }

    /// Refresh `sampled_count`/`frame_step` from store metadata, re-clamping
    /// the cursor if the count shrank.
    pub fn apply_info(&mut self, sampled_count: u32, frame_step: u32) {
        self.sampled_count = sampled_count;
        self.frame_step = frame_step;
        self.sample = self.clamp_index(self.sample);
    }

    /// Move to an explicit sample index, clamped to range. Returns whether
    /// the committed position actually changed; `false` means the caller
    /// must not refetch.
    pub fn goto(&mut self, index: u32) -> bool {
        let target = self.clamp_index(index);
        if target == self.sample {
            return false;
        }
        self.sample = target;
        true
    }

    /// Step forward by one sample. Saturates at the end.
    pub fn step_forward(&mut self) -> bool {
        self.goto(self.sample.saturating_add(1))
    }

    /// Step back by one sample. Saturates at the start.
    pub fn step_back(&mut self) -> bool {
        self.goto(self.sample.saturating_sub(1))
    }

    /// Enter scrub mode, capturing the current index as the preview value.
    pub fn begin_scrub(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.sample);
        }
    }

    /// Update the scrub preview. Only the pending value moves; no commit,
    /// no fetch. Starts a scrub if one is not already live.
    pub fn scrub_preview(&mut self, index: u32) {
        self.pending = Some(self.clamp_index(index));
    }

    /// Release the scrub gesture. Returns the index to navigate to, or
    /// `None` when the preview ended where it started.
    pub fn end_scrub(&mut self) -> Option<u32> {
        let pending = self.pending.take()?;
        (pending != self.sample).then_some(pending)
    }

    /// Switch to another video, resetting the sample cursor to 0. Returns
    /// whether the video actually changed.
    pub fn set_video(&mut self, video: usize) -> bool {
        if video == self.video {
            return false;
        }
        self.video = video;
        self.sample = 0;
        self.pending = None;
        true
    }
}

impl Default for SampleCursor {
    fn default() -> Self {
        Self::new()
    }
}
