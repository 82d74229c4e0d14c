//! Render/capture adapter for callback-driven audio stacks.
//!
//! Audio frameworks usually deliver the loudspeaker (render) and microphone
//! (capture) streams through separate callbacks. [`StreamAdapter`] buffers
//! the most recent render frame and cancels its echo from the next capture
//! frame in place.

use crate::config::Config;
use crate::echo_canceller::EchoCanceller;
use crate::error::Error;

/// Buffers render frames and cancels echo from capture frames.
///
/// Capture frames arriving before any render frame are passed through
/// unchanged, as are all capture frames while the adapter is disabled.
///
/// ```
/// use quell::{Config, StreamAdapter};
///
/// let mut stream = StreamAdapter::with_frame_duration(Config::default(), 10)?;
/// assert_eq!(stream.frame_size(), 160);
///
/// let render = vec![1000i16; 160];
/// let mut capture = vec![2000i16; 160];
/// stream.process_render(&render)?;
/// stream.process_capture(&mut capture)?;
/// # Ok::<(), quell::Error>(())
/// ```
#[derive(derive_more::Debug)]
pub struct StreamAdapter {
    engine: EchoCanceller,
    #[debug(skip)]
    render_frame: Vec<i16>,
    has_render: bool,
    enabled: bool,
}

impl StreamAdapter {
    /// Creates an adapter using `config.frame_size` samples per channel.
    pub fn new(config: Config) -> Result<Self, Error> {
        let engine = EchoCanceller::new(config)?;
        let render_frame = vec![0; engine.config().samples_per_frame()];
        Ok(Self {
            engine,
            render_frame,
            has_render: false,
            enabled: true,
        })
    }

    /// Creates an adapter whose frame size is derived from the sample rate:
    /// `sample_rate_hz * frame_ms / 1000` samples per channel.
    pub fn with_frame_duration(mut config: Config, frame_ms: u32) -> Result<Self, Error> {
        let frame_size = u64::from(config.sample_rate_hz) * u64::from(frame_ms) / 1000;
        config.frame_size = usize::try_from(frame_size)
            .map_err(|_| Error::BadFrameLength { frame_length: usize::MAX })?;
        Self::new(config)
    }

    /// Samples per channel in one frame.
    pub fn frame_size(&self) -> usize {
        self.engine.config().frame_size
    }

    /// Interleaved samples in one frame.
    pub fn samples_per_frame(&self) -> usize {
        self.render_frame.len()
    }

    /// Stores the far-end frame that is about to be played.
    ///
    /// `frame` must hold exactly [`samples_per_frame`](Self::samples_per_frame)
    /// interleaved samples.
    pub fn process_render(&mut self, frame: &[i16]) -> Result<(), Error> {
        self.check_len(frame.len())?;
        self.render_frame.copy_from_slice(frame);
        self.has_render = true;
        Ok(())
    }

    /// Cancels the buffered far-end echo from a microphone frame in place.
    pub fn process_capture(&mut self, frame: &mut [i16]) -> Result<(), Error> {
        self.check_len(frame.len())?;
        if !self.enabled {
            return Ok(());
        }
        if !self.has_render {
            tracing::trace!("capture before render, passing through");
            return Ok(());
        }
        let channels = self.engine.num_channels();
        self.engine
            .process_in_place(&self.render_frame, frame, self.frame_size(), channels)
    }

    fn check_len(&self, actual: usize) -> Result<(), Error> {
        let expected = self.render_frame.len();
        if actual != expected {
            return Err(Error::BadDataLength { expected, actual });
        }
        Ok(())
    }

    /// Enables or bypasses cancellation. Rendering is still buffered while
    /// disabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            tracing::debug!(enabled, "echo cancellation toggled");
        }
        self.enabled = enabled;
    }

    /// Whether capture frames are being processed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// See [`EchoCanceller::erle_db`].
    pub fn erle_db(&self) -> f64 {
        self.engine.erle_db()
    }

    /// See [`EchoCanceller::latency_ms`].
    pub fn latency_ms(&self) -> f64 {
        self.engine.latency_ms()
    }

    /// Clears the engine and forgets the buffered render frame.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.render_frame.fill(0);
        self.has_render = false;
    }

    /// The underlying engine.
    pub fn engine(&self) -> &EchoCanceller {
        &self.engine
    }
}
