/// CPAL-based microphone capture
///
/// A cpal `Stream` is not `Send`, so a dedicated capture thread owns it and
/// forwards mono 16-bit chunks over a bounded channel. Dropping the
/// `Microphone` stops the stream and joins the thread.
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use pinlab_core::AudioClip;

use crate::error::{CaptureError, Result};
use crate::phrase::PhraseDetector;

/// Chunks buffered between the capture callback and the listener
const CHUNK_QUEUE_CAPACITY: usize = 256;

/// How often a blocked listener wakes up to check its timeout and cancel flag
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct Microphone {
    chunk_rx: Receiver<Vec<i16>>,
    shutdown_tx: Sender<()>,
    capture_thread: Option<JoinHandle<()>>,
    sample_rate: u32,
    device_name: String,
}

impl Microphone {
    /// Open an input device and start capturing
    ///
    /// # Arguments
    /// * `device_name` - Exact device name, or `None` for the system default
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(name) => find_input_device(&host, name)?,
            None => host
                .default_input_device()
                .ok_or(CaptureError::DeviceNotFound)?,
        };
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device.default_input_config()?;
        let sample_rate = supported.sample_rate();
        let sample_format = supported.sample_format();
        let config = supported.config();

        let (chunk_tx, chunk_rx) = bounded::<Vec<i16>>(CHUNK_QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let capture_thread = thread::Builder::new()
            .name("pinlab-capture".to_string())
            .spawn(move || {
                Self::capture_thread_run(
                    device,
                    config,
                    sample_format,
                    chunk_tx,
                    ready_tx,
                    shutdown_rx,
                );
            })
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        ready_rx.recv().map_err(|_| CaptureError::Disconnected)??;

        info!(
            device = %device_name,
            sample_rate,
            format = ?sample_format,
            "Microphone opened"
        );

        Ok(Self {
            chunk_rx,
            shutdown_tx,
            capture_thread: Some(capture_thread),
            sample_rate,
            device_name,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Sample background noise for `duration` and adapt the detector's
    /// threshold to it
    ///
    /// Returns `CaptureError::Cancelled` soon after `cancel` is set.
    pub fn adjust_for_ambient_noise(
        &self,
        detector: &mut PhraseDetector,
        duration: Duration,
        cancel: &AtomicBool,
    ) -> Result<()> {
        self.discard_buffered();
        calibrate_from(&self.chunk_rx, detector, duration, cancel)
    }

    /// Block until the detector yields a phrase
    ///
    /// `timeout` bounds the wait for speech to start; a phrase in progress is
    /// always completed unless `cancel` is set.
    pub fn listen(
        &self,
        detector: &mut PhraseDetector,
        timeout: Option<Duration>,
        cancel: &AtomicBool,
    ) -> Result<AudioClip> {
        listen_on(&self.chunk_rx, detector, timeout, cancel)
    }

    /// Drop audio captured while nobody was listening
    fn discard_buffered(&self) {
        let stale = self.chunk_rx.try_iter().count();
        if stale > 0 {
            debug!(chunks = stale, "Discarded buffered audio");
        }
    }

    /// Capture thread main
    ///
    /// Owns the stream until the shutdown channel fires or is dropped.
    fn capture_thread_run(
        device: Device,
        config: StreamConfig,
        sample_format: cpal::SampleFormat,
        chunk_tx: Sender<Vec<i16>>,
        ready_tx: Sender<Result<()>>,
        shutdown_rx: Receiver<()>,
    ) {
        let stream = match Self::start_stream(&device, &config, sample_format, chunk_tx) {
            Ok(stream) => {
                let _ = ready_tx.send(Ok(()));
                stream
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        let _ = shutdown_rx.recv();
        drop(stream);
        debug!("Capture thread stopped");
    }

    fn start_stream(
        device: &Device,
        config: &StreamConfig,
        sample_format: cpal::SampleFormat,
        chunk_tx: Sender<Vec<i16>>,
    ) -> Result<Stream> {
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_input::<f32>(device, config, chunk_tx)?,
            cpal::SampleFormat::I16 => build_input::<i16>(device, config, chunk_tx)?,
            cpal::SampleFormat::U16 => build_input::<u16>(device, config, chunk_tx)?,
            cpal::SampleFormat::I32 => build_input::<i32>(device, config, chunk_tx)?,
            other => return Err(CaptureError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream.play()?;
        Ok(stream)
    }
}

impl Drop for Microphone {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.capture_thread.take() {
            if handle.join().is_err() {
                warn!("Capture thread panicked");
            }
        }
    }
}

fn calibrate_from(
    chunk_rx: &Receiver<Vec<i16>>,
    detector: &mut PhraseDetector,
    duration: Duration,
    cancel: &AtomicBool,
) -> Result<()> {
    let deadline = Instant::now() + duration;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(CaptureError::Cancelled);
        }
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        match chunk_rx.recv_timeout((deadline - now).min(POLL_INTERVAL)) {
            Ok(chunk) => detector.calibrate(&chunk),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Err(CaptureError::Disconnected),
        }
    }

    debug!(
        threshold = detector.threshold().value(),
        "Adjusted for ambient noise"
    );
    Ok(())
}

fn listen_on(
    chunk_rx: &Receiver<Vec<i16>>,
    detector: &mut PhraseDetector,
    timeout: Option<Duration>,
    cancel: &AtomicBool,
) -> Result<AudioClip> {
    detector.reset();
    let started = Instant::now();

    loop {
        if cancel.load(Ordering::Relaxed) {
            detector.reset();
            return Err(CaptureError::Cancelled);
        }

        match chunk_rx.recv_timeout(POLL_INTERVAL) {
            Ok(chunk) => {
                if let Some(clip) = detector.push(&chunk) {
                    return Ok(clip);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Err(CaptureError::Disconnected),
        }

        if let Some(timeout) = timeout {
            if !detector.is_speaking() && started.elapsed() >= timeout {
                return Err(CaptureError::ListenTimeout(timeout));
            }
        }
    }
}

fn find_input_device(host: &cpal::Host, name: &str) -> Result<Device> {
    host.input_devices()?
        .find(|device| device.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| CaptureError::DeviceUnavailable(name.to_string()))
}

fn build_input<T>(
    device: &Device,
    config: &StreamConfig,
    chunk_tx: Sender<Vec<i16>>,
) -> Result<Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // Never block the real-time thread; a full queue drops the chunk
            let _ = chunk_tx.try_send(downmix(data, channels));
        },
        |err| warn!(error = %err, "Input stream error"),
        None,
    )?;

    Ok(stream)
}

/// Average interleaved frames into mono 16-bit samples
fn downmix<T>(data: &[T], channels: usize) -> Vec<i16>
where
    T: Sample,
    f32: FromSample<T>,
{
    data.chunks(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
            i16::from_sample(sum / frame.len() as f32)
        })
        .collect()
}
