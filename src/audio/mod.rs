//! Audio I/O for the CLI frontend.
//!
//! Raw mono `f32` little-endian PCM is read from stdin, run through a
//! [`BlockProcessor`] and written to stdout.

use std::io::{self, Read, Write};

use crate::error::{ClipperError, Result};
use crate::stage::BlockProcessor;

/// Buffer size for audio processing (in samples).
pub const BUFFER_SIZE: usize = 256;

const SAMPLE_BYTES: usize = std::mem::size_of::<f32>();

/// Reader of `f32le` samples.
///
/// Reads that end in the middle of a sample keep the partial bytes for the
/// next call.
pub struct AudioInput<R> {
    reader: R,
    buffer: Vec<u8>,
    pending: usize,
}

impl<R: Read> AudioInput<R> {
    /// Wrap a byte source.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: vec![0u8; BUFFER_SIZE * SAMPLE_BYTES],
            pending: 0,
        }
    }

    /// Read a block of samples.
    /// Returns the number of samples read, or 0 on EOF.
    pub fn read_block(&mut self, samples: &mut [f32]) -> Result<usize> {
        let bytes_wanted = samples.len() * SAMPLE_BYTES;
        if self.buffer.len() < bytes_wanted {
            self.buffer.resize(bytes_wanted, 0);
        }

        let mut filled = self.pending;
        while filled < SAMPLE_BYTES || filled % SAMPLE_BYTES != 0 {
            let n = match self.reader.read(&mut self.buffer[filled..bytes_wanted]) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ClipperError::AudioInputError {
                        message: e.to_string(),
                    })
                }
            };
            if n == 0 {
                if filled > 0 && filled < SAMPLE_BYTES {
                    log::warn!("discarding {} trailing bytes of a partial sample", filled);
                }
                break;
            }
            filled += n;
        }

        let count = filled / SAMPLE_BYTES;
        for (i, sample) in samples.iter_mut().take(count).enumerate() {
            let start = i * SAMPLE_BYTES;
            let mut bytes = [0u8; SAMPLE_BYTES];
            bytes.copy_from_slice(&self.buffer[start..start + SAMPLE_BYTES]);
            *sample = f32::from_le_bytes(bytes);
        }

        let used = count * SAMPLE_BYTES;
        self.pending = if count == 0 { 0 } else { filled - used };
        self.buffer.copy_within(used..filled, 0);
        Ok(count)
    }
}

/// Writer of `f32le` samples.
pub struct AudioOutput<W> {
    writer: W,
    buffer: Vec<u8>,
}

impl<W: Write> AudioOutput<W> {
    /// Wrap a byte sink.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: Vec::with_capacity(BUFFER_SIZE * SAMPLE_BYTES),
        }
    }

    /// Write a block of samples.
    pub fn write_block(&mut self, samples: &[f32]) -> Result<()> {
        self.buffer.clear();
        for &sample in samples {
            self.buffer.extend_from_slice(&sample.to_le_bytes());
        }

        self.writer
            .write_all(&self.buffer)
            .map_err(|e| ClipperError::AudioOutputError {
                message: e.to_string(),
            })
    }

    /// Flush the output stream.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| ClipperError::AudioOutputError {
            message: e.to_string(),
        })
    }
}

/// Stream samples from `reader` to `writer` through a processor.
///
/// Returns the number of samples processed.
pub fn process_stream<R: Read, W: Write>(
    processor: &mut dyn BlockProcessor,
    reader: R,
    writer: W,
) -> Result<usize> {
    let mut input = AudioInput::new(reader);
    let mut output = AudioOutput::new(writer);

    let mut in_samples = vec![0.0f32; BUFFER_SIZE];
    let mut out_samples = vec![0.0f32; BUFFER_SIZE];
    let mut total = 0;

    loop {
        let samples_read = input.read_block(&mut in_samples)?;

        if samples_read == 0 {
            break;
        }

        processor.process_block(&in_samples[..samples_read], &mut out_samples[..samples_read])?;
        output.write_block(&out_samples[..samples_read])?;
        total += samples_read;
    }

    output.flush()?;
    Ok(total)
}

/// Process audio from stdin to stdout.
pub fn process_audio(processor: &mut dyn BlockProcessor) -> Result<()> {
    let total = process_stream(processor, io::stdin().lock(), io::stdout().lock())?;
    log::info!("processed {} samples", total);
    Ok(())
}
