//! Trace file formats and shared helpers for tools

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Trace file format detection and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    Wav,
    Json,
    Text,
}

impl TraceFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("wav") => TraceFormat::Wav,
            Some("json") => TraceFormat::Json,
            _ => TraceFormat::Text, // Default
        }
    }

    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            TraceFormat::Wav => "wav",
            TraceFormat::Json => "json",
            TraceFormat::Text => "txt",
        }
    }
}

/// A loaded trace, with the sample rate when the file carried one
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub samples: Vec<f64>,
    pub sample_rate: Option<u32>,
}

/// Read a trace from disk
pub fn read_trace(path: &Path) -> Result<Trace> {
    let trace = match TraceFormat::from_path(path) {
        TraceFormat::Wav => read_wav(path)?,
        TraceFormat::Json => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read trace file: {:?}", path))?;
            let samples: Vec<f64> = serde_json::from_str(&content)
                .with_context(|| format!("Trace is not a flat JSON array of numbers: {:?}", path))?;
            Trace { samples, sample_rate: None }
        }
        TraceFormat::Text => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read trace file: {:?}", path))?;
            let samples = parse_text_samples(&content)
                .with_context(|| format!("Failed to parse trace file: {:?}", path))?;
            Trace { samples, sample_rate: None }
        }
    };

    info!("Read {} samples from {:?}", trace.samples.len(), path);
    Ok(trace)
}

/// Write a trace to disk; `sample_rate` is only used for WAV output
pub fn write_trace(path: &Path, samples: &[f64], sample_rate: u32) -> Result<()> {
    match TraceFormat::from_path(path) {
        TraceFormat::Wav => write_wav(path, samples, sample_rate)?,
        TraceFormat::Json => {
            let content = serde_json::to_string(samples).context("Failed to serialize trace")?;
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write trace file: {:?}", path))?;
        }
        TraceFormat::Text => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create trace file: {:?}", path))?;
            let mut writer = std::io::BufWriter::new(file);
            write_text_samples(&mut writer, samples)?;
            writer.flush()?;
        }
    }

    info!("Wrote {} samples to {:?}", samples.len(), path);
    Ok(())
}

/// Write one sample per line
pub fn write_text_samples<W: Write>(writer: &mut W, samples: &[f64]) -> Result<()> {
    for sample in samples {
        writeln!(writer, "{}", sample)?;
    }
    Ok(())
}

/// Parse numbers separated by whitespace or commas; `#` starts a comment
pub fn parse_text_samples(content: &str) -> Result<Vec<f64>> {
    let mut samples = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("");
        for token in line.split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }
            let value = token
                .parse::<f64>()
                .with_context(|| format!("Invalid sample {:?} on line {}", token, line_no + 1))?;
            samples.push(value);
        }
    }
    Ok(samples)
}

/// Parse a comma separated coefficient list, e.g. `0.25,0.5,0.25`
pub fn parse_coefficients(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().map_err(|e| format!("invalid coefficient {:?}: {}", token, e)))
        .collect()
}

/// Read the first channel of a WAV file, normalised to [-1, 1]
fn read_wav(path: &Path) -> Result<Trace> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {:?}", path))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<Vec<f64>, _>>()
            .context("Failed to read audio samples")?,
        hound::SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample.max(1) - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<Result<Vec<f64>, _>>()
                .context("Failed to read audio samples")?
        }
    };

    let samples = interleaved.into_iter().step_by(channels).collect();
    Ok(Trace {
        samples,
        sample_rate: Some(spec.sample_rate),
    })
}

fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;
    for &sample in samples {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Initialize logging; `debug` wins over `verbose`, otherwise only warnings
pub fn init_logging(verbose: bool, debug: bool) {
    let log_level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::Builder;

    #[test]
    fn test_trace_format_detection() {
        assert_eq!(TraceFormat::from_path(&PathBuf::from("a.wav")), TraceFormat::Wav);
        assert_eq!(TraceFormat::from_path(&PathBuf::from("a.json")), TraceFormat::Json);
        assert_eq!(TraceFormat::from_path(&PathBuf::from("a.dat")), TraceFormat::Text);
        assert_eq!(TraceFormat::from_path(&PathBuf::from("trace")), TraceFormat::Text);
        assert_eq!(TraceFormat::Wav.extension(), "wav");
    }

    #[test]
    fn test_parse_text_samples() {
        let content = "# time trace\n1.0 2.5\n-3,4e-1  # inline\n\n5\n";
        assert_eq!(parse_text_samples(content).unwrap(), vec![1.0, 2.5, -3.0, 0.4, 5.0]);
        assert!(parse_text_samples("1.0 abc").is_err());
    }

    #[test]
    fn test_parse_coefficients() {
        assert_eq!(parse_coefficients("0.25, 0.5,0.25").unwrap(), vec![0.25, 0.5, 0.25]);
        assert!(parse_coefficients("").unwrap().is_empty());
        assert!(parse_coefficients("1,x").is_err());
    }

    #[test]
    fn test_text_trace_file() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        write_trace(file.path(), &[1.0, -0.5, 0.125], 48000).unwrap();

        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.samples, vec![1.0, -0.5, 0.125]);
        assert_eq!(trace.sample_rate, None);
    }

    #[test]
    fn test_json_trace_file() {
        let file = Builder::new().suffix(".json").tempfile().unwrap();
        write_trace(file.path(), &[0.0, 1.5], 48000).unwrap();
        assert_eq!(read_trace(file.path()).unwrap().samples, vec![0.0, 1.5]);

        std::fs::write(file.path(), "[[1.0, 2.0], [3.0, 4.0]]").unwrap();
        assert!(read_trace(file.path()).is_err());
    }

    #[test]
    fn test_wav_trace_file() {
        let file = Builder::new().suffix(".wav").tempfile().unwrap();
        write_trace(file.path(), &[0.5, -0.25, 0.0], 8000).unwrap();

        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.samples, vec![0.5, -0.25, 0.0]);
        assert_eq!(trace.sample_rate, Some(8000));
    }

    #[test]
    fn test_int_wav_is_normalised() {
        let file = Builder::new().suffix(".wav").tempfile().unwrap();
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(file.path(), spec).unwrap();
        for sample in [16384i16, 1, -16384, 1] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.samples, vec![0.5, -0.5]);
    }
}
