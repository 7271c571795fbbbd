use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use needletail::errors::ParseErrorKind;
use needletail::{FastxReader, parse_fastx_file, parse_fastx_reader};

use crate::record::SequenceRecord;

pub const LOG_FILE: &str = "stew.log";
pub const STDIN_PATH: &str = "-";

/// Stream of owned records from a FASTA/FASTQ source. An empty source yields no records.
pub struct ReadStream {
    reader: Option<Box<dyn FastxReader>>,
}

impl ReadStream {
    /// Open a FASTA/FASTQ file, transparently decompressing it if needed.
    /// A path of `-` reads from stdin.
    pub fn open(path: &Path) -> Result<Self> {
        if path == Path::new(STDIN_PATH) {
            return ReadStream::from_reader(std::io::stdin());
        }

        match parse_fastx_file(path) {
            Ok(reader) => Ok(ReadStream { reader: Some(reader) }),
            Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => Ok(ReadStream { reader: None }),
            Err(e) => Err(e).context(format!("Failed to open {}", path.display())),
        }
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Result<Self> {
        match parse_fastx_reader(reader) {
            Ok(reader) => Ok(ReadStream { reader: Some(reader) }),
            Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => Ok(ReadStream { reader: None }),
            Err(e) => Err(e).context("Failed to parse reads"),
        }
    }

    pub fn is_empty_source(&self) -> bool {
        self.reader.is_none()
    }

    /// Next record in file order, or `None` at the end of input.
    pub fn next_record(&mut self) -> Option<Result<SequenceRecord>> {
        let reader = self.reader.as_mut()?;
        let record = reader.next()?;
        Some(
            record
                .map(|rec| SequenceRecord::from_fastx(&rec))
                .context("Failed to parse record"),
        )
    }
}

/// Create a buffered writer for selected reads, creating parent directories as needed.
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory {}", parent.display()))?;
    }

    let file = File::create(path).context(format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Default log file location: alongside the given output file.
pub fn default_log_path(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(LOG_FILE),
        _ => PathBuf::from(LOG_FILE),
    }
}

/// Strip sequence file extensions (and a trailing `.gz`) from a file name.
pub fn sample_id_from_filename(seq_file: &Path) -> String {
    let mut sample_id = seq_file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    if let Some(stripped) = sample_id.strip_suffix(".gz") {
        sample_id = stripped.to_string();
    }

    for ext in [".fq", ".fastq", ".fa", ".fasta", ".fna"] {
        if let Some(stripped) = sample_id.strip_suffix(ext) {
            sample_id = stripped.to_string();
            break;
        }
    }

    sample_id
}
