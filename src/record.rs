//! Owned sequence records and the FASTA/FASTQ formatter used for selected reads.

use std::io::Write;

use anyhow::Result;
use needletail::parser::SequenceRecord as FastxRecord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRecord {
    pub name: String,
    pub comment: Option<String>,
    pub seq: Vec<u8>,
    pub qual: Option<Vec<u8>>,
}

impl SequenceRecord {
    /// Copy a parsed record, splitting its header at the first whitespace into
    /// name and comment.
    pub fn from_fastx(rec: &FastxRecord) -> Self {
        let header = String::from_utf8_lossy(rec.id());
        let (name, comment) = match header.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((name, comment)) => {
                let comment = comment.trim();
                (name.to_string(), (!comment.is_empty()).then(|| comment.to_string()))
            }
            None => (header.trim_end().to_string(), None),
        };

        SequenceRecord {
            name,
            comment,
            seq: rec.seq().into_owned(),
            qual: rec.qual().map(|q| q.to_vec()),
        }
    }

    /// Records are written as FASTQ only when they carry both a quality string
    /// and a comment; everything else is written as FASTA.
    pub fn is_fastq(&self) -> bool {
        self.qual.is_some() && self.comment.is_some()
    }

    /// Write the record in FASTA or FASTQ form depending on `is_fastq`.
    pub fn write_to<W: Write>(&self, writer: &mut W, is_fastq: bool) -> Result<()> {
        match (is_fastq, &self.qual) {
            (true, Some(qual)) => {
                write!(writer, "@{}", self.name)?;
                if let Some(comment) = &self.comment {
                    write!(writer, " {}", comment)?;
                }
                writer.write_all(b"\n")?;
                writer.write_all(&self.seq)?;
                writer.write_all(b"\n+\n")?;
                writer.write_all(qual)?;
                writer.write_all(b"\n")?;
            }
            _ => {
                writeln!(writer, ">{}", self.name)?;
                writer.write_all(&self.seq)?;
                writer.write_all(b"\n")?;
            }
        }

        Ok(())
    }
}
