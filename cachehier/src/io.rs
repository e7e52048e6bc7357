use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use lazy_static::lazy_static;
use regex::Regex;
use crate::error::TraceError;
use crate::trace::{Operation, Reference};

lazy_static! {
    static ref REFERENCE_PATTERN: Regex =
        Regex::new(r"^\s*(?P<op>[rRwW])\s+(?:0[xX])?(?P<address>[0-9a-fA-F]{1,16})\s*$")
            .expect("reference pattern is valid");
}

/// Parses a single trace line of the form `<r|w> <hex address>`
///
/// returns: None for a blank line
///
/// # Examples
///
/// ```
/// use cachehier::io::parse_reference;
/// use cachehier::trace::{Operation, Reference};
/// let reference = parse_reference("w 0x7b0345a8", 1).unwrap();
/// assert_eq!(reference, Some(Reference { op: Operation::Write, address: 0x7b0345a8 }));
/// assert_eq!(parse_reference("   ", 2).unwrap(), None);
/// ```
pub fn parse_reference(line: &str, line_number: usize) -> Result<Option<Reference>, TraceError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let malformed = || TraceError::Malformed {
        line: line_number,
        content: line.to_string(),
    };
    let tokens = REFERENCE_PATTERN.captures(line).ok_or_else(malformed)?;
    let op = tokens
        .name("op")
        .and_then(|op| op.as_str().chars().next())
        .and_then(Operation::from_code)
        .ok_or_else(malformed)?;
    let address = tokens
        .name("address")
        .and_then(|address| u64::from_str_radix(address.as_str(), 16).ok())
        .ok_or_else(malformed)?;
    Ok(Some(Reference { op, address }))
}

/// Parses a whole trace from any buffered reader. Line numbers in errors start at 1
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<Reference>, TraceError> {
    let mut references = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        if let Some(reference) = parse_reference(&line?, index + 1)? {
            references.push(reference);
        }
    }
    Ok(references)
}

/// Reads a trace file from disk
pub fn read_trace_file<P: AsRef<Path>>(path: P) -> Result<Vec<Reference>, TraceError> {
    let file = File::open(path)?;
    let reader = get_reader(file)?;
    parse_trace(BufReader::new(reader))
}

pub fn get_reader(file: File) -> Result<impl Read, TraceError> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        // 4096 is the standard block size (or a multiple of it) on most systems
        const BUFFER_SIZE: usize = 16 * 4096;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // Empty files can't be mapped
        if file.metadata()?.len() == 0 {
            return Ok(Cursor::new(MappedTrace::Empty));
        }
        // Safety: the trace is only read, and is not expected to change while simulating
        let m = unsafe { Mmap::map(&file)? };
        m.advise(Advice::Sequential)?;
        Ok(Cursor::new(MappedTrace::Mapped(m)))
    }
}

#[cfg(unix)]
enum MappedTrace {
    Empty,
    Mapped(memmap2::Mmap),
}

#[cfg(unix)]
impl AsRef<[u8]> for MappedTrace {
    fn as_ref(&self) -> &[u8] {
        match self {
            MappedTrace::Empty => &[],
            MappedTrace::Mapped(m) => m,
        }
    }
}
