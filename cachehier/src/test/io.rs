use std::error::Error;
use std::fs;
use std::io::Cursor;
use crate::error::TraceError;
use crate::io::{parse_trace, read_trace_file};
use crate::trace::Reference;

#[test]
fn parses_mixed_trace_lines() -> Result<(), Box<dyn Error>> {
    let trace = "r 0x0\nW 10\n\n  w 0X7B0345A8  \nr ffffffffffffffff\n";
    let references = parse_trace(Cursor::new(trace))?;
    assert_eq!(
        references,
        vec![
            Reference::read(0x0),
            Reference::write(0x10),
            Reference::write(0x7b0345a8),
            Reference::read(u64::MAX),
        ]
    );
    Ok(())
}

#[test]
fn reports_the_malformed_line() {
    let trace = "r 0x0\nx 0x10\n";
    match parse_trace(Cursor::new(trace)) {
        Err(TraceError::Malformed { line, content }) => {
            assert_eq!(line, 2);
            assert_eq!(content, "x 0x10");
        }
        other => panic!("expected a malformed line error, got {other:?}"),
    }
    assert!(matches!(
        parse_trace(Cursor::new("r 0xzz\n")),
        Err(TraceError::Malformed { line: 1, .. })
    ));
    // More than 64 bits of address
    assert!(parse_trace(Cursor::new("w 0x10000000000000000\n")).is_err());
}

#[test]
fn reads_trace_files_from_disk() -> Result<(), Box<dyn Error>> {
    let directory = std::env::temp_dir().join(format!("cachehier-io-{}", std::process::id()));
    fs::create_dir_all(&directory)?;

    let trace_path = directory.join("trace.txt");
    fs::write(&trace_path, "w 0x0\nr 0x10\nw 0x400\n")?;
    let references = read_trace_file(&trace_path)?;
    assert_eq!(
        references,
        vec![Reference::write(0x0), Reference::read(0x10), Reference::write(0x400)]
    );

    let empty_path = directory.join("empty.txt");
    fs::write(&empty_path, "")?;
    assert!(read_trace_file(&empty_path)?.is_empty());

    assert!(matches!(
        read_trace_file(directory.join("missing.txt")),
        Err(TraceError::Io(_))
    ));
    fs::remove_dir_all(&directory)?;
    Ok(())
}
