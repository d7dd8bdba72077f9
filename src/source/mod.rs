//! Line sources for the `cull` binary.
//!
//! Input is read from a file or piped stdin and handed to a running session
//! in batches, so the first screen appears before a large input is read to
//! the end.

use crate::coordinator::Coordinator;
use crate::model::error::InputError;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use tracing::{debug, info};

pub mod file;
pub mod stdin;

/// Records handed to the coordinator per append.
pub const BATCH_SIZE: usize = 1024;

/// Open the input: `file` if given, otherwise piped stdin.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if `file` does not exist and
/// `InputError::NoInput` if no file is given and stdin is a terminal.
pub fn open(file: Option<PathBuf>) -> Result<Box<dyn Read + Send>, InputError> {
    match file {
        Some(path) => Ok(Box::new(file::open(path)?)),
        None => Ok(Box::new(stdin::piped()?)),
    }
}

/// Newline-separated records read in fixed-size batches.
///
/// Invalid UTF-8 is replaced, not rejected. A trailing `\r` is stripped. A
/// final record without a newline is still yielded.
#[derive(Debug)]
pub struct LineBatches<R: Read> {
    reader: BufReader<R>,
    batch_size: usize,
    done: bool,
}

impl<R: Read> LineBatches<R> {
    /// Batches of up to `batch_size` records (at least one).
    pub fn new(reader: R, batch_size: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            batch_size: batch_size.max(1),
            done: false,
        }
    }

    fn read_batch(&mut self) -> Result<Vec<String>, InputError> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut raw = Vec::new();
        while batch.len() < self.batch_size {
            raw.clear();
            if self.reader.read_until(b'\n', &mut raw)? == 0 {
                self.done = true;
                break;
            }
            if raw.last() == Some(&b'\n') {
                raw.pop();
                if raw.last() == Some(&b'\r') {
                    raw.pop();
                }
            }
            batch.push(String::from_utf8_lossy(&raw).into_owned());
        }
        Ok(batch)
    }
}

impl<R: Read> Iterator for LineBatches<R> {
    type Item = Result<Vec<String>, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_batch() {
            Ok(batch) if batch.is_empty() => None,
            Ok(batch) => Some(Ok(batch)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Stream every record of `reader` into `coordinator`.
///
/// Stops early once the session is exiting. Returns the number of records fed.
///
/// # Errors
///
/// Returns the first read failure; records fed before it stay in the buffer.
pub fn feed<R: Read>(coordinator: &Coordinator, reader: R) -> Result<usize, InputError> {
    let mut fed = 0;
    for batch in LineBatches::new(reader, BATCH_SIZE) {
        if coordinator.is_exiting() {
            debug!(fed, "Session exiting; input abandoned");
            return Ok(fed);
        }
        fed += coordinator.feed_lines(batch?);
    }
    info!(fed, "Input complete");
    Ok(fed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::ExitStatus;

    fn batches(data: &[u8], size: usize) -> Vec<Vec<String>> {
        LineBatches::new(data, size)
            .collect::<Result<_, _>>()
            .expect("in-memory reads cannot fail")
    }

    #[test]
    fn splits_records_into_batches() {
        let got = batches(b"a\nb\nc\n", 2);
        assert_eq!(got, vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn final_record_without_newline_is_kept() {
        assert_eq!(batches(b"a\nlast", 10), vec![vec!["a", "last"]]);
    }

    #[test]
    fn crlf_is_stripped() {
        assert_eq!(batches(b"one\r\ntwo\r\n", 10), vec![vec!["one", "two"]]);
    }

    #[test]
    fn empty_lines_are_records() {
        assert_eq!(batches(b"\n\nx\n", 10), vec![vec!["", "", "x"]]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(batches(b"", 10).is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let got = batches(b"ok\n\xff\n", 10);
        assert_eq!(got[0][1], "\u{fffd}");
    }

    #[test]
    fn nul_bytes_pass_through() {
        assert_eq!(batches(b"shown\0out\n", 10), vec![vec!["shown\0out"]]);
    }

    #[test]
    fn feed_appends_every_record() {
        let coordinator = Coordinator::start(Config::default()).unwrap();
        let data: String = (0..3000).map(|i| format!("line {i}\n")).collect();

        let fed = feed(&coordinator, data.as_bytes()).unwrap();

        assert_eq!(fed, 3000);
        assert_eq!(coordinator.buffer_len(), 3000);
    }

    #[test]
    fn feed_stops_once_exiting() {
        let coordinator = Coordinator::start(Config::default()).unwrap();
        coordinator.request_exit(ExitStatus::CANCELED);

        let fed = feed(&coordinator, &b"a\nb\n"[..]).unwrap();

        assert_eq!(fed, 0);
        assert_eq!(coordinator.buffer_len(), 0);
    }

    #[test]
    fn open_missing_file_is_file_not_found() {
        let missing = std::env::temp_dir().join("cull_source_missing_98765.txt");
        assert!(matches!(
            open(Some(missing)),
            Err(InputError::FileNotFound { .. })
        ));
    }
}
