//! The feed loop: one row at a time, every row processed to completion
//! before the next is read.

use std::io::{BufRead, BufReader, Read, Write};

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::dispatch::dispatch;
use super::report::ErrorTally;
use super::sink::OutputSink;
use crate::book::{OrderBook, TradePrint};
use crate::config::Config;
use crate::error::{FeedError, Result};
use crate::metrics;

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Rows processed, rejected ones included.
    pub rows: u64,
    /// Rows rejected, plus the end-of-stream check if it failed.
    pub errors: u64,
    /// Trades recorded.
    pub trades: usize,
    /// Crossed-market observations.
    pub crossed_signals: u64,
    /// Orders still resting at the end.
    pub resting_orders: usize,
}

/// Drives an [`OrderBook`] from feed rows and writes the text output.
#[derive(Debug)]
pub struct FeedProcessor<W: Write> {
    book: OrderBook,
    sink: OutputSink<W>,
    tally: ErrorTally,
    snapshot_interval: u64,
    rows: u64,
}

impl<W: Write> FeedProcessor<W> {
    /// Create a processor writing a snapshot every `snapshot_interval` rows.
    /// An interval of 0 is treated as 1.
    pub fn new(sink: OutputSink<W>, snapshot_interval: u64) -> Self {
        Self {
            book: OrderBook::new(),
            sink,
            tally: ErrorTally::new(),
            snapshot_interval: snapshot_interval.max(1),
            rows: 0,
        }
    }

    /// Create a processor from loaded configuration.
    pub fn from_config(config: &Config, out: W) -> Self {
        let sink = OutputSink::new(out)
            .with_state(config.emit_state)
            .with_trades(config.emit_trades);
        Self::new(sink, config.snapshot_interval)
    }

    /// Process one row already split into fields.
    ///
    /// Event errors are tallied; only output failures are returned.
    #[instrument(skip_all, fields(row = self.rows + 1))]
    pub fn process_row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        let outcome = {
            let _timer = metrics::timer_event();
            dispatch(&mut self.book, fields)
        };
        self.complete_row(outcome)
    }

    /// Count a row that could not be decoded at all.
    pub fn reject_row(&mut self, reason: impl Into<String>) -> Result<()> {
        self.complete_row(Err(FeedError::InvalidMessage(reason.into())))
    }

    fn complete_row(&mut self, outcome: std::result::Result<Option<TradePrint>, FeedError>) -> Result<()> {
        metrics::inc_events();
        match outcome {
            Ok(Some(print)) => self.sink.write_trade(&print)?,
            Ok(None) => {}
            Err(error) => self.record(error),
        }

        let midquote = self.book.midquote();
        self.sink.write_midquote(midquote)?;

        self.rows += 1;
        if self.rows % self.snapshot_interval == 0 {
            self.sink.write_snapshot(&self.book.snapshot())?;
        }
        Ok(())
    }

    fn record(&mut self, error: FeedError) {
        warn!(%error, "event rejected");
        metrics::inc_event_errors(error.kind());
        self.tally.record(&error);
    }

    /// Read CSV rows from `input` until it is exhausted, one row per line.
    ///
    /// Fields are trimmed of surrounding whitespace, so ` A , 1 ,...` is
    /// accepted. A blank line is a row with no fields and counts as an
    /// invalid message, as does a line that cannot be decoded. An I/O failure
    /// on the input stops the run.
    pub fn process_reader<R: Read>(&mut self, input: R) -> Result<()> {
        let mut input = BufReader::new(input);
        let mut line = Vec::new();
        let mut record = csv::StringRecord::new();

        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            let row = strip_line_ending(&line);
            if row.is_empty() {
                self.reject_row("empty row")?;
                continue;
            }

            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(row);
            match reader.read_record(&mut record) {
                Ok(true) => {
                    let fields: Vec<&str> = record.iter().collect();
                    self.process_row(&fields)?;
                }
                Ok(false) => self.reject_row("empty row")?,
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => self.reject_row(err.to_string())?,
            }
        }
    }

    /// Run the end-of-stream check, write the final snapshot and the error
    /// report, and hand back the writer.
    pub fn finish(mut self) -> Result<(RunSummary, W)> {
        if let Err(error) = self.book.check_expected_trades() {
            self.record(error);
        }
        self.sink.write_snapshot(&self.book.snapshot())?;
        self.sink.write_errors(&self.tally)?;
        self.sink.flush()?;

        let summary = RunSummary {
            rows: self.rows,
            errors: self.tally.total(),
            trades: self.book.trade_count(),
            crossed_signals: self.book.crossed_market_signals(),
            resting_orders: self.book.order_count(),
        };
        info!(?summary, "feed finished");
        Ok((summary, self.sink.into_inner()))
    }

    /// Process all of `input`, then [`finish`](Self::finish).
    pub fn run<R: Read>(mut self, input: R) -> Result<(RunSummary, W)> {
        self.process_reader(input)?;
        self.finish()
    }

    /// The book being maintained.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Errors tallied so far.
    pub fn tally(&self) -> &ErrorTally {
        &self.tally
    }

    /// Rows processed so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn processor(interval: u64) -> FeedProcessor<Vec<u8>> {
        FeedProcessor::new(OutputSink::new(Vec::new()), interval)
    }

    #[test]
    fn each_row_writes_a_midquote() {
        let mut feed = processor(100);
        feed.process_row(&["A", "1", "B", "1", "100"]).unwrap();
        feed.process_row(&["A", "2", "S", "1", "101"]).unwrap();
        feed.process_row(&["nonsense"]).unwrap();

        assert_eq!(feed.rows(), 3);
        assert_eq!(feed.tally().count(ErrorKind::InvalidMessage), 1);
        let out = String::from_utf8(feed.sink.into_inner()).unwrap();
        assert_eq!(out, "NaN\n100.50\n100.50\n");
    }

    #[test]
    fn snapshot_every_interval_counts_failed_rows() {
        let mut feed = processor(2);
        feed.process_row(&["A", "1", "B", "1", "100"]).unwrap();
        feed.process_row(&["X", "9", "B", "1", "100"]).unwrap();

        let out = String::from_utf8(feed.sink.into_inner()).unwrap();
        assert_eq!(out, "NaN\nNaN\nSELLS:\nBUYS:\n100.00,1\n");
    }

    #[test]
    fn zero_interval_is_clamped() {
        let feed = processor(0);
        assert_eq!(feed.snapshot_interval, 1);
    }

    #[test]
    fn undecodable_rows_are_invalid_messages() {
        let mut feed = processor(100);
        feed.process_reader(&b"A,1,B,1,100\n\xff\xfe,1\n"[..]).unwrap();
        assert_eq!(feed.rows(), 2);
        assert_eq!(feed.tally().count(ErrorKind::InvalidMessage), 1);
    }

    #[test]
    fn blank_lines_are_rejected_rows() {
        let mut feed = processor(3);
        feed.process_reader(&b"A,1,S,5,1025\n\nT,2,1025\n"[..]).unwrap();

        assert_eq!(feed.rows(), 3);
        assert_eq!(feed.tally().count(ErrorKind::InvalidMessage), 1);
        assert_eq!(feed.book().trade_count(), 1);
        let out = String::from_utf8(feed.sink.into_inner()).unwrap();
        assert_eq!(out, "NaN\nNaN\n2@1025.0\nNaN\nSELLS:\n1025.00,5\nBUYS:\n");
    }

    #[test]
    fn crlf_and_missing_final_newline() {
        let mut feed = processor(100);
        feed.process_reader(&b"A,1,B,1,100\r\nA,2,S,1,102"[..]).unwrap();
        assert_eq!(feed.rows(), 2);
        assert_eq!(feed.tally().total(), 0);
        assert_eq!(feed.book().order_count(), 2);
    }

    #[test]
    fn finish_reports_unjustified_cross() {
        let mut feed = processor(100);
        feed.process_row(&["A", "1", "S", "2", "1025"]).unwrap();
        feed.process_row(&["A", "2", "B", "2", "1025"]).unwrap();

        let (summary, out) = feed.finish().unwrap();
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.crossed_signals, 1);
        assert!(String::from_utf8(out).unwrap().ends_with("ERRORS:\ne,1\n"));
    }
}
