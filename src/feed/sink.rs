//! Text output: midquotes, book snapshots, trade prints and the error report.

use std::io::{self, Write};

use rust_decimal::{Decimal, RoundingStrategy};

use super::report::ErrorTally;
use crate::book::{BookSnapshot, LevelSnapshot, TradePrint};

/// Placeholder written when either side of the book is empty.
pub const NO_QUOTE: &str = "NaN";

/// Format a price with exactly two decimals.
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    format!("{rounded:.2}")
}

/// Byte-oriented destination for everything the processor writes.
#[derive(Debug)]
pub struct OutputSink<W: Write> {
    out: W,
    emit_state: bool,
    emit_trades: bool,
}

impl<W: Write> OutputSink<W> {
    /// Create a sink writing snapshots and trade prints.
    pub fn new(out: W) -> Self {
        Self {
            out,
            emit_state: true,
            emit_trades: true,
        }
    }

    /// Enable or disable snapshot output.
    pub fn with_state(mut self, emit_state: bool) -> Self {
        self.emit_state = emit_state;
        self
    }

    /// Enable or disable trade print output.
    pub fn with_trades(mut self, emit_trades: bool) -> Self {
        self.emit_trades = emit_trades;
        self
    }

    /// `{mid:.2}` or `NaN`.
    pub fn write_midquote(&mut self, midquote: Option<Decimal>) -> io::Result<()> {
        match midquote {
            Some(mid) => writeln!(self.out, "{}", format_price(mid)),
            None => writeln!(self.out, "{NO_QUOTE}"),
        }
    }

    /// `SELLS:` then `BUYS:`, one `price,qty,qty,...` line per level.
    pub fn write_snapshot(&mut self, snapshot: &BookSnapshot) -> io::Result<()> {
        if !self.emit_state {
            return Ok(());
        }
        self.write_side("SELLS", &snapshot.sells)?;
        self.write_side("BUYS", &snapshot.buys)
    }

    fn write_side(&mut self, header: &str, levels: &[LevelSnapshot]) -> io::Result<()> {
        writeln!(self.out, "{header}:")?;
        for level in levels {
            let quantities: Vec<String> = level.quantities.iter().map(i64::to_string).collect();
            writeln!(self.out, "{},{}", format_price(level.price), quantities.join(","))?;
        }
        Ok(())
    }

    /// `{running quantity}@{price}`.
    pub fn write_trade(&mut self, print: &TradePrint) -> io::Result<()> {
        if !self.emit_trades {
            return Ok(());
        }
        writeln!(self.out, "{print}")
    }

    /// `ERRORS:` followed by `code,count` lines.
    pub fn write_errors(&mut self, tally: &ErrorTally) -> io::Result<()> {
        write!(self.out, "{tally}")
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
