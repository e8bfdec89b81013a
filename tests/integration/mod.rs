//! Integration tests for the feed processor.
//!
//! Each test runs a whole CSV feed through `FeedProcessor` and compares the
//! exact output text.

use book_feed::config::Config;
use book_feed::error::ErrorKind;
use book_feed::feed::{FeedProcessor, OutputSink, RunSummary};
use pretty_assertions::assert_eq;

/// Run `feed` with `config` and return the summary and output text.
fn run_feed(config: &Config, feed: &str) -> (RunSummary, String) {
    let processor = FeedProcessor::from_config(config, Vec::new());
    let (summary, out) = processor.run(feed.as_bytes()).expect("feed should run");
    (summary, String::from_utf8(out).expect("output is utf-8"))
}

const SESSION: &str = "\
A,1,S,2,1030
A,2,S,5,1025
A,3,B,3,1000
A,4,B,1,1010
T,2,1025
T,1,1025
M,3,B,6,1000
X,4,B,1,1010
BADMESSAGE
A,2,S,1,1040
X,2,S,5,1025
";

#[test]
fn test_full_session_output() {
    let (summary, out) = run_feed(&Config::default(), SESSION);

    let expected = "\
NaN
NaN
1012.50
1017.50
2@1025.0
1017.50
3@1025.0
1017.50
1017.50
1012.50
1012.50
1012.50
SELLS:
1030.00,2
1025.00,5
BUYS:
1000.00,6
1015.00
SELLS:
1030.00,2
BUYS:
1000.00,6
ERRORS:
a,1
b,1
";
    assert_eq!(out, expected);
    assert_eq!(
        summary,
        RunSummary {
            rows: 11,
            errors: 2,
            trades: 2,
            crossed_signals: 0,
            resting_orders: 2,
        }
    );
}

#[test]
fn test_suppressed_state_and_trades() {
    let config = Config {
        emit_state: false,
        emit_trades: false,
        ..Config::default()
    };
    let (_, out) = run_feed(&config, SESSION);

    let expected = "\
NaN
NaN
1012.50
1017.50
1017.50
1017.50
1017.50
1012.50
1012.50
1012.50
1015.00
ERRORS:
a,1
b,1
";
    assert_eq!(out, expected);
}

#[test]
fn test_snapshot_interval_from_config() {
    let config = Config {
        snapshot_interval: 2,
        ..Config::default()
    };
    let feed = "A,1,B,4,99.5\nA,2,S,1,100.25\nA,3,S,2,100.25\n";
    let (_, out) = run_feed(&config, feed);

    let expected = "\
NaN
99.88
SELLS:
100.25,1
BUYS:
99.50,4
99.88
SELLS:
100.25,1,2
BUYS:
99.50,4
ERRORS:
";
    assert_eq!(out, expected);
}

#[test]
fn test_crossed_book_without_trade_is_reported() {
    let (summary, out) = run_feed(&Config::default(), "A,1,S,2,1025\nA,2,B,2,1025\n");

    let expected = "\
NaN
1025.00
SELLS:
1025.00,2
BUYS:
1025.00,2
ERRORS:
e,1
";
    assert_eq!(out, expected);
    assert_eq!(summary.crossed_signals, 1);
}

#[test]
fn test_crossed_book_with_trade_is_clean() {
    let feed = "A,1,S,2,1025\nA,2,B,2,1025\nT,2,1025\n";
    let (summary, out) = run_feed(&Config::default(), feed);

    assert!(out.ends_with("ERRORS:\n"), "unexpected output:\n{out}");
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.trades, 1);
}

#[test]
fn test_error_kinds_are_tallied() {
    let feed = "\
A,1,S,2,1030
A,2,S,5,1025
T,10,1030
T,1,1000
X,99,S,1,1030
A,5,B,0,1000
A,6,Q,1,1000
M,77,B,1,1000
A,1,S,2,1030
";
    let mut processor = FeedProcessor::new(OutputSink::new(Vec::new()), 100);
    processor.process_reader(feed.as_bytes()).expect("feed should run");

    let tally = processor.tally();
    assert_eq!(tally.count(ErrorKind::InvalidMessage), 0);
    assert_eq!(tally.count(ErrorKind::DuplicateOrder), 1);
    assert_eq!(tally.count(ErrorKind::TradeNotMatched), 2);
    assert_eq!(tally.count(ErrorKind::OrderNotFound), 1);
    assert_eq!(tally.count(ErrorKind::InvalidOrder), 2);
    assert_eq!(processor.rows(), 9);
    assert_eq!(processor.book().order_count(), 2);

    let (_, out) = processor.finish().expect("finish");
    let out = String::from_utf8(out).expect("output is utf-8");
    assert!(out.ends_with("ERRORS:\nb,1\nc,2\nd,1\nf,2\n"), "unexpected output:\n{out}");
}

#[test]
fn test_trades_leave_resting_quantities_untouched() {
    let feed = "A,1,S,2,1025\nA,2,S,5,1025\nA,3,B,3,1000\nT,2,1025\nT,1,1025\n";
    let mut processor = FeedProcessor::new(OutputSink::new(Vec::new()), 100);
    processor.process_reader(feed.as_bytes()).expect("feed should run");

    let book = processor.book();
    assert_eq!(book.order(1).map(|o| o.quantity), Some(2));
    assert_eq!(book.order(2).map(|o| o.quantity), Some(5));
    assert_eq!(book.trade_count(), 2);
    assert_eq!(book.last_trade().map(|t| t.to_string()), Some("3@1025.0".to_string()));
}

#[test]
fn test_whitespace_and_blank_lines() {
    let feed = " A , 1 , B , 1 , 100 \n\nA,2,S,1,102\n\n";
    let (summary, out) = run_feed(&Config::default(), feed);

    assert_eq!(summary.rows, 4);
    assert_eq!(summary.errors, 2);
    assert!(
        out.starts_with("NaN\nNaN\n101.00\n101.00\n"),
        "unexpected output:\n{out}"
    );
    assert!(out.ends_with("ERRORS:\na,2\n"), "unexpected output:\n{out}");
}

#[test]
fn test_empty_feed() {
    let (summary, out) = run_feed(&Config::default(), "");

    assert_eq!(out, "SELLS:\nBUYS:\nERRORS:\n");
    assert_eq!(summary.rows, 0);
}
