use std::io::{BufRead, Write};
use std::str::FromStr;

pub mod dispenser;
pub mod error;

pub use dispenser::{DEFAULT_DENOMINATIONS, Dispensed, StampDispenser};
pub use error::{ConfigError, Error, Result};

/// Line oriented input reader.
pub struct Scanner {
    reader: Box<dyn BufRead>,
    line: usize,
}

impl Scanner {
    pub fn new(reader: impl BufRead + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            line: 0,
        }
    }

    /// 1-based number of the last line read.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn next_line(&mut self) -> Result<String> {
        let mut input = String::new();
        if self.reader.read_line(&mut input)? == 0 {
            return Err(Error::UnexpectedEof);
        }
        self.line += 1;
        Ok(input.trim().to_string())
    }

    pub fn parse<T: FromStr>(&mut self) -> Result<T> {
        let input = self.next_line()?;
        input.parse().map_err(|_| Error::Parse {
            line: self.line,
            token: input,
        })
    }

    /// Parses every whitespace separated token on the next line.
    pub fn parse_vec<T: FromStr>(&mut self) -> Result<Vec<T>> {
        let input = self.next_line()?;
        let line = self.line;
        input
            .split_whitespace()
            .map(|token| {
                token.parse().map_err(|_| Error::Parse {
                    line,
                    token: token.to_string(),
                })
            })
            .collect()
    }
}

/// Output writer backed by a memory buffer.
pub struct Writer(Vec<u8>);

impl Writer {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn print<T: std::fmt::Display>(&mut self, value: T) -> std::io::Result<()> {
        write!(self.0, "{}", value)
    }

    pub fn println<T: std::fmt::Display>(&mut self, value: T) -> std::io::Result<()> {
        writeln!(self.0, "{}", value)
    }

    pub fn into_string(self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.0)
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a machine and a batch of requests, writing one stamp count per request.
///
/// ```text
/// n q
/// d1 d2 ... dn
/// r1 r2 ... rq
/// ```
pub fn solve(input: &mut Scanner, out: &mut Writer) -> Result<()> {
    let header: Vec<usize> = input.parse_vec()?;
    let [n, q] = header[..] else {
        return Err(Error::Malformed {
            line: input.line(),
            message: format!("expected 2 values, found {}", header.len()),
        });
    };

    let denominations: Vec<i64> = input.parse_vec()?;
    if denominations.len() != n {
        return Err(Error::Malformed {
            line: input.line(),
            message: format!("expected {} denominations, found {}", n, denominations.len()),
        });
    }
    let dispenser = StampDispenser::try_from(denominations)?;

    // the requests line may be omitted for an empty batch
    if q == 0 {
        return Ok(());
    }

    let requests: Vec<i64> = input.parse_vec()?;
    if requests.len() != q {
        return Err(Error::Malformed {
            line: input.line(),
            message: format!("expected {} requests, found {}", q, requests.len()),
        });
    }

    for request in requests {
        out.println(dispenser.min_units(request))?;
    }
    Ok(())
}

/// Test utilities for running and verifying data driven test cases
pub mod testing {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn suite_dir(suite: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("data")
            .join(suite)
    }

    /// Discover all test case numbers for a given suite
    pub fn discover_tests(suite: &str) -> Vec<usize> {
        let mut test_numbers = Vec::new();
        if let Ok(entries) = fs::read_dir(suite_dir(suite)) {
            for entry in entries.flatten() {
                if let Some(file_name) = entry.file_name().to_str() {
                    if let Some(num_str) = file_name.strip_suffix(".in") {
                        if let Ok(num) = num_str.parse::<usize>() {
                            test_numbers.push(num);
                        }
                    }
                }
            }
        }

        test_numbers.sort_unstable();
        test_numbers
    }

    /// Run a single test case and return (expected, actual, duration) output
    pub fn run_test_case<F>(
        suite: &str,
        test_num: usize,
        solve_fn: F,
    ) -> std::result::Result<(String, String, Duration), String>
    where
        F: FnOnce(&mut Scanner, &mut Writer) -> Result<()>,
    {
        let test_dir = suite_dir(suite);
        let in_file = test_dir.join(format!("{}.in", test_num));
        let out_file = test_dir.join(format!("{}.out", test_num));

        let input = fs::read_to_string(&in_file)
            .map_err(|e| format!("Failed to read {}: {}", in_file.display(), e))?;
        let expected = fs::read_to_string(&out_file)
            .map_err(|e| format!("Failed to read {}: {}", out_file.display(), e))?;

        let mut scanner = Scanner::new(Cursor::new(input));
        let mut writer = Writer::new();

        let start = Instant::now();
        solve_fn(&mut scanner, &mut writer).map_err(|e| format!("solve failed: {}", e))?;
        let duration = start.elapsed();

        let actual = writer
            .into_string()
            .map_err(|e| format!("Output is not valid UTF-8: {}", e))?;

        Ok((
            expected.trim().to_string(),
            actual.trim().to_string(),
            duration,
        ))
    }

    /// Verify all test cases for a suite
    pub fn verify_all_tests<F>(suite: &str, solve_fn: F)
    where
        F: Fn(&mut Scanner, &mut Writer) -> Result<()>,
    {
        let test_cases = discover_tests(suite);
        assert!(!test_cases.is_empty(), "No test cases found for {}", suite);

        for test_num in test_cases {
            match run_test_case(suite, test_num, &solve_fn) {
                Ok((expected, actual, _)) => {
                    assert_eq!(
                        actual, expected,
                        "Test case {} failed\nExpected:\n{}\nActual:\n{}",
                        test_num, expected, actual
                    );
                }
                Err(e) => panic!("Test case {} error: {}", test_num, e),
            }
        }
    }

    /// Run all test cases and print results. Returns `true` when every case passed.
    pub fn run_all_tests<F>(suite: &str, solve_fn: F) -> bool
    where
        F: Fn(&mut Scanner, &mut Writer) -> Result<()>,
    {
        let test_cases = discover_tests(suite);
        if test_cases.is_empty() {
            println!("No test cases found for {}", suite);
            return false;
        }

        println!("Running {} test cases for {}...", test_cases.len(), suite);

        let mut passed = 0;
        let mut failed = 0;
        let mut total_duration = Duration::ZERO;

        for test_num in &test_cases {
            match run_test_case(suite, *test_num, &solve_fn) {
                Ok((expected, actual, duration)) => {
                    total_duration += duration;
                    let secs = duration.as_secs_f64();
                    if actual == expected {
                        println!("✓ Test case {}: PASSED ({:.2}s)", test_num, secs);
                        passed += 1;
                    } else {
                        println!("✗ Test case {}: FAILED ({:.2}s)", test_num, secs);
                        println!("  Expected: {}", expected);
                        println!("  Actual:   {}", actual);
                        failed += 1;
                    }
                }
                Err(e) => {
                    println!("✗ Test case {}: ERROR - {}", test_num, e);
                    failed += 1;
                }
            }
        }

        println!("\nResults: {} passed, {} failed", passed, failed);
        println!("Total time: {:.2}s", total_duration.as_secs_f64());
        failed == 0
    }
}
