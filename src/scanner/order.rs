//! Natural name ordering for scan results

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two names the way a file browser would: case-insensitive,
/// with runs of digits compared by numeric value ("file9" < "file10").
///
/// Names that only differ in case fall back to byte order so the result
/// is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut lhs = a.chars().peekable();
    let mut rhs = b.chars().peekable();

    loop {
        match (lhs.peek().copied(), rhs.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let run_x = take_digit_run(&mut lhs);
                    let run_y = take_digit_run(&mut rhs);
                    match compare_digit_runs(&run_x, &run_y) {
                        Ordering::Equal => {}
                        decided => return decided,
                    }
                } else {
                    let fold_x = x.to_lowercase().next().unwrap_or(x);
                    let fold_y = y.to_lowercase().next().unwrap_or(y);
                    match fold_x.cmp(&fold_y) {
                        Ordering::Equal => {
                            lhs.next();
                            rhs.next();
                        }
                        decided => return decided,
                    }
                }
            }
        }
    }
}

fn take_digit_run(chars: &mut Peekable<Chars>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Compare digit runs numerically without parsing: strip leading zeros,
/// then a longer run of significant digits is the larger number.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let sig_a = a.trim_start_matches('0');
    let sig_b = b.trim_start_matches('0');
    sig_a
        .len()
        .cmp(&sig_b.len())
        .then_with(|| sig_a.cmp(sig_b))
        .then_with(|| a.len().cmp(&b.len()))
}
