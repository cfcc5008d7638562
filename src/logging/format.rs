//! Runtime printf-style message rendering
//!
//! Format strings handed to `Logger::infof` and friends are only known at
//! runtime, so nothing guarantees that directives and arguments line up.
//! Rendering never fails: mismatches are spelled out inline instead.
//!
//! A directive is `%[flags][width][.precision]verb`. Flags are `-` (pad on
//! the right), `+` (always sign numbers), ` ` (leave room for the sign),
//! `0` (pad numbers with leading zeros) and `#` (accepted, no effect). Width
//! counts characters; precision is forwarded to the argument's `Display`, so
//! it fixes the decimals of a float and truncates a string.
//!
//! | Input                     | Output                  |
//! |---------------------------|-------------------------|
//! | `%s`, `%v`, `%d`, `%f`, `%t` | argument via `Display` |
//! | `%q`                      | argument, double-quoted |
//! | `%%`                      | literal `%`             |
//! | directive without argument | `%!s(MISSING)`         |
//! | unknown verb `%x`         | `%!x(arg)`              |
//! | `%` without a verb        | `%!(NOVERB)`            |
//! | width above 1000000       | `%!(BADWIDTH)`          |
//! | precision above 1000000   | `%!(BADPREC)`           |
//! | unused arguments          | `%!(EXTRA a, b)`        |

use std::fmt::{self, Write};
use std::iter::{self, Peekable};
use std::str::Chars;

const MAX_WIDTH: usize = 1_000_000;

#[derive(Debug, Default)]
struct Directive {
    minus: bool,
    plus: bool,
    space: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Render a runtime format string against `args`.
///
/// # Examples
///
/// ```
/// use ctxlog::logging::sprintf;
///
/// assert_eq!(sprintf("user %s has %d items", &[&"ana", &3]), "user ana has 3 items");
/// assert_eq!(sprintf("took %.2f ms", &[&1.5]), "took 1.50 ms");
/// assert_eq!(sprintf("%s and %s", &[&"one"]), "one and %!s(MISSING)");
/// assert_eq!(sprintf("done", &[&42]), "done%!(EXTRA 42)");
/// ```
pub fn sprintf(format: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let directive = parse_directive(&mut chars, &mut out);

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };

        if verb == '%' {
            out.push('%');
            continue;
        }

        match (verb, args.next()) {
            ('s' | 'v' | 'd' | 'f' | 't' | 'q', Some(arg)) => {
                let rendered = render(*arg, &directive, verb == 'q');
                pad(&mut out, &rendered, &directive);
            }
            (verb, Some(arg)) => {
                let _ = write!(out, "%!{}({})", verb, arg);
            }
            (verb, None) => {
                let _ = write!(out, "%!{}(MISSING)", verb);
            }
        }
    }

    push_extra(&mut out, args);
    out
}

/// Render any `Display` value without panicking on a failing implementation.
///
/// `ToString` panics when `Display::fmt` reports an error; this keeps whatever
/// was written before the failure instead.
pub fn display_lossy(value: impl fmt::Display) -> String {
    let mut out = String::new();
    let _ = write!(out, "{}", value);
    out
}

fn parse_directive(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Directive {
    let mut directive = Directive::default();
    while let Some(&flag) = chars.peek() {
        match flag {
            '-' => directive.minus = true,
            '+' => directive.plus = true,
            ' ' => directive.space = true,
            '0' => directive.zero = true,
            '#' => {}
            _ => break,
        }
        chars.next();
    }

    directive.width = parse_number(chars);
    if directive.width.is_some_and(|w| w > MAX_WIDTH) {
        out.push_str("%!(BADWIDTH)");
        directive.width = None;
    }

    if chars.next_if_eq(&'.').is_some() {
        let precision = parse_number(chars).unwrap_or(0);
        if precision > MAX_WIDTH {
            out.push_str("%!(BADPREC)");
        } else {
            directive.precision = Some(precision);
        }
    }
    directive
}

fn parse_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut number = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        let n: usize = number.unwrap_or(0);
        number = Some(n.saturating_mul(10).saturating_add(digit as usize));
    }
    number
}

fn render(arg: &dyn fmt::Display, directive: &Directive, quoted: bool) -> String {
    let mut rendered = String::new();
    let _ = match directive.precision {
        Some(precision) => write!(rendered, "{:.*}", precision, arg),
        None => write!(rendered, "{}", arg),
    };

    if quoted {
        return format!("{:?}", rendered);
    }
    if is_numeric(&rendered) && !rendered.starts_with('-') {
        if directive.plus {
            rendered.insert(0, '+');
        } else if directive.space {
            rendered.insert(0, ' ');
        }
    }
    rendered
}

fn pad(out: &mut String, rendered: &str, directive: &Directive) {
    let len = rendered.chars().count();
    let fill = match directive.width {
        Some(width) if width > len => width - len,
        _ => {
            out.push_str(rendered);
            return;
        }
    };

    if directive.minus {
        out.push_str(rendered);
        out.extend(iter::repeat_n(' ', fill));
    } else if directive.zero && is_numeric(rendered.trim_start_matches(['+', ' '])) {
        let digits_at = rendered
            .find(|c: char| !matches!(c, '+' | '-' | ' '))
            .unwrap_or(rendered.len());
        let (sign, digits) = rendered.split_at(digits_at);
        out.push_str(sign);
        out.extend(iter::repeat_n('0', fill));
        out.push_str(digits);
    } else {
        out.extend(iter::repeat_n(' ', fill));
        out.push_str(rendered);
    }
}

fn is_numeric(s: &str) -> bool {
    s.strip_prefix('-')
        .unwrap_or(s)
        .starts_with(|c: char| c.is_ascii_digit())
        && s.parse::<f64>().is_ok()
}

fn push_extra<I>(out: &mut String, extra: I)
where
    I: Iterator,
    I::Item: fmt::Display,
{
    let mut extra = extra.peekable();
    if extra.peek().is_none() {
        return;
    }

    out.push_str("%!(EXTRA ");
    for (i, arg) in extra.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", arg);
    }
    out.push(')');
}
