//! Lexing for computed-style strings.
//!
//! Built on `winnow` 0.7. Only the handful of shapes the overlay has to
//! compare are recognised: leading numbers (`12.5px`) and functional
//! `rgb()`/`rgba()` colors.

use winnow::ascii::{Caseless, multispace0, multispace1};
use winnow::combinator::{alt, opt, preceded, separated};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{literal, one_of, take_while};

/// `parseFloat` semantics: the number at the start of `value`, ignoring
/// any trailing unit. `"12.5px"` → `Some(12.5)`, `"auto"` → `None`.
pub fn leading_number(value: &str) -> Option<f64> {
    let mut rest = value.trim_start();
    parse_number.parse_next(&mut rest).ok()
}

/// True for every spelling of fully transparent black: the empty string,
/// `transparent`, and any `rgb()`/`rgba()` with zero channels and zero alpha.
pub fn is_transparent_black(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("transparent") {
        return true;
    }
    match color_function.parse(value) {
        Ok(channels) => channels.len() == 4 && channels.iter().all(|c| *c == 0.0),
        Err(_) => false,
    }
}

/// `backgroundColor` → `background-color`.
pub fn to_kebab_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    let _ = opt(one_of(['+', '-'])).parse_next(input)?;
    let int: &str = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut frac = "";
    if input.starts_with('.') {
        *input = &input[1..];
        frac = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    }
    if int.is_empty() && frac.is_empty() {
        return Err(winnow::error::ErrMode::Backtrack(ContextError::new()));
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .trim_end_matches('.')
        .parse::<f64>()
        .map_err(|_| winnow::error::ErrMode::Backtrack(ContextError::new()))
}

fn channel(input: &mut &str) -> ModalResult<f64> {
    (parse_number, opt('%'))
        .map(|(n, _)| n)
        .parse_next(input)
}

fn channel_separator(input: &mut &str) -> ModalResult<()> {
    alt(((multispace0, one_of([',', '/'])).void(), multispace1.void())).parse_next(input)
}

fn color_function(input: &mut &str) -> ModalResult<Vec<f64>> {
    let _ = alt((literal(Caseless("rgba")), literal(Caseless("rgb")))).parse_next(input)?;
    let _ = (multispace0, '(').parse_next(input)?;
    let channels: Vec<f64> =
        separated(1.., preceded(multispace0, channel), channel_separator).parse_next(input)?;
    let _ = (multispace0, ')').parse_next(input)?;
    Ok(channels)
}
