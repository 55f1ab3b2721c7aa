//! Extended Date/Time Format parsing and humanization
//!
//! Implements the constrained EDTF grammar archivists use in date fields:
//! calendar dates at year/month/day precision with uncertainty and
//! approximation qualifiers, masked year digits, seasons, decades,
//! centuries, intervals, lists, and sets. [`humanize`] turns any such
//! expression into reader-facing prose and never fails; [`parse`] is the
//! strict entry point validation uses.

pub mod humanize;
pub mod parser;

use thiserror::Error;

pub use humanize::{humanize, UNKNOWN};
pub use parser::parse;

/// Errors from the strict EDTF parser
#[derive(Debug, Error, PartialEq)]
pub enum EdtfParseError {
    #[error("empty date expression")]
    Empty,

    #[error("invalid year '{0}'")]
    InvalidYear(String),

    #[error("invalid month '{0}'")]
    InvalidMonth(String),

    #[error("invalid day '{0}'")]
    InvalidDay(String),

    #[error("malformed date expression '{0}'")]
    Malformed(String),
}

/// A single date at year, month, or day precision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdtfDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// Rightmost year digits were masked (`19XX`); `year` holds the value
    /// with masked digits substituted by zero
    pub year_unspecified: bool,
    pub approximate: bool,
    pub uncertain: bool,
}

/// A season expression, `YYYY-21` through `YYYY-24`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdtfSeason {
    pub year: i32,
    /// Season code 21-24 (Spring, Summer, Fall, Winter)
    pub season: u32,
    pub approximate: bool,
    pub uncertain: bool,
}

/// A parsed EDTF expression
#[derive(Debug, Clone, PartialEq)]
pub enum Edtf {
    Date(EdtfDate),
    Interval { lower: EdtfDate, upper: EdtfDate },
    Season(EdtfSeason),
    /// Three leading year digits, e.g. 193 for the 1930s
    Decade(u32),
    /// Two leading year digits, e.g. 19 for the 1900s
    Century(u32),
    /// `{...}`: all of the member dates
    List(Vec<EdtfDate>),
    /// `[...]`: one of the member dates, possibly open at either end
    Set {
        members: Vec<EdtfDate>,
        earlier: bool,
        later: bool,
    },
}
