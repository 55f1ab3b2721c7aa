//! Strict parser for the constrained EDTF grammar

use chrono::NaiveDate;

use crate::edtf::{Edtf, EdtfDate, EdtfParseError, EdtfSeason};

/// Parse an EDTF expression.
///
/// Dispatches on the outermost shape: `{...}` list, `[...]` set, `A/B`
/// interval, then single expressions (season, decade, century, date).
pub fn parse(expression: &str) -> Result<Edtf, EdtfParseError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(EdtfParseError::Empty);
    }

    if let Some(inner) = delimited(expression, '{', '}') {
        return Ok(Edtf::List(parse_members(inner)?));
    }

    if let Some(inner) = delimited(expression, '[', ']') {
        let (inner, earlier) = match inner.strip_prefix("..") {
            Some(rest) => (rest, true),
            None => (inner, false),
        };
        let (inner, later) = match inner.strip_suffix("..") {
            Some(rest) => (rest, true),
            None => (inner, false),
        };
        return Ok(Edtf::Set {
            members: parse_members(inner)?,
            earlier,
            later,
        });
    }

    if let Some((lower, upper)) = expression.split_once('/') {
        return Ok(Edtf::Interval {
            lower: parse_date(lower.trim())?,
            upper: parse_date(upper.trim())?,
        });
    }

    parse_single(expression)
}

fn delimited<'a>(expression: &'a str, open: char, close: char) -> Option<&'a str> {
    expression
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
}

fn parse_members(inner: &str) -> Result<Vec<EdtfDate>, EdtfParseError> {
    let members: Result<Vec<_>, _> = inner
        .split(',')
        .map(|member| parse_date(member.trim()))
        .collect();
    let members = members?;
    if members.is_empty() {
        return Err(EdtfParseError::Empty);
    }
    Ok(members)
}

fn parse_single(expression: &str) -> Result<Edtf, EdtfParseError> {
    if let Some(season) = try_season(expression)? {
        return Ok(Edtf::Season(season));
    }

    // Bare two- and three-digit prefixes denote a century or decade
    if expression.chars().all(|c| c.is_ascii_digit()) {
        match expression.len() {
            2 => return Ok(Edtf::Century(expression.parse().unwrap_or(0))),
            3 => return Ok(Edtf::Decade(expression.parse().unwrap_or(0))),
            _ => {}
        }
    }

    Ok(Edtf::Date(parse_date(expression)?))
}

fn try_season(expression: &str) -> Result<Option<EdtfSeason>, EdtfParseError> {
    let (body, approximate, uncertain) = strip_qualifiers(expression);
    let Some((year_token, season_token)) = body.split_once('-') else {
        return Ok(None);
    };
    let Ok(season) = season_token.parse::<u32>() else {
        return Ok(None);
    };
    if !(21..=24).contains(&season) {
        return Ok(None);
    }
    let year = parse_year_digits(year_token)?;
    Ok(Some(EdtfSeason {
        year,
        season,
        approximate,
        uncertain,
    }))
}

/// Parse a single date with optional trailing qualifiers and year mask
pub fn parse_date(expression: &str) -> Result<EdtfDate, EdtfParseError> {
    if expression.is_empty() {
        return Err(EdtfParseError::Empty);
    }

    let (body, approximate, uncertain) = strip_qualifiers(expression);
    if body.is_empty() {
        return Err(EdtfParseError::Malformed(expression.to_string()));
    }

    let mut parts = body.split('-');
    let year_token = parts.next().unwrap_or_default();
    let month_token = parts.next();
    let day_token = parts.next();
    if parts.next().is_some() {
        return Err(EdtfParseError::Malformed(expression.to_string()));
    }

    let (year, year_unspecified) = parse_year(year_token)?;
    if year_unspecified && month_token.is_some() {
        // The grammar masks rightmost year digits only
        return Err(EdtfParseError::Malformed(expression.to_string()));
    }

    let month = match month_token {
        Some(token) => Some(parse_month(token)?),
        None => None,
    };
    let day = match day_token {
        Some(token) => {
            let day = token
                .parse::<u32>()
                .map_err(|_| EdtfParseError::InvalidDay(token.to_string()))?;
            let month = month.expect("day token implies month token");
            if NaiveDate::from_ymd_opt(year, month, day).is_none() {
                return Err(EdtfParseError::InvalidDay(token.to_string()));
            }
            Some(day)
        }
        None => None,
    };

    Ok(EdtfDate {
        year,
        month,
        day,
        year_unspecified,
        approximate,
        uncertain,
    })
}

fn strip_qualifiers(expression: &str) -> (&str, bool, bool) {
    let mut body = expression;
    let mut approximate = false;
    let mut uncertain = false;
    loop {
        if let Some(rest) = body.strip_suffix('?') {
            uncertain = true;
            body = rest;
        } else if let Some(rest) = body.strip_suffix('~') {
            approximate = true;
            body = rest;
        } else if let Some(rest) = body.strip_suffix('%') {
            approximate = true;
            uncertain = true;
            body = rest;
        } else {
            return (body, approximate, uncertain);
        }
    }
}

fn parse_year(token: &str) -> Result<(i32, bool), EdtfParseError> {
    if token.len() != 4 {
        return Err(EdtfParseError::InvalidYear(token.to_string()));
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return Ok((parse_year_digits(token)?, false));
    }

    // Masked form: digits followed by trailing X positions, at least one digit
    let digits = token.chars().take_while(|c| c.is_ascii_digit()).count();
    let masked = token.chars().skip(digits).all(|c| c == 'X');
    if digits == 0 || digits == 4 || !masked {
        return Err(EdtfParseError::InvalidYear(token.to_string()));
    }
    let substituted: String = token.chars().map(|c| if c == 'X' { '0' } else { c }).collect();
    Ok((parse_year_digits(&substituted)?, true))
}

fn parse_year_digits(token: &str) -> Result<i32, EdtfParseError> {
    if token.len() != 4 || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(EdtfParseError::InvalidYear(token.to_string()));
    }
    token
        .parse::<i32>()
        .map_err(|_| EdtfParseError::InvalidYear(token.to_string()))
}

fn parse_month(token: &str) -> Result<u32, EdtfParseError> {
    let month = token
        .parse::<u32>()
        .map_err(|_| EdtfParseError::InvalidMonth(token.to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(EdtfParseError::InvalidMonth(token.to_string()));
    }
    Ok(month)
}
