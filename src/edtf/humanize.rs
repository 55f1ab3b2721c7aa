//! Human-readable rendering of EDTF expressions

use chrono::NaiveDate;

use crate::edtf::{parse, Edtf, EdtfDate, EdtfSeason};

/// Sentinel returned for anything the grammar cannot parse
pub const UNKNOWN: &str = "unknown";

const APPROXIMATE_PREFIX: &str = "approximately ";
const UNCERTAIN_SUFFIX: &str = "?";
const UNSPECIFIED_SUFFIX: &str = "s";
const INTERVAL_CONNECTOR: &str = "-";

const LIST_CONNECTOR: &str = ", ";
const LIST_LAST_CONNECTOR: &str = " and ";
const SET_CONNECTOR: &str = ", ";
const SET_LAST_CONNECTOR: &str = " or ";

const SEASONS: [&str; 4] = ["Spring", "Summer", "Fall", "Winter"];

/// Render an EDTF expression as reader-facing prose.
///
/// Pure and total: identical input yields identical output, and anything
/// the grammar rejects renders as the fixed [`UNKNOWN`] sentinel.
pub fn humanize(expression: &str) -> String {
    match parse(expression) {
        Ok(edtf) => render(&edtf),
        Err(_) => UNKNOWN.to_string(),
    }
}

fn render(edtf: &Edtf) -> String {
    match edtf {
        Edtf::Date(date) => render_date(date),
        Edtf::Interval { lower, upper } => {
            format!("{}{}{}", render_date(lower), INTERVAL_CONNECTOR, render_date(upper))
        }
        Edtf::Season(season) => render_season(season),
        Edtf::Decade(decade) => format!("{}0s", decade),
        Edtf::Century(century) => format!("{}00s", century),
        Edtf::List(members) => join_members(members, LIST_CONNECTOR, LIST_LAST_CONNECTOR),
        Edtf::Set {
            members,
            earlier,
            later,
        } => {
            let joined = join_members(members, SET_CONNECTOR, SET_LAST_CONNECTOR);
            let prefix = if *earlier { "Before " } else { "" };
            let suffix = if *later { " and later" } else { "" };
            format!("{}{}{}", prefix, joined, suffix)
        }
    }
}

fn render_date(date: &EdtfDate) -> String {
    format!("{}{}", approximate(date.approximate), simple_date(date))
}

/// The date body with its uncertainty suffix, without the approximation
/// prefix (interval and list members prefix each side separately)
fn simple_date(date: &EdtfDate) -> String {
    format!("{}{}", date_precision(date), uncertain(date.uncertain))
}

fn date_precision(date: &EdtfDate) -> String {
    if date.year_unspecified {
        // Masked digits already substituted with zero at parse time
        return format!("{:04}{}", date.year, UNSPECIFIED_SUFFIX);
    }
    match (date.month, date.day) {
        (Some(month), Some(day)) => NaiveDate::from_ymd_opt(date.year, month, day)
            .map(|d| d.format("%B %-d, %Y").to_string())
            .unwrap_or_default(),
        (Some(month), None) => NaiveDate::from_ymd_opt(date.year, month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default(),
        _ => format!("{:04}", date.year),
    }
}

fn render_season(season: &EdtfSeason) -> String {
    let name = SEASONS[(season.season - 21) as usize];
    format!(
        "{}{} {}{}",
        approximate(season.approximate),
        name,
        season.year,
        uncertain(season.uncertain)
    )
}

fn approximate(flag: bool) -> &'static str {
    if flag {
        APPROXIMATE_PREFIX
    } else {
        ""
    }
}

fn uncertain(flag: bool) -> &'static str {
    if flag {
        UNCERTAIN_SUFFIX
    } else {
        ""
    }
}

fn join_members(members: &[EdtfDate], connector: &str, last_connector: &str) -> String {
    let rendered: Vec<String> = members.iter().map(render_date).collect();
    match rendered.len() {
        0 => String::new(),
        1 => rendered.into_iter().next().expect("one member"),
        2 => rendered.join(last_connector),
        _ => {
            let (last, init) = rendered.split_last().expect("at least three members");
            format!("{}{}{}", init.join(connector), last_connector, last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_precisions() {
        assert_eq!(humanize("2020"), "2020");
        assert_eq!(humanize("2020-05"), "May 2020");
        assert_eq!(humanize("2020-05-10"), "May 10, 2020");
    }

    #[test]
    fn test_qualifiers() {
        assert_eq!(humanize("2020?"), "2020?");
        assert_eq!(humanize("2020~"), "approximately 2020");
        assert_eq!(humanize("2020-05-10%"), "approximately May 10, 2020?");
    }

    #[test]
    fn test_masked_year() {
        assert_eq!(humanize("19XX"), "1900s");
        assert_eq!(humanize("201X"), "2010s");
        assert_eq!(humanize("19XX?"), "1900s?");
    }

    #[test]
    fn test_interval() {
        assert_eq!(humanize("2019/2020"), "2019-2020");
        assert_eq!(humanize("1984~/2004-06"), "approximately 1984-June 2004");
    }

    #[test]
    fn test_seasons() {
        assert_eq!(humanize("1920-21"), "Spring 1920");
        assert_eq!(humanize("2001-24~"), "approximately Winter 2001");
        assert_eq!(humanize("2001-23?"), "Fall 2001?");
    }

    #[test]
    fn test_decade_and_century() {
        assert_eq!(humanize("193"), "1930s");
        assert_eq!(humanize("19"), "1900s");
    }

    #[test]
    fn test_list_connectors() {
        assert_eq!(humanize("{1990, 1991}"), "1990 and 1991");
        assert_eq!(humanize("{1990, 1991, 1992}"), "1990, 1991 and 1992");
    }

    #[test]
    fn test_set_connectors() {
        assert_eq!(humanize("[1990, 1991]"), "1990 or 1991");
        assert_eq!(humanize("[1990, 1991, 1992]"), "1990, 1991 or 1992");
        assert_eq!(humanize("[..1760-12-03]"), "Before December 3, 1760");
        assert_eq!(humanize("[1760-12..]"), "December 1760 and later");
    }

    #[test]
    fn test_unparsable_renders_sentinel() {
        assert_eq!(humanize("not-a-date"), UNKNOWN);
        assert_eq!(humanize(""), UNKNOWN);
        assert_eq!(humanize("circa 1900"), UNKNOWN);
    }

    #[test]
    fn test_snapshot_renderings() {
        let report = [
            "2020",
            "2020-05",
            "2020-05-10",
            "2020?",
            "19XX",
            "2019/2020",
            "1920-21",
            "{1990, 1991, 1992}",
            "[..1760-12-03]",
            "junk",
        ]
        .iter()
        .map(|expr| format!("{} => {}", expr, humanize(expr)))
        .collect::<Vec<_>>()
        .join("\n");

        insta::assert_snapshot!(report, @r###"
        2020 => 2020
        2020-05 => May 2020
        2020-05-10 => May 10, 2020
        2020? => 2020?
        19XX => 1900s
        2019/2020 => 2019-2020
        1920-21 => Spring 1920
        {1990, 1991, 1992} => 1990, 1991 and 1992
        [..1760-12-03] => Before December 3, 1760
        junk => unknown
        "###);
    }
}
