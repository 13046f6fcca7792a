//! Date-range extraction for filter queries.
//!
//! A `between <date> and <date>` clause is pulled out of the raw string
//! before tokenization so its `and` never reaches the boolean grammar.

use chrono::NaiveDate;

use super::expr::DateRange;

/// Extract the first `between <date> and <date>` clause from a raw query.
///
/// Dates are `M/D/YYYY` or `M/D/YY` (2-digit years pivot at 50: 50-99 are
/// 19xx, 00-49 are 20xx). Returns the parsed range, if any, and the raw
/// string with the matched clause removed. A `between` with anything other
/// than two well-formed dates around `and` is left in place for the
/// tokenizer to discard.
pub fn extract_date_range(raw: &str) -> (Option<DateRange>, String) {
    let words = split_words(raw);

    for i in 0..words.len().saturating_sub(3) {
        let (start, between) = words[i];
        let (_, from_text) = words[i + 1];
        let (_, and) = words[i + 2];
        let (to_start, to_text) = words[i + 3];

        if !between.eq_ignore_ascii_case("between") || !and.eq_ignore_ascii_case("and") {
            continue;
        }
        let (Some(from), Some(to)) = (parse_short_date(from_text), parse_short_date(to_text))
        else {
            continue;
        };

        let end = to_start + to_text.len();
        let mut remainder = String::with_capacity(raw.len());
        remainder.push_str(&raw[..start]);
        remainder.push_str(&raw[end..]);
        return (Some(DateRange { from, to }), remainder);
    }

    (None, raw.to_string())
}

/// Split into whitespace-delimited words with their byte offsets.
fn split_words(raw: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;

    for (index, ch) in raw.char_indices() {
        if ch.is_whitespace() {
            if let Some(word_start) = start.take() {
                words.push((word_start, &raw[word_start..index]));
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(word_start) = start {
        words.push((word_start, &raw[word_start..]));
    }

    words
}

/// Parse a `M/D/Y` date. 2-digit years pivot at 50.
pub fn parse_short_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('/');
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let year = match year {
        0..=49 => 2000 + year,
        50..=99 => 1900 + year,
        _ if year >= 100 => year,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_range() {
        let (range, rest) = extract_date_range("category:food");
        assert!(range.is_none());
        assert_eq!(rest, "category:food");
    }

    #[test]
    fn test_plain_range() {
        let (range, rest) = extract_date_range("between 1/1/24 and 1/31/24");
        assert_eq!(
            range,
            Some(DateRange {
                from: date(2024, 1, 1),
                to: date(2024, 1, 31),
            })
        );
        assert_eq!(rest.trim(), "");
    }

    #[test]
    fn test_range_removed_before_filters() {
        let (range, rest) = extract_date_range("category:food between 1/1/24 and 1/31/24 tag:x");
        assert!(range.is_some());
        assert_eq!(rest.split_whitespace().collect::<Vec<_>>(), ["category:food", "tag:x"]);
    }

    #[test]
    fn test_four_digit_years() {
        let (range, _) = extract_date_range("between 12/31/2023 and 1/1/2024");
        assert_eq!(
            range,
            Some(DateRange {
                from: date(2023, 12, 31),
                to: date(2024, 1, 1),
            })
        );
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(parse_short_date("1/1/49"), Some(date(2049, 1, 1)));
        assert_eq!(parse_short_date("1/1/50"), Some(date(1950, 1, 1)));
        assert_eq!(parse_short_date("6/15/99"), Some(date(1999, 6, 15)));
        assert_eq!(parse_short_date("6/15/00"), Some(date(2000, 6, 15)));
    }

    #[test]
    fn test_invalid_dates_rejected() {
        assert_eq!(parse_short_date("13/1/24"), None);
        assert_eq!(parse_short_date("2/30/24"), None);
        assert_eq!(parse_short_date("1/1"), None);
        assert_eq!(parse_short_date("1/1/24/5"), None);
        assert_eq!(parse_short_date("2024-01-01"), None);
        // Negative years must not reach the two-digit pivot
        assert_eq!(parse_short_date("1/1/-5"), None);
        assert_eq!(parse_short_date("1/1/-2024"), None);
    }

    #[test]
    fn test_malformed_between_left_in_place() {
        let (range, rest) = extract_date_range("between now and then");
        assert!(range.is_none());
        assert_eq!(rest, "between now and then");
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let (range, _) = extract_date_range("BETWEEN 1/1/24 AND 1/2/24");
        assert!(range.is_some());
    }
}
