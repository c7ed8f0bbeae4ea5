//! Filtered percentage aggregation and marker classification.
//!
//! Survey-style datasets are sparse: columns go missing, hold numeric strings
//! or hold nothing parseable at all. Nothing in here fails on such input.
//! Unparseable values become `NaN`, `NaN` poisons the sum, and a poisoned
//! sum classifies as [`MarkerCode::None`].

use geocluster_types::filter::FilterSpec;
use geocluster_types::point::{PointRecord, PropertyValue};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Clusters with fewer members than this are never colour-classified.
pub const MIN_COUNT_TO_CLASSIFY: usize = 10;

/// Highest percentage bucket a marker can carry.
pub const MAX_MARKER_VALUE: u8 = 100;

/// Discrete marker selection derived from a filtered percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerCode {
    /// Not enough data, or a percentage of zero or less.
    None,
    /// Strictly between 0% and 1%.
    BelowOne,
    /// Whole percent in `1..=100`, truncated toward zero.
    Value(u8),
}

impl MarkerCode {
    /// Icon atlas name used by the renderer for this code.
    ///
    /// ```
    /// use geocluster::MarkerCode;
    ///
    /// assert_eq!(MarkerCode::None.icon_name(), "");
    /// assert_eq!(MarkerCode::BelowOne.icon_name(), "marker-<1");
    /// assert_eq!(MarkerCode::Value(42).icon_name(), "marker-42");
    /// ```
    pub fn icon_name(&self) -> String {
        match self {
            MarkerCode::None => String::new(),
            MarkerCode::BelowOne => "marker-<1".to_string(),
            MarkerCode::Value(n) => format!("marker-{}", n),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, MarkerCode::None)
    }

    /// Map a percentage (already multiplied by 100) to a code.
    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            MarkerCode::None
        } else if pct < 1.0 {
            MarkerCode::BelowOne
        } else {
            // Truncate, never round up.
            let whole = pct.floor().min(MAX_MARKER_VALUE as f64);
            MarkerCode::Value(whole as u8)
        }
    }
}

impl fmt::Display for MarkerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerCode::None => f.write_str("none"),
            MarkerCode::BelowOne => f.write_str("below-one"),
            MarkerCode::Value(n) => write!(f, "value-{}", n),
        }
    }
}

/// Running numerator/denominator sums for one filter over a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterSums {
    pub numerator: f64,
    pub denominator: f64,
    pub count: usize,
}

impl FilterSums {
    /// Sum the filter's columns across `points` using integer parsing.
    pub fn collect<P: Borrow<PointRecord>>(points: &[P], filter: &FilterSpec) -> Self {
        let numerator_key = filter.numerator_key();
        let denominator_key = filter.denominator_key();

        points.iter().fold(Self::default(), |mut sums, point| {
            let point = point.borrow();
            sums.numerator += point.get(&numerator_key).map_or(f64::NAN, parse_int);
            sums.denominator += point.get(&denominator_key).map_or(f64::NAN, parse_int);
            sums.count += 1;
            sums
        })
    }

    /// Percentage `numerator / denominator * 100`, or `None` when it is undefined.
    pub fn percent(&self) -> Option<f64> {
        percent_of(self.numerator, self.denominator)
    }
}

fn percent_of(numerator: f64, denominator: f64) -> Option<f64> {
    if !numerator.is_finite() || !denominator.is_finite() || denominator == 0.0 {
        return None;
    }
    // Ratio first, then scale: 29 / 100 lands on 28.999..., not 29.
    let pct = (numerator / denominator) * 100.0;
    pct.is_finite().then_some(pct)
}

/// Classify a cluster of points with the default minimum-count gate.
///
/// ```
/// use geocluster::{FilterSpec, MarkerCode, PointRecord, compute::aggregate::classify};
///
/// let filter = FilterSpec::new("q", "yes");
/// let points: Vec<_> = (0..20)
///     .map(|i| {
///         PointRecord::new(0.0, 0.0)
///             .with_property("q_yes", if i < 2 { 21 } else { 0 })
///             .with_property("q_total_responses", 5)
///     })
///     .collect();
///
/// assert_eq!(classify(&points, &filter), MarkerCode::Value(42));
/// assert_eq!(classify(&points[..9], &filter), MarkerCode::None);
/// ```
pub fn classify<P: Borrow<PointRecord>>(points: &[P], filter: &FilterSpec) -> MarkerCode {
    classify_with_min(points, filter, MIN_COUNT_TO_CLASSIFY)
}

/// Classify a cluster of points, returning `None` below `min_count` members.
pub fn classify_with_min<P: Borrow<PointRecord>>(
    points: &[P],
    filter: &FilterSpec,
    min_count: usize,
) -> MarkerCode {
    if points.len() < min_count {
        return MarkerCode::None;
    }
    FilterSums::collect(points, filter)
        .percent()
        .map_or(MarkerCode::None, MarkerCode::from_percent)
}

/// Classify a single unclustered point. No minimum-count gate applies.
pub fn classify_point(point: &PointRecord, filter: &FilterSpec) -> MarkerCode {
    let numerator = point
        .get(&filter.numerator_key())
        .map_or(f64::NAN, parse_float);
    let denominator = point
        .get(&filter.denominator_key())
        .map_or(f64::NAN, parse_float);

    percent_of(numerator, denominator).map_or(MarkerCode::None, MarkerCode::from_percent)
}

/// Best-effort integer parse of a property value.
///
/// Numbers are truncated toward zero. Strings are read up to the first
/// character that cannot continue an integer literal, after optional leading
/// whitespace, sign and `0x` prefix. Anything else is `NaN`.
///
/// ```
/// use geocluster::compute::aggregate::parse_int;
/// use geocluster::PropertyValue;
///
/// assert_eq!(parse_int(&PropertyValue::from(" 42abc")), 42.0);
/// assert_eq!(parse_int(&PropertyValue::from(-3.9)), -3.0);
/// assert!(parse_int(&PropertyValue::from("n/a")).is_nan());
/// ```
pub fn parse_int(value: &PropertyValue) -> f64 {
    match value {
        PropertyValue::Number(n) if n.is_finite() => n.trunc(),
        PropertyValue::Number(_) => f64::NAN,
        PropertyValue::Text(s) => parse_int_str(s),
        PropertyValue::Null => f64::NAN,
    }
}

fn parse_int_str(s: &str) -> f64 {
    let (negative, rest) = split_sign(s.trim_start());

    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value: Option<f64> = None;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        value = Some(value.unwrap_or(0.0) * radix as f64 + d as f64);
    }

    match value {
        Some(v) if negative => -v,
        Some(v) => v,
        None => f64::NAN,
    }
}

/// Best-effort decimal parse of a property value.
///
/// Strings are read as the longest leading decimal literal (with optional
/// fraction and exponent). Anything else is `NaN`.
pub fn parse_float(value: &PropertyValue) -> f64 {
    match value {
        PropertyValue::Number(n) => *n,
        PropertyValue::Text(s) => parse_float_str(s),
        PropertyValue::Null => f64::NAN,
    }
}

fn parse_float_str(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let (negative, rest) = split_sign(trimmed);
    if rest.starts_with("Infinity") {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let bytes = rest.as_bytes();
    let mut end = 0;
    let mut mantissa_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let sign_len = trimmed.len() - rest.len();
    trimmed[..sign_len + end].parse::<f64>().unwrap_or(f64::NAN)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> FilterSpec {
        FilterSpec::new("masks", "always")
    }

    fn record(num: impl Into<PropertyValue>, den: impl Into<PropertyValue>) -> PointRecord {
        PointRecord::new(0.0, 0.0)
            .with_property("masks_always", num)
            .with_property("masks_total_responses", den)
    }

    #[test]
    fn test_below_min_count_is_none() {
        let points: Vec<_> = (0..9).map(|_| record(1, 1)).collect();
        assert_eq!(classify(&points, &filter()), MarkerCode::None);
    }

    #[test]
    fn test_below_one_percent() {
        let mut points: Vec<_> = (0..20).map(|_| record(0, 10)).collect();
        points[0] = record(1, 10);
        // 1 / 200 = 0.5%
        assert_eq!(classify(&points, &filter()), MarkerCode::BelowOne);
    }

    #[test]
    fn test_exact_value() {
        let mut points: Vec<_> = (0..20).map(|_| record(2, 5)).collect();
        points[0] = record(4, 5);
        // 42 / 100
        assert_eq!(classify(&points, &filter()), MarkerCode::Value(42));
    }

    #[test]
    fn test_truncates_toward_zero() {
        // 2 / 3 = 66.67%
        let mut points: Vec<_> = (0..10).map(|_| record(0, 0)).collect();
        points[0] = record(2, 3);
        assert_eq!(classify(&points, &filter()), MarkerCode::Value(66));
    }

    #[test]
    fn test_truncation_boundaries_follow_ratio_then_scale() {
        // 29 / 100 * 100 is 28.999... in binary floating point.
        let mut points: Vec<_> = (0..10).map(|_| record(0, 10)).collect();
        points[0] = record(29, 10);
        assert_eq!(classify(&points, &filter()), MarkerCode::Value(28));

        assert_eq!(classify_point(&record(57, 100), &filter()), MarkerCode::Value(56));
        assert_eq!(classify_point(&record(29, 50), &filter()), MarkerCode::Value(57));
        assert_eq!(classify_point(&record(58, 100), &filter()), MarkerCode::Value(57));
        assert_eq!(classify_point(&record(50, 100), &filter()), MarkerCode::Value(50));
    }

    #[test]
    fn test_zero_denominator_and_zero_ratio() {
        let zeros: Vec<_> = (0..10).map(|_| record(5, 0)).collect();
        assert_eq!(classify(&zeros, &filter()), MarkerCode::None);

        let nothing: Vec<_> = (0..10).map(|_| record(0, 5)).collect();
        assert_eq!(classify(&nothing, &filter()), MarkerCode::None);
    }

    #[test]
    fn test_unparseable_values_do_not_panic() {
        let mut points: Vec<_> = (0..12).map(|_| record(1, 2)).collect();
        points[3] = record("n/a", 2);
        assert_eq!(classify(&points, &filter()), MarkerCode::None);

        points[3] = PointRecord::new(0.0, 0.0);
        assert_eq!(classify(&points, &filter()), MarkerCode::None);
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let points: Vec<_> = (0..10).map(|_| record("3 people", " 4")).collect();
        assert_eq!(classify(&points, &filter()), MarkerCode::Value(75));
    }

    #[test]
    fn test_order_independent() {
        let mut points: Vec<_> = (0..15).map(|i| record(i, 20)).collect();
        let forward = classify(&points, &filter());
        points.reverse();
        assert_eq!(classify(&points, &filter()), forward);
    }

    #[test]
    fn test_values_above_hundred_saturate() {
        let points: Vec<_> = (0..10).map(|_| record(3, 2)).collect();
        assert_eq!(classify(&points, &filter()), MarkerCode::Value(100));
    }

    #[test]
    fn test_single_point_has_no_gate() {
        assert_eq!(classify_point(&record(1, 4), &filter()), MarkerCode::Value(25));
        assert_eq!(classify_point(&record("0.5", 100), &filter()), MarkerCode::BelowOne);
        assert_eq!(classify_point(&record(1, 0), &filter()), MarkerCode::None);
        assert_eq!(
            classify_point(&PointRecord::new(0.0, 0.0), &filter()),
            MarkerCode::None
        );
    }

    #[test]
    fn test_parse_int_rules() {
        assert_eq!(parse_int(&PropertyValue::from("0x1A")), 26.0);
        assert_eq!(parse_int(&PropertyValue::from("  -12.7")), -12.0);
        assert_eq!(parse_int(&PropertyValue::from("+7")), 7.0);
        assert!(parse_int(&PropertyValue::from("")).is_nan());
        assert!(parse_int(&PropertyValue::from("-")).is_nan());
        assert!(parse_int(&PropertyValue::Null).is_nan());
        assert!(parse_int(&PropertyValue::Number(f64::INFINITY)).is_nan());
    }

    #[test]
    fn test_parse_float_rules() {
        assert_eq!(parse_float(&PropertyValue::from("3.5kg")), 3.5);
        assert_eq!(parse_float(&PropertyValue::from(" -.25")), -0.25);
        assert_eq!(parse_float(&PropertyValue::from("1e3x")), 1000.0);
        assert_eq!(parse_float(&PropertyValue::from("2e")), 2.0);
        assert_eq!(parse_float(&PropertyValue::from("Infinity")), f64::INFINITY);
        assert!(parse_float(&PropertyValue::from(".")).is_nan());
        assert!(parse_float(&PropertyValue::from("abc")).is_nan());
    }

    #[test]
    fn test_display_and_icon_names() {
        assert_eq!(MarkerCode::None.to_string(), "none");
        assert_eq!(MarkerCode::BelowOne.to_string(), "below-one");
        assert_eq!(MarkerCode::Value(7).to_string(), "value-7");
        assert_eq!(MarkerCode::Value(7).icon_name(), "marker-7");
    }

    #[test]
    fn test_filter_sums() {
        let points = vec![record(1, 4), record(2, 4)];
        let sums = FilterSums::collect(&points, &filter());
        assert_eq!(sums.numerator, 3.0);
        assert_eq!(sums.denominator, 8.0);
        assert_eq!(sums.count, 2);
        assert_eq!(sums.percent(), Some(37.5));
    }
}
