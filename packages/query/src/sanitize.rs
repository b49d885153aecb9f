//! Per-field sanitizers.
//!
//! Each sanitizer takes the raw input (and any reference data it needs) and
//! returns the parameters it contributes. Blank input contributes nothing
//! and is not an error. Invalid input contributes nothing and pushes one
//! [`FilterError`] onto `errors`.

use eonet_viewer_event_models::{BoundingBox, CatalogKind, EventStatus, GeoPoint, ReferenceCatalog};
use eonet_viewer_spatial::compute_bounding_box;

use crate::validate::{is_valid_date, parse_non_negative, parse_positive_integer};
use crate::{FilterError, FilterKey, FilterParameters};

/// Fractional digits kept when rendering coordinates.
const COORDINATE_PRECISION: usize = 6;

/// Keeps the comma-separated tokens of `raw` that are ids in `catalog`.
///
/// Tokens are trimmed and empty tokens skipped. With `uppercase` each token
/// is upper-cased before the lookup and emitted in that form. A repeated
/// token is kept once. Unknown tokens are reported together in one error;
/// known ones are still emitted.
fn sanitize_list(
    raw: &str,
    key: FilterKey,
    kind: CatalogKind,
    catalog: &ReferenceCatalog,
    uppercase: bool,
    errors: &mut Vec<FilterError>,
) -> FilterParameters {
    let mut valid: Vec<String> = Vec::new();
    let mut unknown: Vec<String> = Vec::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let candidate = if uppercase {
            token.to_uppercase()
        } else {
            token.to_string()
        };
        if catalog.contains(&candidate) {
            if !valid.contains(&candidate) {
                valid.push(candidate);
            }
        } else if !unknown.iter().any(|t| t == token) {
            unknown.push(token.to_string());
        }
    }

    if !unknown.is_empty() {
        log::debug!("Rejected {kind} tokens: {unknown:?}");
        errors.push(FilterError::UnknownIds {
            kind,
            unknown,
            valid: catalog.ids().map(String::from).collect(),
        });
    }

    if valid.is_empty() {
        FilterParameters::new()
    } else {
        FilterParameters::single(key, valid.join(","))
    }
}

/// Sanitizes the `source` list against the sources catalog.
///
/// Tokens are validated and emitted in upper case, so `irwin` becomes
/// `IRWIN`.
pub fn sanitize_sources(
    raw: &str,
    sources: &ReferenceCatalog,
    errors: &mut Vec<FilterError>,
) -> FilterParameters {
    sanitize_list(
        raw,
        FilterKey::Source,
        CatalogKind::Sources,
        sources,
        true,
        errors,
    )
}

/// Sanitizes the `category` list against the categories catalog.
pub fn sanitize_categories(
    raw: &str,
    categories: &ReferenceCatalog,
    errors: &mut Vec<FilterError>,
) -> FilterParameters {
    sanitize_list(
        raw,
        FilterKey::Category,
        CatalogKind::Categories,
        categories,
        false,
        errors,
    )
}

/// Accepts exactly `open`, `closed`, or `all`.
pub fn sanitize_status(raw: &str, errors: &mut Vec<FilterError>) -> FilterParameters {
    let raw = raw.trim();
    if raw.is_empty() {
        return FilterParameters::new();
    }
    raw.parse::<EventStatus>().map_or_else(
        |_| {
            log::debug!("Rejected status {raw:?}");
            errors.push(FilterError::InvalidStatus(raw.to_string()));
            FilterParameters::new()
        },
        |status| FilterParameters::single(FilterKey::Status, status.as_ref()),
    )
}

/// Accepts a positive integer.
pub fn sanitize_limit(raw: &str, errors: &mut Vec<FilterError>) -> FilterParameters {
    let raw = raw.trim();
    if raw.is_empty() {
        return FilterParameters::new();
    }
    if let Some(limit) = parse_positive_integer(raw) {
        FilterParameters::single(FilterKey::Limit, limit.to_string())
    } else {
        log::debug!("Rejected limit {raw:?}");
        errors.push(FilterError::InvalidLimit(raw.to_string()));
        FilterParameters::new()
    }
}

/// Accepts a `start`/`end` pair when both are valid dates and
/// `end >= start`.
///
/// Both blank contributes nothing. Any other combination is validated as a
/// pair: one bad side rejects the whole range.
pub fn sanitize_date_range(
    start: &str,
    end: &str,
    errors: &mut Vec<FilterError>,
) -> FilterParameters {
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() && end.is_empty() {
        return FilterParameters::new();
    }
    // Zero-padded ISO dates compare chronologically as strings.
    if is_valid_date(start) && is_valid_date(end) && end >= start {
        let mut params = FilterParameters::single(FilterKey::Start, start);
        params.insert(FilterKey::End, end);
        params
    } else {
        log::debug!("Rejected date range {start:?} - {end:?}");
        errors.push(FilterError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
        FilterParameters::new()
    }
}

/// Accepts a magnitude scale id present in the magnitudes catalog.
pub fn sanitize_mag_id(
    raw: &str,
    magnitudes: &ReferenceCatalog,
    errors: &mut Vec<FilterError>,
) -> FilterParameters {
    let raw = raw.trim();
    if raw.is_empty() {
        return FilterParameters::new();
    }
    if magnitudes.contains(raw) {
        FilterParameters::single(FilterKey::MagId, raw)
    } else {
        log::debug!("Rejected magID {raw:?}");
        errors.push(FilterError::UnknownMagnitudeId {
            id: raw.to_string(),
            valid: magnitudes.ids().map(String::from).collect(),
        });
        FilterParameters::new()
    }
}

/// Validates one magnitude bound on its own.
///
/// Returns the trimmed input and its value when it is a non-negative
/// number.
pub fn sanitize_magnitude<'a>(
    raw: &'a str,
    key: FilterKey,
    errors: &mut Vec<FilterError>,
) -> Option<(&'a str, f64)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let value = parse_non_negative(raw);
    if value.is_none() {
        log::debug!("Rejected {key} {raw:?}");
        errors.push(FilterError::InvalidMagnitude {
            key,
            value: raw.to_string(),
        });
    }
    value.map(|v| (raw, v))
}

/// Sanitizes `magMin` and `magMax` together.
///
/// Each bound is validated independently. When both are valid they are
/// emitted together only if `magMax >= magMin`; otherwise neither is
/// emitted and a single ordering error is recorded. A lone valid bound is
/// emitted as is.
pub fn sanitize_magnitude_range(
    min: &str,
    max: &str,
    errors: &mut Vec<FilterError>,
) -> FilterParameters {
    let min = sanitize_magnitude(min, FilterKey::MagMin, errors);
    let max = sanitize_magnitude(max, FilterKey::MagMax, errors);

    let mut params = FilterParameters::new();
    match (min, max) {
        (Some((min_raw, min_value)), Some((max_raw, max_value))) => {
            if max_value >= min_value {
                params.insert(FilterKey::MagMin, min_raw);
                params.insert(FilterKey::MagMax, max_raw);
            } else {
                log::debug!("Rejected magnitude range {min_raw} > {max_raw}");
                errors.push(FilterError::MagnitudeOrder {
                    min: min_raw.to_string(),
                    max: max_raw.to_string(),
                });
            }
        }
        (Some((raw, _)), None) => params.insert(FilterKey::MagMin, raw),
        (None, Some((raw, _))) => params.insert(FilterKey::MagMax, raw),
        (None, None) => {}
    }
    params
}

/// Turns a non-negative scale (degrees) into the search box around
/// `center`.
pub fn sanitize_scale(
    raw: &str,
    center: GeoPoint,
    errors: &mut Vec<FilterError>,
) -> Option<BoundingBox> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let Some(scale) = parse_non_negative(raw) else {
        log::debug!("Rejected scale {raw:?}");
        errors.push(FilterError::InvalidScale(raw.to_string()));
        return None;
    };
    Some(compute_bounding_box(center, scale))
}

/// The `bbox` parameter for `bbox`.
#[must_use]
pub fn bbox_parameter(bbox: &BoundingBox) -> FilterParameters {
    FilterParameters::single(FilterKey::Bbox, format_bbox(bbox))
}

/// Renders a bounding box as four comma-joined plain decimals in wire
/// order.
#[must_use]
pub fn format_bbox(bbox: &BoundingBox) -> String {
    bbox.to_array()
        .iter()
        .map(|v| format_coordinate(*v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders `value` as a plain decimal rounded to six fractional digits with
/// trailing zeros removed, so `27.799999999999997` becomes `27.8`.
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    let fixed = format!("{value:.precision$}", precision = COORDINATE_PRECISION);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use eonet_viewer_event_models::CatalogEntry;

    use super::*;

    fn catalog(ids: &[&str]) -> ReferenceCatalog {
        ids.iter()
            .map(|id| ((*id).to_string(), CatalogEntry::default()))
            .collect()
    }

    #[test]
    fn sources_keep_matches_and_report_the_rest() {
        let mut errors = Vec::new();
        let params = sanitize_sources("IRWIN,NOTREAL", &catalog(&["IRWIN", "EO"]), &mut errors);
        assert_eq!(params, FilterParameters::single(FilterKey::Source, "IRWIN"));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("NOTREAL"));
    }

    #[test]
    fn sources_are_validated_upper_cased() {
        let mut errors = Vec::new();
        let sources = catalog(&["IRWIN", "EO", "InciWeb"]);
        let params = sanitize_sources("irwin, eo,InciWeb", &sources, &mut errors);
        assert_eq!(params.get(FilterKey::Source), Some("IRWIN,EO"));
        assert_eq!(
            errors,
            vec![FilterError::UnknownIds {
                kind: CatalogKind::Sources,
                unknown: vec!["InciWeb".to_string()],
                valid: vec!["EO".to_string(), "IRWIN".to_string(), "InciWeb".to_string()],
            }]
        );
    }

    #[test]
    fn repeated_tokens_are_kept_once() {
        let mut errors = Vec::new();
        let sources = catalog(&["IRWIN", "EO"]);
        let params = sanitize_sources("irwin,,IRWIN, EO,nope,nope", &sources, &mut errors);
        assert_eq!(params.get(FilterKey::Source), Some("IRWIN,EO"));
        assert!(errors[0].to_string().starts_with("sources input errors: nope;"));

        let cats = catalog(&["wildfires"]);
        let params = sanitize_categories("wildfires,wildfires", &cats, &mut errors);
        assert_eq!(params.get(FilterKey::Category), Some("wildfires"));
    }

    #[test]
    fn categories_are_case_sensitive() {
        let mut errors = Vec::new();
        let cats = catalog(&["wildfires", "severeStorms"]);
        let params = sanitize_categories("severeStorms,Wildfires", &cats, &mut errors);
        assert_eq!(params.get(FilterKey::Category), Some("severeStorms"));
        assert_eq!(
            errors,
            vec![FilterError::UnknownIds {
                kind: CatalogKind::Categories,
                unknown: vec!["Wildfires".to_string()],
                valid: vec!["severeStorms".to_string(), "wildfires".to_string()],
            }]
        );
    }

    #[test]
    fn list_with_no_matches_emits_nothing() {
        let mut errors = Vec::new();
        let params = sanitize_sources("FOO,BAR", &catalog(&["IRWIN"]), &mut errors);
        assert!(params.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn blank_input_is_silent() {
        let mut errors = Vec::new();
        assert!(sanitize_sources("", &catalog(&["IRWIN"]), &mut errors).is_empty());
        assert!(sanitize_status("  ", &mut errors).is_empty());
        assert!(sanitize_limit("", &mut errors).is_empty());
        assert!(sanitize_date_range("", "", &mut errors).is_empty());
        assert!(sanitize_mag_id("", &catalog(&["ac"]), &mut errors).is_empty());
        assert!(sanitize_magnitude_range("", "", &mut errors).is_empty());
        assert!(sanitize_scale("", GeoPoint::new(0.0, 0.0), &mut errors).is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn status_values() {
        let mut errors = Vec::new();
        for status in ["open", "closed", "all"] {
            assert_eq!(
                sanitize_status(status, &mut errors).get(FilterKey::Status),
                Some(status)
            );
        }
        assert!(sanitize_status("pending", &mut errors).is_empty());
        assert_eq!(errors, vec![FilterError::InvalidStatus("pending".to_string())]);
    }

    #[test]
    fn limit_must_be_positive_integer() {
        let mut errors = Vec::new();
        assert_eq!(
            sanitize_limit("20", &mut errors).get(FilterKey::Limit),
            Some("20")
        );
        assert!(sanitize_limit("0", &mut errors).is_empty());
        assert!(sanitize_limit("2.5", &mut errors).is_empty());
        assert!(sanitize_limit("-1", &mut errors).is_empty());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn date_range_rejects_reversed_dates() {
        let mut errors = Vec::new();
        assert!(sanitize_date_range("2024-02-01", "2024-01-01", &mut errors).is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn date_range_accepts_equal_dates() {
        let mut errors = Vec::new();
        let params = sanitize_date_range("2024-01-01", "2024-01-01", &mut errors);
        assert_eq!(params.get(FilterKey::Start), Some("2024-01-01"));
        assert_eq!(params.get(FilterKey::End), Some("2024-01-01"));
        assert!(errors.is_empty());
    }

    #[test]
    fn date_range_rejects_one_bad_side() {
        let mut errors = Vec::new();
        assert!(sanitize_date_range("2024-01-01", "2024-02-30", &mut errors).is_empty());
        assert!(sanitize_date_range("", "2024-02-01", &mut errors).is_empty());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn mag_id_must_be_known() {
        let mut errors = Vec::new();
        let mags = catalog(&["ac", "mag_kts"]);
        assert_eq!(
            sanitize_mag_id("mag_kts", &mags, &mut errors).get(FilterKey::MagId),
            Some("mag_kts")
        );
        assert!(sanitize_mag_id("richter", &mags, &mut errors).is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn reversed_magnitudes_drop_both() {
        let mut errors = Vec::new();
        let params = sanitize_magnitude_range("5", "2", &mut errors);
        assert!(!params.contains(FilterKey::MagMin));
        assert!(!params.contains(FilterKey::MagMax));
        assert_eq!(
            errors,
            vec![FilterError::MagnitudeOrder {
                min: "5".to_string(),
                max: "2".to_string(),
            }]
        );
    }

    #[test]
    fn ordered_magnitudes_keep_both() {
        let mut errors = Vec::new();
        let params = sanitize_magnitude_range("2", "5", &mut errors);
        assert_eq!(params.get(FilterKey::MagMin), Some("2"));
        assert_eq!(params.get(FilterKey::MagMax), Some("5"));
        assert!(errors.is_empty());
    }

    #[test]
    fn lone_magnitude_bound_is_kept() {
        let mut errors = Vec::new();
        let params = sanitize_magnitude_range("", "40", &mut errors);
        assert_eq!(params.get(FilterKey::MagMax), Some("40"));
        assert!(!params.contains(FilterKey::MagMin));

        let params = sanitize_magnitude_range("abc", "40", &mut errors);
        assert_eq!(params.get(FilterKey::MagMax), Some("40"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn negative_magnitude_is_rejected() {
        let mut errors = Vec::new();
        assert!(sanitize_magnitude_range("-1", "", &mut errors).is_empty());
        assert_eq!(
            errors,
            vec![FilterError::InvalidMagnitude {
                key: FilterKey::MagMin,
                value: "-1".to_string(),
            }]
        );
    }

    #[test]
    fn scale_builds_bbox_around_center() {
        let mut errors = Vec::new();
        let bbox = sanitize_scale("10", GeoPoint::new(-122.4, 37.8), &mut errors).unwrap();
        assert_eq!(format_bbox(&bbox), "-132.4,47.8,-112.4,27.8");
        assert!(errors.is_empty());
    }

    #[test]
    fn scale_rejects_negative_and_garbage() {
        let mut errors = Vec::new();
        assert!(sanitize_scale("-1", GeoPoint::new(0.0, 0.0), &mut errors).is_none());
        assert!(sanitize_scale("wide", GeoPoint::new(0.0, 0.0), &mut errors).is_none());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn coordinates_render_as_plain_decimals() {
        assert_eq!(format_coordinate(174.0), "174");
        assert_eq!(format_coordinate(-176.0), "-176");
        assert_eq!(format_coordinate(27.799_999_999_999_997), "27.8");
        assert_eq!(format_coordinate(0.000_000_1), "0");
        assert_eq!(format_coordinate(-0.000_000_1), "0");
        assert_eq!(format_coordinate(1e-5), "0.00001");
    }

    #[test]
    fn bbox_parameter_uses_wire_order() {
        let bbox = compute_bounding_box(GeoPoint::new(179.0, 0.0), 5.0);
        assert_eq!(
            bbox_parameter(&bbox).get(FilterKey::Bbox),
            Some("174,5,-176,-5")
        );
    }
}
