//! Composes sanitized parameters into the final events URL.

use chrono::{Days, NaiveDate};
use eonet_viewer_event_models::{BoundingBox, Catalogs, GeoPoint};

use crate::sanitize::{
    bbox_parameter, sanitize_categories, sanitize_date_range, sanitize_limit, sanitize_mag_id,
    sanitize_magnitude_range, sanitize_scale, sanitize_sources, sanitize_status,
};
use crate::validate::DATE_FORMAT;
use crate::{FilterError, FilterParameters, QueryError};

/// Search radius in degrees when the user leaves scale blank.
pub const DEFAULT_SCALE: &str = "10";

/// Length of the default date window, ending today.
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Unvalidated user input, one field per filter. `None` and blank strings
/// both mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilters {
    /// Comma-separated source ids.
    pub source: Option<String>,
    /// Comma-separated category ids.
    pub category: Option<String>,
    /// `open`, `closed`, or `all`.
    pub status: Option<String>,
    /// Maximum number of events.
    pub limit: Option<String>,
    /// First day, `YYYY-MM-DD`. Defaults to [`DEFAULT_WINDOW_DAYS`] ago.
    pub start: Option<String>,
    /// Last day, `YYYY-MM-DD`. Defaults to today.
    pub end: Option<String>,
    /// Magnitude scale id.
    pub mag_id: Option<String>,
    /// Lower magnitude bound.
    pub mag_min: Option<String>,
    /// Upper magnitude bound.
    pub mag_max: Option<String>,
    /// Search radius in degrees. Defaults to [`DEFAULT_SCALE`].
    pub scale: Option<String>,
}

/// Session state the builder validates against.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    /// The events endpoint, without a query string.
    pub endpoint: &'a str,
    /// Reference catalogs for list and `magID` validation.
    pub catalogs: &'a Catalogs,
    /// The user's location; required for the search box.
    pub location: Option<GeoPoint>,
    /// Anchor for the default date window.
    pub today: NaiveDate,
}

/// The outcome of one build pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    /// The full request URL.
    pub url: String,
    /// Every parameter that passed validation, in query order.
    pub params: FilterParameters,
    /// The search box, when scale was valid.
    pub bbox: Option<BoundingBox>,
    /// One entry per rejected field, for display to the user.
    pub errors: Vec<FilterError>,
}

/// Returns the default `(start, end)` window ending on `today`.
#[must_use]
pub fn default_date_range(today: NaiveDate) -> (String, String) {
    let start = today
        .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    (
        start.format(DATE_FORMAT).to_string(),
        today.format(DATE_FORMAT).to_string(),
    )
}

fn value_or<'a>(field: Option<&'a String>, default: &'a str) -> &'a str {
    field
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
}

/// Runs every sanitizer over `filters` and assembles the events URL.
///
/// Invalid fields are dropped from the query and listed in
/// [`BuiltQuery::errors`]; they never fail the build. Each call starts from
/// an empty error list.
///
/// # Errors
///
/// Returns [`QueryError::MissingClientLocation`] when `ctx.location` is
/// `None`.
pub fn build_query(filters: &RawFilters, ctx: &QueryContext<'_>) -> Result<BuiltQuery, QueryError> {
    let location = ctx.location.ok_or(QueryError::MissingClientLocation)?;
    let (default_start, default_end) = default_date_range(ctx.today);

    let mut errors = Vec::new();
    let mut params = FilterParameters::new();

    params.merge(sanitize_sources(
        value_or(filters.source.as_ref(), ""),
        &ctx.catalogs.sources,
        &mut errors,
    ));
    params.merge(sanitize_categories(
        value_or(filters.category.as_ref(), ""),
        &ctx.catalogs.categories,
        &mut errors,
    ));
    params.merge(sanitize_status(
        value_or(filters.status.as_ref(), ""),
        &mut errors,
    ));
    params.merge(sanitize_limit(
        value_or(filters.limit.as_ref(), ""),
        &mut errors,
    ));
    params.merge(sanitize_date_range(
        value_or(filters.start.as_ref(), &default_start),
        value_or(filters.end.as_ref(), &default_end),
        &mut errors,
    ));
    params.merge(sanitize_mag_id(
        value_or(filters.mag_id.as_ref(), ""),
        &ctx.catalogs.magnitudes,
        &mut errors,
    ));
    params.merge(sanitize_magnitude_range(
        value_or(filters.mag_min.as_ref(), ""),
        value_or(filters.mag_max.as_ref(), ""),
        &mut errors,
    ));

    let bbox = sanitize_scale(
        value_or(filters.scale.as_ref(), DEFAULT_SCALE),
        location,
        &mut errors,
    );
    if let Some(bbox) = &bbox {
        params.merge(bbox_parameter(bbox));
    }

    let query_string = params.to_query_string();
    let url = if query_string.is_empty() {
        ctx.endpoint.to_string()
    } else {
        format!("{}?{query_string}", ctx.endpoint)
    };

    if !errors.is_empty() {
        log::warn!("{} filter(s) rejected", errors.len());
    }
    log::info!("Built events query: {url}");

    Ok(BuiltQuery {
        url,
        params,
        bbox,
        errors,
    })
}
