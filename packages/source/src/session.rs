//! Per-user state resolved once at startup.

use chrono::NaiveDate;
use eonet_viewer_event_models::{Catalogs, ClientLocation};
use eonet_viewer_query::{BuiltQuery, QueryContext, QueryError, RawFilters, build_query};

use crate::{SourceError, UpstreamClient};

/// The client location and reference catalogs every query is validated
/// against.
#[derive(Debug, Clone)]
pub struct Session {
    /// Where the user is, if it could be resolved.
    pub location: Option<ClientLocation>,
    /// Valid sources, categories and magnitude scales.
    pub catalogs: Catalogs,
    /// Full URL of the events endpoint.
    pub events_endpoint: String,
}

impl Session {
    /// Resolves the location of `ip` (or of the caller) and fetches the
    /// reference catalogs, concurrently.
    ///
    /// A failed location lookup is logged and leaves [`Self::location`]
    /// empty; queries built from such a session fail with
    /// [`QueryError::MissingClientLocation`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if any catalog cannot be fetched.
    pub async fn start(client: &UpstreamClient, ip: Option<&str>) -> Result<Self, SourceError> {
        let location = async {
            Ok::<_, SourceError>(client.get_ip_data(ip).await.unwrap_or_else(|e| {
                log::warn!("Could not resolve client location: {e}");
                None
            }))
        };
        let (location, catalogs) = futures::try_join!(location, client.catalogs())?;

        log::info!(
            "Session ready: {} sources, {} categories, {} magnitude scales",
            catalogs.sources.len(),
            catalogs.categories.len(),
            catalogs.magnitudes.len()
        );

        Ok(Self {
            location,
            catalogs,
            events_endpoint: client.events_endpoint(),
        })
    }

    /// Builds the events URL for `filters`, as of `today`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MissingClientLocation`] if the session has no
    /// location.
    pub fn build_query(
        &self,
        filters: &RawFilters,
        today: NaiveDate,
    ) -> Result<BuiltQuery, QueryError> {
        build_query(
            filters,
            &QueryContext {
                endpoint: &self.events_endpoint,
                catalogs: &self.catalogs,
                location: self.location.as_ref().map(ClientLocation::point),
                today,
            },
        )
    }

    /// Today's date in the local time zone, the end of the default window.
    #[must_use]
    pub fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use eonet_viewer_event_models::{CatalogEntry, ReferenceCatalog};

    use super::*;

    const ENDPOINT: &str = "https://eonet.gsfc.nasa.gov/api/v3/events/geojson";

    fn catalog(ids: &[&str]) -> ReferenceCatalog {
        ids.iter()
            .map(|id| ((*id).to_string(), CatalogEntry::default()))
            .collect()
    }

    fn session(location: Option<ClientLocation>) -> Session {
        Session {
            location,
            catalogs: Catalogs {
                sources: catalog(&["InciWeb", "IRWIN"]),
                categories: catalog(&["wildfires", "volcanoes"]),
                magnitudes: catalog(&["mag_kts", "ac"]),
            },
            events_endpoint: ENDPOINT.to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn builds_from_session_location() {
        let session = session(Some(ClientLocation {
            ip: None,
            city: Some("San Francisco".to_string()),
            region: Some("California".to_string()),
            country_name: Some("United States".to_string()),
            latitude: 37.8,
            longitude: -122.4,
        }));
        let built = session
            .build_query(
                &RawFilters {
                    category: Some("wildfires".to_string()),
                    ..RawFilters::default()
                },
                today(),
            )
            .unwrap();
        assert!(built.errors.is_empty());
        assert_eq!(
            built.url,
            format!(
                "{ENDPOINT}?category=wildfires&start=2024-05-16&end=2024-06-15\
                 &bbox=-132.4,47.8,-112.4,27.8"
            )
        );
    }

    #[test]
    fn missing_location_fails_the_build() {
        let err = session(None)
            .build_query(&RawFilters::default(), today())
            .unwrap_err();
        assert!(matches!(err, QueryError::MissingClientLocation));
    }
}
