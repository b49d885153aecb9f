//! HTTP client for the EONET and ipapi upstreams.

use eonet_viewer_event_models::{
    CatalogEntry, CatalogKind, Catalogs, ClientLocation, FeatureCollection, ReferenceCatalog,
};

use crate::SourceError;
use crate::cache::{Endpoint, ResponseCache};
use crate::ipapi::parse_ip_data;
use crate::retry;
use crate::services::Services;

/// An event query response, both as received and parsed.
#[derive(Debug, Clone)]
pub struct FetchedEvents {
    /// The body exactly as EONET returned it, for export.
    pub raw: serde_json::Value,
    /// The parsed feature collection.
    pub collection: FeatureCollection,
}

/// Talks to the configured upstreams, memoizing every successful response
/// for the lifetime of the client.
#[derive(Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    services: Services,
    cache: ResponseCache,
}

impl UpstreamClient {
    /// Creates a client for `services`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(services: Services) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            services,
            cache: ResponseCache::new(),
        })
    }

    /// Creates a client from the embedded service registry and the
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the registry cannot be resolved or the
    /// HTTP client cannot be built.
    pub fn from_env() -> Result<Self, SourceError> {
        Self::new(Services::load()?)
    }

    /// The resolved upstream configuration.
    #[must_use]
    pub const fn services(&self) -> &Services {
        &self.services
    }

    /// Full URL of the `GeoJSON` events endpoint.
    #[must_use]
    pub fn events_endpoint(&self) -> String {
        self.services.eonet.events_endpoint()
    }

    /// Resolves `ip` (or the caller's own address when `None`) to a
    /// location.
    ///
    /// Non-success statuses and ipapi's `{"error": true}` bodies are not
    /// errors: they mean the location is unknown and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failures or a non-JSON body.
    pub async fn get_ip_data(
        &self,
        ip: Option<&str>,
    ) -> Result<Option<ClientLocation>, SourceError> {
        let ipapi = &self.services.ipapi;
        let url = ipapi.lookup_url(ip);
        let key = ip.map(str::trim).unwrap_or_default();

        let body = match self
            .cached_json(Endpoint::IpLookup, key, ipapi.max_retries, || {
                self.http
                    .get(&url)
                    .timeout(ipapi.timeout)
                    .header(reqwest::header::USER_AGENT, &ipapi.user_agent)
            })
            .await
        {
            Ok(body) => body,
            Err(SourceError::Status {
                status, message, ..
            }) => {
                log::warn!(
                    "IP lookup returned HTTP {status}: {}",
                    message.as_deref().unwrap_or("no message")
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let location = parse_ip_data(&body);
        if let Some(location) = &location {
            log::info!(
                "Client location: {} ({}, {})",
                location.describe(),
                location.latitude,
                location.longitude
            );
        }
        Ok(location)
    }

    /// Fetches one reference catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or the body is not a
    /// catalog response.
    pub async fn catalog(&self, kind: CatalogKind) -> Result<ReferenceCatalog, SourceError> {
        let eonet = &self.services.eonet;
        let url = eonet.catalog_endpoint(kind.as_ref());
        let body = self
            .cached_json(Endpoint::Catalog, kind.as_ref(), eonet.max_retries, || {
                self.http.get(&url).timeout(eonet.timeout)
            })
            .await?;
        let catalog = parse_catalog(kind, &body)?;
        log::debug!("Loaded {} {kind}", catalog.len());
        Ok(catalog)
    }

    /// Fetches the three reference catalogs concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] raised by any of the fetches.
    pub async fn catalogs(&self) -> Result<Catalogs, SourceError> {
        let (sources, categories, magnitudes) = futures::try_join!(
            self.catalog(CatalogKind::Sources),
            self.catalog(CatalogKind::Categories),
            self.catalog(CatalogKind::Magnitudes),
        )?;
        Ok(Catalogs {
            sources,
            categories,
            magnitudes,
        })
    }

    /// Fetches the events at `url` (as produced by the query builder).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails, EONET rejects the
    /// query, or the body is not a feature collection.
    pub async fn events(&self, url: &str) -> Result<FetchedEvents, SourceError> {
        let eonet = &self.services.eonet;
        log::info!("Fetching events: {url}");
        let raw = self
            .cached_json(Endpoint::Events, url, eonet.max_retries, || {
                self.http.get(url).timeout(eonet.timeout)
            })
            .await?;
        let collection: FeatureCollection = serde_json::from_value(raw.clone())?;
        log::info!("EONET returned {} event(s)", collection.features.len());
        Ok(FetchedEvents { raw, collection })
    }

    #[allow(clippy::future_not_send)]
    async fn cached_json<F>(
        &self,
        endpoint: Endpoint,
        argument: &str,
        max_retries: u32,
        build_request: F,
    ) -> Result<serde_json::Value, SourceError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        if let Some(body) = self.cache.get(endpoint, argument) {
            return Ok(body);
        }
        let body = retry::send_json(build_request, max_retries).await?;
        self.cache.insert(endpoint, argument, body.clone());
        Ok(body)
    }
}

/// Turns a catalog response into a [`ReferenceCatalog`].
///
/// The records live in an array under the key named after `kind`. Each
/// record's `id` becomes the catalog key and is removed from the
/// descriptor. Records without a string `id` are skipped.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] if the array is missing, or
/// [`SourceError::Json`] if a record is not an object.
pub fn parse_catalog(
    kind: CatalogKind,
    body: &serde_json::Value,
) -> Result<ReferenceCatalog, SourceError> {
    let records = body
        .get(kind.as_ref())
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| SourceError::Parse {
            message: format!("{kind} response has no \"{kind}\" array"),
        })?;

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let mut record = record.clone();
        let id = record
            .as_object_mut()
            .and_then(|fields| fields.remove("id"))
            .and_then(|id| id.as_str().map(str::to_string));
        let Some(id) = id else {
            log::warn!("Skipping {kind} record without an id: {record}");
            continue;
        };
        let entry: CatalogEntry = serde_json::from_value(record)?;
        entries.push((id, entry));
    }

    Ok(entries.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_catalog_strips_ids() {
        let catalog = parse_catalog(
            CatalogKind::Sources,
            &json!({
                "title": "EONET Event Sources",
                "sources": [
                    {
                        "id": "InciWeb",
                        "title": "InciWeb",
                        "source": "https://inciweb.nwcg.gov/",
                        "link": "https://eonet.gsfc.nasa.gov/api/v3/events?source=InciWeb"
                    },
                    {"id": "IRWIN", "title": "Integrated Reporting of Wildland-Fire Information"}
                ]
            }),
        )
        .unwrap();

        assert_eq!(catalog.ids().collect::<Vec<_>>(), ["IRWIN", "InciWeb"]);
        let inciweb = catalog.get("InciWeb").unwrap();
        assert_eq!(inciweb.title.as_deref(), Some("InciWeb"));
        assert!(!inciweb.fields.contains_key("id"));
        assert_eq!(inciweb.fields["source"], "https://inciweb.nwcg.gov/");
    }

    #[test]
    fn parse_catalog_reads_magnitude_names() {
        let catalog = parse_catalog(
            CatalogKind::Magnitudes,
            &json!({
                "magnitudes": [
                    {"id": "mag_kts", "name": "Maximum Sustained Wind Speed", "unit": "kts"},
                    {"id": "ac", "name": "Acres", "unit": "acres"}
                ]
            }),
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("mag_kts").unwrap().display_name("mag_kts"),
            "Maximum Sustained Wind Speed"
        );
        assert_eq!(catalog.get("ac").unwrap().fields["unit"], "acres");
    }

    #[test]
    fn parse_catalog_skips_records_without_id() {
        let catalog = parse_catalog(
            CatalogKind::Categories,
            &json!({
                "categories": [
                    {"title": "Nameless"},
                    {"id": 7, "title": "Numeric id"},
                    {"id": "wildfires", "title": "Wildfires"}
                ]
            }),
        )
        .unwrap();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), ["wildfires"]);
    }

    #[test]
    fn parse_catalog_requires_the_named_array() {
        let err = parse_catalog(CatalogKind::Categories, &json!({"sources": []})).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
        assert!(err.to_string().contains("\"categories\""));
    }

    #[test]
    fn empty_catalog_is_allowed() {
        let catalog = parse_catalog(CatalogKind::Magnitudes, &json!({"magnitudes": []})).unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn cached_responses_skip_the_network() {
        let services = Services::from_configs(&crate::services::all_services(), |key| {
            (key == crate::services::EONET_BASE_URL_ENV)
                .then(|| "http://127.0.0.1:9/api/v3".to_string())
        })
        .unwrap();
        let client = UpstreamClient::new(services).unwrap();
        client.cache.insert(
            Endpoint::Catalog,
            "categories",
            json!({"categories": [{"id": "volcanoes", "title": "Volcanoes"}]}),
        );

        let catalog = client.catalog(CatalogKind::Categories).await.unwrap();
        assert!(catalog.contains("volcanoes"));
    }

    #[tokio::test]
    async fn cached_events_keep_raw_body() {
        let client = UpstreamClient::new(
            Services::from_configs(&crate::services::all_services(), |_| None).unwrap(),
        )
        .unwrap();
        let url = format!("{}?status=open", client.events_endpoint());
        let raw = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-120.0, 38.0]},
                "properties": {"id": "EONET_1", "title": "Fire", "date": "2024-06-01T00:00:00Z"}
            }]
        });
        client.cache.insert(Endpoint::Events, &url, raw.clone());

        let fetched = client.events(&url).await.unwrap();
        assert_eq!(fetched.raw, raw);
        assert_eq!(fetched.collection.features.len(), 1);
        assert_eq!(fetched.collection.features[0].properties.id, "EONET_1");
    }
}
