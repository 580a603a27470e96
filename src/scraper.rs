use crate::lifecycle::{self, LifecycleMap};
use crate::translate::IdTranslator;
use failure::{format_err, Fallible};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;

static CLIENT_AGENT: &str = concat!("osrel-gather/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all upstream fetches.
pub fn new_client(timeout: Duration) -> Fallible<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_AGENT));
    let hclient = reqwest::ClientBuilder::new()
        .default_headers(headers)
        .timeout(timeout)
        .build()?;
    Ok(hclient)
}

/// Supplier of raw lifecycle payloads, keyed by provider identifier.
pub trait LifecycleSource {
    /// Fetch the payload for `api_id`; `Ok(None)` means the provider has no
    /// data for it.
    fn fetch(&self, api_id: &str) -> Fallible<Option<Vec<u8>>>;
}

/// Lifecycle source backed by the provider HTTP API.
#[derive(Debug)]
pub struct HttpSource {
    hclient: reqwest::Client,
    url_template: String,
}

impl HttpSource {
    pub fn new<S>(hclient: reqwest::Client, url_template: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            hclient,
            url_template: url_template.into(),
        }
    }

    /// Expand the URL template for `api_id`.
    fn url_for(&self, api_id: &str) -> Fallible<reqwest::Url> {
        let vars = hashmap! { "id".to_string() => api_id.to_string() };
        let url = envsubst::substitute(self.url_template.as_str(), &vars)
            .map_err(|e| format_err!("failed to expand lifecycle URL for {}: {}", api_id, e))?;
        reqwest::Url::parse(&url).map_err(|e| format_err!("invalid lifecycle URL {}: {}", url, e))
    }
}

impl LifecycleSource for HttpSource {
    fn fetch(&self, api_id: &str) -> Fallible<Option<Vec<u8>>> {
        let url = self.url_for(api_id)?;
        trace!("fetching {}", url);
        let mut resp = self
            .hclient
            .get(url.clone())
            .send()
            .map_err(|e| format_err!("error fetching data from {}: {}", url, e))?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Ok(None),
            status => return Err(format_err!("unexpected status code from {}: {}", url, status)),
        }

        let mut payload = vec![];
        resp.copy_to(&mut payload)
            .map_err(|e| format_err!("error reading response from {}: {}", url, e))?;
        Ok(Some(payload))
    }
}

/// Lifecycle scraper, reconciling os-release identifiers with provider data.
pub struct Scraper<S> {
    source: S,
    translator: IdTranslator,
}

impl<S: LifecycleSource> Scraper<S> {
    pub fn new(source: S, translator: IdTranslator) -> Self {
        Self { source, translator }
    }

    /// Collect lifecycle records for each identifier, in order.
    ///
    /// Identifiers unknown to the provider, or with no release cycles, are
    /// left out of the result; any other failure aborts the whole pass.
    pub fn scrape(&self, ids: &[String]) -> Fallible<LifecycleMap> {
        let mut releases_by_id = LifecycleMap::new();
        for os_release_id in ids {
            let api_id = self.translator.translate(os_release_id);
            let payload = match self.source.fetch(api_id) {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    debug!("no lifecycle data for {} (as {})", os_release_id, api_id);
                    continue;
                }
                Err(e) => {
                    return Err(format_err!(
                        "failed to fetch data for {}: {}",
                        os_release_id,
                        e
                    ))
                }
            };

            let releases = lifecycle::decode_cycles(&payload, os_release_id, api_id)
                .map_err(|e| format_err!("failed to fetch data for {}: {}", os_release_id, e))?;
            if releases.is_empty() {
                debug!("empty lifecycle data for {} (as {})", os_release_id, api_id);
                continue;
            }
            info!("found {} releases for {}", releases.len(), os_release_id);
            releases_by_id.insert(os_release_id.clone(), releases);
        }
        Ok(releases_by_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory source; identifiers missing from `payloads` are not found.
    #[derive(Default)]
    struct FakeSource {
        payloads: HashMap<String, Vec<u8>>,
        failing: Option<String>,
        queried: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn with(mut self, api_id: &str, payload: &str) -> Self {
            self.payloads
                .insert(api_id.to_string(), payload.as_bytes().to_vec());
            self
        }
    }

    impl LifecycleSource for FakeSource {
        fn fetch(&self, api_id: &str) -> Fallible<Option<Vec<u8>>> {
            self.queried.borrow_mut().push(api_id.to_string());
            if self.failing.as_deref() == Some(api_id) {
                return Err(format_err!("unexpected status code: 500"));
            }
            Ok(self.payloads.get(api_id).cloned())
        }
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scrape_translates_and_tags() {
        let source = FakeSource::default()
            .with("oracle-linux", r#"[{"cycle": "9", "eol": "2032-06-30"}]"#)
            .with("ubuntu", r#"[{"cycle": "22.04", "lts": true}, {"cycle": "23.10"}]"#);
        let scraper = Scraper::new(source, IdTranslator::default());

        let result = scraper.scrape(&ids(&["ol", "ubuntu"])).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["ol"][0].os_release_id, "ol");
        assert_eq!(result["ol"][0].api_id, "oracle-linux");
        assert_eq!(result["ubuntu"].len(), 2);
        assert_eq!(result["ubuntu"][1].api_id, "ubuntu");
        assert_eq!(
            *scraper.source.queried.borrow(),
            vec!["oracle-linux", "ubuntu"]
        );
    }

    #[test]
    fn scrape_skips_not_found() {
        let source = FakeSource::default().with("arch", r#"[]"#);
        let scraper = Scraper::new(source, IdTranslator::default());

        let result = scraper.scrape(&ids(&["arch", "ol"])).unwrap();
        assert!(!result.contains_key("ol"));
        assert!(!result.contains_key("arch"));
        assert!(result.is_empty());
        assert_eq!(*scraper.source.queried.borrow(), vec!["arch", "oracle-linux"]);
    }

    #[test]
    fn scrape_skips_empty_cycles() {
        let source = FakeSource::default()
            .with("arch", "[]")
            .with("debian", r#"[{"cycle": "12", "eol": false}]"#);
        let scraper = Scraper::new(source, IdTranslator::default());

        let result = scraper.scrape(&ids(&["arch", "debian"])).unwrap();
        assert!(!result.contains_key("arch"));
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["debian"]);
        assert_eq!(result["debian"].len(), 1);
    }

    #[test]
    fn scrape_fails_fast() {
        let source = FakeSource {
            failing: Some("debian".to_string()),
            ..FakeSource::default()
        }
        .with("alpine", r#"[]"#)
        .with("fedora", r#"[]"#);
        let scraper = Scraper::new(source, IdTranslator::default());

        let err = scraper
            .scrape(&ids(&["alpine", "debian", "fedora"]))
            .unwrap_err();
        assert!(err.to_string().contains("debian"));
        assert_eq!(*scraper.source.queried.borrow(), vec!["alpine", "debian"]);
    }

    #[test]
    fn scrape_rejects_malformed_payload() {
        let source = FakeSource::default().with("amazon-linux", r#"[{"eol": 2025}]"#);
        let scraper = Scraper::new(source, IdTranslator::default());

        let err = scraper.scrape(&ids(&["amzn"])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("amzn"));
        assert!(msg.contains("milestone 'eol'"));
    }

    #[test]
    fn url_template_expansion() {
        let hclient = reqwest::Client::new();
        let source = HttpSource::new(hclient, "https://example.com/api/${id}.json");
        let url = source.url_for("oracle-linux").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/oracle-linux.json");
    }
}
