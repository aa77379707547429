//! Request builders and response decoders for the public SpaceX REST API.
//!
//! Builders produce plain [`ApiRequest`] values that [`ApiRequest::send`]
//! hands to the Crux HTTP capability. The shell performs the exchange and the
//! decoders here turn the answer into typed values.

use crux_http::http::{headers, mime, Method};
use crux_http::{Http, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::launch::{Launch, LaunchId, Launchpad, LaunchpadId};

pub const DEFAULT_BASE_URL: &str = "https://api.spacexdata.com";

/// Every failure the remote client reports. `status` is set only for non-2xx answers.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn status(code: u16) -> Self {
        Self {
            message: format!("HTTP error! status: {code}"),
            status: Some(code),
        }
    }

    pub fn transport(kind: Failure, detail: impl std::fmt::Display) -> Self {
        Self {
            message: format!("{}: {detail}", kind.prefix()),
            status: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    fn from_http(kind: Failure, error: crux_http::Error) -> Self {
        match error {
            crux_http::Error::Http(e) => ApiError::status(u16::from(e.code)),
            crux_http::Error::Json(detail)
            | crux_http::Error::Io(detail)
            | crux_http::Error::Url(detail) => ApiError::transport(kind, detail),
            crux_http::Error::Timeout => ApiError::transport(kind, "request timed out"),
        }
    }
}

/// Which phrasing a transport failure is reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Network,
    Search,
}

impl Failure {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Network => "Network error",
            Self::Search => "Search error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    const fn direction(self) -> i8 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// A request description, independent of the HTTP stack that will carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            body: None,
        }
    }

    /// Issues the request and reports the JSON-decoded answer through `make_event`.
    pub fn send<T, Ev, F>(self, http: &Http<Ev>, make_event: F)
    where
        T: DeserializeOwned + 'static,
        Ev: 'static,
        F: FnOnce(crux_http::Result<Response<T>>) -> Ev + Send + 'static,
    {
        tracing::debug!(method = %self.method, url = %self.url, "api request");
        let mut builder = http
            .request(self.method, self.url)
            .header(headers::ACCEPT, "application/json");
        if let Some(body) = self.body {
            builder = builder.body_bytes(body).content_type(mime::JSON);
        }
        builder.expect_json::<T>().send(make_event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceXApi {
    base: String,
}

impl Default for SpaceXApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SpaceXApi {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let url = Url::parse(&format!("{}{path}", self.base))
            .map_err(|e| ApiError::transport(Failure::Network, e))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ApiError::transport(
                Failure::Network,
                format!("{url} is not an absolute http(s) URL"),
            ));
        }
        Ok(url)
    }

    /// `GET /v5/launches` sorted by launch date.
    pub fn launches(
        &self,
        limit: u32,
        offset: u32,
        sort: SortOrder,
    ) -> Result<ApiRequest, ApiError> {
        let mut url = self.endpoint("/v5/launches")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("sort", &format!("date_utc:{}", sort.as_str()));
        Ok(ApiRequest::get(url))
    }

    pub fn launch(&self, id: &LaunchId) -> Result<ApiRequest, ApiError> {
        Ok(ApiRequest::get(self.endpoint(&format!("/v5/launches/{id}"))?))
    }

    pub fn launchpad(&self, id: &LaunchpadId) -> Result<ApiRequest, ApiError> {
        Ok(ApiRequest::get(self.endpoint(&format!("/v4/launchpads/{id}"))?))
    }

    /// Case-insensitive name match, newest first. The query is passed through as a regex.
    pub fn search(&self, query: &str, limit: u32, offset: u32) -> Result<ApiRequest, ApiError> {
        let url = self.endpoint("/v5/launches/query")?;
        let body = json!({
            "query": {
                "name": { "$regex": query, "$options": "i" }
            },
            "options": {
                "limit": limit,
                "offset": offset,
                "sort": { "date_utc": SortOrder::Desc.direction() }
            }
        });
        let body =
            serde_json::to_vec(&body).map_err(|e| ApiError::transport(Failure::Search, e))?;
        Ok(ApiRequest {
            method: Method::Post,
            url,
            body: Some(body),
        })
    }
}

fn decode<T>(result: crux_http::Result<Response<T>>, kind: Failure) -> Result<T, ApiError> {
    let mut response = result.map_err(|e| ApiError::from_http(kind, e))?;
    response
        .take_body()
        .ok_or_else(|| ApiError::transport(kind, "empty response body"))
}

pub fn decode_launches(
    result: crux_http::Result<Response<Vec<Launch>>>,
) -> Result<Vec<Launch>, ApiError> {
    decode(result, Failure::Network)
}

pub fn decode_launch(result: crux_http::Result<Response<Launch>>) -> Result<Launch, ApiError> {
    decode(result, Failure::Network)
}

pub fn decode_launchpad(
    result: crux_http::Result<Response<Launchpad>>,
) -> Result<Launchpad, ApiError> {
    decode(result, Failure::Network)
}

/// Body of a `/v5/launches/query` answer. Pagination fields are not used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub docs: Option<Vec<Launch>>,
}

pub fn decode_search(
    result: crux_http::Result<Response<SearchPage>>,
) -> Result<Vec<Launch>, ApiError> {
    let page = decode(result, Failure::Search)?;
    Ok(page.docs.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crux_http::http::StatusCode;
    use crux_http::testing::ResponseBuilder;

    fn launch() -> Launch {
        serde_json::from_str(LAUNCH_JSON).unwrap()
    }

    fn ok<T>(body: T) -> crux_http::Result<Response<T>> {
        Ok(ResponseBuilder::ok().body(body).build())
    }

    fn status<T>(code: StatusCode) -> crux_http::Result<Response<T>> {
        Err(crux_http::http::Error::from_str(code, "upstream said no").into())
    }

    const LAUNCH_JSON: &str = r#"{
        "id": "62dd70d5202306255024d139",
        "name": "Crew-5",
        "date_utc": "2022-10-05T16:00:00.000Z",
        "success": true,
        "upcoming": false,
        "details": null,
        "links": {"patch": {"small": null, "large": null}, "flickr": {"original": []}, "webcast": null},
        "launchpad": "5e9e4502f509094188566f88",
        "rocket": "5e9d0d95eda69973a809d1ec",
        "flight_number": 187
    }"#;

    #[test]
    fn test_launches_url() {
        let api = SpaceXApi::default();
        let request = api.launches(20, 40, SortOrder::Desc).unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.body, None);
        assert_eq!(
            request.url.as_str(),
            "https://api.spacexdata.com/v5/launches?limit=20&offset=40&sort=date_utc%3Adesc"
        );
    }

    #[test]
    fn test_launchpad_and_launch_urls() {
        let api = SpaceXApi::new("https://api.spacexdata.com/");
        let pad = api
            .launchpad(&LaunchpadId::new("5e9e4502f509094188566f88"))
            .unwrap();
        assert_eq!(
            pad.url.as_str(),
            "https://api.spacexdata.com/v4/launchpads/5e9e4502f509094188566f88"
        );
        let launch = api.launch(&LaunchId::new("abc")).unwrap();
        assert_eq!(
            launch.url.as_str(),
            "https://api.spacexdata.com/v5/launches/abc"
        );
    }

    #[test]
    fn test_non_http_base_is_refused() {
        let err = SpaceXApi::new("file:///tmp").launches(20, 0, SortOrder::Desc);
        assert_matches!(err, Err(ApiError { status: None, .. }));
    }

    #[test]
    fn test_search_body() {
        let request = SpaceXApi::default().search("falcon", 100, 0).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.url.as_str(),
            "https://api.spacexdata.com/v5/launches/query"
        );

        let body: serde_json::Value = serde_json::from_slice(&request.body.unwrap()).unwrap();
        assert_eq!(body["query"]["name"]["$regex"], "falcon");
        assert_eq!(body["query"]["name"]["$options"], "i");
        assert_eq!(body["options"]["limit"], 100);
        assert_eq!(body["options"]["offset"], 0);
        assert_eq!(body["options"]["sort"]["date_utc"], -1);
    }

    #[test]
    fn test_decode_launches() {
        let launches = decode_launches(ok(vec![launch()])).unwrap();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].name, "Crew-5");
    }

    #[test]
    fn test_decode_single_launch() {
        let launch = decode_launch(ok(launch())).unwrap();
        assert_eq!(launch.flight_number, 187);

        let missing = decode_launch(status(StatusCode::NotFound)).unwrap_err();
        assert!(missing.is_not_found());
    }

    #[test]
    fn test_decode_http_status_error() {
        let err = decode_launches(status(StatusCode::ServiceUnavailable)).unwrap_err();
        assert_eq!(err.message, "HTTP error! status: 503");
        assert_eq!(err.status, Some(503));
    }

    #[test]
    fn test_decode_transport_errors() {
        fn failed<T>() -> crux_http::Result<Response<T>> {
            Err(crux_http::Error::Io("connection refused".to_string()))
        }

        let err = decode_launchpad(failed()).unwrap_err();
        assert_eq!(err.message, "Network error: connection refused");
        assert_eq!(err.status, None);

        let err = decode_search(failed()).unwrap_err();
        assert_eq!(err.message, "Search error: connection refused");

        let err = decode_launches(Err(crux_http::Error::Timeout)).unwrap_err();
        assert_eq!(err.message, "Network error: request timed out");
    }

    #[test]
    fn test_decode_malformed_body_has_no_status() {
        let err = decode_launches(Err(crux_http::Error::Json(
            "expected value at line 1 column 2".to_string(),
        )))
        .unwrap_err();
        assert!(err.message.starts_with("Network error: "));
        assert_matches!(err.status, None);
    }

    #[test]
    fn test_decode_search_docs() {
        let hits = decode_search(ok(SearchPage {
            docs: Some(vec![launch()]),
        }))
        .unwrap();
        assert_eq!(hits.len(), 1);

        assert!(decode_search(ok(SearchPage::default())).unwrap().is_empty());

        let page: SearchPage = serde_json::from_str(r#"{"docs": null, "totalDocs": 0}"#).unwrap();
        assert!(decode_search(ok(page)).unwrap().is_empty());
    }
}
