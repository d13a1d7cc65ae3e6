//! Remote saved-object store client.
//!
//! Thin async client over the store's batch HTTP API: NDJSON export,
//! multipart NDJSON import, and a space lookup used for credential
//! verification. Every call is attempted exactly once; there is no retry,
//! backoff, or timeout beyond the transport's own. The synchronous command
//! layer bridges in with a per-command tokio runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{AuthMethod, Config};
use crate::error::{Error, Result};
use crate::manifest::{Manifest, ObjectRef};

/// Body of an export request.
///
/// `pull`/`add` use the `objects` form; `init` has no manifest yet and
/// asks for everything of the given types instead. With
/// `includeReferencesDeep` the store closes over transitive references,
/// so a dashboard pulls in its panels' data views.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<ObjectRef>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    pub exclude_export_details: bool,
    pub include_references_deep: bool,
}

impl ExportRequest {
    /// Request the manifest's objects plus their reference closure.
    ///
    /// The request body is literally the manifest.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            objects: Some(manifest.objects.clone()),
            types: None,
            exclude_export_details: manifest.exclude_export_details,
            include_references_deep: manifest.include_references_deep,
        }
    }

    /// Request an explicit reference list plus closure.
    #[must_use]
    pub fn from_refs(refs: Vec<ObjectRef>) -> Self {
        Self {
            objects: Some(refs),
            types: None,
            exclude_export_details: true,
            include_references_deep: true,
        }
    }

    /// Request a full export of the given types (used by `init`).
    #[must_use]
    pub fn from_types(types: Vec<String>) -> Self {
        Self {
            objects: None,
            types: Some(types),
            exclude_export_details: true,
            include_references_deep: true,
        }
    }
}

/// Outcome of an import call, with the raw response preserved so a
/// rejection can be written out for inspection.
#[derive(Debug)]
pub struct ImportOutcome {
    pub success: bool,
    pub success_count: usize,
    pub raw: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportResponse {
    success: bool,
    #[serde(default)]
    success_count: usize,
}

/// Space metadata returned by the auth check.
#[derive(Debug, Deserialize)]
pub struct SpaceInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Classify an export response body.
///
/// A JSON object carrying a well-formed numeric `statusCode` is always an
/// error envelope, never a bundle, regardless of whatever else it
/// contains — a legitimate bundle never has that field at top level.
/// Anything else is parsed line-by-line as NDJSON.
///
/// # Errors
///
/// Returns `Remote` for an error envelope, or a JSON error for an
/// unparseable bundle line.
pub fn classify_export_body(body: &str) -> Result<Vec<Value>> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(status_code) = value.get("statusCode").and_then(Value::as_u64) {
            return Err(Error::Remote {
                status_code,
                error: value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_string(),
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
    }

    let mut docs = Vec::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        docs.push(serde_json::from_str(line)?);
    }
    Ok(docs)
}

/// Client for the remote saved-object store.
pub struct RemoteStore {
    client: reqwest::Client,
    url: String,
    space: String,
    auth: AuthMethod,
}

impl RemoteStore {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            space: config.space.clone(),
            auth: config.auth.clone(),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            AuthMethod::ApiKey(key) => request.header("Authorization", format!("ApiKey {key}")),
            AuthMethod::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            AuthMethod::None => request,
        }
    }

    /// Export a bundle: the requested objects plus their reference
    /// closure, or all objects of the requested types.
    ///
    /// # Errors
    ///
    /// Returns `Remote` for an error envelope, `Http` for transport
    /// failures. Fatal either way; the caller does not retry.
    pub async fn export(&self, request: &ExportRequest) -> Result<Vec<Value>> {
        let url = format!(
            "{}/s/{}/api/saved_objects/_export",
            self.url, self.space
        );

        let response = self
            .authorize(self.client.post(&url))
            .header("kbn-xsrf", "true")
            .json(request)
            .send()
            .await?;

        let body = response.text().await?;
        let docs = classify_export_body(&body)?;
        tracing::info!(count = docs.len(), "export received");
        Ok(docs)
    }

    /// Import a bundle file with the overwrite-existing policy.
    ///
    /// The response's `success` flag is the sole pass/fail signal; the
    /// caller decides what to do with a partial `success_count`.
    ///
    /// # Errors
    ///
    /// Returns `Http` for transport failures or `Json` if the response is
    /// not the expected shape.
    pub async fn import(&self, bundle_path: &Path) -> Result<ImportOutcome> {
        let url = format!(
            "{}/s/{}/api/saved_objects/_import?overwrite=true",
            self.url, self.space
        );

        let bytes = std::fs::read(bundle_path)?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("import.ndjson")
            .mime_str("application/ndjson")
            .map_err(Error::Http)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .authorize(self.client.post(&url))
            .header("kbn-xsrf", "true")
            .multipart(form)
            .send()
            .await?;

        let raw = response.text().await?;
        let parsed: ImportResponse = serde_json::from_str(&raw)?;

        Ok(ImportOutcome {
            success: parsed.success,
            success_count: parsed.success_count,
            raw,
        })
    }

    /// Verify credentials by fetching the configured space.
    ///
    /// # Errors
    ///
    /// Returns `Remote` if the store answers with an error envelope.
    pub async fn check_space(&self) -> Result<SpaceInfo> {
        let url = format!("{}/api/spaces/space/{}", self.url, self.space);

        let response = self.authorize(self.client.get(&url)).send().await?;
        let body = response.text().await?;

        let value: Value = serde_json::from_str(&body)?;
        if let Some(status_code) = value.get("statusCode").and_then(Value::as_u64) {
            return Err(Error::Remote {
                status_code,
                error: value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_string(),
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_bundle() {
        let body = "{\"type\":\"dashboard\",\"id\":\"a\"}\n\
                    {\"exportedCount\":1,\"missingRefCount\":0}\n";
        let docs = classify_export_body(body).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["type"], "dashboard");
    }

    #[test]
    fn test_classify_error_envelope() {
        let body = r#"{"statusCode":400,"error":"Bad Request","message":"Trying to export more than 10000 objects"}"#;
        let err = classify_export_body(body).unwrap_err();
        match err {
            Error::Remote {
                status_code,
                error,
                message,
            } => {
                assert_eq!(status_code, 400);
                assert_eq!(error, "Bad Request");
                assert!(message.contains("10000"));
            }
            other => panic!("expected Remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_status_code_wins_even_with_objects() {
        // An envelope that also happens to carry `objects` is still an
        // error, never a bundle.
        let body = r#"{"statusCode":403,"error":"Forbidden","message":"no","objects":[]}"#;
        assert!(matches!(
            classify_export_body(body),
            Err(Error::Remote { status_code: 403, .. })
        ));
    }

    #[test]
    fn test_non_numeric_status_code_is_not_an_envelope() {
        // A single-document bundle whose attributes mention statusCode
        // only counts as an envelope when the field is top-level and
        // numeric.
        let body = r#"{"type":"dashboard","id":"a","statusCode":"not a code"}"#;
        let docs = classify_export_body(body).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_export_request_objects_shape() {
        let request = ExportRequest::from_refs(vec![ObjectRef::new("dashboard", "a")]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "objects": [{"type": "dashboard", "id": "a"}],
                "excludeExportDetails": true,
                "includeReferencesDeep": true,
            })
        );
    }

    #[test]
    fn test_export_request_types_shape() {
        let request = ExportRequest::from_types(vec!["dashboard".to_string()]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "type": ["dashboard"],
                "excludeExportDetails": true,
                "includeReferencesDeep": true,
            })
        );
    }

    #[test]
    fn test_import_response_parsing() {
        let ok: ImportResponse =
            serde_json::from_str(r#"{"success":true,"successCount":12}"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.success_count, 12);

        let failed: ImportResponse = serde_json::from_str(
            r#"{"success":false,"successCount":0,"errors":[{"id":"a","type":"dashboard"}]}"#,
        )
        .unwrap();
        assert!(!failed.success);
    }
}
