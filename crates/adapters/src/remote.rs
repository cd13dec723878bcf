//! HTTP remote note store adapter.

use notesync_config::RemoteConfig;
use notesync_ports::{CreatableNote, NoteId, NoteMetadata, NoteRecord, RemotePort};
use notesync_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

/// HTTP remote note store adapter.
///
/// Speaks a small JSON API rooted at the configured base URL:
/// `GET /notes`, `GET /notes/metadata`, `GET /notes/{id}`, `POST /notes`,
/// `PUT /notes/{id}`.
#[derive(Debug)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: Box<str>,
}

impl HttpRemote {
    /// Create a new HTTP remote adapter from validated remote config.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().map(str::trim).ok_or_else(|| {
            ErrorEnvelope::expected(ErrorCode::config(), "remote base url must be set")
        })?;
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::config(),
                "remote base url must be non-empty",
            ));
        }
        if config.timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::config(),
                "remote timeout must be greater than zero",
            ));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = config.token.as_deref() {
            let mut auth_header =
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    ErrorEnvelope::expected(
                        ErrorCode::config(),
                        "remote token contains invalid header characters",
                    )
                })?;
            auth_header.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_header);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("remote", "client_init_failed"),
                    format!("failed to build remote client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_owned().into_boxed_str(),
        })
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.base_url)
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<(StatusCode, Vec<u8>)> {
        ctx.ensure_not_cancelled(operation)?;

        let response = tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(operation)),
            result = request.send() => result.map_err(|error| map_reqwest_error(&error))?,
        };

        let status = response.status();
        let payload = tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(operation)),
            result = response.bytes() => result.map_err(|error| map_reqwest_error(&error))?,
        };

        Ok((status, payload.to_vec()))
    }

    async fn get_json<T>(
        &self,
        ctx: &RequestContext,
        suffix: &str,
        operation: &'static str,
    ) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = self.client.get(self.endpoint(suffix));
        let (status, payload) = self.send(ctx, request, operation).await?;
        if !status.is_success() {
            return Err(map_remote_http_error(status, &payload));
        }
        decode_payload(&payload)
    }
}

impl RemotePort for HttpRemote {
    fn get_all_notes(&self, ctx: &RequestContext) -> notesync_ports::BoxFuture<'_, Result<Vec<NoteRecord>>> {
        let ctx = ctx.clone();
        Box::pin(async move { self.get_json(&ctx, "notes", "remote.get_all_notes").await })
    }

    fn get_all_notes_metadata(
        &self,
        ctx: &RequestContext,
    ) -> notesync_ports::BoxFuture<'_, Result<Vec<NoteMetadata>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            self.get_json(&ctx, "notes/metadata", "remote.get_all_notes_metadata")
                .await
        })
    }

    fn get_note_by_id(
        &self,
        ctx: &RequestContext,
        id: NoteId,
    ) -> notesync_ports::BoxFuture<'_, Result<Option<NoteRecord>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let request = self.client.get(self.endpoint(&format!("notes/{}", id.as_str())));
            let (status, payload) = self.send(&ctx, request, "remote.get_note_by_id").await?;
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(map_remote_http_error(status, &payload)
                    .with_metadata("noteId", id.as_str().to_owned()));
            }
            decode_payload(&payload).map(Some)
        })
    }

    fn create_note(
        &self,
        ctx: &RequestContext,
        note: CreatableNote,
    ) -> notesync_ports::BoxFuture<'_, Result<NoteRecord>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let request = self.client.post(self.endpoint("notes")).json(&note);
            let (status, payload) = self.send(&ctx, request, "remote.create_note").await?;
            if !status.is_success() {
                return Err(map_remote_http_error(status, &payload));
            }
            decode_payload(&payload)
        })
    }

    fn update_note(
        &self,
        ctx: &RequestContext,
        id: NoteId,
        note: NoteRecord,
    ) -> notesync_ports::BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let request = self
                .client
                .put(self.endpoint(&format!("notes/{}", id.as_str())))
                .json(&note);
            let (status, payload) = self.send(&ctx, request, "remote.update_note").await?;
            if !status.is_success() {
                return Err(map_remote_http_error(status, &payload)
                    .with_metadata("noteId", id.as_str().to_owned()));
            }
            Ok(())
        })
    }

    fn disconnect(&self, ctx: &RequestContext) -> notesync_ports::BoxFuture<'_, Result<()>> {
        // The HTTP client holds no server-side session; dropping it is enough.
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("remote.disconnect")?;
            Ok(())
        })
    }
}

#[derive(Debug, Deserialize)]
struct RemoteErrorResponse {
    error: RemoteErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorDetail {
    message: String,
    code: Option<String>,
}

fn decode_payload<T>(payload: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_slice(payload).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("remote", "invalid_response"),
            format!("failed to decode remote response: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn cancelled_error(operation: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)
}

fn map_reqwest_error(error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            "remote request timed out",
            ErrorClass::Retriable,
        );
    }
    if error.is_connect() {
        return ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("remote connection failed: {error}"),
            ErrorClass::Retriable,
        );
    }
    ErrorEnvelope::unexpected(
        ErrorCode::remote_request_failed(),
        format!("remote request failed: {error}"),
        ErrorClass::NonRetriable,
    )
}

fn map_remote_http_error(status: StatusCode, payload: &[u8]) -> ErrorEnvelope {
    let mut envelope = if let Ok(parsed) = serde_json::from_slice::<RemoteErrorResponse>(payload) {
        let message = parsed.error.message;
        let mut envelope = match status.as_u16() {
            401 | 403 => ErrorEnvelope::expected(ErrorCode::permission_denied(), message),
            408 => ErrorEnvelope::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable),
            _ if status.is_server_error() => ErrorEnvelope::unexpected(
                ErrorCode::remote_request_failed(),
                message,
                ErrorClass::Retriable,
            ),
            _ => ErrorEnvelope::unexpected(
                ErrorCode::remote_request_failed(),
                message,
                ErrorClass::NonRetriable,
            ),
        };
        if let Some(code) = parsed.error.code.as_deref() {
            envelope = envelope.with_metadata("remote_code", code.to_string());
        }
        envelope
    } else {
        ErrorEnvelope::unexpected(
            ErrorCode::remote_request_failed(),
            "remote request failed with non-JSON error",
            if status.is_server_error() {
                ErrorClass::Retriable
            } else {
                ErrorClass::NonRetriable
            },
        )
    };

    envelope = envelope.with_metadata("status", status.as_u16().to_string());
    envelope
}
