//! HTTP transport backed by a blocking reqwest client.

use super::{
    IMAGE_ENDPOINT, IMAGE_FIELD, IMAGE_FILENAME, QUESTION_ENDPOINT, QuestionUpdate, SyncError,
    Transport,
};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use url::Url;

/// Posts payloads to a collector over HTTP.
///
/// Uses the client's default timeouts.
pub struct HttpTransport {
    client: Client,
    image_url: Url,
    question_url: Url,
}

impl HttpTransport {
    /// Create a transport for the collector at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let base = Url::parse(base_url)?;
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            image_url: base.join(IMAGE_ENDPOINT)?,
            question_url: base.join(QUESTION_ENDPOINT)?,
        })
    }

    pub fn image_url(&self) -> &Url {
        &self.image_url
    }

    pub fn question_url(&self) -> &Url {
        &self.question_url
    }
}

impl Transport for HttpTransport {
    fn post_image(&self, png: &[u8]) -> Result<(), SyncError> {
        let part = Part::bytes(png.to_vec())
            .file_name(IMAGE_FILENAME)
            .mime_str("image/png")?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(self.image_url.clone())
            .multipart(form)
            .send()?;
        check_status(response)
    }

    fn post_question(&self, update: &QuestionUpdate) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.question_url.clone())
            .json(update)
            .send()?;
        check_status(response)
    }
}

/// Treat any 2xx as success; the body is only logged.
fn check_status(response: Response) -> Result<(), SyncError> {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    if status.is_success() {
        log::debug!("Collector responded {}: {}", status, body.trim());
        Ok(())
    } else {
        Err(SyncError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
