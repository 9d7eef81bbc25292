use std::time::Duration;

use log::{debug, info};
use reqwest::{Client, Response, StatusCode};

use crate::command::ControlCommand;
use crate::debug_flags::{self, DEBUG_HTTP};
use crate::error::TransportError;

const MAX_RESPONSE_SIZE: usize = 32_768;

const STATUS_PATH: &str = "/api/status";
const CONTROL_PATH: &str = "/api/control";

/// The two device endpoints the console consumes.
///
/// Futures are not required to be `Send`: everything runs on one thread.
#[allow(async_fn_in_trait)]
pub trait DeviceApi {
    /// `GET /api/status`, returning the raw JSON body.
    async fn fetch_status(&self) -> Result<String, TransportError>;

    /// `POST /api/control`. Any non-success status is an error.
    async fn send_control(&self, command: &ControlCommand) -> Result<(), TransportError>;
}

pub struct HttpDeviceApi {
    client: Client,
    status_url: String,
    control_url: String,
}

impl HttpDeviceApi {
    /// `timeout` of `None` keeps the transport default.
    pub fn new(device_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base = device_url.trim_end_matches('/');
        Ok(Self {
            client: make_client(timeout)?,
            status_url: format!("{}{}", base, STATUS_PATH),
            control_url: format!("{}{}", base, CONTROL_PATH),
        })
    }
}

fn make_client(timeout: Option<Duration>) -> Result<Client, TransportError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

fn log_request(method: &str, url: &str, status: StatusCode) {
    if debug_flags::is_on(&DEBUG_HTTP) {
        info!("HTTP {} {} -> status {}", method, url, status.as_u16());
    } else {
        debug!("HTTP {} {} -> status {}", method, url, status.as_u16());
    }
}

/// Read the body chunk by chunk, giving up as soon as it outgrows the cap.
async fn read_capped(mut response: Response) -> Result<String, TransportError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > MAX_RESPONSE_SIZE {
            return Err(TransportError::TooLarge(MAX_RESPONSE_SIZE));
        }
        body.extend_from_slice(&chunk);
    }
    String::from_utf8(body).map_err(|_| TransportError::NotUtf8)
}

impl DeviceApi for HttpDeviceApi {
    async fn fetch_status(&self) -> Result<String, TransportError> {
        let response = self.client.get(&self.status_url).send().await?;

        let status = response.status();
        log_request("GET", &self.status_url, status);
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_RESPONSE_SIZE as u64)
        {
            return Err(TransportError::TooLarge(MAX_RESPONSE_SIZE));
        }

        let body = read_capped(response).await?;
        if !body.trim_start().starts_with('{') {
            return Err(TransportError::NotJson);
        }
        Ok(body)
    }

    async fn send_control(&self, command: &ControlCommand) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.control_url)
            .json(command)
            .send()
            .await?;

        let status = response.status();
        log_request("POST", &self.control_url, status);
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(())
    }
}
