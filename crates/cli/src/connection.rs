use serde::Serialize;
use serde::de::DeserializeOwned;

use gateway_core::{CallContext, ErrorBody, GatewayError, REQUEST_TIMEOUT_HEADER};

use crate::error::CliError;

/// Where and how to reach the gateway.
#[derive(Debug, Clone)]
pub struct Connection {
    address: String,
    port: u16,
    insecure: bool,
    http: reqwest::Client,
}

impl Connection {
    /// `insecure` selects plain HTTP instead of HTTPS.
    pub fn new(address: &str, port: u16, insecure: bool) -> Result<Self, CliError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CliError::invalid(
                "address",
                "must be set with --address or `option set --key address`",
            ));
        }
        if port == 0 {
            return Err(CliError::invalid("port", "must be a valid port number"));
        }

        Ok(Self {
            address: address.to_string(),
            port,
            insecure,
            http: reqwest::Client::new(),
        })
    }

    /// Port used when none is given or stored.
    pub fn default_port(insecure: bool) -> u16 {
        if insecure { 80 } else { 443 }
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.insecure { "http" } else { "https" };
        format!("{scheme}://{}:{}", self.address, self.port)
    }

    /// POST `body` as JSON carrying the context's metadata and deadline.
    pub async fn post<Req, Resp>(&self, ctx: &CallContext, path: &str, body: &Req) -> Result<Resp, CliError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut request = self.http.post(format!("{}{}", self.base_url(), path)).json(body);
        if let Some(metadata) = ctx.metadata() {
            for (name, value) in metadata.iter() {
                request = request.header(name, value);
            }
        }
        if let Some(remaining) = ctx.remaining() {
            request = request
                .timeout(remaining)
                .header(REQUEST_TIMEOUT_HEADER, remaining.as_millis().to_string());
        }

        tracing::debug!(url = %self.base_url(), path, "sending request");
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::deadline_exceeded("deadline exceeded").with_source(e)
            } else {
                GatewayError::internal("cannot reach gateway").with_source(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Resp>()
                .await
                .map_err(|e| GatewayError::internal("malformed gateway response").with_source(e).into());
        }

        let body = response.json::<ErrorBody>().await.ok();
        Err(GatewayError::from_wire(status.as_u16(), body).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_follows_transport() {
        let conn = Connection::new("gateway.example", 8443, false).unwrap();
        assert_eq!(conn.base_url(), "https://gateway.example:8443");

        let conn = Connection::new(" localhost ", 8080, true).unwrap();
        assert_eq!(conn.base_url(), "http://localhost:8080");
    }

    #[test]
    fn blank_address_is_rejected() {
        assert!(matches!(
            Connection::new("", 8080, true),
            Err(CliError::InvalidArgument { field: "address", .. })
        ));
        assert!(matches!(
            Connection::new("localhost", 0, true),
            Err(CliError::InvalidArgument { field: "port", .. })
        ));
    }
}
