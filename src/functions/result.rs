use std::net::IpAddr;

use serde::Deserialize;

use crate::{functions::ResultFunction, Error, RequestWrapper, Result};

/// Overwrites `device.ip` with a configured literal.
#[derive(Debug, Clone)]
pub struct SetDeviceIp {
    ip: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SetDeviceIpArgs {
    Literal(String),
    Object { ip: String },
}

impl SetDeviceIp {
    pub const NAME: &'static str = "setDeviceIP";

    /// Accepts `{"ip": "..."}` or a bare JSON string.
    pub fn new(args: &serde_json::Value) -> Result<Self> {
        let ip = match SetDeviceIpArgs::deserialize(args) {
            Ok(SetDeviceIpArgs::Literal(ip)) | Ok(SetDeviceIpArgs::Object { ip }) => ip,
            Err(_) => {
                return Err(Error::invalid_args(
                    Self::NAME,
                    "expected {\"ip\": \"<address>\"}",
                ))
            }
        };
        ip.parse::<IpAddr>()
            .map_err(|err| Error::invalid_args(Self::NAME, format!("{ip:?}: {err}")))?;
        Ok(Self { ip })
    }
}

impl ResultFunction for SetDeviceIp {
    fn apply(&self, request: &mut RequestWrapper) -> Result<()> {
        request.set_device_ip(self.ip.clone());
        Ok(())
    }
}

/// Adds the configured bidders to the request's exclusion list.
#[derive(Debug, Clone)]
pub struct ExcludeBidders {
    bidders: Vec<String>,
}

#[derive(Deserialize)]
struct ExcludeBiddersArgs {
    bidders: Vec<String>,
}

impl ExcludeBidders {
    pub const NAME: &'static str = "excludeBidders";

    pub fn new(args: &serde_json::Value) -> Result<Self> {
        let ExcludeBiddersArgs { bidders } = ExcludeBiddersArgs::deserialize(args)
            .map_err(|err| Error::invalid_args(Self::NAME, err))?;
        if bidders.is_empty() {
            return Err(Error::invalid_args(Self::NAME, "no bidders listed"));
        }
        Ok(Self { bidders })
    }
}

impl ResultFunction for ExcludeBidders {
    fn apply(&self, request: &mut RequestWrapper) -> Result<()> {
        for bidder in &self.bidders {
            request.exclude_bidder(bidder.as_str());
        }
        Ok(())
    }
}
