use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The subset of an OpenRTB bid request the optimization rules read and rewrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BidRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imp: Vec<Imp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<RequestExt>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Imp {
    #[serde(default)]
    pub id: String,
    /// Bidders addressed by this impression (`imp.ext.prebid.bidder`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bidders: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Geo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Site {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct App {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestExt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prebid: Option<PrebidExt>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrebidExt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
}

/// Integration channel reported in `ext.prebid.channel` (`"amp"`, `"web"`, `"app"`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Mutable view over one in-flight bid request.
///
/// The wrapper is owned by the request pipeline; rules borrow it for a single evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestWrapper {
    pub bid_request: BidRequest,
    /// Datacenter serving the request, supplied by the host.
    pub data_center: Option<String>,
    excluded_bidders: BTreeSet<String>,
}

impl RequestWrapper {
    pub fn new(bid_request: BidRequest) -> Self {
        Self {
            bid_request,
            data_center: None,
            excluded_bidders: BTreeSet::new(),
        }
    }

    pub fn with_data_center(mut self, data_center: impl Into<String>) -> Self {
        self.data_center = Some(data_center.into());
        self
    }

    fn geo(&self) -> Option<&Geo> {
        self.bid_request.device.as_ref()?.geo.as_ref()
    }

    pub fn device_country(&self) -> Option<&str> {
        self.geo()?.country.as_deref()
    }

    pub fn device_region(&self) -> Option<&str> {
        self.geo()?.region.as_deref()
    }

    pub fn device_city(&self) -> Option<&str> {
        self.geo()?.city.as_deref()
    }

    pub fn device_ip(&self) -> Option<&str> {
        self.bid_request.device.as_ref()?.ip.as_deref()
    }

    /// Overwrite `device.ip`, creating the device object if the request has none.
    pub fn set_device_ip(&mut self, ip: impl Into<String>) {
        self.bid_request
            .device
            .get_or_insert_with(Device::default)
            .ip = Some(ip.into());
    }

    /// Name from `ext.prebid.channel`, if one was reported.
    pub fn channel_name(&self) -> Option<&str> {
        let name = &self.bid_request.ext.as_ref()?.prebid.as_ref()?.channel.as_ref()?.name;
        (!name.is_empty()).then_some(name.as_str())
    }

    /// Distinct bidders addressed by any impression.
    pub fn bidders(&self) -> BTreeSet<&str> {
        self.bid_request
            .imp
            .iter()
            .flat_map(|imp| imp.bidders.iter().map(String::as_str))
            .collect()
    }

    pub fn exclude_bidder(&mut self, bidder: impl Into<String>) {
        self.excluded_bidders.insert(bidder.into());
    }

    pub fn is_bidder_excluded(&self, bidder: &str) -> bool {
        self.excluded_bidders.contains(bidder)
    }

    /// Bidders the pipeline must drop from the auction.
    pub fn excluded_bidders(&self) -> &BTreeSet<String> {
        &self.excluded_bidders
    }
}

impl From<BidRequest> for RequestWrapper {
    fn from(bid_request: BidRequest) -> Self {
        Self::new(bid_request)
    }
}
