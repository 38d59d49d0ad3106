use std::collections::HashSet;

use crate::{
    functions::{bool_outcome, SchemaFunction, OUTCOME_WILDCARD},
    Error, RequestWrapper, Result,
};

/// Exact, case-sensitive set of configured values.
#[derive(Debug, Clone)]
struct ValueSet(HashSet<String>);

impl ValueSet {
    fn from_args(function: &str, args: &[String]) -> Result<Self> {
        if args.is_empty() {
            return Err(Error::invalid_args(function, "expected at least one value"));
        }
        Ok(Self(args.iter().cloned().collect()))
    }

    fn outcome(&self, value: Option<&str>) -> String {
        bool_outcome(value.is_some_and(|v| self.0.contains(v)))
    }
}

/// `"true"` if `device.geo.country` is one of the configured codes.
#[derive(Debug, Clone)]
pub struct DeviceCountry {
    countries: ValueSet,
}

impl DeviceCountry {
    pub const NAME: &'static str = "deviceCountry";

    pub fn new(countries: &[String]) -> Result<Self> {
        Ok(Self {
            countries: ValueSet::from_args(Self::NAME, countries)?,
        })
    }
}

impl SchemaFunction for DeviceCountry {
    fn call(&self, request: &RequestWrapper) -> Result<String> {
        Ok(self.countries.outcome(request.device_country()))
    }
}

/// `"true"` if `device.geo.region` is one of the configured regions.
#[derive(Debug, Clone)]
pub struct DeviceRegion {
    regions: ValueSet,
}

impl DeviceRegion {
    pub const NAME: &'static str = "deviceRegion";

    pub fn new(regions: &[String]) -> Result<Self> {
        Ok(Self {
            regions: ValueSet::from_args(Self::NAME, regions)?,
        })
    }
}

impl SchemaFunction for DeviceRegion {
    fn call(&self, request: &RequestWrapper) -> Result<String> {
        Ok(self.regions.outcome(request.device_region()))
    }
}

/// `"true"` if `device.geo.city` is one of the configured cities.
#[derive(Debug, Clone)]
pub struct DeviceCity {
    cities: ValueSet,
}

impl DeviceCity {
    pub const NAME: &'static str = "deviceCity";

    pub fn new(cities: &[String]) -> Result<Self> {
        Ok(Self {
            cities: ValueSet::from_args(Self::NAME, cities)?,
        })
    }
}

impl SchemaFunction for DeviceCity {
    fn call(&self, request: &RequestWrapper) -> Result<String> {
        Ok(self.cities.outcome(request.device_city()))
    }
}

/// `"true"` if the serving datacenter is one of the configured names.
#[derive(Debug, Clone)]
pub struct DataCenters {
    data_centers: ValueSet,
}

impl DataCenters {
    pub const NAME: &'static str = "dataCenters";

    pub fn new(data_centers: &[String]) -> Result<Self> {
        Ok(Self {
            data_centers: ValueSet::from_args(Self::NAME, data_centers)?,
        })
    }
}

impl SchemaFunction for DataCenters {
    fn call(&self, request: &RequestWrapper) -> Result<String> {
        Ok(self.data_centers.outcome(request.data_center.as_deref()))
    }
}

/// Integration channel of the request.
///
/// Uses the reported `ext.prebid.channel` name first, then falls back to `"app"` or `"web"`
/// depending on which distribution object is present, and to `"*"` otherwise.
#[derive(Debug, Clone, Default)]
pub struct Channel;

impl Channel {
    pub const NAME: &'static str = "channel";

    pub fn new(args: &[String]) -> Result<Self> {
        if !args.is_empty() {
            return Err(Error::invalid_args(Self::NAME, "takes no arguments"));
        }
        Ok(Self)
    }
}

impl SchemaFunction for Channel {
    fn call(&self, request: &RequestWrapper) -> Result<String> {
        let channel = if let Some(name) = request.channel_name() {
            name
        } else if request.bid_request.app.is_some() {
            "app"
        } else if request.bid_request.site.is_some() {
            "web"
        } else {
            OUTCOME_WILDCARD
        };
        Ok(channel.to_owned())
    }
}
