use prebid_optimization::{BidRequest, ModuleConfig, RequestWrapper};

pub fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/data/rules/default.json".to_owned());
    let data = std::fs::read(&path).unwrap();

    let module = ModuleConfig::new().to_module();
    module.load_configuration(&data).unwrap();

    let bid_request: BidRequest = serde_json::from_str(
        r#"
          {
            "id": "demo",
            "imp": [{"id": "1", "bidders": ["bidderA", "bidderB"]}],
            "device": {"ip": "10.0.0.1", "geo": {"country": "USA"}},
            "site": {"domain": "example.com"}
          }
        "#,
    )
    .unwrap();
    let mut request = RequestWrapper::new(bid_request).with_data_center("eu-central");

    module.execute(&mut request).unwrap();

    println!("device ip: {:?}", request.device_ip());
    println!("excluded bidders: {:?}", request.excluded_bidders());
}
