//! Fuzz target: `SystemConfig::from_json`
//!
//! Feeds arbitrary bytes to the configuration loader and verifies:
//! - No panics on malformed or hostile JSON
//! - Anything accepted also passes `validate()` and can start a service
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use hwc_heatpump::app::service::AppService;
use hwc_heatpump::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(config) = SystemConfig::from_json(text) {
        assert!(config.validate().is_ok(), "from_json accepted an invalid config");
        assert!(config.duty_minimum > 0.0 && config.duty_maximum < 1.0);
        assert!(AppService::new(config).is_ok());
    }
});
