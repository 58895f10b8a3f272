#![no_main]

use libfuzzer_sys::fuzz_target;
use testbox::OrchestratorConfig;
use testbox_manifest::Manifest;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Any manifest that parses must configure without panicking
        if let Ok(manifest) = Manifest::parse(s) {
            let config = OrchestratorConfig::from_manifest(&manifest, std::env::temp_dir().join("testbox-fuzz"));
            let _ = testbox::configure(&manifest, config);
        }
    }
});
