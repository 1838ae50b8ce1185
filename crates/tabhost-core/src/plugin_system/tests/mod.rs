pub mod support;
pub mod registry_tests;
pub mod discovery_tests;
