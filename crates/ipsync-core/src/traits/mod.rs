//! Core traits for ipsync
//!
//! - [`DnsProvider`]: Talk to a DNS hosting provider's API

pub mod dns_provider;

pub use dns_provider::DnsProvider;
