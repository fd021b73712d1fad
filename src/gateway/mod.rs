//! SMS gateway integration

pub mod client;

pub use client::{GatewayError, RegisteredWebhook, SmsGatewayClient, SmsGatewayConfig};
