//! Integration tests for CLOB (Central Limit Order Book) API
//!
//! These tests require valid API credentials and interact with the real Polymarket API.
//! They are marked with #[ignore] and should be run explicitly:
//!
//! ```bash
//! # Set credentials first
//! export PRIVATE_KEY="0x..."
//! export API_KEY="..."
//! export API_SECRET="..."
//! export API_PASSPHRASE="..."
//!
//! # Run integration tests
//! cargo test -p polymarket --test integration_clob -- --ignored
//! ```
//!
//! NOTE: These are placeholder tests that demonstrate the test structure.
//! You may need to adjust the TradingClient initialization based on the actual API.

mod common;

use std::env;

/// Macro for verbose test output
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Check if API credentials are available
fn has_credentials() -> bool {
    env::var("PRIVATE_KEY").is_ok()
        && env::var("API_KEY").is_ok()
        && env::var("API_SECRET").is_ok()
        && env::var("API_PASSPHRASE").is_ok()
}

/// Skip test if no credentials
macro_rules! require_credentials {
    () => {
        if !has_credentials() {
            println!("⚠️  Skipping: API credentials not available");
            println!("   Set PRIVATE_KEY, API_KEY, API_SECRET, API_PASSPHRASE");
            return;
        }
    };
}

// ============================================================================
// Credential Validation Tests
// ============================================================================

#[test]
fn test_credentials_format_validation() {
    verbose_println!("Testing credentials format validation...");

    // Private key should be 66 characters (0x + 64 hex)
    let valid_pk = "0x0000000000000000000000000000000000000000000000000000000000000001";
    assert_eq!(valid_pk.len(), 66, "Private key should be 66 chars");
    assert!(valid_pk.starts_with("0x"), "Private key should start with 0x");

    // API key format (UUID-like)
    let example_api_key = "12345678-1234-1234-1234-123456789012";
    assert!(example_api_key.contains('-'), "API key should contain dashes");

    verbose_println!("  Credential format validation passed");
}

#[test]
fn test_env_var_loading() {
    verbose_println!("Testing environment variable loading...");

    // This test always passes but logs the credential status
    let has_pk = env::var("PRIVATE_KEY").is_ok();
    let has_key = env::var("API_KEY").is_ok();
    let has_secret = env::var("API_SECRET").is_ok();
    let has_pass = env::var("API_PASSPHRASE").is_ok();

    verbose_println!("  PRIVATE_KEY: {}", if has_pk { "set" } else { "not set" });
    verbose_println!("  API_KEY: {}", if has_key { "set" } else { "not set" });
    verbose_println!("  API_SECRET: {}", if has_secret { "set" } else { "not set" });
    verbose_println!("  API_PASSPHRASE: {}", if has_pass { "set" } else { "not set" });

    if has_pk && has_key && has_secret && has_pass {
        verbose_println!("  All credentials available - integration tests can run");
    } else {
        verbose_println!("  Some credentials missing - integration tests will be skipped");
    }
}

// ============================================================================
// Integration Test Placeholders
// ============================================================================

/// Test USD balance query
///
/// This test requires:
/// - Valid API credentials in environment
/// - Network access to Polymarket CLOB
#[tokio::test]
#[ignore]
async fn test_get_usd_balance() {
    require_credentials!();
    verbose_println!("Testing USD balance query...");

    // Load .env if available
    let _ = dotenv::dotenv();

    // TODO: Initialize TradingClient with correct signature
    // The actual initialization depends on the TradingClient::new signature
    // which may have changed. Check infrastructure/client/clob/trading.rs

    verbose_println!("  Balance query test placeholder");
    verbose_println!("  Implement with correct TradingClient initialization");
}

/// Test open orders query
#[tokio::test]
#[ignore]
async fn test_get_open_orders() {
    require_credentials!();
    verbose_println!("Testing open orders query...");

    let _ = dotenv::dotenv();

    // TODO: Initialize TradingClient and query orders
    verbose_println!("  Open orders query test placeholder");
}

/// Test order placement and cancellation lifecycle
#[tokio::test]
#[ignore]
async fn test_order_lifecycle() {
    require_credentials!();
    verbose_println!("Testing order lifecycle...");

    let _ = dotenv::dotenv();

    // TODO: Place a low-price order, verify it's open, cancel it
    verbose_println!("  Order lifecycle test placeholder");
}

/// Test cancel all orders
#[tokio::test]
#[ignore]
async fn test_cancel_all() {
    require_credentials!();
    verbose_println!("Testing cancel all...");

    let _ = dotenv::dotenv();

    // TODO: Cancel all open orders
    verbose_println!("  Cancel all test placeholder");
}

/// Test CLOB API health
#[tokio::test]
#[ignore]
async fn test_clob_health() {
    require_credentials!();
    verbose_println!("Testing CLOB health...");

    let _ = dotenv::dotenv();

    // TODO: Make a simple API call to verify connectivity
    verbose_println!("  CLOB health test placeholder");
}

// ============================================================================
// Mock Tests (Run without credentials)
// ============================================================================

#[test]
fn test_order_placement_response_parsing() {
    verbose_println!("Testing order placement response parsing...");

    // Test parsing of order placement response structure
    let success_response = serde_json::json!({
        "success": true,
        "orderID": "0x123abc",
        "errorMsg": null
    });

    let success = success_response["success"].as_bool().unwrap_or(false);
    let order_id = success_response["orderID"].as_str();

    assert!(success, "Success should be true");
    assert_eq!(order_id, Some("0x123abc"), "Order ID should be present");

    verbose_println!("  Response parsing passed");
}

#[test]
fn test_cancel_response_parsing() {
    verbose_println!("Testing cancel response parsing...");

    let response = serde_json::json!({
        "canceled": ["0x123", "0x456"],
        "not_canceled": []
    });

    let canceled = response["canceled"].as_array().map(|a| a.len()).unwrap_or(0);
    let not_canceled = response["not_canceled"]
        .as_array()
        .map(|a| a.len())
        .unwrap_or(0);

    assert_eq!(canceled, 2, "Should have 2 canceled orders");
    assert_eq!(not_canceled, 0, "Should have 0 not_canceled orders");

    verbose_println!("  Cancel response parsing passed");
}

#[test]
fn test_balance_response_parsing() {
    verbose_println!("Testing balance response parsing...");

    let response = serde_json::json!({
        "balance": "1234.56"
    });

    let balance_str = response["balance"].as_str().unwrap_or("0");
    let balance: f64 = balance_str.parse().unwrap_or(0.0);

    assert!((balance - 1234.56).abs() < 0.01, "Balance should parse correctly");

    verbose_println!("  Balance parsing passed");
}
