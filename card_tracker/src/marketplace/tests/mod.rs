//! Unit tests for the marketplace client.


use super::MarketplaceClient;
use crate::config::EbayCredentials;

/// Creates a MarketplaceClient pointing at the given mock server.
pub(super) fn client_with_mock(mock_uri: &str) -> MarketplaceClient {
    MarketplaceClient::new(Some(EbayCredentials {
        client_id: "test_id".to_string(),
        client_secret: "test_secret".to_string(),
    }))
    .with_base_url(mock_uri)
}
