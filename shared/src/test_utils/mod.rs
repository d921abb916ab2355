pub mod http_test_utils;
pub mod mock_wish_store;
pub mod test_logging;
