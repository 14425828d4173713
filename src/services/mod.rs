pub mod dashboard;
pub mod market_data;
pub mod refresh_service;
pub mod stock_service;
