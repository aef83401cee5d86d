pub mod api_router;
pub mod catalog;
pub mod config;
pub mod leads;
pub mod leather;
pub mod listing;
pub mod media;
pub mod messages;
pub mod payments;
pub mod shared;
pub mod shipping;
pub mod taxonomy;
