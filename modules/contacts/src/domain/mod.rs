pub mod account;
pub mod error;
pub mod events;
pub mod filter;
pub mod mapper;
pub mod messages;
pub mod ports;
pub mod service;
pub mod validation;
pub mod view_model;
