pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod health;
pub mod lexicon;
pub mod model;
pub mod payload;
pub mod preprocess;
pub mod service;
pub mod ui;
pub mod validator;
