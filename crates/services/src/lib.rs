#![forbid(unsafe_code)]

pub mod app_services;
pub mod asset;
pub mod catalog;
pub mod error;
pub mod ports;
pub mod quiz;

pub use geoquiz_core::Clock;

pub use app_services::{AppConfig, AppServices};
pub use asset::RegionAssetLoader;
pub use catalog::{load_catalog, parse_catalog};
pub use error::{AppServicesError, AssetLoadError, CatalogConfigError, QuizError};
pub use ports::{
    AnswerFeedback, PresentationPort, Telemetry, TelemetryError, TelemetryEvent, TracingTelemetry,
};
pub use quiz::{AnswerOutcome, NextStep, QuizLoopService, QuizPhase, QuizSession};
