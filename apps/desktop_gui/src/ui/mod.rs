pub mod app;

pub use app::ScoreTrackerApp;
