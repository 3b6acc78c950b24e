mod app;
mod config;
mod engine;
mod error;
mod library;
mod logging;
mod metadata;
mod player;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
