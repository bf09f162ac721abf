//! # Simulator Module
//!
//! Synthetic weather frames for running without sensor hardware.
//!
//! Simulated frames skip the synchronizer and the ingestion queue: each one is
//! checksum-validated and processed directly on the simulator task.

pub mod console;
pub mod generator;

use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::frame::checksum;
use crate::processor::{EngineeringReading, FrameProcessor};
pub use console::{ConsoleCommand, ConsoleReader, HELP_TEXT};
pub use generator::{FrameSimulator, SimulatorState};

/// Periodic simulator task state
#[derive(Debug)]
pub struct SimulatorRunner<R: Rng> {
    simulator: FrameSimulator<R>,
    processor: FrameProcessor,
    enabled: bool,
    interval: Duration,
}

impl<R: Rng> SimulatorRunner<R> {
    /// Create a runner generating one frame per `interval` while enabled
    pub fn new(
        simulator: FrameSimulator<R>,
        processor: FrameProcessor,
        enabled: bool,
        interval: Duration,
    ) -> Self {
        Self {
            simulator,
            processor,
            enabled,
            interval,
        }
    }

    /// Whether periodic generation is on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip periodic generation on or off
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        info!(
            "Simulator {}",
            if self.enabled { "enabled" } else { "disabled" }
        );
        self.enabled
    }

    /// Apply a console command, returning the text to show the operator
    pub fn handle_command(&mut self, command: ConsoleCommand) -> String {
        match command {
            ConsoleCommand::ToggleSimulator => {
                let enabled = self.toggle();
                format!("Simulator {}", if enabled { "ON" } else { "OFF" })
            }
            ConsoleCommand::Help => HELP_TEXT.to_string(),
            ConsoleCommand::Reset => {
                self.simulator.reset();
                info!("Simulator state reset");
                "Simulator state reset".to_string()
            }
            ConsoleCommand::Status => self.status(),
            ConsoleCommand::Unknown(c) => {
                format!("Unknown command '{}' (press h for help)", c.escape_default())
            }
        }
    }

    /// One-line status summary
    pub fn status(&self) -> String {
        let state = self.simulator.state();
        let stats = self.processor.stats();
        format!(
            "Simulator {} | {} frames generated, {} processed | T={:.2}C P={:.1}hPa Dir={:.1}deg",
            if self.enabled { "ON" } else { "OFF" },
            self.simulator.generated(),
            stats.processed,
            state.temperature_c,
            state.pressure_hpa,
            state.wind_direction_deg
        )
    }

    /// Generate and process one frame if enabled
    ///
    /// Returns the processed reading, or `None` when disabled or the frame was
    /// rejected.
    pub fn tick(&mut self) -> Option<EngineeringReading> {
        if !self.enabled {
            return None;
        }

        let frame = match self.simulator.generate_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Simulator failed to encode frame: {}", e);
                return None;
            }
        };

        if let Err(e) = checksum::verify(&frame) {
            warn!("Simulated frame rejected: {}", e);
            return None;
        }

        self.processor.process(&frame).ok()
    }

    /// Poll console commands and generate frames until the task is cancelled
    pub async fn run(mut self, mut console: ConsoleReader) {
        info!(
            "Simulator task started ({}, every {} ms)",
            if self.enabled { "enabled" } else { "disabled" },
            self.interval.as_millis()
        );

        loop {
            while let Some(command) = console.poll() {
                println!("{}", self.handle_command(command));
            }

            self.tick();
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::MockStorageAdapter;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn runner(storage: MockStorageAdapter, enabled: bool) -> SimulatorRunner<StdRng> {
        SimulatorRunner::new(
            FrameSimulator::new(StdRng::seed_from_u64(9)),
            FrameProcessor::new(Arc::new(storage), "WX-SIM"),
            enabled,
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_tick_disabled_does_nothing() {
        let mut storage = MockStorageAdapter::new();
        storage.expect_insert().times(0);

        let mut runner = runner(storage, false);
        assert!(runner.tick().is_none());
    }

    #[test]
    fn test_tick_enabled_processes_frame() {
        let mut storage = MockStorageAdapter::new();
        storage
            .expect_insert()
            .withf(|record| record.identity == "WX-SIM")
            .times(3)
            .returning(|_| Ok(()));

        let mut runner = runner(storage, true);
        for _ in 0..3 {
            let reading = runner.tick().unwrap();
            assert!((-10.0..=50.0).contains(&reading.temperature_c));
        }
    }

    #[test]
    fn test_toggle_command() {
        let mut storage = MockStorageAdapter::new();
        storage.expect_insert().times(1).returning(|_| Ok(()));

        let mut runner = runner(storage, false);
        assert_eq!(runner.handle_command(ConsoleCommand::ToggleSimulator), "Simulator ON");
        assert!(runner.is_enabled());
        assert!(runner.tick().is_some());

        assert_eq!(runner.handle_command(ConsoleCommand::ToggleSimulator), "Simulator OFF");
        assert!(runner.tick().is_none());
    }

    #[test]
    fn test_reset_command() {
        let mut storage = MockStorageAdapter::new();
        storage.expect_insert().returning(|_| Ok(()));

        let mut runner = runner(storage, true);
        for _ in 0..5 {
            runner.tick();
        }

        runner.handle_command(ConsoleCommand::Reset);
        assert!(runner.status().contains("0 frames generated"));
        assert!(runner.status().contains("T=20.00C"));
    }

    #[test]
    fn test_help_and_unknown_commands() {
        let mut runner = runner(MockStorageAdapter::new(), false);
        assert_eq!(runner.handle_command(ConsoleCommand::Help), HELP_TEXT);

        let reply = runner.handle_command(ConsoleCommand::Unknown('x'));
        assert!(reply.contains("'x'"));
    }

    #[test]
    fn test_status_command() {
        let mut runner = runner(MockStorageAdapter::new(), false);
        let reply = runner.handle_command(ConsoleCommand::Status);
        assert!(reply.starts_with("Simulator OFF"));
        assert!(reply.contains("0 frames generated"));
    }
}
