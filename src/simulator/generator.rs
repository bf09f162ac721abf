//! # Frame Generator
//!
//! Produces synthetic, checksum-valid weather frames by random walk.
//!
//! | Quantity | Step per frame | Range |
//! |----------|----------------|-------|
//! | Temperature | ±0.5 °C | -10.0 to 50.0 °C |
//! | Pressure | ±0.2 hPa | 950.0 to 1050.0 hPa |
//! | Wind direction | +0.0 to +5.0° | wraps at 360° |
//! | Wind speed | redrawn | 0 to 2500 |
//! | Voltage | redrawn | 100 to 130 mV |
//!
//! The wire format carries unsigned fields only, so temperatures below 0 °C are
//! encoded as ADC 0.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::Result;
use crate::frame::checksum::compute_checksum;
use crate::frame::protocol::{RawFrame, END_MARKER, START_MARKER};
use crate::processor::{PRESSURE_SCALE, TEMPERATURE_SCALE, WIND_DIRECTION_SCALE};

/// Temperature limits in °C
pub const TEMPERATURE_RANGE_C: RangeInclusive<f64> = -10.0..=50.0;

/// Largest temperature change per frame in °C
pub const TEMPERATURE_STEP_C: f64 = 0.5;

/// Pressure limits in hPa
pub const PRESSURE_RANGE_HPA: RangeInclusive<f64> = 950.0..=1050.0;

/// Largest pressure change per frame in hPa
pub const PRESSURE_STEP_HPA: f64 = 0.2;

/// Largest wind direction advance per frame in degrees
pub const WIND_DIRECTION_STEP_DEG: f64 = 5.0;

/// Wind speed draw range (raw units)
pub const WIND_SPEED_RANGE: RangeInclusive<u32> = 0..=2500;

/// Voltage draw range in mV
pub const VOLTAGE_RANGE_MV: RangeInclusive<u32> = 100..=130;

/// Values carried from one generated frame to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorState {
    pub temperature_c: f64,
    pub pressure_hpa: f64,
    pub wind_direction_deg: f64,
    pub wind_speed: u32,
    pub voltage_mv: u32,
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self {
            temperature_c: 20.0,
            pressure_hpa: 1013.2,
            wind_direction_deg: 0.0,
            wind_speed: 0,
            voltage_mv: 115,
        }
    }
}

/// Synthetic frame source
#[derive(Debug)]
pub struct FrameSimulator<R: Rng> {
    rng: R,
    state: SimulatorState,
    generated: u64,
}

impl<R: Rng> FrameSimulator<R> {
    /// Create a simulator starting from [`SimulatorState::default`]
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            state: SimulatorState::default(),
            generated: 0,
        }
    }

    /// Values used for the most recent frame
    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    /// Frames generated since creation or the last reset
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Return to the initial values
    pub fn reset(&mut self) {
        self.state = SimulatorState::default();
        self.generated = 0;
    }

    /// Advance the random walk and encode the next frame
    ///
    /// # Errors
    ///
    /// Only fails if the encoded frame does not decode, which would be a bug in
    /// the encoder.
    pub fn generate_frame(&mut self) -> Result<RawFrame> {
        self.step();
        let frame = encode_frame(&self.state)?;
        self.generated += 1;
        Ok(frame)
    }

    fn step(&mut self) {
        let state = &mut self.state;

        state.temperature_c = (state.temperature_c
            + self.rng.gen_range(-TEMPERATURE_STEP_C..=TEMPERATURE_STEP_C))
        .clamp(*TEMPERATURE_RANGE_C.start(), *TEMPERATURE_RANGE_C.end());

        state.pressure_hpa = (state.pressure_hpa
            + self.rng.gen_range(-PRESSURE_STEP_HPA..=PRESSURE_STEP_HPA))
        .clamp(*PRESSURE_RANGE_HPA.start(), *PRESSURE_RANGE_HPA.end());

        state.wind_direction_deg =
            (state.wind_direction_deg + self.rng.gen_range(0.0..WIND_DIRECTION_STEP_DEG)) % 360.0;

        state.wind_speed = self.rng.gen_range(WIND_SPEED_RANGE);
        state.voltage_mv = self.rng.gen_range(VOLTAGE_RANGE_MV);
    }
}

/// Convert a value to its unsigned wire representation
fn to_counts(value: f64, scale: f64) -> u32 {
    (value / scale).round().max(0.0) as u32
}

/// Encode a state as a complete frame, checksum included
pub fn encode_frame(state: &SimulatorState) -> Result<RawFrame> {
    let data = format!(
        "{}{:05}.{:05}.{:04}.{:05}.{:03}",
        String::from_utf8_lossy(START_MARKER),
        to_counts(state.temperature_c, TEMPERATURE_SCALE),
        to_counts(state.pressure_hpa, PRESSURE_SCALE),
        to_counts(state.wind_direction_deg, WIND_DIRECTION_SCALE) % 3600,
        state.wind_speed,
        state.voltage_mv
    );

    let checksum = compute_checksum(data.as_bytes())?;

    format!(
        "{}.{:04X}{}",
        data,
        checksum,
        String::from_utf8_lossy(END_MARKER)
    )
    .parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::checksum::validate;
    use crate::frame::fields::parse_fields;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn simulator(seed: u64) -> FrameSimulator<StdRng> {
        FrameSimulator::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_encode_default_state() {
        let frame = encode_frame(&SimulatorState::default()).unwrap();
        assert_eq!(frame.to_string(), "UUU$02000.10132.0000.00000.115.2FD7*QQQ");
        assert!(validate(&frame));
    }

    #[test]
    fn test_encode_negative_temperature_as_zero() {
        let state = SimulatorState {
            temperature_c: -5.0,
            ..SimulatorState::default()
        };
        let frame = encode_frame(&state).unwrap();
        let fields = parse_fields(frame.as_bytes(), 6).unwrap();
        assert_eq!(fields.temperature_adc, 0);
        assert!(validate(&frame));
    }

    #[test]
    fn test_generated_frames_always_validate() {
        for seed in 0..8 {
            let mut sim = simulator(seed);
            for _ in 0..500 {
                let frame = sim.generate_frame().unwrap();
                assert!(validate(&frame), "Invalid simulated frame: {}", frame);
                assert!(frame.is_delimited());
            }
        }
    }

    #[test]
    fn test_random_walk_stays_in_bounds() {
        let mut sim = simulator(7);
        let mut previous = *sim.state();

        for _ in 0..5_000 {
            sim.generate_frame().unwrap();
            let state = *sim.state();

            assert!(TEMPERATURE_RANGE_C.contains(&state.temperature_c));
            assert!(PRESSURE_RANGE_HPA.contains(&state.pressure_hpa));
            assert!((0.0..360.0).contains(&state.wind_direction_deg));
            assert!(WIND_SPEED_RANGE.contains(&state.wind_speed));
            assert!(VOLTAGE_RANGE_MV.contains(&state.voltage_mv));

            assert!((state.temperature_c - previous.temperature_c).abs() <= TEMPERATURE_STEP_C + 1e-9);
            assert!((state.pressure_hpa - previous.pressure_hpa).abs() <= PRESSURE_STEP_HPA + 1e-9);
            previous = state;
        }
    }

    #[test]
    fn test_wind_direction_advances_and_wraps() {
        let mut sim = simulator(3);
        let mut wrapped = false;
        let mut previous = sim.state().wind_direction_deg;

        for _ in 0..1_000 {
            sim.generate_frame().unwrap();
            let current = sim.state().wind_direction_deg;
            if current < previous {
                wrapped = true;
                assert!(previous + WIND_DIRECTION_STEP_DEG >= 360.0);
            }
            previous = current;
        }

        // 1000 steps averaging 2.5 degrees cover several full turns
        assert!(wrapped);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = simulator(42);
        let mut b = simulator(42);
        for _ in 0..20 {
            assert_eq!(a.generate_frame().unwrap(), b.generate_frame().unwrap());
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut sim = simulator(1);
        for _ in 0..10 {
            sim.generate_frame().unwrap();
        }
        assert_eq!(sim.generated(), 10);

        sim.reset();
        assert_eq!(sim.generated(), 0);
        assert_eq!(*sim.state(), SimulatorState::default());
    }
}
