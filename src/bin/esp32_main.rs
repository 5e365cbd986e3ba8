//! ESP32 greenhouse remote I/O board: light-position controller.
//!
//! This is the main entry point for the physical hardware. It runs a 1kHz
//! loop that:
//! - Samples the actuator encoder
//! - Runs the light-position service (the manager throttles itself to 150ms)
//! - Persists the position to NVS whenever the lights stop
//! - Logs a diagnostic line every few seconds
//!
//! The register image is shared with the field-bus server task.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! ```

use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use greenhouse_rio::bridge::HBridge;
use greenhouse_rio::hal::esp32::{
    pins, Esp32Clock, Esp32NvsStore, Esp32Output, Esp32PwmLine, Esp32QuadratureCounter,
};
use greenhouse_rio::registers::RegisterImage;
use greenhouse_rio::service::LightPositionService;
use greenhouse_rio::traits::Clock;
use greenhouse_rio::{Config, LightPositionManager, LightState};
use log::{info, warn};
use std::thread;
use std::time::Duration;

/// Main loop interval in milliseconds (1kHz encoder sampling)
const LOOP_INTERVAL_MS: u64 = 1;

/// Diagnostic dump interval in milliseconds
const DIAGNOSTIC_INTERVAL_MS: u64 = 5_000;

/// NVS namespace for the light record
const NVS_NAMESPACE: &str = "light";

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    EspLogger::initialize_default();

    println!();
    println!("================================");
    println!("  greenhouse-rio light control");
    println!("================================");
    println!();

    let config = Config::default();
    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize H-bridge (In1/In2 GPIO, EnA LEDC PWM)
    // =========================================================================
    let in1 = Esp32Output::new(peripherals.pins.gpio25)?;
    let in2 = Esp32Output::new(peripherals.pins.gpio26)?;
    let ena = Esp32PwmLine::new(
        peripherals.pins.gpio27,
        peripherals.ledc.timer0,
        peripherals.ledc.channel0,
    )?;
    println!(
        "[OK] H-bridge initialized (In1 GPIO{}, In2 GPIO{}, EnA GPIO{} PWM)",
        pins::IN1,
        pins::IN2,
        pins::ENA
    );

    // =========================================================================
    // Initialize Encoder
    // =========================================================================
    let encoder =
        Esp32QuadratureCounter::new(peripherals.pins.gpio34, peripherals.pins.gpio35, false)?;
    println!(
        "[OK] Encoder initialized (GPIO{}/{})",
        pins::ENC_A,
        pins::ENC_B
    );

    // =========================================================================
    // Initialize Manager and restore saved position
    // =========================================================================
    let manager =
        LightPositionManager::with_config(encoder, HBridge::new(in1, in2, ena), &config.light)?;

    let nvs = EspDefaultNvsPartition::take()?;
    let store = Esp32NvsStore::new(nvs, NVS_NAMESPACE)?;
    let mut service = LightPositionService::new(manager, store);

    match service.restore() {
        Ok(true) => println!(
            "[OK] Restored position {} of {} pulses",
            service.manager().raw_pv(),
            service.manager().max_pulses()
        ),
        Ok(false) => println!("[SKIP] No saved position, using defaults"),
        Err(e) => println!("[WARN] NVS read failed: {:?}", e),
    }

    service.manager_mut().set_on_stop(|state: LightState| {
        info!("lights stopped ({})", state);
    });

    let clock = Esp32Clock::new();
    let mut regs = RegisterImage::new();
    let mut last_diagnostic = clock.now_ms();
    let mut line = String::new();

    println!();
    println!(
        "Starting control loop ({}ms refresh)...",
        config.light.refresh_interval_ms
    );
    println!();

    // =========================================================================
    // Main Loop (1kHz)
    // =========================================================================
    loop {
        let now = clock.now_ms();

        service.manager_mut().sensor_mut().poll();

        if let Err(e) = service.poll(now, &mut regs) {
            warn!("light service: {}", e);
        }

        if now.saturating_sub(last_diagnostic) >= DIAGNOSTIC_INTERVAL_MS {
            last_diagnostic = now;
            line.clear();
            service.manager().serialize(&mut line, false)?;
            info!("{}", line);

            let missed = service.manager().sensor().missed_edges();
            if missed > 0 {
                warn!("encoder missed {} edges since boot", missed);
            }
        }

        // Sleep until next tick
        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
