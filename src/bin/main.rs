//! Pulse meter firmware for the Raspberry Pi Pico 2 W
//!
//! Wires the photo-interrupter input, the flash record log and the two
//! long-lived loops together. Startup is fail-fast: an unusable
//! configuration, a storage region that cannot be initialized, or a detector
//! task that will not spawn each abort the boot, because a meter running
//! without its counter or its sink would silently record nothing.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::gpio::{Input, Pull};
use {defmt_rtt as _, panic_probe as _};

use pulse_meter::config::MeterConfig;
use pulse_meter::core::counter::SharedCounter;
use pulse_meter::core::detector::run_detector;
use pulse_meter::core::interval::{run_recorder, IntervalRecorder};
use pulse_meter::core::traits::sync::EmbassyState;
use pulse_meter::core::traits::time::EmbassyTime;
use pulse_meter::platform::rp2350::{MonotonicWallClock, Rp2350Flash, Rp2350Gpio, FLASH_SIZE};
use pulse_meter::platform::traits::GpioMode;
use pulse_meter::storage::{FlashRecordLog, PersistenceSink};
use pulse_meter::{log_error, log_info};

/// Pulses accumulated by the detector, drained by the recorder
static PULSES: SharedCounter<EmbassyState<u32>> = SharedCounter::new(EmbassyState::new(0));

#[embassy_executor::task]
async fn detector_task(gpio: Rp2350Gpio, poll_delay_ms: u32, filter_delay_ms: u32) {
    run_detector(gpio, EmbassyTime, &PULSES, poll_delay_ms, filter_delay_ms).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let config = MeterConfig::new();
    if let Err(e) = config.validate() {
        log_error!("configuration rejected: {}", e);
        panic!("configuration rejected");
    }
    log_info!(
        "pulse meter starting: sensor on GPIO {}, saving every {} min",
        config.input_pin,
        config.interval_minutes
    );

    // Storage must be usable before counting starts; a meter that cannot
    // persist is reported and halted rather than run blind.
    let flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(p.FLASH);
    let mut sink = FlashRecordLog::new(Rp2350Flash::new(flash), config.log_base, config.log_blocks);
    if let Err(e) = sink.ensure_schema() {
        log_error!("storage init failed: {}", e);
        panic!("storage init failed");
    }

    // Sensor input. The board routes the photo-interrupter to GPIO 16;
    // `config.input_pin` documents that wiring.
    let pull = match config.input_pull {
        GpioMode::InputPullUp => Pull::Up,
        GpioMode::InputPullDown => Pull::Down,
        GpioMode::Input => Pull::None,
    };
    let input = Input::new(p.PIN_16, pull);
    let gpio = Rp2350Gpio::new(input, config.input_pull);

    if spawner
        .spawn(detector_task(
            gpio,
            config.poll_delay_ms,
            config.filter_delay_ms,
        ))
        .is_err()
    {
        log_error!("failed to start detector task");
        panic!("failed to start detector task");
    }

    let clock = MonotonicWallClock::new(config.clock_anchor_unix);
    let mut recorder = IntervalRecorder::new(sink, config.interval_minutes);
    run_recorder(&clock, &mut recorder, &PULSES).await
}
