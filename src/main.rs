#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker, Timer};

use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println::logger::init_logger;

use plant_sensor_node::config::{load_configuration, DeviceConfiguration};
use plant_sensor_node::constants::VERSION;

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    init_logger(log::LevelFilter::Info);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_hal_embassy::init(timg0.timer0);

    // possibly high transient required at init
    // https://github.com/esp-rs/esp-hal/issues/1626
    Timer::after(Duration::from_millis(1000)).await;

    log::info!("Plant sensor node v{}", VERSION);

    let config = load_configuration();
    config.log_summary();

    spawner.spawn(sample_cadence(config)).ok();
}

/// Drives the read + publish cycle at the configured interval.
#[embassy_executor::task]
async fn sample_cadence(config: &'static DeviceConfiguration<'static>) {
    let mut ticker = Ticker::every(Duration::from_secs(config.sample_interval_secs()));
    let mut cycle: u32 = 0;

    loop {
        cycle = cycle.wrapping_add(1);
        log::info!("{}: sample cycle {}", config.device_id, cycle);

        ticker.next().await;
    }
}
