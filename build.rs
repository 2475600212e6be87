use std::{env, error::Error, fs, path::Path};

use serde::Deserialize;

#[allow(dead_code)]
#[path = "src/config/schema.rs"]
mod schema;

use schema::{DeviceConfiguration, HumiditySensorModel};

const CONFIG_FILE: &str = "cfg.toml";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    wifi_ssid: String,
    #[serde(default)]
    wifi_password: String,
    device_id: String,
    sample_interval_minutes: u16,
    humidity_sensor_pin: u8,
    humidity_sensor_model: String,
    moisture_power_pin: u8,
    moisture_sensor_pin: u8,
    pot_height_offset_cm: f32,
    ultrasonic_trig_pin: u8,
    ultrasonic_echo_pin: u8,
    light_sensor_pin: u8,
    light_sensor_reference_voltage: f32,
    display_data_pin: u8,
    display_chip_select_pin: u8,
    display_clock_pin: u8,
    metrics_host: String,
    metrics_path: String,
    metrics_port: u16,
    #[serde(default)]
    metrics_username: String,
    #[serde(default)]
    metrics_api_key: String,
}

impl RawConfig {
    fn to_device_configuration(&self) -> Result<DeviceConfiguration<'_>, Box<dyn Error>> {
        let humidity_sensor_model = HumiditySensorModel::from_name(&self.humidity_sensor_model)
            .ok_or_else(|| {
                format!(
                    "humidity_sensor_model: unknown model {:?} (expected DHT11, DHT12, DHT21, DHT22 or AM2301)",
                    self.humidity_sensor_model
                )
            })?;

        Ok(DeviceConfiguration {
            wifi_ssid: &self.wifi_ssid,
            wifi_password: &self.wifi_password,
            device_id: &self.device_id,
            sample_interval_minutes: self.sample_interval_minutes,
            humidity_sensor_pin: self.humidity_sensor_pin,
            humidity_sensor_model,
            moisture_power_pin: self.moisture_power_pin,
            moisture_sensor_pin: self.moisture_sensor_pin,
            pot_height_offset_cm: self.pot_height_offset_cm,
            ultrasonic_trig_pin: self.ultrasonic_trig_pin,
            ultrasonic_echo_pin: self.ultrasonic_echo_pin,
            light_sensor_pin: self.light_sensor_pin,
            light_sensor_reference_voltage: self.light_sensor_reference_voltage,
            display_data_pin: self.display_data_pin,
            display_chip_select_pin: self.display_chip_select_pin,
            display_clock_pin: self.display_clock_pin,
            metrics_host: &self.metrics_host,
            metrics_path: &self.metrics_path,
            metrics_port: self.metrics_port,
            metrics_username: &self.metrics_username,
            metrics_api_key: &self.metrics_api_key,
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Tell Cargo to rerun if toml changes
    println!("cargo:rerun-if-changed={}", CONFIG_FILE);
    println!("cargo:rerun-if-changed=src/config/schema.rs");

    // Read and parse
    let toml_str = fs::read_to_string(CONFIG_FILE)
        .map_err(|e| format!("{}: {} (copy cfg.toml.example to get started)", CONFIG_FILE, e))?;
    let raw: RawConfig =
        toml::from_str(&toml_str).map_err(|e| format!("{}: {}", CONFIG_FILE, e))?;

    // Fail the build on misconfiguration, the firmware has no way to recover
    let config = raw.to_device_configuration()?;
    config
        .validate()
        .map_err(|e| format!("{}: {}", CONFIG_FILE, e))?;

    // Generate Rust code
    let code = format!(
        r#"
        pub const CONFIG: DeviceConfiguration<'static> = DeviceConfiguration {{
            wifi_ssid: {ssid:?},
            wifi_password: {psk:?},
            device_id: {id:?},
            sample_interval_minutes: {intv},
            humidity_sensor_pin: {dht},
            humidity_sensor_model: HumiditySensorModel::{model:?},
            moisture_power_pin: {mpwr},
            moisture_sensor_pin: {mpin},
            pot_height_offset_cm: {offset:?},
            ultrasonic_trig_pin: {trig},
            ultrasonic_echo_pin: {echo},
            light_sensor_pin: {light},
            light_sensor_reference_voltage: {vref:?},
            display_data_pin: {din},
            display_chip_select_pin: {cs},
            display_clock_pin: {clk},
            metrics_host: {mh:?},
            metrics_path: {mpath:?},
            metrics_port: {mp},
            metrics_username: {mu:?},
            metrics_api_key: {key:?},
        }};
    "#,
        ssid = config.wifi_ssid,
        psk = config.wifi_password,
        id = config.device_id,
        intv = config.sample_interval_minutes,
        dht = config.humidity_sensor_pin,
        model = config.humidity_sensor_model,
        mpwr = config.moisture_power_pin,
        mpin = config.moisture_sensor_pin,
        offset = config.pot_height_offset_cm,
        trig = config.ultrasonic_trig_pin,
        echo = config.ultrasonic_echo_pin,
        light = config.light_sensor_pin,
        vref = config.light_sensor_reference_voltage,
        din = config.display_data_pin,
        cs = config.display_chip_select_pin,
        clk = config.display_clock_pin,
        mh = config.metrics_host,
        mpath = config.metrics_path,
        mp = config.metrics_port,
        mu = config.metrics_username,
        key = config.metrics_api_key,
    );

    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("config.rs");
    fs::write(dest_path, code)?;
    Ok(())
}
