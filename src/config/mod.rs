use core::fmt::{self, Write};

use heapless::String;
use log::{debug, info};

use crate::constants::{HTTPS_PORT, METRICS_URL_CAPACITY, SECONDS_PER_MINUTE};

mod schema;

pub use schema::*;

// config values are generated at compile time from cfg.toml
include!(concat!(env!("OUT_DIR"), "/config.rs"));

const _: () = assert!(
    CONFIG.validate().is_ok(),
    "generated CONFIG does not pass DeviceConfiguration::validate"
);

static DEVICE_CONFIGURATION: DeviceConfiguration<'static> = CONFIG;

/// The configuration this firmware image was built with.
pub fn load_configuration() -> &'static DeviceConfiguration<'static> {
    &DEVICE_CONFIGURATION
}

/// Username and API key for the push-metrics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsCredentials<'a> {
    pub username: &'a str,
    pub api_key: &'a str,
}

impl<'a> DeviceConfiguration<'a> {
    pub const fn sample_interval_secs(&self) -> u64 {
        self.sample_interval_minutes as u64 * SECONDS_PER_MINUTE
    }

    pub const fn is_open_network(&self) -> bool {
        self.wifi_password.is_empty()
    }

    /// `None` when the endpoint is used unauthenticated.
    pub fn metrics_credentials(&self) -> Option<MetricsCredentials<'a>> {
        if self.metrics_username.is_empty() && self.metrics_api_key.is_empty() {
            return None;
        }

        Some(MetricsCredentials {
            username: self.metrics_username,
            api_key: self.metrics_api_key,
        })
    }

    pub fn metrics_url(&self) -> Result<String<METRICS_URL_CAPACITY>, fmt::Error> {
        let mut url: String<METRICS_URL_CAPACITY> = String::new();

        write!(url, "https://{}", self.metrics_host)?;
        if self.metrics_port != HTTPS_PORT {
            write!(url, ":{}", self.metrics_port)?;
        }
        write!(url, "{}", self.metrics_path)?;

        Ok(url)
    }

    /// Log the configuration without its secrets.
    pub fn log_summary(&self) {
        info!("Device ID: {}", self.device_id);
        info!(
            "Sampling every {} min ({} s)",
            self.sample_interval_minutes,
            self.sample_interval_secs()
        );
        info!(
            "Wi-Fi SSID: {:?} ({})",
            self.wifi_ssid,
            if self.is_open_network() {
                "open"
            } else {
                "WPA2"
            }
        );
        info!(
            "Humidity sensor: {} on GPIO{}",
            self.humidity_sensor_model.name(),
            self.humidity_sensor_pin
        );
        info!(
            "Pot height offset: {:.2} cm, light sensor reference: {:.2} V",
            self.pot_height_offset_cm, self.light_sensor_reference_voltage
        );

        for assignment in self.pin_assignments() {
            debug!("GPIO{:<2} {}", assignment.pin, assignment.role.name());
        }

        match self.metrics_url() {
            Ok(url) => info!("Metrics endpoint: {}", url),
            Err(_) => info!(
                "Metrics endpoint: {}:{}{} (URL exceeds {} bytes)",
                self.metrics_host, self.metrics_port, self.metrics_path, METRICS_URL_CAPACITY
            ),
        }
        match self.metrics_credentials() {
            Some(credentials) => info!("Metrics user: {}", credentials.username),
            None => info!("Metrics endpoint is unauthenticated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal() -> DeviceConfiguration<'static> {
        DeviceConfiguration {
            wifi_ssid: "wifi_name",
            wifi_password: "wifi_password",
            device_id: "avocado",
            sample_interval_minutes: 5,
            humidity_sensor_pin: 5,
            humidity_sensor_model: HumiditySensorModel::Dht11,
            moisture_power_pin: 33,
            moisture_sensor_pin: 27,
            pot_height_offset_cm: 36.40,
            ultrasonic_trig_pin: 14,
            ultrasonic_echo_pin: 12,
            light_sensor_pin: 26,
            light_sensor_reference_voltage: 5.0,
            display_data_pin: 18,
            display_chip_select_pin: 19,
            display_clock_pin: 21,
            metrics_host: "prometheus-us-central1.grafana.net",
            metrics_path: "/api/prom/push",
            metrics_port: 443,
            metrics_username: "",
            metrics_api_key: "",
        }
    }

    #[test]
    fn built_configuration_holds_its_invariants() {
        let config = load_configuration();

        assert!(!config.wifi_ssid.is_empty());
        assert!(!config.device_id.is_empty());
        assert!(config.sample_interval_minutes > 0);
        assert!(config.metrics_port > 0);
        assert_eq!(config.find_pin_collision(), None);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn load_configuration_returns_the_generated_constant() {
        assert_eq!(*load_configuration(), CONFIG);
        assert!(core::ptr::eq(load_configuration(), load_configuration()));
    }

    #[test]
    fn debug_output_round_trips_through_literal_fields() {
        let original = literal();
        let rebuilt = DeviceConfiguration {
            wifi_ssid: original.wifi_ssid,
            wifi_password: original.wifi_password,
            device_id: original.device_id,
            sample_interval_minutes: original.sample_interval_minutes,
            humidity_sensor_pin: original.humidity_sensor_pin,
            humidity_sensor_model: original.humidity_sensor_model,
            moisture_power_pin: original.moisture_power_pin,
            moisture_sensor_pin: original.moisture_sensor_pin,
            pot_height_offset_cm: original.pot_height_offset_cm,
            ultrasonic_trig_pin: original.ultrasonic_trig_pin,
            ultrasonic_echo_pin: original.ultrasonic_echo_pin,
            light_sensor_pin: original.light_sensor_pin,
            light_sensor_reference_voltage: original.light_sensor_reference_voltage,
            display_data_pin: original.display_data_pin,
            display_chip_select_pin: original.display_chip_select_pin,
            display_clock_pin: original.display_clock_pin,
            metrics_host: original.metrics_host,
            metrics_path: original.metrics_path,
            metrics_port: original.metrics_port,
            metrics_username: original.metrics_username,
            metrics_api_key: original.metrics_api_key,
        };

        assert_eq!(rebuilt, original);
        assert_eq!(format!("{:?}", rebuilt), format!("{:?}", original));

        let debug = format!("{:?}", original);
        assert!(debug.contains("device_id: \"avocado\""));
        assert!(debug.contains("pot_height_offset_cm: 36.4"));
        assert!(debug.contains("humidity_sensor_model: Dht11"));
    }

    #[test]
    fn sample_interval_in_seconds() {
        assert_eq!(literal().sample_interval_secs(), 300);

        let config = DeviceConfiguration {
            sample_interval_minutes: u16::MAX,
            ..literal()
        };
        assert_eq!(config.sample_interval_secs(), 65_535 * 60);
    }

    #[test]
    fn open_network_when_password_is_empty() {
        assert!(!literal().is_open_network());

        let config = DeviceConfiguration {
            wifi_password: "",
            ..literal()
        };
        assert!(config.is_open_network());
    }

    #[test]
    fn empty_credentials_mean_unauthenticated() {
        assert_eq!(literal().metrics_credentials(), None);

        let config = DeviceConfiguration {
            metrics_username: "123456",
            metrics_api_key: "glc_secret",
            ..literal()
        };
        assert_eq!(
            config.metrics_credentials(),
            Some(MetricsCredentials {
                username: "123456",
                api_key: "glc_secret",
            })
        );
    }

    #[test]
    fn metrics_url_omits_default_https_port() {
        assert_eq!(
            literal().metrics_url().unwrap().as_str(),
            "https://prometheus-us-central1.grafana.net/api/prom/push"
        );

        let config = DeviceConfiguration {
            metrics_host: "192.168.1.10",
            metrics_path: "/api/v1/push",
            metrics_port: 9090,
            ..literal()
        };
        assert_eq!(
            config.metrics_url().unwrap().as_str(),
            "https://192.168.1.10:9090/api/v1/push"
        );
    }

    #[test]
    fn metrics_url_too_long() {
        let host = "h".repeat(METRICS_URL_CAPACITY);
        let config = DeviceConfiguration {
            metrics_host: &host,
            ..literal()
        };
        assert!(config.metrics_url().is_err());
    }
}
