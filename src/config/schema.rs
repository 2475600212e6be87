//! Device configuration record and its build-time checks.
//!
//! This file only depends on `core`: `build.rs` includes it with `#[path]`
//! to validate `cfg.toml` before generating `CONFIG`.

use core::fmt;

/// Longest SSID accepted by 802.11.
pub const WIFI_SSID_MAX_LEN: usize = 32;
/// Longest WPA2 passphrase.
pub const WIFI_PASSWORD_MAX_LEN: usize = 64;
/// The device ID doubles as the DHCP hostname.
pub const DEVICE_ID_MAX_LEN: usize = 32;

/// Number of GPIO pins claimed by the peripherals.
pub const PIN_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumiditySensorModel {
    Dht11,
    Dht12,
    Dht21,
    Dht22,
    Am2301,
}

impl HumiditySensorModel {
    /// Parse a model name as written in `cfg.toml` (e.g. "DHT11", "dht22").
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            Self::Dht11,
            Self::Dht12,
            Self::Dht21,
            Self::Dht22,
            Self::Am2301,
        ]
        .into_iter()
        .find(|model| model.name().eq_ignore_ascii_case(name))
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dht11 => "DHT11",
            Self::Dht12 => "DHT12",
            Self::Dht21 => "DHT21",
            Self::Dht22 => "DHT22",
            Self::Am2301 => "AM2301",
        }
    }

    /// Minimum time between two reads the sensor tolerates.
    pub const fn min_sample_period_ms(&self) -> u32 {
        match self {
            Self::Dht11 | Self::Dht12 => 1000,
            Self::Dht21 | Self::Dht22 | Self::Am2301 => 2000,
        }
    }
}

/// Logical function of a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    HumiditySensor,
    MoisturePower,
    MoistureSensor,
    UltrasonicTrig,
    UltrasonicEcho,
    LightSensor,
    DisplayData,
    DisplayChipSelect,
    DisplayClock,
}

impl PinRole {
    /// Key of the pin in `cfg.toml`.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HumiditySensor => "humidity_sensor_pin",
            Self::MoisturePower => "moisture_power_pin",
            Self::MoistureSensor => "moisture_sensor_pin",
            Self::UltrasonicTrig => "ultrasonic_trig_pin",
            Self::UltrasonicEcho => "ultrasonic_echo_pin",
            Self::LightSensor => "light_sensor_pin",
            Self::DisplayData => "display_data_pin",
            Self::DisplayChipSelect => "display_chip_select_pin",
            Self::DisplayClock => "display_clock_pin",
        }
    }

    /// Pins the firmware drives. The DHT data line is open-drain and
    /// driven low to start a read, so it counts as an output too.
    pub const fn is_output(&self) -> bool {
        matches!(
            self,
            Self::HumiditySensor
                | Self::MoisturePower
                | Self::UltrasonicTrig
                | Self::DisplayData
                | Self::DisplayChipSelect
                | Self::DisplayClock
        )
    }

    /// Pins sampled through the ADC.
    pub const fn is_analog(&self) -> bool {
        matches!(self, Self::MoistureSensor | Self::LightSensor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    pub role: PinRole,
    pub pin: u8,
}

// ESP32 (WROOM/WROVER) GPIO capabilities
mod gpio {
    pub const MAX: u8 = 39;

    /// Pins that exist and are not wired to the SPI flash.
    pub const fn is_usable(pin: u8) -> bool {
        match pin {
            6..=11 => false,
            20 | 24 | 28..=31 => false,
            _ => pin <= MAX,
        }
    }

    pub const fn is_input_only(pin: u8) -> bool {
        matches!(pin, 34..=39)
    }

    /// ADC1 (32-39) and ADC2 (0, 2, 4, 12-15, 25-27) channels.
    pub const fn is_analog(pin: u8) -> bool {
        matches!(pin, 0 | 2 | 4 | 12..=15 | 25..=27 | 32..=39)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    EmptyField(&'static str),
    FieldTooLong { field: &'static str, max: usize },
    InvalidDeviceId,
    ZeroSampleInterval,
    InvalidPotHeightOffset,
    InvalidReferenceVoltage,
    InvalidMetricsPath,
    ZeroMetricsPort,
    IncompleteMetricsCredentials,
    PinUnavailable { role: PinRole, pin: u8 },
    PinInputOnly { role: PinRole, pin: u8 },
    PinNotAnalog { role: PinRole, pin: u8 },
    PinCollision { first: PinRole, second: PinRole, pin: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{} must not be empty", field),
            Self::FieldTooLong { field, max } => {
                write!(f, "{} is longer than {} bytes", field, max)
            }
            Self::InvalidDeviceId => write!(
                f,
                "device_id may only contain ASCII letters, digits, '-' and '_'"
            ),
            Self::ZeroSampleInterval => write!(f, "sample_interval_minutes must be positive"),
            Self::InvalidPotHeightOffset => {
                write!(f, "pot_height_offset_cm must be a finite, non-negative length")
            }
            Self::InvalidReferenceVoltage => write!(
                f,
                "light_sensor_reference_voltage must be a finite, positive voltage"
            ),
            Self::InvalidMetricsPath => write!(f, "metrics_path must start with '/'"),
            Self::ZeroMetricsPort => write!(f, "metrics_port must be positive"),
            Self::IncompleteMetricsCredentials => write!(
                f,
                "metrics_username and metrics_api_key must both be set or both be empty"
            ),
            Self::PinUnavailable { role, pin } => {
                write!(f, "{} = {}: no such usable GPIO", role.name(), pin)
            }
            Self::PinInputOnly { role, pin } => {
                write!(f, "{} = {}: GPIO{} is input-only", role.name(), pin, pin)
            }
            Self::PinNotAnalog { role, pin } => {
                write!(f, "{} = {}: GPIO{} has no ADC channel", role.name(), pin, pin)
            }
            Self::PinCollision { first, second, pin } => write!(
                f,
                "{} and {} are both assigned to GPIO{}",
                first.name(),
                second.name(),
                pin
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Everything the firmware needs to know about its deployment, fixed at
/// build time. `'static` on the device, borrowed from the parsed TOML in
/// `build.rs`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfiguration<'a> {
    // Wi-Fi SSID to connect to
    pub wifi_ssid: &'a str,

    // Wi-Fi pre-shared key (empty for an open network)
    pub wifi_password: &'a str,

    // Unique device name, used as DHCP hostname and metrics label
    pub device_id: &'a str,

    // Time between two sensor read + publish cycles
    pub sample_interval_minutes: u16,

    // DHT data line and the wired sensor model
    pub humidity_sensor_pin: u8,
    pub humidity_sensor_model: HumiditySensorModel,

    // Soil probe supply, only powered while sampling to slow electrode corrosion
    pub moisture_power_pin: u8,

    // Soil probe analog output
    pub moisture_sensor_pin: u8,

    // Distance from the ultrasonic sensor to the soil surface, in centimetres
    pub pot_height_offset_cm: f32,

    // HC-SR04 trigger and echo
    pub ultrasonic_trig_pin: u8,
    pub ultrasonic_echo_pin: u8,

    // TEMT6000 analog output and the voltage it is powered from
    pub light_sensor_pin: u8,
    pub light_sensor_reference_voltage: f32,

    // MAX7219 LED matrix bus
    pub display_data_pin: u8,
    pub display_chip_select_pin: u8,
    pub display_clock_pin: u8,

    // Push-metrics endpoint
    pub metrics_host: &'a str,
    pub metrics_path: &'a str,
    pub metrics_port: u16,

    // Push-metrics credentials (both empty when unauthenticated)
    pub metrics_username: &'a str,
    pub metrics_api_key: &'a str,
}

impl DeviceConfiguration<'_> {
    pub const fn pin_assignments(&self) -> [PinAssignment; PIN_COUNT] {
        [
            PinAssignment {
                role: PinRole::HumiditySensor,
                pin: self.humidity_sensor_pin,
            },
            PinAssignment {
                role: PinRole::MoisturePower,
                pin: self.moisture_power_pin,
            },
            PinAssignment {
                role: PinRole::MoistureSensor,
                pin: self.moisture_sensor_pin,
            },
            PinAssignment {
                role: PinRole::UltrasonicTrig,
                pin: self.ultrasonic_trig_pin,
            },
            PinAssignment {
                role: PinRole::UltrasonicEcho,
                pin: self.ultrasonic_echo_pin,
            },
            PinAssignment {
                role: PinRole::LightSensor,
                pin: self.light_sensor_pin,
            },
            PinAssignment {
                role: PinRole::DisplayData,
                pin: self.display_data_pin,
            },
            PinAssignment {
                role: PinRole::DisplayChipSelect,
                pin: self.display_chip_select_pin,
            },
            PinAssignment {
                role: PinRole::DisplayClock,
                pin: self.display_clock_pin,
            },
        ]
    }

    /// First pair of roles sharing a GPIO, in declaration order.
    pub const fn find_pin_collision(&self) -> Option<(PinRole, PinRole, u8)> {
        let pins = self.pin_assignments();
        let mut i = 0;
        while i < PIN_COUNT {
            let mut j = i + 1;
            while j < PIN_COUNT {
                if pins[i].pin == pins[j].pin {
                    return Some((pins[i].role, pins[j].role, pins[i].pin));
                }
                j += 1;
            }
            i += 1;
        }
        None
    }

    /// Check every field, reporting the first violation found.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_ssid.is_empty() {
            return Err(ConfigError::EmptyField("wifi_ssid"));
        }
        if self.wifi_ssid.len() > WIFI_SSID_MAX_LEN {
            return Err(ConfigError::FieldTooLong {
                field: "wifi_ssid",
                max: WIFI_SSID_MAX_LEN,
            });
        }
        if self.wifi_password.len() > WIFI_PASSWORD_MAX_LEN {
            return Err(ConfigError::FieldTooLong {
                field: "wifi_password",
                max: WIFI_PASSWORD_MAX_LEN,
            });
        }

        if self.device_id.is_empty() {
            return Err(ConfigError::EmptyField("device_id"));
        }
        if self.device_id.len() > DEVICE_ID_MAX_LEN {
            return Err(ConfigError::FieldTooLong {
                field: "device_id",
                max: DEVICE_ID_MAX_LEN,
            });
        }
        if !is_label_safe(self.device_id) {
            return Err(ConfigError::InvalidDeviceId);
        }

        if self.sample_interval_minutes == 0 {
            return Err(ConfigError::ZeroSampleInterval);
        }

        if !self.pot_height_offset_cm.is_finite() || self.pot_height_offset_cm < 0.0 {
            return Err(ConfigError::InvalidPotHeightOffset);
        }
        if !self.light_sensor_reference_voltage.is_finite()
            || self.light_sensor_reference_voltage <= 0.0
        {
            return Err(ConfigError::InvalidReferenceVoltage);
        }

        if self.metrics_host.is_empty() {
            return Err(ConfigError::EmptyField("metrics_host"));
        }
        let path = self.metrics_path.as_bytes();
        if path.is_empty() || path[0] != b'/' {
            return Err(ConfigError::InvalidMetricsPath);
        }
        if self.metrics_port == 0 {
            return Err(ConfigError::ZeroMetricsPort);
        }
        if self.metrics_username.is_empty() != self.metrics_api_key.is_empty() {
            return Err(ConfigError::IncompleteMetricsCredentials);
        }

        self.validate_pins()
    }

    const fn validate_pins(&self) -> Result<(), ConfigError> {
        let pins = self.pin_assignments();
        let mut i = 0;
        while i < PIN_COUNT {
            let PinAssignment { role, pin } = pins[i];
            if !gpio::is_usable(pin) {
                return Err(ConfigError::PinUnavailable { role, pin });
            }
            if role.is_output() && gpio::is_input_only(pin) {
                return Err(ConfigError::PinInputOnly { role, pin });
            }
            if role.is_analog() && !gpio::is_analog(pin) {
                return Err(ConfigError::PinNotAnalog { role, pin });
            }
            i += 1;
        }

        match self.find_pin_collision() {
            Some((first, second, pin)) => Err(ConfigError::PinCollision { first, second, pin }),
            None => Ok(()),
        }
    }
}

/// Characters usable both in a DHCP hostname and a metrics label value.
const fn is_label_safe(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
            return false;
        }
        i += 1;
    }
    true
}
