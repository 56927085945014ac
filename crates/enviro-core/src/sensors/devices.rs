use super::{Reading, SensorKind, SensorReadings};

/// Typed readings from the combined temperature/humidity sensor.
pub struct ClimateReadings {
    pub temperature_celsius: f32,
    pub humidity_percent: f32,
}

impl ClimateReadings {
    pub const KINDS: [SensorKind; 2] = [SensorKind::Temperature, SensorKind::Humidity];
}

impl SensorReadings<2> for ClimateReadings {
    fn to_array(self) -> [Reading; 2] {
        [
            Reading::new(SensorKind::Temperature, self.temperature_celsius),
            Reading::new(SensorKind::Humidity, self.humidity_percent),
        ]
    }
}

/// Typed reading from the gas sensor, already converted to an index.
pub struct AirQualityReadings {
    pub index: f32,
}

impl AirQualityReadings {
    pub const KINDS: [SensorKind; 1] = [SensorKind::AirQuality];
}

impl SensorReadings<1> for AirQualityReadings {
    fn to_array(self) -> [Reading; 1] {
        [Reading::new(SensorKind::AirQuality, self.index)]
    }
}

/// Typed reading from the ambient light sensor.
pub struct LightReadings {
    pub lux: f32,
}

impl LightReadings {
    pub const KINDS: [SensorKind; 1] = [SensorKind::Light];
}

impl SensorReadings<1> for LightReadings {
    fn to_array(self) -> [Reading; 1] {
        [Reading::new(SensorKind::Light, self.lux)]
    }
}
