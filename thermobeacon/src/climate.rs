//! Derived atmospheric quantities, matching what the vendor's companion app
//! reports for the same readings.

/// Saturation vapor pressure in Pa at temperature `t` °C, after the ASCE
/// standardized reference evapotranspiration equation.
pub fn saturation_vapor_pressure(t: f64) -> f64 {
    610.78 * ((t / (t + 237.3)) * 17.2694).exp()
}

/// Vapor pressure deficit in kPa.
pub fn vapor_pressure_deficit(t: f64, rh: f64) -> f64 {
    saturation_vapor_pressure(t) * (1.0 - rh / 100.0) / 1000.0
}

/// Dew point in °C, after the Magnus-form approximation used for HDC1xxx
/// humidity sensors.
pub fn dew_point(t: f64, rh: f64) -> f64 {
    const ALPHA: f64 = 17.271;
    const BETA: f64 = 237.7;

    let term = (ALPHA * t) / (BETA + t);
    let rh_term = (rh / 100.0).ln();
    BETA * (rh_term + term) / (ALPHA - rh_term - term)
}

/// Heat index in °C, after Schoen's empirical temperature-humidity model.
pub fn heat_index(t: f64, rh: f64) -> f64 {
    let dew = dew_point(t, rh);
    t - 1.0799 * (0.03755 * t).exp() * (1.0 - (0.0801 * (dew - 14.0)).exp())
}
