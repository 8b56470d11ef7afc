//! Apparent temperature from air temperature and relative humidity.
//!
//! ```text
//! rho      = (rh / 100) * 6.105 * exp(17.27 * t / (237.7 + t))
//! apparent = t + 0.33 * rho - 4
//! ```
//!
//! The result is rounded to one decimal place, half away from zero
//! (`f64::round`). Inputs are not range checked; callers validate.

/// Compute the apparent temperature in °C.
pub fn compute(temperature: f64, relative_humidity: f64) -> f64 {
    // ---
    let rho = (relative_humidity / 100.0)
        * 6.105
        * ((17.27 * temperature) / (237.7 + temperature)).exp();

    round_tenth(temperature + 0.33 * rho - 4.0)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
