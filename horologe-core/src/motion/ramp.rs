//! Acceleration-delay table
//!
//! A discrete trapezoid: the ramp counter selects how many extra ticks are
//! added to the inter-step wait. Low counter values (start and end of a
//! long move) add the most delay, the plateau adds almost none.

/// Highest ramp counter value; also the remaining-steps threshold that
/// separates the acceleration and deceleration regions
pub const ACCEL_HIGHEST_POS: i32 = 300;

/// Extra delay ticks for a ramp counter value
///
/// Only counters up to [`ACCEL_HIGHEST_POS`] add delay.
pub fn accel_delay(steps: i32) -> u16 {
    if steps > ACCEL_HIGHEST_POS {
        0
    } else if steps <= 50 {
        10
    } else if steps <= 100 {
        7
    } else if steps <= 150 {
        5
    } else if steps <= 250 {
        3
    } else {
        1
    }
}
