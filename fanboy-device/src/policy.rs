//! Fan control policy: maps a fan's configuration and its sensor reading to
//! the duty to apply

use fanboy_core::{FanConfig, FanMode, LinearParams, PidParams};

/// Linear interpolation between the two breakpoints, flat outside them
///
/// Integer arithmetic only; the result is monotonic non-decreasing in `temp`
/// whenever `min_duty <= max_duty`.
pub fn linear_duty(params: &LinearParams, temp: u16) -> u8 {
    if temp >= params.max_temp {
        return params.max_duty;
    }
    if temp <= params.min_temp {
        return params.min_duty;
    }

    // min_temp < temp < max_temp here, so the span is non-zero
    let span_t = (params.max_temp - params.min_temp) as i32;
    let span_d = params.max_duty as i32 - params.min_duty as i32;
    let offset = (temp - params.min_temp) as i32;
    (params.min_duty as i32 + offset * span_d / span_t) as u8
}

/// Duty held in PID mode: the manual duty clamped into the PID range
pub fn pid_hold_duty(manual_duty: u8, params: &PidParams) -> u8 {
    manual_duty.max(params.min_duty).min(params.max_duty)
}

/// Duty for one fan, given its mapped sensor's reading (`None` if disconnected)
pub fn fan_duty(fan: &FanConfig, temp: Option<u16>) -> u8 {
    match fan.mode {
        FanMode::Manual => fan.duty,
        FanMode::Linear => match temp {
            Some(t) => linear_duty(&fan.linear, t),
            // No reading: run as if hot
            None => fan.linear.max_duty,
        },
        FanMode::Pid => pid_hold_duty(fan.duty, &fan.pid),
    }
}
