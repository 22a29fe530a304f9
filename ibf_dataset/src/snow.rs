/*
 * Copyright © 2026 the ibf contributors.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! snow-level diagnostics: relative humidity from the Magnus approximation,
//! wet-bulb temperature via a Davies-Jones-style enthalpy-balance bisection,
//! and two snow-level estimators -- a freezing-level lapse-rate projection,
//! and a pressure-level profile interpolation used when freezing-level
//! height is unavailable.

use ibf_common::wmo::is_freezing_or_snow_code;

const RD: f64 = 287.05;
const RV: f64 = 461.5;
const CPD: f64 = 1004.0;
const CPV: f64 = 1850.0;
const EPS: f64 = RD / RV;

fn lv(t_k: f64) -> f64 {
    2.501e6 - 2361.0 * (t_k - 273.15)
}

fn esat_pa(t_c: f64) -> f64 {
    611.2 * ((17.67 * t_c) / (t_c + 243.5)).exp()
}

fn inv_esat_to_td_c(e_pa: f64) -> f64 {
    let e_hpa = e_pa / 100.0;
    let lnratio = (e_hpa / 6.112).ln();
    (243.5 * lnratio) / (17.67 - lnratio)
}

fn sat_mixing_ratio(p_pa: f64, t_c: f64) -> f64 {
    let e = esat_pa(t_c);
    EPS * e / (p_pa - e)
}

fn mixing_ratio_from_rh(p_pa: f64, t_c: f64, rh_pct: f64) -> f64 {
    let e = (rh_pct / 100.0) * esat_pa(t_c);
    EPS * e / (p_pa - e)
}

/// relative humidity (%) from temperature and dewpoint, both Celsius, via the
/// August-Roche-Magnus approximation, clamped to [0, 100].
pub fn rh_from_t_td(t_c: f64, td_c: f64) -> f64 {
    let e = esat_pa(td_c);
    let es = esat_pa(t_c);
    (100.0 * e / es).clamp(0.0, 100.0)
}

fn moist_enthalpy_per_kg_dry(t_k: f64, r: f64) -> f64 {
    CPD * t_k + r * (CPV * t_k + lv(t_k))
}

/// wet-bulb temperature (°C) by bisecting the moist-static-enthalpy balance
/// between the dewpoint and the dry-bulb temperature. Monotonically
/// non-decreasing in RH for fixed T (property 6, §8).
pub fn wet_bulb_dj(t_c: f64, rh_pct: f64, p_pa: f64) -> f64 {
    if (rh_pct - 100.0).abs() < 1e-6 {
        return t_c;
    }
    let t_k = t_c + 273.15;
    let r = mixing_ratio_from_rh(p_pa, t_c, rh_pct);

    let e = (rh_pct / 100.0) * esat_pa(t_c);
    let td = inv_esat_to_td_c(e);

    let mut tw_lo_k = td + 273.15;
    let mut tw_hi_k = t_k;
    let h_parcel = moist_enthalpy_per_kg_dry(t_k, r);

    let f = |tw_k: f64| -> f64 {
        let rsw = sat_mixing_ratio(p_pa, tw_k - 273.15);
        h_parcel - moist_enthalpy_per_kg_dry(tw_k, rsw)
    };

    let mut f_lo = f(tw_lo_k);
    let mut f_hi = f(tw_hi_k);
    if f_lo < 0.0 {
        tw_lo_k = (tw_lo_k - 0.5).max(180.0);
        f_lo = f(tw_lo_k);
    }
    if f_hi > 0.0 {
        tw_hi_k += 0.5;
        f_hi = f(tw_hi_k);
    }
    let _ = (f_lo, f_hi);

    for _ in 0..60 {
        let tw_mid = 0.5 * (tw_lo_k + tw_hi_k);
        let f_mid = f(tw_mid);
        if f_mid.abs() < 1e-6 || (tw_hi_k - tw_lo_k) < 1e-3 {
            return tw_mid - 273.15;
        }
        if f_mid > 0.0 {
            tw_lo_k = tw_mid;
        } else {
            tw_hi_k = tw_mid;
        }
    }
    0.5 * (tw_lo_k + tw_hi_k) - 273.15
}

/// gate conditions for attempting a snow-level estimate at all (§4.3): some
/// precipitation is falling, the weather code doesn't already denote a
/// freezing/snow phenomenon, and it isn't warm enough to rule snow out.
pub fn should_check_snow_level(precip_mm: f64, weather_code: i64, temp_c: f64) -> bool {
    precip_mm > 0.0 && !is_freezing_or_snow_code(weather_code) && temp_c < 15.0
}

/// estimate snow level (m MSL) from freezing-level height, or `None` when
/// the gate conditions fail or the estimate falls outside plausible bounds.
#[allow(clippy::too_many_arguments)]
pub fn estimate_snow_level_from_freezing_level(
    temp_c: f64,
    dewpoint_c: f64,
    precip_mm: f64,
    weather_code: i64,
    freezing_level_m: Option<f64>,
    station_altitude_m: f64,
    max_terrain_m: Option<f64>,
) -> Option<f64> {
    if !should_check_snow_level(precip_mm, weather_code, temp_c) {
        return None;
    }

    let p_pa = 101325.0 * (1.0_f64 - 2.25577e-5 * station_altitude_m.max(0.0)).powf(5.25588);
    let rh_pct = rh_from_t_td(temp_c, dewpoint_c);
    let wet_bulb = wet_bulb_dj(temp_c, rh_pct, p_pa);
    if wet_bulb.is_nan() {
        return None;
    }

    let alt_diff = freezing_level_m.map(|fzl| fzl - station_altitude_m);
    let lapse_rate = match alt_diff {
        Some(diff) if diff.abs() >= 10.0 => ((temp_c - wet_bulb) / diff).clamp(0.001, 0.015),
        _ => 0.0065,
    };

    if precip_mm <= 0.0 {
        return None;
    }
    if let Some(fzl) = freezing_level_m {
        if fzl <= station_altitude_m {
            return None;
        }
    }

    let first_guess = if lapse_rate > 0.0 {
        (wet_bulb - 1.0) / lapse_rate + station_altitude_m
    } else {
        freezing_level_m?
    };

    let snow_level = match freezing_level_m {
        Some(fzl) => first_guess.min(fzl - 100.0),
        None => first_guess,
    };

    if snow_level < station_altitude_m || snow_level > station_altitude_m + 3000.0 {
        return None;
    }
    if let Some(max_terrain) = max_terrain_m {
        if snow_level > max_terrain - 300.0 {
            return None;
        }
    }
    Some(snow_level)
}

/// a single-hour vertical profile at a fixed set of pressure levels.
pub struct PressureProfile {
    pub pressures_hpa: Vec<f64>,
    pub temps_c: Vec<f64>,
    pub rhs_pct: Vec<f64>,
    pub geop_heights_m: Vec<f64>,
}

/// discrete precipitation-intensity adjustment table (§4.3, §9 Open Question
/// resolution): the only adjustment table implemented.
fn precip_intensity_adjustment_m(precip_mm_per_hr: f64) -> f64 {
    if precip_mm_per_hr >= 20.0 {
        300.0
    } else if precip_mm_per_hr >= 10.0 {
        200.0
    } else if precip_mm_per_hr >= 5.0 {
        100.0
    } else {
        0.0
    }
}

/// estimate snow level (m MSL) by finding the geopotential height at which
/// wet-bulb temperature crosses the target (0.5 degC) through linear
/// interpolation between adjacent pressure levels, with the surface
/// (station altitude) treated as the lowest level.
pub fn estimate_snow_level_from_profile(
    station_altitude_m: f64,
    t2m_c: f64,
    td2m_c: f64,
    profile: &PressureProfile,
    precip_mm_per_hr: f64,
    apply_precip_adjustment: bool,
) -> f64 {
    let p_pa = 101325.0 * (1.0_f64 - 2.25577e-5 * station_altitude_m.max(0.0)).powf(5.25588);
    let rh2m = rh_from_t_td(t2m_c, td2m_c);
    let surface_tw = wet_bulb_dj(t2m_c, rh2m, p_pa);

    let mut levels: Vec<(f64, f64)> = vec![(station_altitude_m, surface_tw)];
    for i in 0..profile.pressures_hpa.len() {
        let tw = wet_bulb_dj(profile.temps_c[i], profile.rhs_pct[i], profile.pressures_hpa[i] * 100.0);
        levels.push((profile.geop_heights_m[i], tw));
    }
    levels.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    const TARGET_C: f64 = 0.5;
    let mut snow_level = if levels[0].1 <= 0.0 {
        levels[0].0
    } else {
        let mut crossing = f64::NAN;
        for pair in levels.windows(2) {
            let (z0, tw0) = pair[0];
            let (z1, tw1) = pair[1];
            let y0 = tw0 - TARGET_C;
            let y1 = tw1 - TARGET_C;
            if y0 == 0.0 {
                crossing = z0;
                break;
            }
            if y0 * y1 <= 0.0 {
                crossing = z0 + (TARGET_C - tw0) * (z1 - z0) / (tw1 - tw0);
                break;
            }
        }
        crossing
    };

    if apply_precip_adjustment && snow_level.is_finite() {
        let adjustment = precip_intensity_adjustment_m(precip_mm_per_hr);
        snow_level = (snow_level - adjustment).max(station_altitude_m);
    }
    snow_level
}

/// high-level helper combining the gate, the profile interpolation, and the
/// plausibility bounds. `None` when not applicable or filtered out.
#[allow(clippy::too_many_arguments)]
pub fn compute_hourly_snow_level_from_profile(
    precip_mm: f64,
    weather_code: i64,
    temp_c: f64,
    dewpoint_c: f64,
    station_altitude_m: f64,
    profile: &PressureProfile,
    max_terrain_m: Option<f64>,
) -> Option<f64> {
    if !should_check_snow_level(precip_mm, weather_code, temp_c) {
        return None;
    }
    let snow_level_m = estimate_snow_level_from_profile(station_altitude_m, temp_c, dewpoint_c, profile, precip_mm, true);
    if !snow_level_m.is_finite() || snow_level_m > station_altitude_m + 3000.0 {
        return None;
    }
    if let Some(max_terrain) = max_terrain_m {
        if snow_level_m > max_terrain - 300.0 || snow_level_m > station_altitude_m + 1200.0 {
            return None;
        }
    }
    Some(snow_level_m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_bulb_monotonic_in_humidity() {
        let t = 10.0;
        let p = 101325.0;
        let tw_dry = wet_bulb_dj(t, 40.0, p);
        let tw_mid = wet_bulb_dj(t, 70.0, p);
        let tw_sat = wet_bulb_dj(t, 100.0, p);
        assert!(tw_dry <= tw_mid + 1e-9);
        assert!(tw_mid <= tw_sat + 1e-9);
        assert!((tw_sat - t).abs() < 1e-6);
    }

    #[test]
    fn rh_round_trip_at_saturation() {
        assert!((rh_from_t_td(10.0, 10.0) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn gate_requires_precipitation() {
        assert!(!should_check_snow_level(0.0, 61, 5.0));
        assert!(should_check_snow_level(1.0, 61, 5.0));
    }

    #[test]
    fn gate_rejects_already_snowy_code() {
        assert!(!should_check_snow_level(2.0, 71, 0.0));
    }

    #[test]
    fn freezing_level_projection_is_below_freezing_level() {
        let snow_level = estimate_snow_level_from_freezing_level(3.0, 1.0, 2.0, 61, Some(1500.0), 200.0, None);
        let snow_level = snow_level.expect("should compute a snow level");
        assert!(snow_level < 1500.0);
        assert!(snow_level >= 200.0);
    }

    #[test]
    fn freezing_level_at_or_below_station_yields_none() {
        let snow_level = estimate_snow_level_from_freezing_level(3.0, 1.0, 2.0, 61, Some(100.0), 200.0, None);
        assert!(snow_level.is_none());
    }

    #[test]
    fn precip_intensity_table_steps() {
        assert_eq!(precip_intensity_adjustment_m(0.0), 0.0);
        assert_eq!(precip_intensity_adjustment_m(5.0), 100.0);
        assert_eq!(precip_intensity_adjustment_m(10.0), 200.0);
        assert_eq!(precip_intensity_adjustment_m(20.0), 300.0);
    }
}
