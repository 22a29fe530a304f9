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

//! angle normalization and compass direction helpers

#[inline]
pub fn normalize_360(d: f64) -> f64 {
    let x = d % 360.0;
    if x < 0.0 { 360.0 + x } else { x }
}

const COMPASS_WORDS: [&str; 8] = [
    "northerly", "northeasterly", "easterly", "southeasterly",
    "southerly", "southwesterly", "westerly", "northwesterly",
];

/// 8-point compass direction word for a wind direction given in degrees.
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    let d = normalize_360(degrees);
    let idx = ((d + 22.5) / 45.0) as usize % 8;
    COMPASS_WORDS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_points() {
        assert_eq!(degrees_to_compass(0.0), "northerly");
        assert_eq!(degrees_to_compass(90.0), "easterly");
        assert_eq!(degrees_to_compass(180.0), "southerly");
        assert_eq!(degrees_to_compass(270.0), "westerly");
    }

    #[test]
    fn wraps_around_north() {
        assert_eq!(degrees_to_compass(350.0), "northerly");
        assert_eq!(degrees_to_compass(-10.0), "northerly");
    }

    #[test]
    fn intercardinal() {
        assert_eq!(degrees_to_compass(45.0), "northeasterly");
        assert_eq!(degrees_to_compass(135.0), "southeasterly");
    }
}
