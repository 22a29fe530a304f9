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

//! rough meteorological-season label, used by the LLM context prompt rather
//! than the dataset text itself.

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;

/// a coarse season label from the month of `now` and hemisphere sign of
/// `latitude`. Southern-hemisphere seasons run six months out of phase.
pub fn determine_current_season(latitude: f64, now: &DateTime<Tz>) -> &'static str {
    let northern = latitude >= 0.0;
    match now.month() {
        3 | 4 | 5 => if northern { "Spring" } else { "Autumn" },
        6 | 7 | 8 => if northern { "Summer" } else { "Winter" },
        9 | 10 | 11 => if northern { "Autumn" } else { "Spring" },
        _ => if northern { "Winter" } else { "Summer" },
    }
}
