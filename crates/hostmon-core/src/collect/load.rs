//! 1, 5 and 15 minute load averages.

use serde::{Deserialize, Serialize};

use crate::error::CollectError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

#[cfg(unix)]
pub fn collect() -> Result<LoadAverage, CollectError> {
    let mut values = [0.0_f64; 3];
    // SAFETY: `getloadavg` writes up to `n` doubles to a valid buffer.
    let n = unsafe { libc::getloadavg(values.as_mut_ptr(), 3) };
    if n < 3 {
        return Err(CollectError::LoadAverage(format!(
            "getloadavg returned {n} of 3 samples"
        )));
    }
    Ok(LoadAverage {
        load1: values[0],
        load5: values[1],
        load15: values[2],
    })
}

#[cfg(not(unix))]
pub fn collect() -> Result<LoadAverage, CollectError> {
    let avg = sysinfo::System::load_average();
    Ok(LoadAverage {
        load1: avg.one,
        load5: avg.five,
        load15: avg.fifteen,
    })
}
