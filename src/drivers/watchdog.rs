//! Task watchdog for the generator's busy loop.
//!
//! The pulse loop never sleeps, so the idle tasks never run.  The TWDT is
//! therefore reconfigured to watch this task only (`idle_core_mask = 0`)
//! and the loop feeds it instead of yielding.

use esp_idf_svc::sys::{
    ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset,
};
use log::{info, warn};

pub struct LoopWatchdog {
    subscribed: bool,
}

impl LoopWatchdog {
    /// Subscribe the calling task with a `timeout_ms` deadline.  The
    /// device panics and restarts if the loop stops feeding it.
    pub fn subscribe(timeout_ms: u32) -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: plain ESP-IDF calls; a null handle means the current task.
        let subscribed = unsafe {
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                warn!("WDT | reconfigure returned {}", ret);
            }
            let ret = esp_task_wdt_add(core::ptr::null_mut());
            if ret != ESP_OK {
                warn!("WDT | subscribe failed ({}), loop unwatched", ret);
            }
            ret == ESP_OK
        };
        if subscribed {
            info!("WDT | watching generator loop, {} ms timeout", timeout_ms);
        }
        Self { subscribed }
    }

    /// Non-blocking; safe to call every status interval.
    pub fn feed(&self) {
        if self.subscribed {
            // SAFETY: the current task is subscribed.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
