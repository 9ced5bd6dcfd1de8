//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter     | Implements          | Connects to                     |
//! |-------------|---------------------|---------------------------------|
//! | `display`   | DisplayPort         | log output (frame dump)         |
//! | `gpio_cdev` | EdgeSource          | Linux GPIO uAPI v2 edge events  |
//! |             | InputPin            | Linux GPIO uAPI v2 line values  |
//! | `log_sink`  | EventSink           | `log` facade                    |
//! | `serial`    | SerialLink          | Linux tty (reconnecting)        |
//! | `sim_pin`   | OutputPin           | host simulation                 |
//! | `stdio`     | SerialLink          | stdin / stdout                  |
//! | `time`      | (clock)             | monotonic clock                 |
//! | `uart`      | SerialLink          | ESP-IDF UART driver             |

pub mod display;
pub mod log_sink;
pub mod time;

#[cfg(target_os = "linux")]
pub mod gpio_cdev;
#[cfg(target_os = "linux")]
pub mod serial;

#[cfg(not(target_os = "espidf"))]
pub mod sim_pin;
#[cfg(not(target_os = "espidf"))]
pub mod stdio;

#[cfg(target_os = "espidf")]
pub mod uart;
