//! Pin and device assignments for both nodes.
//!
//! Single source of truth: drivers and config defaults reference this
//! module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Signal generator node (ESP32)
// ---------------------------------------------------------------------------

/// Square-wave output mimicking the vehicle speed sensor.
pub const SIM_SPEED_OUT_GPIO: i32 = 9;
/// Square-wave output mimicking the fuel flow sensor.
pub const SIM_FLOW_OUT_GPIO: i32 = 8;
/// Momentary "mode" button output, active HIGH.
pub const SIM_BUTTON_OUT_GPIO: i32 = 7;

/// UART wired to the measuring node.
pub const SIM_UART_TX_GPIO: i32 = 17;
pub const SIM_UART_RX_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Measuring node (Linux SBC, GPIO character device offsets)
// ---------------------------------------------------------------------------

/// GPIO chip exposing the sensor lines.
pub const METER_GPIO_CHIP: &str = "/dev/gpiochip0";
/// Speed sensor input: rising-edge events, pull-down.
pub const METER_SPEED_LINE: u32 = 17;
/// Flow sensor input: rising-edge events, pull-down.
pub const METER_FLOW_LINE: u32 = 27;
/// Mode button input: polled level, pull-up.
pub const METER_BUTTON_LINE: u32 = 22;

/// Serial device connected to the generator node.
pub const METER_SERIAL_PORT: &str = "/dev/ttyACM0";

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// Baud rate shared by both ends of the serial link.
pub const LINK_BAUD_RATE: u32 = 115_200;

/// Consumer labels reported to the kernel and used in diagnostics.
pub const SPEED_LINE_LABEL: &str = "speed_sensor";
pub const FLOW_LINE_LABEL: &str = "flow_sensor";
pub const BUTTON_LINE_LABEL: &str = "mode_button";
