//! Serial line protocol shared by both nodes.
//!
//! | Module    | Direction             | Content                         |
//! |-----------|-----------------------|---------------------------------|
//! | `line`    | inbound, both nodes   | newline framing                 |
//! | `command` | meter → generator     | `T`, `S<n>F<m>` and dispatch    |
//! | `display` | meter → generator     | `L07.5` display readings        |
//! | `report`  | meter outbound        | fixed-width consumption report  |

pub mod command;
pub mod display;
pub mod line;
pub mod report;
