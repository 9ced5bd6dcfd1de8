//! Fuzz target: `parse_display` and glyph layout
//!
//! Any accepted reading must lay out as exactly four glyphs with at most
//! one decimal point, and must re-format to a line the parser accepts.
//!
//! cargo fuzz run fuzz_display_line

#![no_main]

use fuelmeter::link::display::parse_display;
use fuelmeter::link::report::format_report;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(reading) = parse_display(line) else {
        return;
    };

    let glyphs = reading.glyphs();
    assert_eq!(glyphs.len(), 4);
    assert!(glyphs.iter().filter(|g| g.dot).count() <= 1);

    let again = parse_display(&format_report(reading.mode, reading.value));
    assert!(again.is_ok(), "report for {line:?} rejected");
});
