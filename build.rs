fn main() {
    // ESP-IDF link arguments are only needed for the device build; host
    // builds (simulation, measuring node, tests) skip them.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
