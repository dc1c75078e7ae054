fn main() {
    // Only firmware builds need the ESP-IDF environment exported; host
    // builds (tests, fuzzing) skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
