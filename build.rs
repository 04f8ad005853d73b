fn main() {
    // Host builds (unit + integration tests) skip the ESP-IDF environment.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
