//! Common utils for tests
#![allow(dead_code)]

use archon::{
    driver::{Driver, Outcome},
    parser::PrecedenceTable,
    printable::Printable,
};

/// Initialize the logger for tests
pub fn init_env_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Run `text` through a fresh [Driver] with the standard precedences.
pub fn compile(text: &str) -> (Driver, Vec<Outcome>) {
    let mut driver = Driver::new(PrecedenceTable::standard(), "test");
    let outcomes = driver.run(text);
    (driver, outcomes)
}

/// Print the whole module built by `driver`.
pub fn module_ir(driver: &Driver) -> String {
    let codegen = driver.codegen();
    codegen.module().disp(codegen.context()).to_string()
}
