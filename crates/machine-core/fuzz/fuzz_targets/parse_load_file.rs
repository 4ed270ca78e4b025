#![no_main]

use libfuzzer_sys::fuzz_target;
use machine_core::Machine;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut machine = Machine::new();
    if let Ok(start) = machine.ipl(text) {
        assert_eq!(machine.registers().pc(), start);
    }
});
