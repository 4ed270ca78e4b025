#![no_main]

use libfuzzer_sys::fuzz_target;
use machine_core::{Decoder, Machine, MachineConfig, MEMORY_WORDS};

const MAX_STEPS: usize = 256;

fuzz_target!(|data: &[u8]| {
    let mut machine = Machine::with_config(MachineConfig {
        step_limit: None,
        yield_between_steps: false,
    });

    for (addr, pair) in (0u16..).zip(data.chunks_exact(2).take(MEMORY_WORDS)) {
        let word = u16::from_be_bytes([pair[0], pair[1]]);
        let _ = Decoder::decode(word);
        let _ = machine.load(addr, word);
    }
    machine.submit_keyboard(0);

    for _ in 0..MAX_STEPS {
        if !machine.step() {
            break;
        }
        assert!(machine.cache().check_invariants(machine.memory()).is_ok());
        assert!(usize::from(machine.registers().pc()) <= MEMORY_WORDS);
    }
});
