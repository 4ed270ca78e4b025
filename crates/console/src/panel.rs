//! Text renderings of the operator panel.

use std::fmt::Write as _;

use machine_core::{format_octal, Machine, MachineSnapshot, ReservedSlot, StopReason};

/// Register pane: control registers, condition code, GPRs and index
/// registers, all in octal.
pub fn render_registers(snapshot: &MachineSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "PC  {}  IR  {}  MAR {}  MBR {}",
        format_octal(snapshot.pc),
        format_octal(snapshot.ir),
        format_octal(snapshot.mar),
        format_octal(snapshot.mbr)
    );
    let _ = writeln!(
        out,
        "MFR {}  CC  {:04b}  STATE {:?}",
        snapshot.mfr, snapshot.cc, snapshot.run_state
    );
    for (index, value) in snapshot.gpr.iter().enumerate() {
        let _ = write!(out, "R{index}  {}  ", format_octal(*value));
    }
    out.push('\n');
    for (index, value) in snapshot.ixr.iter().enumerate() {
        let _ = write!(out, "X{}  {}  ", index + 1, format_octal(*value));
    }
    out.push('\n');
    out
}

/// Contents of the reserved low-memory words.
pub fn render_reserved(machine: &Machine) -> String {
    let mut out = String::new();
    for slot in ReservedSlot::ALL {
        let word = machine.inspect(slot.address()).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<9}{}  {}",
            slot.label(),
            format_octal(slot.address()),
            format_octal(word)
        );
    }
    out
}

/// Words shown in the memory pane.
pub const MEMORY_WINDOW_WORDS: u16 = 20;

/// Memory pane contents: twenty words starting ten below `PC`, clipped to
/// memory. Reads go straight to memory so the cache is left alone.
pub fn memory_window(machine: &Machine) -> Vec<(u16, u16)> {
    let start = machine.registers().pc().saturating_sub(MEMORY_WINDOW_WORDS / 2);
    (start..start.saturating_add(MEMORY_WINDOW_WORDS))
        .filter_map(|address| machine.inspect(address).ok().map(|word| (address, word)))
        .collect()
}

/// Renders `address: word` rows as `AAAA: WWWWWW`.
pub fn render_words(words: &[(u16, u16)]) -> String {
    let mut out = String::new();
    for (address, word) in words {
        let _ = writeln!(out, "{address:04o}: {word:06o}");
    }
    out
}

/// Memory pane text.
pub fn render_memory_window(machine: &Machine) -> String {
    render_words(&memory_window(machine))
}

/// One-line summary of why the session ended.
pub fn describe_stop(stop: StopReason, steps: u64) -> String {
    match stop {
        StopReason::Halted => format!("halted after {steps} steps"),
        StopReason::Fault(fault) => {
            format!("machine fault {} ({fault}) after {steps} steps", fault.as_u8())
        }
        StopReason::WaitingForInput => {
            format!("waiting for keyboard input after {steps} steps")
        }
        StopReason::OperatorHalt => format!("stopped by operator after {steps} steps"),
        StopReason::StepLimit => format!("step limit reached after {steps} steps"),
    }
}
