//! Random script generation for replay stress tests.

use scene_core::line::ScriptLine;
use scene_core::rng::DeterministicRng;
use scene_core::speaker::Roster;

/// Generates `len` lines with speakers drawn uniformly from `roster` and a
/// random integer as text.
///
/// # Panics
///
/// Panics if the roster has more than `u32::MAX` speakers.
pub fn generate_script(
    rng: &mut dyn DeterministicRng,
    roster: &Roster,
    len: usize,
) -> Vec<ScriptLine> {
    let speakers: Vec<_> = roster.iter().cloned().collect();
    let last = u32::try_from(speakers.len() - 1).expect("roster too large");
    (0..len)
        .map(|_| {
            let pick = rng.next_u32_range(0, last) as usize;
            ScriptLine::new(speakers[pick].clone(), rng.next_i32().to_string())
        })
        .collect()
}

/// Renders lines the way replay output looks: `speaker: text\n` each.
#[must_use]
pub fn render_script(lines: &[ScriptLine]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}
