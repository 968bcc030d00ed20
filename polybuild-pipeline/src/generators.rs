//! Test-slot allocation and generation-script rendering.
//!
//! Generators claim contiguous, non-overlapping blocks of test indices in
//! declaration order, each sized by its `repeat` count. Hand-written tests
//! occupy the indices before the first block.

use thiserror::Error;

use polybuild_core::{files::file_stem, Generator};

/// Inclusive range of test indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    pub first: u32,
    pub last: u32,
}

impl SlotRange {
    /// Number of tests in the range.
    pub fn count(&self) -> u32 {
        self.last - self.first + 1
    }
}

/// The requested tests do not fit in the `u32` index space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotOverflow {
    #[error("{count} samples leave no test index for generated tests")]
    Samples { count: usize },

    #[error("generator #{index} (repeat {repeat}) runs past the last test index")]
    Repeat { index: usize, repeat: u32 },
}

/// Split consecutive indices starting at `first_slot` into one block per repeat count.
pub fn allocate_slots(repeats: &[u32], first_slot: u32) -> Result<Vec<SlotRange>, SlotOverflow> {
    let mut next = Some(first_slot);
    let mut slots = Vec::with_capacity(repeats.len());
    for (index, &repeat) in repeats.iter().enumerate() {
        let overflow = SlotOverflow::Repeat { index, repeat };
        let first = next.ok_or_else(|| overflow.clone())?;
        let last = first.checked_add(repeat.max(1) - 1).ok_or(overflow)?;
        slots.push(SlotRange { first, last });
        next = last.checked_add(1);
    }
    Ok(slots)
}

/// Index of the first generated test when `sample_count` samples come first.
pub fn first_generated_slot(sample_count: usize) -> Result<u32, SlotOverflow> {
    u32::try_from(sample_count)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or(SlotOverflow::Samples {
            count: sample_count,
        })
}

/// A generator with its claimed slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGenerator<'a> {
    pub generator: &'a Generator,
    /// Name used in the script: the source file name without extension.
    pub name: String,
    pub slots: SlotRange,
}

impl PlannedGenerator<'_> {
    /// The script fragment for this generator.
    ///
    /// An explicit command is emitted verbatim; otherwise the generator is
    /// run once per index of its range, seeded with and writing to that index.
    pub fn script_line(&self) -> String {
        match &self.generator.command {
            Some(command) => command.clone(),
            None => format!(
                "<#list {}..{} as i>\n{} ${{i}} > ${{i}}\n</#list>",
                self.slots.first, self.slots.last, self.name
            ),
        }
    }
}

/// Assign slots to `generators`, placed after `sample_count` samples.
pub fn plan(
    generators: &[Generator],
    sample_count: usize,
) -> Result<Vec<PlannedGenerator<'_>>, SlotOverflow> {
    if generators.is_empty() {
        return Ok(Vec::new());
    }
    let repeats: Vec<u32> = generators.iter().map(|g| g.repeat).collect();
    let slots = allocate_slots(&repeats, first_generated_slot(sample_count)?)?;
    Ok(generators
        .iter()
        .zip(slots)
        .map(|(generator, slots)| PlannedGenerator {
            generator,
            name: file_stem(&generator.path),
            slots,
        })
        .collect())
}

/// Full generation script, one fragment per generator, newline-terminated.
pub fn render_script(plan: &[PlannedGenerator<'_>]) -> String {
    let mut script = String::new();
    for planned in plan {
        script.push_str(&planned.script_line());
        script.push('\n');
    }
    script
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn generator(path: &str, repeat: u32, command: Option<&str>) -> Generator {
        Generator {
            path: PathBuf::from(path),
            repeat,
            command: command.map(str::to_string),
        }
    }

    #[test]
    fn repeats_three_and_five_claim_one_to_eight() {
        let slots = allocate_slots(&[3, 5], 1).unwrap();
        assert_eq!(
            slots,
            vec![
                SlotRange { first: 1, last: 3 },
                SlotRange { first: 4, last: 8 }
            ]
        );
        let total: u32 = slots.iter().map(SlotRange::count).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn ranges_are_contiguous_and_disjoint() {
        let slots = allocate_slots(&[2, 1, 4, 3], 5).unwrap();
        assert_eq!(slots[0].first, 5);
        for pair in slots.windows(2) {
            assert_eq!(pair[1].first, pair[0].last + 1, "gap or overlap in {pair:?}");
        }
        assert_eq!(slots.last().map(|s| s.last), Some(5 + 10 - 1));
    }

    #[test]
    fn no_generators_no_slots() {
        assert!(allocate_slots(&[], 1).unwrap().is_empty());
    }

    #[test]
    fn templated_line_uses_stem_and_range() {
        let gens = [generator("files/gen.cpp", 3, None), generator("files/gen_big.cpp", 5, None)];
        let planned = plan(&gens, 2).unwrap();
        assert_eq!(planned[0].name, "gen");
        assert_eq!(planned[0].slots, SlotRange { first: 3, last: 5 });
        assert_eq!(
            planned[1].script_line(),
            "<#list 6..10 as i>\ngen_big ${i} > ${i}\n</#list>"
        );
    }

    #[test]
    fn explicit_command_is_verbatim_but_still_claims_slots() {
        let gens = [
            generator("gen.cpp", 2, Some("gen -n 100 > 1")),
            generator("gen.cpp", 1, None),
        ];
        let planned = plan(&gens, 0).unwrap();
        assert_eq!(planned[0].script_line(), "gen -n 100 > 1");
        assert_eq!(planned[1].slots, SlotRange { first: 3, last: 3 });
    }

    #[test]
    fn script_has_one_fragment_per_generator() {
        let gens = [generator("a.cpp", 1, Some("a 1 > 1")), generator("b.cpp", 1, Some("b 2 > 2"))];
        assert_eq!(render_script(&plan(&gens, 0).unwrap()), "a 1 > 1\nb 2 > 2\n");
    }

    #[test]
    fn maximal_repeat_after_a_sample_overflows() {
        let gens = [generator("gen.cpp", u32::MAX, None)];
        assert_eq!(
            plan(&gens, 1).unwrap_err(),
            SlotOverflow::Repeat { index: 0, repeat: u32::MAX }
        );
    }

    #[test]
    fn block_ending_on_the_last_index_leaves_no_room_for_the_next() {
        let slots = allocate_slots(&[u32::MAX - 1], 2).unwrap();
        assert_eq!(slots[0].last, u32::MAX);
        assert_eq!(
            allocate_slots(&[u32::MAX - 1, 1], 2).unwrap_err(),
            SlotOverflow::Repeat { index: 1, repeat: 1 }
        );
    }

    #[test]
    fn no_generators_need_no_slots_whatever_the_sample_count() {
        assert!(plan(&[], usize::MAX).unwrap().is_empty());
        assert_eq!(
            first_generated_slot(u32::MAX as usize),
            Err(SlotOverflow::Samples { count: u32::MAX as usize })
        );
    }
}
