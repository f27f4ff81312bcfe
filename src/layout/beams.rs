//! Beam grouping — joins runs of short notes on one staff.
//!
//! A run breaks whenever the duration code or the stem direction changes
//! from one note to the next, or at a quarter rest. Only eighths and
//! shorter join a run, and a run needs two notes to become a beam. Beams
//! never cross the barline.

use log::trace;
use serde::Serialize;

use super::extract::{EngravingNote, StemDirection};
use super::duration::NoteDuration;

/// Notes (by index into their staff sequence) drawn under one beam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BeamGroup {
    notes: Vec<usize>,
}

impl BeamGroup {
    pub fn indices(&self) -> &[usize] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Look the group's notes up in the sequence it was built from.
    pub fn resolve<'a>(&self, notes: &'a [EngravingNote]) -> Vec<&'a EngravingNote> {
        self.notes.iter().filter_map(|&i| notes.get(i)).collect()
    }
}

/// Beam groups of one staff: those closed mid-measure, and the run still
/// open at the end of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeamGroups {
    pub inline: Vec<BeamGroup>,
    pub tail: Option<BeamGroup>,
}

impl BeamGroups {
    pub fn iter(&self) -> impl Iterator<Item = &BeamGroup> {
        self.inline.iter().chain(self.tail.as_ref())
    }
}

/// Accumulator threaded through the fold over a staff's notes.
#[derive(Debug, Default)]
struct BeamRun {
    committed: Vec<BeamGroup>,
    current: Vec<usize>,
    previous: Option<(NoteDuration, StemDirection)>,
}

impl BeamRun {
    fn step(mut self, (idx, note): (usize, &EngravingNote)) -> Self {
        if self.breaks_at(note) {
            self.flush();
        }
        if note.duration.is_beamable() {
            self.current.push(idx);
        }
        self.previous = Some((note.duration, note.stem));
        self
    }

    fn breaks_at(&self, note: &EngravingNote) -> bool {
        if note.duration.is_quarter_rest() {
            return true;
        }
        match self.previous {
            Some((duration, stem)) => !duration.same_code(note.duration) || stem != note.stem,
            None => false,
        }
    }

    /// Close the open run; fewer than two notes is no beam at all.
    fn flush(&mut self) {
        let run = std::mem::take(&mut self.current);
        if run.len() >= 2 {
            trace!("beam over notes {run:?}");
            self.committed.push(BeamGroup { notes: run });
        }
    }

    fn finish(self) -> BeamGroups {
        let tail = (self.current.len() >= 2).then(|| {
            trace!("tail beam over notes {:?}", self.current);
            BeamGroup { notes: self.current }
        });
        BeamGroups {
            inline: self.committed,
            tail,
        }
    }
}

/// Group one staff's notes into beams and set each note's flag visibility:
/// hidden under a beam, shown otherwise.
pub fn group_beams(notes: &mut [EngravingNote]) -> BeamGroups {
    let groups = notes
        .iter()
        .enumerate()
        .fold(BeamRun::default(), BeamRun::step)
        .finish();

    let mut beamed = vec![false; notes.len()];
    for &idx in groups.iter().flat_map(BeamGroup::indices) {
        beamed[idx] = true;
    }
    for (note, beamed) in notes.iter_mut().zip(beamed) {
        note.flag_visible = !beamed;
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::duration::DurationCode;
    use crate::layout::plan::Clef;
    use pretty_assertions::assert_eq;

    fn note(code: DurationCode, stem: StemDirection) -> EngravingNote {
        EngravingNote {
            keys: vec!["c/5".to_string()],
            duration: NoteDuration::Sounding(code),
            stem,
            clef: Clef::Treble,
            flag_visible: true,
        }
    }

    fn up(code: DurationCode) -> EngravingNote {
        note(code, StemDirection::Up)
    }

    fn rest(duration: NoteDuration) -> EngravingNote {
        EngravingNote {
            keys: vec!["b/4".to_string()],
            duration,
            ..up(DurationCode::Quarter)
        }
    }

    fn groups_of(groups: &BeamGroups) -> Vec<Vec<usize>> {
        groups.iter().map(|g| g.indices().to_vec()).collect()
    }

    fn flags(notes: &[EngravingNote]) -> Vec<bool> {
        notes.iter().map(|n| n.flag_visible).collect()
    }

    use DurationCode::*;

    #[test]
    fn four_eighths_make_one_beam() {
        let mut notes = vec![up(Eighth), up(Eighth), up(Eighth), up(Eighth)];
        let groups = group_beams(&mut notes);
        assert!(groups.inline.is_empty());
        assert_eq!(groups.tail.as_ref().map(BeamGroup::len), Some(4));
        assert_eq!(flags(&notes), vec![false; 4]);
    }

    #[test]
    fn isolated_eighth_keeps_its_flag() {
        let mut notes = vec![up(Eighth), up(Quarter), up(Eighth), up(Eighth)];
        let groups = group_beams(&mut notes);
        assert_eq!(groups_of(&groups), vec![vec![2, 3]]);
        assert!(groups.tail.is_some());
        assert_eq!(flags(&notes), vec![true, true, false, false]);
    }

    #[test]
    fn duration_change_closes_a_run() {
        let mut notes = vec![
            up(Eighth),
            up(Eighth),
            up(Sixteenth),
            up(Sixteenth),
            up(Sixteenth),
        ];
        let groups = group_beams(&mut notes);
        assert_eq!(groups.inline, vec![BeamGroup { notes: vec![0, 1] }]);
        assert_eq!(groups.tail, Some(BeamGroup { notes: vec![2, 3, 4] }));
        assert_eq!(flags(&notes), vec![false; 5]);
    }

    #[test]
    fn stem_change_closes_a_run() {
        let mut notes = vec![
            up(Eighth),
            up(Eighth),
            note(Eighth, StemDirection::Down),
            note(Eighth, StemDirection::Down),
        ];
        let groups = group_beams(&mut notes);
        assert_eq!(groups_of(&groups), vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(groups.inline.len(), 1);
    }

    #[test]
    fn rests_break_runs_and_never_join() {
        let mut notes = vec![
            up(Eighth),
            up(Eighth),
            rest(NoteDuration::Rest { ticks: 1 }),
            up(Eighth),
            rest(NoteDuration::Rest { ticks: 1 }),
            rest(NoteDuration::Rest { ticks: 1 }),
        ];
        let groups = group_beams(&mut notes);
        assert_eq!(groups_of(&groups), vec![vec![0, 1]]);
        assert_eq!(groups.tail, None);
        assert_eq!(flags(&notes), vec![false, false, true, true, true, true]);
    }

    #[test]
    fn quarter_rest_code_breaks_even_between_equal_rests() {
        let qr = NoteDuration::UntimedRest(Quarter);
        let mut notes = vec![up(Eighth), up(Eighth), rest(qr), rest(qr)];
        let groups = group_beams(&mut notes);
        assert_eq!(groups_of(&groups), vec![vec![0, 1]]);
        assert_eq!(groups.inline.len(), 1);
    }

    #[test]
    fn long_notes_never_beam() {
        let mut notes = vec![up(Quarter), up(Quarter), up(Half), up(Half), up(Whole)];
        let groups = group_beams(&mut notes);
        assert!(groups_of(&groups).is_empty());
        assert_eq!(flags(&notes), vec![true; 5]);
    }

    #[test]
    fn regrouping_resets_stale_flags() {
        let mut notes = vec![up(Eighth), up(Eighth)];
        group_beams(&mut notes);
        notes[1] = up(Quarter);
        notes[1].flag_visible = false;
        let groups = group_beams(&mut notes);
        assert!(groups_of(&groups).is_empty());
        assert_eq!(flags(&notes), vec![true, true]);
    }

    #[test]
    fn empty_staff_has_no_beams() {
        let groups = group_beams(&mut []);
        assert_eq!(groups, BeamGroups::default());
    }

    #[test]
    fn resolve_returns_group_notes() {
        let mut notes = vec![up(Quarter), up(ThirtySecond), up(ThirtySecond)];
        let groups = group_beams(&mut notes);
        let tail = groups.tail.unwrap();
        let resolved = tail.resolve(&notes);
        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|n| !n.flag_visible));
    }
}
