//! Notated duration names → engraving duration codes.

use std::fmt;

use log::debug;
use serde::{Serialize, Serializer};

/// Engraving duration of a sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationCode {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl DurationCode {
    /// Look up a MusicXML `<type>` name. Absent or unknown names mean quarter.
    pub fn resolve(type_name: Option<&str>) -> Self {
        match type_name {
            Some(name) => Self::from_type_name(name).unwrap_or_else(|| {
                debug!("unknown note type '{name}', using quarter");
                DurationCode::Quarter
            }),
            None => DurationCode::Quarter,
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "whole" => Some(DurationCode::Whole),
            "half" => Some(DurationCode::Half),
            "quarter" => Some(DurationCode::Quarter),
            "eighth" => Some(DurationCode::Eighth),
            "16th" => Some(DurationCode::Sixteenth),
            "32nd" => Some(DurationCode::ThirtySecond),
            "64th" => Some(DurationCode::SixtyFourth),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DurationCode::Whole => "w",
            DurationCode::Half => "h",
            DurationCode::Quarter => "q",
            DurationCode::Eighth => "8",
            DurationCode::Sixteenth => "16",
            DurationCode::ThirtySecond => "32",
            DurationCode::SixtyFourth => "64",
        }
    }

    /// Flagged durations that can be joined by a beam.
    pub fn is_beamable(self) -> bool {
        matches!(
            self,
            DurationCode::Eighth
                | DurationCode::Sixteenth
                | DurationCode::ThirtySecond
                | DurationCode::SixtyFourth
        )
    }
}

/// Resolved duration of an engraving note, sounding or rest.
///
/// Rests take their code from the raw tick count rather than the type name,
/// so a two-division rest engraves as `2r` whatever its `<type>` says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteDuration {
    Sounding(DurationCode),
    Rest { ticks: i32 },
    /// Rest without a tick count: falls back to the type name.
    UntimedRest(DurationCode),
}

impl NoteDuration {
    pub fn resolve(type_name: Option<&str>, rest: bool, ticks: Option<i32>) -> Self {
        let code = DurationCode::resolve(type_name);
        match (rest, ticks) {
            (false, _) => NoteDuration::Sounding(code),
            (true, Some(ticks)) => NoteDuration::Rest { ticks },
            (true, None) => {
                debug!("rest without <duration>, using type '{}'", code.symbol());
                NoteDuration::UntimedRest(code)
            }
        }
    }

    pub fn is_rest(self) -> bool {
        !matches!(self, NoteDuration::Sounding(_))
    }

    /// Only sounding eighths and shorter ever join a beam.
    pub fn is_beamable(self) -> bool {
        matches!(self, NoteDuration::Sounding(code) if code.is_beamable())
    }

    /// Compares engraved codes: an 8-tick rest and an untimed eighth rest
    /// both engrave as `8r`.
    pub fn same_code(self, other: NoteDuration) -> bool {
        self == other || self.to_string() == other.to_string()
    }

    /// The literal `qr` code, which always interrupts a beam run.
    pub fn is_quarter_rest(self) -> bool {
        self == NoteDuration::UntimedRest(DurationCode::Quarter)
    }
}

impl fmt::Display for NoteDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteDuration::Sounding(code) => f.write_str(code.symbol()),
            NoteDuration::Rest { ticks } => write!(f, "{ticks}r"),
            NoteDuration::UntimedRest(code) => write!(f, "{}r", code.symbol()),
        }
    }
}

impl Serialize for NoteDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_table() {
        let table = [
            ("whole", "w"),
            ("half", "h"),
            ("quarter", "q"),
            ("eighth", "8"),
            ("16th", "16"),
            ("32nd", "32"),
            ("64th", "64"),
        ];
        for (name, symbol) in table {
            assert_eq!(DurationCode::resolve(Some(name)).symbol(), symbol, "{name}");
        }
    }

    #[test]
    fn unknown_or_absent_type_is_quarter() {
        assert_eq!(DurationCode::resolve(None), DurationCode::Quarter);
        assert_eq!(DurationCode::resolve(Some("breve")), DurationCode::Quarter);
        assert_eq!(DurationCode::resolve(Some("Eighth")), DurationCode::Quarter);
        assert_eq!(DurationCode::resolve(Some("")), DurationCode::Quarter);
    }

    #[test]
    fn rest_code_comes_from_ticks() {
        let rest = NoteDuration::resolve(Some("eighth"), true, Some(2));
        assert_eq!(rest.to_string(), "2r");
        assert!(rest.is_rest());
        assert!(!rest.is_beamable());
        assert!(!rest.is_quarter_rest());
    }

    #[test]
    fn untimed_rest_falls_back_to_type() {
        let rest = NoteDuration::resolve(None, true, None);
        assert_eq!(rest.to_string(), "qr");
        assert!(rest.is_quarter_rest());
    }

    #[test]
    fn sounding_notes_ignore_ticks() {
        let note = NoteDuration::resolve(Some("16th"), false, Some(7));
        assert_eq!(note.to_string(), "16");
        assert!(note.is_beamable());
        assert!(!NoteDuration::resolve(Some("half"), false, None).is_beamable());
    }

    #[test]
    fn codes_compare_by_engraved_text() {
        let timed = NoteDuration::Rest { ticks: 8 };
        let untimed = NoteDuration::UntimedRest(DurationCode::Eighth);
        assert!(timed.same_code(untimed));
        assert!(!timed.same_code(NoteDuration::Sounding(DurationCode::Eighth)));
    }

    #[test]
    fn serializes_as_code_string() {
        let json = serde_json::to_string(&NoteDuration::Rest { ticks: 4 }).unwrap();
        assert_eq!(json, "\"4r\"");
    }
}
