//! Summary specification (`.SMSPEC`) lookups.
//!
//! Static tables of the keywords a summary specification may contain, and the
//! identifiers carried in its optional `INTEHEAD` array:
//!
//! ```text
//! INTEHEAD = [ unit system, simulator id ]
//! ```
//!
//! [`SummarySpec`] is a thin view over a decoded `.SMSPEC` stream.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::keyword::{KeywordArray, Values};

/// Every keyword known to appear in a summary specification, space padded to
/// eight characters as on disk.
pub const SMSPEC_KEYWORDS: &[&str] = &[
    "INTEHEAD",
    "RESTART ",
    "DIMENS  ",
    "KEYWORDS",
    "WGNAMES ",
    "NAMES   ",
    "NUMS    ",
    "LGRS    ",
    "NUMLX   ",
    "NUMLY   ",
    "NUMLZ   ",
    "MEASRMNT",
    "UNITS   ",
    "STARTDAT",
    "LGRNAMES",
    "LGRVEC  ",
    "LGRTIMES",
    "RUNTIMEI",
    "RUNTIMED",
    "STEPRESN",
    "XCOORD  ",
    "YCOORD  ",
    "TIMESTMP",
];

/// Whether `name` (padded or not) is a known summary specification keyword.
pub fn is_smspec_keyword(name: &str) -> bool {
    let name = name.trim_end();
    SMSPEC_KEYWORDS.iter().any(|kw| kw.trim_end() == name)
}

// ── Unit systems ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitSystem {
    Metric = 1,
    Field  = 2,
    Lab    = 3,
    PvtM   = 4,
}

impl UnitSystem {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(UnitSystem::Metric),
            2 => Some(UnitSystem::Field),
            3 => Some(UnitSystem::Lab),
            4 => Some(UnitSystem::PvtM),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitSystem::Metric => "METRIC",
            UnitSystem::Field  => "FIELD",
            UnitSystem::Lab    => "LAB",
            UnitSystem::PvtM   => "PVT-M",
        }
    }
}

pub fn unit_system_name(id: i32) -> Option<&'static str> {
    UnitSystem::from_id(id).map(UnitSystem::name)
}

// ── Simulators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Simulator {
    Eclipse100        = 100,
    Eclipse300        = 300,
    Eclipse300Thermal = 500,
    Intersect         = 700,
    FrontSim          = 800,
}

impl Simulator {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            100 => Some(Simulator::Eclipse100),
            300 => Some(Simulator::Eclipse300),
            500 => Some(Simulator::Eclipse300Thermal),
            700 => Some(Simulator::Intersect),
            800 => Some(Simulator::FrontSim),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Simulator::Eclipse100        => "ECLIPSE 100",
            Simulator::Eclipse300        => "ECLIPSE 300",
            Simulator::Eclipse300Thermal => "ECLIPSE 300 (thermal option)",
            Simulator::Intersect         => "INTERSECT",
            Simulator::FrontSim          => "FrontSim",
        }
    }
}

pub fn simulator_name(id: i32) -> Option<&'static str> {
    Simulator::from_id(id).map(Simulator::name)
}

// ── SummarySpec ──────────────────────────────────────────────────────────────

/// The parts of a summary specification needed to interpret summary data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySpec {
    /// Number of values per summary timestep.
    pub nlist:       i32,
    /// Grid dimensions `(nx, ny, nz)`.
    pub grid:        (i32, i32, i32),
    /// Report step the run was restarted from.
    pub istar:       i32,
    /// Summary vector names, trimmed.
    pub keywords:    Vec<String>,
    /// Well / group names per vector, trimmed.
    pub wgnames:     Vec<String>,
    pub unit_system: Option<UnitSystem>,
    pub simulator:   Option<Simulator>,
}

impl SummarySpec {
    /// Assemble from decoded arrays.  When a keyword occurs more than once
    /// the last occurrence wins.
    pub fn from_arrays(arrays: &[KeywordArray]) -> Result<Self> {
        let dimens = ints(arrays, "DIMENS")?;
        if dimens.len() < 6 {
            return Err(Error::UnexpectedType {
                keyword:  "DIMENS".into(),
                expected: "INTE with at least 6 elements".into(),
                found:    format!("INTE with {} elements", dimens.len()),
            });
        }

        let (unit_system, simulator) = match find(arrays, "INTEHEAD") {
            Some(kw) => match &kw.values {
                Values::Inte(v) => (
                    v.first().copied().and_then(UnitSystem::from_id),
                    v.get(1).copied().and_then(Simulator::from_id),
                ),
                other => return Err(unexpected("INTEHEAD", "INTE", other)),
            },
            None => (None, None),
        };

        Ok(Self {
            nlist: dimens[0],
            grid: (dimens[1], dimens[2], dimens[3]),
            istar: dimens[5],
            keywords: strings(arrays, "KEYWORDS")?,
            wgnames: strings(arrays, "WGNAMES")?,
            unit_system,
            simulator,
        })
    }
}

fn find<'a>(arrays: &'a [KeywordArray], keyword: &str) -> Option<&'a KeywordArray> {
    arrays.iter().rev().find(|kw| kw.keyword() == keyword)
}

fn require<'a>(arrays: &'a [KeywordArray], keyword: &str) -> Result<&'a KeywordArray> {
    find(arrays, keyword).ok_or_else(|| Error::MissingKeyword(keyword.to_owned()))
}

fn ints<'a>(arrays: &'a [KeywordArray], keyword: &str) -> Result<&'a [i32]> {
    let kw = require(arrays, keyword)?;
    kw.values.as_ints().ok_or_else(|| unexpected(keyword, "INTE", &kw.values))
}

fn strings(arrays: &[KeywordArray], keyword: &str) -> Result<Vec<String>> {
    let kw = require(arrays, keyword)?;
    let items = kw
        .values
        .as_strings()
        .ok_or_else(|| unexpected(keyword, "CHAR", &kw.values))?;
    Ok(items.iter().map(|s| s.trim().to_owned()).collect())
}

fn unexpected(keyword: &str, expected: &str, found: &Values) -> Error {
    Error::UnexpectedType {
        keyword:  keyword.to_owned(),
        expected: expected.to_owned(),
        found:    found.type_tag().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(items: &[&str]) -> Values {
        Values::Char(items.iter().map(|s| format!("{s:<8}")).collect())
    }

    fn smspec() -> Vec<KeywordArray> {
        vec![
            KeywordArray::new("INTEHEAD", Values::Inte(vec![1, 100])),
            KeywordArray::new("RESTART", chars(&["", "", "", "", "", "", "", "", ""])),
            KeywordArray::new("DIMENS", Values::Inte(vec![3, 10, 10, 3, 0, -1])),
            KeywordArray::new("KEYWORDS", chars(&["TIME", "WOPR", "FOPT"])),
            KeywordArray::new("WGNAMES", chars(&[":+:+:+:+", "OP_1", "FIELD"])),
        ]
    }

    #[test]
    fn static_tables() {
        assert_eq!(SMSPEC_KEYWORDS.len(), 23);
        assert!(SMSPEC_KEYWORDS.iter().all(|kw| kw.len() == 8));
        assert!(is_smspec_keyword("DIMENS"));
        assert!(is_smspec_keyword("DIMENS  "));
        assert!(!is_smspec_keyword("PRESSURE"));

        assert_eq!(unit_system_name(4), Some("PVT-M"));
        assert_eq!(unit_system_name(0), None);
        assert_eq!(simulator_name(500), Some("ECLIPSE 300 (thermal option)"));
        assert_eq!(simulator_name(200), None);
        assert_eq!(Simulator::FrontSim as i32, 800);
    }

    #[test]
    fn assemble_summary_spec() {
        let spec = SummarySpec::from_arrays(&smspec()).unwrap();
        assert_eq!(spec.nlist, 3);
        assert_eq!(spec.grid, (10, 10, 3));
        assert_eq!(spec.istar, -1);
        assert_eq!(spec.keywords, ["TIME", "WOPR", "FOPT"]);
        assert_eq!(spec.wgnames, [":+:+:+:+", "OP_1", "FIELD"]);
        assert_eq!(spec.unit_system, Some(UnitSystem::Metric));
        assert_eq!(spec.simulator, Some(Simulator::Eclipse100));
    }

    #[test]
    fn last_duplicate_wins() {
        let mut arrays = smspec();
        arrays.push(KeywordArray::new("DIMENS", Values::Inte(vec![5, 1, 1, 1, 0, 0])));
        assert_eq!(SummarySpec::from_arrays(&arrays).unwrap().nlist, 5);
    }

    #[test]
    fn missing_and_mistyped_keywords() {
        let arrays: Vec<_> = smspec().into_iter().filter(|kw| kw.keyword() != "WGNAMES").collect();
        assert!(matches!(
            SummarySpec::from_arrays(&arrays),
            Err(Error::MissingKeyword(ref k)) if k == "WGNAMES"
        ));

        let mut arrays = smspec();
        arrays[2] = KeywordArray::new("DIMENS", Values::Real(vec![1.0; 6]));
        assert!(matches!(
            SummarySpec::from_arrays(&arrays),
            Err(Error::UnexpectedType { ref found, .. }) if found == "REAL"
        ));

        let mut arrays = smspec();
        arrays[2] = KeywordArray::new("DIMENS", Values::Inte(vec![1, 2]));
        assert!(matches!(SummarySpec::from_arrays(&arrays), Err(Error::UnexpectedType { .. })));
    }
}
