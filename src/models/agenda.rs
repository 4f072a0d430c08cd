use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgendaItem {
    pub id: &'static str,
    pub label: &'static str,
}

const fn item(id: &'static str, label: &'static str) -> AgendaItem {
    AgendaItem { id, label }
}

const QURAN: AgendaItem = item("quran", "Quran/Hadees Class");
const AAMUGAM: AgendaItem = item("aamugam", "Aamugam");
const REPORT: AgendaItem = item("report", "Report");
const DISCUSSION: AgendaItem = item("discussion", "Discussion");
const ULBODANAM: AgendaItem = item("ulbodanam", "Ulbodanam & Dua");

const WEEK_1: &[AgendaItem] = &[
    QURAN,
    AAMUGAM,
    REPORT,
    item("thazkiya", "Thazkiya Session"),
    item("target_eval", "Meekhathi Mansooba Target Evaluation"),
    DISCUSSION,
    ULBODANAM,
];

const WEEK_2: &[AgendaItem] = &[
    QURAN,
    AAMUGAM,
    REPORT,
    item("prasthanam", "Prasthanam Padana Session"),
    DISCUSSION,
    ULBODANAM,
];

const WEEK_3: &[AgendaItem] = &[
    QURAN,
    AAMUGAM,
    REPORT,
    item("pothu", "Pothu Class"),
    DISCUSSION,
    ULBODANAM,
];

const WEEK_4: &[AgendaItem] = &[
    QURAN,
    AAMUGAM,
    REPORT,
    item("wing_eval", "Evaluation of Wings/Depts"),
    DISCUSSION,
    ULBODANAM,
];

const WEEK_5: &[AgendaItem] = &[
    QURAN,
    AAMUGAM,
    REPORT,
    item("sargga", "Sargga Paripadikal"),
    DISCUSSION,
    ULBODANAM,
];

/// Ordered agenda checklist for a week ordinal. Unknown ordinals get week 1's.
pub fn agenda_for(ordinal: u8) -> &'static [AgendaItem] {
    match ordinal {
        2 => WEEK_2,
        3 => WEEK_3,
        4 => WEEK_4,
        5 => WEEK_5,
        _ => WEEK_1,
    }
}

/// Display name of the recurring meeting held in week `ordinal`.
pub fn meeting_type_name(ordinal: u8) -> &'static str {
    match ordinal {
        2 => "Prasthanam Study Meeting",
        3 => "Pothu Class Meeting",
        4 => "Wings Evaluation Meeting",
        5 => "Sargga Meeting",
        _ => "Thazkiya & Target Review Meeting",
    }
}

pub fn find_item(ordinal: u8, id: &str) -> Option<&'static AgendaItem> {
    agenda_for(ordinal).iter().find(|i| i.id == id)
}
