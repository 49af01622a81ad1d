use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::modules::subjects::model::{NormalizedSubject, SubjectListResponse};

/// Canonical report-card subjects in curriculum order, each with the aliases
/// found in assignment and grade data. Every canonical name is also its own alias.
const CURRICULUM: &[(&str, &[&str])] = &[
    (
        "Pendidikan Agama dan Budi Pekerti",
        &[
            "PAI",
            "PABP",
            "AGAMA",
            "PENDIDIKAN AGAMA",
            "PENDIDIKAN AGAMA ISLAM",
            "PENDIDIKAN AGAMA ISLAM DAN BUDI PEKERTI",
        ],
    ),
    (
        "Pendidikan Pancasila",
        &[
            "PKN",
            "PPKN",
            "PANCASILA",
            "PENDIDIKAN KEWARGANEGARAAN",
            "PENDIDIKAN PANCASILA DAN KEWARGANEGARAAN",
        ],
    ),
    (
        "Bahasa Indonesia",
        &["BINDO", "B. INDONESIA", "B INDONESIA", "B.INDONESIA"],
    ),
    (
        "Matematika (Umum)",
        &["MTK", "MATEMATIKA", "MATEMATIKA UMUM", "MATEMATIKA WAJIB"],
    ),
    (
        "Bahasa Inggris",
        &["BING", "B. INGGRIS", "B INGGRIS", "B.INGGRIS"],
    ),
    (
        "Pendidikan Jasmani, Olahraga, dan Kesehatan",
        &["PJOK", "PENJAS", "PENJASKES", "PENJASORKES", "OLAHRAGA"],
    ),
    ("Sejarah", &["SEJARAH INDONESIA", "SEJINDO"]),
    ("Seni Budaya", &["SBK", "SENBUD", "SENI", "SENI BUDAYA DAN PRAKARYA"]),
    ("Informatika", &["TIK", "KOMPUTER"]),
    ("Fisika", &[]),
    ("Kimia", &[]),
    ("Biologi", &[]),
    ("Ekonomi", &[]),
    ("Geografi", &[]),
    ("Sosiologi", &[]),
    (
        "Prakarya dan Kewirausahaan",
        &["PKWU", "PRAKARYA", "KEWIRAUSAHAAN"],
    ),
    ("Bahasa Jawa", &["B. JAWA", "B JAWA", "BASA JAWA", "BAHASA DAERAH"]),
];

/// Lookup key -> index into `CURRICULUM`.
static ALIASES: LazyLock<HashMap<String, usize>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for (rank, (canonical, aliases)) in CURRICULUM.iter().enumerate() {
        table.insert(subject_key(canonical), rank);
        for alias in aliases.iter() {
            table.insert(subject_key(alias), rank);
        }
    }
    table
});

/// Case- and whitespace-insensitive lookup key of a subject name.
///
/// The store compares subjects by this key as well, so it must stay in sync
/// with the SQL expression `upper(regexp_replace(btrim(subject), '\s+', ' ', 'g'))`.
#[must_use]
pub fn subject_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn lookup(raw: &str) -> Option<usize> {
    ALIASES.get(&subject_key(raw)).copied()
}

/// Canonical report-card name of `raw`; unknown names come back unchanged.
#[must_use]
pub fn normalize(raw: &str) -> String {
    match lookup(raw) {
        Some(rank) => CURRICULUM[rank].0.to_string(),
        None => raw.to_string(),
    }
}

/// Identity of a subject after normalizing: two spellings are the same
/// subject exactly when their canonical keys are equal.
#[must_use]
pub fn canonical_key(raw: &str) -> String {
    subject_key(&normalize(raw))
}

/// Every lookup key that normalizes to the same subject as `raw`.
///
/// Used to select stored rows by subject regardless of how they were spelled.
#[must_use]
pub fn subject_keys(raw: &str) -> Vec<String> {
    match lookup(raw) {
        Some(rank) => {
            let mut keys: Vec<String> = ALIASES
                .iter()
                .filter(|(_, r)| **r == rank)
                .map(|(key, _)| key.clone())
                .collect();
            keys.sort();
            keys
        }
        None => vec![subject_key(raw)],
    }
}

/// Position of a subject in the curriculum order, `None` if unknown.
#[must_use]
pub fn curriculum_rank(subject: &str) -> Option<usize> {
    lookup(subject)
}

/// Curriculum order: known subjects first by rank, unknown ones after,
/// alphabetical among equals.
#[must_use]
pub fn compare_subjects(a: &str, b: &str) -> Ordering {
    let by_rank = match (curriculum_rank(a), curriculum_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_rank
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Canonical subject names in curriculum order.
#[must_use]
pub fn canonical_subjects() -> Vec<&'static str> {
    CURRICULUM.iter().map(|(canonical, _)| *canonical).collect()
}

pub struct SubjectService;

impl SubjectService {
    pub fn describe(raw: &str) -> NormalizedSubject {
        let rank = lookup(raw);
        NormalizedSubject {
            input: raw.to_string(),
            canonical: normalize(raw),
            known: rank.is_some(),
            curriculum_rank: rank,
        }
    }

    pub fn list() -> SubjectListResponse {
        SubjectListResponse {
            subjects: canonical_subjects()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Normalizes, deduplicates and orders a set of raw subject names.
    ///
    /// Unknown subjects spelled differently ("Robotika", "ROBOTIKA") collapse
    /// onto one entry; the first spelling in curriculum order is shown.
    pub fn canonical_set<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut subjects: Vec<String> = raw
            .into_iter()
            .map(|s| normalize(s.trim()))
            .filter(|s| !s.is_empty())
            .collect();
        subjects.sort_by(|a, b| compare_subjects(a, b));
        let mut seen = HashSet::new();
        subjects.retain(|s| seen.insert(subject_key(s)));
        subjects
    }
}
