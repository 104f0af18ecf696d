use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::{info, warn};

use super::{Catalog, NewFaculty, NewStudent};

// ─── Name pools ──────────────────────────────────────────────────

static FACULTIES: &[&str] = &[
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Law",
    "Economics",
    "Philosophy",
];

static FIRST: &[&str] = &[
    "Emma", "Liam", "Olivia", "Noah", "Ava", "Ethan", "Sophia", "Mason", "Isabella", "William",
    "Mia", "James", "Charlotte", "Benjamin", "Amelia", "Lucas", "Harper", "Henry",
];

static LAST: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Wilson", "Anderson", "Taylor", "Moore", "Jackson", "Martin", "Lee", "Clark",
];

/// Roughly one student in ten is not enrolled in any faculty.
const UNASSIGNED_RATIO: f64 = 0.1;

/// Fill `catalog` with every faculty from the pool and `students` students.
///
/// The same `seed` always yields the same catalog.
pub fn seed_demo_data(catalog: &Catalog, students: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);

    let faculty_ids: Vec<u64> = FACULTIES
        .iter()
        .map(|name| {
            catalog
                .create_faculty(NewFaculty {
                    name: (*name).to_owned(),
                })
                .id
        })
        .collect();

    for _ in 0..students {
        let first = FIRST[rng.gen_range(0..FIRST.len())];
        let last = LAST[rng.gen_range(0..LAST.len())];
        let faculty_id = if rng.gen_bool(UNASSIGNED_RATIO) {
            None
        } else {
            Some(faculty_ids[rng.gen_range(0..faculty_ids.len())])
        };

        let new = NewStudent {
            full_name: format!("{first} {last}"),
            age: rng.gen_range(17..=30),
            faculty_id,
        };
        if let Err(e) = catalog.create_student(new) {
            warn!(error = %e, "demo student skipped");
        }
    }

    info!(
        faculties = faculty_ids.len(),
        students, "demo catalog seeded"
    );
}
